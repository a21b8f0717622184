use hmac::Hmac;
use pbkdf2::pbkdf2;
use sha2::Sha256;
use rand::Rng;
use base64::{Engine, engine::general_purpose::STANDARD};

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "pbkdf2_sha256";
const SALT_LENGTH: usize = 16;
const KEY_LENGTH: usize = 32;

/// Hash un mot de passe au format `pbkdf2_sha256$iterations$salt$hash`
/// (PBKDF2-HMAC-SHA256, salt aléatoire de 16 bytes, base64 standard)
pub fn hash_password(password: &str, iterations: u32) -> Result<String, String> {
    if iterations == 0 {
        return Err("Iterations must be greater than 0".to_string());
    }

    let mut salt = [0u8; SALT_LENGTH];
    rand::thread_rng().fill(&mut salt);

    let mut key = [0u8; KEY_LENGTH];
    pbkdf2::<HmacSha256>(password.as_bytes(), &salt, iterations, &mut key)
        .map_err(|e| format!("PBKDF2 hash generation failed: {}", e))?;

    Ok(format!(
        "{}${}${}${}",
        ALGORITHM,
        iterations,
        STANDARD.encode(salt),
        STANDARD.encode(key)
    ))
}

/// Vérifie un mot de passe contre un hash stocké.
/// Le nombre d'itérations est relu depuis le hash : changer PASSWORD_ITERATIONS
/// n'invalide pas les comptes existants.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, String> {
    let parts: Vec<&str> = stored_hash.split('$').collect();
    let [algorithm, iterations, salt, hash] = parts.as_slice() else {
        return Err("Invalid hash format".to_string());
    };

    if *algorithm != ALGORITHM {
        return Err(format!("Unsupported algorithm: {}", algorithm));
    }

    let iterations = iterations
        .parse::<u32>()
        .map_err(|_| "Invalid iterations".to_string())?;

    let salt = STANDARD
        .decode(salt)
        .map_err(|e| format!("Salt decode failed: {}", e))?;
    let expected_hash = STANDARD
        .decode(hash)
        .map_err(|e| format!("Hash decode failed: {}", e))?;

    let mut computed = vec![0u8; expected_hash.len()];
    pbkdf2::<HmacSha256>(password.as_bytes(), &salt, iterations, &mut computed)
        .map_err(|e| format!("PBKDF2 hash verification failed: {}", e))?;

    Ok(constant_time_eq(&computed, &expected_hash))
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("pw123", 1_000).unwrap();

        assert!(hash.starts_with("pbkdf2_sha256$1000$"));
        assert!(verify_password("pw123", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn test_same_password_gets_different_salts() {
        let first = hash_password("secret", 1_000).unwrap();
        let second = hash_password("secret", 1_000).unwrap();

        assert_ne!(first, second);
    }

    #[test]
    fn test_malformed_hash() {
        assert!(verify_password("pw", "not-a-hash").is_err());
        assert!(verify_password("pw", "md5$1$abc$def").is_err());
        assert!(verify_password("pw", "pbkdf2_sha256$many$abc$def").is_err());
    }
}
