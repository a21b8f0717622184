use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde_json::Value;

#[derive(Debug, Clone)]
struct CachedEntry {
    body: Value,
    stored_at: Instant,
}

/// Cache de réponses en lecture seule, clé = requête complète (chemin + query).
/// Une entrée est servie telle quelle jusqu'à expiration du TTL, même si les
/// données en base ont changé entre-temps.
#[derive(Clone)]
pub struct ResponseCache {
    entries: Arc<DashMap<String, CachedEntry>>,
    ttl: Duration,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            ttl,
        }
    }

    /// Renvoie la réponse en cache si elle est encore valide
    pub fn get(&self, key: &str) -> Option<Value> {
        if let Some(entry) = self.entries.get(key) {
            if entry.stored_at.elapsed() < self.ttl {
                return Some(entry.body.clone());
            }
        }

        // Revérifié sous le verrou : une réponse réinsérée entre-temps est gardée
        let ttl = self.ttl;
        self.entries.remove_if(key, |_, entry| entry.stored_at.elapsed() >= ttl);
        None
    }

    pub fn insert(&self, key: &str, body: Value) {
        self.entries.insert(
            key.to_string(),
            CachedEntry {
                body,
                stored_at: Instant::now(),
            },
        );
    }

    /// Supprime toutes les entrées expirées
    pub fn cleanup_expired(&self) {
        let ttl = self.ttl;
        self.entries.retain(|_, entry| entry.stored_at.elapsed() < ttl);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
