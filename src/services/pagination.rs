use serde::Serialize;

use crate::errors::AppError;

pub const PAGE_SIZE: u64 = 10;

/// Réponse paginée (format {count, next, previous, results})
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

/// Page demandée + de quoi reconstruire les liens next / previous
#[derive(Debug, Clone)]
pub struct PageRequest {
    pub page: u64,
    path: String,
    other_params: Vec<String>,
}

impl PageRequest {
    /// Une page absente, non numérique ou nulle vaut 1
    pub fn from_request(path: &str, query_string: &str) -> Self {
        let mut page = 1;
        let mut other_params = Vec::new();

        for pair in query_string.split('&').filter(|p| !p.is_empty()) {
            match pair.strip_prefix("page=") {
                Some(raw) => {
                    page = raw.parse::<u64>().ok().filter(|p| *p > 0).unwrap_or(1);
                }
                None => other_params.push(pair.to_string()),
            }
        }

        Self {
            page,
            path: path.to_string(),
            other_params,
        }
    }

    /// Index 0-based attendu par le paginator SeaORM.
    /// Une page au-delà de la dernière est une 404 (sauf la page 1 d'une liste vide).
    pub fn page_index(&self, total_items: u64) -> Result<u64, AppError> {
        let num_pages = total_items.div_ceil(PAGE_SIZE).max(1);
        if self.page > num_pages {
            return Err(AppError::NotFound("Invalid page".to_string()));
        }
        Ok(self.page - 1)
    }

    pub fn build<T>(&self, results: Vec<T>, count: u64) -> Paginated<T> {
        let num_pages = count.div_ceil(PAGE_SIZE).max(1);
        let next = (self.page < num_pages).then(|| self.link(self.page + 1));
        let previous = (self.page > 1).then(|| self.link(self.page - 1));

        Paginated {
            count,
            next,
            previous,
            results,
        }
    }

    fn link(&self, page: u64) -> String {
        let mut params = self.other_params.clone();
        params.push(format!("page={}", page));
        format!("{}?{}", self.path, params.join("&"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_parsing() {
        assert_eq!(PageRequest::from_request("/api/jobs", "").page, 1);
        assert_eq!(PageRequest::from_request("/api/jobs", "page=3").page, 3);
        assert_eq!(PageRequest::from_request("/api/jobs", "page=abc").page, 1);
        assert_eq!(PageRequest::from_request("/api/jobs", "page=0").page, 1);
    }

    #[test]
    fn test_links_keep_other_params() {
        let request = PageRequest::from_request("/api/jobs", "location=Paris&page=2");
        let page: Paginated<i32> = request.build(vec![1, 2], 25);

        assert_eq!(page.next.as_deref(), Some("/api/jobs?location=Paris&page=3"));
        assert_eq!(page.previous.as_deref(), Some("/api/jobs?location=Paris&page=1"));
    }

    #[test]
    fn test_last_page_has_no_next() {
        let request = PageRequest::from_request("/api/jobs", "page=3");
        let page: Paginated<i32> = request.build(vec![], 25);

        assert!(page.next.is_none());
        assert!(page.previous.is_some());
    }

    #[test]
    fn test_page_index_out_of_range() {
        let request = PageRequest::from_request("/api/jobs", "page=4");
        assert!(request.page_index(25).is_err());
        assert_eq!(request.page_index(31).unwrap(), 3);

        let first = PageRequest::from_request("/api/jobs", "");
        assert_eq!(first.page_index(0).unwrap(), 0);
    }
}
