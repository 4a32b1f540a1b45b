//! Helpers shared by the page handlers

use serde::Deserialize;

use super::middleware::WebError;

/// `?page=` of list pages, kept raw so the paginator can resolve bad values
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

/// Parse a numeric path segment; anything else does not name a page
pub fn parse_path_number<T: std::str::FromStr>(raw: &str) -> Result<T, WebError> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(WebError::NotFound(format!("No page at '{}'", raw)));
    }
    raw.parse()
        .map_err(|_| WebError::NotFound(format!("No page at '{}'", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_path_number() {
        assert_eq!(parse_path_number::<i64>("42").unwrap(), 42);
        assert!(matches!(parse_path_number::<i64>("-1"), Err(WebError::NotFound(_))));
        assert!(matches!(parse_path_number::<i64>("4a"), Err(WebError::NotFound(_))));
        assert!(matches!(parse_path_number::<i64>(""), Err(WebError::NotFound(_))));
        assert!(matches!(
            parse_path_number::<u32>("99999999999"),
            Err(WebError::NotFound(_))
        ));
    }
}
