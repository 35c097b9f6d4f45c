use crate::domain::model::Coordinates;
use crate::utils::error::{Result, ShuttleError};
use url::Url;

pub const DEFAULT_DIRECTIONS_BASE_URL: &str = "https://www.google.com/maps/dir/";

/// 建立從使用者位置到站點的導航連結
pub fn directions_url(
    base_url: &str,
    origin: Coordinates,
    stop_location: &str,
    api_key: Option<&str>,
) -> Result<String> {
    let origin = origin.to_string();
    let mut params = vec![
        ("api", "1"),
        ("origin", origin.as_str()),
        ("destination", stop_location.trim()),
    ];
    if let Some(key) = api_key.filter(|k| !k.is_empty()) {
        params.push(("key", key));
    }

    let url = Url::parse_with_params(base_url, &params).map_err(|e| {
        ShuttleError::InvalidConfigValueError {
            field: "directions.base_url".to_string(),
            value: base_url.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }
    })?;

    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn query(url: &str) -> HashMap<String, String> {
        Url::parse(url)
            .unwrap()
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    #[test]
    fn test_directions_url_with_key() {
        let origin = Coordinates::new(40.5, -74.25).unwrap();
        let url = directions_url(
            DEFAULT_DIRECTIONS_BASE_URL,
            origin,
            "40.7128, -74.0060",
            Some("secret"),
        )
        .unwrap();

        assert!(url.starts_with("https://www.google.com/maps/dir/?api=1&"));
        let q = query(&url);
        assert_eq!(q["origin"], "40.5,-74.25");
        assert_eq!(q["destination"], "40.7128, -74.0060");
        assert_eq!(q["key"], "secret");
    }

    #[test]
    fn test_directions_url_without_key() {
        let origin = Coordinates::new(1.0, 2.0).unwrap();
        let url = directions_url(DEFAULT_DIRECTIONS_BASE_URL, origin, "3, 4", None).unwrap();
        assert!(!query(&url).contains_key("key"));

        let url = directions_url(DEFAULT_DIRECTIONS_BASE_URL, origin, "3, 4", Some("")).unwrap();
        assert!(!query(&url).contains_key("key"));
    }

    #[test]
    fn test_directions_url_rejects_bad_base() {
        let origin = Coordinates::new(1.0, 2.0).unwrap();
        assert!(directions_url("not a url", origin, "3, 4", None).is_err());
    }
}
