use crate::traits::LocationChannel;
use crate::{Error, Result};
use reqwest::Url;
use std::sync::{Arc, Mutex};

/// Decoded value of the first `name` query parameter
pub(crate) fn read_param(url: &Url, name: &str) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

/// Replace every `name` parameter with `value` (or drop it), keeping the rest
/// of the query in its original order.
pub(crate) fn write_param(url: &mut Url, name: &str, value: Option<&str>) {
    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != name)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    if let Some(value) = value {
        pairs.push((name.to_string(), value.to_string()));
    }

    if pairs.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(pairs);
    }
}

/// Page location held in memory.
///
/// Clones share the same URL, so a test (or a native host) can hand one clone
/// to the filter store and read the shareable link back from another.
#[derive(Debug, Clone)]
pub struct QueryStringLocation {
    url: Arc<Mutex<Url>>,
}

impl QueryStringLocation {
    pub fn parse(url: &str) -> Result<Self> {
        let url = Url::parse(url).map_err(|e| Error::ParseError(format!("Invalid URL: {}", e)))?;
        Ok(Self {
            url: Arc::new(Mutex::new(url)),
        })
    }

    /// Current URL as a string
    pub fn href(&self) -> String {
        self.url
            .lock()
            .map(|url| url.to_string())
            .unwrap_or_default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Url>> {
        self.url
            .lock()
            .map_err(|_| Error::Storage("location lock poisoned".to_string()))
    }
}

impl Default for QueryStringLocation {
    fn default() -> Self {
        Self {
            url: Arc::new(Mutex::new(
                Url::parse("http://localhost/").expect("static URL is valid"),
            )),
        }
    }
}

impl LocationChannel for QueryStringLocation {
    fn query_param(&self, name: &str) -> Result<Option<String>> {
        let url = self.lock()?;
        Ok(read_param(&url, name))
    }

    fn set_query_param(&mut self, name: &str, value: Option<&str>) -> Result<()> {
        let mut url = self.lock()?;
        write_param(&mut url, name, value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trips_json_through_query() {
        let mut location =
            QueryStringLocation::parse("https://soilhub.example/crops?page=2").unwrap();
        let json = r#"{"crop_types":["winter wheat","canola"]}"#;

        location.set_query_param("filters", Some(json)).unwrap();
        assert_eq!(location.query_param("filters").unwrap().as_deref(), Some(json));
        assert_eq!(location.query_param("page").unwrap().as_deref(), Some("2"));
        assert!(!location.href().contains('"'));
    }

    #[test]
    fn test_dropping_last_param_clears_query() {
        let mut location = QueryStringLocation::default();
        location.set_query_param("filters", Some("{}")).unwrap();
        location.set_query_param("filters", None).unwrap();
        assert_eq!(location.query_param("filters").unwrap(), None);
        assert_eq!(location.href(), "http://localhost/");
    }

    #[test]
    fn test_replaces_existing_param() {
        let mut location = QueryStringLocation::parse("http://localhost/?filters=old&x=1").unwrap();
        location.set_query_param("filters", Some("new")).unwrap();
        let href = location.href();
        assert_eq!(href.matches("filters=").count(), 1);
        assert_eq!(location.query_param("filters").unwrap().as_deref(), Some("new"));
    }

    #[test]
    fn test_clones_share_the_url() {
        let mut location = QueryStringLocation::default();
        let observer = location.clone();
        location.set_query_param("filters", Some("{}")).unwrap();
        assert_eq!(observer.query_param("filters").unwrap().as_deref(), Some("{}"));
    }

    #[test]
    fn test_param_helpers_on_plain_url() {
        let mut url = Url::parse("https://soilhub.example/?a=1&filters=x&b=2").unwrap();
        write_param(&mut url, "filters", Some("y z"));
        assert_eq!(read_param(&url, "filters").as_deref(), Some("y z"));
        assert_eq!(url.query(), Some("a=1&b=2&filters=y+z"));

        write_param(&mut url, "filters", None);
        assert_eq!(read_param(&url, "filters"), None);
        assert_eq!(read_param(&url, "b").as_deref(), Some("2"));
    }

    #[test]
    fn test_invalid_url() {
        assert!(QueryStringLocation::parse("not a url").is_err());
    }
}
