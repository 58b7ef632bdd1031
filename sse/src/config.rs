use crate::changeable::UPDATED_BETWEEN;
use serde::Deserialize;

/// Options for a `ChangeStream`, fixed once the stream is built.
///
/// Fields missing from a deserialized source fall back to their defaults.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Name of the range query to invoke on the collection.
    pub query: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            query: UPDATED_BETWEEN.to_string(),
        }
    }
}

impl Config {
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::changeable::CREATED_BETWEEN;

    #[test]
    fn default_query_is_updated_between() {
        assert_eq!(Config::default().query, "updatedBetween");
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();

        assert_eq!(config, Config::default());
    }

    #[test]
    fn given_query_overrides_default() {
        let config: Config = serde_json::from_str(r#"{"query":"createdBetween"}"#).unwrap();

        assert_eq!(config, Config::default().with_query(CREATED_BETWEEN));
    }
}
