use std::{env, fmt};

pub const DEFAULT_LLM_API_URL: &str = "https://api.openai.com/v1/chat/completions";

#[derive(Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub data_path: String,
    pub static_dir: String,

    // Optional LLM suggestions; unset key means rule-based only
    pub llm_api_key: Option<String>,
    pub llm_api_url: String,
    pub llm_model: String,
    pub llm_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    // Separated from the process environment so tests can feed values
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".into()),
            port: lookup("PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            data_path: lookup("DATA_PATH").unwrap_or_else(|| "data/focus_ring.json".into()),
            static_dir: lookup("STATIC_DIR").unwrap_or_else(|| "static".into()),

            llm_api_key: lookup("LLM_API_KEY").filter(|s| !s.trim().is_empty()),
            llm_api_url: lookup("LLM_API_URL").unwrap_or_else(|| DEFAULT_LLM_API_URL.into()),
            llm_model: lookup("LLM_MODEL").unwrap_or_else(|| "gpt-3.5-turbo".into()),
            llm_timeout_secs: lookup("LLM_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
        }
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// Only whether a key is set gets printed
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("data_path", &self.data_path)
            .field("static_dir", &self.static_dir)
            .field("llm_api_key", &self.llm_api_key.as_ref().map(|_| "<redacted>"))
            .field("llm_api_url", &self.llm_api_url)
            .field("llm_model", &self.llm_model)
            .field("llm_timeout_secs", &self.llm_timeout_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = config_from(&[]);
        assert_eq!(config.listen_addr(), "127.0.0.1:3000");
        assert_eq!(config.data_path, "data/focus_ring.json");
        assert!(config.llm_api_key.is_none());
        assert_eq!(config.llm_api_url, DEFAULT_LLM_API_URL);
        assert_eq!(config.llm_timeout_secs, 30);
    }

    #[test]
    fn unparsable_port_falls_back() {
        let config = config_from(&[("PORT", "not-a-port"), ("HOST", "0.0.0.0")]);
        assert_eq!(config.listen_addr(), "0.0.0.0:3000");
    }

    #[test]
    fn blank_llm_key_counts_as_unset() {
        let config = config_from(&[("LLM_API_KEY", "   ")]);
        assert!(config.llm_api_key.is_none());

        let config = config_from(&[("LLM_API_KEY", "sk-test"), ("LLM_MODEL", "gpt-4o-mini")]);
        assert_eq!(config.llm_api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.llm_model, "gpt-4o-mini");
    }

    #[test]
    fn debug_redacts_llm_key() {
        let config = config_from(&[("LLM_API_KEY", "sk-secret-123")]);
        let printed = format!("{config:?}");
        assert!(!printed.contains("sk-secret-123"));
        assert!(printed.contains("Some(\"<redacted>\")"));

        let printed = format!("{:?}", config_from(&[]));
        assert!(printed.contains("llm_api_key: None"));
    }
}
