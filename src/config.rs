use std::time::Duration;

use anyhow::{bail, Result};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://api.notion.com/v1";
pub const DEFAULT_NOTION_VERSION: &str = "2022-06-28";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Clone, Debug)]
pub struct NotionConfig {
    pub token: Option<String>,
    pub database_id: Option<String>,
    pub base_url: String,
    pub notion_version: String,
    pub timeout: Duration,
}

impl Default for NotionConfig {
    fn default() -> Self {
        Self {
            token: None,
            database_id: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            notion_version: DEFAULT_NOTION_VERSION.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl NotionConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    fn from_lookup<F>(get: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        cfg.token = get("NOTION_TOKEN").filter(|s| !s.trim().is_empty());
        cfg.database_id = get("NOTION_DATABASE_ID").filter(|s| !s.trim().is_empty());
        if let Some(base) = get("NOTION_BASE_URL") {
            cfg.base_url = base;
        }
        if let Some(v) = get("NOTION_VERSION") {
            cfg.notion_version = v;
        }
        if let Some(timeout) = get("NOTION_TIMEOUT_SECS") {
            if let Some(secs) = timeout.parse::<u64>().ok().filter(|&s| s > 0) {
                cfg.timeout = Duration::from_secs(secs);
            }
        }
        cfg
    }

    /// CLI flags take precedence over the environment.
    /// Blank flags count as absent and leave the environment value alone.
    pub fn with_overrides(mut self, token: Option<String>, database_id: Option<String>) -> Self {
        if let Some(token) = token.filter(|s| !s.trim().is_empty()) {
            self.token = Some(token);
        }
        if let Some(db) = database_id.filter(|s| !s.trim().is_empty()) {
            self.database_id = Some(db);
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        // friendly error before any network I/O
        if Url::parse(&self.base_url).is_err() {
            bail!("Invalid NOTION_BASE_URL: {}", self.base_url);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_when_env_is_empty() {
        let cfg = NotionConfig::from_lookup(lookup(&[]));
        assert!(cfg.token.is_none());
        assert!(cfg.database_id.is_none());
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.notion_version, DEFAULT_NOTION_VERSION);
        assert_eq!(cfg.timeout, Duration::from_secs(30));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn reads_env_and_ignores_bad_timeout() {
        let cfg = NotionConfig::from_lookup(lookup(&[
            ("NOTION_TOKEN", "secret_abc"),
            ("NOTION_DATABASE_ID", "db1"),
            ("NOTION_BASE_URL", "http://127.0.0.1:9/v1"),
            ("NOTION_TIMEOUT_SECS", "nope"),
        ]));
        assert_eq!(cfg.token.as_deref(), Some("secret_abc"));
        assert_eq!(cfg.database_id.as_deref(), Some("db1"));
        assert_eq!(cfg.base_url, "http://127.0.0.1:9/v1");
        assert_eq!(cfg.timeout, Duration::from_secs(30));
    }

    #[test]
    fn blank_credentials_count_as_missing() {
        let cfg = NotionConfig::from_lookup(lookup(&[("NOTION_TOKEN", "  "), ("NOTION_DATABASE_ID", "")]));
        assert!(cfg.token.is_none());
        assert!(cfg.database_id.is_none());
    }

    #[test]
    fn flags_override_env() {
        let cfg = NotionConfig::from_lookup(lookup(&[("NOTION_TOKEN", "env"), ("NOTION_DATABASE_ID", "env-db")]))
            .with_overrides(Some("flag".into()), None);
        assert_eq!(cfg.token.as_deref(), Some("flag"));
        assert_eq!(cfg.database_id.as_deref(), Some("env-db"));
    }

    #[test]
    fn zero_timeout_keeps_default() {
        let cfg = NotionConfig::from_lookup(lookup(&[("NOTION_TIMEOUT_SECS", "0")]));
        assert_eq!(cfg.timeout, Duration::from_secs(30));
        let cfg = NotionConfig::from_lookup(lookup(&[("NOTION_TIMEOUT_SECS", "5")]));
        assert_eq!(cfg.timeout, Duration::from_secs(5));
    }

    #[test]
    fn blank_flags_do_not_override() {
        let cfg = NotionConfig::from_lookup(lookup(&[("NOTION_TOKEN", "env")]))
            .with_overrides(Some("".into()), Some("  ".into()));
        assert_eq!(cfg.token.as_deref(), Some("env"));
        assert!(cfg.database_id.is_none());
    }

    #[test]
    fn rejects_unparseable_base_url() {
        let mut cfg = NotionConfig::default();
        cfg.base_url = "not a url".into();
        assert!(cfg.validate().is_err());
    }
}
