use anyhow::Result;
use serde::Deserialize;
use std::path::Path;

/// Path the Sysdig notification channel posts to
pub const DEFAULT_HOOK_PATH: &str = "/open-apis/bot/v2/hook/1ef26cc4-a7e6-4295-8483-3ac8e923356e";

/// Environment variable holding the shared secret
pub const DEFAULT_KEY_FROM: &str = "BASE_KEY";

impl Config {
    /// Override the listen host
    pub fn with_host(mut self, host: Option<String>) -> Self {
        if let Some(host) = host {
            self.http.host = host;
        }
        self
    }

    /// Override the listen port
    pub fn with_port(mut self, port: Option<u16>) -> Self {
        if let Some(port) = port {
            self.http.port = port;
        }
        self
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub http: Http,
    pub auth: Auth,
    pub relay: Relay,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Http {
    pub host: String,
    pub port: u16,
    #[serde(rename = "hookPath")]
    pub hook_path: String,
    /// Largest accepted notification body. Unset means no limit.
    #[serde(rename = "bodyLimitBytes")]
    pub body_limit_bytes: Option<usize>,
}

impl Default for Http {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            hook_path: DEFAULT_HOOK_PATH.to_string(),
            body_limit_bytes: None,
        }
    }
}

/// Shared secret expected in the `BASE_KEY` header. Empty disables the check.
#[derive(Debug, Clone, PartialEq)]
pub struct Auth {
    pub key: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Relay {
    /// Whole-request timeout for the outbound webhook call. Unset means none.
    #[serde(rename = "timeoutSeconds")]
    pub timeout_seconds: Option<u64>,
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        tracing::info!("Loading config from file");

        let config = std::fs::read_to_string(path)?;
        Self::from_yaml(&config)
    }

    /// Parse configuration from YAML
    pub fn from_yaml(config: &str) -> Result<Self> {
        Ok(serde_norway::from_str(config)?)
    }

    /// Load configuration from a file if given, else from the environment alone
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }
}

impl Auth {
    /// Resolve the shared secret, reading it from an environment variable if needed
    pub fn new(key: Option<String>, key_from: Option<String>) -> Self {
        let key = match key {
            Some(key) => key,
            None => {
                let key_from = key_from.unwrap_or_else(|| DEFAULT_KEY_FROM.to_string());
                std::env::var(key_from).unwrap_or_default()
            }
        };

        Self { key }
    }

    /// Whether callers must present the shared secret
    pub fn enabled(&self) -> bool {
        !self.key.is_empty()
    }

    /// Check a presented header value against the shared secret
    pub fn authorize(&self, presented: Option<&[u8]>) -> bool {
        !self.enabled() || presented == Some(self.key.as_bytes())
    }
}

impl Default for Auth {
    fn default() -> Self {
        Self::new(None, None)
    }
}

impl<'de> Deserialize<'de> for Auth {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct AuthRaw {
            key: Option<String>,
            #[serde(rename = "keyFrom")]
            key_from: Option<String>,
        }

        let raw = AuthRaw::deserialize(deserializer)?;
        Ok(Auth::new(raw.key, raw.key_from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UNSET_VAR: &str = "SYSDIG_FEISHU_RELAY_TEST_UNSET_KEY";

    #[test]
    fn test_full_config() {
        let config = Config::from_yaml(
            r#"
http:
  host: 127.0.0.1
  port: 9000
  hookPath: /hooks/sysdig
  bodyLimitBytes: 65536
auth:
  key: s3cret
relay:
  timeoutSeconds: 15
"#,
        )
        .unwrap();

        assert_eq!(config.http.host, "127.0.0.1");
        assert_eq!(config.http.port, 9000);
        assert_eq!(config.http.hook_path, "/hooks/sysdig");
        assert_eq!(config.http.body_limit_bytes, Some(65536));
        assert_eq!(config.auth.key, "s3cret");
        assert_eq!(config.relay.timeout_seconds, Some(15));
    }

    #[test]
    fn test_sections_default() {
        let config = Config::from_yaml(&format!("auth:\n  keyFrom: {UNSET_VAR}\n")).unwrap();

        assert_eq!(config.http.host, "0.0.0.0");
        assert_eq!(config.http.port, 8080);
        assert_eq!(config.http.hook_path, DEFAULT_HOOK_PATH);
        assert_eq!(config.http.body_limit_bytes, None);
        assert!(!config.auth.enabled());
        assert_eq!(config.relay.timeout_seconds, None);
    }

    #[test]
    fn test_unset_key_variable_disables_auth() {
        let auth = Auth::new(None, Some(UNSET_VAR.to_string()));

        assert!(!auth.enabled());
        assert!(auth.authorize(None));
        assert!(auth.authorize(Some(b"anything".as_slice())));
    }

    #[test]
    fn test_explicit_key_wins() {
        let auth = Auth::new(Some("s3cret".to_string()), Some(UNSET_VAR.to_string()));

        assert!(auth.enabled());
        assert!(auth.authorize(Some(b"s3cret".as_slice())));
        assert!(!auth.authorize(Some(b"S3CRET".as_slice())));
        assert!(!auth.authorize(Some(b"".as_slice())));
        assert!(!auth.authorize(None));
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_yaml("{}")
            .unwrap()
            .with_host(Some("::1".to_string()))
            .with_port(Some(3000))
            .with_port(None);

        assert_eq!(config.http.host, "::1");
        assert_eq!(config.http.port, 3000);
    }
}
