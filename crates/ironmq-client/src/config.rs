//! Client configuration.
//!
//! Settings are resolved in layers, later sources overriding earlier ones:
//!
//! 1. Built-in defaults ([`ClientConfig::default`])
//! 2. An optional configuration file (TOML, JSON or YAML, chosen by extension)
//! 3. Environment variables prefixed `IRON_`, e.g. `IRON_PROJECT_ID`,
//!    `IRON_TOKEN`, `IRON_HOST`, `IRON_PORT`, `IRON_SCHEME`

use crate::error::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

/// Default IronMQ v3 cluster host
pub const DEFAULT_HOST: &str = "mq-aws-us-east-1-1.iron.io";

/// URL scheme used to reach the service
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    Http,
    #[default]
    Https,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }
}

impl std::fmt::Display for Scheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scheme {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "http" => Ok(Self::Http),
            "https" => Ok(Self::Https),
            other => Err(ConfigurationError::Invalid {
                message: format!("unsupported scheme '{}', expected http or https", other),
            }),
        }
    }
}

/// Connection settings for an IronMQ project.
///
/// # Examples
///
/// ```
/// use ironmq_client::{ClientConfig, Scheme};
///
/// let config = ClientConfig::new("my-project")
///     .with_token("secret")
///     .with_scheme(Scheme::Http)
///     .with_host("localhost")
///     .with_port(8080);
///
/// assert_eq!(
///     config.endpoint().unwrap().as_str(),
///     "http://localhost:8080/3/projects/my-project"
/// );
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub scheme: Scheme,
    pub host: String,
    pub port: u16,
    pub project_id: String,
    /// OAuth token sent in the `Authorization` header when present
    pub token: Option<String>,
    /// Per-request timeout enforced by the HTTP transport
    pub request_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            scheme: Scheme::Https,
            host: DEFAULT_HOST.to_string(),
            port: 443,
            project_id: String::new(),
            token: None,
            request_timeout_secs: 60,
            user_agent: format!("ironmq-client/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    /// Create configuration for a project with default connection settings
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            ..Self::default()
        }
    }

    pub fn with_scheme(mut self, scheme: Scheme) -> Self {
        self.scheme = scheme;
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_secs = timeout.as_secs();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Base URL all queue paths are resolved against:
    /// `{scheme}://{host}:{port}/3/projects/{project_id}`
    pub fn endpoint(&self) -> Result<Url, ConfigurationError> {
        let base = format!("{}://{}:{}/", self.scheme, self.host, self.port);
        let mut url = Url::parse(&base).map_err(|e| ConfigurationError::Invalid {
            message: format!("invalid endpoint '{}': {}", base, e),
        })?;

        url.path_segments_mut()
            .map_err(|_| ConfigurationError::Invalid {
                message: format!("endpoint '{}' cannot carry a path", base),
            })?
            .pop_if_empty()
            .extend(["3", "projects", self.project_id.as_str()]);

        Ok(url)
    }

    /// Check that the configuration can address a project
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.project_id.trim().is_empty() {
            return Err(ConfigurationError::Missing {
                key: "project_id".to_string(),
            });
        }

        if self.host.trim().is_empty() {
            return Err(ConfigurationError::Missing {
                key: "host".to_string(),
            });
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigurationError::Invalid {
                message: "request_timeout_secs must be greater than zero".to_string(),
            });
        }

        if matches!(&self.token, Some(token) if token.is_empty()) {
            return Err(ConfigurationError::Invalid {
                message: "token must not be empty when set".to_string(),
            });
        }

        self.endpoint().map(|_| ())
    }

    /// Copy of the configuration that is safe to print
    pub fn redacted(&self) -> Self {
        Self {
            token: self.token.as_ref().map(|_| "<redacted>".to_string()),
            ..self.clone()
        }
    }

    /// Resolve configuration from defaults, an optional file and `IRON_*`
    /// environment variables, then validate it.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigurationError> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            if !path.exists() {
                return Err(ConfigurationError::Missing {
                    key: path.display().to_string(),
                });
            }
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let settings = builder
            .add_source(config::Environment::with_prefix("IRON"))
            .build()
            .map_err(|e| ConfigurationError::Parsing {
                message: e.to_string(),
            })?;

        let resolved: Self = settings
            .try_deserialize()
            .map_err(|e| ConfigurationError::Parsing {
                message: e.to_string(),
            })?;

        resolved.validate()?;
        Ok(resolved)
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("scheme", &self.scheme)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("project_id", &self.project_id)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
