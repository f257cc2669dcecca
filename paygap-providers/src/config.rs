//! Gateway configuration loaded from TOML.
//!
//! String values may reference environment variables with `$VAR` or `${VAR}`.
//! Unresolved references are left as written, so a missing secret surfaces
//! as an adapter validation error instead of an empty credential.
//!
//! # Example Configuration
//!
//! ```toml
//! [http]
//! timeout_secs = 15
//!
//! [zarinpal]
//! merchant_id = "$ZARINPAL_MERCHANT_ID"
//! sandbox = true
//!
//! [idpay]
//! api_key = "${IDPAY_API_KEY}"
//!
//! [payping]
//! api_token = "$PAYPING_TOKEN"
//! ```
//!
//! # Environment Variables
//!
//! - `PAYGAP_CONFIG` - Path to the configuration file (default: `paygap.toml`)
//! - Any variable referenced from the file; a `.env` file is loaded first if present

use std::path::{Path, PathBuf};
use std::time::Duration;

use paygap::{SharedTransport, Status, TransportError};
use paygap_http::{HttpTransport, HttpTransportConfig};
use serde::{Deserialize, Serialize};

use crate::Provider;
use crate::idpay::{IdPay, IdPayConfig};
use crate::payping::{PayPing, PayPingConfig};
use crate::zarinpal::{Zarinpal, ZarinpalConfig};

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "PAYGAP_CONFIG";
/// Configuration file used when [`CONFIG_ENV`] is unset.
pub const DEFAULT_CONFIG_PATH: &str = "paygap.toml";

/// Errors raised while loading configuration or building gateways from it.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file exists but could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The file that failed.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid TOML for [`GatewaysConfig`].
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
    /// The HTTP transport could not be created.
    #[error("failed to create http transport: {0}")]
    Transport(#[from] TransportError),
    /// A configured gateway rejected its settings.
    #[error("{provider}: {source}")]
    Gateway {
        /// Which gateway section failed.
        provider: &'static str,
        /// The configuration error.
        #[source]
        source: Status,
    },
}

/// Settings for the shared HTTP transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpSection {
    /// Per-request timeout in seconds (default: `30`).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// `User-Agent` override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl Default for HttpSection {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: None,
        }
    }
}

const fn default_timeout_secs() -> u64 {
    paygap_http::constants::DEFAULT_TIMEOUT_SECS
}

impl HttpSection {
    /// Converts the section into transport configuration.
    #[must_use]
    pub fn transport_config(&self) -> HttpTransportConfig {
        let config =
            HttpTransportConfig::default().with_timeout(Duration::from_secs(self.timeout_secs));
        match &self.user_agent {
            Some(agent) => config.with_user_agent(agent.clone()),
            None => config,
        }
    }
}

/// Top-level configuration. Every gateway section is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewaysConfig {
    /// Transport settings.
    #[serde(default)]
    pub http: HttpSection,

    /// Zarinpal credentials.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zarinpal: Option<ZarinpalConfig>,

    /// IDPay credentials.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idpay: Option<IdPayConfig>,

    /// PayPing credentials.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payping: Option<PayPingConfig>,
}

impl GatewaysConfig {
    /// Loads `.env` if present, then the file named by `PAYGAP_CONFIG`,
    /// falling back to `paygap.toml`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self, ConfigError> {
        // a missing .env is fine
        let _ = dotenvy::dotenv();
        let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_owned());
        Self::load_from(path)
    }

    /// Loads configuration from `path`. A missing file yields the defaults,
    /// which configure no gateways.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            #[cfg(feature = "telemetry")]
            tracing::debug!(path = %path.display(), "no gateway configuration file");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses configuration text, expanding environment references first.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for invalid TOML.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let expanded = expand_vars(content, |name| std::env::var(name).ok());
        Ok(toml::from_str(&expanded)?)
    }
}

/// The adapters built from a [`GatewaysConfig`], sharing one transport.
#[derive(Debug, Clone, Default)]
pub struct Gateways {
    /// Present when `[zarinpal]` is configured.
    pub zarinpal: Option<Zarinpal>,
    /// Present when `[idpay]` is configured.
    pub idpay: Option<IdPay>,
    /// Present when `[payping]` is configured.
    pub payping: Option<PayPing>,
}

impl Gateways {
    /// Builds every configured adapter on top of `transport`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Gateway`] for the first section with invalid
    /// settings.
    pub fn from_config(config: &GatewaysConfig, transport: &SharedTransport) -> Result<Self, ConfigError> {
        let zarinpal = config
            .zarinpal
            .clone()
            .map(|c| Zarinpal::builder().transport(transport.clone()).config(c).build())
            .transpose()
            .map_err(|source| ConfigError::Gateway {
                provider: "zarinpal",
                source,
            })?;
        let idpay = config
            .idpay
            .clone()
            .map(|c| IdPay::builder().transport(transport.clone()).config(c).build())
            .transpose()
            .map_err(|source| ConfigError::Gateway {
                provider: "idpay",
                source,
            })?;
        let payping = config
            .payping
            .clone()
            .map(|c| PayPing::builder().transport(transport.clone()).config(c).build())
            .transpose()
            .map_err(|source| ConfigError::Gateway {
                provider: "payping",
                source,
            })?;

        let gateways = Self {
            zarinpal,
            idpay,
            payping,
        };
        #[cfg(feature = "telemetry")]
        for provider in gateways.configured() {
            tracing::info!(
                provider = provider.name(),
                base_url = provider.base_url(),
                sandbox = provider.is_sandbox(),
                "gateway configured"
            );
        }
        Ok(gateways)
    }

    /// Creates an [`HttpTransport`] from the `[http]` section and builds
    /// every configured adapter on it.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport cannot be created or a gateway
    /// section is invalid.
    pub fn connect(config: &GatewaysConfig) -> Result<Self, ConfigError> {
        let transport = HttpTransport::new(config.http.transport_config())?.shared();
        Self::from_config(config, &transport)
    }

    /// Returns the configured adapters.
    #[must_use]
    pub fn configured(&self) -> Vec<&dyn Provider> {
        let mut providers: Vec<&dyn Provider> = Vec::with_capacity(3);
        if let Some(z) = &self.zarinpal {
            providers.push(z);
        }
        if let Some(i) = &self.idpay {
            providers.push(i);
        }
        if let Some(p) = &self.payping {
            providers.push(p);
        }
        providers
    }
}

/// Expands `$VAR` and `${VAR}` patterns using `lookup`.
///
/// Unresolved variables are left as-is.
fn expand_vars<F>(input: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '$' {
            result.push(ch);
            continue;
        }
        let braced = chars.next_if_eq(&'{').is_some();

        let mut name = String::new();
        let mut closed = false;
        while let Some(&c) = chars.peek() {
            if braced && c == '}' {
                chars.next();
                closed = true;
                break;
            }
            if !braced && !c.is_ascii_alphanumeric() && c != '_' {
                break;
            }
            name.push(c);
            chars.next();
        }

        match lookup(&name).filter(|_| !name.is_empty() && (closed || !braced)) {
            Some(value) => result.push_str(&value),
            None => {
                result.push('$');
                if braced {
                    result.push('{');
                }
                result.push_str(&name);
                if closed {
                    result.push('}');
                }
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use paygap::ErrorKind;
    use paygap::transport::stub::StubTransport;

    use super::*;

    fn env(name: &str) -> Option<String> {
        match name {
            "MERCHANT" => Some("1344b5d4-0048-11e8-94db-005056a205be".to_owned()),
            "TOKEN" => Some("secret-token-123".to_owned()),
            _ => None,
        }
    }

    #[test]
    fn expands_plain_and_braced_references() {
        assert_eq!(
            expand_vars("a=$MERCHANT b=${TOKEN}!", env),
            "a=1344b5d4-0048-11e8-94db-005056a205be b=secret-token-123!"
        );
    }

    #[test]
    fn leaves_unresolved_references_intact() {
        assert_eq!(expand_vars("$MISSING ${ALSO_MISSING}", env), "$MISSING ${ALSO_MISSING}");
        assert_eq!(expand_vars("cost: 5$ and ${TOKEN", env), "cost: 5$ and ${TOKEN");
        assert_eq!(expand_vars("${}", env), "${}");
    }

    #[test]
    fn parses_sections_with_defaults() {
        let config = GatewaysConfig::from_toml_str(
            r#"
            [zarinpal]
            merchant_id = "1344b5d4-0048-11e8-94db-005056a205be"
            sandbox = true

            [payping]
            api_token = "secret-token-123"
            "#,
        )
        .unwrap();
        assert_eq!(config.http, HttpSection::default());
        assert_eq!(config.http.timeout_secs, 30);
        assert!(config.zarinpal.as_ref().is_some_and(|z| z.sandbox));
        assert!(config.idpay.is_none());
    }

    #[test]
    fn missing_file_configures_nothing() {
        let config = GatewaysConfig::load_from("/nonexistent/paygap.toml").unwrap();
        assert_eq!(config, GatewaysConfig::default());
    }

    #[test]
    fn invalid_toml_is_parse_error() {
        let err = GatewaysConfig::from_toml_str("[zarinpal\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)), "{err:?}");
    }

    #[test]
    fn builds_only_configured_gateways() {
        let config = GatewaysConfig {
            zarinpal: Some(ZarinpalConfig {
                merchant_id: "1344b5d4-0048-11e8-94db-005056a205be".into(),
                sandbox: true,
                base_url: None,
            }),
            ..Default::default()
        };
        let transport: SharedTransport = Arc::new(StubTransport::replying(200, "{}"));
        let gateways = Gateways::from_config(&config, &transport).unwrap();
        assert!(gateways.idpay.is_none());
        let names: Vec<_> = gateways.configured().iter().map(|p| p.name()).collect();
        assert_eq!(names, ["zarinpal"]);
    }

    #[test]
    fn unresolved_secret_fails_validation() {
        let config = GatewaysConfig::from_toml_str(
            r#"
            [idpay]
            api_key = "$IDPAY_KEY_THAT_IS_NOT_SET_ANYWHERE"
            "#,
        )
        .unwrap();
        let transport: SharedTransport = Arc::new(StubTransport::replying(200, "{}"));
        match Gateways::from_config(&config, &transport).unwrap_err() {
            ConfigError::Gateway { provider, source } => {
                assert_eq!(provider, "idpay");
                assert_eq!(source.kind(), ErrorKind::Configuration);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}
