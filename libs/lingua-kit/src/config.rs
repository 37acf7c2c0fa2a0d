//! Layered application configuration.
//!
//! Sources, lowest to highest precedence:
//! 1. compiled defaults
//! 2. YAML file (`--config`)
//! 3. environment `APP__SECTION__KEY` (e.g. `APP__SERVER__BIND_ADDR`)
//! 4. `ConnectionStrings__Lingua` / `ConnectionStrings__DefaultConnection`
//!    for the database DSN
//! 5. CLI overrides (`--port`, `--mock`, `-v`)

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Yaml},
};
use lingua_db::{DbConfig, redact_credentials_in_dsn};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub const ENV_PREFIX: &str = "APP__";

/// DSN overrides, checked in order; the named one wins.
pub const CONNECTION_STRING_VARS: [&str; 2] = [
    "ConnectionStrings__Lingua",
    "ConnectionStrings__DefaultConnection",
];

const REDACTED: &str = "[REDACTED]";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file does not exist: {}", .0.display())]
    MissingFile(PathBuf),
    #[error(transparent)]
    Figment(#[from] Box<figment::Error>),
    #[error("configuration of module '{module}' is invalid: {source}")]
    Module {
        module: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error("failed to render configuration: {0}")]
    Render(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    #[default]
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_development(self) -> bool {
        matches!(self, Self::Development)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub environment: Environment,
    /// Per-request timeout.
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_owned(),
            environment: Environment::Production,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `lingua=debug,sea_orm=warn`.
    /// `RUST_LOG` takes precedence when set.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: LogFormat::Text,
        }
    }
}

/// One accepted bearer token.
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TokenConfig {
    pub subject: String,
    #[serde(serialize_with = "serialize_redacted", deserialize_with = "deserialize_secret")]
    pub token: SecretString,
}

impl Clone for TokenConfig {
    fn clone(&self) -> Self {
        Self {
            subject: self.subject.clone(),
            token: SecretString::from(self.token.expose_secret().to_owned()),
        }
    }
}

fn serialize_redacted<S: Serializer>(_: &SecretString, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(REDACTED)
}

fn deserialize_secret<'de, D: Deserializer<'de>>(d: D) -> Result<SecretString, D::Error> {
    String::deserialize(d).map(SecretString::from)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    /// Skip the bearer check entirely; every caller is `anonymous`.
    pub disabled: bool,
    pub tokens: Vec<TokenConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OpenApiConfig {
    pub title: String,
    pub version: String,
    pub description: Option<String>,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    /// Advertised as the first server entry when set.
    pub public_url: Option<String>,
}

impl Default for OpenApiConfig {
    fn default() -> Self {
        Self {
            title: "Lingua API".to_owned(),
            version: "v1".to_owned(),
            description: Some("Per-entity, per-property translations keyed by culture.".to_owned()),
            contact_name: None,
            contact_email: None,
            public_url: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DbConfig,
    pub logging: LoggingConfig,
    pub auth: AuthConfig,
    pub openapi: OpenApiConfig,
    /// Per-module sections, parsed by the owning module via
    /// [`AppConfig::module_config`].
    pub modules: BTreeMap<String, serde_json::Value>,
}

/// Overrides coming from the command line.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub port: Option<u16>,
    /// `-v` count: 1 info, 2 debug, 3+ trace.
    pub verbose: u8,
    /// Use an in-memory `SQLite` database.
    pub mock: bool,
}

impl AppConfig {
    /// Defaults, then YAML (if given), then `APP__*` env, then connection
    /// string env. Validates the result.
    ///
    /// # Errors
    /// Missing file, malformed YAML or env values, unknown keys, or a
    /// failed [`AppConfig::validate`].
    pub fn load_layered(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            if !path.is_file() {
                return Err(ConfigError::MissingFile(path.to_path_buf()));
            }
            figment = figment.merge(Yaml::file(path));
        }
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        let mut cfg: Self = figment.extract().map_err(Box::new)?;
        cfg.apply_connection_string_env();
        cfg.validate()?;
        Ok(cfg)
    }

    fn apply_connection_string_env(&mut self) {
        let found = CONNECTION_STRING_VARS.iter().find_map(|name| {
            std::env::var(name)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(|v| (*name, v))
        });
        if let Some((name, dsn)) = found {
            tracing::debug!(source = name, "database DSN taken from environment");
            self.database.dsn = dsn;
        }
    }

    pub fn apply_cli_overrides(&mut self, cli: &CliOverrides) {
        if let Some(port) = cli.port {
            self.server.bind_addr = with_port(&self.server.bind_addr, port);
        }
        match cli.verbose {
            0 => {}
            1 => "info".clone_into(&mut self.logging.level),
            2 => "debug".clone_into(&mut self.logging.level),
            _ => "trace".clone_into(&mut self.logging.level),
        }
        if cli.mock {
            let auto_migrate = self.database.auto_migrate;
            self.database = DbConfig {
                auto_migrate,
                ..DbConfig::in_memory()
            };
        }
    }

    /// # Errors
    /// `ConfigError::Invalid` naming the first offending setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.bind_addr.parse::<SocketAddr>().map_err(|e| {
            ConfigError::Invalid(format!(
                "server.bind_addr '{}' is not a socket address: {e}",
                self.server.bind_addr
            ))
        })?;
        if self.server.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "server.timeout_secs must be greater than 0".to_owned(),
            ));
        }
        if self.database.dsn.trim().is_empty() {
            return Err(ConfigError::Invalid("database.dsn must not be empty".to_owned()));
        }
        let max = self.database.max_conns;
        if max == 0 || self.database.min_conns.is_some_and(|min| min > max) {
            let min = self.database.min_conns.unwrap_or_default();
            return Err(ConfigError::Invalid(format!(
                "database pool bounds are inconsistent (min {min}, max {max})"
            )));
        }
        for (i, t) in self.auth.tokens.iter().enumerate() {
            if t.subject.trim().is_empty() || t.token.expose_secret().trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "auth.tokens[{i}] needs a non-empty subject and token"
                )));
            }
        }
        Ok(())
    }

    /// Typed view of `modules.<name>`; the module's defaults when absent.
    ///
    /// # Errors
    /// `ConfigError::Module` when the section does not match `T`.
    pub fn module_config<T>(&self, name: &str) -> Result<T, ConfigError>
    where
        T: DeserializeOwned + Default,
    {
        match self.modules.get(name) {
            None | Some(serde_json::Value::Null) => Ok(T::default()),
            Some(v) => serde_json::from_value(v.clone()).map_err(|source| ConfigError::Module {
                module: name.to_owned(),
                source,
            }),
        }
    }

    /// Effective configuration as YAML with tokens and DSN passwords masked.
    ///
    /// # Errors
    /// Serialization failure.
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        let mut shown = self.clone();
        shown.database.dsn = redact_credentials_in_dsn(&self.database.dsn);
        Ok(serde_yaml::to_string(&shown)?)
    }
}

fn with_port(bind_addr: &str, port: u16) -> String {
    if let Ok(mut addr) = bind_addr.parse::<SocketAddr>() {
        addr.set_port(port);
        return addr.to_string();
    }
    let host = bind_addr.rsplit_once(':').map_or(bind_addr, |(h, _)| h);
    format!("{host}:{port}")
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use figment::Jail;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    #[serde(default)]
    struct SampleModule {
        page_size: u64,
    }

    fn load(path: Option<&Path>) -> Result<AppConfig, figment::Error> {
        AppConfig::load_layered(path).map_err(|e| figment::Error::from(e.to_string()))
    }

    #[test]
    fn defaults_are_valid() {
        Jail::expect_with(|_jail| {
            let cfg = load(None)?;
            assert_eq!(cfg.server.bind_addr, "127.0.0.1:8080");
            assert_eq!(cfg.server.environment, Environment::Production);
            assert!(!cfg.auth.disabled);
            assert!(cfg.modules.is_empty());
            Ok(())
        });
    }

    #[test]
    fn yaml_then_env_then_cli() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "lingua.yaml",
                r"
server:
  bind_addr: 0.0.0.0:9000
  environment: development
logging:
  level: warn
modules:
  sample:
    page_size: 25
",
            )?;
            jail.set_env("APP__LOGGING__LEVEL", "debug");
            jail.set_env("APP__SERVER__BIND_ADDR", "127.0.0.1:9100");

            let mut cfg = load(Some(Path::new("lingua.yaml")))?;
            assert_eq!(cfg.server.environment, Environment::Development);
            assert_eq!(cfg.logging.level, "debug");
            assert_eq!(cfg.server.bind_addr, "127.0.0.1:9100");
            let sample: SampleModule = cfg.module_config("sample").map_err(|e| e.to_string())?;
            assert_eq!(sample.page_size, 25);

            cfg.apply_cli_overrides(&CliOverrides {
                port: Some(7000),
                verbose: 3,
                mock: true,
            });
            assert_eq!(cfg.server.bind_addr, "127.0.0.1:7000");
            assert_eq!(cfg.logging.level, "trace");
            assert!(cfg.database.is_memory());
            Ok(())
        });
    }

    #[test]
    fn named_connection_string_wins() {
        Jail::expect_with(|jail| {
            jail.set_env("ConnectionStrings__DefaultConnection", "sqlite://default.db");
            let cfg = load(None)?;
            assert_eq!(cfg.database.dsn, "sqlite://default.db");

            jail.set_env("ConnectionStrings__Lingua", "sqlite://named.db");
            let cfg = load(None)?;
            assert_eq!(cfg.database.dsn, "sqlite://named.db");
            Ok(())
        });
    }

    #[test]
    fn missing_file_and_unknown_keys_are_rejected() {
        Jail::expect_with(|jail| {
            assert!(matches!(
                AppConfig::load_layered(Some(Path::new("nope.yaml"))),
                Err(ConfigError::MissingFile(_))
            ));

            jail.create_file("bad.yaml", "server:\n  bind_adr: 127.0.0.1:1\n")?;
            assert!(matches!(
                AppConfig::load_layered(Some(Path::new("bad.yaml"))),
                Err(ConfigError::Figment(_))
            ));
            Ok(())
        });
    }

    #[test]
    fn validation_catches_bad_values() {
        let mut cfg = AppConfig::default();
        cfg.server.bind_addr = "not-an-addr".to_owned();
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));

        let mut cfg = AppConfig::default();
        cfg.server.timeout_secs = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = AppConfig::default();
        cfg.auth.tokens.push(TokenConfig {
            subject: "svc".to_owned(),
            token: SecretString::from(String::new()),
        });
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn yaml_output_hides_secrets() {
        let mut cfg = AppConfig::default();
        cfg.database.dsn = "postgres://lingua:hunter2@db:5432/lingua".to_owned();
        cfg.auth.tokens.push(TokenConfig {
            subject: "svc".to_owned(),
            token: SecretString::from("t0ps3cret".to_owned()),
        });

        let yaml = cfg.to_yaml().unwrap();
        assert!(!yaml.contains("hunter2"));
        assert!(!yaml.contains("t0ps3cret"));
        assert!(yaml.contains(REDACTED));
        assert!(yaml.contains("subject: svc"));
    }

    #[test]
    fn port_override_keeps_host() {
        assert_eq!(with_port("0.0.0.0:8080", 9000), "0.0.0.0:9000");
        assert_eq!(with_port("[::1]:8080", 9000), "[::1]:9000");
        assert_eq!(with_port("localhost:8080", 9000), "localhost:9000");
    }
}
