//! [`Config`]-related definitions.

use std::time;

use config::{builder::DefaultState, ConfigBuilder, ConfigError};
use serde::Deserialize;
use service::domain::company;
use smart_default::SmartDefault;
use tracing as log;

/// Application configuration.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: Server,

    /// Service configuration.
    pub service: Service,

    /// Postgres configuration.
    pub postgres: Postgres,

    /// SMTP relay configuration.
    pub smtp: Smtp,

    /// Log configuration.
    pub log: Log,
}

impl Config {
    /// Creates a new [`Config`] by:
    /// - loading it from the provided `path` (if any);
    /// - merging it with the environment variables (if any);
    /// - using default values for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(path: impl AsRef<str>) -> Result<Self, ConfigError> {
        ConfigBuilder::<DefaultState>::default()
            .add_source(config::File::with_name(path.as_ref()).required(false))
            .add_source(config::Environment::with_prefix("CONF").separator("."))
            .build()?
            .try_deserialize()
    }
}

/// Server configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Server {
    /// Host to bind the server to.
    #[default("0.0.0.0".to_owned())]
    pub host: String,

    /// Port to bind the server to.
    #[default(8080)]
    pub port: u16,

    /// [CORS] configuration.
    ///
    /// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
    pub cors: Cors,
}

/// [CORS] configuration.
///
/// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Cors {
    /// List of allowed origins.
    #[default(vec!["*".to_owned()])]
    pub origins: Vec<String>,
}

/// Service configuration.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Service {
    /// Manifest report configuration.
    pub report: Report,

    /// `DispatchManifests` task configuration.
    pub dispatch: Dispatch,
}

impl From<Service> for service::Config {
    fn from(value: Service) -> Self {
        let Service {
            report: Report { column_width },
            dispatch,
        } = value;

        Self {
            column_width,
            dispatch: dispatch.into(),
        }
    }
}

/// Manifest report configuration.
#[derive(Clone, Copy, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Report {
    /// Width the text cells of the manifest sections are truncated to.
    #[default(24)]
    pub column_width: usize,
}

/// `DispatchManifests` task configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Dispatch {
    /// Indicator whether the manifests are dispatched at all.
    pub enabled: bool,

    /// Task execution interval.
    #[default(time::Duration::from_secs(60 * 15))]
    #[serde(with = "humantime_serde")]
    pub interval: time::Duration,

    /// Number of days ahead of today the dispatched manifests are compiled
    /// for.
    #[default(1)]
    pub days_ahead: u16,

    /// Address the manifests are sent from.
    #[default("operations@localhost.localdomain".to_owned())]
    pub from: String,
}

impl From<Dispatch> for Option<service::task::dispatch_manifests::Config> {
    fn from(value: Dispatch) -> Self {
        let Dispatch {
            enabled,
            interval,
            days_ahead,
            from,
        } = value;
        if !enabled {
            return None;
        }

        let Some(from) = company::Email::new(from.as_str()) else {
            log::error!(
                "`{from}` is not a valid sender address, manifests won't \
                 be dispatched",
            );
            return None;
        };
        Some(service::task::dispatch_manifests::Config {
            interval,
            days_ahead,
            from,
        })
    }
}

/// Postgres configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Postgres {
    /// Host to connect to.
    #[default("127.0.0.1".to_owned())]
    pub host: String,

    /// Port to connect to.
    #[default(5432)]
    pub port: u16,

    /// User to connect as.
    #[default("postgres".to_owned())]
    pub user: String,

    /// Password to connect with.
    #[default("postgres".to_owned())]
    pub password: String,

    /// Database name to connect to.
    #[default("postgres".to_owned())]
    pub dbname: String,
}

impl From<Postgres> for service::infra::postgres::Config {
    fn from(value: Postgres) -> Self {
        let Postgres {
            host,
            port,
            user,
            password,
            dbname,
        } = value;

        Self {
            host: Some(host),
            port: Some(port),
            user: Some(user),
            password: Some(password),
            dbname: Some(dbname),
            ..Self::default()
        }
    }
}

/// SMTP relay configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Smtp {
    /// Host of the relay.
    #[default("127.0.0.1".to_owned())]
    pub host: String,

    /// Port of the relay.
    #[default(25)]
    pub port: u16,

    /// User to authenticate as, if any.
    pub user: Option<String>,

    /// Password to authenticate with.
    pub password: Option<String>,

    /// Indicator whether the connection to the relay is secured with TLS.
    pub tls: bool,
}

impl From<Smtp> for service::infra::mail::smtp::Config {
    fn from(value: Smtp) -> Self {
        let Smtp {
            host,
            port,
            user,
            password,
            tls,
        } = value;

        Self {
            host,
            port,
            user,
            password,
            tls,
        }
    }
}

/// Log configuration.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Log {
    /// Log level.
    pub level: LogLevel,
}

/// Log level.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogLevel {
    /// Designates very low priority, often extremely verbose, information.
    Trace,

    /// Designates lower priority information.
    Debug,

    /// Designates useful information.
    #[default]
    Info,

    /// Designates hazardous situations.
    Warn,

    /// Designates very serious errors.
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
        }
    }
}
