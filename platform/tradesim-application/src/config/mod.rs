use crate::ingestion::gateway::DEFAULT_CONNECT_RETRY;
use crate::ingestion::Cadence;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tradesim_domain::services::chaos::FailureRates;

pub const SIMULATOR_HOST_ENV: &str = "DB_HOST";
pub const OPERATOR_HOST_ENV: &str = "DB_HOST_TOOL";

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct SimulatorConfig {
    pub db: DbConfig,
    pub chaos: ChaosConfig,
    pub cadence: CadenceConfig,
    pub metrics: MetricsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: String,
    pub connect_retry_secs: u64,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            name: "trading_db".to_string(),
            user: "user".to_string(),
            password: "password".to_string(),
            connect_retry_secs: DEFAULT_CONNECT_RETRY.as_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct ChaosConfig {
    pub marker_path: PathBuf,
    pub baseline_failure_rate: f64,
    pub elevated_failure_rate: f64,
    pub warn_every_iterations: u64,
}

impl Default for ChaosConfig {
    fn default() -> Self {
        let rates = FailureRates::default();
        Self {
            marker_path: PathBuf::from("chaos.flag"),
            baseline_failure_rate: rates.baseline,
            elevated_failure_rate: rates.elevated,
            warn_every_iterations: 20,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct CadenceConfig {
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for CadenceConfig {
    fn default() -> Self {
        Self {
            min_delay_ms: 100,
            max_delay_ms: 1500,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct MetricsConfig {
    pub listen_addr: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8000".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct LoggingConfig {
    pub dir: PathBuf,
    pub file_name: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("logs"),
            file_name: "simulator.log".to_string(),
        }
    }
}

impl DbConfig {
    /// Overrides connection fields from `DB_NAME`, `DB_USER`, `DB_PASS` and
    /// the given host variable. Blank values are ignored.
    pub fn apply_env<F>(&mut self, host_var: &str, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        if let Some(host) = read(host_var) {
            self.host = host;
        }
        if let Some(name) = read("DB_NAME") {
            self.name = name;
        }
        if let Some(user) = read("DB_USER") {
            self.user = user;
        }
        if let Some(password) = read("DB_PASS") {
            self.password = password;
        }
    }

    /// libpq key/value connection string.
    pub fn connection_string(&self) -> String {
        format!(
            "host={} port={} dbname={} user={} password={}",
            quote_conn_value(&self.host),
            self.port,
            quote_conn_value(&self.name),
            quote_conn_value(&self.user),
            quote_conn_value(&self.password)
        )
    }

    /// Same as `connection_string` without the password, for logs.
    pub fn describe(&self) -> String {
        format!(
            "host={} port={} dbname={} user={}",
            self.host, self.port, self.name, self.user
        )
    }

    pub fn connect_retry(&self) -> Duration {
        Duration::from_secs(self.connect_retry_secs)
    }
}

fn quote_conn_value(raw: &str) -> String {
    let escaped = raw.replace('\\', "\\\\").replace('\'', "\\'");
    format!("'{escaped}'")
}

impl SimulatorConfig {
    pub fn failure_rates(&self) -> Result<FailureRates, String> {
        FailureRates::new(
            self.chaos.baseline_failure_rate,
            self.chaos.elevated_failure_rate,
        )
    }

    pub fn cadence(&self) -> Result<Cadence, String> {
        Cadence::new(
            Duration::from_millis(self.cadence.min_delay_ms),
            Duration::from_millis(self.cadence.max_delay_ms),
            self.chaos.warn_every_iterations,
        )
    }

    pub fn log_file_path(&self) -> PathBuf {
        self.logging.dir.join(&self.logging.file_name)
    }

    pub fn validate(&self) -> Result<(), String> {
        self.failure_rates()?;
        self.cadence()?;
        if self.db.host.trim().is_empty() {
            return Err("db.host is empty".to_string());
        }
        if self.metrics.listen_addr.trim().is_empty() {
            return Err("metrics.listen_addr is empty".to_string());
        }
        if self.logging.file_name.trim().is_empty() {
            return Err("logging.file_name is empty".to_string());
        }
        Ok(())
    }
}

pub fn load_config(path: &Path) -> Result<SimulatorConfig, String> {
    let contents = fs::read_to_string(path)
        .map_err(|err| format!("failed to read config {}: {}", path.display(), err))?;
    toml::from_str(&contents)
        .map_err(|err| format!("failed to parse TOML {}: {}", path.display(), err))
}

/// Defaults, then the optional TOML file, then environment overrides.
pub fn resolve_config<F>(
    path: Option<&Path>,
    host_var: &str,
    lookup: F,
) -> Result<SimulatorConfig, String>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => load_config(path)?,
        None => SimulatorConfig::default(),
    };
    config.db.apply_env(host_var, lookup);
    config.validate()?;
    Ok(config)
}
