//! Configuração do jobwatch carregada a partir de `jobwatch.toml`.
//!
//! A struct [`JobwatchConfig`] contém o endereço do controlador, as
//! credenciais e os orçamentos de polling. Valores não presentes no arquivo
//! usam os defaults dos módulos de tracking e de energia.
//! A variável de ambiente `JOBWATCH_PASSWORD` tem precedência sobre o arquivo.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::error::ConfigError;
use crate::power::PowerPollPolicy;
use crate::tracking::PollingPolicy;

const DEFAULT_PATH: &str = "jobwatch.toml";
const PASSWORD_ENV: &str = "JOBWATCH_PASSWORD";

/// Configuração de nível superior carregada de `jobwatch.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct JobwatchConfig {
    /// URL base do iDRAC ou do OME, ex.: `https://192.168.0.120`.
    #[serde(default)]
    pub base_url: String,

    #[serde(default = "default_username")]
    pub username: String,

    #[serde(default)]
    pub password: String,

    /// Desligue apenas para controladores com certificado autoassinado.
    #[serde(default = "default_validate_certs")]
    pub validate_certs: bool,

    /// Timeout de cada requisição HTTP, em segundos.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Nível de log usado quando `RUST_LOG` não está definido.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub job: JobSection,

    #[serde(default)]
    pub power: PowerSection,
}

/// Orçamento de polling de jobs (`[job]`).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct JobSection {
    pub max_wait_secs: u64,
    pub poll_interval_secs: u64,
    pub max_unresponsive_secs: u64,
    pub initial_delay_secs: u64,
}

impl Default for JobSection {
    fn default() -> Self {
        let policy = PollingPolicy::default();
        Self {
            max_wait_secs: policy.max_wait.as_secs(),
            poll_interval_secs: policy.poll_interval.as_secs(),
            max_unresponsive_secs: policy.max_unresponsive.as_secs(),
            initial_delay_secs: policy.initial_delay.as_secs(),
        }
    }
}

/// Orçamento de polling de estado de energia (`[power]`).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PowerSection {
    pub retries: u32,
    pub interval_secs: u64,
    pub escalation_delay_secs: u64,
}

impl Default for PowerSection {
    fn default() -> Self {
        let policy = PowerPollPolicy::default();
        Self {
            retries: policy.retries,
            interval_secs: policy.interval.as_secs(),
            escalation_delay_secs: policy.escalation_delay.as_secs(),
        }
    }
}

// Usuário padrão de fábrica do iDRAC.
fn default_username() -> String {
    "root".to_string()
}

fn default_validate_certs() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for JobwatchConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            username: default_username(),
            password: String::new(),
            validate_certs: default_validate_certs(),
            timeout_secs: default_timeout_secs(),
            log_level: default_log_level(),
            job: JobSection::default(),
            power: PowerSection::default(),
        }
    }
}

impl JobwatchConfig {
    /// Carrega `jobwatch.toml` do diretório atual.
    /// Usa valores padrão se o arquivo não existir.
    pub fn load() -> Result<Self> {
        let path = Path::new(DEFAULT_PATH);
        let config = if path.exists() {
            Self::parse_file(path)?
        } else {
            Self::default()
        };
        Ok(config.with_password_override(std::env::var(PASSWORD_ENV).ok()))
    }

    /// Carrega um arquivo explícito (`--config`). O arquivo precisa existir.
    pub fn load_from(path: &Path) -> Result<Self> {
        let config = Self::parse_file(path)?;
        Ok(config.with_password_override(std::env::var(PASSWORD_ENV).ok()))
    }

    fn parse_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("read {}", path.display()))?;
        let config = toml::from_str::<JobwatchConfig>(&contents)
            .with_context(|| format!("parse {}", path.display()))?;
        Ok(config)
    }

    // A variável de ambiente vence o arquivo, desde que não esteja vazia.
    fn with_password_override(mut self, password: Option<String>) -> Self {
        if let Some(password) = password.filter(|p| !p.is_empty()) {
            self.password = password;
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::MissingBaseUrl);
        }
        if self.job.poll_interval_secs == 0 {
            return Err(ConfigError::ZeroPollInterval);
        }
        if self.power.interval_secs == 0 {
            return Err(ConfigError::ZeroPowerInterval);
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn polling_policy(&self) -> PollingPolicy {
        PollingPolicy {
            max_wait: Duration::from_secs(self.job.max_wait_secs),
            poll_interval: Duration::from_secs(self.job.poll_interval_secs),
            initial_delay: Duration::from_secs(self.job.initial_delay_secs),
            max_unresponsive: Duration::from_secs(self.job.max_unresponsive_secs),
        }
    }

    pub fn power_policy(&self) -> PowerPollPolicy {
        PowerPollPolicy {
            retries: self.power.retries,
            interval: Duration::from_secs(self.power.interval_secs),
            escalation_delay: Duration::from_secs(self.power.escalation_delay_secs),
        }
    }
}
