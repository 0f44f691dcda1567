//! Interface de linha de comando do jobwatch baseada em clap.
//!
//! Define a struct [`Cli`] com subcomandos [`Command`] (track, reset-host,
//! power-state, wait-ready) e flags globais (--config, --verbose).

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use jobwatch::power::ResetType;
use jobwatch::tracking::JobStateClassification;

pub const DEFAULT_SYSTEM_URI: &str = "/redfish/v1/Systems/System.Embedded.1";

/// jobwatch: acompanha jobs e transições de energia no iDRAC e no OME.
#[derive(Debug, Parser)]
#[command(name = "jobwatch", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Caminho para o arquivo de configuração (padrão: ./jobwatch.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Habilita saída detalhada (verbose).
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

/// Vocabulário de estados do backend, mapeado para [`JobStateClassification`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DialectArg {
    /// OpenManage Enterprise: códigos numéricos em `LastRunStatus.Id`.
    Ome,
    /// iDRAC Redfish: nomes em `JobState`.
    Idrac,
}

impl DialectArg {
    pub fn classification(self) -> JobStateClassification {
        match self {
            DialectArg::Ome => JobStateClassification::ome(),
            DialectArg::Idrac => JobStateClassification::idrac(),
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Acompanha um job até concluir, falhar ou estourar o tempo.
    Track {
        /// URI do recurso de status do job.
        uri: String,

        #[arg(long, value_enum, default_value_t = DialectArg::Idrac)]
        dialect: DialectArg,

        /// Sobrescreve `job.max_wait_secs`.
        #[arg(long)]
        max_wait: Option<u64>,

        /// Sobrescreve `job.poll_interval_secs`.
        #[arg(long)]
        poll_interval: Option<u64>,
    },

    /// Reinicia (ou desliga) o host, escalando para ForceOff se necessário.
    ResetHost {
        /// ResetType do Redfish, ex.: GracefulRestart, ForceRestart, ForceOff.
        reset_type: ResetType,

        #[arg(long, default_value = DEFAULT_SYSTEM_URI)]
        system: String,

        /// Recurso de onde ler `PowerState` (padrão: o mesmo de --system).
        #[arg(long)]
        power: Option<String>,
    },

    /// Mostra o estado de energia atual.
    PowerState {
        #[arg(long, default_value = DEFAULT_SYSTEM_URI)]
        power: String,
    },

    /// Espera o controlador voltar a responder após um reset.
    WaitReady {
        #[arg(long, default_value = "/redfish/v1")]
        uri: String,
    },
}
