//! Interface de terminal do jobwatch: spinners e saída colorida.
//!
//! Usa as crates `indicatif` para spinners de progresso e `console` para
//! estilização com cores. O [`Progress`] acompanha visualmente uma operação
//! longa (tracking de job, reset do host) no terminal.

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use jobwatch::power::{PowerState, ResetOutcome};
use jobwatch::tracking::{TrackingOutcome, TrackingReport, TrackingResult};

/// Indicador visual de progresso para uma operação no terminal.
///
/// Exibe um spinner animado durante a espera e mensagens coloridas para
/// sucesso (verde), falha (vermelho) e timeout (amarelo).
pub struct Progress {
    pb: ProgressBar,
    green: Style,
    red: Style,
    yellow: Style,
}

impl Progress {
    /// Inicia o spinner com a mensagem fornecida.
    pub fn start(message: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        // O template é constante; se falhar, fica o estilo padrão.
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg} [{elapsed}]") {
            pb.set_style(style);
        }
        pb.set_message(message.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));

        Self {
            pb,
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
            yellow: Style::new().yellow(),
        }
    }

    /// Finaliza o spinner e mostra o resultado do tracking.
    pub fn finish_tracking(&self, result: &TrackingResult) {
        self.pb.finish_and_clear();
        match result.outcome {
            TrackingOutcome::Completed => {
                println!("  {} {}", self.green.apply_to("✓"), result.message);
            }
            TrackingOutcome::TimedOut => {
                println!(
                    "  {} Job still running after {}s ({} polls)",
                    self.yellow.apply_to("⏱"),
                    result.elapsed_wait.as_secs(),
                    result.polls
                );
            }
            _ => {
                println!("  {} {}", self.red.apply_to("✗"), result.message);
            }
        }
    }

    /// Finaliza o spinner e mostra o resultado do reset do host.
    pub fn finish_reset(&self, outcome: &ResetOutcome) {
        self.pb.finish_and_clear();
        let actions: Vec<&str> = outcome.actions.iter().map(|a| a.as_str()).collect();
        if outcome.escalated {
            println!(
                "  {} Graceful shutdown did not converge, ForceOff was issued",
                self.yellow.apply_to("↻")
            );
        }
        if outcome.success {
            println!(
                "  {} Host is {} (actions: {})",
                self.green.apply_to("✓"),
                outcome.final_state,
                actions.join(" → ")
            );
        } else {
            let reason = outcome
                .error
                .clone()
                .unwrap_or_else(|| format!("host stayed {}", outcome.final_state));
            println!("  {} Reset failed: {reason}", self.red.apply_to("✗"));
        }
    }

    pub fn finish_wait(&self, waited: Option<std::time::Duration>) {
        self.pb.finish_and_clear();
        match waited {
            Some(d) => println!(
                "  {} Controller responsive after {}s",
                self.green.apply_to("✓"),
                d.as_secs()
            ),
            None => println!("  {} Controller did not come back", self.red.apply_to("✗")),
        }
    }

    /// Imprime o relatório do job em JSON com estilo colorido.
    pub fn print_report(&self, report: &TrackingReport) {
        let style = if report.failed { &self.red } else { &self.green };
        println!();
        println!("{}", style.apply_to("─── Job Report ───"));
        println!(
            "{}",
            serde_json::to_string_pretty(report).unwrap_or_default()
        );
    }
}

/// Imprime o estado de energia com a cor correspondente.
pub fn print_power_state(state: PowerState) {
    let style = match state {
        PowerState::On => Style::new().green().bold(),
        PowerState::Off => Style::new().red().bold(),
        _ => Style::new().yellow(),
    };
    println!("  Power state: {}", style.apply_to(state));
}
