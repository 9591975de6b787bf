use thiserror::Error;

use super::config::ConfigError;
use super::integrator::IntegratorState;
use super::output::OutputError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid configuration: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Output failed: {source}")]
    Output {
        #[from]
        source: OutputError,
    },

    #[error("Integrator is {state:?}; cannot {action}")]
    InvalidState {
        state: IntegratorState,
        action: &'static str,
    },
}
