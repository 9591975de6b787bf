use mdsim::engine::config::SimulationConfig;
use std::path::PathBuf;

pub struct AppConfig {
    /// The config file the settings were read from, if any.
    pub source: Option<PathBuf>,
    pub simulation: SimulationConfig,
}
