use mdsim::engine::config::{OutputFormat, SimulationConfig};
use mdsim::core::models::boundary::BoundaryShape;
use std::path::PathBuf;

/// Values used when neither a command-line flag nor the config file sets them.
pub struct DefaultsConfig {
    pub energy_output: PathBuf,
    pub geometry_output: PathBuf,
    pub desired_temperature: f64,
    pub total_time: f64,
    pub time_step: f64,
    pub random_seed: u64,
    pub boundary_shape: BoundaryShape,
    pub boundary_spring: f64,
    pub boundary_extent: f64,
    pub output_format: OutputFormat,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        let core = SimulationConfig::default();
        Self {
            energy_output: core.energy_output,
            geometry_output: core.geometry_output,
            desired_temperature: core.desired_temperature,
            total_time: core.total_time,
            time_step: core.time_step,
            random_seed: core.random_seed,
            boundary_shape: core.state.boundary.shape,
            boundary_spring: core.state.boundary.spring,
            boundary_extent: core.state.boundary.extent,
            output_format: core.output_format,
        }
    }
}
