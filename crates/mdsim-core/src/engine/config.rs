use crate::core::models::boundary::{Boundary, BoundaryShape, DEFAULT_BOUNDARY_SPRING};
use nalgebra::Point3;
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

pub use crate::core::io::energy::OutputFormat;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// How per-atom gradients are obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradientMode {
    #[default]
    Analytic,
    /// Central finite differences of the potential energy. Slow; for validation.
    Numerical,
}

/// Which velocity enters the kinetic energy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KineticMode {
    #[default]
    Current,
    /// Average of the current and previous half-step velocities.
    Leapfrog,
}

/// Implementation used for the non-bonded pair sum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Scalar,
    Parallel,
}

impl Default for BackendKind {
    fn default() -> Self {
        if cfg!(feature = "parallel") {
            Self::Parallel
        } else {
            Self::Scalar
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown {kind} '{value}'")]
pub struct ParseModeError {
    pub kind: &'static str,
    pub value: String,
}

impl FromStr for GradientMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "analytic" | "analytical" => Ok(Self::Analytic),
            "numeric" | "numerical" => Ok(Self::Numerical),
            _ => Err(ParseModeError {
                kind: "gradient mode",
                value: s.to_string(),
            }),
        }
    }
}

impl FromStr for BackendKind {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "scalar" => Ok(Self::Scalar),
            "parallel" => Ok(Self::Parallel),
            _ => Err(ParseModeError {
                kind: "non-bonded backend",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for GradientMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Analytic => write!(f, "analytic"),
            Self::Numerical => write!(f, "numerical"),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar => write!(f, "scalar"),
            Self::Parallel => write!(f, "parallel"),
        }
    }
}

/// Settings of the molecular state that are fixed at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct StateConfig {
    pub dielectric: f64,
    pub boundary: Boundary,
    pub backend: BackendKind,
    pub infer_bonds: bool,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            dielectric: 1.0,
            boundary: Boundary::default(),
            backend: BackendKind::default(),
            infer_bonds: true,
        }
    }
}

/// Complete configuration of a molecular-dynamics run. Times are in
/// picoseconds except `status_wait_time`, which is wall-clock seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub input_path: PathBuf,
    pub forcefield_path: Option<PathBuf>,
    pub energy_output: PathBuf,
    pub geometry_output: PathBuf,
    pub desired_temperature: f64,
    pub desired_pressure: f64,
    pub total_time: f64,
    pub time_step: f64,
    pub energy_wait_time: f64,
    pub geometry_wait_time: f64,
    pub status_wait_time: f64,
    pub equilibration_time: f64,
    pub equilibration_rate: f64,
    pub random_seed: u64,
    pub gradient_mode: GradientMode,
    pub state: StateConfig,
    pub output_format: OutputFormat,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::new(),
            forcefield_path: None,
            energy_output: PathBuf::from("energy.dat"),
            geometry_output: PathBuf::from("geometry.xyz"),
            desired_temperature: 298.15,
            desired_pressure: 1.0,
            total_time: 0.5,
            time_step: 0.0005,
            energy_wait_time: 0.001,
            geometry_wait_time: 0.001,
            status_wait_time: 5.0,
            equilibration_time: 0.0,
            equilibration_rate: 2.0,
            random_seed: 0,
            gradient_mode: GradientMode::default(),
            state: StateConfig {
                boundary: Boundary {
                    shape: BoundaryShape::Sphere,
                    spring: DEFAULT_BOUNDARY_SPRING,
                    extent: 10.0,
                    origin: Point3::origin(),
                },
                ..StateConfig::default()
            },
            output_format: OutputFormat::default(),
        }
    }
}

impl SimulationConfig {
    pub fn builder() -> SimulationConfigBuilder {
        SimulationConfigBuilder::new()
    }
}

#[derive(Default)]
pub struct SimulationConfigBuilder {
    input_path: Option<PathBuf>,
    forcefield_path: Option<PathBuf>,
    energy_output: Option<PathBuf>,
    geometry_output: Option<PathBuf>,
    desired_temperature: Option<f64>,
    desired_pressure: Option<f64>,
    total_time: Option<f64>,
    time_step: Option<f64>,
    energy_wait_time: Option<f64>,
    geometry_wait_time: Option<f64>,
    status_wait_time: Option<f64>,
    equilibration_time: Option<f64>,
    equilibration_rate: Option<f64>,
    random_seed: Option<u64>,
    gradient_mode: Option<GradientMode>,
    dielectric: Option<f64>,
    boundary_shape: Option<BoundaryShape>,
    boundary_spring: Option<f64>,
    boundary_extent: Option<f64>,
    boundary_origin: Option<Point3<f64>>,
    backend: Option<BackendKind>,
    infer_bonds: Option<bool>,
    output_format: Option<OutputFormat>,
}

impl SimulationConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input_path(mut self, path: PathBuf) -> Self {
        self.input_path = Some(path);
        self
    }
    pub fn forcefield_path(mut self, path: Option<PathBuf>) -> Self {
        self.forcefield_path = path;
        self
    }
    pub fn energy_output(mut self, path: PathBuf) -> Self {
        self.energy_output = Some(path);
        self
    }
    pub fn geometry_output(mut self, path: PathBuf) -> Self {
        self.geometry_output = Some(path);
        self
    }
    pub fn desired_temperature(mut self, kelvin: f64) -> Self {
        self.desired_temperature = Some(kelvin);
        self
    }
    pub fn desired_pressure(mut self, pressure: f64) -> Self {
        self.desired_pressure = Some(pressure);
        self
    }
    pub fn total_time(mut self, ps: f64) -> Self {
        self.total_time = Some(ps);
        self
    }
    pub fn time_step(mut self, ps: f64) -> Self {
        self.time_step = Some(ps);
        self
    }
    pub fn energy_wait_time(mut self, ps: f64) -> Self {
        self.energy_wait_time = Some(ps);
        self
    }
    pub fn geometry_wait_time(mut self, ps: f64) -> Self {
        self.geometry_wait_time = Some(ps);
        self
    }
    pub fn status_wait_time(mut self, seconds: f64) -> Self {
        self.status_wait_time = Some(seconds);
        self
    }
    pub fn equilibration_time(mut self, ps: f64) -> Self {
        self.equilibration_time = Some(ps);
        self
    }
    pub fn equilibration_rate(mut self, rate: f64) -> Self {
        self.equilibration_rate = Some(rate);
        self
    }
    pub fn random_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }
    pub fn gradient_mode(mut self, mode: GradientMode) -> Self {
        self.gradient_mode = Some(mode);
        self
    }
    pub fn dielectric(mut self, dielectric: f64) -> Self {
        self.dielectric = Some(dielectric);
        self
    }
    pub fn boundary_shape(mut self, shape: BoundaryShape) -> Self {
        self.boundary_shape = Some(shape);
        self
    }
    pub fn boundary_spring(mut self, spring: f64) -> Self {
        self.boundary_spring = Some(spring);
        self
    }
    pub fn boundary_extent(mut self, extent: f64) -> Self {
        self.boundary_extent = Some(extent);
        self
    }
    pub fn boundary_origin(mut self, origin: Point3<f64>) -> Self {
        self.boundary_origin = Some(origin);
        self
    }
    pub fn backend(mut self, backend: BackendKind) -> Self {
        self.backend = Some(backend);
        self
    }
    pub fn infer_bonds(mut self, infer: bool) -> Self {
        self.infer_bonds = Some(infer);
        self
    }
    pub fn output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = Some(format);
        self
    }

    pub fn build(self) -> Result<SimulationConfig, ConfigError> {
        let defaults = SimulationConfig::default();
        let boundary_defaults = defaults.state.boundary;

        let config = SimulationConfig {
            input_path: self
                .input_path
                .ok_or(ConfigError::MissingParameter("input_path"))?,
            forcefield_path: self.forcefield_path,
            energy_output: self.energy_output.unwrap_or(defaults.energy_output),
            geometry_output: self.geometry_output.unwrap_or(defaults.geometry_output),
            desired_temperature: self
                .desired_temperature
                .unwrap_or(defaults.desired_temperature),
            desired_pressure: self.desired_pressure.unwrap_or(defaults.desired_pressure),
            total_time: self.total_time.unwrap_or(defaults.total_time),
            time_step: self.time_step.unwrap_or(defaults.time_step),
            energy_wait_time: self.energy_wait_time.unwrap_or(defaults.energy_wait_time),
            geometry_wait_time: self
                .geometry_wait_time
                .unwrap_or(defaults.geometry_wait_time),
            status_wait_time: self.status_wait_time.unwrap_or(defaults.status_wait_time),
            equilibration_time: self
                .equilibration_time
                .unwrap_or(defaults.equilibration_time),
            equilibration_rate: self
                .equilibration_rate
                .unwrap_or(defaults.equilibration_rate),
            random_seed: self.random_seed.unwrap_or(defaults.random_seed),
            gradient_mode: self.gradient_mode.unwrap_or(defaults.gradient_mode),
            state: StateConfig {
                dielectric: self.dielectric.unwrap_or(defaults.state.dielectric),
                boundary: Boundary {
                    shape: self.boundary_shape.unwrap_or(boundary_defaults.shape),
                    spring: self.boundary_spring.unwrap_or(boundary_defaults.spring),
                    extent: self.boundary_extent.unwrap_or(boundary_defaults.extent),
                    origin: self.boundary_origin.unwrap_or(boundary_defaults.origin),
                },
                backend: self.backend.unwrap_or(defaults.state.backend),
                infer_bonds: self.infer_bonds.unwrap_or(defaults.state.infer_bonds),
            },
            output_format: self.output_format.unwrap_or(defaults.output_format),
        };
        config.validate()?;
        Ok(config)
    }
}

impl SimulationConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.time_step > 0.0) {
            return Err(ConfigError::InvalidParameter {
                name: "time_step",
                reason: format!("must be positive, got {}", self.time_step),
            });
        }
        let non_negative = [
            ("energy_wait_time", self.energy_wait_time),
            ("geometry_wait_time", self.geometry_wait_time),
            ("status_wait_time", self.status_wait_time),
            ("equilibration_time", self.equilibration_time),
            ("equilibration_rate", self.equilibration_rate),
            ("desired_temperature", self.desired_temperature),
        ];
        for (name, value) in non_negative {
            if !(value >= 0.0) {
                return Err(ConfigError::InvalidParameter {
                    name,
                    reason: format!("must be non-negative, got {}", value),
                });
            }
        }
        if self.state.dielectric <= 0.0 {
            return Err(ConfigError::InvalidParameter {
                name: "dielectric",
                reason: format!("must be positive, got {}", self.state.dielectric),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_requires_input_path() {
        let result = SimulationConfigBuilder::new().build();
        assert_eq!(result, Err(ConfigError::MissingParameter("input_path")));
    }

    #[test]
    fn builder_fills_unset_values_from_defaults() {
        let config = SimulationConfig::builder()
            .input_path(PathBuf::from("mol.pqr"))
            .random_seed(42)
            .boundary_shape(BoundaryShape::Cube)
            .build()
            .unwrap();
        assert_eq!(config.random_seed, 42);
        assert_eq!(config.time_step, 0.0005);
        assert_eq!(config.total_time, 0.5);
        assert_eq!(config.desired_temperature, 298.15);
        assert_eq!(config.state.boundary.shape, BoundaryShape::Cube);
        assert_eq!(config.state.boundary.extent, 10.0);
        assert_eq!(config.state.boundary.spring, 250.0);
        assert_eq!(config.energy_output, PathBuf::from("energy.dat"));
        assert_eq!(config.output_format.energy_chars, 10);
    }

    #[test]
    fn builder_rejects_non_positive_time_step() {
        let result = SimulationConfig::builder()
            .input_path(PathBuf::from("mol.pqr"))
            .time_step(0.0)
            .build();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidParameter {
                name: "time_step",
                ..
            })
        ));
    }

    #[test]
    fn builder_rejects_negative_wait_time() {
        let result = SimulationConfig::builder()
            .input_path(PathBuf::from("mol.pqr"))
            .energy_wait_time(-1.0)
            .build();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidParameter {
                name: "energy_wait_time",
                ..
            })
        ));
    }

    #[test]
    fn modes_parse_case_insensitively() {
        assert_eq!("Numerical".parse::<GradientMode>(), Ok(GradientMode::Numerical));
        assert_eq!("analytic".parse::<GradientMode>(), Ok(GradientMode::Analytic));
        assert_eq!("SCALAR".parse::<BackendKind>(), Ok(BackendKind::Scalar));
        assert!("fast".parse::<GradientMode>().is_err());
    }

    #[test]
    fn default_backend_follows_parallel_feature() {
        let expected = if cfg!(feature = "parallel") {
            BackendKind::Parallel
        } else {
            BackendKind::Scalar
        };
        assert_eq!(BackendKind::default(), expected);
    }
}
