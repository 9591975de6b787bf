use crate::error::{CliError, Result};
use mdsim::core::models::boundary::BoundaryShape;
use mdsim::engine::config::{BackendKind, GradientMode};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileSimulationConfig {
    pub desired_temperature: Option<f64>,
    pub desired_pressure: Option<f64>,
    pub total_time: Option<f64>,
    pub time_step: Option<f64>,
    pub energy_wait_time: Option<f64>,
    pub geometry_wait_time: Option<f64>,
    pub status_wait_time: Option<f64>,
    pub equilibration_time: Option<f64>,
    pub equilibration_rate: Option<f64>,
    pub random_seed: Option<u64>,
    pub gradient: Option<GradientMode>,
    pub dielectric: Option<f64>,
    pub backend: Option<BackendKind>,
    pub infer_bonds: Option<bool>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileBoundaryConfig {
    #[serde(rename = "type")]
    pub shape: Option<BoundaryShape>,
    pub spring: Option<f64>,
    pub extent: Option<f64>,
    pub origin: Option<[f64; 3]>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileOutputConfig {
    pub energy: Option<PathBuf>,
    pub geometry: Option<PathBuf>,
    pub energy_digits: Option<usize>,
    pub energy_chars: Option<usize>,
    pub geometry_digits: Option<usize>,
    pub geometry_chars: Option<usize>,
    pub time_digits: Option<usize>,
    pub time_chars: Option<usize>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileForcefieldConfig {
    pub path: Option<PathBuf>,
}

/// Contents of a TOML run configuration. Every key is optional.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileConfig {
    pub simulation: Option<FileSimulationConfig>,
    pub boundary: Option<FileBoundaryConfig>,
    pub output: Option<FileOutputConfig>,
    pub forcefield: Option<FileForcefieldConfig>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    pub fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn parses_all_sections() {
        let config = FileConfig::from_toml(
            r#"
            [simulation]
            desired-temperature = 310.0
            total-time = 1.5
            random-seed = 17
            gradient = "numerical"
            backend = "scalar"

            [boundary]
            type = "cube"
            extent = 12.5
            origin = [1.0, 0.0, -1.0]

            [output]
            energy = "run/energy.dat"
            energy-digits = 5

            [forcefield]
            path = "params.ff"
            "#,
        )
        .unwrap();

        let simulation = config.simulation.unwrap();
        assert_eq!(simulation.desired_temperature, Some(310.0));
        assert_eq!(simulation.random_seed, Some(17));
        assert_eq!(simulation.gradient, Some(GradientMode::Numerical));
        assert_eq!(simulation.backend, Some(BackendKind::Scalar));

        let boundary = config.boundary.unwrap();
        assert_eq!(boundary.shape, Some(BoundaryShape::Cube));
        assert_eq!(boundary.origin, Some([1.0, 0.0, -1.0]));

        let output = config.output.unwrap();
        assert_eq!(output.energy, Some(PathBuf::from("run/energy.dat")));
        assert_eq!(output.energy_digits, Some(5));
        assert_eq!(config.forcefield.unwrap().path, Some(PathBuf::from("params.ff")));
    }

    #[test]
    fn empty_file_is_all_defaults() {
        assert_eq!(FileConfig::from_toml("").unwrap(), FileConfig::default());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(FileConfig::from_toml("[simulation]\ntemprature = 300.0\n").is_err());
        assert!(FileConfig::from_toml("[thermostat]\nrate = 1.0\n").is_err());
    }

    #[test]
    fn unknown_boundary_type_is_rejected() {
        assert!(FileConfig::from_toml("[boundary]\ntype = \"torus\"\n").is_err());
    }

    #[test]
    fn from_file_reports_parse_errors_with_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "[simulation\n").unwrap();
        assert!(matches!(
            FileConfig::from_file(&path),
            Err(CliError::FileParsing { .. })
        ));
    }
}
