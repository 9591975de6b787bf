use super::config::{OutputFormat, SimulationConfig};
use crate::core::forcefield::term::EnergyBreakdown;
use crate::core::io::{energy, xyz};
use crate::core::models::atom::Atom;
use nalgebra::Point3;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to create output file '{path}': {source}")]
    Create {
        path: String,
        source: io::Error,
    },
    #[error("Failed to write output: {0}")]
    Write(#[from] io::Error),
}

/// Facts about the loaded system that are recorded alongside the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunInfo {
    pub atom_count: usize,
    pub term_count: usize,
}

/// Destination for the energy table and trajectory of a run.
pub trait OutputSink {
    fn write_header(&mut self, config: &SimulationConfig, info: &RunInfo) -> Result<(), OutputError>;
    fn write_energy(&mut self, time: f64, energies: &EnergyBreakdown) -> Result<(), OutputError>;
    fn write_frame(&mut self, time: f64, atoms: &[Atom]) -> Result<(), OutputError>;
    fn flush(&mut self) -> Result<(), OutputError>;
}

/// The `# KEY value` entries written at the top of an energy table.
pub fn header_entries(config: &SimulationConfig, info: &RunInfo) -> Vec<(&'static str, String)> {
    let boundary = &config.state.boundary;
    vec![
        ("INPUTFILE", config.input_path.display().to_string()),
        ("ENERGYOUT", config.energy_output.display().to_string()),
        ("GEOMOUT", config.geometry_output.display().to_string()),
        ("RANDOMSEED", config.random_seed.to_string()),
        ("DESIREDTEMPERATURE", format!("{:.6} K", config.desired_temperature)),
        ("BOUNDARY", format!("{:.6} A", boundary.extent)),
        ("BOUNDARYSPRING", format!("{:.6} kcal/(mol*A^2)", boundary.spring)),
        ("BOUNDARYTYPE", boundary.shape.to_string()),
        ("STATUSWAITTIME", format!("{:.6} s", config.status_wait_time)),
        ("ENERGYWAITTIME", format!("{:.6} ps", config.energy_wait_time)),
        ("GEOMWAITTIME", format!("{:.6} ps", config.geometry_wait_time)),
        ("TOTALTIME", format!("{:.6} ps", config.total_time)),
        ("TIMESTEP", format!("{:.6} ps", config.time_step)),
        ("EQTIME", format!("{:.6} ps", config.equilibration_time)),
        ("EQRATE", format!("{:.6} ps", config.equilibration_rate)),
        ("DESIREDPRESSURE", format!("{:.6}", config.desired_pressure)),
        ("ATOMS", info.atom_count.to_string()),
        ("TERMS", info.term_count.to_string()),
    ]
}

fn create(path: &Path) -> Result<BufWriter<File>, OutputError> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|source| OutputError::Create {
            path: path.display().to_string(),
            source,
        })
}

/// Writes the energy table and XYZ trajectory to buffered files.
pub struct FileSink {
    energy: BufWriter<File>,
    geometry: BufWriter<File>,
    format: OutputFormat,
}

impl FileSink {
    pub fn create(config: &SimulationConfig) -> Result<Self, OutputError> {
        Ok(Self {
            energy: create(&config.energy_output)?,
            geometry: create(&config.geometry_output)?,
            format: config.output_format,
        })
    }
}

impl OutputSink for FileSink {
    fn write_header(&mut self, config: &SimulationConfig, info: &RunInfo) -> Result<(), OutputError> {
        energy::write_header(&mut self.energy, &header_entries(config, info))?;
        Ok(())
    }

    fn write_energy(&mut self, time: f64, energies: &EnergyBreakdown) -> Result<(), OutputError> {
        energy::write_row(&mut self.energy, time, energies, &self.format)?;
        Ok(())
    }

    fn write_frame(&mut self, time: f64, atoms: &[Atom]) -> Result<(), OutputError> {
        xyz::write_frame(&mut self.geometry, time, atoms, &self.format)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), OutputError> {
        self.energy.flush()?;
        self.geometry.flush()?;
        Ok(())
    }
}

/// Keeps everything in memory. Useful for library callers and tests.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub header: Vec<(&'static str, String)>,
    pub energies: Vec<(f64, EnergyBreakdown)>,
    pub frames: Vec<(f64, Vec<Point3<f64>>)>,
    pub flush_count: usize,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OutputSink for MemorySink {
    fn write_header(&mut self, config: &SimulationConfig, info: &RunInfo) -> Result<(), OutputError> {
        self.header = header_entries(config, info);
        Ok(())
    }

    fn write_energy(&mut self, time: f64, energies: &EnergyBreakdown) -> Result<(), OutputError> {
        self.energies.push((time, *energies));
        Ok(())
    }

    fn write_frame(&mut self, time: f64, atoms: &[Atom]) -> Result<(), OutputError> {
        self.frames
            .push((time, atoms.iter().map(|atom| atom.position).collect()));
        Ok(())
    }

    fn flush(&mut self) -> Result<(), OutputError> {
        self.flush_count += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn config_in(dir: &Path) -> SimulationConfig {
        SimulationConfig::builder()
            .input_path(PathBuf::from("ethane.pqr"))
            .energy_output(dir.join("energy.dat"))
            .geometry_output(dir.join("geometry.xyz"))
            .random_seed(11)
            .build()
            .unwrap()
    }

    #[test]
    fn header_entries_follow_fixed_key_order() {
        let config = config_in(Path::new("/tmp"));
        let keys: Vec<&str> = header_entries(&config, &RunInfo::default())
            .into_iter()
            .map(|(key, _)| key)
            .collect();
        assert_eq!(&keys[..4], &["INPUTFILE", "ENERGYOUT", "GEOMOUT", "RANDOMSEED"]);
        assert_eq!(keys[7], "BOUNDARYTYPE");
        assert_eq!(keys[14], "EQRATE");
        assert_eq!(&keys[15..], &["DESIREDPRESSURE", "ATOMS", "TERMS"]);
    }

    #[test]
    fn header_records_desired_pressure() {
        let config = SimulationConfig {
            desired_pressure: 2.5,
            ..config_in(Path::new("/tmp"))
        };
        let entries = header_entries(&config, &RunInfo::default());
        let pressure = entries
            .iter()
            .find(|(key, _)| *key == "DESIREDPRESSURE")
            .map(|(_, value)| value.as_str());
        assert_eq!(pressure, Some("2.500000"));
    }

    #[test]
    fn file_sink_writes_header_rows_and_frames() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());
        let mut sink = FileSink::create(&config).unwrap();
        let atoms = vec![Atom::new(1, "CT", Point3::new(1.0, 2.0, 3.0))];

        sink.write_header(&config, &RunInfo { atom_count: 1, term_count: 0 })
            .unwrap();
        sink.write_energy(0.0, &EnergyBreakdown::default()).unwrap();
        sink.write_frame(0.0, &atoms).unwrap();
        sink.flush().unwrap();

        let energy_text = fs::read_to_string(dir.path().join("energy.dat")).unwrap();
        assert!(energy_text.contains("# RANDOMSEED 11"));
        assert!(energy_text.contains("# BOUNDARYTYPE sphere"));
        assert_eq!(energy_text.lines().filter(|l| !l.starts_with('#')).count(), 1);

        let geometry_text = fs::read_to_string(dir.path().join("geometry.xyz")).unwrap();
        assert!(geometry_text.starts_with("1\n0.0000 ps\nC "));
    }

    #[test]
    fn file_sink_reports_unwritable_path() {
        let dir = tempdir().unwrap();
        let mut config = config_in(dir.path());
        config.energy_output = dir.path().join("missing").join("energy.dat");
        assert!(matches!(
            FileSink::create(&config),
            Err(OutputError::Create { .. })
        ));
    }

    #[test]
    fn memory_sink_records_everything() {
        let config = config_in(Path::new("/tmp"));
        let mut sink = MemorySink::new();
        sink.write_header(&config, &RunInfo::default()).unwrap();
        sink.write_energy(0.5, &EnergyBreakdown::default()).unwrap();
        sink.write_frame(0.5, &[Atom::new(1, "HC", Point3::origin())])
            .unwrap();
        sink.flush().unwrap();
        assert_eq!(sink.header.len(), 18);
        assert_eq!(sink.energies.len(), 1);
        assert_eq!(sink.frames[0].1, vec![Point3::origin()]);
        assert_eq!(sink.flush_count, 1);
    }
}
