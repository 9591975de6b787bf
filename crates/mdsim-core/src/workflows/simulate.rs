use crate::core::forcefield::params::ForceField;
use crate::engine::config::SimulationConfig;
use crate::engine::error::EngineError;
use crate::engine::integrator::{MolecularDynamics, RunSummary};
use crate::engine::output::FileSink;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::state::{MolecularState, StructureFormat};
use tracing::{info, instrument};

/// Runs a molecular-dynamics trajectory and writes its energy table and
/// geometry trajectory to the paths named in `config`.
#[instrument(skip_all, name = "simulation_workflow")]
pub fn run<'a>(
    config: &SimulationConfig,
    reporter: ProgressReporter<'a>,
) -> Result<RunSummary, EngineError> {
    reporter.report(Progress::PhaseStart {
        name: "Preparation",
    });
    let forcefield = ForceField::load_or_default(config.forcefield_path.as_deref());
    let state = MolecularState::load(
        &config.input_path,
        StructureFormat::Pqr,
        &forcefield,
        config.state.clone(),
    );
    let sink = FileSink::create(config)?;
    info!(
        "Prepared '{}' for simulation.",
        config.input_path.display()
    );
    reporter.report(Progress::PhaseFinish);

    let mut dynamics = MolecularDynamics::new(state, sink, config.clone()).with_reporter(reporter);
    dynamics.reporter().report(Progress::PhaseStart { name: "Dynamics" });
    let summary = dynamics.run()?;
    dynamics.reporter().report(Progress::PhaseFinish);

    info!(
        "Simulation finished after {} steps at {:.2} K.",
        summary.steps, summary.temperature
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::fixtures::ETHANE_PQR;
    use crate::engine::config::BackendKind;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::tempdir;

    #[test]
    fn run_writes_energy_table_and_trajectory() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("ethane.pqr");
        fs::write(&input, ETHANE_PQR).unwrap();

        let config = SimulationConfig::builder()
            .input_path(input)
            .energy_output(dir.path().join("energy.dat"))
            .geometry_output(dir.path().join("geometry.xyz"))
            .total_time(0.00390625)
            .time_step(0.0009765625)
            .energy_wait_time(0.0)
            .geometry_wait_time(0.0)
            .backend(BackendKind::Scalar)
            .build()
            .unwrap();

        let phases = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            if let Progress::PhaseStart { name } = event {
                phases.lock().unwrap().push(name);
            }
        }));
        let summary = run(&config, reporter).unwrap();
        assert_eq!(summary.steps, 4);
        assert_eq!(phases.into_inner().unwrap(), vec!["Preparation", "Dynamics"]);

        let energy = fs::read_to_string(dir.path().join("energy.dat")).unwrap();
        assert!(energy.starts_with("#\n# INPUTFILE "));
        // Initial row, one per step, and the final forced row.
        assert_eq!(energy.lines().filter(|l| !l.starts_with('#')).count(), 6);

        let geometry = fs::read_to_string(dir.path().join("geometry.xyz")).unwrap();
        assert_eq!(geometry.lines().filter(|l| *l == "8").count(), 6);
    }

    #[test]
    fn run_fails_when_outputs_cannot_be_created() {
        let dir = tempdir().unwrap();
        let config = SimulationConfig::builder()
            .input_path(dir.path().join("missing.pqr"))
            .energy_output(dir.path().join("no").join("energy.dat"))
            .build()
            .unwrap();
        assert!(matches!(
            run(&config, ProgressReporter::new()),
            Err(EngineError::Output { .. })
        ));
    }
}
