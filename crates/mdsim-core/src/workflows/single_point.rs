use crate::core::forcefield::params::ForceField;
use crate::core::forcefield::term::EnergyBreakdown;
use crate::engine::config::{GradientMode, KineticMode, StateConfig};
use crate::engine::molecule::Molecule;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::state::{MolecularState, StructureFormat};
use std::path::PathBuf;
use tracing::{info, instrument};

#[derive(Debug, Clone, PartialEq)]
pub struct SinglePointConfig {
    pub input_path: PathBuf,
    pub forcefield_path: Option<PathBuf>,
    pub gradient_mode: GradientMode,
    pub state: StateConfig,
}

/// Topology counts of the evaluated structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TermCounts {
    pub atoms: usize,
    pub bonds: usize,
    pub angles: usize,
    pub torsions: usize,
    pub impropers: usize,
    pub exclusions: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SinglePointResult {
    pub counts: TermCounts,
    pub energies: EnergyBreakdown,
    /// Root-mean-square of the total gradient, in kcal/(mol·Å).
    pub rms_gradient: f64,
    /// Largest per-atom gradient norm and the index of that atom.
    pub max_gradient: Option<(usize, f64)>,
    pub volume: Option<f64>,
    pub virial: f64,
}

/// Evaluates the energy and gradient of a structure at its input geometry.
#[instrument(skip_all, name = "single_point_workflow")]
pub fn run(config: &SinglePointConfig, reporter: &ProgressReporter) -> SinglePointResult {
    reporter.report(Progress::PhaseStart {
        name: "Preparation",
    });
    let forcefield = ForceField::load_or_default(config.forcefield_path.as_deref());
    let mut state = MolecularState::load(
        &config.input_path,
        StructureFormat::Pqr,
        &forcefield,
        config.state.clone(),
    );
    reporter.report(Progress::PhaseFinish);

    reporter.report(Progress::PhaseStart { name: "Evaluation" });
    let result = evaluate(&mut state, config.gradient_mode);
    reporter.report(Progress::PhaseFinish);

    info!(
        "Single point: E_pot = {:.6} kcal/mol, RMS gradient = {:.6} kcal/(mol*A).",
        result.energies.potential(),
        result.rms_gradient
    );
    result
}

/// Evaluates an already built state.
pub fn evaluate(state: &mut MolecularState, mode: GradientMode) -> SinglePointResult {
    state.update_internals();
    state.calculate_energy(KineticMode::Current);
    state.calculate_temperature();
    state.calculate_gradient(mode);
    let volume = state.calculate_volume();
    if volume.is_some() {
        state.calculate_pressure();
    }

    let topology = state.topology();
    let counts = TermCounts {
        atoms: state.atoms().len(),
        bonds: topology.bonds.len(),
        angles: topology.angles.len(),
        torsions: topology.torsions.len(),
        impropers: topology.impropers.len(),
        exclusions: topology.exclusions.len(),
    };
    let max_gradient = state
        .gradient()
        .iter()
        .map(|g| g.norm())
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(&b.1));

    SinglePointResult {
        counts,
        energies: *state.energies(),
        rms_gradient: state.rms_gradient(),
        max_gradient,
        volume,
        virial: state.virial(),
    }
}
