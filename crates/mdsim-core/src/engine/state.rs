use super::config::{GradientMode, KineticMode, StateConfig};
use super::molecule::Molecule;
use super::nonbonded::{NonBondedBackend, create_backend};
use crate::core::forcefield::directions::{
    angle_directions, improper_directions, pair_directions, torsion_directions,
};
use crate::core::forcefield::parameterization::Parameterizer;
use crate::core::forcefield::params::ForceField;
use crate::core::forcefield::potentials::{
    fourier_torsion, fourier_torsion_derivative, harmonic_angle, harmonic_angle_derivative,
    harmonic_bond, harmonic_bond_derivative, out_of_plane, out_of_plane_derivative,
};
use crate::core::forcefield::term::EnergyBreakdown;
use crate::core::io::pqr;
use crate::core::models::atom::Atom;
use crate::core::models::boundary::{Boundary, BoundaryShape};
use crate::core::models::system::MolecularSystem;
use crate::core::topology::Topology;
use crate::core::topology::builder::TopologyBuilder;
use crate::core::utils::geometry::{
    angle_between, dihedral_between, distance, enclosure_volume, out_of_plane_between,
    unit_vector_with_length,
};
use nalgebra::Vector3;
use std::path::Path;
use tracing::{debug, instrument, warn};

/// Converts amu·Å²/ps² to kcal/mol.
pub const KINETIC_TO_KCAL: f64 = 0.00239005736;
/// Boltzmann constant in kcal/(mol·K).
pub const BOLTZMANN_CONSTANT: f64 = 0.001987204;
/// Converts kcal/(mol·Å³) to Pascal.
pub const KCAL_A_MOL_TO_PA: f64 = 69476.95;
/// Finite-difference step for numerical gradients, in Angstroms.
pub const NUMERICAL_DISPLACEMENT: f64 = 1e-6;

/// Input formats a [`MolecularState`] can be loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StructureFormat {
    #[default]
    Pqr,
}

/// Per-atom gradient arrays, one per energy category, plus their sum.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryGradients {
    pub bonds: Vec<Vector3<f64>>,
    pub angles: Vec<Vector3<f64>>,
    pub torsions: Vec<Vector3<f64>>,
    pub impropers: Vec<Vector3<f64>>,
    pub vdw: Vec<Vector3<f64>>,
    pub electrostatic: Vec<Vector3<f64>>,
    pub boundary: Vec<Vector3<f64>>,
    pub total: Vec<Vector3<f64>>,
}

impl CategoryGradients {
    fn zeros(atom_count: usize) -> Self {
        let zeros = vec![Vector3::zeros(); atom_count];
        Self {
            bonds: zeros.clone(),
            angles: zeros.clone(),
            torsions: zeros.clone(),
            impropers: zeros.clone(),
            vdw: zeros.clone(),
            electrostatic: zeros.clone(),
            boundary: zeros.clone(),
            total: zeros,
        }
    }

    fn reset(&mut self) {
        for category in [
            &mut self.bonds,
            &mut self.angles,
            &mut self.torsions,
            &mut self.impropers,
            &mut self.vdw,
            &mut self.electrostatic,
            &mut self.boundary,
            &mut self.total,
        ] {
            category.fill(Vector3::zeros());
        }
    }

    pub fn bonded(&self, atom: usize) -> Vector3<f64> {
        self.bonds[atom] + self.angles[atom] + self.torsions[atom] + self.impropers[atom]
    }

    pub fn non_bonded(&self, atom: usize) -> Vector3<f64> {
        self.vdw[atom] + self.electrostatic[atom]
    }

    fn sum_total(&mut self) {
        for atom in 0..self.total.len() {
            self.total[atom] = self.bonded(atom) + self.non_bonded(atom) + self.boundary[atom];
        }
    }
}

/// The complete, mutable state of one molecule under simulation.
///
/// Topology is fixed at construction. Positions and velocities change every
/// step; all energies and gradients are recomputed from scratch on request.
pub struct MolecularState {
    atoms: Vec<Atom>,
    topology: Topology,
    bonded_pairs: Vec<(usize, usize)>,
    dielectric: f64,
    boundary: Boundary,
    backend: Box<dyn NonBondedBackend>,
    energies: EnergyBreakdown,
    gradients: CategoryGradients,
    temperature: f64,
    pressure: Option<f64>,
    virial: f64,
    volume: Option<f64>,
}

impl MolecularState {
    /// Parameterizes the atoms of `system`, builds its topology, and computes
    /// the initial internal coordinates.
    #[instrument(skip_all, name = "state_build")]
    pub fn from_system(system: MolecularSystem, forcefield: &ForceField, config: StateConfig) -> Self {
        let explicit_bonds = system.explicit_bonds().to_vec();
        let mut atoms = system.into_atoms();
        Parameterizer::new(forcefield).parameterize_atoms(&mut atoms);

        let topology = TopologyBuilder::new(forcefield)
            .infer_bonds(config.infer_bonds)
            .build(&atoms, &explicit_bonds);
        let bonded_pairs = topology.graph.edges().map(|(i, j, _)| (i, j)).collect();
        let backend = create_backend(config.backend);
        debug!("Using the {} non-bonded backend.", backend.name());

        let atom_count = atoms.len();
        let mut state = Self {
            atoms,
            topology,
            bonded_pairs,
            dielectric: config.dielectric,
            boundary: config.boundary,
            backend,
            energies: EnergyBreakdown::default(),
            gradients: CategoryGradients::zeros(atom_count),
            temperature: 0.0,
            pressure: None,
            virial: 0.0,
            volume: None,
        };
        state.update_internals();
        state.volume = enclosure_volume(state.boundary.shape, state.boundary.extent);
        state
    }

    /// Loads a structure file. An unreadable file yields an empty state.
    pub fn load(path: &Path, format: StructureFormat, forcefield: &ForceField, config: StateConfig) -> Self {
        let system = match format {
            StructureFormat::Pqr => pqr::read_or_empty(path),
        };
        if system.is_empty() {
            warn!("Structure '{}' contains no atoms.", path.display());
        }
        Self::from_system(system, forcefield, config)
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn gradients(&self) -> &CategoryGradients {
        &self.gradients
    }

    pub fn dielectric(&self) -> f64 {
        self.dielectric
    }

    pub fn set_dielectric(&mut self, dielectric: f64) {
        self.dielectric = dielectric;
    }

    pub fn set_boundary(&mut self, boundary: Boundary) {
        self.boundary = boundary;
    }

    /// Sets the boundary shape from its name. Unknown names are logged and ignored.
    pub fn set_boundary_type(&mut self, name: &str) {
        match name.parse::<BoundaryShape>() {
            Ok(shape) => self.boundary.shape = shape,
            Err(e) => warn!("{}; keeping '{}'.", e, self.boundary.shape),
        }
    }

    /// Computes the gradient for a mode given by name. Unknown names are
    /// logged and leave the previous gradient untouched.
    pub fn calculate_gradient_named(&mut self, mode: &str) {
        match mode.parse::<GradientMode>() {
            Ok(mode) => self.calculate_gradient(mode),
            Err(e) => warn!("{}; use 'analytic' or 'numerical'.", e),
        }
    }

    pub fn pressure(&self) -> Option<f64> {
        self.pressure
    }

    pub fn virial(&self) -> f64 {
        self.virial
    }

    pub fn total_mass(&self) -> f64 {
        self.atoms.iter().map(|atom| atom.mass).sum()
    }

    /// Root-mean-square of the total gradient over all coordinates.
    pub fn rms_gradient(&self) -> f64 {
        if self.atoms.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.gradients.total.iter().map(|g| g.norm_squared()).sum();
        (sum / (3 * self.atoms.len()) as f64).sqrt()
    }

    /// Evaluates every potential-energy category and refreshes the cached
    /// per-term energies. Kinetic energy is left at zero.
    fn potential_energy(&mut self) -> EnergyBreakdown {
        let atoms = &self.atoms;
        let topology = &mut self.topology;

        let mut energies = EnergyBreakdown::default();
        for bond in &mut topology.bonds {
            bond.energy = harmonic_bond(bond.distance, bond.spring, bond.equilibrium);
            energies.bond += bond.energy;
        }
        for angle in &mut topology.angles {
            angle.energy = harmonic_angle(angle.angle, angle.spring, angle.equilibrium);
            energies.angle += angle.energy;
        }
        for torsion in &mut topology.torsions {
            torsion.energy = fourier_torsion(
                torsion.angle,
                torsion.barrier,
                torsion.phase,
                torsion.periodicity,
                torsion.paths,
            );
            energies.torsion += torsion.energy;
        }
        for improper in &mut topology.impropers {
            improper.energy = out_of_plane(improper.angle, improper.barrier);
            energies.improper += improper.energy;
        }

        let non_bonded = self
            .backend
            .compute(atoms, &topology.exclusions, self.dielectric, false);
        energies.vdw = non_bonded.vdw;
        energies.electrostatic = non_bonded.electrostatic;

        energies.boundary = atoms
            .iter()
            .map(|atom| self.boundary.penalty(&atom.position).0)
            .sum();
        energies
    }

    fn kinetic_energy(&self, kinetic: KineticMode) -> f64 {
        let leapfrog = kinetic == KineticMode::Leapfrog;
        self.atoms
            .iter()
            .map(|atom| atom.raw_kinetic_energy(leapfrog))
            .sum::<f64>()
            * KINETIC_TO_KCAL
    }

    fn analytic_gradient(&mut self) {
        let atoms = &self.atoms;
        let topology = &mut self.topology;
        let g = &mut self.gradients;
        let pos = |i: usize| &atoms[i].position;

        for bond in &mut topology.bonds {
            let [i, j] = bond.atoms;
            bond.gradient_magnitude = harmonic_bond_derivative(bond.distance, bond.spring, bond.equilibrium);
            let [di, dj] = pair_directions(pos(i), pos(j));
            g.bonds[i] += di * bond.gradient_magnitude;
            g.bonds[j] += dj * bond.gradient_magnitude;
        }
        for angle in &mut topology.angles {
            angle.gradient_magnitude = harmonic_angle_derivative(angle.angle, angle.spring, angle.equilibrium);
            let directions = angle_directions(pos(angle.atoms[0]), pos(angle.atoms[1]), pos(angle.atoms[2]));
            for (&atom, direction) in angle.atoms.iter().zip(directions) {
                g.angles[atom] += direction * angle.gradient_magnitude;
            }
        }
        for torsion in &mut topology.torsions {
            torsion.gradient_magnitude = fourier_torsion_derivative(
                torsion.angle,
                torsion.barrier,
                torsion.phase,
                torsion.periodicity,
                torsion.paths,
            );
            let [i, j, k, l] = torsion.atoms;
            let directions = torsion_directions(pos(i), pos(j), pos(k), pos(l));
            for (&atom, direction) in torsion.atoms.iter().zip(directions) {
                g.torsions[atom] += direction * torsion.gradient_magnitude;
            }
        }
        for improper in &mut topology.impropers {
            improper.gradient_magnitude = out_of_plane_derivative(improper.angle, improper.barrier);
            let [i, j, k, l] = improper.atoms;
            let directions = improper_directions(pos(i), pos(j), pos(k), pos(l));
            for (&atom, direction) in improper.atoms.iter().zip(directions) {
                g.impropers[atom] += direction * improper.gradient_magnitude;
            }
        }

        let non_bonded = self
            .backend
            .compute(atoms, &topology.exclusions, self.dielectric, true);
        if let Some(gradient) = non_bonded.gradient {
            g.vdw = gradient.vdw;
            g.electrostatic = gradient.electrostatic;
        }

        for (atom, slot) in atoms.iter().zip(g.boundary.iter_mut()) {
            *slot = self.boundary.penalty(&atom.position).1;
        }
    }

    /// Central differences of every potential category, one coordinate at a time.
    fn numerical_gradient(&mut self) {
        let step = NUMERICAL_DISPLACEMENT;
        for atom in 0..self.atoms.len() {
            for axis in 0..3 {
                let q = self.atoms[atom].position[axis];

                self.atoms[atom].position[axis] = q + 0.5 * step;
                self.update_internals();
                let plus = self.potential_energy();

                self.atoms[atom].position[axis] = q - 0.5 * step;
                self.update_internals();
                let minus = self.potential_energy();

                self.atoms[atom].position[axis] = q;
                let g = &mut self.gradients;
                g.bonds[atom][axis] = (plus.bond - minus.bond) / step;
                g.angles[atom][axis] = (plus.angle - minus.angle) / step;
                g.torsions[atom][axis] = (plus.torsion - minus.torsion) / step;
                g.impropers[atom][axis] = (plus.improper - minus.improper) / step;
                g.vdw[atom][axis] = (plus.vdw - minus.vdw) / step;
                g.electrostatic[atom][axis] = (plus.electrostatic - minus.electrostatic) / step;
                g.boundary[atom][axis] = (plus.boundary - minus.boundary) / step;
            }
        }
        self.update_internals();
        // Restore the per-term energy caches to the unperturbed geometry.
        self.potential_energy();
    }
}

impl Molecule for MolecularState {
    fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    fn atoms_mut(&mut self) -> &mut [Atom] {
        &mut self.atoms
    }

    fn update_internals(&mut self) {
        let atoms = &self.atoms;
        let topology = &mut self.topology;
        let pos = |i: usize| &atoms[i].position;

        for &(i, j) in &self.bonded_pairs {
            topology.graph.set_length(i, j, distance(pos(i), pos(j)));
        }
        for bond in &mut topology.bonds {
            let [i, j] = bond.atoms;
            if let Some(length) = topology.graph.length(i, j) {
                bond.distance = length;
            }
        }
        let graph = &topology.graph;
        // Bond vectors are scaled by the lengths cached in the bond graph.
        let bond_unit = |from: usize, to: usize| {
            let length = graph
                .length(from, to)
                .unwrap_or_else(|| distance(pos(from), pos(to)));
            unit_vector_with_length(pos(from), pos(to), length)
        };
        for angle in &mut topology.angles {
            let [i, j, k] = angle.atoms;
            angle.angle = angle_between(&bond_unit(j, i), &bond_unit(j, k));
        }
        for torsion in &mut topology.torsions {
            let [i, j, k, l] = torsion.atoms;
            torsion.angle = dihedral_between(&bond_unit(i, j), &bond_unit(j, k), &bond_unit(k, l));
        }
        for improper in &mut topology.impropers {
            let [i, j, k, l] = improper.atoms;
            improper.angle = out_of_plane_between(&bond_unit(k, i), &bond_unit(k, j), &bond_unit(k, l));
        }
    }

    #[instrument(skip_all, name = "calculate_energy")]
    fn calculate_energy(&mut self, kinetic: KineticMode) {
        let mut energies = self.potential_energy();
        energies.kinetic = self.kinetic_energy(kinetic);
        self.energies = energies;
    }

    #[instrument(skip_all, name = "calculate_gradient")]
    fn calculate_gradient(&mut self, mode: GradientMode) {
        self.gradients.reset();
        match mode {
            GradientMode::Analytic => self.analytic_gradient(),
            GradientMode::Numerical => self.numerical_gradient(),
        }
        self.gradients.sum_total();
    }

    fn calculate_temperature(&mut self) -> f64 {
        self.temperature = if self.atoms.is_empty() {
            0.0
        } else {
            (2.0 / 3.0) * self.energies.kinetic / (BOLTZMANN_CONSTANT * self.atoms.len() as f64)
        };
        self.temperature
    }

    fn calculate_pressure(&mut self) -> Option<f64> {
        self.virial = self
            .gradients
            .total
            .iter()
            .map(|g| g.x + g.y + g.z)
            .sum();
        self.pressure = match self.volume {
            Some(volume) if volume > 0.0 => {
                let n = self.atoms.len() as f64;
                Some(KCAL_A_MOL_TO_PA * (n * BOLTZMANN_CONSTANT * self.temperature + self.virial / 3.0) / volume)
            }
            _ => {
                warn!("Pressure is undefined without a finite, positive enclosure volume.");
                None
            }
        };
        self.pressure
    }

    fn calculate_volume(&mut self) -> Option<f64> {
        self.volume = enclosure_volume(self.boundary.shape, self.boundary.extent);
        self.volume
    }

    fn energies(&self) -> &EnergyBreakdown {
        &self.energies
    }

    fn gradient(&self) -> &[Vector3<f64>] {
        &self.gradients.total
    }

    fn temperature(&self) -> f64 {
        self.temperature
    }

    fn boundary(&self) -> &Boundary {
        &self.boundary
    }

    fn term_count(&self) -> usize {
        self.topology.term_count()
    }
}
