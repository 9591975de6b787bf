use super::Topology;
use crate::core::forcefield::params::ForceField;
use crate::core::models::atom::Atom;
use crate::core::models::topology::{Angle, Bond, BondGraph, ExclusionList, Improper, Torsion};
use crate::core::utils::geometry::{distance, distance_squared};
use itertools::Itertools;
use tracing::{debug, info, instrument, warn};

/// Scale applied to the sum of covalent radii when inferring bonds.
pub const BOND_THRESHOLD: f64 = 1.2;

/// Builds the bonded topology of a molecule from its atoms and force field.
pub struct TopologyBuilder<'a> {
    forcefield: &'a ForceField,
    infer_bonds: bool,
}

impl<'a> TopologyBuilder<'a> {
    pub fn new(forcefield: &'a ForceField) -> Self {
        Self {
            forcefield,
            infer_bonds: true,
        }
    }

    /// Controls whether geometric inference augments the explicit bond list.
    pub fn infer_bonds(mut self, infer: bool) -> Self {
        self.infer_bonds = infer;
        self
    }

    /// Builds the full topology. Atoms must already carry covalent radii.
    #[instrument(skip_all, name = "topology_build")]
    pub fn build(&self, atoms: &[Atom], explicit_bonds: &[(usize, usize)]) -> Topology {
        let graph = self.build_graph(atoms, explicit_bonds);
        let bonds = self.enumerate_bonds(atoms, &graph);
        let angles = self.enumerate_angles(atoms, &graph);
        let torsions = self.enumerate_torsions(atoms, &graph);
        let impropers = self.enumerate_impropers(atoms, &graph);
        let exclusions = collect_exclusions(&bonds, &angles, &torsions);

        info!(
            "Topology: {} bonds, {} angles, {} torsions, {} impropers, {} exclusions.",
            bonds.len(),
            angles.len(),
            torsions.len(),
            impropers.len(),
            exclusions.len()
        );

        Topology {
            bonds,
            angles,
            torsions,
            impropers,
            graph,
            exclusions,
        }
    }

    /// Seeds the graph with explicit bonds, then adds inferred bonds if enabled.
    pub fn build_graph(&self, atoms: &[Atom], explicit_bonds: &[(usize, usize)]) -> BondGraph {
        let mut graph = BondGraph::new(atoms.len());

        for &(i, j) in explicit_bonds {
            if i >= atoms.len() || j >= atoms.len() || i == j {
                warn!("Ignoring explicit bond ({}, {}) with invalid atom indices.", i, j);
                continue;
            }
            graph.insert(i, j, distance(&atoms[i].position, &atoms[j].position));
        }

        if self.infer_bonds {
            let before = graph.edge_count();
            for (i, j) in (0..atoms.len()).tuple_combinations() {
                if is_bonded(&atoms[i], &atoms[j]) {
                    graph.insert(i, j, distance(&atoms[i].position, &atoms[j].position));
                }
            }
            debug!("Inferred {} bonds from geometry.", graph.edge_count() - before);
        }

        graph
    }

    fn enumerate_bonds(&self, atoms: &[Atom], graph: &BondGraph) -> Vec<Bond> {
        graph
            .edges()
            .filter_map(|(i, j, length)| {
                let param = self
                    .forcefield
                    .bond(&atoms[i].force_field_type, &atoms[j].force_field_type)?;
                if param.spring == 0.0 {
                    return None;
                }
                let mut bond = Bond::new(i, j, param.spring, param.equilibrium);
                bond.distance = length;
                Some(bond)
            })
            .collect()
    }

    fn enumerate_angles(&self, atoms: &[Atom], graph: &BondGraph) -> Vec<Angle> {
        let mut angles = Vec::new();
        for j in 0..atoms.len() {
            for (i, k) in graph.neighbors(j).tuple_combinations() {
                let Some(param) = self.forcefield.angle(
                    &atoms[i].force_field_type,
                    &atoms[j].force_field_type,
                    &atoms[k].force_field_type,
                ) else {
                    continue;
                };
                if param.spring != 0.0 {
                    angles.push(Angle::new(i, j, k, param.spring, param.equilibrium));
                }
            }
        }
        angles
    }

    fn enumerate_torsions(&self, atoms: &[Atom], graph: &BondGraph) -> Vec<Torsion> {
        let mut torsions = Vec::new();
        for (j, k, _) in graph.edges() {
            for i in graph.neighbors(j).filter(|&i| i != k) {
                for l in graph.neighbors(k).filter(|&l| l != i && l != j) {
                    let params = self.forcefield.torsion(
                        &atoms[i].force_field_type,
                        &atoms[j].force_field_type,
                        &atoms[k].force_field_type,
                        &atoms[l].force_field_type,
                    );
                    torsions.extend(params.into_iter().filter(|p| p.barrier != 0.0).map(|p| {
                        Torsion::new([i, j, k, l], p.barrier, p.phase, p.periodicity, p.paths)
                    }));
                }
            }
        }
        torsions
    }

    fn enumerate_impropers(&self, atoms: &[Atom], graph: &BondGraph) -> Vec<Improper> {
        let mut impropers = Vec::new();
        for k in 0..atoms.len() {
            if graph.degree(k) < 3 {
                continue;
            }
            for (i, j, l) in graph.neighbors(k).tuple_combinations() {
                for quad in improper_rotations(i, j, k, l) {
                    let types = quad.map(|index| atoms[index].force_field_type.as_str());
                    match self
                        .forcefield
                        .improper(types[0], types[1], types[2], types[3])
                    {
                        Some(barrier) if barrier != 0.0 => {
                            impropers.push(Improper::new(quad, barrier))
                        }
                        _ => debug!("No out-of-plane parameters for atom types {:?}.", types),
                    }
                }
            }
        }
        impropers
    }
}

/// Two atoms are bonded when they are closer than the scaled sum of their covalent radii.
#[inline]
pub fn is_bonded(a: &Atom, b: &Atom) -> bool {
    let cutoff = BOND_THRESHOLD * (a.covalent_radius + b.covalent_radius);
    distance_squared(&a.position, &b.position) < cutoff * cutoff
}

/// The three wing assignments of an out-of-plane center `k` with neighbors
/// `i`, `j`, and `l`. The two in-plane wings are ordered by index.
pub fn improper_rotations(i: usize, j: usize, k: usize, l: usize) -> [[usize; 4]; 3] {
    [
        [i.min(j), i.max(j), k, l],
        [j.min(l), j.max(l), k, i],
        [l.min(i), l.max(i), k, j],
    ]
}

fn collect_exclusions(bonds: &[Bond], angles: &[Angle], torsions: &[Torsion]) -> ExclusionList {
    let mut exclusions = ExclusionList::new();
    for bond in bonds {
        exclusions.insert(bond.atoms[0], bond.atoms[1]);
    }
    for angle in angles {
        exclusions.insert(angle.atoms[0], angle.atoms[2]);
    }
    for torsion in torsions {
        exclusions.insert(torsion.atoms[0], torsion.atoms[3]);
    }
    exclusions
}
