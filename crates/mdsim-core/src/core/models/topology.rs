use std::collections::{BTreeMap, HashSet};

/// A harmonic bond stretch between two atoms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bond {
    pub atoms: [usize; 2],
    /// Spring constant in kcal/(mol·Å²).
    pub spring: f64,
    /// Equilibrium length in Angstroms.
    pub equilibrium: f64,
    /// Current length in Angstroms.
    pub distance: f64,
    pub energy: f64,
    pub gradient_magnitude: f64,
}

impl Bond {
    pub fn new(i: usize, j: usize, spring: f64, equilibrium: f64) -> Self {
        Self {
            atoms: [i, j],
            spring,
            equilibrium,
            distance: 0.0,
            energy: 0.0,
            gradient_magnitude: 0.0,
        }
    }
}

/// A harmonic angle bend i-j-k centered on `j`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Angle {
    pub atoms: [usize; 3],
    /// Spring constant in kcal/(mol·rad²).
    pub spring: f64,
    /// Equilibrium angle in degrees.
    pub equilibrium: f64,
    /// Current angle in degrees.
    pub angle: f64,
    pub energy: f64,
    pub gradient_magnitude: f64,
}

impl Angle {
    pub fn new(i: usize, j: usize, k: usize, spring: f64, equilibrium: f64) -> Self {
        Self {
            atoms: [i, j, k],
            spring,
            equilibrium,
            angle: 0.0,
            energy: 0.0,
            gradient_magnitude: 0.0,
        }
    }
}

/// One Fourier component of a proper torsion i-j-k-l about the j-k bond.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Torsion {
    pub atoms: [usize; 4],
    /// Barrier height in kcal/mol.
    pub barrier: f64,
    /// Phase offset in degrees.
    pub phase: f64,
    pub periodicity: u32,
    /// Number of bond paths sharing the barrier.
    pub paths: u32,
    /// Current signed dihedral in degrees.
    pub angle: f64,
    pub energy: f64,
    pub gradient_magnitude: f64,
}

impl Torsion {
    pub fn new(atoms: [usize; 4], barrier: f64, phase: f64, periodicity: u32, paths: u32) -> Self {
        Self {
            atoms,
            barrier,
            phase,
            periodicity,
            paths,
            angle: 0.0,
            energy: 0.0,
            gradient_magnitude: 0.0,
        }
    }
}

/// An out-of-plane (improper) term. The third atom is the center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Improper {
    pub atoms: [usize; 4],
    /// Barrier height in kcal/mol.
    pub barrier: f64,
    /// Current out-of-plane angle in degrees.
    pub angle: f64,
    pub energy: f64,
    pub gradient_magnitude: f64,
}

impl Improper {
    pub fn new(atoms: [usize; 4], barrier: f64) -> Self {
        Self {
            atoms,
            barrier,
            angle: 0.0,
            energy: 0.0,
            gradient_magnitude: 0.0,
        }
    }
}

/// Symmetric adjacency of directly bonded atoms, holding the current bond length.
///
/// Each atom keeps its neighbors in a sorted map, so iteration order is by
/// ascending atom index. Every write goes to both directions, which keeps
/// `length(i, j) == length(j, i)` at all times.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BondGraph {
    adjacency: Vec<BTreeMap<usize, f64>>,
}

impl BondGraph {
    pub fn new(atom_count: usize) -> Self {
        Self {
            adjacency: vec![BTreeMap::new(); atom_count],
        }
    }

    #[inline]
    pub fn atom_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Adds or updates the bond between `i` and `j`. Self-bonds and
    /// out-of-range indices are ignored.
    pub fn insert(&mut self, i: usize, j: usize, length: f64) {
        if i == j || i >= self.adjacency.len() || j >= self.adjacency.len() {
            return;
        }
        self.adjacency[i].insert(j, length);
        self.adjacency[j].insert(i, length);
    }

    /// Updates the length of an existing bond. Returns `false` if the atoms
    /// are not bonded.
    pub fn set_length(&mut self, i: usize, j: usize, length: f64) -> bool {
        if !self.contains(i, j) {
            return false;
        }
        self.insert(i, j, length);
        true
    }

    #[inline]
    pub fn contains(&self, i: usize, j: usize) -> bool {
        self.adjacency
            .get(i)
            .is_some_and(|neighbors| neighbors.contains_key(&j))
    }

    #[inline]
    pub fn length(&self, i: usize, j: usize) -> Option<f64> {
        self.adjacency.get(i)?.get(&j).copied()
    }

    pub fn neighbors(&self, i: usize) -> impl Iterator<Item = usize> + Clone + '_ {
        self.adjacency
            .get(i)
            .into_iter()
            .flat_map(|neighbors| neighbors.keys().copied())
    }

    #[inline]
    pub fn degree(&self, i: usize) -> usize {
        self.adjacency.get(i).map_or(0, BTreeMap::len)
    }

    /// Iterates over each bond once as `(i, j, length)` with `i < j`.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.adjacency.iter().enumerate().flat_map(|(i, neighbors)| {
            neighbors
                .range(i + 1..)
                .map(move |(&j, &length)| (i, j, length))
        })
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(BTreeMap::len).sum::<usize>() / 2
    }
}

/// Unordered atom pairs whose non-bonded interaction is already covered by a bonded term.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionList {
    pairs: HashSet<(usize, usize)>,
}

impl ExclusionList {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    fn key(i: usize, j: usize) -> (usize, usize) {
        if i <= j { (i, j) } else { (j, i) }
    }

    pub fn insert(&mut self, i: usize, j: usize) -> bool {
        self.pairs.insert(Self::key(i, j))
    }

    #[inline]
    pub fn contains(&self, i: usize, j: usize) -> bool {
        self.pairs.contains(&Self::key(i, j))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(usize, usize)> {
        self.pairs.iter()
    }
}
