use super::defaults::{ATOMIC_MASSES, COVALENT_RADII, DEFAULT_PARAMETERS};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VdwParam {
    /// Half of the pair minimum distance, in Angstroms.
    pub radius: f64,
    /// Well depth in kcal/mol.
    pub well_depth: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BondParam {
    pub spring: f64,
    pub equilibrium: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngleParam {
    pub spring: f64,
    /// Equilibrium angle in degrees.
    pub equilibrium: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TorsionParam {
    pub barrier: f64,
    /// Phase in degrees.
    pub phase: f64,
    pub periodicity: u32,
    pub paths: u32,
}

#[derive(Debug, Error)]
pub enum ParamLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("unknown record keyword '{0}'")]
    UnknownKeyword(String),
    #[error("'{keyword}' expects {expected} fields, found {found}")]
    FieldCount {
        keyword: &'static str,
        expected: &'static str,
        found: usize,
    },
    #[error("invalid number '{0}'")]
    InvalidNumber(String),
    #[error("torsion path count must be at least 1")]
    InvalidPaths,
}

type Key2 = [String; 2];
type Key3 = [String; 3];
type Key4 = [String; 4];

/// Immutable force-field parameter tables keyed by atom type labels.
///
/// A freshly constructed `ForceField` holds the built-in defaults. Parameter
/// files are layered on top: a record in a file replaces the default record
/// with the same key.
#[derive(Debug, Clone, Default)]
pub struct ForceField {
    masses: HashMap<String, f64>,
    covalent_radii: HashMap<String, f64>,
    vdw: HashMap<String, VdwParam>,
    bonds: HashMap<Key2, BondParam>,
    angles: HashMap<Key3, AngleParam>,
    torsions23: HashMap<Key2, TorsionParam>,
    torsions1234: HashMap<Key4, Vec<TorsionParam>>,
    out_of_plane34: HashMap<Key2, f64>,
    out_of_plane234: HashMap<Key3, f64>,
    out_of_plane1234: HashMap<Key4, f64>,
}

fn key2(a: &str, b: &str) -> Key2 {
    [a.to_string(), b.to_string()]
}

fn key3(a: &str, b: &str, c: &str) -> Key3 {
    [a.to_string(), b.to_string(), c.to_string()]
}

fn key4(a: &str, b: &str, c: &str, d: &str) -> Key4 {
    [a.to_string(), b.to_string(), c.to_string(), d.to_string()]
}

fn number(token: &str) -> Result<f64, RecordError> {
    token
        .parse::<f64>()
        .map_err(|_| RecordError::InvalidNumber(token.to_string()))
}

fn torsion_param(fields: &[&str]) -> Result<TorsionParam, RecordError> {
    let periodicity = number(fields[2])?.abs().round() as u32;
    let paths = number(fields[3])?.round();
    if paths < 1.0 {
        return Err(RecordError::InvalidPaths);
    }
    Ok(TorsionParam {
        barrier: number(fields[0])?,
        phase: number(fields[1])?,
        periodicity,
        paths: paths as u32,
    })
}

fn expect_fields(
    tokens: &[&str],
    keyword: &'static str,
    count: usize,
    expected: &'static str,
) -> Result<(), RecordError> {
    if tokens.len() < count {
        return Err(RecordError::FieldCount {
            keyword,
            expected,
            found: tokens.len().saturating_sub(1),
        });
    }
    Ok(())
}

impl ForceField {
    /// Creates a force field holding the built-in parameter set.
    pub fn new() -> Self {
        let mut forcefield = Self::default();
        let applied = forcefield.apply_records(DEFAULT_PARAMETERS);
        debug!("Loaded {} built-in force-field records.", applied);
        forcefield
    }

    /// Loads a parameter file layered over the built-in defaults.
    pub fn from_file(path: &Path) -> Result<Self, ParamLoadError> {
        let content = std::fs::read_to_string(path).map_err(|e| ParamLoadError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        let mut forcefield = Self::new();
        let applied = forcefield.apply_records(&content);
        info!(
            "Applied {} force-field records from '{}'.",
            applied,
            path.display()
        );
        Ok(forcefield)
    }

    /// Loads a parameter file if one is given, falling back to the defaults
    /// when it cannot be read.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        match path {
            None => Self::new(),
            Some(path) => Self::from_file(path).unwrap_or_else(|e| {
                warn!("{}. Falling back to built-in force-field parameters.", e);
                Self::new()
            }),
        }
    }

    /// Applies every well-formed record in `content`, returning how many were
    /// applied. Malformed or unknown lines are skipped.
    pub fn apply_records(&mut self, content: &str) -> usize {
        let mut applied = 0;
        for (line_num, raw) in content.lines().enumerate() {
            let line = raw.split('#').next().unwrap_or("");
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.is_empty() {
                continue;
            }
            match self.apply_tokens(&tokens) {
                Ok(()) => applied += 1,
                Err(e) => debug!("Skipping parameter line {}: {}", line_num + 1, e),
            }
        }
        applied
    }

    fn apply_tokens(&mut self, tokens: &[&str]) -> Result<(), RecordError> {
        match tokens[0] {
            "mass" => {
                expect_fields(tokens, "mass", 3, "2")?;
                self.masses.insert(tokens[1].to_string(), number(tokens[2])?);
            }
            "radius" => {
                expect_fields(tokens, "radius", 3, "2")?;
                self.covalent_radii
                    .insert(tokens[1].to_string(), number(tokens[2])?);
            }
            "vdw" => {
                expect_fields(tokens, "vdw", 4, "3")?;
                let param = VdwParam {
                    radius: number(tokens[2])?,
                    well_depth: number(tokens[3])?,
                };
                self.vdw.insert(tokens[1].to_string(), param);
            }
            "bond" => {
                expect_fields(tokens, "bond", 5, "4")?;
                let param = BondParam {
                    spring: number(tokens[3])?,
                    equilibrium: number(tokens[4])?,
                };
                self.bonds.insert(key2(tokens[1], tokens[2]), param);
            }
            "angle" => {
                expect_fields(tokens, "angle", 6, "5")?;
                let param = AngleParam {
                    spring: number(tokens[4])?,
                    equilibrium: number(tokens[5])?,
                };
                self.angles
                    .insert(key3(tokens[1], tokens[2], tokens[3]), param);
            }
            "torsion23" => {
                expect_fields(tokens, "torsion23", 7, "6")?;
                let param = torsion_param(&tokens[3..7])?;
                self.torsions23.insert(key2(tokens[1], tokens[2]), param);
            }
            "torsion1234" => {
                let terms = &tokens[5.min(tokens.len())..];
                if tokens.len() < 9 || terms.len() % 4 != 0 {
                    return Err(RecordError::FieldCount {
                        keyword: "torsion1234",
                        expected: "4 types followed by groups of 4",
                        found: tokens.len() - 1,
                    });
                }
                let params = terms
                    .chunks_exact(4)
                    .map(torsion_param)
                    .collect::<Result<Vec<_>, _>>()?;
                self.torsions1234
                    .insert(key4(tokens[1], tokens[2], tokens[3], tokens[4]), params);
            }
            "outOfPlane34" => {
                expect_fields(tokens, "outOfPlane34", 4, "3")?;
                self.out_of_plane34
                    .insert(key2(tokens[1], tokens[2]), number(tokens[3])?);
            }
            "outOfPlane234" => {
                expect_fields(tokens, "outOfPlane234", 5, "4")?;
                self.out_of_plane234
                    .insert(key3(tokens[1], tokens[2], tokens[3]), number(tokens[4])?);
            }
            "outOfPlane1234" => {
                expect_fields(tokens, "outOfPlane1234", 6, "5")?;
                self.out_of_plane1234.insert(
                    key4(tokens[1], tokens[2], tokens[3], tokens[4]),
                    number(tokens[5])?,
                );
            }
            other => return Err(RecordError::UnknownKeyword(other.to_string())),
        }
        Ok(())
    }

    pub fn mass(&self, element: &str) -> Option<f64> {
        let found = self
            .masses
            .get(element)
            .or_else(|| ATOMIC_MASSES.get(element))
            .copied();
        if found.is_none() {
            warn!("No atomic mass for element '{}'.", element);
        }
        found
    }

    pub fn covalent_radius(&self, element: &str) -> Option<f64> {
        let found = self
            .covalent_radii
            .get(element)
            .or_else(|| COVALENT_RADII.get(element))
            .copied();
        if found.is_none() {
            warn!("No covalent radius for element '{}'.", element);
        }
        found
    }

    pub fn vdw(&self, atom_type: &str) -> Option<VdwParam> {
        let found = self.vdw.get(atom_type).copied();
        if found.is_none() {
            warn!("No van der Waals parameters for atom type '{}'.", atom_type);
        }
        found
    }

    /// Bond parameters for a type pair, trying both orders.
    pub fn bond(&self, t1: &str, t2: &str) -> Option<BondParam> {
        let found = self
            .bonds
            .get(&key2(t1, t2))
            .or_else(|| self.bonds.get(&key2(t2, t1)))
            .copied();
        if found.is_none() {
            warn!("No bond parameters for atom types ({}, {}).", t1, t2);
        }
        found
    }

    /// Angle parameters for a type triple, trying the reversed triple second.
    pub fn angle(&self, t1: &str, t2: &str, t3: &str) -> Option<AngleParam> {
        let found = self
            .angles
            .get(&key3(t1, t2, t3))
            .or_else(|| self.angles.get(&key3(t3, t2, t1)))
            .copied();
        if found.is_none() {
            warn!("No angle parameters for atom types ({}, {}, {}).", t1, t2, t3);
        }
        found
    }

    /// Generic torsion parameters keyed on the central bond types.
    pub fn torsion_central(&self, t2: &str, t3: &str) -> Option<TorsionParam> {
        self.torsions23
            .get(&key2(t2, t3))
            .or_else(|| self.torsions23.get(&key2(t3, t2)))
            .copied()
    }

    /// Explicit torsion terms for an exact, ordered type quadruple.
    pub fn torsion_explicit(&self, t1: &str, t2: &str, t3: &str, t4: &str) -> &[TorsionParam] {
        self.torsions1234
            .get(&key4(t1, t2, t3, t4))
            .map_or(&[], Vec::as_slice)
    }

    /// All Fourier terms that apply to a torsion with the given types.
    ///
    /// Combines the central-bond entry with the explicit entries for the
    /// quadruple read in both directions. A palindromic quadruple contributes its
    /// explicit entries twice.
    pub fn torsion(&self, t1: &str, t2: &str, t3: &str, t4: &str) -> Vec<TorsionParam> {
        let mut params = Vec::new();
        let central = self.torsion_central(t2, t3);
        params.extend(central);

        params.extend_from_slice(self.torsion_explicit(t1, t2, t3, t4));
        params.extend_from_slice(self.torsion_explicit(t4, t3, t2, t1));

        if params.is_empty() {
            warn!(
                "No torsion parameters for atom types ({}, {}, {}, {}).",
                t1, t2, t3, t4
            );
        }
        params
    }

    /// Out-of-plane barrier for an ordered quadruple whose third atom is the
    /// center, from the most specific table that has an entry.
    pub fn improper(&self, t1: &str, t2: &str, t3: &str, t4: &str) -> Option<f64> {
        self.out_of_plane1234
            .get(&key4(t1, t2, t3, t4))
            .or_else(|| self.out_of_plane234.get(&key3(t2, t3, t4)))
            .or_else(|| self.out_of_plane34.get(&key2(t3, t4)))
            .copied()
    }
}
