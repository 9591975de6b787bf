use crate::core::io::traits::StructureFile;
use crate::core::models::atom::Atom;
use crate::core::models::system::MolecularSystem;
use nalgebra::Point3;
use std::io::{self, BufRead, Write};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum PqrError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse { line: usize, kind: PqrParseErrorKind },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PqrParseErrorKind {
    #[error("ATOM/HETATM record must have 10 or 11 fields, found {0}")]
    FieldCount(usize),
    #[error("Invalid integer in field '{field}' (value: '{value}')")]
    InvalidInt { field: &'static str, value: String },
    #[error("Invalid float in field '{field}' (value: '{value}')")]
    InvalidFloat { field: &'static str, value: String },
}

/// Whitespace-separated PQR structures with optional chain identifiers.
pub struct PqrFile;

fn parse_int(token: &str, field: &'static str, line: usize) -> Result<isize, PqrError> {
    token.parse().map_err(|_| PqrError::Parse {
        line,
        kind: PqrParseErrorKind::InvalidInt {
            field,
            value: token.to_string(),
        },
    })
}

fn parse_float(token: &str, field: &'static str, line: usize) -> Result<f64, PqrError> {
    token.parse().map_err(|_| PqrError::Parse {
        line,
        kind: PqrParseErrorKind::InvalidFloat {
            field,
            value: token.to_string(),
        },
    })
}

fn parse_atom(tokens: &[&str], line: usize) -> Result<Atom, PqrError> {
    let (chain_id, rest) = match tokens.len() {
        10 => (None, &tokens[4..]),
        11 => (tokens[4].chars().next(), &tokens[5..]),
        n => {
            return Err(PqrError::Parse {
                line,
                kind: PqrParseErrorKind::FieldCount(n),
            });
        }
    };

    let serial = parse_int(tokens[1], "serial", line)?;
    let serial = usize::try_from(serial).map_err(|_| PqrError::Parse {
        line,
        kind: PqrParseErrorKind::InvalidInt {
            field: "serial",
            value: tokens[1].to_string(),
        },
    })?;
    let residue_number = parse_int(rest[0], "residue number", line)?;
    let x = parse_float(rest[1], "x", line)?;
    let y = parse_float(rest[2], "y", line)?;
    let z = parse_float(rest[3], "z", line)?;
    let charge = parse_float(rest[4], "charge", line)?;
    let radius = parse_float(rest[5], "radius", line)?;

    let mut atom = Atom::new(serial, tokens[2], Point3::new(x, y, z)).with_charge(charge);
    atom.residue_name = tokens[3].to_string();
    atom.residue_number = residue_number;
    atom.chain_id = chain_id;
    atom.radius = radius;
    Ok(atom)
}

impl StructureFile for PqrFile {
    type Error = PqrError;

    fn read_from(reader: &mut impl BufRead) -> Result<MolecularSystem, Self::Error> {
        let mut system = MolecularSystem::new();
        let mut conect: Vec<(usize, usize, usize)> = Vec::new();

        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_num = line_num + 1;
            let tokens: Vec<&str> = line.split_whitespace().collect();
            let Some(&record) = tokens.first() else {
                continue;
            };

            match record {
                "ATOM" | "HETATM" => {
                    system.add_atom(parse_atom(&tokens, line_num)?);
                }
                "CONECT" => {
                    if tokens.len() != 3 {
                        debug!("Skipping CONECT on line {} without exactly two atoms.", line_num);
                        continue;
                    }
                    match (tokens[1].parse(), tokens[2].parse()) {
                        (Ok(a), Ok(b)) => conect.push((line_num, a, b)),
                        _ => warn!("Skipping malformed CONECT on line {}.", line_num),
                    }
                }
                _ => {}
            }
        }

        // Bonds are resolved after all atoms are known, so CONECT may precede ATOM records.
        let serials = system.serial_index();
        for (line_num, a, b) in conect {
            match (serials.get(&a), serials.get(&b)) {
                (Some(&i), Some(&j)) => {
                    system.add_bond(i, j);
                }
                _ => warn!(
                    "CONECT on line {} references unknown serial ({} or {}).",
                    line_num, a, b
                ),
            }
        }

        Ok(system)
    }

    fn write_to(system: &MolecularSystem, writer: &mut impl Write) -> Result<(), Self::Error> {
        writeln!(writer, "REMARK Generated by mdsim")?;
        for atom in system.atoms() {
            let chain = atom.chain_id.map(|c| format!(" {}", c)).unwrap_or_default();
            writeln!(
                writer,
                "ATOM  {:>5} {:<4} {:>3}{} {:>4}    {:>8.3} {:>8.3} {:>8.3} {:>8.4} {:>7.4}",
                atom.serial,
                atom.name,
                atom.residue_name,
                chain,
                atom.residue_number,
                atom.position.x,
                atom.position.y,
                atom.position.z,
                atom.charge,
                atom.radius
            )?;
        }
        let atoms = system.atoms();
        for &(i, j) in system.explicit_bonds() {
            writeln!(writer, "CONECT {:>5} {:>5}", atoms[i].serial, atoms[j].serial)?;
        }
        writeln!(writer, "END")?;
        Ok(())
    }
}

/// Reads a PQR file, or warns and returns an empty structure if the file
/// cannot be opened or parsed.
pub fn read_or_empty(path: &Path) -> MolecularSystem {
    match PqrFile::read_from_path(path) {
        Ok(system) => {
            info!(
                "Loaded {} atoms and {} explicit bonds from '{}'.",
                system.len(),
                system.explicit_bonds().len(),
                path.display()
            );
            system
        }
        Err(e) => {
            warn!(
                "Could not read PQR file '{}': {}. Continuing with an empty structure.",
                path.display(),
                e
            );
            MolecularSystem::new()
        }
    }
}
