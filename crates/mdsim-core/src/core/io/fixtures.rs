use super::pqr::PqrFile;
use super::traits::StructureFile;
use crate::core::models::system::MolecularSystem;
use std::io::{BufReader, Cursor};

/// Staggered ethane near its AMBER equilibrium geometry.
pub const ETHANE_PQR: &str = "\
REMARK ethane
ATOM      1 CT   ETH     1      0.000   0.000   0.000 -0.0486 1.9080
ATOM      2 CT   ETH     1      1.526   0.000   0.000 -0.0486 1.9080
ATOM      3 HC   ETH     1     -0.364   1.028   0.000  0.0162 1.4870
ATOM      4 HC   ETH     1     -0.364  -0.514   0.890  0.0162 1.4870
ATOM      5 HC   ETH     1     -0.364  -0.514  -0.890  0.0162 1.4870
ATOM      6 HC   ETH     1      1.890   0.514   0.890  0.0162 1.4870
ATOM      7 HC   ETH     1      1.890  -1.028   0.000  0.0162 1.4870
ATOM      8 HC   ETH     1      1.890   0.514  -0.890  0.0162 1.4870
END
";

pub fn ethane() -> MolecularSystem {
    PqrFile::read_from(&mut BufReader::new(Cursor::new(ETHANE_PQR)))
        .expect("ethane fixture is valid PQR")
}
