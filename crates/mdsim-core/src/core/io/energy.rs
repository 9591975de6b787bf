use crate::core::forcefield::term::EnergyBreakdown;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};

/// Column header of the energy table, following the `# KEY value` block.
pub const ENERGY_COLUMNS: &str = "# time e_total e_kin e_pot e_nonbond e_bonded e_boundary e_vdw e_elst e_bond e_angle e_tors e_oop";

/// Numeric widths and precisions for energy tables and trajectories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct OutputFormat {
    pub energy_digits: usize,
    pub energy_chars: usize,
    pub geometry_digits: usize,
    pub geometry_chars: usize,
    pub time_digits: usize,
    pub time_chars: usize,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self {
            energy_digits: 3,
            energy_chars: 10,
            geometry_digits: 3,
            geometry_chars: 7,
            time_digits: 4,
            time_chars: 7,
        }
    }
}

/// Formats `value` in C-style scientific notation (`-1.234e+02`), right aligned.
pub fn format_scientific(value: f64, width: usize, precision: usize) -> String {
    let raw = format!("{:.*e}", precision, value);
    let formatted = match raw.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => raw,
    };
    format!("{:>width$}", formatted, width = width)
}

/// Writes the `# KEY value` header block followed by the column header.
pub fn write_header<W: Write>(writer: &mut W, entries: &[(&str, String)]) -> io::Result<()> {
    writeln!(writer, "#")?;
    for (key, value) in entries {
        writeln!(writer, "# {} {}", key, value)?;
    }
    writeln!(writer, "#")?;
    writeln!(writer, "# energy terms [kcal/mol]")?;
    writeln!(writer, "{}", ENERGY_COLUMNS)
}

/// Writes one row: time, total energy, then the eleven component columns.
pub fn write_row<W: Write>(
    writer: &mut W,
    time: f64,
    energies: &EnergyBreakdown,
    format: &OutputFormat,
) -> io::Result<()> {
    write!(
        writer,
        "{:>width$.prec$}",
        time,
        width = format.time_chars,
        prec = format.time_digits
    )?;
    write!(
        writer,
        " {}",
        format_scientific(
            energies.total(),
            format.energy_chars + 2,
            format.energy_digits + 2
        )
    )?;
    for value in energies.columns() {
        write!(
            writer,
            " {}",
            format_scientific(value, format.energy_chars, format.energy_digits)
        )?;
    }
    writeln!(writer)
}
