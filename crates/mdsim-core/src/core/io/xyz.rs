use super::energy::OutputFormat;
use crate::core::models::atom::Atom;
use std::io::{self, Write};

/// Appends one XYZ frame: atom count, a time comment, and one line per atom.
pub fn write_frame<W: Write>(
    writer: &mut W,
    time: f64,
    atoms: &[Atom],
    format: &OutputFormat,
) -> io::Result<()> {
    writeln!(writer, "{}", atoms.len())?;
    writeln!(writer, "{:.4} ps", time)?;
    let width = format.geometry_chars;
    let prec = format.geometry_digits;
    for atom in atoms {
        writeln!(
            writer,
            "{:<2} {:>width$.prec$} {:>width$.prec$} {:>width$.prec$}",
            atom.element,
            atom.position.x,
            atom.position.y,
            atom.position.z,
        )?;
    }
    Ok(())
}
