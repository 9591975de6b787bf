use nalgebra::{Point3, Vector3};

/// Infers an element symbol from a force-field type label.
///
/// The element is the first character in upper case, followed by the second
/// character when it is a lower-case letter. This maps `CT` to `C`, `HC` to
/// `H`, and `Cl` to `Cl`.
pub fn element_from_type(type_label: &str) -> String {
    let mut chars = type_label.trim().chars();
    let Some(first) = chars.next() else {
        return String::new();
    };
    let mut element: String = first.to_uppercase().collect();
    if let Some(second) = chars.next() {
        if second.is_ascii_lowercase() {
            element.push(second);
        }
    }
    element
}

/// Represents an atom in a molecular-mechanics simulation.
///
/// Identity fields (`serial`, `name`, residue information) come from the
/// structure file. Physical parameters (`mass`, `covalent_radius`, and the
/// van der Waals constants) are assigned from the force field when the
/// molecular state is built. Kinematic fields are mutated every integration
/// step.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// Serial number from the input file, used to resolve explicit bonds.
    pub serial: usize,
    /// Atom name as written in the structure file.
    pub name: String,
    /// Force-field type label used for every parameter lookup.
    pub force_field_type: String,
    /// Element symbol derived from the type label.
    pub element: String,
    pub residue_name: String,
    pub residue_number: isize,
    pub chain_id: Option<char>,
    /// Partial charge in elementary charge units.
    pub charge: f64,
    /// Radius column from the structure file, in Angstroms.
    pub radius: f64,
    /// Van der Waals half-distance `r0` in Angstroms.
    pub vdw_radius: f64,
    /// Van der Waals well depth in kcal/mol.
    pub vdw_well_depth: f64,
    /// Atomic mass in amu.
    pub mass: f64,
    /// Covalent radius in Angstroms, used for bond inference.
    pub covalent_radius: f64,
    pub position: Point3<f64>,
    /// Velocity in Angstroms per picosecond.
    pub velocity: Vector3<f64>,
    pub previous_velocity: Vector3<f64>,
    /// Acceleration in Angstroms per picosecond squared.
    pub acceleration: Vector3<f64>,
    pub previous_acceleration: Vector3<f64>,
}

impl Atom {
    /// Creates an atom whose name doubles as its force-field type.
    pub fn new(serial: usize, name: &str, position: Point3<f64>) -> Self {
        Self {
            serial,
            name: name.to_string(),
            force_field_type: name.to_string(),
            element: element_from_type(name),
            residue_name: String::new(),
            residue_number: 0,
            chain_id: None,
            charge: 0.0,
            radius: 0.0,
            vdw_radius: 0.0,
            vdw_well_depth: 0.0,
            mass: 0.0,
            covalent_radius: 0.0,
            position,
            velocity: Vector3::zeros(),
            previous_velocity: Vector3::zeros(),
            acceleration: Vector3::zeros(),
            previous_acceleration: Vector3::zeros(),
        }
    }

    pub fn with_charge(mut self, charge: f64) -> Self {
        self.charge = charge;
        self
    }

    /// Kinetic energy in amu·Å²/ps², before unit conversion.
    ///
    /// When `leapfrog` is set the velocity is taken as the average of the
    /// current and previous half-step velocities.
    #[inline]
    pub fn raw_kinetic_energy(&self, leapfrog: bool) -> f64 {
        let v = if leapfrog {
            (self.velocity + self.previous_velocity) * 0.5
        } else {
            self.velocity
        };
        0.5 * self.mass * v.norm_squared()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_from_type_keeps_only_first_letter_of_upper_case_types() {
        assert_eq!(element_from_type("CT"), "C");
        assert_eq!(element_from_type("HC"), "H");
        assert_eq!(element_from_type("OW"), "O");
        assert_eq!(element_from_type("N*"), "N");
    }

    #[test]
    fn element_from_type_keeps_lower_case_second_letter() {
        assert_eq!(element_from_type("Cl"), "Cl");
        assert_eq!(element_from_type("cl"), "Cl");
        assert_eq!(element_from_type("Na"), "Na");
    }

    #[test]
    fn element_from_type_of_empty_label_is_empty() {
        assert_eq!(element_from_type(""), "");
        assert_eq!(element_from_type("  "), "");
    }

    #[test]
    fn new_atom_uses_name_as_force_field_type() {
        let atom = Atom::new(7, "HC", Point3::new(1.0, 2.0, 3.0));
        assert_eq!(atom.serial, 7);
        assert_eq!(atom.force_field_type, "HC");
        assert_eq!(atom.element, "H");
        assert_eq!(atom.velocity, Vector3::zeros());
    }

    #[test]
    fn raw_kinetic_energy_uses_half_step_average_in_leapfrog_mode() {
        let mut atom = Atom::new(1, "C", Point3::origin());
        atom.mass = 2.0;
        atom.velocity = Vector3::new(3.0, 0.0, 0.0);
        atom.previous_velocity = Vector3::new(1.0, 0.0, 0.0);
        assert_eq!(atom.raw_kinetic_energy(false), 9.0);
        assert_eq!(atom.raw_kinetic_energy(true), 4.0);
    }
}
