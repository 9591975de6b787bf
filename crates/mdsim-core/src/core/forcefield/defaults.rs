use phf::{Map, phf_map};

/// The built-in AMBER-style parameter set, written in the same record grammar
/// accepted for user parameter files.
pub const DEFAULT_PARAMETERS: &str = include_str!("../../../data/amber.ff");

/// Standard atomic masses in amu, keyed by element symbol.
pub static ATOMIC_MASSES: Map<&'static str, f64> = phf_map! {
    "H" => 1.00794,
    "He" => 4.00260,
    "Li" => 6.94100,
    "Be" => 9.01218,
    "B" => 10.8110,
    "C" => 12.0107,
    "N" => 14.0067,
    "O" => 15.9994,
    "F" => 18.9984,
    "Ne" => 20.1797,
    "Na" => 22.9898,
    "Mg" => 24.3050,
    "Al" => 26.9815,
    "Si" => 28.0855,
    "P" => 30.9738,
    "S" => 32.0650,
    "Cl" => 35.4530,
    "Ar" => 39.9480,
    "K" => 39.0983,
    "Ca" => 40.0780,
    "Sc" => 44.9559,
    "Ti" => 47.8670,
    "V" => 50.9415,
    "Cr" => 51.9961,
    "Mn" => 54.9380,
    "Fe" => 55.8450,
    "Co" => 58.9332,
    "Ni" => 58.6934,
    "Cu" => 63.5460,
    "Zn" => 65.4090,
    "Ga" => 69.7230,
    "Ge" => 72.6400,
    "As" => 74.9216,
    "Se" => 78.9600,
    "Br" => 79.9040,
    "Kr" => 83.7980,
    "I" => 126.904,
    "X" => 0.0,
};

/// Covalent radii in Angstroms, keyed by element symbol.
pub static COVALENT_RADII: Map<&'static str, f64> = phf_map! {
    "H" => 0.37,
    "He" => 0.30,
    "Li" => 1.02,
    "Be" => 0.27,
    "B" => 0.88,
    "C" => 0.77,
    "N" => 0.75,
    "O" => 0.73,
    "F" => 0.71,
    "Ne" => 0.84,
    "Na" => 1.02,
    "Mg" => 0.72,
    "Al" => 1.30,
    "Si" => 1.18,
    "P" => 1.10,
    "S" => 1.03,
    "Cl" => 0.99,
    "Ar" => 1.00,
    "K" => 1.38,
    "Ca" => 1.00,
    "Sc" => 0.75,
    "Ti" => 0.86,
    "V" => 0.79,
    "Cr" => 0.73,
    "Mn" => 0.67,
    "Fe" => 0.61,
    "Co" => 0.64,
    "Ni" => 0.55,
    "Cu" => 0.46,
    "Zn" => 0.60,
    "Ga" => 1.22,
    "Ge" => 1.22,
    "As" => 1.22,
    "Se" => 1.17,
    "Br" => 1.14,
    "Kr" => 1.03,
    "I" => 1.33,
    "X" => 0.0,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn common_organic_elements_have_masses_and_radii() {
        for element in ["H", "C", "N", "O", "S", "P"] {
            assert!(ATOMIC_MASSES.get(element).is_some_and(|&m| m > 0.0));
            assert!(COVALENT_RADII.get(element).is_some_and(|&r| r > 0.0));
        }
    }

    #[test]
    fn placeholder_element_is_massless() {
        assert_eq!(ATOMIC_MASSES.get("X"), Some(&0.0));
    }

    #[test]
    fn embedded_parameter_file_is_not_empty() {
        assert!(DEFAULT_PARAMETERS.lines().any(|l| l.starts_with("bond CT CT")));
    }
}
