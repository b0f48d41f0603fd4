//! The architectural condition code: three mutually exclusive flags.

/// `{Z, N, P}` as produced by arithmetic ops, CMP, and CML.
///
/// Exactly one flag is set per update (see spec.md §4.1): zero, negative,
/// or positive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cc {
    pub z: bool,
    pub n: bool,
    pub p: bool,
}

impl Cc {
    /// Derives a `Cc` from a signed arithmetic result, as every CC-producing
    /// op does.
    #[must_use]
    pub fn from_result(result: i32) -> Self {
        match result.signum() {
            0 => Self { z: true, n: false, p: false },
            -1 => Self { z: false, n: true, p: false },
            _ => Self { z: false, n: false, p: true },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_sets_z_only() {
        assert_eq!(Cc::from_result(0), Cc { z: true, n: false, p: false });
    }

    #[test]
    fn negative_sets_n_only() {
        assert_eq!(Cc::from_result(-7), Cc { z: false, n: true, p: false });
    }

    #[test]
    fn positive_sets_p_only() {
        assert_eq!(Cc::from_result(7), Cc { z: false, n: false, p: true });
    }
}
