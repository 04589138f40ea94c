//! Hbar amounts

use std::fmt;

/// Number of tinybars in one hbar
const TINYBARS_PER_HBAR: i64 = 100_000_000;

/// An amount of hbar, stored in tinybars
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Hbar(i64);

impl Hbar {
    /// Zero hbar
    pub const ZERO: Hbar = Hbar(0);

    /// Create an amount from whole hbars
    pub const fn new(hbars: i64) -> Self {
        Hbar(hbars * TINYBARS_PER_HBAR)
    }

    /// Create an amount from tinybars
    pub const fn from_tinybars(tinybars: i64) -> Self {
        Hbar(tinybars)
    }

    /// The amount in tinybars
    pub const fn to_tinybars(self) -> i64 {
        self.0
    }

    /// The negated amount
    pub const fn negated(self) -> Self {
        Hbar(-self.0)
    }
}

impl std::ops::Add for Hbar {
    type Output = Hbar;

    fn add(self, rhs: Hbar) -> Hbar {
        Hbar(self.0 + rhs.0)
    }
}

impl fmt::Display for Hbar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 % TINYBARS_PER_HBAR == 0 {
            write!(f, "{} ℏ", self.0 / TINYBARS_PER_HBAR)
        } else {
            write!(f, "{} tℏ", self.0)
        }
    }
}

impl fmt::Debug for Hbar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hbar({})", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hbar_conversions() {
        assert_eq!(Hbar::new(2).to_tinybars(), 200_000_000);
        assert_eq!(Hbar::from_tinybars(5).negated().to_tinybars(), -5);
        assert_eq!(Hbar::new(1) + Hbar::from_tinybars(1), Hbar::from_tinybars(100_000_001));
    }

    #[test]
    fn test_hbar_display() {
        assert_eq!(Hbar::new(3).to_string(), "3 ℏ");
        assert_eq!(Hbar::from_tinybars(15).to_string(), "15 tℏ");
    }
}
