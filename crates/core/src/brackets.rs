//! Brackets
//!
//! Inclusive numeric ranges where a missing bound is unbounded on that side.

use rust_decimal::Decimal;

/// An inclusive `(from, to)` range with optional bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Bracket {
    /// Lower bound, inclusive
    pub from: Option<Decimal>,

    /// Upper bound, inclusive
    pub to: Option<Decimal>,
}

impl Bracket {
    /// A bracket with both bounds open.
    pub const UNBOUNDED: Self = Self {
        from: None,
        to: None,
    };

    /// Create a bracket from optional bounds.
    pub const fn new(from: Option<Decimal>, to: Option<Decimal>) -> Self {
        Self { from, to }
    }

    /// Whether `value` lies within the bracket.
    pub fn contains(&self, value: Decimal) -> bool {
        self.from.is_none_or(|from| from <= value) && self.to.is_none_or(|to| value <= to)
    }

    /// Number of bounds that are set.
    pub fn bounds_count(&self) -> u8 {
        u8::from(self.from.is_some()) + u8::from(self.to.is_some())
    }

    /// Whether some value lies in both brackets.
    pub fn overlaps(&self, other: &Self) -> bool {
        let lower = match (self.from, other.from) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };

        let upper = match (self.to, other.to) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };

        match (lower, upper) {
            (Some(lower), Some(upper)) => lower <= upper,
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(value: i64) -> Decimal {
        Decimal::from(value)
    }

    #[test]
    fn bounds_are_inclusive() {
        let bracket = Bracket::new(Some(dec(0)), Some(dec(10)));

        assert!(bracket.contains(dec(0)));
        assert!(bracket.contains(dec(10)));
        assert!(!bracket.contains(dec(11)));
        assert!(!bracket.contains(dec(-1)));
    }

    #[test]
    fn missing_bounds_are_unbounded() {
        assert!(Bracket::UNBOUNDED.contains(dec(1_000_000)));
        assert!(Bracket::new(Some(dec(5)), None).contains(dec(1_000)));
        assert!(Bracket::new(None, Some(dec(5))).contains(dec(-3)));
        assert_eq!(Bracket::new(None, Some(dec(5))).bounds_count(), 1);
    }

    #[test]
    fn overlap_detects_shared_values() {
        let low = Bracket::new(Some(dec(0)), Some(dec(10)));
        let touching = Bracket::new(Some(dec(10)), Some(dec(20)));
        let high = Bracket::new(Some(dec(11)), None);

        assert!(low.overlaps(&touching));
        assert!(!low.overlaps(&high));
        assert!(high.overlaps(&Bracket::UNBOUNDED));
    }
}
