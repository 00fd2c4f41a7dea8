//! # Capped Arithmetic
//!
//! Saturating helpers for every computation involving deposits, stakes,
//! appeal costs and rewards. Results clamp to `0` or [`Amount::MAX`]
//! rather than wrapping, so an adversarial multiplier or a governance typo
//! can never turn a huge required stake into a tiny one.

/// A quantity of the fungible asset, in its smallest unit.
pub type Amount = u128;

/// Divisor for basis-point multipliers (10 000 bps = 100%).
pub const MULTIPLIER_DIVISOR: u64 = 10_000;

/// Saturating arithmetic on [`Amount`].
pub trait CappedMath: Sized {
    /// `self + rhs`, capped at the maximum value.
    fn add_cap(self, rhs: Self) -> Self;
    /// `self - rhs`, floored at zero.
    fn sub_cap(self, rhs: Self) -> Self;
    /// `self * rhs`, capped at the maximum value.
    fn mul_cap(self, rhs: Self) -> Self;
}

impl CappedMath for Amount {
    fn add_cap(self, rhs: Self) -> Self {
        self.saturating_add(rhs)
    }

    fn sub_cap(self, rhs: Self) -> Self {
        self.saturating_sub(rhs)
    }

    fn mul_cap(self, rhs: Self) -> Self {
        self.saturating_mul(rhs)
    }
}

/// Apply a basis-point multiplier: `amount * bps / MULTIPLIER_DIVISOR`.
///
/// The product is computed first (capped), then divided, so truncation only
/// happens once.
pub fn apply_bps(amount: Amount, bps: u64) -> Amount {
    amount.mul_cap(Amount::from(bps)) / Amount::from(MULTIPLIER_DIVISOR)
}

/// `base * 2^exponent`, capped at the maximum value.
pub fn doubled(base: Amount, exponent: u32) -> Amount {
    match 2u128.checked_pow(exponent) {
        Some(factor) => base.mul_cap(factor),
        None if base == 0 => 0,
        None => Amount::MAX,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn add_saturates() {
        assert_eq!(Amount::MAX.add_cap(1), Amount::MAX);
        assert_eq!(2u128.add_cap(3), 5);
    }

    #[test]
    fn sub_floors_at_zero() {
        assert_eq!(3u128.sub_cap(5), 0);
        assert_eq!(5u128.sub_cap(3), 2);
    }

    #[test]
    fn mul_saturates() {
        assert_eq!(Amount::MAX.mul_cap(2), Amount::MAX);
        assert_eq!(6u128.mul_cap(7), 42);
    }

    #[test]
    fn bps_multiplier() {
        assert_eq!(apply_bps(1_000, 10_000), 1_000);
        assert_eq!(apply_bps(1_000, 5_000), 500);
        assert_eq!(apply_bps(999, 3_333), 332);
        assert_eq!(apply_bps(Amount::MAX, 20_000), Amount::MAX / 10_000);
    }

    #[test]
    fn doubling_per_round() {
        assert_eq!(doubled(100, 0), 100);
        assert_eq!(doubled(100, 1), 200);
        assert_eq!(doubled(100, 3), 800);
        assert_eq!(doubled(1, 200), Amount::MAX);
        assert_eq!(doubled(0, 200), 0);
    }

    proptest! {
        #[test]
        fn add_cap_never_below_operands(a in any::<u128>(), b in any::<u128>()) {
            let r = a.add_cap(b);
            prop_assert!(r >= a && r >= b);
        }

        #[test]
        fn sub_cap_never_above_lhs(a in any::<u128>(), b in any::<u128>()) {
            prop_assert!(a.sub_cap(b) <= a);
        }

        #[test]
        fn mul_cap_matches_checked_when_no_overflow(a in any::<u64>(), b in any::<u64>()) {
            let (a, b) = (u128::from(a), u128::from(b));
            prop_assert_eq!(a.mul_cap(b), a * b);
        }
    }
}
