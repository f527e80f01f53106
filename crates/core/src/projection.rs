//! Maturity benefit projection for the goal-maximizer plan.
//!
//! Projects the fund value at a fixed 50-year horizon under two net
//! illustration rates (the regulatory 8% and 4% gross scenarios minus
//! charges). Premiums compound from their contribution year; the three
//! scheduled partial withdrawals compound from their withdrawal year and
//! are subtracted. All arithmetic is plain `f64` with a fixed operation
//! order so results are reproducible across runs and platforms.

// ---------------------------------------------------------------------------
// Product constants
// ---------------------------------------------------------------------------

/// Projection horizon in policy years.
pub const HORIZON_YEARS: u32 = 50;

/// Net annual growth rate for the 8% gross illustration.
pub const RATE_HIGH: f64 = 0.0599227506;

/// Net annual growth rate for the 4% gross illustration.
pub const RATE_LOW: f64 = 0.0253346954;

/// Scheduled partial withdrawals as `(policy_year, multiple_of_premium)`.
pub const WITHDRAWAL_SCHEDULE: [(u32, f64); 3] = [(15, 2.5), (20, 1.0), (27, 2.5)];

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

/// Projected maturity values in whole rupees, one per illustration rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Projection {
    /// Maturity value at [`RATE_HIGH`].
    pub maturity_high: i64,
    /// Maturity value at [`RATE_LOW`].
    pub maturity_low: i64,
}

/// Compound growth factor `(1 + rate)^years` by repeated multiplication.
///
/// Repeated multiplication (rather than `powi`) keeps the operation order
/// fixed, which keeps projected values bit-identical between runs.
fn growth_factor(rate: f64, years: u32) -> f64 {
    let mut factor = 1.0;
    for _ in 0..years {
        factor *= 1.0 + rate;
    }
    factor
}

/// Fund value at the horizon for one rate, before rounding.
///
/// Each premium paid in year `y` (1-based) compounds for
/// `HORIZON_YEARS - y` years. Each scheduled withdrawal is subtracted with
/// the same compounding from its withdrawal year. The schedule applies in
/// full even when `term_years` is shorter than the first withdrawal year,
/// so short terms can project negative.
pub fn maturity_value(premium: f64, term_years: u32, rate: f64) -> f64 {
    let mut value = 0.0;
    for year in 1..=term_years {
        value += premium * growth_factor(rate, HORIZON_YEARS - year);
    }
    for (year, multiple) in WITHDRAWAL_SCHEDULE {
        value -= premium * multiple * growth_factor(rate, HORIZON_YEARS - year);
    }
    value
}

/// Project maturity values at both illustration rates, rounded to whole
/// rupees (half away from zero).
pub fn project(premium: f64, term_years: u32) -> Projection {
    Projection {
        maturity_high: maturity_value(premium, term_years, RATE_HIGH).round() as i64,
        maturity_low: maturity_value(premium, term_years, RATE_LOW).round() as i64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_projection_standard_term() {
        let p = project(100_000.0, 10);
        assert_eq!(p.maturity_high, 10_069_967);
        assert_eq!(p.maturity_low, 1_795_988);
    }

    #[test]
    fn reference_projection_short_term() {
        let p = project(50_000.0, 8);
        assert_eq!(p.maturity_high, 3_978_678);
        assert_eq!(p.maturity_low, 622_512);
    }

    #[test]
    fn reference_projection_long_term() {
        let p = project(250_000.0, 20);
        assert_eq!(p.maturity_high, 44_052_678);
        assert_eq!(p.maturity_low, 10_431_876);
    }

    #[test]
    fn one_year_term_projects_negative() {
        // A single contribution cannot cover three withdrawals.
        let p = project(100_000.0, 1);
        assert_eq!(p.maturity_high, -1_711_504);
        assert_eq!(p.maturity_low, -915_684);
    }

    #[test]
    fn deterministic_across_calls() {
        assert_eq!(project(123_456.0, 12), project(123_456.0, 12));
    }

    #[test]
    fn linear_in_premium() {
        // Contributions and withdrawals both scale with premium, so the
        // pre-rounding value is exactly linear; rounding can differ by 1.
        let single = project(100_000.0, 10);
        let double = project(200_000.0, 10);
        assert!((double.maturity_high - 2 * single.maturity_high).abs() <= 1);
        assert!((double.maturity_low - 2 * single.maturity_low).abs() <= 1);
    }

    #[test]
    fn longer_term_projects_higher() {
        let short = project(100_000.0, 5);
        let long = project(100_000.0, 15);
        assert!(long.maturity_high > short.maturity_high);
        assert!(long.maturity_low > short.maturity_low);
    }

    #[test]
    fn growth_factor_zero_years_is_unit() {
        assert_eq!(growth_factor(RATE_HIGH, 0), 1.0);
    }
}
