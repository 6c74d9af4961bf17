//! Discounting helpers for a projected profit series
//!
//! Rates are per period (a year for annual projections). Use `annualize`
//! to turn a monthly rate into an annual one.

const TOLERANCE: f64 = 1e-10;
const MAX_ITERATIONS: usize = 1000;
const MIN_RATE: f64 = -0.99;
const MAX_RATE: f64 = 10.0;

/// Net present value with period 0 undiscounted
pub fn net_present_value(cashflows: &[f64], rate: f64) -> f64 {
    cashflows
        .iter()
        .enumerate()
        .map(|(t, &cf)| cf / (1.0 + rate).powi(t as i32))
        .sum()
}

/// Internal rate of return per period, solved with Newton-Raphson and a
/// bisection fallback.
///
/// Returns `None` for an empty series, a series without a sign change, or
/// when no root lies in (-99%, 1000%).
pub fn internal_rate_of_return(cashflows: &[f64]) -> Option<f64> {
    if cashflows.is_empty() {
        return None;
    }

    if cashflows.iter().all(|&cf| cf.abs() < TOLERANCE) {
        return Some(0.0);
    }

    let has_inflow = cashflows.iter().any(|&cf| cf > TOLERANCE);
    let has_outflow = cashflows.iter().any(|&cf| cf < -TOLERANCE);
    if !has_inflow || !has_outflow {
        return None;
    }

    let mut rate = 0.1;
    for _ in 0..MAX_ITERATIONS {
        let (npv, slope) = npv_and_slope(cashflows, rate);
        if slope.abs() < 1e-20 {
            break;
        }

        let next = (rate - npv / slope).clamp(MIN_RATE, MAX_RATE);
        if (next - rate).abs() < TOLERANCE {
            return Some(next);
        }
        rate = next;
    }

    log::debug!("newton-raphson did not converge; falling back to bisection");
    bisect(cashflows)
}

/// Compound a per-period rate up to an annual one
pub fn annualize(rate: f64, periods_per_year: u32) -> f64 {
    (1.0 + rate).powi(periods_per_year as i32) - 1.0
}

fn npv_and_slope(cashflows: &[f64], rate: f64) -> (f64, f64) {
    let mut npv = 0.0;
    let mut slope = 0.0;

    for (t, &cf) in cashflows.iter().enumerate() {
        let t = t as i32;
        npv += cf / (1.0 + rate).powi(t);
        if t > 0 {
            slope -= t as f64 * cf / (1.0 + rate).powi(t + 1);
        }
    }

    (npv, slope)
}

fn bisect(cashflows: &[f64]) -> Option<f64> {
    let mut low = MIN_RATE;
    let mut high = MAX_RATE;
    let mut npv_low = net_present_value(cashflows, low);

    if npv_low * net_present_value(cashflows, high) > 0.0 {
        return None;
    }

    for _ in 0..MAX_ITERATIONS {
        let mid = (low + high) / 2.0;
        let npv_mid = net_present_value(cashflows, mid);

        if npv_mid.abs() < TOLERANCE || (high - low) / 2.0 < TOLERANCE {
            return Some(mid);
        }

        if npv_mid * npv_low < 0.0 {
            high = mid;
        } else {
            low = mid;
            npv_low = npv_mid;
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_single_period_return() {
        let irr = internal_rate_of_return(&[-1000.0, 1100.0]).unwrap();
        assert_relative_eq!(irr, 0.10, epsilon = 1e-8);
    }

    #[test]
    fn test_npv_at_irr_is_zero() {
        let flows = [-130.0, -9.7, 55.2, 140.0, 210.0];
        let irr = internal_rate_of_return(&flows).unwrap();
        assert!(net_present_value(&flows, irr).abs() < 1e-6);
    }

    #[test]
    fn test_no_sign_change() {
        assert_eq!(internal_rate_of_return(&[-10.0, -5.0]), None);
        assert_eq!(internal_rate_of_return(&[10.0, 5.0]), None);
        assert_eq!(internal_rate_of_return(&[]), None);
        assert_eq!(internal_rate_of_return(&[0.0, 0.0]), Some(0.0));
    }

    #[test]
    fn test_npv_period_zero_undiscounted() {
        assert_relative_eq!(net_present_value(&[-100.0, 110.0], 0.1), 0.0, epsilon = 1e-12);
        assert_eq!(net_present_value(&[42.0], 0.5), 42.0);
    }

    #[test]
    fn test_annualize_monthly_rate() {
        let monthly = (1.1f64).powf(1.0 / 12.0) - 1.0;
        assert_relative_eq!(annualize(monthly, 12), 0.1, epsilon = 1e-12);
    }
}
