//! Descriptive statistics and correlation helpers.
//!
//! Pure numeric functions over `f64` slices with no domain knowledge. All of
//! them return finite numbers: empty or zero-variance inputs take explicit
//! branches instead of dividing by zero. Variances and standard deviations
//! are population statistics.

/// Relative tolerance below which a sample is treated as having no spread.
const SPREAD_TOLERANCE: f64 = 1e-12;

/// Arithmetic mean. Returns `0.0` for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Median. Returns `0.0` for an empty slice.
pub fn median(values: &[f64]) -> f64 {
    let sorted = sorted_copy(values);
    quantile(&sorted, 0.5)
}

/// Population variance. Returns `0.0` for an empty slice or identical values.
pub fn variance(values: &[f64]) -> f64 {
    if has_no_spread(values) {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64
}

/// Population standard deviation.
pub fn standard_deviation(values: &[f64]) -> f64 {
    variance(values).sqrt()
}

/// Whether every value is (numerically) the same. Empty slices have no spread.
pub fn has_no_spread(values: &[f64]) -> bool {
    let Some(&first) = values.first() else {
        return true;
    };
    let tolerance = SPREAD_TOLERANCE * first.abs().max(1.0);
    values.iter().all(|v| (v - first).abs() <= tolerance)
}

/// Adjusted Fisher–Pearson skewness.
///
/// `None` with fewer than 3 values; `Some(0.0)` when the values have no spread.
pub fn skewness(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 3 {
        return None;
    }
    if has_no_spread(values) {
        return Some(0.0);
    }
    let nf = n as f64;
    let m = mean(values);
    let m2 = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / nf;
    let m3 = values.iter().map(|v| (v - m).powi(3)).sum::<f64>() / nf;
    let g1 = m3 / m2.powf(1.5);
    Some((nf * (nf - 1.0)).sqrt() / (nf - 2.0) * g1)
}

/// Sample excess kurtosis (bias corrected).
///
/// `None` with fewer than 4 values; `Some(0.0)` when the values have no spread.
pub fn kurtosis(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 4 {
        return None;
    }
    if has_no_spread(values) {
        return Some(0.0);
    }
    let nf = n as f64;
    let m = mean(values);
    let m2 = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / nf;
    let m4 = values.iter().map(|v| (v - m).powi(4)).sum::<f64>() / nf;
    let g2 = m4 / (m2 * m2) - 3.0;
    Some(((nf + 1.0) * g2 + 6.0) * (nf - 1.0) / ((nf - 2.0) * (nf - 3.0)))
}

/// Quantile of an already sorted slice, interpolating linearly between ranks.
pub fn quantile(sorted: &[f64], p: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        n => {
            let h = (n - 1) as f64 * p.clamp(0.0, 1.0);
            let lo = h.floor() as usize;
            let hi = (lo + 1).min(n - 1);
            sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
        }
    }
}

/// Copy and sort ascending.
pub fn sorted_copy(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// Pearson correlation coefficient.
///
/// Returns `0.0` when the slices differ in length, hold fewer than two
/// values, or either side has no spread.
pub fn pearson_correlation(xs: &[f64], ys: &[f64]) -> f64 {
    if xs.len() != ys.len() || xs.len() < 2 {
        return 0.0;
    }
    if has_no_spread(xs) || has_no_spread(ys) {
        return 0.0;
    }
    let mx = mean(xs);
    let my = mean(ys);
    let mut cov = 0.0;
    let mut vx = 0.0;
    let mut vy = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mx;
        let dy = y - my;
        cov += dx * dy;
        vx += dx * dx;
        vy += dy * dy;
    }
    if vx == 0.0 || vy == 0.0 {
        return 0.0;
    }
    (cov / (vx.sqrt() * vy.sqrt())).clamp(-1.0, 1.0)
}

/// Point-biserial correlation between a dichotomous item and total scores.
///
/// `r = (M1 - M0) / σ · sqrt(p·q)`. Returns `0.0` when everyone answered
/// the item the same way, or when the totals have no spread.
pub fn point_biserial_correlation(item: &[bool], totals: &[f64]) -> f64 {
    if item.len() != totals.len() || item.is_empty() {
        return 0.0;
    }
    let correct: Vec<f64> = item
        .iter()
        .zip(totals)
        .filter(|(c, _)| **c)
        .map(|(_, t)| *t)
        .collect();
    let incorrect: Vec<f64> = item
        .iter()
        .zip(totals)
        .filter(|(c, _)| !**c)
        .map(|(_, t)| *t)
        .collect();
    if correct.is_empty() || incorrect.is_empty() {
        return 0.0;
    }
    let sd = standard_deviation(totals);
    if sd == 0.0 {
        return 0.0;
    }
    let n = totals.len() as f64;
    let p = correct.len() as f64 / n;
    let q = 1.0 - p;
    ((mean(&correct) - mean(&incorrect)) / sd * (p * q).sqrt()).clamp(-1.0, 1.0)
}

/// Inverse of the standard normal CDF (Acklam's rational approximation,
/// relative error below 1.2e-9).
pub fn inverse_normal_cdf(p: f64) -> f64 {
    const A: [f64; 6] = [
        -3.969683028665376e+01,
        2.209460984245205e+02,
        -2.759285104469687e+02,
        1.383577518672690e+02,
        -3.066479806614716e+01,
        2.506628277459239e+00,
    ];
    const B: [f64; 5] = [
        -5.447609879822406e+01,
        1.615858368580409e+02,
        -1.556989798598866e+02,
        6.680131188771972e+01,
        -1.328068155288572e+01,
    ];
    const C: [f64; 6] = [
        -7.784894002430293e-03,
        -3.223964580411365e-01,
        -2.400758277161838e+00,
        -2.549732539343734e+00,
        4.374664141464968e+00,
        2.938163982698783e+00,
    ];
    const D: [f64; 4] = [
        7.784695709041462e-03,
        3.224671290700398e-01,
        2.445134137142996e+00,
        3.754408661907416e+00,
    ];
    const P_LOW: f64 = 0.02425;

    if p <= 0.0 {
        return f64::NEG_INFINITY;
    }
    if p >= 1.0 {
        return f64::INFINITY;
    }

    let tail = |q: f64| {
        (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    };

    if p < P_LOW {
        tail((-2.0 * p.ln()).sqrt())
    } else if p <= 1.0 - P_LOW {
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    } else {
        -tail((-2.0 * (1.0 - p).ln()).sqrt())
    }
}

/// Two-sided critical z value for a confidence level in (0, 1).
pub fn z_for_confidence(level: f64) -> f64 {
    inverse_normal_cdf(1.0 - (1.0 - level) / 2.0)
}
