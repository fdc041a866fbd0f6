/// Order statistics over numeric columns.
///
/// Missing cells (`None`) are dropped before any computation, matching how
/// the dashboard treats empty CSV cells. Every function returns `None` for an
/// input with no present values; callers decide whether that is an error.

use std::cmp::Ordering;

/// Present values of a column, in source order.
pub fn present(values: &[Option<f64>]) -> Vec<f64> {
    values.iter().filter_map(|v| *v).collect()
}

/// Linear-interpolated quantile at fraction `q` (0.0..=1.0).
///
/// Position is `q * (n - 1)` into the sorted values; a fractional position
/// interpolates between its two neighbours.
pub fn quantile(values: &[Option<f64>], q: f64) -> Option<f64> {
    let mut sorted = present(values);
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    Some(quantile_sorted(&sorted, q))
}

/// Same as `quantile` for a slice that is already sorted and non-empty.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let q = q.clamp(0.0, 1.0);
    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let (lo, hi) = (sorted[lower], sorted[upper]);
    if lower == upper || lo == hi {
        return lo;
    }
    // Weighted form: `lo + (hi - lo) * f` overflows when lo and hi are large
    // with opposite signs.
    let fraction = pos - lower as f64;
    lo * (1.0 - fraction) + hi * fraction
}

pub fn max(values: &[Option<f64>]) -> Option<f64> {
    values.iter().filter_map(|v| *v).reduce(f64::max)
}

pub fn min(values: &[Option<f64>]) -> Option<f64> {
    values.iter().filter_map(|v| *v).reduce(f64::min)
}

pub fn mean(values: &[Option<f64>]) -> Option<f64> {
    let present = present(values);
    if present.is_empty() {
        return None;
    }
    Some(present.iter().sum::<f64>() / present.len() as f64)
}

/// Sample standard deviation (n - 1 denominator). Needs two values.
pub fn std_dev(values: &[Option<f64>]) -> Option<f64> {
    let present = present(values);
    if present.len() < 2 {
        return None;
    }
    let n = present.len() as f64;
    let mean = present.iter().sum::<f64>() / n;
    let var = present.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    Some(var.sqrt())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
