/// Percentile of an ascending slice using linear interpolation between the two
/// nearest order statistics (`q` in `[0, 1]`).
///
/// The rank is `q * (n - 1)`; the result is `v[lo] + (v[hi] - v[lo]) * frac`.
/// Returns `None` for an empty slice.
pub fn percentile(sorted: &[f64], q: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let rank = q.clamp(0.0, 1.0) * last as f64;
    let lo = rank.floor() as usize;
    let hi = (rank.ceil() as usize).min(last);
    let frac = rank - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}
