//! Robust statistics helpers.
//!
//! Median/MAD z-scores and empirical quantiles over small per-user samples.

use statrs::statistics::{Data, OrderStatistics};

/// Consistency constant relating MAD to the standard deviation of a
/// normal distribution.
const MAD_SCALE: f64 = 1.4826;

/// Robust z-scores of `values`: deviation from the median scaled by
/// 1.4826 * MAD.
///
/// A zero or undefined MAD maps the whole group to 0.0. That guards the
/// division, it is not a statistical claim.
pub fn robust_z(values: &[f64]) -> Vec<f64> {
    if values.is_empty() {
        return Vec::new();
    }
    let median = Data::new(values.to_vec()).median();
    let deviations: Vec<f64> = values.iter().map(|v| (v - median).abs()).collect();
    let mad = Data::new(deviations).median();
    if mad == 0.0 || !mad.is_finite() {
        return vec![0.0; values.len()];
    }
    values
        .iter()
        .map(|v| (v - median) / (MAD_SCALE * mad))
        .collect()
}

/// Empirical quantile of `values` at `tau` in [0, 1]; None when empty.
pub fn quantile(values: &[f64], tau: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(Data::new(values.to_vec()).quantile(tau))
}
