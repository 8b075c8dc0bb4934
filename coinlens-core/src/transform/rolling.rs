//! Per-coin series statistics.
//!
//! Pure functions: one coin's values in date order, one output per input.
//! "Undefined" is `None`; division by zero never panics or produces inf.

/// Simple daily return `(p[t] - p[t-1]) / p[t-1]`.
///
/// Undefined at index 0 and wherever the previous price is zero.
pub fn daily_returns(prices: &[f64]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(prices.len());
    if prices.is_empty() {
        return out;
    }
    out.push(None);
    out.extend(prices.windows(2).map(|w| ratio(w[1] - w[0], w[0])));
    out
}

/// Arithmetic mean over the trailing `window` points, using however many
/// points exist when fewer than `window` have been observed.
pub fn trailing_mean(values: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    (0..values.len())
        .map(|i| {
            let slice = &values[(i + 1).saturating_sub(window)..=i];
            slice.iter().sum::<f64>() / slice.len() as f64
        })
        .collect()
}

/// Sample standard deviation (n - 1) of the defined values in the trailing
/// `window` points.
///
/// Undefined until the window holds at least `min_obs` defined values
/// (`min_obs` is clamped to 2, the minimum for a sample deviation).
pub fn trailing_std(values: &[Option<f64>], window: usize, min_obs: usize) -> Vec<Option<f64>> {
    let window = window.max(1);
    let min_obs = min_obs.max(2);
    (0..values.len())
        .map(|i| {
            let defined: Vec<f64> = values[(i + 1).saturating_sub(window)..=i]
                .iter()
                .flatten()
                .copied()
                .collect();
            if defined.len() < min_obs {
                None
            } else {
                Some(sample_std(&defined))
            }
        })
        .collect()
}

/// Running maximum.
pub fn running_max(values: &[f64]) -> Vec<f64> {
    let mut peak = f64::NEG_INFINITY;
    values
        .iter()
        .map(|&v| {
            peak = peak.max(v);
            peak
        })
        .collect()
}

/// Return relative to the first observation: `p[t] / p[0] - 1`.
pub fn cumulative_returns(prices: &[f64]) -> Vec<Option<f64>> {
    let Some(&first) = prices.first() else {
        return Vec::new();
    };
    prices.iter().map(|&p| ratio(p - first, first)).collect()
}

/// Fractional distance below the running peak: `(p - peak) / peak`, <= 0.
pub fn drawdowns(prices: &[f64]) -> Vec<Option<f64>> {
    prices
        .iter()
        .zip(running_max(prices))
        .map(|(&p, peak)| ratio(p - peak, peak))
        .collect()
}

/// `num / den`, undefined when `den` is zero or the result is not finite.
pub(crate) fn ratio(num: f64, den: f64) -> Option<f64> {
    if den == 0.0 {
        return None;
    }
    let r = num / den;
    r.is_finite().then_some(r)
}

fn sample_std(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    var.sqrt()
}
