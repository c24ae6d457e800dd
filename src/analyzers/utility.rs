use crate::error::MetricsError;

/// Computes the arithmetic mean of a slice of values.
///
/// # Errors
///
/// Returns [`MetricsError::DivisionByZero`] for empty input.
pub fn mean(values: &[f64]) -> Result<f64, MetricsError> {
    if values.is_empty() {
        return Err(MetricsError::DivisionByZero("mean of empty set".into()));
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Computes `Σ(wᵢ·xᵢ) / Σwᵢ` over `(weight, value)` pairs and returns it with
/// the weight total.
///
/// # Errors
///
/// Returns [`MetricsError::DivisionByZero`] if the weights sum to zero.
pub fn weighted_mean(pairs: &[(f64, f64)]) -> Result<(f64, f64), MetricsError> {
    let total_weight: f64 = pairs.iter().map(|(w, _)| w).sum();
    if total_weight == 0.0 {
        return Err(MetricsError::DivisionByZero("total weight is zero".into()));
    }
    let weighted_sum: f64 = pairs.iter().map(|(w, x)| w * x).sum();
    Ok((total_weight, weighted_sum / total_weight))
}

/// Mean squared deviation of `values` from `center`, divided by the number of
/// values.
///
/// # Errors
///
/// Returns [`MetricsError::DivisionByZero`] for empty input.
pub fn variance_about(values: &[f64], center: f64) -> Result<f64, MetricsError> {
    if values.is_empty() {
        return Err(MetricsError::DivisionByZero("variance of empty set".into()));
    }
    Ok(values.iter().map(|v| (v - center).powi(2)).sum::<f64>() / values.len() as f64)
}
