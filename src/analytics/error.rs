//! Analysis error types
//!
//! None of these escape the analytics layer. Each one maps to a well-defined
//! low-confidence or placeholder result; they exist so the degradation path is
//! explicit and logged rather than an implicit empty vector.

use thiserror::Error;

/// Conditions under which analysis falls back to placeholder output
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// A store fetch failed, timed out, or returned nothing
    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    /// Not enough history to say anything meaningful
    #[error("Insufficient data: {injections} injections, {symptoms} symptoms")]
    InsufficientData { injections: usize, symptoms: usize },

    /// A computation would divide by zero or produce a non-finite value
    #[error("Degenerate computation: {0}")]
    ComputationDegenerate(&'static str),
}

impl From<crate::store::StoreError> for AnalysisError {
    fn from(err: crate::store::StoreError) -> Self {
        AnalysisError::DataUnavailable(err.to_string())
    }
}

/// Result type alias for analysis steps
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Fail with `InsufficientData` below the minimum history sizes
pub fn require_history(
    injections: usize,
    symptoms: usize,
    min_injections: usize,
    min_symptoms: usize,
) -> AnalysisResult<()> {
    if injections < min_injections || symptoms < min_symptoms {
        return Err(AnalysisError::InsufficientData {
            injections,
            symptoms,
        });
    }
    Ok(())
}

/// Weighted mean of `(value, weight)` pairs, guarded against zero total weight
pub fn weighted_mean(pairs: impl IntoIterator<Item = (f64, f64)>) -> AnalysisResult<f64> {
    let (sum, total) = pairs
        .into_iter()
        .fold((0.0, 0.0), |(sum, total), (value, weight)| {
            (sum + value * weight, total + weight)
        });

    if total <= 0.0 || !total.is_finite() {
        return Err(AnalysisError::ComputationDegenerate("zero total weight"));
    }
    Ok(sum / total)
}

/// Arithmetic mean, guarded against an empty input
pub fn mean(values: &[f64]) -> AnalysisResult<f64> {
    if values.is_empty() {
        return Err(AnalysisError::ComputationDegenerate("mean of empty set"));
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_history() {
        assert!(require_history(2, 3, 2, 3).is_ok());
        assert_eq!(
            require_history(1, 10, 2, 3),
            Err(AnalysisError::InsufficientData {
                injections: 1,
                symptoms: 10
            })
        );
        assert!(require_history(5, 2, 2, 3).is_err());
    }

    #[test]
    fn test_weighted_mean() {
        let m = weighted_mean([(4.0, 1.0), (8.0, 3.0)]).unwrap();
        assert!((m - 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_weighted_mean_zero_weight() {
        assert!(matches!(
            weighted_mean([(4.0, 0.0), (8.0, 0.0)]),
            Err(AnalysisError::ComputationDegenerate(_))
        ));
        assert!(weighted_mean(std::iter::empty::<(f64, f64)>()).is_err());
    }

    #[test]
    fn test_mean_empty() {
        assert!(mean(&[]).is_err());
        assert_eq!(mean(&[1.0, 2.0, 3.0]).unwrap(), 2.0);
    }

    #[test]
    fn test_store_error_maps_to_unavailable() {
        let err: AnalysisError = crate::store::StoreError::Timeout(500).into();
        assert!(matches!(err, AnalysisError::DataUnavailable(_)));
    }
}
