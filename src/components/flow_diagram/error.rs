//! Layout errors and placeholder reasons.

use std::fmt;

/// Caller contract violations. Data-quality problems never surface here.
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
	/// Negative or non-finite canvas or column size.
	#[error("invalid layout dimensions: width={width}, height={height}")]
	InvalidDimensions {
		/// Offending width.
		width: f64,
		/// Offending height.
		height: f64,
	},
	/// A `min`/`max` pair in [`FlowConfig`](super::FlowConfig) that cannot bound a range.
	#[error("invalid flow config: {field} range [{min}, {max}]")]
	InvalidConfig {
		/// Name of the range, e.g. `padding`.
		field: &'static str,
		/// Configured lower bound.
		min: f64,
		/// Configured upper bound.
		max: f64,
	},
	/// Malformed JSON payload.
	#[error("transition graph JSON error: {0}")]
	Json(#[from] serde_json::Error),
}

/// Why the diagram falls back to its placeholder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoDataReason {
	/// Fewer than two time slices, or zero entities.
	InsufficientData,
	/// Every transition fell at or below the significance threshold.
	EmptyAfterFiltering,
}

impl fmt::Display for NoDataReason {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			NoDataReason::InsufficientData => f.write_str("insufficient data"),
			NoDataReason::EmptyAfterFiltering => f.write_str("no significant transitions"),
		}
	}
}
