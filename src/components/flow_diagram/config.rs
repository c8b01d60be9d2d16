//! Presentation tuning and the entity palette.

use serde::Deserialize;

use super::error::LayoutError;

/// Categorical palette, indexed by entity id.
pub const COLORS: &[&str] = &[
	"#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
	"#bcbd22", "#17becf",
];

/// Stable color for an entity.
pub fn entity_color(entity: u32) -> &'static str {
	COLORS[entity as usize % COLORS.len()]
}

/// Space around the plotting area; column labels sit in `top`, the legend
/// in `right`.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Margins {
	/// Above the plot.
	pub top: f64,
	/// Right of the plot.
	pub right: f64,
	/// Below the plot.
	pub bottom: f64,
	/// Left of the plot.
	pub left: f64,
}

impl Default for Margins {
	fn default() -> Self {
		Self {
			top: 40.0,
			right: 160.0,
			bottom: 20.0,
			left: 40.0,
		}
	}
}

/// Presentation tuning for the flow diagram. Every field has a default, so a
/// partial JSON object is a valid configuration.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
	/// Transitions with `weight <= threshold` are dropped.
	pub threshold: f64,
	/// Stroke width per unit of weight, before clamping.
	pub stroke_scale: f64,
	/// Thinnest link stroke.
	pub stroke_min: f64,
	/// Thickest link stroke.
	pub stroke_max: f64,
	/// Node box height bounds.
	pub min_node_height: f64,
	/// See `min_node_height`.
	pub max_node_height: f64,
	/// Vertical gap bounds between node boxes.
	pub min_padding: f64,
	/// See `min_padding`.
	pub max_padding: f64,
	/// Node box width cap.
	pub max_node_width: f64,
	/// Node box width as a share of the column width, below the cap.
	pub node_width_fraction: f64,
	/// Base opacity of same-entity links.
	pub continuation_opacity: f64,
	/// Base opacity of links between different entities.
	pub cross_opacity: f64,
	/// Opacity of unfocused nodes while something is focused.
	pub dim_node_opacity: f64,
	/// Opacity of unfocused links while something is focused.
	pub dim_link_opacity: f64,
	/// Opacity of unfocused labels while something is focused.
	pub dim_label_opacity: f64,
	/// Border added to focused nodes and legend swatches.
	pub emphasis_border: f64,
	/// Stroke added to focused links.
	pub emphasis_stroke_boost: f64,
	/// Space around the plotting area.
	pub margins: Margins,
	/// Vertical pitch of legend rows.
	pub legend_row_height: f64,
	/// Seconds for emphasis to ease in.
	pub highlight_duration: f64,
}

impl Default for FlowConfig {
	fn default() -> Self {
		Self {
			threshold: 0.01,
			stroke_scale: 25.0,
			stroke_min: 1.5,
			stroke_max: 10.0,
			min_node_height: 15.0,
			max_node_height: 35.0,
			min_padding: 4.0,
			max_padding: 10.0,
			max_node_width: 20.0,
			node_width_fraction: 0.25,
			continuation_opacity: 0.6,
			cross_opacity: 0.4,
			dim_node_opacity: 0.2,
			dim_link_opacity: 0.1,
			dim_label_opacity: 0.3,
			emphasis_border: 2.0,
			emphasis_stroke_boost: 1.5,
			margins: Margins::default(),
			legend_row_height: 20.0,
			highlight_duration: 0.25,
		}
	}
}

impl FlowConfig {
	/// Reads a (possibly partial) JSON object over the defaults, then validates it.
	pub fn from_json(text: &str) -> Result<Self, LayoutError> {
		let cfg: Self = serde_json::from_str(text)?;
		cfg.validate()?;
		Ok(cfg)
	}

	/// Every clamped range must have finite, non-negative bounds with
	/// `min <= max`.
	pub fn validate(&self) -> Result<(), LayoutError> {
		let ranges = [
			("node_height", self.min_node_height, self.max_node_height),
			("padding", self.min_padding, self.max_padding),
			("stroke", self.stroke_min, self.stroke_max),
		];
		for (field, min, max) in ranges {
			if !(min.is_finite() && max.is_finite() && 0.0 <= min && min <= max) {
				return Err(LayoutError::InvalidConfig { field, min, max });
			}
		}
		Ok(())
	}
}
