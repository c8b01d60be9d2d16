//! Column placement and the full layout pipeline.

use std::collections::HashMap;

use log::{debug, info};
use serde::Serialize;

use super::active::{self, ActiveColumns};
use super::config::FlowConfig;
use super::error::{LayoutError, NoDataReason};
use super::filter;
use super::path::{self, PathDescriptor};
use super::types::{EntityId, EntityLabels, NodeKey, SliceIndex, TransitionGraph};

const LABEL_CHAR_WIDTH: f64 = 7.0;
const LABEL_HEIGHT: f64 = 16.0;
const LEGEND_OFFSET: f64 = 20.0;
const LEGEND_SWATCH: f64 = 12.0;

/// A position in diagram-local space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Point {
	/// Horizontal, growing right.
	pub x: f64,
	/// Vertical, growing down.
	pub y: f64,
}

impl Point {
	/// Point at `(x, y)`.
	pub fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}
}

/// Axis-aligned box anchored at its top-left corner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Rect {
	/// Left edge.
	pub x: f64,
	/// Top edge.
	pub y: f64,
	/// Extent to the right.
	pub width: f64,
	/// Extent downward.
	pub height: f64,
}

impl Rect {
	/// Box with top-left `(x, y)`.
	pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
		Self {
			x,
			y,
			width,
			height,
		}
	}

	/// Where outgoing links leave.
	pub fn right_center(&self) -> Point {
		Point::new(self.x + self.width, self.y + self.height / 2.0)
	}

	/// Where incoming links arrive.
	pub fn left_center(&self) -> Point {
		Point::new(self.x, self.y + self.height / 2.0)
	}

	/// Edges count as inside.
	pub fn contains(&self, p: Point) -> bool {
		p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
	}
}

/// One placed node.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NodeBox {
	/// Entity and slice it stands for.
	pub key: NodeKey,
	/// Placement.
	pub rect: Rect,
}

/// Timestamp header above a column.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ColumnLabel {
	/// Column index.
	pub slice: SliceIndex,
	/// Timestamp label.
	pub text: String,
	/// Text center.
	pub anchor: Point,
	/// Hit area.
	pub bounds: Rect,
}

/// One legend row: color swatch and entity name.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LegendEntry {
	/// Entity shown.
	pub entity: EntityId,
	/// Display name.
	pub label: String,
	/// Color square.
	pub swatch: Rect,
	/// Left-middle of the text.
	pub label_anchor: Point,
	/// Hit area covering swatch and text.
	pub bounds: Rect,
}

/// Geometry for one render pass, in diagram-local coordinates. The renderer
/// translates by `origin` to reach canvas space.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FlowLayout {
	/// Canvas width.
	pub width: f64,
	/// Canvas height.
	pub height: f64,
	/// Canvas position of the diagram-local origin (the top-left margins).
	pub origin: Point,
	/// Plot width inside the margins.
	pub inner_width: f64,
	/// Plot height inside the margins.
	pub inner_height: f64,
	/// Horizontal distance between column centers.
	pub column_width: f64,
	/// Width of every node box.
	pub node_width: f64,
	/// Node boxes, column by column, entities ascending.
	pub nodes: Vec<NodeBox>,
	/// Link curves, in surviving input order.
	pub links: Vec<PathDescriptor>,
	/// One header per timestamp.
	pub columns: Vec<ColumnLabel>,
	/// One row per active entity, ascending.
	pub legend: Vec<LegendEntry>,
	/// Transitions dropped as malformed.
	pub dropped: usize,
}

impl FlowLayout {
	/// Node box for `key`, if active.
	pub fn node(&self, key: &NodeKey) -> Option<&NodeBox> {
		self.nodes.iter().find(|n| n.key == *key)
	}

	/// Whether `entity` is active in any column.
	pub fn has_entity(&self, entity: EntityId) -> bool {
		self.legend.iter().any(|l| l.entity == entity)
	}
}

/// Result of a layout pass.
#[derive(Clone, Debug, PartialEq)]
pub enum FlowOutcome {
	/// Something to draw.
	Ready(FlowLayout),
	/// Show the placeholder instead.
	NoData {
		/// Why nothing is drawn.
		reason: NoDataReason,
		/// Transitions dropped as malformed.
		dropped: usize,
	},
}

impl FlowOutcome {
	/// The geometry, when ready.
	pub fn layout(&self) -> Option<&FlowLayout> {
		match self {
			FlowOutcome::Ready(layout) => Some(layout),
			FlowOutcome::NoData { .. } => None,
		}
	}
}

fn check_dimensions(width: f64, height: f64) -> Result<(), LayoutError> {
	if width.is_finite() && height.is_finite() && width >= 0.0 && height >= 0.0 {
		Ok(())
	} else {
		Err(LayoutError::InvalidDimensions { width, height })
	}
}

/// `max_node_width`, or a fraction of the column when that is narrower.
pub fn node_width(column_width: f64, cfg: &FlowConfig) -> f64 {
	cfg.max_node_width.min(column_width * cfg.node_width_fraction)
}

/// Stacks `entities` (already sorted) as a vertically centered block inside
/// column `column_index`. Node height adapts to the available height; if even
/// the minimum sizes overflow, the block is scaled down to fit exactly.
pub fn layout_column(
	entities: &[EntityId],
	column_index: SliceIndex,
	available_height: f64,
	column_width: f64,
	cfg: &FlowConfig,
) -> Result<Vec<NodeBox>, LayoutError> {
	check_dimensions(column_width, available_height)?;
	cfg.validate()?;
	if entities.is_empty() {
		return Ok(Vec::new());
	}

	let n = entities.len() as f64;
	let width = node_width(column_width, cfg);
	let x = column_index as f64 * column_width - width / 2.0;

	let mut padding = ((available_height - n * cfg.min_node_height) / (n + 1.0))
		.clamp(cfg.min_padding, cfg.max_padding);
	let mut height = ((available_height - (n + 1.0) * padding) / n)
		.clamp(cfg.min_node_height, cfg.max_node_height);

	let mut block = n * height + (n - 1.0) * padding;
	if block > available_height {
		let scale = available_height / block;
		height *= scale;
		padding *= scale;
		block = available_height;
	}
	let start_y = ((available_height - block) / 2.0).max(0.0);

	Ok(entities
		.iter()
		.enumerate()
		.map(|(i, &entity)| NodeBox {
			key: NodeKey::new(entity, column_index),
			rect: Rect::new(x, start_y + i as f64 * (height + padding), width, height),
		})
		.collect())
}

/// Runs the full pipeline: resolve, filter, collect active nodes, place
/// columns and build link paths. Deterministic for identical input.
pub fn compute_layout(
	graph: &TransitionGraph,
	labels: &EntityLabels,
	cfg: &FlowConfig,
	width: f64,
	height: f64,
) -> Result<FlowOutcome, LayoutError> {
	check_dimensions(width, height)?;
	cfg.validate()?;

	let slice_count = graph.timestamps.len();
	if slice_count < 2 || graph.num_entities == 0 {
		info!("flow diagram placeholder: {}", NoDataReason::InsufficientData);
		return Ok(FlowOutcome::NoData {
			reason: NoDataReason::InsufficientData,
			dropped: 0,
		});
	}

	let resolved = filter::resolve_links(&graph.links, &graph.timestamps);
	let surviving = filter::filter(&resolved.transitions, cfg.threshold);
	if surviving.is_empty() {
		info!("flow diagram placeholder: {}", NoDataReason::EmptyAfterFiltering);
		return Ok(FlowOutcome::NoData {
			reason: NoDataReason::EmptyAfterFiltering,
			dropped: resolved.dropped,
		});
	}

	let m = cfg.margins;
	let inner_width = (width - m.left - m.right).max(0.0);
	let inner_height = (height - m.top - m.bottom).max(0.0);
	let column_width = inner_width / (slice_count - 1) as f64;

	let active: ActiveColumns = active::resolve(&surviving, slice_count);
	let mut nodes = Vec::new();
	for (column_index, entities) in active.iter().enumerate() {
		nodes.extend(layout_column(
			entities,
			column_index,
			inner_height,
			column_width,
			cfg,
		)?);
	}

	let rects: HashMap<NodeKey, Rect> = nodes.iter().map(|n| (n.key, n.rect)).collect();
	let links: Vec<PathDescriptor> = surviving
		.iter()
		.filter_map(|t| {
			let (source, target) = (rects.get(&t.from)?, rects.get(&t.to)?);
			Some(path::build_path(source, target, t, cfg))
		})
		.collect();

	let columns = graph
		.timestamps
		.iter()
		.enumerate()
		.map(|(slice, text)| {
			let anchor = Point::new(slice as f64 * column_width, -m.top / 2.0);
			let w = (text.chars().count() as f64 * LABEL_CHAR_WIDTH).max(40.0);
			ColumnLabel {
				slice,
				text: text.clone(),
				anchor,
				bounds: Rect::new(
					anchor.x - w / 2.0,
					anchor.y - LABEL_HEIGHT / 2.0,
					w,
					LABEL_HEIGHT,
				),
			}
		})
		.collect();

	let legend_x = inner_width + LEGEND_OFFSET;
	let legend = active::active_entities(&active)
		.into_iter()
		.enumerate()
		.map(|(row, entity)| {
			let y = row as f64 * cfg.legend_row_height;
			let label = labels.label_for(entity);
			let text_width = label.chars().count() as f64 * LABEL_CHAR_WIDTH;
			LegendEntry {
				entity,
				swatch: Rect::new(legend_x, y, LEGEND_SWATCH, LEGEND_SWATCH),
				label_anchor: Point::new(legend_x + LEGEND_SWATCH + 6.0, y + LEGEND_SWATCH / 2.0),
				bounds: Rect::new(legend_x, y, LEGEND_SWATCH + 6.0 + text_width, cfg.legend_row_height),
				label,
			}
		})
		.collect();

	debug!(
		"flow layout: {} nodes, {} links across {} slices",
		nodes.len(),
		links.len(),
		slice_count
	);

	Ok(FlowOutcome::Ready(FlowLayout {
		width,
		height,
		origin: Point::new(m.left, m.top),
		inner_width,
		inner_height,
		column_width,
		node_width: node_width(column_width, cfg),
		nodes,
		links,
		columns,
		legend,
		dropped: resolved.dropped,
	}))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::flow_diagram::types::FlowLink;

	fn link(fe: EntityId, fs: &str, te: EntityId, ts: &str, value: f64) -> FlowLink {
		FlowLink {
			from_entity: fe,
			from_timestamp: fs.into(),
			to_entity: te,
			to_timestamp: ts.into(),
			value,
		}
	}

	fn sample() -> TransitionGraph {
		TransitionGraph {
			timestamps: vec!["2020".into(), "2021".into(), "2022".into()],
			num_entities: 2,
			links: vec![
				link(0, "2020", 0, "2021", 0.8),
				link(0, "2020", 1, "2021", 0.15),
				link(1, "2021", 1, "2022", 0.9),
			],
		}
	}

	fn ready(outcome: FlowOutcome) -> FlowLayout {
		match outcome {
			FlowOutcome::Ready(layout) => layout,
			other => panic!("expected layout, got {:?}", other),
		}
	}

	#[test]
	fn single_node_is_centered() {
		let cfg = FlowConfig::default();
		let boxes = layout_column(&[4], 2, 200.0, 100.0, &cfg).unwrap();
		assert_eq!(boxes.len(), 1);
		let r = boxes[0].rect;
		assert_eq!(r.height, 35.0);
		assert_eq!(r.y, (200.0 - 35.0) / 2.0);
		assert_eq!(r.width, 20.0);
		assert_eq!(r.x, 200.0 - 10.0);
	}

	#[test]
	fn empty_column_has_no_rects() {
		let boxes = layout_column(&[], 0, 200.0, 100.0, &FlowConfig::default()).unwrap();
		assert!(boxes.is_empty());
	}

	#[test]
	fn adaptive_height_and_padding() {
		let cfg = FlowConfig::default();
		// padding = clamp((100 - 60) / 5, 4, 10) = 8; height = clamp((100 - 40) / 4, 15, 35) = 15
		let boxes = layout_column(&[0, 1, 2, 3], 0, 100.0, 40.0, &cfg).unwrap();
		assert!(boxes.iter().all(|b| b.rect.height == 15.0));
		assert_eq!(boxes[1].rect.y - boxes[0].rect.y, 23.0);
		assert_eq!(boxes[0].rect.width, 10.0);
		let block = 4.0 * 15.0 + 3.0 * 8.0;
		assert_eq!(boxes[0].rect.y, (100.0 - block) / 2.0);
	}

	#[test]
	fn overflow_is_compressed_without_overlap() {
		let cfg = FlowConfig::default();
		let entities: Vec<EntityId> = (0..30).collect();
		let boxes = layout_column(&entities, 1, 120.0, 80.0, &cfg).unwrap();
		assert_eq!(boxes.len(), 30);
		for pair in boxes.windows(2) {
			assert!(pair[0].rect.y + pair[0].rect.height <= pair[1].rect.y + 1e-9);
		}
		assert!(boxes[0].rect.y >= 0.0);
		let last = boxes[29].rect;
		assert!(last.y + last.height <= 120.0 + 1e-9);
	}

	#[test]
	fn negative_dimensions_are_contract_errors() {
		let cfg = FlowConfig::default();
		assert!(matches!(
			layout_column(&[0], 0, -1.0, 10.0, &cfg),
			Err(LayoutError::InvalidDimensions { .. })
		));
		assert!(matches!(
			compute_layout(&sample(), &EntityLabels::default(), &cfg, f64::NAN, 300.0),
			Err(LayoutError::InvalidDimensions { .. })
		));
	}

	#[test]
	fn inverted_ranges_are_errors_not_panics() {
		let padding = FlowConfig {
			min_padding: 12.0,
			..FlowConfig::default()
		};
		assert!(matches!(
			layout_column(&[0, 1], 0, 200.0, 100.0, &padding),
			Err(LayoutError::InvalidConfig { field: "padding", .. })
		));

		let stroke = FlowConfig {
			stroke_min: 11.0,
			..FlowConfig::default()
		};
		assert!(matches!(
			compute_layout(&sample(), &EntityLabels::default(), &stroke, 800.0, 400.0),
			Err(LayoutError::InvalidConfig { field: "stroke", .. })
		));
	}

	#[test]
	fn sample_scenario_nodes_and_strokes() {
		let cfg = FlowConfig::default();
		let layout = ready(compute_layout(&sample(), &EntityLabels::default(), &cfg, 800.0, 400.0).unwrap());
		let keys: Vec<NodeKey> = layout.nodes.iter().map(|n| n.key).collect();
		assert_eq!(
			keys,
			vec![
				NodeKey::new(0, 0),
				NodeKey::new(0, 1),
				NodeKey::new(1, 1),
				NodeKey::new(1, 2),
			]
		);
		assert!(layout.node(&NodeKey::new(1, 0)).is_none());
		let strokes: Vec<f64> = layout.links.iter().map(|l| l.stroke_width).collect();
		assert_eq!(strokes[0], 10.0);
		assert!((strokes[1] - 3.75).abs() < 1e-9);
		assert_eq!(strokes[2], 10.0);
		assert_eq!(layout.columns.len(), 3);
		assert_eq!(layout.legend.len(), 2);
		assert_eq!(layout.legend[1].label, "Entity 1");
		assert_eq!(layout.origin, Point::new(40.0, 40.0));
		assert_eq!(layout.column_width, 300.0);
	}

	#[test]
	fn paths_start_and_end_on_their_nodes() {
		let cfg = FlowConfig::default();
		let layout = ready(compute_layout(&sample(), &EntityLabels::default(), &cfg, 800.0, 400.0).unwrap());
		for l in &layout.links {
			let from = layout.node(&l.from).unwrap().rect;
			let to = layout.node(&l.to).unwrap().rect;
			assert_eq!(l.source, from.right_center());
			assert_eq!(l.target, to.left_center());
		}
	}

	#[test]
	fn insufficient_inputs_give_placeholder() {
		let cfg = FlowConfig::default();
		let labels = EntityLabels::default();
		let mut one_slice = sample();
		one_slice.timestamps.truncate(1);
		assert_eq!(
			compute_layout(&one_slice, &labels, &cfg, 800.0, 400.0).unwrap(),
			FlowOutcome::NoData {
				reason: NoDataReason::InsufficientData,
				dropped: 0
			}
		);

		let mut no_entities = sample();
		no_entities.num_entities = 0;
		assert!(matches!(
			compute_layout(&no_entities, &labels, &cfg, 800.0, 400.0).unwrap(),
			FlowOutcome::NoData {
				reason: NoDataReason::InsufficientData,
				..
			}
		));
	}

	#[test]
	fn malformed_links_are_counted() {
		let mut graph = sample();
		graph.links.push(link(0, "1999", 1, "2020", 0.5));
		let layout = ready(
			compute_layout(&graph, &EntityLabels::default(), &FlowConfig::default(), 800.0, 400.0)
				.unwrap(),
		);
		assert_eq!(layout.dropped, 1);
		assert_eq!(layout.links.len(), 3);
	}

	#[test]
	fn tiny_canvas_still_lays_out() {
		let layout = ready(
			compute_layout(&sample(), &EntityLabels::default(), &FlowConfig::default(), 50.0, 30.0)
				.unwrap(),
		);
		assert_eq!(layout.inner_width, 0.0);
		assert_eq!(layout.inner_height, 0.0);
		assert!(layout.nodes.iter().all(|n| n.rect.height == 0.0));
	}
}
