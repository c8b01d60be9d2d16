//! Per-canvas state: layout, hit testing and hover.

use log::debug;

use super::config::FlowConfig;
use super::error::LayoutError;
use super::highlight::{FocusTarget, HighlightCoordinator, PointerEvent};
use super::layout::{self, FlowLayout, FlowOutcome, Point};
use super::types::{EntityId, EntityLabels, NodeKey, TransitionGraph};

/// Extra pointer slack around a link's stroke, in pixels.
pub const LINK_HIT_SLACK: f64 = 3.0;

/// Everything one canvas needs between frames: inputs, current geometry and
/// hover state.
pub struct FlowDiagramState {
	/// Input data.
	pub graph: TransitionGraph,
	/// Entity display names.
	pub labels: EntityLabels,
	/// Active tuning, threshold included.
	pub config: FlowConfig,
	/// Result of the last layout pass.
	pub outcome: FlowOutcome,
	/// Hover focus over `outcome`.
	pub highlight: HighlightCoordinator,
	/// Canvas width in pixels.
	pub width: f64,
	/// Canvas height in pixels.
	pub height: f64,
	/// Whether `tick` advances the highlight fade.
	pub animation_running: bool,
}

impl FlowDiagramState {
	/// Lays out `graph` immediately; fails only on caller contract violations.
	pub fn new(
		graph: TransitionGraph,
		labels: EntityLabels,
		config: FlowConfig,
		width: f64,
		height: f64,
	) -> Result<Self, LayoutError> {
		let outcome = layout::compute_layout(&graph, &labels, &config, width, height)?;
		Ok(Self {
			graph,
			labels,
			config,
			outcome,
			highlight: HighlightCoordinator::new(),
			width,
			height,
			animation_running: true,
		})
	}

	/// Current geometry, unless the placeholder is showing.
	pub fn layout(&self) -> Option<&FlowLayout> {
		self.outcome.layout()
	}

	/// Recomputes all geometry and re-checks the current focus against it.
	pub fn relayout(&mut self) -> Result<(), LayoutError> {
		self.outcome = layout::compute_layout(
			&self.graph,
			&self.labels,
			&self.config,
			self.width,
			self.height,
		)?;
		match &self.outcome {
			FlowOutcome::Ready(layout) => self.highlight.revalidate(layout),
			FlowOutcome::NoData { .. } => self.highlight = HighlightCoordinator::new(),
		}
		debug!("relayout at {}x{}", self.width, self.height);
		Ok(())
	}

	/// New canvas size; relayouts.
	pub fn resize(&mut self, width: f64, height: f64) -> Result<(), LayoutError> {
		self.width = width;
		self.height = height;
		self.relayout()
	}

	/// New significance threshold; relayouts.
	pub fn set_threshold(&mut self, threshold: f64) -> Result<(), LayoutError> {
		self.config.threshold = threshold;
		self.relayout()
	}

	/// New input data; relayouts.
	pub fn set_graph(&mut self, graph: TransitionGraph) -> Result<(), LayoutError> {
		self.graph = graph;
		self.relayout()
	}

	/// Canvas pixels to diagram-local coordinates.
	pub fn screen_to_diagram(&self, sx: f64, sy: f64) -> Point {
		let origin = self.layout().map(|l| l.origin).unwrap_or_default();
		Point::new(sx - origin.x, sy - origin.y)
	}

	/// Node box under a canvas position.
	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<NodeKey> {
		let p = self.screen_to_diagram(sx, sy);
		self.layout()?
			.nodes
			.iter()
			.find(|n| n.rect.contains(p))
			.map(|n| n.key)
	}

	/// Nodes win over links, links over column labels, labels over legend rows.
	pub fn target_at_position(&self, sx: f64, sy: f64) -> Option<FocusTarget> {
		let layout = self.layout()?;
		if let Some(key) = self.node_at_position(sx, sy) {
			return Some(FocusTarget::Node(key));
		}
		let p = self.screen_to_diagram(sx, sy);
		let link = layout
			.links
			.iter()
			.map(|l| (l, l.distance_to(p) - l.stroke_width / 2.0))
			.filter(|&(_, d)| d <= LINK_HIT_SLACK)
			.min_by(|a, b| a.1.total_cmp(&b.1));
		if let Some((link, _)) = link {
			return Some(FocusTarget::link(link));
		}
		if let Some(column) = layout.columns.iter().find(|c| c.bounds.contains(p)) {
			return Some(FocusTarget::Column(column.slice));
		}
		layout
			.legend
			.iter()
			.find(|l| l.bounds.contains(p))
			.map(|l| FocusTarget::LegendEntry(l.entity))
	}

	/// Focuses whatever is under the pointer, or leaves if nothing is.
	pub fn pointer_move(&mut self, sx: f64, sy: f64) {
		let event = match self.target_at_position(sx, sy) {
			Some(target) => PointerEvent::Enter(target),
			None => PointerEvent::Leave,
		};
		self.dispatch(event);
	}

	/// Pointer left the canvas.
	pub fn pointer_leave(&mut self) {
		self.dispatch(PointerEvent::Leave);
	}

	fn dispatch(&mut self, event: PointerEvent) {
		match &self.outcome {
			FlowOutcome::Ready(layout) => self.highlight.dispatch(event, layout),
			FlowOutcome::NoData { .. } => self.highlight = HighlightCoordinator::new(),
		}
	}

	/// Entity and timestamp label of the node under the pointer, if any.
	pub fn click(&self, sx: f64, sy: f64) -> Option<(EntityId, String)> {
		let key = self.node_at_position(sx, sy)?;
		let timestamp = self.graph.timestamps.get(key.slice)?.clone();
		Some((key.entity, timestamp))
	}

	/// Advances animation by `dt` seconds.
	pub fn tick(&mut self, dt: f64) {
		self.highlight.tick(dt, &self.config);
	}
}
