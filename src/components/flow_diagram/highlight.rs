//! Hover focus as a single state value updated by a reducer.
//!
//! The coordinator owns the current focus and its easing progress. Style
//! queries are answered from the state alone, so emphasis and dimming can be
//! checked without a drawing surface.

use std::collections::HashSet;

use super::config::FlowConfig;
use super::layout::{FlowLayout, NodeBox};
use super::path::PathDescriptor;
use super::types::{EntityId, NodeKey, SliceIndex};

/// Something the pointer can rest on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FocusTarget {
	/// A node box; emphasizes its whole entity.
	Node(NodeKey),
	/// A link, named by its endpoints so it survives reordering on relayout.
	Link {
		/// Source node.
		from: NodeKey,
		/// Target node.
		to: NodeKey,
	},
	/// A column header.
	Column(SliceIndex),
	/// A legend row.
	LegendEntry(EntityId),
}

impl FocusTarget {
	/// Focus on the link drawn by `path`.
	pub fn link(path: &PathDescriptor) -> Self {
		FocusTarget::Link {
			from: path.from,
			to: path.to,
		}
	}
}

/// Input to the highlight reducer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerEvent {
	/// Pointer moved onto a target.
	Enter(FocusTarget),
	/// Pointer left every target.
	Leave,
}

/// Everything rendered at emphasis while a target is focused. Links are
/// indices into the [`FlowLayout::links`] the set was built from.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RelevanceSet {
	/// Emphasized node boxes.
	pub nodes: HashSet<NodeKey>,
	/// Emphasized link indices.
	pub links: HashSet<usize>,
	/// Emphasized column labels.
	pub columns: HashSet<SliceIndex>,
	/// Emphasized legend rows.
	pub legend: HashSet<EntityId>,
}

/// Current focus of the coordinator.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum HighlightState {
	/// Nothing focused; every element at its base style.
	#[default]
	Idle,
	/// A target is focused.
	FocusedOn {
		/// What the pointer rests on.
		target: FocusTarget,
		/// What it lights up in the current layout.
		relevance: RelevanceSet,
	},
}

/// How one element is drawn relative to the current focus.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Emphasis {
	/// Nothing is focused.
	Base,
	/// Part of the focused relevance set.
	Emphasized,
	/// Something else is focused.
	Dimmed,
}

/// Presentation attributes the coordinator controls. For nodes and legend
/// swatches `stroke_width` is the border; for links it is the line width; for
/// column labels a non-zero value means bold text.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ElementStyle {
	/// Alpha in `[0, 1]`.
	pub opacity: f64,
	/// Border, line width or label weight, depending on the element.
	pub stroke_width: f64,
}

impl ElementStyle {
	/// Linear blend toward `to`; `t = 0` is `self`.
	pub fn lerp(self, to: ElementStyle, t: f64) -> ElementStyle {
		ElementStyle {
			opacity: self.opacity + (to.opacity - self.opacity) * t,
			stroke_width: self.stroke_width + (to.stroke_width - self.stroke_width) * t,
		}
	}
}

const NODE_BASE_OPACITY: f64 = 0.9;
const NODE_BASE_BORDER: f64 = 1.0;

/// Node style with nothing focused.
pub fn base_node_style() -> ElementStyle {
	ElementStyle {
		opacity: NODE_BASE_OPACITY,
		stroke_width: NODE_BASE_BORDER,
	}
}

/// Link style with nothing focused.
pub fn base_link_style(link: &PathDescriptor) -> ElementStyle {
	ElementStyle {
		opacity: link.base_opacity,
		stroke_width: link.stroke_width,
	}
}

/// Column label and legend style with nothing focused.
pub fn base_label_style() -> ElementStyle {
	ElementStyle {
		opacity: 1.0,
		stroke_width: 0.0,
	}
}

/// Builds the relevance set for `target`, or `None` if the layout no longer
/// contains it.
pub fn relevance(target: FocusTarget, layout: &FlowLayout) -> Option<RelevanceSet> {
	let mut set = RelevanceSet::default();
	match target {
		FocusTarget::Node(key) => {
			layout.node(&key)?;
			collect_entity(&mut set, key.entity, layout);
		}
		FocusTarget::LegendEntry(entity) => {
			if !layout.has_entity(entity) {
				return None;
			}
			collect_entity(&mut set, entity, layout);
		}
		FocusTarget::Link { from, to } => {
			let index = layout
				.links
				.iter()
				.position(|l| l.from == from && l.to == to)?;
			set.links.insert(index);
			set.nodes.insert(from);
			set.nodes.insert(to);
		}
		FocusTarget::Column(slice) => {
			layout.columns.get(slice)?;
			set.columns.insert(slice);
			set.nodes.extend(
				layout
					.nodes
					.iter()
					.filter(|n| n.key.slice == slice)
					.map(|n| n.key),
			);
		}
	}
	Some(set)
}

fn collect_entity(set: &mut RelevanceSet, entity: EntityId, layout: &FlowLayout) {
	set.legend.insert(entity);
	set.nodes.extend(
		layout
			.nodes
			.iter()
			.filter(|n| n.key.entity == entity)
			.map(|n| n.key),
	);
	set.links.extend(
		layout
			.links
			.iter()
			.enumerate()
			.filter(|(_, l)| l.from.entity == entity || l.to.entity == entity)
			.map(|(i, _)| i),
	);
}

/// A new Enter replaces any current focus outright; a target missing from
/// the layout resets to Idle.
pub fn reduce(event: PointerEvent, layout: &FlowLayout) -> HighlightState {
	match event {
		PointerEvent::Leave => HighlightState::Idle,
		PointerEvent::Enter(target) => match relevance(target, layout) {
			Some(relevance) => HighlightState::FocusedOn { target, relevance },
			None => HighlightState::Idle,
		},
	}
}

fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

/// Owns the hover state and its fade-in progress.
#[derive(Clone, Debug, Default)]
pub struct HighlightCoordinator {
	state: HighlightState,
	progress: f64,
}

impl HighlightCoordinator {
	/// Starts Idle.
	pub fn new() -> Self {
		Self::default()
	}

	/// Current state value.
	pub fn state(&self) -> &HighlightState {
		&self.state
	}

	/// Focused target, if any.
	pub fn target(&self) -> Option<FocusTarget> {
		match &self.state {
			HighlightState::Idle => None,
			HighlightState::FocusedOn { target, .. } => Some(*target),
		}
	}

	/// Applies a pointer event. Re-entering the focused target keeps its progress.
	pub fn dispatch(&mut self, event: PointerEvent, layout: &FlowLayout) {
		if let PointerEvent::Enter(target) = event {
			if self.target() == Some(target) {
				return;
			}
		}
		self.state = reduce(event, layout);
		if self.state == HighlightState::Idle {
			self.progress = 0.0;
		}
	}

	/// Re-checks the current focus against a fresh layout; a target that no
	/// longer exists drops back to Idle.
	pub fn revalidate(&mut self, layout: &FlowLayout) {
		if let Some(target) = self.target() {
			self.state = HighlightState::Idle;
			self.dispatch(PointerEvent::Enter(target), layout);
		}
	}

	/// Advances the fade-in by `dt` seconds.
	pub fn tick(&mut self, dt: f64, cfg: &FlowConfig) {
		if self.target().is_none() {
			return;
		}
		self.progress = if cfg.highlight_duration <= 0.0 {
			1.0
		} else {
			(self.progress + dt / cfg.highlight_duration).min(1.0)
		};
	}

	/// Eased emphasis progress in `[0, 1]`.
	pub fn eased(&self) -> f64 {
		ease_out_cubic(self.progress)
	}

	fn classify(&self, pick: impl Fn(&RelevanceSet) -> bool) -> Emphasis {
		match &self.state {
			HighlightState::Idle => Emphasis::Base,
			HighlightState::FocusedOn { relevance, .. } if pick(relevance) => Emphasis::Emphasized,
			HighlightState::FocusedOn { .. } => Emphasis::Dimmed,
		}
	}

	/// Emphasis of a node box.
	pub fn node_emphasis(&self, key: &NodeKey) -> Emphasis {
		self.classify(|r| r.nodes.contains(key))
	}

	/// Emphasis of the link at `index` in the current layout.
	pub fn link_emphasis(&self, index: usize) -> Emphasis {
		self.classify(|r| r.links.contains(&index))
	}

	/// Emphasis of a column label.
	pub fn column_emphasis(&self, slice: SliceIndex) -> Emphasis {
		self.classify(|r| r.columns.contains(&slice))
	}

	/// Emphasis of a legend row.
	pub fn legend_emphasis(&self, entity: EntityId) -> Emphasis {
		self.classify(|r| r.legend.contains(&entity))
	}

	/// Target style of a node at full progress.
	pub fn node_style(&self, node: &NodeBox, cfg: &FlowConfig) -> ElementStyle {
		let base = base_node_style();
		match self.node_emphasis(&node.key) {
			Emphasis::Base => base,
			Emphasis::Emphasized => ElementStyle {
				opacity: 1.0,
				stroke_width: NODE_BASE_BORDER + cfg.emphasis_border,
			},
			Emphasis::Dimmed => ElementStyle {
				opacity: cfg.dim_node_opacity,
				..base
			},
		}
	}

	/// Target style of a link at full progress.
	pub fn link_style(&self, index: usize, link: &PathDescriptor, cfg: &FlowConfig) -> ElementStyle {
		let base = base_link_style(link);
		match self.link_emphasis(index) {
			Emphasis::Base => base,
			Emphasis::Emphasized => ElementStyle {
				opacity: 1.0,
				stroke_width: link.stroke_width + cfg.emphasis_stroke_boost,
			},
			Emphasis::Dimmed => ElementStyle {
				opacity: cfg.dim_link_opacity,
				..base
			},
		}
	}

	/// Target style of a column label at full progress.
	pub fn column_style(&self, slice: SliceIndex, cfg: &FlowConfig) -> ElementStyle {
		label_style(self.column_emphasis(slice), cfg)
	}

	/// Target style of a legend row at full progress.
	pub fn legend_style(&self, entity: EntityId, cfg: &FlowConfig) -> ElementStyle {
		label_style(self.legend_emphasis(entity), cfg)
	}

	/// Blends from the base style toward the logical style by eased progress.
	pub fn animated(&self, base: ElementStyle, style: ElementStyle) -> ElementStyle {
		base.lerp(style, self.eased())
	}
}

fn label_style(emphasis: Emphasis, cfg: &FlowConfig) -> ElementStyle {
	match emphasis {
		Emphasis::Base => base_label_style(),
		Emphasis::Emphasized => ElementStyle {
			opacity: 1.0,
			stroke_width: cfg.emphasis_border,
		},
		Emphasis::Dimmed => ElementStyle {
			opacity: cfg.dim_label_opacity,
			stroke_width: 0.0,
		},
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::flow_diagram::layout::{FlowOutcome, compute_layout};
	use crate::components::flow_diagram::types::{EntityLabels, FlowLink, TransitionGraph};

	fn link(fe: EntityId, fs: &str, te: EntityId, ts: &str, value: f64) -> FlowLink {
		FlowLink {
			from_entity: fe,
			from_timestamp: fs.into(),
			to_entity: te,
			to_timestamp: ts.into(),
			value,
		}
	}

	fn sample_layout() -> FlowLayout {
		let graph = TransitionGraph {
			timestamps: vec!["2020".into(), "2021".into(), "2022".into()],
			num_entities: 2,
			links: vec![
				link(0, "2020", 0, "2021", 0.8),
				link(0, "2020", 1, "2021", 0.15),
				link(1, "2021", 1, "2022", 0.9),
			],
		};
		match compute_layout(&graph, &EntityLabels::default(), &FlowConfig::default(), 800.0, 400.0)
			.unwrap()
		{
			FlowOutcome::Ready(layout) => layout,
			other => panic!("expected layout, got {:?}", other),
		}
	}

	fn all_styles(c: &HighlightCoordinator, layout: &FlowLayout, cfg: &FlowConfig) -> Vec<ElementStyle> {
		let mut out: Vec<ElementStyle> = layout.nodes.iter().map(|n| c.node_style(n, cfg)).collect();
		out.extend(layout.links.iter().enumerate().map(|(i, l)| c.link_style(i, l, cfg)));
		out.extend(layout.columns.iter().map(|col| c.column_style(col.slice, cfg)));
		out.extend(layout.legend.iter().map(|l| c.legend_style(l.entity, cfg)));
		out
	}

	#[test]
	fn legend_focus_partitions_by_entity() {
		let layout = sample_layout();
		let mut c = HighlightCoordinator::new();
		c.dispatch(PointerEvent::Enter(FocusTarget::LegendEntry(0)), &layout);

		assert_eq!(c.node_emphasis(&NodeKey::new(0, 0)), Emphasis::Emphasized);
		assert_eq!(c.node_emphasis(&NodeKey::new(0, 1)), Emphasis::Emphasized);
		assert_eq!(c.node_emphasis(&NodeKey::new(1, 1)), Emphasis::Dimmed);
		assert_eq!(c.node_emphasis(&NodeKey::new(1, 2)), Emphasis::Dimmed);
		assert_eq!(c.link_emphasis(0), Emphasis::Emphasized);
		assert_eq!(c.link_emphasis(1), Emphasis::Emphasized);
		assert_eq!(c.link_emphasis(2), Emphasis::Dimmed);
		assert_eq!(c.legend_emphasis(0), Emphasis::Emphasized);
		assert_eq!(c.legend_emphasis(1), Emphasis::Dimmed);
	}

	#[test]
	fn node_focus_matches_its_entity() {
		let layout = sample_layout();
		let mut c = HighlightCoordinator::new();
		c.dispatch(PointerEvent::Enter(FocusTarget::Node(NodeKey::new(1, 2))), &layout);
		assert_eq!(c.node_emphasis(&NodeKey::new(1, 1)), Emphasis::Emphasized);
		assert_eq!(c.node_emphasis(&NodeKey::new(0, 0)), Emphasis::Dimmed);
		assert_eq!(c.link_emphasis(1), Emphasis::Emphasized);
		assert_eq!(c.link_emphasis(0), Emphasis::Dimmed);
	}

	#[test]
	fn link_focus_is_link_and_endpoints() {
		let layout = sample_layout();
		let mut c = HighlightCoordinator::new();
		c.dispatch(PointerEvent::Enter(FocusTarget::link(&layout.links[1])), &layout);
		assert_eq!(c.link_emphasis(1), Emphasis::Emphasized);
		assert_eq!(c.link_emphasis(0), Emphasis::Dimmed);
		assert_eq!(c.node_emphasis(&NodeKey::new(0, 0)), Emphasis::Emphasized);
		assert_eq!(c.node_emphasis(&NodeKey::new(1, 1)), Emphasis::Emphasized);
		assert_eq!(c.node_emphasis(&NodeKey::new(0, 1)), Emphasis::Dimmed);
	}

	#[test]
	fn column_focus_is_nodes_in_slice() {
		let layout = sample_layout();
		let mut c = HighlightCoordinator::new();
		c.dispatch(PointerEvent::Enter(FocusTarget::Column(1)), &layout);
		assert_eq!(c.node_emphasis(&NodeKey::new(0, 1)), Emphasis::Emphasized);
		assert_eq!(c.node_emphasis(&NodeKey::new(1, 1)), Emphasis::Emphasized);
		assert_eq!(c.node_emphasis(&NodeKey::new(0, 0)), Emphasis::Dimmed);
		assert_eq!(c.column_emphasis(1), Emphasis::Emphasized);
		assert_eq!(c.column_emphasis(0), Emphasis::Dimmed);
	}

	#[test]
	fn enter_replaces_previous_focus() {
		let layout = sample_layout();
		let mut c = HighlightCoordinator::new();
		c.dispatch(PointerEvent::Enter(FocusTarget::LegendEntry(0)), &layout);
		c.dispatch(PointerEvent::Enter(FocusTarget::LegendEntry(1)), &layout);
		assert_eq!(c.target(), Some(FocusTarget::LegendEntry(1)));
		assert_eq!(c.node_emphasis(&NodeKey::new(0, 0)), Emphasis::Dimmed);
		assert_eq!(c.node_emphasis(&NodeKey::new(1, 2)), Emphasis::Emphasized);
	}

	#[test]
	fn unknown_target_resets_to_idle() {
		let layout = sample_layout();
		let mut c = HighlightCoordinator::new();
		c.dispatch(PointerEvent::Enter(FocusTarget::Column(0)), &layout);
		c.dispatch(PointerEvent::Enter(FocusTarget::Node(NodeKey::new(1, 0))), &layout);
		assert_eq!(c.state(), &HighlightState::Idle);
		c.dispatch(
			PointerEvent::Enter(FocusTarget::Link {
				from: NodeKey::new(1, 0),
				to: NodeKey::new(0, 1),
			}),
			&layout,
		);
		assert_eq!(c.state(), &HighlightState::Idle);
	}

	#[test]
	fn leave_restores_baseline() {
		let layout = sample_layout();
		let cfg = FlowConfig::default();
		let mut c = HighlightCoordinator::new();
		let baseline = all_styles(&c, &layout, &cfg);

		c.dispatch(PointerEvent::Enter(FocusTarget::link(&layout.links[0])), &layout);
		c.tick(0.1, &cfg);
		c.dispatch(PointerEvent::Enter(FocusTarget::Column(2)), &layout);
		c.tick(1.0, &cfg);
		assert_ne!(all_styles(&c, &layout, &cfg), baseline);
		c.dispatch(PointerEvent::Leave, &layout);
		assert_eq!(all_styles(&c, &layout, &cfg), baseline);
		assert_eq!(c.eased(), 0.0);

		c.dispatch(PointerEvent::Leave, &layout);
		assert_eq!(all_styles(&c, &layout, &cfg), baseline);
	}

	#[test]
	fn emphasis_eases_in_over_duration() {
		let layout = sample_layout();
		let cfg = FlowConfig::default();
		let mut c = HighlightCoordinator::new();
		c.tick(1.0, &cfg);
		assert_eq!(c.eased(), 0.0);

		c.dispatch(PointerEvent::Enter(FocusTarget::LegendEntry(0)), &layout);
		c.tick(0.1, &cfg);
		let partial = c.eased();
		assert!(partial > 0.0 && partial < 1.0);
		c.tick(1.0, &cfg);
		assert_eq!(c.eased(), 1.0);

		let node = &layout.nodes[0];
		let base = base_node_style();
		let target = c.node_style(node, &cfg);
		let blended = c.animated(base, target);
		assert!((blended.opacity - target.opacity).abs() < 1e-9);
		assert!((blended.stroke_width - target.stroke_width).abs() < 1e-9);
	}

	#[test]
	fn revalidate_drops_vanished_focus() {
		let layout = sample_layout();
		let mut c = HighlightCoordinator::new();
		c.dispatch(PointerEvent::Enter(FocusTarget::link(&layout.links[2])), &layout);

		let mut shrunk = layout.clone();
		shrunk.links.truncate(1);
		c.revalidate(&shrunk);
		assert_eq!(c.state(), &HighlightState::Idle);

		c.dispatch(PointerEvent::Enter(FocusTarget::LegendEntry(1)), &layout);
		c.revalidate(&layout);
		assert_eq!(c.target(), Some(FocusTarget::LegendEntry(1)));
	}

	#[test]
	fn link_focus_follows_its_endpoints_not_its_index() {
		let layout = sample_layout();
		let mut c = HighlightCoordinator::new();
		let focused = FocusTarget::link(&layout.links[2]);
		c.dispatch(PointerEvent::Enter(focused), &layout);

		let mut shifted = layout.clone();
		shifted.links.remove(0);
		c.revalidate(&shifted);
		assert_eq!(c.target(), Some(focused));
		assert_eq!(c.link_emphasis(1), Emphasis::Emphasized);
		assert_eq!(c.link_emphasis(0), Emphasis::Dimmed);
	}
}
