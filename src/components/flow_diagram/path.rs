//! Link curves between node boxes.

use serde::Serialize;

use super::config::FlowConfig;
use super::layout::{Point, Rect};
use super::types::{NodeKey, Transition};

const HIT_SAMPLES: usize = 24;

/// Cubic S-curve between two node boxes.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PathDescriptor {
	/// Source node.
	pub from: NodeKey,
	/// Target node.
	pub to: NodeKey,
	/// Transition weight.
	pub weight: f64,
	/// Right-center of the source box.
	pub source: Point,
	/// Left-center of the target box.
	pub target: Point,
	/// Both at the horizontal midpoint, level with their endpoint.
	pub control_points: [Point; 2],
	/// Line width at rest.
	pub stroke_width: f64,
	/// Same entity on both ends.
	pub is_continuation: bool,
	/// Opacity at rest.
	pub base_opacity: f64,
}

/// `weight * stroke_scale`, held within `[stroke_min, stroke_max]`. An
/// unvalidated inverted range yields `stroke_max` instead of panicking.
pub fn stroke_width(weight: f64, cfg: &FlowConfig) -> f64 {
	(weight * cfg.stroke_scale).max(cfg.stroke_min).min(cfg.stroke_max)
}

/// Leaves the right-center of `source` and arrives at the left-center of
/// `target`, both horizontally.
pub fn build_path(
	source_rect: &Rect,
	target_rect: &Rect,
	transition: &Transition,
	cfg: &FlowConfig,
) -> PathDescriptor {
	let source = source_rect.right_center();
	let target = target_rect.left_center();
	let mid_x = (source.x + target.x) / 2.0;
	let is_continuation = transition.is_continuation();

	PathDescriptor {
		from: transition.from,
		to: transition.to,
		weight: transition.weight,
		source,
		target,
		control_points: [Point::new(mid_x, source.y), Point::new(mid_x, target.y)],
		stroke_width: stroke_width(transition.weight, cfg),
		is_continuation,
		base_opacity: if is_continuation {
			cfg.continuation_opacity
		} else {
			cfg.cross_opacity
		},
	}
}

impl PathDescriptor {
	/// SVG path data (`M .. C ..`).
	pub fn svg_d(&self) -> String {
		let [c1, c2] = self.control_points;
		format!(
			"M{},{}C{},{},{},{},{},{}",
			self.source.x, self.source.y, c1.x, c1.y, c2.x, c2.y, self.target.x, self.target.y
		)
	}

	/// Point on the curve at parameter `t` in `[0, 1]`.
	pub fn point_at(&self, t: f64) -> Point {
		let [c1, c2] = self.control_points;
		let u = 1.0 - t;
		let (a, b, c, d) = (u * u * u, 3.0 * u * u * t, 3.0 * u * t * t, t * t * t);
		Point::new(
			a * self.source.x + b * c1.x + c * c2.x + d * self.target.x,
			a * self.source.y + b * c1.y + c * c2.y + d * self.target.y,
		)
	}

	/// Approximate distance from `p` to the curve, via a sampled polyline.
	pub fn distance_to(&self, p: Point) -> f64 {
		let mut best = f64::INFINITY;
		let mut prev = self.source;
		for i in 1..=HIT_SAMPLES {
			let next = self.point_at(i as f64 / HIT_SAMPLES as f64);
			best = best.min(segment_distance(p, prev, next));
			prev = next;
		}
		best
	}
}

fn segment_distance(p: Point, a: Point, b: Point) -> f64 {
	let (dx, dy) = (b.x - a.x, b.y - a.y);
	let len2 = dx * dx + dy * dy;
	let t = if len2 < 1e-12 {
		0.0
	} else {
		(((p.x - a.x) * dx + (p.y - a.y) * dy) / len2).clamp(0.0, 1.0)
	};
	let (cx, cy) = (a.x + t * dx - p.x, a.y + t * dy - p.y);
	(cx * cx + cy * cy).sqrt()
}
