//! SVG export.

use std::fmt::Write as _;

use super::config::entity_color;
use super::highlight::{base_link_style, base_node_style};
use super::layout::{FlowLayout, FlowOutcome};

const TEXT: &str = "#333333";

/// Standalone SVG document for the current geometry, at baseline style.
pub fn render_svg(outcome: &FlowOutcome, width: f64, height: f64) -> String {
	let w = width.max(1.0);
	let h = height.max(1.0);
	let mut out = String::new();
	let _ = write!(
		&mut out,
		r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="sans-serif">"#,
	);
	let _ = write!(
		&mut out,
		r#"<rect width="{w}" height="{h}" fill="white"/>"#
	);

	match outcome {
		FlowOutcome::NoData { reason, .. } => {
			let _ = write!(
				&mut out,
				r#"<text class="placeholder" x="{x}" y="{y}" text-anchor="middle" font-size="14" fill="{TEXT}">Insufficient data ({reason})</text>"#,
				x = w / 2.0,
				y = h / 2.0,
				reason = escape_xml(&reason.to_string()),
			);
		}
		FlowOutcome::Ready(layout) => write_layout(&mut out, layout),
	}

	out.push_str("</svg>");
	out
}

fn write_layout(out: &mut String, layout: &FlowLayout) {
	let _ = write!(
		out,
		r#"<g transform="translate({},{})">"#,
		layout.origin.x, layout.origin.y
	);

	out.push_str(r#"<g class="columns" font-size="12" text-anchor="middle">"#);
	for column in &layout.columns {
		let _ = write!(
			out,
			r#"<line x1="{x}" y1="0" x2="{x}" y2="{y2}" stroke="{TEXT}" stroke-opacity="0.3"/><text x="{x}" y="{y}" dominant-baseline="middle" fill="{TEXT}">{text}</text>"#,
			x = column.anchor.x,
			y = column.anchor.y,
			y2 = layout.inner_height,
			text = escape_xml(&column.text),
		);
	}
	out.push_str("</g>");

	out.push_str(r#"<g class="links" fill="none">"#);
	for link in &layout.links {
		let style = base_link_style(link);
		let _ = write!(
			out,
			r#"<path class="{class}" d="{d}" stroke="{stroke}" stroke-width="{sw}" stroke-opacity="{op}"/>"#,
			class = if link.is_continuation {
				"link continuation"
			} else {
				"link"
			},
			d = link.svg_d(),
			stroke = entity_color(link.from.entity),
			sw = style.stroke_width,
			op = style.opacity,
		);
	}
	out.push_str("</g>");

	let node_style = base_node_style();
	out.push_str(r#"<g class="nodes">"#);
	for node in &layout.nodes {
		let r = node.rect;
		let _ = write!(
			out,
			r#"<rect class="node" data-entity="{e}" data-slice="{s}" x="{x}" y="{y}" width="{w}" height="{h}" fill="{fill}" fill-opacity="{op}" stroke="{TEXT}" stroke-width="{sw}"/>"#,
			e = node.key.entity,
			s = node.key.slice,
			x = r.x,
			y = r.y,
			w = r.width,
			h = r.height,
			fill = entity_color(node.key.entity),
			op = node_style.opacity,
			sw = node_style.stroke_width,
		);
	}
	out.push_str("</g>");

	out.push_str(r#"<g class="legend" font-size="12">"#);
	for entry in &layout.legend {
		let s = entry.swatch;
		let _ = write!(
			out,
			r#"<rect x="{x}" y="{y}" width="{w}" height="{h}" fill="{fill}"/><text x="{tx}" y="{ty}" dominant-baseline="middle" fill="{TEXT}">{label}</text>"#,
			x = s.x,
			y = s.y,
			w = s.width,
			h = s.height,
			fill = entity_color(entry.entity),
			tx = entry.label_anchor.x,
			ty = entry.label_anchor.y,
			label = escape_xml(&entry.label),
		);
	}
	out.push_str("</g></g>");
}

/// Escapes text for element content and attribute values.
pub fn escape_xml(text: &str) -> String {
	let mut out = String::with_capacity(text.len());
	for c in text.chars() {
		match c {
			'&' => out.push_str("&amp;"),
			'<' => out.push_str("&lt;"),
			'>' => out.push_str("&gt;"),
			'"' => out.push_str("&quot;"),
			'\'' => out.push_str("&#39;"),
			_ => out.push(c),
		}
	}
	out
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::flow_diagram::config::FlowConfig;
	use crate::components::flow_diagram::error::NoDataReason;
	use crate::components::flow_diagram::layout::compute_layout;
	use crate::components::flow_diagram::types::{EntityLabels, FlowLink, TransitionGraph};
	use std::collections::HashMap;

	fn graph() -> TransitionGraph {
		TransitionGraph {
			timestamps: vec!["Q1".into(), "Q2".into()],
			num_entities: 2,
			links: vec![
				FlowLink {
					from_entity: 0,
					from_timestamp: "Q1".into(),
					to_entity: 0,
					to_timestamp: "Q2".into(),
					value: 0.7,
				},
				FlowLink {
					from_entity: 0,
					from_timestamp: "Q1".into(),
					to_entity: 1,
					to_timestamp: "Q2".into(),
					value: 0.2,
				},
			],
		}
	}

	#[test]
	fn document_contains_every_element() {
		let labels = EntityLabels::new(HashMap::from([(1, "R&D <core>".to_string())]), true);
		let outcome = compute_layout(&graph(), &labels, &FlowConfig::default(), 600.0, 300.0).unwrap();
		let svg = render_svg(&outcome, 600.0, 300.0);

		assert!(svg.starts_with("<svg"));
		assert!(svg.ends_with("</svg>"));
		assert_eq!(svg.matches(r#"class="node""#).count(), 3);
		assert_eq!(svg.matches("<path ").count(), 2);
		assert_eq!(svg.matches(r#"class="link continuation""#).count(), 1);
		assert!(svg.contains("R&amp;D &lt;core&gt;"));
		assert!(svg.contains(">Q2</text>"));
	}

	#[test]
	fn placeholder_document() {
		let outcome = FlowOutcome::NoData {
			reason: NoDataReason::EmptyAfterFiltering,
			dropped: 0,
		};
		let svg = render_svg(&outcome, 400.0, 200.0);
		assert!(svg.contains("Insufficient data (no significant transitions)"));
		assert!(!svg.contains("<path"));
	}

	#[test]
	fn escapes_markup() {
		assert_eq!(escape_xml(r#"a<b>&"c'"#), "a&lt;b&gt;&amp;&quot;c&#39;");
	}
}
