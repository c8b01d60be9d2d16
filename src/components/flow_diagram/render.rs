use web_sys::CanvasRenderingContext2d;

use super::config::entity_color;
use super::error::NoDataReason;
use super::highlight::{base_label_style, base_link_style, base_node_style};
use super::layout::{FlowLayout, FlowOutcome};
use super::state::FlowDiagramState;

const BACKGROUND: &str = "#ffffff";
const TEXT: &str = "#333333";
const FONT: &str = "sans-serif";

pub fn render(state: &FlowDiagramState, ctx: &CanvasRenderingContext2d) {
	ctx.set_global_alpha(1.0);
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);

	match &state.outcome {
		FlowOutcome::NoData { reason, .. } => draw_placeholder(state, *reason, ctx),
		FlowOutcome::Ready(layout) => {
			ctx.save();
			let _ = ctx.translate(layout.origin.x, layout.origin.y);
			draw_columns(state, layout, ctx);
			draw_links(state, layout, ctx);
			draw_nodes(state, layout, ctx);
			draw_legend(state, layout, ctx);
			ctx.restore();
		}
	}
	ctx.set_global_alpha(1.0);
}

fn draw_placeholder(state: &FlowDiagramState, reason: NoDataReason, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(TEXT);
	ctx.set_font(&format!("14px {}", FONT));
	ctx.set_text_align("center");
	let _ = ctx.fill_text(
		&format!("Insufficient data ({})", reason),
		state.width / 2.0,
		state.height / 2.0,
	);
	ctx.set_text_align("start");
}

fn draw_columns(state: &FlowDiagramState, layout: &FlowLayout, ctx: &CanvasRenderingContext2d) {
	let hl = &state.highlight;
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");
	for column in &layout.columns {
		let style = hl.animated(base_label_style(), hl.column_style(column.slice, &state.config));
		let weight = if style.stroke_width > 0.5 { "bold " } else { "" };
		ctx.set_global_alpha(style.opacity);
		ctx.set_fill_style_str(TEXT);
		ctx.set_font(&format!("{}12px {}", weight, FONT));
		let _ = ctx.fill_text(&column.text, column.anchor.x, column.anchor.y);

		ctx.set_global_alpha(style.opacity * 0.3);
		ctx.set_stroke_style_str(TEXT);
		ctx.set_line_width(1.0);
		ctx.begin_path();
		ctx.move_to(column.anchor.x, 0.0);
		ctx.line_to(column.anchor.x, layout.inner_height);
		ctx.stroke();
	}
	ctx.set_text_align("start");
	ctx.set_text_baseline("alphabetic");
}

fn draw_links(state: &FlowDiagramState, layout: &FlowLayout, ctx: &CanvasRenderingContext2d) {
	let hl = &state.highlight;
	for (i, link) in layout.links.iter().enumerate() {
		let base = base_link_style(link);
		let style = hl.animated(base, hl.link_style(i, link, &state.config));
		let [c1, c2] = link.control_points;

		ctx.set_global_alpha(style.opacity);
		ctx.set_stroke_style_str(entity_color(link.from.entity));
		ctx.set_line_width(style.stroke_width);
		ctx.begin_path();
		ctx.move_to(link.source.x, link.source.y);
		ctx.bezier_curve_to(c1.x, c1.y, c2.x, c2.y, link.target.x, link.target.y);
		ctx.stroke();
	}
}

fn draw_nodes(state: &FlowDiagramState, layout: &FlowLayout, ctx: &CanvasRenderingContext2d) {
	let hl = &state.highlight;
	for node in &layout.nodes {
		let base = base_node_style();
		let style = hl.animated(base, hl.node_style(node, &state.config));
		let r = node.rect;

		ctx.set_global_alpha(style.opacity);
		ctx.set_fill_style_str(entity_color(node.key.entity));
		ctx.fill_rect(r.x, r.y, r.width, r.height);
		ctx.set_stroke_style_str(TEXT);
		ctx.set_line_width(style.stroke_width);
		ctx.stroke_rect(r.x, r.y, r.width, r.height);
	}
}

fn draw_legend(state: &FlowDiagramState, layout: &FlowLayout, ctx: &CanvasRenderingContext2d) {
	let hl = &state.highlight;
	ctx.set_text_baseline("middle");
	ctx.set_font(&format!("12px {}", FONT));
	for entry in &layout.legend {
		let style = hl.animated(base_label_style(), hl.legend_style(entry.entity, &state.config));
		let s = entry.swatch;

		ctx.set_global_alpha(style.opacity);
		ctx.set_fill_style_str(entity_color(entry.entity));
		ctx.fill_rect(s.x, s.y, s.width, s.height);
		if style.stroke_width > 0.0 {
			ctx.set_stroke_style_str(TEXT);
			ctx.set_line_width(style.stroke_width);
			ctx.stroke_rect(s.x, s.y, s.width, s.height);
		}
		ctx.set_fill_style_str(TEXT);
		let _ = ctx.fill_text(&entry.label, entry.label_anchor.x, entry.label_anchor.y);
	}
	ctx.set_text_baseline("alphabetic");
}
