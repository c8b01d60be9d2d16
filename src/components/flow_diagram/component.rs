use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::warn;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlAnchorElement, HtmlCanvasElement, MouseEvent, Window};

use super::config::FlowConfig;
use super::render;
use super::state::FlowDiagramState;
use super::svg;
use super::types::{EntityId, EntityLabels, TransitionGraph};

const FRAME_DT: f64 = 0.016;

type SharedState = Rc<RefCell<Option<FlowDiagramState>>>;

fn window_size(window: &Window) -> Option<(f64, f64)> {
	Some((
		window.inner_width().ok()?.as_f64()?,
		window.inner_height().ok()?.as_f64()?,
	))
}

/// Window size in fullscreen mode; otherwise the explicit size or the parent's.
fn canvas_size(
	canvas: &HtmlCanvasElement,
	fullscreen: bool,
	width: Option<f64>,
	height: Option<f64>,
) -> (f64, f64) {
	if fullscreen {
		return web_sys::window()
			.as_ref()
			.and_then(window_size)
			.unwrap_or((800.0, 600.0));
	}
	let parent = canvas.parent_element();
	(
		width.unwrap_or_else(|| parent.as_ref().map(|p| p.client_width() as f64).unwrap_or(800.0)),
		height.unwrap_or_else(|| parent.as_ref().map(|p| p.client_height() as f64).unwrap_or(600.0)),
	)
}

fn pointer_position(canvas: Option<HtmlCanvasElement>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let rect = canvas?.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

fn download(href: &str, filename: &str) {
	let Some(document) = web_sys::window().and_then(|w| w.document()) else {
		return;
	};
	let Some(anchor) = document
		.create_element("a")
		.ok()
		.and_then(|el| el.dyn_into::<HtmlAnchorElement>().ok())
	else {
		return;
	};
	anchor.set_href(href);
	anchor.set_download(filename);
	anchor.click();
}

/// Canvas-backed temporal flow diagram.
#[component]
pub fn FlowDiagramCanvas(
	#[prop(into)] data: Signal<TransitionGraph>,
	#[prop(optional)] labels: EntityLabels,
	#[prop(optional)] config: FlowConfig,
	#[prop(optional, into)] threshold: Option<Signal<f64>>,
	#[prop(optional)] on_node_click: Option<Callback<(EntityId, String)>>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: SharedState = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (state_init, animate_init, resize_cb_init) =
		(state.clone(), animate.clone(), resize_cb.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if state_init.borrow().is_some() {
			return;
		}
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};

		let (w, h) = canvas_size(&canvas, fullscreen, width, height);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			warn!("2d canvas context unavailable");
			return;
		};

		let mut config = config.clone();
		if let Some(threshold) = threshold {
			config.threshold = threshold.get_untracked();
		}
		match FlowDiagramState::new(data.get_untracked(), labels.clone(), config, w, h) {
			Ok(s) => *state_init.borrow_mut() = Some(s),
			Err(err) => {
				warn!("flow diagram layout failed: {}", err);
				return;
			}
		}

		// Parent-sized canvases are re-measured on window resize only; a container
		// resized by its own layout keeps the old size until the next one.
		let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
		*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
			let (nw, nh) = canvas_size(&canvas_resize, fullscreen, width, height);
			canvas_resize.set_width(nw as u32);
			canvas_resize.set_height(nh as u32);
			if let Some(ref mut s) = *state_resize.borrow_mut() {
				if let Err(err) = s.resize(nw, nh) {
					warn!("flow diagram relayout failed: {}", err);
				}
			}
		}));
		if let Some(ref cb) = *resize_cb_init.borrow() {
			let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}

		let (state_anim, animate_inner) = (state_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if let Some(ref mut s) = *state_anim.borrow_mut() {
				if s.animation_running {
					s.tick(FRAME_DT);
				}
				render::render(s, &ctx);
			}
			if let (Some(cb), Some(win)) = (animate_inner.borrow().as_ref(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let state_data = state.clone();
	Effect::new(move |_| {
		let graph = data.get();
		let threshold = threshold.map(|t| t.get());
		if let Some(ref mut s) = *state_data.borrow_mut() {
			s.graph = graph;
			if let Some(t) = threshold {
				s.config.threshold = t;
			}
			if let Err(err) = s.relayout() {
				warn!("flow diagram relayout failed: {}", err);
			}
		}
	});

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = pointer_position(canvas_ref.get().map(Into::into), &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_mm.borrow_mut() {
			s.pointer_move(x, y);
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_ml.borrow_mut() {
			s.pointer_leave();
		}
	};

	let state_click = state.clone();
	let on_click = move |ev: MouseEvent| {
		let Some((x, y)) = pointer_position(canvas_ref.get().map(Into::into), &ev) else {
			return;
		};
		let hit = state_click.borrow().as_ref().and_then(|s| s.click(x, y));
		if let (Some(node), Some(cb)) = (hit, on_node_click) {
			cb.run(node);
		}
	};

	let state_svg = state.clone();
	let export_svg = move |_: MouseEvent| {
		let Some(document) = state_svg
			.borrow()
			.as_ref()
			.map(|s| svg::render_svg(&s.outcome, s.width, s.height))
		else {
			return;
		};
		let encoded = String::from(js_sys::encode_uri_component(&document));
		download(
			&format!("data:image/svg+xml;charset=utf-8,{}", encoded),
			"flow-diagram.svg",
		);
	};

	let export_png = move |_: MouseEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		match canvas.to_data_url_with_type("image/png") {
			Ok(url) => download(&url, "flow-diagram.png"),
			Err(_) => warn!("canvas PNG export failed"),
		}
	};

	view! {
		<div class="flow-diagram">
			<canvas
				node_ref=canvas_ref
				class="flow-diagram-canvas"
				on:mousemove=on_mousemove
				on:mouseleave=on_mouseleave
				on:click=on_click
				style="display: block; cursor: pointer;"
			/>
			<div class="flow-diagram-export">
				<button on:click=export_svg>"SVG"</button>
				<button on:click=export_png>"PNG"</button>
			</div>
		</div>
	}
}
