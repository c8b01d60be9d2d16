use std::collections::HashMap;

use leptos::prelude::*;
use log::info;

use crate::components::flow_diagram::{EntityLabels, FlowDiagramCanvas, FlowLink, TransitionGraph};

const TOPICS: &[&str] = &[
	"Economy", "Health", "Climate", "Elections", "Education", "Migration",
];

/// Generate a sample topic-transition graph (deterministic for consistency).
fn generate_sample_data(years: usize, topics: usize) -> TransitionGraph {
	let timestamps: Vec<String> = (0..years).map(|i| (2015 + i).to_string()).collect();
	let mut links = Vec::new();
	let mut seed = 0;

	for pair in timestamps.windows(2) {
		for from in 0..topics {
			for to in 0..topics {
				seed += 1;
				let r = rand_simple(seed);
				let value = if from == to { 0.5 + 0.4 * r } else { 0.15 * r * r };
				links.push(FlowLink {
					from_entity: from as u32,
					from_timestamp: pair[0].clone(),
					to_entity: to as u32,
					to_timestamp: pair[1].clone(),
					value,
				});
			}
		}
	}

	TransitionGraph {
		timestamps,
		num_entities: topics,
		links,
	}
}

/// Simple pseudo-random number generator (deterministic for consistency).
fn rand_simple(seed: usize) -> f64 {
	let x = ((seed + 1) * 9301 + 49297) % 233280;
	(x as f64) / 233280.0
}

fn topic_labels(prefer_custom: bool) -> EntityLabels {
	let custom: HashMap<u32, String> = TOPICS
		.iter()
		.enumerate()
		.map(|(i, t)| (i as u32, t.to_string()))
		.collect();
	EntityLabels::new(custom, prefer_custom)
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let graph_data = Signal::derive(move || generate_sample_data(6, TOPICS.len()));
	let (threshold, set_threshold) = signal(0.01);
	let (selected, set_selected) = signal(None::<(u32, String)>);

	let on_node_click = Callback::new(move |(entity, timestamp): (u32, String)| {
		info!("selected entity {} at {}", entity, timestamp);
		set_selected.set(Some((entity, timestamp)));
	});

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="fullscreen-graph">
				<FlowDiagramCanvas
					data=graph_data
					labels=topic_labels(true)
					threshold=threshold
					on_node_click=on_node_click
					fullscreen=true
				/>
				<div class="graph-overlay">
					<h1>"Topic Flow"</h1>
					<p class="subtitle">"Hover a topic, year or link to trace it. Click a node to select it."</p>
					<label>
						"Threshold "
						<input
							type="range"
							min="0"
							max="0.3"
							step="0.005"
							prop:value=move || threshold.get().to_string()
							on:input=move |ev| {
								if let Ok(v) = event_target_value(&ev).parse::<f64>() {
									set_threshold.set(v);
								}
							}
						/>
						{move || format!(" {:.3}", threshold.get())}
					</label>
					<p class="selection">
						{move || {
							selected
								.get()
								.map(|(entity, timestamp)| format!("Selected: {} ({})", TOPICS[entity as usize % TOPICS.len()], timestamp))
								.unwrap_or_default()
						}}
					</p>
				</div>
			</div>
		</ErrorBoundary>
	}
}
