//! Timestamp resolution and the significance filter.

use std::collections::HashMap;

use log::warn;

use super::types::{FlowLink, NodeKey, Transition};

/// Links resolved against the slice sequence, with malformed ones counted.
#[derive(Clone, Debug, Default)]
pub struct ResolvedLinks {
	/// Well-formed transitions, in input order.
	pub transitions: Vec<Transition>,
	/// How many links were malformed.
	pub dropped: usize,
}

/// Maps timestamp labels to slice indices. Links naming an unknown timestamp,
/// skipping a slice, or carrying a non-finite weight are dropped and counted.
pub fn resolve_links(links: &[FlowLink], timestamps: &[String]) -> ResolvedLinks {
	let index: HashMap<&str, usize> = timestamps
		.iter()
		.enumerate()
		.map(|(i, t)| (t.as_str(), i))
		.collect();

	let mut resolved = ResolvedLinks::default();
	let mut first_bad: Option<&FlowLink> = None;

	for link in links {
		let slices = (
			index.get(link.from_timestamp.as_str()),
			index.get(link.to_timestamp.as_str()),
		);
		match slices {
			(Some(&from), Some(&to)) if to == from + 1 && link.value.is_finite() => {
				resolved.transitions.push(Transition {
					from: NodeKey::new(link.from_entity, from),
					to: NodeKey::new(link.to_entity, to),
					weight: link.value,
				});
			}
			_ => {
				resolved.dropped += 1;
				first_bad.get_or_insert(link);
			}
		}
	}

	if let Some(bad) = first_bad {
		warn!(
			"dropped {} malformed transition(s); first: {} -> {}",
			resolved.dropped, bad.from_timestamp, bad.to_timestamp
		);
	}
	resolved
}

/// Keeps transitions with `weight > threshold`, preserving order.
pub fn filter(transitions: &[Transition], threshold: f64) -> Vec<Transition> {
	transitions
		.iter()
		.filter(|t| t.weight > threshold)
		.copied()
		.collect()
}
