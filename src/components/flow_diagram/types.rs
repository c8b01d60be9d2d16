use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::error::LayoutError;

/// Identifier of a trackable entity (topic, cluster, category).
pub type EntityId = u32;

/// Index of a time slice within [`TransitionGraph::timestamps`].
pub type SliceIndex = usize;

/// Weighted transition graph as delivered by the analytics backend.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TransitionGraph {
	/// Ordered time slice labels; one column each.
	pub timestamps: Vec<String>,
	/// Count of distinct entities the backend tracked.
	#[serde(default)]
	pub num_entities: usize,
	/// Weighted transitions between adjacent slices.
	#[serde(default)]
	pub links: Vec<FlowLink>,
}

impl TransitionGraph {
	/// Parses the backend JSON payload.
	pub fn from_json(text: &str) -> Result<Self, LayoutError> {
		Ok(serde_json::from_str(text)?)
	}
}

/// One raw transition, naming its slices by timestamp label.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlowLink {
	/// Source entity.
	pub from_entity: EntityId,
	/// Source slice label.
	pub from_timestamp: String,
	/// Target entity.
	pub to_entity: EntityId,
	/// Target slice label; must follow `from_timestamp` directly.
	pub to_timestamp: String,
	/// Transition strength, normally in `[0, 1]`.
	pub value: f64,
}

/// An entity at a given time slice; the identity of one node box.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeKey {
	/// Which entity.
	pub entity: EntityId,
	/// Which column.
	pub slice: SliceIndex,
}

impl NodeKey {
	/// Key for `entity` in column `slice`.
	pub fn new(entity: EntityId, slice: SliceIndex) -> Self {
		Self { entity, slice }
	}
}

/// A link whose timestamps have been resolved to slice indices.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Transition {
	/// Source node, in slice `i`.
	pub from: NodeKey,
	/// Target node, in slice `i + 1`.
	pub to: NodeKey,
	/// Transition strength.
	pub weight: f64,
}

impl Transition {
	/// Same entity on both ends.
	pub fn is_continuation(&self) -> bool {
		self.from.entity == self.to.entity
	}
}

/// Display labels for entities.
#[derive(Clone, Debug, Default)]
pub struct EntityLabels {
	/// Names supplied by the caller.
	pub custom: HashMap<EntityId, String>,
	/// Use `custom` where present instead of generated names.
	pub prefer_custom: bool,
}

impl EntityLabels {
	/// Labels from `custom`, used only when `prefer_custom` is set.
	pub fn new(custom: HashMap<EntityId, String>, prefer_custom: bool) -> Self {
		Self {
			custom,
			prefer_custom,
		}
	}

	/// `"Entity {id}"` unless a preferred custom label exists.
	pub fn label_for(&self, entity: EntityId) -> String {
		if self.prefer_custom {
			if let Some(label) = self.custom.get(&entity) {
				return label.clone();
			}
		}
		format!("Entity {}", entity)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_backend_payload() {
		let graph = TransitionGraph::from_json(
			r#"{
				"timestamps": ["2020", "2021"],
				"num_entities": 2,
				"links": [
					{"from_entity": 0, "from_timestamp": "2020", "to_entity": 1, "to_timestamp": "2021", "value": 0.25}
				]
			}"#,
		)
		.unwrap();
		assert_eq!(graph.timestamps, vec!["2020", "2021"]);
		assert_eq!(graph.num_entities, 2);
		assert_eq!(graph.links[0].to_entity, 1);
		assert_eq!(graph.links[0].value, 0.25);
	}

	#[test]
	fn rejects_broken_json() {
		assert!(matches!(
			TransitionGraph::from_json("{\"timestamps\": 3}"),
			Err(LayoutError::Json(_))
		));
	}

	#[test]
	fn generated_label_unless_custom_preferred() {
		let custom = HashMap::from([(3, "Climate".to_string())]);
		let plain = EntityLabels::new(custom.clone(), false);
		assert_eq!(plain.label_for(3), "Entity 3");

		let preferred = EntityLabels::new(custom, true);
		assert_eq!(preferred.label_for(3), "Climate");
		assert_eq!(preferred.label_for(4), "Entity 4");
	}

	#[test]
	fn continuation_means_same_entity() {
		let t = Transition {
			from: NodeKey::new(2, 0),
			to: NodeKey::new(2, 1),
			weight: 0.5,
		};
		assert!(t.is_continuation());
	}
}
