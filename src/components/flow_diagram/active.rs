use std::collections::BTreeSet;

use super::types::{EntityId, Transition};

/// Per-slice active entities, indexed by slice and sorted ascending.
pub type ActiveColumns = Vec<Vec<EntityId>>;

/// Collects both endpoints of every transition into their slice's column.
pub fn resolve(transitions: &[Transition], slice_count: usize) -> ActiveColumns {
	let mut columns: Vec<BTreeSet<EntityId>> = vec![BTreeSet::new(); slice_count];
	for t in transitions {
		for key in [t.from, t.to] {
			if let Some(column) = columns.get_mut(key.slice) {
				column.insert(key.entity);
			}
		}
	}
	columns
		.into_iter()
		.map(|column| column.into_iter().collect())
		.collect()
}

/// Distinct entities active anywhere, ascending.
pub fn active_entities(columns: &ActiveColumns) -> Vec<EntityId> {
	columns
		.iter()
		.flatten()
		.copied()
		.collect::<BTreeSet<_>>()
		.into_iter()
		.collect()
}
