//! Row grouping and nested element deduplication

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use serde_json::Value;

use super::shape::{GroupKind, GroupPlan, ScalarPlan};
use super::{FlatRecord, NestedRecord, NormalizeError};

/// Compiled shape, ready to reduce join rows
///
/// Built by [`ShapeSpec::build`](super::ShapeSpec::build). Holds no per-call
/// state, so one instance can be shared across concurrent requests.
#[derive(Debug, Clone)]
pub struct Normalizer {
    pub(super) id_field: String,
    pub(super) scalars: Vec<ScalarPlan>,
    pub(super) groups: Vec<GroupPlan>,
    /// Every distinct source column the rules read
    pub(super) sources: Vec<String>,
}

/// Per-group accumulation inside one output record
#[derive(Default)]
struct GroupState {
    seen: HashSet<String>,
    elements: Vec<Value>,
}

/// Output record under construction
struct Pending {
    record: NestedRecord,
    groups: Vec<GroupState>,
}

impl Normalizer {
    /// Field the rows are grouped by
    pub fn id_field(&self) -> &str {
        &self.id_field
    }

    /// Fold join rows into nested records
    ///
    /// Output order is the order in which each distinct id value first appears
    /// in `rows`. Scalar fields come from the first row seen for an id; later
    /// rows with the same id only contribute nested elements.
    pub fn reduce(&self, rows: &[FlatRecord]) -> Result<Vec<NestedRecord>, NormalizeError> {
        let mut positions: HashMap<String, usize> = HashMap::new();
        let mut pending: Vec<Pending> = Vec::new();

        for (index, row) in rows.iter().enumerate() {
            self.check_row(index, row)?;

            let id = row.get(&self.id_field).unwrap_or(&Value::Null).to_string();
            let slot = match positions.entry(id) {
                Entry::Occupied(entry) => *entry.get(),
                Entry::Vacant(entry) => {
                    pending.push(self.open(row));
                    *entry.insert(pending.len() - 1)
                }
            };

            let current = &mut pending[slot];
            for (plan, state) in self.groups.iter().zip(current.groups.iter_mut()) {
                let Some(key) = plan.identity_key(row) else {
                    continue;
                };
                if plan.kind == GroupKind::Object && !state.elements.is_empty() {
                    continue;
                }
                if state.seen.insert(key) {
                    state.elements.push(plan.element(row));
                }
            }
        }

        Ok(pending
            .into_iter()
            .map(|p| self.finish(p))
            .collect())
    }

    /// Start the record for a newly seen id
    fn open(&self, row: &FlatRecord) -> Pending {
        let mut record = NestedRecord::new();
        for scalar in &self.scalars {
            let value = row.get(&scalar.source).cloned().unwrap_or(Value::Null);
            record.insert(scalar.output.clone(), value);
        }
        for plan in &self.groups {
            record.insert(plan.name.clone(), Value::Null);
        }

        Pending {
            record,
            groups: self.groups.iter().map(|_| GroupState::default()).collect(),
        }
    }

    fn finish(&self, pending: Pending) -> NestedRecord {
        let Pending { mut record, groups } = pending;
        for (plan, state) in self.groups.iter().zip(groups) {
            let value = match plan.kind {
                GroupKind::Array => Value::Array(state.elements),
                GroupKind::Object => state.elements.into_iter().next().unwrap_or(Value::Null),
            };
            record.insert(plan.name.clone(), value);
        }
        record
    }
}
