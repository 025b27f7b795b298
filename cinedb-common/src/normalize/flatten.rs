//! Join expansion of nested records back into flat rows

use serde_json::{Map, Value};

use super::shape::{GroupKind, GroupPlan};
use super::{FlatRecord, NestedRecord, Normalizer};

impl Normalizer {
    /// Expand nested records into the rows a join would have produced
    ///
    /// Emits one row per combination of array elements across array groups.
    /// An empty array contributes a single row with its leaf columns null, the
    /// way an unmatched left join does. Reducing the result yields records
    /// equal to the input, provided the id field is copied by a scalar rule.
    pub fn flatten(&self, records: &[NestedRecord]) -> Vec<FlatRecord> {
        let mut rows = Vec::new();

        for record in records {
            let mut base = FlatRecord::new();
            for scalar in &self.scalars {
                let value = record.get(&scalar.output).cloned().unwrap_or(Value::Null);
                base.insert(scalar.source.clone(), value);
            }

            for plan in self.groups.iter().filter(|g| g.kind == GroupKind::Object) {
                let object = record.get(&plan.name).and_then(Value::as_object);
                spread(plan, object, &mut base);
            }

            let mut expanded = vec![base];
            for plan in self.groups.iter().filter(|g| g.kind == GroupKind::Array) {
                let elements: Vec<&Map<String, Value>> = record
                    .get(&plan.name)
                    .and_then(Value::as_array)
                    .map(|items| items.iter().filter_map(Value::as_object).collect())
                    .unwrap_or_default();

                expanded = expanded
                    .into_iter()
                    .flat_map(|row| expand(plan, row, &elements))
                    .collect();
            }

            rows.extend(expanded);
        }

        rows
    }
}

fn expand(plan: &GroupPlan, row: FlatRecord, elements: &[&Map<String, Value>]) -> Vec<FlatRecord> {
    if elements.is_empty() {
        let mut row = row;
        spread(plan, None, &mut row);
        return vec![row];
    }

    elements
        .iter()
        .map(|element| {
            let mut row = row.clone();
            spread(plan, Some(*element), &mut row);
            row
        })
        .collect()
}

/// Write a group's leaves back onto their source columns
///
/// A null leaf never overwrites a column already filled by a scalar rule
/// reading the same source.
fn spread(plan: &GroupPlan, element: Option<&Map<String, Value>>, row: &mut FlatRecord) {
    for field in &plan.fields {
        match element.and_then(|e| e.get(&field.leaf)) {
            Some(value) if !value.is_null() => {
                row.insert(field.source.clone(), value.clone());
            }
            _ => {
                row.entry(field.source.clone()).or_insert(Value::Null);
            }
        }
    }
}
