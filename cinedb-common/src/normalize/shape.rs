//! Shape specification and its compiled form

use std::collections::HashSet;

use serde_json::Value;

use super::{FlatRecord, NormalizeError, Normalizer, ShapeError};

/// Where a source column lands in the output record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldPath {
    /// `[output]`: copied onto the output record
    Scalar { output: String },

    /// `[group, null, leaf]`: field `leaf` of each element of array `group`
    NestedArray { group: String, leaf: String },

    /// `[group, leaf]`: field `leaf` of the single embedded object `group`
    NestedObject { group: String, leaf: String },
}

impl FieldPath {
    /// Parse the bracket descriptor form (`None` stands for the array marker)
    ///
    /// ```
    /// use cinedb_common::normalize::FieldPath;
    ///
    /// let path = FieldPath::from_descriptor(&[Some("movies"), None, Some("title")]).unwrap();
    /// assert_eq!(
    ///     path,
    ///     FieldPath::NestedArray { group: "movies".into(), leaf: "title".into() }
    /// );
    /// ```
    pub fn from_descriptor(descriptor: &[Option<&str>]) -> Result<Self, ShapeError> {
        match descriptor {
            [Some(output)] => Ok(Self::Scalar {
                output: (*output).to_string(),
            }),
            [Some(group), None, Some(leaf)] => Ok(Self::NestedArray {
                group: (*group).to_string(),
                leaf: (*leaf).to_string(),
            }),
            [Some(group), Some(leaf)] => Ok(Self::NestedObject {
                group: (*group).to_string(),
                leaf: (*leaf).to_string(),
            }),
            other => Err(ShapeError::UnsupportedDescriptor(format!("{:?}", other))),
        }
    }
}

/// One shape rule: a source column and its destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRule {
    pub source: String,
    pub path: FieldPath,
}

/// Declarative description of one response shape
///
/// Rules are applied in declaration order, which is also the field order of
/// the output records.
#[derive(Debug, Clone)]
pub struct ShapeSpec {
    id_field: String,
    rules: Vec<FieldRule>,
    identities: Vec<(String, Vec<String>)>,
}

impl ShapeSpec {
    /// Start a shape grouped by `id_field`
    pub fn new(id_field: impl Into<String>) -> Self {
        Self {
            id_field: id_field.into(),
            rules: Vec::new(),
            identities: Vec::new(),
        }
    }

    pub fn rule(mut self, source: impl Into<String>, path: FieldPath) -> Self {
        self.rules.push(FieldRule {
            source: source.into(),
            path,
        });
        self
    }

    /// Copy `source` onto the output record under the same name
    pub fn scalar(self, source: impl Into<String>) -> Self {
        let source = source.into();
        let output = source.clone();
        self.rule(source, FieldPath::Scalar { output })
    }

    /// Copy `source` onto the output record under `output`
    pub fn scalar_as(self, source: impl Into<String>, output: impl Into<String>) -> Self {
        self.rule(
            source,
            FieldPath::Scalar {
                output: output.into(),
            },
        )
    }

    /// Contribute `source` as field `leaf` of each element of array `group`
    pub fn nested(
        self,
        source: impl Into<String>,
        group: impl Into<String>,
        leaf: impl Into<String>,
    ) -> Self {
        self.rule(
            source,
            FieldPath::NestedArray {
                group: group.into(),
                leaf: leaf.into(),
            },
        )
    }

    /// Contribute `source` as field `leaf` of the embedded object `group`
    pub fn object(
        self,
        source: impl Into<String>,
        group: impl Into<String>,
        leaf: impl Into<String>,
    ) -> Self {
        self.rule(
            source,
            FieldPath::NestedObject {
                group: group.into(),
                leaf: leaf.into(),
            },
        )
    }

    /// Declare the leaves that identify an element of `group`
    ///
    /// Groups without a declared identity deduplicate on full-element equality.
    /// At most one declaration per group, naming at least one leaf.
    pub fn identity<I, S>(mut self, group: impl Into<String>, leaves: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.identities
            .push((group.into(), leaves.into_iter().map(Into::into).collect()));
        self
    }

    /// Validate the rules and compile them into a [`Normalizer`]
    pub fn build(self) -> Result<Normalizer, ShapeError> {
        check_name("id field", &self.id_field)?;

        let mut scalars: Vec<ScalarPlan> = Vec::new();
        let mut groups: Vec<GroupPlan> = Vec::new();
        let mut outputs: HashSet<String> = HashSet::new();

        for FieldRule { source, path } in self.rules {
            check_name("source", &source)?;
            match path {
                FieldPath::Scalar { output } => {
                    check_name("output", &output)?;
                    if !outputs.insert(output.clone()) {
                        return Err(ShapeError::DuplicateOutput(output));
                    }
                    scalars.push(ScalarPlan { source, output });
                }
                FieldPath::NestedArray { group, leaf } => {
                    add_leaf(&mut groups, GroupKind::Array, group, leaf, source)?;
                }
                FieldPath::NestedObject { group, leaf } => {
                    add_leaf(&mut groups, GroupKind::Object, group, leaf, source)?;
                }
            }
        }

        if let Some(group) = groups.iter().find(|g| outputs.contains(&g.name)) {
            return Err(ShapeError::GroupConflict(group.name.clone()));
        }

        let mut declared: HashSet<String> = HashSet::new();
        for (group, leaves) in self.identities {
            let plan = groups
                .iter_mut()
                .find(|g| g.name == group)
                .ok_or_else(|| ShapeError::UnknownGroup(group.clone()))?;
            if leaves.is_empty() {
                return Err(ShapeError::EmptyIdentity(group));
            }
            if !declared.insert(group.clone()) {
                return Err(ShapeError::DuplicateIdentity(group));
            }

            plan.identity = leaves
                .into_iter()
                .map(|leaf| {
                    plan.fields
                        .iter()
                        .position(|f| f.leaf == leaf)
                        .ok_or_else(|| ShapeError::UnknownIdentityLeaf {
                            group: group.clone(),
                            leaf,
                        })
                })
                .collect::<Result<_, _>>()?;
        }

        let mut sources: Vec<String> = Vec::new();
        let all_sources = scalars
            .iter()
            .map(|s| &s.source)
            .chain(groups.iter().flat_map(|g| g.fields.iter().map(|f| &f.source)));
        for source in all_sources {
            if !sources.contains(source) {
                sources.push(source.clone());
            }
        }

        Ok(Normalizer {
            id_field: self.id_field,
            scalars,
            groups,
            sources,
        })
    }
}

fn check_name(kind: &'static str, name: &str) -> Result<(), ShapeError> {
    if name.trim().is_empty() {
        return Err(ShapeError::EmptyName(kind));
    }
    Ok(())
}

fn add_leaf(
    groups: &mut Vec<GroupPlan>,
    kind: GroupKind,
    group: String,
    leaf: String,
    source: String,
) -> Result<(), ShapeError> {
    check_name("group", &group)?;
    check_name("leaf", &leaf)?;

    let index = match groups.iter().position(|g| g.name == group) {
        Some(index) => index,
        None => {
            groups.push(GroupPlan {
                name: group.clone(),
                kind,
                fields: Vec::new(),
                identity: Vec::new(),
            });
            groups.len() - 1
        }
    };

    let plan = &mut groups[index];
    if plan.kind != kind {
        return Err(ShapeError::MixedGroupKind(group));
    }
    if plan.fields.iter().any(|f| f.leaf == leaf) {
        return Err(ShapeError::DuplicateOutput(format!("{}.{}", group, leaf)));
    }
    plan.fields.push(LeafPlan { source, leaf });
    Ok(())
}

#[derive(Debug, Clone)]
pub(super) struct ScalarPlan {
    pub(super) source: String,
    pub(super) output: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum GroupKind {
    Array,
    Object,
}

#[derive(Debug, Clone)]
pub(super) struct LeafPlan {
    pub(super) source: String,
    pub(super) leaf: String,
}

/// Compiled nested group: its leaves and the indices of its identity leaves
#[derive(Debug, Clone)]
pub(super) struct GroupPlan {
    pub(super) name: String,
    pub(super) kind: GroupKind,
    pub(super) fields: Vec<LeafPlan>,
    /// Empty means every leaf takes part in identity
    pub(super) identity: Vec<usize>,
}

impl GroupPlan {
    /// Build this group's element from one row
    pub(super) fn element(&self, row: &FlatRecord) -> Value {
        Value::Object(
            self.fields
                .iter()
                .map(|f| (f.leaf.clone(), field(row, &f.source).clone()))
                .collect(),
        )
    }

    /// Dedup key of the element a row would contribute
    ///
    /// `None` when every identity value is null (an unmatched left join).
    pub(super) fn identity_key(&self, row: &FlatRecord) -> Option<String> {
        let values: Vec<Value> = if self.identity.is_empty() {
            self.fields
                .iter()
                .map(|f| field(row, &f.source).clone())
                .collect()
        } else {
            self.identity
                .iter()
                .map(|&i| field(row, &self.fields[i].source).clone())
                .collect()
        };

        if values.iter().all(Value::is_null) {
            return None;
        }
        Some(Value::Array(values).to_string())
    }
}

impl Normalizer {
    /// Reject a row lacking the id field or any source column
    pub(super) fn check_row(&self, index: usize, row: &FlatRecord) -> Result<(), NormalizeError> {
        if !row.contains_key(&self.id_field) {
            return Err(NormalizeError::MissingIdField {
                row: index,
                field: self.id_field.clone(),
            });
        }
        if let Some(source) = self.sources.iter().find(|s| !row.contains_key(s.as_str())) {
            return Err(NormalizeError::MissingSourceField {
                row: index,
                field: source.clone(),
            });
        }
        Ok(())
    }
}

fn field<'a>(row: &'a FlatRecord, name: &str) -> &'a Value {
    row.get(name).unwrap_or(&Value::Null)
}
