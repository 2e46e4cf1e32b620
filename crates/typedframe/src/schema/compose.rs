//! Resolution of a declaration and its parents into one effective schema.

use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

use crate::dtype::DtypeSpec;
use crate::error::{Result, SchemaError};

use super::descriptor::{ColumnSchema, IndexDescriptor, SchemaDescriptor};

/// Fully resolved schema of a table shape, inheritance included.
///
/// Only produced by [`compose`], so a column never appears in both the
/// required and the optional mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EffectiveSchema {
    descriptor: SchemaDescriptor,
}

impl EffectiveSchema {
    /// Resolve a declaration that has no parents.
    pub fn from_declaration(declaration: &SchemaDescriptor) -> Result<Self> {
        compose(declaration, &[])
    }

    /// Required columns.
    pub fn required(&self) -> &ColumnSchema {
        &self.descriptor.required
    }

    /// Optional columns.
    pub fn optional(&self) -> &ColumnSchema {
        &self.descriptor.optional
    }

    /// Index constraint, if any.
    pub fn index(&self) -> Option<&IndexDescriptor> {
        self.descriptor.index.as_ref()
    }

    /// Declared dtype of a column, required or optional.
    pub fn dtype_of(&self, column: &str) -> Option<&DtypeSpec> {
        self.descriptor
            .required
            .get(column)
            .or_else(|| self.descriptor.optional.get(column))
    }

    pub fn is_required(&self, column: &str) -> bool {
        self.descriptor.required.contains_key(column)
    }

    /// Combined name-to-dtype mapping, required columns first.
    pub fn dtypes(&self, with_optional: bool) -> IndexMap<String, DtypeSpec> {
        let mut all = self.descriptor.required.clone();
        if with_optional {
            all.extend(
                self.descriptor
                    .optional
                    .iter()
                    .map(|(name, dtype)| (name.clone(), dtype.clone())),
            );
        }
        all
    }

    /// The resolved schema as a plain descriptor.
    pub fn as_descriptor(&self) -> &SchemaDescriptor {
        &self.descriptor
    }
}

/// Compute the effective schema of a declaration with ordered parents.
///
/// Parents are folded left to right, so on a conflicting column name a later
/// parent overrides an earlier one; the declaration's own columns override
/// everything inherited. A column that any contributor marks required stays
/// required, taking the dtype of the last contributor that declares it.
/// The index is the declaration's own, else the first parent index found.
pub fn compose(
    declaration: &SchemaDescriptor,
    parents: &[&EffectiveSchema],
) -> Result<EffectiveSchema> {
    declaration.check()?;

    let mut required = ColumnSchema::new();
    let mut optional = ColumnSchema::new();

    let sources = parents
        .iter()
        .map(|parent| &parent.descriptor)
        .chain(std::iter::once(declaration));

    for source in sources {
        for (name, dtype) in &source.required {
            optional.shift_remove(name);
            required.insert(name.clone(), dtype.clone());
        }
        for (name, dtype) in &source.optional {
            match required.get_mut(name) {
                Some(slot) => *slot = dtype.clone(),
                None => {
                    optional.insert(name.clone(), dtype.clone());
                }
            }
        }
    }

    let index = declaration
        .index
        .clone()
        .or_else(|| parents.iter().find_map(|parent| parent.descriptor.index.clone()));

    if let Some(index) = &index {
        if required.contains_key(&index.name) || optional.contains_key(&index.name) {
            return Err(SchemaError::Declaration(format!(
                "index name '{}' is also a column name",
                index.name
            )));
        }
    }

    debug!(
        "Composed schema from {} parents: {} required, {} optional, index {}",
        parents.len(),
        required.len(),
        optional.len(),
        index.as_ref().map(|i| i.name.as_str()).unwrap_or("<none>")
    );

    Ok(EffectiveSchema {
        descriptor: SchemaDescriptor {
            required,
            optional,
            index,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn effective(declaration: SchemaDescriptor, parents: &[&EffectiveSchema]) -> EffectiveSchema {
        compose(&declaration, parents).unwrap()
    }

    #[test]
    fn test_descendant_overrides_ancestor() {
        let ancestor = effective(
            SchemaDescriptor::builder()
                .required("x", DtypeSpec::int32())
                .build()
                .unwrap(),
            &[],
        );
        let descendant = effective(
            SchemaDescriptor::builder()
                .required("x", DtypeSpec::int64())
                .build()
                .unwrap(),
            &[&ancestor],
        );
        assert_eq!(descendant.required()["x"], DtypeSpec::int64());
        assert_eq!(descendant.required().len(), 1);
    }

    #[test]
    fn test_diamond_later_parent_wins() {
        let root = effective(
            SchemaDescriptor::builder()
                .required("root", DtypeSpec::bool())
                .build()
                .unwrap(),
            &[],
        );
        let left = effective(
            SchemaDescriptor::builder()
                .required("left", DtypeSpec::bool())
                .build()
                .unwrap(),
            &[&root],
        );
        let right = effective(
            SchemaDescriptor::builder()
                .required("root", DtypeSpec::Object)
                .required("right", DtypeSpec::bool())
                .build()
                .unwrap(),
            &[&root],
        );
        let down = effective(SchemaDescriptor::new(), &[&left, &right]);

        let mut expected = ColumnSchema::new();
        expected.insert("root".into(), DtypeSpec::Object);
        expected.insert("left".into(), DtypeSpec::bool());
        expected.insert("right".into(), DtypeSpec::bool());
        assert_eq!(down.required(), &expected);
        assert!(down.optional().is_empty());

        // Reversed parent order lets Left's inherited root win.
        let up = effective(SchemaDescriptor::new(), &[&right, &left]);
        assert_eq!(up.required()["root"], DtypeSpec::bool());
    }

    #[test]
    fn test_required_wins_over_optional() {
        let strict = effective(
            SchemaDescriptor::builder()
                .required("x", DtypeSpec::int64())
                .build()
                .unwrap(),
            &[],
        );
        let loose = effective(
            SchemaDescriptor::builder()
                .optional("x", DtypeSpec::int64())
                .build()
                .unwrap(),
            &[],
        );

        for parents in [[&strict, &loose], [&loose, &strict]] {
            let merged = effective(SchemaDescriptor::new(), &parents);
            assert!(merged.is_required("x"));
            assert!(!merged.optional().contains_key("x"));
        }

        let own_optional = effective(
            SchemaDescriptor::builder()
                .optional("x", DtypeSpec::int32())
                .build()
                .unwrap(),
            &[&strict],
        );
        assert!(own_optional.is_required("x"));
        assert_eq!(own_optional.required()["x"], DtypeSpec::int32());
    }

    #[test]
    fn test_optional_columns_are_inherited() {
        let parent = effective(
            SchemaDescriptor::builder()
                .required("required", DtypeSpec::bool())
                .optional("optional", DtypeSpec::bool())
                .build()
                .unwrap(),
            &[],
        );
        let child = effective(
            SchemaDescriptor::builder()
                .optional("extra", DtypeSpec::float64())
                .build()
                .unwrap(),
            &[&parent],
        );
        assert_eq!(child.optional().len(), 2);
        assert_eq!(child.dtypes(false).len(), 1);
        assert_eq!(child.dtypes(true).len(), 3);
    }

    #[test]
    fn test_index_inheritance() {
        let first = effective(
            SchemaDescriptor::builder()
                .index("bar", DtypeSpec::datetime())
                .build()
                .unwrap(),
            &[],
        );
        let second = effective(
            SchemaDescriptor::builder()
                .index("baz", DtypeSpec::int64())
                .build()
                .unwrap(),
            &[],
        );
        let none = effective(SchemaDescriptor::new(), &[]);

        let child = effective(SchemaDescriptor::new(), &[&none, &first, &second]);
        assert_eq!(child.index().map(|i| i.name.as_str()), Some("bar"));

        let own = effective(
            SchemaDescriptor::builder()
                .index("own", DtypeSpec::int32())
                .build()
                .unwrap(),
            &[&first],
        );
        assert_eq!(own.index().map(|i| i.name.as_str()), Some("own"));
    }

    #[test]
    fn test_index_name_colliding_with_column_rejected() {
        let parent = effective(
            SchemaDescriptor::builder()
                .required("ts", DtypeSpec::datetime())
                .build()
                .unwrap(),
            &[],
        );
        let declaration = SchemaDescriptor::builder()
            .index("ts", DtypeSpec::datetime())
            .build()
            .unwrap();
        let err = compose(&declaration, &[&parent]).unwrap_err();
        assert!(matches!(err, SchemaError::Declaration(_)));
    }

    #[test]
    fn test_malformed_declaration_rejected_at_composition() {
        let mut declaration = SchemaDescriptor::new();
        declaration.required.insert("x".into(), DtypeSpec::bool());
        declaration.optional.insert("x".into(), DtypeSpec::bool());
        assert!(compose(&declaration, &[]).is_err());
    }

    #[test]
    fn test_json_form_reenters_through_compose() {
        let schema = effective(
            SchemaDescriptor::builder()
                .required("a", DtypeSpec::int64())
                .optional("b", DtypeSpec::bool())
                .build()
                .unwrap(),
            &[],
        );
        let json = serde_json::to_string(&schema).unwrap();
        let declaration: SchemaDescriptor = serde_json::from_str(&json).unwrap();
        assert_eq!(compose(&declaration, &[]).unwrap(), schema);

        let overlapping = r#"{
            "required": {"x": "int64"},
            "optional": {"x": "bool"},
            "index": {"name": "x", "dtype": "int64"}
        }"#;
        let declaration: SchemaDescriptor = serde_json::from_str(overlapping).unwrap();
        assert!(matches!(
            compose(&declaration, &[]),
            Err(SchemaError::Declaration(_))
        ));
    }
}
