//! Named table-shape declarations, loadable from JSON.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SchemaError};

use super::compose::{compose, EffectiveSchema};
use super::descriptor::{ColumnSchema, IndexDescriptor, SchemaDescriptor};

/// One named declaration: its parents (in order) plus its own columns.
///
/// Unknown keys are rejected, so a misspelled `"required"` fails the load
/// instead of declaring an empty shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShapeDeclaration {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub required: ColumnSchema,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub optional: ColumnSchema,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<IndexDescriptor>,
}

impl ShapeDeclaration {
    pub fn new(parents: &[&str], schema: SchemaDescriptor) -> Self {
        Self {
            parents: parents.iter().map(|p| p.to_string()).collect(),
            required: schema.required,
            optional: schema.optional,
            index: schema.index,
        }
    }

    /// The shape's own columns, without its parents.
    pub fn schema(&self) -> SchemaDescriptor {
        SchemaDescriptor {
            required: self.required.clone(),
            optional: self.optional.clone(),
            index: self.index.clone(),
        }
    }
}

#[derive(Debug)]
struct CatalogEntry {
    declaration: ShapeDeclaration,
    effective: OnceCell<Arc<EffectiveSchema>>,
}

impl CatalogEntry {
    fn new(declaration: ShapeDeclaration) -> Self {
        Self {
            declaration,
            effective: OnceCell::new(),
        }
    }
}

/// A set of named table shapes.
///
/// The JSON form maps shape names to declarations:
///
/// ```json
/// {
///   "Root":  {"required": {"root": "bool"}},
///   "Right": {"parents": ["Root"], "required": {"root": "object", "right": "bool"}}
/// }
/// ```
///
/// Unknown parents and inheritance cycles are rejected when shapes are
/// added; effective schemas are composed lazily, once per shape.
#[derive(Debug, Default)]
pub struct SchemaCatalog {
    shapes: IndexMap<String, CatalogEntry>,
}

impl SchemaCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a catalog from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| SchemaError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json(&content)
    }

    /// Parse a catalog from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        let declarations: IndexMap<String, ShapeDeclaration> = serde_json::from_str(json)?;
        Self::from_declarations(declarations)
    }

    /// Build a catalog from declarations given in any order.
    pub fn from_declarations(declarations: IndexMap<String, ShapeDeclaration>) -> Result<Self> {
        for (name, declaration) in &declarations {
            declaration.schema().check().map_err(|e| {
                SchemaError::Declaration(format!("shape '{}': {}", name, e))
            })?;
            if let Some(unknown) = declaration
                .parents
                .iter()
                .find(|parent| !declarations.contains_key(*parent))
            {
                return Err(SchemaError::Declaration(format!(
                    "shape '{}' inherits unknown shape '{}'",
                    name, unknown
                )));
            }
        }

        check_acyclic(&declarations)?;

        let shapes = declarations
            .into_iter()
            .map(|(name, declaration)| (name, CatalogEntry::new(declaration)))
            .collect();
        Ok(Self { shapes })
    }

    /// Add a shape whose parents are already in the catalog.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        parents: &[&str],
        schema: SchemaDescriptor,
    ) -> Result<()> {
        let name = name.into();
        if self.shapes.contains_key(&name) {
            return Err(SchemaError::Declaration(format!(
                "shape '{}' is already declared",
                name
            )));
        }
        if let Some(unknown) = parents.iter().find(|p| !self.shapes.contains_key(**p)) {
            return Err(SchemaError::Declaration(format!(
                "shape '{}' inherits unknown shape '{}'",
                name, unknown
            )));
        }
        schema.check()?;

        self.shapes
            .insert(name, CatalogEntry::new(ShapeDeclaration::new(parents, schema)));
        Ok(())
    }

    /// Effective schema of a named shape, composed on first use.
    pub fn resolve(&self, name: &str) -> Result<Arc<EffectiveSchema>> {
        let entry = self
            .shapes
            .get(name)
            .ok_or_else(|| SchemaError::Declaration(format!("unknown shape '{}'", name)))?;

        entry
            .effective
            .get_or_try_init(|| {
                let resolved = entry
                    .declaration
                    .parents
                    .iter()
                    .map(|parent| self.resolve(parent))
                    .collect::<Result<Vec<_>>>()?;
                let parents: Vec<&EffectiveSchema> = resolved.iter().map(Arc::as_ref).collect();
                compose(&entry.declaration.schema(), &parents).map(Arc::new)
            })
            .cloned()
    }

    /// Declaration of a named shape as written.
    pub fn declaration(&self, name: &str) -> Option<&ShapeDeclaration> {
        self.shapes.get(name).map(|entry| &entry.declaration)
    }

    /// Shape names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.shapes.keys().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.shapes.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Serialize the declarations back to JSON.
    pub fn to_json(&self) -> Result<String> {
        let declarations: IndexMap<&str, &ShapeDeclaration> = self
            .shapes
            .iter()
            .map(|(name, entry)| (name.as_str(), &entry.declaration))
            .collect();
        Ok(serde_json::to_string_pretty(&declarations)?)
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
    InProgress,
    Done,
}

/// Reject inheritance cycles with a depth-first walk.
fn check_acyclic(declarations: &IndexMap<String, ShapeDeclaration>) -> Result<()> {
    fn visit<'a>(
        name: &'a str,
        declarations: &'a IndexMap<String, ShapeDeclaration>,
        state: &mut HashMap<&'a str, Visit>,
        path: &mut Vec<&'a str>,
    ) -> Result<()> {
        match state.get(name) {
            Some(Visit::Done) => return Ok(()),
            Some(Visit::InProgress) => {
                path.push(name);
                return Err(SchemaError::Declaration(format!(
                    "inheritance cycle: {}",
                    path.join(" -> ")
                )));
            }
            None => {}
        }

        state.insert(name, Visit::InProgress);
        path.push(name);
        if let Some(declaration) = declarations.get(name) {
            for parent in &declaration.parents {
                visit(parent, declarations, state, path)?;
            }
        }
        path.pop();
        state.insert(name, Visit::Done);
        Ok(())
    }

    let mut state = HashMap::new();
    for name in declarations.keys() {
        visit(name, declarations, &mut state, &mut Vec::new())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtype::DtypeSpec;

    const DIAMOND: &str = r#"{
        "Down":  {"parents": ["Left", "Right"]},
        "Left":  {"parents": ["Root"], "required": {"left": "bool"}},
        "Right": {"parents": ["Root"], "required": {"root": "object", "right": "bool"}},
        "Root":  {"required": {"root": "bool"}}
    }"#;

    #[test]
    fn test_load_out_of_order_and_resolve() {
        let catalog = SchemaCatalog::from_json(DIAMOND).unwrap();
        assert_eq!(catalog.len(), 4);

        let down = catalog.resolve("Down").unwrap();
        assert_eq!(down.required().len(), 3);
        assert_eq!(down.required()["root"], DtypeSpec::Object);
        assert_eq!(down.required()["left"], DtypeSpec::bool());
        assert_eq!(down.required()["right"], DtypeSpec::bool());

        let again = catalog.resolve("Down").unwrap();
        assert!(Arc::ptr_eq(&down, &again));
    }

    #[test]
    fn test_unknown_parent_rejected() {
        let err = SchemaCatalog::from_json(r#"{"A": {"parents": ["B"]}}"#).unwrap_err();
        assert!(err.to_string().contains("unknown shape 'B'"));
    }

    #[test]
    fn test_cycle_rejected() {
        let json = r#"{
            "A": {"parents": ["B"]},
            "B": {"parents": ["C"]},
            "C": {"parents": ["A"]}
        }"#;
        let err = SchemaCatalog::from_json(json).unwrap_err();
        assert!(err.to_string().contains("inheritance cycle"));
    }

    #[test]
    fn test_malformed_shape_rejected_at_load() {
        let json = r#"{"A": {"required": {"x": "bool"}, "optional": {"x": "bool"}}}"#;
        assert!(matches!(
            SchemaCatalog::from_json(json),
            Err(SchemaError::Declaration(_))
        ));
    }

    #[test]
    fn test_misspelled_key_rejected() {
        let err = SchemaCatalog::from_json(r#"{"Events": {"requried": {"id": "int64"}}}"#)
            .unwrap_err();
        assert!(matches!(err, SchemaError::Json(_)));
        assert!(err.to_string().contains("requried"));

        let nested = r#"{"Events": {"index": {"name": "day", "type": "int64"}}}"#;
        assert!(SchemaCatalog::from_json(nested).is_err());
    }

    #[test]
    fn test_insert_requires_known_parents() {
        let mut catalog = SchemaCatalog::new();
        catalog
            .insert(
                "Base",
                &[],
                SchemaDescriptor::builder()
                    .required("id", DtypeSpec::int64())
                    .build()
                    .unwrap(),
            )
            .unwrap();
        assert!(catalog.insert("Child", &["Missing"], SchemaDescriptor::new()).is_err());
        catalog.insert("Child", &["Base"], SchemaDescriptor::new()).unwrap();
        assert!(catalog.insert("Child", &[], SchemaDescriptor::new()).is_err());

        assert!(catalog.resolve("Child").unwrap().is_required("id"));
        assert!(catalog.resolve("Nope").is_err());
    }

    #[test]
    fn test_json_round_trip_keeps_declarations() {
        let catalog = SchemaCatalog::from_json(DIAMOND).unwrap();
        let reloaded = SchemaCatalog::from_json(&catalog.to_json().unwrap()).unwrap();
        assert_eq!(reloaded.declaration("Right"), catalog.declaration("Right"));
        assert_eq!(reloaded.names().collect::<Vec<_>>(), catalog.names().collect::<Vec<_>>());
    }
}
