//! a single JSON file: typed content overlaid on the retained raw payload.

use std::ops::{Deref, DerefMut};

use serde::de::{DeserializeOwned, Error as _};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::document::error::{DocumentError, DocumentResult};
use crate::document::node::{ChildAnchor, Node};
use crate::resolve::populate;
use crate::store::RelativePath;

/// JSON property carrying a document's schema identifier
pub const SCHEMA_KEY: &str = "$schema";

/// What a concrete document kind supplies to the core: its identity, its
/// default schema, the JSON properties it models, and where it lives by default.
pub trait DocumentKind: Serialize + DeserializeOwned + Default {
    /// short name used in errors and logs
    const KIND: &'static str;

    const DEFAULT_SCHEMA: &'static str;

    /// JSON property names the typed content owns. A declared property the
    /// content stops serializing is removed from the raw payload on write.
    const FIELDS: &'static [&'static str];

    /// how documents nested below this kind compose their paths
    const ANCHOR: ChildAnchor = ChildAnchor::Path;

    /// link nested collections or companions to the document's node
    fn attach(&mut self, _owner: &Node) {}

    /// a path derived from the content, used when the document has none of its own
    fn synthesized_path(&self) -> Option<RelativePath> {
        None
    }

    /// the path assigned on first write when none is set
    fn default_path(&self) -> Option<RelativePath> {
        self.synthesized_path()
    }
}

/// A document of kind `K`.
///
/// `raw` holds the last payload read or written, so properties the typed model
/// doesn't know about survive a round trip. On serialization a typed field
/// that was changed wins over its raw property.
#[derive(Debug)]
pub struct Doc<K> {
    pub(crate) node: Node,
    pub(crate) schema: String,
    pub(crate) raw: Option<Map<String, Value>>,
    pub(crate) content: K,
}

impl<K: DocumentKind> Doc<K> {
    /// a fresh document with the kind's default schema and no raw payload
    pub fn new(content: K) -> Self {
        let mut doc = Self {
            node: Node::new(K::KIND, K::ANCHOR),
            schema: K::DEFAULT_SCHEMA.to_string(),
            raw: None,
            content,
        };
        doc.reattach();
        doc
    }

    /// build a document from a parsed payload, retaining it as the raw JSON.
    ///
    /// The payload must be an object. `$schema` is taken from it when present.
    pub fn from_json(value: Value) -> Result<Self, serde_json::Error> {
        let Value::Object(raw) = value else {
            return Err(serde_json::Error::custom(format!(
                "{} document must be a JSON object",
                K::KIND
            )));
        };

        let schema = raw
            .get(SCHEMA_KEY)
            .and_then(Value::as_str)
            .map_or_else(|| K::DEFAULT_SCHEMA.to_string(), str::to_string);
        let content: K = populate(Value::Object(raw.clone()))?;

        let mut doc = Self {
            node: Node::new(K::KIND, K::ANCHOR),
            schema,
            raw: Some(raw),
            content,
        };
        doc.reattach();
        Ok(doc)
    }

    pub fn kind(&self) -> &'static str {
        K::KIND
    }

    pub fn node(&self) -> &Node {
        &self.node
    }

    pub fn path(&self) -> Option<RelativePath> {
        self.node.path()
    }

    pub fn set_path(&mut self, path: Option<RelativePath>) {
        self.node.set_path(path);
    }

    /// builder form of [`Doc::set_path`]
    pub fn at(self, path: RelativePath) -> Self {
        self.node.set_path(Some(path));
        self
    }

    /// resolve the store-relative location through the parent chain.
    ///
    /// A document without a path of its own falls back to its kind's
    /// synthesized path; the fallback is not assigned.
    pub fn effective_path(&self) -> DocumentResult<RelativePath> {
        let own = self
            .path()
            .or_else(|| self.content.synthesized_path())
            .ok_or(DocumentError::MissingPath { kind: K::KIND })?;
        self.node.resolve(&own)
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn set_schema(&mut self, schema: impl Into<String>) {
        self.schema = schema.into();
    }

    pub fn default_schema(&self) -> &'static str {
        K::DEFAULT_SCHEMA
    }

    /// reset the schema to the kind's default
    pub fn refresh_schema(&mut self) {
        if self.schema != K::DEFAULT_SCHEMA {
            self.schema = K::DEFAULT_SCHEMA.to_string();
        }
    }

    pub fn raw_json(&self) -> Option<&Map<String, Value>> {
        self.raw.as_ref()
    }

    pub fn set_raw_json(&mut self, raw: Option<Map<String, Value>>) {
        self.raw = raw;
    }

    pub fn content(&self) -> &K {
        &self.content
    }

    /// replace the typed content, re-linking anything it nests
    pub fn set_content(&mut self, content: K) {
        self.content = content;
        self.reattach();
    }

    pub fn into_content(self) -> K {
        self.content
    }

    /// re-link nested collections and companions to this document's node
    pub(crate) fn reattach(&mut self) {
        self.content.attach(&self.node);
    }

    /// the payload to write: raw JSON with `$schema` and the typed fields overlaid.
    ///
    /// A typed field that still equals what the raw payload populates to is
    /// left exactly as read, so `null`, `[]` or `1.0` in the file survive an
    /// unmodified write. Changed fields replace their raw property, and a
    /// declared field the content no longer serializes is removed.
    pub fn to_json(&self) -> DocumentResult<Map<String, Value>> {
        let typed = serialize_object::<K>(&self.content)?;
        let baseline = self.raw_baseline();
        let unchanged =
            |key: &str| baseline.as_ref().is_some_and(|base| base.get(key) == typed.get(key));

        let mut out = self.raw.clone().unwrap_or_default();
        out.insert(SCHEMA_KEY.to_string(), Value::String(self.schema.clone()));

        for field in K::FIELDS {
            if !typed.contains_key(*field) && !unchanged(*field) {
                out.shift_remove(*field);
            }
        }
        for (key, value) in &typed {
            if !unchanged(key.as_str()) {
                out.insert(key.clone(), whole_floats_as_integers(value.clone()));
            }
        }

        Ok(out)
    }

    /// the typed serialization of the raw payload as read, `None` without one
    fn raw_baseline(&self) -> Option<Map<String, Value>> {
        let raw = self.raw.as_ref()?;
        let content: K = populate(Value::Object(raw.clone())).ok()?;
        serialize_object::<K>(&content).ok()
    }

    /// serialized payload text, indented or compact
    pub fn to_json_string(&self, pretty: bool) -> DocumentResult<String> {
        let payload = Value::Object(self.to_json()?);
        let text = if pretty {
            serde_json::to_string_pretty(&payload)?
        } else {
            serde_json::to_string(&payload)?
        };
        Ok(text)
    }
}

fn serialize_object<K: DocumentKind>(content: &K) -> DocumentResult<Map<String, Value>> {
    match serde_json::to_value(content)? {
        Value::Object(map) => Ok(map),
        _ => Err(DocumentError::NotAnObject { kind: K::KIND }),
    }
}

/// write `720.0` as `720`, leaving genuine fractions alone
fn whole_floats_as_integers(value: Value) -> Value {
    const EXACT: f64 = 9_007_199_254_740_992.0; // 2^53

    match value {
        Value::Number(n) if n.is_f64() => match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < EXACT => Value::from(f as i64),
            _ => Value::Number(n),
        },
        Value::Array(items) => Value::Array(items.into_iter().map(whole_floats_as_integers).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, whole_floats_as_integers(v)))
                .collect(),
        ),
        other => other,
    }
}

impl<K> Deref for Doc<K> {
    type Target = K;

    fn deref(&self) -> &K {
        &self.content
    }
}

impl<K> DerefMut for Doc<K> {
    fn deref_mut(&mut self) -> &mut K {
        &mut self.content
    }
}

impl<K: PartialEq> PartialEq for Doc<K> {
    fn eq(&self, other: &Self) -> bool {
        self.node == other.node && self.schema == other.schema && self.raw == other.raw && self.content == other.content
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::kinds::{Bookmark, Page, Report};
    use serde_json::json;

    #[test]
    fn test_new_uses_default_schema() {
        let doc = Doc::new(Report::default());
        assert_eq!(doc.schema(), Report::DEFAULT_SCHEMA);
        assert!(doc.raw_json().is_none());
        assert!(doc.path().is_none());
    }

    #[test]
    fn test_from_json_keeps_schema_and_raw() {
        let doc = Doc::<Page>::from_json(json!({
            "$schema": "https://example.com/page/1.0.0/schema.json",
            "name": "p1",
            "displayName": "Overview",
            "filterConfig": {"filters": []}
        }))
        .unwrap();

        assert_eq!(doc.schema(), "https://example.com/page/1.0.0/schema.json");
        assert_eq!(doc.name, "p1");
        assert_eq!(doc.display_name.as_deref(), Some("Overview"));
        assert!(doc.raw_json().unwrap().contains_key("filterConfig"));
    }

    #[test]
    fn test_from_json_rejects_non_objects() {
        assert!(Doc::<Report>::from_json(json!([1, 2])).is_err());
    }

    #[test]
    fn test_typed_fields_overlay_raw() {
        let mut doc = Doc::<Page>::from_json(json!({
            "$schema": "old",
            "name": "p1",
            "displayName": "Before",
            "filterConfig": {"x": 1},
            "height": 720
        }))
        .unwrap();
        doc.display_name = Some("After".to_string());
        doc.refresh_schema();

        let out = doc.to_json().unwrap();
        assert_eq!(out["$schema"], json!(Page::DEFAULT_SCHEMA));
        assert_eq!(out["displayName"], json!("After"));
        assert_eq!(out["filterConfig"], json!({"x": 1}));
        assert_eq!(out["height"], json!(720));

        // unmodeled properties keep their position
        let keys: Vec<&str> = out.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["$schema", "name", "displayName", "filterConfig", "height"]);
    }

    #[test]
    fn test_cleared_field_is_removed() {
        let mut doc = Doc::<Page>::from_json(json!({"name": "p1", "displayName": "Gone"})).unwrap();
        doc.display_name = None;

        let out = doc.to_json().unwrap();
        assert!(!out.contains_key("displayName"));
        assert_eq!(out["name"], json!("p1"));
    }

    #[test]
    fn test_untouched_defaults_survive() {
        let payload = json!({
            "$schema": Page::DEFAULT_SCHEMA,
            "name": "p1",
            "displayName": null,
            "displayOption": "",
            "height": 720.0,
            "annotations": []
        });
        let doc = Doc::<Page>::from_json(payload.clone()).unwrap();

        assert_eq!(Value::Object(doc.to_json().unwrap()), payload);
    }

    #[test]
    fn test_changed_default_replaces_raw() {
        let mut doc = Doc::<Page>::from_json(json!({"name": "p1", "displayName": null, "height": 720.0})).unwrap();
        doc.display_name = Some("Overview".into());
        doc.height = Some(1080.0);

        let out = doc.to_json().unwrap();
        assert_eq!(out["displayName"], json!("Overview"));
        assert_eq!(out["height"], json!(1080));
    }

    #[test]
    fn test_whole_floats_written_as_integers() {
        let mut page = Page::default();
        page.name = "p1".into();
        page.height = Some(720.0);
        page.width = Some(1280.5);

        let text = Doc::new(page).to_json_string(false).unwrap();
        assert!(text.contains("\"height\":720,"), "{text}");
        assert!(text.contains("\"width\":1280.5"), "{text}");
    }

    #[test]
    fn test_effective_path_falls_back_to_synthesized() {
        let doc = Doc::new(Bookmark::named("Q1 view"));
        let expected = format!("{}.bookmark.json", doc.name);
        assert_eq!(doc.effective_path().unwrap().to_string(), expected);
        // the fallback is not stored
        assert!(doc.path().is_none());

        assert!(Doc::new(Report::default()).effective_path().unwrap_err().is_missing_path());
    }
}
