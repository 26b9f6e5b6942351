//! concrete document kinds of a report definition.
//!
//! each kind models the handful of properties the library works with; every
//! other property in the file survives through the document's raw payload.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::document::annotation::Annotation;
use crate::document::collection::DocumentCollection;
use crate::document::doc::{Doc, DocumentKind};
use crate::document::names;
use crate::document::node::{ChildAnchor, Node};
use crate::resolve::{AnyOf2, Candidate, FieldDef, Resolvable, ShapeDef};
use crate::store::RelativePath;

const SCHEMA_BASE: &str = "https://developer.microsoft.com/json-schemas/fabric/item/report/definition";

macro_rules! schema_url {
    ($kind:literal, $version:literal) => {
        concat!(
            "https://developer.microsoft.com/json-schemas/fabric/item/report/definition/",
            $kind,
            "/",
            $version,
            "/schema.json"
        )
    };
}

/// check that a schema URL belongs to the report definition family
pub fn is_report_schema(schema: &str) -> bool {
    schema.starts_with(SCHEMA_BASE)
}

/// `<folder-name>/<file>` for items stored one folder per item
fn item_path(name: &str, file: &str) -> Option<RelativePath> {
    if name.is_empty() {
        return None;
    }
    RelativePath::new(format!("{name}/{file}")).ok()
}

// ---------------------------------------------------------------------------
// singletons
// ---------------------------------------------------------------------------

/// `version.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VersionMetadata {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub version: String,
}

impl VersionMetadata {
    /// versions are `major.minor.0` with major >= 1
    pub fn is_valid_version(&self) -> bool {
        static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
        PATTERN
            .get_or_init(|| Regex::new(r"^[1-9][0-9]*\.(0|[1-9][0-9]*)\.0$").ok())
            .as_ref()
            .is_some_and(|re| re.is_match(&self.version))
    }
}

impl DocumentKind for VersionMetadata {
    const KIND: &'static str = "versionMetadata";
    const DEFAULT_SCHEMA: &'static str = schema_url!("versionMetadata", "1.0.0");
    const FIELDS: &'static [&'static str] = &["version"];

    fn default_path(&self) -> Option<RelativePath> {
        Some(RelativePath::known(names::VERSION_FILE))
    }
}

/// `report.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Report {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout_optimization: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
}

impl DocumentKind for Report {
    const KIND: &'static str = "report";
    const DEFAULT_SCHEMA: &'static str = schema_url!("report", "1.2.0");
    const FIELDS: &'static [&'static str] = &["layoutOptimization", "annotations"];

    fn default_path(&self) -> Option<RelativePath> {
        Some(RelativePath::known(names::REPORT_FILE))
    }
}

/// `reportExtensions.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReportExtension {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
}

impl DocumentKind for ReportExtension {
    const KIND: &'static str = "reportExtension";
    const DEFAULT_SCHEMA: &'static str = schema_url!("reportExtension", "1.0.0");
    const FIELDS: &'static [&'static str] = &["name"];

    fn default_path(&self) -> Option<RelativePath> {
        Some(RelativePath::known(names::REPORT_EXTENSIONS_FILE))
    }
}

// ---------------------------------------------------------------------------
// bookmarks
// ---------------------------------------------------------------------------

/// `bookmarks/<name>.bookmark.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Bookmark {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl Bookmark {
    /// a bookmark with a freshly generated name
    pub fn named(display_name: impl Into<String>) -> Self {
        Self {
            name: names::generate_name(),
            display_name: Some(display_name.into()),
        }
    }
}

impl DocumentKind for Bookmark {
    const KIND: &'static str = "bookmark";
    const DEFAULT_SCHEMA: &'static str = schema_url!("bookmark", "1.2.0");
    const FIELDS: &'static [&'static str] = &["name", "displayName"];

    fn synthesized_path(&self) -> Option<RelativePath> {
        if self.name.is_empty() {
            return None;
        }
        RelativePath::new(format!("{}{}", self.name, names::BOOKMARK_SUFFIX)).ok()
    }
}

/// an entry of `bookmarks.json` pointing at a single bookmark
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookmarkReference {
    pub name: String,
}

/// an entry of `bookmarks.json` grouping several bookmarks
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BookmarkGroup {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub children: Vec<String>,
}

impl Resolvable for BookmarkReference {
    fn candidate() -> Candidate {
        const FIELDS: &[FieldDef] = &[FieldDef::value("name")];
        Candidate::Object(ShapeDef::new("BookmarkReference", FIELDS))
    }
}

impl Resolvable for BookmarkGroup {
    fn candidate() -> Candidate {
        const FIELDS: &[FieldDef] = &[
            FieldDef::value("name"),
            FieldDef::value("displayName"),
            FieldDef::array("children"),
        ];
        Candidate::Object(ShapeDef::new("BookmarkGroup", FIELDS))
    }
}

/// an item of `bookmarks.json`, either a single bookmark or a group
pub type BookmarkItem = AnyOf2<BookmarkReference, BookmarkGroup>;

/// `bookmarks/bookmarks.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BookmarksMetadata {
    pub items: Vec<BookmarkItem>,
}

impl BookmarksMetadata {
    /// names of every bookmark referenced, including group members
    pub fn bookmark_names(&self) -> Vec<&str> {
        let mut found = Vec::new();
        for item in &self.items {
            match item {
                AnyOf2::First(reference) => found.push(reference.name.as_str()),
                AnyOf2::Second(group) => found.extend(group.children.iter().map(String::as_str)),
            }
        }
        found
    }
}

impl DocumentKind for BookmarksMetadata {
    const KIND: &'static str = "bookmarksMetadata";
    const DEFAULT_SCHEMA: &'static str = schema_url!("bookmarksMetadata", "1.0.0");
    const FIELDS: &'static [&'static str] = &["items"];

    fn default_path(&self) -> Option<RelativePath> {
        Some(RelativePath::known(names::BOOKMARKS_METADATA_FILE))
    }
}

// ---------------------------------------------------------------------------
// pages
// ---------------------------------------------------------------------------

/// `pages/<name>/page.json`, owning the visuals below it
#[derive(Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Page {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_option: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
    #[serde(skip, default = "Page::empty_visuals")]
    visuals: DocumentCollection<VisualContainer>,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            name: String::new(),
            display_name: None,
            display_option: None,
            height: None,
            width: None,
            annotations: Vec::new(),
            visuals: Self::empty_visuals(),
        }
    }
}

impl Page {
    /// a page with a freshly generated name
    pub fn named(display_name: impl Into<String>) -> Self {
        Self {
            name: names::generate_name(),
            display_name: Some(display_name.into()),
            ..Self::default()
        }
    }

    fn empty_visuals() -> DocumentCollection<VisualContainer> {
        DocumentCollection::new(RelativePath::known(names::VISUALS_FOLDER))
    }

    pub fn visuals(&self) -> &DocumentCollection<VisualContainer> {
        &self.visuals
    }

    pub fn visuals_mut(&mut self) -> &mut DocumentCollection<VisualContainer> {
        &mut self.visuals
    }
}

impl DocumentKind for Page {
    const KIND: &'static str = "page";
    const DEFAULT_SCHEMA: &'static str = schema_url!("page", "1.3.0");
    const FIELDS: &'static [&'static str] = &["name", "displayName", "displayOption", "height", "width", "annotations"];
    const ANCHOR: ChildAnchor = ChildAnchor::Folder;

    fn attach(&mut self, owner: &Node) {
        self.visuals.node().set_parent(owner);
    }

    fn default_path(&self) -> Option<RelativePath> {
        item_path(&self.name, names::PAGE_FILE)
    }
}

/// `pages/pages.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PagesMetadata {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub page_order: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_page_name: Option<String>,
}

impl DocumentKind for PagesMetadata {
    const KIND: &'static str = "pagesMetadata";
    const DEFAULT_SCHEMA: &'static str = schema_url!("pagesMetadata", "1.0.0");
    const FIELDS: &'static [&'static str] = &["pageOrder", "activePageName"];

    fn default_path(&self) -> Option<RelativePath> {
        Some(RelativePath::known(names::PAGES_METADATA_FILE))
    }
}

// ---------------------------------------------------------------------------
// visuals
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualPosition {
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
    pub height: f64,
    pub width: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tab_order: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angle: Option<f64>,
}

/// `pages/<page>/visuals/<name>/visual.json`, optionally owning a mobile layout
#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VisualContainer {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<VisualPosition>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
    #[serde(skip)]
    mobile_state: Option<Doc<VisualMobileState>>,
}

impl VisualContainer {
    /// a visual with a freshly generated name
    pub fn new() -> Self {
        Self {
            name: names::generate_name(),
            ..Self::default()
        }
    }
}

impl DocumentKind for VisualContainer {
    const KIND: &'static str = "visualContainer";
    const DEFAULT_SCHEMA: &'static str = schema_url!("visualContainer", "1.2.0");
    const FIELDS: &'static [&'static str] = &["name", "position", "annotations"];
    const ANCHOR: ChildAnchor = ChildAnchor::Grandparent;

    fn attach(&mut self, owner: &Node) {
        if let Some(mobile) = &self.mobile_state {
            mobile.node().set_parent(owner);
        }
    }

    fn default_path(&self) -> Option<RelativePath> {
        item_path(&self.name, names::VISUAL_FILE)
    }
}

impl Doc<VisualContainer> {
    pub fn mobile_state(&self) -> Option<&Doc<VisualMobileState>> {
        self.content.mobile_state.as_ref()
    }

    pub fn mobile_state_mut(&mut self) -> Option<&mut Doc<VisualMobileState>> {
        self.content.mobile_state.as_mut()
    }

    /// attach (or detach) the mobile layout companion, parenting it to this visual
    pub fn set_mobile_state(&mut self, mobile: Option<Doc<VisualMobileState>>) -> Option<Doc<VisualMobileState>> {
        if let Some(doc) = &mobile {
            doc.node().set_parent(&self.node);
        }
        std::mem::replace(&mut self.content.mobile_state, mobile)
    }

    /// default location of the mobile companion: next to this visual's own file
    pub(crate) fn default_mobile_path(&self) -> Option<RelativePath> {
        let own = self.path().or_else(|| self.content.default_path())?;
        Some(own.without_last().join(&RelativePath::known(names::VISUAL_MOBILE_FILE)))
    }
}

/// `pages/<page>/visuals/<visual>/mobile.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VisualMobileState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<VisualPosition>,
}

impl DocumentKind for VisualMobileState {
    const KIND: &'static str = "visualMobileState";
    const DEFAULT_SCHEMA: &'static str = schema_url!("visualContainerMobileState", "1.0.0");
    const FIELDS: &'static [&'static str] = &["position"];
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path(p: &str) -> RelativePath {
        RelativePath::new(p).unwrap()
    }

    #[test]
    fn test_schema_urls() {
        assert!(is_report_schema(Page::DEFAULT_SCHEMA));
        assert!(Page::DEFAULT_SCHEMA.ends_with("/page/1.3.0/schema.json"));
        assert!(!is_report_schema("https://example.com/schema.json"));
    }

    #[test]
    fn test_version_format() {
        let mut version = VersionMetadata { version: "1.0.0".into() };
        assert!(version.is_valid_version());
        version.version = "2.1.0".into();
        assert!(version.is_valid_version());
        version.version = "0.1.0".into();
        assert!(!version.is_valid_version());
        version.version = "1.0.1".into();
        assert!(!version.is_valid_version());
    }

    #[test]
    fn test_default_paths() {
        let mut page = Page::default();
        assert!(page.default_path().is_none());
        page.name = "p1".into();
        assert_eq!(page.default_path().unwrap(), path("p1/page.json"));

        let visual = VisualContainer::new();
        assert_eq!(visual.default_path().unwrap().file_name(), Some("visual.json"));
        assert!(VisualMobileState::default().default_path().is_none());
    }

    #[test]
    fn test_page_visuals_resolve_under_page_folder() {
        let mut pages = DocumentCollection::<Page>::new(path("pages"));
        let mut page = Page::default();
        page.name = "p1".into();
        pages.push(Doc::new(page).at(path("p1/page.json")));

        let page = pages.find_mut(|p| p.name == "p1").unwrap();
        let mut visual = Doc::new(VisualContainer::new()).at(path("v1/visual.json"));
        visual.set_mobile_state(Some(Doc::new(VisualMobileState::default()).at(path("v1/mobile.json"))));
        page.visuals_mut().push(visual);

        let visual = page.visuals().get(0).unwrap();
        assert_eq!(page.visuals().effective_path().unwrap(), path("pages/p1/visuals"));
        assert_eq!(visual.effective_path().unwrap(), path("pages/p1/visuals/v1/visual.json"));
        assert_eq!(
            visual.mobile_state().unwrap().effective_path().unwrap(),
            path("pages/p1/visuals/v1/mobile.json")
        );
        assert_eq!(visual.default_mobile_path().unwrap(), path("v1/mobile.json"));
    }

    #[test]
    fn test_bookmark_items_resolve_structurally() {
        let metadata: BookmarksMetadata = serde_json::from_value(json!({
            "items": [
                {"name": "b1"},
                {"name": "g1", "displayName": "Group", "children": ["b2", "b3"]}
            ]
        }))
        .unwrap();

        assert!(matches!(&metadata.items[0], AnyOf2::First(r) if r.name == "b1"));
        assert!(matches!(&metadata.items[1], AnyOf2::Second(g) if g.children.len() == 2));
        assert_eq!(metadata.bookmark_names(), vec!["b1", "b2", "b3"]);

        // serialization stays untagged
        let back = serde_json::to_value(&metadata).unwrap();
        assert_eq!(back["items"][0], json!({"name": "b1"}));
    }
}
