//! a small but complete definition shared by the reader and writer tests.
//!
//! Every `$schema` is the kind's current default and every typed value is in
//! the form the serializer produces, so a read followed by a write reproduces
//! each file's JSON exactly.

use serde_json::{json, Value};

use crate::document::{
    Bookmark, BookmarksMetadata, DocumentKind, Page, PagesMetadata, Report, ReportExtension, VersionMetadata,
    VisualContainer, VisualMobileState,
};
use crate::store::{FileStore, MemoryStore, RelativePath};

fn pretty(value: Value) -> String {
    serde_json::to_string_pretty(&value).unwrap()
}

fn files() -> Vec<(&'static str, Value)> {
    vec![
        (
            "version.json",
            json!({
                "$schema": VersionMetadata::DEFAULT_SCHEMA,
                "version": "1.0.0"
            }),
        ),
        (
            "report.json",
            json!({
                "$schema": Report::DEFAULT_SCHEMA,
                "themeCollection": {
                    "baseTheme": { "name": "CY24SU10", "type": "SharedResources" }
                },
                "layoutOptimization": "None",
                "annotations": [{ "name": "owner", "value": "finance" }]
            }),
        ),
        (
            "reportExtensions.json",
            json!({
                "$schema": ReportExtension::DEFAULT_SCHEMA,
                "name": "extension",
                "entities": []
            }),
        ),
        (
            "bookmarks/bookmarks.json",
            json!({
                "$schema": BookmarksMetadata::DEFAULT_SCHEMA,
                "items": [
                    { "name": "b1" },
                    { "name": "g1", "displayName": "Saved views", "children": ["b2"] }
                ]
            }),
        ),
        (
            "bookmarks/b1.bookmark.json",
            json!({
                "$schema": Bookmark::DEFAULT_SCHEMA,
                "name": "b1",
                "displayName": "Default view",
                "explorationState": { "version": "1.3", "activeSection": "p1" }
            }),
        ),
        (
            "bookmarks/b2.bookmark.json",
            json!({
                "$schema": Bookmark::DEFAULT_SCHEMA,
                "name": "b2",
                "displayName": "Filtered view"
            }),
        ),
        (
            "pages/pages.json",
            json!({
                "$schema": PagesMetadata::DEFAULT_SCHEMA,
                "pageOrder": ["p1", "p2"],
                "activePageName": "p1"
            }),
        ),
        (
            "pages/p1/page.json",
            json!({
                "$schema": Page::DEFAULT_SCHEMA,
                "name": "p1",
                "displayName": "Overview",
                "displayOption": "FitToPage",
                "height": 720,
                "width": 1280,
                "filterConfig": { "filters": [] }
            }),
        ),
        (
            "pages/p1/visuals/v1/visual.json",
            json!({
                "$schema": VisualContainer::DEFAULT_SCHEMA,
                "name": "v1",
                "position": { "x": 10, "y": 20.5, "z": 0, "height": 300, "width": 400, "tabOrder": 0 },
                "visual": { "visualType": "barChart" }
            }),
        ),
        (
            "pages/p1/visuals/v1/mobile.json",
            json!({
                "$schema": VisualMobileState::DEFAULT_SCHEMA,
                "position": { "x": 0, "y": 0, "height": 200, "width": 320 }
            }),
        ),
        (
            "pages/p1/visuals/v2/visual.json",
            json!({
                "$schema": VisualContainer::DEFAULT_SCHEMA,
                "name": "v2",
                "position": { "x": 420, "y": 20, "height": 300, "width": 400 },
                "annotations": [{ "name": "hidden", "value": "true" }]
            }),
        ),
        (
            "pages/p2/page.json",
            json!({
                "$schema": Page::DEFAULT_SCHEMA,
                "name": "p2",
                "displayName": "Details",
                "height": 720,
                "width": 1280
            }),
        ),
    ]
}

/// an in-memory store holding the complete fixture definition
pub(crate) fn definition_store() -> MemoryStore {
    let store = MemoryStore::new();
    for (path, value) in files() {
        let path = RelativePath::new(path).unwrap();
        store.write_text(&path, &pretty(value)).unwrap();
    }
    store
}

/// copy every file of `from` into `to`
pub(crate) fn copy_into(from: &MemoryStore, to: &dyn FileStore) {
    for path in from.file_paths() {
        let contents = from.read_text(&path).unwrap();
        to.write_text(&path, &contents).unwrap();
    }
}
