//! well-known folder and file names of the report definition layout

use ulid::Ulid;

pub const VERSION_FILE: &str = "version.json";
pub const REPORT_FILE: &str = "report.json";
pub const REPORT_EXTENSIONS_FILE: &str = "reportExtensions.json";

pub const BOOKMARKS_FOLDER: &str = "bookmarks";
pub const BOOKMARKS_METADATA_FILE: &str = "bookmarks.json";
/// suffix appended to a bookmark's name to form its file name
pub const BOOKMARK_SUFFIX: &str = ".bookmark.json";
pub const BOOKMARK_PATTERN: &str = "*.bookmark.json";

pub const PAGES_FOLDER: &str = "pages";
pub const PAGES_METADATA_FILE: &str = "pages.json";
pub const PAGE_FILE: &str = "page.json";

pub const VISUALS_FOLDER: &str = "visuals";
pub const VISUAL_FILE: &str = "visual.json";
pub const VISUAL_MOBILE_FILE: &str = "mobile.json";

/// generate a fresh item name (page, visual, bookmark).
///
/// ULIDs are lower-cased so generated folder names look like the ones the
/// authoring tools produce.
pub fn generate_name() -> String {
    Ulid::new().to_string().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_names_are_unique_and_lowercase() {
        let a = generate_name();
        let b = generate_name();
        assert_ne!(a, b);
        assert_eq!(a.len(), 26);
        assert_eq!(a, a.to_lowercase());
    }
}
