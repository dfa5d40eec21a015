use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::HashMap;

static LAYOUT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\{\{=\s*layout\(\s*['"]([^'"]+)['"]\s*\)\s*\}\}"#).expect("valid layout pattern")
});

static BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?s)\{\{=\s*block\(\s*['"]([^'"]+)['"]\s*\)\s*\}\}(.*?)\{\{=\s*endblock\s*\}\}"#,
    )
    .expect("valid block pattern")
});

static DEFINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\{\{=\s*define\s+block\(\s*['"]([^'"]+)['"]\s*\)\s*\}\}"#)
        .expect("valid define pattern")
});

/// Name of the block that receives content outside of any block.
pub const BODY: &str = "body";

/// Named block content, collected from a single view.
pub type Blocks = HashMap<String, String>;

/// Structure found in a view.
#[derive(Debug, Default, PartialEq)]
pub struct Extraction {
    /// Name of the layout, from the first `layout` directive.
    pub layout: Option<String>,
    pub blocks: Blocks,
    /// Text that remains after the layout directive and every block
    /// are removed.
    pub remainder: String,
}

/// Collect the layout name and blocks from the text.
///
/// Only the first `layout` directive takes effect, any others are left in
/// the remainder. When a block appears twice the last one wins. Unless a
/// `body` block is defined, a remainder that is not only whitespace becomes
/// the `body` block as it is, surrounding whitespace included.
pub fn extract(text: &str) -> Extraction {
    let layout = LAYOUT
        .captures(text)
        .and_then(|captures| captures.get(1))
        .map(|name| name.as_str().to_string());
    let text = LAYOUT.replace(text, "");

    let mut blocks = Blocks::new();
    for captures in BLOCK.captures_iter(&text) {
        if let (Some(name), Some(body)) = (captures.get(1), captures.get(2)) {
            blocks.insert(name.as_str().to_string(), body.as_str().to_string());
        }
    }
    let remainder = BLOCK.replace_all(&text, "").into_owned();

    if !remainder.trim().is_empty() && !blocks.contains_key(BODY) {
        blocks.insert(BODY.to_string(), remainder.clone());
    }

    Extraction {
        layout,
        blocks,
        remainder,
    }
}

/// Replace every `define block` placeholder in the layout with the content
/// of the named block, or nothing when the block is not defined.
pub fn apply(layout: &str, blocks: &Blocks) -> String {
    DEFINE
        .replace_all(layout, |captures: &Captures| {
            captures
                .get(1)
                .and_then(|name| blocks.get(name.as_str()))
                .cloned()
                .unwrap_or_default()
        })
        .into_owned()
}

/// Remove `block` and `endblock` markers, leaving their content in place.
pub fn unwrap_blocks(text: &str) -> String {
    BLOCK.replace_all(text, "${2}").into_owned()
}
