use std::collections::BTreeSet;

use ego_tree::NodeRef;
use scraper::node::Node;
use scraper::{ElementRef, Html};
use watch_core::{ExtractMode, Target};

use crate::links::first_link_under;

/// Reduces a decoded page to the canonical keyword-relevant extract of a target.
pub trait Extractor: Send + Sync {
    fn extract(&self, raw: &str, target: &Target) -> String;
}

/// Text-node extractor for HTML pages:
/// - skips text inside `script`, `style`, `noscript` and `template`
/// - each matching node yields its trimmed text plus the first link under its parent
/// - hits are deduplicated and sorted so node order never matters.
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkupExtractor;

/// Line filter for plain-text pages: every line containing a keyword, verbatim.
#[derive(Debug, Default, Clone, Copy)]
pub struct LineExtractor;

pub fn extractor_for(mode: ExtractMode) -> &'static dyn Extractor {
    match mode {
        ExtractMode::Markup => &MarkupExtractor,
        ExtractMode::Lines => &LineExtractor,
    }
}

impl Extractor for MarkupExtractor {
    fn extract(&self, raw: &str, target: &Target) -> String {
        if target.is_unfiltered() {
            return normalize_newlines(raw);
        }

        let document = Html::parse_document(raw);
        let hits = document
            .tree
            .root()
            .descendants()
            .filter_map(|node| match node.value() {
                Node::Text(text) => Some((node, text.trim())),
                _ => None,
            })
            .filter(|(_, text)| target.matches(text))
            .filter(|(node, _)| !inside_hidden_element(*node))
            .map(|(node, text)| {
                let link = node
                    .parent()
                    .and_then(ElementRef::wrap)
                    .and_then(|parent| first_link_under(parent, target.url()));
                match link {
                    Some(url) => format!("{text} {url}").trim().to_string(),
                    None => text.to_string(),
                }
            });

        canonicalize(hits)
    }
}

impl Extractor for LineExtractor {
    fn extract(&self, raw: &str, target: &Target) -> String {
        if target.is_unfiltered() {
            return normalize_newlines(raw);
        }
        canonicalize(
            raw.lines()
                .filter(|line| target.matches(line))
                .map(str::to_string),
        )
    }
}

/// Deduplicate, sort bytewise, join with `\n`. No hits yields an empty string.
pub fn canonicalize(hits: impl IntoIterator<Item = String>) -> String {
    let unique: BTreeSet<String> = hits.into_iter().collect();
    unique.into_iter().collect::<Vec<_>>().join("\n")
}

fn normalize_newlines(raw: &str) -> String {
    raw.replace("\r\n", "\n").replace('\r', "\n")
}

fn inside_hidden_element(node: NodeRef<'_, Node>) -> bool {
    node.ancestors()
        .filter_map(ElementRef::wrap)
        .any(|el| {
            matches!(
                el.value().name().to_ascii_lowercase().as_str(),
                "script" | "style" | "noscript" | "template"
            )
        })
}
