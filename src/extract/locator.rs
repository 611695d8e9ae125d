//! Candidate locators and section anchoring.
//!
//! A locator is one structural query for a value in a rendered document.
//! Fields are described by ordered lists of locators; see [`super::fields`].

use std::fmt;

use scraper::{ElementRef, Selector};
use tracing::warn;

/// One structural query strategy for a field's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locator {
    /// First element matching a CSS selector.
    Css(&'static str),
    /// The `n`-th (zero-based) element matching a CSS selector.
    Nth(&'static str, usize),
    /// First element matching `css` inside the section titled `heading`.
    InSection {
        heading: &'static str,
        css: &'static str,
    },
    /// Whole text of the section titled `heading`, heading removed.
    SectionText(&'static str),
}

impl Locator {
    /// Resolve against `scope`, yielding non-empty trimmed text or nothing.
    ///
    /// A locator that matches an element with no text counts as unresolved.
    pub fn resolve(&self, scope: ElementRef<'_>) -> Option<String> {
        match *self {
            Locator::Css(css) => nth_text(scope, css, 0),
            Locator::Nth(css, n) => nth_text(scope, css, n),
            Locator::InSection { heading, css } => {
                let section = find_section(scope, heading)?;
                nth_text(section, css, 0)
            }
            Locator::SectionText(heading) => {
                let section = find_section(scope, heading)?;
                let text = clean_text(section);
                non_empty(strip_heading(&text, heading).to_string())
            }
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Css(css) => write!(f, "css({})", css),
            Locator::Nth(css, n) => write!(f, "css({})[{}]", css, n),
            Locator::InSection { heading, css } => write!(f, "section({}) css({})", heading, css),
            Locator::SectionText(heading) => write!(f, "section({}) text", heading),
        }
    }
}

/// Ways of finding a section container from its heading text, most stable first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SectionAnchor {
    /// An anchor element whose id is the lowercased heading; the container
    /// is its closest `section` ancestor.
    AnchorId,
    /// An `h2` (or its visible span) reading the heading; the container is
    /// its closest `section` ancestor.
    SectionHeading,
    /// A `div` with a `div > div > span > span` child path reading the heading.
    NestedSpanHeading,
}

const SECTION_ANCHORS: &[SectionAnchor] = &[
    SectionAnchor::AnchorId,
    SectionAnchor::SectionHeading,
    SectionAnchor::NestedSpanHeading,
];

const SECTION_HEADING_SELECTORS: &[&str] = &["h2 span[aria-hidden='true']", "h2"];

const NESTED_HEADING_PATH: &[&str] = &["div", "div", "span", "span"];

/// Locate the section container titled `heading` beneath `scope`.
pub fn find_section<'a>(scope: ElementRef<'a>, heading: &str) -> Option<ElementRef<'a>> {
    SECTION_ANCHORS
        .iter()
        .find_map(|anchor| anchor_section(scope, *anchor, heading))
}

/// Repeated item nodes of a section: the `li` children of its first list.
pub fn section_items(section: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    let Some(list) = select_all(section, "ul").into_iter().next() else {
        return Vec::new();
    };

    list.children()
        .filter_map(ElementRef::wrap)
        .filter(|child| child.value().name() == "li")
        .collect()
}

fn anchor_section<'a>(
    scope: ElementRef<'a>,
    anchor: SectionAnchor,
    heading: &str,
) -> Option<ElementRef<'a>> {
    match anchor {
        SectionAnchor::AnchorId => {
            let id = heading.to_lowercase();
            select_all(scope, "[id]")
                .into_iter()
                .filter(|el| el.value().id() == Some(id.as_str()))
                .find_map(closest_section)
        }
        SectionAnchor::SectionHeading => SECTION_HEADING_SELECTORS.iter().find_map(|css| {
            select_all(scope, css)
                .into_iter()
                .filter(|h| text_equals(*h, heading))
                .find_map(closest_section)
        }),
        SectionAnchor::NestedSpanHeading => select_all(scope, "div")
            .into_iter()
            .find(|div| has_child_path(*div, NESTED_HEADING_PATH, heading)),
    }
}

/// Innermost `section` enclosing `el`.
fn closest_section(el: ElementRef<'_>) -> Option<ElementRef<'_>> {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| ancestor.value().name() == "section")
}

/// Whether `el` has a chain of direct children with the given tag names whose
/// last element reads `heading`.
fn has_child_path(el: ElementRef<'_>, path: &[&str], heading: &str) -> bool {
    let Some((tag, rest)) = path.split_first() else {
        return text_equals(el, heading);
    };

    el.children()
        .filter_map(ElementRef::wrap)
        .filter(|child| child.value().name() == *tag)
        .any(|child| has_child_path(child, rest, heading))
}

fn text_equals(el: ElementRef<'_>, heading: &str) -> bool {
    clean_text(el).eq_ignore_ascii_case(heading)
}

/// Remove leading repetitions of the heading (screen-reader duplicates included).
fn strip_heading<'t>(text: &'t str, heading: &str) -> &'t str {
    let mut rest = text.trim();
    while rest.len() >= heading.len()
        && rest.is_char_boundary(heading.len())
        && rest[..heading.len()].eq_ignore_ascii_case(heading)
    {
        rest = rest[heading.len()..].trim_start();
    }
    rest
}

fn nth_text(scope: ElementRef<'_>, css: &str, n: usize) -> Option<String> {
    let element = select_all(scope, css).into_iter().nth(n)?;
    non_empty(clean_text(element))
}

/// All matches of `css` beneath `scope`, in document order.
///
/// An unparseable selector is a table bug, not a document condition; it is
/// logged and treated as matching nothing.
fn select_all<'a>(scope: ElementRef<'a>, css: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(css) {
        Ok(selector) => scope.select(&selector).collect(),
        Err(e) => {
            warn!("Invalid selector {:?}: {:?}", css, e);
            Vec::new()
        }
    }
}

/// Element text with whitespace collapsed.
pub fn clean_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}
