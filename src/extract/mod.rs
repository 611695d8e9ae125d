//! Field extraction from rendered profile pages.
//!
//! Every field is resolved through an ordered list of candidate locators
//! ([`fields`]); the first candidate yielding non-empty text wins. Missing
//! fields and sections are never errors: they come back empty.
//!
//! Extraction runs over a static HTML snapshot, so it is synchronous and can
//! be exercised against saved pages without a browser.

pub mod dates;
pub mod fields;
mod locator;

use scraper::{ElementRef, Html};
use tracing::{debug, warn};

use crate::models::{EducationEntry, ExperienceEntry, Location, ProfileRecord};

pub use dates::{parse_date_range, parse_field_of_study};
pub use fields::FieldSpec;
pub use locator::{clean_text, find_section, section_items, Locator};

/// A resolved field value and the index of the candidate that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub value: String,
    pub candidate: usize,
}

/// Resolve one field beneath `scope` with first-success semantics.
///
/// A more generic candidate can win when a precise one is momentarily
/// missing; the winning index is logged so that drift shows up in traces.
pub fn resolve_field(scope: ElementRef<'_>, field: &FieldSpec) -> Option<Resolved> {
    for (candidate, locator) in field.candidates.iter().enumerate() {
        if let Some(value) = locator.resolve(scope) {
            if candidate > 0 {
                debug!(
                    field = field.name,
                    candidate,
                    %locator,
                    "Field resolved by fallback locator"
                );
            } else {
                debug!(field = field.name, %locator, "Field resolved");
            }
            return Some(Resolved { value, candidate });
        }
    }

    debug!(field = field.name, "No candidate locator matched");
    None
}

/// Extract a full profile record from a rendered page.
pub fn extract_profile(html: &str) -> ProfileRecord {
    let document = Html::parse_document(html);
    let root = document.root_element();

    let mut record = extract_basic_info(root);
    record.experiences = extract_experiences(root);
    record.education = extract_education(root);

    debug!(
        "Extracted profile: {} experiences, {} education entries",
        record.experiences.len(),
        record.education.len()
    );
    record
}

/// Name, headline, location and summary.
pub fn extract_basic_info(root: ElementRef<'_>) -> ProfileRecord {
    ProfileRecord {
        full_name: basic_field(root, &fields::FULL_NAME),
        headline: basic_field(root, &fields::HEADLINE),
        location: Location::parse(&basic_field(root, &fields::LOCATION)),
        summary: basic_field(root, &fields::SUMMARY),
        ..Default::default()
    }
}

/// Employment history in source order. Items without a title are skipped.
pub fn extract_experiences(root: ElementRef<'_>) -> Vec<ExperienceEntry> {
    let Some(section) = find_section(root, fields::EXPERIENCE_HEADING) else {
        debug!("Experience section not found");
        return Vec::new();
    };

    section_items(section)
        .into_iter()
        .filter_map(|item| {
            let Some(title) = resolve_field(item, &fields::EXPERIENCE_TITLE) else {
                debug!("Skipping experience item without a title");
                return None;
            };

            let mut entry = ExperienceEntry::new(title.value);
            entry.company = optional_field(item, &fields::EXPERIENCE_COMPANY);
            if let Some((start, end)) = optional_field(item, &fields::EXPERIENCE_DATES)
                .as_deref()
                .and_then(parse_date_range)
            {
                entry.start_date = Some(start);
                entry.end_date = Some(end);
            }
            entry.location = optional_field(item, &fields::EXPERIENCE_LOCATION);
            entry.description = optional_field(item, &fields::EXPERIENCE_DESCRIPTION);
            Some(entry)
        })
        .collect()
}

/// Education history in source order. Items without a school are skipped.
pub fn extract_education(root: ElementRef<'_>) -> Vec<EducationEntry> {
    let Some(section) = find_section(root, fields::EDUCATION_HEADING) else {
        debug!("Education section not found");
        return Vec::new();
    };

    section_items(section)
        .into_iter()
        .filter_map(|item| {
            let Some(school) = resolve_field(item, &fields::EDUCATION_SCHOOL) else {
                debug!("Skipping education item without a school");
                return None;
            };

            let mut entry = EducationEntry::new(school.value);
            entry.degree = optional_field(item, &fields::EDUCATION_DEGREE);
            if let Some((start, end)) = optional_field(item, &fields::EDUCATION_DATES)
                .as_deref()
                .and_then(parse_date_range)
            {
                entry.start_date = Some(start);
                entry.end_date = Some(end);
            }
            entry.field_of_study = optional_field(item, &fields::EDUCATION_FIELD_OF_STUDY)
                .as_deref()
                .and_then(parse_field_of_study);
            Some(entry)
        })
        .collect()
}

fn basic_field(root: ElementRef<'_>, field: &FieldSpec) -> String {
    match resolve_field(root, field) {
        Some(resolved) => resolved.value,
        None => {
            warn!("Profile field '{}' not found on page", field.name);
            String::new()
        }
    }
}

fn optional_field(scope: ElementRef<'_>, field: &FieldSpec) -> Option<String> {
    resolve_field(scope, field).map(|resolved| resolved.value)
}
