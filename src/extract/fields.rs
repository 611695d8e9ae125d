//! Locator tables for every extracted field.
//!
//! Candidates are ordered: most specific first, most generic last. The
//! extractor takes the first candidate that yields text, so markup drift is
//! absorbed by appending or reordering entries here.

use super::locator::Locator;

/// A named field and its ordered candidate locators.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub candidates: &'static [Locator],
}

impl FieldSpec {
    pub const fn new(name: &'static str, candidates: &'static [Locator]) -> Self {
        Self { name, candidates }
    }
}

pub const EXPERIENCE_HEADING: &str = "Experience";
pub const EDUCATION_HEADING: &str = "Education";
pub const ABOUT_HEADING: &str = "About";

// Basic info, resolved against the whole document.

pub const FULL_NAME: FieldSpec = FieldSpec::new(
    "full_name",
    &[
        Locator::Css("h1.inline.t-24"),
        Locator::Css("h1.text-heading-xlarge"),
        Locator::Css("h1"),
    ],
);

pub const HEADLINE: FieldSpec = FieldSpec::new(
    "headline",
    &[
        Locator::Css("div.text-body-medium.break-words"),
        Locator::Css("div.text-body-medium"),
    ],
);

pub const LOCATION: FieldSpec = FieldSpec::new(
    "location",
    &[
        Locator::Css("span.text-body-small.inline.t-black--light.break-words"),
        Locator::Css("span.text-body-small.inline.t-black--light"),
        Locator::Css("span.text-body-small"),
    ],
);

pub const SUMMARY: FieldSpec = FieldSpec::new(
    "summary",
    &[
        Locator::InSection {
            heading: ABOUT_HEADING,
            css: "div.inline-show-more-text span[aria-hidden='true']",
        },
        Locator::InSection {
            heading: ABOUT_HEADING,
            css: "div.inline-show-more-text",
        },
        Locator::Css("div.inline-show-more-text--is-collapsed-with-line-clamp"),
        Locator::SectionText(ABOUT_HEADING),
    ],
);

// Experience entries, resolved against one section item.

pub const EXPERIENCE_TITLE: FieldSpec = FieldSpec::new(
    "experience.title",
    &[
        Locator::Css("div.t-bold span[aria-hidden='true']"),
        Locator::Css("span[class*='mr1 t-bold'] span"),
        Locator::Css("span[class*='mr1 t-bold']"),
    ],
);

pub const EXPERIENCE_COMPANY: FieldSpec = FieldSpec::new(
    "experience.company",
    &[
        Locator::Css("span.t-14.t-normal:not(.t-black--light) span[aria-hidden='true']"),
        Locator::Css("span.t-14.t-normal:not(.t-black--light)"),
    ],
);

pub const EXPERIENCE_DATES: FieldSpec = FieldSpec::new(
    "experience.dates",
    &[
        Locator::Css("span.pvs-entity__caption-wrapper"),
        Locator::Css("span[class*='t-14 t-normal t-black--light'] span"),
        Locator::Css("span[class*='t-14 t-normal t-black--light']"),
    ],
);

pub const EXPERIENCE_LOCATION: FieldSpec = FieldSpec::new(
    "experience.location",
    &[
        Locator::Nth("span.t-14.t-normal.t-black--light span[aria-hidden='true']", 1),
        Locator::Nth("span[class*='t-14 t-normal t-black--light']", 1),
    ],
);

pub const EXPERIENCE_DESCRIPTION: FieldSpec = FieldSpec::new(
    "experience.description",
    &[
        Locator::Css("div.inline-show-more-text span[aria-hidden='true']"),
        Locator::Css("div.inline-show-more-text"),
        Locator::Css("div[class*='pv-shared-text-with-see-more']"),
    ],
);

// Education entries, resolved against one section item.

pub const EDUCATION_SCHOOL: FieldSpec = FieldSpec::new(
    "education.school",
    &[
        Locator::Css("div.t-bold span[aria-hidden='true']"),
        Locator::Css("span[class*='mr1 t-bold'] span"),
        Locator::Css("h3[class*='t-16']"),
    ],
);

pub const EDUCATION_DEGREE: FieldSpec = FieldSpec::new(
    "education.degree",
    &[
        Locator::Css("span.t-14.t-normal:not(.t-black--light) span[aria-hidden='true']"),
        Locator::Css("span.t-14.t-normal:not(.t-black--light)"),
    ],
);

pub const EDUCATION_DATES: FieldSpec = FieldSpec::new(
    "education.dates",
    &[
        Locator::Css("span.pvs-entity__caption-wrapper"),
        Locator::Css("span[class*='t-14 t-normal t-black--light'] span"),
        Locator::Css("span[class*='t-14 t-normal t-black--light']"),
    ],
);

/// Older layouts render the field of study as a second caption, labelled.
pub const EDUCATION_FIELD_OF_STUDY: FieldSpec = FieldSpec::new(
    "education.field_of_study",
    &[
        Locator::Css("p.pv-entity__fos"),
        Locator::Nth("span[class*='t-14 t-normal']", 1),
    ],
);

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Selector;

    const ALL_FIELDS: &[FieldSpec] = &[
        FULL_NAME,
        HEADLINE,
        LOCATION,
        SUMMARY,
        EXPERIENCE_TITLE,
        EXPERIENCE_COMPANY,
        EXPERIENCE_DATES,
        EXPERIENCE_LOCATION,
        EXPERIENCE_DESCRIPTION,
        EDUCATION_SCHOOL,
        EDUCATION_DEGREE,
        EDUCATION_DATES,
        EDUCATION_FIELD_OF_STUDY,
    ];

    #[test]
    fn test_every_candidate_selector_parses() {
        for field in ALL_FIELDS {
            assert!(!field.candidates.is_empty(), "{} has no candidates", field.name);
            for candidate in field.candidates {
                let css = match candidate {
                    Locator::Css(css) | Locator::Nth(css, _) => *css,
                    Locator::InSection { css, .. } => *css,
                    Locator::SectionText(_) => continue,
                };
                assert!(
                    Selector::parse(css).is_ok(),
                    "{}: invalid selector {}",
                    field.name,
                    css
                );
            }
        }
    }

    #[test]
    fn test_most_generic_name_candidate_is_last() {
        assert_eq!(FULL_NAME.candidates.last(), Some(&Locator::Css("h1")));
    }
}
