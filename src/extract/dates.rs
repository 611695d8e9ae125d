//! Heuristics for caption text: date ranges and labelled fields of study.

/// Characters accepted as the range separator.
const RANGE_DASHES: &[char] = &['-', '\u{2013}', '\u{2014}'];

/// Separates the range from the rendered duration ("Jan 2020 - Present · 3 yrs").
const DURATION_SEPARATOR: char = '\u{00b7}';

const ONGOING: &str = "Present";

const FIELD_OF_STUDY_LABEL: &str = "field of study";

/// Split date-range text into `(start, end)`.
///
/// Trailing duration text is ignored. The separator is a single dash-like
/// character with whitespace on both sides, so hyphenated words such as
/// place names never split. Both sides must be non-empty. An open-ended
/// range ends in the literal `"Present"`. Anything else yields `None`.
pub fn parse_date_range(text: &str) -> Option<(String, String)> {
    let range = text.split(DURATION_SEPARATOR).next().unwrap_or_default().trim();

    let chars: Vec<(usize, char)> = range.char_indices().collect();
    let separators: Vec<(usize, char)> = chars
        .windows(3)
        .filter(|w| {
            w[0].1.is_whitespace() && RANGE_DASHES.contains(&w[1].1) && w[2].1.is_whitespace()
        })
        .map(|w| w[1])
        .collect();

    let [(idx, dash)] = separators.as_slice() else {
        return None;
    };
    let start = range[..*idx].trim();
    let end = range[idx + dash.len_utf8()..].trim();
    if start.is_empty() || end.is_empty() {
        return None;
    }

    let end = if end.eq_ignore_ascii_case(ONGOING) {
        ONGOING.to_string()
    } else {
        end.to_string()
    };
    Some((start.to_string(), end))
}

/// Value of a caption labelled "Field of study", if it carries one.
pub fn parse_field_of_study(text: &str) -> Option<String> {
    // ASCII lowercasing keeps byte offsets aligned with `text`.
    let idx = text.to_ascii_lowercase().find(FIELD_OF_STUDY_LABEL)?;
    let value = text[idx + FIELD_OF_STUDY_LABEL.len()..]
        .trim_start_matches(|c: char| c == ':' || c.is_whitespace())
        .trim();

    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(start: &str, end: &str) -> Option<(String, String)> {
        Some((start.to_string(), end.to_string()))
    }

    #[test]
    fn test_ongoing_range() {
        assert_eq!(parse_date_range("Jan 2020 - Present"), range("Jan 2020", "Present"));
        assert_eq!(parse_date_range("Jan 2020 - present"), range("Jan 2020", "Present"));
    }

    #[test]
    fn test_closed_range() {
        assert_eq!(parse_date_range("Jan 2020 - Dec 2022"), range("Jan 2020", "Dec 2022"));
        assert_eq!(parse_date_range("2014 \u{2013} 2018"), range("2014", "2018"));
    }

    #[test]
    fn test_duration_suffix_is_ignored() {
        assert_eq!(
            parse_date_range("Mar 2019 - Present \u{00b7} 4 yrs 2 mos"),
            range("Mar 2019", "Present")
        );
    }

    #[test]
    fn test_unparseable_ranges() {
        assert_eq!(parse_date_range("2020"), None);
        assert_eq!(parse_date_range(""), None);
        assert_eq!(parse_date_range("2020 -"), None);
        assert_eq!(parse_date_range("- 2020"), None);
        assert_eq!(parse_date_range("2018 - 2019 - 2020"), None);
    }

    #[test]
    fn test_hyphenated_words_are_not_ranges() {
        assert_eq!(parse_date_range("Winston-Salem, North Carolina"), None);
        assert_eq!(parse_date_range("Jan 2020-Present"), None);
        assert_eq!(
            parse_date_range("Sep 2019 \u{2014} Jun 2021"),
            range("Sep 2019", "Jun 2021")
        );
    }

    #[test]
    fn test_field_of_study_label() {
        assert_eq!(
            parse_field_of_study("Field of study Computer Science"),
            Some("Computer Science".to_string())
        );
        assert_eq!(
            parse_field_of_study("Field Of Study: Physics"),
            Some("Physics".to_string())
        );
        assert_eq!(parse_field_of_study("Field of study"), None);
        assert_eq!(parse_field_of_study("Bachelor of Science"), None);
    }
}
