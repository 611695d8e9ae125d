//! Profile record types.

use serde::{Deserialize, Serialize};

/// One person's public professional profile, as acquired at one point in time.
///
/// Every field may be empty. Absence is represented by an empty string,
/// `None`, or an empty list; the normalizer strips those before the record
/// leaves the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProfileRecord {
    pub full_name: String,
    pub headline: String,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    pub summary: String,
    /// Source order, most recent first.
    pub experiences: Vec<ExperienceEntry>,
    pub education: Vec<EducationEntry>,
}

/// Where the person is based.
///
/// Serialized flat into the record: either `city` + `country` keys or a
/// single `location` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Location {
    CityCountry { city: String, country: String },
    Opaque { location: String },
}

impl Location {
    /// Best-effort split of one-line location text.
    ///
    /// `"San Francisco, CA"` becomes city/country; text without a comma, or
    /// with an empty side, is kept whole. With more than one comma the first
    /// part is the city and the last part the country.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        if text.contains(',') {
            let parts: Vec<&str> = text.split(',').map(str::trim).collect();
            let city = parts.first().copied().unwrap_or_default();
            let country = parts.last().copied().unwrap_or_default();
            if !city.is_empty() && !country.is_empty() {
                return Some(Location::CityCountry {
                    city: city.to_string(),
                    country: country.to_string(),
                });
            }
        }

        Some(Location::Opaque {
            location: text.to_string(),
        })
    }
}

/// One role in the employment history. Never materialized without a title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    /// Literal `"Present"` for an ongoing role.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ExperienceEntry {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            company: None,
            start_date: None,
            end_date: None,
            location: None,
            description: None,
        }
    }
}

/// One school in the education history. Never materialized without a school.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EducationEntry {
    pub school: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub degree: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_of_study: Option<String>,
}

impl EducationEntry {
    pub fn new(school: impl Into<String>) -> Self {
        Self {
            school: school.into(),
            degree: None,
            start_date: None,
            end_date: None,
            field_of_study: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_splits_on_comma() {
        assert_eq!(
            Location::parse("San Francisco, CA"),
            Some(Location::CityCountry {
                city: "San Francisco".to_string(),
                country: "CA".to_string(),
            })
        );
    }

    #[test]
    fn test_location_without_comma_is_opaque() {
        assert_eq!(
            Location::parse("Remote"),
            Some(Location::Opaque {
                location: "Remote".to_string(),
            })
        );
        assert_eq!(Location::parse("   "), None);
    }

    #[test]
    fn test_location_uses_first_and_last_parts() {
        assert_eq!(
            Location::parse("Berlin, Berlin, Germany"),
            Some(Location::CityCountry {
                city: "Berlin".to_string(),
                country: "Germany".to_string(),
            })
        );
        assert_eq!(
            Location::parse("Lisbon,"),
            Some(Location::Opaque {
                location: "Lisbon,".to_string(),
            })
        );
    }

    #[test]
    fn test_location_serializes_flat() {
        let record = ProfileRecord {
            full_name: "Jane Doe".to_string(),
            location: Location::parse("San Francisco, CA"),
            ..Default::default()
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["city"], "San Francisco");
        assert_eq!(value["country"], "CA");
        assert!(value.get("location").is_none());

        let record = ProfileRecord {
            location: Location::parse("Remote"),
            ..Default::default()
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["location"], "Remote");
        assert!(value.get("city").is_none());
        assert!(value.get("country").is_none());
    }

    #[test]
    fn test_optional_entry_fields_are_omitted() {
        let mut entry = ExperienceEntry::new("Engineer");
        entry.company = Some("Acme".to_string());
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value, serde_json::json!({"title": "Engineer", "company": "Acme"}));
    }
}
