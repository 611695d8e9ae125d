//! Canned record returned in mock mode.

use serde_json::json;

use crate::normalize::{normalize, NormalizedRecord};

/// The fixed record every client returns in mock mode.
pub fn mock_record() -> NormalizedRecord {
    let record = json!({
        "full_name": "Test Test",
        "headline": "Software Engineer at Example Corp",
        "city": "San Francisco",
        "country": "CA",
        "summary": "Test profile returned in mock mode.",
        "profile_pic_url": "https://example.com/test.jpg",
        "experiences": [
            {
                "title": "Software Engineer",
                "company": "Example Corp",
                "start_date": "Jan 2020",
                "end_date": "Present",
                "company_linkedin_profile_url": "https://www.linkedin.com/company/example",
            },
        ],
        "education": [
            {
                "school": "Example University",
                "degree": "BSc",
                "field_of_study": "Computer Science",
            },
        ],
        "people_also_viewed": [],
    });

    normalize(record.as_object().cloned().unwrap_or_default())
}
