//! Data models for acquired profiles.

mod profile;

pub use profile::{EducationEntry, ExperienceEntry, Location, ProfileRecord};
