use chrono::{Datelike, Local};

use crate::profile::Profile;

/// Per-profile settings that live alongside the course list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Banner shown above the catalog, as a data URI
    pub header_image: Option<String>,
    pub is_locked: bool,
    pub school_year: String,
    pub school_description: String,
}

impl Settings {
    pub fn defaults(profile: &Profile) -> Self {
        Self {
            header_image: None,
            is_locked: false,
            school_year: current_year(),
            school_description: profile.description.clone(),
        }
    }
}

pub fn current_year() -> String {
    Local::now().year().to_string()
}
