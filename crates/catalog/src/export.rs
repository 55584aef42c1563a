use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{course::Course, profile::Profile, settings::Settings};

pub const EXPORT_VERSION: &str = "1.0";

/// The JSON document written by an export, and the richer of the two
/// shapes accepted by an import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportEnvelope {
    pub version: String,
    pub export_date: DateTime<Utc>,
    /// Key of the profile the data was exported from
    pub school: String,
    pub courses: Vec<Course>,
    pub header_image: Option<String>,
    pub is_locked: bool,
    pub school_year: String,
    pub school_description: String,
}

impl ExportEnvelope {
    pub fn new(school: &str, courses: Vec<Course>, settings: &Settings) -> Self {
        Self {
            version: EXPORT_VERSION.to_string(),
            export_date: Utc::now(),
            school: school.to_string(),
            courses,
            header_image: settings.header_image.clone(),
            is_locked: settings.is_locked,
            school_year: settings.school_year.clone(),
            school_description: settings.school_description.clone(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Suggested file name, eg. `psl-course-manager-backup-2024-05-01.json`
    pub fn file_name(&self, profile: &Profile) -> String {
        format!(
            "{}-backup-{}.json",
            profile.storage_prefix,
            self.export_date.format("%Y-%m-%d")
        )
    }
}
