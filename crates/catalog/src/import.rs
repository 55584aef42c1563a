//! Reading exported (or hand-written) JSON back into a catalog.
//!
//! A file is either an export envelope (`{"courses": [...], ...settings}`) or
//! a bare list of courses. Invalid course records are skipped, the rest are
//! normalized and given fresh identities so that they can never collide with
//! courses already in the store.
use log::{debug, info, warn};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::{
    course::Course,
    normalize::normalize_course,
    profile::Profile,
    settings::{current_year, Settings},
};

#[derive(Error, Debug)]
pub enum Error {
    #[error("error parsing JSON: {}", .0)]
    Parse(#[from] serde_json::Error),

    #[error("Invalid file format")]
    Shape,

    #[error("No valid courses found")]
    NoValidRecords,
}

/// What to do with the courses already in the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportMode {
    /// Imported courses and settings supersede the current ones
    Replace,
    /// Imported courses are appended, settings are left alone
    Merge,
}

/// Courses that passed validation and are ready to be committed
#[derive(Debug, Clone, PartialEq)]
pub struct ImportCandidate {
    pub courses: Vec<Course>,
    /// Settings carried by an envelope. Bare course lists carry none.
    pub settings: Option<Settings>,
    /// The profile key the file was exported from, if it says
    pub school: Option<String>,
}

impl ImportCandidate {
    /// Parse and validate the given file contents.
    pub fn parse(text: &str, profile: &Profile) -> Result<Self, Error> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(value, profile)
    }

    /// Validate an already-parsed payload.
    pub fn from_value(value: Value, profile: &Profile) -> Result<Self, Error> {
        let (records, settings, school) = match value {
            Value::Object(mut envelope) => match envelope.remove("courses") {
                Some(Value::Array(records)) => {
                    let settings = envelope_settings(&envelope, profile);
                    let school = envelope
                        .get("school")
                        .and_then(Value::as_str)
                        .map(str::to_string);
                    (records, Some(settings), school)
                }
                _ => return Err(Error::Shape),
            },
            Value::Array(records) => (records, None, None),
            _ => return Err(Error::Shape),
        };

        let total = records.len();
        let courses: Vec<Course> = records
            .into_iter()
            .filter(is_valid_course)
            .filter_map(|mut record| {
                normalize_course(&mut record);
                match serde_json::from_value::<Course>(record) {
                    Ok(mut course) => {
                        course.reassign_ids();
                        Some(course)
                    }
                    Err(e) => {
                        warn!("skipping undecodable course: {}", e);
                        None
                    }
                }
            })
            .collect();

        if courses.is_empty() {
            return Err(Error::NoValidRecords);
        }

        info!("{} of {} course records are valid", courses.len(), total);

        Ok(Self {
            courses,
            settings,
            school,
        })
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }
}

/// A course record is importable if it has all required fields filled in.
pub fn is_valid_course(record: &Value) -> bool {
    let filled = |key: &str| {
        record
            .get(key)
            .and_then(Value::as_str)
            .is_some_and(|s| !s.is_empty())
    };

    let valid = ["id", "title", "courseCode", "track", "part"]
        .into_iter()
        .all(filled)
        && record.get("elements").is_some_and(Value::is_array);

    if !valid {
        debug!("invalid course record: {}", record);
    }

    valid
}

fn envelope_settings(envelope: &Map<String, Value>, profile: &Profile) -> Settings {
    let text = |key: &str| envelope.get(key).and_then(Value::as_str).map(str::to_string);

    Settings {
        header_image: text("headerImage").filter(|s| !s.is_empty()),
        is_locked: match envelope.get("isLocked") {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => s == "true",
            _ => false,
        },
        school_year: text("schoolYear").unwrap_or_else(current_year),
        school_description: text("schoolDescription")
            .unwrap_or_else(|| profile.description.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validity() {
        let good = json!({"id": "1", "title": "A", "courseCode": "A1", "track": "T", "part": "P", "elements": []});
        assert!(is_valid_course(&good));

        for key in ["id", "title", "courseCode", "track", "part"] {
            let mut missing = good.clone();
            missing.as_object_mut().unwrap().remove(key);
            assert!(!is_valid_course(&missing), "{key}");

            let mut empty = good.clone();
            empty[key] = json!("");
            assert!(!is_valid_course(&empty), "{key}");
        }

        let mut elements = good.clone();
        elements["elements"] = json!({});
        assert!(!is_valid_course(&elements));
    }
}
