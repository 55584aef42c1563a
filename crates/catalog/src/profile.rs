//! Institution profiles: which tracks, parts and element types exist, and
//! where the profile's data is stored.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A labelled, coloured key such as a track or part.
/// Colors are terminal color names (`red`, `lightblue`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Badge {
    pub label: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementTypeStyle {
    pub icon: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub tracks: BTreeMap<String, Badge>,
    pub parts: BTreeMap<String, Badge>,
    pub element_types: BTreeMap<String, ElementTypeStyle>,
    pub default_track: String,
    pub default_part: String,
    pub storage_prefix: String,
    pub brand_color: String,
}

const PREFERRED_ELEMENT_TYPE: &str = "Lecture";
const FALLBACK_ELEMENT_TYPE: &str = "Other";

impl Profile {
    /// The storage key for the given suffix, eg. `telecom-course-manager-data`
    pub fn storage_key(&self, suffix: &str) -> String {
        format!("{}-{}", self.storage_prefix, suffix)
    }

    /// Label for a track key. Unknown keys are shown as-is.
    pub fn track_label<'a>(&'a self, key: &'a str) -> &'a str {
        self.tracks.get(key).map(|b| b.label.as_str()).unwrap_or(key)
    }

    /// Label for a part key. Unknown keys are shown as-is.
    pub fn part_label<'a>(&'a self, key: &'a str) -> &'a str {
        self.parts.get(key).map(|b| b.label.as_str()).unwrap_or(key)
    }

    pub fn default_element_type(&self) -> &str {
        if self.element_types.contains_key(PREFERRED_ELEMENT_TYPE) {
            return PREFERRED_ELEMENT_TYPE;
        }
        self.element_types
            .keys()
            .next()
            .map(|k| k.as_str())
            .unwrap_or(FALLBACK_ELEMENT_TYPE)
    }
}

/// All known profiles, by key
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profiles(BTreeMap<String, Profile>);

impl Profiles {
    /// The profiles shipped with coursebook
    pub fn builtin() -> Self {
        let mut profiles = BTreeMap::new();
        profiles.insert("telecom".to_string(), telecom());
        profiles.insert("psl".to_string(), psl());
        Self(profiles)
    }

    pub fn get(&self, key: &str) -> Result<&Profile> {
        self.0
            .get(key)
            .ok_or_else(|| Error::UnknownProfile(key.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Profile)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Add the given profiles, replacing any with the same key.
    pub fn extend(&mut self, other: impl IntoIterator<Item = (String, Profile)>) {
        self.0.extend(other);
    }
}

fn badges(entries: &[(&str, &str, &str)]) -> BTreeMap<String, Badge> {
    entries
        .iter()
        .map(|(key, label, color)| {
            (
                key.to_string(),
                Badge {
                    label: label.to_string(),
                    color: color.to_string(),
                },
            )
        })
        .collect()
}

fn standard_element_types() -> BTreeMap<String, ElementTypeStyle> {
    [
        ("Lecture", "📄", "blue"),
        ("Exercises", "🧮", "green"),
        ("Course Review", "📑", "magenta"),
        ("Labs", "🧪", "lightred"),
        ("Project", "📁", "yellow"),
        ("Other", "•", "gray"),
    ]
    .iter()
    .map(|(key, icon, color)| {
        (
            key.to_string(),
            ElementTypeStyle {
                icon: icon.to_string(),
                color: color.to_string(),
            },
        )
    })
    .collect()
}

fn telecom() -> Profile {
    Profile {
        name: "Télécom Paris".to_string(),
        description: "Engineering cycle courses".to_string(),
        tracks: badges(&[
            ("TSIA", "TSIA", "magenta"),
            ("IMA", "IMA", "lightred"),
            ("SlotD", "SlotD", "cyan"),
            ("Athens", "Athens", "gray"),
        ]),
        parts: badges(&[
            ("P1", "P1", "blue"),
            ("P2", "P2", "lightmagenta"),
            ("P3", "P3", "yellow"),
            ("P4", "P4", "green"),
        ]),
        element_types: standard_element_types(),
        default_track: "TSIA".to_string(),
        default_part: "P1".to_string(),
        storage_prefix: "telecom-course-manager".to_string(),
        brand_color: "red".to_string(),
    }
}

fn psl() -> Profile {
    Profile {
        name: "PSL".to_string(),
        description: "Master's programme courses".to_string(),
        tracks: badges(&[
            ("Common", "Common", "red"),
            ("CS", "CS", "red"),
            ("Math", "Math", "blue"),
            ("Option CS", "Option CS", "green"),
            ("Option Math", "Option Math", "magenta"),
        ]),
        parts: badges(&[("S1", "Semester 1", "cyan"), ("S2", "Semester 2", "lightgreen")]),
        element_types: standard_element_types(),
        default_track: "Common".to_string(),
        default_part: "S1".to_string(),
        storage_prefix: "psl-course-manager".to_string(),
        brand_color: "blue".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_defaults_are_known_keys() {
        for (key, profile) in Profiles::builtin().iter() {
            assert!(profile.tracks.contains_key(&profile.default_track), "{key}");
            assert!(profile.parts.contains_key(&profile.default_part), "{key}");
            assert_eq!(profile.default_element_type(), "Lecture");
        }
    }

    #[test]
    fn test_unknown_labels_fall_back_to_key() {
        let profiles = Profiles::builtin();
        let psl = profiles.get("psl").unwrap();
        assert_eq!(psl.part_label("S2"), "Semester 2");
        assert_eq!(psl.part_label("S9"), "S9");
        assert!(matches!(profiles.get("nope"), Err(Error::UnknownProfile(_))));
    }
}
