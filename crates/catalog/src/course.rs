use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{profile::Profile, Error, Result};

/// Shown in place of a link's name when it has none.
pub const UNNAMED_LINK: &str = "Unnamed Link";

/// Generate a fresh identity for a course or element.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// A course, as stored and exported
///
/// Decoding is lenient: files written by older versions or by hand may hold
/// numbers where strings belong, or `null` for anything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Course {
    #[serde(deserialize_with = "lenient::string")]
    pub id: String,
    #[serde(deserialize_with = "lenient::string")]
    pub title: String,
    #[serde(deserialize_with = "lenient::string")]
    pub description: String,
    #[serde(deserialize_with = "lenient::string")]
    pub course_code: String,
    /// Credit value. Never negative when created through a [`CourseDraft`].
    #[serde(deserialize_with = "lenient::number")]
    pub ects: f64,
    /// Key into the profile's tracks
    #[serde(deserialize_with = "lenient::string")]
    pub track: String,
    /// Key into the profile's parts
    #[serde(deserialize_with = "lenient::string")]
    pub part: String,
    /// Banner image, as a data URI
    #[serde(
        deserialize_with = "lenient::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub image: Option<String>,
    #[serde(deserialize_with = "lenient::list")]
    pub elements: Vec<Element>,
}

/// A lecture, exercise sheet, lab, etc. belonging to a course
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Element {
    #[serde(deserialize_with = "lenient::string")]
    pub id: String,
    /// Key into the profile's element types
    #[serde(rename = "type", deserialize_with = "lenient::string")]
    pub kind: String,
    #[serde(deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(deserialize_with = "lenient::list")]
    pub links: Vec<Link>,
    #[serde(deserialize_with = "lenient::flag")]
    pub completed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Link {
    #[serde(deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(deserialize_with = "lenient::string")]
    pub url: String,
}

/// Field decoders that take whatever JSON is there and make the best of it.
mod lenient {
    use log::warn;
    use serde::{de::DeserializeOwned, Deserialize, Deserializer};
    use serde_json::Value;

    /// Numbers and booleans become their text. `null` and containers become empty.
    pub fn string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => String::new(),
        })
    }

    /// Like [`string`], but empty is `None`.
    pub fn optional_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(Some(string(d)?).filter(|s| !s.is_empty()))
    }

    /// Numbers, or text holding one (a decimal comma is fine). Anything else is 0.
    pub fn number<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        let n: f64 = match Value::deserialize(d)? {
            Value::Number(n) => n.as_f64().unwrap_or_default(),
            Value::String(s) => s.trim().replace(',', ".").parse().unwrap_or_default(),
            _ => 0.0,
        };

        Ok(if n.is_finite() { n } else { 0.0 })
    }

    /// `true`, `"true"`, or a non-zero number.
    pub fn flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Bool(b) => b,
            Value::String(s) => s.trim() == "true",
            Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
            _ => false,
        })
    }

    /// A list, skipping entries that don't decode. Anything but a list is empty.
    pub fn list<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        let Value::Array(entries) = Value::deserialize(d)? else {
            return Ok(vec![]);
        };

        Ok(entries
            .into_iter()
            .filter_map(|entry| {
                serde_json::from_value(entry)
                    .map_err(|e| warn!("skipping list entry: {}", e))
                    .ok()
            })
            .collect())
    }
}

impl Link {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }

    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            UNNAMED_LINK
        } else {
            &self.name
        }
    }

    /// Links without a URL are dropped when an element is submitted.
    pub fn has_url(&self) -> bool {
        !self.url.trim().is_empty()
    }
}

/// How many of a course's elements are completed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

impl Progress {
    /// Completion as a whole percentage, 0 when there is nothing to complete.
    pub fn percent(&self) -> u16 {
        if self.total == 0 {
            return 0;
        }
        ((self.completed as f64 / self.total as f64) * 100.0).round() as u16
    }

    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.completed as f64 / self.total as f64
    }
}

impl std::ops::Add for Progress {
    type Output = Progress;

    fn add(self, rhs: Self) -> Self::Output {
        Progress {
            completed: self.completed + rhs.completed,
            total: self.total + rhs.total,
        }
    }
}

impl std::iter::Sum for Progress {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Progress::default(), |acc, p| acc + p)
    }
}

/// Case-insensitive name ordering, used for elements and course titles.
pub(crate) fn by_name(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

impl Course {
    pub fn progress(&self) -> Progress {
        Progress {
            completed: self.elements.iter().filter(|e| e.completed).count(),
            total: self.elements.len(),
        }
    }

    pub fn element(&self, element_id: &str) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == element_id)
    }

    pub(crate) fn element_mut(&mut self, element_id: &str) -> Result<&mut Element> {
        let course_id = self.id.clone();
        self.elements
            .iter_mut()
            .find(|e| e.id == element_id)
            .ok_or_else(|| Error::ElementNotFound(course_id, element_id.to_string()))
    }

    pub(crate) fn sort_elements(&mut self) {
        self.elements.sort_by(|a, b| by_name(&a.name, &b.name));
    }

    /// Give this course and all of its elements new identities.
    pub(crate) fn reassign_ids(&mut self) {
        self.id = new_id();
        for element in self.elements.iter_mut() {
            element.id = new_id();
        }
    }

    /// Apply a single field update. The course keeps its identity.
    pub(crate) fn apply(&mut self, field: CourseField) -> Result<()> {
        match field {
            CourseField::Title(title) => {
                let title = title.trim();
                if title.is_empty() {
                    return Err(Error::MissingTitle);
                }
                self.title = title.to_string();
            }
            CourseField::Description(d) => self.description = d,
            CourseField::CourseCode(c) => self.course_code = c.trim().to_string(),
            CourseField::Ects(e) => self.ects = e.max(0.0),
            CourseField::Track(t) => self.track = t,
            CourseField::Part(p) => self.part = p,
            CourseField::Image(i) => self.image = i,
        };

        Ok(())
    }
}

impl Element {
    pub(crate) fn apply(&mut self, field: ElementField) {
        match field {
            ElementField::Name(n) => self.name = n,
            ElementField::Kind(k) => self.kind = k,
            ElementField::Links(links) => self.links = keep_submitted_links(links),
            ElementField::Completed(c) => self.completed = c,
        }
    }
}

fn keep_submitted_links(links: Vec<Link>) -> Vec<Link> {
    links
        .into_iter()
        .filter(Link::has_url)
        .map(|l| Link {
            name: l.name.trim().to_string(),
            url: l.url.trim().to_string(),
        })
        .collect()
}

/// A single-field update to a course
#[derive(Debug, Clone, PartialEq)]
pub enum CourseField {
    Title(String),
    Description(String),
    CourseCode(String),
    Ects(f64),
    Track(String),
    Part(String),
    Image(Option<String>),
}

/// A single-field update to an element
#[derive(Debug, Clone, PartialEq)]
pub enum ElementField {
    Name(String),
    Kind(String),
    Links(Vec<Link>),
    Completed(bool),
}

/// The contents of a submitted "new course" form
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CourseDraft {
    pub title: String,
    pub description: String,
    pub course_code: String,
    pub ects: f64,
    /// Falls back to the profile's default track
    pub track: Option<String>,
    /// Falls back to the profile's default part
    pub part: Option<String>,
    pub image: Option<String>,
}

impl CourseDraft {
    pub(crate) fn into_course(self, profile: &Profile) -> Result<Course> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(Error::MissingTitle);
        }

        Ok(Course {
            id: new_id(),
            title: title.to_string(),
            description: self.description,
            course_code: self.course_code.trim().to_string(),
            ects: self.ects.max(0.0),
            track: non_empty(self.track).unwrap_or_else(|| profile.default_track.clone()),
            part: non_empty(self.part).unwrap_or_else(|| profile.default_part.clone()),
            image: self.image,
            elements: vec![],
        })
    }
}

/// The contents of a submitted "new element" form
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementDraft {
    pub name: String,
    /// Falls back to the profile's default element type
    pub kind: Option<String>,
    pub links: Vec<Link>,
}

impl ElementDraft {
    pub(crate) fn into_element(self, profile: &Profile) -> Element {
        Element {
            id: new_id(),
            kind: non_empty(self.kind).unwrap_or_else(|| profile.default_element_type().to_string()),
            name: self.name.trim().to_string(),
            links: keep_submitted_links(self.links),
            completed: false,
        }
    }
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_percent() {
        assert_eq!(Progress::default().percent(), 0);
        assert_eq!(
            Progress {
                completed: 1,
                total: 3
            }
            .percent(),
            33
        );
        assert_eq!(
            Progress {
                completed: 2,
                total: 3
            }
            .percent(),
            67
        );
    }

    #[test]
    fn test_loose_fields_decode() {
        let course: Course = serde_json::from_str(
            r#"{"id": 7, "title": "A", "description": null, "courseCode": "A1", "ects": "2,5",
                "track": "T", "part": "P", "image": "",
                "elements": [
                    {"id": 42, "type": "Lecture", "name": null, "links": [{"name": null, "url": "https://a"}], "completed": "true"},
                    "not an element"
                ]}"#,
        )
        .unwrap();

        assert_eq!(course.id, "7");
        assert_eq!(course.description, "");
        assert_eq!(course.ects, 2.5);
        assert_eq!(course.image, None);
        assert_eq!(course.elements.len(), 1);

        let element = &course.elements[0];
        assert_eq!(element.id, "42");
        assert_eq!(element.name, "");
        assert!(element.completed);
        assert_eq!(element.links, vec![Link::new("", "https://a")]);
    }

    #[test]
    fn test_unreadable_ects_is_zero() {
        let course: Course = serde_json::from_str(r#"{"ects": "five"}"#).unwrap();
        assert_eq!(course.ects, 0.0);
        let course: Course = serde_json::from_str(r#"{"ects": [1]}"#).unwrap();
        assert_eq!(course.ects, 0.0);
    }

    #[test]
    fn test_unnamed_link() {
        assert_eq!(Link::new("", "https://a").display_name(), UNNAMED_LINK);
        assert_eq!(Link::new("Slides", "https://a").display_name(), "Slides");
    }

    #[test]
    fn test_submitted_links_drop_empty_urls() {
        let links = keep_submitted_links(vec![
            Link::new("Slides", "https://example.com/slides.pdf"),
            Link::new("Nothing", "   "),
            Link::new("", "https://example.com/video"),
        ]);
        assert_eq!(
            links,
            vec![
                Link::new("Slides", "https://example.com/slides.pdf"),
                Link::new("", "https://example.com/video"),
            ]
        );
    }
}
