//! Brings elements stored by older versions into the canonical shape, where
//! `links` is always a list of `{name, url}` objects.
//!
//! Older data has either a list of bare URL strings in `links`, or a single
//! URL string in `link`. The same normalization runs when loading stored
//! data and when importing a file.
use log::debug;
use serde_json::{json, Map, Value};

/// The shape of an element's links, before normalization
#[derive(Debug, Clone, PartialEq)]
pub enum LinkShape {
    /// `links` is a list of link objects
    CanonicalLinks(Vec<Value>),
    /// `links` contains bare URL strings
    LegacyUrlArray(Vec<Value>),
    /// No `links`, but a single URL in `link`
    LegacySingularLink(String),
    /// No links at all
    Missing,
}

impl LinkShape {
    /// Work out which shape the given element record has.
    pub fn sniff(element: &Map<String, Value>) -> LinkShape {
        match element.get("links") {
            Some(Value::Array(entries)) if entries.iter().any(Value::is_string) => {
                LinkShape::LegacyUrlArray(entries.clone())
            }
            Some(Value::Array(entries)) => LinkShape::CanonicalLinks(entries.clone()),
            None | Some(Value::Null) => match element.get("link") {
                Some(Value::String(url)) if !url.is_empty() => {
                    LinkShape::LegacySingularLink(url.clone())
                }
                _ => LinkShape::Missing,
            },
            Some(_) => LinkShape::Missing,
        }
    }

    /// Map this shape to canonical link objects.
    pub fn into_links(self) -> Vec<Value> {
        match self {
            LinkShape::CanonicalLinks(entries) => entries,
            LinkShape::LegacyUrlArray(entries) => entries
                .into_iter()
                .enumerate()
                .filter_map(|(i, entry)| match entry {
                    Value::String(url) => Some(legacy_link(i, url)),
                    Value::Object(_) => Some(entry),
                    other => {
                        debug!("dropping link entry {}: {}", i, other);
                        None
                    }
                })
                .collect(),
            LinkShape::LegacySingularLink(url) => vec![legacy_link(0, url)],
            LinkShape::Missing => vec![],
        }
    }
}

fn legacy_link(idx: usize, url: String) -> Value {
    json!({
        "name": format!("Link {}", idx + 1),
        "url": url,
    })
}

/// Normalize one element record in place. Only `links` is rewritten, and
/// anything that isn't an object is left alone.
pub fn normalize_element(element: &mut Value) {
    let Value::Object(fields) = element else {
        return;
    };

    let shape = LinkShape::sniff(fields);
    if !matches!(shape, LinkShape::CanonicalLinks(_)) {
        debug!("normalizing legacy links: {:?}", shape);
    }
    fields.insert("links".to_string(), Value::Array(shape.into_links()));
}

/// Normalize every element of one course record in place.
pub fn normalize_course(course: &mut Value) {
    if let Some(Value::Array(elements)) = course.get_mut("elements") {
        elements.iter_mut().for_each(normalize_element);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fields(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_sniff_shapes() {
        assert_eq!(
            LinkShape::sniff(&fields(json!({"links": [{"name": "", "url": "u"}]}))),
            LinkShape::CanonicalLinks(vec![json!({"name": "", "url": "u"})])
        );
        assert_eq!(
            LinkShape::sniff(&fields(json!({"links": ["u"]}))),
            LinkShape::LegacyUrlArray(vec![json!("u")])
        );
        assert_eq!(
            LinkShape::sniff(&fields(json!({"link": "u"}))),
            LinkShape::LegacySingularLink("u".to_string())
        );
        assert_eq!(
            LinkShape::sniff(&fields(json!({"links": null, "link": "u"}))),
            LinkShape::LegacySingularLink("u".to_string())
        );
        assert_eq!(LinkShape::sniff(&fields(json!({}))), LinkShape::Missing);
        assert_eq!(LinkShape::sniff(&fields(json!({"link": ""}))), LinkShape::Missing);
        assert_eq!(
            LinkShape::sniff(&fields(json!({"links": "u"}))),
            LinkShape::Missing
        );
    }

    #[test]
    fn test_canonical_links_take_priority() {
        let mut element = json!({"links": [], "link": "https://old.example.com"});
        normalize_element(&mut element);
        assert_eq!(element["links"], json!([]));
    }

    #[test]
    fn test_mixed_array_keeps_positions() {
        let links = LinkShape::LegacyUrlArray(vec![
            json!({"name": "Slides", "url": "a"}),
            json!("b"),
            json!(3),
            json!("d"),
        ])
        .into_links();
        assert_eq!(
            links,
            vec![
                json!({"name": "Slides", "url": "a"}),
                json!({"name": "Link 2", "url": "b"}),
                json!({"name": "Link 4", "url": "d"}),
            ]
        );
    }

    #[test]
    fn test_non_object_element_untouched() {
        let mut element = json!("not an element");
        normalize_element(&mut element);
        assert_eq!(element, json!("not an element"));
    }
}
