use coursebook_catalog::{
    import,
    settings::current_year,
    storage::MemoryStorage,
    CourseDraft, ImportCandidate, ImportMode, Profiles, Store,
};
use pretty_assertions::assert_eq;

const BARE: &str = r#"[{"id":"1","title":"A","courseCode":"A1","track":"T","part":"P","elements":[]}]"#;

fn store_with_one_course() -> Store<MemoryStorage> {
    let mut store = Store::load(MemoryStorage::new(), &Profiles::builtin(), "telecom").unwrap();
    store
        .add_course(CourseDraft {
            title: "Existing".to_string(),
            course_code: "EX1".to_string(),
            ..Default::default()
        })
        .unwrap();
    store.set_school_year("2021".to_string());
    store.set_school_description("Custom".to_string());
    store.set_header_image(Some("data:image/png;base64,AAAA".to_string()));
    store
}

fn candidate(store: &Store<MemoryStorage>, text: &str) -> Result<ImportCandidate, import::Error> {
    ImportCandidate::parse(text, store.profile())
}

#[test]
fn test_bare_array_merge() {
    let mut store = store_with_one_course();
    let settings_before = store.settings().clone();
    let existing_id = store.courses()[0].id.clone();

    let c = candidate(&store, BARE).unwrap();
    assert_eq!(c.settings, None);
    let n = store.import(c, ImportMode::Merge);

    assert_eq!(n, 1);
    assert_eq!(store.courses().len(), 2);
    assert_eq!(store.courses()[0].id, existing_id);

    let imported = &store.courses()[1];
    assert_eq!(imported.title, "A");
    assert_ne!(imported.id, "1");
    assert_ne!(imported.id, existing_id);
    assert_eq!(store.settings(), &settings_before);
}

#[test]
fn test_bare_array_replace_resets_settings() {
    let mut store = store_with_one_course();

    let c = candidate(&store, BARE).unwrap();
    let n = store.import(c, ImportMode::Replace);

    assert_eq!(n, 1);
    assert_eq!(store.courses().len(), 1);
    assert_ne!(store.courses()[0].id, "1");

    let settings = store.settings();
    assert_eq!(settings.header_image, None);
    assert!(!settings.is_locked);
    assert_eq!(settings.school_year, current_year());
    assert_eq!(settings.school_description, store.profile().description);
}

#[test]
fn test_envelope_replace_takes_settings() {
    let mut store = store_with_one_course();
    let text = format!(
        r#"{{"courses": {BARE}, "headerImage": "data:image/png;base64,BBBB", "isLocked": true, "schoolYear": "2023", "schoolDescription": "X"}}"#
    );

    let c = candidate(&store, &text).unwrap();
    store.import(c, ImportMode::Replace);

    let settings = store.settings();
    assert_eq!(
        settings.header_image.as_deref(),
        Some("data:image/png;base64,BBBB")
    );
    assert!(settings.is_locked);
    assert_eq!(settings.school_year, "2023");
    assert_eq!(settings.school_description, "X");
}

#[test]
fn test_envelope_merge_leaves_settings() {
    let mut store = store_with_one_course();
    let before = store.settings().clone();
    let text = format!(r#"{{"courses": {BARE}, "isLocked": true, "schoolYear": "2023"}}"#);

    let c = candidate(&store, &text).unwrap();
    store.import(c, ImportMode::Merge);

    assert_eq!(store.settings(), &before);
    assert_eq!(store.courses().len(), 2);
}

#[test]
fn test_envelope_defaults() {
    let store = store_with_one_course();
    let c = candidate(&store, &format!(r#"{{"courses": {BARE}}}"#)).unwrap();

    let settings = c.settings.unwrap();
    assert_eq!(settings.header_image, None);
    assert!(!settings.is_locked);
    assert_eq!(settings.school_year, current_year());
    assert_eq!(settings.school_description, store.profile().description);
}

#[test]
fn test_missing_course_code_is_rejected() {
    let store = store_with_one_course();
    let before = store.state().clone();
    let text = r#"[
        {"id":"1","title":"A","track":"T","part":"P","elements":[]},
        {"id":"2","title":"B","courseCode":"","track":"T","part":"P","elements":[]}
    ]"#;

    assert!(matches!(
        candidate(&store, text),
        Err(import::Error::NoValidRecords)
    ));
    assert_eq!(store.state(), &before);
}

#[test]
fn test_malformed_text() {
    let store = store_with_one_course();
    let before = store.state().clone();

    assert!(matches!(
        candidate(&store, "{not json"),
        Err(import::Error::Parse(_))
    ));
    assert_eq!(store.state(), &before);
}

#[test]
fn test_wrong_shape() {
    let store = store_with_one_course();
    for text in [r#"{"data": []}"#, r#"{"courses": {}}"#, "42", r#""courses""#] {
        let err = candidate(&store, text).unwrap_err();
        assert!(matches!(err, import::Error::Shape), "{text}");
        assert_eq!(err.to_string(), "Invalid file format");
    }
}

#[test]
fn test_invalid_records_are_skipped() {
    let store = store_with_one_course();
    let text = r#"[
        {"id":"1","title":"A","courseCode":"A1","track":"T","part":"P","elements":[]},
        {"id":"2","title":"B","courseCode":"B1","track":"T","part":"P"},
        "not a course"
    ]"#;

    let c = candidate(&store, text).unwrap();
    assert_eq!(c.len(), 1);
    assert_eq!(c.courses[0].title, "A");
}

#[test]
fn test_loosely_typed_fields_are_accepted() {
    let mut store = store_with_one_course();
    let text = r#"[{"id":"1","title":"A","description":null,"courseCode":"A1","track":"T","part":"P",
        "ects":"5","elements":[{"id":7,"type":"Lecture","name":"One"}]}]"#;

    let c = candidate(&store, text).unwrap();
    assert_eq!(c.len(), 1);
    let course = &c.courses[0];
    assert_eq!(course.description, "");
    assert_eq!(course.ects, 5.0);
    assert_eq!(course.elements.len(), 1);
    assert!(!course.elements[0].id.is_empty());

    assert_eq!(store.import(c, ImportMode::Merge), 1);
    assert_eq!(store.courses().len(), 2);
}

#[test]
fn test_hand_built_candidate_gets_fresh_ids() {
    let mut store = store_with_one_course();
    let c = ImportCandidate {
        courses: store.courses().to_vec(),
        settings: None,
        school: None,
    };
    store.import(c, ImportMode::Merge);

    let mut ids: Vec<_> = store.courses().iter().map(|c| c.id.clone()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 2);
}

#[test]
fn test_elements_get_fresh_ids_and_canonical_links() {
    let store = store_with_one_course();
    let text = r#"[{"id":"1","title":"A","courseCode":"A1","track":"T","part":"P","elements":[
        {"id":"e1","type":"Lecture","name":"One","links":["https://a","https://b"]},
        {"id":"e2","type":"Labs","name":"Two","link":"https://c"}
    ]}]"#;

    let c = candidate(&store, text).unwrap();
    let course = &c.courses[0];
    assert_ne!(course.elements[0].id, "e1");
    assert_ne!(course.elements[1].id, "e2");
    assert_ne!(course.elements[0].id, course.elements[1].id);
    assert_eq!(course.elements[0].links[1].name, "Link 2");
    assert_eq!(course.elements[0].links[1].url, "https://b");
    assert_eq!(course.elements[1].links[0].name, "Link 1");
}

#[test]
fn test_reimporting_own_export_never_collides() {
    let mut store = store_with_one_course();
    let exported = store.export().to_json().unwrap();

    let c = candidate(&store, &exported).unwrap();
    store.import(c, ImportMode::Merge);

    let mut ids: Vec<_> = store.courses().iter().map(|c| c.id.clone()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 2);
}

#[test]
fn test_export_roundtrips_settings() {
    let mut store = store_with_one_course();
    let exported = store.export();
    assert_eq!(exported.school, "telecom");
    assert_eq!(exported.version, "1.0");
    assert!(exported
        .file_name(store.profile())
        .starts_with("telecom-course-manager-backup-"));

    let c = candidate(&store, &exported.to_json().unwrap()).unwrap();
    assert_eq!(c.school.as_deref(), Some("telecom"));
    let settings = c.settings.clone().unwrap();
    assert_eq!(&settings, store.settings());

    store.import(c, ImportMode::Replace);
    assert_eq!(store.courses().len(), 1);
    assert_eq!(store.courses()[0].title, "Existing");
}
