use coursebook_catalog::{
    storage::{FileStorage, MemoryStorage, Storage},
    CourseDraft, CourseField, CourseFilter, ElementDraft, ElementField, Error, Link, Profiles,
    Store,
};
use pretty_assertions::assert_eq;

fn empty_store() -> Store<MemoryStorage> {
    Store::load(MemoryStorage::new(), &Profiles::builtin(), "psl").unwrap()
}

fn add(store: &mut Store<MemoryStorage>, title: &str, code: &str, track: &str, part: &str) -> String {
    store
        .add_course(CourseDraft {
            title: title.to_string(),
            course_code: code.to_string(),
            track: Some(track.to_string()),
            part: Some(part.to_string()),
            ects: 5.0,
            ..Default::default()
        })
        .unwrap()
}

#[test]
fn test_unknown_profile() {
    assert!(matches!(
        Store::load(MemoryStorage::new(), &Profiles::builtin(), "nowhere"),
        Err(Error::UnknownProfile(_))
    ));
}

#[test]
fn test_add_course_uses_profile_defaults() {
    let mut store = empty_store();
    let id = store
        .add_course(CourseDraft {
            title: "  Algebra ".to_string(),
            ..Default::default()
        })
        .unwrap();

    let course = store.course(&id).unwrap();
    assert_eq!(course.title, "Algebra");
    assert_eq!(course.track, "Common");
    assert_eq!(course.part, "S1");
    assert!(course.elements.is_empty());

    assert!(matches!(
        store.add_course(CourseDraft::default()),
        Err(Error::MissingTitle)
    ));
}

#[test]
fn test_mutations_persist_and_reload() {
    let mut store = empty_store();
    let id = add(&mut store, "Topology", "TOP", "Math", "S2");
    store
        .add_element(
            &id,
            ElementDraft {
                name: "Sheet 1".to_string(),
                kind: Some("Exercises".to_string()),
                links: vec![Link::new("PDF", "https://example.com/1.pdf")],
            },
        )
        .unwrap();
    store.set_school_year("2024".to_string());
    store.set_locked(true);

    let storage = store.into_storage();
    assert_eq!(
        storage.get("psl-course-manager-lock-state").unwrap().as_deref(),
        Some("true")
    );

    let reloaded = Store::load(storage, &Profiles::builtin(), "psl").unwrap();
    let course = reloaded.course(&id).unwrap();
    assert_eq!(course.title, "Topology");
    assert_eq!(course.elements[0].name, "Sheet 1");
    assert_eq!(course.elements[0].kind, "Exercises");
    assert_eq!(course.elements[0].links, vec![Link::new("PDF", "https://example.com/1.pdf")]);
    assert_eq!(reloaded.settings().school_year, "2024");
    assert!(reloaded.settings().is_locked);
}

#[test]
fn test_load_normalizes_legacy_data() {
    let storage = MemoryStorage::with_entries([(
        "telecom-course-manager-data",
        r#"[{"id":"1","title":"Old","courseCode":"O1","track":"TSIA","part":"P1","elements":[
            {"id":"a","type":"Lecture","name":"L1","links":["https://a","https://b"]},
            {"id":"b","type":"Lecture","name":"L2","link":"https://c"}
        ]}]"#,
    )]);
    let store = Store::load(storage, &Profiles::builtin(), "telecom").unwrap();

    let course = store.course("1").unwrap();
    assert_eq!(
        course.elements[0].links,
        vec![Link::new("Link 1", "https://a"), Link::new("Link 2", "https://b")]
    );
    assert_eq!(course.elements[1].links, vec![Link::new("Link 1", "https://c")]);
}

#[test]
fn test_load_gives_elements_ids() {
    let storage = MemoryStorage::with_entries([(
        "telecom-course-manager-data",
        r#"[{"id":"1","title":"Old","courseCode":"O1","track":"TSIA","part":"P1","elements":[
            {"type":"Lecture","name":"L1"},
            {"type":"Lecture","name":"L2"}
        ]}]"#,
    )]);
    let store = Store::load(storage, &Profiles::builtin(), "telecom").unwrap();

    let elements = &store.course("1").unwrap().elements;
    assert!(elements.iter().all(|e| !e.id.is_empty()));
    assert_ne!(elements[0].id, elements[1].id);
}

#[test]
fn test_load_survives_garbage() {
    let storage = MemoryStorage::with_entries([
        ("telecom-course-manager-data", "{not json"),
        ("telecom-course-manager-lock-state", "maybe"),
    ]);
    let store = Store::load(storage, &Profiles::builtin(), "telecom").unwrap();

    assert!(store.courses().is_empty());
    assert!(!store.settings().is_locked);
    assert_eq!(store.settings().school_description, store.profile().description);
}

#[test]
fn test_load_keeps_unreadable_records() {
    let storage = MemoryStorage::with_entries([(
        "telecom-course-manager-data",
        r#"[{"id":"1","title":"Good","courseCode":"G","track":"TSIA","part":"P1","elements":[]},
            "not a course", 42]"#,
    )]);
    let mut store = Store::load(storage, &Profiles::builtin(), "telecom").unwrap();
    assert_eq!(store.courses().len(), 1);

    add(&mut store, "New", "N", "TSIA", "P1");
    let data = store
        .storage()
        .get("telecom-course-manager-data")
        .unwrap()
        .unwrap();
    let records: Vec<serde_json::Value> = serde_json::from_str(&data).unwrap();
    assert_eq!(records.len(), 4);
    assert!(records.contains(&serde_json::json!("not a course")));
    assert!(records.contains(&serde_json::json!(42)));
}

#[test]
fn test_loosely_typed_records_survive_a_save() {
    let storage = MemoryStorage::with_entries([(
        "telecom-course-manager-data",
        r#"[{"id":"1","title":"Kept","courseCode":"K","track":"TSIA","part":"P1","elements":[]},
            {"id":2,"title":"Legacy","description":null,"courseCode":"L","track":"TSIA","part":"P1",
             "ects":"5","elements":[{"id":3,"type":"Lecture","name":"L1"}]},
            {"title":"No id","courseCode":"N","track":"TSIA","part":"P1","elements":[]}]"#,
    )]);
    let mut store = Store::load(storage, &Profiles::builtin(), "telecom").unwrap();
    add(&mut store, "New", "N2", "TSIA", "P1");

    let reloaded = Store::load(store.into_storage(), &Profiles::builtin(), "telecom").unwrap();
    let titles: Vec<_> = reloaded.courses().iter().map(|c| c.title.as_str()).collect();
    assert_eq!(titles, vec!["Kept", "Legacy", "No id", "New"]);

    let legacy = reloaded.course("2").unwrap();
    assert_eq!(legacy.description, "");
    assert_eq!(legacy.ects, 5.0);
    assert_eq!(legacy.elements[0].id, "3");
    assert!(reloaded.courses().iter().all(|c| !c.id.is_empty()));
}

#[test]
fn test_garbage_data_is_backed_up_before_overwrite() {
    let storage = MemoryStorage::with_entries([("telecom-course-manager-data", "{not json")]);
    let mut store = Store::load(storage, &Profiles::builtin(), "telecom").unwrap();
    add(&mut store, "New", "N", "TSIA", "P1");

    let storage = store.into_storage();
    assert_eq!(
        storage.get("telecom-course-manager-data-unreadable").unwrap(),
        Some("{not json".to_string())
    );
    let reloaded = Store::load(storage, &Profiles::builtin(), "telecom").unwrap();
    assert_eq!(reloaded.courses().len(), 1);
}

#[test]
fn test_elements_sorted_by_name() {
    let mut store = empty_store();
    let id = add(&mut store, "Analysis", "AN", "Math", "S1");
    for name in ["week 3", "Week 1", "week 2"] {
        store
            .add_element(
                &id,
                ElementDraft {
                    name: name.to_string(),
                    ..Default::default()
                },
            )
            .unwrap();
    }

    let names = |store: &Store<MemoryStorage>| -> Vec<String> {
        store.course(&id).unwrap().elements.iter().map(|e| e.name.clone()).collect()
    };
    assert_eq!(names(&store), vec!["Week 1", "week 2", "week 3"]);

    let first = store.course(&id).unwrap().elements[0].id.clone();
    store
        .update_element(&id, &first, ElementField::Name("week 9".to_string()))
        .unwrap();
    assert_eq!(names(&store), vec!["week 2", "week 3", "week 9"]);
    // identity is kept through updates
    assert_eq!(store.course(&id).unwrap().elements[2].id, first);
    assert_eq!(store.course(&id).unwrap().elements[2].kind, "Lecture");
}

#[test]
fn test_element_links_drop_empty_urls() {
    let mut store = empty_store();
    let id = add(&mut store, "Analysis", "AN", "Math", "S1");
    let element = store
        .add_element(
            &id,
            ElementDraft {
                name: "Lab".to_string(),
                kind: None,
                links: vec![Link::new("Keep", "https://k"), Link::new("Drop", "")],
            },
        )
        .unwrap();
    assert_eq!(
        store.course(&id).unwrap().element(&element).unwrap().links,
        vec![Link::new("Keep", "https://k")]
    );

    store
        .update_element(
            &id,
            &element,
            ElementField::Links(vec![Link::new("", " "), Link::new("", "https://n")]),
        )
        .unwrap();
    let links = &store.course(&id).unwrap().element(&element).unwrap().links;
    assert_eq!(links, &vec![Link::new("", "https://n")]);
    assert_eq!(links[0].display_name(), "Unnamed Link");
}

#[test]
fn test_progress() {
    let mut store = empty_store();
    let id = add(&mut store, "Analysis", "AN", "Math", "S1");
    let mut elements = vec![];
    for name in ["a", "b", "c", "d"] {
        elements.push(
            store
                .add_element(
                    &id,
                    ElementDraft {
                        name: name.to_string(),
                        ..Default::default()
                    },
                )
                .unwrap(),
        );
    }

    assert!(store.toggle_element(&id, &elements[0]).unwrap());
    assert!(store.toggle_element(&id, &elements[1]).unwrap());
    assert!(!store.toggle_element(&id, &elements[1]).unwrap());

    let progress = store.course(&id).unwrap().progress();
    assert_eq!((progress.completed, progress.total), (1, 4));
    assert_eq!(progress.percent(), 25);

    add(&mut store, "Empty", "EM", "Math", "S1");
    assert_eq!(store.progress().total, 4);
}

#[test]
fn test_delete_course_clears_selection() {
    let mut store = empty_store();
    let a = add(&mut store, "A", "A1", "CS", "S1");
    let b = add(&mut store, "B", "B1", "CS", "S1");

    store.select(&b).unwrap();
    store.delete_course(&a).unwrap();
    assert_eq!(store.selected().map(|c| c.id.clone()), Some(b.clone()));

    let removed = store.delete_course(&b).unwrap();
    assert_eq!(removed.id, b);
    assert!(store.selected().is_none());
    assert!(store.courses().is_empty());
    assert!(matches!(store.delete_course(&b), Err(Error::CourseNotFound(_))));
}

#[test]
fn test_delete_element() {
    let mut store = empty_store();
    let id = add(&mut store, "A", "A1", "CS", "S1");
    let element = store.add_element(&id, ElementDraft::default()).unwrap();

    store.delete_element(&id, &element).unwrap();
    assert!(store.course(&id).unwrap().elements.is_empty());
    assert!(matches!(
        store.delete_element(&id, &element),
        Err(Error::ElementNotFound(_, _))
    ));
}

#[test]
fn test_update_course_keeps_identity() {
    let mut store = empty_store();
    let id = add(&mut store, "A", "A1", "CS", "S1");

    store
        .update_course(&id, CourseField::Title("Renamed".to_string()))
        .unwrap();
    store.update_course(&id, CourseField::Ects(-3.0)).unwrap();
    store
        .update_course(&id, CourseField::Track("Option CS".to_string()))
        .unwrap();

    let course = store.course(&id).unwrap();
    assert_eq!(course.title, "Renamed");
    assert_eq!(course.ects, 0.0);
    assert_eq!(course.track, "Option CS");
    assert!(matches!(
        store.update_course(&id, CourseField::Title(" ".to_string())),
        Err(Error::MissingTitle)
    ));
}

#[test]
fn test_locked_store_rejects_course_changes() {
    let mut store = empty_store();
    let id = add(&mut store, "A", "A1", "CS", "S1");
    store.set_locked(true);

    assert!(matches!(
        store.add_course(CourseDraft {
            title: "B".to_string(),
            ..Default::default()
        }),
        Err(Error::Locked)
    ));
    assert!(matches!(store.delete_course(&id), Err(Error::Locked)));
    assert!(matches!(
        store.add_element(&id, ElementDraft::default()),
        Err(Error::Locked)
    ));

    store.set_locked(false);
    store.delete_course(&id).unwrap();
}

#[test]
fn test_filter() {
    let mut store = empty_store();
    add(&mut store, "Machine Learning", "CS101", "CS", "S1");
    add(&mut store, "algebra", "MA101", "Math", "S1");
    add(&mut store, "Probability", "MA202", "Math", "S2");

    let titles = |filter: CourseFilter| -> Vec<String> {
        store.filtered(&filter).iter().map(|c| c.title.clone()).collect()
    };

    assert_eq!(
        titles(CourseFilter::default()),
        vec!["algebra", "Machine Learning", "Probability"]
    );
    assert_eq!(
        titles(CourseFilter {
            search: "ma".to_string(),
            ..Default::default()
        }),
        vec!["algebra", "Machine Learning", "Probability"]
    );
    assert_eq!(
        titles(CourseFilter {
            search: "MA2".to_string(),
            ..Default::default()
        }),
        vec!["Probability"]
    );
    assert_eq!(
        titles(CourseFilter {
            track: Some("Math".to_string()),
            part: Some("S1".to_string()),
            ..Default::default()
        }),
        vec!["algebra"]
    );
}

#[test]
fn test_failed_writes_keep_memory_state() {
    let mut storage = MemoryStorage::new();
    storage.set_read_only(true);
    let mut store = Store::load(storage, &Profiles::builtin(), "psl").unwrap();

    let id = add(&mut store, "A", "A1", "CS", "S1");
    assert!(store.course(&id).is_some());
    assert!(matches!(store.save(), Err(Error::Storage(_))));
    assert!(store.storage().is_empty());
}

#[test]
fn test_course_count() {
    let profiles = Profiles::builtin();
    let mut store = empty_store();
    add(&mut store, "A", "A1", "CS", "S1");
    add(&mut store, "B", "B1", "CS", "S1");
    let storage = store.into_storage();

    assert_eq!(Store::course_count(&storage, profiles.get("psl").unwrap()), 2);
    assert_eq!(Store::course_count(&storage, profiles.get("telecom").unwrap()), 0);
}

#[test]
fn test_file_storage() {
    let dir = tempfile::tempdir().unwrap();
    let root = camino::Utf8PathBuf::from_path_buf(dir.path().join("storage")).unwrap();
    let mut storage = FileStorage::open(root.clone()).unwrap();

    assert_eq!(storage.get("psl-course-manager-data").unwrap(), None);
    storage.set("psl-course-manager-year", "2025").unwrap();
    assert_eq!(
        storage.get("psl-course-manager-year").unwrap().as_deref(),
        Some("2025")
    );
    storage.remove("psl-course-manager-year").unwrap();
    storage.remove("psl-course-manager-year").unwrap();
    assert_eq!(storage.get("psl-course-manager-year").unwrap(), None);

    assert!(storage.set("../escape", "x").is_err());
    assert!(storage.get("a/b").is_err());

    let mut store = Store::load(FileStorage::open(root).unwrap(), &Profiles::builtin(), "psl").unwrap();
    let id = store
        .add_course(CourseDraft {
            title: "On disk".to_string(),
            ..Default::default()
        })
        .unwrap();
    let reloaded = Store::load(store.into_storage(), &Profiles::builtin(), "psl").unwrap();
    assert_eq!(reloaded.course(&id).unwrap().title, "On disk");
}
