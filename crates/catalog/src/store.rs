use log::{debug, error, info, warn};
use serde_json::Value;

use crate::{
    course::{by_name, new_id, Course, CourseDraft, CourseField, ElementDraft, ElementField, Progress},
    export::ExportEnvelope,
    import::{ImportCandidate, ImportMode},
    normalize::normalize_course,
    profile::{Profile, Profiles},
    settings::Settings,
    storage::Storage,
    Error, Result,
};

const DATA_KEY: &str = "data";
const HEADER_IMAGE_KEY: &str = "header-image";
const LOCK_STATE_KEY: &str = "lock-state";
const YEAR_KEY: &str = "year";
const DESCRIPTION_KEY: &str = "description";
/// Where a data entry that isn't a JSON list is moved before it is overwritten
const UNREADABLE_DATA_KEY: &str = "data-unreadable";

/// Everything persisted for a profile
#[derive(Debug, Clone, PartialEq)]
pub struct State {
    pub courses: Vec<Course>,
    pub settings: Settings,
}

/// Narrows down the course list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseFilter {
    /// Case-insensitive match against title and course code
    pub search: String,
    pub track: Option<String>,
    pub part: Option<String>,
}

impl CourseFilter {
    pub fn matches(&self, course: &Course) -> bool {
        let search = self.search.trim().to_lowercase();
        let matches_search = search.is_empty()
            || course.title.to_lowercase().contains(&search)
            || course.course_code.to_lowercase().contains(&search);
        let matches_track = self.track.as_ref().map_or(true, |t| &course.track == t);
        let matches_part = self.part.as_ref().map_or(true, |p| &course.part == p);

        matches_search && matches_track && matches_part
    }

    pub fn is_empty(&self) -> bool {
        self.search.trim().is_empty() && self.track.is_none() && self.part.is_none()
    }
}

/// Stored course data that couldn't be read. It is held on to so that saving
/// never discards it.
#[derive(Debug, Default)]
struct Unreadable {
    /// Records that aren't courses, written back after the readable ones
    records: Vec<Value>,
    /// The whole data entry, if it wasn't a JSON list at all
    raw: Option<String>,
}

/// Owns the courses and settings of one profile, and writes every change
/// through to storage.
///
/// A failed write is logged and otherwise ignored: in-memory state stays the
/// source of truth until the next successful write.
pub struct Store<S> {
    storage: S,
    profile_key: String,
    profile: Profile,
    state: State,
    selected: Option<String>,
    unreadable: Unreadable,
}

impl<S: Storage> Store<S> {
    /// Load the given profile's data from storage.
    /// Only an unknown profile is an error; unreadable data is logged and replaced with defaults.
    pub fn load(storage: S, profiles: &Profiles, profile_key: &str) -> Result<Self> {
        let profile = profiles.get(profile_key)?.clone();
        let (courses, unreadable) = load_courses(&storage, &profile);
        let state = State {
            courses,
            settings: load_settings(&storage, &profile),
        };
        info!(
            "loaded profile {} with {} courses",
            profile_key,
            state.courses.len()
        );

        Ok(Self {
            storage,
            profile_key: profile_key.to_string(),
            profile,
            state,
            selected: None,
            unreadable,
        })
    }

    /// Number of courses stored for the given profile, without loading it.
    pub fn course_count(storage: &S, profile: &Profile) -> usize {
        match storage.get(&profile.storage_key(DATA_KEY)) {
            Ok(Some(text)) => match serde_json::from_str::<Value>(&text) {
                Ok(Value::Array(records)) => records.len(),
                Ok(_) => 0,
                Err(e) => {
                    error!("error loading courses count: {}", e);
                    0
                }
            },
            Ok(None) => 0,
            Err(e) => {
                error!("error loading courses count: {}", e);
                0
            }
        }
    }

    /// Write the whole state to storage.
    pub fn save(&mut self) -> Result<()> {
        let mut records = self
            .state
            .courses
            .iter()
            .map(serde_json::to_value)
            .collect::<serde_json::Result<Vec<_>>>()?;
        records.extend(self.unreadable.records.iter().cloned());
        let data = serde_json::to_string(&records)?;

        if let Some(raw) = &self.unreadable.raw {
            let key = self.profile.storage_key(UNREADABLE_DATA_KEY);
            self.storage.set(&key, raw)?;
            warn!("moved unreadable course data to {}", key);
            self.unreadable.raw = None;
        }

        let settings = &self.state.settings;
        self.storage
            .set(&self.profile.storage_key(DATA_KEY), &data)?;
        match &settings.header_image {
            Some(image) => self
                .storage
                .set(&self.profile.storage_key(HEADER_IMAGE_KEY), image)?,
            None => self
                .storage
                .remove(&self.profile.storage_key(HEADER_IMAGE_KEY))?,
        };
        self.storage.set(
            &self.profile.storage_key(LOCK_STATE_KEY),
            if settings.is_locked { "true" } else { "false" },
        )?;
        self.storage
            .set(&self.profile.storage_key(YEAR_KEY), &settings.school_year)?;
        self.storage.set(
            &self.profile.storage_key(DESCRIPTION_KEY),
            &settings.school_description,
        )?;

        Ok(())
    }

    fn persist(&mut self) {
        if let Err(e) = self.save() {
            error!("error saving {}: {}", self.profile_key, e);
        }
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn courses(&self) -> &[Course] {
        &self.state.courses
    }

    pub fn settings(&self) -> &Settings {
        &self.state.settings
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn profile_key(&self) -> &str {
        &self.profile_key
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    pub fn course(&self, course_id: &str) -> Option<&Course> {
        self.state.courses.iter().find(|c| c.id == course_id)
    }

    fn course_mut(&mut self, course_id: &str) -> Result<&mut Course> {
        if self.state.settings.is_locked {
            return Err(Error::Locked);
        }
        self.state
            .courses
            .iter_mut()
            .find(|c| c.id == course_id)
            .ok_or_else(|| Error::CourseNotFound(course_id.to_string()))
    }

    /// Courses matching the filter, sorted by title.
    pub fn filtered(&self, filter: &CourseFilter) -> Vec<&Course> {
        let mut courses: Vec<_> = self
            .state
            .courses
            .iter()
            .filter(|c| filter.matches(c))
            .collect();
        courses.sort_by(|a, b| by_name(&a.title, &b.title));
        courses
    }

    /// Progress across every course in the profile
    pub fn progress(&self) -> Progress {
        self.state.courses.iter().map(Course::progress).sum()
    }

    pub fn selected(&self) -> Option<&Course> {
        self.selected.as_deref().and_then(|id| self.course(id))
    }

    pub fn select(&mut self, course_id: &str) -> Result<()> {
        if self.course(course_id).is_none() {
            return Err(Error::CourseNotFound(course_id.to_string()));
        }
        self.selected = Some(course_id.to_string());
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Create a course from a submitted form, returning its ID.
    pub fn add_course(&mut self, draft: CourseDraft) -> Result<String> {
        if self.state.settings.is_locked {
            return Err(Error::Locked);
        }
        let course = draft.into_course(&self.profile)?;
        let id = course.id.clone();
        debug!("adding course {} ({})", course.title, id);

        self.state.courses.push(course);
        self.persist();

        Ok(id)
    }

    pub fn update_course(&mut self, course_id: &str, field: CourseField) -> Result<()> {
        self.course_mut(course_id)?.apply(field)?;
        self.persist();

        Ok(())
    }

    /// Remove a course for good, clearing the selection if it was selected.
    pub fn delete_course(&mut self, course_id: &str) -> Result<Course> {
        if self.state.settings.is_locked {
            return Err(Error::Locked);
        }
        let idx = self
            .state
            .courses
            .iter()
            .position(|c| c.id == course_id)
            .ok_or_else(|| Error::CourseNotFound(course_id.to_string()))?;
        let course = self.state.courses.remove(idx);

        if self.selected.as_deref() == Some(course_id) {
            self.selected = None;
        }
        self.persist();

        Ok(course)
    }

    /// Add an element from a submitted form, returning its ID.
    pub fn add_element(&mut self, course_id: &str, draft: ElementDraft) -> Result<String> {
        let element = draft.into_element(&self.profile);
        let id = element.id.clone();

        let course = self.course_mut(course_id)?;
        course.elements.push(element);
        course.sort_elements();
        self.persist();

        Ok(id)
    }

    pub fn update_element(
        &mut self,
        course_id: &str,
        element_id: &str,
        field: ElementField,
    ) -> Result<()> {
        let course = self.course_mut(course_id)?;
        course.element_mut(element_id)?.apply(field);
        course.sort_elements();
        self.persist();

        Ok(())
    }

    /// Flip an element's completion, returning the new value.
    pub fn toggle_element(&mut self, course_id: &str, element_id: &str) -> Result<bool> {
        let element = self.course_mut(course_id)?.element_mut(element_id)?;
        element.completed = !element.completed;
        let completed = element.completed;
        self.persist();

        Ok(completed)
    }

    pub fn delete_element(&mut self, course_id: &str, element_id: &str) -> Result<()> {
        let course = self.course_mut(course_id)?;
        let before = course.elements.len();
        course.elements.retain(|e| e.id != element_id);
        if course.elements.len() == before {
            return Err(Error::ElementNotFound(
                course_id.to_string(),
                element_id.to_string(),
            ));
        }
        self.persist();

        Ok(())
    }

    pub fn set_header_image(&mut self, image: Option<String>) {
        self.state.settings.header_image = image;
        self.persist();
    }

    pub fn set_locked(&mut self, locked: bool) {
        self.state.settings.is_locked = locked;
        self.persist();
    }

    pub fn set_school_year(&mut self, year: String) {
        self.state.settings.school_year = year;
        self.persist();
    }

    pub fn set_school_description(&mut self, description: String) {
        self.state.settings.school_description = description;
        self.persist();
    }

    /// Commit validated imported courses, returning how many were added.
    /// Imported courses always get fresh identities.
    ///
    /// Replacing also replaces the settings; a bare course list carries no
    /// settings, so they are reset to the profile's defaults.
    pub fn import(&mut self, mut candidate: ImportCandidate, mode: ImportMode) -> usize {
        if let Some(school) = &candidate.school {
            if school != &self.profile_key {
                warn!(
                    "importing data exported from {} into {}",
                    school, self.profile_key
                );
            }
        }

        for course in candidate.courses.iter_mut() {
            course.reassign_ids();
        }

        let count = candidate.courses.len();
        match mode {
            ImportMode::Replace => {
                if !self.unreadable.records.is_empty() {
                    info!(
                        "replacing {} unreadable stored records",
                        self.unreadable.records.len()
                    );
                    self.unreadable.records.clear();
                }
                self.state.courses = candidate.courses;
                self.state.settings = candidate
                    .settings
                    .unwrap_or_else(|| Settings::defaults(&self.profile));
                self.selected = None;
            }
            ImportMode::Merge => self.state.courses.extend(candidate.courses),
        };
        info!("imported {} courses ({:?})", count, mode);
        self.persist();

        count
    }

    pub fn export(&self) -> ExportEnvelope {
        ExportEnvelope::new(
            &self.profile_key,
            self.state.courses.clone(),
            &self.state.settings,
        )
    }
}

/// Read the stored courses. Records that can't be read are returned separately, untouched.
fn load_courses<S: Storage>(storage: &S, profile: &Profile) -> (Vec<Course>, Unreadable) {
    let mut unreadable = Unreadable::default();
    let text = match storage.get(&profile.storage_key(DATA_KEY)) {
        Ok(Some(text)) => text,
        Ok(None) => return (vec![], unreadable),
        Err(e) => {
            error!("error loading courses: {}", e);
            return (vec![], unreadable);
        }
    };

    let records = match serde_json::from_str::<Value>(&text) {
        Ok(Value::Array(records)) => records,
        Ok(_) => {
            error!("error loading courses: stored data is not a list");
            unreadable.raw = Some(text);
            return (vec![], unreadable);
        }
        Err(e) => {
            error!("error loading courses: {}", e);
            unreadable.raw = Some(text);
            return (vec![], unreadable);
        }
    };

    let mut courses = vec![];
    for record in records {
        let mut normalized = record.clone();
        normalize_course(&mut normalized);
        match serde_json::from_value::<Course>(normalized) {
            Ok(mut course) => {
                // courses and elements are addressed by ID, so they need one
                if course.id.is_empty() {
                    course.id = new_id();
                }
                for element in course.elements.iter_mut().filter(|e| e.id.is_empty()) {
                    element.id = new_id();
                }
                courses.push(course);
            }
            Err(e) => {
                warn!("keeping unreadable stored course as-is: {}", e);
                unreadable.records.push(record);
            }
        }
    }

    (courses, unreadable)
}

fn load_settings<S: Storage>(storage: &S, profile: &Profile) -> Settings {
    let get = |suffix: &str| match storage.get(&profile.storage_key(suffix)) {
        Ok(v) => v,
        Err(e) => {
            error!("error loading {}: {}", suffix, e);
            None
        }
    };
    let defaults = Settings::defaults(profile);

    Settings {
        header_image: get(HEADER_IMAGE_KEY).filter(|s| !s.is_empty()),
        is_locked: get(LOCK_STATE_KEY).is_some_and(|s| s == "true"),
        school_year: get(YEAR_KEY).unwrap_or(defaults.school_year),
        school_description: get(DESCRIPTION_KEY).unwrap_or(defaults.school_description),
    }
}
