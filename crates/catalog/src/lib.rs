//! Course catalog for coursebook: the data model, institution profiles,
//! persistence and JSON import/export.
//!
//! All state for a profile lives in a [`Store`], which persists every
//! mutation to a [`storage::Storage`] backend.
pub mod course;
pub mod export;
pub mod import;
pub mod normalize;
pub mod profile;
pub mod settings;
pub mod storage;
pub mod store;

pub use course::{Course, CourseDraft, CourseField, Element, ElementDraft, ElementField, Link};
pub use export::ExportEnvelope;
pub use import::{ImportCandidate, ImportMode};
pub use profile::{Profile, Profiles};
pub use settings::Settings;
pub use store::{CourseFilter, State, Store};

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("unknown profile: {}", .0)]
    UnknownProfile(String),

    #[error("no course with id {}", .0)]
    CourseNotFound(String),

    #[error("no element with id {} in course {}", .1, .0)]
    ElementNotFound(String, String),

    #[error("a course needs a title")]
    MissingTitle,

    #[error("the catalog is locked")]
    Locked,

    #[error("{}", .0)]
    Import(#[from] import::Error),

    #[error("storage error: {}", .0)]
    Storage(#[from] storage::Error),

    #[error("serde error: {}", .0)]
    SerdeError(#[from] serde_json::Error),
}
