//! Android Project Metadata
//!
//! Locates an Android project on disk and reads its metadata files:
//! `local.properties` (SDK directory), `project.properties` (target platform
//! and library references), and `AndroidManifest.xml` (launch activity).

pub mod layout;
pub mod locate;
pub mod manifest;
pub mod properties;

pub use locate::{find_in_folders, find_project_root, is_android_project};
pub use manifest::main_activity;
pub use properties::{library_references, sdk_dir, target_platform};

/// Project metadata errors
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("missing property `{key}` in {file}")]
    MissingProperty { key: String, file: String },

    #[error("no launchable activity declared in AndroidManifest.xml")]
    NoMainActivity,
}
