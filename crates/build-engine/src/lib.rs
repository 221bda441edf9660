//! ANT Build Engine
//!
//! Discovers a project's invokable build targets by following import
//! references across build.xml files, and runs builds one at a time through
//! a serial coordinator with install/launch chaining.

pub mod coordinator;
pub mod descriptor;
pub mod resolver;
pub mod runner;

pub use coordinator::{BuildCoordinator, BuildRequest, DoneCallback};
pub use descriptor::BuildDescriptor;
pub use droidant_core::events::BuildResult;
pub use resolver::{resolve_targets, TargetMap};
pub use runner::{AntBuildOptions, AntRunner};

use std::path::PathBuf;

/// Build engine errors
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("descriptor not found: {}", .0.display())]
    DescriptorNotFound(PathBuf),

    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("cyclic import at {}", .0.display())]
    CyclicImport(PathBuf),

    #[error("build.xml does not declare a project name")]
    MissingProjectName,

    #[error("project error: {0}")]
    Project(#[from] droidant_project::ProjectError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
