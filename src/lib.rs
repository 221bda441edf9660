//! Droidant - ANT build integration for Android projects
//!
//! Discovers a project's ANT build targets by following import references
//! across build.xml files and runs builds serially, with optional install
//! and launch chaining onto an attached device.
//!
//! ## Architecture
//!
//! Droidant is organized into specialized crates:
//!
//! - `droidant-core`: settings, events, and shared error types
//! - `droidant-project`: project location and metadata (properties, manifest)
//! - `droidant-build-engine`: target discovery and the serial build queue
//! - `droidant-adb-bridge`: device enumeration and install/launch plumbing

#![warn(clippy::all)]

pub mod commands;

pub use droidant_adb_bridge::{AdbClient, Device};
pub use droidant_build_engine::{
    resolve_targets, AntBuildOptions, AntRunner, BuildCoordinator, BuildResult,
};
pub use droidant_core::{EventBus, Settings};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::commands::{
        BuildCommand, CommandContext, DevicesCommand, KillCommand, ListTargetsCommand, RunCommand,
    };
    pub use droidant_adb_bridge::{AdbClient, Device, DeviceState};
    pub use droidant_build_engine::{
        AntBuildOptions, AntRunner, BuildCoordinator, BuildRequest, BuildResult,
    };
    pub use droidant_core::{Event, EventBus, Settings};
    pub use droidant_project::{find_project_root, main_activity};
}
