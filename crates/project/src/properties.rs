//! Property File Readers
//!
//! Line-oriented `key=value` readers for `local.properties` and
//! `project.properties`.

use std::path::{Path, PathBuf};

use crate::ProjectError;

/// SDK directory from the project's `local.properties` (`sdk.dir=` line).
pub async fn sdk_dir(project: &Path) -> Result<PathBuf, ProjectError> {
    let path = project.join("local.properties");
    let contents = tokio::fs::read_to_string(&path).await?;
    parse_value(&contents, "sdk.dir")
        .map(PathBuf::from)
        .ok_or_else(|| ProjectError::MissingProperty {
            key: "sdk.dir".to_string(),
            file: path.display().to_string(),
        })
}

/// Target platform identifier from `project.properties` (`target=` line).
///
/// Google API targets (`Google Inc.:Google APIs:19`) are rewritten to the
/// platform directory name `android-19`.
pub async fn target_platform(project: &Path) -> Result<String, ProjectError> {
    let path = project.join("project.properties");
    let contents = tokio::fs::read_to_string(&path).await?;
    let target = parse_value(&contents, "target").ok_or_else(|| ProjectError::MissingProperty {
        key: "target".to_string(),
        file: path.display().to_string(),
    })?;
    Ok(normalize_target(&target))
}

/// Library project references from `project.properties`
/// (`android.library.reference.N=` lines), in declaration order. Values may
/// be absolute or relative paths.
pub async fn library_references(project: &Path) -> Result<Vec<String>, ProjectError> {
    let path = project.join("project.properties");
    let contents = tokio::fs::read_to_string(&path).await?;
    Ok(parse_library_references(&contents))
}

fn parse_value(contents: &str, key: &str) -> Option<String> {
    for line in contents.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix(key) {
            if let Some(value) = rest.strip_prefix('=') {
                return Some(value.trim().to_string());
            }
        }
    }
    None
}

fn parse_library_references(contents: &str) -> Vec<String> {
    contents
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            line.strip_prefix("android.library.reference")
                .and_then(|rest| rest.split_once('='))
                .map(|(_, value)| value.trim().to_string())
        })
        .collect()
}

fn normalize_target(target: &str) -> String {
    if target.starts_with("Google") {
        let api = target.rsplit(':').next().unwrap_or(target);
        format!("android-{}", api)
    } else {
        target.to_string()
    }
}
