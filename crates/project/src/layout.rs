//! Project Layout
//!
//! Derived class and source paths for the standard ANT project layout,
//! including referenced library projects.

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::{properties, ProjectError};

/// Java class paths for the project: the platform android.jar, compiled
/// classes, generated sources, bundled jars, and the same trio for every
/// referenced library project.
pub async fn classpaths(project: &Path) -> Result<Vec<PathBuf>, ProjectError> {
    let sdk = properties::sdk_dir(project).await?;
    let platform = properties::target_platform(project).await?;

    let mut paths = vec![
        sdk.join("platforms").join(&platform).join("android.jar"),
        project.join("bin").join("classes"),
        project.join("gen"),
        project.join("libs").join("*"),
    ];

    for path in &paths {
        if !path.exists() {
            warn!("Classpath does not exist: {:?}", path);
        }
    }

    for lib in properties::library_references(project).await? {
        let lib_root = project.join(&lib);
        paths.push(lib_root.join("bin").join("classes"));
        paths.push(lib_root.join("gen"));
        paths.push(lib_root.join("libs").join("*"));
    }

    Ok(paths)
}

/// Java source paths: the project's `src` plus every referenced library's.
pub async fn srcpaths(project: &Path) -> Result<Vec<PathBuf>, ProjectError> {
    let mut paths = vec![project.join("src")];
    for lib in properties::library_references(project).await? {
        paths.push(project.join(&lib).join("src"));
    }
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn scaffold(dir: &Path) {
        tokio::fs::write(dir.join("local.properties"), "sdk.dir=/opt/sdk\n")
            .await
            .unwrap();
        tokio::fs::write(
            dir.join("project.properties"),
            "target=android-19\nandroid.library.reference.1=../lib-core\n",
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_classpaths_include_platform_and_libraries() {
        let dir = tempfile::tempdir().unwrap();
        scaffold(dir.path()).await;

        let paths = classpaths(dir.path()).await.unwrap();
        assert_eq!(
            paths[0],
            PathBuf::from("/opt/sdk/platforms/android-19/android.jar")
        );
        assert!(paths.contains(&dir.path().join("../lib-core/bin/classes")));
    }

    #[tokio::test]
    async fn test_srcpaths() {
        let dir = tempfile::tempdir().unwrap();
        scaffold(dir.path()).await;

        let paths = srcpaths(dir.path()).await.unwrap();
        assert_eq!(paths[0], dir.path().join("src"));
        assert_eq!(paths[1], dir.path().join("../lib-core/src"));
    }
}
