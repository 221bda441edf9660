//! Project Discovery
//!
//! Heuristics for finding the Android project root: walk upward from the
//! active file looking for the manifest plus project.properties, with a
//! fallback scan over workspace folders.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

/// Walk upward from `start` (a file or directory) and return the first
/// ancestor containing both `AndroidManifest.xml` and `project.properties`.
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    let mut dir = if start.is_file() {
        start.parent()?
    } else {
        start
    };

    loop {
        let manifest = dir.join("AndroidManifest.xml");
        let properties = dir.join("project.properties");
        if manifest.is_file() && properties.is_file() {
            info!("Found project from {:?}: {:?}", start, dir);
            return Some(dir.to_path_buf());
        }
        dir = dir.parent()?;
    }
}

/// Return the first workspace folder that looks like an Android project
/// root, judged by the presence of `local.properties` and
/// `project.properties`.
///
/// Less precise than [`find_project_root`]: it returns the first match in
/// folder order, so it is only used when no active file is available.
pub fn find_in_folders<I>(folders: I) -> Option<PathBuf>
where
    I: IntoIterator<Item = PathBuf>,
{
    for folder in folders {
        let a = folder.join("local.properties");
        let b = folder.join("project.properties");
        if a.is_file() && b.is_file() {
            info!("Found project from workspace folder {:?}", folder);
            return Some(folder);
        }
    }
    None
}

/// Whether `start` is inside an Android project.
pub fn is_android_project(start: &Path) -> bool {
    let found = find_project_root(start).is_some();
    if !found {
        debug!("Not an android project: {:?}", start);
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scaffold_project(root: &Path) {
        std::fs::create_dir_all(root.join("src/com/example")).unwrap();
        std::fs::write(root.join("AndroidManifest.xml"), "<manifest/>").unwrap();
        std::fs::write(root.join("project.properties"), "target=android-19\n").unwrap();
    }

    #[test]
    fn test_find_from_nested_directory() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("app");
        scaffold_project(&root);

        let found = find_project_root(&root.join("src/com/example")).unwrap();
        assert_eq!(found, root);
    }

    #[test]
    fn test_find_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("app");
        scaffold_project(&root);
        let file = root.join("src/com/example/Main.java");
        std::fs::write(&file, "class Main {}").unwrap();

        assert_eq!(find_project_root(&file).unwrap(), root);
    }

    #[test]
    fn test_not_a_project() {
        let dir = tempfile::tempdir().unwrap();
        assert!(find_project_root(dir.path()).is_none());
        assert!(!is_android_project(dir.path()));
    }

    #[test]
    fn test_find_in_folders() {
        let dir = tempfile::tempdir().unwrap();
        let plain = dir.path().join("plain");
        let android = dir.path().join("android");
        std::fs::create_dir_all(&plain).unwrap();
        std::fs::create_dir_all(&android).unwrap();
        std::fs::write(android.join("local.properties"), "sdk.dir=/opt/sdk\n").unwrap();
        std::fs::write(android.join("project.properties"), "target=android-19\n").unwrap();

        let found = find_in_folders(vec![plain, android.clone()]).unwrap();
        assert_eq!(found, android);
    }
}
