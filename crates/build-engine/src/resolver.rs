//! Target Resolution
//!
//! Recursively follows import references across build descriptors and
//! flattens them into one ordered target map. The root descriptor is
//! visited first, so targets declared by the project itself take precedence
//! over imported SDK rules.

use std::collections::HashSet;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use indexmap::IndexMap;
use tracing::debug;

use crate::{BuildDescriptor, BuildError};

/// Resolved mapping of target name to description. Iteration order is the
/// pre-order traversal of the import tree.
pub type TargetMap = IndexMap<String, String>;

/// Path variable recognized in import references.
const SDK_DIR_VAR: &str = "${sdk.dir}";

/// Resolve the full set of invokable targets reachable from `root`.
///
/// Missing files are treated as empty leaves: build.xml commonly stubs
/// imports for custom rules that a given project never wrote. The first
/// declaration of a target name wins across the whole tree.
pub async fn resolve_targets(
    root: &Path,
    sdk_dir: &Path,
    project_path: &Path,
) -> Result<TargetMap, BuildError> {
    let mut targets = TargetMap::new();
    let mut in_progress = HashSet::new();
    resolve_into(root, sdk_dir, project_path, &mut targets, &mut in_progress).await?;
    Ok(targets)
}

/// Boxed for async recursion over the import tree.
fn resolve_into<'a>(
    path: &'a Path,
    sdk_dir: &'a Path,
    project_path: &'a Path,
    targets: &'a mut TargetMap,
    in_progress: &'a mut HashSet<PathBuf>,
) -> Pin<Box<dyn Future<Output = Result<(), BuildError>> + Send + 'a>> {
    Box::pin(async move {
        debug!("checking path: {:?}", path);
        if !path.is_file() {
            // stubbed import, contributes nothing
            return Ok(());
        }

        let canonical = path.canonicalize()?;
        if !in_progress.insert(canonical.clone()) {
            return Err(BuildError::CyclicImport(path.to_path_buf()));
        }

        let descriptor = BuildDescriptor::load(path).await?;

        for (name, description) in descriptor.targets {
            targets.entry(name).or_insert(description);
        }

        for import in descriptor.imports {
            debug!("found import with file attr: {}", import);
            let mut reference = import;
            if reference.starts_with(SDK_DIR_VAR) {
                reference = reference.replacen(SDK_DIR_VAR, &sdk_dir.to_string_lossy(), 1);
            }

            let candidate = PathBuf::from(reference);
            let resolved = if candidate.is_absolute() {
                candidate
            } else {
                project_path.join(candidate)
            };

            resolve_into(&resolved, sdk_dir, project_path, targets, in_progress).await?;
        }

        // diamond imports are legal, only a live recursion is a cycle
        in_progress.remove(&canonical);
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn write(path: &Path, contents: &str) {
        tokio::fs::write(path, contents).await.unwrap();
    }

    #[tokio::test]
    async fn test_end_to_end_scenario() {
        let dir = tempfile::tempdir().unwrap();
        let project = dir.path();

        write(
            &project.join("build.xml"),
            r#"<project name="demo">
                <target name="debug" description="Build debug"/>
                <import file="base.xml"/>
            </project>"#,
        )
        .await;
        write(
            &project.join("base.xml"),
            r#"<project>
                <target name="debug" description="Other"/>
                <target name="clean" description="Removes output files"/>
            </project>"#,
        )
        .await;

        let targets = resolve_targets(&project.join("build.xml"), Path::new("/sdk"), project)
            .await
            .unwrap();

        assert_eq!(targets.len(), 2);
        assert_eq!(targets["debug"], "Build debug");
        assert_eq!(targets["clean"], "Removes output files");
    }

    #[tokio::test]
    async fn test_sdk_dir_substitution() {
        let dir = tempfile::tempdir().unwrap();
        let project = dir.path().join("app");
        let sdk = dir.path().join("sdk");
        tokio::fs::create_dir_all(&project).await.unwrap();
        tokio::fs::create_dir_all(sdk.join("tools/ant")).await.unwrap();

        write(
            &project.join("build.xml"),
            r#"<project><import file="${sdk.dir}/tools/ant/build.xml"/></project>"#,
        )
        .await;
        write(
            &sdk.join("tools/ant/build.xml"),
            r#"<project><target name="release" description="Release build"/></project>"#,
        )
        .await;

        let targets = resolve_targets(&project.join("build.xml"), &sdk, &project)
            .await
            .unwrap();
        assert_eq!(targets["release"], "Release build");
    }

    #[tokio::test]
    async fn test_relative_import_joins_project_path() {
        let dir = tempfile::tempdir().unwrap();
        let project = dir.path();
        tokio::fs::create_dir_all(project.join("libs")).await.unwrap();

        write(
            &project.join("build.xml"),
            r#"<project><import file="libs/common.xml"/></project>"#,
        )
        .await;
        write(
            &project.join("libs/common.xml"),
            r#"<project><target name="lint"/></project>"#,
        )
        .await;

        let targets = resolve_targets(&project.join("build.xml"), Path::new("/sdk"), project)
            .await
            .unwrap();
        assert!(targets.contains_key("lint"));
    }

    #[tokio::test]
    async fn test_missing_import_is_silent() {
        let dir = tempfile::tempdir().unwrap();
        let project = dir.path();

        write(
            &project.join("build.xml"),
            r#"<project>
                <target name="debug"/>
                <import file="custom_rules.xml"/>
            </project>"#,
        )
        .await;

        let targets = resolve_targets(&project.join("build.xml"), Path::new("/sdk"), project)
            .await
            .unwrap();
        assert_eq!(targets.len(), 1);
    }

    #[tokio::test]
    async fn test_discovery_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let project = dir.path();

        write(
            &project.join("build.xml"),
            r#"<project>
                <target name="debug" description="d"/>
                <target name="clean" description="c"/>
                <import file="base.xml"/>
            </project>"#,
        )
        .await;
        write(
            &project.join("base.xml"),
            r#"<project><target name="release" description="r"/></project>"#,
        )
        .await;

        let root = project.join("build.xml");
        let first = resolve_targets(&root, Path::new("/sdk"), project).await.unwrap();
        let second = resolve_targets(&root, Path::new("/sdk"), project).await.unwrap();

        let first_order: Vec<_> = first.iter().collect();
        let second_order: Vec<_> = second.iter().collect();
        assert_eq!(first_order, second_order);
        assert_eq!(
            first.keys().collect::<Vec<_>>(),
            vec!["debug", "clean", "release"]
        );
    }

    #[tokio::test]
    async fn test_cyclic_import_detected() {
        let dir = tempfile::tempdir().unwrap();
        let project = dir.path();

        write(
            &project.join("a.xml"),
            r#"<project><target name="a"/><import file="b.xml"/></project>"#,
        )
        .await;
        write(
            &project.join("b.xml"),
            r#"<project><target name="b"/><import file="a.xml"/></project>"#,
        )
        .await;

        let err = resolve_targets(&project.join("a.xml"), Path::new("/sdk"), project)
            .await
            .unwrap_err();
        assert!(matches!(err, BuildError::CyclicImport(_)));
    }

    #[tokio::test]
    async fn test_diamond_import_is_not_a_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let project = dir.path();

        write(
            &project.join("root.xml"),
            r#"<project>
                <import file="left.xml"/>
                <import file="right.xml"/>
            </project>"#,
        )
        .await;
        write(
            &project.join("left.xml"),
            r#"<project><import file="shared.xml"/></project>"#,
        )
        .await;
        write(
            &project.join("right.xml"),
            r#"<project><import file="shared.xml"/></project>"#,
        )
        .await;
        write(
            &project.join("shared.xml"),
            r#"<project><target name="shared" description="common rules"/></project>"#,
        )
        .await;

        let targets = resolve_targets(&project.join("root.xml"), Path::new("/sdk"), project)
            .await
            .unwrap();
        assert_eq!(targets["shared"], "common rules");
    }
}
