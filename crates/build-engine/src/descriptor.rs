//! Build Descriptor Parsing
//!
//! Reads a single build.xml: the targets it declares directly and the import
//! references it carries. Import resolution happens in the resolver, not
//! here. Descriptors are re-read from disk on every discovery run.

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use regex::Regex;
use tracing::warn;

use crate::BuildError;

/// Longest description carried into the target list.
const DESCRIPTION_MAX: usize = 100;

/// Targets whose names reference unresolved ANT variables cannot be invoked
/// without a property-resolution system, so they are skipped.
static ANT_VAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$\{.*\}").expect("valid regex"));

/// One parsed build.xml
#[derive(Debug, Clone)]
pub struct BuildDescriptor {
    /// Path the descriptor was read from.
    pub path: PathBuf,
    /// Directly declared `(name, description)` pairs, in document order.
    /// Private (`-` prefixed) and variable-named targets are already
    /// filtered out.
    pub targets: Vec<(String, String)>,
    /// `file` attributes of import elements, verbatim, in document order.
    pub imports: Vec<String>,
}

impl BuildDescriptor {
    /// Load and parse the descriptor at `path`.
    ///
    /// Fails with [`BuildError::DescriptorNotFound`] when the path does not
    /// reference an existing file; malformed XML propagates as
    /// [`BuildError::Xml`].
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, BuildError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(BuildError::DescriptorNotFound(path.to_path_buf()));
        }
        let contents = tokio::fs::read_to_string(path).await?;
        Self::parse(path, &contents)
    }

    /// Parse descriptor contents.
    pub fn parse(path: &Path, xml: &str) -> Result<Self, BuildError> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        let mut targets = Vec::new();
        let mut imports = Vec::new();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                    b"target" => {
                        let Some(name) = local_attr(e, "name") else {
                            warn!("target without a name in {:?}, skipping", path);
                            continue;
                        };
                        if ANT_VAR.is_match(&name) {
                            // needs property resolution we don't do
                            continue;
                        }
                        if name.starts_with('-') {
                            continue;
                        }
                        let description = local_attr(e, "description")
                            .unwrap_or_default()
                            .chars()
                            .take(DESCRIPTION_MAX)
                            .collect();
                        targets.push((name, description));
                    }
                    b"import" => {
                        if let Some(file) = local_attr(e, "file") {
                            imports.push(file);
                        }
                    }
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(BuildError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(Self {
            path: path.to_path_buf(),
            targets,
            imports,
        })
    }

    /// ANT project name from the root element's `name` attribute. Used to
    /// derive the built artifact name (`<name>-<target>.apk`).
    pub async fn project_name(path: impl AsRef<Path>) -> Result<Option<String>, BuildError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(BuildError::DescriptorNotFound(path.to_path_buf()));
        }
        let contents = tokio::fs::read_to_string(path).await?;

        let mut reader = Reader::from_str(&contents);
        reader.trim_text(true);
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                    return Ok(local_attr(e, "name"));
                }
                Ok(Event::Eof) => return Ok(None),
                Err(e) => return Err(BuildError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }
    }
}

/// Get an attribute value without regard to namespace.
fn local_attr(e: &BytesStart, name: &str) -> Option<String> {
    for attr in e.attributes().filter_map(|a| a.ok()) {
        let key = std::str::from_utf8(attr.key.as_ref()).ok()?;
        let local = key.rsplit(':').next().unwrap_or(key);
        if local == name {
            return std::str::from_utf8(&attr.value).ok().map(|s| s.to_string());
        }
    }
    None
}
