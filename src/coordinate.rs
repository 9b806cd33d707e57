//! Maven2 coordinate resolution
//!
//! Derives group/artifact/version/classifier/extension from the position of a
//! file inside a maven2 directory layout and regenerates the canonical
//! repository-relative path. Pure string work, no I/O.
//!
//! The directory layout is authoritative for group and version: the last two
//! directory segments under the root are the artifact folder and the version
//! folder, everything before them is the dot-joined group id. The artifact id
//! itself comes from the filename, which must follow the
//! `<artifactId>-<version>[-<classifier>]` grammar.

use crate::error::{Error, Result};
use crate::walker::root_relative_segments;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

/// Grammar for `<artifactId>-<version>[-<classifier>]` base names. The
/// artifact id match is non-greedy, so the first dash-delimited token starting
/// with a digit is taken as the version; one optional trailing token is the
/// classifier candidate.
#[allow(clippy::expect_used)]
static FILE_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.+?)-(\d[\w.-]*?)(?:-([\w.-]+))?$").expect("filename grammar is a valid regex")
});

/// Maven coordinate: GAV plus optional classifier and file extension
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MavenCoordinate {
    /// Dot-separated group id
    pub group_id: String,
    /// Artifact id
    pub artifact_id: String,
    /// Version, as declared by the version folder
    pub version: String,
    /// Optional qualifier distinguishing artifacts with the same GAV
    pub classifier: Option<String>,
    /// File extension including its leading dot; empty when the filename has none
    pub extension: String,
}

impl MavenCoordinate {
    /// Derive a coordinate from root-relative directory segments and a filename.
    ///
    /// `segments` are the directories between the import root and the file:
    /// group fragments, then the artifact folder, then the version folder. At
    /// least three are required.
    ///
    /// # Errors
    ///
    /// [`Error::MalformedLayout`] when the layout is too shallow,
    /// [`Error::UnparsableFileName`] when the filename does not match the
    /// artifact-version grammar.
    pub fn resolve(segments: &[&str], file_name: &str) -> Result<Self> {
        if segments.len() < 3 {
            return Err(Error::MalformedLayout {
                path: segments.join("/"),
            });
        }

        let group_id = segments[..segments.len() - 2].join(".");
        let path_version = segments[segments.len() - 1];
        let (artifact_id, version, classifier, extension) =
            parse_file_name(file_name, path_version)?;

        Ok(Self {
            group_id,
            artifact_id,
            version,
            classifier,
            extension,
        })
    }

    /// Derive a coordinate for a file located under a maven2 layout root.
    pub fn for_file(root: &Path, file: &Path) -> Result<Self> {
        let segments = root_relative_segments(root, file)?;
        let (file_name, dirs) = segments.split_last().ok_or_else(|| Error::MalformedLayout {
            path: String::new(),
        })?;
        let dirs: Vec<&str> = dirs.iter().map(String::as_str).collect();
        Self::resolve(&dirs, file_name)
    }

    /// Canonical repository-relative path for this coordinate.
    ///
    /// `group/with/slashes/artifact/version/artifact-version[-classifier]ext`.
    /// Deterministic: upload targeting and existence checks rely on getting
    /// byte-identical output for the same coordinate.
    pub fn repository_path(&self) -> String {
        let base = format!(
            "{}/{}/{}",
            self.group_id.replace('.', "/"),
            self.artifact_id,
            self.version
        );
        match &self.classifier {
            Some(classifier) => format!(
                "{base}/{}-{}-{}{}",
                self.artifact_id, self.version, classifier, self.extension
            ),
            None => format!("{base}/{}-{}{}", self.artifact_id, self.version, self.extension),
        }
    }
}

/// Split a filename into artifact id, version, classifier and extension.
///
/// The version folder is authoritative: when the filename's version token
/// disagrees with it, the token is reinterpreted as the classifier (covers
/// snapshot/qualifier suffixes that don't equal the declared folder version).
/// When they agree, the optional trailing token is the classifier.
fn parse_file_name(
    file_name: &str,
    path_version: &str,
) -> Result<(String, String, Option<String>, String)> {
    let (base_name, extension) = match file_name.rfind('.') {
        Some(idx) => (&file_name[..idx], &file_name[idx..]),
        None => (file_name, ""),
    };

    let captures = FILE_NAME_RE
        .captures(base_name)
        .ok_or_else(|| Error::UnparsableFileName {
            file_name: file_name.to_string(),
        })?;

    let artifact_id = captures[1].to_string();
    let version_token = captures[2].to_string();
    let trailing = captures.get(3).map(|m| m.as_str().to_string());

    let (version, classifier) = if version_token == path_version {
        (version_token, trailing)
    } else {
        (path_version.to_string(), Some(version_token))
    };

    Ok((artifact_id, version, classifier, extension.to_string()))
}
