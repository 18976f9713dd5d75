//! Filesystem-backed file materializer.
//!
//! Writes generated documents below a root directory, one subdirectory per
//! source node:
//!
//! ```text
//! mdx/
//! ├── post-1-<id hash>/      # slug + first 8 hex digits of SHA-256(id)
//! │   └── 3f5a…c2.mdx        # SHA-256 of the document text
//! └── post-2-<id hash>/
//!     └── 91b0…7e.mdx
//! ```
//!
//! The id hash keeps directories distinct when two ids slug the same way
//! (`post 1` and `post/1`), since each directory only ever holds the current
//! document of a single node.
//!
//! File names are **content-addressed**: the same document always lands at
//! the same path, so re-running a build rewrites identical files in place
//! and downstream caches keyed on paths stay valid. A changed document gets
//! a new name; the stale file of a node is removed when its replacement is
//! written.

use crate::assemble::FileRequest;
use crate::plugin::{FileArtifact, FileMaterializer};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MaterializeError {
    #[error("IO error writing {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

const MAX_SLUG_LEN: usize = 80;
const ID_HASH_LEN: usize = 8;

/// SHA-256 of `bytes`, returned as a hex string.
pub fn content_hash(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Turn a node id into a safe directory name.
///
/// - Replaces characters other than ASCII alphanumerics, `-` and `_` with dashes
/// - Collapses consecutive dashes into one
/// - Strips leading and trailing dashes
/// - Truncates to `MAX_SLUG_LEN` characters
/// - Falls back to `node` when nothing is left
pub fn node_slug(id: &str) -> String {
    let mut slug = String::with_capacity(id.len());
    let mut prev_dash = false;
    for c in id.chars() {
        let c = if c.is_ascii_alphanumeric() || c == '_' {
            c
        } else {
            '-'
        };
        if c == '-' {
            if !prev_dash {
                slug.push('-');
            }
            prev_dash = true;
        } else {
            slug.push(c);
            prev_dash = false;
        }
    }

    let trimmed: String = slug.trim_matches('-').chars().take(MAX_SLUG_LEN).collect();
    let trimmed = trimmed.trim_end_matches('-');
    if trimmed.is_empty() {
        "node".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Directory name for the documents of node `id`: its slug plus a short
/// hash of the full id.
pub fn node_dir_name(id: &str) -> String {
    let hash = content_hash(id.as_bytes());
    format!("{}-{}", node_slug(id), &hash[..ID_HASH_LEN])
}

/// Writes documents as files under a root directory.
#[derive(Debug, Clone)]
pub struct DirectoryMaterializer {
    root: PathBuf,
}

impl DirectoryMaterializer {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> MaterializeError + '_ {
    move |source| MaterializeError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Remove files with `extension` in `dir` other than `keep`.
fn remove_stale(dir: &Path, keep: &Path, extension: &str) -> Result<(), MaterializeError> {
    for entry in fs::read_dir(dir).map_err(io_error(dir))? {
        let path = entry.map_err(io_error(dir))?.path();
        let is_document = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.ends_with(extension));
        if is_document && path != keep {
            fs::remove_file(&path).map_err(io_error(&path))?;
        }
    }
    Ok(())
}

impl FileMaterializer for DirectoryMaterializer {
    type Error = MaterializeError;

    fn create_file(&self, request: FileRequest) -> Result<FileArtifact, Self::Error> {
        let hash = content_hash(&request.buffer);
        let dir = self.root.join(node_dir_name(&request.parent_id));
        let path = dir.join(format!("{hash}{}", request.extension));

        fs::create_dir_all(&dir).map_err(io_error(&dir))?;
        remove_stale(&dir, &path, request.extension)?;
        fs::write(&path, &request.buffer).map_err(io_error(&path))?;

        Ok(FileArtifact {
            id: format!("{}:{hash}", request.parent_id),
            parent_id: request.parent_id,
            path,
        })
    }
}
