//! Shared test utilities for the mdx-remote test suite.
//!
//! Provides node builders and in-memory stand-ins for the host interfaces
//! (`NodeGraph`, `FileMaterializer`, `RemoteFileFetcher`) so plugin logic
//! can be exercised without a content graph or network.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let mut graph = MemoryGraph::default();
//! graph.insert(sample_post());
//! let mut store = MemoryStore::default();
//! ```

use std::cell::RefCell;
use std::collections::HashMap;

use crate::assemble::FileRequest;
use crate::plugin::{FileArtifact, FileMaterializer, NodeGraph, RemoteFileFetcher};
use crate::types::ContentNode;

// =========================================================================
// Node builders
// =========================================================================

/// Parse a node from JSON. Panics on malformed input.
pub fn node_from_json(json: &str) -> ContentNode {
    serde_json::from_str(json).unwrap_or_else(|e| panic!("bad node json: {e}\n{json}"))
}

/// A blog post with one inline image and a `meta.title`.
pub fn sample_post() -> ContentNode {
    node_from_json(
        r#"{
            "id": "n1",
            "type": "Post",
            "fields": {
                "body": "![alt1](http://x/1.png) text",
                "meta": {"title": "T"}
            }
        }"#,
    )
}

// =========================================================================
// In-memory host interfaces
// =========================================================================

/// Content graph backed by a map, recording every link it is asked to make.
#[derive(Default)]
pub struct MemoryGraph {
    pub nodes: HashMap<String, ContentNode>,
    pub links: RefCell<Vec<(String, String)>>,
}

impl MemoryGraph {
    pub fn insert(&mut self, node: ContentNode) {
        self.nodes.insert(node.id.clone(), node);
    }
}

impl NodeGraph for MemoryGraph {
    fn get_node(&self, id: &str) -> Option<ContentNode> {
        self.nodes.get(id).cloned()
    }

    fn create_parent_child_link(&self, parent_id: &str, child_id: &str) {
        self.links
            .borrow_mut()
            .push((parent_id.to_string(), child_id.to_string()));
    }
}

/// File store that keeps every request in memory.
#[derive(Default)]
pub struct MemoryStore {
    pub requests: RefCell<Vec<FileRequest>>,
}

impl MemoryStore {
    /// Text of the `n`th stored file.
    pub fn text(&self, n: usize) -> String {
        String::from_utf8(self.requests.borrow()[n].buffer.clone()).unwrap()
    }
}

impl FileMaterializer for MemoryStore {
    type Error = std::convert::Infallible;

    fn create_file(&self, request: FileRequest) -> Result<FileArtifact, Self::Error> {
        let mut requests = self.requests.borrow_mut();
        let artifact = FileArtifact {
            id: format!("file-{}", requests.len()),
            parent_id: request.parent_id.clone(),
            path: format!("memory/{}{}", requests.len(), request.extension).into(),
        };
        requests.push(request);
        Ok(artifact)
    }
}

/// Fetcher that "downloads" a URL by naming a file after it. URLs
/// containing `fail` are rejected.
#[derive(Default)]
pub struct FakeFetcher {
    pub fetched: RefCell<Vec<String>>,
}

impl RemoteFileFetcher for FakeFetcher {
    type Error = String;

    fn fetch(&self, url: &str) -> Result<FileArtifact, Self::Error> {
        self.fetched.borrow_mut().push(url.to_string());
        if url.contains("fail") {
            return Err(format!("cannot fetch {url}"));
        }
        Ok(FileArtifact {
            id: format!("remote:{url}"),
            parent_id: String::new(),
            path: url.rsplit('/').next().unwrap_or(url).into(),
        })
    }
}
