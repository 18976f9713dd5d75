//! Host integration: the hooks a content-graph build tool calls.
//!
//! The core never owns the content graph, file storage, or downloads. Each
//! of those is a trait the host implements:
//!
//! | Trait | Host responsibility |
//! |-------|---------------------|
//! | [`NodeGraph`] | Look up nodes by id and record parent/child links |
//! | [`FileMaterializer`] | Persist a generated document as a file artifact |
//! | [`RemoteFileFetcher`] | Download one image URL into a file artifact |
//!
//! ## Node lifecycle
//!
//! [`Plugin::on_node_created`] is called for every node the host creates:
//!
//! 1. An MDX node (type [`PluginConfig::mdx_node_type`]) was produced from a
//!    generated file, which in turn belongs to a content record. The MDX node
//!    is linked to that record, its grandparent, so queries can reach the
//!    rendered document from the record directly.
//! 2. A node of a configured content type is assembled into a document,
//!    which is handed to the materializer as a `.mdx` file child of the node.
//!
//! ## Image list resolution
//!
//! Front-matter only carries image URLs. [`Plugin::resolve_image_list`] is
//! the field resolver that turns such a list into downloaded files, one
//! fetch per entry, in list order, so entry `i` still matches placeholder
//! `i` in the body.
//!
//! ## Progress events
//!
//! The plugin never prints. When given a channel it sends an
//! [`AssembleEvent`] for every node it handles; the CLI renders them with
//! [`crate::output::format_assemble_event`].

use crate::assemble::{self, AssembleError, AssembledDocument, FileRequest};
use crate::config::{ConfigError, PluginConfig};
use crate::types::{ContentNode, FieldValue};
use indexmap::IndexMap;
use rayon::prelude::*;
use std::path::PathBuf;
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PluginError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Assemble(#[from] AssembleError),
    #[error("Creating file for node {node_id} failed: {source}")]
    Materialize {
        node_id: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// A file node created by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileArtifact {
    pub id: String,
    pub parent_id: String,
    pub path: PathBuf,
}

/// Read access to the host's content graph, plus link creation.
pub trait NodeGraph {
    fn get_node(&self, id: &str) -> Option<ContentNode>;
    fn create_parent_child_link(&self, parent_id: &str, child_id: &str);
}

/// Persists generated documents.
pub trait FileMaterializer {
    type Error: std::error::Error + Send + Sync + 'static;

    fn create_file(&self, request: FileRequest) -> Result<FileArtifact, Self::Error>;
}

/// Downloads remote files. Retries are the implementor's concern.
pub trait RemoteFileFetcher {
    type Error;

    fn fetch(&self, url: &str) -> Result<FileArtifact, Self::Error>;
}

/// Progress reported while handling nodes.
#[derive(Debug, Clone, PartialEq)]
pub enum AssembleEvent {
    /// A document was written for a node.
    DocumentCreated {
        node_id: String,
        path: PathBuf,
        image_count: usize,
        has_front_matter: bool,
    },
    /// A configured node produced nothing worth writing.
    NodeSkipped { node_id: String },
    /// An MDX node was linked to the record it was generated from.
    LinkedToSource { node_id: String, source_id: String },
}

/// Outcome of assembling one node in a batch.
#[derive(Debug)]
pub struct NodeAssembly<'a> {
    pub node: &'a ContentNode,
    pub result: Result<Option<AssembledDocument>, AssembleError>,
}

/// The configured plugin. Cheap to share across threads.
#[derive(Debug)]
pub struct Plugin {
    config: PluginConfig,
    events: Option<Sender<AssembleEvent>>,
}

impl Plugin {
    /// Set up the plugin. Invalid configuration is fatal here rather than
    /// surfacing later, node by node.
    pub fn new(config: PluginConfig) -> Result<Self, PluginError> {
        config.validate()?;
        Ok(Self {
            config,
            events: None,
        })
    }

    /// Send progress events to `tx`.
    pub fn with_events(mut self, tx: Sender<AssembleEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    pub fn config(&self) -> &PluginConfig {
        &self.config
    }

    fn emit(&self, event: AssembleEvent) {
        if let Some(tx) = &self.events {
            // A closed receiver only means nobody is listening.
            let _ = tx.send(event);
        }
    }

    /// Handle a node the host just created.
    ///
    /// Returns the created file, if a document was generated.
    pub fn on_node_created(
        &self,
        node: &ContentNode,
        graph: &impl NodeGraph,
        materializer: &impl FileMaterializer,
    ) -> Result<Option<FileArtifact>, PluginError> {
        if node.node_type == self.config.mdx_node_type {
            self.link_to_source(node, graph);
        }

        let Some(type_config) = self.config.type_config(&node.node_type) else {
            return Ok(None);
        };
        let result = assemble::assemble(node, type_config, &self.config.image_list_key);
        self.write_assembly(NodeAssembly { node, result }, materializer)
    }

    /// Materialize an assembled node, or report it as skipped when it
    /// produced no document.
    pub fn write_assembly(
        &self,
        assembly: NodeAssembly<'_>,
        materializer: &impl FileMaterializer,
    ) -> Result<Option<FileArtifact>, PluginError> {
        match assembly.result? {
            Some(document) => self
                .materialize(assembly.node, &document, materializer)
                .map(Some),
            None => {
                self.emit(AssembleEvent::NodeSkipped {
                    node_id: assembly.node.id.clone(),
                });
                Ok(None)
            }
        }
    }

    /// Link an MDX node to its grandparent (node → file → record).
    ///
    /// Returns the grandparent's id. Any missing hop means there is nothing
    /// to link and is not an error.
    pub fn link_to_source(&self, node: &ContentNode, graph: &impl NodeGraph) -> Option<String> {
        let file = graph.get_node(node.parent.as_deref()?)?;
        let source = graph.get_node(file.parent.as_deref()?)?;
        graph.create_parent_child_link(&source.id, &node.id);
        self.emit(AssembleEvent::LinkedToSource {
            node_id: node.id.clone(),
            source_id: source.id.clone(),
        });
        Some(source.id)
    }

    /// Assemble every node of a configured type, in parallel.
    ///
    /// Results come back in input order. Nodes of other types are left out.
    pub fn assemble_all<'a>(&self, nodes: &'a [ContentNode]) -> Vec<NodeAssembly<'a>> {
        nodes
            .par_iter()
            .filter_map(|node| {
                let type_config = self.config.type_config(&node.node_type)?;
                Some(NodeAssembly {
                    node,
                    result: assemble::assemble(node, type_config, &self.config.image_list_key),
                })
            })
            .collect()
    }

    /// Hand `document` to the materializer as a `.mdx` child of `node`.
    pub fn materialize(
        &self,
        node: &ContentNode,
        document: &AssembledDocument,
        materializer: &impl FileMaterializer,
    ) -> Result<FileArtifact, PluginError> {
        let request = FileRequest::from_document(document, &node.id);
        let artifact =
            materializer
                .create_file(request)
                .map_err(|source| PluginError::Materialize {
                    node_id: node.id.clone(),
                    source: Box::new(source),
                })?;
        self.emit(AssembleEvent::DocumentCreated {
            node_id: node.id.clone(),
            path: artifact.path.clone(),
            image_count: document.image_urls.len(),
            has_front_matter: document.has_front_matter,
        });
        Ok(artifact)
    }

    /// Front-matter keys that hold resolvable image URL lists.
    pub fn image_list_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.config.image_list_key.as_str()];
        if let Some(extra) = &self.config.remote_image_url_field {
            fields.push(extra);
        }
        fields
    }

    /// Resolve the URL list under `field` into downloaded files.
    ///
    /// One fetch per entry, in list order. Unknown fields, missing values
    /// and non-list values resolve to an empty list; non-string entries
    /// are skipped.
    pub fn resolve_image_list<F: RemoteFileFetcher>(
        &self,
        front_matter: &IndexMap<String, FieldValue>,
        field: &str,
        fetcher: &F,
    ) -> Vec<Result<FileArtifact, F::Error>> {
        if !self.image_list_fields().contains(&field) {
            return Vec::new();
        }
        match front_matter.get(field) {
            Some(FieldValue::List(urls)) => urls
                .iter()
                .filter_map(FieldValue::as_str)
                .map(|url| fetcher.fetch(url))
                .collect(),
            _ => Vec::new(),
        }
    }
}
