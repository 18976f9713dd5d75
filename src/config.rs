//! Plugin configuration module.
//!
//! Handles loading, validating, and merging `mdx-remote.toml`. The file maps
//! content type names to the fields that hold their markdown body and their
//! front-matter, plus a handful of plugin-wide settings.
//!
//! ## Configuration Options
//!
//! ```toml
//! # Plugin-wide settings - defaults shown below
//!
//! image_list_key = "markdownImageList"  # Front-matter key for collected image URLs
//! mdx_node_type = "Mdx"                 # Node type linked back to its source record
//! # remote_image_url_field = "heroImages"  # Extra front-matter URL list to resolve
//!
//! [node_types.BlogPost]
//! body_field = "content.body"           # Dotted path to the markdown body (required)
//! metadata_field = "meta"               # Dotted path to the front-matter map
//! preprocess_images = true              # Rewrite inline images into embeds
//! embed_class_name = "post-image"       # className on every generated embed
//! ```
//!
//! ## Required Mapping
//!
//! `node_types` has no default. A config without at least one node type is
//! rejected at load time: without it the plugin would silently do nothing
//! for every node, which is never what a build wants.
//!
//! Unknown keys are rejected to catch typos early.

use crate::types::FieldPath;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Front-matter key the collected image URLs are stored under.
pub const DEFAULT_IMAGE_LIST_KEY: &str = "markdownImageList";

/// Node type of the MDX artifacts the host creates from generated files.
pub const DEFAULT_MDX_NODE_TYPE: &str = "Mdx";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Plugin configuration loaded from `mdx-remote.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PluginConfig {
    /// Reserved front-matter key for the URL list of rewritten images.
    pub image_list_key: String,
    /// Additional front-matter key holding author-supplied image URLs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_image_url_field: Option<String>,
    /// Node type whose instances get linked to their grandparent.
    pub mdx_node_type: String,
    /// Content type name → how to turn it into a document.
    pub node_types: IndexMap<String, TypeConfig>,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            image_list_key: DEFAULT_IMAGE_LIST_KEY.to_string(),
            remote_image_url_field: None,
            mdx_node_type: DEFAULT_MDX_NODE_TYPE.to_string(),
            node_types: IndexMap::new(),
        }
    }
}

impl PluginConfig {
    /// Validate the configuration. Any failure here is fatal for the build.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.node_types.is_empty() {
            return Err(ConfigError::Validation(
                "node_types must map at least one content type".into(),
            ));
        }
        if self.image_list_key.trim().is_empty() {
            return Err(ConfigError::Validation(
                "image_list_key must not be empty".into(),
            ));
        }
        if let Some(field) = &self.remote_image_url_field
            && field.trim().is_empty()
        {
            return Err(ConfigError::Validation(
                "remote_image_url_field must not be empty when set".into(),
            ));
        }
        for (name, type_config) in &self.node_types {
            type_config
                .validate()
                .map_err(|msg| ConfigError::Validation(format!("node_types.{name}: {msg}")))?;
        }
        Ok(())
    }

    /// Configuration for a content type, if that type is handled.
    pub fn type_config(&self, node_type: &str) -> Option<&TypeConfig> {
        self.node_types.get(node_type)
    }
}

/// Per-content-type settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeConfig {
    /// Dotted path to the markdown body.
    pub body_field: FieldPath,
    /// Dotted path to the map serialized as front-matter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata_field: Option<FieldPath>,
    /// Rewrite inline images into embed placeholders.
    #[serde(default = "default_preprocess_images")]
    pub preprocess_images: bool,
    /// `className` added to every generated embed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embed_class_name: Option<String>,
}

fn default_preprocess_images() -> bool {
    true
}

impl TypeConfig {
    pub fn new(body_field: &str) -> Self {
        Self {
            body_field: FieldPath::parse(body_field),
            metadata_field: None,
            preprocess_images: default_preprocess_images(),
            embed_class_name: None,
        }
    }

    pub fn with_metadata_field(mut self, metadata_field: &str) -> Self {
        self.metadata_field = Some(FieldPath::parse(metadata_field));
        self
    }

    pub fn with_preprocess_images(mut self, enabled: bool) -> Self {
        self.preprocess_images = enabled;
        self
    }

    pub fn with_embed_class_name(mut self, class_name: &str) -> Self {
        self.embed_class_name = Some(class_name.to_string());
        self
    }

    /// Class name to apply, ignoring blank values.
    pub fn class_name(&self) -> Option<&str> {
        self.embed_class_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
    }

    fn validate(&self) -> Result<(), String> {
        if self.body_field.to_string().is_empty() {
            return Err("body_field must not be empty".into());
        }
        if let Some(metadata_field) = &self.metadata_field
            && metadata_field.to_string().is_empty()
        {
            return Err("metadata_field must not be empty when set".into());
        }
        Ok(())
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// The base layer user config is merged on top of.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(PluginConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Parse config text, merge it over the stock defaults, and validate.
pub fn parse_config(content: &str) -> Result<PluginConfig, ConfigError> {
    let overlay: toml::Value = toml::from_str(content)?;
    let merged = merge_toml(stock_defaults_value()?, overlay);
    let config: PluginConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load and validate the config file at `path`.
///
/// A missing file is an error: the node type mapping is mandatory.
pub fn load_config(path: &Path) -> Result<PluginConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Returns a fully-commented stock `mdx-remote.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# mdx-remote Configuration
# ========================
# Turns content records into MDX documents. Values shown are the defaults
# unless marked as an example.
#
# Unknown keys will cause an error.

# Front-matter key under which the URLs of rewritten inline images are
# stored. Generated embeds read `props.pageContext.<key>[i]`.
image_list_key = "markdownImageList"

# Node type of the MDX artifacts created from generated files. Each one is
# linked back to the record it was generated from.
mdx_node_type = "Mdx"

# Optional extra front-matter key holding image URLs supplied by authors.
# Resolved to downloaded files the same way as image_list_key.
# remote_image_url_field = "heroImages"

# ---------------------------------------------------------------------------
# Content types (at least one is required)
# ---------------------------------------------------------------------------
# One table per content type name, as reported by the content source.
[node_types.BlogPost]
# Dotted path to the markdown body. Lists along the path resolve to their
# first element.
body_field = "content.body"

# Dotted path to the map that becomes the document's front-matter.
# Without it no front-matter is written and image URLs are not exposed.
metadata_field = "meta"

# Replace inline markdown images with lazily resolved image embeds.
preprocess_images = true

# Optional className added to every generated embed.
# embed_class_name = "post-image"
"##
}
