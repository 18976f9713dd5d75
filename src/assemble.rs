//! Document assembly: content node → MDX text.
//!
//! ```text
//! node ──resolve(body_field)──▶ body ──extract()──▶ rewritten body + URLs
//!   └──resolve(metadata_field)──▶ map ──+ URLs──▶ YAML front-matter
//!
//! ---                       ┐
//! title: T                  │ front-matter (only with a metadata map)
//! markdownImageList:        │
//! - http://x/1.png          │
//! ---                       ┘
//!
//! import { GatsbyImage, getImage } from "gatsby-plugin-image"   (only with embeds)
//!
//! <GatsbyImage ... /> text  ← body
//! ```
//!
//! The three parts are always joined with a blank line between them, even
//! when a part is empty, so the layout of a document does not depend on
//! which parts are present. Assembly is a pure function of the node and its
//! type config: the same inputs always produce byte-identical output.
//!
//! ## Dropped image URLs
//!
//! Collected URLs only reach the page through the front-matter. When a type
//! has no `metadata_field`, or it does not resolve to a map, the whole
//! front-matter block is omitted and the URLs go with it, even though the
//! images in the body were rewritten.

use crate::config::TypeConfig;
use crate::extract::{self, EMBED_COMPONENT, ExtractOptions};
use crate::resolve::body_text;
use crate::types::{ContentNode, FieldValue};
use indexmap::IndexMap;
use thiserror::Error;

/// Statement importing the embed component and its data accessor.
pub const EMBED_IMPORT: &str = r#"import { GatsbyImage, getImage } from "gatsby-plugin-image""#;

/// Prefixes that show the body already imports the embed component.
const EXISTING_IMPORTS: [&str; 2] = [
    "import { GatsbyImage, getImage",
    "import { getImage, GatsbyImage",
];

/// File extension of generated documents.
pub const MDX_EXTENSION: &str = ".mdx";

#[derive(Error, Debug)]
pub enum AssembleError {
    #[error("Front-matter serialization failed for node {node_id}: {source}")]
    FrontMatter {
        node_id: String,
        source: serde_yaml::Error,
    },
}

/// A generated document, ready to be written out.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledDocument {
    pub text: String,
    /// URLs of the rewritten images, in placeholder index order.
    pub image_urls: Vec<String>,
    /// Whether the URLs made it into the front-matter.
    pub has_front_matter: bool,
}

/// Request to persist a document as a file artifact of its source node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRequest {
    pub buffer: Vec<u8>,
    pub extension: &'static str,
    pub parent_id: String,
}

impl FileRequest {
    pub fn from_document(document: &AssembledDocument, parent_id: &str) -> Self {
        Self {
            buffer: document.text.as_bytes().to_vec(),
            extension: MDX_EXTENSION,
            parent_id: parent_id.to_string(),
        }
    }
}

/// Serialize `metadata` as a `---` delimited YAML block.
pub fn front_matter(metadata: &IndexMap<String, FieldValue>) -> Result<String, serde_yaml::Error> {
    let yaml = serde_yaml::to_string(metadata)?;
    Ok(format!("---\n{yaml}---\n"))
}

/// Whether `body` needs the embed import prepended.
fn needs_embed_import(body: &str) -> bool {
    body.contains(&format!("<{EMBED_COMPONENT}"))
        && !EXISTING_IMPORTS.iter().any(|import| body.contains(import))
}

/// Assemble the document for `node`.
///
/// Returns `Ok(None)` when there is nothing to write: no front-matter, no
/// import and an empty body.
pub fn assemble(
    node: &ContentNode,
    config: &TypeConfig,
    image_list_key: &str,
) -> Result<Option<AssembledDocument>, AssembleError> {
    let body = node
        .resolve(&config.body_field)
        .and_then(body_text)
        .unwrap_or_default();

    let (body, image_urls) = if config.preprocess_images && !body.is_empty() {
        let options = ExtractOptions {
            image_list_key,
            class_name: config.class_name(),
        };
        let extracted = extract::extract(&body, &options);
        (extracted.body, extracted.urls)
    } else {
        (body, Vec::new())
    };

    let metadata = config
        .metadata_field
        .as_ref()
        .and_then(|path| node.resolve(path))
        .and_then(FieldValue::as_map);

    let front = match metadata {
        Some(map) => {
            let mut merged = map.clone();
            merged.insert(image_list_key.to_string(), image_urls.clone().into());
            front_matter(&merged).map_err(|source| AssembleError::FrontMatter {
                node_id: node.id.clone(),
                source,
            })?
        }
        None => String::new(),
    };

    let import = if config.preprocess_images && needs_embed_import(&body) {
        EMBED_IMPORT
    } else {
        ""
    };

    let text = format!("{front}\n\n{import}\n\n{body}");
    if text.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(AssembledDocument {
        text,
        image_urls,
        has_front_matter: !front.is_empty(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_IMAGE_LIST_KEY as KEY;
    use crate::test_helpers::*;

    fn post_config() -> TypeConfig {
        TypeConfig::new("body").with_metadata_field("meta")
    }

    fn front_matter_of(text: &str) -> serde_yaml::Value {
        let rest = text.strip_prefix("---\n").expect("front-matter start");
        let end = rest.find("---\n").expect("front-matter end");
        serde_yaml::from_str(&rest[..end]).unwrap()
    }

    // =========================================================================
    // Full documents
    // =========================================================================

    #[test]
    fn image_post_gets_front_matter_import_and_embed() {
        let doc = assemble(&sample_post(), &post_config(), KEY).unwrap().unwrap();

        let fm = front_matter_of(&doc.text);
        assert_eq!(fm["title"].as_str(), Some("T"));
        assert_eq!(
            fm[KEY].as_sequence().unwrap(),
            &vec![serde_yaml::Value::from("http://x/1.png")]
        );
        assert_eq!(doc.text.matches(EMBED_IMPORT).count(), 1);
        assert_eq!(doc.text.matches("<GatsbyImage").count(), 1);
        assert!(doc.text.contains("markdownImageList[0]"));
        assert!(doc.text.ends_with("/> text\n"));
        assert_eq!(doc.image_urls, vec!["http://x/1.png"]);
        assert!(doc.has_front_matter);
    }

    #[test]
    fn layout_is_front_matter_import_body() {
        let doc = assemble(&sample_post(), &post_config(), KEY).unwrap().unwrap();
        let (front, rest) = doc.text.split_once("---\n\n\n").unwrap();
        assert!(front.starts_with("---\ntitle: T\n"));
        let expected_rest = format!("{EMBED_IMPORT}\n\n<GatsbyImage");
        assert!(rest.starts_with(&expected_rest), "{rest}");
    }

    #[test]
    fn assembly_is_deterministic() {
        let node = sample_post();
        let config = post_config().with_embed_class_name("wide");
        let first = assemble(&node, &config, KEY).unwrap();
        let second = assemble(&node, &config, KEY).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn preprocessing_disabled_keeps_markdown_image() {
        let config = post_config().with_preprocess_images(false);
        let doc = assemble(&sample_post(), &config, KEY).unwrap().unwrap();

        assert!(doc.text.ends_with("\n\n\n\n![alt1](http://x/1.png) text"));
        assert!(!doc.text.contains("import"));
        assert!(!doc.text.contains("<GatsbyImage"));
        let fm = front_matter_of(&doc.text);
        assert!(fm[KEY].as_sequence().unwrap().is_empty());
        assert!(doc.image_urls.is_empty());
    }

    #[test]
    fn without_metadata_field_no_front_matter() {
        let config = TypeConfig::new("body");
        let doc = assemble(&sample_post(), &config, KEY).unwrap().unwrap();

        assert!(doc.text.starts_with("\n\nimport { GatsbyImage"));
        assert!(!doc.text.contains("---"));
        assert!(!doc.text.contains("http://x/1.png"));
        assert!(doc.text.contains("<GatsbyImage"));
        assert!(!doc.has_front_matter);
        assert_eq!(doc.image_urls, vec!["http://x/1.png"]);
    }

    // =========================================================================
    // Metadata handling
    // =========================================================================

    #[test]
    fn scalar_metadata_is_ignored() {
        let node = node_from_json(r#"{"id": "n1", "type": "Post", "fields": {"body": "hi", "meta": "flat"}}"#);
        let doc = assemble(&node, &post_config(), KEY).unwrap().unwrap();
        assert_eq!(doc.text, "\n\n\n\nhi\n");
    }

    #[test]
    fn image_list_key_overwrites_existing_value_in_place() {
        let node = node_from_json(
            r#"{"id": "n1", "type": "Post", "fields": {
                "body": "![a](http://x/a.png)",
                "meta": {"markdownImageList": ["stale"], "title": "T"}
            }}"#,
        );
        let doc = assemble(&node, &post_config(), KEY).unwrap().unwrap();
        let fm = front_matter_of(&doc.text);
        let keys: Vec<&str> = fm
            .as_mapping()
            .unwrap()
            .keys()
            .filter_map(|k| k.as_str())
            .collect();
        assert_eq!(keys, [KEY, "title"]);
        assert_eq!(
            fm[KEY].as_sequence().unwrap(),
            &vec![serde_yaml::Value::from("http://x/a.png")]
        );
    }

    #[test]
    fn custom_image_list_key_is_used() {
        let doc = assemble(&sample_post(), &post_config(), "imageList")
            .unwrap()
            .unwrap();
        let fm = front_matter_of(&doc.text);
        assert!(fm["imageList"].is_sequence());
        assert!(fm.get(KEY).is_none());
        assert!(doc.text.contains("props.pageContext.imageList[0]"));
    }

    #[test]
    fn nested_metadata_keeps_source_order() {
        let node = node_from_json(
            r#"{"id": "n1", "type": "Post", "fields": {
                "body": "",
                "data": [{"meta": {"zeta": 1, "alpha": {"b": [true, null]}}}]
            }}"#,
        );
        let config = TypeConfig::new("body").with_metadata_field("data.meta");
        let doc = assemble(&node, &config, KEY).unwrap().unwrap();
        let fm = front_matter_of(&doc.text);
        let keys: Vec<&str> = fm
            .as_mapping()
            .unwrap()
            .keys()
            .filter_map(|k| k.as_str())
            .collect();
        assert_eq!(keys, ["zeta", "alpha", KEY]);
        assert_eq!(fm["zeta"].as_i64(), Some(1));
        assert_eq!(fm["alpha"]["b"][0].as_bool(), Some(true));
        assert!(fm["alpha"]["b"][1].is_null());
    }

    // =========================================================================
    // Body handling
    // =========================================================================

    #[test]
    fn missing_body_with_metadata_is_front_matter_only() {
        let node = node_from_json(r#"{"id": "n1", "type": "Post", "fields": {"meta": {"title": "T"}}}"#);
        let doc = assemble(&node, &post_config(), KEY).unwrap().unwrap();
        assert_eq!(doc.text, "---\ntitle: T\nmarkdownImageList: []\n---\n\n\n\n\n");
    }

    #[test]
    fn nothing_to_write_is_none() {
        let node = node_from_json(r#"{"id": "n1", "type": "Post", "fields": {"body": "  \n"}}"#);
        assert_eq!(assemble(&node, &TypeConfig::new("body"), KEY).unwrap(), None);

        let empty = node_from_json(r#"{"id": "n2", "type": "Post"}"#);
        assert_eq!(assemble(&empty, &TypeConfig::new("body"), KEY).unwrap(), None);
    }

    #[test]
    fn existing_import_is_not_duplicated() {
        for import in [
            "import { GatsbyImage, getImage } from \"gatsby-plugin-image\"",
            "import { getImage, GatsbyImage } from \"gatsby-plugin-image\"",
        ] {
            let body = format!("{import}\n\n![a](http://x/a.png)\n");
            let node = ContentNode::new("n1", "Post").with_field("body", body.as_str().into());
            let doc = assemble(&node, &TypeConfig::new("body"), KEY).unwrap().unwrap();
            assert_eq!(doc.text.matches("import {").count(), 1, "{}", doc.text);
        }
    }

    #[test]
    fn body_without_images_gets_no_import() {
        let node = ContentNode::new("n1", "Post").with_field("body", "# Plain".into());
        let doc = assemble(&node, &TypeConfig::new("body"), KEY).unwrap().unwrap();
        assert_eq!(doc.text, "\n\n\n\n# Plain\n");
    }

    #[test]
    fn numeric_body_is_rendered() {
        let node = node_from_json(r#"{"id": "n1", "type": "Post", "fields": {"body": 42}}"#);
        let doc = assemble(&node, &TypeConfig::new("body"), KEY).unwrap().unwrap();
        assert_eq!(doc.text, "\n\n\n\n42\n");
    }

    // =========================================================================
    // FileRequest
    // =========================================================================

    #[test]
    fn file_request_carries_utf8_bytes_and_parent() {
        let doc = assemble(&sample_post(), &post_config(), KEY).unwrap().unwrap();
        let request = FileRequest::from_document(&doc, "n1");
        assert_eq!(request.buffer, doc.text.as_bytes());
        assert_eq!(request.extension, ".mdx");
        assert_eq!(request.parent_id, "n1");
    }
}
