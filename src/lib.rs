//! # mdx-remote
//!
//! Turns structured content records into MDX documents. A record pulled
//! from a headless CMS, a JSON file, or any other content source carries a
//! markdown body somewhere inside it and, usually, a map of metadata. This
//! crate finds both, rewrites the body's images into lazily resolved embeds,
//! and writes the result as a single `.mdx` document with YAML front-matter.
//!
//! # Architecture: Three-Stage Pipeline
//!
//! ```text
//! 1. Resolve   node + field path  →  body text, metadata map
//! 2. Extract   body               →  body with embeds + image URL list
//! 3. Assemble  metadata + URLs + body  →  front-matter / import / body
//! ```
//!
//! Each stage is a pure function of its inputs. Nothing is shared between
//! nodes, so the host may assemble any number of nodes concurrently; see
//! [`plugin::Plugin::assemble_all`].
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`types`] | Content records: `FieldValue`, `ContentNode`, `FieldPath` |
//! | [`resolve`] | Stage 1 — dotted-path lookup through maps and lists |
//! | [`extract`] | Stage 2 — inline image → embed placeholder rewriting |
//! | [`assemble`] | Stage 3 — front-matter, import statement, final document |
//! | [`config`] | `mdx-remote.toml` loading and validation |
//! | [`plugin`] | Host hooks: node created, grandparent links, image list resolution |
//! | [`materialize`] | Content-addressed `.mdx` files on disk |
//! | [`output`] | CLI output formatting of progress events |
//!
//! # Design Decisions
//!
//! ## Images Become Indices, Not URLs
//!
//! A rewritten image does not carry its URL. It carries an index into the
//! `markdownImageList` front-matter field, and the site build resolves that
//! list into downloaded, optimized image files. The page then picks entry
//! `i` for placeholder `i`. Downloads stay with the build tool, which can
//! cache and retry them, and the document itself stays a pure function of
//! its record.
//!
//! ## Splicing Over Re-Serializing
//!
//! The markdown parser is used to *find* images, never to re-print the
//! document. Each image's source range is replaced by its embed and every
//! other byte is copied through. Authors get back exactly the markdown they
//! wrote, and output does not shift when the parser's printer would.
//!
//! ## Absent Is Not an Error
//!
//! A field path that leads nowhere resolves to nothing, and the section it
//! would have produced is left out. Content sources are full of optional
//! fields; a missing one should cost a front-matter block, not a build.
//! Configuration is the opposite: a config without node types fails at
//! setup, before any node is seen.

pub mod assemble;
pub mod config;
pub mod extract;
pub mod materialize;
pub mod output;
pub mod plugin;
pub mod resolve;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
