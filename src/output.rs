//! CLI output formatting.
//!
//! # Information-First Display
//!
//! The primary display for every node is its identity (positional index and
//! node id), with the generated file and image details shown as indented
//! context lines:
//!
//! ```text
//! 001 post-1
//!     Output: post-1-9c1e…/3f5a…c2.mdx
//!     Images: 2
//! 002 post-2
//!     Output: post-2-4d07…/91b0…7e.mdx
//!     Images: 1 (not in front-matter: no metadata_field)
//! 003 post-3
//!     Skipped: empty document
//!
//! Created 2 documents, skipped 1
//! ```
//!
//! # Architecture
//!
//! `format_*` functions return `Vec<String>` (or `String`) for testability;
//! `print_*` wrappers write to stdout. Format functions are pure: no I/O,
//! no side effects.

use crate::plugin::AssembleEvent;
use std::fmt;
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Display `path` relative to `root` when it lies inside it.
fn display_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

/// Format one progress event as display lines.
///
/// `index` is the 1-based position of the node in the run; link events are
/// not numbered.
pub fn format_assemble_event(index: usize, event: &AssembleEvent, output_root: &Path) -> Vec<String> {
    match event {
        AssembleEvent::DocumentCreated {
            node_id,
            path,
            image_count,
            has_front_matter,
        } => {
            let mut lines = vec![
                format!("{} {}", format_index(index), node_id),
                format!("    Output: {}", display_path(path, output_root)),
            ];
            if *image_count > 0 {
                if *has_front_matter {
                    lines.push(format!("    Images: {}", image_count));
                } else {
                    lines.push(format!(
                        "    Images: {} (not in front-matter: no metadata_field)",
                        image_count
                    ));
                }
            }
            lines
        }
        AssembleEvent::NodeSkipped { node_id } => vec![
            format!("{} {}", format_index(index), node_id),
            "    Skipped: empty document".to_string(),
        ],
        AssembleEvent::LinkedToSource { node_id, source_id } => {
            vec![format!("Linked {} → {}", node_id, source_id)]
        }
    }
}

/// Counts for a whole run.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RunSummary {
    pub created: usize,
    pub skipped: usize,
}

impl RunSummary {
    /// Count an event; returns the node's 1-based position if it has one.
    pub fn record(&mut self, event: &AssembleEvent) -> Option<usize> {
        match event {
            AssembleEvent::DocumentCreated { .. } => self.created += 1,
            AssembleEvent::NodeSkipped { .. } => self.skipped += 1,
            AssembleEvent::LinkedToSource { .. } => return None,
        }
        Some(self.created + self.skipped)
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let noun = if self.created == 1 {
            "document"
        } else {
            "documents"
        };
        write!(f, "Created {} {}", self.created, noun)?;
        if self.skipped > 0 {
            write!(f, ", skipped {}", self.skipped)?;
        }
        Ok(())
    }
}

/// Print a stream of events to stdout as they arrive, then the summary.
pub fn print_events(events: impl IntoIterator<Item = AssembleEvent>, output_root: &Path) -> RunSummary {
    let mut summary = RunSummary::default();
    for event in events {
        let index = summary.record(&event).unwrap_or(0);
        for line in format_assemble_event(index, &event, output_root) {
            println!("{}", line);
        }
    }
    println!();
    println!("{}", summary);
    summary
}
