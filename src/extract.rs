//! Image reference extraction and embed placeholder rewriting.
//!
//! The body is parsed as CommonMark with `pulldown-cmark`. Every inline
//! image (`![alt](url "title")`) is replaced by a self-closing embed tag that
//! defers rendering to a later stage, and its URL is collected:
//!
//! ```text
//! ![Dawn](https://cdn/x/dawn.jpg) over the hills
//!
//! <GatsbyImage alt="Dawn" title="Dawn" image={getImage(props.pageContext.markdownImageList[0]?.childImageSharp?.gatsbyImageData)} /> over the hills
//! urls: ["https://cdn/x/dawn.jpg"]
//! ```
//!
//! ## Index binding
//!
//! The number inside the placeholder is the position of the image's URL in
//! the returned list. Images are numbered in document order (pre-order over
//! the parsed tree), which is also the order `pulldown-cmark` emits their
//! start events. Downstream, the URL list is resolved to an array of image
//! files and each placeholder picks its entry by that index, so the two
//! orders must never diverge.
//!
//! ## What is rewritten
//!
//! Only inline images with a destination are image-reference nodes.
//! Reference-style images (`![alt][ref]`), images with an empty destination
//! (`![alt]()`), raw HTML, and JSX embed components are left exactly as
//! written. Images nested inside another image's alt text are flattened
//! into that alt text and are not recorded on their own.
//!
//! ## Rewriting without mutation
//!
//! The parser is only used to locate images. Each image contributes one
//! `(source range, replacement)` pair and the output is spliced together
//! from the untouched source between those ranges. Everything that is not
//! an image survives byte-for-byte.
//!
//! Attribute values are inserted verbatim. Alt text containing `"` produces
//! a broken tag; escaping is left to the author of the content.

use pulldown_cmark::{Event, LinkType, Options, Parser, Tag, TagEnd};
use std::ops::Range;

/// Name of the component that renders embed placeholders.
pub const EMBED_COMPONENT: &str = "GatsbyImage";

/// Settings for one extraction pass.
#[derive(Debug, Clone, Copy)]
pub struct ExtractOptions<'a> {
    /// Page-context key the placeholders index into.
    pub image_list_key: &'a str,
    /// Optional `className` attribute for every placeholder.
    pub class_name: Option<&'a str>,
}

/// Rewritten body plus the URLs of the images it referenced, in order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Extracted {
    pub body: String,
    pub urls: Vec<String>,
}

/// An image found in the body. Lives only for the duration of a pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageReference {
    pub url: String,
    pub alt: String,
    pub title: Option<String>,
}

impl ImageReference {
    /// Title attribute value: the explicit title, or the alt text.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.alt)
    }
}

/// Build the placeholder tag for the image at `index`.
pub fn embed_placeholder(image: &ImageReference, index: usize, options: &ExtractOptions) -> String {
    let class_attr = match options.class_name {
        Some(class) if !class.trim().is_empty() => format!(" className=\"{class}\""),
        _ => String::new(),
    };
    format!(
        "<{EMBED_COMPONENT} alt=\"{alt}\" title=\"{title}\" image={{getImage(props.pageContext.{key}[{index}]?.childImageSharp?.gatsbyImageData)}}{class_attr} />",
        alt = image.alt,
        title = image.display_title(),
        key = options.image_list_key,
    )
}

/// An image currently open in the event stream.
struct OpenImage {
    range: Range<usize>,
    image: ImageReference,
    rewrite: bool,
    /// Images nested in this one's alt text that are still open.
    nested: usize,
}

/// Collect the images of `body` in document order with their source ranges.
///
/// Images that are not rewritten (reference-style, or with an empty
/// destination) are skipped along with everything nested inside them.
fn find_images(body: &str) -> Vec<(Range<usize>, ImageReference)> {
    let mut found = Vec::new();
    let mut open: Option<OpenImage> = None;

    for (event, range) in Parser::new_ext(body, Options::empty()).into_offset_iter() {
        let Some(current) = open.as_mut() else {
            if let Event::Start(Tag::Image {
                link_type,
                dest_url,
                title,
                ..
            }) = event
            {
                open = Some(OpenImage {
                    range,
                    image: ImageReference {
                        url: dest_url.to_string(),
                        alt: String::new(),
                        title: Some(title.to_string()).filter(|t| !t.is_empty()),
                    },
                    rewrite: link_type == LinkType::Inline && !dest_url.is_empty(),
                    nested: 0,
                });
            }
            continue;
        };
        match event {
            Event::Start(Tag::Image { .. }) => current.nested += 1,
            Event::End(TagEnd::Image) if current.nested > 0 => current.nested -= 1,
            Event::End(TagEnd::Image) => {
                if let Some(done) = open.take()
                    && done.rewrite
                {
                    found.push((done.range, done.image));
                }
            }
            Event::Text(text) | Event::Code(text) | Event::InlineHtml(text) => {
                current.image.alt.push_str(&text);
            }
            // The tag replaces the whole source range, so it must stay on one
            // line inside block quotes and list items.
            Event::SoftBreak | Event::HardBreak => current.image.alt.push(' '),
            _ => {}
        }
    }
    found
}

/// Replace every inline image in `body` with an embed placeholder.
///
/// Returns the rewritten, whitespace-normalized body and the image URLs in
/// the order their placeholders index them. A body without images comes
/// back normalized and with an empty URL list.
pub fn extract(body: &str, options: &ExtractOptions) -> Extracted {
    let images = find_images(body);

    let mut rewritten = String::with_capacity(body.len());
    let mut urls = Vec::with_capacity(images.len());
    let mut cursor = 0;
    for (index, (range, image)) in images.into_iter().enumerate() {
        rewritten.push_str(&body[cursor..range.start]);
        rewritten.push_str(&embed_placeholder(&image, index, options));
        cursor = range.end;
        urls.push(image.url);
    }
    rewritten.push_str(&body[cursor..]);

    Extracted {
        body: normalize_whitespace(&rewritten),
        urls,
    }
}

/// Drop leading blank lines and trailing whitespace, then end with one newline.
///
/// Leading whitespace on the first non-blank line is kept: it may be an
/// indented code block.
fn normalize_whitespace(text: &str) -> String {
    let mut rest = text.trim_end();
    while let Some(newline) = rest.find('\n') {
        if !rest[..newline].trim().is_empty() {
            break;
        }
        rest = &rest[newline + 1..];
    }
    if rest.trim().is_empty() {
        String::new()
    } else {
        format!("{rest}\n")
    }
}
