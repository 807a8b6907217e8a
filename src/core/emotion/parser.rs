//! Extraction of `<tag>NAME</tag>` emotion markers from user text.
//!
//! Parsing is a single left-to-right pass: markers are removed from the text
//! at their exact span and recorded, in authored order, as byte offsets into
//! the stripped base text. Renderers later decide how (and whether) each
//! marker is expressed in a provider's own markup.

use once_cell::sync::Lazy;
use regex::Regex;

use super::tag::EmotionTag;

static TAG_RE: Lazy<Regex> = Lazy::new(|| {
    // Tag names never contain '<', so a non-greedy scan is not needed.
    Regex::new(r"<tag>([^<]*)</tag>").expect("tag pattern is valid")
});

/// Errors from parsing emotion markup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TagError {
    /// The tag name is not a recognized emotion. The caller keeps the raw
    /// input untouched so malformed markup stays visible to the user.
    #[error("invalid emotion tag '{name}'")]
    InvalidEmotionTag { name: String },
}

/// A single emotion marker anchored in the stripped base text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmotionMarker {
    /// Byte offset into [`TaggedText::base_text`] of the text span this
    /// marker annotates. Always lands on a character boundary.
    pub offset: usize,
    pub emotion: EmotionTag,
}

/// Result of parsing: tag-free text plus ordered emotion markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedText {
    pub base_text: String,
    pub markers: Vec<EmotionMarker>,
}

impl TaggedText {
    /// Emotions in authored order.
    pub fn emotions(&self) -> Vec<EmotionTag> {
        self.markers.iter().map(|m| m.emotion).collect()
    }
}

/// Parse raw input text into stripped base text and ordered emotion markers.
///
/// An unrecognized tag name fails with [`TagError::InvalidEmotionTag`] and no
/// partial output is produced. Whitespace immediately surrounding a removed
/// tag collapses to at most one space; a tag at the start or end of the text
/// leaves no stray whitespace behind. Parsing already-stripped text returns
/// it unchanged with an empty marker list.
pub fn parse_tags(input: &str) -> Result<TaggedText, TagError> {
    let mut base = String::new();
    let mut markers = Vec::new();
    let mut last = 0usize;

    for caps in TAG_RE.captures_iter(input) {
        let whole = caps.get(0).expect("group 0 always present");
        let name = &caps[1];
        let emotion = EmotionTag::from_name(name).ok_or_else(|| TagError::InvalidEmotionTag {
            name: name.trim().to_string(),
        })?;

        base.push_str(&input[last..whole.start()]);
        last = whole.end();

        let had_pre_ws = base.ends_with(char::is_whitespace);
        base.truncate(base.trim_end().len());

        // Swallow the whitespace run that followed the tag; the separator
        // below reintroduces at most one space.
        let rest = &input[last..];
        let trailing = rest.trim_start();
        let had_post_ws = trailing.len() != rest.len();
        last += rest.len() - trailing.len();

        if !base.is_empty() && !trailing.is_empty() && (had_pre_ws || had_post_ws) {
            base.push(' ');
        }

        markers.push(EmotionMarker {
            offset: base.len(),
            emotion,
        });
    }

    if markers.is_empty() {
        // No markup present; return the input as-is so parsing is idempotent.
        return Ok(TaggedText {
            base_text: input.to_string(),
            markers,
        });
    }

    base.push_str(&input[last..]);
    Ok(TaggedText { base_text: base, markers })
}
