//! Per-provider markup rendering.
//!
//! Consumes parsed text plus a provider profile and produces the exact text
//! and side-channel fields that provider's API expects. Markers are treated
//! as positional: each one annotates the text span starting at its offset
//! (a marker at offset 0 degenerates to a whole-utterance prefix).
//!
//! Unsupported emotions never fail a render; they are dropped and reported
//! as [`CapabilityWarning`]s alongside the successful request.

use std::fmt;

use super::parser::TaggedText;
use super::profile::{MarkupStyle, ProviderId, ProviderProfile};
use super::tag::EmotionTag;

/// Structural rendering failure. Unsupported emotions are never this.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("render failed for {provider}: {reason}")]
pub struct RenderError {
    pub provider: ProviderId,
    pub reason: String,
}

/// A graceful downgrade: an authored emotion the target provider (or model)
/// cannot express. Surfaced to the UI layer, never an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityWarning {
    pub provider: ProviderId,
    pub emotion: EmotionTag,
}

impl fmt::Display for CapabilityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} unsupported on {}",
            self.emotion,
            self.provider.display_name()
        )
    }
}

/// Provider-ready request fragment, consumed once by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedRequest {
    pub provider: ProviderId,
    pub model: String,
    /// Text with provider-native emotion markup embedded (or untouched for
    /// description-field providers).
    pub text: String,
    /// Side-channel emotion description (Hume only; None omits the key).
    pub description: Option<String>,
}

/// A successful render plus any capability downgrades that occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub request: RenderedRequest,
    pub warnings: Vec<CapabilityWarning>,
}

/// Render parsed text into the request fragment `profile`'s provider expects.
///
/// `model` is a renderer-time parameter: it gates emote support for model
/// families that lack it (Cartesia sonic-2, ElevenLabs flash) and selects the
/// Hume Octave version, which decides whether a description is emitted at all.
pub fn render(
    tagged: &TaggedText,
    profile: &ProviderProfile,
    model: &str,
) -> Result<Rendered, RenderError> {
    if tagged.base_text.trim().is_empty() {
        return Err(RenderError {
            provider: profile.id,
            reason: "empty base text".to_string(),
        });
    }
    if model.is_empty() {
        return Err(RenderError {
            provider: profile.id,
            reason: "no model selected".to_string(),
        });
    }

    // A non-emoting provider/model drops all markers silently; the UI layer
    // informs the user about capability separately.
    if !profile.can_emote_with(model) {
        return Ok(Rendered {
            request: RenderedRequest {
                provider: profile.id,
                model: model.to_string(),
                text: tagged.base_text.clone(),
                description: None,
            },
            warnings: Vec::new(),
        });
    }

    let mut warnings = Vec::new();
    let (text, description) = match profile.markup_style {
        MarkupStyle::InlineBracket => (
            render_inline(tagged, profile, &mut warnings),
            None,
        ),
        MarkupStyle::DescriptionField => (
            tagged.base_text.clone(),
            render_description(tagged, profile, model, &mut warnings),
        ),
        MarkupStyle::StyleAttribute => (
            render_style_spans(tagged, profile, &mut warnings),
            None,
        ),
    };

    Ok(Rendered {
        request: RenderedRequest {
            provider: profile.id,
            model: model.to_string(),
            text,
            description,
        },
        warnings,
    })
}

/// Insert `[native]` tokens immediately before each annotated span.
fn render_inline(
    tagged: &TaggedText,
    profile: &ProviderProfile,
    warnings: &mut Vec<CapabilityWarning>,
) -> String {
    let mut mapped: Vec<(usize, &'static str)> = Vec::with_capacity(tagged.markers.len());
    for marker in &tagged.markers {
        match profile.native_emotion(marker.emotion) {
            Some(native) => mapped.push((marker.offset, native)),
            None => warnings.push(CapabilityWarning {
                provider: profile.id,
                emotion: marker.emotion,
            }),
        }
    }

    // Insert back-to-front so earlier offsets stay valid; markers sharing an
    // offset keep their authored order.
    let mut text = tagged.base_text.clone();
    for (offset, native) in mapped.into_iter().rev() {
        let mut token = format!("[{native}]");
        if offset > 0 && !text[..offset].ends_with(char::is_whitespace) {
            token.insert(0, ' ');
        }
        if !text[offset..].is_empty() && !text[offset..].starts_with(char::is_whitespace) {
            token.push(' ');
        }
        text.insert_str(offset, &token);
    }
    text
}

/// Comma-joined native names for the Hume `description` field.
///
/// Octave 2 ignores descriptions entirely, so the key is omitted for model
/// "2" no matter what was authored.
fn render_description(
    tagged: &TaggedText,
    profile: &ProviderProfile,
    model: &str,
    warnings: &mut Vec<CapabilityWarning>,
) -> Option<String> {
    let mut natives: Vec<&'static str> = Vec::new();
    for marker in &tagged.markers {
        match profile.native_emotion(marker.emotion) {
            Some(native) => {
                if !natives.contains(&native) {
                    natives.push(native);
                }
            }
            None => warnings.push(CapabilityWarning {
                provider: profile.id,
                emotion: marker.emotion,
            }),
        }
    }

    if model == "2" || natives.is_empty() {
        None
    } else {
        Some(natives.join(", "))
    }
}

/// Wrap each annotated span in `<speechify:style emotion="...">`.
///
/// A span runs from its marker to the next marker (or end of text). Markers
/// sharing an offset collapse to the first-authored emotion. Unmapped
/// emotions leave their span bare and warn, and a mapped marker with no text
/// after it (a trailing tag) warns too since its emotion cannot be voiced.
fn render_style_spans(
    tagged: &TaggedText,
    profile: &ProviderProfile,
    warnings: &mut Vec<CapabilityWarning>,
) -> String {
    let base = &tagged.base_text;
    let mut spans: Vec<(usize, EmotionTag)> = Vec::new();
    for marker in &tagged.markers {
        if spans.last().is_some_and(|(offset, _)| *offset == marker.offset) {
            // Only one style attribute fits a span; keep the first emotion.
            continue;
        }
        spans.push((marker.offset, marker.emotion));
    }

    let mut text = String::with_capacity(base.len());
    let first_offset = spans.first().map_or(base.len(), |(offset, _)| *offset);
    text.push_str(&base[..first_offset]);

    for (i, (offset, emotion)) in spans.iter().enumerate() {
        let end = spans.get(i + 1).map_or(base.len(), |(next, _)| *next);
        let span = &base[*offset..end];
        match profile.native_emotion(*emotion) {
            Some(native) if !span.is_empty() => {
                text.push_str(&format!(
                    "<speechify:style emotion=\"{native}\">{span}</speechify:style>"
                ));
            }
            Some(_) => warnings.push(CapabilityWarning {
                provider: profile.id,
                emotion: *emotion,
            }),
            None => {
                warnings.push(CapabilityWarning {
                    provider: profile.id,
                    emotion: *emotion,
                });
                text.push_str(span);
            }
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::emotion::parser::parse_tags;
    use crate::core::emotion::profile::profile_for;

    fn rendered_for(input: &str, id: ProviderId, model: &str) -> Rendered {
        let tagged = parse_tags(input).unwrap();
        render(&tagged, profile_for(id), model).unwrap()
    }

    #[test]
    fn test_elevenlabs_inline_prefix() {
        let out = rendered_for(
            "<tag>angry</tag> I hate this job!",
            ProviderId::ElevenLabs,
            "eleven_v3",
        );
        assert_eq!(out.request.text, "[angry] I hate this job!");
        assert!(out.request.description.is_none());
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_cartesia_inline_positional() {
        let out = rendered_for(
            "It rained. <tag>excited</tag> Then the sun came out!",
            ProviderId::Cartesia,
            "sonic-3",
        );
        assert_eq!(
            out.request.text,
            "It rained. [excited] Then the sun came out!"
        );
    }

    #[test]
    fn test_inworld_uses_native_names() {
        let out = rendered_for(
            "<tag>laughter</tag> That tickles. <tag>scared</tag> Wait, what was that?",
            ProviderId::Inworld,
            "inworld-tts-1",
        );
        assert_eq!(
            out.request.text,
            "[laughing] That tickles. [fearful] Wait, what was that?"
        );
    }

    #[test]
    fn test_adjacent_markers_keep_author_order() {
        let out = rendered_for(
            "<tag>sad</tag> <tag>scared</tag> Oh no.",
            ProviderId::Cartesia,
            "sonic-3",
        );
        assert_eq!(out.request.text, "[sad] [scared] Oh no.");
    }

    #[test]
    fn test_non_emoting_model_strips_silently() {
        let out = rendered_for(
            "<tag>angry</tag> I hate this job!",
            ProviderId::Cartesia,
            "sonic-2",
        );
        assert_eq!(out.request.text, "I hate this job!");
        assert!(out.warnings.is_empty());

        let out = rendered_for(
            "<tag>angry</tag> I hate this job!",
            ProviderId::ElevenLabs,
            "eleven_flash_v2_5",
        );
        assert_eq!(out.request.text, "I hate this job!");
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_hume_octave1_description_field() {
        let out = rendered_for("<tag>angry</tag> I hate this job!", ProviderId::Hume, "1");
        assert_eq!(out.request.text, "I hate this job!");
        assert_eq!(out.request.description.as_deref(), Some("angry"));
    }

    #[test]
    fn test_hume_description_dedups_in_author_order() {
        let out = rendered_for(
            "<tag>scared</tag> A noise. <tag>excited</tag> It's a puppy! <tag>scared</tag> Or is it?",
            ProviderId::Hume,
            "1",
        );
        assert_eq!(out.request.description.as_deref(), Some("fearful, happy"));
        assert_eq!(out.request.text, "A noise. It's a puppy! Or is it?");
    }

    #[test]
    fn test_hume_octave2_omits_description() {
        let out = rendered_for("<tag>angry</tag> I hate this job!", ProviderId::Hume, "2");
        assert_eq!(out.request.text, "I hate this job!");
        assert!(out.request.description.is_none());
    }

    #[test]
    fn test_speechify_wraps_span() {
        let out = rendered_for(
            "<tag>angry</tag> I hate this job!",
            ProviderId::Speechify,
            "simba-english",
        );
        assert_eq!(
            out.request.text,
            "<speechify:style emotion=\"angry\">I hate this job!</speechify:style>"
        );
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_speechify_multiple_spans() {
        let out = rendered_for(
            "Morning. <tag>sad</tag> It rained. <tag>excited</tag> Then sun!",
            ProviderId::Speechify,
            "simba-english",
        );
        assert_eq!(
            out.request.text,
            "Morning. <speechify:style emotion=\"sad\">It rained. </speechify:style>\
             <speechify:style emotion=\"energetic\">Then sun!</speechify:style>"
        );
    }

    #[test]
    fn test_speechify_laughter_downgrades_with_warning() {
        let out = rendered_for(
            "<tag>laughter</tag> What a day.",
            ProviderId::Speechify,
            "simba-english",
        );
        assert_eq!(out.request.text, "What a day.");
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.warnings[0].emotion, EmotionTag::Laughter);
        assert_eq!(
            out.warnings[0].to_string(),
            "laughter unsupported on Speechify"
        );
    }

    #[test]
    fn test_speechify_trailing_tag_warns() {
        // A tag after the last word has no span to wrap, so the emotion is
        // reported as dropped instead of vanishing silently.
        let out = rendered_for(
            "Oh no. <tag>sad</tag>",
            ProviderId::Speechify,
            "simba-english",
        );
        assert_eq!(out.request.text, "Oh no.");
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.warnings[0].emotion, EmotionTag::Sad);
    }

    #[test]
    fn test_empty_text_is_a_render_error() {
        let tagged = parse_tags("   ").unwrap();
        let err = render(&tagged, profile_for(ProviderId::Cartesia), "sonic-3").unwrap_err();
        assert_eq!(err.provider, ProviderId::Cartesia);
    }

    #[test]
    fn test_missing_model_is_a_render_error() {
        let tagged = parse_tags("Hello.").unwrap();
        let err = render(&tagged, profile_for(ProviderId::Hume), "").unwrap_err();
        assert!(err.reason.contains("model"));
    }

    #[test]
    fn test_plain_text_untouched_everywhere() {
        for id in ProviderId::ALL {
            let profile = profile_for(id);
            let out = rendered_for("Just plain text.", id, profile.default_model());
            assert_eq!(out.request.text, "Just plain text.");
            assert!(out.request.description.is_none());
            assert!(out.warnings.is_empty());
        }
    }
}
