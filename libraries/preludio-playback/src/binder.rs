//! Play request binder
//!
//! Builds a [`PlayRequest`] from content text carrying `%%audio_*`
//! directives, layered over page-level defaults:
//!
//! ```text
//! %%audio_src dQw4w9WgXcQ
//! %%audio_title Ballade No. 1
//! %%audio_startSeconds 30
//! %%audio_endSeconds 90
//! ```

use crate::types::{PlayRequest, Provider};

/// Title used when neither the content nor the page names one
pub const DEFAULT_TITLE: &str = "Audio Recording";

/// A play request under construction; every field optional
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestDraft {
    pub source_id: Option<String>,
    pub provider: Option<Provider>,
    pub start_seconds: Option<f64>,
    pub end_seconds: Option<f64>,
    pub title: Option<String>,
    pub composer_name: Option<String>,
    pub performer: Option<String>,
    pub image: Option<String>,
    pub source_url: Option<String>,
    pub provider_label: Option<String>,
}

impl RequestDraft {
    pub fn has_bounds(&self) -> bool {
        self.start_seconds.is_some() || self.end_seconds.is_some()
    }

    /// Layer `self` (extracted from content) over page-level `defaults`
    ///
    /// Metadata from the content wins field by field. Trim bounds travel with
    /// the source: content that names its own source never inherits page
    /// bounds, otherwise content bounds win only when present.
    #[must_use]
    pub fn merge_over(self, defaults: &RequestDraft) -> RequestDraft {
        let (start_seconds, end_seconds) = if self.source_id.is_some() || self.has_bounds() {
            (self.start_seconds, self.end_seconds)
        } else {
            (defaults.start_seconds, defaults.end_seconds)
        };

        RequestDraft {
            source_id: self.source_id.or_else(|| defaults.source_id.clone()),
            provider: self.provider.or(defaults.provider),
            start_seconds,
            end_seconds,
            title: self.title.or_else(|| defaults.title.clone()),
            composer_name: self
                .composer_name
                .or_else(|| defaults.composer_name.clone()),
            performer: self.performer.or_else(|| defaults.performer.clone()),
            image: self.image.or_else(|| defaults.image.clone()),
            source_url: self.source_url.or_else(|| defaults.source_url.clone()),
            provider_label: self
                .provider_label
                .or_else(|| defaults.provider_label.clone()),
        }
    }

    /// Finish the request; `None` when no source is known
    pub fn into_request(self) -> Option<PlayRequest> {
        let source_id = self.source_id.filter(|s| !s.trim().is_empty())?;
        Some(PlayRequest {
            source_id,
            provider: self.provider.unwrap_or_default(),
            start_seconds: self.start_seconds,
            end_seconds: self.end_seconds,
            title: Some(self.title.unwrap_or_else(|| DEFAULT_TITLE.to_string())),
            composer_name: self.composer_name,
            performer: self.performer,
            image: self.image,
            source_url: self.source_url,
            provider_label: self.provider_label,
        })
    }
}

/// Extract `%%audio_*` directives from content text
///
/// Unknown directives, directives without a value, unknown platforms and
/// unparsable numbers are skipped. A repeated directive keeps the last value.
pub fn parse_directives(content: &str) -> RequestDraft {
    let mut draft = RequestDraft::default();

    for line in content.lines() {
        let Some(directive) = line.trim().strip_prefix("%%") else {
            continue;
        };
        let mut parts = directive.split_whitespace();
        let Some(key) = parts.next() else {
            continue;
        };
        let value = parts.collect::<Vec<_>>().join(" ");
        if value.is_empty() {
            continue;
        }

        match key {
            "audio_src" => draft.source_id = Some(value),
            "audio_title" => draft.title = Some(value),
            "audio_composer" => draft.composer_name = Some(value),
            "audio_performer" => draft.performer = Some(value),
            "audio_thumbnail" | "audio_artworkSrc" => draft.image = Some(value),
            "audio_platform" => {
                if let Some(provider) = parse_platform(&value) {
                    draft.provider = Some(provider);
                }
            }
            "audio_platformUrl" => draft.source_url = Some(value),
            "audio_platformLabel" => draft.provider_label = Some(value),
            "audio_startTime" | "audio_startSeconds" => {
                if let Some(seconds) = parse_seconds(&value) {
                    draft.start_seconds = Some(seconds);
                }
            }
            "audio_endTime" | "audio_endSeconds" => {
                if let Some(seconds) = parse_seconds(&value) {
                    draft.end_seconds = Some(seconds);
                }
            }
            _ => {}
        }
    }

    draft
}

/// Resolve the request to play for a piece of content
pub fn resolve_request(content: Option<&str>, defaults: &RequestDraft) -> Option<PlayRequest> {
    let extracted = content.map(parse_directives).unwrap_or_default();
    extracted.merge_over(defaults).into_request()
}

fn parse_platform(value: &str) -> Option<Provider> {
    match value.to_ascii_lowercase().as_str() {
        "default" => Some(Provider::Generic),
        other => other.parse().ok(),
    }
}

/// Leading decimal number of `value`, ignoring trailing garbage (`"30s"`)
fn parse_seconds(value: &str) -> Option<f64> {
    let value = value.trim();
    let end = value
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || c == '.' || (i == 0 && (c == '-' || c == '+'))))
        .map_or(value.len(), |(i, _)| i);
    value[..end].parse::<f64>().ok().filter(|s| s.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTENT: &str = "X:1\n\
        T:Ballade\n\
        %%audio_src abc123\n\
        %%audio_title Ballade No. 1\n\
        %%audio_composer Chopin\n\
        %%audio_platform youtube\n\
        %%audio_startSeconds 30\n\
        %%audio_endTime 90.5\n\
        K:Gm\n";

    #[test]
    fn parses_directives() {
        let draft = parse_directives(CONTENT);
        assert_eq!(draft.source_id.as_deref(), Some("abc123"));
        assert_eq!(draft.title.as_deref(), Some("Ballade No. 1"));
        assert_eq!(draft.composer_name.as_deref(), Some("Chopin"));
        assert_eq!(draft.provider, Some(Provider::YouTube));
        assert_eq!(draft.start_seconds, Some(30.0));
        assert_eq!(draft.end_seconds, Some(90.5));
    }

    #[test]
    fn skips_malformed_directives() {
        let draft = parse_directives(
            "%%audio_src\n%%audio_platform myspace\n%%audio_startTime soon\n%%unknown x",
        );
        assert_eq!(draft, RequestDraft::default());
    }

    #[test]
    fn platform_aliases() {
        assert_eq!(parse_platform("default"), Some(Provider::Generic));
        assert_eq!(parse_platform("Audio-File"), Some(Provider::AudioFile));
        assert_eq!(parse_platform("vimeo"), None);
    }

    #[test]
    fn seconds_accept_trailing_text() {
        assert_eq!(parse_seconds("30s"), Some(30.0));
        assert_eq!(parse_seconds("12.5"), Some(12.5));
        assert_eq!(parse_seconds("-3"), Some(-3.0));
        assert_eq!(parse_seconds("abc"), None);
    }

    #[test]
    fn content_source_drops_page_bounds() {
        let defaults = RequestDraft {
            source_id: Some("page".to_string()),
            start_seconds: Some(5.0),
            end_seconds: Some(50.0),
            composer_name: Some("Page Composer".to_string()),
            ..RequestDraft::default()
        };

        let request = resolve_request(Some("%%audio_src own"), &defaults).unwrap();
        assert_eq!(request.source_id, "own");
        assert_eq!(request.start_seconds, None);
        assert_eq!(request.end_seconds, None);
        assert_eq!(request.composer_name.as_deref(), Some("Page Composer"));
    }

    #[test]
    fn content_bounds_override_page_bounds() {
        let defaults = RequestDraft {
            source_id: Some("page".to_string()),
            start_seconds: Some(5.0),
            end_seconds: Some(50.0),
            ..RequestDraft::default()
        };

        let request = resolve_request(Some("%%audio_startTime 12"), &defaults).unwrap();
        assert_eq!(request.source_id, "page");
        assert_eq!(request.start_seconds, Some(12.0));
        assert_eq!(request.end_seconds, None);

        let request = resolve_request(Some("no directives here"), &defaults).unwrap();
        assert_eq!(request.start_seconds, Some(5.0));
        assert_eq!(request.end_seconds, Some(50.0));
    }

    #[test]
    fn defaults_fill_title_and_provider() {
        let defaults = RequestDraft {
            source_id: Some("page".to_string()),
            ..RequestDraft::default()
        };
        let request = resolve_request(None, &defaults).unwrap();
        assert_eq!(request.title.as_deref(), Some(DEFAULT_TITLE));
        assert_eq!(request.provider, Provider::YouTube);
    }

    #[test]
    fn no_source_no_request() {
        assert_eq!(resolve_request(Some("%%audio_title Lonely"), &RequestDraft::default()), None);
    }
}
