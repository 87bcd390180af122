//! Discovery of subtitle renditions listed in an HLS master playlist.
//! Only the playlist text is inspected; fetching it and the tracks it
//! points to is up to the caller.

use crate::format::SourceFormat;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, trace};
use url::Url;

const MEDIA_TAG: &str = "#EXT-X-MEDIA:";

/// `KEY=value` or `KEY="quoted, value"` inside an attribute list.
static ATTRIBUTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"([A-Z0-9-]+)=("[^"]*"|[^,]*)"#).unwrap());

/// A subtitle rendition advertised by a playlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubtitleTrack {
    /// Human readable name (`NAME`).
    pub name: Option<String>,
    /// Language tag (`LANGUAGE`), e.g. `en-US`.
    pub language: Option<String>,
    /// Absolute location when the URI could be resolved, verbatim otherwise.
    pub url: String,
    /// Format guessed from the URL.
    pub format: Option<SourceFormat>,
}

/// List every `TYPE=SUBTITLES` rendition in `playlist`, resolving relative
/// URIs against `base`. Renditions without a URI are skipped.
pub fn subtitle_tracks(playlist: &str, base: &Url) -> Vec<SubtitleTrack> {
    trace!("subtitle_tracks(base={base})");
    playlist
        .lines()
        .filter_map(|line| line.trim().strip_prefix(MEDIA_TAG))
        .map(parse_attributes)
        .filter(|attrs| attrs.get("TYPE").map(String::as_str) == Some("SUBTITLES"))
        .filter_map(|mut attrs| {
            let uri = attrs.remove("URI")?;
            let url = match base.join(&uri) {
                Ok(url) => url.to_string(),
                Err(e) => {
                    debug!("keeping unresolvable subtitle URI {uri:?}: {e}");
                    uri
                }
            };
            Some(SubtitleTrack {
                name: attrs.remove("NAME"),
                language: attrs.remove("LANGUAGE"),
                format: SourceFormat::from_path_hint(&url),
                url,
            })
        })
        .collect()
}

/// Pick the track for `language`: an exact tag match wins, otherwise the
/// first track sharing the primary subtag (`en` matches `en-GB`).
pub fn find_language<'a>(tracks: &'a [SubtitleTrack], language: &str) -> Option<&'a SubtitleTrack> {
    let primary = |tag: &str| tag.split(['-', '_']).next().unwrap_or_default().to_ascii_lowercase();
    let wanted = primary(language);
    tracks
        .iter()
        .find(|t| {
            t.language
                .as_deref()
                .is_some_and(|l| l.eq_ignore_ascii_case(language))
        })
        .or_else(|| {
            tracks
                .iter()
                .find(|t| t.language.as_deref().is_some_and(|l| primary(l) == wanted))
        })
}

fn parse_attributes(list: &str) -> HashMap<String, String> {
    ATTRIBUTE
        .captures_iter(list)
        .map(|c| (c[1].to_string(), c[2].trim_matches('"').to_string()))
        .collect()
}
