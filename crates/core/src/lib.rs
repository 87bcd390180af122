//! Timed-text normalization: TTML and WebVTT in, clean SRT out.
//!
//! Every entry point is a pure function of its input text. Per-cue problems
//! (bad timecodes, empty text, inverted ranges) drop that cue only; a
//! document that ends up with no cues is an error, never an empty success.

pub mod api;
pub mod cleanup;
pub mod cue;
pub mod error;
pub mod format;
pub mod markup;
pub mod playlist;
pub mod srt;
pub mod timecode;
pub mod ttml;
pub mod webvtt;

pub use cleanup::{clean_and_dedup, clean_srt_document};
pub use cue::{Cue, CueSequence};
pub use error::{Result, SubtitleError};
pub use format::SourceFormat;

use tracing::trace;

/// Convert a TTML document to SRT. Cues are ordered by start time.
pub fn ttml_to_srt(ttml_text: &str) -> Result<String> {
    trace!("ttml_to_srt(len={})", ttml_text.len());
    Ok(srt::serialize(ttml::read(ttml_text)?))
}

/// Convert a WebVTT document to SRT. Cues keep their document order.
pub fn webvtt_to_srt(webvtt_text: &str) -> Result<String> {
    trace!("webvtt_to_srt(len={})", webvtt_text.len());
    Ok(srt::serialize(webvtt::read(webvtt_text)?))
}

/// Normalize `text` of the given format to SRT. SRT input only goes
/// through the cleanup and dedup pass.
pub fn convert(text: &str, format: SourceFormat) -> Result<String> {
    match format {
        SourceFormat::Ttml => ttml_to_srt(text),
        SourceFormat::WebVtt => webvtt_to_srt(text),
        SourceFormat::Srt => clean_srt_document(text),
    }
}

/// Read `text` of the given format into numbered cues, exactly as
/// [`convert`] would write them.
pub fn read_cues(text: &str, format: SourceFormat) -> Result<Vec<Cue>> {
    trace!("read_cues(len={}, format={format})", text.len());
    match format {
        SourceFormat::Ttml => Ok(ttml::read(text)?.into_numbered()),
        SourceFormat::WebVtt => Ok(webvtt::read(text)?.into_numbered()),
        SourceFormat::Srt => srt::parse(&clean_srt_document(text)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Both readers refuse to produce an empty document.
    #[test]
    fn empty_inputs_are_errors() {
        assert!(matches!(
            ttml_to_srt("<tt><body/></tt>"),
            Err(SubtitleError::NoCuesFound { .. })
        ));
        assert!(matches!(
            webvtt_to_srt(""),
            Err(SubtitleError::NoCuesFound { .. })
        ));
        assert!(matches!(
            clean_srt_document(""),
            Err(SubtitleError::NoCuesFound { .. })
        ));
    }

    /// A messy TTML document normalizes to sorted, numbered, tag-free SRT.
    #[test]
    fn ttml_end_to_end() {
        let ttml = r#"<tt xmlns="http://www.w3.org/ns/ttml"><body><div>
            <p begin="00:00:04.000" end="00:00:05.000">&lt;i&gt;Later&lt;/i&gt;</p>
            <p begin="t1s" end="2s"><span>Line\hone</span><br/>two</p>
            <p begin="00:00:03:00" end="00:00:03:15">frames</p>
        </div></body></tt>"#;
        assert_eq!(
            ttml_to_srt(ttml).unwrap(),
            "1\n00:00:01,000 --> 00:00:02,000\nLineone\ntwo\n\n\
             2\n00:00:03,000 --> 00:00:03,500\nframes\n\n\
             3\n00:00:04,000 --> 00:00:05,000\nLater"
        );
    }

    /// WebVTT keeps order and drops markup.
    #[test]
    fn webvtt_end_to_end() {
        let vtt = "WEBVTT\n\n2\n00:00:09.000 --> 00:00:10.000\n<i>nine</i>\n\n\
                   1\n00:00:01.000 --> 00:00:02.000 line:0\n<v Bob>one\n";
        assert_eq!(
            webvtt_to_srt(vtt).unwrap(),
            "1\n00:00:09,000 --> 00:00:10,000\nnine\n\n\
             2\n00:00:01,000 --> 00:00:02,000\none"
        );
    }

    /// Dispatch by format, with SRT going through cleanup only.
    #[test]
    fn converts_by_format() {
        let srt_in = "5\n00:00:01,000 --> 00:00:02,000\n{\\an8}hi\n\n\
                      6\n00:00:02,000 --> 00:00:03,000\nhi\n";
        assert_eq!(
            convert(srt_in, SourceFormat::Srt).unwrap(),
            "5\n00:00:01,000 --> 00:00:02,000\nhi"
        );
        assert!(convert("WEBVTT\n", SourceFormat::WebVtt).is_err());
    }

    /// Doubled breaks, from markup or escapes, leave no blank line in a
    /// cue, so the output reads back and dedup keeps every line.
    #[test]
    fn doubled_breaks_keep_entries_whole() {
        let ttml = r#"<tt><body>
            <p begin="1s" end="2s">a<br/><br/>b</p>
            <p begin="3s" end="4s">c\n\nd</p>
        </body></tt>"#;
        let out = ttml_to_srt(ttml).unwrap();
        assert_eq!(
            out,
            "1\n00:00:01,000 --> 00:00:02,000\na\nb\n\n\
             2\n00:00:03,000 --> 00:00:04,000\nc\nd"
        );
        assert_eq!(srt::parse(&out).unwrap().len(), 2);
        assert_eq!(clean_and_dedup(&out), out);
        let cues = read_cues(ttml, SourceFormat::Ttml).unwrap();
        assert_eq!(cues[0].text, "a\nb");
    }

    /// A cue that is only styling is dropped, and a document of such cues
    /// is an error rather than an empty success.
    #[test]
    fn markup_only_cues_are_dropped() {
        let vtt = "WEBVTT\n\n00:00:01.000 --> 00:00:02.000\n{\\an8}\n";
        assert!(matches!(
            webvtt_to_srt(vtt),
            Err(SubtitleError::NoCuesFound { format: "WebVTT" })
        ));
        let ttml = r#"<tt><body>
            <p begin="1s" end="2s">&lt;i&gt;&lt;/i&gt;</p>
            <p begin="3s" end="4s">ok</p>
        </body></tt>"#;
        let out = ttml_to_srt(ttml).unwrap();
        assert_eq!(out, "1\n00:00:03,000 --> 00:00:04,000\nok");
        assert!(!out.contains("\n\n\n"));
        assert!(matches!(
            ttml_to_srt(r#"<tt><body><p begin="1s" end="2s">&lt;b&gt;&lt;/b&gt;</p></body></tt>"#),
            Err(SubtitleError::NoCuesFound { format: "TTML" })
        ));
    }

    /// Cue export matches the written SRT for every source format.
    #[test]
    fn reads_cues_by_format() {
        let vtt = "WEBVTT\n\n00:00:05.000 --> 00:00:06.000\nlate\n\n\
                   00:00:01.000 --> 00:00:02.000\n<i>early</i>\n";
        let cues = read_cues(vtt, SourceFormat::WebVtt).unwrap();
        let summary: Vec<(u32, &str)> = cues.iter().map(|c| (c.index, c.text.as_str())).collect();
        assert_eq!(summary, vec![(1, "late"), (2, "early")]);

        let srt_in = "5\n00:00:01,000 --> 00:00:02,000\n<i>hi</i>\n\n\
                      6\n00:00:02,000 --> 00:00:03,000\nhi\n";
        let cues = read_cues(srt_in, SourceFormat::Srt).unwrap();
        assert_eq!(cues.len(), 1);
        assert_eq!((cues[0].index, cues[0].text.as_str()), (5, "hi"));
    }
}
