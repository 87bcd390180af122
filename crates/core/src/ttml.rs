//! TTML reader.
//! Every timed paragraph becomes a cue; the result is sorted by start time
//! because TTML documents do not promise chronological order.

use crate::cue::{Cue, CueSequence};
use crate::error::{Result, SubtitleError};
use crate::markup::{extract_text, MarkupNode};
use crate::timecode::{parse_timecode, Dialect};
use tracing::{debug, trace};

/// Element that carries a cue.
const PARAGRAPH_TAG: &str = "p";

/// Read a TTML document into start-ordered cues.
pub fn read(ttml: &str) -> Result<CueSequence> {
    trace!("ttml::read(len={})", ttml.len());
    let doc = roxmltree::Document::parse(ttml)
        .map_err(|e| SubtitleError::MalformedInput(format!("TTML is not valid XML: {e}")))?;

    let mut cues: CueSequence = doc
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == PARAGRAPH_TAG)
        .filter_map(|p| match paragraph_cue(p) {
            Ok(cue) => cue,
            Err(e) => {
                debug!("skipping TTML paragraph at byte {}: {e}", p.range().start);
                None
            }
        })
        .collect();

    if cues.is_empty() {
        return Err(SubtitleError::NoCuesFound { format: "TTML" });
    }
    cues.sort_by_start();
    debug!("read {} cues from TTML", cues.len());
    Ok(cues)
}

/// Build the cue for one paragraph. Paragraphs without both timing
/// attributes are not cues at all and yield `Ok(None)`.
fn paragraph_cue(p: roxmltree::Node<'_, '_>) -> Result<Option<Cue>> {
    let (Some(begin), Some(end)) = (p.attribute("begin"), p.attribute("end")) else {
        return Ok(None);
    };
    let start_ms = parse_timecode(begin, Dialect::Ttml)?;
    let end_ms = parse_timecode(end, Dialect::Ttml)?;
    let text = extract_text(&MarkupNode::from_xml(p));
    Cue::new(start_ms, end_ms, text).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::srt;

    fn wrap(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<tt xmlns="http://www.w3.org/ns/ttml" xml:lang="en">
  <body>
    <div>
      {body}
    </div>
  </body>
</tt>"#
        )
    }

    fn texts(seq: &CueSequence) -> Vec<&str> {
        seq.as_slice().iter().map(|c| c.text.as_str()).collect()
    }

    /// A paragraph with a break extracts to two lines with offset timing.
    #[test]
    fn reads_break_paragraph() {
        let seq = read(&wrap(r#"<p begin="0.5s" end="2.5s">Hello<br/>World</p>"#)).unwrap();
        assert_eq!(seq.len(), 1);
        let cue = &seq.as_slice()[0];
        assert_eq!((cue.start_ms, cue.end_ms), (500, 2500));
        assert_eq!(cue.text, "Hello\nWorld");
        assert_eq!(
            srt::serialize(seq),
            "1\n00:00:00,500 --> 00:00:02,500\nHello\nWorld"
        );
    }

    /// Out-of-order paragraphs come back sorted by start.
    #[test]
    fn sorts_by_start() {
        let seq = read(&wrap(
            r#"<p begin="00:00:05.000" end="00:00:06.000">second</p>
               <p begin="00:00:01.000" end="00:00:02.000">first</p>
               <p begin="00:00:05.000" end="00:00:05.500">tie keeps order</p>"#,
        ))
        .unwrap();
        assert_eq!(texts(&seq), vec!["first", "second", "tie keeps order"]);
    }

    /// Missing attributes, bad timecodes, empty text and inverted ranges
    /// each drop only their own paragraph.
    #[test]
    fn skips_unusable_paragraphs() {
        let seq = read(&wrap(
            r#"<p begin="1s">no end</p>
               <p begin="bogus" end="2s">bad begin</p>
               <p begin="1s" end="2s">   <span> </span></p>
               <p begin="3s" end="2s">inverted</p>
               <p begin="00:00:01:15" end="00:00:02:00"><span>kept</span> <span>frames</span></p>"#,
        ))
        .unwrap();
        assert_eq!(texts(&seq), vec!["kept frames"]);
        assert_eq!(seq.as_slice()[0].start_ms, 1500);
    }

    /// Namespaced paragraphs and nested spans are handled.
    #[test]
    fn reads_prefixed_elements() {
        let doc = r#"<tt:tt xmlns:tt="http://www.w3.org/ns/ttml"><tt:body><tt:div>
            <tt:p begin="t2000" end="t3000"><tt:span style="s1">Bonjour</tt:span><tt:br/><tt:span>le monde</tt:span></tt:p>
            </tt:div></tt:body></tt:tt>"#;
        let seq = read(doc).unwrap();
        assert_eq!(texts(&seq), vec!["Bonjour\nle monde"]);
        assert_eq!(seq.as_slice()[0].start_ms, 2000);
    }

    /// Broken XML is a document-level error.
    #[test]
    fn malformed_xml() {
        assert!(matches!(
            read("<tt><body><p begin=\"1s\" end=\"2s\">x</body>"),
            Err(SubtitleError::MalformedInput(_))
        ));
        assert!(matches!(read(""), Err(SubtitleError::MalformedInput(_))));
    }

    /// A valid document without usable paragraphs yields no cues.
    #[test]
    fn no_cues() {
        assert!(matches!(
            read(&wrap("<p>untimed</p>")),
            Err(SubtitleError::NoCuesFound { format: "TTML" })
        ));
    }
}
