//! XML codec for the `scoreItem` exchange.
//!
//! Requests are rendered from a fixed template so identical inputs always
//! produce identical bytes. Responses are read with a streaming parser; only
//! the first `score` element matters, but the whole document must be
//! well-formed for the reply to be trusted.

use quick_xml::escape::partial_escape;
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::ScoringServiceError;

/// Namespace of the `scoreItemRequest` document.
pub const REQUEST_NAMESPACE: &str = "http://www.taotesting.com/xsd/korektonv1p0";

/// Content type sent with every request.
pub const CONTENT_TYPE: &str = "application/xml";

const SCORE_ELEMENT: &[u8] = b"score";

/// Render the request document for one item/response pair.
///
/// Only `&`, `<` and `>` are escaped; everything else is copied verbatim.
pub fn build_request_body(item_id: &str, response: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <scoreItemRequest xmlns=\"{REQUEST_NAMESPACE}\">\n\
         <itemID>{}</itemID>\n\
         <response>{}</response>\n\
         </scoreItemRequest>",
        partial_escape(item_id),
        partial_escape(response),
    )
}

/// Extract the numeric content of the first `score` element in `body`.
///
/// Matching is by local name, so a namespaced `<ns:score>` counts too.
/// Text of nested children is concatenated, as with DOM `textContent`.
pub fn parse_score(body: &str) -> Result<f64, ScoringServiceError> {
    let mut reader = Reader::from_str(body);
    reader.trim_text(true);

    let mut depth = 0usize;
    let mut seen_root = false;
    // (depth of the open <score>, text gathered so far)
    let mut capture: Option<(usize, String)> = None;
    let mut score_text: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                open_element(&mut depth, &mut seen_root)?;
                if score_text.is_none()
                    && capture.is_none()
                    && e.local_name().as_ref() == SCORE_ELEMENT
                {
                    capture = Some((depth, String::new()));
                }
            }
            Ok(Event::Empty(e)) => {
                open_element(&mut depth, &mut seen_root)?;
                depth -= 1;
                if score_text.is_none()
                    && capture.is_none()
                    && e.local_name().as_ref() == SCORE_ELEMENT
                {
                    score_text = Some(String::new());
                }
            }
            Ok(Event::End(_)) => {
                if matches!(capture, Some((open, _)) if open == depth) {
                    score_text = capture.take().map(|(_, text)| text);
                }
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| malformed("closing tag without an open element"))?;
            }
            Ok(Event::Text(e)) => {
                let text = e.unescape().map_err(|e| malformed(e.to_string()))?;
                if depth == 0 {
                    return Err(malformed("text outside the root element"));
                }
                if let Some((_, buf)) = capture.as_mut() {
                    buf.push_str(&text);
                }
            }
            Ok(Event::CData(e)) => {
                if depth == 0 {
                    return Err(malformed("CDATA outside the root element"));
                }
                let raw = e.into_inner();
                let text = std::str::from_utf8(&raw).map_err(|e| malformed(e.to_string()))?;
                if let Some((_, buf)) = capture.as_mut() {
                    buf.push_str(text);
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(malformed(format!(
                    "at byte {}: {e}",
                    reader.buffer_position()
                )))
            }
        }
    }

    if !seen_root {
        return Err(malformed("document has no root element"));
    }
    if depth != 0 {
        return Err(malformed("unexpected end of document"));
    }

    let text = score_text.ok_or(ScoringServiceError::MissingScore)?;
    parse_decimal(&text)
}

fn open_element(depth: &mut usize, seen_root: &mut bool) -> Result<(), ScoringServiceError> {
    if *depth == 0 {
        if *seen_root {
            return Err(malformed("more than one root element"));
        }
        *seen_root = true;
    }
    *depth += 1;
    Ok(())
}

/// Locale-independent decimal parse; `.` is the only separator accepted.
fn parse_decimal(text: &str) -> Result<f64, ScoringServiceError> {
    let trimmed = text.trim();
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ScoringServiceError::InvalidScore(trimmed.to_string())),
    }
}

fn malformed(reason: impl Into<String>) -> ScoringServiceError {
    ScoringServiceError::MalformedXml(reason.into())
}
