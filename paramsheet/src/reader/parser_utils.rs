//! Common XML parsing helpers for package parts

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

/// Read text content up to the end of the current element
pub fn read_text_node<R: std::io::BufRead>(reader: &mut Reader<R>) -> quick_xml::Result<String> {
    let mut buf = Vec::new();
    let mut text = String::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Text(e) => text.push_str(e.unescape()?.as_ref()),
            Event::CData(e) => text.push_str(&String::from_utf8_lossy(e.as_ref())),
            Event::End(_) => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(text)
}

/// Value of an attribute matched by local name (any namespace prefix)
pub fn attr_value(e: &BytesStart<'_>, local_name: &[u8]) -> quick_xml::Result<Option<String>> {
    for attr in e.attributes().flatten() {
        if attr.key.local_name().as_ref() == local_name {
            return Ok(Some(attr.unescape_value()?.to_string()));
        }
    }
    Ok(None)
}

/// Upper bound of a row `spans` attribute ("1:5" -> 5).
///
/// Several space-separated ranges may appear; the largest end wins.
pub fn parse_spans_end(spans: &str) -> Option<usize> {
    spans
        .split_whitespace()
        .filter_map(|range| range.split_once(':'))
        .filter_map(|(_, end)| end.trim().parse::<usize>().ok())
        .max()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_spans_end() {
        assert_eq!(parse_spans_end("1:5"), Some(5));
        assert_eq!(parse_spans_end("2:12"), Some(12));
        assert_eq!(parse_spans_end("1:3 6:9"), Some(9));
        assert_eq!(parse_spans_end("7"), None);
        assert_eq!(parse_spans_end(""), None);
    }

    #[test]
    fn test_read_text_node_unescapes() {
        let mut reader = Reader::from_str("<t>Fish &amp; Chips</t>");
        let mut buf = Vec::new();
        let _ = reader.read_event_into(&mut buf).unwrap();
        assert_eq!(read_text_node(&mut reader).unwrap(), "Fish & Chips");
    }

    #[test]
    fn test_attr_value_ignores_prefix() {
        let mut reader =
            Reader::from_str(r#"<sheet name="Params" sheetId="1" r:id="rId3"/>"#);
        let mut buf = Vec::new();
        match reader.read_event_into(&mut buf).unwrap() {
            Event::Empty(e) => {
                assert_eq!(attr_value(&e, b"id").unwrap().as_deref(), Some("rId3"));
                assert_eq!(attr_value(&e, b"name").unwrap().as_deref(), Some("Params"));
                assert_eq!(attr_value(&e, b"state").unwrap(), None);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }
}
