use crate::error::{HlsParseError, Result};
use crate::options::{AttributeSyntax, ParseOptions, UnknownTagPolicy};
use crate::types::{ParameterRecord, ProtocolTag, TagEntry};
use nom::{
    bytes::complete::{is_not, tag},
    character::complete::char,
    combinator::{opt, recognize, rest},
    sequence::{pair, preceded},
    IResult,
};
use std::{
    iter::{Filter, Map},
    str::Split,
};
use tracing::{debug, trace, warn};

const QUOTES: [char; 2] = ['\'', '"'];

// matches `#E` and everything up to the first `:`
fn tag_marker(input: &str) -> IResult<&str, &str> {
    recognize(pair(tag("#E"), is_not(":")))(input)
}

fn payload(input: &str) -> IResult<&str, Option<&str>> {
    opt(preceded(char(':'), rest))(input)
}

fn tag_line(input: &str) -> IResult<&str, (&str, Option<&str>)> {
    pair(tag_marker, payload)(input)
}

type LogicalLines<'a> =
    Filter<Map<Split<'a, char>, fn(&'a str) -> &'a str>, fn(&&'a str) -> bool>;

fn logical_lines<'a>(text: &'a str) -> LogicalLines<'a> {
    let trim: fn(&'a str) -> &'a str = str::trim;
    let non_blank: fn(&&'a str) -> bool = |l| !l.is_empty();
    text.split('\n').map(trim).filter(non_blank)
}

/// Splits raw playlist text into trimmed, non-empty logical lines.
///
/// # Examples
/// ```
/// let lines = hls_parse::normalize("#EXTM3U\n\n  #EXT-X-ENDLIST \r\n");
/// assert_eq!(lines, vec!["#EXTM3U", "#EXT-X-ENDLIST"]);
/// ```
pub fn normalize(text: &str) -> Vec<&str> {
    logical_lines(text).collect()
}

/// Determines which protocol tag a logical line represents.
///
/// # Examples
/// ```
/// use hls_parse::{classify, ProtocolTag};
///
/// assert_eq!(classify("#EXTM3U"), ProtocolTag::Extm3u);
/// assert_eq!(classify("#EXT-X-FOO:1"), ProtocolTag::Nil);
/// assert_eq!(classify("media/seg-0.ts"), ProtocolTag::Value);
/// ```
pub fn classify(line: &str) -> ProtocolTag {
    let tag = match tag_marker(line) {
        Ok((_, marker)) => ProtocolTag::from_marker(marker),
        Err(_) => ProtocolTag::Value,
    };
    trace!(line, ?tag, "classified line");
    tag
}

/// Destructures the parameter list of a tag line using the default
/// [`ParseOptions`].
///
/// # Examples
/// ```
/// let record = hls_parse::destructure(
///     "#EXT-X-STREAM-INF:BANDWIDTH=128000,RESOLUTION=640x360",
/// ).unwrap();
/// assert_eq!(record.attribute("RESOLUTION"), Some("640x360"));
/// assert!(record.values.is_empty());
/// ```
///
/// [`ParseOptions`]: struct.ParseOptions.html
pub fn destructure(line: &str) -> Result<ParameterRecord> {
    destructure_with(line, &ParseOptions::default())
}

/// Destructures the parameter list of a tag line.
///
/// Fails with `UnrecognizedTag` if the marker names no known directive and
/// with `MissingParameters` if there's no `:`-delimited payload.
pub fn destructure_with(line: &str, options: &ParseOptions) -> Result<ParameterRecord> {
    let (marker, payload) = match tag_line(line) {
        Ok((_, parts)) => parts,
        Err(_) => {
            return Err(HlsParseError::MissingParameters {
                tag: ProtocolTag::Value,
            })
        }
    };

    let tag = ProtocolTag::from_marker(marker);
    if tag == ProtocolTag::Nil {
        return Err(HlsParseError::UnrecognizedTag {
            marker: marker.to_owned(),
        });
    }
    let payload = payload.ok_or(HlsParseError::MissingParameters { tag })?;

    Ok(match options.attribute_syntax {
        AttributeSyntax::Legacy => legacy_attributes(payload),
        AttributeSyntax::QuoteAware => quote_aware_attributes(payload),
    })
}

fn legacy_attributes(payload: &str) -> ParameterRecord {
    let stripped = strip_quotes(payload.trim());
    let mut record = ParameterRecord::default();
    for token in stripped.split(',').map(str::trim) {
        let mut parts = token.split('=');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(name), Some(value), None) => {
                record.attributes.insert(name.to_owned(), value.to_owned());
            }
            _ => record.values.push(token.to_owned()),
        }
    }
    record
}

fn quote_aware_attributes(payload: &str) -> ParameterRecord {
    let mut record = ParameterRecord::default();
    for token in split_unquoted(payload.trim(), ',') {
        let token = token.trim();
        match split_unquoted(token, '=').as_slice() {
            [name, value] => {
                record
                    .attributes
                    .insert(strip_quotes(name), strip_quotes(value));
            }
            _ => record.values.push(strip_quotes(token)),
        }
    }
    record
}

fn strip_quotes(s: &str) -> String {
    s.chars().filter(|c| !QUOTES.contains(c)).collect()
}

// splits on `separator` unless it is enclosed in matching quotes; an
// unterminated quote runs to the end of the input
fn split_unquoted(input: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, c) in input.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if QUOTES.contains(&c) => quote = Some(c),
            None if c == separator => {
                parts.push(&input[start..i]);
                start = i + c.len_utf8();
            }
            None => {}
        }
    }
    parts.push(&input[start..]);
    parts
}

/// A lazy iterator over the classified lines of a playlist.
///
/// Created by [`TagStream::new`]; [`parse_tags`] collects one. The stream
/// ends after the first error.
///
/// [`TagStream::new`]: #method.new
/// [`parse_tags`]: fn.parse_tags.html
#[derive(Debug, Clone)]
pub struct TagStream<'a> {
    lines: LogicalLines<'a>,
    options: ParseOptions,
    failed: bool,
}

impl<'a> TagStream<'a> {
    pub fn new(text: &'a str, options: ParseOptions) -> Self {
        TagStream {
            lines: logical_lines(text),
            options,
            failed: false,
        }
    }

    fn entry(&self, line: &'a str) -> Result<Option<TagEntry<'a>>> {
        let tag = classify(line);
        let params = match tag {
            ProtocolTag::Value => None,
            ProtocolTag::Nil => {
                return match self.options.unknown_tags {
                    UnknownTagPolicy::Fail => Err(HlsParseError::UnrecognizedTag {
                        marker: marker_of(line).to_owned(),
                    }),
                    UnknownTagPolicy::Skip => {
                        warn!(line, "skipping unrecognized tag");
                        Ok(None)
                    }
                    UnknownTagPolicy::Keep => {
                        debug!(line, "keeping unrecognized tag");
                        Ok(Some(TagEntry {
                            line,
                            tag,
                            params: None,
                        }))
                    }
                };
            }
            _ => match destructure_with(line, &self.options) {
                Ok(record) => Some(record),
                Err(HlsParseError::MissingParameters { tag }) if !tag.expects_parameters() => None,
                Err(e) => return Err(e),
            },
        };
        Ok(Some(TagEntry { line, tag, params }))
    }
}

impl<'a> Iterator for TagStream<'a> {
    type Item = Result<TagEntry<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            let line = self.lines.next()?;
            match self.entry(line) {
                Ok(Some(entry)) => return Some(Ok(entry)),
                Ok(None) => continue,
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

fn marker_of(line: &str) -> &str {
    tag_marker(line).map(|(_, m)| m).unwrap_or(line)
}

/// Classifies and destructures every logical line of a playlist.
///
/// # Examples
/// ```
/// use hls_parse::{parse_tags, ParseOptions, ProtocolTag};
///
/// let text = "#EXTM3U\n#EXTINF:4.0,\nfirst.ts\n#EXT-X-ENDLIST\n";
/// let tags: Vec<ProtocolTag> = parse_tags(text, &ParseOptions::default())
///     .unwrap()
///     .iter()
///     .map(|e| e.tag)
///     .collect();
///
/// assert_eq!(
///     tags,
///     &[ProtocolTag::Extm3u, ProtocolTag::Extinf, ProtocolTag::Value, ProtocolTag::Endlist]
/// );
/// ```
pub fn parse_tags<'a>(text: &'a str, options: &ParseOptions) -> Result<Vec<TagEntry<'a>>> {
    let entries = TagStream::new(text, *options).collect::<Result<Vec<_>>>()?;
    debug!(entries = entries.len(), "parsed playlist");
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_marker() {
        assert_eq!(
            super::tag_marker("#EXT-X-KEY:METHOD=NONE"),
            Ok((":METHOD=NONE", "#EXT-X-KEY"))
        );
        assert_eq!(super::tag_marker("#EXTM3U"), Ok(("", "#EXTM3U")));
    }

    #[test]
    fn tag_marker_wrong() {
        assert_eq!(
            super::tag_marker("#E:1"),
            Err(nom::Err::Error((":1", nom::error::ErrorKind::IsNot)))
        );
        assert_eq!(
            super::tag_marker("seg.ts"),
            Err(nom::Err::Error(("seg.ts", nom::error::ErrorKind::Tag)))
        );
    }

    #[test]
    fn tag_line_payload() {
        assert_eq!(
            tag_line("#EXTINF:10.0,"),
            Ok(("", ("#EXTINF", Some("10.0,"))))
        );
        assert_eq!(tag_line("#EXT-X-ENDLIST"), Ok(("", ("#EXT-X-ENDLIST", None))));
        assert_eq!(tag_line("#EXTINF:"), Ok(("", ("#EXTINF", Some("")))));
    }

    #[test]
    fn normalize_drops_blank_lines() {
        let text = "  #EXTM3U  \n\n\t\n#EXTINF:1,\r\n a.ts\n   ";
        assert_eq!(normalize(text), vec!["#EXTM3U", "#EXTINF:1,", "a.ts"]);
        assert!(normalize(" \n\n \r\n").is_empty());
        assert!(normalize("").is_empty());
    }

    #[test]
    fn classify_known_markers() {
        for tag in ProtocolTag::KNOWN.iter() {
            let marker = tag.marker().unwrap();
            assert_eq!(classify(marker), *tag);
            assert_eq!(classify(&format!("{}:x=1", marker)), *tag);
        }
    }

    #[test]
    fn classify_marker_must_match_exactly() {
        assert_eq!(classify("#EXTM3U8"), ProtocolTag::Nil);
        assert_eq!(classify("#EXT-X-KEYS:METHOD=NONE"), ProtocolTag::Nil);
        assert_eq!(classify("#ext-x-key:METHOD=NONE"), ProtocolTag::Value);
        assert_eq!(classify("#EXT-X-VERSION:3"), ProtocolTag::Nil);
    }

    #[test]
    fn classify_values() {
        assert_eq!(classify("http://a.b/c.ts"), ProtocolTag::Value);
        assert_eq!(classify("# a comment"), ProtocolTag::Value);
        assert_eq!(classify("#E"), ProtocolTag::Value);
        assert_eq!(classify("#E:foo"), ProtocolTag::Value);
    }

    #[test]
    fn destructure_trailing_comma_keeps_empty_token() {
        let record = destructure("#EXTINF:10.0,").unwrap();
        assert_eq!(record.values, vec!["10.0", ""]);
    }

    #[test]
    fn destructure_empty_payload() {
        let record = destructure("#EXTINF:").unwrap();
        assert!(record.attributes.is_empty());
        assert_eq!(record.values, vec![""]);
    }

    #[test]
    fn destructure_strips_quotes() {
        let record =
            destructure(r#"#EXT-X-KEY:METHOD=AES-128,URI="https://k.example/key?id=1",IV='0x1'"#)
                .unwrap();
        assert_eq!(record.attribute("METHOD"), Some("AES-128"));
        assert_eq!(record.attribute("IV"), Some("0x1"));
        // the `=` inside the quoted URI makes it a bare token
        assert_eq!(record.attribute("URI"), None);
        assert_eq!(record.values, vec!["URI=https://k.example/key?id=1"]);
    }

    #[test]
    fn destructure_last_attribute_wins() {
        let record = destructure("#EXT-X-STREAM-INF:BANDWIDTH=1,BANDWIDTH=2").unwrap();
        assert_eq!(record.attribute("BANDWIDTH"), Some("2"));
        assert_eq!(record.len(), 1);
    }

    #[test]
    fn destructure_mixed_tokens_keep_bare_order() {
        let record = destructure("#EXT-X-PRIVINF:a, K=V , b,c ,L=W").unwrap();
        assert_eq!(record.values, vec!["a", "b", "c"]);
        assert_eq!(record.attribute("K"), Some("V"));
        assert_eq!(record.attribute("L"), Some("W"));
    }

    #[test]
    fn destructure_errors() {
        match destructure("#EXT-X-FOO:bar=baz") {
            Err(HlsParseError::UnrecognizedTag { marker }) => assert_eq!(marker, "#EXT-X-FOO"),
            other => panic!("unexpected result: {:?}", other),
        }
        match destructure("#EXT-X-ENDLIST") {
            Err(HlsParseError::MissingParameters { tag }) => assert_eq!(tag, ProtocolTag::Endlist),
            other => panic!("unexpected result: {:?}", other),
        }
        match destructure("seg.ts") {
            Err(HlsParseError::MissingParameters { tag }) => assert_eq!(tag, ProtocolTag::Value),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn quote_aware_keeps_quoted_delimiters() {
        let options = ParseOptions::new().attribute_syntax(AttributeSyntax::QuoteAware);
        let record = destructure_with(
            r#"#EXT-X-STREAM-INF:BANDWIDTH=1280000,CODECS="avc1.4d401f,mp4a.40.2",NAME="a=b""#,
            &options,
        )
        .unwrap();
        assert_eq!(record.attribute("CODECS"), Some("avc1.4d401f,mp4a.40.2"));
        assert_eq!(record.attribute("NAME"), Some("a=b"));
        assert_eq!(record.attribute("BANDWIDTH"), Some("1280000"));
        assert!(record.values.is_empty());
    }

    #[test]
    fn quote_aware_bare_tokens() {
        let options = ParseOptions::new().attribute_syntax(AttributeSyntax::QuoteAware);
        let record = destructure_with(r#"#EXTINF:10.0,"Title, Part 1""#, &options).unwrap();
        assert_eq!(record.values, vec!["10.0", "Title, Part 1"]);
    }

    #[test]
    fn split_unquoted_unterminated_quote() {
        assert_eq!(split_unquoted(r#"a,"b,c"#, ','), vec!["a", r#""b,c"#]);
        assert_eq!(split_unquoted("x='1=2'", '='), vec!["x", "'1=2'"]);
    }

    #[test]
    fn stream_policies() {
        let text = "#EXTM3U\n#EXT-X-VERSION:3\nseg.ts\n";

        let err = parse_tags(text, &ParseOptions::default()).unwrap_err();
        assert!(matches!(err, HlsParseError::UnrecognizedTag { ref marker } if marker == "#EXT-X-VERSION"));

        let skip = ParseOptions::new().unknown_tags(UnknownTagPolicy::Skip);
        let entries = parse_tags(text, &skip).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].tag, ProtocolTag::Value);

        let keep = ParseOptions::new().unknown_tags(UnknownTagPolicy::Keep);
        let entries = parse_tags(text, &keep).unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[1].tag, ProtocolTag::Nil);
        assert_eq!(entries[1].params, None);
    }

    #[test]
    fn stream_rejects_missing_payload() {
        for text in &["#EXTINF\nseg.ts\n", "#EXT-X-KEY\n", "#EXT-X-STREAM-INF\nlow.m3u8\n"] {
            match parse_tags(text, &ParseOptions::default()) {
                Err(HlsParseError::MissingParameters { tag }) => assert!(tag.expects_parameters()),
                other => panic!("unexpected result: {:?}", other),
            }
        }
    }

    #[test]
    fn stream_accepts_standalone_tags() {
        let entries = parse_tags("#EXTM3U\n#EXT-X-ENDLIST\n", &ParseOptions::default()).unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.params.is_none()));
    }

    #[test]
    fn stream_stops_after_error() {
        let mut stream = TagStream::new("#EXT-X-NOPE\n#EXTM3U\n", ParseOptions::default());
        assert!(stream.next().unwrap().is_err());
        assert!(stream.next().is_none());
    }
}
