use crate::error::{HlsParseError, Result};
use crate::resolve::resolve;
use std::{
    collections::HashMap,
    fmt::{self, Display},
    str::FromStr,
};

/// The kind of a logical playlist line.
///
/// Every line maps to exactly one variant. [`Value`] lines carry no tag
/// marker at all (usually a URI), while [`Nil`] lines start with `#E` but
/// name a directive this crate doesn't know.
///
/// [`Value`]: #variant.Value
/// [`Nil`]: #variant.Nil
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtocolTag {
    /// `#EXTM3U`
    Extm3u,
    /// `#EXT-X-STREAM-INF`
    StreamInf,
    /// `#EXTINF`
    Extinf,
    /// `#EXT-X-PLAYLIST-TYPE`
    PlaylistType,
    /// `#EXT-X-KEY`
    Key,
    /// `#EXT-X-ENDLIST`
    Endlist,
    /// `#EXT-X-PRIVINF`
    ExtPrivinf,
    /// Not a tag line.
    Value,
    /// A tag marker with an unrecognized name.
    Nil,
}

impl ProtocolTag {
    /// The recognized directives, in marker-table order.
    pub const KNOWN: [ProtocolTag; 7] = [
        ProtocolTag::Extm3u,
        ProtocolTag::StreamInf,
        ProtocolTag::Extinf,
        ProtocolTag::PlaylistType,
        ProtocolTag::Key,
        ProtocolTag::Endlist,
        ProtocolTag::ExtPrivinf,
    ];

    /// Gets the literal marker of a recognized directive.
    ///
    /// # Examples
    /// ```
    /// use hls_parse::ProtocolTag;
    ///
    /// assert_eq!(ProtocolTag::Key.marker(), Some("#EXT-X-KEY"));
    /// assert_eq!(ProtocolTag::Value.marker(), None);
    /// ```
    pub fn marker(self) -> Option<&'static str> {
        match self {
            ProtocolTag::Extm3u => Some("#EXTM3U"),
            ProtocolTag::StreamInf => Some("#EXT-X-STREAM-INF"),
            ProtocolTag::Extinf => Some("#EXTINF"),
            ProtocolTag::PlaylistType => Some("#EXT-X-PLAYLIST-TYPE"),
            ProtocolTag::Key => Some("#EXT-X-KEY"),
            ProtocolTag::Endlist => Some("#EXT-X-ENDLIST"),
            ProtocolTag::ExtPrivinf => Some("#EXT-X-PRIVINF"),
            ProtocolTag::Value | ProtocolTag::Nil => None,
        }
    }

    /// Looks up the tag for an exact marker string. Unknown markers map to
    /// [`Nil`].
    ///
    /// [`Nil`]: #variant.Nil
    pub fn from_marker(marker: &str) -> ProtocolTag {
        ProtocolTag::KNOWN
            .iter()
            .copied()
            .find(|t| t.marker() == Some(marker))
            .unwrap_or(ProtocolTag::Nil)
    }

    /// Whether this is one of the recognized directives.
    pub fn is_directive(self) -> bool {
        !matches!(self, ProtocolTag::Value | ProtocolTag::Nil)
    }

    /// Whether a line of this kind must carry a `:`-delimited payload.
    /// `#EXTM3U` and `#EXT-X-ENDLIST` stand alone.
    pub fn expects_parameters(self) -> bool {
        match self {
            ProtocolTag::StreamInf
            | ProtocolTag::Extinf
            | ProtocolTag::PlaylistType
            | ProtocolTag::Key
            | ProtocolTag::ExtPrivinf => true,
            ProtocolTag::Extm3u | ProtocolTag::Endlist | ProtocolTag::Value | ProtocolTag::Nil => {
                false
            }
        }
    }
}

impl FromStr for ProtocolTag {
    type Err = HlsParseError;

    fn from_str(s: &str) -> Result<Self> {
        match ProtocolTag::from_marker(s) {
            ProtocolTag::Nil => Err(HlsParseError::UnrecognizedTag {
                marker: s.to_owned(),
            }),
            tag => Ok(tag),
        }
    }
}

impl Display for ProtocolTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.marker() {
            Some(marker) => f.write_str(marker),
            None if *self == ProtocolTag::Value => f.write_str("value"),
            None => f.write_str("unrecognized tag"),
        }
    }
}

/// The destructured parameter payload of a tag line.
///
/// `key=value` tokens end up in [`attributes`], everything else is kept in
/// [`values`] in the order it was encountered. A repeated attribute name
/// keeps the last value.
///
/// # Examples
/// ```
/// use hls_parse::destructure;
///
/// let record = destructure("#EXTINF:9.97,intro").unwrap();
/// assert!(record.attributes.is_empty());
/// assert_eq!(record.value_as::<f64>(0).unwrap(), Some(9.97));
/// assert_eq!(record.value(1), Some("intro"));
/// ```
///
/// [`attributes`]: #structfield.attributes
/// [`values`]: #structfield.values
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterRecord {
    pub attributes: HashMap<String, String>,
    pub values: Vec<String>,
}

impl ParameterRecord {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn value(&self, index: usize) -> Option<&str> {
        self.values.get(index).map(String::as_str)
    }

    /// Parses an attribute into `T`.
    ///
    /// Returns `Ok(None)` if the attribute is absent and an
    /// [`InvalidAttribute`] error if it is present but doesn't parse.
    ///
    /// # Examples
    /// ```
    /// use hls_parse::destructure;
    ///
    /// let record = destructure("#EXT-X-STREAM-INF:BANDWIDTH=128000").unwrap();
    /// assert_eq!(record.attribute_as::<u64>("BANDWIDTH").unwrap(), Some(128_000));
    /// assert_eq!(record.attribute_as::<u64>("AVERAGE-BANDWIDTH").unwrap(), None);
    /// ```
    ///
    /// [`InvalidAttribute`]: ../error/enum.HlsParseError.html#variant.InvalidAttribute
    pub fn attribute_as<T>(&self, name: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.attribute(name).map(|v| parse_as(name, v)).transpose()
    }

    /// Parses the bare token at `index` into `T`. See [`attribute_as`].
    ///
    /// [`attribute_as`]: #method.attribute_as
    pub fn value_as<T>(&self, index: usize) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.value(index)
            .map(|v| parse_as(&format!("value {}", index), v))
            .transpose()
    }

    pub fn len(&self) -> usize {
        self.attributes.len() + self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty() && self.values.is_empty()
    }
}

fn parse_as<T>(name: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    value
        .parse()
        .map_err(|e: T::Err| HlsParseError::InvalidAttribute {
            name: name.to_owned(),
            value: value.to_owned(),
            reason: e.to_string(),
        })
}

/// One logical line of a playlist, classified and destructured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagEntry<'a> {
    pub line: &'a str,
    pub tag: ProtocolTag,
    /// `None` for value lines, unrecognized tags and tags without payload.
    pub params: Option<ParameterRecord>,
}

impl TagEntry<'_> {
    /// Resolves the resource this entry points at against `base`.
    ///
    /// For a value line that is the line itself, for `#EXT-X-KEY` it is the
    /// `URI` attribute. Other entries reference nothing.
    ///
    /// A key URI containing `=` (usually in its query) lands among the bare
    /// tokens as `URI=...` under [`AttributeSyntax::Legacy`]; it is picked up
    /// from there.
    ///
    /// [`AttributeSyntax::Legacy`]: ../enum.AttributeSyntax.html#variant.Legacy
    ///
    /// # Examples
    /// ```
    /// use hls_parse::{parse_tags, ParseOptions};
    ///
    /// let text = "#EXTINF:10,\nseg-1.ts\n";
    /// let entries = parse_tags(text, &ParseOptions::default()).unwrap();
    /// let uri = entries[1].uri("https://example.com/vod/main.m3u8").unwrap();
    /// assert_eq!(uri.as_deref(), Some("https://example.com/vod/seg-1.ts"));
    /// ```
    pub fn uri(&self, base: &str) -> Result<Option<String>> {
        let reference = match self.tag {
            ProtocolTag::Value => Some(self.line),
            ProtocolTag::Key => self.params.as_ref().and_then(|p| {
                p.attribute("URI")
                    .or_else(|| p.values.iter().find_map(|v| v.strip_prefix("URI=")))
            }),
            _ => None,
        };
        reference.map(|r| resolve(r, base)).transpose()
    }
}
