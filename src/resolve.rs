use crate::error::{HlsParseError, Result};
use tracing::trace;
use url::{ParseError, Position, Url};

/// What a relative reference is resolved against.
enum Base<'a> {
    Absolute(Url),
    /// A bare path with no scheme or host to borrow.
    Relative(&'a str),
}

impl<'a> Base<'a> {
    fn parse(base: &'a str) -> Result<Base<'a>> {
        match Url::parse(base) {
            Ok(url) => Ok(Base::Absolute(url)),
            Err(ParseError::RelativeUrlWithoutBase) => Ok(Base::Relative(base)),
            Err(source) => Err(invalid(base, source)),
        }
    }
}

fn invalid(reference: &str, source: ParseError) -> HlsParseError {
    HlsParseError::InvalidReference {
        reference: reference.to_owned(),
        source,
    }
}

// `scheme://host[:port]`
fn prefix(url: &Url) -> String {
    match (url.host_str(), url.port()) {
        (Some(host), Some(port)) => format!("{}://{}:{}", url.scheme(), host, port),
        (Some(host), None) => format!("{}://{}", url.scheme(), host),
        (None, _) => format!("{}://", url.scheme()),
    }
}

// Joins against a placeholder host and keeps only the path and what follows.
// An empty base stands for the root path.
fn join_relative(base: &str, reference: &str) -> std::result::Result<String, ParseError> {
    let root = Url::parse("http://localhost/")?;
    let joined = root.join(base)?.join(reference)?;
    let path = &joined[Position::BeforePath..];
    if base.is_empty() || base.starts_with('/') {
        Ok(path.to_owned())
    } else {
        Ok(path.trim_start_matches('/').to_owned())
    }
}

/// Resolves `reference` against `base`.
///
/// Absolute references are returned unchanged. Scheme-relative references
/// (`//host/path`) take the scheme of the base, root-relative references
/// (`/path`) are appended verbatim to its scheme and host, and everything
/// else is joined with the base URL.
///
/// # Examples
/// ```
/// use hls_parse::resolve;
///
/// let base = "http://cdn.example.com/live/index.m3u8";
/// assert_eq!(resolve("segment1.ts", base).unwrap(), "http://cdn.example.com/live/segment1.ts");
/// assert_eq!(resolve("/abs/seg.ts", base).unwrap(), "http://cdn.example.com/abs/seg.ts");
/// assert_eq!(resolve("../hd/seg.ts", base).unwrap(), "http://cdn.example.com/hd/seg.ts");
/// assert_eq!(resolve("https://other.example/a.ts", base).unwrap(), "https://other.example/a.ts");
/// ```
pub fn resolve(reference: &str, base: &str) -> Result<String> {
    match Url::parse(reference) {
        Ok(_) => {
            trace!(reference, "reference is absolute");
            return Ok(reference.to_owned());
        }
        Err(ParseError::RelativeUrlWithoutBase) => {}
        Err(source) => return Err(invalid(reference, source)),
    }

    let resolved = match Base::parse(base)? {
        Base::Absolute(url) => {
            if reference.starts_with("//") {
                let absolute = format!("{}:{}", url.scheme(), reference);
                Url::parse(&absolute).map_err(|e| invalid(reference, e))?;
                absolute
            } else if reference.starts_with('/') {
                format!("{}{}", prefix(&url), reference)
            } else {
                url.join(reference)
                    .map_err(|e| invalid(reference, e))?
                    .into()
            }
        }
        Base::Relative(path) => {
            if reference.starts_with("//") {
                Url::parse(&format!("http:{}", reference)).map_err(|e| invalid(reference, e))?;
                reference.to_owned()
            } else if reference.starts_with('/') {
                reference.to_owned()
            } else {
                join_relative(path, reference).map_err(|e| invalid(reference, e))?
            }
        }
    };

    trace!(reference, base, resolved = resolved.as_str(), "resolved reference");
    Ok(resolved)
}
