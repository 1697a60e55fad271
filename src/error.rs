use crate::types::ProtocolTag;
use thiserror::Error;

/// The error type of the parsing and resolution functions in this crate.
#[derive(Debug, Error)]
pub enum HlsParseError {
    /// The line looks like a tag (`#E...`) but names no known directive.
    #[error("unrecognized tag `{marker}`")]
    UnrecognizedTag { marker: String },

    /// The line carries no `:`-delimited parameter payload.
    #[error("{tag} line has no parameters")]
    MissingParameters { tag: ProtocolTag },

    /// A reference or base could not be parsed as a URL.
    #[error("invalid reference `{reference}`: {source}")]
    InvalidReference {
        reference: String,
        #[source]
        source: url::ParseError,
    },

    /// An attribute or bare token is present but is not of the requested type.
    #[error("invalid value `{value}` for `{name}`: {reason}")]
    InvalidAttribute {
        name: String,
        value: String,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, HlsParseError>;
