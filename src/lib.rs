//! An HTTP Live Streaming (M3U8) playlist line parser.
//!
//! This crate turns playlist text into classified, destructured lines and
//! resolves the (often relative) references a playlist contains. It does not
//! assemble master or media playlists; that is left to the caller, which
//! gets a flat stream of [`TagEntry`] values to build from.
//!
//! The building blocks are exposed individually:
//!
//! * [`normalize`] splits text into trimmed, non-empty logical lines,
//! * [`classify`] maps a line to its [`ProtocolTag`],
//! * [`destructure`] splits a tag's attribute list into a [`ParameterRecord`],
//! * [`resolve`] makes a reference absolute against a base URL.
//!
//! [`parse_tags`] and [`TagStream`] chain the first three over a whole
//! playlist, configured through [`ParseOptions`].
//!
//! [`TagEntry`]: types/struct.TagEntry.html
//! [`normalize`]: fn.normalize.html
//! [`classify`]: fn.classify.html
//! [`ProtocolTag`]: types/enum.ProtocolTag.html
//! [`destructure`]: fn.destructure.html
//! [`ParameterRecord`]: types/struct.ParameterRecord.html
//! [`resolve`]: fn.resolve.html
//! [`parse_tags`]: fn.parse_tags.html
//! [`TagStream`]: struct.TagStream.html
//! [`ParseOptions`]: struct.ParseOptions.html
//!
//! # Examples
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use hls_parse::{parse_tags, ParseOptions, ProtocolTag, UnknownTagPolicy};
//!
//! let base = "https://cdn.example.com/vod/720p/index.m3u8";
//! let text = std::fs::read_to_string("index.m3u8")?;
//!
//! // ignore directives this crate doesn't know, e.g. #EXT-X-VERSION
//! let options = ParseOptions::new().unknown_tags(UnknownTagPolicy::Skip);
//!
//! let mut duration = 0.0;
//! for entry in parse_tags(&text, &options)? {
//!     match entry.tag {
//!         ProtocolTag::Extinf => {
//!             let params = entry.params.as_ref().expect("#EXTINF without duration");
//!             duration += params.value_as::<f64>(0)?.unwrap_or(0.0);
//!         }
//!         ProtocolTag::Value => println!("segment {}", entry.uri(base)?.unwrap()),
//!         _ => {}
//!     }
//! }
//! println!("total duration: {:.1}s", duration);
//! # Ok(())
//! # }
//! ```
pub mod error;
mod options;
mod parser;
mod resolve;
pub mod types;

pub use error::{HlsParseError, Result};
pub use options::*;
pub use parser::{classify, destructure, destructure_with, normalize, parse_tags, TagStream};
pub use resolve::resolve;
pub use types::*;
