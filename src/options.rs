/// How a tag's attribute list is split into tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeSyntax {
    /// All quote characters are removed before splitting on `,` and `=`.
    ///
    /// A quoted value containing a comma or an equals sign is split apart.
    Legacy,
    /// Commas and equals signs inside `"..."` or `'...'` don't split. Quote
    /// characters are removed from names and values afterwards.
    QuoteAware,
}

impl Default for AttributeSyntax {
    fn default() -> Self {
        AttributeSyntax::Legacy
    }
}

/// What a [`TagStream`] does with a line that has a tag marker but an
/// unrecognized name.
///
/// [`TagStream`]: struct.TagStream.html
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnknownTagPolicy {
    /// Stop with an `UnrecognizedTag` error.
    Fail,
    /// Drop the line.
    Skip,
    /// Emit the line as a `Nil` entry without parameters.
    Keep,
}

impl Default for UnknownTagPolicy {
    fn default() -> Self {
        UnknownTagPolicy::Fail
    }
}

/// Parser configuration.
///
/// # Examples
/// ```
/// use hls_parse::{AttributeSyntax, ParseOptions, UnknownTagPolicy};
///
/// let options = ParseOptions::new()
///     .attribute_syntax(AttributeSyntax::QuoteAware)
///     .unknown_tags(UnknownTagPolicy::Skip);
/// assert_eq!(options.unknown_tags, UnknownTagPolicy::Skip);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    pub attribute_syntax: AttributeSyntax,
    pub unknown_tags: UnknownTagPolicy,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attribute_syntax(mut self, syntax: AttributeSyntax) -> Self {
        self.attribute_syntax = syntax;
        self
    }

    pub fn unknown_tags(mut self, policy: UnknownTagPolicy) -> Self {
        self.unknown_tags = policy;
        self
    }
}
