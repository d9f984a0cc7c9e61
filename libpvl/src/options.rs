//! Parser configuration.

/// Default number of bytes requested from the source per read.
pub const DEFAULT_CHUNK_SIZE: usize = 512;

/// Default maximum GROUP/OBJECT nesting depth.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Options controlling how a label is read and stored.
///
/// Fields can be set directly or through [`ParseOptions::builder`]:
///
/// ```
/// use libpvl::ParseOptions;
///
/// let opts = ParseOptions::builder()
///     .strip_surrounding_quotes(true)
///     .max_depth(16)
///     .build();
/// assert!(opts.strip_surrounding_quotes);
/// ```
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Store quoted values in the keyword table without their `"`/`'`.
    ///
    /// The tree always holds the unquoted content.
    pub strip_surrounding_quotes: bool,
    /// Bytes requested per read while looking for the `END` line.
    pub chunk_size: usize,
    /// Maximum GROUP/OBJECT nesting depth.
    pub max_depth: usize,
    /// Name reported in error messages.
    pub filename: Option<String>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            strip_surrounding_quotes: false,
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_depth: DEFAULT_MAX_DEPTH,
            filename: None,
        }
    }
}

impl ParseOptions {
    /// Create a new builder for ParseOptions.
    pub fn builder() -> ParseOptionsBuilder {
        ParseOptionsBuilder::new()
    }
}

/// Builder for [`ParseOptions`].
#[derive(Debug, Clone, Default)]
pub struct ParseOptionsBuilder {
    options: ParseOptions,
}

impl ParseOptionsBuilder {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Strip the surrounding quotes of string values in the keyword table.
    pub fn strip_surrounding_quotes(mut self, strip: bool) -> Self {
        self.options.strip_surrounding_quotes = strip;
        self
    }

    /// Set the ingestion chunk size (values below 1 are treated as 1).
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.options.chunk_size = size;
        self
    }

    /// Set the maximum GROUP/OBJECT nesting depth.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.options.max_depth = depth;
        self
    }

    /// Set the filename used in error messages.
    pub fn filename(mut self, name: impl Into<String>) -> Self {
        self.options.filename = Some(name.into());
        self
    }

    /// Build the options.
    pub fn build(self) -> ParseOptions {
        self.options
    }
}
