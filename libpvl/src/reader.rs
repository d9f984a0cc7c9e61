//! The label reader: one ingestion, then queries.

use std::io::{Read, Seek};

use tracing::debug;

use crate::error::{ParseContext, ParseError, Result};
use crate::ingest::read_label_text;
use crate::keywords::Keywords;
use crate::options::ParseOptions;
use crate::parser::parse_label;
use crate::tokenizer::Cursor;
use crate::value::Group;

/// Reads one label and answers keyword queries about it.
///
/// ```
/// use libpvl::LabelReader;
///
/// let mut reader = LabelReader::new();
/// reader.ingest_str("GROUP = MAP\n  SCALE = 4.0 <KM/PIXEL>\nEND_GROUP\nEND\n").unwrap();
/// assert_eq!(reader.get_keyword("MAP.SCALE", ""), "4.0 <KM/PIXEL>");
///
/// let tree = reader.steal_tree().unwrap();
/// let scale = tree.lookup("MAP.SCALE").and_then(|v| v.as_quantity()).unwrap();
/// assert_eq!(scale.unit, "KM/PIXEL");
/// ```
#[derive(Debug, Default)]
pub struct LabelReader {
    options: ParseOptions,
    keywords: Keywords,
    tree: Option<Group>,
    ingested: bool,
}

impl LabelReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ParseOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Read and parse the label found at `offset` in `source`.
    ///
    /// May be called once per reader. On failure the reader holds no
    /// keywords and no tree.
    pub fn ingest<R: Read + Seek>(&mut self, source: &mut R, offset: u64) -> Result<()> {
        self.begin()?;
        let text = read_label_text(source, offset, self.options.chunk_size)?;
        self.parse_text(&text)
    }

    /// Parse label text already in memory.
    pub fn ingest_str(&mut self, text: &str) -> Result<()> {
        self.begin()?;
        self.parse_text(text)
    }

    fn begin(&mut self) -> Result<()> {
        if self.ingested {
            return Err(ParseError::AlreadyIngested);
        }
        self.ingested = true;
        Ok(())
    }

    fn parse_text(&mut self, text: &str) -> Result<()> {
        let ctx = ParseContext::new(self.options.filename.as_deref());
        let mut cursor = Cursor::new(text, &ctx);
        match parse_label(&mut cursor, &self.options) {
            Ok((keywords, tree)) => {
                debug!(keywords = keywords.len(), "label parsed");
                self.keywords = keywords;
                self.tree = Some(tree);
                Ok(())
            }
            Err(e) => {
                debug!(error = %e, "label rejected");
                self.keywords.clear();
                self.tree = None;
                Err(e)
            }
        }
    }

    /// Text of the keyword at dotted `path`, or `default`.
    pub fn get_keyword<'a>(&'a self, path: &str, default: &'a str) -> &'a str {
        self.keywords.get_or(path, default)
    }

    /// The `index`-th (1-based) element of the list at `path`, or `default`.
    pub fn get_keyword_sub(&self, path: &str, index: usize, default: &str) -> String {
        self.keywords
            .get_sub(path, index)
            .unwrap_or_else(|| default.to_string())
    }

    /// All keywords in label order.
    pub fn keywords(&self) -> &Keywords {
        &self.keywords
    }

    /// The tree, unless it was stolen or the parse failed.
    pub fn tree(&self) -> Option<&Group> {
        self.tree.as_ref()
    }

    /// Take ownership of the tree. Later calls return `None`.
    pub fn steal_tree(&mut self) -> Option<Group> {
        self.tree.take()
    }

    /// JSON view of the tree, unless it was stolen.
    pub fn to_json(&self) -> Option<serde_json::Value> {
        self.tree.as_ref().map(Group::to_json)
    }
}
