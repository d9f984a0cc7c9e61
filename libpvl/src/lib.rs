//! PVL/ODL label parser.
//!
//! Reads the `KEYWORD = VALUE` labels found at the head of ISIS cubes,
//! PDS products, and VICAR images. A label is a sequence of assignments
//! nested in `GROUP`/`OBJECT` blocks and closed by an `END` line.
//!
//! # Parsing Pipeline
//!
//! 1. **Ingest**: Reads the source in chunks from a byte offset until the
//!    `END` line, so the binary payload after the label is never touched.
//!
//! 2. **Tokenizer**: Walks the label text, skipping comments and whitespace
//!    and producing words (bare, quoted, or bracketed lists).
//!
//! 3. **Pairs**: Turns words into statements: an assignment, a block
//!    opener, or a terminator.
//!
//! 4. **Group Builder**: Nests statements into a [`Group`] tree and fills a
//!    flat [`Keywords`] table keyed by dotted path in the same pass.
//!
//! # Example
//!
//! ```
//! let label = "\
//! OBJECT = IsisCube
//!   GROUP = Dimensions
//!     Samples = 1024
//!   END_GROUP
//! END_OBJECT
//! END
//! ";
//! let reader = libpvl::parse(label).unwrap();
//! assert_eq!(reader.get_keyword("IsisCube.Dimensions.Samples", "0"), "1024");
//! ```

mod encode;
mod error;
mod ingest;
mod json;
mod keywords;
mod options;
mod pair;
mod parser;
mod reader;
mod tokenizer;
mod value;

use std::io::{Read, Seek};

pub use encode::{encode, Format};
pub use error::{ParseContext, ParseError, Result};
pub use keywords::Keywords;
pub use options::{ParseOptions, ParseOptionsBuilder, DEFAULT_CHUNK_SIZE, DEFAULT_MAX_DEPTH};
pub use reader::LabelReader;
pub use tokenizer::parse_number;
pub use value::{ContainerKind, Group, Quantity, Value};

/// Parse label text with default options.
pub fn parse(input: &str) -> Result<LabelReader> {
    parse_with_options(input, ParseOptions::default())
}

/// Parse label text with the given options.
pub fn parse_with_options(input: &str, options: ParseOptions) -> Result<LabelReader> {
    let mut reader = LabelReader::with_options(options);
    reader.ingest_str(input)?;
    Ok(reader)
}

/// Read the label that starts at `offset` in `source`.
///
/// Reading stops at the `END` line; the rest of the source is untouched.
pub fn read_label<R: Read + Seek>(
    source: &mut R,
    offset: u64,
    options: ParseOptions,
) -> Result<LabelReader> {
    let mut reader = LabelReader::with_options(options);
    reader.ingest(source, offset)?;
    Ok(reader)
}
