//! Phase 4: Group Builder
//!
//! Recursive descent over statements. Each GROUP/OBJECT opens a nested
//! scope whose keywords are prefixed with `Name.` in the keyword table;
//! `END`, `END_GROUP`, and `END_OBJECT` close the current scope. The tree
//! and the keyword table are filled in the same pass.

use tracing::trace;

use crate::error::{ParseError, Result};
use crate::keywords::Keywords;
use crate::options::ParseOptions;
use crate::pair::{read_pair, Pair};
use crate::tokenizer::Cursor;
use crate::value::Group;

/// Parse label statements from `cursor` until the top-level terminator.
pub fn parse_label(cursor: &mut Cursor, options: &ParseOptions) -> Result<(Keywords, Group)> {
    let mut builder = Builder {
        cursor,
        options,
        keywords: Keywords::new(),
    };
    let mut root = Group::root();
    builder.read_group("", &mut root, 0)?;
    Ok((builder.keywords, root))
}

struct Builder<'c, 'a> {
    cursor: &'c mut Cursor<'a>,
    options: &'c ParseOptions,
    keywords: Keywords,
}

impl Builder<'_, '_> {
    /// Fill `group` until a terminator closes it.
    fn read_group(&mut self, prefix: &str, group: &mut Group, depth: usize) -> Result<()> {
        loop {
            match read_pair(self.cursor, self.options.strip_surrounding_quotes)? {
                Pair::Terminal(terminal) => {
                    trace!(?terminal, prefix, "scope closed");
                    return Ok(());
                }
                Pair::Container { kind, name } => {
                    if depth >= self.options.max_depth {
                        return Err(self.cursor.error(ParseError::DepthExceeded(
                            self.options.max_depth,
                            String::new(),
                        )));
                    }
                    trace!(?kind, %name, "scope opened");
                    let mut child = Group::new(kind, name.as_str());
                    let child_prefix = format!("{}{}.", prefix, name);
                    self.read_group(&child_prefix, &mut child, depth + 1)?;
                    group.insert_container(child);
                }
                Pair::Keyword { name, value, text } => {
                    self.keywords.upsert(format!("{}{}", prefix, name), text);
                    group.insert_unique(&name, value);
                }
            }
        }
    }
}
