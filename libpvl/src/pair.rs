//! Phase 3: Pair Reader
//!
//! Reads one `NAME = VALUE [<UNIT>]` statement. Values are scalars or
//! bracketed lists (`(...)` / `{...}`, possibly nested). Block keywords are
//! reported separately so the group builder can open and close scopes.

use crate::error::{ParseError, Result};
use crate::tokenizer::Cursor;
use crate::value::{ContainerKind, Quantity, Value};

/// Statement that closes a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminal {
    End,
    EndGroup,
    EndObject,
}

/// Outcome of reading one statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Pair {
    Terminal(Terminal),
    /// `GROUP = name` or `OBJECT = name`.
    Container { kind: ContainerKind, name: String },
    /// Any other keyword. `text` is the keyword-table rendering.
    Keyword {
        name: String,
        value: Value,
        text: String,
    },
}

/// Read the next statement.
pub fn read_pair(cursor: &mut Cursor, strip_quotes: bool) -> Result<Pair> {
    let Some(name_word) = cursor.read_word(false, strip_quotes)? else {
        return Err(cursor.error(ParseError::UnexpectedEof(String::new())));
    };
    let name = name_word.content;
    if name.eq_ignore_ascii_case("END") {
        return Ok(Pair::Terminal(Terminal::End));
    }

    cursor.skip_white();
    if cursor.peek() != Some('=') {
        // END_GROUP / END_OBJECT may stand alone; plain END already
        // returned above, every other keyword needs `=`.
        if let Some(terminal) = block_terminal(&name) {
            return Ok(Pair::Terminal(terminal));
        }
        if cursor.peek().is_none() {
            return Err(cursor.error(ParseError::UnexpectedEof(String::new())));
        }
        return Err(cursor.error(ParseError::MissingAssignment(name, String::new())));
    }
    if name.is_empty() {
        return Err(cursor.error(ParseError::UnexpectedChar('=', String::new())));
    }
    cursor.advance();
    cursor.skip_white();

    let (value, text, content) = match cursor.peek() {
        Some('(') | Some('{') => {
            let (value, text) = read_list(cursor, strip_quotes)?;
            (value, text.clone(), text)
        }
        _ => {
            let Some(word) = cursor.read_word(false, strip_quotes)? else {
                return Err(cursor.error(ParseError::UnexpectedEof(String::new())));
            };
            if word.text.is_empty() {
                return Err(cursor.error(ParseError::UnexpectedChar('=', String::new())));
            }
            (word.scalar(), word.text, word.content)
        }
    };

    if let Some(terminal) = block_terminal(&name) {
        return Ok(Pair::Terminal(terminal));
    }
    if let Some(kind) = container_kind(&name) {
        return Ok(Pair::Container {
            kind,
            name: content,
        });
    }

    cursor.skip_white();
    if cursor.peek() != Some('<') {
        return Ok(Pair::Keyword { name, value, text });
    }

    let unit = read_unit(cursor)?;
    let text = format!("{} <{}>", text, unit);
    Ok(Pair::Keyword {
        name,
        value: Value::Quantity(Quantity::new(value, unit)),
        text,
    })
}

fn block_terminal(name: &str) -> Option<Terminal> {
    if name.eq_ignore_ascii_case("END_GROUP") {
        Some(Terminal::EndGroup)
    } else if name.eq_ignore_ascii_case("END_OBJECT") {
        Some(Terminal::EndObject)
    } else {
        None
    }
}

fn container_kind(name: &str) -> Option<ContainerKind> {
    if name.eq_ignore_ascii_case("GROUP") {
        Some(ContainerKind::Group)
    } else if name.eq_ignore_ascii_case("OBJECT") {
        Some(ContainerKind::Object)
    } else {
        None
    }
}

/// Read a bracketed list starting at `(` or `{`.
///
/// Returns the tree value (nesting preserved) and the keyword-table text,
/// e.g. `(1,2,3)` or `((1,2),(3,4))`.
fn read_list(cursor: &mut Cursor, strip_quotes: bool) -> Result<(Value, String)> {
    let start = cursor.pos();
    let mut text = String::new();
    let mut stack: Vec<(char, Vec<Value>)> = Vec::new();

    loop {
        cursor.skip_white();
        let Some(c) = cursor.peek() else {
            return Err(cursor.error_at(ParseError::UnbalancedBracket(String::new()), start));
        };
        match c {
            '(' | '{' => {
                cursor.advance();
                text.push(c);
                stack.push((c, Vec::new()));
            }
            ')' | '}' => {
                let open = if c == ')' { '(' } else { '{' };
                let Some((_, items)) = stack.pop().filter(|(top, _)| *top == open) else {
                    return Err(cursor.error(ParseError::UnbalancedBracket(String::new())));
                };
                cursor.advance();
                text.push(c);
                let list = Value::List(items);
                match stack.last_mut() {
                    Some((_, parent)) => parent.push(list),
                    None => return Ok((list, text)),
                }
            }
            ',' => {
                cursor.advance();
                text.push(',');
            }
            _ => {
                let Some(word) = cursor.read_word(true, strip_quotes)? else {
                    return Err(
                        cursor.error_at(ParseError::UnbalancedBracket(String::new()), start)
                    );
                };
                if word.text.is_empty() {
                    return Err(cursor.error(ParseError::UnexpectedChar(c, String::new())));
                }
                text.push_str(&word.text);
                if let Some((_, items)) = stack.last_mut() {
                    items.push(word.list_element());
                }
            }
        }
    }
}

/// Read `<WORD ...>` and return the unit without its angle brackets.
fn read_unit(cursor: &mut Cursor) -> Result<String> {
    let start = cursor.pos();
    let mut parts: Vec<String> = Vec::new();
    loop {
        let word = match cursor.read_word(false, false)? {
            Some(word) if !word.text.is_empty() => word,
            _ => {
                return Err(cursor.error_at(ParseError::UnmatchedAngle(String::new()), start));
            }
        };
        let done = word.text.ends_with('>');
        parts.push(word.text);
        if done {
            break;
        }
    }
    let unit = parts.join(" ");
    let unit = unit.strip_prefix('<').unwrap_or(&unit);
    let unit = unit.strip_suffix('>').unwrap_or(unit);
    Ok(unit.to_string())
}
