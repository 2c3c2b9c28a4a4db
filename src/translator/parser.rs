//! The parser classifies raw source lines into [`Command`]s.
//!
//! Classification is a pure function of the single line: the comment tail
//! is stripped, the remainder is split on whitespace, and the first token
//! selects the command kind. Operand arity is checked exhaustively per
//! kind. A line that is blank after stripping yields no command at all;
//! that is not an error.

use super::command::{Command, Operator, Segment};
use super::TranslateError;

/// Largest operand that fits a Hack A-instruction literal.
const MAX_INDEX: u16 = 32767;

/// Classify one raw line. `Ok(None)` means the line was blank or pure
/// comment and the caller should move on to the next one.
pub fn parse_line(line: &str) -> Result<Option<Command>, TranslateError> {
    let line = line.split_once("//").map(|(code, _)| code).unwrap_or(line).trim();
    let mut tokens = line.split_whitespace();

    let keyword = match tokens.next() {
        Some(token) => token.to_ascii_lowercase(),
        None => return Ok(None),
    };

    let command = if let Some(op) = Operator::from_mnemonic(&keyword) {
        Command::Arithmetic(op)
    } else {
        match keyword.as_str() {
            "push" => {
                let (segment, index) = segment_and_index(line, &mut tokens)?;
                Command::Push(segment, index)
            }
            "pop" => {
                let (segment, index) = segment_and_index(line, &mut tokens)?;
                Command::Pop(segment, index)
            }
            "label" => Command::Label(symbol(line, &mut tokens)?),
            "goto" => Command::Goto(symbol(line, &mut tokens)?),
            "if-goto" => Command::IfGoto(symbol(line, &mut tokens)?),
            "function" => {
                let name = symbol(line, &mut tokens)?;
                Command::Function(name, index(line, &mut tokens)?)
            }
            "call" => {
                let name = symbol(line, &mut tokens)?;
                Command::Call(name, index(line, &mut tokens)?)
            }
            "return" => Command::Return,
            _ => {
                return Err(malformed(line, &format!("unknown mnemonic `{}`", keyword)));
            }
        }
    };

    if tokens.next().is_some() {
        return Err(malformed(line, "trailing tokens after a complete command"));
    }
    Ok(Some(command))
}

fn malformed(line: &str, why: &str) -> TranslateError {
    TranslateError::MalformedCommand(format!("{} (in `{}`)", why, line))
}

fn segment_and_index<'a, T: Iterator<Item = &'a str>>(
    line: &str,
    tokens: &mut T,
) -> Result<(Segment, u16), TranslateError> {
    let name = tokens
        .next()
        .ok_or_else(|| malformed(line, "expected a segment name"))?;
    let segment = Segment::from_name(name)
        .ok_or_else(|| TranslateError::UnresolvedSegment(format!("unknown segment `{}`", name)))?;
    let index = index(line, tokens)?;
    Ok((segment, index))
}

fn index<'a, T: Iterator<Item = &'a str>>(
    line: &str,
    tokens: &mut T,
) -> Result<u16, TranslateError> {
    let token = tokens
        .next()
        .ok_or_else(|| malformed(line, "expected a non-negative integer"))?;
    let value: u16 = token
        .parse()
        .map_err(|_| malformed(line, &format!("`{}` is not a non-negative integer", token)))?;
    if value > MAX_INDEX {
        return Err(malformed(
            line,
            &format!("{} does not fit an A-instruction literal", value),
        ));
    }
    Ok(value)
}

fn symbol<'a, T: Iterator<Item = &'a str>>(
    line: &str,
    tokens: &mut T,
) -> Result<String, TranslateError> {
    let token = tokens
        .next()
        .ok_or_else(|| malformed(line, "expected a symbol"))?;

    // Hack symbols: letters, digits, `_.$:`, not starting with a digit.
    let starts_with_digit = token
        .chars()
        .next()
        .map(|c| c.is_ascii_digit())
        .unwrap_or(true);
    let all_valid = token
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "_.$:".contains(c));
    if starts_with_digit || !all_valid {
        return Err(malformed(line, &format!("`{}` is not a valid symbol", token)));
    }
    Ok(token.to_string())
}
