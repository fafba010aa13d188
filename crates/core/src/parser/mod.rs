//! Parsing of raw `nm --print-size` symbol listings.
//!
//! Accepted line shapes (whitespace separated):
//! - `address size kind name`
//! - `address kind name` (no size column)
//! - `kind name` (undefined or weak-undefined symbols, no address)
//!
//! Blank lines and archive member headers such as `liblib.o:` are skipped.
//! A weak line without an address (`w name`) is an unresolved weak reference;
//! it is still returned as a weak record with no address and no size.
//! Any other malformed line aborts the whole listing: skipping it would
//! understate the size totals built on top of the result.

use thiserror::Error;

use crate::model::{Binding, SymbolKind, SymbolRecord};

/// Why a single line could not be turned into a symbol record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedReason {
    #[error("expected 3 or 4 fields, found {0}")]
    FieldCount(usize),
    #[error("address '{0}' is not hexadecimal")]
    InvalidAddress(String),
    #[error("size '{0}' is not hexadecimal")]
    InvalidSize(String),
    #[error("unrecognized symbol kind '{0}'")]
    UnrecognizedSymbolKind(String),
    #[error("symbol name is empty")]
    EmptyName,
    #[error("mangled listing has {mangled} records but demangled listing has {demangled}")]
    PairedLineCount { mangled: usize, demangled: usize },
    #[error("demangled listing disagrees on {0}")]
    PairedMismatch(&'static str),
}

/// Error type for listing parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A line that could not be parsed. `line` is 1-based.
    #[error("Malformed record at line {line}: {reason}")]
    MalformedRecord { line: usize, reason: MalformedReason },
}

impl ParseError {
    pub fn line(&self) -> usize {
        match self {
            ParseError::MalformedRecord { line, .. } => *line,
        }
    }

    pub fn reason(&self) -> &MalformedReason {
        match self {
            ParseError::MalformedRecord { reason, .. } => reason,
        }
    }
}

fn malformed(line: usize, reason: MalformedReason) -> ParseError {
    ParseError::MalformedRecord { line, reason }
}

/// Map an `nm` kind letter to a symbol kind and binding.
///
/// Returns `None` for letters outside the known alphabet.
pub fn kind_from_letter(letter: char) -> Option<(SymbolKind, Binding)> {
    let kind = match letter {
        'T' | 't' | 'i' => SymbolKind::Code,
        'D' | 'd' | 'G' | 'g' | 'u' => SymbolKind::InitializedData,
        'B' | 'b' | 'S' | 's' | 'C' | 'c' => SymbolKind::UninitializedData,
        'R' | 'r' | 'n' => SymbolKind::ReadOnlyData,
        'W' | 'w' | 'V' | 'v' => SymbolKind::Weak,
        'U' => SymbolKind::Undefined,
        'A' | 'a' => SymbolKind::Absolute,
        'N' | 'p' | 'I' | '-' | '?' => SymbolKind::Other,
        _ => return None,
    };
    let binding = match letter {
        'W' | 'w' | 'V' | 'v' => Binding::Weak,
        'u' => Binding::Global,
        c if c.is_ascii_uppercase() => Binding::Global,
        _ => Binding::Local,
    };
    Some((kind, binding))
}

/// How the symbol name is delimited on a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NameMode {
    /// Raw listings: the name is exactly one token.
    Token,
    /// Demangled listings: the name is the rest of the line and may contain spaces.
    Tail,
}

/// Parse a complete listing into records, preserving the listing order.
pub fn parse_listing(text: &str) -> Result<Vec<SymbolRecord>, ParseError> {
    parse_lines(text.lines())
}

/// Parse a sequence of listing lines into records.
pub fn parse_lines<'a, I>(lines: I) -> Result<Vec<SymbolRecord>, ParseError>
where
    I: IntoIterator<Item = &'a str>,
{
    let records: Vec<SymbolRecord> = parse_numbered(lines, NameMode::Token)?
        .into_iter()
        .map(|(_, record)| record)
        .collect();
    tracing::debug!(records = records.len(), "parsed symbol listing");
    Ok(records)
}

/// Parse a raw listing together with the `--demangle` listing of the same binary.
///
/// Both listings must describe the same symbols in the same order; each record
/// takes its `name` from the raw listing and its `demangled_name` from the other.
pub fn parse_paired(mangled: &str, demangled: &str) -> Result<Vec<SymbolRecord>, ParseError> {
    let raw = parse_numbered(mangled.lines(), NameMode::Token)?;
    let pretty = parse_numbered(demangled.lines(), NameMode::Tail)?;

    if raw.len() != pretty.len() {
        // Point at the first record that has no partner.
        let line = match raw.get(pretty.len()) {
            Some((line, _)) => *line,
            None => pretty.get(raw.len()).map(|(line, _)| *line).unwrap_or(1),
        };
        return Err(malformed(
            line,
            MalformedReason::PairedLineCount { mangled: raw.len(), demangled: pretty.len() },
        ));
    }

    let mut records = Vec::with_capacity(raw.len());
    for ((line, record), (_, other)) in raw.into_iter().zip(pretty) {
        if record.address() != other.address() {
            return Err(malformed(line, MalformedReason::PairedMismatch("address")));
        }
        if record.size() != other.size() {
            return Err(malformed(line, MalformedReason::PairedMismatch("size")));
        }
        if record.symbol_kind() != other.symbol_kind() {
            return Err(malformed(line, MalformedReason::PairedMismatch("kind")));
        }
        let demangled_name = other.name().to_string();
        records.push(record.with_demangled(Some(demangled_name)));
    }

    tracing::debug!(records = records.len(), "parsed paired symbol listings");
    Ok(records)
}

fn parse_numbered<'a, I>(
    lines: I,
    mode: NameMode,
) -> Result<Vec<(usize, SymbolRecord)>, ParseError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut records = Vec::new();
    for (idx, line) in lines.into_iter().enumerate() {
        let line_no = idx + 1;
        if let Some(record) = parse_line(line_no, line, mode)? {
            records.push((line_no, record));
        }
    }
    Ok(records)
}

/// Header lines such as `liblib.o:` in archive listings or `SYMBOL TABLE:`.
///
/// Only a lone token ends a header; `addr size T label:` is a symbol.
fn is_section_header(trimmed: &str) -> bool {
    if trimmed == "SYMBOL TABLE:" {
        return true;
    }
    let mut tokens = trimmed.split_whitespace();
    matches!((tokens.next(), tokens.next()), (Some(token), None) if token.ends_with(':'))
}

fn is_single_char(token: &str) -> bool {
    let mut chars = token.chars();
    chars.next().is_some() && chars.next().is_none()
}

fn parse_line(
    line_no: usize,
    line: &str,
    mode: NameMode,
) -> Result<Option<SymbolRecord>, ParseError> {
    let trimmed = line.trim();
    if trimmed.is_empty() || is_section_header(trimmed) {
        return Ok(None);
    }

    let tokens: Vec<&str> = trimmed.split_whitespace().collect();
    let kind_idx = locate_kind(line_no, &tokens, mode)?;

    let kind_token = tokens[kind_idx];
    let letter = kind_token.chars().next().unwrap_or_default();
    let (kind, binding) = kind_from_letter(letter).ok_or_else(|| {
        malformed(line_no, MalformedReason::UnrecognizedSymbolKind(kind_token.to_string()))
    })?;

    // Only undefined and weak-undefined symbols are printed without an address.
    if kind_idx == 0 && !matches!(kind, SymbolKind::Undefined | SymbolKind::Weak) {
        return Err(malformed(line_no, MalformedReason::FieldCount(tokens.len())));
    }

    let address = match kind_idx {
        0 => None,
        _ => Some(parse_hex(tokens[0]).ok_or_else(|| {
            malformed(line_no, MalformedReason::InvalidAddress(tokens[0].to_string()))
        })?),
    };
    let size = match kind_idx {
        2 => Some(parse_hex(tokens[1]).ok_or_else(|| {
            malformed(line_no, MalformedReason::InvalidSize(tokens[1].to_string()))
        })?),
        _ => None,
    };

    let name = tokens[kind_idx + 1..].join(" ");
    let record = SymbolRecord::new(name, address, size, kind, binding)
        .map_err(|_| malformed(line_no, MalformedReason::EmptyName))?;
    Ok(Some(record))
}

/// Find the index of the kind-letter token on a line.
fn locate_kind(line_no: usize, tokens: &[&str], mode: NameMode) -> Result<usize, ParseError> {
    let count = tokens.len();
    match mode {
        NameMode::Token => {
            let idx = match count {
                2 => 0,
                3 => 1,
                4 => 2,
                _ => return Err(malformed(line_no, MalformedReason::FieldCount(count))),
            };
            if is_single_char(tokens[idx]) {
                return Ok(idx);
            }
            // `addr size T` with the name missing still reads as a field-count problem.
            if count == 2 || tokens.last().is_some_and(|t| is_single_char(t)) {
                return Err(malformed(line_no, MalformedReason::FieldCount(count)));
            }
            Err(malformed(
                line_no,
                MalformedReason::UnrecognizedSymbolKind(tokens[idx].to_string()),
            ))
        }
        NameMode::Tail => (0..3)
            .find(|&idx| idx + 1 < count && is_single_char(tokens[idx]))
            .ok_or_else(|| malformed(line_no, MalformedReason::FieldCount(count))),
    }
}

fn parse_hex(token: &str) -> Option<u64> {
    if token.is_empty() || !token.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    u64::from_str_radix(token, 16).ok()
}
