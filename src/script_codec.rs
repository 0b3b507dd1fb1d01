use std::collections::HashMap;
use std::collections::HashSet;
use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};

// @module: Dialogue script parsing and round-trip serialization

/// Marker that starts a comment line and terminates a statement
pub const STATEMENT_MARKER: char = ';';

/// Characters accepted as the name/text separator.
/// Script authors mix the ASCII colon and the full-width colon.
const SEPARATORS: [char; 2] = [':', '：'];

/// One `-key` or `-key=value` parameter of a statement.
/// Insertion order is significant and preserved on rewrite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    /// Parameter key (for bare flags this is the whole token)
    pub key: String,

    /// Parameter value, absent for bare flags
    pub value: Option<String>,
}

impl Param {
    /// Create a bare flag parameter
    pub fn flag<S: Into<String>>(key: S) -> Self {
        Param { key: key.into(), value: None }
    }

    /// Create a key=value parameter
    pub fn pair<K: Into<String>, V: Into<String>>(key: K, value: V) -> Self {
        Param { key: key.into(), value: Some(value.into()) }
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "-{}={}", self.key, value),
            None => write!(f, "-{}", self.key),
        }
    }
}

/// Single parsed dialogue statement
#[derive(Debug, Clone)]
pub struct DialogueStatement {
    /// Speaking character
    pub character: String,

    /// Free-text segment of the statement
    pub text: String,

    /// Ordered statement parameters
    pub params: Vec<Param>,

    /// 1-based line number of the first source line of this statement
    pub line_number: usize,

    /// Raw source span (continuation lines newline-joined), kept for
    /// exact reconstruction
    pub original_line: String,

    /// Parse-order counter. Unique within one parse call only; this is
    /// NOT an identity across runs.
    pub statement_index: usize,
}

impl fmt::Display for DialogueStatement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.character, self.text)?;
        for param in &self.params {
            write!(f, " {}", param)?;
        }
        write!(f, "{}", STATEMENT_MARKER)
    }
}

/// A span of source lines: either raw pass-through content or a logical
/// line that may carry a statement
#[derive(Debug)]
enum Span<'a> {
    /// Blank line, comment line, or trailing unterminated content
    Raw(&'a str),

    /// Buffered lines up to and including the terminating marker line
    Logical {
        /// 1-based line number of the first buffered line
        start_line: usize,
        /// Raw lines of the span
        lines: Vec<&'a str>,
    },
}

/// Result of parsing one logical line
struct ParsedLogical {
    character: String,
    text: String,
    params: Vec<Param>,
}

/// Dialogue script parser and serializer
pub struct ScriptCodec;

impl ScriptCodec {
    /// Parse script text into dialogue statements.
    ///
    /// Blank lines and comment lines pass through untouched. Lines without
    /// a statement marker are buffered and newline-joined until a marker is
    /// seen, supporting multi-line statements. A statement is kept only if
    /// its character name is in `known_characters`.
    pub fn parse(text: &str, known_characters: &[String]) -> Vec<DialogueStatement> {
        let known: HashSet<&str> = known_characters.iter().map(|s| s.as_str()).collect();
        let mut statements = Vec::new();
        let mut statement_index = 0;

        for span in Self::split_spans(text) {
            let Span::Logical { start_line, lines } = span else {
                continue;
            };
            let joined = lines.join("\n");
            let Some(parsed) = Self::parse_logical(&joined) else {
                continue;
            };
            if !known.contains(parsed.character.as_str()) {
                debug!(
                    "Skipping statement at line {} for unknown character '{}'",
                    start_line, parsed.character
                );
                continue;
            }
            statements.push(DialogueStatement {
                character: parsed.character,
                text: parsed.text,
                params: parsed.params,
                line_number: start_line,
                original_line: joined,
                statement_index,
            });
            statement_index += 1;
        }

        statements
    }

    /// Rewrite script text, replacing the logical-line spans that map to one
    /// of `statements` (by starting line number) with the statement's
    /// canonical form. Everything else (comments, blank lines, untracked
    /// dialogue, trailing inline comments) is preserved exactly.
    pub fn serialize(text: &str, statements: &[DialogueStatement]) -> String {
        let by_line: HashMap<usize, &DialogueStatement> =
            statements.iter().map(|s| (s.line_number, s)).collect();

        let mut out: Vec<String> = Vec::new();
        for span in Self::split_spans(text) {
            match span {
                Span::Raw(line) => out.push(line.to_string()),
                Span::Logical { start_line, lines } => {
                    let joined = lines.join("\n");
                    match by_line.get(&start_line) {
                        Some(statement) => {
                            // Keep whatever followed the first marker on the
                            // terminating line (inline comment text).
                            let trailing = joined
                                .find(STATEMENT_MARKER)
                                .map(|i| &joined[i + STATEMENT_MARKER.len_utf8()..])
                                .unwrap_or("");
                            out.push(format!("{}{}", statement, trailing));
                        }
                        None => out.push(joined),
                    }
                }
            }
        }

        out.join("\n")
    }

    /// Group source lines into pass-through and logical spans.
    ///
    /// Splits on `\n` (not `lines()`) so carriage returns and a trailing
    /// newline survive the round trip.
    fn split_spans(text: &str) -> Vec<Span<'_>> {
        let mut spans = Vec::new();
        let mut buffer: Vec<&str> = Vec::new();
        let mut buffer_start = 0;

        for (idx, line) in text.split('\n').enumerate() {
            let line_number = idx + 1;
            if buffer.is_empty() {
                let trimmed = line.trim();
                if trimmed.is_empty() || trimmed.starts_with(STATEMENT_MARKER) {
                    spans.push(Span::Raw(line));
                    continue;
                }
                buffer_start = line_number;
            }
            buffer.push(line);
            if line.contains(STATEMENT_MARKER) {
                spans.push(Span::Logical {
                    start_line: buffer_start,
                    lines: std::mem::take(&mut buffer),
                });
            }
        }

        // Unterminated tail: no statement, but the content is preserved
        for line in buffer {
            spans.push(Span::Raw(line));
        }

        spans
    }

    /// Parse one joined logical line into its statement parts.
    ///
    /// Only the portion before the first marker is parsed; lines that start
    /// with the separator or whose character segment contains a marker are
    /// discarded.
    fn parse_logical(joined: &str) -> Option<ParsedLogical> {
        let body = match joined.find(STATEMENT_MARKER) {
            Some(i) => &joined[..i],
            None => return None,
        };

        let sep_idx = body.find(&SEPARATORS[..])?;
        if sep_idx == 0 {
            return None;
        }
        let sep_len = body[sep_idx..].chars().next().map(|c| c.len_utf8())?;

        let character = body[..sep_idx].trim();
        if character.is_empty() || character.contains(STATEMENT_MARKER) {
            return None;
        }

        let rest = &body[sep_idx + sep_len..];
        let (text, params) = Self::split_text_and_params(rest);

        Some(ParsedLogical {
            character: character.to_string(),
            text,
            params,
        })
    }

    /// Split the post-separator segment into free text and `-key[=value]`
    /// parameter tokens. A parameter boundary is a space followed by `-`
    /// followed by a key character, so hyphens inside the free text
    /// (dashes, ranges) do not start a parameter.
    fn split_text_and_params(rest: &str) -> (String, Vec<Param>) {
        let mut boundaries = Vec::new();
        let mut search_from = 0;
        while let Some(pos) = rest[search_from..].find(" -") {
            let abs = search_from + pos;
            let after = rest[abs + 2..].chars().next();
            if matches!(after, Some(c) if c.is_alphanumeric() || c == '_') {
                boundaries.push(abs);
            }
            search_from = abs + 2;
        }

        let Some(&first) = boundaries.first() else {
            return (rest.trim().to_string(), Vec::new());
        };

        let text = rest[..first].trim().to_string();
        let mut params = Vec::new();
        for (i, &start) in boundaries.iter().enumerate() {
            let end = boundaries.get(i + 1).copied().unwrap_or(rest.len());
            // Skip the " -" prefix of the token
            let token = rest[start + 2..end].trim_end();
            match token.split_once('=') {
                Some((key, value)) => params.push(Param::pair(key, value)),
                None => params.push(Param::flag(token)),
            }
        }

        (text, params)
    }
}
