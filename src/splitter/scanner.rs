//! Line-at-a-time lexical scanner for SQL scripts.
//!
//! The scanner does not parse SQL. It tracks just enough lexical state
//! (quotes, comments, dollar-quoted bodies and `BEGIN`/`CASE`/`END` nesting)
//! to tell whether a `;` ends a statement or is part of something larger.

/// Kind of comment the scanner is currently inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentKind {
    /// `-- ...` up to the end of the line.
    Line,
    /// `/* ... */`, may span lines.
    Block,
}

/// How a scanned character relates to statement structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    /// Ordinary SQL text.
    Code,
    /// Part of a string literal, quoted identifier or dollar-quoted body.
    Quoted,
    /// Part of a line or block comment.
    Comment,
    /// A `;` that ends the current statement.
    Terminator,
}

/// Mutable lexical state carried across lines of one script.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanState {
    comment: Option<CommentKind>,
    quote: Option<char>,
    pending_escape: bool,
    nesting_depth: usize,
    dollar_tag: Option<String>,
}

impl ScanState {
    /// Returns true while inside a line or block comment.
    pub fn in_comment(&self) -> bool {
        self.comment.is_some()
    }

    /// Returns true while inside a single-quoted string or double-quoted identifier.
    pub fn in_quoted_string(&self) -> bool {
        self.quote.is_some()
    }

    /// Returns true if the previous character was an unconsumed backslash.
    pub fn pending_escape(&self) -> bool {
        self.pending_escape
    }

    /// Depth of open `BEGIN`/`CASE` blocks.
    pub fn nesting_depth(&self) -> usize {
        self.nesting_depth
    }

    /// Tag of the dollar-quoted body currently open, such as `$$` or `$fn$`.
    pub fn open_dollar_tag(&self) -> Option<&str> {
        self.dollar_tag.as_deref()
    }

    /// Returns true inside text whose whitespace is significant.
    pub fn in_literal(&self) -> bool {
        self.quote.is_some() || self.dollar_tag.is_some()
    }

    /// Returns true when a `;` at this point would end a statement.
    pub fn at_top_level(&self) -> bool {
        self.comment.is_none()
            && self.quote.is_none()
            && self.nesting_depth == 0
            && self.dollar_tag.is_none()
    }
}

/// Words after `BEGIN` that make it transaction control rather than a block.
const TRANSACTION_BEGIN_FOLLOWERS: &[&str] = &[
    "TRANSACTION",
    "WORK",
    "ISOLATION",
    "READ",
    "DEFERRABLE",
    "NOT",
];

/// Words after `begin` that mark it as a column name: common type names in a
/// column definition and clause keywords in a query.
///
/// `begin` is a non-reserved word, so it can name a column. Only these common
/// shapes are recognised. A column whose type is a user-defined name still
/// opens a block.
const IDENTIFIER_WORD_FOLLOWERS: &[&str] = &[
    "AND",
    "AS",
    "ASC",
    "DESC",
    "FROM",
    "IN",
    "IS",
    "NULLS",
    "OR",
    "BIGINT",
    "BIGSERIAL",
    "BOOL",
    "BOOLEAN",
    "BYTEA",
    "CHAR",
    "CHARACTER",
    "DATE",
    "DECIMAL",
    "DOUBLE",
    "FLOAT",
    "INT",
    "INTEGER",
    "INTERVAL",
    "JSON",
    "JSONB",
    "NUMERIC",
    "REAL",
    "SERIAL",
    "SMALLINT",
    "TEXT",
    "TIME",
    "TIMESTAMP",
    "TIMESTAMPTZ",
    "TSTZRANGE",
    "UUID",
    "VARCHAR",
];

/// Characters after `begin` that make it an identifier (`begin,`, `begin)`,
/// `begin = ...`, `begin::date`) rather than a keyword.
const IDENTIFIER_FOLLOWERS: &[char] = &[',', ')', '=', '<', '>', '+', '-', '*', '/', ':', '.', '['];

/// Character-level scanner fed one line at a time.
#[derive(Debug, Default)]
pub struct Scanner {
    state: ScanState,
}

impl Scanner {
    /// Creates a scanner with fresh state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the state after the last scanned line.
    pub fn state(&self) -> &ScanState {
        &self.state
    }

    /// Scans one line (without its newline) and classifies every character.
    pub fn scan_line(&mut self, line: &str) -> Vec<(char, CharClass)> {
        let chars: Vec<char> = line.chars().collect();
        let mut out = Vec::with_capacity(chars.len());
        let mut i = 0;

        while i < chars.len() {
            i += self.step(&chars, i, &mut out);
        }

        if self.state.comment == Some(CommentKind::Line) {
            self.state.comment = None;
        }

        out
    }

    /// Consumes at least one character starting at `i`, returning how many.
    fn step(&mut self, chars: &[char], i: usize, out: &mut Vec<(char, CharClass)>) -> usize {
        if self.state.dollar_tag.is_some() {
            return self.step_dollar_body(chars, i, out);
        }

        let c = chars[i];
        let next = chars.get(i + 1).copied();

        match self.state.comment {
            Some(CommentKind::Block) if c == '*' && next == Some('/') => {
                self.state.comment = None;
                return emit(out, &chars[i..i + 2], CharClass::Comment);
            }
            Some(_) => return emit(out, &chars[i..=i], CharClass::Comment),
            None => {}
        }

        let quoted_class = if self.state.quote.is_some() {
            CharClass::Quoted
        } else {
            CharClass::Code
        };

        if self.state.pending_escape {
            self.state.pending_escape = false;
            return emit(out, &chars[i..=i], quoted_class);
        }

        if c == '\\' {
            self.state.pending_escape = true;
            return emit(out, &chars[i..=i], quoted_class);
        }

        if let Some(quote) = self.state.quote {
            if c == quote {
                self.state.quote = None;
            }
            return emit(out, &chars[i..=i], CharClass::Quoted);
        }

        match (c, next) {
            ('\'' | '"', _) => {
                self.state.quote = Some(c);
                return emit(out, &chars[i..=i], CharClass::Quoted);
            }
            ('/', Some('*')) => {
                self.state.comment = Some(CommentKind::Block);
                return emit(out, &chars[i..i + 2], CharClass::Comment);
            }
            ('-', Some('-')) => {
                self.state.comment = Some(CommentKind::Line);
                return emit(out, &chars[i..i + 2], CharClass::Comment);
            }
            _ => {}
        }

        if c == '$' {
            if let Some(len) = dollar_tag_len(chars, i) {
                self.state.dollar_tag = Some(chars[i..i + len].iter().collect());
                return emit(out, &chars[i..i + len], CharClass::Quoted);
            }
        }

        if is_word_start(c) {
            let len = word_len(chars, i);
            self.track_keyword(&chars[i..i + len], &chars[i + len..]);
            return emit(out, &chars[i..i + len], CharClass::Code);
        }

        if c == ';' && self.state.nesting_depth == 0 {
            return emit(out, &chars[i..=i], CharClass::Terminator);
        }

        emit(out, &chars[i..=i], CharClass::Code)
    }

    /// Inside a dollar-quoted body only the opening tag is significant.
    ///
    /// Other tags are body text: an inner `$q$ ... $q$` pair or a stray `$$`
    /// never changes where the body ends.
    fn step_dollar_body(
        &mut self,
        chars: &[char],
        i: usize,
        out: &mut Vec<(char, CharClass)>,
    ) -> usize {
        // The closing tag may directly follow body text (`$$SELECT 1$$`).
        let closing_len = self
            .state
            .dollar_tag
            .as_deref()
            .filter(|tag| starts_with(&chars[i..], tag))
            .map(|tag| tag.chars().count());

        match closing_len {
            Some(len) => {
                self.state.dollar_tag = None;
                emit(out, &chars[i..i + len], CharClass::Quoted)
            }
            None => emit(out, &chars[i..=i], CharClass::Quoted),
        }
    }

    /// Adjusts nesting depth for a whole word followed by `rest` of the line.
    fn track_keyword(&mut self, word: &[char], rest: &[char]) {
        let upper: String = word.iter().collect::<String>().to_ascii_uppercase();
        match upper.as_str() {
            "BEGIN" if opens_block(rest) => self.state.nesting_depth += 1,
            "CASE" => self.state.nesting_depth += 1,
            "END" => self.state.nesting_depth = self.state.nesting_depth.saturating_sub(1),
            _ => {}
        }
    }
}

fn emit(out: &mut Vec<(char, CharClass)>, chars: &[char], class: CharClass) -> usize {
    out.extend(chars.iter().map(|&c| (c, class)));
    chars.len()
}

fn starts_with(chars: &[char], tag: &str) -> bool {
    let mut rest = chars.iter();
    tag.chars().all(|t| rest.next() == Some(&t))
}

fn is_word_start(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

fn word_len(chars: &[char], start: usize) -> usize {
    chars[start..]
        .iter()
        .take_while(|&&c| is_word_char(c))
        .count()
}

/// Length of a `$tag$` opener/closer at `start`, including both dollars.
///
/// Tags follow identifier rules and may be empty (`$$`). A `$` that continues
/// an identifier or introduces a positional parameter (`$1`) is not a tag.
fn dollar_tag_len(chars: &[char], start: usize) -> Option<usize> {
    if start > 0 && is_word_char(chars[start - 1]) {
        return None;
    }

    let mut end = start + 1;
    match chars.get(end) {
        Some('$') => return Some(2),
        Some(&c) if c.is_alphabetic() || c == '_' => end += 1,
        _ => return None,
    }

    while let Some(&c) = chars.get(end) {
        if c == '$' {
            return Some(end - start + 1);
        }
        if !(c.is_alphanumeric() || c == '_') {
            return None;
        }
        end += 1;
    }

    None
}

/// Returns false for `BEGIN;`, `BEGIN TRANSACTION`, `BEGIN ISOLATION LEVEL ...`
/// and for `begin` used as a column name.
fn opens_block(rest: &[char]) -> bool {
    let rest: Vec<char> = rest
        .iter()
        .copied()
        .skip_while(|c| c.is_whitespace())
        .collect();

    match rest.first() {
        Some(';') => false,
        Some(c) if IDENTIFIER_FOLLOWERS.contains(c) => false,
        Some(&c) if is_word_start(c) => {
            let word = rest[..word_len(&rest, 0)]
                .iter()
                .collect::<String>()
                .to_ascii_uppercase();
            !TRANSACTION_BEGIN_FOLLOWERS.contains(&word.as_str())
                && !IDENTIFIER_WORD_FOLLOWERS.contains(&word.as_str())
        }
        _ => true,
    }
}
