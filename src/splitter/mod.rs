//! Statement splitting for multi-statement SQL scripts.
//!
//! Feeds a script through the [`Scanner`] line by line and yields every
//! statement in script order. Whitespace and comments between statements are
//! separators and are dropped; comments inside a statement are kept.

mod scanner;

pub use scanner::{CharClass, CommentKind, ScanState, Scanner};

use std::collections::VecDeque;
use std::fmt;
use std::iter::Enumerate;
use std::str::Lines;

/// One executable SQL statement isolated from a script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    text: String,
    line: usize,
}

impl Statement {
    /// Creates a statement starting at the given 1-based line.
    pub fn new(text: impl Into<String>, line: usize) -> Self {
        Self {
            text: text.into(),
            line,
        }
    }

    /// The statement text, including its terminating `;` when it had one.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// 1-based line number of the statement's first character.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Returns at most `max_chars` characters, with `...` appended when cut.
    pub fn preview(&self, max_chars: usize) -> String {
        let mut chars = self.text.chars();
        let head: String = chars.by_ref().take(max_chars).collect();
        if chars.next().is_some() {
            format!("{head}...")
        } else {
            head
        }
    }

    /// First line of the statement, for compact listings.
    pub fn first_line(&self) -> &str {
        self.text.lines().next().unwrap_or_default()
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Lazy iterator over the statements of a script.
///
/// Consumes lines only as far as needed to produce the next statement.
pub struct StatementIter<'a> {
    lines: Enumerate<Lines<'a>>,
    scanner: Scanner,
    buffer: String,
    start_line: usize,
    ready: VecDeque<Statement>,
    finished: bool,
}

impl<'a> StatementIter<'a> {
    /// Creates an iterator over the statements of `script`.
    pub fn new(script: &'a str) -> Self {
        Self {
            lines: script.lines().enumerate(),
            scanner: Scanner::new(),
            buffer: String::new(),
            start_line: 1,
            ready: VecDeque::new(),
            finished: false,
        }
    }

    fn feed_line(&mut self, line_no: usize, line: &str) {
        if line.trim().is_empty() && !self.scanner.state().in_literal() {
            return;
        }

        for (c, class) in self.scanner.scan_line(line) {
            if self.buffer.is_empty() {
                let separator = c.is_whitespace()
                    || matches!(class, CharClass::Comment | CharClass::Terminator);
                if separator {
                    continue;
                }
                self.start_line = line_no;
            }

            self.buffer.push(c);

            if class == CharClass::Terminator {
                self.finish_statement();
            }
        }

        if !self.buffer.is_empty() {
            self.buffer.push('\n');
        }
    }

    fn finish_statement(&mut self) {
        let text = self.buffer.trim_end();
        if !text.is_empty() {
            self.ready.push_back(Statement::new(text, self.start_line));
        }
        self.buffer.clear();
    }
}

impl Iterator for StatementIter<'_> {
    type Item = Statement;

    fn next(&mut self) -> Option<Statement> {
        loop {
            if let Some(statement) = self.ready.pop_front() {
                return Some(statement);
            }
            if self.finished {
                return None;
            }
            match self.lines.next() {
                Some((idx, line)) => self.feed_line(idx + 1, line),
                None => {
                    // A final statement without `;` is still emitted.
                    self.finished = true;
                    self.finish_statement();
                }
            }
        }
    }
}

/// Splits a script into its statements, in script order.
pub fn split_statements(script: &str) -> Vec<Statement> {
    StatementIter::new(script).collect()
}
