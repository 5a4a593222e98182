use std::io::BufRead;

use tracing::debug;

use crate::error::Error;
use crate::model::Entry;

const QUOTES: [char; 2] = ['"', '\''];

/// Parse assignments from UTF-8 text.
///
/// Malformed lines are skipped, so this cannot fail. Lines are split on
/// `\n` exactly like the reader-based entry points.
pub fn parse_str(input: &str) -> Vec<Entry> {
    parse_lines(input.split('\n'))
}

/// Parse assignments from lines that were already split on newlines.
pub fn parse_lines<'a, I>(lines: I) -> Vec<Entry>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut parser = Parser::new();
    let mut entries = Vec::new();
    for line in lines {
        entries.extend(parser.feed(line));
    }
    parser.finish();
    entries
}

/// Parse assignments from UTF-8 bytes.
pub fn parse_bytes(input: &[u8]) -> Result<Vec<Entry>, Error> {
    parse_reader(input)
}

/// Parse assignments from a buffered reader.
pub fn parse_reader<R: BufRead>(reader: R) -> Result<Vec<Entry>, Error> {
    entries(reader).collect()
}

/// Stream assignments from a buffered reader as each one is completed.
///
/// The iterator yields the first read or decoding error and then ends.
pub fn entries<R: BufRead>(reader: R) -> Entries<R> {
    Entries {
        reader,
        parser: Some(Parser::new()),
        buf: Vec::new(),
    }
}

/// Iterator returned by [`entries`].
#[derive(Debug)]
pub struct Entries<R> {
    reader: R,
    parser: Option<Parser>,
    buf: Vec<u8>,
}

impl<R: BufRead> Iterator for Entries<R> {
    type Item = Result<Entry, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let parser = self.parser.as_mut()?;

            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => {
                    self.parser.take()?.finish();
                    return None;
                }
                Ok(_) => {}
                Err(err) => {
                    self.parser = None;
                    return Some(Err(Error::Io(err)));
                }
            }

            let raw = self.buf.strip_suffix(b"\n").unwrap_or(&self.buf[..]);
            let line = match std::str::from_utf8(raw) {
                Ok(line) => line,
                Err(source) => {
                    let line = parser.line + 1;
                    self.parser = None;
                    return Some(Err(Error::InvalidEncoding { line, source }));
                }
            };

            if let Some(entry) = parser.feed(line) {
                return Some(Ok(entry));
            }
        }
    }
}

/// Push-style line parser.
///
/// Feed physical lines in order with [`Parser::feed`] and call
/// [`Parser::finish`] once the input is exhausted. A line starts a new
/// assignment when it is not a comment and holds exactly one `=`. A value
/// opened with `"` or `'` and not closed on the same line continues over the
/// following lines until a line ending in a quote.
#[derive(Debug, Default)]
pub struct Parser {
    line: u32,
    pending: Option<Pending>,
}

#[derive(Debug)]
struct Pending {
    key: String,
    value: String,
    line: u32,
}

impl Pending {
    fn to_entry(&self) -> Entry {
        Entry::new(self.key.as_str(), self.value.as_str(), self.line)
    }
}

impl Parser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a multi-line value is currently being accumulated.
    pub fn in_block(&self) -> bool {
        self.pending.is_some()
    }

    /// Process one physical line, returning the assignment it produces.
    ///
    /// Every interior line of a multi-line value yields the text accumulated
    /// so far, so the key always holds the latest value in file order.
    ///
    /// A trailing `\r` is ignored.
    pub fn feed(&mut self, line: &str) -> Option<Entry> {
        self.line += 1;
        let line_num = self.line;
        let line = line.strip_suffix('\r').unwrap_or(line);
        let is_comment = line.starts_with('#');

        // Comments only skip this branch: inside an open block they still
        // reach the continuation below.
        if !is_comment && let Some((key, value)) = split_assignment(line) {
            return self.start_assignment(key, value, line_num);
        }

        if line.is_empty() {
            return None;
        }
        if self.pending.is_some() {
            return self.continue_block(line);
        }
        if !is_comment {
            debug!(line = line_num, "skipping line that is not a KEY=VALUE assignment");
        }
        None
    }

    /// End the input.
    ///
    /// An unterminated multi-line value has already produced its text line by
    /// line, so nothing is left to emit.
    pub fn finish(self) {
        if let Some(pending) = &self.pending {
            debug!(
                key = %pending.key,
                line = pending.line,
                "multi-line value not closed before end of input"
            );
        }
    }

    fn start_assignment(&mut self, key: &str, value: &str, line: u32) -> Option<Entry> {
        if is_quoted(value) {
            return Some(Entry::new(key, &value[1..value.len() - 1], line));
        }

        if let Some(rest) = value.strip_prefix(QUOTES) {
            let opened = Pending {
                key: key.to_owned(),
                value: format!("{rest}\n"),
                line,
            };
            if let Some(abandoned) = self.pending.replace(opened) {
                debug!(
                    key = %abandoned.key,
                    line = abandoned.line,
                    "multi-line value replaced by a new one"
                );
            }
            return None;
        }

        Some(Entry::new(key, value, line))
    }

    fn continue_block(&mut self, line: &str) -> Option<Entry> {
        // A lone character closes the block and is itself discarded.
        if line.chars().count() == 1 {
            self.pending = None;
            return None;
        }

        if let Some(head) = line.strip_suffix(QUOTES) {
            let mut pending = self.pending.take()?;
            pending.value.push_str(head);
            return Some(pending.to_entry());
        }

        let pending = self.pending.as_mut()?;
        pending.value.push_str(line);
        pending.value.push('\n');
        Some(pending.to_entry())
    }
}

/// Split `KEY=VALUE` on its only `=`, trimming spaces from both halves.
fn split_assignment(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    if value.contains('=') {
        return None;
    }

    let key = key.trim_matches(' ');
    if key.is_empty() {
        return None;
    }

    Some((key, value.trim_matches(' ')))
}

fn is_quoted(value: &str) -> bool {
    value.chars().count() >= 2
        && QUOTES
            .iter()
            .any(|&quote| value.starts_with(quote) && value.ends_with(quote))
}
