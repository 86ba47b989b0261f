use super::SourceLine;
use crate::diagnostic::SyntaxError;

/// A cursor over a single source line.
#[derive(Debug, Clone)]
pub(crate) struct Scanner<'a> {
    line: SourceLine<'a>,
    pos: usize,
}

pub(crate) fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

impl<'a> Scanner<'a> {
    pub fn new(line: SourceLine<'a>) -> Self {
        Self { line, pos: 0 }
    }

    /// Starts scanning `line` at byte offset `pos`.
    pub fn at(line: SourceLine<'a>, pos: usize) -> Self {
        Self { line, pos }
    }

    pub fn line(&self) -> SourceLine<'a> {
        self.line
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn reset(&mut self, pos: usize) {
        self.pos = pos;
    }

    pub fn rest(&self) -> &'a str {
        &self.line.text[self.pos..]
    }

    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    pub fn peek_second(&self) -> Option<char> {
        self.rest().chars().nth(1)
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.line.text.len()
    }

    pub fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    pub fn eat(&mut self, token: &str) -> bool {
        if self.rest().starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    pub fn eat_char(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    /// Consumes `keyword` only when it is not the prefix of a longer word.
    pub fn eat_keyword(&mut self, keyword: &str) -> bool {
        let Some(after) = self.rest().strip_prefix(keyword) else {
            return false;
        };
        if after.chars().next().is_some_and(is_word_char) {
            return false;
        }
        self.pos += keyword.len();
        true
    }

    /// Case-insensitive variant of [`Scanner::eat_keyword`] for ASCII keywords.
    pub fn eat_keyword_ignore_case(&mut self, keyword: &str) -> bool {
        let rest = self.rest();
        let Some(candidate) = rest.get(..keyword.len()) else {
            return false;
        };
        if !candidate.eq_ignore_ascii_case(keyword) {
            return false;
        }
        if rest[keyword.len()..].chars().next().is_some_and(is_word_char) {
            return false;
        }
        self.pos += keyword.len();
        true
    }

    /// Skips spaces and tabs, returning whether anything was skipped.
    pub fn skip_spaces(&mut self) -> bool {
        let start = self.pos;
        self.take_while(|c| c == ' ' || c == '\t');
        self.pos > start
    }

    pub fn take_while(&mut self, predicate: impl Fn(char) -> bool) -> &'a str {
        let rest = self.rest();
        let len = rest
            .char_indices()
            .find(|(_, c)| !predicate(*c))
            .map_or(rest.len(), |(index, _)| index);
        self.pos += len;
        &rest[..len]
    }

    pub fn take_rest(&mut self) -> &'a str {
        let rest = self.rest();
        self.pos = self.line.text.len();
        rest
    }

    /// Consumes through the next `needle` and returns the text before it.
    /// Leaves the cursor untouched when `needle` does not occur.
    pub fn take_until(&mut self, needle: &str) -> Option<&'a str> {
        let rest = self.rest();
        let index = rest.find(needle)?;
        self.pos += index + needle.len();
        Some(&rest[..index])
    }

    /// Consumes a double-quoted string starting at the cursor.
    pub fn quoted(&mut self) -> Result<&'a str, SyntaxError> {
        let start = self.pos;
        if !self.eat_char('"') {
            return Err(self.error(&["STR"]));
        }
        match self.take_until("\"") {
            Some(text) => Ok(text),
            None => {
                self.pos = start;
                Err(self.lexical())
            }
        }
    }

    pub fn column(&self) -> usize {
        self.line.text[..self.pos].chars().count()
    }

    /// Describes the token at the cursor for error messages.
    pub fn found(&self) -> String {
        match self.peek() {
            None => "NEWLINE".to_string(),
            Some(c) if is_word_char(c) => self
                .rest()
                .chars()
                .take_while(|c| is_word_char(*c))
                .collect(),
            Some(c) => c.to_string(),
        }
    }

    pub fn error(&self, expected: &[&str]) -> SyntaxError {
        self.error_found(expected, self.found())
    }

    pub fn error_found(&self, expected: &[&str], found: impl Into<String>) -> SyntaxError {
        SyntaxError::parse(
            self.line.number,
            self.line.text,
            self.column(),
            expected,
            found,
        )
    }

    pub fn lexical(&self) -> SyntaxError {
        SyntaxError::lexical(self.line.number, self.line.text, self.column())
    }
}
