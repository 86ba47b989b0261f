//! Sequence diagram grammar, including participant activation bookkeeping.

use super::scanner::Scanner;
use super::{Source, SourceLine};
use crate::error::CheckError;
use std::collections::HashMap;

/// Message arrows, longest first so that prefixes never shadow them.
const ARROWS: &[&str] = &[
    "<<-->>", "<<->>", "-->>", "->>", "-->", "--x", "--)", "->", "-x", "-)",
];

const ARROW_TOKENS: &[&str] = &[
    "SOLID_OPEN_ARROW",
    "DOTTED_OPEN_ARROW",
    "SOLID_ARROW",
    "DOTTED_ARROW",
    "SOLID_CROSS",
    "DOTTED_CROSS",
    "SOLID_POINT",
    "DOTTED_POINT",
];

const STATEMENT_END: &[&str] = &["NEWLINE", ";"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    Loop,
    Alt,
    Opt,
    Par,
    Critical,
    Break,
    Rect,
    Box,
}

const BLOCKS: &[(&str, BlockKind)] = &[
    ("loop", BlockKind::Loop),
    ("alt", BlockKind::Alt),
    ("opt", BlockKind::Opt),
    ("par_over", BlockKind::Par),
    ("par", BlockKind::Par),
    ("critical", BlockKind::Critical),
    ("break", BlockKind::Break),
    ("rect", BlockKind::Rect),
    ("box", BlockKind::Box),
];

/// Branch keywords and the block each one continues.
const BRANCHES: &[(&str, BlockKind)] = &[
    ("else", BlockKind::Alt),
    ("and", BlockKind::Par),
    ("option", BlockKind::Critical),
];

pub(super) fn check(source: &Source<'_>) -> Result<(), CheckError> {
    let mut header = source.header_scanner();
    header.skip_spaces();
    if !header.at_end() {
        return Err(header.error(&["NEWLINE"]).into());
    }

    let mut checker = SequenceChecker::default();
    for line in source.statements() {
        checker.line(line)?;
    }

    if checker.acc_descr_block {
        return Err(source.eof_error(&["}"]).into());
    }
    if !checker.blocks.is_empty() {
        return Err(source.eof_error(&["end"]).into());
    }
    Ok(())
}

#[derive(Debug, Default)]
struct SequenceChecker {
    blocks: Vec<BlockKind>,
    /// Activation depth per participant.
    activations: HashMap<String, usize>,
    acc_descr_block: bool,
}

fn take_text<'a>(sc: &mut Scanner<'a>) -> &'a str {
    sc.take_while(|c| c != ';')
}

/// Reads a participant name, stopping at `:` or `;`.
fn actor<'a>(sc: &mut Scanner<'a>) -> Result<&'a str, CheckError> {
    sc.skip_spaces();
    let name = sc.take_while(|c| c != ':' && c != ';' && c != ',').trim();
    if name.is_empty() {
        return Err(sc.error(&["ACTOR"]).into());
    }
    Ok(name)
}

/// Requires `: text` after a statement head.
fn message_text(sc: &mut Scanner<'_>) -> Result<(), CheckError> {
    sc.skip_spaces();
    if !sc.eat_char(':') {
        return Err(sc.error(&["TXT"]).into());
    }
    take_text(sc);
    Ok(())
}

impl SequenceChecker {
    fn line(&mut self, line: SourceLine<'_>) -> Result<(), CheckError> {
        if self.acc_descr_block {
            if line.text.contains('}') {
                self.acc_descr_block = false;
            }
            return Ok(());
        }

        let mut sc = Scanner::new(line);
        loop {
            sc.skip_spaces();
            if sc.at_end() {
                return Ok(());
            }
            if sc.eat_char(';') {
                continue;
            }
            self.statement(&mut sc)?;
            sc.skip_spaces();
            if sc.at_end() {
                return Ok(());
            }
            if !sc.eat_char(';') {
                return Err(sc.error(STATEMENT_END).into());
            }
        }
    }

    fn statement(&mut self, sc: &mut Scanner<'_>) -> Result<(), CheckError> {
        let start = sc.pos();

        if sc.eat_keyword_ignore_case("participant") || sc.eat_keyword_ignore_case("actor") {
            return participant(sc);
        }
        if sc.eat_keyword_ignore_case("create") {
            sc.skip_spaces();
            if sc.eat_keyword_ignore_case("participant") || sc.eat_keyword_ignore_case("actor") {
                return participant(sc);
            }
            return Err(sc.error(&["participant", "actor"]).into());
        }
        if sc.eat_keyword_ignore_case("destroy") {
            return actor(sc).map(|_| ());
        }
        if sc.eat_keyword_ignore_case("autonumber") {
            return autonumber(sc);
        }
        if sc.eat_keyword_ignore_case("activate") {
            let name = actor(sc)?;
            *self.activations.entry(name.to_string()).or_default() += 1;
            return Ok(());
        }
        if sc.eat_keyword_ignore_case("deactivate") {
            let name = actor(sc)?;
            return self.deactivate(name);
        }
        if sc.eat_keyword_ignore_case("note") {
            return note(sc);
        }
        if let Some((_, kind)) = BLOCKS
            .iter()
            .find(|(keyword, _)| sc.eat_keyword_ignore_case(keyword))
        {
            self.blocks.push(*kind);
            take_text(sc);
            return Ok(());
        }
        if let Some((keyword, kind)) = BRANCHES
            .iter()
            .find(|(keyword, _)| sc.eat_keyword_ignore_case(keyword))
        {
            if self.blocks.last() != Some(kind) {
                sc.reset(start);
                return Err(sc.error_found(&["end"], *keyword).into());
            }
            take_text(sc);
            return Ok(());
        }
        if sc.eat_keyword_ignore_case("end") {
            if self.blocks.pop().is_none() {
                sc.reset(start);
                return Err(sc.error_found(&["ACTOR"], "end").into());
            }
            return Ok(());
        }
        if sc.eat_keyword_ignore_case("title") {
            sc.skip_spaces();
            sc.eat_char(':');
            take_text(sc);
            return Ok(());
        }
        if sc.eat_keyword_ignore_case("accTitle") {
            return message_text(sc);
        }
        if sc.eat_keyword_ignore_case("accDescr") {
            sc.skip_spaces();
            if sc.eat_char('{') {
                if sc.take_until("}").is_none() {
                    sc.take_rest();
                    self.acc_descr_block = true;
                }
                return Ok(());
            }
            return message_text(sc);
        }
        if ["links", "link", "properties", "details"]
            .iter()
            .any(|keyword| sc.eat_keyword_ignore_case(keyword))
        {
            actor(sc)?;
            return message_text(sc);
        }

        self.message(sc)
    }

    fn deactivate(&mut self, name: &str) -> Result<(), CheckError> {
        match self.activations.get_mut(name) {
            Some(depth) if *depth > 0 => {
                *depth -= 1;
                Ok(())
            }
            _ => Err(CheckError::Diagram(format!(
                "Trying to inactivate an inactive participant ({name})"
            ))),
        }
    }

    /// `From->>+To: text`
    fn message(&mut self, sc: &mut Scanner<'_>) -> Result<(), CheckError> {
        let start = sc.pos();
        let segment = sc.rest().split(';').next().unwrap_or_default();

        let arrow = segment.char_indices().find_map(|(index, _)| {
            ARROWS
                .iter()
                .find(|arrow| segment[index..].starts_with(**arrow))
                .map(|arrow| (index, *arrow))
        });

        let Some((index, arrow)) = arrow else {
            let stop = segment.find(':').unwrap_or(segment.len());
            sc.reset(start + stop);
            return Err(sc.error(ARROW_TOKENS).into());
        };

        let from = segment[..index].trim();
        if from.is_empty() {
            sc.reset(start + index);
            return Err(sc.error_found(&["ACTOR"], arrow).into());
        }
        sc.reset(start + index + arrow.len());

        let activation = match sc.peek() {
            Some(mark @ ('+' | '-')) => {
                sc.bump();
                Some(mark)
            }
            _ => None,
        };

        let to = actor(sc)?;
        message_text(sc)?;

        match activation {
            Some('+') => *self.activations.entry(to.to_string()).or_default() += 1,
            Some(_) => self.deactivate(from)?,
            None => {}
        }
        Ok(())
    }
}

fn participant(sc: &mut Scanner<'_>) -> Result<(), CheckError> {
    if !sc.skip_spaces() {
        return Err(sc.error(&["ACTOR"]).into());
    }
    let start = sc.pos();
    let declaration = take_text(sc);
    let (name, alias) = match declaration.split_once(" as ") {
        Some((name, alias)) => (name.trim(), Some(alias.trim())),
        None => (declaration.trim(), None),
    };

    if name.is_empty() {
        sc.reset(start);
        return Err(sc.error(&["ACTOR"]).into());
    }
    if alias.is_some_and(str::is_empty) {
        return Err(sc.error(&["TXT"]).into());
    }
    Ok(())
}

fn autonumber(sc: &mut Scanner<'_>) -> Result<(), CheckError> {
    sc.skip_spaces();
    if sc.eat_keyword_ignore_case("off") {
        return Ok(());
    }
    for _ in 0..2 {
        sc.skip_spaces();
        if sc.take_while(|c| c.is_ascii_digit()).is_empty() {
            break;
        }
    }
    sc.skip_spaces();
    if sc.at_end() || sc.peek() == Some(';') {
        Ok(())
    } else {
        Err(sc.error(&["NUM", "off", "NEWLINE"]).into())
    }
}

fn note(sc: &mut Scanner<'_>) -> Result<(), CheckError> {
    sc.skip_spaces();
    let over = if sc.eat_keyword_ignore_case("over") {
        true
    } else if sc.eat_keyword_ignore_case("left") || sc.eat_keyword_ignore_case("right") {
        sc.skip_spaces();
        if !sc.eat_keyword_ignore_case("of") {
            return Err(sc.error(&["of"]).into());
        }
        false
    } else {
        return Err(sc.error(&["left_of", "right_of", "over"]).into());
    };

    actor(sc)?;
    if sc.peek() == Some(',') {
        if !over {
            return Err(sc.error(&["TXT"]).into());
        }
        sc.bump();
        actor(sc)?;
    }
    message_text(sc)
}
