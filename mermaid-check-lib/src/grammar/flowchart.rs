//! Flowchart (`graph` / `flowchart`) grammar.

use super::scanner::Scanner;
use super::{Source, SourceLine};
use crate::diagnostic::SyntaxError;
use crate::error::CheckError;

const DIRECTIONS: &[&str] = &["TB", "TD", "BT", "RL", "LR", "<", ">", "^", "v"];

/// Node shape openers and the delimiters that may close them, longest opener first.
const SHAPES: &[(&str, &[&str])] = &[
    ("(((", &[")))"]),
    ("((", &["))"]),
    ("([", &["])"]),
    ("[[", &["]]"]),
    ("[(", &[")]"]),
    ("[/", &["/]", "\\]"]),
    ("[\\", &["\\]", "/]"]),
    ("{{", &["}}"]),
    ("(", &[")"]),
    ("[", &["]"]),
    ("{", &["}"]),
    (">", &["]"]),
];

/// Characters that may not appear unquoted inside node text.
const RESERVED_IN_TEXT: &[char] = &['(', ')', '[', ']', '{', '}', '"'];

const STATEMENT_END: &[&str] = &["SEMI", "NEWLINE"];

pub(super) fn check(source: &Source<'_>) -> Result<(), CheckError> {
    let mut checker = FlowchartChecker::default();

    let mut header = source.header_scanner();
    checker.header(&mut header)?;

    for line in source.statements() {
        checker.line(line)?;
    }

    if checker.acc_descr_block {
        return Err(source.eof_error(&["}"]).into());
    }
    if !checker.subgraphs.is_empty() {
        return Err(source.eof_error(&["end"]).into());
    }
    Ok(())
}

#[derive(Debug, Default)]
struct FlowchartChecker {
    /// Lines of the currently open `subgraph` statements.
    subgraphs: Vec<usize>,
    /// Inside a multi-line `accDescr { ... }` block.
    acc_descr_block: bool,
}

fn is_id_char(c: char, next: Option<char>) -> bool {
    match c {
        '-' => !matches!(next, Some('-' | '.' | '>')),
        '=' => next != Some('='),
        '_' | '.' | '$' | '/' | '\\' | '?' | '!' | '\'' | '`' | '+' | '*' | '#' => true,
        _ => c.is_alphanumeric(),
    }
}

fn take_id<'a>(sc: &mut Scanner<'a>) -> &'a str {
    let start = sc.pos();
    while let Some(c) = sc.peek() {
        if !is_id_char(c, sc.peek_second()) {
            break;
        }
        sc.bump();
    }
    &sc.line().text[start..sc.pos()]
}

fn count(sc: &mut Scanner<'_>, c: char) -> usize {
    sc.take_while(|next| next == c).len() / c.len_utf8()
}

/// Consumes an arrow head (`>`, `o`, `x`) if one follows.
fn eat_head(sc: &mut Scanner<'_>) -> bool {
    match sc.peek() {
        Some('>') => sc.eat_char('>'),
        Some(c @ ('o' | 'x')) if !sc.peek_second().is_some_and(char::is_alphanumeric) => {
            sc.eat_char(c)
        }
        _ => false,
    }
}

fn starts_link(sc: &Scanner<'_>) -> bool {
    let rest = sc.rest();
    let body = match rest.chars().next() {
        Some('<') => &rest[1..],
        Some('o' | 'x') if matches!(sc.peek_second(), Some('-' | '=')) => &rest[1..],
        _ => rest,
    };
    ["--", "-.", "==", "~~"]
        .iter()
        .any(|prefix| body.starts_with(prefix))
}

impl FlowchartChecker {
    fn header(&mut self, sc: &mut Scanner<'_>) -> Result<(), SyntaxError> {
        let spaced = sc.skip_spaces();
        if sc.at_end() {
            return Ok(());
        }
        if sc.eat_char(';') {
            return self.statements(sc);
        }
        if !spaced {
            return Err(sc.error(&["DIR", "SEMI", "NEWLINE"]));
        }

        let start = sc.pos();
        let direction = sc.take_while(|c| !c.is_whitespace() && c != ';');
        if !DIRECTIONS.contains(&direction) {
            sc.reset(start);
            return Err(sc.error(&["DIR"]));
        }

        sc.skip_spaces();
        if sc.at_end() {
            Ok(())
        } else if sc.eat_char(';') {
            self.statements(sc)
        } else {
            Err(sc.error(STATEMENT_END))
        }
    }

    fn line(&mut self, line: SourceLine<'_>) -> Result<(), SyntaxError> {
        if self.acc_descr_block {
            if line.text.contains('}') {
                self.acc_descr_block = false;
            }
            return Ok(());
        }
        self.statements(&mut Scanner::new(line))
    }

    /// Checks `;`-separated statements up to the end of the line.
    fn statements(&mut self, sc: &mut Scanner<'_>) -> Result<(), SyntaxError> {
        loop {
            sc.skip_spaces();
            if sc.at_end() {
                return Ok(());
            }
            if sc.eat_char(';') {
                continue;
            }
            self.statement(sc)?;
            sc.skip_spaces();
            if sc.at_end() {
                return Ok(());
            }
            if !sc.eat_char(';') {
                return Err(sc.error(STATEMENT_END));
            }
        }
    }

    fn statement(&mut self, sc: &mut Scanner<'_>) -> Result<(), SyntaxError> {
        let start = sc.pos();

        if sc.eat_keyword("subgraph") {
            return self.subgraph(sc);
        }
        if sc.eat_keyword("end") {
            if self.subgraphs.pop().is_none() {
                sc.reset(start);
                return Err(sc.error(&["NODE_STRING", "subgraph"]));
            }
            return Ok(());
        }
        if sc.eat_keyword("direction") {
            return direction(sc);
        }
        if sc.eat_keyword("classDef") {
            return arguments(sc, &["CLASSDEF_ID", "CLASSDEF_STYLEOPTS"]);
        }
        if sc.eat_keyword("class") {
            return arguments(sc, &["NODE_STRING", "CLASS_NAME"]);
        }
        if sc.eat_keyword("style") {
            return arguments(sc, &["NODE_STRING", "STYLE"]);
        }
        if sc.eat_keyword("linkStyle") {
            return link_style(sc);
        }
        if sc.eat_keyword("click") {
            return arguments(sc, &["NODE_STRING", "CALLBACKNAME"]);
        }
        if sc.eat_keyword("accTitle") {
            return acc_value(sc);
        }
        if sc.eat_keyword("accDescr") {
            return self.acc_descr(sc);
        }

        vertex_statement(sc)
    }

    fn subgraph(&mut self, sc: &mut Scanner<'_>) -> Result<(), SyntaxError> {
        self.subgraphs.push(sc.line().number);
        sc.skip_spaces();

        let id = sc.take_while(|c| c != '[' && c != ';');
        if !sc.eat_char('[') {
            return Ok(());
        }
        if id.trim().is_empty() {
            sc.reset(sc.pos() - 1);
            return Err(sc.error(&["SUBGRAPH_ID"]));
        }

        sc.skip_spaces();
        if sc.peek() == Some('"') {
            sc.quoted()?;
            sc.skip_spaces();
            if !sc.eat_char(']') {
                return Err(sc.error(&["SQE"]));
            }
        } else if sc.take_until("]").is_none() {
            sc.take_rest();
            return Err(sc.error(&["SQE"]));
        }
        Ok(())
    }

    fn acc_descr(&mut self, sc: &mut Scanner<'_>) -> Result<(), SyntaxError> {
        sc.skip_spaces();
        if sc.eat_char('{') {
            if sc.take_until("}").is_none() {
                sc.take_rest();
                self.acc_descr_block = true;
            }
            return Ok(());
        }
        acc_value(sc)
    }
}

fn direction(sc: &mut Scanner<'_>) -> Result<(), SyntaxError> {
    sc.skip_spaces();
    let start = sc.pos();
    let direction = sc.take_while(|c| !c.is_whitespace() && c != ';');
    if DIRECTIONS.contains(&direction) {
        Ok(())
    } else {
        sc.reset(start);
        Err(sc.error(&["DIR"]))
    }
}

/// Checks space-separated arguments; the last one runs to the end of the line.
fn arguments(sc: &mut Scanner<'_>, names: &[&str]) -> Result<(), SyntaxError> {
    for (index, name) in names.iter().enumerate() {
        if !sc.skip_spaces() || sc.at_end() || sc.peek() == Some(';') {
            return Err(sc.error(&[*name]));
        }
        if index + 1 == names.len() {
            sc.take_rest();
        } else {
            sc.take_while(|c| !c.is_whitespace());
        }
    }
    Ok(())
}

fn link_style(sc: &mut Scanner<'_>) -> Result<(), SyntaxError> {
    if !sc.skip_spaces() {
        return Err(sc.error(&["default", "NUM"]));
    }
    let start = sc.pos();
    let target = sc.take_while(|c| !c.is_whitespace());
    let valid = target == "default"
        || target
            .split(',')
            .all(|index| !index.is_empty() && index.chars().all(|c| c.is_ascii_digit()));
    if !valid {
        sc.reset(start);
        return Err(sc.error(&["default", "NUM"]));
    }
    arguments(sc, &["STYLE"])
}

/// `accTitle: text` / `accDescr: text`.
fn acc_value(sc: &mut Scanner<'_>) -> Result<(), SyntaxError> {
    sc.skip_spaces();
    if !sc.eat_char(':') {
        return Err(sc.error(&[":"]));
    }
    sc.take_rest();
    Ok(())
}

/// A chain of node groups joined by links: `A & B --> C -.->|label| D`.
fn vertex_statement(sc: &mut Scanner<'_>) -> Result<(), SyntaxError> {
    node_group(sc)?;
    loop {
        let before = sc.pos();
        sc.skip_spaces();
        if !starts_link(sc) {
            sc.reset(before);
            return Ok(());
        }
        link(sc)?;
        sc.skip_spaces();
        node_group(sc)?;
    }
}

fn node_group(sc: &mut Scanner<'_>) -> Result<(), SyntaxError> {
    node(sc)?;
    loop {
        let before = sc.pos();
        sc.skip_spaces();
        if !sc.eat_char('&') {
            sc.reset(before);
            return Ok(());
        }
        sc.skip_spaces();
        node(sc)?;
    }
}

fn node(sc: &mut Scanner<'_>) -> Result<(), SyntaxError> {
    let start = sc.pos();
    let id = take_id(sc);
    if id.is_empty() {
        return Err(sc.error(&["NODE_STRING"]));
    }
    if matches!(id, "end" | "subgraph") {
        sc.reset(start);
        return Err(sc.error_found(&["NODE_STRING"], id));
    }

    if sc.eat("@{") {
        if sc.take_until("}").is_none() {
            sc.take_rest();
            return Err(sc.error(&["}"]));
        }
    } else if let Some((opener, closers)) = SHAPES
        .iter()
        .find(|(opener, _)| sc.rest().starts_with(opener))
    {
        sc.eat(opener);
        shape_text(sc, closers)?;
    }

    if sc.eat(":::") && take_id(sc).is_empty() {
        return Err(sc.error(&["CLASS_NAME"]));
    }
    Ok(())
}

fn shape_text(sc: &mut Scanner<'_>, closers: &[&str]) -> Result<(), SyntaxError> {
    sc.skip_spaces();
    if sc.peek() == Some('"') {
        sc.quoted()?;
        sc.skip_spaces();
        return if closers.iter().any(|closer| sc.eat(closer)) {
            Ok(())
        } else {
            Err(sc.error(closers))
        };
    }

    loop {
        if closers.iter().any(|closer| sc.eat(closer)) {
            return Ok(());
        }
        match sc.peek() {
            Some(c) if !RESERVED_IN_TEXT.contains(&c) => {
                sc.bump();
            }
            _ => return Err(sc.error(closers)),
        }
    }
}

fn link(sc: &mut Scanner<'_>) -> Result<(), SyntaxError> {
    if !sc.eat_char('<') && matches!(sc.peek(), Some('o' | 'x')) {
        sc.bump();
    }

    match sc.peek() {
        Some('~') => {
            if count(sc, '~') < 3 {
                return Err(sc.error(&["~~~"]));
            }
        }
        Some('=') => stroke(sc, '=')?,
        Some('-' | '.') => stroke(sc, '-')?,
        _ => return Err(sc.error(&["LINK"])),
    }

    let before = sc.pos();
    sc.skip_spaces();
    if !sc.eat_char('|') {
        sc.reset(before);
        return Ok(());
    }
    if sc.take_until("|").is_none() {
        sc.take_rest();
        return Err(sc.error(&["PIPE"]));
    }
    Ok(())
}

/// Solid (`-`) or thick (`=`) links, including the `-- text -->` form.
fn stroke(sc: &mut Scanner<'_>, c: char) -> Result<(), SyntaxError> {
    let run = count(sc, c);
    if c == '-' && sc.peek() == Some('.') && run <= 1 {
        return dotted(sc, run);
    }
    if run < 2 {
        return Err(sc.error(&["LINK"]));
    }
    if eat_head(sc) || run >= 3 {
        return Ok(());
    }

    let opener: String = [c, c].iter().collect();
    let text_start = sc.pos();
    let Some(text) = sc.take_until(&opener) else {
        sc.take_rest();
        return Err(sc.error(&["LINK"]));
    };
    if text.trim().is_empty() {
        sc.reset(text_start);
        return Err(sc.error(&["EDGE_TEXT"]));
    }

    let closing = 2 + count(sc, c);
    if eat_head(sc) || closing >= 3 {
        Ok(())
    } else {
        Err(sc.error(&["LINK"]))
    }
}

/// Dotted links (`-.-`, `-.->`) and the `-. text .->` form.
fn dotted(sc: &mut Scanner<'_>, dashes: usize) -> Result<(), SyntaxError> {
    let dots = count(sc, '.');
    if sc.eat_char('-') {
        eat_head(sc);
        return Ok(());
    }
    if dashes != 1 || dots != 1 {
        return Err(sc.error(&["-"]));
    }

    let text_start = sc.pos();
    let Some(text) = sc.take_until(".-") else {
        sc.take_rest();
        return Err(sc.error(&["LINK"]));
    };
    if text.trim().is_empty() {
        sc.reset(text_start);
        return Err(sc.error(&["EDGE_TEXT"]));
    }
    eat_head(sc);
    Ok(())
}
