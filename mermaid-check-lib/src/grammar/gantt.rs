//! Gantt chart grammar.
//!
//! Keywords only count as keywords when followed by a usable value; anything
//! else is read as a task and must then carry `: data`.

use super::scanner::Scanner;
use super::{Source, SourceLine};
use crate::error::CheckError;
use regex::Regex;
use std::sync::OnceLock;

/// Keywords that take the rest of the line as their value.
const VALUE_KEYWORDS: &[&str] = &[
    "dateFormat",
    "axisFormat",
    "title",
    "excludes",
    "includes",
    "todayMarker",
    "section",
];

/// Keywords that stand alone on their line.
const FLAG_KEYWORDS: &[&str] = &["inclusiveEndDates", "topAxis"];

const WEEKDAYS: &[&str] = &[
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

const WEEKEND_STARTS: &[&str] = &["friday", "saturday"];

fn tick_interval_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[1-9][0-9]*(millisecond|second|minute|hour|day|week|month)$")
            .expect("static regex is valid")
    })
}

pub(super) fn check(source: &Source<'_>) -> Result<(), CheckError> {
    let mut header = source.header_scanner();
    header.skip_spaces();
    if !header.at_end() {
        return Err(header.error(&["NEWLINE"]).into());
    }

    let mut acc_descr_block = false;
    for line in source.statements() {
        if acc_descr_block {
            acc_descr_block = !line.text.contains('}');
            continue;
        }
        acc_descr_block = statement(line)?;
    }

    if acc_descr_block {
        return Err(source.eof_error(&["}"]).into());
    }
    Ok(())
}

/// Checks one line, returning whether it opened an `accDescr { ... }` block.
fn statement(line: SourceLine<'_>) -> Result<bool, CheckError> {
    let mut sc = Scanner::new(line);
    sc.skip_spaces();
    let start = sc.pos();

    if VALUE_KEYWORDS.iter().any(|keyword| sc.eat_keyword(keyword)) {
        if sc.skip_spaces() && !sc.rest().trim().is_empty() {
            return Ok(false);
        }
        sc.reset(start);
    }
    if FLAG_KEYWORDS.iter().any(|keyword| sc.eat_keyword(keyword)) {
        if sc.rest().trim().is_empty() {
            return Ok(false);
        }
        sc.reset(start);
    }
    if sc.eat_keyword("weekday") && keyword_value(&mut sc, WEEKDAYS) {
        return Ok(false);
    }
    sc.reset(start);
    if sc.eat_keyword("weekend") && keyword_value(&mut sc, WEEKEND_STARTS) {
        return Ok(false);
    }
    sc.reset(start);
    if sc.eat_keyword("tickInterval")
        && sc.skip_spaces()
        && tick_interval_re().is_match(sc.rest().trim_end())
    {
        return Ok(false);
    }
    sc.reset(start);

    if sc.eat_keyword("accTitle") {
        sc.skip_spaces();
        if !sc.eat_char(':') {
            return Err(sc.error(&[":"]).into());
        }
        return Ok(false);
    }
    if sc.eat_keyword("accDescr") {
        sc.skip_spaces();
        if sc.eat_char('{') {
            return Ok(sc.take_until("}").is_none());
        }
        if !sc.eat_char(':') {
            return Err(sc.error(&[":", "{"]).into());
        }
        return Ok(false);
    }
    if sc.eat_keyword("click") {
        if !sc.skip_spaces() || sc.take_while(|c| !c.is_whitespace()).is_empty() {
            return Err(sc.error(&["click"]).into());
        }
        return Ok(false);
    }

    task(&mut sc)?;
    Ok(false)
}

fn keyword_value(sc: &mut Scanner<'_>, allowed: &[&str]) -> bool {
    if !sc.skip_spaces() {
        return false;
    }
    let value = sc.rest().trim_end();
    allowed.iter().any(|candidate| *candidate == value)
}

/// `name : data`, both parts non-empty.
fn task(sc: &mut Scanner<'_>) -> Result<(), CheckError> {
    let name = sc.take_while(|c| c != ':');
    if name.trim().is_empty() {
        return Err(sc.error(&["taskTxt"]).into());
    }
    if !sc.eat_char(':') {
        return Err(sc.error(&["taskData"]).into());
    }
    if sc.rest().trim().is_empty() {
        return Err(sc.error(&["taskData"]).into());
    }
    Ok(())
}
