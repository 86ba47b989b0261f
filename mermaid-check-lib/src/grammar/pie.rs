//! Pie chart grammar.

use super::scanner::Scanner;
use super::Source;
use crate::error::CheckError;

pub(super) fn check(source: &Source<'_>) -> Result<(), CheckError> {
    let mut header = source.header_scanner();
    header.skip_spaces();
    header.eat_keyword("showData");
    header.skip_spaces();
    if header.eat_keyword("title") {
        header.take_rest();
    }
    if !header.at_end() {
        return Err(header.error(&["showData", "title", "NEWLINE"]).into());
    }

    let mut acc_descr_block = false;
    for line in source.statements() {
        if acc_descr_block {
            acc_descr_block = !line.text.contains('}');
            continue;
        }

        let mut sc = Scanner::new(line);
        sc.skip_spaces();
        if sc.eat_keyword("title") {
            continue;
        }
        if sc.eat_keyword("accTitle") {
            sc.skip_spaces();
            if !sc.eat_char(':') {
                return Err(sc.error(&[":"]).into());
            }
            continue;
        }
        if sc.eat_keyword("accDescr") {
            sc.skip_spaces();
            if sc.eat_char('{') {
                acc_descr_block = sc.take_until("}").is_none();
            } else if !sc.eat_char(':') {
                return Err(sc.error(&[":", "{"]).into());
            }
            continue;
        }
        if sc.peek() == Some('"') {
            section(&mut sc)?;
            continue;
        }
        return Err(sc.error(&["title", "accTitle", "accDescr", "STR"]).into());
    }

    if acc_descr_block {
        return Err(source.eof_error(&["}"]).into());
    }
    Ok(())
}

/// `"label" : value`
fn section(sc: &mut Scanner<'_>) -> Result<(), CheckError> {
    let label = sc.quoted()?;
    sc.skip_spaces();
    if !sc.eat_char(':') {
        return Err(sc.error(&[":"]).into());
    }
    sc.skip_spaces();

    let digits = sc.take_while(|c| c.is_ascii_digit() || c == '.' || c == '-');
    let Ok(value) = digits.parse::<f64>() else {
        sc.reset(sc.pos() - digits.len());
        return Err(sc.error(&["NUMBER"]).into());
    };

    sc.skip_spaces();
    if !sc.at_end() {
        return Err(sc.error(&["NEWLINE"]).into());
    }
    if value < 0.0 {
        return Err(CheckError::Diagram(format!(
            "\"{label}\" has invalid value: {value}. Negative values are not allowed in pie charts. All slice values must be >= 0."
        )));
    }
    Ok(())
}
