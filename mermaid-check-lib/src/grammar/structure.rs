//! Structural checks for diagram kinds without a dedicated grammar.
//!
//! Brackets must balance across the whole body and double quotes must close
//! on the line that opened them. Free text after a `:` is skipped once every
//! bracket opened on that line has closed again.

use super::scanner::{is_word_char, Scanner};
use super::Source;
use crate::detect::DiagramKind;
use crate::error::CheckError;
use regex::Regex;
use std::ops::Range;
use std::sync::OnceLock;

/// Relationship cardinalities such as `||--o{`, whose braces are not brackets.
fn cardinality_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(\|o|o\||\|\||\}o|o\{|\}\||\|\{)(--|\.\.)(\|o|o\||\|\||\}o|o\{|\}\||\|\{)")
            .expect("cardinality pattern compiles")
    })
}

fn closer(open: char) -> &'static str {
    match open {
        '(' => ")",
        '[' => "]",
        _ => "}",
    }
}

struct Balance {
    /// Open brackets, innermost last.
    stack: Vec<char>,
    /// Mindmap shapes such as `))bang((` deliberately invert brackets.
    brackets: bool,
    /// Byte ranges of the current line that are skipped entirely.
    skips: Vec<Range<usize>>,
}

pub(super) fn check(source: &Source<'_>) -> Result<(), CheckError> {
    let mut balance = Balance {
        stack: Vec::new(),
        brackets: source.kind() != DiagramKind::Mindmap,
        skips: Vec::new(),
    };
    let er = source.kind() == DiagramKind::EntityRelationship;

    let mut header = source.header_scanner();
    // `kanbanana` names no diagram even though it starts with `kanban`.
    if header.peek().is_some_and(|c| is_word_char(c) || c == '-') {
        return Err(header.error(&["NEWLINE"]).into());
    }
    balance.scan(&mut header)?;
    for line in source.statements() {
        if er {
            balance.skips = cardinality_re()
                .find_iter(line.text)
                .map(|found| found.range())
                .collect();
        }
        balance.scan(&mut Scanner::new(line))?;
    }

    match balance.stack.last() {
        Some(open) => Err(source.eof_error(&[closer(*open)]).into()),
        None => Ok(()),
    }
}

impl Balance {
    fn scan(&mut self, sc: &mut Scanner<'_>) -> Result<(), CheckError> {
        // Brackets above this depth were opened on the current line.
        let mut line_base = self.stack.len();

        while let Some(c) = sc.peek() {
            if let Some(skip) = self.skips.iter().find(|skip| skip.start == sc.pos()) {
                sc.reset(skip.end);
                continue;
            }
            match c {
                '"' => {
                    sc.quoted()?;
                }
                ':' if self.stack.len() <= line_base => break,
                '(' | '[' | '{' if self.brackets => {
                    self.stack.push(c);
                    sc.bump();
                }
                ')' | ']' | '}' if self.brackets => {
                    let expected = self.stack.last().map(|open| closer(*open));
                    match expected {
                        Some(expected) if expected.starts_with(c) => {
                            self.stack.pop();
                        }
                        Some(expected) => {
                            return Err(sc.error_found(&[expected], c.to_string()).into())
                        }
                        None => return Err(sc.error_found(&[], c.to_string()).into()),
                    }
                    line_base = line_base.min(self.stack.len());
                    sc.bump();
                }
                _ => {
                    sc.bump();
                }
            }
        }
        self.skips.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::grammar::test_support::{check_text, syntax_error};
    use rstest::rstest;

    #[rstest]
    #[case("classDiagram\n  class Animal {\n    +int age\n    +isMammal(): bool\n  }\n  Animal <|-- Duck : inherits (maybe")]
    #[case("stateDiagram-v2\n  [*] --> Still\n  Still --> [*]\n  state \"Moving (fast\" as Moving")]
    #[case("erDiagram\n  CUSTOMER ||--o{ ORDER : places\n  ORDER ||--|{ LINE-ITEM : contains\n  CUSTOMER }|..|{ DELIVERY-ADDRESS : uses\n  CUSTOMER {\n    string name\n  }")]
    #[case("mindmap\n  root((mindmap))\n    Tools))bang((\n    Cloud)cloud(")]
    #[case("journey\n  title My day\n  section Go to work\n    Make tea: 5: Me")]
    #[case("quadrantChart\n  Campaign A: [0.3, 0.6]")]
    #[case("xychart-beta\n  x-axis [jan, feb, mar]\n  bar [5000, 6000, 7500]")]
    #[case("gitGraph\n  commit id: \"Normal (1\"\n  branch develop")]
    #[case("kanban\n  todo[Todo]\n    id1[Create docs]@{ ticket: MC-1, priority: 'High' }")]
    #[case("C4Context\n  Person(customerA, \"Banking Customer A\", \"A customer\")")]
    #[case("info")]
    fn accepts_balanced_diagrams(#[case] text: &str) {
        if let Err(err) = check_text(text) {
            panic!("rejected {text:?}: {err}");
        }
    }

    #[rstest]
    #[case("classDiagram\n  class A {\n  +run()", 3, "EOF")]
    #[case("classDiagram\n  class A {\n    +run(]\n  }", 3, "]")]
    #[case("stateDiagram\n  A --> B)", 2, ")")]
    #[case("erDiagram\n  CUSTOMER {\n    string name\n  }}", 4, "}")]
    #[case("C4Context\n  Person(a, \"b\"\n  Person(c, \"d\")", 3, "EOF")]
    fn rejects_unbalanced_diagrams(#[case] text: &str, #[case] line: usize, #[case] found: &str) {
        let err = syntax_error(text);
        assert_eq!((err.line, err.found.as_str()), (line, found), "for {text:?}");
    }

    #[rstest]
    #[case("information about the system", "rmation")]
    #[case("mindmapping notes", "ping")]
    #[case("kanbanana\n  todo[Task]", "ana")]
    #[case("journeys are fun", "s")]
    #[case("stateDiagram-v3", "-")]
    fn rejects_text_glued_to_the_header(#[case] text: &str, #[case] found: &str) {
        let err = syntax_error(text);
        assert_eq!(err.line, 1);
        assert_eq!(err.found, found);
        assert_eq!(err.expected, vec!["NEWLINE".to_string()]);
    }

    #[test]
    fn mismatched_closer_names_expected_bracket() {
        let err = syntax_error("block-beta\n  a[\"x\")");
        assert_eq!(err.expected, vec!["]".to_string()]);
        assert_eq!(err.column, 7);
    }

    #[test]
    fn unterminated_quote_is_lexical() {
        let err = syntax_error("mindmap\n  root\n    \"open");
        assert_eq!(err.line, 3);
        assert!(err.to_string().starts_with("Lexical error on line 3."));
    }
}
