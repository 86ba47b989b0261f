//! Diagram type detection from the header keyword.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagramKind {
    Flowchart,
    Sequence,
    Class,
    State,
    EntityRelationship,
    Gantt,
    Pie,
    Journey,
    GitGraph,
    Mindmap,
    Timeline,
    Quadrant,
    Requirement,
    C4,
    Sankey,
    XyChart,
    Block,
    Packet,
    Architecture,
    Kanban,
    Info,
}

/// Header keywords, longest first where one is a prefix of another.
const HEADERS: &[(&str, DiagramKind)] = &[
    ("flowchart-elk", DiagramKind::Flowchart),
    ("flowchart", DiagramKind::Flowchart),
    ("graph", DiagramKind::Flowchart),
    ("sequenceDiagram", DiagramKind::Sequence),
    ("classDiagram-v2", DiagramKind::Class),
    ("classDiagram", DiagramKind::Class),
    ("stateDiagram-v2", DiagramKind::State),
    ("stateDiagram", DiagramKind::State),
    ("erDiagram", DiagramKind::EntityRelationship),
    ("gantt", DiagramKind::Gantt),
    ("pie", DiagramKind::Pie),
    ("journey", DiagramKind::Journey),
    ("gitGraph", DiagramKind::GitGraph),
    ("mindmap", DiagramKind::Mindmap),
    ("timeline", DiagramKind::Timeline),
    ("quadrantChart", DiagramKind::Quadrant),
    ("requirementDiagram", DiagramKind::Requirement),
    ("C4Context", DiagramKind::C4),
    ("C4Container", DiagramKind::C4),
    ("C4Component", DiagramKind::C4),
    ("C4Dynamic", DiagramKind::C4),
    ("C4Deployment", DiagramKind::C4),
    ("sankey-beta", DiagramKind::Sankey),
    ("xychart-beta", DiagramKind::XyChart),
    ("block-beta", DiagramKind::Block),
    ("packet-beta", DiagramKind::Packet),
    ("architecture-beta", DiagramKind::Architecture),
    ("kanban", DiagramKind::Kanban),
    ("info", DiagramKind::Info),
];

/// The detected header: which diagram it is and where the keyword sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header<'a> {
    pub kind: DiagramKind,
    pub keyword: &'static str,
    /// 1-based line of the header.
    pub line: usize,
    /// Text following the keyword on the header line.
    pub rest: &'a str,
}

/// Finds the diagram header on the first non-blank line of `body`.
///
/// Only the keyword prefix is checked here; whatever follows it on the line
/// is left to the grammar.
pub fn detect(body: &str) -> Option<Header<'_>> {
    let (index, line) = body
        .split('\n')
        .enumerate()
        .find(|(_, line)| !line.trim().is_empty())?;
    let trimmed = line.trim_start();

    HEADERS
        .iter()
        .find(|(keyword, _)| trimmed.starts_with(keyword))
        .map(|(keyword, kind)| Header {
            kind: *kind,
            keyword: *keyword,
            line: index + 1,
            rest: &trimmed[keyword.len()..],
        })
}

impl DiagramKind {
    pub fn name(self) -> &'static str {
        match self {
            DiagramKind::Flowchart => "flowchart",
            DiagramKind::Sequence => "sequence",
            DiagramKind::Class => "class",
            DiagramKind::State => "state",
            DiagramKind::EntityRelationship => "er",
            DiagramKind::Gantt => "gantt",
            DiagramKind::Pie => "pie",
            DiagramKind::Journey => "journey",
            DiagramKind::GitGraph => "gitGraph",
            DiagramKind::Mindmap => "mindmap",
            DiagramKind::Timeline => "timeline",
            DiagramKind::Quadrant => "quadrantChart",
            DiagramKind::Requirement => "requirement",
            DiagramKind::C4 => "c4",
            DiagramKind::Sankey => "sankey",
            DiagramKind::XyChart => "xychart",
            DiagramKind::Block => "block",
            DiagramKind::Packet => "packet",
            DiagramKind::Architecture => "architecture",
            DiagramKind::Kanban => "kanban",
            DiagramKind::Info => "info",
        }
    }
}

impl fmt::Display for DiagramKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("graph TD\nA-->B", DiagramKind::Flowchart, "graph")]
    #[case("flowchart-elk LR", DiagramKind::Flowchart, "flowchart-elk")]
    #[case("\n\n   sequenceDiagram\n", DiagramKind::Sequence, "sequenceDiagram")]
    #[case("classDiagram-v2", DiagramKind::Class, "classDiagram-v2")]
    #[case("stateDiagram-v2\n[*] --> A", DiagramKind::State, "stateDiagram-v2")]
    #[case("erDiagram", DiagramKind::EntityRelationship, "erDiagram")]
    #[case("pie showData", DiagramKind::Pie, "pie")]
    #[case("C4Deployment", DiagramKind::C4, "C4Deployment")]
    #[case("xychart-beta", DiagramKind::XyChart, "xychart-beta")]
    fn detects_known_headers(
        #[case] body: &str,
        #[case] kind: DiagramKind,
        #[case] keyword: &str,
    ) {
        let header = detect(body).expect("header detected");
        assert_eq!(header.kind, kind);
        assert_eq!(header.keyword, keyword);
    }

    #[test]
    fn reports_header_line_and_rest() {
        let header = detect("\n\ngraph LR;A-->B").unwrap();
        assert_eq!(header.line, 3);
        assert_eq!(header.rest, " LR;A-->B");
    }

    #[rstest]
    #[case("")]
    #[case("   \n\t\n")]
    #[case("graf TD")]
    #[case("A --> B")]
    fn unknown_text_has_no_header(#[case] body: &str) {
        assert_eq!(detect(body), None);
    }
}
