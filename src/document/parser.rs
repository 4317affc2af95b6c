//! Line-oriented block parser.
//!
//! Every input line ends up in some node. Candidate blocks that turn out to be
//! malformed (an empty quote, an empty code fence, a table header with no
//! separator row) are kept as paragraph text rather than dropped.

use super::cursor::Cursor;
use super::table::{self, Table};
use super::{Codeblock, Document, Node, Quote, Section, Text};
use regex::Regex;
use std::sync::LazyLock;

// -- Regex patterns -----------------------------------------------------------

static RE_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})[ \t]+(.*?)(?:[ \t]+#+)?[ \t]*$").unwrap());

// -- Public API ---------------------------------------------------------------

/// Parse the lines of one source file into a document tree.
pub fn parse(path: &str, lines: &[String]) -> Document {
    Document {
        path: path.to_string(),
        root: parse_section(0, String::new(), lines),
    }
}

/// Convenience wrapper over [`parse`] for an in-memory string.
pub fn parse_str(path: &str, input: &str) -> Document {
    let lines: Vec<String> = input.lines().map(str::to_string).collect();
    parse(path, &lines)
}

// -- Sections -----------------------------------------------------------------

fn parse_section(level: usize, title: String, lines: &[String]) -> Section {
    let mut children = Children::default();
    let mut cursor = Cursor::new(lines);

    while let Some(line) = cursor.peek() {
        if let Some((depth, title)) = heading(line) {
            cursor.advance();
            let start = cursor.position();
            skip_section_body(&mut cursor, depth);
            let body = cursor.slice(start, cursor.position());
            children.push(Node::Section(parse_section(depth, title, body)));
            continue;
        }

        if line.trim().is_empty() {
            cursor.advance();
            children.blank();
            continue;
        }

        let start = cursor.position();
        let block = if is_fence(line) {
            parse_codeblock(&mut cursor).map(Node::Codeblock)
        } else if table::is_row(line) && cursor.peek_at(1).is_some_and(table::is_separator) {
            parse_table(&mut cursor).map(Node::Table)
        } else if is_quote(line) {
            parse_quote(&mut cursor).map(Node::Quote)
        } else {
            cursor.advance();
            children.text(line);
            continue;
        };

        match block {
            Some(node) => children.push(node),
            None => {
                for line in cursor.slice(start, cursor.position()) {
                    children.text(line);
                }
            }
        }
    }

    Section {
        level,
        title,
        children: children.finish(),
    }
}

/// Move past the body of a section opened at `depth`: everything up to the
/// next heading of equal or shallower depth that is not inside a code fence.
fn skip_section_body(cursor: &mut Cursor<'_>, depth: usize) {
    let mut in_fence = false;
    while let Some(line) = cursor.peek() {
        if is_fence(line) {
            in_fence = !in_fence;
        } else if !in_fence && heading(line).is_some_and(|(d, _)| d <= depth) {
            break;
        }
        cursor.advance();
    }
}

// -- Blocks -------------------------------------------------------------------

fn parse_codeblock(cursor: &mut Cursor<'_>) -> Option<Codeblock> {
    let open = cursor.advance()?;
    let info = open.trim().trim_start_matches('`').trim();
    let body = cursor.take_while(|line| !is_fence(line));
    // Closing fence; an unclosed block runs to the end of the section.
    cursor.advance();

    let content = body.join("\n");
    if content.trim().is_empty() {
        return None;
    }
    Some(Codeblock {
        language: (!info.is_empty()).then(|| info.to_string()),
        content,
    })
}

fn parse_quote(cursor: &mut Cursor<'_>) -> Option<Quote> {
    let lines = cursor.take_while(is_quote);
    let content = lines
        .iter()
        .map(|line| quote_text(line))
        .collect::<Vec<_>>()
        .join("\n");
    if content.trim().is_empty() {
        return None;
    }
    Some(Quote { content })
}

fn parse_table(cursor: &mut Cursor<'_>) -> Option<Table> {
    let header = cursor.advance()?;
    cursor.advance();
    let body = cursor.take_while(table::is_row);
    Table::from_lines(header, body)
}

// -- Line classification ------------------------------------------------------

fn heading(line: &str) -> Option<(usize, String)> {
    let caps = RE_HEADING.captures(line)?;
    Some((caps[1].len(), caps[2].trim().to_string()))
}

fn is_fence(line: &str) -> bool {
    line.trim_start().starts_with("```")
}

fn is_quote(line: &str) -> bool {
    let line = line.trim_start();
    line == ">" || line.starts_with("> ")
}

fn quote_text(line: &str) -> &str {
    let line = line.trim_start();
    line.strip_prefix("> ")
        .or_else(|| line.strip_prefix('>'))
        .unwrap_or(line)
}

// -- Child accumulation -------------------------------------------------------

/// Children of a section under construction. Consecutive paragraph lines are
/// merged into the preceding Text node, keeping interior blank lines.
#[derive(Default)]
struct Children {
    nodes: Vec<Node>,
    pending_blank: usize,
}

impl Children {
    fn push(&mut self, node: Node) {
        self.pending_blank = 0;
        self.nodes.push(node);
    }

    fn blank(&mut self) {
        self.pending_blank += 1;
    }

    fn text(&mut self, line: &str) {
        let line = line.trim_end();
        match self.nodes.last_mut() {
            Some(Node::Text(text)) => {
                for _ in 0..=self.pending_blank {
                    text.content.push('\n');
                }
                text.content.push_str(line);
            }
            _ => self.nodes.push(Node::Text(Text {
                content: line.to_string(),
            })),
        }
        self.pending_blank = 0;
    }

    fn finish(self) -> Vec<Node> {
        self.nodes
    }
}
