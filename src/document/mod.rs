//! Document tree for the markdown dialect used by the API documentation.
//!
//! Only the constructs the documentation corpus relies on are modelled:
//! headings, block quotes, fenced code, pipe tables and paragraphs. Nodes are
//! immutable once [`parse`] returns.

mod cursor;
mod parser;
mod table;

pub use parser::{parse, parse_str};
pub use table::{Row, Table};

/// A parsed source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Source path relative to the documentation root, `/`-separated.
    pub path: String,
    /// Level-0 section holding everything in the file.
    pub root: Section,
}

/// Any node of the document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Section(Section),
    Table(Table),
    Codeblock(Codeblock),
    Quote(Quote),
    Text(Text),
}

/// Heading-delimited part of a document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Section {
    /// Number of `#` in the heading; 0 for the document root.
    pub level: usize,
    pub title: String,
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Codeblock {
    /// Info string after the opening fence, if any.
    pub language: Option<String>,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quote {
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text {
    pub content: String,
}

impl Section {
    /// Immediate child sections, in document order.
    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.children.iter().filter_map(|node| match node {
            Node::Section(section) => Some(section),
            _ => None,
        })
    }

    /// Tables that are direct children of this section.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.children.iter().filter_map(|node| match node {
            Node::Table(table) => Some(table),
            _ => None,
        })
    }

    /// Paragraph text that is a direct child of this section.
    pub fn paragraphs(&self) -> impl Iterator<Item = &str> {
        self.children.iter().filter_map(|node| match node {
            Node::Text(text) => Some(text.content.as_str()),
            _ => None,
        })
    }

    /// Visit every section below this one (depth-first, document order),
    /// passing the chain of ancestors from the root down to the parent.
    pub fn walk<'a, F>(&'a self, visit: &mut F)
    where
        F: FnMut(&[&'a Section], &'a Section),
    {
        let mut ancestors = Vec::new();
        walk_inner(self, &mut ancestors, visit);
    }
}

fn walk_inner<'a, F>(section: &'a Section, ancestors: &mut Vec<&'a Section>, visit: &mut F)
where
    F: FnMut(&[&'a Section], &'a Section),
{
    visit(ancestors, section);
    ancestors.push(section);
    for child in section.sections() {
        walk_inner(child, ancestors, visit);
    }
    ancestors.pop();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walk_visits_in_document_order_with_ancestors() {
        let doc = parse_str("a.md", "# A\n## B\n### C\n## D\n");
        let mut seen = Vec::new();
        doc.root.walk(&mut |ancestors, section| {
            seen.push((ancestors.len(), section.title.clone()));
        });
        assert_eq!(
            seen,
            vec![
                (0, String::new()),
                (1, "A".to_string()),
                (2, "B".to_string()),
                (3, "C".to_string()),
                (2, "D".to_string()),
            ]
        );
    }

    #[test]
    fn section_accessors_filter_children() {
        let doc = parse_str(
            "a.md",
            "# A\nintro\n\n| a | b |\n|---|---|\n| 1 | 2 |\n## B\n",
        );
        let a = doc.root.sections().next().unwrap();
        assert_eq!(a.tables().count(), 1);
        assert_eq!(a.sections().count(), 1);
        assert_eq!(a.paragraphs().collect::<Vec<_>>(), vec!["intro"]);
    }
}
