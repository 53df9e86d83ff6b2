//! The Markdown document model.
//!
//! A converted article body is a [`Document`]: an ordered sequence of
//! top-level [`Node`]s, joined by one blank line when rendered. Each node
//! knows how to render itself; layout choices that the output format leaves
//! open (list indentation) live in [`RenderOptions`].
//!
//! The dialect is CommonMark plus one extension: [`Node::LinkCard`] renders
//! to the `{{< article link="..." >}}` shortcode understood by the site
//! templates, and must be reproduced byte-for-byte.

use std::fmt;

/// Rendering policy for the parts of the output the dialect leaves open.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Indentation prepended per nesting level of a list.
    pub list_indent: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { list_indent: "  ".to_string() }
    }
}

/// A single Markdown node.
///
/// The set is closed: the converter only ever produces these variants, and
/// every variant has exactly one textual rendering. Text fields hold visible
/// text content, never markup.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Verbatim text, whitespace preserved.
    Text(String),
    /// Emphasis. Syntax: `*text*`.
    Emphasis(String),
    /// Strong emphasis. Syntax: `**text**`.
    Strong(String),
    /// Inline code. Syntax: `` `code` ``.
    InlineCode(String),
    /// A hyperlink. Syntax: `[label](url)`.
    Link { label: String, url: String },
    /// An image. Syntax: `![caption](url)`.
    Image { caption: String, url: String },
    /// A fenced code block with a language tag.
    BlockCode { code: String, language: String },
    /// A header. `level` is 1-based.
    Header { level: u8, text: String },
    /// A paragraph of inline nodes.
    Paragraph(Vec<Node>),
    /// An ordered or unordered list. Items are paragraphs or nested lists;
    /// never empty.
    List { ordered: bool, items: Vec<Node> },
    /// A block quote wrapping exactly one paragraph.
    BlockQuote(Box<Node>),
    /// A horizontal rule. Syntax: `---`.
    HorizontalRule,
    /// A hard line break inside a paragraph. Syntax: `<br>`.
    LineBreak,
    /// A link-card shortcode. The title is kept for callers; only the URL
    /// appears in the rendered form.
    LinkCard { title: String, url: String },
}

impl Node {
    /// Renders this node to Markdown text.
    pub fn render(&self, opts: &RenderOptions) -> String {
        match self {
            Node::Text(text) => text.clone(),
            Node::Emphasis(text) => format!("*{}*", text),
            Node::Strong(text) => format!("**{}**", text),
            Node::InlineCode(code) => format!("`{}`", code),
            Node::Link { label, url } => format!("[{}]({})", label, url),
            Node::Image { caption, url } => format!("![{}]({})", caption, url),
            Node::BlockCode { code, language } => format!("```{}\n{}\n```", language, code),
            Node::Header { level, text } => {
                format!("{} {}", "#".repeat(usize::from(*level)), text)
            }
            Node::Paragraph(children) => {
                children.iter().map(|child| child.render(opts)).collect()
            }
            Node::List { ordered, items } => render_list(*ordered, items, 0, opts),
            Node::BlockQuote(paragraph) => format!("> {}", paragraph.render(opts)),
            Node::HorizontalRule => "---".to_string(),
            Node::LineBreak => "<br>".to_string(),
            Node::LinkCard { title: _, url } => {
                format!("{{{{< article link=\"{}\" >}}}}", url)
            }
        }
    }
}

/// Renders one list level. Nested lists render their own rows one level
/// deeper and carry no marker of their own; only leaf items advance the
/// ordered counter.
fn render_list(ordered: bool, items: &[Node], depth: usize, opts: &RenderOptions) -> String {
    let indent = opts.list_indent.repeat(depth);
    let mut rows = Vec::new();
    let mut index = 0usize;

    for item in items {
        match item {
            Node::List { ordered, items } => {
                rows.push(render_list(*ordered, items, depth + 1, opts));
            }
            leaf => {
                index += 1;
                let marker = if ordered { format!("{}. ", index) } else { "- ".to_string() };
                rows.push(format!("{}{}{}", indent, marker, leaf.render(opts)));
            }
        }
    }

    rows.join("\n")
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render(&RenderOptions::default()))
    }
}

/// A converted article body: an ordered sequence of top-level nodes.
///
/// Immutable once built; the converter is the only producer.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Document {
    /// Creates a document from its top-level nodes.
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// The top-level nodes, in document order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Renders the document, joining top-level nodes with one blank line.
    pub fn render(&self, opts: &RenderOptions) -> String {
        self.nodes.iter().map(|node| node.render(opts)).collect::<Vec<_>>().join("\n\n")
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render(&RenderOptions::default()))
    }
}
