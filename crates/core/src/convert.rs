//! Conversion from the article body DOM to the Markdown document model.
//!
//! The converter is a recursive-descent walker over the rich-text container:
//! one function per structural context (body, inline, list, code container,
//! image figure), each dispatching on a closed [`ElementKind`]. There is
//! deliberately no catch-all branch — an element kind without a handler
//! aborts the parse with [`ZhuanlanError::UnsupportedElement`], so new markup
//! on the source platform shows up as an error instead of missing content.
//!
//! URL normalization and link-card title resolution live here too; the
//! network side of the latter is behind the [`PageFetcher`] trait.

use percent_encoding::percent_decode_str;
use url::Url;

use crate::dom::{Document, Element, NodeChild};
use crate::markdown::{self, Node};
use crate::parser::ParserConfig;
use crate::redirects::RedirectMap;
use crate::{Result, ZhuanlanError};

/// Host of the platform's outbound-link redirector.
const REDIRECTOR_HOST: &str = "link.zhihu.com";

/// Pseudo tag name reported for stray text in a block context.
const TEXT_KIND: &str = "#text";

/// Fetches a page body for link-card title resolution.
///
/// The converter performs no other network I/O; implementations decide
/// timeout and header policy. A non-success response is an error.
pub trait PageFetcher {
    fn fetch(&self, url: &str) -> Result<String>;
}

/// Normalizes a raw URL from the article body.
///
/// Unwraps the platform's outbound redirector (percent-decoding the wrapped
/// target), then applies the redirect map. Idempotent: a URL that is already
/// normal and unmapped passes through unchanged.
pub fn normalize_url(redirects: &RedirectMap, raw: &str) -> String {
    let unwrapped = unwrap_redirector(raw).unwrap_or_else(|| raw.to_string());
    match redirects.resolve(&unwrapped) {
        Some(destination) => destination.to_string(),
        None => unwrapped,
    }
}

/// Extracts the percent-decoded `target` of a redirector-wrapped URL, or
/// `None` if `raw` is not a redirector URL.
///
/// Protocol-relative hrefs (`//link.zhihu.com/...`) are accepted as well.
/// Decoding is plain percent-decoding; `+` is not treated as a space, since
/// wrapped targets routinely contain literal plus signs.
fn unwrap_redirector(raw: &str) -> Option<String> {
    let absolute = if raw.starts_with("//") { format!("https:{}", raw) } else { raw.to_string() };

    let parsed = Url::parse(&absolute).ok()?;
    if parsed.host_str() != Some(REDIRECTOR_HOST) {
        return None;
    }

    let target = parsed.query()?.split('&').find_map(|pair| pair.strip_prefix("target="))?;
    Some(percent_decode_str(target).decode_utf8_lossy().into_owned())
}

/// The element kinds the conversion grammar recognizes.
///
/// Each parsing context accepts a subset; anything else is unsupported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ElementKind {
    Anchor,
    Bold,
    Italic,
    InlineCode,
    LineBreak,
    Rule,
    Paragraph,
    SectionHeading,
    SubHeading,
    UnorderedList,
    OrderedList,
    ListItem,
    Container,
    Quote,
    Figure,
}

impl ElementKind {
    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "a" => Some(Self::Anchor),
            "b" => Some(Self::Bold),
            "i" => Some(Self::Italic),
            "code" => Some(Self::InlineCode),
            "br" => Some(Self::LineBreak),
            "hr" => Some(Self::Rule),
            "p" => Some(Self::Paragraph),
            "h2" => Some(Self::SectionHeading),
            "h3" => Some(Self::SubHeading),
            "ul" => Some(Self::UnorderedList),
            "ol" => Some(Self::OrderedList),
            "li" => Some(Self::ListItem),
            "div" => Some(Self::Container),
            "blockquote" => Some(Self::Quote),
            "figure" => Some(Self::Figure),
            _ => None,
        }
    }
}

fn unsupported(tag: impl Into<String>) -> ZhuanlanError {
    ZhuanlanError::UnsupportedElement { tag: tag.into() }
}

fn malformed(detail: impl Into<String>) -> ZhuanlanError {
    ZhuanlanError::MalformedInput(detail.into())
}

/// Walks an article body container and produces a Markdown document.
pub(crate) struct BodyConverter<'a> {
    config: &'a ParserConfig,
    fetcher: &'a dyn PageFetcher,
}

impl<'a> BodyConverter<'a> {
    pub fn new(config: &'a ParserConfig, fetcher: &'a dyn PageFetcher) -> Self {
        Self { config, fetcher }
    }

    /// Converts the top-level children of the body container.
    ///
    /// Whitespace-only text between block elements is skipped; any other
    /// bare text at this level has no handler.
    pub fn convert(&self, body: &Element) -> Result<markdown::Document> {
        let mut nodes = Vec::new();
        for child in body.children() {
            match child {
                NodeChild::Text(text) if text.trim().is_empty() => {}
                NodeChild::Text(_) => return Err(unsupported(TEXT_KIND)),
                NodeChild::Element(el) => nodes.push(self.block(&el)?),
            }
        }
        Ok(markdown::Document::new(nodes))
    }

    /// One top-level block element.
    fn block(&self, el: &Element) -> Result<Node> {
        let tag = el.tag_name();
        match ElementKind::from_tag(&tag) {
            Some(ElementKind::SectionHeading) => {
                Ok(Node::Header { level: self.config.heading_base, text: el.text() })
            }
            Some(ElementKind::SubHeading) => {
                Ok(Node::Header { level: self.config.heading_base + 1, text: el.text() })
            }
            Some(ElementKind::Rule) => Ok(Node::HorizontalRule),
            Some(ElementKind::Paragraph) => self.paragraph(el),
            Some(ElementKind::Anchor) => self.link_card(el),
            Some(ElementKind::UnorderedList) | Some(ElementKind::OrderedList) => self.list(el, 0),
            Some(ElementKind::Container) => self.code_block(el),
            Some(ElementKind::Quote) => Ok(Node::BlockQuote(Box::new(self.paragraph(el)?))),
            Some(ElementKind::Figure) => self.image(el),
            _ => Err(unsupported(tag)),
        }
    }

    /// An inline context: a `<p>`, list item, or block-quote interior.
    fn paragraph(&self, el: &Element) -> Result<Node> {
        Ok(Node::Paragraph(self.inline_nodes(el)?))
    }

    fn inline_nodes(&self, el: &Element) -> Result<Vec<Node>> {
        let mut nodes = Vec::new();
        for child in el.children() {
            match child {
                NodeChild::Text(text) => nodes.push(Node::Text(text.to_string())),
                NodeChild::Element(el) => nodes.push(self.inline(&el)?),
            }
        }
        Ok(nodes)
    }

    /// One inline element.
    fn inline(&self, el: &Element) -> Result<Node> {
        let tag = el.tag_name();
        match ElementKind::from_tag(&tag) {
            Some(ElementKind::Anchor) => self.link(el),
            Some(ElementKind::Bold) => Ok(Node::Strong(el.text())),
            Some(ElementKind::Italic) => Ok(Node::Emphasis(el.text())),
            Some(ElementKind::InlineCode) => Ok(Node::InlineCode(el.text())),
            Some(ElementKind::LineBreak) => Ok(Node::LineBreak),
            Some(ElementKind::Rule) => Ok(Node::HorizontalRule),
            _ => Err(unsupported(tag)),
        }
    }

    fn link(&self, el: &Element) -> Result<Node> {
        let href = el.attr("href").ok_or_else(|| unsupported(el.tag_name()))?;
        Ok(Node::Link {
            label: el.text(),
            url: normalize_url(&self.config.redirects, href),
        })
    }

    /// A list container. `depth` counts nesting levels already entered.
    fn list(&self, el: &Element, depth: usize) -> Result<Node> {
        if depth >= self.config.max_list_depth {
            return Err(malformed(format!(
                "list nesting exceeds {} levels",
                self.config.max_list_depth
            )));
        }

        let ordered = el.tag_name() == "ol";
        let mut items = Vec::new();
        for child in el.children() {
            match child {
                NodeChild::Text(text) if text.trim().is_empty() => {}
                NodeChild::Text(_) => return Err(unsupported(TEXT_KIND)),
                NodeChild::Element(el) => match ElementKind::from_tag(&el.tag_name()) {
                    Some(ElementKind::ListItem) => items.push(self.paragraph(&el)?),
                    Some(ElementKind::UnorderedList) | Some(ElementKind::OrderedList) => {
                        items.push(self.list(&el, depth + 1)?)
                    }
                    _ => return Err(unsupported(el.tag_name())),
                },
            }
        }

        if items.is_empty() {
            return Err(malformed("list has no items"));
        }

        Ok(Node::List { ordered, items })
    }

    /// A `<div>` wrapping a highlighted code region (`pre > code`).
    fn code_block(&self, el: &Element) -> Result<Node> {
        let code = el
            .select_first("pre code")
            .ok_or_else(|| malformed("container has no code element"))?;

        let token = code
            .attr("class")
            .and_then(|class| class.split_whitespace().next())
            .map(|token| token.strip_prefix("language-").unwrap_or(token))
            .unwrap_or("");

        let language = self
            .config
            .language_aliases
            .get(token)
            .cloned()
            .unwrap_or_else(|| token.to_string());

        let text = code.text();
        let body = text.strip_suffix('\n').unwrap_or(&text);

        Ok(Node::BlockCode { code: body.to_string(), language })
    }

    /// A `<figure>` holding an image, with the real source inside the
    /// `<noscript>` fallback.
    fn image(&self, el: &Element) -> Result<Node> {
        let src = Self::image_source(el)?;
        let caption = el.select_first("figcaption").map(|c| c.text()).unwrap_or_default();

        Ok(Node::Image {
            caption,
            url: normalize_url(&self.config.redirects, &src),
        })
    }

    /// Reads the image source from a figure.
    ///
    /// The HTML parser treats `<noscript>` content as raw text (scripting
    /// assumed on), so the fallback markup needs a second parse before its
    /// `<img>` is reachable. Platforms duplicate the source across
    /// attributes; earlier entries carry the un-watermarked original.
    fn image_source(figure: &Element) -> Result<String> {
        const SOURCE_ATTRS: [&str; 3] = ["data-original", "data-default-watermark-src", "src"];

        fn first_source(img: &Element) -> Result<String> {
            SOURCE_ATTRS
                .iter()
                .find_map(|attr| img.attr(attr))
                .map(str::to_string)
                .ok_or_else(|| malformed("image has no source attribute"))
        }

        if let Some(noscript) = figure.select_first("noscript") {
            let fallback = Document::parse(&noscript.text());
            if let Some(img) = fallback.select_first("img") {
                return first_source(&img);
            }
        }

        let img = figure.select_first("img").ok_or_else(|| malformed("figure has no img element"))?;
        first_source(&img)
    }

    /// A top-level anchor, rendered as a link-card shortcode.
    fn link_card(&self, el: &Element) -> Result<Node> {
        let href = el.attr("href").ok_or_else(|| malformed("link card has no href"))?;
        let url = normalize_url(&self.config.redirects, href);

        let title = match el.attr("data-text") {
            Some(title) => title.to_string(),
            None => self.resolve_card_title(&url)?,
        };

        Ok(Node::LinkCard { title, url })
    }

    /// Fetches the card target and reads its page title, stripping the
    /// configured trailing site suffix.
    fn resolve_card_title(&self, url: &str) -> Result<String> {
        let body = self.fetcher.fetch(url)?;
        let title = Document::parse(&body)
            .title()
            .ok_or_else(|| malformed("link card target has no title"))?;

        let trimmed = title.trim();
        let stripped = match &self.config.link_card_title_suffix {
            Some(suffix) => trimmed.strip_suffix(suffix.as_str()).unwrap_or(trimmed),
            None => trimmed,
        };

        Ok(stripped.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    struct StubFetcher {
        body: String,
    }

    impl PageFetcher for StubFetcher {
        fn fetch(&self, _url: &str) -> Result<String> {
            Ok(self.body.clone())
        }
    }

    struct FailingFetcher;

    impl PageFetcher for FailingFetcher {
        fn fetch(&self, url: &str) -> Result<String> {
            Err(malformed(format!("unexpected fetch of {}", url)))
        }
    }

    fn convert(html: &str) -> Result<markdown::Document> {
        convert_with(html, &ParserConfig::default())
    }

    fn convert_with(html: &str, config: &ParserConfig) -> Result<markdown::Document> {
        let doc = Document::parse(html);
        let body = doc.select_first("body").unwrap();
        BodyConverter::new(config, &FailingFetcher).convert(&body)
    }

    #[test]
    fn test_paragraph_with_inline_nodes() {
        let doc = convert(r#"<p>see <a href="https://example.com">it</a>, <b>bold</b>, <i>soft</i>, <code>x</code><br></p>"#)
            .unwrap();

        assert_eq!(
            doc.nodes(),
            &[Node::Paragraph(vec![
                Node::Text("see ".to_string()),
                Node::Link { label: "it".to_string(), url: "https://example.com".to_string() },
                Node::Text(", ".to_string()),
                Node::Strong("bold".to_string()),
                Node::Text(", ".to_string()),
                Node::Emphasis("soft".to_string()),
                Node::Text(", ".to_string()),
                Node::InlineCode("x".to_string()),
                Node::LineBreak,
            ])]
        );
    }

    #[test]
    fn test_text_preserved_verbatim() {
        let doc = convert("<p>  spaced   out  </p>").unwrap();
        assert_eq!(
            doc.nodes(),
            &[Node::Paragraph(vec![Node::Text("  spaced   out  ".to_string())])]
        );
    }

    #[test]
    fn test_heading_remap() {
        let doc = convert("<h2>First</h2><h3>Second</h3>").unwrap();
        assert_eq!(
            doc.nodes(),
            &[
                Node::Header { level: 1, text: "First".to_string() },
                Node::Header { level: 2, text: "Second".to_string() },
            ]
        );
    }

    #[test]
    fn test_unsupported_block_element() {
        let result = convert("<video src=\"x.mp4\"></video>");
        assert!(matches!(
            result,
            Err(ZhuanlanError::UnsupportedElement { tag }) if tag == "video"
        ));
    }

    #[test]
    fn test_unsupported_inline_element() {
        let result = convert("<p><span>styled</span></p>");
        assert!(matches!(
            result,
            Err(ZhuanlanError::UnsupportedElement { tag }) if tag == "span"
        ));
    }

    #[test]
    fn test_link_without_href() {
        let result = convert("<p><a>dangling</a></p>");
        assert!(matches!(result, Err(ZhuanlanError::UnsupportedElement { .. })));
    }

    #[test]
    fn test_blockquote_wraps_single_paragraph() {
        let doc = convert("<blockquote>deep <b>thought</b></blockquote>").unwrap();
        assert_eq!(
            doc.nodes(),
            &[Node::BlockQuote(Box::new(Node::Paragraph(vec![
                Node::Text("deep ".to_string()),
                Node::Strong("thought".to_string()),
            ])))]
        );
    }

    #[test]
    fn test_nested_list() {
        let doc = convert("<ul><li>A</li><ul><li>B</li></ul></ul>").unwrap();
        assert_eq!(
            doc.nodes(),
            &[Node::List {
                ordered: false,
                items: vec![
                    Node::Paragraph(vec![Node::Text("A".to_string())]),
                    Node::List {
                        ordered: false,
                        items: vec![Node::Paragraph(vec![Node::Text("B".to_string())])],
                    },
                ],
            }]
        );
        assert_eq!(doc.to_string(), "- A\n  - B");
    }

    #[test]
    fn test_ordered_flag_per_nesting_level() {
        let doc = convert("<ol><li>one</li><ul><li>bullet</li></ul></ol>").unwrap();
        match &doc.nodes()[0] {
            Node::List { ordered, items } => {
                assert!(*ordered);
                assert!(matches!(&items[1], Node::List { ordered: false, .. }));
            }
            other => panic!("expected list, got {:?}", other),
        }
    }

    #[test]
    fn test_list_depth_limit() {
        let config = ParserConfig { max_list_depth: 4, ..Default::default() };
        let mut html = "<ul><li>x</li>".to_string();
        for _ in 0..8 {
            html.push_str("<ul><li>y</li>");
        }
        for _ in 0..9 {
            html.push_str("</ul>");
        }

        let result = convert_with(&html, &config);
        assert!(matches!(result, Err(ZhuanlanError::MalformedInput(_))));
    }

    #[test]
    fn test_empty_list() {
        let result = convert("<ul></ul>");
        assert!(matches!(result, Err(ZhuanlanError::MalformedInput(_))));
    }

    #[rstest]
    #[case("language-nasm", "mov eax, 1\n", "```x86asm\nmov eax, 1\n```")]
    #[case("language-text", "hello", "```bash\nhello\n```")]
    #[case("language-cpp", "int x;\n", "```cpp\nint x;\n```")]
    fn test_code_block_language_aliases(#[case] class: &str, #[case] body: &str, #[case] expected: &str) {
        let html = format!("<div><pre><code class=\"{}\">{}</code></pre></div>", class, body);
        let doc = convert(&html).unwrap();
        assert_eq!(doc.to_string(), expected);
    }

    #[test]
    fn test_code_block_without_class() {
        let doc = convert("<div><pre><code>raw</code></pre></div>").unwrap();
        assert_eq!(doc.to_string(), "```\nraw\n```");
    }

    #[test]
    fn test_code_block_strips_one_trailing_newline_only() {
        let doc = convert("<div><pre><code>a\n\n</code></pre></div>").unwrap();
        assert_eq!(doc.to_string(), "```\na\n\n```");
    }

    #[test]
    fn test_container_without_code() {
        let result = convert("<div><pre>plain</pre></div>");
        assert!(matches!(result, Err(ZhuanlanError::MalformedInput(_))));
    }

    #[test]
    fn test_image_attribute_priority() {
        let html = r#"<figure><noscript><img data-original="A" src="B"></noscript></figure>"#;
        let doc = convert(html).unwrap();
        assert_eq!(
            doc.nodes(),
            &[Node::Image { caption: String::new(), url: "A".to_string() }]
        );
    }

    #[test]
    fn test_image_caption_and_src_fallback() {
        let html = r#"<figure><noscript><img src="https://pic.example.com/a.png"></noscript><figcaption>a chart</figcaption></figure>"#;
        let doc = convert(html).unwrap();
        assert_eq!(
            doc.nodes(),
            &[Node::Image {
                caption: "a chart".to_string(),
                url: "https://pic.example.com/a.png".to_string(),
            }]
        );
    }

    #[test]
    fn test_image_without_source() {
        let result = convert(r#"<figure><noscript><img alt="x"></noscript></figure>"#);
        assert!(matches!(result, Err(ZhuanlanError::MalformedInput(_))));
    }

    #[test]
    fn test_link_card_with_title_attribute() {
        let doc = convert(r#"<a data-text="A post" href="https://example.com/p">ignored</a>"#).unwrap();
        assert_eq!(
            doc.nodes(),
            &[Node::LinkCard { title: "A post".to_string(), url: "https://example.com/p".to_string() }]
        );
    }

    #[test]
    fn test_link_card_fetches_title() {
        let config = ParserConfig::default();
        let fetcher = StubFetcher {
            body: "<html><head><title>Remote Post | BLOGS</title></head></html>".to_string(),
        };
        let doc = Document::parse(r#"<a href="https://example.com/p">x</a>"#);
        let body = doc.select_first("body").unwrap();
        let converted = BodyConverter::new(&config, &fetcher).convert(&body).unwrap();

        assert_eq!(
            converted.nodes(),
            &[Node::LinkCard { title: "Remote Post".to_string(), url: "https://example.com/p".to_string() }]
        );
    }

    #[test]
    fn test_stray_text_in_body() {
        let result = convert("<h2>ok</h2>stray");
        assert!(matches!(
            result,
            Err(ZhuanlanError::UnsupportedElement { tag }) if tag == TEXT_KIND
        ));
    }

    #[test]
    fn test_whitespace_between_blocks_is_skipped() {
        let doc = convert("<h2>A</h2>\n    <p>B</p>\n").unwrap();
        assert_eq!(doc.nodes().len(), 2);
    }

    #[rstest]
    #[case(
        "https://link.zhihu.com/?target=https%3A//example.com/x",
        "https://example.com/x"
    )]
    #[case("//link.zhihu.com/?target=https%3A//example.com/x", "https://example.com/x")]
    #[case("https://example.com/already-clean", "https://example.com/already-clean")]
    #[case(
        "https://link.zhihu.com/?target=https%3A//en.cppreference.com/w/cpp/language/operator%2B",
        "https://en.cppreference.com/w/cpp/language/operator+"
    )]
    fn test_normalize_url(#[case] raw: &str, #[case] expected: &str) {
        let map = RedirectMap::new();
        assert_eq!(normalize_url(&map, raw), expected);
    }

    #[test]
    fn test_normalize_url_applies_redirect_map() {
        let mut map = RedirectMap::new();
        map.insert("https://zhuanlan.zhihu.com/p/1", "https://example.com/articles/1");

        let wrapped = "https://link.zhihu.com/?target=https%3A//zhuanlan.zhihu.com/p/1";
        assert_eq!(normalize_url(&map, wrapped), "https://example.com/articles/1");
    }

    #[test]
    fn test_normalize_url_idempotent() {
        let mut map = RedirectMap::new();
        map.insert("https://zhuanlan.zhihu.com/p/1", "https://example.com/articles/1");

        for raw in [
            "https://link.zhihu.com/?target=https%3A//example.com/x",
            "https://zhuanlan.zhihu.com/p/1",
            "https://example.com/plain",
        ] {
            let once = normalize_url(&map, raw);
            assert_eq!(normalize_url(&map, &once), once);
        }
    }
}
