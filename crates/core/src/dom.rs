//! HTML parsing and DOM navigation.
//!
//! This module provides the [`Document`] and [`Element`] types for parsing a
//! fetched page and walking its DOM. [`Element::children`] exposes both child
//! elements and bare text nodes, which the converter dispatches on.
//!
//! # Example
//!
//! ```rust
//! use zhuanlan_core::dom::Document;
//!
//! let html = r#"<p class="intro">Hello <b>world</b></p>"#;
//! let doc = Document::parse(html);
//! let p = doc.select_first("p.intro").unwrap();
//! assert_eq!(p.text(), "Hello world");
//! ```

use scraper::{ElementRef, Html, Node, Selector};

use crate::{Result, ZhuanlanError};

/// Represents a parsed HTML document.
///
/// A Document wraps a page and provides methods for querying elements using
/// CSS selectors.
pub struct Document {
    html: Html,
}

impl Document {
    /// Parses HTML from a string.
    pub fn parse(html: &str) -> Self {
        Self { html: Html::parse_document(html) }
    }

    /// Gets the title of the document.
    ///
    /// Returns the content of the `<title>` element if present.
    pub fn title(&self) -> Option<String> {
        let selector = Selector::parse("title").ok()?;
        self.html.select(&selector).next().map(|el| el.text().collect::<String>())
    }

    /// Selects elements using a CSS selector.
    ///
    /// # Errors
    ///
    /// Returns [`ZhuanlanError::HtmlParseError`] if the selector is invalid.
    pub fn select(&'_ self, selector: &str) -> Result<Vec<Element<'_>>> {
        let sel = Selector::parse(selector)
            .map_err(|e| ZhuanlanError::HtmlParseError(format!("Invalid selector: {}", e)))?;

        Ok(self.html.select(&sel).map(|el| Element { element: el }).collect())
    }

    /// Selects the first element matching a CSS selector, if any.
    pub fn select_first(&'_ self, selector: &str) -> Option<Element<'_>> {
        let sel = Selector::parse(selector).ok()?;
        self.html.select(&sel).next().map(|el| Element { element: el })
    }
}

/// A single child of an element: either a nested element or a text node.
///
/// Comments and other non-content nodes are not surfaced.
pub enum NodeChild<'a> {
    Element(Element<'a>),
    Text(&'a str),
}

/// A wrapper around scraper's ElementRef for easier DOM navigation.
#[derive(Clone, Debug)]
pub struct Element<'a> {
    element: ElementRef<'a>,
}

impl<'a> Element<'a> {
    /// Gets the text content of this element.
    ///
    /// Returns the concatenation of all text nodes within this element.
    pub fn text(&self) -> String {
        self.element.text().collect()
    }

    /// Gets the value of an attribute.
    ///
    /// Returns `None` if the attribute is not present.
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.element.value().attr(name)
    }

    /// Gets the tag name of this element.
    ///
    /// Returns the lowercase tag name (e.g., "div", "a", "figure").
    pub fn tag_name(&self) -> String {
        self.element.value().name().to_lowercase()
    }

    /// Gets the direct children of this element, elements and text nodes.
    ///
    /// Comment nodes are skipped.
    pub fn children(&self) -> Vec<NodeChild<'a>> {
        let mut result = Vec::new();
        for child in self.element.children() {
            match child.value() {
                Node::Element(_) => {
                    if let Some(el) = ElementRef::wrap(child) {
                        result.push(NodeChild::Element(Element { element: el }));
                    }
                }
                Node::Text(text) => result.push(NodeChild::Text(&**text)),
                _ => {}
            }
        }
        result
    }

    /// Selects descendant elements using a CSS selector.
    ///
    /// # Errors
    ///
    /// Returns [`ZhuanlanError::HtmlParseError`] if the selector is invalid.
    pub fn select(&'_ self, selector: &str) -> Result<Vec<Element<'a>>> {
        let sel = Selector::parse(selector)
            .map_err(|e| ZhuanlanError::HtmlParseError(format!("Invalid selector: {}", e)))?;

        Ok(self.element.select(&sel).map(|el| Element { element: el }).collect())
    }

    /// Selects the first descendant matching a CSS selector, if any.
    pub fn select_first(&'_ self, selector: &str) -> Option<Element<'a>> {
        let sel = Selector::parse(selector).ok()?;
        self.element.select(&sel).next().map(|el| Element { element: el })
    }
}
