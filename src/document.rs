//! Lenient markup navigation over a parsed HTML tree.
//!
//! Parsing never fails: html5ever recovers from malformed or truncated markup
//! the way browsers do. Queries take CSS selector paths and return empty
//! results when nothing matches or the path itself is invalid.

use scraper::{ElementRef, Html, Selector};

fn selector(path: &str) -> Option<Selector> {
    match Selector::parse(path) {
        Ok(sel) => Some(sel),
        Err(e) => {
            log::debug!("Ignoring invalid selector {:?}: {:?}", path, e);
            None
        }
    }
}

/// A parsed HTML document.
pub struct Document {
    html: Html,
}

impl Document {
    pub fn parse(markup: &str) -> Self {
        Self {
            html: Html::parse_document(markup),
        }
    }

    /// The root element; queries on it cover the whole document
    pub fn root(&self) -> Node<'_> {
        Node {
            element: self.html.root_element(),
        }
    }

    pub fn select_first(&self, path: &str) -> Option<Node<'_>> {
        self.root().select_first(path)
    }

    pub fn select_all(&self, path: &str) -> Vec<Node<'_>> {
        self.root().select_all(path)
    }

    pub fn text(&self, path: &str) -> Option<String> {
        self.root().text_at(path)
    }

    pub fn attr(&self, path: &str, name: &str) -> Option<String> {
        self.root().attr_at(path, name)
    }

    pub fn attrs(&self, path: &str, name: &str) -> Vec<String> {
        self.root().attrs_at(path, name)
    }
}

/// An element inside a [`Document`]; queries on it are scoped to its subtree.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Node<'a> {
    element: ElementRef<'a>,
}

impl<'a> Node<'a> {
    pub fn select_first(&self, path: &str) -> Option<Node<'a>> {
        let sel = selector(path)?;
        self.element.select(&sel).next().map(|element| Node { element })
    }

    pub fn select_all(&self, path: &str) -> Vec<Node<'a>> {
        match selector(path) {
            Some(sel) => self
                .element
                .select(&sel)
                .map(|element| Node { element })
                .collect(),
            None => Vec::new(),
        }
    }

    /// Concatenated, trimmed text content of this element
    pub fn text(&self) -> String {
        self.element.text().collect::<String>().trim().to_string()
    }

    /// Trimmed attribute value of this element
    pub fn attr(&self, name: &str) -> Option<String> {
        self.element.value().attr(name).map(|v| v.trim().to_string())
    }

    /// Text of the first descendant matching `path`
    pub fn text_at(&self, path: &str) -> Option<String> {
        self.select_first(path).map(|n| n.text())
    }

    /// Attribute of the first descendant matching `path` that carries it
    pub fn attr_at(&self, path: &str, name: &str) -> Option<String> {
        self.select_all(path).into_iter().find_map(|n| n.attr(name))
    }

    /// Attribute values of every descendant matching `path`, in document order
    pub fn attrs_at(&self, path: &str, name: &str) -> Vec<String> {
        self.select_all(path)
            .into_iter()
            .filter_map(|n| n.attr(name))
            .collect()
    }
}

impl std::fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.element.value().name())
            .finish()
    }
}
