//! HTML → text page model for the terminal engine.
//!
//! Parses with html5ever into an `RcDom`, then walks it once to produce
//! flowed text lines, the document title, and a numbered link table.
//! Links are marked inline as `text[n]` so they can be followed by number.

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use unicode_width::UnicodeWidthStr;
use url::Url;

use crate::core::state::ContentSize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Heading,
    Text,
    ListItem,
    Preformatted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLine {
    pub text: String,
    pub kind: LineKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLink {
    /// 1-based number shown next to the link text.
    pub number: usize,
    pub url: Url,
    /// `target="_blank"`: the page asked for a new window.
    pub new_window: bool,
}

/// A loaded document, ready to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub url: Url,
    pub title: Option<String>,
    pub lines: Vec<PageLine>,
    pub links: Vec<PageLink>,
}

impl Page {
    /// Plain text bodies (and anything that isn't HTML) render verbatim.
    pub fn from_text(url: Url, body: &str) -> Self {
        let lines = body
            .lines()
            .map(|l| PageLine {
                text: l.trim_end().to_string(),
                kind: LineKind::Preformatted,
            })
            .collect();
        Self {
            url,
            title: None,
            lines,
            links: Vec::new(),
        }
    }

    pub fn from_html(url: Url, html: &str) -> Self {
        let dom = parse_document(RcDom::default(), Default::default()).one(html);
        let mut builder = PageBuilder::new(&url);
        builder.walk(&dom.document);
        let (title, lines, links) = builder.finish();
        Self {
            url,
            title,
            lines,
            links,
        }
    }

    pub fn link(&self, number: usize) -> Option<&PageLink> {
        self.links.iter().find(|l| l.number == number)
    }

    /// Width is the widest line in columns; height is the line count.
    pub fn content_size(&self) -> ContentSize {
        let width = self
            .lines
            .iter()
            .map(|l| UnicodeWidthStr::width(l.text.as_str()))
            .max()
            .unwrap_or(0);
        ContentSize {
            width: width as f64,
            height: self.lines.len() as f64,
        }
    }
}

const SKIPPED: &[&str] = &["script", "style", "noscript", "template", "svg", "iframe"];
const BLOCKS: &[&str] = &[
    "p", "div", "section", "article", "header", "footer", "nav", "main", "aside", "blockquote",
    "ul", "ol", "li", "table", "tr", "form", "figure", "figcaption", "dl", "dt", "dd", "h1",
    "h2", "h3", "h4", "h5", "h6", "pre", "hr", "body",
];

struct PageBuilder<'a> {
    base: &'a Url,
    title: Option<String>,
    lines: Vec<PageLine>,
    links: Vec<PageLink>,
    current: String,
    kind: LineKind,
    pending_space: bool,
    in_pre: bool,
}

impl<'a> PageBuilder<'a> {
    fn new(base: &'a Url) -> Self {
        Self {
            base,
            title: None,
            lines: Vec::new(),
            links: Vec::new(),
            current: String::new(),
            kind: LineKind::Text,
            pending_space: false,
            in_pre: false,
        }
    }

    fn walk(&mut self, handle: &Handle) {
        match &handle.data {
            NodeData::Document => self.walk_children(handle),
            NodeData::Text { contents } => {
                let text = contents.borrow();
                if self.in_pre {
                    self.push_preformatted(&text);
                } else {
                    self.push_text(&text);
                }
            }
            NodeData::Element { name, attrs, .. } => {
                let tag: &str = &name.local;
                if SKIPPED.contains(&tag) {
                    return;
                }
                if tag == "title" {
                    if self.title.is_none() {
                        let title = collapse_whitespace(&collect_text(handle));
                        self.title = (!title.is_empty()).then_some(title);
                    }
                    return;
                }
                if tag == "br" {
                    self.flush();
                    return;
                }

                let is_block = BLOCKS.contains(&tag);
                if is_block {
                    self.flush();
                }
                let outer_kind = self.kind;
                let outer_pre = self.in_pre;
                match tag {
                    "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => self.kind = LineKind::Heading,
                    "li" => {
                        self.kind = LineKind::ListItem;
                        self.current.push_str("• ");
                    }
                    "pre" => {
                        self.kind = LineKind::Preformatted;
                        self.in_pre = true;
                    }
                    "hr" => self.lines.push(PageLine {
                        text: "─".repeat(40),
                        kind: LineKind::Text,
                    }),
                    _ => {}
                }

                self.walk_children(handle);

                if tag == "a" {
                    let attrs = attrs.borrow();
                    let attr = |key: &str| {
                        attrs
                            .iter()
                            .find(|a| &*a.name.local == key)
                            .map(|a| String::from(&*a.value))
                    };
                    if let Some(href) = attr("href") {
                        let new_window = attr("target").is_some_and(|t| t == "_blank");
                        self.push_link(&href, new_window);
                    }
                }

                if is_block {
                    self.flush();
                }
                self.kind = outer_kind;
                self.in_pre = outer_pre;
            }
            _ => {}
        }
    }

    fn walk_children(&mut self, handle: &Handle) {
        for child in handle.children.borrow().iter() {
            self.walk(child);
        }
    }

    fn push_text(&mut self, text: &str) {
        if text.starts_with(char::is_whitespace) {
            self.pending_space = true;
        }
        for word in text.split_whitespace() {
            if self.pending_space && !self.current.is_empty() && !self.current.ends_with(' ') {
                self.current.push(' ');
            }
            self.current.push_str(word);
            self.pending_space = true;
        }
        self.pending_space = text.ends_with(char::is_whitespace);
    }

    fn push_preformatted(&mut self, text: &str) {
        let mut parts = text.split('\n').peekable();
        while let Some(part) = parts.next() {
            self.current.push_str(part.trim_end_matches('\r'));
            if parts.peek().is_some() {
                self.flush_raw();
            }
        }
    }

    fn push_link(&mut self, href: &str, new_window: bool) {
        let Ok(url) = self.base.join(href.trim()) else {
            return;
        };
        if !matches!(url.scheme(), "http" | "https") {
            return;
        }
        let number = self.links.len() + 1;
        self.current.push_str(&format!("[{number}]"));
        self.links.push(PageLink {
            number,
            url,
            new_window,
        });
    }

    fn flush(&mut self) {
        let text = self.current.trim().to_string();
        if !text.is_empty() && text != "•" {
            self.lines.push(PageLine {
                text,
                kind: self.kind,
            });
        }
        self.current.clear();
        self.pending_space = false;
    }

    fn flush_raw(&mut self) {
        let text = std::mem::take(&mut self.current);
        self.lines.push(PageLine {
            text,
            kind: LineKind::Preformatted,
        });
    }

    fn finish(mut self) -> (Option<String>, Vec<PageLine>, Vec<PageLink>) {
        self.flush();
        (self.title, self.lines, self.links)
    }
}

fn collect_text(handle: &Handle) -> String {
    let mut out = String::new();
    for child in handle.children.borrow().iter() {
        match &child.data {
            NodeData::Text { contents } => out.push_str(&contents.borrow()),
            _ => out.push_str(&collect_text(child)),
        }
    }
    out
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
