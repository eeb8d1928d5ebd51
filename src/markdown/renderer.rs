//! Markdown to styled runs
//!
//! `render_markdown` is pure: it parses the input into a node tree and walks
//! it with a fixed styling policy. `Renderer` puts a `RenderCache` in front
//! of it.

use pulldown_cmark::{Event, Parser, Tag};
use std::path::Path;
use std::sync::Arc;

use crate::cache::{CacheKey, RenderCache};
use crate::core::file_reader::{read_document, DocumentRead};
use crate::markdown::style::{StyledDocument, TextStyle};

const BULLET: &str = "• ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Block {
    Document,
    Heading(u8),
    Paragraph,
    List(Option<u64>),
    Item,
    CodeBlock,
    Strong,
    Emphasis,
    /// Anything else; rendered as its children
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Container { block: Block, children: Vec<Node> },
    Text(String),
    Code(String),
    SoftBreak,
    HardBreak,
}

fn block_for(tag: &Tag<'_>) -> Block {
    match tag {
        Tag::Heading { level, .. } => Block::Heading(*level as u8),
        Tag::Paragraph => Block::Paragraph,
        Tag::List(start) => Block::List(*start),
        Tag::Item => Block::Item,
        Tag::CodeBlock(_) => Block::CodeBlock,
        Tag::Strong => Block::Strong,
        Tag::Emphasis => Block::Emphasis,
        _ => Block::Other,
    }
}

fn parse(raw: &str) -> Node {
    fn close(stack: &mut Vec<(Block, Vec<Node>)>) {
        if stack.len() < 2 {
            return;
        }
        if let Some((block, children)) = stack.pop() {
            if let Some((_, parent)) = stack.last_mut() {
                parent.push(Node::Container { block, children });
            }
        }
    }

    let mut stack: Vec<(Block, Vec<Node>)> = vec![(Block::Document, Vec::new())];
    for event in Parser::new(raw) {
        let leaf = match event {
            Event::Start(tag) => {
                stack.push((block_for(&tag), Vec::new()));
                continue;
            }
            Event::End(_) => {
                close(&mut stack);
                continue;
            }
            Event::Text(text) => Node::Text(text.into_string()),
            Event::Code(code) => Node::Code(code.into_string()),
            Event::SoftBreak => Node::SoftBreak,
            Event::HardBreak => Node::HardBreak,
            // Raw HTML, rules, footnote references and the like carry no text
            _ => continue,
        };
        if let Some((_, children)) = stack.last_mut() {
            children.push(leaf);
        }
    }
    while stack.len() > 1 {
        close(&mut stack);
    }

    let children = stack.pop().map(|(_, c)| c).unwrap_or_default();
    Node::Container {
        block: Block::Document,
        children,
    }
}

struct Styler {
    doc: StyledDocument,
}

impl Styler {
    fn node(&mut self, node: &Node, style: TextStyle) {
        match node {
            Node::Text(text) => self.doc.push(text, style),
            Node::Code(code) => self.doc.push(code, TextStyle::inline_code()),
            Node::SoftBreak => self.doc.push(" ", style),
            Node::HardBreak => self.doc.push("\n", style),
            Node::Container { block, children } => self.container(*block, children, style),
        }
    }

    fn children(&mut self, children: &[Node], style: TextStyle) {
        for child in children {
            self.node(child, style);
        }
    }

    fn container(&mut self, block: Block, children: &[Node], style: TextStyle) {
        match block {
            Block::Heading(level) => {
                let heading = TextStyle::heading(level);
                self.children(children, heading);
                self.doc.push("\n\n", heading);
            }
            Block::Paragraph => {
                let body = TextStyle::body();
                self.children(children, body);
                self.doc.push("\n\n", body);
            }
            Block::List(start) => {
                for (i, child) in children.iter().enumerate() {
                    match child {
                        Node::Container {
                            block: Block::Item,
                            children,
                        } => {
                            let marker = match start {
                                Some(first) => format!("{}. ", first + i as u64),
                                None => BULLET.to_string(),
                            };
                            self.item(&marker, children);
                        }
                        other => self.node(other, style),
                    }
                }
                self.doc.push("\n", TextStyle::body());
            }
            Block::Item => self.item(BULLET, children),
            Block::CodeBlock => {
                let code: String = children
                    .iter()
                    .filter_map(|c| match c {
                        Node::Text(t) => Some(t.as_str()),
                        _ => None,
                    })
                    .collect();
                self.doc.push("\n", style);
                self.doc.push(&code, TextStyle::code_block());
                self.doc.push("\n\n", style);
            }
            Block::Strong => self.children(children, style.bold()),
            Block::Emphasis => self.children(children, style.italic()),
            Block::Document | Block::Other => self.children(children, style),
        }
    }

    /// Paragraphs inside an item are inlined without their trailing breaks
    fn item(&mut self, marker: &str, children: &[Node]) {
        let body = TextStyle::body();
        self.doc.push(marker, TextStyle::bullet());
        for child in children {
            match child {
                Node::Container {
                    block: Block::Paragraph,
                    children,
                } => self.children(children, body),
                other => self.node(other, body),
            }
        }
        self.doc.push("\n", body);
    }
}

/// Render markdown into styled runs. No I/O, no shared state.
pub fn render_markdown(raw: &str) -> StyledDocument {
    let tree = parse(raw);
    let mut styler = Styler {
        doc: StyledDocument::new(),
    };
    styler.node(&tree, TextStyle::body());
    styler.doc
}

/// Cached renderer; clones share one cache
#[derive(Clone)]
pub struct Renderer {
    cache: Arc<RenderCache<StyledDocument>>,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(Arc::new(RenderCache::new()))
    }
}

impl Renderer {
    pub fn new(cache: Arc<RenderCache<StyledDocument>>) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &Arc<RenderCache<StyledDocument>> {
        &self.cache
    }

    /// Render `raw`, going through the cache when a key is given
    pub fn render(&self, raw: &str, key: Option<&CacheKey>) -> Arc<StyledDocument> {
        match key {
            Some(key) => self.cache.get_or_render(key, raw, render_markdown),
            None => Arc::new(render_markdown(raw)),
        }
    }

    /// Read and render a file keyed by its path and modification time.
    ///
    /// Returns `None` when the file is missing or unreadable.
    pub fn render_file(&self, path: &Path) -> Option<Arc<StyledDocument>> {
        match read_document(path) {
            DocumentRead::Present(content) => {
                Some(self.render(&content, Some(&CacheKey::for_file(path))))
            }
            DocumentRead::Missing => {
                tracing::debug!(path = %path.display(), "document missing");
                None
            }
            DocumentRead::Unreadable { reason } => {
                tracing::debug!(path = %path.display(), reason = %reason, "document unreadable");
                None
            }
        }
    }
}
