//! HTML to plain-text flattening for fetched documentation pages.

use scraper::{ElementRef, Html, Node, Selector};

/// Element tree reduced to the parts the flattener looks at
///
/// Building, walking and dropping the tree all use explicit stacks, so a page
/// nested tens of thousands of levels deep cannot exhaust the thread stack.
#[derive(Debug, PartialEq, Eq)]
pub enum DocNode {
    /// An element with its lower-case tag name and children in document order
    Element {
        /// Tag name
        tag: String,
        /// Child nodes
        children: Vec<DocNode>,
    },
    /// A text node, untrimmed
    Text(String),
}

impl DocNode {
    /// Parses `html` and returns the `<body>` subtree, or the whole document without one
    ///
    /// Comments, doctypes and processing instructions are dropped.
    pub fn parse(html: &str) -> Self {
        let document = Html::parse_document(html);
        let body = Selector::parse("body")
            .ok()
            .and_then(|selector| document.select(&selector).next());
        Self::from_element(body.unwrap_or_else(|| document.root_element()))
    }

    fn from_element(root: ElementRef<'_>) -> Self {
        let root_tag = root.value().name().to_string();
        let mut stack = vec![(root_tag.clone(), Vec::new(), root.children())];
        let mut finished = None;

        while let Some((tag, children, pending)) = stack.last_mut() {
            match pending.next() {
                Some(child) => match child.value() {
                    Node::Text(text) => children.push(DocNode::Text(text.to_string())),
                    Node::Element(element) => {
                        stack.push((element.name().to_string(), Vec::new(), child.children()));
                    }
                    _ => {}
                },
                None => {
                    let node = DocNode::Element {
                        tag: std::mem::take(tag),
                        children: std::mem::take(children),
                    };
                    stack.pop();
                    match stack.last_mut() {
                        Some((_, parent, _)) => parent.push(node),
                        None => finished = Some(node),
                    }
                }
            }
        }

        finished.unwrap_or(DocNode::Element {
            tag: root_tag,
            children: Vec::new(),
        })
    }

    /// Descendant text nodes in document order
    pub fn text_nodes(&self) -> TextNodes<'_> {
        TextNodes { stack: vec![self] }
    }

    /// Concatenation of every descendant text node, untouched
    pub fn raw_text(&self) -> String {
        self.text_nodes().collect()
    }

    /// Descendant text nodes, each trimmed, joined by single spaces
    pub fn inline_text(&self) -> String {
        self.text_nodes()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Appends the plain-text rendering of this subtree to `out`
    ///
    /// Headings are upper-cased, headings and paragraphs end with a blank
    /// line, `pre`/`code` blocks are labelled and kept verbatim, bare text is
    /// trimmed and every other element is transparent.
    pub fn flatten_into(&self, out: &mut String) {
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            match node {
                DocNode::Text(text) => {
                    let text = text.trim();
                    if !text.is_empty() {
                        out.push_str(text);
                        out.push('\n');
                    }
                }
                DocNode::Element { tag, children } => match tag.as_str() {
                    "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                        push_block(out, &node.inline_text().to_uppercase());
                    }
                    "p" => push_block(out, &node.inline_text()),
                    "pre" | "code" => {
                        out.push_str("code block:\n");
                        out.push_str(&node.raw_text());
                        out.push_str("\n\n");
                    }
                    _ => stack.extend(children.iter().rev()),
                },
            }
        }
    }
}

impl Drop for DocNode {
    fn drop(&mut self) {
        let mut pending = match self {
            DocNode::Element { children, .. } => std::mem::take(children),
            DocNode::Text(_) => return,
        };
        while let Some(mut node) = pending.pop() {
            if let DocNode::Element { children, .. } = &mut node {
                pending.append(children);
            }
        }
    }
}

/// Depth-first iterator over the text nodes of a [`DocNode`] subtree
#[derive(Debug)]
pub struct TextNodes<'a> {
    stack: Vec<&'a DocNode>,
}

impl<'a> Iterator for TextNodes<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            match node {
                DocNode::Text(text) => return Some(text),
                DocNode::Element { children, .. } => self.stack.extend(children.iter().rev()),
            }
        }
        None
    }
}

fn push_block(out: &mut String, text: &str) {
    if !text.is_empty() {
        out.push_str(text);
        out.push_str("\n\n");
    }
}

/// Flattens an HTML document into plain text
pub fn html_to_text(html: &str) -> String {
    let mut out = String::new();
    DocNode::parse(html).flatten_into(&mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_starts_at_body() {
        let node = DocNode::parse("<html><head><title>Ignored</title></head><body><p>Hi</p></body></html>");
        match &node {
            DocNode::Element { tag, children } => {
                assert_eq!(tag, "body");
                assert_eq!(children.len(), 1);
            }
            DocNode::Text(_) => panic!("expected an element"),
        }
    }

    #[test]
    fn test_flatten_headings_paragraphs_and_code() {
        let html = r#"<html><body>
            <h1>Quick <em>start</em></h1>
            <p>Install the   package with pip.</p>
            <pre>pip install flask
flask run</pre>
            <div><span>Next steps</span><!-- hidden --></div>
        </body></html>"#;

        assert_eq!(
            html_to_text(html),
            "QUICK START\n\nInstall the   package with pip.\n\ncode block:\npip install flask\nflask run\n\nNext steps\n"
        );
    }

    #[test]
    fn test_inline_code_inside_paragraph_stays_inline() {
        let html = "<body><p>Call <code>app.run()</code> to serve.</p></body>";
        assert_eq!(html_to_text(html), "Call app.run() to serve.\n\n");
    }

    #[test]
    fn test_nested_code_block_is_labelled() {
        let html = "<body><div><pre><code>let x = 1;</code></pre></div></body>";
        assert_eq!(html_to_text(html), "code block:\nlet x = 1;\n\n");
    }

    #[test]
    fn test_empty_body_is_empty_text() {
        assert_eq!(html_to_text("<html><body>   </body></html>"), "");
    }

    #[test]
    fn test_text_nodes_in_document_order() {
        let node = DocNode::parse("<body><div>a<span>b<i>c</i></span>d</div>e</body>");
        assert_eq!(node.text_nodes().collect::<Vec<_>>(), vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn test_deeply_nested_page_on_small_stack() {
        let html = format!(
            "<html><body>{}<h2>Deep heading</h2><pre>deep code</pre>deep text</body></html>",
            "<div>".repeat(20_000)
        );

        let text = std::thread::Builder::new()
            .stack_size(2 * 1024 * 1024)
            .spawn(move || {
                let node = DocNode::parse(&html);
                let raw = node.raw_text();
                drop(node);
                (html_to_text(&html), raw)
            })
            .unwrap()
            .join()
            .unwrap();

        assert_eq!(text.0, "DEEP HEADING\n\ncode block:\ndeep code\n\ndeep text\n");
        assert_eq!(text.1, "Deep headingdeep codedeep text");
    }
}
