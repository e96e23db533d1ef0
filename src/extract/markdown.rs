//! HTML to markdown conversion
//!
//! A single recursive walk over the parsed DOM. The goal is a readable,
//! stable rendition of the main structural elements; pixel-perfect fidelity
//! is out of scope for the engine.

use crate::extract::html::resolve_link;
use ego_tree::NodeRef;
use scraper::{Html, Node};
use url::Url;

/// Converts an HTML document to markdown
///
/// Handles headings, paragraphs, emphasis, links, images, lists,
/// blockquotes, code, and horizontal rules. Script/style/head contents are
/// dropped. Relative link targets resolve against `base_url`.
pub fn html_to_markdown(html: &str, base_url: &Url) -> String {
    let document = Html::parse_document(html);
    let mut out = String::new();
    for child in document.tree.root().children() {
        render_node(child, base_url, &mut out, &ListContext::None);
    }
    tidy(&out)
}

/// List nesting the walker is currently inside
enum ListContext {
    None,
    Unordered { depth: usize },
    Ordered { depth: usize, index: usize },
}

fn render_node(node: NodeRef<Node>, base: &Url, out: &mut String, list: &ListContext) {
    match node.value() {
        Node::Text(text) => {
            let collapsed = collapse_whitespace(text);
            if !collapsed.is_empty() {
                // Keep words separated across adjacent inline nodes.
                if needs_space(out) && !collapsed.starts_with(|c: char| c.is_ascii_punctuation()) {
                    out.push(' ');
                }
                out.push_str(&collapsed);
            }
        }
        Node::Element(element) => {
            match element.name() {
                "script" | "style" | "noscript" | "template" | "head" => {}
                "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                    let level = element.name().as_bytes()[1] - b'0';
                    out.push_str("\n\n");
                    for _ in 0..level {
                        out.push('#');
                    }
                    out.push(' ');
                    render_children(node, base, out, list);
                    out.push_str("\n\n");
                }
                "p" | "section" | "article" | "div" | "main" | "header" | "footer" | "nav"
                | "table" | "tr" => {
                    out.push_str("\n\n");
                    render_children(node, base, out, list);
                    out.push_str("\n\n");
                }
                "br" => out.push('\n'),
                "hr" => out.push_str("\n\n---\n\n"),
                "strong" | "b" => {
                    if needs_space(out) {
                        out.push(' ');
                    }
                    out.push_str("**");
                    render_children(node, base, out, list);
                    out.push_str("**");
                }
                "em" | "i" => {
                    if needs_space(out) {
                        out.push(' ');
                    }
                    out.push('*');
                    render_children(node, base, out, list);
                    out.push('*');
                }
                "code" => {
                    // Inline only; fenced blocks are handled by <pre>.
                    if needs_space(out) {
                        out.push(' ');
                    }
                    out.push('`');
                    out.push_str(collapse_whitespace(&raw_text(node)).as_str());
                    out.push('`');
                }
                "pre" => {
                    let code = raw_text(node);
                    out.push_str("\n\n```\n");
                    out.push_str(code.trim_matches('\n'));
                    out.push_str("\n```\n\n");
                }
                "a" => {
                    let href = element.attr("href").unwrap_or("");
                    match resolve_link(href, base) {
                        Some(target) => {
                            if needs_space(out) {
                                out.push(' ');
                            }
                            out.push('[');
                            render_children(node, base, out, list);
                            out.push_str("](");
                            out.push_str(&target);
                            out.push(')');
                        }
                        None => render_children(node, base, out, list),
                    }
                }
                "img" => {
                    let alt = element.attr("alt").unwrap_or("");
                    if let Some(src) = element.attr("src").and_then(|s| resolve_link(s, base)) {
                        if needs_space(out) {
                            out.push(' ');
                        }
                        out.push_str(&format!("![{}]({})", alt.trim(), src));
                    }
                }
                "ul" => {
                    let depth = list_depth(list);
                    out.push('\n');
                    render_children(node, base, out, &ListContext::Unordered { depth: depth + 1 });
                    out.push('\n');
                }
                "ol" => {
                    let depth = list_depth(list);
                    out.push('\n');
                    render_children(
                        node,
                        base,
                        out,
                        &ListContext::Ordered {
                            depth: depth + 1,
                            index: 0,
                        },
                    );
                    out.push('\n');
                }
                "li" => {
                    out.push('\n');
                    match list {
                        ListContext::Ordered { depth, index } => {
                            out.push_str(&"  ".repeat(depth.saturating_sub(1)));
                            out.push_str(&format!("{}. ", index + 1));
                        }
                        ListContext::Unordered { depth } => {
                            out.push_str(&"  ".repeat(depth.saturating_sub(1)));
                            out.push_str("- ");
                        }
                        ListContext::None => out.push_str("- "),
                    }
                    render_children(node, base, out, list);
                }
                "blockquote" => {
                    let mut inner = String::new();
                    render_children(node, base, &mut inner, list);
                    out.push_str("\n\n");
                    for line in tidy(&inner).lines() {
                        out.push_str("> ");
                        out.push_str(line);
                        out.push('\n');
                    }
                    out.push('\n');
                }
                _ => render_children(node, base, out, list),
            }
        }
        _ => {}
    }
}

fn render_children(node: NodeRef<Node>, base: &Url, out: &mut String, list: &ListContext) {
    // `li` ordering needs a running index, so ordered lists walk their
    // children with an incrementing context.
    if let ListContext::Ordered { depth, .. } = list {
        let mut index = 0;
        for child in node.children() {
            let is_item = child
                .value()
                .as_element()
                .map(|e| e.name() == "li")
                .unwrap_or(false);
            render_node(
                child,
                base,
                out,
                &ListContext::Ordered {
                    depth: *depth,
                    index,
                },
            );
            if is_item {
                index += 1;
            }
        }
        return;
    }

    for child in node.children() {
        render_node(child, base, out, list);
    }
}

fn list_depth(list: &ListContext) -> usize {
    match list {
        ListContext::None => 0,
        ListContext::Unordered { depth } => *depth,
        ListContext::Ordered { depth, .. } => *depth,
    }
}

/// All raw text under a node, markup ignored
fn raw_text(node: NodeRef<Node>) -> String {
    let mut text = String::new();
    for descendant in node.descendants() {
        if let Some(t) = descendant.value().as_text() {
            text.push_str(t);
        }
    }
    text
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// True when appended inline content needs a separating space
fn needs_space(out: &str) -> bool {
    out.chars()
        .last()
        .map(|c| !c.is_whitespace() && c != '(' && c != '[')
        .unwrap_or(false)
}

/// Collapses blank-line runs and trims the result
fn tidy(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut blank_run = 0;
    for line in raw.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push_str(line);
        out.push('\n');
    }
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convert(html: &str) -> String {
        let base = Url::parse("https://example.com/").unwrap();
        html_to_markdown(html, &base)
    }

    #[test]
    fn test_headings() {
        let md = convert("<h1>Title</h1><h2>Sub</h2>");
        assert!(md.contains("# Title"));
        assert!(md.contains("## Sub"));
    }

    #[test]
    fn test_paragraphs_separated() {
        let md = convert("<p>First</p><p>Second</p>");
        assert_eq!(md, "First\n\nSecond");
    }

    #[test]
    fn test_emphasis() {
        let md = convert("<p>a <strong>bold</strong> and <em>slanted</em> word</p>");
        assert!(md.contains("**bold**"));
        assert!(md.contains("*slanted*"));
    }

    #[test]
    fn test_link_resolution() {
        let md = convert(r#"<p><a href="/docs">Docs</a></p>"#);
        assert!(md.contains("[Docs](https://example.com/docs)"));
    }

    #[test]
    fn test_unresolvable_link_keeps_text() {
        let md = convert(r#"<p><a href="javascript:void(0)">Click</a></p>"#);
        assert_eq!(md, "Click");
    }

    #[test]
    fn test_image() {
        let md = convert(r#"<p><img src="/pic.png" alt="A pic"></p>"#);
        assert!(md.contains("![A pic](https://example.com/pic.png)"));
    }

    #[test]
    fn test_unordered_list() {
        let md = convert("<ul><li>one</li><li>two</li></ul>");
        assert!(md.contains("- one"));
        assert!(md.contains("- two"));
    }

    #[test]
    fn test_ordered_list_numbering() {
        let md = convert("<ol><li>first</li><li>second</li><li>third</li></ol>");
        assert!(md.contains("1. first"));
        assert!(md.contains("2. second"));
        assert!(md.contains("3. third"));
    }

    #[test]
    fn test_code_block() {
        let md = convert("<pre><code>let x = 1;\nlet y = 2;</code></pre>");
        assert!(md.contains("```\nlet x = 1;\nlet y = 2;\n```"));
    }

    #[test]
    fn test_inline_code() {
        let md = convert("<p>run <code>cargo test</code> now</p>");
        assert!(md.contains("`cargo test`"));
    }

    #[test]
    fn test_blockquote() {
        let md = convert("<blockquote><p>quoted text</p></blockquote>");
        assert!(md.contains("> quoted text"));
    }

    #[test]
    fn test_script_dropped() {
        let md = convert("<p>keep</p><script>drop()</script>");
        assert_eq!(md, "keep");
    }

    #[test]
    fn test_horizontal_rule() {
        let md = convert("<p>a</p><hr><p>b</p>");
        assert!(md.contains("---"));
    }

    #[test]
    fn test_no_triple_blank_lines() {
        let md = convert("<div><p>a</p></div><div><p>b</p></div>");
        assert!(!md.contains("\n\n\n"));
    }
}
