use folio_document::{FlowNode, Mark, MarkType, NodeType};

use crate::sanitize::{escape_html, safe_color, safe_href, safe_language, safe_src, RenderMode};

/// Nodes nested deeper than this render as nothing
pub const MAX_DEPTH: usize = 256;

const TEXT_ALIGNMENTS: &[&str] = &["left", "center", "right", "justify"];

struct Context {
    mode: RenderMode,
    depth: usize,
    buffer: String,
}

impl Context {
    fn new(mode: RenderMode) -> Self {
        Self {
            mode,
            depth: 0,
            buffer: String::new(),
        }
    }

    fn add(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    fn indent(&mut self) {
        self.depth += 1;
    }

    fn dedent(&mut self) {
        if self.depth > 0 {
            self.depth -= 1;
        }
    }

    fn get_output(self) -> String {
        self.buffer
    }
}

/// Render a flow tree to HTML
///
/// Pure: the same tree and mode always produce the same bytes. In
/// [`RenderMode::Public`] the output only ever contains the fixed set of tags
/// generated here, every user string is escaped and URLs/colours pass the
/// allow-lists in [`crate::sanitize`].
pub fn render(flow: &FlowNode, mode: RenderMode) -> String {
    let mut ctx = Context::new(mode);
    render_node(flow, &mut ctx);
    ctx.get_output()
}

fn render_node(node: &FlowNode, ctx: &mut Context) {
    if ctx.depth >= MAX_DEPTH {
        tracing::debug!(depth = ctx.depth, "flow tree too deep, truncating");
        return;
    }

    ctx.indent();
    match &node.node_type {
        NodeType::Doc => render_children(node, ctx),

        NodeType::Paragraph => {
            ctx.add("<p");
            if let Some(align) = node
                .attr_str("textAlign")
                .filter(|align| TEXT_ALIGNMENTS.contains(align))
            {
                ctx.add(&format!(" style=\"text-align: {}\"", align));
            }
            ctx.add(">");
            if node.has_children() {
                render_children(node, ctx);
            } else {
                ctx.add("<br>");
            }
            ctx.add("</p>");
        }

        NodeType::Heading => {
            let level = node.attr_i64("level").unwrap_or(1).clamp(1, 6);
            ctx.add(&format!("<h{}>", level));
            render_children(node, ctx);
            ctx.add(&format!("</h{}>", level));
        }

        NodeType::BulletList => wrap("ul", node, ctx),

        NodeType::OrderedList => {
            match node.attr_i64("start").filter(|start| *start != 1) {
                Some(start) => ctx.add(&format!("<ol start=\"{}\">", start)),
                None => ctx.add("<ol>"),
            }
            render_children(node, ctx);
            ctx.add("</ol>");
        }

        NodeType::ListItem => wrap("li", node, ctx),

        NodeType::Blockquote => wrap("blockquote", node, ctx),

        NodeType::CodeBlock => {
            ctx.add("<pre><code");
            if let Some(language) = node.attr_str("language").and_then(safe_language) {
                ctx.add(&format!(" class=\"language-{}\"", escape_html(language)));
            }
            ctx.add(">");
            ctx.add(&escape_html(&node.plain_text()));
            ctx.add("</code></pre>");
        }

        NodeType::HorizontalRule => ctx.add("<hr>"),

        NodeType::HardBreak => ctx.add("<br>"),

        NodeType::Text => render_text(node, ctx),

        NodeType::Image => render_inline_image(node, ctx),

        NodeType::Unknown(name) => {
            tracing::debug!(node_type = %name, "skipping unsupported node");
        }
    }
    ctx.dedent();
}

fn render_children(node: &FlowNode, ctx: &mut Context) {
    for child in node.children() {
        render_node(child, ctx);
    }
}

fn wrap(tag: &str, node: &FlowNode, ctx: &mut Context) {
    ctx.add(&format!("<{}>", tag));
    render_children(node, ctx);
    ctx.add(&format!("</{}>", tag));
}

/// Inline images belong to the floating layer in public output
fn render_inline_image(node: &FlowNode, ctx: &mut Context) {
    if ctx.mode == RenderMode::Public {
        return;
    }
    let Some(src) = node.attr_str("src").and_then(|src| safe_src(src, ctx.mode)) else {
        return;
    };
    let alt = node.attr_str("alt").unwrap_or("");
    ctx.add(&format!(
        "<img src=\"{}\" alt=\"{}\">",
        escape_html(&src),
        escape_html(alt)
    ));
}

/// Escape, then wrap: code → bold → italic → underline → strike → link → colour
fn render_text(node: &FlowNode, ctx: &mut Context) {
    let text = match node.text.as_deref() {
        Some(text) if !text.is_empty() => text,
        _ => return,
    };

    let mut html = escape_html(text);
    let marks = node.marks();

    for (mark_type, tag) in [
        (MarkType::Code, "code"),
        (MarkType::Bold, "strong"),
        (MarkType::Italic, "em"),
        (MarkType::Underline, "u"),
        (MarkType::Strike, "s"),
    ] {
        if node.has_mark(&mark_type) {
            html = format!("<{tag}>{html}</{tag}>");
        }
    }

    if let Some(href) = first_mark(marks, &MarkType::Link)
        .and_then(|mark| mark.attr_str("href"))
        .and_then(|href| safe_href(href, ctx.mode))
    {
        html = format!(
            "<a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">{}</a>",
            escape_html(&href),
            html
        );
    }

    let color = color_of(marks, &MarkType::TextColor, ctx.mode);
    let background = color_of(marks, &MarkType::BackgroundColor, ctx.mode);
    let style = match (color, background) {
        (Some(c), Some(b)) => Some(format!("color: {}; background-color: {}", c, b)),
        (Some(c), None) => Some(format!("color: {}", c)),
        (None, Some(b)) => Some(format!("background-color: {}", b)),
        (None, None) => None,
    };
    if let Some(style) = style {
        html = format!("<span style=\"{}\">{}</span>", escape_html(&style), html);
    }

    ctx.add(&html);
}

fn first_mark<'a>(marks: &'a [Mark], mark_type: &MarkType) -> Option<&'a Mark> {
    marks.iter().find(|mark| &mark.mark_type == mark_type)
}

fn color_of<'a>(marks: &'a [Mark], mark_type: &MarkType, mode: RenderMode) -> Option<&'a str> {
    first_mark(marks, mark_type)
        .and_then(|mark| mark.attr_str("color"))
        .and_then(|color| safe_color(color, mode))
}
