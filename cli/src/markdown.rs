//! Markdown to styled terminal text.

use crossterm::style::{Attribute, Color, ContentStyle};
use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};

const RULE_WIDTH: usize = 40;

/// Render `content` as terminal lines. With `color` off the output is
/// plain text, which is what gets written when stdout is not a terminal.
pub fn render_markdown(content: &str, color: bool) -> String {
    let mut renderer = MarkdownRenderer::new(color);
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
    for event in Parser::new_ext(content, options) {
        renderer.handle_event(event);
    }
    renderer.flush_line();
    renderer.lines.join("\n")
}

struct MarkdownRenderer {
    color: bool,
    lines: Vec<String>,
    current: String,

    // Counters, not booleans, so nested emphasis unwinds correctly.
    bold_count: usize,
    italic_count: usize,
    quote_depth: usize,

    in_code_block: bool,
    code_language: Option<String>,
    code_block_content: Vec<String>,

    list_stack: Vec<Option<u64>>,
}

impl MarkdownRenderer {
    fn new(color: bool) -> Self {
        Self {
            color,
            lines: Vec::new(),
            current: String::new(),
            bold_count: 0,
            italic_count: 0,
            quote_depth: 0,
            in_code_block: false,
            code_language: None,
            code_block_content: Vec::new(),
            list_stack: Vec::new(),
        }
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.handle_text(&text),
            Event::Code(code) => {
                let styled = self.styled(&code, code_style());
                self.current.push_str(&styled);
            }
            Event::SoftBreak => self.current.push(' '),
            Event::HardBreak => self.flush_line(),
            Event::Html(html) | Event::InlineHtml(html) => self.handle_text(&html),
            Event::Rule => {
                self.flush_line();
                self.lines.push("─".repeat(RULE_WIDTH));
            }
            _ => {}
        }
    }

    fn start_tag(&mut self, tag: Tag) {
        match tag {
            Tag::Heading { .. } | Tag::Strong => self.bold_count += 1,
            Tag::Emphasis => self.italic_count += 1,
            Tag::CodeBlock(kind) => {
                self.flush_line();
                self.in_code_block = true;
                self.code_language = match kind {
                    CodeBlockKind::Fenced(info) => info
                        .split_whitespace()
                        .next()
                        .map(str::to_string),
                    CodeBlockKind::Indented => None,
                };
                self.code_block_content.clear();
            }
            Tag::List(start) => {
                self.flush_line();
                self.list_stack.push(start);
            }
            Tag::Item => {
                let indent = "  ".repeat(self.list_stack.len().saturating_sub(1));
                let marker = match self.list_stack.last_mut() {
                    Some(Some(idx)) => {
                        let marker = format!("{indent}{idx}. ");
                        *idx += 1;
                        marker
                    }
                    _ => format!("{indent}• "),
                };
                self.current.push_str(&marker);
            }
            Tag::Paragraph => {
                if !self.lines.is_empty() && self.list_stack.is_empty() {
                    self.push_line(String::new());
                }
            }
            Tag::BlockQuote(_) => {
                self.flush_line();
                self.quote_depth += 1;
            }
            _ => {}
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Heading(_) => {
                self.bold_count = self.bold_count.saturating_sub(1);
                self.flush_line();
            }
            TagEnd::Strong => self.bold_count = self.bold_count.saturating_sub(1),
            TagEnd::Emphasis => self.italic_count = self.italic_count.saturating_sub(1),
            TagEnd::CodeBlock => {
                self.in_code_block = false;
                self.render_code_block();
            }
            TagEnd::List(_) => {
                self.list_stack.pop();
            }
            TagEnd::Item | TagEnd::Paragraph => self.flush_line(),
            TagEnd::BlockQuote(_) => {
                self.flush_line();
                self.quote_depth = self.quote_depth.saturating_sub(1);
            }
            _ => {}
        }
    }

    fn handle_text(&mut self, text: &str) {
        if self.in_code_block {
            self.code_block_content
                .extend(text.lines().map(str::to_string));
            return;
        }
        let styled = self.styled(text, self.current_style());
        self.current.push_str(&styled);
    }

    fn render_code_block(&mut self) {
        if let Some(language) = self.code_language.take() {
            let header = self.styled(&language, dim_style());
            self.push_line(header);
        }
        let content = std::mem::take(&mut self.code_block_content);
        for line in content {
            let styled = self.styled(&line, code_style());
            self.push_line(format!("  {styled}"));
        }
    }

    fn current_style(&self) -> ContentStyle {
        let mut style = ContentStyle::new();
        if self.bold_count > 0 {
            style.attributes.set(Attribute::Bold);
        }
        if self.italic_count > 0 {
            style.attributes.set(Attribute::Italic);
        }
        if self.quote_depth > 0 {
            style.foreground_color = Some(Color::Cyan);
        }
        style
    }

    fn styled(&self, text: &str, style: ContentStyle) -> String {
        if self.color {
            style.apply(text).to_string()
        } else {
            text.to_string()
        }
    }

    fn push_line(&mut self, line: String) {
        let prefix = "│ ".repeat(self.quote_depth);
        if prefix.is_empty() {
            self.lines.push(line);
        } else {
            let prefix = self.styled(&prefix, dim_style());
            self.lines.push(format!("{prefix}{line}"));
        }
    }

    fn flush_line(&mut self) {
        if !self.current.is_empty() {
            let line = std::mem::take(&mut self.current);
            self.push_line(line);
        }
    }
}

fn code_style() -> ContentStyle {
    let mut style = ContentStyle::new();
    style.foreground_color = Some(Color::Yellow);
    style
}

fn dim_style() -> ContentStyle {
    let mut style = ContentStyle::new();
    style.foreground_color = Some(Color::DarkGrey);
    style
}
