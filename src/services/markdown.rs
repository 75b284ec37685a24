use crate::services::highlight::{HighlightedLine, highlight_code, highlight_html};
use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd, html};
use std::collections::HashMap;

#[derive(Clone, Debug, PartialEq)]
pub enum Block {
    Paragraph(Vec<InlineRun>),
    Heading(u32, Vec<InlineRun>),
    ListItem {
        depth: usize,
        content: Vec<InlineRun>,
    },
    OrderedListItem {
        depth: usize,
        number: u64,
        content: Vec<InlineRun>,
    },
    TaskListItem {
        depth: usize,
        checked: bool,
        content: Vec<InlineRun>,
    },
    /// `lines` stays empty until [`highlight_code_blocks`] runs.
    CodeBlock {
        language: Option<String>,
        text: String,
        lines: Vec<HighlightedLine>,
    },
    Quote(Vec<InlineRun>),
    TableRow {
        header: bool,
        cells: Vec<Vec<InlineRun>>,
    },
    Image {
        alt: String,
        src: String,
    },
    Rule,
    /// Inline footnote reference marker [^label]
    FootnoteRef { label: String, index: usize },
    /// Footnote definition [^label]: content
    FootnoteDefinition {
        label: String,
        index: usize,
        content: Vec<InlineRun>,
    },
}

/// Main content blocks plus footnote definitions in reference order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParsedDocument {
    pub blocks: Vec<Block>,
    pub footnotes: Vec<Block>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct InlineRun {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub strike: bool,
    pub code: bool,
    pub link: Option<String>,
}

fn markdown_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_SMART_PUNCTUATION);
    options
}

fn fence_language(kind: &CodeBlockKind<'_>) -> Option<String> {
    match kind {
        CodeBlockKind::Fenced(info) => info
            .split_whitespace()
            .next()
            .filter(|lang| !lang.is_empty())
            .map(str::to_string),
        CodeBlockKind::Indented => None,
    }
}

pub fn parse_blocks(source: &str) -> ParsedDocument {
    let mut builder = BlockBuilder::default();
    for event in Parser::new_ext(source, markdown_options()) {
        builder.event(event);
    }
    builder.finish()
}

/// Fills in `lines` for every code block.
pub fn highlight_code_blocks(document: &mut ParsedDocument, theme: &str) {
    for block in document.blocks.iter_mut() {
        if let Block::CodeBlock {
            language,
            text,
            lines,
        } = block
        {
            *lines = highlight_code(text, language.as_deref(), theme);
        }
    }
}

/// Renders markdown to an HTML fragment. Fenced code is replaced with highlighted markup.
pub fn render_html(source: &str, theme: &str) -> String {
    let mut code: Option<(Option<String>, String)> = None;
    let events = Parser::new_ext(source, markdown_options()).filter_map(|event| match event {
        Event::Start(Tag::CodeBlock(kind)) => {
            code = Some((fence_language(&kind), String::new()));
            None
        }
        Event::Text(text) if code.is_some() => {
            if let Some((_, buf)) = code.as_mut() {
                buf.push_str(&text);
            }
            None
        }
        Event::End(TagEnd::CodeBlock) => {
            let (language, text) = code.take()?;
            let markup = highlight_html(&text, language.as_deref(), theme)
                .unwrap_or_else(|| format!("<pre><code>{}</code></pre>\n", escape_html(&text)));
            Some(Event::Html(markup.into()))
        }
        other => Some(other),
    });

    let mut out = String::new();
    html::push_html(&mut out, events);
    out
}

/// Wraps [`render_html`] output in a standalone page.
pub fn render_html_document(source: &str, theme: &str, title: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n\
         <style>body{{font-family:-apple-system,Segoe UI,Helvetica,Arial,sans-serif;\
         max-width:860px;margin:2rem auto;padding:0 1rem;line-height:1.6;color:#24292e}}\
         pre{{padding:12px;border-radius:6px;overflow:auto}}\
         code{{font-family:Menlo,Consolas,monospace}}\
         blockquote{{color:#6a737d;border-left:4px solid #dfe2e5;margin:0;padding:0 1em}}\
         table{{border-collapse:collapse}}td,th{{border:1px solid #dfe2e5;padding:4px 10px}}</style>\n\
         </head>\n<body>\n{}</body>\n</html>\n",
        escape_html(title),
        render_html(source, theme)
    )
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[derive(Clone, Copy, Default)]
struct ItemState {
    number: Option<u64>,
    task: Option<bool>,
}

#[derive(Default)]
struct BlockBuilder {
    blocks: Vec<Block>,
    runs: Vec<InlineRun>,
    bold: u32,
    italic: u32,
    strike: u32,
    links: Vec<String>,
    quote_depth: u32,
    heading: Option<u32>,
    /// Next number per open list; `None` for bullet lists.
    lists: Vec<Option<u64>>,
    items: Vec<ItemState>,
    code: Option<(Option<String>, String)>,
    image: Option<(String, String)>,
    table_cells: Vec<Vec<InlineRun>>,
    // Footnote labels map to 1-based indices in order of first reference.
    footnote_indices: HashMap<String, usize>,
    footnote_definitions: HashMap<String, Vec<InlineRun>>,
    footnote_runs: Vec<InlineRun>,
    current_footnote: Option<String>,
}

impl BlockBuilder {
    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(Tag::Paragraph) => {
                // Later paragraphs of a list item or footnote start a new row.
                let continues = if self.current_footnote.is_some() {
                    !self.footnote_runs.is_empty()
                } else {
                    !self.items.is_empty() && !self.runs.is_empty()
                };
                if continues {
                    self.push_run("\n", false);
                }
            }
            Event::End(TagEnd::Paragraph) => {
                if self.current_footnote.is_none() && self.items.is_empty() {
                    self.flush_paragraph();
                }
            }
            Event::Start(Tag::Heading { level, .. }) => {
                self.flush_pending();
                self.heading = Some(heading_level(level));
            }
            Event::End(TagEnd::Heading(_)) => {
                let level = self.heading.take().unwrap_or(1);
                let runs = std::mem::take(&mut self.runs);
                if !runs.is_empty() {
                    self.blocks.push(Block::Heading(level, runs));
                }
            }
            Event::Start(Tag::List(start)) => {
                if !self.items.is_empty() {
                    self.flush_item();
                }
                self.lists.push(start);
            }
            Event::End(TagEnd::List(_)) => {
                self.lists.pop();
            }
            Event::Start(Tag::Item) => {
                let number = match self.lists.last_mut() {
                    Some(Some(next)) => {
                        let number = *next;
                        *next += 1;
                        Some(number)
                    }
                    _ => None,
                };
                self.items.push(ItemState { number, task: None });
            }
            Event::End(TagEnd::Item) => {
                self.flush_item();
                self.items.pop();
            }
            Event::TaskListMarker(checked) => {
                if let Some(item) = self.items.last_mut() {
                    item.task = Some(checked);
                }
            }
            Event::Start(Tag::BlockQuote(_)) => {
                self.flush_pending();
                self.quote_depth += 1;
            }
            Event::End(TagEnd::BlockQuote(_)) => {
                self.flush_pending();
                self.quote_depth = self.quote_depth.saturating_sub(1);
            }
            Event::Start(Tag::CodeBlock(kind)) => {
                self.flush_pending();
                self.code = Some((fence_language(&kind), String::new()));
            }
            Event::End(TagEnd::CodeBlock) => {
                if let Some((language, text)) = self.code.take() {
                    self.blocks.push(Block::CodeBlock {
                        language,
                        text,
                        lines: Vec::new(),
                    });
                }
            }
            Event::Start(Tag::TableCell) => {}
            Event::End(TagEnd::TableCell) => {
                let cell = std::mem::take(&mut self.runs);
                self.table_cells.push(cell);
            }
            Event::End(TagEnd::TableHead) => self.flush_table_row(true),
            Event::End(TagEnd::TableRow) => self.flush_table_row(false),
            Event::Start(Tag::FootnoteDefinition(label)) => {
                self.current_footnote = Some(label.to_string());
                self.footnote_runs.clear();
            }
            Event::End(TagEnd::FootnoteDefinition) => {
                if let Some(label) = self.current_footnote.take() {
                    let runs = std::mem::take(&mut self.footnote_runs);
                    self.footnote_definitions.insert(label, runs);
                }
            }
            Event::FootnoteReference(label) => {
                let next = self.footnote_indices.len() + 1;
                let index = *self
                    .footnote_indices
                    .entry(label.to_string())
                    .or_insert(next);
                self.flush_pending();
                self.blocks.push(Block::FootnoteRef {
                    label: label.to_string(),
                    index,
                });
            }
            Event::Text(text) => {
                if let Some((_, code)) = self.code.as_mut() {
                    code.push_str(&text);
                } else if let Some((_, alt)) = self.image.as_mut() {
                    alt.push_str(&text);
                } else {
                    self.push_run(&text, false);
                }
            }
            Event::Code(text) => self.push_run(&text, true),
            Event::Html(text) | Event::InlineHtml(text) => {
                if self.code.is_none() {
                    self.push_run(text.trim_end_matches('\n'), true);
                }
            }
            Event::Start(Tag::Emphasis) => self.italic += 1,
            Event::End(TagEnd::Emphasis) => self.italic = self.italic.saturating_sub(1),
            Event::Start(Tag::Strong) => self.bold += 1,
            Event::End(TagEnd::Strong) => self.bold = self.bold.saturating_sub(1),
            Event::Start(Tag::Strikethrough) => self.strike += 1,
            Event::End(TagEnd::Strikethrough) => self.strike = self.strike.saturating_sub(1),
            Event::Start(Tag::Link { dest_url, .. }) => self.links.push(dest_url.to_string()),
            Event::End(TagEnd::Link) => {
                self.links.pop();
            }
            Event::Start(Tag::Image { dest_url, .. }) => {
                self.image = Some((dest_url.to_string(), String::new()));
            }
            Event::End(TagEnd::Image) => {
                if let Some((src, alt)) = self.image.take() {
                    self.flush_pending();
                    self.blocks.push(Block::Image { alt, src });
                }
            }
            Event::SoftBreak => self.push_run(" ", false),
            Event::HardBreak => self.push_run("\n", false),
            Event::Rule => {
                self.flush_pending();
                self.blocks.push(Block::Rule);
            }
            _ => {}
        }
    }

    fn push_run(&mut self, text: &str, code: bool) {
        if text.is_empty() {
            return;
        }
        let run = InlineRun {
            text: text.to_string(),
            bold: self.bold > 0,
            italic: self.italic > 0,
            strike: self.strike > 0,
            code,
            link: self.links.last().cloned(),
        };
        if self.current_footnote.is_some() {
            self.footnote_runs.push(run);
        } else {
            self.runs.push(run);
        }
    }

    fn flush_pending(&mut self) {
        if self.items.is_empty() {
            self.flush_paragraph();
        } else {
            self.flush_item();
        }
    }

    fn flush_paragraph(&mut self) {
        if self.runs.is_empty() {
            return;
        }
        let runs = std::mem::take(&mut self.runs);
        let block = if self.quote_depth > 0 {
            Block::Quote(runs)
        } else {
            Block::Paragraph(runs)
        };
        self.blocks.push(block);
    }

    fn flush_item(&mut self) {
        if self.runs.is_empty() {
            return;
        }
        let content = std::mem::take(&mut self.runs);
        let depth = self.lists.len().saturating_sub(1);
        let item = self.items.last().copied().unwrap_or_default();
        let block = match (item.task, item.number) {
            (Some(checked), _) => Block::TaskListItem {
                depth,
                checked,
                content,
            },
            (None, Some(number)) => Block::OrderedListItem {
                depth,
                number,
                content,
            },
            (None, None) => Block::ListItem { depth, content },
        };
        self.blocks.push(block);
    }

    fn flush_table_row(&mut self, header: bool) {
        let cells = std::mem::take(&mut self.table_cells);
        if !cells.is_empty() {
            self.blocks.push(Block::TableRow { header, cells });
        }
    }

    fn finish(mut self) -> ParsedDocument {
        self.flush_pending();

        let mut footnotes: Vec<(usize, String, Vec<InlineRun>)> = self
            .footnote_indices
            .iter()
            .filter_map(|(label, &index)| {
                self.footnote_definitions
                    .remove(label)
                    .map(|content| (index, label.clone(), content))
            })
            .collect();
        footnotes.sort_by_key(|(index, _, _)| *index);

        ParsedDocument {
            blocks: self.blocks,
            footnotes: footnotes
                .into_iter()
                .map(|(index, label, content)| Block::FootnoteDefinition {
                    label,
                    index,
                    content,
                })
                .collect(),
        }
    }
}

fn heading_level(level: HeadingLevel) -> u32 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::highlight::DEFAULT_THEME;

    fn text(runs: &[InlineRun]) -> String {
        runs.iter().map(|r| r.text.as_str()).collect()
    }

    #[test]
    fn headings_and_paragraphs() {
        let doc = parse_blocks("# Title\n\nSome **bold** text.\n");
        assert_eq!(doc.blocks.len(), 2);
        match &doc.blocks[0] {
            Block::Heading(1, runs) => assert_eq!(text(runs), "Title"),
            other => panic!("unexpected {other:?}"),
        }
        match &doc.blocks[1] {
            Block::Paragraph(runs) => {
                assert_eq!(text(runs), "Some bold text.");
                assert!(runs.iter().any(|r| r.bold && r.text == "bold"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn loose_item_keeps_paragraphs_apart() {
        let doc = parse_blocks("- first para\n\n  second para\n");
        match &doc.blocks[..] {
            [Block::ListItem { content, .. }] => {
                assert_eq!(text(content), "first para\nsecond para")
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn footnote_paragraphs_stay_apart() {
        let doc = parse_blocks("Claim[^src]\n\n[^src]: one\n\n    two\n");
        match &doc.footnotes[..] {
            [Block::FootnoteDefinition { content, .. }] => assert_eq!(text(content), "one\ntwo"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn ordered_task_and_nested_lists() {
        let doc = parse_blocks("3. three\n4. four\n\n- [x] done\n- [ ] todo\n\n* outer\n  * inner\n");
        let kinds: Vec<_> = doc
            .blocks
            .iter()
            .map(|b| match b {
                Block::OrderedListItem { number, depth, .. } => format!("ol{number}@{depth}"),
                Block::TaskListItem { checked, .. } => format!("task:{checked}"),
                Block::ListItem { depth, content } => format!("ul:{}@{depth}", text(content)),
                other => format!("{other:?}"),
            })
            .collect();
        assert_eq!(
            kinds,
            vec!["ol3@0", "ol4@0", "task:true", "task:false", "ul:outer@0", "ul:inner@1"]
        );
    }

    #[test]
    fn fenced_code_keeps_language_and_text() {
        let mut doc = parse_blocks("```rust\nfn main() {}\n```\n");
        highlight_code_blocks(&mut doc, DEFAULT_THEME);
        match &doc.blocks[0] {
            Block::CodeBlock {
                language,
                text,
                lines,
            } => {
                assert_eq!(language.as_deref(), Some("rust"));
                assert_eq!(text, "fn main() {}\n");
                assert_eq!(lines.len(), 1);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn quotes_images_and_rules() {
        let doc = parse_blocks("> quoted\n\n![alt text](pic.png)\n\n---\n");
        assert!(matches!(&doc.blocks[0], Block::Quote(runs) if text(runs) == "quoted"));
        assert!(matches!(
            &doc.blocks[1],
            Block::Image { alt, src } if alt == "alt text" && src == "pic.png"
        ));
        assert_eq!(doc.blocks[2], Block::Rule);
    }

    #[test]
    fn tables_become_rows() {
        let doc = parse_blocks("| a | b |\n|---|---|\n| 1 | 2 |\n");
        match &doc.blocks[..] {
            [
                Block::TableRow { header: true, cells: head },
                Block::TableRow { header: false, cells: body },
            ] => {
                assert_eq!(text(&head[1]), "b");
                assert_eq!(text(&body[0]), "1");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn footnotes_are_ordered_by_first_reference() {
        let doc = parse_blocks("A[^b] and B[^a].\n\n[^a]: first def\n[^b]: second def\n");
        let labels: Vec<_> = doc
            .footnotes
            .iter()
            .map(|f| match f {
                Block::FootnoteDefinition { label, index, .. } => format!("{index}:{label}"),
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(labels, vec!["1:b", "2:a"]);
    }

    #[test]
    fn malformed_input_never_fails() {
        let doc = parse_blocks("**unclosed *emphasis\n```\nno end fence\n> > >\n| | |");
        assert!(!doc.blocks.is_empty());
    }

    #[test]
    fn html_rendering_highlights_code() {
        let html = render_html("# Hi\n\n```rust\nlet x = 1;\n```\n", DEFAULT_THEME);
        assert!(html.contains("<h1>Hi</h1>"));
        assert!(html.contains("<pre style="));
        assert!(!html.contains("<code class=\"language-rust\">"));
    }

    #[test]
    fn html_document_escapes_title() {
        let page = render_html_document("text", DEFAULT_THEME, "a<b>");
        assert!(page.contains("<title>a&lt;b&gt;</title>"));
        assert!(page.contains("<p>text</p>"));
    }
}
