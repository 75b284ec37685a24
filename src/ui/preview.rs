use crate::model::preview::PreviewState;
use crate::services::highlight::HighlightedLine;
use crate::services::markdown::{Block, InlineRun};
use crate::ui::theme::Theme;
use gpui::prelude::FluentBuilder as _;
use gpui::{
    AnyElement, App, Context, Entity, FocusHandle, FontWeight, InteractiveElement, IntoElement,
    KeyDownEvent, MouseButton, MouseDownEvent, ParentElement, Render, ScrollHandle, SharedString,
    StatefulInteractiveElement, Styled, Window, div, point, px, rgb,
};

const INDENT: f32 = 18.;

pub struct PreviewView {
    preview: Entity<PreviewState>,
    focus_handle: Option<FocusHandle>,
    scroll_handle: ScrollHandle,
}

impl PreviewView {
    pub fn new(preview: Entity<PreviewState>) -> Self {
        Self {
            preview,
            focus_handle: None,
            scroll_handle: ScrollHandle::new(),
        }
    }
}

impl Render for PreviewView {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let document = self.preview.read(cx).document.clone();
        let focus_handle = self
            .focus_handle
            .get_or_insert_with(|| cx.focus_handle())
            .clone();
        let scroll_handle = self.scroll_handle.clone();

        div()
            .id("preview_scroll")
            .size_full()
            .min_w(px(0.))
            .min_h(px(0.))
            .bg(Theme::panel())
            .p(px(18.))
            .text_sm()
            .text_color(Theme::text())
            .overflow_y_scroll()
            .overflow_x_hidden()
            .track_scroll(&self.scroll_handle)
            .track_focus(&focus_handle)
            .on_mouse_down(MouseButton::Left, {
                let focus_handle = focus_handle.clone();
                move |_: &MouseDownEvent, window: &mut Window, _cx: &mut App| {
                    focus_handle.focus(window);
                }
            })
            .on_key_down({
                let focus_handle = focus_handle.clone();
                move |event: &KeyDownEvent, window: &mut Window, _cx: &mut App| {
                    if !focus_handle.is_focused(window) {
                        return;
                    }
                    let modifiers = event.keystroke.modifiers;
                    if modifiers.platform || modifiers.control {
                        return;
                    }

                    let key = event.keystroke.key.to_lowercase();
                    if key == "pageup" || key == "pagedown" {
                        let max = scroll_handle.max_offset();
                        let offset = scroll_handle.offset();
                        let page = scroll_handle.bounds().size.height;
                        if page > px(0.) {
                            let amount = page * 0.9;
                            let delta = if key == "pagedown" { -amount } else { amount };
                            let y = (offset.y + delta).clamp(-max.height, px(0.));
                            scroll_handle.set_offset(point(offset.x, y));
                            window.refresh();
                        }
                    }
                }
            })
            .child(
                div()
                    .flex()
                    .flex_col()
                    .items_start()
                    .gap_3()
                    .children(document.blocks.iter().map(render_block))
                    .when(!document.footnotes.is_empty(), |this| {
                        this.child(div().w_full().h(px(1.)).bg(Theme::border()))
                            .children(document.footnotes.iter().map(render_block))
                    }),
            )
    }
}

fn render_block(block: &Block) -> AnyElement {
    match block {
        Block::Heading(level, runs) => {
            let el = div().font_weight(FontWeight::BOLD).text_color(Theme::text());
            let el = match level {
                1 => el.text_2xl().pb(px(4.)).border_b_1().border_color(Theme::border()),
                2 => el.text_xl().pb(px(2.)).border_b_1().border_color(Theme::border()),
                3 => el.text_lg(),
                _ => el.text_base(),
            };
            el.w_full().child(render_inline_runs(runs)).into_any_element()
        }
        Block::Paragraph(runs) => div().child(render_inline_runs(runs)).into_any_element(),
        Block::ListItem { depth, content } => list_row(*depth, div().child("•"), content),
        Block::OrderedListItem {
            depth,
            number,
            content,
        } => list_row(*depth, div().child(format!("{number}.")), content),
        Block::TaskListItem {
            depth,
            checked,
            content,
        } => list_row(
            *depth,
            div()
                .size(px(12.))
                .mt(px(3.))
                .rounded(px(2.))
                .border_1()
                .border_color(Theme::muted())
                .when(*checked, |this| {
                    this.bg(Theme::accent())
                        .text_color(Theme::panel())
                        .text_xs()
                        .child("✓")
                }),
            content,
        ),
        Block::CodeBlock { text, lines, .. } => render_code_block(text, lines),
        Block::Quote(runs) => div()
            .flex()
            .gap_2()
            .child(div().w(px(4.)).bg(Theme::quote_bar()))
            .child(
                div()
                    .flex_1()
                    .min_w(px(0.))
                    .text_color(Theme::muted())
                    .child(render_inline_runs(runs)),
            )
            .into_any_element(),
        Block::TableRow { header, cells } => div()
            .flex()
            .w_full()
            .border_b_1()
            .border_color(Theme::border())
            .when(*header, |this| {
                this.font_weight(FontWeight::BOLD).bg(Theme::code_bg())
            })
            .children(cells.iter().map(|cell| {
                div()
                    .flex_1()
                    .min_w(px(0.))
                    .px(px(8.))
                    .py(px(4.))
                    .child(render_inline_runs(cell))
            }))
            .into_any_element(),
        Block::Image { alt, src } => div()
            .text_color(Theme::muted())
            .italic()
            .child(SharedString::from(if alt.is_empty() {
                format!("[image: {src}]")
            } else {
                format!("[image: {alt}]")
            }))
            .into_any_element(),
        Block::Rule => div()
            .w_full()
            .h(px(2.))
            .bg(Theme::border())
            .into_any_element(),
        Block::FootnoteRef { index, .. } => div()
            .text_xs()
            .text_color(Theme::accent())
            .child(format!("[{index}]"))
            .into_any_element(),
        Block::FootnoteDefinition { index, content, .. } => div()
            .flex()
            .gap_2()
            .text_xs()
            .child(div().text_color(Theme::accent()).child(format!("{index}.")))
            .child(div().flex_1().min_w(px(0.)).child(render_inline_runs(content)))
            .into_any_element(),
    }
}

fn list_row(depth: usize, marker: gpui::Div, content: &[InlineRun]) -> AnyElement {
    div()
        .flex()
        .items_start()
        .gap_2()
        .pl(px(INDENT * depth as f32))
        .child(marker.text_color(Theme::accent()))
        .child(div().flex_1().min_w(px(0.)).child(render_inline_runs(content)))
        .into_any_element()
}

fn render_code_block(text: &str, lines: &[HighlightedLine]) -> AnyElement {
    let body = div().flex().flex_col().font_family("Menlo").text_xs();
    let body = if lines.is_empty() {
        body.children(text.lines().map(|line| div().child(SharedString::from(line.to_string()))))
    } else {
        body.children(lines.iter().map(|line| {
            div()
                .flex()
                .flex_row()
                .min_h(px(14.))
                .children(line.iter().map(|span| {
                    div()
                        .text_color(rgb(span.color))
                        .when(span.bold, |this| this.font_weight(FontWeight::BOLD))
                        .when(span.italic, |this| this.italic())
                        .child(SharedString::from(span.text.clone()))
                }))
        }))
    };
    div()
        .w_full()
        .bg(Theme::code_bg())
        .p(px(10.))
        .rounded(px(4.))
        .child(body)
        .into_any_element()
}

fn render_inline_runs(runs: &[InlineRun]) -> impl IntoElement {
    div()
        .flex()
        .flex_col()
        .gap_1()
        .children(split_runs(runs).into_iter().map(|line| {
            div()
                .flex()
                .flex_row()
                .flex_wrap()
                .children(line.into_iter().map(render_inline_run))
        }))
}

fn render_inline_run(run: InlineRun) -> impl IntoElement {
    div()
        .child(SharedString::from(run.text))
        .when(run.bold, |this| this.font_weight(FontWeight::BOLD))
        .when(run.italic, |this| this.italic())
        .when(run.strike, |this| this.line_through())
        .when(run.code, |this| {
            this.font_family("Menlo")
                .bg(Theme::code_bg())
                .rounded(px(4.))
                .px(px(4.))
        })
        .when_some(run.link, |this, url| {
            this.text_color(Theme::accent())
                .underline()
                .cursor_pointer()
                .on_mouse_down(MouseButton::Left, move |_, _, cx: &mut App| {
                    cx.open_url(&url);
                })
        })
}

/// Breaks runs on embedded newlines so hard breaks start a new row.
fn split_runs(runs: &[InlineRun]) -> Vec<Vec<InlineRun>> {
    let mut lines: Vec<Vec<InlineRun>> = vec![Vec::new()];
    for run in runs {
        for (idx, part) in run.text.split('\n').enumerate() {
            if idx > 0 {
                lines.push(Vec::new());
            }
            if part.is_empty() {
                continue;
            }
            if let Some(line) = lines.last_mut() {
                line.push(InlineRun {
                    text: part.to_string(),
                    ..run.clone()
                });
            }
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(text: &str) -> InlineRun {
        InlineRun {
            text: text.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn hard_breaks_start_new_rows() {
        let mut bold = run("b\nc");
        bold.bold = true;
        let lines = split_runs(&[run("a "), bold]);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].len(), 2);
        assert_eq!(lines[1][0].text, "c");
        assert!(lines[1][0].bold);
    }

    #[test]
    fn empty_runs_produce_a_single_empty_row() {
        assert_eq!(split_runs(&[]), vec![Vec::<InlineRun>::new()]);
    }
}
