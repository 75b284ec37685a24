use crate::model::document::DocumentState;
use crate::ui::theme::Theme;
use gpui::prelude::FluentBuilder as _;
use gpui::{
    App, ClipboardItem, Context, Entity, FocusHandle, Focusable, HighlightStyle,
    InteractiveElement, IntoElement, KeyDownEvent, MouseButton, MouseDownEvent, MouseMoveEvent,
    ParentElement, Render, StatefulInteractiveElement, Styled, StyledText, TextLayout, Window,
    div, px,
};
use std::ops::Range;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

const PLACEHOLDER: &str = "Begin typing your markdown here...";
const CARET: &str = "|";

pub struct EditorView {
    document: Entity<DocumentState>,
    focus_handle: FocusHandle,
    caret_visible: bool,
    blink_task: Option<gpui::Task<()>>,
    word_wrap: bool,
    selection_enabled: bool,
}

impl EditorView {
    pub fn new(document: Entity<DocumentState>, word_wrap: bool, cx: &mut Context<Self>) -> Self {
        Self {
            document,
            focus_handle: cx.focus_handle(),
            caret_visible: true,
            blink_task: None,
            word_wrap,
            selection_enabled: true,
        }
    }

    pub fn set_word_wrap(&mut self, enabled: bool, cx: &mut Context<Self>) {
        if self.word_wrap != enabled {
            self.word_wrap = enabled;
            cx.notify();
        }
    }

    /// Mouse drags stop extending the selection while the divider is being dragged.
    pub fn set_selection_enabled(&mut self, enabled: bool, cx: &mut Context<Self>) {
        if self.selection_enabled != enabled {
            self.selection_enabled = enabled;
            cx.notify();
        }
    }

    fn start_cursor_blink(&mut self, cx: &mut Context<Self>) {
        if self.blink_task.is_some() {
            return;
        }
        self.blink_task = Some(cx.spawn(async move |editor, cx| {
            loop {
                cx.background_executor()
                    .timer(Duration::from_millis(500))
                    .await;
                let updated = editor.update(cx, |view, cx| {
                    view.caret_visible = !view.caret_visible;
                    cx.notify();
                });
                if updated.is_err() {
                    break;
                }
            }
        }));
    }

    fn selection_highlights(&self, doc: &DocumentState) -> Vec<(Range<usize>, HighlightStyle)> {
        doc.selection_bytes().map_or_else(Vec::new, |range| {
            vec![(
                range,
                HighlightStyle {
                    background_color: Some(hsla_from_rgba(Theme::selection_bg())),
                    ..Default::default()
                },
            )]
        })
    }

    fn handle_key(event: &KeyDownEvent, doc_handle: &Entity<DocumentState>, cx: &mut App) {
        let key = event.keystroke.key.to_lowercase();
        let modifiers = event.keystroke.modifiers;
        let shift = modifiers.shift;

        if modifiers.platform || modifiers.control {
            match key.as_str() {
                "a" => doc_handle.update(cx, |doc, cx| {
                    doc.select_all();
                    cx.notify();
                }),
                "c" => {
                    if let Some(text) = doc_handle.read(cx).selected_text() {
                        cx.write_to_clipboard(ClipboardItem::new_string(text));
                    }
                }
                "x" => {
                    if let Some(text) = doc_handle.read(cx).selected_text() {
                        cx.write_to_clipboard(ClipboardItem::new_string(text));
                        doc_handle.update(cx, |doc, cx| {
                            doc.delete_selection();
                            cx.notify();
                        });
                    }
                }
                "v" => {
                    if let Some(text) = cx.read_from_clipboard().and_then(|item| item.text()) {
                        doc_handle.update(cx, |doc, cx| {
                            doc.insert_text(&text);
                            cx.notify();
                        });
                    }
                }
                _ => {}
            }
            return;
        }

        doc_handle.update(cx, |doc, cx| {
            match key.as_str() {
                "backspace" => doc.backspace(),
                "delete" => doc.delete_forward(),
                "enter" | "return" => doc.insert_text("\n"),
                "tab" => doc.insert_text("    "),
                "left" | "arrowleft" => doc.move_left(shift),
                "right" | "arrowright" => doc.move_right(shift),
                "home" => {
                    if shift {
                        doc.extend_selection_to(0);
                    } else {
                        doc.set_cursor(0);
                    }
                }
                "end" => {
                    let len = doc.len_chars();
                    if shift {
                        doc.extend_selection_to(len);
                    } else {
                        doc.set_cursor(len);
                    }
                }
                _ => match event.keystroke.key_char.as_deref() {
                    Some(text) if !text.is_empty() => doc.insert_text(text),
                    _ => return,
                },
            }
            cx.notify();
        });
    }
}

impl Focusable for EditorView {
    fn focus_handle(&self, _: &App) -> FocusHandle {
        self.focus_handle.clone()
    }
}

impl Render for EditorView {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        self.start_cursor_blink(cx);
        let focus_handle = self.focus_handle.clone();
        let doc = self.document.read(cx);
        let is_empty = doc.is_empty();
        let cursor_byte = doc.char_to_byte(doc.cursor);
        let show_caret_marker = doc.selection.is_none() && self.caret_visible;

        let mut display_text = doc.text();
        if show_caret_marker {
            let at = cursor_byte.min(display_text.len());
            display_text.insert_str(at, CARET);
        }

        let mut highlights = self.selection_highlights(doc);
        if show_caret_marker {
            highlights.push((
                cursor_byte..cursor_byte + CARET.len(),
                HighlightStyle {
                    color: Some(Theme::accent().into()),
                    ..Default::default()
                },
            ));
        }

        let mut styled = StyledText::new(display_text);
        if !highlights.is_empty() {
            styled = styled.with_highlights(highlights);
        }
        let text_layout = styled.layout().clone();
        let caret_shift = show_caret_marker.then_some(cursor_byte);
        let selection_enabled = self.selection_enabled;

        div()
            .id("editor")
            .relative()
            .size_full()
            .min_w(px(0.))
            .bg(Theme::panel())
            .p(px(18.))
            .text_sm()
            .text_color(Theme::text())
            .font_family("Menlo")
            .cursor_text()
            .overflow_y_scroll()
            .when(!self.word_wrap, |this| this.overflow_x_scroll())
            .track_focus(&focus_handle)
            .on_mouse_down(MouseButton::Left, {
                let focus_handle = focus_handle.clone();
                let doc_handle = self.document.clone();
                let layout = text_layout.clone();
                move |event: &MouseDownEvent, window: &mut Window, cx: &mut App| {
                    focus_handle.focus(window);
                    doc_handle.update(cx, |doc, cx| {
                        let Some(idx) = char_at(&layout, event, caret_shift, doc) else {
                            return;
                        };
                        if event.modifiers.shift {
                            doc.extend_selection_to(idx);
                        } else {
                            doc.set_cursor(idx);
                            doc.selection_anchor = Some(idx);
                        }
                        cx.notify();
                    });
                }
            })
            .on_mouse_move({
                let doc_handle = self.document.clone();
                let layout = text_layout.clone();
                move |event: &MouseMoveEvent, _window: &mut Window, cx: &mut App| {
                    if !selection_enabled || !event.dragging() {
                        return;
                    }
                    doc_handle.update(cx, |doc, cx| {
                        if let Some(idx) = char_at(&layout, event, caret_shift, doc) {
                            doc.extend_selection_to(idx);
                            cx.notify();
                        }
                    });
                }
            })
            .on_key_down({
                let focus = focus_handle.clone();
                let doc_handle = self.document.clone();
                move |event: &KeyDownEvent, window: &mut Window, cx: &mut App| {
                    if focus.is_focused(window) {
                        EditorView::handle_key(event, &doc_handle, cx);
                    }
                }
            })
            .when(is_empty, |this| {
                this.child(
                    div()
                        .absolute()
                        .top(px(18.))
                        .left(px(28.))
                        .text_color(Theme::muted())
                        .child(PLACEHOLDER),
                )
            })
            .child(
                div()
                    .when(self.word_wrap, |this| this.whitespace_normal())
                    .when(!self.word_wrap, |this| this.whitespace_nowrap())
                    .child(styled),
            )
    }
}

trait PointerPosition {
    fn pointer(&self) -> gpui::Point<gpui::Pixels>;
}

impl PointerPosition for MouseDownEvent {
    fn pointer(&self) -> gpui::Point<gpui::Pixels> {
        self.position
    }
}

impl PointerPosition for MouseMoveEvent {
    fn pointer(&self) -> gpui::Point<gpui::Pixels> {
        self.position
    }
}

/// Maps a pointer position to a character index, skipping over the drawn caret.
fn char_at(
    layout: &TextLayout,
    event: &impl PointerPosition,
    caret_byte: Option<usize>,
    doc: &DocumentState,
) -> Option<usize> {
    let position = event.pointer();
    let byte = std::panic::catch_unwind(AssertUnwindSafe(|| layout.index_for_position(position)))
        .ok()
        .map(|res| res.unwrap_or_else(|ix| ix))?;
    let byte = match caret_byte {
        Some(caret) if byte > caret => byte.saturating_sub(CARET.len()),
        _ => byte,
    };
    Some(doc.byte_to_char(byte))
}

fn hsla_from_rgba(color: gpui::Rgba) -> gpui::Hsla {
    let mut hsla: gpui::Hsla = color.into();
    hsla.a = 0.18;
    hsla
}
