use crate::ui::theme::Theme;
use gpui::prelude::FluentBuilder as _;
use gpui::{Div, InteractiveElement, IntoElement, ParentElement, SharedString, Styled, div, px};

/// A row in a dropdown menu, with an optional check mark and shortcut hint.
pub fn menu_item(
    label: impl Into<SharedString>,
    checked: Option<bool>,
    shortcut: Option<&'static str>,
) -> Div {
    div()
        .flex()
        .items_center()
        .gap_2()
        .px(px(10.))
        .py(px(5.))
        .rounded(px(4.))
        .text_sm()
        .text_color(Theme::text())
        .cursor_pointer()
        .hover(|this| this.bg(Theme::bg()))
        .child(
            div()
                .w(px(14.))
                .text_color(Theme::accent())
                .when(checked == Some(true), |this| this.child("✓")),
        )
        .child(div().flex_1().child(label.into()))
        .when_some(shortcut, |this, shortcut| {
            this.child(div().text_xs().text_color(Theme::muted()).child(shortcut))
        })
}

pub fn menu_separator() -> impl IntoElement {
    div().h(px(1.)).my(px(4.)).bg(Theme::border())
}
