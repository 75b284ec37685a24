use crate::commands::{
    About, ExportHtml, NewFile, OpenFile, OpenRepository, ResetSplit, SaveFile, TogglePreview,
    ToggleWordWrap,
};
use crate::model::document::DocumentState;
use crate::model::dropdown::{
    CLOSE_DELAY, DropdownId, DropdownInput, DropdownPhase, DropdownRegistry, MenuPresentation,
    PressTarget, TimerRequest,
};
use crate::model::preview::{PreviewState, build_preview};
use crate::model::split::{DIVIDER_WIDTH, SplitController, SplitInput};
use crate::services::config::AppConfig;
use crate::services::emoji;
use crate::services::fs::{self, SUGGESTED_NAME};
use crate::services::markdown::render_html_document;
use crate::services::settings::ViewToggles;
use crate::services::storage::{CONTENT_KEY, FileStore, KeyValueStore};
use crate::services::tasks::DelayedTasks;
use crate::ui::editor::EditorView;
use crate::ui::preview::PreviewView;
use crate::ui::theme::Theme;
use crate::ui::widgets::{menu_item, menu_separator};

use camino::Utf8PathBuf;
use gpui::prelude::FluentBuilder as _;
use gpui::{
    Animation, AnimationExt as _, AnyElement, AppContext, Context, DispatchPhase, Entity,
    FocusHandle, Focusable, InteractiveElement, IntoElement, MouseButton, MouseDownEvent,
    MouseExitEvent, MouseMoveEvent, MouseUpEvent, ParentElement, PathPromptOptions, Render,
    SharedString, StatefulInteractiveElement, Styled, Subscription, Window, canvas, deferred, div,
    px, relative,
};
use gpui_component::notification::{NotificationList, NotificationType};
use rfd::{MessageButtons, MessageDialog, MessageDialogResult, MessageLevel};
use std::collections::HashMap;
use std::path::PathBuf;

pub const APP_TITLE: &str = "MarkdownAnnotator";
const REPOSITORY_URL: &str = env!("CARGO_PKG_REPOSITORY");
const EXPORT_NAME: &str = "document.html";
const MENU_BAR_HEIGHT: f32 = 30.;

#[cfg(target_os = "macos")]
mod hint {
    pub const NEW: &str = "⌘N";
    pub const OPEN: &str = "⌘O";
    pub const SAVE: &str = "⌘S";
    pub const EXPORT: &str = "⌘E";
    pub const PREVIEW: &str = "⌘P";
    pub const WRAP: &str = "⌥Z";
}

#[cfg(not(target_os = "macos"))]
mod hint {
    pub const NEW: &str = "Ctrl+N";
    pub const OPEN: &str = "Ctrl+O";
    pub const SAVE: &str = "Ctrl+S";
    pub const EXPORT: &str = "Ctrl+E";
    pub const PREVIEW: &str = "Ctrl+P";
    pub const WRAP: &str = "Alt+Z";
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum MenuKind {
    File,
    View,
    Help,
}

impl MenuKind {
    fn label(self) -> &'static str {
        match self {
            MenuKind::File => "File",
            MenuKind::View => "View",
            MenuKind::Help => "Help",
        }
    }
}

struct MenuSlot {
    kind: MenuKind,
    id: DropdownId,
    trigger_focus: FocusHandle,
}

type MenuHandler = fn(&mut RootView, &mut Window, &mut Context<RootView>);

enum MenuRow {
    Item {
        label: &'static str,
        checked: Option<bool>,
        shortcut: Option<&'static str>,
        run: MenuHandler,
    },
    Separator,
}

/// A file destination chosen through the platform prompt or the `rfd` fallback.
struct SaveRequest {
    suggested_name: &'static str,
    extension: &'static str,
    contents: String,
    fallback: fn() -> Option<Utf8PathBuf>,
}

pub struct RootView {
    config: AppConfig,
    store: FileStore,
    document: Entity<DocumentState>,
    preview: Entity<PreviewState>,
    editor_view: Entity<EditorView>,
    preview_view: Entity<PreviewView>,
    notifications: Entity<NotificationList>,
    split: SplitController,
    toggles: ViewToggles,
    dropdowns: DropdownRegistry,
    menus: Vec<MenuSlot>,
    /// Trigger and panel are separate hover targets; the count per dropdown
    /// turns their enter/leave pairs into a single hover state.
    hover_depth: HashMap<DropdownId, u8>,
    timers: DelayedTasks<DropdownId, RootView>,
    last_revision: u64,
    _subscriptions: Vec<Subscription>,
}

impl RootView {
    pub fn new(
        config: AppConfig,
        store: FileStore,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) -> Self {
        let toggles = ViewToggles::load(&store);
        let document = cx.new(|_| DocumentState::new_empty());
        let preview = cx.new(|_| PreviewState::new());
        let editor_view = cx.new(|cx| EditorView::new(document.clone(), toggles.word_wrap, cx));
        let preview_view = cx.new(|_| PreviewView::new(preview.clone()));
        let notifications = cx.new(|cx| NotificationList::new(window, cx));

        let width: f32 = window.viewport_size().width.into();
        let split = SplitController::new(width, DIVIDER_WIDTH);

        let mut dropdowns = DropdownRegistry::new();
        let mut subscriptions = vec![
            cx.observe(&document, |this, _, cx| this.on_document_changed(cx)),
            cx.observe_window_activation(window, |this, window, cx| {
                if !window.is_window_active() {
                    this.dropdowns.window_left();
                    this.after_force_close(cx);
                }
            }),
        ];

        let mut menus = Vec::new();
        for kind in [MenuKind::File, MenuKind::View, MenuKind::Help] {
            let id = dropdowns.register();
            let trigger_focus = cx.focus_handle().tab_stop(true);
            subscriptions.push(cx.on_focus(&trigger_focus, window, move |this, _, cx| {
                this.dropdown_input(id, DropdownInput::Focus, cx);
            }));
            subscriptions.push(cx.on_blur(&trigger_focus, window, move |this, _, cx| {
                this.dropdown_input(id, DropdownInput::Blur, cx);
            }));
            menus.push(MenuSlot {
                kind,
                id,
                trigger_focus,
            });
        }

        let editor_focus = editor_view.read(cx).focus_handle(cx);
        editor_focus.focus(window);

        let mut this = Self {
            config,
            store,
            document,
            preview,
            editor_view,
            preview_view,
            notifications,
            split,
            toggles,
            dropdowns,
            menus,
            hover_depth: HashMap::new(),
            timers: DelayedTasks::new(),
            last_revision: 0,
            _subscriptions: subscriptions,
        };
        this.reload(window, cx);
        this
    }

    /// Rebuilds every piece of view state from storage, as a fresh start would.
    pub fn reload(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        self.force_close_menus(cx);

        self.toggles = ViewToggles::load(&self.store);
        let word_wrap = self.toggles.word_wrap;
        self.editor_view
            .update(cx, |view, cx| view.set_word_wrap(word_wrap, cx));

        let width: f32 = window.viewport_size().width.into();
        self.split.set_viewport(0.0, width);
        self.split.restore_on_load(&self.store);

        let text = self.store.load(CONTENT_KEY);
        self.document.update(cx, |doc, cx| {
            doc.set_text(&text);
            cx.notify();
        });
        tracing::debug!(chars = text.chars().count(), "reloaded from storage");
        cx.notify();
    }

    fn on_document_changed(&mut self, cx: &mut Context<Self>) {
        let Some((revision, text)) = self.document.read(cx).text_since(self.last_revision) else {
            return;
        };
        self.last_revision = revision;

        if let Err(err) = self.store.save(CONTENT_KEY, &text) {
            tracing::warn!(%err, "failed to persist editor content");
        }

        let theme = self.config.highlight_theme.clone();
        let preview = self.preview.clone();
        cx.spawn(async move |_, cx| {
            let document = cx
                .background_executor()
                .spawn(async move { build_preview(&text, &theme) })
                .await;
            let _ = preview.update(cx, |state, cx| {
                if state.apply(revision, document) {
                    cx.notify();
                } else {
                    tracing::trace!(revision, "dropped stale preview");
                }
            });
        })
        .detach();
    }

    fn notify_user(
        &mut self,
        kind: NotificationType,
        message: String,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        self.notifications.update(cx, |list, cx| {
            list.push((kind, SharedString::from(message)), window, cx)
        });
    }

    fn focus_editor(&self, window: &mut Window, cx: &mut Context<Self>) {
        self.editor_view.read(cx).focus_handle(cx).focus(window);
    }

    // Dropdowns

    fn dropdown_input(&mut self, id: DropdownId, input: DropdownInput, cx: &mut Context<Self>) {
        let before = self.dropdowns.active();
        let request = self.dropdowns.dispatch(id, input);
        if before.is_some() && before != self.dropdowns.active() {
            self.hover_depth.retain(|key, _| *key == id);
        }
        if let Some(request) = request {
            self.schedule_timer(request, cx);
        }
        cx.notify();
    }

    fn schedule_timer(&mut self, request: TimerRequest, cx: &mut Context<Self>) {
        let TimerRequest { id, token, delay } = request;
        self.timers.schedule(id, delay, cx, move |this, cx| {
            if this.dropdowns.timer_fired(id, token) {
                if this.dropdowns.phase(id) == DropdownPhase::Closed {
                    this.hover_depth.remove(&id);
                }
                cx.notify();
            }
        });
    }

    fn hover_changed(&mut self, id: DropdownId, hovered: bool, cx: &mut Context<Self>) {
        let depth = self.hover_depth.entry(id).or_default();
        let input = if hovered {
            *depth = depth.saturating_add(1);
            (*depth == 1).then_some(DropdownInput::HoverEnter)
        } else if *depth > 0 {
            *depth -= 1;
            (*depth == 0).then_some(DropdownInput::HoverLeave)
        } else {
            None
        };
        if let Some(input) = input {
            self.dropdown_input(id, input, cx);
        }
    }

    fn pointer_down_on(&mut self, target: PressTarget, cx: &mut Context<Self>) {
        let before = self.dropdowns.active();
        self.dropdowns.pointer_down(target);
        if before != self.dropdowns.active() {
            self.after_force_close(cx);
        }
    }

    fn force_close_menus(&mut self, cx: &mut Context<Self>) {
        if self.dropdowns.force_close_active().is_some() {
            self.after_force_close(cx);
        }
    }

    fn after_force_close(&mut self, cx: &mut Context<Self>) {
        self.hover_depth.clear();
        self.timers.cancel_all();
        cx.notify();
    }

    // Divider

    fn split_input(&mut self, input: SplitInput, cx: &mut Context<Self>) {
        let was_dragging = self.split.is_dragging();
        match self.split.handle(input, &mut self.store) {
            Ok(true) => cx.notify(),
            Ok(false) => {}
            Err(err) => {
                tracing::warn!(%err, "failed to persist divider offset");
                cx.notify();
            }
        }
        let dragging = self.split.is_dragging();
        if dragging != was_dragging {
            self.editor_view
                .update(cx, |view, cx| view.set_selection_enabled(!dragging, cx));
            cx.notify();
        }
    }

    // Commands

    fn confirm_replace(&self, description: &str) -> bool {
        if self.store.load(CONTENT_KEY).is_empty() {
            return true;
        }
        let choice = MessageDialog::new()
            .set_level(MessageLevel::Warning)
            .set_title(APP_TITLE)
            .set_description(description)
            .set_buttons(MessageButtons::OkCancel)
            .show();
        matches!(choice, MessageDialogResult::Ok | MessageDialogResult::Yes)
    }

    fn action_new_file(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        if !self.confirm_replace("Discard the current document and start a new one?") {
            tracing::debug!("new file declined");
            return;
        }
        if let Err(err) = self.store.save(CONTENT_KEY, "") {
            tracing::warn!(%err, "failed to clear stored content");
        }
        self.reload(window, cx);
    }

    fn action_open_file(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        if !self.confirm_replace("Opening a file replaces the current document. Continue?") {
            tracing::debug!("open declined");
            return;
        }

        let picked = cx.prompt_for_paths(PathPromptOptions {
            files: true,
            directories: false,
            multiple: false,
            prompt: Some("Open Markdown File".into()),
        });

        cx.spawn_in(window, async move |this, cx| {
            let path = match picked.await {
                Ok(Ok(Some(paths))) => paths.into_iter().next(),
                Ok(Ok(None)) => None,
                Ok(Err(err)) => {
                    tracing::info!(%err, "native open prompt unavailable, using fallback dialog");
                    fs::pick_open_path().map(Utf8PathBuf::into_std_path_buf)
                }
                Err(_) => None,
            };
            let Some(path) = path else {
                tracing::debug!("open cancelled");
                return;
            };
            let _ = this.update_in(cx, |this, window, cx| this.load_file(path, window, cx));
        })
        .detach();
    }

    fn load_file(&mut self, path: PathBuf, window: &mut Window, cx: &mut Context<Self>) {
        let path = match Utf8PathBuf::try_from(path) {
            Ok(path) => path,
            Err(err) => {
                let message = format!("Cannot open {}: path is not valid UTF-8", err.as_path().display());
                self.notify_user(NotificationType::Error, message, window, cx);
                return;
            }
        };

        match fs::read_to_string(&path) {
            Ok(text) => {
                if let Err(err) = self.store.save(CONTENT_KEY, &text) {
                    tracing::warn!(%err, "failed to store opened file");
                }
                self.reload(window, cx);
                tracing::info!(%path, "opened file");
            }
            Err(err) => {
                tracing::warn!(%path, %err, "failed to read file");
                let message = format!("Failed to open {path}: {err}");
                self.notify_user(NotificationType::Error, message, window, cx);
            }
        }
    }

    fn action_save(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        let request = SaveRequest {
            suggested_name: SUGGESTED_NAME,
            extension: "md",
            contents: self.store.load(CONTENT_KEY),
            fallback: fs::pick_save_path,
        };
        self.save_with_prompt(request, window, cx);
    }

    fn action_export_html(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        let text = self.store.load(CONTENT_KEY);
        let html = render_html_document(
            &emoji::substitute(&text),
            &self.config.highlight_theme,
            APP_TITLE,
        );
        let request = SaveRequest {
            suggested_name: EXPORT_NAME,
            extension: "html",
            contents: html,
            fallback: || fs::pick_export_path(EXPORT_NAME),
        };
        self.save_with_prompt(request, window, cx);
    }

    fn save_with_prompt(&mut self, request: SaveRequest, window: &mut Window, cx: &mut Context<Self>) {
        let directory = fs::default_directory();
        let picked = cx.prompt_for_new_path(&directory, Some(request.suggested_name));

        cx.spawn_in(window, async move |this, cx| {
            let SaveRequest {
                extension,
                contents,
                fallback,
                ..
            } = request;
            let path = match picked.await {
                Ok(Ok(Some(path))) => Utf8PathBuf::try_from(path)
                    .ok()
                    .map(|path| fs::with_default_extension(path, extension)),
                Ok(Ok(None)) => None,
                Ok(Err(err)) => {
                    tracing::info!(%err, "native save prompt unavailable, using fallback dialog");
                    fallback()
                }
                Err(_) => None,
            };
            let Some(path) = path else {
                tracing::debug!("save cancelled");
                return;
            };
            let _ = this.update_in(cx, |this, window, cx| {
                this.write_file(&path, &contents, window, cx)
            });
        })
        .detach();
    }

    fn write_file(
        &mut self,
        path: &camino::Utf8Path,
        contents: &str,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        match fs::write_atomic(path, contents) {
            Ok(()) => {
                tracing::info!(%path, bytes = contents.len(), "saved file");
                let name = path.file_name().unwrap_or(path.as_str());
                self.notify_user(NotificationType::Success, format!("Saved {name}"), window, cx);
            }
            Err(err) => {
                tracing::warn!(%path, %err, "failed to save file");
                let message = format!("Failed to save {path}: {err}");
                self.notify_user(NotificationType::Error, message, window, cx);
            }
        }
    }

    fn action_toggle_preview(&mut self, _window: &mut Window, cx: &mut Context<Self>) {
        let enabled = !self.toggles.preview;
        if let Err(err) = self.toggles.set_preview(&mut self.store, enabled) {
            tracing::warn!(%err, "failed to persist preview flag");
        }
        cx.notify();
    }

    fn action_toggle_word_wrap(&mut self, _window: &mut Window, cx: &mut Context<Self>) {
        let enabled = !self.toggles.word_wrap;
        if let Err(err) = self.toggles.set_word_wrap(&mut self.store, enabled) {
            tracing::warn!(%err, "failed to persist word wrap flag");
        }
        self.editor_view
            .update(cx, |view, cx| view.set_word_wrap(enabled, cx));
        cx.notify();
    }

    fn action_reset_split(&mut self, _window: &mut Window, cx: &mut Context<Self>) {
        self.split_input(SplitInput::DoubleClick, cx);
    }

    fn action_open_repository(&mut self, _window: &mut Window, cx: &mut Context<Self>) {
        cx.open_url(REPOSITORY_URL);
    }

    fn action_about(&mut self, _window: &mut Window, _cx: &mut Context<Self>) {
        let description = format!(
            "{} v{}\n\n{}\n\nAuthor: {}\nLicense: {}",
            APP_TITLE,
            env!("CARGO_PKG_VERSION"),
            env!("CARGO_PKG_DESCRIPTION"),
            env!("CARGO_PKG_AUTHORS"),
            env!("CARGO_PKG_LICENSE"),
        );
        MessageDialog::new()
            .set_level(MessageLevel::Info)
            .set_title(format!("About {APP_TITLE}"))
            .set_description(description)
            .set_buttons(MessageButtons::Ok)
            .show();
    }

    // Rendering

    fn menu_rows(&self, kind: MenuKind) -> Vec<MenuRow> {
        match kind {
            MenuKind::File => vec![
                MenuRow::Item {
                    label: "New",
                    checked: None,
                    shortcut: Some(hint::NEW),
                    run: Self::action_new_file,
                },
                MenuRow::Item {
                    label: "Open...",
                    checked: None,
                    shortcut: Some(hint::OPEN),
                    run: Self::action_open_file,
                },
                MenuRow::Item {
                    label: "Save...",
                    checked: None,
                    shortcut: Some(hint::SAVE),
                    run: Self::action_save,
                },
                MenuRow::Separator,
                MenuRow::Item {
                    label: "Export HTML...",
                    checked: None,
                    shortcut: Some(hint::EXPORT),
                    run: Self::action_export_html,
                },
            ],
            MenuKind::View => vec![
                MenuRow::Item {
                    label: "Preview",
                    checked: Some(self.toggles.preview),
                    shortcut: Some(hint::PREVIEW),
                    run: Self::action_toggle_preview,
                },
                MenuRow::Item {
                    label: "Word Wrap",
                    checked: Some(self.toggles.word_wrap),
                    shortcut: Some(hint::WRAP),
                    run: Self::action_toggle_word_wrap,
                },
                MenuRow::Separator,
                MenuRow::Item {
                    label: "Reset Split",
                    checked: None,
                    shortcut: None,
                    run: Self::action_reset_split,
                },
            ],
            MenuKind::Help => vec![
                MenuRow::Item {
                    label: "GitHub",
                    checked: None,
                    shortcut: None,
                    run: Self::action_open_repository,
                },
                MenuRow::Item {
                    label: "About",
                    checked: None,
                    shortcut: None,
                    run: Self::action_about,
                },
            ],
        }
    }

    fn render_dropdown(&self, ix: usize, slot: &MenuSlot, cx: &mut Context<Self>) -> AnyElement {
        let id = slot.id;
        let presentation = self.dropdowns.presentation(id);
        let trigger_focus = slot.trigger_focus.clone();

        div()
            .id(("menu", ix))
            .relative()
            .h_full()
            .on_hover(cx.listener(move |this, hovered: &bool, _, cx| {
                this.hover_changed(id, *hovered, cx);
            }))
            .on_mouse_down(
                MouseButton::Left,
                cx.listener(move |this, _: &MouseDownEvent, window, cx| {
                    cx.stop_propagation();
                    this.pointer_down_on(PressTarget::Trigger(id), cx);
                    trigger_focus.focus(window);
                }),
            )
            .child(
                div()
                    .id(("menu-trigger", ix))
                    .track_focus(&slot.trigger_focus)
                    .flex()
                    .items_center()
                    .h_full()
                    .px(px(10.))
                    .cursor_pointer()
                    .when(presentation.visible, |this| this.bg(Theme::menu_hover()))
                    .hover(|this| this.bg(Theme::menu_hover()))
                    .child(slot.kind.label()),
            )
            .when(presentation.visible, |this| {
                this.child(self.render_menu_panel(ix, slot, presentation, cx))
            })
            .into_any_element()
    }

    fn render_menu_panel(
        &self,
        ix: usize,
        slot: &MenuSlot,
        presentation: MenuPresentation,
        cx: &mut Context<Self>,
    ) -> AnyElement {
        let id = slot.id;
        let rows: Vec<AnyElement> = self
            .menu_rows(slot.kind)
            .into_iter()
            .map(|row| match row {
                MenuRow::Separator => menu_separator().into_any_element(),
                MenuRow::Item {
                    label,
                    checked,
                    shortcut,
                    run,
                } => menu_item(label, checked, shortcut)
                    .when(presentation.interactive, |this| {
                        this.on_mouse_down(
                            MouseButton::Left,
                            cx.listener(move |this, _: &MouseDownEvent, window, cx| {
                                cx.stop_propagation();
                                this.force_close_menus(cx);
                                this.focus_editor(window, cx);
                                run(this, window, cx);
                            }),
                        )
                    })
                    .into_any_element(),
            })
            .collect();

        let panel = div()
            .id(("menu-panel", ix))
            .absolute()
            .top(px(MENU_BAR_HEIGHT))
            .left_0()
            .min_w(px(220.))
            .p(px(4.))
            .flex()
            .flex_col()
            .bg(Theme::panel())
            .border_1()
            .border_color(Theme::border())
            .rounded(px(6.))
            .shadow_md()
            .occlude()
            .on_hover(cx.listener(move |this, hovered: &bool, _, cx| {
                this.hover_changed(id, *hovered, cx);
            }))
            .on_mouse_down(
                MouseButton::Left,
                cx.listener(move |this, _: &MouseDownEvent, _, cx| {
                    cx.stop_propagation();
                    this.pointer_down_on(PressTarget::Panel(id), cx);
                }),
            )
            .children(rows);

        // Painted after the split row so the panel stays on top of both panes.
        if presentation.fading {
            deferred(panel.with_animation(
                ("menu-fade", ix),
                Animation::new(CLOSE_DELAY),
                |panel, delta| panel.opacity(1.0 - delta),
            ))
            .with_priority(1)
            .into_any_element()
        } else {
            deferred(panel).with_priority(1).into_any_element()
        }
    }

    fn render_split_row(&self, cx: &mut Context<Self>) -> impl IntoElement {
        let layout = self.split.layout();
        let preview_visible = self.toggles.preview;
        let dragging = self.split.is_dragging();

        let editor_pane = div()
            .h_full()
            .min_w(px(0.))
            .when(preview_visible, |this| {
                this.flex_basis(relative(layout.editor_basis / 100.))
            })
            .when(!preview_visible, |this| this.flex_1())
            .child(self.editor_view.clone());

        let divider = div()
            .id("split-divider")
            .absolute()
            .top_0()
            .bottom_0()
            .left(relative(layout.divider_left / 100.))
            .w(px(DIVIDER_WIDTH))
            .cursor_col_resize()
            .bg(if dragging {
                Theme::divider_active()
            } else {
                Theme::divider()
            })
            .hover(|this| this.bg(Theme::divider_active()))
            .on_mouse_down(
                MouseButton::Left,
                cx.listener(|this, event: &MouseDownEvent, _, cx| {
                    cx.stop_propagation();
                    this.pointer_down_on(PressTarget::Outside, cx);
                    let input = if event.click_count >= 2 {
                        SplitInput::DoubleClick
                    } else {
                        SplitInput::PointerDown {
                            x: event.position.x.into(),
                        }
                    };
                    this.split_input(input, cx);
                }),
            );

        div()
            .relative()
            .flex()
            .flex_row()
            .flex_1()
            .w_full()
            .min_h(px(0.))
            .child(editor_pane)
            .when(self.toggles.divider_visible(), |this| {
                this.child(
                    div()
                        .h_full()
                        .min_w(px(0.))
                        .flex_basis(relative(layout.preview_basis / 100.))
                        .border_l_1()
                        .border_color(Theme::border())
                        .child(self.preview_view.clone()),
                )
                .child(divider)
            })
    }
}

impl Render for RootView {
    fn render(&mut self, window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let width: f32 = window.viewport_size().width.into();
        if width != self.split.viewport_width() {
            self.split.set_viewport(0.0, width);
        }

        let mut menus = Vec::with_capacity(self.menus.len());
        for (ix, slot) in self.menus.iter().enumerate() {
            menus.push(self.render_dropdown(ix, slot, cx));
        }

        let menu_bar = div()
            .flex()
            .flex_row()
            .items_center()
            .flex_shrink_0()
            .h(px(MENU_BAR_HEIGHT))
            .px(px(6.))
            .bg(Theme::menu_bar())
            .text_color(Theme::menu_text())
            .text_sm()
            .children(menus);

        div()
            .id("root")
            .relative()
            .flex()
            .flex_col()
            .size_full()
            .bg(Theme::bg())
            .text_color(Theme::text())
            .on_action(cx.listener(|this, _: &NewFile, window, cx| {
                this.action_new_file(window, cx);
            }))
            .on_action(cx.listener(|this, _: &OpenFile, window, cx| {
                this.action_open_file(window, cx);
            }))
            .on_action(cx.listener(|this, _: &SaveFile, window, cx| {
                this.action_save(window, cx);
            }))
            .on_action(cx.listener(|this, _: &ExportHtml, window, cx| {
                this.action_export_html(window, cx);
            }))
            .on_action(cx.listener(|this, _: &TogglePreview, window, cx| {
                this.action_toggle_preview(window, cx);
            }))
            .on_action(cx.listener(|this, _: &ToggleWordWrap, window, cx| {
                this.action_toggle_word_wrap(window, cx);
            }))
            .on_action(cx.listener(|this, _: &ResetSplit, window, cx| {
                this.action_reset_split(window, cx);
            }))
            .on_action(cx.listener(|this, _: &OpenRepository, window, cx| {
                this.action_open_repository(window, cx);
            }))
            .on_action(cx.listener(|this, _: &About, window, cx| {
                this.action_about(window, cx);
            }))
            .on_mouse_down(
                MouseButton::Left,
                cx.listener(|this, _: &MouseDownEvent, _, cx| {
                    this.pointer_down_on(PressTarget::Outside, cx);
                }),
            )
            // Drag tracking lives at the root so fast moves off the divider are not lost.
            .on_mouse_move(cx.listener(|this, event: &MouseMoveEvent, _, cx| {
                if this.split.is_dragging() {
                    this.split_input(
                        SplitInput::PointerMove {
                            x: event.position.x.into(),
                        },
                        cx,
                    );
                }
            }))
            .on_mouse_up(
                MouseButton::Left,
                cx.listener(|this, _: &MouseUpEvent, _, cx| {
                    if this.split.is_dragging() {
                        this.split_input(SplitInput::PointerUp, cx);
                    }
                }),
            )
            .child(window_exit_listener(cx.entity()))
            .child(menu_bar)
            .child(self.render_split_row(cx))
            .child(self.notifications.clone())
    }
}

/// Force-closes the menus when the pointer leaves the window. Hover
/// listeners only run on mouse moves, so the exit event is watched directly.
fn window_exit_listener(root: Entity<RootView>) -> impl IntoElement {
    canvas(
        |_, _, _| {},
        move |_, _, window, _| {
            window.on_mouse_event(move |_: &MouseExitEvent, phase, _, cx| {
                if phase != DispatchPhase::Bubble {
                    return;
                }
                root.update(cx, |this, cx| {
                    this.dropdowns.window_left();
                    this.after_force_close(cx);
                });
            });
        },
    )
    .absolute()
    .size_full()
}
