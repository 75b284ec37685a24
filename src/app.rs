use crate::commands::{
    ExportHtml, NewFile, OpenFile, Quit, SaveFile, TogglePreview, ToggleWordWrap,
};
use crate::services::config::AppConfig;
use crate::services::storage::FileStore;
use crate::ui::root::{APP_TITLE, RootView};
use anyhow::Context as _;
use gpui::{
    App, AppContext, Application, Bounds, KeyBinding, TitlebarOptions, WindowBounds,
    WindowOptions, px, size,
};

pub fn run() {
    Application::new().run(|cx: &mut App| {
        gpui_component::init(cx);
        bind_keys(cx);
        cx.on_action(|_: &Quit, cx: &mut App| cx.quit());

        let config = AppConfig::load();
        let store = match config.storage_file() {
            Some(path) => FileStore::open(path),
            None => {
                tracing::warn!("no config directory available, storage will not persist");
                FileStore::in_memory()
            }
        };

        if let Err(err) = open_main_window(config, store, cx) {
            tracing::error!("{err:#}");
            cx.quit();
        }
    });
}

fn bind_keys(cx: &mut App) {
    cx.bind_keys([
        KeyBinding::new("secondary-n", NewFile, None),
        KeyBinding::new("secondary-o", OpenFile, None),
        KeyBinding::new("secondary-s", SaveFile, None),
        KeyBinding::new("secondary-e", ExportHtml, None),
        KeyBinding::new("secondary-p", TogglePreview, None),
        KeyBinding::new("alt-z", ToggleWordWrap, None),
        KeyBinding::new("secondary-q", Quit, None),
    ]);
}

fn open_main_window(config: AppConfig, store: FileStore, cx: &mut App) -> anyhow::Result<()> {
    let bounds = Bounds::centered(
        None,
        size(px(config.window.width), px(config.window.height)),
        cx,
    );
    tracing::info!(
        width = config.window.width,
        height = config.window.height,
        storage = ?store.path(),
        "opening editor window"
    );

    cx.open_window(
        WindowOptions {
            window_bounds: Some(WindowBounds::Windowed(bounds)),
            titlebar: Some(TitlebarOptions {
                title: Some(APP_TITLE.into()),
                ..Default::default()
            }),
            ..Default::default()
        },
        |window, cx| cx.new(|cx| RootView::new(config, store, window, cx)),
    )
    .context("failed to open the editor window")?;
    cx.activate(true);
    Ok(())
}
