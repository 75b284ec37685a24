use crate::error::AppResult;
use crate::services::storage::{KeyValueStore, PREVIEW_KEY, WORD_WRAP_KEY};

/// Persisted on/off switches for the preview pane and editor soft wrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewToggles {
    pub preview: bool,
    pub word_wrap: bool,
}

impl Default for ViewToggles {
    fn default() -> Self {
        Self {
            preview: true,
            word_wrap: true,
        }
    }
}

impl ViewToggles {
    /// Anything other than a literal `"false"` counts as enabled.
    pub fn load(store: &impl KeyValueStore) -> Self {
        Self {
            preview: store.load(PREVIEW_KEY) != "false",
            word_wrap: store.load(WORD_WRAP_KEY) != "false",
        }
    }

    /// Hiding the preview hides the divider with it.
    pub fn divider_visible(&self) -> bool {
        self.preview
    }

    pub fn set_preview(&mut self, store: &mut impl KeyValueStore, enabled: bool) -> AppResult<()> {
        self.preview = enabled;
        store.save(PREVIEW_KEY, flag(enabled))
    }

    pub fn set_word_wrap(
        &mut self,
        store: &mut impl KeyValueStore,
        enabled: bool,
    ) -> AppResult<()> {
        self.word_wrap = enabled;
        store.save(WORD_WRAP_KEY, flag(enabled))
    }
}

fn flag(enabled: bool) -> &'static str {
    if enabled { "true" } else { "false" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::storage::FileStore;

    #[test]
    fn defaults_to_enabled() {
        let store = FileStore::in_memory();
        assert_eq!(ViewToggles::load(&store), ViewToggles::default());
    }

    #[test]
    fn only_literal_false_disables() {
        let mut store = FileStore::in_memory();
        store.save(PREVIEW_KEY, "no").unwrap();
        store.save(WORD_WRAP_KEY, "false").unwrap();
        let toggles = ViewToggles::load(&store);
        assert!(toggles.preview);
        assert!(!toggles.word_wrap);
    }

    #[test]
    fn preview_toggle_survives_reload() {
        let mut store = FileStore::in_memory();
        let mut toggles = ViewToggles::load(&store);

        toggles.set_preview(&mut store, false).unwrap();
        let reloaded = ViewToggles::load(&store);
        assert!(!reloaded.preview);
        assert!(!reloaded.divider_visible());

        toggles.set_preview(&mut store, true).unwrap();
        let reloaded = ViewToggles::load(&store);
        assert!(reloaded.preview);
        assert!(reloaded.divider_visible());
    }

    #[test]
    fn word_wrap_is_persisted() {
        let mut store = FileStore::in_memory();
        let mut toggles = ViewToggles::default();
        toggles.set_word_wrap(&mut store, false).unwrap();
        assert_eq!(store.load(WORD_WRAP_KEY), "false");
        toggles.set_word_wrap(&mut store, true).unwrap();
        assert_eq!(store.load(WORD_WRAP_KEY), "true");
    }
}
