use crate::error::AppResult;
use crate::services::storage::{KeyValueStore, SPLIT_KEY};

/// Pointer positions closer than this to the midpoint snap onto it.
pub const SNAP_THRESHOLD: f32 = 7.0;
/// Rendered width of the divider handle in pixels.
pub const DIVIDER_WIDTH: f32 = 6.0;

/// Flex-basis percentages for the two panes plus the divider's left edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaneLayout {
    pub editor_basis: f32,
    pub divider_left: f32,
    pub preview_basis: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SplitInput {
    PointerDown { x: f32 },
    PointerMove { x: f32 },
    PointerUp,
    DoubleClick,
}

#[derive(Debug, Clone, Copy)]
struct DragSession {
    last_x: f32,
}

/// Divider drag state and the layout it produces.
///
/// The canonical persisted value is the divider's signed offset in pixels
/// from the horizontal midpoint of the split container.
pub struct SplitController {
    origin_x: f32,
    viewport_width: f32,
    divider_width: f32,
    layout: PaneLayout,
    drag: Option<DragSession>,
}

impl SplitController {
    pub fn new(viewport_width: f32, divider_width: f32) -> Self {
        let mut controller = Self {
            origin_x: 0.0,
            viewport_width,
            divider_width,
            layout: PaneLayout {
                editor_basis: 50.0,
                divider_left: 50.0,
                preview_basis: 50.0,
            },
            drag: None,
        };
        controller.layout = controller.centered_layout();
        controller
    }

    pub fn layout(&self) -> PaneLayout {
        self.layout
    }

    pub fn viewport_width(&self) -> f32 {
        self.viewport_width
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Updates the container geometry. Percentages are kept as they are.
    pub fn set_viewport(&mut self, origin_x: f32, width: f32) {
        self.origin_x = origin_x;
        self.viewport_width = width;
    }

    pub fn midpoint(&self) -> f32 {
        self.origin_x + self.viewport_width / 2.0
    }

    pub fn compute_layout(&self, pointer_x: f32, drag_origin_x: f32) -> PaneLayout {
        if self.viewport_width <= 0.0 {
            return self.centered_layout();
        }
        let editor_basis = (pointer_x - drag_origin_x) / self.viewport_width * 100.0;
        let divider_left =
            editor_basis - (self.divider_width / self.viewport_width * 100.0) / 2.0;
        PaneLayout {
            editor_basis,
            divider_left,
            preview_basis: 100.0 - editor_basis,
        }
    }

    pub fn offset_from_center(&self, pointer_x: f32, drag_origin_x: f32) -> f32 {
        (pointer_x - drag_origin_x) - self.viewport_width / 2.0
    }

    pub fn persist_offset(
        &self,
        store: &mut impl KeyValueStore,
        pointer_x: f32,
        drag_origin_x: f32,
    ) -> AppResult<()> {
        let offset = self.offset_from_center(pointer_x, drag_origin_x);
        store.save(SPLIT_KEY, &offset.to_string())
    }

    /// Replays the stored offset as if a drag had just ended there.
    pub fn restore_on_load(&mut self, store: &impl KeyValueStore) {
        let offset = parse_offset(&store.load(SPLIT_KEY));
        self.drag = None;
        self.layout = self.compute_layout(self.viewport_width / 2.0, -offset);
        tracing::debug!(offset, editor = self.layout.editor_basis, "restored split");
    }

    pub fn reset_to_center(&mut self, store: &mut impl KeyValueStore) -> AppResult<()> {
        self.drag = None;
        self.layout = self.centered_layout();
        store.save(SPLIT_KEY, "0")
    }

    /// Forces the pointer onto the midpoint when it is close enough.
    pub fn snap(&self, pointer_x: f32) -> f32 {
        let middle = self.midpoint();
        if (pointer_x - middle).abs() < SNAP_THRESHOLD {
            middle
        } else {
            pointer_x
        }
    }

    /// Feeds one pointer event through the drag session. Returns whether the layout changed.
    pub fn handle(&mut self, input: SplitInput, store: &mut impl KeyValueStore) -> AppResult<bool> {
        match input {
            SplitInput::PointerDown { x } => {
                self.drag = Some(DragSession { last_x: x });
                Ok(false)
            }
            SplitInput::PointerMove { x } => {
                let Some(drag) = self.drag.as_mut() else {
                    return Ok(false);
                };
                drag.last_x = x;
                let x = self.snap(x);
                self.layout = self.compute_layout(x, self.origin_x);
                self.persist_offset(store, x, self.origin_x)?;
                Ok(true)
            }
            SplitInput::PointerUp => {
                if let Some(drag) = self.drag.take() {
                    tracing::debug!(x = drag.last_x, "divider drag finished");
                }
                Ok(false)
            }
            SplitInput::DoubleClick => {
                self.reset_to_center(store)?;
                Ok(true)
            }
        }
    }

    fn centered_layout(&self) -> PaneLayout {
        let half_divider = if self.viewport_width > 0.0 {
            (self.divider_width / self.viewport_width * 100.0) / 2.0
        } else {
            0.0
        };
        PaneLayout {
            editor_basis: 50.0,
            divider_left: 50.0 - half_divider,
            preview_basis: 50.0,
        }
    }
}

fn parse_offset(raw: &str) -> f32 {
    raw.trim()
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}
