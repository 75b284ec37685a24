use gpui::{Rgba, rgb, rgba};

pub struct Theme;

impl Theme {
    pub fn bg() -> Rgba {
        rgb(0xf6f8fa)
    }
    pub fn panel() -> Rgba {
        rgb(0xffffff)
    }
    pub fn menu_bar() -> Rgba {
        rgb(0x24292e)
    }
    pub fn menu_text() -> Rgba {
        rgb(0xf0f3f6)
    }
    pub fn menu_hover() -> Rgba {
        rgb(0x3b434b)
    }
    pub fn border() -> Rgba {
        rgb(0xd0d7de)
    }
    pub fn divider() -> Rgba {
        rgb(0xd8dee4)
    }
    pub fn divider_active() -> Rgba {
        rgb(0x0969da)
    }
    pub fn code_bg() -> Rgba {
        rgb(0xf6f8fa)
    }
    pub fn text() -> Rgba {
        rgb(0x1f2328)
    }
    pub fn muted() -> Rgba {
        rgb(0x656d76)
    }
    pub fn accent() -> Rgba {
        rgb(0x0969da)
    }
    pub fn selection_bg() -> Rgba {
        rgba(0x0969da33) // accent with low alpha for text selection
    }
    pub fn quote_bar() -> Rgba {
        rgb(0xd0d7de)
    }
}
