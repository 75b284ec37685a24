pub mod editor;
pub mod preview;
pub mod root;
pub mod theme;
pub mod widgets;
