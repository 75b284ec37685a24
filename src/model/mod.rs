pub mod document;
pub mod dropdown;
pub mod preview;
pub mod split;
