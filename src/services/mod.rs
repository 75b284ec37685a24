pub mod config;
pub mod emoji;
pub mod fs;
pub mod highlight;
pub mod markdown;
pub mod settings;
pub mod storage;
pub mod tasks;
