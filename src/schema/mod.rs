pub mod character;
pub mod document;
pub mod format;
pub mod scene;
