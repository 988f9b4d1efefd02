pub mod document;
pub mod export;
pub mod template;
