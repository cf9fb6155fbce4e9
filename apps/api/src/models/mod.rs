pub mod document;
pub mod resume;
pub mod user;
