pub mod engine;
pub mod executor;
pub mod sanitize;
pub mod scanner;
pub mod validate;
