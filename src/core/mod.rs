pub mod config;
pub mod document;
pub mod emit;
pub mod error;
pub mod extract;
pub mod pipeline;
pub mod rewrite;
pub mod rules;
pub mod scan;
pub mod types;
