pub mod cli;
pub mod config;
pub mod error;
pub mod history;
pub mod pipeline;
pub mod reader;
pub mod report;
pub mod submit;
pub mod template;
