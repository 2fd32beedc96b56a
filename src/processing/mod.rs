//! Text processing and analysis module

pub mod document;
pub mod text_processor;
pub mod keyword_extractor;
pub mod resume_parser;
pub mod gap_analyzer;
pub mod edit_validator;
pub mod analyzer;
