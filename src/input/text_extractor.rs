//! Text extraction from plain text and markdown files

use crate::error::{Result, ResumeTailorError};
use pulldown_cmark::{Event, Parser, Tag};
use std::path::Path;
use tokio::fs;

pub trait TextExtractor {
    fn extract(&self, path: &Path) -> impl std::future::Future<Output = Result<String>> + Send;
}

pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        let content = fs::read_to_string(path).await.map_err(ResumeTailorError::Io)?;
        Ok(content)
    }
}

/// Flattens markdown to plain lines. List items keep a `- ` marker and
/// headings keep their `#` prefix on a line of their own, so the parsers see
/// the same shape as a text file.
pub struct MarkdownExtractor;

impl TextExtractor for MarkdownExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        let markdown_content = fs::read_to_string(path).await.map_err(ResumeTailorError::Io)?;
        Ok(self.markdown_to_text(&markdown_content))
    }
}

impl MarkdownExtractor {
    pub fn markdown_to_text(&self, markdown: &str) -> String {
        let mut text = String::new();

        for event in Parser::new(markdown) {
            match event {
                Event::Start(Tag::Item) => {
                    start_line(&mut text);
                    text.push_str("- ");
                }
                Event::Start(Tag::Heading(level, ..)) => {
                    start_line(&mut text);
                    text.push_str(&"#".repeat(level as usize));
                    text.push(' ');
                }
                Event::Start(Tag::Paragraph) => start_line(&mut text),
                Event::Text(t) | Event::Code(t) => text.push_str(&t),
                Event::SoftBreak | Event::HardBreak => text.push('\n'),
                Event::End(Tag::Paragraph) | Event::End(Tag::Heading(..)) | Event::End(Tag::Item) => {
                    start_line(&mut text)
                }
                _ => {}
            }
        }

        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn start_line(text: &mut String) {
    if !text.is_empty() && !text.ends_with('\n') {
        text.push('\n');
    }
}
