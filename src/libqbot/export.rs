//! PDF and plain-text export of an in-memory question list. No network involved.

use crate::question::QuestionRecord;
use chrono::Utc;
use log::{debug, info, warn};
use printpdf::{BuiltinFont, Mm, PdfDocument};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_TITLE: &str = "Q-Bot Generated Questions";
pub const PAPER_TITLE: &str = "Q-Bot Question Paper";

const SEPARATOR: &str = "--------------";

// A4, all positions in mm measured from the top-left corner.
const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN_X: f32 = 20.0;
const TOP: f32 = 20.0;
const LINE_HEIGHT: f32 = 10.0;
const TEXT_LINE_HEIGHT: f32 = 6.0;
const QUESTION_BREAK_AT: f32 = 250.0;
const PAGE_BOTTOM: f32 = 280.0;
// 170mm of 10pt Helvetica
const WRAP_COLUMNS: usize = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    Pdf,
    Text,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Text => "txt",
        }
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("No questions to export!")]
    Empty,
    #[error("cannot write export file: {0}")]
    Io(#[from] io::Error),
    #[error("cannot build PDF: {0}")]
    Pdf(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PdfLine {
    pub text: String,
    pub font_size: f32,
    pub bold: bool,
    pub y: f32,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PdfPage {
    pub lines: Vec<PdfLine>,
}

struct Cursor {
    pages: Vec<PdfPage>,
    y: f32,
}

impl Cursor {
    fn new() -> Self {
        Cursor {
            pages: vec![PdfPage::default()],
            y: TOP,
        }
    }

    fn break_past(&mut self, limit: f32) {
        if self.y > limit {
            self.pages.push(PdfPage::default());
            self.y = TOP;
        }
    }

    fn line(&mut self, text: String, font_size: f32, bold: bool, advance: f32) {
        self.break_past(PAGE_BOTTOM);
        let y = self.y;
        if let Some(page) = self.pages.last_mut() {
            page.lines.push(PdfLine {
                text,
                font_size,
                bold,
                y,
            });
        }
        self.y += advance;
    }
}

#[derive(Debug, Clone)]
pub struct Exporter {
    pub title: String,
    /// Extra lines under the title (paper duration).
    pub header: Vec<String>,
    pub file_stem: String,
}

impl Default for Exporter {
    fn default() -> Self {
        Exporter {
            title: DEFAULT_TITLE.to_string(),
            header: Vec::new(),
            file_stem: "qbot-questions".to_string(),
        }
    }
}

impl Exporter {
    pub fn paper(duration_minutes: u32) -> Self {
        Exporter {
            title: PAPER_TITLE.to_string(),
            header: vec![format!("Duration: {} minutes", duration_minutes)],
            file_stem: "qbot-paper".to_string(),
        }
    }

    pub fn render_text(&self, questions: &[QuestionRecord]) -> Result<String, ExportError> {
        if questions.is_empty() {
            return Err(ExportError::Empty);
        }

        let blocks: Vec<String> = questions
            .iter()
            .enumerate()
            .map(|(idx, q)| text_block(idx + 1, q))
            .collect();
        let body = blocks.join("\n\n");

        if self.header.is_empty() {
            Ok(body)
        } else {
            let mut text = format!("{}\n", self.title);
            for line in &self.header {
                text.push_str(line);
                text.push('\n');
            }
            text.push_str(&body);
            Ok(text)
        }
    }

    /// Place every line on A4 pages without touching any PDF machinery.
    pub fn layout_pdf(&self, questions: &[QuestionRecord]) -> Result<Vec<PdfPage>, ExportError> {
        if questions.is_empty() {
            return Err(ExportError::Empty);
        }

        let mut cursor = Cursor::new();
        cursor.line(self.title.clone(), 16.0, true, LINE_HEIGHT * 2.0);
        for line in &self.header {
            cursor.line(line.clone(), 10.0, false, LINE_HEIGHT);
        }

        for (idx, q) in questions.iter().enumerate() {
            cursor.break_past(QUESTION_BREAK_AT);
            cursor.line(format!("Question {}", idx + 1), 12.0, true, LINE_HEIGHT);
            for (label, value) in fields(q) {
                cursor.line(format!("{}: {}", label, value), 10.0, false, LINE_HEIGHT);
            }
            for text in wrap(&q.content, WRAP_COLUMNS) {
                cursor.line(text, 10.0, false, TEXT_LINE_HEIGHT);
            }
            for option in &q.options {
                for text in wrap(option, WRAP_COLUMNS - 4) {
                    cursor.line(format!("  {}", text), 10.0, false, TEXT_LINE_HEIGHT);
                }
            }
            if let Some(answer) = &q.correct_answer {
                cursor.line(format!("Answer: {}", answer), 10.0, true, TEXT_LINE_HEIGHT);
            }
            cursor.y += LINE_HEIGHT;
        }

        Ok(cursor.pages)
    }

    pub fn render_pdf(&self, questions: &[QuestionRecord]) -> Result<Vec<u8>, ExportError> {
        let pages = self.layout_pdf(questions)?;
        let pdf_err = |err: printpdf::Error| ExportError::Pdf(format!("{:?}", err));

        let (doc, first_page, first_layer) =
            PdfDocument::new(self.title.as_str(), Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(pdf_err)?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(pdf_err)?;

        for (idx, page) in pages.iter().enumerate() {
            let (page_idx, layer_idx) = if idx == 0 {
                (first_page, first_layer)
            } else {
                doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1")
            };
            let layer = doc.get_page(page_idx).get_layer(layer_idx);
            for line in &page.lines {
                let font = if line.bold { &bold } else { &regular };
                layer.use_text(
                    line.text.as_str(),
                    line.font_size,
                    Mm(MARGIN_X),
                    Mm(PAGE_HEIGHT - line.y),
                    font,
                );
            }
        }

        debug!("[Export] Rendered {} PDF pages.", pages.len());
        doc.save_to_bytes().map_err(pdf_err)
    }

    pub fn render(
        &self,
        format: ExportFormat,
        questions: &[QuestionRecord],
    ) -> Result<Vec<u8>, ExportError> {
        match format {
            ExportFormat::Pdf => self.render_pdf(questions),
            ExportFormat::Text => self.render_text(questions).map(String::into_bytes),
        }
    }

    /// Render and write `<stem>-<unix millis>.<ext>` into `dir`.
    /// An empty list writes nothing.
    pub fn write(
        &self,
        format: ExportFormat,
        questions: &[QuestionRecord],
        dir: &Path,
    ) -> Result<PathBuf, ExportError> {
        let bytes = match self.render(format, questions) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!("[Export] {}", err);
                return Err(err);
            }
        };
        let path = dir.join(format!(
            "{}-{}.{}",
            self.file_stem,
            Utc::now().timestamp_millis(),
            format.extension()
        ));
        fs::write(&path, bytes)?;
        info!(
            "[Export] Wrote {} questions to {:?}",
            questions.len(),
            path
        );
        Ok(path)
    }
}

fn fields(q: &QuestionRecord) -> [(&'static str, &str); 5] {
    [
        ("Subject", q.subject.as_str()),
        ("Topic", q.topic.as_str()),
        ("Type", q.question_type.as_str()),
        ("Difficulty", q.difficulty.as_str()),
        ("Time", q.timestamp.as_str()),
    ]
}

fn text_block(number: usize, q: &QuestionRecord) -> String {
    let mut block = format!("\nQuestion {}\n{}\n", number, SEPARATOR);
    for (label, value) in fields(q) {
        block.push_str(&format!("{}: {}\n", label, value));
    }
    block.push('\n');
    block.push_str(&q.content);
    block.push('\n');
    if !q.options.is_empty() {
        block.push_str("Options:\n");
        for option in &q.options {
            block.push_str(&format!("  {}\n", option));
        }
    }
    if let Some(answer) = &q.correct_answer {
        block.push_str(&format!("Answer: {}\n", answer));
    }
    block
}

/// Greedy word wrap. Blank lines are kept; overlong words are split.
pub fn wrap(text: &str, columns: usize) -> Vec<String> {
    let columns = columns.max(1);
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            while word.len() > columns {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                let rest = word.split_off(columns);
                lines.push(word.into_iter().collect());
                word = rest;
            }
            let current_len = current.chars().count();
            if current_len > 0 && current_len + 1 + word.len() > columns {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.extend(word);
        }
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}
