use std::{
    path::{Path, PathBuf},
    vec,
};

use log::debug;

use crate::errors::SourceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DocumentKind {
    #[cfg(feature = "pdf")]
    Pdf,
    #[cfg(feature = "docx")]
    Docx,
}

/// Text lines of a PDF or DOCX document, one fragment per non-blank line.
///
/// Decoding happens on the first pull. A document that cannot be decoded
/// yields a single fatal [`SourceError::Decode`] and nothing else.
pub struct DocumentSource {
    path: PathBuf,
    kind: DocumentKind,
    lines: Option<vec::IntoIter<String>>,
    failed: bool,
}

impl DocumentSource {
    #[cfg(feature = "pdf")]
    pub fn pdf(path: &Path) -> Self {
        Self::new(path, DocumentKind::Pdf)
    }

    #[cfg(feature = "docx")]
    pub fn docx(path: &Path) -> Self {
        Self::new(path, DocumentKind::Docx)
    }

    fn new(path: &Path, kind: DocumentKind) -> Self {
        Self { path: path.to_owned(), kind, lines: None, failed: false }
    }

    fn load(&self) -> Result<Vec<String>, SourceError> {
        let content = std::fs::read(&self.path)?;
        let text = match self.kind {
            #[cfg(feature = "pdf")]
            DocumentKind::Pdf => pdf_text(&content)?,
            #[cfg(feature = "docx")]
            DocumentKind::Docx => docx_text(&content)?,
        };
        let lines = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_owned)
            .collect::<Vec<_>>();
        debug!("Decoded {} lines from {}", lines.len(), self.path.display());
        Ok(lines)
    }
}

impl Iterator for DocumentSource {
    type Item = Result<String, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        if self.lines.is_none() {
            match self.load() {
                Ok(lines) => self.lines = Some(lines.into_iter()),
                Err(err) => {
                    self.failed = true;
                    return Some(Err(err));
                }
            }
        }
        self.lines.as_mut()?.next().map(Ok)
    }
}

#[cfg(feature = "pdf")]
fn pdf_text(content: &[u8]) -> Result<String, SourceError> {
    pdf_extract::extract_text_from_mem(content)
        .map_err(|err| SourceError::Decode { format: "pdf", reason: err.to_string() })
}

#[cfg(feature = "docx")]
fn docx_text(content: &[u8]) -> Result<String, SourceError> {
    use docx_rs::{DocumentChild, TableCellContent, TableChild, TableRowChild};

    let docx = docx_rs::read_docx(content)
        .map_err(|err| SourceError::Decode { format: "docx", reason: err.to_string() })?;

    let mut parts = Vec::new();
    for child in &docx.document.children {
        match child {
            DocumentChild::Paragraph(p) => parts.push(paragraph_text(p)),
            DocumentChild::Table(t) => {
                // Every cell is its own fragment so numbers in adjacent
                // cells never run together.
                for row in &t.rows {
                    let TableChild::TableRow(r) = row;
                    for cell in &r.cells {
                        let TableRowChild::TableCell(c) = cell;
                        for content in &c.children {
                            if let TableCellContent::Paragraph(p) = content {
                                parts.push(paragraph_text(p));
                            }
                        }
                    }
                }
            }
            _ => {}
        }
    }
    Ok(parts.join("\n"))
}

#[cfg(feature = "docx")]
fn paragraph_text(p: &docx_rs::Paragraph) -> String {
    use docx_rs::{ParagraphChild, Run, RunChild};

    fn push_run(text: &mut String, run: &Run) {
        for child in &run.children {
            match child {
                RunChild::Text(t) => text.push_str(&t.text),
                RunChild::Tab(_) => text.push('\t'),
                RunChild::Break(_) => text.push('\n'),
                _ => {}
            }
        }
    }

    let mut text = String::new();
    for child in &p.children {
        match child {
            ParagraphChild::Run(run) => push_run(&mut text, run),
            ParagraphChild::Hyperlink(link) => {
                for child in &link.children {
                    if let ParagraphChild::Run(run) = child {
                        push_run(&mut text, run);
                    }
                }
            }
            _ => {}
        }
    }
    text
}
