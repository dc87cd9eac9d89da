//! Adapters that turn an input file into a stream of text fragments.
//!
//! Every adapter is a plain [`Iterator`] over `Result<String, SourceError>`
//! pulled on a blocking thread by the batch orchestrator. Malformed records
//! are reported and skipped, anything else ends the batch.

mod columns;
mod delimited;
#[cfg(any(feature = "pdf", feature = "docx"))]
mod document;
#[cfg(feature = "spreadsheet")]
mod spreadsheet;
mod text;
mod upload;

use std::path::Path;

use log::debug;
use strum::Display;

pub use columns::PhoneColumns;
pub use delimited::DelimitedSource;
#[cfg(any(feature = "pdf", feature = "docx"))]
pub use document::DocumentSource;
#[cfg(feature = "spreadsheet")]
pub use spreadsheet::SpreadsheetSource;
pub use text::LineSource;
pub use upload::StagedUpload;

use crate::errors::{Error, SourceError};

/// A finite, single-pass producer of text fragments.
pub trait FragmentSource: Iterator<Item = Result<String, SourceError>> + Send {}

impl<T> FragmentSource for T where T: Iterator<Item = Result<String, SourceError>> + Send {}

const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum SourceFormat {
    PlainText,
    Delimited,
    Spreadsheet,
    Pdf,
    Docx,
}

impl SourceFormat {
    pub fn from_path(path: &Path) -> Result<Self, Error> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "txt" | "text" => Ok(Self::PlainText),
            "csv" | "tsv" => Ok(Self::Delimited),
            "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => Ok(Self::Spreadsheet),
            "pdf" => Ok(Self::Pdf),
            "docx" => Ok(Self::Docx),
            _ => Err(Error::UnsupportedInput(format!(
                "cannot tell the format of '{}'",
                path.display()
            ))),
        }
    }

    pub fn from_mime(mime: &str) -> Result<Self, Error> {
        // Drop parameters such as "; charset=utf-8".
        let essence = mime.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
        match essence.as_str() {
            "text/plain" => Ok(Self::PlainText),
            "text/csv" | "text/tab-separated-values" => Ok(Self::Delimited),
            "application/vnd.ms-excel" => Ok(Self::Spreadsheet),
            "application/pdf" => Ok(Self::Pdf),
            DOCX_MIME => Ok(Self::Docx),
            other if other.contains("sheet") => Ok(Self::Spreadsheet),
            other => Err(Error::UnsupportedInput(format!("content type '{other}'"))),
        }
    }
}

/// Opens `path` with the adapter for `format`.
///
/// Files are opened lazily where the underlying reader allows it, so most
/// read failures surface as a fatal error inside the batch.
pub fn open(path: &Path, format: SourceFormat) -> Result<Box<dyn FragmentSource>, Error> {
    debug!("Opening {} as {format}", path.display());
    #[allow(unreachable_patterns)]
    let source: Box<dyn FragmentSource> = match format {
        SourceFormat::PlainText => Box::new(LineSource::open(path)?),
        SourceFormat::Delimited => Box::new(DelimitedSource::open(path)?),
        #[cfg(feature = "spreadsheet")]
        SourceFormat::Spreadsheet => Box::new(SpreadsheetSource::new(path)),
        #[cfg(feature = "pdf")]
        SourceFormat::Pdf => Box::new(DocumentSource::pdf(path)),
        #[cfg(feature = "docx")]
        SourceFormat::Docx => Box::new(DocumentSource::docx(path)),
        other => {
            return Err(Error::UnsupportedInput(format!(
                "{other} support is not compiled in"
            )));
        }
    };
    Ok(source)
}
