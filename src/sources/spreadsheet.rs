use std::{
    path::{Path, PathBuf},
    vec,
};

use calamine::{Data, Reader, open_workbook_auto};
use log::debug;

use super::columns::PhoneColumns;
use crate::{errors::SourceError, string_util::float_cell_to_string};

/// One fragment per data row of the first worksheet of an Excel or
/// OpenDocument workbook. The first row holds the headers unless it looks
/// like data (see [`PhoneColumns::is_headerless`]).
///
/// The workbook is decoded on the first pull; a workbook that cannot be
/// decoded is a fatal source error.
pub struct SpreadsheetSource {
    path: PathBuf,
    rows: Option<vec::IntoIter<Result<String, SourceError>>>,
}

impl SpreadsheetSource {
    pub fn new(path: &Path) -> Self {
        Self { path: path.to_owned(), rows: None }
    }

    fn load(&self) -> Result<Vec<Result<String, SourceError>>, SourceError> {
        let mut workbook = open_workbook_auto(&self.path).map_err(decode_error)?;
        let range = match workbook.worksheet_range_at(0) {
            Some(range) => range.map_err(decode_error)?,
            None => {
                debug!("Workbook {} has no worksheets", self.path.display());
                return Ok(Vec::new());
            }
        };

        let Some(header) = range.rows().next() else {
            return Ok(Vec::new());
        };
        let header_text = header
            .iter()
            .map(|cell| cell_text(cell).unwrap_or_default())
            .collect::<Vec<_>>();
        let columns = PhoneColumns::detect(header_text.iter().map(String::as_str));

        let first = header_text.first().map(String::as_str).unwrap_or_default();
        let skip = if columns.is_headerless(first) {
            debug!("No phone header in {}, reading the first row as data", self.path.display());
            0
        } else {
            1
        };
        // The used range may start below the first sheet row.
        let top = range.start().map_or(0, |(row, _)| row as usize);

        let fragments = range
            .rows()
            .skip(skip)
            .enumerate()
            .map(|(index, row)| {
                let chosen = columns.choose(|column| {
                    row.get(column).is_some_and(|cell| !matches!(cell, Data::Empty))
                });
                match row.get(chosen).map(cell_text) {
                    None => Ok(String::new()),
                    Some(Ok(text)) => Ok(text),
                    Some(Err(reason)) => Err(SourceError::MalformedRecord {
                        // 1-based sheet row
                        position: top + skip + index + 1,
                        reason,
                    }),
                }
            })
            .collect();
        Ok(fragments)
    }
}

impl Iterator for SpreadsheetSource {
    type Item = Result<String, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rows.is_none() {
            match self.load() {
                Ok(rows) => self.rows = Some(rows.into_iter()),
                Err(err) => {
                    self.rows = Some(Vec::new().into_iter());
                    return Some(Err(err));
                }
            }
        }
        self.rows.as_mut()?.next()
    }
}

fn cell_text(cell: &Data) -> Result<String, String> {
    match cell {
        Data::Empty => Ok(String::new()),
        Data::String(text) => Ok(text.clone()),
        // Phone numbers typed into a cell are usually stored as floats.
        Data::Float(value) => Ok(float_cell_to_string(*value)),
        Data::Int(value) => Ok(value.to_string()),
        Data::Error(err) => Err(format!("cell error {err:?}")),
        other => Ok(other.to_string()),
    }
}

fn decode_error(err: impl std::fmt::Display) -> SourceError {
    SourceError::Decode { format: "spreadsheet", reason: err.to_string() }
}
