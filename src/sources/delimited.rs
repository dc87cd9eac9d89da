use std::{fs::File, io::Read, path::Path};

use log::debug;

use super::columns::PhoneColumns;
use crate::errors::SourceError;

/// One fragment per data row of a CSV/TSV file: the value of the detected
/// phone column (see [`PhoneColumns`]).
///
/// The header row is read lazily on the first pull, so a file that cannot be
/// read at all fails inside the batch rather than before it. When no header
/// looks like a phone column and the header row itself contains a number,
/// the file is taken to have no header and that row is emitted as data.
pub struct DelimitedSource<R: Read> {
    reader: csv::Reader<R>,
    columns: Option<PhoneColumns>,
    pending: Option<String>,
    record: csv::StringRecord,
    position: usize,
    finished: bool,
}

impl DelimitedSource<File> {
    /// `.tsv` files are split on tabs, everything else on commas.
    pub fn open(path: &Path) -> std::io::Result<Self> {
        let delimiter = match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("tsv") => b'\t',
            _ => b',',
        };
        Ok(Self::from_reader(File::open(path)?, delimiter))
    }
}

impl<R: Read> DelimitedSource<R> {
    pub fn from_reader(reader: R, delimiter: u8) -> Self {
        let reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .has_headers(false)
            .from_reader(reader);
        Self {
            reader,
            columns: None,
            pending: None,
            record: csv::StringRecord::new(),
            position: 0,
            finished: false,
        }
    }

    fn read_record(&mut self) -> Option<Result<(), SourceError>> {
        match self.reader.read_record(&mut self.record) {
            Ok(true) => {
                self.position += 1;
                Some(Ok(()))
            }
            Ok(false) => {
                self.finished = true;
                None
            }
            Err(err) => {
                self.position += 1;
                let err = map_csv_error(err, self.position);
                if err.is_fatal() {
                    self.finished = true;
                }
                Some(Err(err))
            }
        }
    }

    /// Header names only pick the phone column, so they are decoded lossily:
    /// a header in a legacy encoding must not cost the rows below it.
    fn read_headers(&mut self) -> Option<Result<(), SourceError>> {
        let mut header = csv::ByteRecord::new();
        match self.reader.read_byte_record(&mut header) {
            Ok(true) => self.position += 1,
            Ok(false) => {
                self.finished = true;
                return None;
            }
            Err(err) => {
                self.position += 1;
                let err = map_csv_error(err, self.position);
                if err.is_fatal() {
                    self.finished = true;
                } else {
                    self.columns = Some(PhoneColumns::default());
                }
                return Some(Err(err));
            }
        }

        let names = header.iter().map(String::from_utf8_lossy).collect::<Vec<_>>();
        let columns = PhoneColumns::detect(names.iter().map(|name| &**name));
        let first = names.first().map(|name| &**name).unwrap_or_default();
        if columns.is_headerless(first) {
            debug!("No phone header found and first row holds a number, treating it as data");
            self.pending = Some(first.to_owned());
        }
        self.columns = Some(columns);
        Some(Ok(()))
    }

    fn current_value(&self, columns: &PhoneColumns) -> String {
        let index = columns.choose(|index| {
            self.record.get(index).is_some_and(|value| !value.trim().is_empty())
        });
        self.record.get(index).unwrap_or_default().to_owned()
    }
}

impl<R: Read> Iterator for DelimitedSource<R> {
    type Item = Result<String, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        if self.columns.is_none() {
            if let Err(err) = self.read_headers()? {
                return Some(Err(err));
            }
        }
        if let Some(pending) = self.pending.take() {
            return Some(Ok(pending));
        }
        if let Err(err) = self.read_record()? {
            return Some(Err(err));
        }
        let columns = self.columns.as_ref()?;
        Some(Ok(self.current_value(columns)))
    }
}

fn map_csv_error(err: csv::Error, position: usize) -> SourceError {
    let reason = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(io) => SourceError::Read(io),
        _ => SourceError::MalformedRecord { position, reason },
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::DelimitedSource;

    fn fragments(data: &str) -> Vec<String> {
        DelimitedSource::from_reader(Cursor::new(data.as_bytes().to_vec()), b',')
            .map(|item| item.unwrap())
            .collect()
    }

    #[test]
    fn legacy_encoded_header_keeps_every_row() {
        // "Nom,Téléphone" in Windows-1252.
        let mut data = b"Nom,T\xe9l\xe9phone\n".to_vec();
        data.extend_from_slice(b"Ada,+1 773 776 5277\nBob,800-555-0199\nEve,+44 20 8765 4321\n");

        let items = DelimitedSource::from_reader(Cursor::new(data), b',').collect::<Vec<_>>();
        let values = items
            .into_iter()
            .map(|item| item.unwrap())
            .collect::<Vec<_>>();
        assert_eq!(values, vec!["+1 773 776 5277", "800-555-0199", "+44 20 8765 4321"]);
    }

    #[test]
    fn bad_data_row_skips_only_that_row() {
        let data = b"phone\n7737765277\n\xff\xfe\n8005550199\n".to_vec();
        let items = DelimitedSource::from_reader(Cursor::new(data), b',').collect::<Vec<_>>();

        assert_eq!(items.len(), 3);
        assert_eq!(items[0].as_ref().unwrap(), "7737765277");
        assert!(items[1].as_ref().is_err_and(|err| !err.is_fatal()));
        assert_eq!(items[2].as_ref().unwrap(), "8005550199");
    }

    #[test]
    fn picks_the_phone_column() {
        let data = "name,email,Phone Number\n\
                    Ada,ada@example.com,(773) 776-5277\n\
                    Bob,bob@example.com,800-555-0199\n";
        assert_eq!(fragments(data), vec!["(773) 776-5277", "800-555-0199"]);
    }

    #[test]
    fn blank_phone_cell_falls_back_to_other_phone_columns() {
        let data = "phone,number\n,7737765277\n8005550199,7737765277\n";
        assert_eq!(fragments(data), vec!["7737765277", "8005550199"]);
    }

    #[test]
    fn headerless_file_keeps_first_row() {
        let data = "7737765277\n8005550199\n";
        assert_eq!(fragments(data), vec!["7737765277", "8005550199"]);
    }

    #[test]
    fn unknown_headers_use_first_column() {
        let data = "contact,note\n+44 20 7946 0958,office\n";
        assert_eq!(fragments(data), vec!["+44 20 7946 0958"]);
    }

    #[test]
    fn ragged_rows_are_tolerated() {
        let data = "phone,name\n7737765277\n8005550199,Bob,extra\n";
        assert_eq!(fragments(data), vec!["7737765277", "8005550199"]);
    }
}
