use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
};

use crate::errors::SourceError;

/// One fragment per line of a text stream.
///
/// Lines that are not valid UTF-8 are reported as malformed records and
/// skipped; any other read error ends the source.
pub struct LineSource<R> {
    reader: R,
    position: usize,
    finished: bool,
}

impl LineSource<BufReader<File>> {
    pub fn open(path: &Path) -> io::Result<Self> {
        Ok(Self::new(BufReader::new(File::open(path)?)))
    }
}

impl<R: BufRead> LineSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, position: 0, finished: false }
    }
}

impl<R: BufRead> Iterator for LineSource<R> {
    type Item = Result<String, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let mut buf = Vec::new();
        match self.reader.read_until(b'\n', &mut buf) {
            Ok(0) => {
                self.finished = true;
                None
            }
            Ok(_) => {
                self.position += 1;
                match String::from_utf8(buf) {
                    Ok(line) => Some(Ok(line.trim_end_matches(['\r', '\n']).to_owned())),
                    Err(err) => Some(Err(SourceError::MalformedRecord {
                        position: self.position,
                        reason: err.to_string(),
                    })),
                }
            }
            Err(err) => {
                self.finished = true;
                Some(Err(SourceError::Read(err)))
            }
        }
    }
}
