use std::{
    io::{self, Read},
    path::Path,
};

use log::debug;
use tempfile::NamedTempFile;

use super::{FragmentSource, SourceFormat};
use crate::errors::Error;

/// An uploaded file copied to temporary storage for the duration of one
/// batch. The copy is deleted by [`StagedUpload::close`] or on drop, so it
/// never outlives the batch whether that completes, fails or is cancelled.
pub struct StagedUpload {
    file: NamedTempFile,
    original_name: String,
    mime: Option<String>,
}

impl StagedUpload {
    /// Copies `reader` into a fresh temporary file. The original file name
    /// is kept so the format can still be told from its extension.
    pub fn stage<R: Read>(mut reader: R, original_name: &str) -> io::Result<Self> {
        let suffix = Path::new(original_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{ext}"))
            .unwrap_or_default();
        let mut file = tempfile::Builder::new()
            .prefix("phonescan-upload-")
            .suffix(&suffix)
            .tempfile()?;
        let copied = io::copy(&mut reader, &mut file)?;
        debug!("Staged upload '{original_name}' ({copied} bytes) at {}", file.path().display());
        Ok(Self { file, original_name: original_name.to_owned(), mime: None })
    }

    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    /// The declared content type wins when it is recognized, otherwise the
    /// original file name's extension decides.
    pub fn format(&self) -> Result<SourceFormat, Error> {
        let from_mime = self
            .mime
            .as_deref()
            .and_then(|mime| SourceFormat::from_mime(mime).ok());
        if let Some(format) = from_mime {
            return Ok(format);
        }
        SourceFormat::from_path(Path::new(&self.original_name))
    }

    pub fn open(&self) -> Result<Box<dyn FragmentSource>, Error> {
        super::open(self.path(), self.format()?)
    }

    /// Deletes the staged copy, reporting the failure dropping would hide.
    pub fn close(self) -> io::Result<()> {
        self.file.close()
    }
}
