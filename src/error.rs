//! Error types for pdfcvt.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pdfcvt operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while converting a PDF.
#[derive(Error, Debug)]
pub enum Error {
    /// Reading an input file failed.
    #[error("cannot read input: {0}")]
    Io(#[from] io::Error),

    /// The input has no `%PDF-` header.
    #[error("not a PDF file")]
    UnknownFormat,

    /// The header names a PDF version this crate cannot read.
    #[error("PDF version {0} is not supported")]
    UnsupportedVersion(String),

    /// The PDF object structure could not be loaded.
    #[error("malformed PDF: {0}")]
    PdfParse(String),

    /// The PDF is encrypted and could not be opened.
    #[error("PDF is encrypted")]
    Encrypted,

    /// A page number past the end of the document.
    #[error("page {0} does not exist ({1} pages)")]
    PageOutOfRange(u32, u32),

    /// A single page could not be decoded. Recoverable: the rest of the
    /// document is still converted.
    #[error("page {page}: {message}")]
    Extraction {
        /// 1-based page number
        page: u32,
        /// What went wrong
        message: String,
    },

    /// The assembled document model is inconsistent.
    #[error("inconsistent document: {0}")]
    Model(String),

    /// Writing one of the output files failed.
    #[error("cannot write {}: {source}", path.display())]
    Write {
        /// Output file that could not be written
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Anything else, with a message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an extraction error for a 1-based page number.
    pub fn extraction(page: u32, message: impl Into<String>) -> Self {
        Error::Extraction {
            page,
            message: message.into(),
        }
    }

    /// Whether the error only affects a single page.
    pub fn is_page_local(&self) -> bool {
        matches!(self, Error::Extraction { .. })
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Encrypted;
        assert_eq!(err.to_string(), "PDF is encrypted");

        let err = Error::extraction(3, "bad content stream");
        assert_eq!(
            err.to_string(),
            "page 3: bad content stream"
        );

        let err = Error::Write {
            path: PathBuf::from("out/a.md"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.to_string(), "cannot write out/a.md: denied");
    }

    #[test]
    fn test_page_local() {
        assert!(Error::extraction(1, "x").is_page_local());
        assert!(!Error::Model("gap".into()).is_page_local());
        assert!(!Error::Encrypted.is_page_local());
    }

    #[test]
    fn test_missing_input_is_io() {
        let err: Error = io::Error::new(io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(err.to_string(), "cannot read input: gone");
    }
}
