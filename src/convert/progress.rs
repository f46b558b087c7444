//! Progress notifications during conversion.

use super::ConversionReport;
use crate::error::Error;

/// Receives progress events while documents are converted.
///
/// All methods default to doing nothing. Implementations must be `Sync`
/// because batch conversion may run documents on several threads.
pub trait ConvertObserver: Sync {
    /// A document was opened.
    fn on_document_start(&self, _source: &str, _page_count: u32) {}

    /// A page finished (successfully or not).
    fn on_page_done(&self, _source: &str, _page: u32, _total: u32) {}

    /// A document finished.
    fn on_document_finished(&self, _source: &str, _result: Result<&ConversionReport, &Error>) {}
}

/// Observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ConvertObserver for NoopObserver {}
