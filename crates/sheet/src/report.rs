use crate::error::SheetError;
use std::cell::RefCell;

/// Sink for the status lines a [`Workbook`](crate::Workbook) produces.
///
/// Successful writes and column descriptions arrive as notices; the
/// conditions a handler absorbs (missing file, missing sheet, refused
/// access) arrive as problems.
pub trait Report {
    fn notice(&self, message: &str);
    fn problem(&self, error: &SheetError);
}

/// Prints notices to stdout and problems to stderr
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleReport;

impl Report for ConsoleReport {
    fn notice(&self, message: &str) {
        println!("{message}");
    }

    fn problem(&self, error: &SheetError) {
        eprintln!("{error}");
    }
}

/// Keeps every line in memory, for callers that render output themselves
#[derive(Debug, Default)]
pub struct RecordingReport {
    notices: RefCell<Vec<String>>,
    problems: RefCell<Vec<String>>,
}

impl RecordingReport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn notices(&self) -> Vec<String> {
        self.notices.borrow().clone()
    }

    #[must_use]
    pub fn problems(&self) -> Vec<String> {
        self.problems.borrow().clone()
    }
}

impl Report for RecordingReport {
    fn notice(&self, message: &str) {
        self.notices.borrow_mut().push(message.to_string());
    }

    fn problem(&self, error: &SheetError) {
        self.problems.borrow_mut().push(error.to_string());
    }
}

impl<R: Report + ?Sized> Report for &R {
    fn notice(&self, message: &str) {
        (**self).notice(message);
    }

    fn problem(&self, error: &SheetError) {
        (**self).problem(error);
    }
}
