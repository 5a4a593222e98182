use std::path::PathBuf;

/// A `KEY=VALUE` assignment extracted from configuration text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub key: String,
    /// May contain embedded newlines when produced by a multi-line block.
    pub value: String,
    pub source: Option<PathBuf>,
    /// 1-based line on which the assignment started.
    pub line: u32,
}

impl Entry {
    pub(crate) fn new(key: impl Into<String>, value: impl Into<String>, line: u32) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            source: None,
            line,
        }
    }
}

/// Summary of the load operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadReport {
    pub loaded: usize,
    pub files_read: usize,
}
