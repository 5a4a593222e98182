use std::error::Error as StdError;
use std::fmt::{Display, Formatter};

/// Failure to read configuration input.
///
/// Malformed lines are never reported here; the parser skips them.
#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    InvalidEncoding {
        line: u32,
        source: std::str::Utf8Error,
    },
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "I/O error: {err}"),
            Self::InvalidEncoding { line, source } => {
                write!(f, "invalid UTF-8 input at line {line}: {source}")
            }
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::InvalidEncoding { source, .. } => Some(source),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_offending_line() {
        let source = std::str::from_utf8(&[0x66, 0x80]).expect_err("invalid UTF-8");
        let err = Error::InvalidEncoding { line: 7, source };
        assert!(err.to_string().starts_with("invalid UTF-8 input at line 7"));
        assert!(err.source().is_some());
    }

    #[test]
    fn io_errors_convert() {
        let err = Error::from(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(err.to_string(), "I/O error: gone");
    }
}
