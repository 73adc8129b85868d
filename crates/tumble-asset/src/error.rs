use std::fmt;
use std::io;
use std::path::PathBuf;

/// A syntax error in a model text file.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
    /// 1-based source line number where the error occurred.
    pub line: usize,
    /// 1-based source column number where the error occurred.
    pub col: usize,
}

impl ParseError {
    pub(crate) fn new(msg: impl Into<String>, line: usize, col: usize) -> Self {
        Self { message: msg.into(), line, col }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "model parse error at {}:{}: {}", self.line, self.col, self.message)
    }
}

impl std::error::Error for ParseError {}

/// Failure to load a model from disk.
#[derive(Debug)]
pub enum ModelError {
    /// The file could not be read.
    Io { path: PathBuf, source: io::Error },
    /// The file was read but its contents are malformed.
    Parse { path: PathBuf, source: ParseError },
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::Io { path, source } => {
                write!(f, "failed to read model {}: {source}", path.display())
            }
            ModelError::Parse { path, source } => write!(f, "{}: {source}", path.display()),
        }
    }
}

impl std::error::Error for ModelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ModelError::Io { source, .. } => Some(source),
            ModelError::Parse { source, .. } => Some(source),
        }
    }
}

/// Image buffer does not match the declared dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PpmError {
    pub width: u32,
    pub height: u32,
    pub expected: usize,
    pub actual: usize,
}

impl fmt::Display for PpmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{} RGB image needs {} bytes, got {}",
            self.width, self.height, self.expected, self.actual
        )
    }
}

impl std::error::Error for PpmError {}
