use std::error::Error;
use std::fmt;
use std::io::Error as IOError;

use thiserror::Error as ThisError;

/// Error when rendering data on a template.
///
/// Position information is back-filled by the block evaluator: a failure
/// deep in a pipe chain surfaces with the offending expression's source
/// text and the directive's byte offset in the template.
#[derive(Debug)]
pub struct RenderError {
    pub desc: String,
    pub expression: Option<String>,
    pub offset: Option<usize>,
    cause: Option<Box<dyn Error + Send + Sync>>,
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match (self.expression.as_ref(), self.offset) {
            (Some(expr), Some(offset)) => write!(
                f,
                "Error rendering \"{}\" at offset {}: {}",
                expr, offset, self.desc
            ),
            (Some(expr), None) => write!(f, "Error rendering \"{}\": {}", expr, self.desc),
            _ => write!(f, "{}", self.desc),
        }
    }
}

impl Error for RenderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.cause.as_ref().map(|e| &**e as &(dyn Error + 'static))
    }
}

impl From<IOError> for RenderError {
    fn from(e: IOError) -> RenderError {
        RenderError::with(e)
    }
}

impl RenderError {
    pub fn new<T: AsRef<str>>(desc: T) -> RenderError {
        RenderError {
            desc: desc.as_ref().to_owned(),
            expression: None,
            offset: None,
            cause: None,
        }
    }

    pub fn with<E>(cause: E) -> RenderError
    where
        E: Error + Send + Sync + 'static,
    {
        let mut e = RenderError::new(cause.to_string());
        e.cause = Some(Box::new(cause));
        e
    }

    /// Attach the expression source and template offset, unless a more
    /// precise location was recorded further down the call chain.
    pub(crate) fn at(mut self, expression: &str, offset: usize) -> RenderError {
        if self.expression.is_none() {
            self.expression = Some(expression.to_owned());
        }
        if self.offset.is_none() {
            self.offset = Some(offset);
        }
        self
    }
}

/// Template parsing error
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum TemplateErrorReason {
    #[error("directive {0:?} was opened, but {1:?} is closing")]
    MismatchedCloser(String, String),
    #[error("directive {0:?} was not closed on the end of file")]
    Unclosed(String),
    #[error("closer {0:?} has no matching opened directive")]
    StrayCloser(String),
    #[error("{0:?} outside of an if chain")]
    DanglingElse(String),
    #[error("invalid loop header {0:?}, expected \"<var> in <collection>\"")]
    InvalidLoopHeader(String),
    #[error("nesting deeper than {0} levels")]
    TooDeep(usize),
}

/// Error on parsing a template, with the offending directive's position.
#[derive(Debug, PartialEq, Eq)]
pub struct TemplateError {
    pub reason: TemplateErrorReason,
    pub offset: Option<usize>,
    pub line_no: Option<usize>,
    pub column_no: Option<usize>,
}

impl TemplateError {
    pub fn of(e: TemplateErrorReason) -> TemplateError {
        TemplateError {
            reason: e,
            offset: None,
            line_no: None,
            column_no: None,
        }
    }

    pub fn at(mut self, source: &str, offset: usize) -> TemplateError {
        let (line, col) = crate::support::str::line_col(source, offset);
        self.offset = Some(offset);
        self.line_no = Some(line);
        self.column_no = Some(col);
        self
    }
}

impl Error for TemplateError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.reason)
    }
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match (self.line_no, self.column_no) {
            (Some(line), Some(col)) => {
                write!(f, "Template error at line {}, col {}: {}", line, col, self.reason)
            }
            _ => write!(f, "{}", self.reason),
        }
    }
}

/// Error of the one-shot compile-and-render entry point.
#[derive(Debug, ThisError)]
pub enum TemplateRenderError {
    #[error(transparent)]
    TemplateError(#[from] TemplateError),
    #[error(transparent)]
    RenderError(#[from] RenderError),
}
