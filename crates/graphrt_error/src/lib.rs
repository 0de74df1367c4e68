use std::error::Error;
use std::fmt;

pub type Result<T, E = GraphError> = std::result::Result<T, E>;

/// Return early with a "not implemented" error.
#[macro_export]
macro_rules! not_implemented {
    ($($arg:tt)+) => {{
        let msg = format!($($arg)+);
        return Err($crate::GraphError::new(format!("Not yet implemented: {msg}")));
    }};
}

/// Error returned for recoverable failures.
///
/// Invariant violations (malformed plans, builder misuse) are not represented
/// here. Those panic.
#[derive(Debug)]
pub struct GraphError {
    inner: Box<GraphErrorInner>,
}

#[derive(Debug)]
struct GraphErrorInner {
    msg: String,
    source: Option<Box<dyn Error + Send + Sync>>,
}

impl GraphError {
    pub fn new(msg: impl Into<String>) -> Self {
        GraphError {
            inner: Box::new(GraphErrorInner {
                msg: msg.into(),
                source: None,
            }),
        }
    }

    pub fn with_source(msg: impl Into<String>, source: Box<dyn Error + Send + Sync>) -> Self {
        GraphError {
            inner: Box::new(GraphErrorInner {
                msg: msg.into(),
                source: Some(source),
            }),
        }
    }

    pub fn get_msg(&self) -> &str {
        self.inner.msg.as_str()
    }
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner.msg)?;
        if let Some(source) = &self.inner.source {
            write!(f, " ({source})")?;
        }
        Ok(())
    }
}

impl Error for GraphError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.inner.source.as_ref().map(|e| e.as_ref() as _)
    }
}

/// Attach a message to a foreign error, converting it into a `GraphError`.
pub trait ResultExt<T, E> {
    fn context(self, msg: &'static str) -> Result<T>;

    fn context_fn<F: Fn() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Error + Send + Sync + 'static> ResultExt<T, E> for std::result::Result<T, E> {
    fn context(self, msg: &'static str) -> Result<T> {
        self.map_err(|e| GraphError::with_source(msg, Box::new(e)))
    }

    fn context_fn<F: Fn() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| GraphError::with_source(f(), Box::new(e)))
    }
}

pub trait OptionExt<T> {
    /// Error with a "missing" message if the option is None.
    fn required(self, msg: &'static str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn required(self, msg: &'static str) -> Result<T> {
        match self {
            Some(v) => Ok(v),
            None => Err(GraphError::new(format!("Missing {msg}"))),
        }
    }
}
