use std::error::Error as StdError;
use std::fmt;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    Internal,
    Usage,
    /// Signature text is not a structurally valid, complete type signature.
    Signature,
    /// Value text does not match the literal grammar of the current basic type.
    Literal,
    /// Container delimiters are missing or misplaced.
    Structural,
    /// Syntactically valid text failed a post-hoc check (object path, embedded signature).
    Semantic,
    Io,
}

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    message: Option<String>,
    hint: Option<String>,
    signature_offset: Option<usize>,
    text_offset: Option<usize>,
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            hint: None,
            signature_offset: None,
            text_offset: None,
            source: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    pub fn signature_offset(&self) -> Option<usize> {
        self.signature_offset
    }

    pub fn text_offset(&self) -> Option<usize> {
        self.text_offset
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_signature_offset(mut self, offset: usize) -> Self {
        self.signature_offset = Some(offset);
        self
    }

    pub fn with_text_offset(mut self, offset: usize) -> Self {
        self.text_offset = Some(offset);
        self
    }

    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Shift recorded offsets by the position of a nested parse inside its parent.
    pub(crate) fn shifted(mut self, signature_base: usize, text_base: usize) -> Self {
        self.signature_offset = Some(self.signature_offset.unwrap_or(0) + signature_base);
        self.text_offset = Some(self.text_offset.unwrap_or(0) + text_base);
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.kind)?;
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        if let Some(offset) = self.signature_offset {
            write!(f, " (signature offset: {offset})")?;
        }
        if let Some(offset) = self.text_offset {
            write!(f, " (text offset: {offset})")?;
        }
        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn StdError + 'static))
    }
}

pub fn to_exit_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::Internal => 1,
        ErrorKind::Usage => 2,
        ErrorKind::Signature => 3,
        ErrorKind::Literal => 4,
        ErrorKind::Structural => 5,
        ErrorKind::Semantic => 6,
        ErrorKind::Io => 7,
    }
}
