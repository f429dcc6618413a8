use std::fmt;

/// Classification of a compile failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompileErrorKind {
    /// Unrecognized character in the input.
    Lex,
    /// Malformed expression grammar.
    Parse,
    /// Wrong number of function or constructor arguments.
    Arity,
    /// Incompatible scalar/vector shapes in an operator or function.
    Shape,
    /// Out-of-range (or scalar-target) component access.
    Swizzle,
    /// Identifier that is neither a named constant nor a bound input.
    UnknownIdentifier,
    /// Function name missing from the registry.
    UnknownFunction,
}

impl CompileErrorKind {
    fn as_str(self) -> &'static str {
        match self {
            Self::Lex => "lex error",
            Self::Parse => "parse error",
            Self::Arity => "arity error",
            Self::Shape => "shape error",
            Self::Swizzle => "swizzle error",
            Self::UnknownIdentifier => "unknown identifier",
            Self::UnknownFunction => "unknown function",
        }
    }
}

/// A compile-time expression error with source-offset context.
///
/// Offsets are byte positions into the template's rendered text (fragments
/// joined with `{i}` placeholder markers, see [`crate::Template`]).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompileError {
    kind: CompileErrorKind,
    offset: usize,
    message: String,
}

impl CompileError {
    pub(crate) fn new(kind: CompileErrorKind, offset: usize, message: impl Into<String>) -> Self {
        Self {
            kind,
            offset,
            message: message.into(),
        }
    }

    pub(crate) fn lex(offset: usize, message: impl Into<String>) -> Self {
        Self::new(CompileErrorKind::Lex, offset, message)
    }

    pub(crate) fn parse(offset: usize, message: impl Into<String>) -> Self {
        Self::new(CompileErrorKind::Parse, offset, message)
    }

    pub(crate) fn arity(offset: usize, message: impl Into<String>) -> Self {
        Self::new(CompileErrorKind::Arity, offset, message)
    }

    pub(crate) fn shape(offset: usize, message: impl Into<String>) -> Self {
        Self::new(CompileErrorKind::Shape, offset, message)
    }

    pub(crate) fn swizzle(offset: usize, message: impl Into<String>) -> Self {
        Self::new(CompileErrorKind::Swizzle, offset, message)
    }

    pub(crate) fn unknown_identifier(offset: usize, message: impl Into<String>) -> Self {
        Self::new(CompileErrorKind::UnknownIdentifier, offset, message)
    }

    pub(crate) fn unknown_function(offset: usize, message: impl Into<String>) -> Self {
        Self::new(CompileErrorKind::UnknownFunction, offset, message)
    }

    /// The failure classification.
    pub fn kind(&self) -> CompileErrorKind {
        self.kind
    }

    /// Byte offset of the offending token in the rendered template text.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Human-readable detail message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at byte {}: {}",
            self.kind.as_str(),
            self.offset,
            self.message
        )
    }
}

impl std::error::Error for CompileError {}
