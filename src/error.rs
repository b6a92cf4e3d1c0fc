use thiserror::Error;

/// Any failure raised while turning a template string into a `UriTemplate`.
///
/// Parsing is atomic: on error no template is produced and the position
/// points at the offending byte offset in the original string.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum ParseError {
    #[error(transparent)]
    Malformed(#[from] MalformedTemplateError),
    #[error(transparent)]
    Expression(#[from] ExpressionParseError),
}

impl ParseError {
    /// Byte offset into the template string where the failure was detected.
    pub fn position(&self) -> usize {
        match self {
            ParseError::Malformed(e) => e.position(),
            ParseError::Expression(e) => e.position(),
        }
    }
}

/// Structural scan failures: braces that do not pair up.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum MalformedTemplateError {
    #[error("expression opened at offset {position} is never closed")]
    UnterminatedExpression { position: usize },
    #[error("'}}' at offset {position} has no matching '{{'")]
    UnmatchedClose { position: usize },
    #[error("'{{' at offset {position} opens an expression inside another expression")]
    NestedOpen { position: usize },
}

impl MalformedTemplateError {
    pub fn position(&self) -> usize {
        match *self {
            MalformedTemplateError::UnterminatedExpression { position }
            | MalformedTemplateError::UnmatchedClose { position }
            | MalformedTemplateError::NestedOpen { position } => position,
        }
    }
}

/// Failures inside a brace-delimited expression body.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum ExpressionParseError {
    #[error("operator '{operator}' at offset {position} is reserved for future extensions")]
    ReservedOperator { operator: char, position: usize },
    #[error("empty variable name at offset {position}")]
    EmptyVarspec { position: usize },
    #[error("prefix length at offset {position} must be between 1 and 9999")]
    PrefixLength { position: usize },
    #[error("variable at offset {position} combines prefix and explode modifiers")]
    ConflictingModifiers { position: usize },
}

impl ExpressionParseError {
    pub fn position(&self) -> usize {
        match *self {
            ExpressionParseError::ReservedOperator { position, .. }
            | ExpressionParseError::EmptyVarspec { position }
            | ExpressionParseError::PrefixLength { position }
            | ExpressionParseError::ConflictingModifiers { position } => position,
        }
    }
}

/// Failures raised while expanding a variable against a bound value.
///
/// Expansion is pure; callers may correct the bindings and retry.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum ExpansionError {
    #[error("prefix modifier cannot be applied to composite variable \"{name}\"")]
    PrefixOnComposite { name: String },
    #[error("variable \"{name}\" nests a composite value inside another composite")]
    NestedComposite { name: String },
}
