use crate::component::{Component, Expression, Literal, Modifier, Operator, Varspec};
use crate::error::{ExpressionParseError, MalformedTemplateError, ParseError};

#[derive(Clone, Copy)]
enum ScanState {
    InLiteral { start: usize },
    InExpression { open: usize },
}

/// Split a template into literal and expression components. Atomic: either
/// every component parses or the first failure is returned with its offset.
pub(crate) fn scan(source: &str) -> Result<Vec<Component>, ParseError> {
    let mut components = Vec::new();
    let mut state = ScanState::InLiteral { start: 0 };
    for (i, c) in source.char_indices() {
        state = match (state, c) {
            (ScanState::InLiteral { start }, '{') => {
                if start < i {
                    components.push(Component::Literal(Literal {
                        text: source[start..i].to_string(),
                        offset: start,
                    }));
                }
                ScanState::InExpression { open: i }
            }
            (ScanState::InLiteral { .. }, '}') => {
                return Err(MalformedTemplateError::UnmatchedClose { position: i }.into());
            }
            (state @ ScanState::InLiteral { .. }, _) => state,
            (ScanState::InExpression { open }, '}') => {
                components.push(Component::Expression(parse_expression(source, open, i)?));
                ScanState::InLiteral { start: i + 1 }
            }
            (ScanState::InExpression { .. }, '{') => {
                return Err(MalformedTemplateError::NestedOpen { position: i }.into());
            }
            (state @ ScanState::InExpression { .. }, _) => state,
        };
    }
    match state {
        ScanState::InLiteral { start } => {
            if start < source.len() {
                components.push(Component::Literal(Literal {
                    text: source[start..].to_string(),
                    offset: start,
                }));
            }
        }
        ScanState::InExpression { open } => {
            return Err(MalformedTemplateError::UnterminatedExpression { position: open }.into());
        }
    }
    Ok(components)
}

/// Parse the body of the expression spanning `source[open..=close]`, where
/// `open` and `close` are the offsets of the braces.
fn parse_expression(
    source: &str,
    open: usize,
    close: usize,
) -> Result<Expression, ExpressionParseError> {
    let body = &source[open + 1..close];
    let mut cursor = open + 1;
    let mut rest = body;
    let operator = match body.chars().next() {
        Some(c) if matches!(c, '=' | '!' | '@' | '|') => {
            return Err(ExpressionParseError::ReservedOperator {
                operator: c,
                position: cursor,
            });
        }
        Some(c) => match Operator::from_prefix(c) {
            Some(operator) => {
                cursor += c.len_utf8();
                rest = &body[c.len_utf8()..];
                operator
            }
            None => Operator::Simple,
        },
        None => Operator::Simple,
    };
    let mut variable_list = Vec::new();
    for token in rest.split(',') {
        variable_list.push(parse_varspec(token, cursor)?);
        cursor += token.len() + 1;
    }
    Ok(Expression {
        operator,
        variable_list,
        raw: source[open..=close].to_string(),
        offset: open,
    })
}

fn parse_varspec(token: &str, offset: usize) -> Result<Varspec, ExpressionParseError> {
    if token.is_empty() {
        return Err(ExpressionParseError::EmptyVarspec { position: offset });
    }
    let mut name = token;
    let mut modifier = Modifier::None;
    if let Some(stripped) = name.strip_suffix('*') {
        modifier = Modifier::Explode;
        name = stripped;
    }
    if let Some(colon) = name.rfind(':') {
        let digits = &name[colon + 1..];
        if digits.bytes().all(|b| b.is_ascii_digit()) {
            if digits.is_empty() || digits.len() > 4 {
                return Err(ExpressionParseError::PrefixLength { position: offset });
            }
            // at most 4 digits, cannot overflow
            let size: usize = digits.parse().unwrap_or(0);
            if size == 0 {
                return Err(ExpressionParseError::PrefixLength { position: offset });
            }
            if modifier == Modifier::Explode {
                return Err(ExpressionParseError::ConflictingModifiers { position: offset });
            }
            modifier = Modifier::Prefix(size);
            name = &name[..colon];
        }
    }
    if name.ends_with('*') {
        return Err(ExpressionParseError::ConflictingModifiers { position: offset });
    }
    if name.is_empty() {
        return Err(ExpressionParseError::EmptyVarspec { position: offset });
    }
    Ok(Varspec {
        varname: name.to_string(),
        modifier,
        raw: token.to_string(),
        offset,
    })
}
