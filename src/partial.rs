use std::borrow::Borrow;

use crate::component::{Component, Expression, Operator, Varspec};
use crate::error::ExpansionError;
use crate::expand::{make_push_sep, render_varspec, ExpandContext};
use crate::value::{Value, Variables};

/// Expand what resolves, keep the rest as residual expressions that a later
/// expansion can fill in.
pub(crate) fn expand_partial_components<'a, V, B>(
    components: &[Component],
    variables: &'a V,
    ctx: &ExpandContext,
) -> Result<String, ExpansionError>
where
    V: Variables<'a, B>,
    B: Borrow<Value>,
{
    let mut dst = String::new();
    for component in components {
        match component {
            Component::Literal(literal) => dst.push_str(&literal.text),
            Component::Expression(expression) => {
                expand_partial_expression(&mut dst, expression, variables, ctx)?
            }
        }
    }
    Ok(dst)
}

fn expand_partial_expression<'a, V, B>(
    dst: &mut String,
    expression: &Expression,
    variables: &'a V,
    ctx: &ExpandContext,
) -> Result<(), ExpansionError>
where
    V: Variables<'a, B>,
    B: Borrow<Value>,
{
    let table = expression.operator.table();
    let mut push_sep = make_push_sep(table.first, table.sep);
    let mut unresolved: Vec<&Varspec> = Vec::new();
    let start = dst.len();
    for varspec in &expression.variable_list {
        match variables.get(&varspec.varname) {
            Some(value) => {
                render_varspec(dst, table, &mut push_sep, varspec, value.borrow(), ctx)?
            }
            None => unresolved.push(varspec),
        }
    }
    if unresolved.is_empty() {
        return Ok(());
    }
    // Resolved variables came out first, in declaration order among
    // themselves. Once real output has consumed a query's '?', the residual
    // switches to '&' so a later expansion appends instead of re-prefixing.
    let consumed_prefix = dst.len() > start;
    let residual_operator = if consumed_prefix && expression.operator == Operator::FormQuery {
        "&"
    } else {
        expression.operator.syntax()
    };
    dst.push('{');
    dst.push_str(residual_operator);
    for (i, varspec) in unresolved.iter().enumerate() {
        if i > 0 {
            dst.push(',');
        }
        dst.push_str(&varspec.raw);
    }
    dst.push('}');
    Ok(())
}
