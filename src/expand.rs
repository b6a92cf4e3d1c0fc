use std::borrow::{Borrow, Cow};

use crate::component::{Component, Expression, Modifier, OperatorTable, Varspec};
use crate::encoding::{push_allowed, push_unreserved};
use crate::error::ExpansionError;
use crate::value::{Value, Variables};

/// ISO-8601 with milliseconds and a numeric offset, e.g.
/// `2026-03-01T12:30:05.000+0000`.
pub(crate) const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%z";

pub(crate) struct ExpandContext<'a> {
    pub date_format: &'a str,
}

impl Default for ExpandContext<'_> {
    fn default() -> Self {
        ExpandContext {
            date_format: DEFAULT_DATE_FORMAT,
        }
    }
}

pub(crate) fn expand_components<'a, V, B>(
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
                expand_expression(&mut dst, expression, variables, ctx)?
            }
        }
    }
    Ok(dst)
}

fn expand_expression<'a, V, B>(
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
    for varspec in &expression.variable_list {
        if let Some(value) = variables.get(&varspec.varname) {
            render_varspec(dst, table, &mut push_sep, varspec, value.borrow(), ctx)?;
        }
    }
    Ok(())
}

/// Emits the operator prefix on first use, the separator afterwards.
pub(crate) fn make_push_sep(
    first: &'static str,
    sep: &'static str,
) -> impl FnMut(&mut String) {
    let mut s = first;
    move |dst: &mut String| {
        dst.push_str(s);
        s = sep;
    }
}

/// Render one present variable, pushing the pending prefix/separator only if
/// the value produces output. Shared with partial expansion.
pub(crate) fn render_varspec<F>(
    dst: &mut String,
    table: &OperatorTable,
    push_sep: &mut F,
    varspec: &Varspec,
    value: &Value,
    ctx: &ExpandContext,
) -> Result<(), ExpansionError>
where
    F: FnMut(&mut String),
{
    if matches!(value, Value::List(_) | Value::Pairs(_))
        && matches!(varspec.modifier, Modifier::Prefix(_))
    {
        return Err(ExpansionError::PrefixOnComposite {
            name: varspec.varname.clone(),
        });
    }
    if varspec.modifier == Modifier::Explode {
        explode_varspec(dst, table, push_sep, varspec, value, ctx)
    } else {
        expand_varspec(dst, table, push_sep, varspec, value, ctx)
    }
}

fn expand_varspec<F>(
    dst: &mut String,
    table: &OperatorTable,
    push_sep: &mut F,
    varspec: &Varspec,
    value: &Value,
    ctx: &ExpandContext,
) -> Result<(), ExpansionError>
where
    F: FnMut(&mut String),
{
    match value {
        Value::Pairs(pairs) if !pairs.is_empty() => {
            push_sep(dst);
            push_name(dst, table, varspec, false);
            let mut pair_sep = make_push_sep("", ",");
            expand_pairs(dst, table, &mut pair_sep, ",", &varspec.varname, pairs, ctx)
        }
        Value::List(items) if !items.is_empty() => {
            push_sep(dst);
            push_name(dst, table, varspec, false);
            let mut item_sep = make_push_sep("", ",");
            expand_list(dst, table, &mut item_sep, &varspec.varname, items, ctx)
        }
        // empty composites are undefined
        Value::Pairs(_) | Value::List(_) => Ok(()),
        _ => {
            let text = element_text(&varspec.varname, value, ctx)?;
            push_sep(dst);
            let empty = text.is_empty();
            push_name(dst, table, varspec, empty);
            if !empty {
                push_allowed(dst, apply_prefix(&text, varspec.modifier), table.allow);
            }
            Ok(())
        }
    }
}

fn explode_varspec<F>(
    dst: &mut String,
    table: &OperatorTable,
    push_sep: &mut F,
    varspec: &Varspec,
    value: &Value,
    ctx: &ExpandContext,
) -> Result<(), ExpansionError>
where
    F: FnMut(&mut String),
{
    match value {
        Value::Pairs(pairs) if !pairs.is_empty() => {
            push_sep(dst);
            let mut pair_sep = make_push_sep("", table.sep);
            if table.named {
                explode_named_pairs(dst, table, &mut pair_sep, &varspec.varname, pairs, ctx)
            } else {
                expand_pairs(dst, table, &mut pair_sep, "=", &varspec.varname, pairs, ctx)
            }
        }
        Value::List(items) if !items.is_empty() => {
            push_sep(dst);
            let mut item_sep = make_push_sep("", table.sep);
            if table.named {
                explode_named_list(dst, table, &mut item_sep, &varspec.varname, items, ctx)
            } else {
                expand_list(dst, table, &mut item_sep, &varspec.varname, items, ctx)
            }
        }
        Value::Pairs(_) | Value::List(_) => Ok(()),
        // explode on a scalar behaves like plain expansion
        _ => expand_varspec(dst, table, push_sep, varspec, value, ctx),
    }
}

fn expand_pairs<F>(
    dst: &mut String,
    table: &OperatorTable,
    push_sep: &mut F,
    kv_sep: &str,
    varname: &str,
    pairs: &[(String, Value)],
    ctx: &ExpandContext,
) -> Result<(), ExpansionError>
where
    F: FnMut(&mut String),
{
    for (k, v) in pairs {
        let text = element_text(varname, v, ctx)?;
        push_sep(dst);
        push_allowed(dst, k, table.allow);
        dst.push_str(kv_sep);
        push_allowed(dst, &text, table.allow);
    }
    Ok(())
}

fn expand_list<F>(
    dst: &mut String,
    table: &OperatorTable,
    push_sep: &mut F,
    varname: &str,
    items: &[Value],
    ctx: &ExpandContext,
) -> Result<(), ExpansionError>
where
    F: FnMut(&mut String),
{
    for item in items {
        let text = element_text(varname, item, ctx)?;
        push_sep(dst);
        push_allowed(dst, &text, table.allow);
    }
    Ok(())
}

fn explode_named_pairs<F>(
    dst: &mut String,
    table: &OperatorTable,
    push_sep: &mut F,
    varname: &str,
    pairs: &[(String, Value)],
    ctx: &ExpandContext,
) -> Result<(), ExpansionError>
where
    F: FnMut(&mut String),
{
    for (k, v) in pairs {
        let text = element_text(varname, v, ctx)?;
        push_sep(dst);
        push_unreserved(dst, k);
        if text.is_empty() {
            dst.push_str(table.ifemp);
        } else {
            dst.push('=');
            push_allowed(dst, &text, table.allow);
        }
    }
    Ok(())
}

fn explode_named_list<F>(
    dst: &mut String,
    table: &OperatorTable,
    push_sep: &mut F,
    varname: &str,
    items: &[Value],
    ctx: &ExpandContext,
) -> Result<(), ExpansionError>
where
    F: FnMut(&mut String),
{
    for item in items {
        let text = element_text(varname, item, ctx)?;
        push_sep(dst);
        push_unreserved(dst, varname);
        if text.is_empty() {
            dst.push_str(table.ifemp);
        } else {
            dst.push('=');
            push_allowed(dst, &text, table.allow);
        }
    }
    Ok(())
}

fn push_name(dst: &mut String, table: &OperatorTable, varspec: &Varspec, empty: bool) {
    if table.named {
        push_unreserved(dst, &varspec.varname);
        if empty {
            dst.push_str(table.ifemp);
        } else {
            dst.push('=');
        }
    }
}

/// Textual form of a scalar-shaped element; composites are illegal here.
fn element_text<'v>(
    varname: &str,
    value: &'v Value,
    ctx: &ExpandContext,
) -> Result<Cow<'v, str>, ExpansionError> {
    match value {
        Value::Scalar(s) => Ok(Cow::Borrowed(s)),
        Value::Null => Ok(Cow::Borrowed("")),
        Value::Timestamp(ts) => Ok(Cow::Owned(ts.format(ctx.date_format).to_string())),
        Value::List(_) | Value::Pairs(_) => Err(ExpansionError::NestedComposite {
            name: varname.to_string(),
        }),
    }
}

/// Truncate to the first N characters of the unencoded text.
fn apply_prefix(text: &str, modifier: Modifier) -> &str {
    match modifier {
        Modifier::Prefix(n) => {
            let end = text
                .char_indices()
                .nth(n)
                .map(|(i, _)| i)
                .unwrap_or(text.len());
            &text[..end]
        }
        _ => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UriTemplate;
    use chrono::TimeZone;
    use chrono::Utc;
    use std::collections::HashMap;

    fn expand(template: &str, variables: &[(&str, Value)]) -> Result<String, ExpansionError> {
        let variables: Vec<(String, Value)> = variables
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        UriTemplate::parse(template).unwrap().expand(&variables)
    }

    #[test]
    fn test_apply_prefix_char_boundaries() {
        assert_eq!(apply_prefix("houses", Modifier::Prefix(3)), "hou");
        assert_eq!(apply_prefix("ab", Modifier::Prefix(5)), "ab");
        assert_eq!(apply_prefix("caf\u{e9}s", Modifier::Prefix(4)), "caf\u{e9}");
        assert_eq!(apply_prefix("x", Modifier::None), "x");
    }

    #[test]
    fn test_null_renders_as_empty_scalar() {
        assert_eq!(expand("x{y}z", &[("y", Value::Null)]).unwrap(), "xz");
        assert_eq!(expand("{?y}", &[("y", Value::Null)]).unwrap(), "?y=");
        assert_eq!(expand("{;y}", &[("y", Value::Null)]).unwrap(), ";y");
        assert_eq!(
            expand("{x,y}", &[("x", Value::Null), ("y", Value::from_string("Y"))]).unwrap(),
            ",Y"
        );
    }

    #[test]
    fn test_prefix_on_composite_is_an_error() {
        for value in [
            Value::from_list(["a", "b"]),
            Value::from_assoc([("k", "v")]),
            Value::List(vec![]),
        ] {
            assert_eq!(
                expand("{x:3}", &[("x", value)]),
                Err(ExpansionError::PrefixOnComposite {
                    name: "x".to_string()
                })
            );
        }
    }

    #[test]
    fn test_nested_composites_are_an_error() {
        let nested_list = Value::List(vec![Value::from_list(["a"])]);
        assert_eq!(
            expand("{x}", &[("x", nested_list)]),
            Err(ExpansionError::NestedComposite {
                name: "x".to_string()
            })
        );
        let nested_pairs = Value::Pairs(vec![("k".to_string(), Value::from_assoc([("a", "b")]))]);
        assert_eq!(
            expand("{?x*}", &[("x", nested_pairs)]),
            Err(ExpansionError::NestedComposite {
                name: "x".to_string()
            })
        );
    }

    #[test]
    fn test_timestamp_default_format() {
        let ts = Utc.with_ymd_and_hms(2026, 3, 1, 12, 30, 5).unwrap();
        assert_eq!(
            expand("{+when}", &[("when", Value::from_timestamp(ts))]).unwrap(),
            "2026-03-01T12:30:05.000+0000"
        );
        // reserved-safe escapes the colons and the offset sign
        assert_eq!(
            expand("{when}", &[("when", Value::from_timestamp(ts))]).unwrap(),
            "2026-03-01T12%3A30%3A05.000%2B0000"
        );
    }

    #[test]
    fn test_timestamp_custom_format() {
        let ts = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        let template = UriTemplate::parse("{?on}").unwrap();
        let left = template
            .expander()
            .date_format("%Y%m%d")
            .set_timestamp("on", ts)
            .expand()
            .unwrap();
        assert_eq!(left, "?on=20260301");
    }

    #[test]
    fn test_timestamp_inside_composites() {
        let ts = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        let list = Value::List(vec![Value::Scalar("a".to_string()), Value::Timestamp(ts)]);
        assert_eq!(
            expand("{+x}", &[("x", list)]).unwrap(),
            "a,2026-03-01T00:00:00.000+0000"
        );
    }

    #[test]
    fn test_expression_with_no_present_variable_renders_empty() {
        let variables: HashMap<String, Value> = HashMap::new();
        let template = UriTemplate::parse("a{?x,y}b").unwrap();
        assert_eq!(template.expand(&variables).unwrap(), "ab");
    }

    #[test]
    fn test_determinism() {
        let variables = vec![
            ("a".to_string(), Value::from_string("A")),
            ("b".to_string(), Value::from_list(["1", "2"])),
        ];
        let template = UriTemplate::parse("{/a,b*}").unwrap();
        let first = template.expand(&variables).unwrap();
        let second = template.expand(&variables).unwrap();
        assert_eq!(first, second);
    }
}
