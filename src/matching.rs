//! Reverse matching: lower a template to an anchored regex with one capture
//! group per distinct variable, and recover percent-decoded bindings from a
//! concrete URI.

use std::collections::HashMap;
use std::fmt::Write as _;

use regex::Regex;

use crate::component::{Component, Modifier};
use crate::encoding::{self, Allow};
use crate::UriTemplate;

/// Bindings recovered from a matched URI, keyed by variable name, values
/// percent-decoded.
pub type Bindings = HashMap<String, String>;

#[derive(Clone, Debug)]
pub(crate) struct CompiledPattern {
    regex: Regex,
    /// Synthesized group name -> template variable name. Variable names may
    /// contain characters (dots, percent triplets) that are not legal regex
    /// group names, so groups are numbered and mapped back here.
    groups: Vec<(String, String)>,
}

pub(crate) fn compile(components: &[Component]) -> Result<CompiledPattern, regex::Error> {
    let mut pattern = String::from("^");
    let mut groups: Vec<(String, String)> = Vec::new();
    for component in components {
        match component {
            Component::Literal(literal) => pattern.push_str(&regex::escape(&literal.text)),
            Component::Expression(expression) => {
                let table = expression.operator.table();
                pattern.push_str(&regex::escape(table.first));
                for (i, varspec) in expression.variable_list.iter().enumerate() {
                    if i > 0 {
                        pattern.push_str(&regex::escape(table.sep));
                    }
                    if table.named {
                        pattern.push_str(&regex::escape(&varspec.varname));
                        pattern.push('=');
                    }
                    let class = char_class(table.allow);
                    let already_captured = groups.iter().any(|(_, v)| v == &varspec.varname);
                    if already_captured {
                        // one capture per distinct variable; repeats only match
                        pattern.push_str(&class);
                    } else {
                        let group = format!("v{}", groups.len());
                        let _ = write!(pattern, "(?P<{}>{}", group, class);
                        groups.push((group, varspec.varname.clone()));
                    }
                    match varspec.modifier {
                        Modifier::Prefix(n) => {
                            let _ = write!(pattern, "{{0,{}}}", n);
                        }
                        _ => pattern.push('*'),
                    }
                    if !already_captured {
                        pattern.push(')');
                    }
                }
            }
        }
    }
    pattern.push('$');
    let regex = Regex::new(&pattern)?;
    tracing::debug!(pattern = %pattern, "compiled match pattern");
    Ok(CompiledPattern { regex, groups })
}

impl CompiledPattern {
    pub(crate) fn captures(&self, uri: &str) -> Option<Bindings> {
        let caps = self.regex.captures(uri)?;
        let mut bindings = Bindings::with_capacity(self.groups.len());
        for (group, varname) in &self.groups {
            if let Some(m) = caps.name(group) {
                bindings.insert(varname.clone(), encoding::decode(m.as_str()));
            }
        }
        Some(bindings)
    }
}

/// The character class a variable may match under an encoding mode: the
/// mode's allowed bytes, plus `%` for encoded triplets, plus `,` because
/// non-explode composites join with commas under every operator.
fn char_class(allow: Allow) -> String {
    let mut class = String::from("[");
    for b in 0x21u8..=0x7E {
        if !encoding::is_allowed(b, allow) && b != b'%' && b != b',' {
            continue;
        }
        if matches!(b, b'[' | b']' | b'\\' | b'^' | b'-') {
            class.push('\\');
        }
        class.push(char::from(b));
    }
    class.push(']');
    class
}

/// Try `uri` against each template in caller order and return the bindings
/// of the first whose full pattern matches. No cross-template backtracking:
/// order candidates most-specific first.
pub fn match_first<'t, I>(templates: I, uri: &str) -> Option<Bindings>
where
    I: IntoIterator<Item = &'t UriTemplate>,
{
    for template in templates {
        if let Some(bindings) = template.captures(uri) {
            tracing::trace!(template = %template.source(), uri, "uri matched template");
            return Some(bindings);
        }
    }
    None
}
