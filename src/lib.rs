//! RFC6570 URI Templates: parse once, expand (fully or partially) against
//! caller-supplied bindings, and reverse-match concrete URIs back into
//! bindings.

mod component;
mod encoding;
mod error;
mod expand;
mod explode;
mod matching;
mod partial;
mod scan;
mod value;

use std::borrow::Borrow;
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use once_cell::sync::OnceCell;

use crate::expand::ExpandContext;
use crate::matching::CompiledPattern;

pub use crate::component::{Component, Expression, Literal, Modifier, Operator, Varspec};
pub use crate::error::{
    ExpansionError, ExpressionParseError, MalformedTemplateError, ParseError,
};
pub use crate::explode::{Explodable, FieldMap};
pub use crate::matching::{match_first, Bindings};
pub use crate::value::{Value, Variables};

/// A parsed template. Immutable after construction; share it freely across
/// threads and reuse it for any number of expansions and matches. The
/// reverse-match pattern is compiled on first use and cached.
#[derive(Clone, Debug)]
pub struct UriTemplate {
    source: String,
    components: Vec<Component>,
    pattern: OnceCell<Option<CompiledPattern>>,
}

impl PartialEq for UriTemplate {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for UriTemplate {}

impl UriTemplate {
    pub fn parse<S>(template: S) -> Result<Self, ParseError>
    where
        S: AsRef<str>,
    {
        let template = template.as_ref();
        let components = scan::scan(template)?;
        tracing::trace!(template, components = components.len(), "parsed uri template");
        Ok(UriTemplate {
            source: template.to_string(),
            components,
            pattern: OnceCell::new(),
        })
    }

    /// The original template string.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// Distinct variable names in first-appearance order.
    pub fn variable_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for component in &self.components {
            if let Component::Expression(expression) = component {
                for varspec in &expression.variable_list {
                    if !names.contains(&varspec.varname.as_str()) {
                        names.push(&varspec.varname);
                    }
                }
            }
        }
        names
    }

    /// Expand every expression; absent variables contribute nothing.
    pub fn expand<'a, V, B>(&self, variables: &'a V) -> Result<String, ExpansionError>
    where
        V: Variables<'a, B>,
        B: Borrow<Value>,
    {
        expand::expand_components(&self.components, variables, &ExpandContext::default())
    }

    /// Expand what resolves; unresolved variables survive as residual
    /// expressions that a later expansion of the result can fill in.
    pub fn expand_partial<'a, V, B>(&self, variables: &'a V) -> Result<String, ExpansionError>
    where
        V: Variables<'a, B>,
        B: Borrow<Value>,
    {
        partial::expand_partial_components(&self.components, variables, &ExpandContext::default())
    }

    /// Builder-style expansion against values accumulated on the expander.
    pub fn expander(&self) -> Expander {
        Expander {
            uri_template: self,
            variables: HashMap::new(),
            date_format: None,
        }
    }

    /// Match a concrete URI against this template's full pattern and return
    /// the percent-decoded bindings.
    pub fn captures(&self, uri: &str) -> Option<Bindings> {
        let pattern = self.pattern.get_or_init(|| {
            match matching::compile(&self.components) {
                Ok(pattern) => Some(pattern),
                Err(error) => {
                    tracing::warn!(%error, template = %self.source, "match pattern failed to compile");
                    None
                }
            }
        });
        pattern.as_ref()?.captures(uri)
    }
}

/// Accumulates variable bindings for one template and expands on demand.
#[derive(Debug)]
pub struct Expander<'a> {
    uri_template: &'a UriTemplate,
    variables: HashMap<String, Value>,
    date_format: Option<String>,
}

impl Expander<'_> {
    pub fn expand(&self) -> Result<String, ExpansionError> {
        expand::expand_components(&self.uri_template.components, &self.variables, &self.context())
    }

    pub fn expand_partial(&self) -> Result<String, ExpansionError> {
        partial::expand_partial_components(
            &self.uri_template.components,
            &self.variables,
            &self.context(),
        )
    }

    fn context(&self) -> ExpandContext {
        match &self.date_format {
            Some(format) => ExpandContext {
                date_format: format.as_str(),
            },
            None => ExpandContext::default(),
        }
    }

    /// Override the format timestamps render with, `chrono` syntax.
    pub fn date_format<S>(&mut self, format: S) -> &mut Self
    where
        S: Into<String>,
    {
        self.date_format = Some(format.into());
        self
    }

    pub fn set_assoc<K1, V1, K2, V2>(&mut self, k1: K1, iter: V1) -> &mut Self
    where
        K1: Into<String>,
        V1: IntoIterator<Item = (K2, V2)>,
        K2: Into<String>,
        V2: Into<String>,
    {
        self.variables.insert(k1.into(), Value::from_assoc(iter));
        self
    }

    pub fn set_list<K1, V1, V2>(&mut self, k: K1, iter: V1) -> &mut Self
    where
        K1: Into<String>,
        V1: IntoIterator<Item = V2>,
        V2: Into<String>,
    {
        self.variables.insert(k.into(), Value::from_list(iter));
        self
    }

    pub fn set_string<K, V>(&mut self, k: K, v: V) -> &mut Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.variables.insert(k.into(), Value::from_string(v));
        self
    }

    pub fn set_null<K>(&mut self, k: K) -> &mut Self
    where
        K: Into<String>,
    {
        self.variables.insert(k.into(), Value::Null);
        self
    }

    pub fn set_timestamp<K>(&mut self, k: K, ts: DateTime<Utc>) -> &mut Self
    where
        K: Into<String>,
    {
        self.variables.insert(k.into(), Value::from_timestamp(ts));
        self
    }

    pub fn set_explodable<K, E>(&mut self, k: K, explodable: &E) -> &mut Self
    where
        K: Into<String>,
        E: Explodable + ?Sized,
    {
        self.variables
            .insert(k.into(), Value::from_explodable(explodable));
        self
    }
}
