use crate::encoding::Allow;

/// One parsed piece of a template, in source order. Component offsets
/// partition the original string exactly.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Component {
    Literal(Literal),
    Expression(Expression),
}

/// A literal run, emitted verbatim and never processed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Literal {
    pub text: String,
    pub offset: usize,
}

/// A brace-delimited group of varspecs sharing one operator.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Expression {
    pub operator: Operator,
    /// Always non-empty.
    pub variable_list: Vec<Varspec>,
    /// Source text including the braces.
    pub raw: String,
    pub offset: usize,
}

/// One variable reference plus its modifier inside an expression.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Varspec {
    pub varname: String,
    pub modifier: Modifier,
    /// The raw token, modifier suffix included.
    pub raw: String,
    pub offset: usize,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Modifier {
    None,
    /// Truncate the unencoded value to its first N characters, 1..=9999.
    Prefix(usize),
    Explode,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Operator {
    Simple,
    Reserved,
    Fragment,
    Label,
    PathSegment,
    PathParameter,
    FormQuery,
    FormContinuation,
}

/// Per-operator rendering rules: leading prefix, inter-variable separator,
/// whether values render as `name=value` pairs, what an empty value renders
/// after the name, and the encoding allow-list.
pub(crate) struct OperatorTable {
    pub first: &'static str,
    pub sep: &'static str,
    pub named: bool,
    pub ifemp: &'static str,
    pub allow: Allow,
}

const SIMPLE: OperatorTable = OperatorTable {
    first: "",
    sep: ",",
    named: false,
    ifemp: "",
    allow: Allow::Unreserved,
};

const RESERVED: OperatorTable = OperatorTable {
    first: "",
    sep: ",",
    named: false,
    ifemp: "",
    allow: Allow::UnreservedReserved,
};

const FRAGMENT: OperatorTable = OperatorTable {
    first: "#",
    sep: ",",
    named: false,
    ifemp: "",
    allow: Allow::UnreservedReserved,
};

const LABEL: OperatorTable = OperatorTable {
    first: ".",
    sep: ".",
    named: false,
    ifemp: "",
    allow: Allow::Unreserved,
};

const PATH_SEGMENT: OperatorTable = OperatorTable {
    first: "/",
    sep: "/",
    named: false,
    ifemp: "",
    allow: Allow::Unreserved,
};

const PATH_PARAMETER: OperatorTable = OperatorTable {
    first: ";",
    sep: ";",
    named: true,
    ifemp: "",
    allow: Allow::Unreserved,
};

const FORM_QUERY: OperatorTable = OperatorTable {
    first: "?",
    sep: "&",
    named: true,
    ifemp: "=",
    allow: Allow::Unreserved,
};

const FORM_CONTINUATION: OperatorTable = OperatorTable {
    first: "&",
    sep: "&",
    named: true,
    ifemp: "=",
    allow: Allow::Unreserved,
};

impl Operator {
    pub(crate) fn from_prefix(c: char) -> Option<Operator> {
        match c {
            '+' => Some(Operator::Reserved),
            '#' => Some(Operator::Fragment),
            '.' => Some(Operator::Label),
            '/' => Some(Operator::PathSegment),
            ';' => Some(Operator::PathParameter),
            '?' => Some(Operator::FormQuery),
            '&' => Some(Operator::FormContinuation),
            _ => None,
        }
    }

    /// The character this operator is written as in template syntax. Differs
    /// from `table().first` for `Reserved`, which renders no prefix.
    pub(crate) fn syntax(self) -> &'static str {
        match self {
            Operator::Simple => "",
            Operator::Reserved => "+",
            Operator::Fragment => "#",
            Operator::Label => ".",
            Operator::PathSegment => "/",
            Operator::PathParameter => ";",
            Operator::FormQuery => "?",
            Operator::FormContinuation => "&",
        }
    }

    pub(crate) fn table(self) -> &'static OperatorTable {
        match self {
            Operator::Simple => &SIMPLE,
            Operator::Reserved => &RESERVED,
            Operator::Fragment => &FRAGMENT,
            Operator::Label => &LABEL,
            Operator::PathSegment => &PATH_SEGMENT,
            Operator::PathParameter => &PATH_PARAMETER,
            Operator::FormQuery => &FORM_QUERY,
            Operator::FormContinuation => &FORM_CONTINUATION,
        }
    }
}
