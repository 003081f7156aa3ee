use crate::{naming::to_camel_case, options::RenderOptions, resolve::Resolver, Result};
use bson::{Bson, Document};
use linked_hash_map::LinkedHashMap;
use std::{fmt, sync::Arc};

/// Marks a string as a path into the current document.
pub const FIELD_PATH_MARKER: char = '$';
/// Marks a string as a reference to a pipeline variable.
pub const VARIABLE_MARKER: &str = "$$";
/// Separates the components of a dotted field path.
pub const PATH_SEPARATOR: char = '.';

/// Express is implemented by everything that renders to a single-key
/// statement `{tag: body}`: every operator and every stage. `body` returns
/// the unresolved operands; resolution turns any nested nodes inside it
/// into their own statements.
pub trait Express: fmt::Debug + Send + Sync {
    /// The reserved keyword this node renders under, e.g. `$sum`.
    fn tag(&self) -> &'static str;

    /// The node's operands, exactly as they will be rendered under `tag`.
    fn body(&self) -> Expression;

    fn statement(&self) -> Result<Document> {
        self.statement_with(&RenderOptions::default())
    }

    fn statement_with(&self, options: &RenderOptions) -> Result<Document> {
        Resolver::new(options).statement(self)
    }
}

/// Ref distinguishes the two kinds of `$`-prefixed strings. The stored name
/// excludes the prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Ref {
    FieldRef(String),
    VariableRef(String),
}

impl fmt::Display for Ref {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ref::FieldRef(name) => write!(f, "{FIELD_PATH_MARKER}{name}"),
            Ref::VariableRef(name) => write!(f, "{VARIABLE_MARKER}{name}"),
        }
    }
}

/// Expression represents every value a statement may contain: plain data,
/// field and variable references, mappings and sequences of further
/// expressions, and nested operators or stages.
#[derive(Debug, Clone)]
pub enum Expression {
    // Plain data, including already-resolved documents and arrays
    Literal(Bson),

    // Field paths ("$a.b") and variables ("$$ROOT")
    Ref(Ref),

    // Mappings that may contain unresolved nodes
    Document(LinkedHashMap<String, Expression>),

    // Sequences that may contain unresolved nodes
    Array(Vec<Expression>),

    // Operators and stages
    Node(Arc<dyn Express>),
}

impl Expression {
    pub fn null() -> Self {
        Expression::Literal(Bson::Null)
    }

    pub fn field(path: impl Into<String>) -> Self {
        Expression::Ref(Ref::FieldRef(path.into()))
    }

    pub fn variable(name: impl Into<String>) -> Self {
        Expression::Ref(Ref::VariableRef(name.into()))
    }

    pub fn empty_document() -> Self {
        Expression::Document(LinkedHashMap::new())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Expression::Literal(Bson::Null))
    }

    /// Returns true for expressions that can only render to a mapping.
    pub fn is_document(&self) -> bool {
        matches!(
            self,
            Expression::Document(_) | Expression::Literal(Bson::Document(_))
        )
    }

    /// Returns the string this expression renders to, if it is a plain
    /// string or a reference.
    pub fn as_string(&self) -> Option<String> {
        match self {
            Expression::Literal(Bson::String(s)) => Some(s.clone()),
            Expression::Ref(r) => Some(r.to_string()),
            _ => None,
        }
    }

    /// Returns the value of an integral literal.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Expression::Literal(Bson::Int32(i)) => Some(i64::from(*i)),
            Expression::Literal(Bson::Int64(i)) => Some(*i),
            _ => None,
        }
    }

    /// Splits a mapping-shaped expression into its entries. Literal
    /// documents are lifted entry by entry; every other shape is handed
    /// back unchanged as the error value.
    pub fn into_document(
        self,
    ) -> std::result::Result<LinkedHashMap<String, Expression>, Expression> {
        match self {
            Expression::Document(d) => Ok(d),
            Expression::Literal(Bson::Document(d)) => Ok(d
                .into_iter()
                .map(|(k, v)| (k, Expression::Literal(v)))
                .collect()),
            other => Err(other),
        }
    }

    /// Splits a sequence-shaped expression into its elements, handing any
    /// other shape back unchanged.
    pub fn into_array(self) -> std::result::Result<Vec<Expression>, Expression> {
        match self {
            Expression::Array(a) => Ok(a),
            Expression::Literal(Bson::Array(a)) => {
                Ok(a.into_iter().map(Expression::Literal).collect())
            }
            other => Err(other),
        }
    }
}

/// Renders integers in the narrowest BSON integer type that holds them.
pub fn integer(i: i64) -> Bson {
    match i32::try_from(i) {
        Ok(small) => Bson::Int32(small),
        Err(_) => Bson::Int64(i),
    }
}

/// Prefixes a bare field name with the field path marker. Anything that
/// is not a plain string, or that already carries the marker, is
/// returned untouched.
pub fn normalize_field_path(expr: Expression) -> Expression {
    match expr {
        Expression::Literal(Bson::String(s)) if s.starts_with(FIELD_PATH_MARKER) => {
            Expression::from(s)
        }
        Expression::Literal(Bson::String(s)) => Expression::field(s),
        other => other,
    }
}

/// Body assembles the fixed-key mapping most stages and tagged operators
/// render as. Keys are given as snake_case field names and emitted in
/// their camelCase wire spelling, in insertion order.
#[derive(Debug, Default)]
pub(crate) struct Body(LinkedHashMap<String, Expression>);

impl Body {
    pub(crate) fn new() -> Self {
        Body(LinkedHashMap::new())
    }

    pub(crate) fn field(mut self, name: &str, value: impl Into<Expression>) -> Self {
        self.0.insert(to_camel_case(name), value.into());
        self
    }

    /// Adds the field only when a value is present.
    pub(crate) fn optional<T: Into<Expression>>(self, name: &str, value: Option<T>) -> Self {
        match value {
            Some(v) => self.field(name, v),
            None => self,
        }
    }

    /// Adds the field, rendering an absent value as null.
    pub(crate) fn nullable<T: Into<Expression>>(self, name: &str, value: Option<T>) -> Self {
        match value {
            Some(v) => self.field(name, v),
            None => self.field(name, Expression::null()),
        }
    }

    pub(crate) fn build(self) -> Expression {
        Expression::Document(self.0)
    }
}

impl From<&str> for Expression {
    fn from(s: &str) -> Self {
        if let Some(name) = s.strip_prefix(VARIABLE_MARKER) {
            Expression::variable(name)
        } else if let Some(path) = s.strip_prefix(FIELD_PATH_MARKER) {
            Expression::field(path)
        } else {
            Expression::Literal(Bson::String(s.to_string()))
        }
    }
}

impl From<String> for Expression {
    fn from(s: String) -> Self {
        Expression::from(s.as_str())
    }
}

impl From<&String> for Expression {
    fn from(s: &String) -> Self {
        Expression::from(s.as_str())
    }
}

impl From<Ref> for Expression {
    fn from(r: Ref) -> Self {
        Expression::Ref(r)
    }
}

impl From<bool> for Expression {
    fn from(b: bool) -> Self {
        Expression::Literal(Bson::Boolean(b))
    }
}

impl From<i32> for Expression {
    fn from(i: i32) -> Self {
        Expression::Literal(Bson::Int32(i))
    }
}

impl From<i64> for Expression {
    fn from(i: i64) -> Self {
        Expression::Literal(Bson::Int64(i))
    }
}

impl From<f64> for Expression {
    fn from(f: f64) -> Self {
        Expression::Literal(Bson::Double(f))
    }
}

impl From<Bson> for Expression {
    fn from(b: Bson) -> Self {
        Expression::Literal(b)
    }
}

impl From<Document> for Expression {
    fn from(d: Document) -> Self {
        Expression::Literal(Bson::Document(d))
    }
}

impl From<LinkedHashMap<String, Expression>> for Expression {
    fn from(d: LinkedHashMap<String, Expression>) -> Self {
        Expression::Document(d)
    }
}

impl<T: Into<Expression>> From<Vec<T>> for Expression {
    fn from(v: Vec<T>) -> Self {
        Expression::Array(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Expression>> From<Option<T>> for Expression {
    fn from(o: Option<T>) -> Self {
        o.map_or_else(Expression::null, Into::into)
    }
}

impl From<Arc<dyn Express>> for Expression {
    fn from(node: Arc<dyn Express>) -> Self {
        Expression::Node(node)
    }
}
