//! Array expression operators.

use crate::{
    args::{Fields, FromArgs},
    error::{Error, Result},
    expression::{integer, Body, Express, Expression, FIELD_PATH_MARKER},
};
use bson::Bson;
use linked_hash_map::LinkedHashMap;

pub use super::{
    accumulators::{First, Last},
    object::ObjectToArray,
};

/// Variable name bound to the current element when none is given.
pub const DEFAULT_VARIABLE: &str = "this";

single_operand_operator!(
    /// `$size` is the number of elements in an array.
    Size,
    "$size"
);

single_operand_operator!(IsArray, "$isArray");

single_operand_operator!(
    /// `$arrayToObject` turns `[k, v]` pairs or `{k, v}` documents into a
    /// document.
    ArrayToObject,
    "$arrayToObject"
);

binary_operator!(
    /// `$in` is true when `left` is an element of the array `right`.
    In,
    "$in",
    aliases = [("expression", "left"), ("array", "right")]
);

fn validate_variable(owner: &'static str, name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::invalid(owner, "as", "variable name must not be empty"));
    }
    if name.starts_with(FIELD_PATH_MARKER) {
        return Err(Error::invalid(
            owner,
            "as",
            format!("variable name `{name}` must be given without the `$$` prefix"),
        ));
    }
    Ok(())
}

fn validate_positive(owner: &'static str, field: &str, value: i64) -> Result<()> {
    if value < 1 {
        return Err(Error::invalid(
            owner,
            field,
            format!("must be a positive integer, got {value}"),
        ));
    }
    Ok(())
}

/// `$filter` selects the elements of `input` for which `cond` is true.
/// `cond` refers to the current element through the variable named by
/// `as`, which defaults to `this`.
#[derive(Debug, Clone)]
pub struct Filter {
    input: Expression,
    cond: Expression,
    as_var: String,
    limit: Option<i64>,
}

impl Filter {
    pub fn new(input: impl Into<Expression>, cond: impl Into<Expression>) -> Self {
        Filter {
            input: input.into(),
            cond: cond.into(),
            as_var: DEFAULT_VARIABLE.to_string(),
            limit: None,
        }
    }

    pub fn with_variable(self, name: impl Into<String>) -> Result<Self> {
        let as_var = name.into();
        validate_variable(Self::TAG, &as_var)?;
        Ok(Filter { as_var, ..self })
    }

    /// Caps the number of matching elements returned. Must be at least 1.
    pub fn with_limit(self, limit: i64) -> Result<Self> {
        validate_positive(Self::TAG, "limit", limit)?;
        Ok(Filter {
            limit: Some(limit),
            ..self
        })
    }

    pub fn variable(&self) -> &str {
        &self.as_var
    }

    pub fn limit(&self) -> Option<i64> {
        self.limit
    }
}

impl FromArgs for Filter {
    const TAG: &'static str = "$filter";
    const FIELDS: &'static [&'static str] = &["input", "cond", "as", "limit"];
    const ALIASES: &'static [(&'static str, &'static str)] =
        &[("operand", "input"), ("query", "cond"), ("let", "as")];

    fn from_fields(fields: &mut Fields) -> Result<Self> {
        let input = fields.required("input")?;
        let cond = fields.required("cond")?;
        let mut filter = Filter::new(input, cond);
        if let Some(name) = fields.optional_string("as")? {
            filter = filter.with_variable(name)?;
        }
        if let Some(limit) = fields.optional_i64("limit")? {
            filter = filter.with_limit(limit)?;
        }
        Ok(filter)
    }
}

impl Express for Filter {
    fn tag(&self) -> &'static str {
        Self::TAG
    }

    fn body(&self) -> Expression {
        Body::new()
            .field("input", self.input.clone())
            .field("cond", self.cond.clone())
            .field("as", Bson::String(self.as_var.clone()))
            .nullable("limit", self.limit.map(integer))
            .build()
    }
}

/// `$map` applies `in` to every element of `input`, binding the element to
/// the variable named by `as`.
#[derive(Debug, Clone)]
pub struct Map {
    input: Expression,
    as_var: String,
    apply: Expression,
}

impl Map {
    pub fn new(input: impl Into<Expression>, apply: impl Into<Expression>) -> Self {
        Map {
            input: input.into(),
            as_var: DEFAULT_VARIABLE.to_string(),
            apply: apply.into(),
        }
    }

    pub fn with_variable(self, name: impl Into<String>) -> Result<Self> {
        let as_var = name.into();
        validate_variable(Self::TAG, &as_var)?;
        Ok(Map { as_var, ..self })
    }

    pub fn variable(&self) -> &str {
        &self.as_var
    }
}

impl FromArgs for Map {
    const TAG: &'static str = "$map";
    const FIELDS: &'static [&'static str] = &["input", "as", "in"];
    const ALIASES: &'static [(&'static str, &'static str)] =
        &[("operand", "input"), ("let", "as"), ("expression", "in")];

    fn from_fields(fields: &mut Fields) -> Result<Self> {
        let input = fields.required("input")?;
        let apply = fields.required("in")?;
        let map = Map::new(input, apply);
        match fields.optional_string("as")? {
            Some(name) => map.with_variable(name),
            None => Ok(map),
        }
    }
}

impl Express for Map {
    fn tag(&self) -> &'static str {
        Self::TAG
    }

    fn body(&self) -> Expression {
        Body::new()
            .field("input", self.input.clone())
            .field("as", Bson::String(self.as_var.clone()))
            .field("in", self.apply.clone())
            .build()
    }
}

/// Declares an operator rendered as `{tag: {input, n}}`. A literal `n`
/// must be at least 1; computed `n` expressions are checked by the server.
macro_rules! n_operator {
    ($(#[$meta:meta])* $name:ident, $tag:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name {
            input: Expression,
            n: Expression,
        }

        impl $name {
            pub fn new(input: impl Into<Expression>, n: impl Into<Expression>) -> Result<Self> {
                let n = n.into();
                if let Some(value) = n.as_i64() {
                    validate_positive(Self::TAG, "n", value)?;
                }
                Ok($name {
                    input: input.into(),
                    n,
                })
            }
        }

        impl FromArgs for $name {
            const TAG: &'static str = $tag;
            const FIELDS: &'static [&'static str] = &["input", "n"];
            const ALIASES: &'static [(&'static str, &'static str)] =
                &[("operand", "input"), ("limit", "n")];

            fn from_fields(fields: &mut Fields) -> Result<Self> {
                let input = fields.required("input")?;
                let n = fields.required("n")?;
                $name::new(input, n)
            }
        }

        impl Express for $name {
            fn tag(&self) -> &'static str {
                Self::TAG
            }

            fn body(&self) -> Expression {
                Body::new()
                    .field("input", self.input.clone())
                    .field("n", self.n.clone())
                    .build()
            }
        }

        impl_operator!($name);
    };
}

n_operator!(
    /// `$firstN` returns the first `n` elements.
    FirstN,
    "$firstN"
);
n_operator!(
    /// `$lastN` returns the last `n` elements.
    LastN,
    "$lastN"
);
n_operator!(
    /// `$minN` returns the `n` smallest elements.
    MinN,
    "$minN"
);
n_operator!(
    /// `$maxN` returns the `n` largest elements.
    MaxN,
    "$maxN"
);

/// SortArraySpec is the `sortBy` argument of `$sortArray`: either a
/// direction for arrays of scalars, or per-field directions for arrays of
/// documents. Directions are 1 or -1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortArraySpec {
    Value(i32),
    Keys(LinkedHashMap<String, i32>),
}

impl SortArraySpec {
    pub fn ascending() -> Self {
        SortArraySpec::Value(1)
    }

    pub fn descending() -> Self {
        SortArraySpec::Value(-1)
    }

    pub fn keys<K: Into<String>>(keys: impl IntoIterator<Item = (K, i32)>) -> Self {
        SortArraySpec::Keys(keys.into_iter().map(|(k, d)| (k.into(), d)).collect())
    }

    fn validate(&self) -> Result<()> {
        let check = |field: &str, direction: i32| {
            if direction == 1 || direction == -1 {
                Ok(())
            } else {
                Err(Error::invalid(
                    SortArray::TAG,
                    field,
                    format!("sort direction must be 1 or -1, got {direction}"),
                ))
            }
        };
        match self {
            SortArraySpec::Value(direction) => check("sort_by", *direction),
            SortArraySpec::Keys(keys) => {
                if keys.is_empty() {
                    return Err(Error::missing(SortArray::TAG, "sort_by"));
                }
                keys.iter()
                    .try_for_each(|(field, direction)| check(field.as_str(), *direction))
            }
        }
    }

    fn from_expression(expr: Expression) -> Result<Self> {
        let invalid = || {
            Error::invalid(
                SortArray::TAG,
                "sort_by",
                "expected 1, -1 or a document of field directions",
            )
        };
        if let Some(direction) = expr.as_i64() {
            return i32::try_from(direction)
                .map(SortArraySpec::Value)
                .map_err(|_| invalid());
        }
        expr.into_document()
            .map_err(|_| invalid())?
            .into_iter()
            .map(|(k, v)| {
                let direction = v.as_i64().and_then(|d| i32::try_from(d).ok());
                direction.map(|d| (k, d)).ok_or_else(invalid)
            })
            .collect::<Result<LinkedHashMap<String, i32>>>()
            .map(SortArraySpec::Keys)
    }
}

impl From<SortArraySpec> for Expression {
    fn from(spec: SortArraySpec) -> Self {
        match spec {
            SortArraySpec::Value(direction) => Expression::from(direction),
            SortArraySpec::Keys(keys) => Expression::Document(
                keys.into_iter()
                    .map(|(k, d)| (k, Expression::from(d)))
                    .collect(),
            ),
        }
    }
}

/// `$sortArray` sorts the elements of an array.
#[derive(Debug, Clone)]
pub struct SortArray {
    input: Expression,
    sort_by: SortArraySpec,
}

impl SortArray {
    pub fn new(input: impl Into<Expression>, sort_by: SortArraySpec) -> Result<Self> {
        sort_by.validate()?;
        Ok(SortArray {
            input: input.into(),
            sort_by,
        })
    }

    pub fn sort_by(&self) -> &SortArraySpec {
        &self.sort_by
    }
}

impl FromArgs for SortArray {
    const TAG: &'static str = "$sortArray";
    const FIELDS: &'static [&'static str] = &["input", "sort_by"];
    const ALIASES: &'static [(&'static str, &'static str)] = &[("operand", "input")];

    fn from_fields(fields: &mut Fields) -> Result<Self> {
        let input = fields.required("input")?;
        let sort_by = SortArraySpec::from_expression(fields.required("sort_by")?)?;
        SortArray::new(input, sort_by)
    }
}

impl Express for SortArray {
    fn tag(&self) -> &'static str {
        Self::TAG
    }

    fn body(&self) -> Expression {
        Body::new()
            .field("input", self.input.clone())
            .field("sort_by", self.sort_by.clone())
            .build()
    }
}

/// `$concatArrays` joins any number of arrays, in order.
#[derive(Debug, Clone)]
pub struct ConcatArrays {
    arrays: Vec<Expression>,
}

impl ConcatArrays {
    pub fn new<T: Into<Expression>>(arrays: impl IntoIterator<Item = T>) -> Result<Self> {
        let arrays: Vec<Expression> = arrays.into_iter().map(Into::into).collect();
        if arrays.is_empty() {
            return Err(Error::missing(Self::TAG, "operands"));
        }
        Ok(ConcatArrays { arrays })
    }
}

impl FromArgs for ConcatArrays {
    const TAG: &'static str = "$concatArrays";
    const FIELDS: &'static [&'static str] = &["operands"];
    const ALIASES: &'static [(&'static str, &'static str)] = &[("arrays", "operands")];

    fn from_fields(fields: &mut Fields) -> Result<Self> {
        ConcatArrays::new(fields.required_array("operands")?)
    }
}

impl Express for ConcatArrays {
    fn tag(&self) -> &'static str {
        Self::TAG
    }

    fn body(&self) -> Expression {
        Expression::Array(self.arrays.clone())
    }
}

impl_operator!(Filter, Map, SortArray, ConcatArrays);
