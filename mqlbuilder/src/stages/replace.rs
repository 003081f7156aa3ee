use crate::{
    args::{Fields, FromArgs},
    error::{Error, Result},
    expression::{normalize_field_path, Body, Express, Expression},
};

fn new_root(owner: &'static str, field: &str, expr: Expression) -> Result<Expression> {
    if expr.is_null() {
        return Err(Error::missing(owner, field));
    }
    Ok(normalize_field_path(expr))
}

/// `$replaceRoot` promotes the document at `path` to the top level. A bare
/// field name is treated as a field path.
#[derive(Debug, Clone)]
pub struct ReplaceRoot {
    path: Expression,
}

impl ReplaceRoot {
    pub fn new(path: impl Into<Expression>) -> Result<Self> {
        Ok(ReplaceRoot {
            path: new_root(Self::TAG, "path", path.into())?,
        })
    }

    pub fn path(&self) -> &Expression {
        &self.path
    }
}

impl FromArgs for ReplaceRoot {
    const TAG: &'static str = "$replaceRoot";
    const FIELDS: &'static [&'static str] = &["path"];
    const ALIASES: &'static [(&'static str, &'static str)] =
        &[("path_to_new_root", "path"), ("new_root", "path")];

    fn from_fields(fields: &mut Fields) -> Result<Self> {
        ReplaceRoot::new(fields.required("path")?)
    }
}

impl Express for ReplaceRoot {
    fn tag(&self) -> &'static str {
        Self::TAG
    }

    fn body(&self) -> Expression {
        Body::new().field("new_root", self.path.clone()).build()
    }
}

/// `$replaceWith` is the short form of `$replaceRoot`; it renders the new
/// root expression directly.
#[derive(Debug, Clone)]
pub struct ReplaceWith {
    replacement: Expression,
}

impl ReplaceWith {
    pub fn new(replacement: impl Into<Expression>) -> Result<Self> {
        Ok(ReplaceWith {
            replacement: new_root(Self::TAG, "replacement", replacement.into())?,
        })
    }
}

impl FromArgs for ReplaceWith {
    const TAG: &'static str = "$replaceWith";
    const FIELDS: &'static [&'static str] = &["replacement"];
    const ALIASES: &'static [(&'static str, &'static str)] =
        &[("path", "replacement"), ("expression", "replacement")];

    fn from_fields(fields: &mut Fields) -> Result<Self> {
        ReplaceWith::new(fields.required("replacement")?)
    }
}

impl Express for ReplaceWith {
    fn tag(&self) -> &'static str {
        Self::TAG
    }

    fn body(&self) -> Expression {
        self.replacement.clone()
    }
}

impl_stage!(ReplaceRoot, ReplaceWith);
