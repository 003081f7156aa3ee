use crate::{
    args::{Fields, FromArgs},
    error::{Error, Result},
    expression::{integer, Body, Express, Expression},
};

/// The number of documents `$sample` picks when no size is given.
pub const DEFAULT_SAMPLE_SIZE: i64 = 10;

fn at_least(owner: &'static str, value: i64, min: i64) -> Result<i64> {
    if value < min {
        return Err(Error::invalid(
            owner,
            "value",
            format!("must be at least {min}, got {value}"),
        ));
    }
    Ok(value)
}

/// `$limit` passes on the first `value` documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limit {
    value: i64,
}

impl Limit {
    pub fn new(value: i64) -> Result<Self> {
        Ok(Limit {
            value: at_least(Self::TAG, value, 1)?,
        })
    }

    pub fn value(&self) -> i64 {
        self.value
    }
}

impl FromArgs for Limit {
    const TAG: &'static str = "$limit";
    const FIELDS: &'static [&'static str] = &["value"];
    const ALIASES: &'static [(&'static str, &'static str)] = &[("limit", "value")];

    fn from_fields(fields: &mut Fields) -> Result<Self> {
        Limit::new(fields.required_i64("value")?)
    }
}

impl Express for Limit {
    fn tag(&self) -> &'static str {
        Self::TAG
    }

    fn body(&self) -> Expression {
        Expression::Literal(integer(self.value))
    }
}

/// `$skip` drops the first `value` documents. Zero is allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Skip {
    value: i64,
}

impl Skip {
    pub fn new(value: i64) -> Result<Self> {
        Ok(Skip {
            value: at_least(Self::TAG, value, 0)?,
        })
    }

    pub fn value(&self) -> i64 {
        self.value
    }
}

impl FromArgs for Skip {
    const TAG: &'static str = "$skip";
    const FIELDS: &'static [&'static str] = &["value"];
    const ALIASES: &'static [(&'static str, &'static str)] = &[("skip", "value")];

    fn from_fields(fields: &mut Fields) -> Result<Self> {
        Skip::new(fields.required_i64("value")?)
    }
}

impl Express for Skip {
    fn tag(&self) -> &'static str {
        Self::TAG
    }

    fn body(&self) -> Expression {
        Expression::Literal(integer(self.value))
    }
}

/// `$sample` picks `value` documents at random.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    value: i64,
}

impl Default for Sample {
    fn default() -> Self {
        Sample {
            value: DEFAULT_SAMPLE_SIZE,
        }
    }
}

impl Sample {
    pub fn new(value: i64) -> Result<Self> {
        Ok(Sample {
            value: at_least(Self::TAG, value, 1)?,
        })
    }

    pub fn value(&self) -> i64 {
        self.value
    }
}

impl FromArgs for Sample {
    const TAG: &'static str = "$sample";
    const FIELDS: &'static [&'static str] = &["value"];
    const ALIASES: &'static [(&'static str, &'static str)] = &[("size", "value")];

    fn from_fields(fields: &mut Fields) -> Result<Self> {
        match fields.optional_i64("value")? {
            Some(value) => Sample::new(value),
            None => Ok(Sample::default()),
        }
    }
}

impl Express for Sample {
    fn tag(&self) -> &'static str {
        Self::TAG
    }

    fn body(&self) -> Expression {
        Body::new().field("size", integer(self.value)).build()
    }
}

impl_stage!(Limit, Skip, Sample);
