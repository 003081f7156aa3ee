use crate::{
    args::{Fields, FromArgs},
    error::{Error, Result},
    expression::{integer, Body, Express, Expression},
};
use bson::Bson;
use linked_hash_map::LinkedHashMap;
use serde::Deserialize;
use std::fmt;

fn output_document(
    owner: &'static str,
    output: Expression,
) -> Result<LinkedHashMap<String, Expression>> {
    output
        .into_document()
        .map_err(|_| Error::invalid(owner, "output", "expected a document of accumulators"))
}

/// `$bucket` sorts documents into buckets bounded by `boundaries`. The
/// boundaries must be in ascending order; that is not checked here. An
/// absent `default` or `output` is omitted from the rendered stage.
#[derive(Debug, Clone)]
pub struct Bucket {
    group_by: Expression,
    boundaries: Vec<Expression>,
    default: Option<Expression>,
    output: Option<LinkedHashMap<String, Expression>>,
}

impl Bucket {
    pub fn new<T: Into<Expression>>(
        group_by: impl Into<Expression>,
        boundaries: impl IntoIterator<Item = T>,
    ) -> Result<Self> {
        let group_by = group_by.into();
        if group_by.is_null() {
            return Err(Error::missing(Self::TAG, "group_by"));
        }
        let boundaries: Vec<Expression> = boundaries.into_iter().map(Into::into).collect();
        if boundaries.is_empty() {
            return Err(Error::missing(Self::TAG, "boundaries"));
        }
        if boundaries.len() < 2 {
            return Err(Error::invalid(
                Self::TAG,
                "boundaries",
                "at least two boundaries are required",
            ));
        }
        Ok(Bucket {
            group_by,
            boundaries,
            default: None,
            output: None,
        })
    }

    /// Sets the label of the bucket collecting values outside the
    /// boundaries.
    pub fn with_default(self, default: impl Into<Expression>) -> Self {
        Bucket {
            default: Some(default.into()),
            ..self
        }
    }

    pub fn with_output(self, output: impl Into<Expression>) -> Result<Self> {
        let output = output_document(Self::TAG, output.into())?;
        Ok(Bucket {
            output: Some(output),
            ..self
        })
    }

    pub fn boundaries(&self) -> &[Expression] {
        &self.boundaries
    }
}

impl FromArgs for Bucket {
    const TAG: &'static str = "$bucket";
    const FIELDS: &'static [&'static str] = &["group_by", "boundaries", "default", "output"];
    const ALIASES: &'static [(&'static str, &'static str)] = &[("by", "group_by")];

    fn from_fields(fields: &mut Fields) -> Result<Self> {
        let group_by = fields.required("group_by")?;
        let boundaries = fields.required_array("boundaries")?;
        let mut bucket = Bucket::new(group_by, boundaries)?;
        if let Some(default) = fields.optional_non_null("default") {
            bucket = bucket.with_default(default);
        }
        if let Some(output) = fields.optional_non_null("output") {
            bucket = bucket.with_output(output)?;
        }
        Ok(bucket)
    }
}

impl Express for Bucket {
    fn tag(&self) -> &'static str {
        Self::TAG
    }

    fn body(&self) -> Expression {
        Body::new()
            .field("group_by", self.group_by.clone())
            .field("boundaries", Expression::Array(self.boundaries.clone()))
            .optional("default", self.default.clone())
            .optional("output", self.output.clone())
            .build()
    }
}

/// Granularity is the closed set of preferred number series `$bucketAuto`
/// can round its boundaries to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Granularity {
    R5,
    R10,
    R20,
    R40,
    R80,
    #[serde(rename = "1-2-5")]
    OneTwoFive,
    E6,
    E12,
    E24,
    E48,
    E96,
    E192,
    #[serde(rename = "POWERSOF2")]
    PowersOf2,
}

impl Granularity {
    pub fn as_str(&self) -> &'static str {
        use Granularity::*;
        match self {
            R5 => "R5",
            R10 => "R10",
            R20 => "R20",
            R40 => "R40",
            R80 => "R80",
            OneTwoFive => "1-2-5",
            E6 => "E6",
            E12 => "E12",
            E24 => "E24",
            E48 => "E48",
            E96 => "E96",
            E192 => "E192",
            PowersOf2 => "POWERSOF2",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Granularity {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self> {
        bson::from_bson(Bson::String(s.to_string())).map_err(|_| {
            Error::invalid(
                BucketAuto::TAG,
                "granularity",
                format!("`{s}` is not a supported granularity"),
            )
        })
    }
}

impl From<Granularity> for Expression {
    fn from(g: Granularity) -> Self {
        Expression::Literal(Bson::String(g.as_str().to_string()))
    }
}

/// `$bucketAuto` distributes documents into `buckets` evenly sized
/// buckets, with boundaries chosen automatically.
#[derive(Debug, Clone)]
pub struct BucketAuto {
    group_by: Expression,
    buckets: i64,
    output: Option<LinkedHashMap<String, Expression>>,
    granularity: Option<Granularity>,
}

impl BucketAuto {
    pub fn new(group_by: impl Into<Expression>, buckets: i64) -> Result<Self> {
        let group_by = group_by.into();
        if group_by.is_null() {
            return Err(Error::missing(Self::TAG, "group_by"));
        }
        if buckets < 1 {
            return Err(Error::invalid(
                Self::TAG,
                "buckets",
                format!("must be a positive integer, got {buckets}"),
            ));
        }
        Ok(BucketAuto {
            group_by,
            buckets,
            output: None,
            granularity: None,
        })
    }

    pub fn with_output(self, output: impl Into<Expression>) -> Result<Self> {
        let output = output_document(Self::TAG, output.into())?;
        Ok(BucketAuto {
            output: Some(output),
            ..self
        })
    }

    pub fn with_granularity(self, granularity: Granularity) -> Self {
        BucketAuto {
            granularity: Some(granularity),
            ..self
        }
    }

    pub fn buckets(&self) -> i64 {
        self.buckets
    }

    pub fn granularity(&self) -> Option<Granularity> {
        self.granularity
    }
}

impl FromArgs for BucketAuto {
    const TAG: &'static str = "$bucketAuto";
    const FIELDS: &'static [&'static str] = &["group_by", "buckets", "output", "granularity"];
    const ALIASES: &'static [(&'static str, &'static str)] = &[("by", "group_by")];

    fn from_fields(fields: &mut Fields) -> Result<Self> {
        let group_by = fields.required("group_by")?;
        let buckets = fields.required_i64("buckets")?;
        let mut bucket_auto = BucketAuto::new(group_by, buckets)?;
        if let Some(output) = fields.optional_non_null("output") {
            bucket_auto = bucket_auto.with_output(output)?;
        }
        if let Some(granularity) = fields.optional_string("granularity")? {
            bucket_auto = bucket_auto.with_granularity(Granularity::try_from(granularity.as_str())?);
        }
        Ok(bucket_auto)
    }
}

impl Express for BucketAuto {
    fn tag(&self) -> &'static str {
        Self::TAG
    }

    fn body(&self) -> Expression {
        Body::new()
            .field("group_by", self.group_by.clone())
            .field("buckets", integer(self.buckets))
            .optional("output", self.output.clone())
            .optional("granularity", self.granularity)
            .build()
    }
}

impl_stage!(Bucket, BucketAuto);
