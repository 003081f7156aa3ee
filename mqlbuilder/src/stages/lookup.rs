use crate::{
    args::{Fields, FromArgs},
    error::{Error, Result},
    expression::{Body, Express, Expression},
    stages::{is_registered, validate_output_field},
};
use bson::Bson;
use linked_hash_map::LinkedHashMap;

/// Collects the stages of a nested pipeline. Each element must be a stage
/// value or a single-key document keyed by a registered stage tag.
fn sub_pipeline<T: Into<Expression>>(
    owner: &'static str,
    stages: impl IntoIterator<Item = T>,
) -> Result<Vec<Expression>> {
    stages
        .into_iter()
        .map(Into::into)
        .enumerate()
        .map(|(i, stage)| match stage_tag(&stage) {
            Some(tag) if is_registered(tag) => Ok(stage),
            Some(tag) => Err(Error::invalid(
                owner,
                "pipeline",
                format!("element {i} uses `{tag}`, which is not a stage"),
            )),
            None => Err(Error::invalid(
                owner,
                "pipeline",
                format!("element {i} is not a stage"),
            )),
        })
        .collect()
}

fn stage_tag(stage: &Expression) -> Option<&str> {
    match stage {
        Expression::Node(node) => Some(node.tag()),
        Expression::Document(d) if d.len() == 1 => d.keys().next().map(String::as_str),
        Expression::Literal(Bson::Document(d)) if d.len() == 1 => {
            d.keys().next().map(String::as_str)
        }
        _ => None,
    }
}

fn literal(value: Option<&str>) -> Option<Bson> {
    value.map(|v| Bson::String(v.to_string()))
}

/// `$lookup` joins documents from another collection into an array field.
///
/// Two forms are supported. The equality form names `from`,
/// `local_field` and `foreign_field`. The sub-pipeline form runs
/// `pipeline` (with variables bound by `let`) against `from`, or against
/// the stage's own documents when `from` is absent. Both forms may be
/// combined, in which case `local_field` and `foreign_field` come as a
/// pair.
#[derive(Debug, Clone)]
pub struct Lookup {
    from: Option<String>,
    local_field: Option<String>,
    foreign_field: Option<String>,
    let_vars: Option<LinkedHashMap<String, Expression>>,
    pipeline: Option<Vec<Expression>>,
    as_field: String,
}

impl Lookup {
    /// The equality form.
    pub fn new(
        from: impl Into<String>,
        local_field: impl Into<String>,
        foreign_field: impl Into<String>,
        as_field: impl Into<String>,
    ) -> Result<Self> {
        Lookup::assemble(
            Some(from.into()),
            Some(local_field.into()),
            Some(foreign_field.into()),
            None,
            None,
            as_field.into(),
        )
    }

    /// The sub-pipeline form.
    pub fn pipeline<T: Into<Expression>>(
        from: impl Into<String>,
        pipeline: impl IntoIterator<Item = T>,
        as_field: impl Into<String>,
    ) -> Result<Self> {
        let pipeline = sub_pipeline(Self::TAG, pipeline)?;
        Lookup::assemble(
            Some(from.into()),
            None,
            None,
            None,
            Some(pipeline),
            as_field.into(),
        )
    }

    /// Binds variables the sub-pipeline can refer to as `$$name`.
    pub fn with_let(self, vars: impl Into<Expression>) -> Result<Self> {
        if self.pipeline.is_none() {
            return Err(Error::invalid(
                Self::TAG,
                "let",
                "only allowed together with a pipeline",
            ));
        }
        let vars = vars
            .into()
            .into_document()
            .map_err(|_| Error::invalid(Self::TAG, "let", "expected a document"))?;
        Ok(Lookup {
            let_vars: Some(vars),
            ..self
        })
    }

    fn assemble(
        from: Option<String>,
        local_field: Option<String>,
        foreign_field: Option<String>,
        let_vars: Option<LinkedHashMap<String, Expression>>,
        pipeline: Option<Vec<Expression>>,
        as_field: String,
    ) -> Result<Self> {
        validate_output_field(Self::TAG, "as", &as_field)?;
        if let Some(from) = &from {
            if from.is_empty() {
                return Err(Error::missing(Self::TAG, "from"));
            }
        }
        match (&local_field, &foreign_field, &pipeline) {
            (Some(_), Some(_), _) => {
                if from.is_none() {
                    return Err(Error::missing(Self::TAG, "from"));
                }
            }
            (Some(_), None, _) => return Err(Error::missing(Self::TAG, "foreign_field")),
            (None, Some(_), _) => return Err(Error::missing(Self::TAG, "local_field")),
            (None, None, None) => {
                return Err(Error::missing(
                    Self::TAG,
                    "local_field|foreign_field|pipeline",
                ))
            }
            (None, None, Some(_)) => {}
        }
        if let_vars.is_some() && pipeline.is_none() {
            return Err(Error::invalid(
                Self::TAG,
                "let",
                "only allowed together with a pipeline",
            ));
        }
        Ok(Lookup {
            from,
            local_field,
            foreign_field,
            let_vars,
            pipeline,
            as_field,
        })
    }

    pub fn as_field(&self) -> &str {
        &self.as_field
    }
}

impl FromArgs for Lookup {
    const TAG: &'static str = "$lookup";
    const FIELDS: &'static [&'static str] = &[
        "from",
        "local_field",
        "foreign_field",
        "let",
        "pipeline",
        "as",
    ];
    const ALIASES: &'static [(&'static str, &'static str)] = &[
        ("as_field", "as"),
        ("collection", "from"),
        ("let_vars", "let"),
    ];

    fn from_fields(fields: &mut Fields) -> Result<Self> {
        let from = fields.optional_string("from")?;
        let local_field = fields.optional_string("local_field")?;
        let foreign_field = fields.optional_string("foreign_field")?;
        let let_vars = fields.optional_document("let")?;
        let pipeline = match fields.optional_array("pipeline")? {
            Some(stages) => Some(sub_pipeline(Self::TAG, stages)?),
            None => None,
        };
        let as_field = fields.required_string("as")?;
        Lookup::assemble(from, local_field, foreign_field, let_vars, pipeline, as_field)
    }
}

impl Express for Lookup {
    fn tag(&self) -> &'static str {
        Self::TAG
    }

    fn body(&self) -> Expression {
        Body::new()
            .optional("from", literal(self.from.as_deref()))
            .optional("local_field", literal(self.local_field.as_deref()))
            .optional("foreign_field", literal(self.foreign_field.as_deref()))
            .optional("let", self.let_vars.clone())
            .optional("pipeline", self.pipeline.clone().map(Expression::Array))
            .field("as", Bson::String(self.as_field.clone()))
            .build()
    }
}

/// `$unionWith` appends the documents of another collection, optionally
/// passed through their own pipeline first.
#[derive(Debug, Clone)]
pub struct UnionWith {
    coll: String,
    pipeline: Option<Vec<Expression>>,
}

impl UnionWith {
    pub fn new(coll: impl Into<String>) -> Result<Self> {
        let coll = coll.into();
        if coll.is_empty() {
            return Err(Error::missing(Self::TAG, "coll"));
        }
        Ok(UnionWith {
            coll,
            pipeline: None,
        })
    }

    pub fn with_pipeline<T: Into<Expression>>(
        self,
        pipeline: impl IntoIterator<Item = T>,
    ) -> Result<Self> {
        Ok(UnionWith {
            pipeline: Some(sub_pipeline(Self::TAG, pipeline)?),
            ..self
        })
    }

    pub fn coll(&self) -> &str {
        &self.coll
    }
}

impl FromArgs for UnionWith {
    const TAG: &'static str = "$unionWith";
    const FIELDS: &'static [&'static str] = &["coll", "pipeline"];
    const ALIASES: &'static [(&'static str, &'static str)] = &[("collection", "coll")];

    fn from_fields(fields: &mut Fields) -> Result<Self> {
        let union = UnionWith::new(fields.required_string("coll")?)?;
        match fields.optional_array("pipeline")? {
            Some(stages) => union.with_pipeline(stages),
            None => Ok(union),
        }
    }
}

impl Express for UnionWith {
    fn tag(&self) -> &'static str {
        Self::TAG
    }

    fn body(&self) -> Expression {
        Body::new()
            .field("coll", Bson::String(self.coll.clone()))
            .optional("pipeline", self.pipeline.clone().map(Expression::Array))
            .build()
    }
}

impl_stage!(Lookup, UnionWith);
