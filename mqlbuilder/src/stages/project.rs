use super::FieldSelection;
use crate::{
    args::{Fields, FromArgs},
    error::{Error, Result},
    expression::{Express, Expression},
};
use linked_hash_map::LinkedHashMap;
use tracing::debug;

/// `$project` reshapes documents. It is built either from an explicit
/// projection document, or from fields to include (rendered `true`) and
/// fields to exclude (rendered `false`). Included fields come first; a
/// field named in both is excluded and keeps the excluded position.
#[derive(Debug, Clone)]
pub struct Project {
    projection: LinkedHashMap<String, Expression>,
}

impl Project {
    pub fn new(projection: impl Into<Expression>) -> Result<Self> {
        Project::assemble(Some(projection.into()), None, None)
    }

    pub fn fields(
        include: Option<FieldSelection>,
        exclude: Option<FieldSelection>,
    ) -> Result<Self> {
        Project::assemble(None, include, exclude)
    }

    pub fn include(fields: impl Into<FieldSelection>) -> Result<Self> {
        Project::fields(Some(fields.into()), None)
    }

    pub fn exclude(fields: impl Into<FieldSelection>) -> Result<Self> {
        Project::fields(None, Some(fields.into()))
    }

    fn assemble(
        projection: Option<Expression>,
        include: Option<FieldSelection>,
        exclude: Option<FieldSelection>,
    ) -> Result<Self> {
        let projection = match projection {
            Some(projection) => {
                if include.is_some() || exclude.is_some() {
                    debug!(
                        stage = Self::TAG,
                        "explicit projection given, ignoring include and exclude"
                    );
                }
                projection.into_document().map_err(|_| {
                    Error::invalid(Self::TAG, "projection", "expected a projection document")
                })?
            }
            None => {
                let mut merged = LinkedHashMap::new();
                for field in include.iter().flat_map(FieldSelection::selected) {
                    merged.insert(field, Expression::from(true));
                }
                for field in exclude.iter().flat_map(FieldSelection::selected) {
                    merged.remove(&field);
                    merged.insert(field, Expression::from(false));
                }
                merged
            }
        };
        if projection.is_empty() {
            return Err(Error::missing(Self::TAG, "projection|include|exclude"));
        }
        Ok(Project { projection })
    }

    pub fn projection(&self) -> &LinkedHashMap<String, Expression> {
        &self.projection
    }
}

impl FromArgs for Project {
    const TAG: &'static str = "$project";
    const FIELDS: &'static [&'static str] = &["projection", "include", "exclude"];
    const ALIASES: &'static [(&'static str, &'static str)] = &[("query", "projection")];

    fn from_fields(fields: &mut Fields) -> Result<Self> {
        let projection = fields.optional_non_null("projection");
        let include = FieldSelection::take(fields, "include")?;
        let exclude = FieldSelection::take(fields, "exclude")?;
        Project::assemble(projection, include, exclude)
    }
}

impl Express for Project {
    fn tag(&self) -> &'static str {
        Self::TAG
    }

    fn body(&self) -> Expression {
        Expression::Document(self.projection.clone())
    }
}

impl_stage!(Project);
