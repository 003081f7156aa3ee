use crate::{
    args::{Fields, FromArgs},
    error::{Error, Result},
    expression::{Express, Expression},
};
use linked_hash_map::LinkedHashMap;

/// `$match` filters documents with a query document. The query defaults
/// to the empty document, which matches everything.
#[derive(Debug, Clone, Default)]
pub struct Match {
    query: LinkedHashMap<String, Expression>,
}

impl Match {
    pub fn new(query: impl Into<Expression>) -> Result<Self> {
        let query = query
            .into()
            .into_document()
            .map_err(|_| Error::invalid(Self::TAG, "query", "expected a query document"))?;
        Ok(Match { query })
    }

    /// Matches documents for which the aggregation expression is true,
    /// rendered as `{"$match": {"$expr": <expression>}}`.
    pub fn expr(expression: impl Into<Expression>) -> Self {
        let mut query = LinkedHashMap::new();
        query.insert("$expr".to_string(), expression.into());
        Match { query }
    }

    pub fn query(&self) -> &LinkedHashMap<String, Expression> {
        &self.query
    }
}

impl FromArgs for Match {
    const TAG: &'static str = "$match";
    const FIELDS: &'static [&'static str] = &["query"];
    const ALIASES: &'static [(&'static str, &'static str)] = &[("filter", "query")];

    fn from_fields(fields: &mut Fields) -> Result<Self> {
        match fields.optional_non_null("query") {
            Some(query) => Match::new(query),
            None => Ok(Match::default()),
        }
    }
}

impl Express for Match {
    fn tag(&self) -> &'static str {
        Self::TAG
    }

    fn body(&self) -> Expression {
        Expression::Document(self.query.clone())
    }
}

impl_stage!(Match);
