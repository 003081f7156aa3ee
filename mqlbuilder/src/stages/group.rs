use crate::{
    args::{Fields, FromArgs},
    error::{Error, Result},
    expression::{Express, Expression},
};
use linked_hash_map::LinkedHashMap;

/// The field a `$group` stage groups by.
pub const GROUP_KEY: &str = "_id";

/// `$group` groups documents by a key and computes accumulated fields for
/// each group. The key may be given on its own (`by`) or as the `_id`
/// entry of the accumulator mapping; an `_id` already present in the
/// mapping takes precedence. `_id` is always rendered first.
#[derive(Debug, Clone)]
pub struct Group {
    body: LinkedHashMap<String, Expression>,
}

impl Group {
    pub fn new(by: impl Into<Expression>, query: impl Into<Expression>) -> Result<Self> {
        Group::assemble(Some(by.into()), Some(query.into()))
    }

    /// Builds the stage from a mapping that carries its own `_id`.
    pub fn from_query(query: impl Into<Expression>) -> Result<Self> {
        Group::assemble(None, Some(query.into()))
    }

    /// Groups every input document together (`_id: null`).
    pub fn all(query: impl Into<Expression>) -> Result<Self> {
        Group::assemble(Some(Expression::null()), Some(query.into()))
    }

    fn assemble(by: Option<Expression>, query: Option<Expression>) -> Result<Self> {
        let mut query = match query {
            Some(q) => q.into_document().map_err(|_| {
                Error::invalid(Self::TAG, "query", "expected a document of accumulators")
            })?,
            None => LinkedHashMap::new(),
        };
        let key = query
            .remove(GROUP_KEY)
            .or(by)
            .ok_or_else(|| Error::missing(Self::TAG, "by"))?;

        let mut body = LinkedHashMap::with_capacity(query.len() + 1);
        body.insert(GROUP_KEY.to_string(), key);
        body.extend(query);
        Ok(Group { body })
    }

    pub fn key(&self) -> Option<&Expression> {
        self.body.get(GROUP_KEY)
    }
}

impl FromArgs for Group {
    const TAG: &'static str = "$group";
    const FIELDS: &'static [&'static str] = &["by", "query"];
    const ALIASES: &'static [(&'static str, &'static str)] = &[("_id", "by")];

    fn from_fields(fields: &mut Fields) -> Result<Self> {
        let by = fields.optional("by");
        let query = fields.optional_non_null("query");
        Group::assemble(by, query)
    }
}

impl Express for Group {
    fn tag(&self) -> &'static str {
        Self::TAG
    }

    fn body(&self) -> Expression {
        Expression::Document(self.body.clone())
    }
}

impl_stage!(Group);
