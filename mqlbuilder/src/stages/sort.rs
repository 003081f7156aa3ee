use super::FieldSelection;
use crate::{
    args::{Fields, FromArgs},
    error::{Error, Result},
    expression::{Express, Expression},
};
use bson::Bson;
use linked_hash_map::LinkedHashMap;
use tracing::debug;

pub const ASCENDING: i32 = 1;
pub const DESCENDING: i32 = -1;

/// `$sort` orders documents. It is built either from an explicit ordered
/// sort document, or from ascending and descending field selections.
/// Ascending fields are placed first, in the order given, then descending
/// fields. A field named in both sorts descending, at its descending
/// position.
#[derive(Debug, Clone)]
pub struct Sort {
    query: LinkedHashMap<String, Expression>,
}

impl Sort {
    pub fn new(query: impl Into<Expression>) -> Result<Self> {
        Sort::assemble(Some(query.into()), None, None)
    }

    pub fn fields(
        ascending: Option<FieldSelection>,
        descending: Option<FieldSelection>,
    ) -> Result<Self> {
        Sort::assemble(None, ascending, descending)
    }

    pub fn ascending(fields: impl Into<FieldSelection>) -> Result<Self> {
        Sort::fields(Some(fields.into()), None)
    }

    pub fn descending(fields: impl Into<FieldSelection>) -> Result<Self> {
        Sort::fields(None, Some(fields.into()))
    }

    fn assemble(
        query: Option<Expression>,
        ascending: Option<FieldSelection>,
        descending: Option<FieldSelection>,
    ) -> Result<Self> {
        let query = match query {
            Some(query) => {
                if ascending.is_some() || descending.is_some() {
                    debug!(
                        stage = Self::TAG,
                        "explicit sort document given, ignoring ascending and descending"
                    );
                }
                query.into_document().map_err(|_| {
                    Error::invalid(Self::TAG, "query", "expected a sort document")
                })?
            }
            None => {
                let mut order = LinkedHashMap::new();
                for field in ascending.iter().flat_map(FieldSelection::selected) {
                    order.insert(field, Expression::from(ASCENDING));
                }
                for field in descending.iter().flat_map(FieldSelection::selected) {
                    order.remove(&field);
                    order.insert(field, Expression::from(DESCENDING));
                }
                order
            }
        };
        if query.is_empty() {
            return Err(Error::missing(Self::TAG, "query|ascending|descending"));
        }
        query
            .iter()
            .try_for_each(|(field, order)| validate_order(field, order))?;
        Ok(Sort { query })
    }

    pub fn query(&self) -> &LinkedHashMap<String, Expression> {
        &self.query
    }
}

/// A sort order is 1, -1 or a `{"$meta": ...}` document.
fn validate_order(field: &str, order: &Expression) -> Result<()> {
    if let Some(direction) = order.as_i64() {
        if direction == i64::from(ASCENDING) || direction == i64::from(DESCENDING) {
            return Ok(());
        }
    }
    let is_meta = match order {
        Expression::Document(d) => d.len() == 1 && d.contains_key("$meta"),
        Expression::Literal(Bson::Document(d)) => d.len() == 1 && d.contains_key("$meta"),
        _ => false,
    };
    if is_meta {
        return Ok(());
    }
    Err(Error::invalid(
        Sort::TAG,
        field,
        "sort order must be 1, -1 or a `$meta` document",
    ))
}

impl FromArgs for Sort {
    const TAG: &'static str = "$sort";
    const FIELDS: &'static [&'static str] = &["query", "ascending", "descending"];

    fn from_fields(fields: &mut Fields) -> Result<Self> {
        let query = fields.optional_non_null("query");
        let ascending = FieldSelection::take(fields, "ascending")?;
        let descending = FieldSelection::take(fields, "descending")?;
        Sort::assemble(query, ascending, descending)
    }
}

impl Express for Sort {
    fn tag(&self) -> &'static str {
        Self::TAG
    }

    fn body(&self) -> Expression {
        Expression::Document(self.query.clone())
    }
}

/// `$sortByCount` groups documents by an expression and sorts the groups
/// by their size, descending.
#[derive(Debug, Clone)]
pub struct SortByCount {
    by: Expression,
}

impl SortByCount {
    pub fn new(by: impl Into<Expression>) -> Result<Self> {
        let by = by.into();
        if by.is_null() {
            return Err(Error::missing(Self::TAG, "by"));
        }
        Ok(SortByCount { by })
    }

    pub fn by(&self) -> &Expression {
        &self.by
    }
}

impl FromArgs for SortByCount {
    const TAG: &'static str = "$sortByCount";
    const FIELDS: &'static [&'static str] = &["by"];
    const ALIASES: &'static [(&'static str, &'static str)] =
        &[("expression", "by"), ("group_by", "by")];

    fn from_fields(fields: &mut Fields) -> Result<Self> {
        SortByCount::new(fields.required("by")?)
    }
}

impl Express for SortByCount {
    fn tag(&self) -> &'static str {
        Self::TAG
    }

    fn body(&self) -> Expression {
        self.by.clone()
    }
}

impl_stage!(Sort, SortByCount);
