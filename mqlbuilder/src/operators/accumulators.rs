//! Accumulators reduce a group of documents to a single value. They are
//! used as the values of a `$group` (or `$bucket`) output mapping.

use crate::{
    args::{Fields, FromArgs},
    error::Result,
    expression::{Express, Expression},
};

single_operand_operator!(
    /// `$sum` of numeric values; non-numeric values are ignored.
    Sum,
    "$sum"
);

single_operand_operator!(
    /// `$avg` of numeric values.
    Avg,
    "$avg"
);

single_operand_operator!(
    /// `$first` value in a group, or the first element of an array.
    First,
    "$first"
);

single_operand_operator!(
    /// `$last` value in a group, or the last element of an array.
    Last,
    "$last"
);

single_operand_operator!(Min, "$min");

single_operand_operator!(Max, "$max");

single_operand_operator!(
    /// `$push` collects every value into an array.
    Push,
    "$push"
);

single_operand_operator!(
    /// `$addToSet` collects the distinct values into an array.
    AddToSet,
    "$addToSet"
);

/// `$count` takes no operand and always renders as `{"$count": {}}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Count;

impl Count {
    pub fn new() -> Self {
        Count
    }
}

impl FromArgs for Count {
    const TAG: &'static str = "$count";
    const FIELDS: &'static [&'static str] = &[];

    fn from_fields(_fields: &mut Fields) -> Result<Self> {
        Ok(Count)
    }
}

impl Express for Count {
    fn tag(&self) -> &'static str {
        Self::TAG
    }

    fn body(&self) -> Expression {
        Expression::empty_document()
    }
}

impl_operator!(Count);
