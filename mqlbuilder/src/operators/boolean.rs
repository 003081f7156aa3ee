use crate::{
    args::{Fields, FromArgs},
    error::{Error, Result},
    expression::{Express, Expression},
};

macro_rules! variadic_boolean_operator {
    ($(#[$meta:meta])* $name:ident, $tag:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name {
            operands: Vec<Expression>,
        }

        impl $name {
            /// Fails with a missing operand error when no operands are given.
            pub fn new<T: Into<Expression>>(operands: impl IntoIterator<Item = T>) -> Result<Self> {
                let operands: Vec<Expression> = operands.into_iter().map(Into::into).collect();
                if operands.is_empty() {
                    return Err(Error::missing(Self::TAG, "operands"));
                }
                Ok($name { operands })
            }

            pub fn operands(&self) -> &[Expression] {
                &self.operands
            }
        }

        impl FromArgs for $name {
            const TAG: &'static str = $tag;
            const FIELDS: &'static [&'static str] = &["operands"];
            const ALIASES: &'static [(&'static str, &'static str)] = &[("expressions", "operands")];

            fn from_fields(fields: &mut Fields) -> Result<Self> {
                $name::new(fields.required_array("operands")?)
            }
        }

        impl Express for $name {
            fn tag(&self) -> &'static str {
                Self::TAG
            }

            fn body(&self) -> Expression {
                Expression::Array(self.operands.clone())
            }
        }

        impl_operator!($name);
    };
}

variadic_boolean_operator!(
    /// `$and` is true when every operand is true.
    And,
    "$and"
);

variadic_boolean_operator!(
    /// `$or` is true when at least one operand is true.
    Or,
    "$or"
);

/// `$not` negates a single expression. The server expects the operand
/// wrapped in an array: `{"$not": [<expr>]}`.
#[derive(Debug, Clone)]
pub struct Not {
    operand: Expression,
}

impl Not {
    pub fn new(operand: impl Into<Expression>) -> Self {
        Not {
            operand: operand.into(),
        }
    }

    pub fn operand(&self) -> &Expression {
        &self.operand
    }
}

impl FromArgs for Not {
    const TAG: &'static str = "$not";
    const FIELDS: &'static [&'static str] = &["operand"];
    const ALIASES: &'static [(&'static str, &'static str)] = &[("expression", "operand")];

    fn from_fields(fields: &mut Fields) -> Result<Self> {
        Ok(Not::new(fields.required("operand")?))
    }
}

impl Express for Not {
    fn tag(&self) -> &'static str {
        Self::TAG
    }

    fn body(&self) -> Expression {
        Expression::Array(vec![self.operand.clone()])
    }
}

impl_operator!(Not);
