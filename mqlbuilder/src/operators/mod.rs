//! Expression operators. Each operator renders as `{"$<op>": <operands>}`
//! and may be nested anywhere an [`Expression`] is accepted.

use crate::{
    args::{Args, FromArgs},
    error::{Error, Result},
    expression::{Express, Expression},
    options::ArgOptions,
};
use lazy_static::lazy_static;
use std::{collections::BTreeMap, sync::Arc};

/// Operator is implemented by every expression operator. It cannot be
/// used on its own: concrete operators supply their tag and operands
/// through [`Express`].
pub trait Operator: Express {
    fn into_node(self: Arc<Self>) -> Arc<dyn Express>;
}

/// Declares an operator taking exactly one operand, rendered bare as
/// `{tag: operand}`.
macro_rules! single_operand_operator {
    ($(#[$meta:meta])* $name:ident, $tag:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name {
            operand: $crate::expression::Expression,
        }

        impl $name {
            pub fn new(operand: impl Into<$crate::expression::Expression>) -> Self {
                $name {
                    operand: operand.into(),
                }
            }

            pub fn operand(&self) -> &$crate::expression::Expression {
                &self.operand
            }
        }

        impl $crate::args::FromArgs for $name {
            const TAG: &'static str = $tag;
            const FIELDS: &'static [&'static str] = &["operand"];
            const ALIASES: &'static [(&'static str, &'static str)] = &[("expression", "operand")];

            fn from_fields(fields: &mut $crate::args::Fields) -> $crate::error::Result<Self> {
                Ok($name::new(fields.required("operand")?))
            }
        }

        impl $crate::expression::Express for $name {
            fn tag(&self) -> &'static str {
                <Self as $crate::args::FromArgs>::TAG
            }

            fn body(&self) -> $crate::expression::Expression {
                self.operand.clone()
            }
        }

        impl_operator!($name);
    };
}

/// Declares an operator over an ordered pair, rendered as
/// `{tag: [left, right]}`.
macro_rules! binary_operator {
    ($(#[$meta:meta])* $name:ident, $tag:literal, aliases = [$($alias:expr),* $(,)?]) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name {
            left: $crate::expression::Expression,
            right: $crate::expression::Expression,
        }

        impl $name {
            pub fn new(
                left: impl Into<$crate::expression::Expression>,
                right: impl Into<$crate::expression::Expression>,
            ) -> Self {
                $name {
                    left: left.into(),
                    right: right.into(),
                }
            }

            pub fn left(&self) -> &$crate::expression::Expression {
                &self.left
            }

            pub fn right(&self) -> &$crate::expression::Expression {
                &self.right
            }
        }

        impl $crate::args::FromArgs for $name {
            const TAG: &'static str = $tag;
            const FIELDS: &'static [&'static str] = &["left", "right"];
            const ALIASES: &'static [(&'static str, &'static str)] = &[$($alias),*];

            fn from_fields(fields: &mut $crate::args::Fields) -> $crate::error::Result<Self> {
                let left = fields.required("left")?;
                let right = fields.required("right")?;
                Ok($name::new(left, right))
            }
        }

        impl $crate::expression::Express for $name {
            fn tag(&self) -> &'static str {
                <Self as $crate::args::FromArgs>::TAG
            }

            fn body(&self) -> $crate::expression::Expression {
                $crate::expression::Expression::Array(vec![self.left.clone(), self.right.clone()])
            }
        }

        impl_operator!($name);
    };
}

pub mod accumulators;
pub mod array;
pub mod boolean;
pub mod comparison;
pub mod date;
pub mod object;

pub use accumulators::{AddToSet, Avg, Count, First, Last, Max, Min, Push, Sum};
pub use array::{
    ArrayToObject, ConcatArrays, Filter, FirstN, In, IsArray, LastN, Map, MaxN, MinN, Size,
    SortArray, SortArraySpec,
};
pub use boolean::{And, Not, Or};
pub use comparison::{Cmp, Eq, Gt, Gte, Lt, Lte, Ne};
pub use date::{
    DayOfMonth, DayOfWeek, DayOfYear, Hour, Millisecond, Minute, Month, Second, Week, Year,
};
pub use object::{MergeObjects, ObjectToArray};


type OperatorBuilder = fn(Args, &ArgOptions) -> Result<Arc<dyn Operator>>;

fn build<T: Operator + FromArgs + 'static>(
    args: Args,
    options: &ArgOptions,
) -> Result<Arc<dyn Operator>> {
    Ok(Arc::new(T::from_args_with(args, options)?))
}

fn register<T: Operator + FromArgs + 'static>(registry: &mut BTreeMap<&'static str, OperatorBuilder>) {
    registry.insert(T::TAG, build::<T> as OperatorBuilder);
}

lazy_static! {
    static ref OPERATORS: BTreeMap<&'static str, OperatorBuilder> = {
        let mut registry = BTreeMap::new();
        // accumulators
        register::<AddToSet>(&mut registry);
        register::<Avg>(&mut registry);
        register::<Count>(&mut registry);
        register::<First>(&mut registry);
        register::<Last>(&mut registry);
        register::<Max>(&mut registry);
        register::<Min>(&mut registry);
        register::<Push>(&mut registry);
        register::<Sum>(&mut registry);
        // array
        register::<ArrayToObject>(&mut registry);
        register::<ConcatArrays>(&mut registry);
        register::<Filter>(&mut registry);
        register::<FirstN>(&mut registry);
        register::<In>(&mut registry);
        register::<IsArray>(&mut registry);
        register::<LastN>(&mut registry);
        register::<Map>(&mut registry);
        register::<MaxN>(&mut registry);
        register::<MinN>(&mut registry);
        register::<Size>(&mut registry);
        register::<SortArray>(&mut registry);
        // boolean
        register::<And>(&mut registry);
        register::<Not>(&mut registry);
        register::<Or>(&mut registry);
        // comparison
        register::<Cmp>(&mut registry);
        register::<Eq>(&mut registry);
        register::<Gt>(&mut registry);
        register::<Gte>(&mut registry);
        register::<Lt>(&mut registry);
        register::<Lte>(&mut registry);
        register::<Ne>(&mut registry);
        // date
        register::<DayOfMonth>(&mut registry);
        register::<DayOfWeek>(&mut registry);
        register::<DayOfYear>(&mut registry);
        register::<Hour>(&mut registry);
        register::<Millisecond>(&mut registry);
        register::<Minute>(&mut registry);
        register::<Month>(&mut registry);
        register::<Second>(&mut registry);
        register::<Week>(&mut registry);
        register::<Year>(&mut registry);
        // object
        register::<MergeObjects>(&mut registry);
        register::<ObjectToArray>(&mut registry);
        registry
    };
}

/// Constructs the operator registered under `tag` from keyword arguments
/// and returns it as an expression node.
pub fn from_args(tag: &str, args: Args) -> Result<Expression> {
    from_args_with(tag, args, &ArgOptions::default())
}

pub fn from_args_with(tag: &str, args: Args, options: &ArgOptions) -> Result<Expression> {
    let builder = OPERATORS.get(tag).ok_or_else(|| Error::UnexpectedField {
        owner: "operator",
        field: tag.to_string(),
        expected: "a registered operator tag".to_string(),
    })?;
    Ok(Expression::Node(builder(args, options)?.into_node()))
}

/// Every registered operator tag, in sorted order.
pub fn tags() -> impl Iterator<Item = &'static str> {
    OPERATORS.keys().copied()
}
