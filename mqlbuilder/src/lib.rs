//! Typed builders for MongoDB aggregation pipelines.
//!
//! Every stage and expression operator is a small immutable value that
//! validates its inputs when it is constructed and renders itself into the
//! exact document shape the server expects. Operators nest inside stage
//! arguments as [`Expression`]s; resolving a tree of nested builders,
//! literals and mappings collapses it deterministically into plain
//! [`bson::Bson`].
//!
//! ```
//! use bson::doc;
//! use mqlbuilder::{operators::Sum, Pipeline};
//!
//! let pipeline = Pipeline::new()
//!     .match_(doc! {"status": "A"})?
//!     .group("$cust_id", mqlbuilder::map! {"total" => Sum::new("$amount")})?
//!     .limit(3)?;
//!
//! assert_eq!(
//!     pipeline.render()?,
//!     vec![
//!         doc! {"$match": {"status": "A"}},
//!         doc! {"$group": {"_id": "$cust_id", "total": {"$sum": "$amount"}}},
//!         doc! {"$limit": 3},
//!     ]
//! );
//! # Ok::<(), mqlbuilder::Error>(())
//! ```

/// Builds a `LinkedHashMap<String, Expression>` from `key => value` pairs,
/// converting every value into an [`Expression`].
#[macro_export]
macro_rules! map {
    ($($key:expr => $val:expr),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut map = $crate::linked_hash_map::LinkedHashMap::<String, $crate::Expression>::new();
        $(
            map.insert(($key).to_string(), $crate::Expression::from($val));
        )*
        map
    }};
}

/// Builds keyword arguments for [`args::FromArgs`]. Identical to
/// [`map!`]; the separate name reads better at construction sites.
#[macro_export]
macro_rules! args {
    ($($key:expr => $val:expr),* $(,)?) => {
        $crate::map! { $($key => $val),* }
    };
}

macro_rules! impl_operator {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::operators::Operator for $ty {
                fn into_node(
                    self: std::sync::Arc<Self>,
                ) -> std::sync::Arc<dyn $crate::expression::Express> {
                    self
                }
            }

            impl From<$ty> for $crate::expression::Expression {
                fn from(op: $ty) -> Self {
                    $crate::expression::Expression::Node(std::sync::Arc::new(op))
                }
            }
        )+
    };
}

macro_rules! impl_stage {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::stages::Stage for $ty {
                fn into_node(
                    self: std::sync::Arc<Self>,
                ) -> std::sync::Arc<dyn $crate::expression::Express> {
                    self
                }
            }

            impl From<$ty> for $crate::expression::Expression {
                fn from(stage: $ty) -> Self {
                    $crate::expression::Expression::Node(std::sync::Arc::new(stage))
                }
            }
        )+
    };
}

#[cfg(test)]
macro_rules! test_statement {
    ($func_name:ident, expected = $expected:expr, input = $input:expr $(,)?) => {
        #[test]
        fn $func_name() {
            #[allow(unused_imports)]
            use crate::expression::Express;
            let expected: crate::Result<bson::Document> = $expected;
            let actual = $input.and_then(|node| node.statement());
            assert_eq!(expected, actual);
        }
    };
}

#[cfg(test)]
macro_rules! test_from_args {
    ($func_name:ident, expected = $expected:expr, stage = $tag:expr, args = $args:expr $(,)?) => {
        #[test]
        fn $func_name() {
            #[allow(unused_imports)]
            use crate::expression::Express;
            let expected: crate::Result<bson::Document> = $expected;
            let actual = crate::stages::from_args($tag, $args).and_then(|stage| stage.statement());
            assert_eq!(expected, actual);
        }
    };
    ($func_name:ident, expected = $expected:expr, operator = $tag:expr, args = $args:expr $(,)?) => {
        #[test]
        fn $func_name() {
            let expected: crate::Result<bson::Bson> = $expected;
            let actual = crate::operators::from_args($tag, $args).and_then(|expr| crate::resolve(&expr));
            assert_eq!(expected, actual);
        }
    };
}

pub mod args;
pub mod error;
pub mod executor;
pub mod expression;
pub mod naming;
pub mod operators;
pub mod options;
pub mod pipeline;
pub mod resolve;
pub mod stages;

#[doc(hidden)]
pub use linked_hash_map;

pub use crate::{
    args::{Args, FromArgs},
    error::{Error, Result, UserError},
    executor::Executor,
    expression::{Express, Expression, Ref},
    options::{ArgOptions, Naming, RenderOptions},
    pipeline::{Detached, Pipeline},
    resolve::{resolve, resolve_with},
};
