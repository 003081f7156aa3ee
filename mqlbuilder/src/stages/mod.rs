//! Pipeline stages. Each stage renders as `{"$<stage>": <body>}` and
//! checks its arguments when constructed, so a stage value that exists is
//! always renderable.

use crate::{
    args::{Args, Fields, FromArgs},
    error::{Error, Result},
    expression::{Express, Expression},
    options::ArgOptions,
};
use bson::{Bson, Document};
use lazy_static::lazy_static;
use linked_hash_map::LinkedHashMap;
use std::{collections::BTreeMap, sync::Arc};

pub mod bucket;
pub mod count;
pub mod group;
pub mod limit;
pub mod lookup;
pub mod match_stage;
pub mod out;
pub mod project;
pub mod replace;
pub mod set;
pub mod sort;
pub mod unwind;

pub use bucket::{Bucket, BucketAuto, Granularity};
pub use count::Count;
pub use group::Group;
pub use limit::{Limit, Sample, Skip, DEFAULT_SAMPLE_SIZE};
pub use lookup::{Lookup, UnionWith};
pub use match_stage::Match;
pub use out::Out;
pub use project::Project;
pub use replace::{ReplaceRoot, ReplaceWith};
pub use set::{AddFields, Set, Unset};
pub use sort::{Sort, SortByCount};
pub use unwind::Unwind;

#[cfg(test)]
mod test;

/// Stage is implemented by every pipeline stage. Like [`Operator`], it
/// only exists through its concrete implementations.
///
/// [`Operator`]: crate::operators::Operator
pub trait Stage: Express {
    fn into_node(self: Arc<Self>) -> Arc<dyn Express>;
}

/// FieldSelection names a set of fields, either as a list of names or as
/// a mapping whose keys are selected when their value is truthy
/// (`true` or a non-zero number). Used by the include/exclude form of
/// `$project` and the ascending/descending form of `$sort`.
#[derive(Debug, Clone)]
pub enum FieldSelection {
    Names(Vec<String>),
    Mapping(LinkedHashMap<String, Expression>),
}

impl FieldSelection {
    /// The selected field names, in the order they were given.
    pub fn selected(&self) -> Vec<String> {
        match self {
            FieldSelection::Names(names) => names.clone(),
            FieldSelection::Mapping(mapping) => mapping
                .iter()
                .filter(|(_, v)| is_truthy(v))
                .map(|(k, _)| k.clone())
                .collect(),
        }
    }

    pub(crate) fn take(fields: &mut Fields, name: &str) -> Result<Option<FieldSelection>> {
        match fields.peek(name) {
            Some(e) if e.is_document() => {
                Ok(fields.optional_document(name)?.map(FieldSelection::Mapping))
            }
            _ => Ok(fields.optional_names(name)?.map(FieldSelection::Names)),
        }
    }
}

fn is_truthy(expr: &Expression) -> bool {
    match expr {
        Expression::Literal(Bson::Boolean(b)) => *b,
        Expression::Literal(Bson::Int32(i)) => *i != 0,
        Expression::Literal(Bson::Int64(i)) => *i != 0,
        Expression::Literal(Bson::Double(f)) => *f != 0.0,
        Expression::Literal(Bson::Null) => false,
        _ => true,
    }
}

impl<S: Into<String>> From<Vec<S>> for FieldSelection {
    fn from(names: Vec<S>) -> Self {
        FieldSelection::Names(names.into_iter().map(Into::into).collect())
    }
}

impl<const N: usize> From<[&str; N]> for FieldSelection {
    fn from(names: [&str; N]) -> Self {
        FieldSelection::Names(names.iter().map(|n| n.to_string()).collect())
    }
}

impl From<&[&str]> for FieldSelection {
    fn from(names: &[&str]) -> Self {
        FieldSelection::Names(names.iter().map(|n| n.to_string()).collect())
    }
}

impl From<LinkedHashMap<String, Expression>> for FieldSelection {
    fn from(mapping: LinkedHashMap<String, Expression>) -> Self {
        FieldSelection::Mapping(mapping)
    }
}

impl From<Document> for FieldSelection {
    fn from(mapping: Document) -> Self {
        FieldSelection::Mapping(
            mapping
                .into_iter()
                .map(|(k, v)| (k, Expression::Literal(v)))
                .collect(),
        )
    }
}

/// Takes a required mapping-shaped field and rejects an empty one.
pub(crate) fn non_empty_document(
    owner: &'static str,
    field: &str,
    expr: Expression,
) -> Result<LinkedHashMap<String, Expression>> {
    let document = expr
        .into_document()
        .map_err(|_| Error::invalid(owner, field, "expected a document"))?;
    if document.is_empty() {
        return Err(Error::missing(owner, field));
    }
    Ok(document)
}

/// Checks a name used for an output field: it must be non-empty and must
/// not look like a field path.
pub(crate) fn validate_output_field(owner: &'static str, field: &str, name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::missing(owner, field));
    }
    if name.starts_with(crate::expression::FIELD_PATH_MARKER) {
        return Err(Error::invalid(
            owner,
            field,
            format!("`{name}` must not start with `$`"),
        ));
    }
    Ok(())
}

type StageBuilder = fn(Args, &ArgOptions) -> Result<Arc<dyn Stage>>;

fn build<T: Stage + FromArgs + 'static>(args: Args, options: &ArgOptions) -> Result<Arc<dyn Stage>> {
    Ok(Arc::new(T::from_args_with(args, options)?))
}

fn register<T: Stage + FromArgs + 'static>(registry: &mut BTreeMap<&'static str, StageBuilder>) {
    registry.insert(T::TAG, build::<T> as StageBuilder);
}

lazy_static! {
    static ref STAGES: BTreeMap<&'static str, StageBuilder> = {
        let mut registry = BTreeMap::new();
        register::<AddFields>(&mut registry);
        register::<Bucket>(&mut registry);
        register::<BucketAuto>(&mut registry);
        register::<Count>(&mut registry);
        register::<Group>(&mut registry);
        register::<Limit>(&mut registry);
        register::<Lookup>(&mut registry);
        register::<Match>(&mut registry);
        register::<Out>(&mut registry);
        register::<Project>(&mut registry);
        register::<ReplaceRoot>(&mut registry);
        register::<ReplaceWith>(&mut registry);
        register::<Sample>(&mut registry);
        register::<Set>(&mut registry);
        register::<Skip>(&mut registry);
        register::<Sort>(&mut registry);
        register::<SortByCount>(&mut registry);
        register::<UnionWith>(&mut registry);
        register::<Unset>(&mut registry);
        register::<Unwind>(&mut registry);
        registry
    };
}

/// Constructs the stage registered under `tag` from keyword arguments.
pub fn from_args(tag: &str, args: Args) -> Result<Arc<dyn Stage>> {
    from_args_with(tag, args, &ArgOptions::default())
}

pub fn from_args_with(tag: &str, args: Args, options: &ArgOptions) -> Result<Arc<dyn Stage>> {
    let builder = STAGES.get(tag).ok_or_else(|| Error::UnexpectedField {
        owner: "stage",
        field: tag.to_string(),
        expected: "a registered stage tag".to_string(),
    })?;
    builder(args, options)
}

pub fn is_registered(tag: &str) -> bool {
    STAGES.contains_key(tag)
}

/// Every registered stage tag, in sorted order.
pub fn tags() -> impl Iterator<Item = &'static str> {
    STAGES.keys().copied()
}
