//! Keyword construction. Glue code that only has raw field names and
//! values builds stages and operators through [`FromArgs`]: aliases are
//! mapped onto canonical field names first, unknown names are rejected,
//! and the resulting [`Fields`] are handed to the same validating
//! constructors the typed API uses.

use crate::{
    error::{Error, Result},
    expression::Expression,
    naming::to_snake_case,
    options::{ArgOptions, Naming},
};
use bson::Bson;
use itertools::Itertools;
use linked_hash_map::LinkedHashMap;
use mqlbuilder_datastructures::UniqueFieldMap;
use tracing::trace;


/// Raw keyword arguments, in the order the caller supplied them.
pub type Args = LinkedHashMap<String, Expression>;

pub trait FromArgs: Sized {
    /// The wire tag of the type being constructed.
    const TAG: &'static str;
    /// Canonical field names.
    const FIELDS: &'static [&'static str];
    /// `(alias, canonical)` pairs.
    const ALIASES: &'static [(&'static str, &'static str)] = &[];

    fn from_fields(fields: &mut Fields) -> Result<Self>;

    fn from_args(args: Args) -> Result<Self> {
        Self::from_args_with(args, &ArgOptions::default())
    }

    fn from_args_with(args: Args, options: &ArgOptions) -> Result<Self> {
        let mut fields = Fields::resolve(Self::TAG, args, Self::FIELDS, Self::ALIASES, options)?;
        Self::from_fields(&mut fields)
    }
}

/// Fields holds keyword arguments after alias resolution, keyed by
/// canonical field name. Constructors take values out one field at a time.
#[derive(Debug)]
pub struct Fields {
    owner: &'static str,
    values: UniqueFieldMap<Expression>,
}

impl Fields {
    pub fn resolve(
        owner: &'static str,
        args: Args,
        fields: &[&'static str],
        aliases: &[(&'static str, &'static str)],
        options: &ArgOptions,
    ) -> Result<Self> {
        let mut values = UniqueFieldMap::new();
        for (name, value) in args {
            let canonical = canonical_name(&name, fields, aliases, options).ok_or_else(|| {
                Error::UnexpectedField {
                    owner,
                    field: name.clone(),
                    expected: fields.iter().join(", "),
                }
            })?;
            if canonical != name {
                trace!(owner, alias = %name, canonical, "resolved field alias");
            }
            values.insert(canonical, value).map_err(|e| {
                Error::invalid(
                    owner,
                    e.get_field_name(),
                    "supplied more than once under different names",
                )
            })?;
        }
        Ok(Fields { owner, values })
    }

    pub fn owner(&self) -> &'static str {
        self.owner
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn peek(&self, name: &str) -> Option<&Expression> {
        self.values.get(name)
    }

    /// Takes a field that may be absent. An explicit null counts as
    /// supplied.
    pub fn optional(&mut self, name: &str) -> Option<Expression> {
        self.values.take(name)
    }

    pub fn required(&mut self, name: &str) -> Result<Expression> {
        self.optional(name)
            .ok_or_else(|| Error::missing(self.owner, name))
    }

    /// Takes a field that is absent when missing or null.
    pub fn optional_non_null(&mut self, name: &str) -> Option<Expression> {
        self.optional(name).filter(|e| !e.is_null())
    }

    pub fn optional_string(&mut self, name: &str) -> Result<Option<String>> {
        match self.optional_non_null(name) {
            None => Ok(None),
            Some(e) => e
                .as_string()
                .map(Some)
                .ok_or_else(|| Error::invalid(self.owner, name, "expected a string")),
        }
    }

    pub fn required_string(&mut self, name: &str) -> Result<String> {
        self.optional_string(name)?
            .ok_or_else(|| Error::missing(self.owner, name))
    }

    pub fn optional_i64(&mut self, name: &str) -> Result<Option<i64>> {
        match self.optional_non_null(name) {
            None => Ok(None),
            Some(e) => e
                .as_i64()
                .map(Some)
                .ok_or_else(|| Error::invalid(self.owner, name, "expected an integer")),
        }
    }

    pub fn required_i64(&mut self, name: &str) -> Result<i64> {
        self.optional_i64(name)?
            .ok_or_else(|| Error::missing(self.owner, name))
    }

    pub fn optional_bool(&mut self, name: &str) -> Result<Option<bool>> {
        match self.optional_non_null(name) {
            None => Ok(None),
            Some(Expression::Literal(Bson::Boolean(b))) => Ok(Some(b)),
            Some(_) => Err(Error::invalid(self.owner, name, "expected a boolean")),
        }
    }

    pub fn optional_document(
        &mut self,
        name: &str,
    ) -> Result<Option<LinkedHashMap<String, Expression>>> {
        match self.optional_non_null(name) {
            None => Ok(None),
            Some(e) => e
                .into_document()
                .map(Some)
                .map_err(|_| Error::invalid(self.owner, name, "expected a document")),
        }
    }

    pub fn optional_array(&mut self, name: &str) -> Result<Option<Vec<Expression>>> {
        match self.optional_non_null(name) {
            None => Ok(None),
            Some(e) => e
                .into_array()
                .map(Some)
                .map_err(|_| Error::invalid(self.owner, name, "expected an array")),
        }
    }

    pub fn required_array(&mut self, name: &str) -> Result<Vec<Expression>> {
        self.optional_array(name)?
            .ok_or_else(|| Error::missing(self.owner, name))
    }

    /// Takes a list of field names. A single string is accepted as a list of
    /// one.
    pub fn optional_names(&mut self, name: &str) -> Result<Option<Vec<String>>> {
        let owner = self.owner;
        match self.optional_non_null(name) {
            None => Ok(None),
            Some(e) => match e.as_string() {
                Some(s) => Ok(Some(vec![s])),
                None => e
                    .into_array()
                    .map_err(|_| Error::invalid(owner, name, "expected a list of field names"))?
                    .into_iter()
                    .map(|e| {
                        e.as_string().ok_or_else(|| {
                            Error::invalid(owner, name, "expected a list of field names")
                        })
                    })
                    .collect::<Result<Vec<String>>>()
                    .map(Some),
            },
        }
    }
}

/// Finds the canonical field a supplied name refers to. Canonical names
/// win over aliases; the wire spelling is only consulted when the options
/// allow it.
fn canonical_name(
    name: &str,
    fields: &[&'static str],
    aliases: &[(&'static str, &'static str)],
    options: &ArgOptions,
) -> Option<&'static str> {
    let lookup = |candidate: &str| {
        fields
            .iter()
            .find(|f| **f == candidate)
            .copied()
            .or_else(|| {
                aliases
                    .iter()
                    .find(|(alias, _)| *alias == candidate)
                    .map(|(_, canonical)| *canonical)
            })
    };
    lookup(name).or_else(|| match options.naming {
        Naming::Canonical => None,
        Naming::AcceptWireNames => {
            let snake = to_snake_case(name);
            if snake == name {
                None
            } else {
                lookup(&snake)
            }
        }
    })
}
