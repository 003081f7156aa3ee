use crate::{
    args::{Fields, FromArgs},
    error::{Error, Result},
    expression::{Express, Expression},
    stages::non_empty_document,
};
use bson::Bson;
use linked_hash_map::LinkedHashMap;

macro_rules! field_setting_stage {
    ($(#[$meta:meta])* $name:ident, $tag:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name {
            document: LinkedHashMap<String, Expression>,
        }

        impl $name {
            pub fn new(document: impl Into<Expression>) -> Result<Self> {
                Ok($name {
                    document: non_empty_document(Self::TAG, "document", document.into())?,
                })
            }

            pub fn document(&self) -> &LinkedHashMap<String, Expression> {
                &self.document
            }
        }

        impl FromArgs for $name {
            const TAG: &'static str = $tag;
            const FIELDS: &'static [&'static str] = &["document"];
            const ALIASES: &'static [(&'static str, &'static str)] = &[("fields", "document")];

            fn from_fields(fields: &mut Fields) -> Result<Self> {
                $name::new(fields.required("document")?)
            }
        }

        impl Express for $name {
            fn tag(&self) -> &'static str {
                Self::TAG
            }

            fn body(&self) -> Expression {
                Expression::Document(self.document.clone())
            }
        }
    };
}

field_setting_stage!(
    /// `$set` adds new fields or overwrites existing ones.
    Set,
    "$set"
);
field_setting_stage!(
    /// `$addFields` is the older spelling of `$set`.
    AddFields,
    "$addFields"
);

/// `$unset` removes one or more fields. A single field renders as a
/// string, several as an array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unset {
    fields: Vec<String>,
}

impl Unset {
    pub fn new<S: Into<String>>(fields: impl IntoIterator<Item = S>) -> Result<Self> {
        let fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        if fields.is_empty() {
            return Err(Error::missing(Self::TAG, "fields"));
        }
        if let Some(empty) = fields.iter().position(String::is_empty) {
            return Err(Error::invalid(
                Self::TAG,
                "fields",
                format!("field name at position {empty} is empty"),
            ));
        }
        Ok(Unset { fields })
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }
}

impl FromArgs for Unset {
    const TAG: &'static str = "$unset";
    const FIELDS: &'static [&'static str] = &["fields"];
    const ALIASES: &'static [(&'static str, &'static str)] = &[("field", "fields")];

    fn from_fields(fields: &mut Fields) -> Result<Self> {
        let names = fields
            .optional_names("fields")?
            .ok_or_else(|| Error::missing(Self::TAG, "fields"))?;
        Unset::new(names)
    }
}

impl Express for Unset {
    fn tag(&self) -> &'static str {
        Self::TAG
    }

    fn body(&self) -> Expression {
        match self.fields.as_slice() {
            [single] => Expression::Literal(Bson::String(single.clone())),
            many => Expression::Literal(Bson::Array(
                many.iter().cloned().map(Bson::String).collect(),
            )),
        }
    }
}

impl_stage!(Set, AddFields, Unset);
