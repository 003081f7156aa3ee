use crate::{
    args::{Fields, FromArgs},
    error::{Error, Result},
    expression::{Body, Express, Expression},
};
use bson::Bson;

fn non_empty(field: &str, value: String) -> Result<String> {
    if value.is_empty() {
        return Err(Error::missing(Out::TAG, field));
    }
    Ok(value)
}

/// `$out` writes the pipeline's results to a collection, optionally in
/// another database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Out {
    db: Option<String>,
    coll: String,
}

impl Out {
    pub fn new(coll: impl Into<String>) -> Result<Self> {
        Ok(Out {
            db: None,
            coll: non_empty("coll", coll.into())?,
        })
    }

    pub fn in_database(self, db: impl Into<String>) -> Result<Self> {
        Ok(Out {
            db: Some(non_empty("db", db.into())?),
            ..self
        })
    }

    pub fn coll(&self) -> &str {
        &self.coll
    }

    pub fn db(&self) -> Option<&str> {
        self.db.as_deref()
    }
}

impl FromArgs for Out {
    const TAG: &'static str = "$out";
    const FIELDS: &'static [&'static str] = &["coll", "db"];
    const ALIASES: &'static [(&'static str, &'static str)] =
        &[("collection", "coll"), ("database", "db")];

    fn from_fields(fields: &mut Fields) -> Result<Self> {
        let out = Out::new(fields.required_string("coll")?)?;
        match fields.optional_string("db")? {
            Some(db) => out.in_database(db),
            None => Ok(out),
        }
    }
}

impl Express for Out {
    fn tag(&self) -> &'static str {
        Self::TAG
    }

    fn body(&self) -> Expression {
        Body::new()
            .optional("db", self.db.clone().map(Bson::String))
            .field("coll", Bson::String(self.coll.clone()))
            .build()
    }
}

impl_stage!(Out);
