use crate::{
    args::{Fields, FromArgs},
    error::{Error, Result},
    expression::{Express, Expression, PATH_SEPARATOR},
    stages::validate_output_field,
};

/// `$count` passes on a single document holding the number of input
/// documents under `name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Count {
    name: String,
}

impl Count {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        validate_output_field(Self::TAG, "name", &name)?;
        if name.contains(PATH_SEPARATOR) {
            return Err(Error::invalid(
                Self::TAG,
                "name",
                format!("`{name}` must not contain `{PATH_SEPARATOR}`"),
            ));
        }
        Ok(Count { name })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl FromArgs for Count {
    const TAG: &'static str = "$count";
    const FIELDS: &'static [&'static str] = &["name"];
    const ALIASES: &'static [(&'static str, &'static str)] = &[("field", "name")];

    fn from_fields(fields: &mut Fields) -> Result<Self> {
        Count::new(fields.required_string("name")?)
    }
}

impl Express for Count {
    fn tag(&self) -> &'static str {
        Self::TAG
    }

    fn body(&self) -> Expression {
        Expression::from(bson::Bson::String(self.name.clone()))
    }
}

impl_stage!(Count);
