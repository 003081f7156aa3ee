use crate::{
    args::{Fields, FromArgs},
    error::{Error, Result},
    expression::{normalize_field_path, Body, Express, Expression, FIELD_PATH_MARKER},
    stages::validate_output_field,
};

/// `$unwind` emits one document per element of the array at `path`.
///
/// The stage always renders all three keys, with `includeArrayIndex` set
/// to null when no index field was requested.
#[derive(Debug, Clone)]
pub struct Unwind {
    path: Expression,
    include_array_index: Option<String>,
    preserve_null_and_empty_arrays: bool,
}

impl Unwind {
    pub fn new(path: impl Into<Expression>) -> Result<Self> {
        let path = path.into();
        if path.is_null() {
            return Err(Error::missing(Self::TAG, "path"));
        }
        if let Some(p) = path.as_string() {
            if p.is_empty() {
                return Err(Error::missing(Self::TAG, "path"));
            }
            if p.trim_start_matches(FIELD_PATH_MARKER).is_empty() {
                return Err(Error::invalid(
                    Self::TAG,
                    "path",
                    format!("`{p}` does not name a field"),
                ));
            }
        }
        Ok(Unwind {
            path: normalize_field_path(path),
            include_array_index: None,
            preserve_null_and_empty_arrays: false,
        })
    }

    /// Names the output field that receives the element's array index.
    pub fn with_array_index(self, field: impl Into<String>) -> Result<Self> {
        let field = field.into();
        validate_output_field(Self::TAG, "include_array_index", &field)?;
        Ok(Unwind {
            include_array_index: Some(field),
            ..self
        })
    }

    /// Keeps documents whose array is missing, null or empty.
    pub fn preserving(self, preserve: bool) -> Self {
        Unwind {
            preserve_null_and_empty_arrays: preserve,
            ..self
        }
    }

    pub fn path(&self) -> &Expression {
        &self.path
    }
}

impl FromArgs for Unwind {
    const TAG: &'static str = "$unwind";
    const FIELDS: &'static [&'static str] = &[
        "path",
        "include_array_index",
        "preserve_null_and_empty_arrays",
    ];
    const ALIASES: &'static [(&'static str, &'static str)] = &[
        ("path_to_array", "path"),
        ("always", "preserve_null_and_empty_arrays"),
    ];

    fn from_fields(fields: &mut Fields) -> Result<Self> {
        let mut unwind = Unwind::new(fields.required("path")?)?;
        if let Some(index) = fields.optional_string("include_array_index")? {
            unwind = unwind.with_array_index(index)?;
        }
        let preserve = fields
            .optional_bool("preserve_null_and_empty_arrays")?
            .unwrap_or(false);
        Ok(unwind.preserving(preserve))
    }
}

impl Express for Unwind {
    fn tag(&self) -> &'static str {
        Self::TAG
    }

    fn body(&self) -> Expression {
        Body::new()
            .field("path", self.path.clone())
            .nullable("include_array_index", self.include_array_index.clone())
            .field(
                "preserve_null_and_empty_arrays",
                self.preserve_null_and_empty_arrays,
            )
            .build()
    }
}

impl_stage!(Unwind);
