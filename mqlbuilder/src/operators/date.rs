//! Date part extraction. Every operator here takes a date expression and
//! an optional timezone. Without a timezone the date is rendered bare,
//! `{"$hour": "$ts"}`; with one, the operand becomes
//! `{"$hour": {"date": "$ts", "timezone": "Europe/Paris"}}`.

use crate::expression::{Body, Expression};

macro_rules! date_operator {
    ($(#[$meta:meta])* $name:ident, $tag:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name {
            date: Expression,
            timezone: Option<Expression>,
        }

        impl $name {
            pub fn new(date: impl Into<Expression>) -> Self {
                $name {
                    date: date.into(),
                    timezone: None,
                }
            }

            /// Sets the timezone, given as an Olson name or a UTC offset.
            pub fn with_timezone(self, timezone: impl Into<Expression>) -> Self {
                $name {
                    timezone: Some(timezone.into()),
                    ..self
                }
            }

            pub fn date(&self) -> &Expression {
                &self.date
            }

            pub fn timezone(&self) -> Option<&Expression> {
                self.timezone.as_ref()
            }
        }

        impl $crate::args::FromArgs for $name {
            const TAG: &'static str = $tag;
            const FIELDS: &'static [&'static str] = &["date", "timezone"];
            const ALIASES: &'static [(&'static str, &'static str)] =
                &[("operand", "date"), ("expression", "date")];

            fn from_fields(fields: &mut $crate::args::Fields) -> $crate::error::Result<Self> {
                let date = $name::new(fields.required("date")?);
                Ok(match fields.optional_non_null("timezone") {
                    Some(tz) => date.with_timezone(tz),
                    None => date,
                })
            }
        }

        impl $crate::expression::Express for $name {
            fn tag(&self) -> &'static str {
                <Self as $crate::args::FromArgs>::TAG
            }

            fn body(&self) -> Expression {
                match &self.timezone {
                    None => self.date.clone(),
                    Some(tz) => Body::new()
                        .field("date", self.date.clone())
                        .field("timezone", tz.clone())
                        .build(),
                }
            }
        }

        impl_operator!($name);
    };
}

date_operator!(Year, "$year");
date_operator!(Month, "$month");
date_operator!(
    /// ISO-unaware week of the year, 0 through 53.
    Week,
    "$week"
);
date_operator!(DayOfYear, "$dayOfYear");
date_operator!(DayOfMonth, "$dayOfMonth");
date_operator!(
    /// Day of the week, 1 (Sunday) through 7 (Saturday).
    DayOfWeek,
    "$dayOfWeek"
);
date_operator!(Hour, "$hour");
date_operator!(Minute, "$minute");
date_operator!(Second, "$second");
date_operator!(
    /// Millisecond portion of a date, 0 through 999.
    Millisecond,
    "$millisecond"
);
