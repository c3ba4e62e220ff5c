//! Number schemas

use super::{compare_numbers, limit_test, SchemaType};
use crate::locale::Message;
use crate::schema::{Kind, Schema};
use crate::test_registry::{Param, Test};
use crate::transform::Transform;
use crate::value::Value;

typed_schema!(
    /// Finite or infinite doubles; `NaN` never passes the type check
    NumberSchema
);

pub fn number() -> NumberSchema {
    NumberSchema(Schema::new(Kind::Number))
}

/// Rounding used by [`NumberSchema::round`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rounding {
    Floor,
    Ceil,
    Trunc,
    Round,
}

impl NumberSchema {
    fn compare(
        self,
        name: &'static str,
        param: &'static str,
        limit: Param,
        message: Option<Message>,
        cmp: fn(f64, f64) -> bool,
    ) -> Self {
        self.test(limit_test(name, param, limit, message, move |v, l| {
            compare_numbers(v.as_f64(), l, cmp)
        }))
    }

    /// Greater than or equal to `min`
    pub fn min(self, min: impl Into<Param>) -> Self {
        self.compare("min", "min", min.into(), None, |v, l| v >= l)
    }

    pub fn min_with(self, min: impl Into<Param>, message: impl Into<Message>) -> Self {
        self.compare("min", "min", min.into(), Some(message.into()), |v, l| v >= l)
    }

    /// Less than or equal to `max`
    pub fn max(self, max: impl Into<Param>) -> Self {
        self.compare("max", "max", max.into(), None, |v, l| v <= l)
    }

    pub fn max_with(self, max: impl Into<Param>, message: impl Into<Message>) -> Self {
        self.compare("max", "max", max.into(), Some(message.into()), |v, l| v <= l)
    }

    pub fn more_than(self, more: impl Into<Param>) -> Self {
        self.compare("moreThan", "more", more.into(), None, |v, l| v > l)
    }

    pub fn more_than_with(self, more: impl Into<Param>, message: impl Into<Message>) -> Self {
        self.compare("moreThan", "more", more.into(), Some(message.into()), |v, l| v > l)
    }

    pub fn less_than(self, less: impl Into<Param>) -> Self {
        self.compare("lessThan", "less", less.into(), None, |v, l| v < l)
    }

    pub fn less_than_with(self, less: impl Into<Param>, message: impl Into<Message>) -> Self {
        self.compare("lessThan", "less", less.into(), Some(message.into()), |v, l| v < l)
    }

    pub fn positive(self) -> Self {
        self.compare("positive", "more", Param::from(0), None, |v, l| v > l)
    }

    pub fn positive_with(self, message: impl Into<Message>) -> Self {
        self.compare("positive", "more", Param::from(0), Some(message.into()), |v, l| v > l)
    }

    pub fn negative(self) -> Self {
        self.compare("negative", "less", Param::from(0), None, |v, l| v < l)
    }

    pub fn negative_with(self, message: impl Into<Message>) -> Self {
        self.compare("negative", "less", Param::from(0), Some(message.into()), |v, l| v < l)
    }

    pub fn integer(self) -> Self {
        self.integer_rule(None)
    }

    pub fn integer_with(self, message: impl Into<Message>) -> Self {
        self.integer_rule(Some(message.into()))
    }

    fn integer_rule(self, message: Option<Message>) -> Self {
        self.test(
            Test::new("integer", |v: &Value, _| {
                v.as_f64().map_or(true, |n| n.is_finite() && n.fract() == 0.0)
            })
            .message_opt(message)
            .skip_absent()
            .exclusive(),
        )
    }

    /// Drop the fractional part when casting
    pub fn truncate(self) -> Self {
        self.round(Rounding::Trunc)
    }

    pub fn round(self, method: Rounding) -> Self {
        self.map_schema(|s| {
            s.add_transform(Transform::named("round", move |v, _, _| match v {
                Value::Number(n) => Value::Number(match method {
                    Rounding::Floor => n.floor(),
                    Rounding::Ceil => n.ceil(),
                    Rounding::Trunc => n.trunc(),
                    Rounding::Round => n.round(),
                }),
                other => other,
            }))
        })
    }
}
