//! Boolean schemas

use super::SchemaType;
use crate::locale::Message;
use crate::schema::{Kind, Schema};
use crate::test_registry::Test;
use crate::value::Value;

typed_schema!(
    /// Booleans; `"true"`, `"false"`, `"1"`, `"0"`, `1` and `0` are coerced
    BooleanSchema
);

pub fn boolean() -> BooleanSchema {
    BooleanSchema(Schema::new(Kind::Boolean))
}

impl BooleanSchema {
    pub fn is_true(self) -> Self {
        self.is_value(true, None)
    }

    pub fn is_true_with(self, message: impl Into<Message>) -> Self {
        self.is_value(true, Some(message.into()))
    }

    pub fn is_false(self) -> Self {
        self.is_value(false, None)
    }

    pub fn is_false_with(self, message: impl Into<Message>) -> Self {
        self.is_value(false, Some(message.into()))
    }

    fn is_value(self, expected: bool, message: Option<Message>) -> Self {
        self.test(
            Test::new("isValue", move |v: &Value, _| v.as_bool().map_or(true, |b| b == expected))
                .param("value", expected)
                .message_opt(message)
                .skip_absent()
                .exclusive(),
        )
    }
}
