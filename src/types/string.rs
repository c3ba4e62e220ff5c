//! String schemas

use super::{compare_numbers, limit_test, SchemaType};
use crate::locale::Message;
use crate::schema::{Kind, Schema};
use crate::test_registry::{Param, Test};
use crate::transform::Transform;
use crate::value::Value;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref EMAIL: Regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    )
    .expect("email pattern");
    static ref URL: Regex =
        Regex::new(r"(?i)^(https?|ftp)://[^\s/$.?#][^\s]*$").expect("url pattern");
}

typed_schema!(
    /// Strings; numbers, booleans and dates are coerced to their text
    StringSchema
);

pub fn string() -> StringSchema {
    StringSchema(Schema::new(Kind::String))
}

fn char_count(value: &Value) -> Option<f64> {
    value.as_str().map(|s| s.chars().count() as f64)
}

impl StringSchema {
    /// Exactly `length` characters
    pub fn length(self, length: impl Into<Param>) -> Self {
        self.length_rule(length.into(), None)
    }

    pub fn length_with(self, length: impl Into<Param>, message: impl Into<Message>) -> Self {
        self.length_rule(length.into(), Some(message.into()))
    }

    fn length_rule(self, length: Param, message: Option<Message>) -> Self {
        self.test(limit_test("length", "length", length, message, |v, l| {
            compare_numbers(char_count(v), l, |n, l| n == l)
        }))
    }

    pub fn min(self, min: impl Into<Param>) -> Self {
        self.min_rule(min.into(), None)
    }

    pub fn min_with(self, min: impl Into<Param>, message: impl Into<Message>) -> Self {
        self.min_rule(min.into(), Some(message.into()))
    }

    fn min_rule(self, min: Param, message: Option<Message>) -> Self {
        self.test(limit_test("min", "min", min, message, |v, l| {
            compare_numbers(char_count(v), l, |n, l| n >= l)
        }))
    }

    pub fn max(self, max: impl Into<Param>) -> Self {
        self.max_rule(max.into(), None)
    }

    pub fn max_with(self, max: impl Into<Param>, message: impl Into<Message>) -> Self {
        self.max_rule(max.into(), Some(message.into()))
    }

    fn max_rule(self, max: Param, message: Option<Message>) -> Self {
        self.test(limit_test("max", "max", max, message, |v, l| {
            compare_numbers(char_count(v), l, |n, l| n <= l)
        }))
    }

    /// Must match `pattern`
    pub fn matches(self, pattern: Regex) -> Self {
        self.matches_rule("matches", pattern, None, false)
    }

    pub fn matches_with(self, pattern: Regex, message: impl Into<Message>) -> Self {
        self.matches_rule("matches", pattern, Some(message.into()), false)
    }

    /// Like [`StringSchema::matches`] but lets the empty string through
    pub fn matches_or_empty(self, pattern: Regex) -> Self {
        self.matches_rule("matches", pattern, None, true)
    }

    fn matches_rule(
        self,
        name: &'static str,
        pattern: Regex,
        message: Option<Message>,
        exclude_empty: bool,
    ) -> Self {
        let source = pattern.as_str().to_string();
        let test = Test::new(name, move |v: &Value, _| match v.as_str() {
            Some("") if exclude_empty => true,
            Some(s) => pattern.is_match(s),
            None => true,
        })
        .param("regex", source)
        .message_opt(message)
        .skip_absent();
        self.test(test)
    }

    pub fn email(self) -> Self {
        self.matches_rule("email", EMAIL.clone(), None, true)
    }

    pub fn email_with(self, message: impl Into<Message>) -> Self {
        self.matches_rule("email", EMAIL.clone(), Some(message.into()), true)
    }

    pub fn url(self) -> Self {
        self.matches_rule("url", URL.clone(), None, true)
    }

    pub fn url_with(self, message: impl Into<Message>) -> Self {
        self.matches_rule("url", URL.clone(), Some(message.into()), true)
    }

    /// A hyphenated UUID
    pub fn uuid(self) -> Self {
        self.uuid_rule(None)
    }

    pub fn uuid_with(self, message: impl Into<Message>) -> Self {
        self.uuid_rule(Some(message.into()))
    }

    fn uuid_rule(self, message: Option<Message>) -> Self {
        self.test(
            Test::new("uuid", |v: &Value, _| match v.as_str() {
                Some("") => true,
                Some(s) => s.len() == 36 && uuid::Uuid::parse_str(s).is_ok(),
                None => true,
            })
            .message_opt(message)
            .skip_absent(),
        )
    }

    /// Trim whitespace when casting; in strict mode require trimmed input
    pub fn trim(self) -> Self {
        self.trim_rule(None)
    }

    pub fn trim_with(self, message: impl Into<Message>) -> Self {
        self.trim_rule(Some(message.into()))
    }

    fn trim_rule(self, message: Option<Message>) -> Self {
        self.map_schema(|s| {
            s.add_transform(Transform::named("trim", |v, _, _| match v {
                Value::String(s) => Value::String(s.trim().to_string()),
                other => other,
            }))
        })
        .test(
            Test::new("trim", |v: &Value, _| v.as_str().map_or(true, |s| s.trim() == s))
                .message_opt(message)
                .skip_absent(),
        )
    }

    pub fn lowercase(self) -> Self {
        self.case_rule("lowercase", None, str::to_lowercase)
    }

    pub fn lowercase_with(self, message: impl Into<Message>) -> Self {
        self.case_rule("lowercase", Some(message.into()), str::to_lowercase)
    }

    pub fn uppercase(self) -> Self {
        self.case_rule("uppercase", None, str::to_uppercase)
    }

    pub fn uppercase_with(self, message: impl Into<Message>) -> Self {
        self.case_rule("uppercase", Some(message.into()), str::to_uppercase)
    }

    fn case_rule(self, name: &'static str, message: Option<Message>, convert: fn(&str) -> String) -> Self {
        self.map_schema(|s| {
            s.add_transform(Transform::named(name, move |v, _, _| match v {
                Value::String(s) => Value::String(convert(&s)),
                other => other,
            }))
        })
        .test(
            Test::new(name, move |v: &Value, _| v.as_str().map_or(true, |s| convert(s) == s))
                .message_opt(message)
                .skip_absent()
                .exclusive(),
        )
    }

    /// Turn `Undefined` and `Null` into the empty string
    pub fn ensure(self) -> Self {
        self.default("").map_schema(|s| {
            s.add_transform(Transform::named("ensure", |v, _, _| match v {
                Value::Null => Value::from(""),
                other => other,
            }))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_cast_coerces_scalars() {
        assert_eq!(string().cast(Value::Number(5.0)).unwrap(), Value::from("5"));
        assert_eq!(string().cast(Value::Bool(true)).unwrap(), Value::from("true"));
        assert!(string().cast(Value::Null).is_err());
        assert_eq!(string().nullable().cast(Value::Null).unwrap(), Value::Null);
    }

    #[test]
    fn test_required_rejects_empty_string() {
        let schema = string().required();
        assert!(!schema.is_valid_sync(Value::from("")).unwrap());
        assert!(!schema.is_valid_sync(Value::Undefined).unwrap());
        assert!(schema.is_valid_sync(Value::from("x")).unwrap());
        assert!(schema.not_required().is_valid_sync(Value::from("")).unwrap());
    }

    #[test]
    fn test_min_max_length() {
        let schema = string().min(2).max(4);
        assert!(schema.is_valid_sync(Value::from("abc")).unwrap());
        assert!(!schema.is_valid_sync(Value::from("a")).unwrap());
        assert!(!schema.is_valid_sync(Value::from("abcde")).unwrap());
        assert!(string().length(3).is_valid_sync(Value::from("äöü")).unwrap());
    }

    #[test]
    fn test_repeated_min_replaces_previous() {
        let schema = string().min(5).min(1);
        assert_eq!(schema.as_schema().tests().len(), 1);
        assert!(schema.is_valid_sync(Value::from("ab")).unwrap());
    }

    #[test]
    fn test_formats() {
        assert!(string().email().is_valid_sync(Value::from("a@b.io")).unwrap());
        assert!(!string().email().is_valid_sync(Value::from("nope")).unwrap());
        assert!(string().url().is_valid_sync(Value::from("https://example.com/x")).unwrap());
        assert!(!string().url().is_valid_sync(Value::from("example")).unwrap());
        assert!(string()
            .uuid()
            .is_valid_sync(Value::from("67e55044-10b1-426f-9247-bb680e5fe0c8"))
            .unwrap());
        assert!(!string().uuid().is_valid_sync(Value::from("67e55044")).unwrap());
    }

    #[test]
    fn test_trim_transforms_unless_strict() {
        let schema = string().trim();
        assert_eq!(schema.cast(Value::from("  hi ")).unwrap(), Value::from("hi"));
        assert!(schema.is_valid_sync(Value::from(" hi ")).unwrap());
        assert!(!schema.strict(true).is_valid_sync(Value::from(" hi ")).unwrap());
    }

    #[test]
    fn test_matches_message_mentions_pattern() {
        let schema = string().matches(Regex::new(r"^\d+$").unwrap()).label("Code");
        let err = schema.validate_sync(Value::from("abc")).unwrap_err();
        match err {
            Error::Validation(e) => assert_eq!(e.message(), "Code must match the following: \"^\\d+$\""),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_ensure() {
        assert_eq!(string().ensure().cast(Value::Null).unwrap(), Value::from(""));
        assert_eq!(string().ensure().cast(Value::Undefined).unwrap(), Value::from(""));
    }
}
