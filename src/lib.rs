//! Contour - declarative schemas for casting and validating values
//!
//! Describe the shape of a value once, then cast untrusted input toward it
//! and validate the result, with every failure reported at its path.
//!
//! ```
//! use contour::prelude::*;
//!
//! let user = object()
//!     .shape(contour::shape! {
//!         "name" => string().required(),
//!         "age" => number().integer().min(18),
//!     })
//!     .unwrap();
//!
//! let value = Value::from(serde_json::json!({"name": "Ada", "age": "36"}));
//! let cast = user.validate_sync(value).unwrap();
//! assert_eq!(cast.get("age"), Some(&Value::Number(36.0)));
//! ```

pub mod condition;
pub mod describe;
pub mod document;
pub mod driver;
pub mod error;
pub mod lazy;
pub mod locale;
pub mod node;
pub mod path;
pub mod reference;
pub mod registry;
pub mod schema;
pub mod test_registry;
pub mod transform;
pub mod types;
pub mod value;

// Re-export commonly used types
pub use condition::When;
pub use describe::{DescribeOptions, Description, InnerType, SchemaDescription};
pub use document::SchemaDocument;
pub use driver::ValidateOptions;
pub use error::{CastError, Error, SchemaError, ValidationError};
pub use lazy::{lazy, Lazy};
pub use locale::{set_locale, Locale, Message};
pub use node::Node;
pub use reference::{reference, Reference};
pub use schema::{CastOptions, Schema};
pub use test_registry::{Test, TestContext, TestResult};
pub use types::*;
pub use value::Value;

/// Everything needed to build and run schemas
pub mod prelude {
    pub use crate::condition::When;
    pub use crate::driver::ValidateOptions;
    pub use crate::error::{Error, ValidationError};
    pub use crate::lazy::lazy;
    pub use crate::reference::reference;
    pub use crate::schema::{CastOptions, Schema};
    pub use crate::test_registry::{Test, TestContext, TestResult};
    pub use crate::types::{
        array, boolean, date, mixed, mixed_of, number, object, string, tuple, SchemaType,
    };
    pub use crate::value::Value;
}

/// Contour version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
