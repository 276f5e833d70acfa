//! Object shapes for the Trellis schema capability.
//!
//! The core consumes schemas only through the [`Shape`](trellis_core::Shape)
//! trait; this crate supplies the flat object shapes most handlers need for
//! their query, body, and response contracts.
//!
//! # Examples
//!
//! ```
//! use trellis_core::Shape;
//! use trellis_validation::{FieldKind, ObjectShape};
//!
//! let body = ObjectShape::new()
//!     .field("name", FieldKind::String)
//!     .field("email", FieldKind::String);
//!
//! assert!(body
//!     .validate_strict(&serde_json::json!({"name": "ada", "email": "ada@example.com"}))
//!     .is_ok());
//! assert!(body
//!     .validate_strict(&serde_json::json!({"name": "ada", "role": "admin"}))
//!     .is_err());
//! ```

mod object;

pub use object::{FieldKind, ObjectShape};
