//! # Tangular
//!
//! Tangular is a small text template engine. Templates interleave plain
//! text with `{{ }}` directives: output expressions with pipe-chained
//! helpers, `if`/`else if`/`else` conditionals, and `for`/`foreach` loops
//! with `break` and `continue`.
//!
//! ```
//! use serde_json::json;
//! use tangular::Tangular;
//!
//! let mut reg = Tangular::new();
//! reg.register_template_string(
//!     "greeting",
//!     "{{if name}}Hello, {{name}}!{{else}}Hello, stranger!{{fi}}",
//! ).unwrap();
//!
//! assert_eq!(
//!     reg.render("greeting", &json!({"name": "Annie"})).unwrap(),
//!     "Hello, Annie!"
//! );
//! ```
//!
//! Output expressions are html-escaped unless the chain ends in `raw`,
//! references that resolve to nothing render as empty text, and helpers
//! registered on the [`Registry`] extend the pipe vocabulary.

pub use self::context::{merge_json, Context, Object};
pub use self::error::{RenderError, TemplateError, TemplateErrorReason, TemplateRenderError};
pub use self::helpers::HelperDef;
pub use self::output::{Output, StringOutput, WriteOutput};
pub use self::registry::Registry;
pub use self::registry::Registry as Tangular;
pub use self::render::{Renderable, Signal};
pub use self::template::{Block, Template};
pub use self::value::{to_json, JsonRender, JsonTruthy};

pub mod context;
pub mod error;
pub mod grammar;
pub mod helpers;
pub mod output;
pub mod registry;
pub mod render;
mod scanner;
pub mod support;
pub mod template;
mod value;
