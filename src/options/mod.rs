//! Declarative option metadata and its command-line binding
//!
//! - `descriptor`: field descriptors and attribute values
//! - `registry`: schemas (descriptor tables) and lookup
//! - `object`: configuration objects and their lifecycle
//! - `codec`: token decoding/encoding and help text
//! - `handler`: the `OptionHandler` trait shared by typed wrappers

pub mod codec;
pub mod descriptor;
mod handler;
pub mod object;
pub mod registry;

pub use descriptor::{Binding, DefaultValue, Exposure, FieldDescriptor, FieldKind, Value};
pub use handler::OptionHandler;
pub use object::{ConfigObject, ObjectState};
pub use registry::Schema;
