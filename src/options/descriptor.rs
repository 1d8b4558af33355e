//! Field descriptors and attribute values
//!
//! A `FieldDescriptor` is the plain-data description of one configurable
//! attribute: its kind, default, command-line exposure and display order.
//! Configuration types declare an array of descriptors as a `static`, so the
//! option surface can be inspected without any runtime reflection.

use crate::options::object::ConfigObject;
use crate::options::registry::Schema;
use serde::Serialize;

/// The type of value a field holds.
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    /// Base-10 signed integer.
    Int,
    /// Finite IEEE-754 double.
    Double,
    /// Free-form string, taken verbatim.
    Str,
    /// One of a fixed, case-sensitive set of names.
    Enum(&'static [&'static str]),
    /// A nested configuration object of one of the listed types.
    Object(&'static [&'static Schema]),
    /// Fixed-length integer sequence (kernel size, stride, padding).
    IntArray(usize),
}

impl FieldKind {
    /// Short name used in error messages.
    pub fn name(&self) -> String {
        match self {
            FieldKind::Int => "int".to_string(),
            FieldKind::Double => "double".to_string(),
            FieldKind::Str => "string".to_string(),
            FieldKind::Enum(values) => format!("one of {}", values.join(", ")),
            FieldKind::Object(schemas) => {
                let names: Vec<&str> = schemas.iter().map(|schema| schema.name).collect();
                format!("object of type {}", names.join(", "))
            }
            FieldKind::IntArray(len) => format!("{} comma-separated ints", len),
        }
    }

    /// Placeholder shown in the option synopsis, e.g. `-nFilters <int>`.
    pub fn synopsis(&self) -> &'static str {
        match self {
            FieldKind::Int => "int",
            FieldKind::Double => "double",
            FieldKind::Str => "string",
            FieldKind::Enum(_) => "string",
            FieldKind::Object(_) => "specification",
            FieldKind::IntArray(_) => "int,int",
        }
    }
}

/// How a field can be set.
///
/// A programmatic field has no flag at all, so "programmatic fields never
/// carry a CLI flag" holds by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exposure {
    /// Settable from the command line as `-<flag> <value>`.
    Cli(&'static str),
    /// Settable only through code.
    Programmatic,
}

/// Where a field's value lives in the attribute map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    /// The field owns an attribute named after itself.
    Attribute,
    /// The field is a view onto one slot of a composite attribute.
    Slot {
        attribute: &'static str,
        index: usize,
    },
}

/// Static description of a field's default value.
///
/// Turned into a fresh `Value` every time an object is constructed, so two
/// objects never share a default instance.
#[derive(Debug, Clone, Copy)]
pub enum DefaultValue {
    Int(i64),
    Double(f64),
    Str(&'static str),
    Enum(&'static str),
    Object(&'static Schema),
    IntArray(&'static [i64]),
    /// Views take their default from the slot they point at.
    View,
}

impl DefaultValue {
    /// Build a fresh value, or `None` for views.
    pub fn instantiate(&self) -> Option<Value> {
        match *self {
            DefaultValue::Int(value) => Some(Value::Int(value)),
            DefaultValue::Double(value) => Some(Value::Double(value)),
            DefaultValue::Str(value) => Some(Value::Str(value.to_string())),
            DefaultValue::Enum(value) => Some(Value::Enum(value)),
            DefaultValue::Object(schema) => Some(Value::Object(Box::new(ConfigObject::new(schema)))),
            DefaultValue::IntArray(values) => Some(Value::IntArray(values.to_vec())),
            DefaultValue::View => None,
        }
    }
}

/// Metadata for one configurable attribute.
///
/// Descriptors are built with `const` constructors and refined with the
/// builder-style methods, so whole descriptor tables can live in statics:
///
/// ```ignore
/// FieldDescriptor::int("nOut", 0)
///     .flag("nFilters")
///     .order(1)
///     .display("number of filters")
///     .help("The number of filters.")
///     .required()
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub display_name: &'static str,
    pub description: &'static str,
    pub kind: FieldKind,
    pub default: DefaultValue,
    pub exposure: Exposure,
    pub display_order: i32,
    pub binding: Binding,
    pub required: bool,
}

impl FieldDescriptor {
    const fn base(name: &'static str, kind: FieldKind, default: DefaultValue) -> Self {
        Self {
            name,
            display_name: name,
            description: "",
            kind,
            default,
            exposure: Exposure::Programmatic,
            display_order: 0,
            binding: Binding::Attribute,
            required: false,
        }
    }

    pub const fn int(name: &'static str, default: i64) -> Self {
        Self::base(name, FieldKind::Int, DefaultValue::Int(default))
    }

    pub const fn double(name: &'static str, default: f64) -> Self {
        Self::base(name, FieldKind::Double, DefaultValue::Double(default))
    }

    pub const fn string(name: &'static str, default: &'static str) -> Self {
        Self::base(name, FieldKind::Str, DefaultValue::Str(default))
    }

    pub const fn choice(
        name: &'static str,
        values: &'static [&'static str],
        default: &'static str,
    ) -> Self {
        Self::base(name, FieldKind::Enum(values), DefaultValue::Enum(default))
    }

    pub const fn object(
        name: &'static str,
        schemas: &'static [&'static Schema],
        default: &'static Schema,
    ) -> Self {
        Self::base(name, FieldKind::Object(schemas), DefaultValue::Object(default))
    }

    pub const fn int_array(name: &'static str, default: &'static [i64]) -> Self {
        Self::base(
            name,
            FieldKind::IntArray(default.len()),
            DefaultValue::IntArray(default),
        )
    }

    /// An integer view onto `attribute[index]`.
    pub const fn slot(name: &'static str, attribute: &'static str, index: usize) -> Self {
        let mut field = Self::base(name, FieldKind::Int, DefaultValue::View);
        field.binding = Binding::Slot { attribute, index };
        field
    }

    pub const fn flag(mut self, flag: &'static str) -> Self {
        self.exposure = Exposure::Cli(flag);
        self
    }

    pub const fn order(mut self, display_order: i32) -> Self {
        self.display_order = display_order;
        self
    }

    pub const fn display(mut self, display_name: &'static str) -> Self {
        self.display_name = display_name;
        self
    }

    pub const fn help(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn cli_flag(&self) -> Option<&'static str> {
        match self.exposure {
            Exposure::Cli(flag) => Some(flag),
            Exposure::Programmatic => None,
        }
    }

    pub fn is_programmatic(&self) -> bool {
        self.exposure == Exposure::Programmatic
    }

    /// Name of the attribute this field reads and writes.
    pub fn attribute(&self) -> &'static str {
        match self.binding {
            Binding::Attribute => self.name,
            Binding::Slot { attribute, .. } => attribute,
        }
    }

    /// Name used in error reports: the flag for CLI fields, the field name otherwise.
    pub fn label(&self) -> &'static str {
        self.cli_flag().unwrap_or(self.name)
    }
}

/// Current value of an attribute.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Double(f64),
    Str(String),
    Enum(&'static str),
    Object(Box<ConfigObject>),
    IntArray(Vec<i64>),
}

impl Value {
    /// Whether this value is well-typed for `kind`.
    pub fn matches(&self, kind: &FieldKind) -> bool {
        match (self, kind) {
            (Value::Int(_), FieldKind::Int) => true,
            (Value::Double(value), FieldKind::Double) => value.is_finite(),
            (Value::Str(_), FieldKind::Str) => true,
            (Value::Enum(value), FieldKind::Enum(values)) => values.contains(value),
            (Value::Object(object), FieldKind::Object(schemas)) => schemas
                .iter()
                .any(|schema| schema.name == object.schema().name),
            (Value::IntArray(values), FieldKind::IntArray(len)) => values.len() == *len,
            _ => false,
        }
    }

    /// Whether a required field holding this value still counts as unset.
    pub fn is_unset(&self) -> bool {
        match self {
            Value::Int(value) => *value <= 0,
            Value::Str(value) => value.is_empty(),
            _ => false,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Double(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(value) => Some(value),
            Value::Enum(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ConfigObject> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_int_array(&self) -> Option<&[i64]> {
        match self {
            Value::IntArray(values) => Some(values),
            _ => None,
        }
    }
}
