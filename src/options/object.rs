//! Configuration objects
//!
//! A `ConfigObject` is the mutable attribute bag behind every layer and
//! settings type. It owns one value per declared attribute, type-checks every
//! write against the schema, and follows a one-way lifecycle:
//! `Default -> Configured -> Finalized`. Once finalized, every write fails.

use crate::error::{ConfigError, Result};
use crate::options::descriptor::{Binding, FieldDescriptor, FieldKind, Value};
use crate::options::registry::Schema;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;

/// Lifecycle of a configuration object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectState {
    /// Freshly constructed, every attribute at its default.
    Default,
    /// At least one attribute has been written.
    Configured,
    /// Handed to the layer factory; immutable from now on.
    Finalized,
}

/// Attribute values of one configuration type, checked against its schema.
///
/// Every write is type-checked against the field's descriptor, and slot views
/// write through to their composite attribute. Once finalized the object
/// rejects all writes. Equality compares schema and values, not lifecycle state.
#[derive(Debug, Clone)]
pub struct ConfigObject {
    schema: &'static Schema,
    attributes: BTreeMap<&'static str, Value>,
    state: ObjectState,
}

impl ConfigObject {
    /// Creates an object with a freshly built default for every attribute.
    pub fn new(schema: &'static Schema) -> Self {
        let attributes = schema
            .fields
            .iter()
            .filter_map(|field| {
                field
                    .default
                    .instantiate()
                    .map(|value| (field.name, value))
            })
            .collect();

        Self {
            schema,
            attributes,
            state: ObjectState::Default,
        }
    }

    pub fn schema(&self) -> &'static Schema {
        self.schema
    }

    pub fn state(&self) -> ObjectState {
        self.state
    }

    pub fn is_finalized(&self) -> bool {
        self.state == ObjectState::Finalized
    }

    pub fn attributes(&self) -> &BTreeMap<&'static str, Value> {
        &self.attributes
    }

    fn descriptor(&self, name: &str) -> Result<&'static FieldDescriptor> {
        self.schema
            .field(name)
            .ok_or_else(|| ConfigError::UnknownField {
                schema: self.schema.name.to_string(),
                field: name.to_string(),
            })
    }

    fn stored(&self, attribute: &str) -> Result<&Value> {
        self.attributes
            .get(attribute)
            .ok_or_else(|| ConfigError::UnknownField {
                schema: self.schema.name.to_string(),
                field: attribute.to_string(),
            })
    }

    fn mismatch(field: &FieldDescriptor) -> ConfigError {
        ConfigError::KindMismatch {
            field: field.name.to_string(),
            expected: field.kind.name(),
        }
    }

    /// Reads a field, resolving slot views to the single slot they cover.
    pub fn read(&self, field: &FieldDescriptor) -> Result<Value> {
        match field.binding {
            Binding::Attribute => self.stored(field.name).cloned(),
            Binding::Slot { attribute, index } => self
                .stored(attribute)?
                .as_int_array()
                .and_then(|values| values.get(index))
                .map(|value| Value::Int(*value))
                .ok_or_else(|| Self::mismatch(field)),
        }
    }

    /// Writes a field after checking lifecycle and kind.
    ///
    /// Writing a slot view only replaces that slot; sibling slots keep their
    /// values.
    pub fn write(&mut self, field: &FieldDescriptor, value: Value) -> Result<()> {
        if self.is_finalized() {
            return Err(ConfigError::FinalizedObject {
                field: field.name.to_string(),
            });
        }
        if !value.matches(&field.kind) {
            return Err(Self::mismatch(field));
        }

        match field.binding {
            Binding::Attribute => {
                let slot = self
                    .attributes
                    .get_mut(field.name)
                    .ok_or_else(|| ConfigError::UnknownField {
                        schema: self.schema.name.to_string(),
                        field: field.name.to_string(),
                    })?;
                *slot = value;
            }
            Binding::Slot { attribute, index } => {
                let new_value = value.as_int().ok_or_else(|| Self::mismatch(field))?;
                let target = match self.attributes.get_mut(attribute) {
                    Some(Value::IntArray(values)) => values.get_mut(index),
                    _ => None,
                };
                match target {
                    Some(target) => *target = new_value,
                    None => {
                        return Err(ConfigError::UnknownField {
                            schema: self.schema.name.to_string(),
                            field: format!("{}[{}]", attribute, index),
                        })
                    }
                }
            }
        }

        self.state = ObjectState::Configured;
        Ok(())
    }

    /// Reads a field by name.
    pub fn get(&self, name: &str) -> Result<Value> {
        let field = self.descriptor(name)?;
        self.read(field)
    }

    /// Writes a field by name.
    pub fn set(&mut self, name: &str, value: Value) -> Result<()> {
        let field = self.descriptor(name)?;
        self.write(field, value)
    }

    pub fn int(&self, name: &str) -> Result<i64> {
        let field = self.descriptor(name)?;
        self.read(field)?.as_int().ok_or_else(|| Self::mismatch(field))
    }

    pub fn set_int(&mut self, name: &str, value: i64) -> Result<()> {
        self.set(name, Value::Int(value))
    }

    pub fn double(&self, name: &str) -> Result<f64> {
        let field = self.descriptor(name)?;
        self.stored(field.attribute())?
            .as_double()
            .ok_or_else(|| Self::mismatch(field))
    }

    pub fn set_double(&mut self, name: &str, value: f64) -> Result<()> {
        self.set(name, Value::Double(value))
    }

    pub fn string(&self, name: &str) -> Result<&str> {
        let field = self.descriptor(name)?;
        match self.stored(field.attribute())? {
            Value::Str(value) => Ok(value),
            _ => Err(Self::mismatch(field)),
        }
    }

    pub fn set_string(&mut self, name: &str, value: impl Into<String>) -> Result<()> {
        self.set(name, Value::Str(value.into()))
    }

    /// Current name of an enumerated field.
    pub fn choice(&self, name: &str) -> Result<&'static str> {
        let field = self.descriptor(name)?;
        match self.stored(field.attribute())? {
            Value::Enum(value) => Ok(value),
            _ => Err(Self::mismatch(field)),
        }
    }

    /// Sets an enumerated field; `value` must be one of its legal names.
    pub fn set_choice(&mut self, name: &str, value: &str) -> Result<()> {
        let field = self.descriptor(name)?;
        let legal = match field.kind {
            FieldKind::Enum(values) => values.iter().copied().find(|legal| *legal == value),
            _ => None,
        };
        match legal {
            Some(legal) => self.write(field, Value::Enum(legal)),
            None => Err(Self::mismatch(field)),
        }
    }

    pub fn object(&self, name: &str) -> Result<&ConfigObject> {
        let field = self.descriptor(name)?;
        self.stored(field.attribute())?
            .as_object()
            .ok_or_else(|| Self::mismatch(field))
    }

    pub fn set_object(&mut self, name: &str, value: ConfigObject) -> Result<()> {
        self.set(name, Value::Object(Box::new(value)))
    }

    pub fn int_array(&self, name: &str) -> Result<&[i64]> {
        let field = self.descriptor(name)?;
        self.stored(field.attribute())?
            .as_int_array()
            .ok_or_else(|| Self::mismatch(field))
    }

    pub fn set_int_array(&mut self, name: &str, values: &[i64]) -> Result<()> {
        self.set(name, Value::IntArray(values.to_vec()))
    }

    /// Names of required fields still holding their unset sentinel.
    ///
    /// Nested objects are included with a `parent.child` prefix.
    pub fn unset_required(&self) -> Vec<String> {
        let mut unset = Vec::new();
        for field in self.schema.fields {
            let Ok(value) = self.read(field) else {
                continue;
            };
            if field.required && value.is_unset() {
                unset.push(field.name.to_string());
            }
            if let Value::Object(nested) = value {
                unset.extend(
                    nested
                        .unset_required()
                        .into_iter()
                        .map(|inner| format!("{}.{}", field.name, inner)),
                );
            }
        }
        unset
    }

    /// Moves this object and every nested object into the finalized state.
    pub(crate) fn mark_finalized(&mut self) {
        self.state = ObjectState::Finalized;
        for value in self.attributes.values_mut() {
            if let Value::Object(nested) = value {
                nested.mark_finalized();
            }
        }
    }
}

impl PartialEq for ConfigObject {
    /// Objects are equal when they share a type and every attribute matches;
    /// the lifecycle state is not compared.
    fn eq(&self, other: &Self) -> bool {
        self.schema.name == other.schema.name && self.attributes == other.attributes
    }
}

impl Serialize for ConfigObject {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.attributes.len() + 1))?;
        map.serialize_entry("type", self.schema.name)?;
        for (name, value) in &self.attributes {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
