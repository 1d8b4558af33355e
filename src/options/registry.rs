//! Field descriptor registry
//!
//! Each configuration type is a `Schema`: a name, a one-line description and
//! a static descriptor table, plus a cross-field validator used when the
//! object is finalized. The registry resolves schemas by name and produces
//! the ordered descriptor set for an object.

use crate::config::NETWORK;
use crate::error::{ConfigError, Result};
use crate::layers::convolution::CONVOLUTION;
use crate::layers::dense::DENSE;
use crate::layers::distribution::{BINOMIAL, NORMAL, UNIFORM};
use crate::layers::output::OUTPUT;
use crate::layers::subsampling::SUBSAMPLING;
use crate::options::descriptor::{Binding, FieldDescriptor, FieldKind};
use crate::options::object::ConfigObject;
use std::collections::HashSet;
use std::fmt;

/// Cross-field validator: pushes one message per problem found.
pub type Validator = fn(&ConfigObject, &mut Vec<String>);

/// Declared option surface of one configuration type.
pub struct Schema {
    pub name: &'static str,
    pub global_info: &'static str,
    pub fields: &'static [FieldDescriptor],
    pub validate: Validator,
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("name", &self.name)
            .field("fields", &self.fields.len())
            .finish()
    }
}

impl Schema {
    /// Descriptors sorted by display order; ties keep declaration order.
    pub fn ordered(&self) -> Vec<&FieldDescriptor> {
        let mut fields: Vec<&FieldDescriptor> = self.fields.iter().collect();
        fields.sort_by_key(|field| field.display_order);
        fields
    }

    /// Ordered descriptors that carry a command-line flag.
    pub fn cli_fields(&self) -> Vec<&FieldDescriptor> {
        self.ordered()
            .into_iter()
            .filter(|field| !field.is_programmatic())
            .collect()
    }

    /// Ordered descriptors that can only be set from code.
    pub fn programmatic_fields(&self) -> Vec<&FieldDescriptor> {
        self.ordered()
            .into_iter()
            .filter(|field| field.is_programmatic())
            .collect()
    }

    /// Descriptor by field name (attributes and slot views alike).
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Descriptor by command-line flag (without the leading dash).
    pub fn by_flag(&self, flag: &str) -> Option<&FieldDescriptor> {
        self.fields
            .iter()
            .find(|field| field.cli_flag() == Some(flag))
    }

    /// The descriptor that owns attribute `name` and supplies its default.
    pub fn owner(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields
            .iter()
            .find(|field| field.binding == Binding::Attribute && field.name == name)
    }

    /// Checks the descriptor table for internal consistency.
    ///
    /// # Errors
    ///
    /// - `UnknownField` if a slot view names an attribute this schema does not
    ///   declare, names a non-composite attribute, or indexes past its end
    /// - `DuplicateFlag` if two descriptors share a flag
    pub fn check(&self) -> Result<()> {
        let mut flags = HashSet::new();
        for field in self.fields {
            if let Binding::Slot { attribute, index } = field.binding {
                let in_range = match self.owner(attribute).map(|owner| owner.kind) {
                    Some(FieldKind::IntArray(len)) => index < len,
                    _ => false,
                };
                if !in_range {
                    return Err(ConfigError::UnknownField {
                        schema: self.name.to_string(),
                        field: format!("{}[{}]", attribute, index),
                    });
                }
            }
            if let Some(flag) = field.cli_flag() {
                if !flags.insert(flag) {
                    return Err(ConfigError::DuplicateFlag {
                        schema: self.name.to_string(),
                        flag: flag.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Validator for schemas without cross-field constraints.
pub fn no_validation(_object: &ConfigObject, _problems: &mut Vec<String>) {}

/// Every configuration type known to the crate.
pub static SCHEMAS: [&Schema; 8] = [
    &CONVOLUTION,
    &DENSE,
    &OUTPUT,
    &SUBSAMPLING,
    &NETWORK,
    &NORMAL,
    &UNIFORM,
    &BINOMIAL,
];

/// Resolves a schema by its exact name.
pub fn lookup(name: &str) -> Result<&'static Schema> {
    SCHEMAS
        .iter()
        .copied()
        .find(|schema| schema.name == name)
        .ok_or_else(|| ConfigError::UnknownSchema(name.to_string()))
}

/// Ordered descriptor set for `object`.
///
/// # Errors
///
/// Returns `UnknownField` if a descriptor references an attribute that is not
/// present in the object's attribute map.
pub fn descriptors_for(object: &ConfigObject) -> Result<Vec<&'static FieldDescriptor>> {
    let schema = object.schema();
    let fields = schema.ordered();
    for field in &fields {
        if !object.attributes().contains_key(field.attribute()) {
            return Err(ConfigError::UnknownField {
                schema: schema.name.to_string(),
                field: field.attribute().to_string(),
            });
        }
    }
    Ok(fields)
}
