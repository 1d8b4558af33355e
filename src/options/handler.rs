//! Option handling for typed configuration wrappers

use crate::error::Result;
use crate::options::codec::{self, OptionInfo};
use crate::options::object::ConfigObject;

/// Common option-handling surface of every typed configuration wrapper.
///
/// Implementors only provide access to their `ConfigObject`; listing,
/// reading and applying command-line options come for free.
pub trait OptionHandler {
    fn config(&self) -> &ConfigObject;

    fn config_mut(&mut self) -> &mut ConfigObject;

    /// One-line description of the configuration type.
    fn global_info(&self) -> &'static str {
        self.config().schema().global_info
    }

    /// Help metadata for every command-line option, in display order.
    fn list_options(&self) -> Vec<OptionInfo> {
        codec::list_options(self.config().schema())
    }

    /// Current settings as tokens suitable for `set_options`.
    fn get_options(&self) -> Result<Vec<String>> {
        codec::encode(self.config())
    }

    /// Parses a list of `-flag value` tokens into this configuration.
    fn set_options(&mut self, options: &[&str]) -> Result<()> {
        codec::decode(self.config_mut(), options)
    }
}
