use crate::value::{DataType, Value};

/// Schema entry for one configuration option.
///
/// Created through [`Config::option`](crate::Config::option) and configured
/// with the chaining setters below. The declared type of the option is the
/// type of its default value; an option without a default is only usable if
/// it is required.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConfigOption {
    flag: String,
    shortflag: String,
    description: String,
    default: Value,
    required: bool,
    hidden: bool,
}

impl ConfigOption {
    pub(crate) fn new(flag: &str) -> Self {
        Self {
            flag: flag.to_string(),
            ..Self::default()
        }
    }

    /// Set the canonical flag (`--flag` on the command line, `flag` in files).
    pub fn flag(&mut self, flag: &str) -> &mut Self {
        self.flag = flag.to_string();
        self
    }

    /// Set the short alias, given without the leading dash (`"n"` for `-n`).
    pub fn shortflag(&mut self, shortflag: &str) -> &mut Self {
        self.shortflag = shortflag.to_string();
        self
    }

    pub fn description(&mut self, description: &str) -> &mut Self {
        self.description = description.to_string();
        self
    }

    /// Set the default value. This also fixes the option's declared type.
    pub fn default_value(&mut self, value: impl Into<Value>) -> &mut Self {
        self.default = value.into();
        self
    }

    pub fn required(&mut self, required: bool) -> &mut Self {
        self.required = required;
        self
    }

    /// Hidden options are dropped from the resolved values after parsing and
    /// never show up in printed or serialized output.
    pub fn hidden(&mut self, hidden: bool) -> &mut Self {
        self.hidden = hidden;
        self
    }

    pub fn get_flag(&self) -> &str {
        &self.flag
    }

    pub fn get_shortflag(&self) -> &str {
        &self.shortflag
    }

    pub fn get_description(&self) -> &str {
        &self.description
    }

    pub fn get_default(&self) -> &Value {
        &self.default
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn data_type(&self) -> DataType {
        self.default.data_type()
    }
}
