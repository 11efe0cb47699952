use crate::validation::ValidationResult;
use crate::value::{Converter, Value};

/// Storage for an entity that accepts exactly one value per parse.
#[derive(Debug, Clone)]
pub struct SingleValue {
    converter: Converter,
    value: Option<Value>,
    default: Option<Value>,
}

impl SingleValue {
    pub fn new(converter: Converter, default: Option<Value>) -> SingleValue {
        SingleValue {
            converter,
            value: None,
            default,
        }
    }

    /// Convert and store `raw`. Fails if a value has already been parsed.
    pub fn parse(&mut self, raw: &str, owner: &str) -> ValidationResult {
        if let Some(existing) = &self.value {
            return ValidationResult::fail(format!(
                "Single value '{owner}' already contains a value '{existing}'."
            ));
        }
        match self.converter.convert(raw, owner) {
            Ok(value) => {
                self.value = Some(value);
                ValidationResult::Success
            }
            Err(message) => ValidationResult::Fail(message),
        }
    }

    /// The parsed value, or the default if nothing was parsed.
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref().or(self.default.as_ref())
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn converter(&self) -> &Converter {
        &self.converter
    }

    pub fn reset(&mut self) {
        self.value = None;
    }
}

/// Storage for an argument collecting any number of values.
#[derive(Debug, Clone)]
pub struct MultiValue {
    converter: Converter,
    values: Vec<Value>,
}

impl MultiValue {
    pub fn new(converter: Converter) -> MultiValue {
        MultiValue {
            converter,
            values: Vec::new(),
        }
    }

    pub fn parse(&mut self, raw: &str, owner: &str) -> ValidationResult {
        match self.converter.convert(raw, owner) {
            Ok(value) => {
                self.values.push(value);
                ValidationResult::Success
            }
            Err(message) => ValidationResult::Fail(message),
        }
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn converter(&self) -> &Converter {
        &self.converter
    }

    pub fn reset(&mut self) {
        self.values.clear();
    }
}

/// What an argument carries besides being selected.
#[derive(Debug, Clone)]
pub enum Container {
    Plain,
    Single(SingleValue),
    Multi(MultiValue),
}

impl Container {
    pub fn takes_value(&self) -> bool {
        !matches!(self, Container::Plain)
    }

    pub fn parse(&mut self, raw: &str, owner: &str) -> ValidationResult {
        match self {
            Container::Plain => ValidationResult::fail(format!("'{owner}' doesn't take a value.")),
            Container::Single(single) => single.parse(raw, owner),
            Container::Multi(multi) => multi.parse(raw, owner),
        }
    }

    pub fn default_value(&self) -> Option<&Value> {
        match self {
            Container::Single(single) => single.default_value(),
            Container::Plain | Container::Multi(_) => None,
        }
    }

    pub fn has_default(&self) -> bool {
        self.default_value().is_some()
    }

    /// Value type descriptor, `None` for plain flags.
    pub fn value_type(&self) -> Option<String> {
        match self {
            Container::Plain => None,
            Container::Single(single) => Some(single.converter().value_type()),
            Container::Multi(multi) => {
                let single = multi.converter().value_type();
                Some(format!("{single}_1 {single}_2 ..."))
            }
        }
    }

    pub fn reset(&mut self) {
        match self {
            Container::Plain => {}
            Container::Single(single) => single.reset(),
            Container::Multi(multi) => multi.reset(),
        }
    }
}
