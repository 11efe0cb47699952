use std::fmt::{Debug, Display, Formatter};
use std::path::PathBuf;

use crate::argument::{ArgumentId, ArgumentRef};
use crate::container::SingleValue;
use crate::error::DefinitionError;
use crate::util::FlagValidator;
use crate::validation::ValidationResult;
use crate::value::{case_from_value, case_into_value, choice_converter, ArgValue, Converter, EnumValue,
                   PathKind, Value};

/// Custom validation of the selected [`Command`].
pub type CommandValidation = Box<dyn Fn(&Command) -> ValidationResult>;

/// Position of a [`Command`] in the [`Interface`](crate::Interface) it was registered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommandId {
    pub(crate) interface: u64,
    pub(crate) index: usize,
}

impl CommandId {
    pub(crate) const fn new(interface: u64, index: usize) -> CommandId {
        CommandId { interface, index }
    }
}

/// Anything that identifies a registered [`Command`].
pub trait CommandRef {
    fn id(&self) -> CommandId;
}

/// A handle returned when registering a [`Command`].
pub trait CommandHandle: CommandRef {
    #[doc(hidden)]
    fn bind(self, id: CommandId) -> Self;
}

const UNBOUND: CommandId = CommandId::new(0, usize::MAX);

impl CommandRef for CommandId {
    fn id(&self) -> CommandId {
        *self
    }
}

impl CommandHandle for CommandId {
    fn bind(self, id: CommandId) -> Self {
        id
    }
}

/// Handle of a command taking one value of type `T`.
pub struct CommandValue<T> {
    id: CommandId,
    extract: fn(&Value) -> Option<T>,
    encode: fn(T) -> Result<Value, String>,
}

impl<T> CommandValue<T> {
    pub(crate) fn extract(&self, value: &Value) -> Option<T> {
        (self.extract)(value)
    }
}

impl<T> Clone for CommandValue<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for CommandValue<T> {}

impl<T> Debug for CommandValue<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("CommandValue").field(&self.id).finish()
    }
}

impl<T> CommandRef for CommandValue<T> {
    fn id(&self) -> CommandId {
        self.id
    }
}

impl<T> CommandHandle for CommandValue<T> {
    fn bind(self, id: CommandId) -> Self {
        CommandValue { id, ..self }
    }
}

/// The `Command` is the primary selector, the first token after the program name.
///
/// At most one command is selected per parse. A command may take a value from the token
/// following it and may require companion arguments.
///
/// # Examples
///
/// ```
/// use clikit::{Argument, Command, Interface};
///
/// let mut cli = Interface::builder("tool").build();
/// let out = cli.add_argument(Argument::file("out").short("o")).unwrap();
/// let build = cli.add_command(Command::new("build").help("build the project").requires(&out)).unwrap();
/// let greet = cli.add_command(Command::typed::<String>("greet").default_value("world".to_string())).unwrap();
///
/// cli.parse(&["tool", "greet"]).unwrap();
/// assert!(cli.is_command_selected(&greet));
/// assert!(!cli.is_command_selected(&build));
/// assert_eq!(Some("world".to_string()), cli.command_value(&greet));
/// ```
pub struct Command {
    name: String,
    help: Option<String>,
    required_arguments: Option<Vec<ArgumentId>>,
    value: Option<SingleValue>,
    validation: Option<CommandValidation>,
}

impl Command {
    /// Declare a command without value.
    pub fn new(name: &str) -> CommandBuilder<CommandId> {
        CommandBuilder::new(name, None, UNBOUND)
    }

    /// Declare a command taking one value.
    pub fn typed<T: ArgValue>(name: &str) -> CommandBuilder<CommandValue<T>> {
        let handle = CommandValue {
            id: UNBOUND,
            extract: T::from_value,
            encode: T::into_value,
        };
        CommandBuilder::new(name, Some(T::converter()), handle)
    }

    /// Declare a command taking one case of the enum `E`.
    pub fn choice<E: EnumValue>(name: &str) -> CommandBuilder<CommandValue<E>> {
        let handle = CommandValue {
            id: UNBOUND,
            extract: case_from_value::<E>,
            encode: case_into_value::<E>,
        };
        CommandBuilder::new(name, Some(choice_converter::<E>()), handle)
    }

    /// Declare a command taking a path to a file.
    pub fn file(name: &str) -> CommandBuilder<CommandValue<PathBuf>> {
        Self::path(name, PathKind::File)
    }

    /// Declare a command taking a path to a folder.
    pub fn folder(name: &str) -> CommandBuilder<CommandValue<PathBuf>> {
        Self::path(name, PathKind::Folder)
    }

    fn path(name: &str, kind: PathKind) -> CommandBuilder<CommandValue<PathBuf>> {
        let mut builder = Self::typed::<PathBuf>(name);
        builder.converter = Some(Converter::Path { kind, must_exist: false });
        builder
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    pub fn required_arguments(&self) -> Option<&[ArgumentId]> {
        self.required_arguments.as_deref()
    }

    pub fn takes_value(&self) -> bool {
        self.value.is_some()
    }

    /// The effective value: the parsed value, else the default.
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref().and_then(|single| single.value())
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.value.as_ref().and_then(|single| single.default_value())
    }

    pub fn has_default(&self) -> bool {
        self.default_value().is_some()
    }

    pub fn value_type(&self) -> Option<String> {
        self.value.as_ref().map(|single| single.converter().value_type())
    }

    pub(crate) fn reset(&mut self) {
        if let Some(single) = &mut self.value {
            single.reset();
        }
    }

    pub(crate) fn parse(&mut self, raw: &str) -> ValidationResult {
        match &mut self.value {
            Some(single) => single.parse(raw, &self.name),
            None => ValidationResult::fail(format!("'{}' doesn't take a value.", self.name)),
        }
    }

    pub(crate) fn run_validation(&self) -> ValidationResult {
        match &self.validation {
            Some(validation) => validation(self),
            None => ValidationResult::Success,
        }
    }
}

impl Debug for Command {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("required_arguments", &self.required_arguments)
            .field("value", &self.value)
            .field("validation", &self.validation.is_some())
            .finish()
    }
}

impl Display for Command {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[ command: {}", self.name)?;
        if let Some(value_type) = self.value_type() {
            write!(f, " <{value_type}>")?;
        }
        write!(f, " :: {} ]", self.help.as_deref().unwrap_or("None"))
    }
}

impl PartialEq for Command {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

/// A builder struct for [`Command`].
pub struct CommandBuilder<H> {
    name: String,
    help: Option<String>,
    required_arguments: Option<Vec<ArgumentId>>,
    converter: Option<Converter>,
    default: Option<Result<Value, String>>,
    validation: Option<CommandValidation>,
    handle: H,
}

impl<H: CommandHandle> CommandBuilder<H> {
    fn new(name: &str, converter: Option<Converter>, handle: H) -> Self {
        CommandBuilder {
            name: name.trim().to_owned(),
            help: None,
            required_arguments: None,
            converter,
            default: None,
            validation: None,
            handle,
        }
    }

    /// Set the help message shown in the manual.
    pub fn help(mut self, help: &str) -> Self {
        self.help = Some(help.trim().to_owned());
        self
    }

    /// Require `argument` whenever this command is selected, unless it has a default value.
    pub fn requires(mut self, argument: &impl ArgumentRef) -> Self {
        self.required_arguments
            .get_or_insert_with(Vec::new)
            .push(argument.id());
        self
    }

    /// Set a custom validation, run after a successful parse when the command is selected.
    pub fn validate<F>(mut self, validation: F) -> Self
    where
        F: Fn(&Command) -> ValidationResult + 'static,
    {
        self.validation = Some(Box::new(validation));
        self
    }

    pub(crate) fn build(self, id: CommandId) -> Result<(Command, H), DefinitionError> {
        FlagValidator::validate_command_name(&self.name)?;
        let default = self
            .default
            .transpose()
            .map_err(|message| DefinitionError::InvalidDefault {
                name: self.name.clone(),
                message,
            })?;
        let command = Command {
            name: self.name,
            help: self.help,
            required_arguments: self.required_arguments,
            value: self.converter.map(|converter| SingleValue::new(converter, default)),
            validation: self.validation,
        };
        Ok((command, self.handle.bind(id)))
    }
}

impl<T: 'static> CommandBuilder<CommandValue<T>> {
    /// Set the value used when the command is given without value.
    pub fn default_value(mut self, value: T) -> Self {
        self.default = Some((self.handle.encode)(value));
        self
    }

    /// Set a custom validation on the effective value. Not called when there is no value.
    pub fn validate_value<F>(self, validation: F) -> Self
    where
        F: Fn(&T) -> ValidationResult + 'static,
    {
        let extract = self.handle.extract;
        self.validate(move |command| match command.value().and_then(extract) {
            Some(value) => validation(&value),
            None => ValidationResult::Success,
        })
    }
}

impl CommandBuilder<CommandValue<PathBuf>> {
    /// Whether the path must exist and be of the declared kind.
    pub fn must_exist(mut self, must_exist: bool) -> Self {
        if let Some(Converter::Path { must_exist: flag, .. }) = &mut self.converter {
            *flag = must_exist;
        }
        self
    }
}
