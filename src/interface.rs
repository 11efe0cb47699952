use std::fmt::{Debug, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::argument::{Argument, ArgumentBuilder, ArgumentHandle, ArgumentId, ArgumentRef, Multi, Single};
use crate::command::{Command, CommandBuilder, CommandHandle, CommandId, CommandRef, CommandValue};
use crate::config::Configuration;
use crate::error::DefinitionError;
use crate::format::HelpFormatter;

static NEXT_INTERFACE_ID: AtomicU64 = AtomicU64::new(1);

/// A closure rendering a custom manual page. Returning `None` falls back to the default one.
pub type ManualPrinter = Box<dyn Fn(&Interface) -> Option<String>>;

/// The `Interface` is the registry of [`Command`]s and [`Argument`]s of a command line tool.
///
/// It owns every declared entity and the state of the last [`Interface::parse`]: the selected
/// command, the selected arguments, their values and the tokens nothing claimed.
///
/// Declaration order is kept and used by the manual. Lookups are first match wins, so a second
/// entity with the same flag or name is never matched.
///
/// Handles are bound to the interface that registered them. A handle of another interface
/// finds nothing here.
pub struct Interface {
    id: u64,
    name: String,
    version: String,
    about: Option<String>,
    configuration: Configuration,
    manual_printer: Option<ManualPrinter>,
    pub(crate) arguments: Vec<Argument>,
    pub(crate) commands: Vec<Command>,
    pub(crate) selected_command: Option<CommandId>,
    pub(crate) selected_arguments: Vec<ArgumentId>,
    pub(crate) raw_arguments: Option<Vec<String>>,
    pub(crate) unparsed_arguments: Vec<String>,
}

/// A builder struct to create an [`Interface`].
pub struct InterfaceBuilder {
    name: String,
    version: String,
    about: Option<String>,
    configuration: Configuration,
    manual_printer: Option<ManualPrinter>,
}

impl InterfaceBuilder {
    pub fn build(self) -> Interface {
        Interface {
            id: NEXT_INTERFACE_ID.fetch_add(1, Ordering::Relaxed),
            name: self.name,
            version: self.version,
            about: self.about,
            configuration: self.configuration,
            manual_printer: self.manual_printer,
            arguments: Vec::new(),
            commands: Vec::new(),
            selected_command: None,
            selected_arguments: Vec::new(),
            raw_arguments: None,
            unparsed_arguments: Vec::new(),
        }
    }

    /// Set the version of the tool, `"0"` by default.
    pub fn version(mut self, version: &str) -> Self {
        self.version = version.to_owned();
        self
    }

    /// Set the text describing the tool, shown in the manual.
    pub fn about(mut self, about: &str) -> Self {
        self.about = Some(about.to_owned());
        self
    }

    pub fn configuration(mut self, configuration: Configuration) -> Self {
        self.configuration = configuration;
        self
    }

    /// Replace the default manual page.
    pub fn manual_printer<F>(mut self, printer: F) -> Self
    where
        F: Fn(&Interface) -> Option<String> + 'static,
    {
        self.manual_printer = Some(Box::new(printer));
        self
    }
}

impl Interface {
    /// Get the builder to configure an interface for the tool called `name`.
    pub fn builder(name: &str) -> InterfaceBuilder {
        InterfaceBuilder {
            name: name.to_owned(),
            version: "0".to_string(),
            about: None,
            configuration: Configuration::empty(),
            manual_printer: None,
        }
    }

    /// Register an argument and get its handle.
    ///
    /// # Error
    ///
    /// Returns an error if a flag is blank or malformed, or the default value can't be converted.
    pub fn add_argument<H: ArgumentHandle>(&mut self, builder: ArgumentBuilder<H>) -> Result<H, DefinitionError> {
        let (argument, handle) = builder.build(ArgumentId::new(self.id, self.arguments.len()))?;
        self.arguments.push(argument);
        Ok(handle)
    }

    /// Register a command and get its handle.
    ///
    /// # Error
    ///
    /// Returns an error if the name is blank or malformed, the default value can't be converted,
    /// or a required argument isn't registered with this interface.
    pub fn add_command<H: CommandHandle>(&mut self, builder: CommandBuilder<H>) -> Result<H, DefinitionError> {
        let (command, handle) = builder.build(CommandId::new(self.id, self.commands.len()))?;
        let unknown = command
            .required_arguments()
            .unwrap_or(&[])
            .iter()
            .any(|id| self.argument(id).is_none());
        if unknown {
            return Err(DefinitionError::UnknownArgumentRef {
                command: command.name().to_owned(),
            });
        }
        self.commands.push(command);
        Ok(handle)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn about(&self) -> Option<&str> {
        self.about.as_deref()
    }

    pub fn configuration(&self) -> Configuration {
        self.configuration
    }

    pub fn set_configuration(&mut self, configuration: Configuration) {
        self.configuration = configuration;
    }

    /// All arguments in declaration order.
    pub fn arguments(&self) -> &[Argument] {
        &self.arguments
    }

    /// All commands in declaration order.
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// The argument behind a handle, `None` for a handle of another interface.
    pub fn argument(&self, argument: &impl ArgumentRef) -> Option<&Argument> {
        let id = argument.id();
        if id.interface != self.id {
            return None;
        }
        self.arguments.get(id.index)
    }

    /// The command behind a handle, `None` for a handle of another interface.
    pub fn command(&self, command: &impl CommandRef) -> Option<&Command> {
        let id = command.id();
        if id.interface != self.id {
            return None;
        }
        self.commands.get(id.index)
    }

    /// The first argument whose short or long flag equals `token`.
    pub fn argument_for(&self, token: &str) -> Option<ArgumentId> {
        self.arguments
            .iter()
            .position(|argument| argument.matches(token))
            .map(|index| ArgumentId::new(self.id, index))
    }

    /// The first command named `name`.
    pub fn command_for(&self, name: &str) -> Option<CommandId> {
        self.commands
            .iter()
            .position(|command| command.name() == name)
            .map(|index| CommandId::new(self.id, index))
    }

    /// Whether `token` is the flag of any registered argument.
    pub fn is_flag(&self, token: &str) -> bool {
        self.argument_for(token).is_some()
    }

    /// The command selected by the last parse.
    pub fn selected_command(&self) -> Option<&Command> {
        self.selected_command.and_then(|id| self.command(&id))
    }

    pub fn is_command_selected(&self, command: &impl CommandRef) -> bool {
        self.selected_command == Some(command.id())
    }

    /// The arguments found by the last parse, in the order they were found.
    pub fn selected_arguments(&self) -> impl Iterator<Item = &Argument> {
        self.selected_arguments
            .iter()
            .filter_map(|id| self.argument(id))
    }

    pub fn is_selected(&self, argument: &impl ArgumentRef) -> bool {
        self.argument(argument).is_some_and(|a| a.is_selected())
    }

    /// The tokens given to the last parse, program name included.
    pub fn raw_arguments(&self) -> Option<&[String]> {
        self.raw_arguments.as_deref()
    }

    /// Tokens not claimed by any command or argument, only collected with
    /// [`Configuration::ALLOW_UNKNOWN_ARGUMENTS`].
    pub fn unparsed_arguments(&self) -> &[String] {
        &self.unparsed_arguments
    }

    /// The effective value of a single value argument.
    pub fn value<T>(&self, argument: &Single<T>) -> Option<T> {
        self.argument(argument)?
            .value()
            .and_then(|value| argument.extract(value))
    }

    /// The values collected by a multi value argument.
    pub fn values<T>(&self, argument: &Multi<T>) -> Vec<T> {
        self.argument(argument)
            .map(|a| a.values().iter().filter_map(|value| argument.extract(value)).collect::<Vec<T>>())
            .unwrap_or_default()
    }

    /// The effective value of a command.
    pub fn command_value<T>(&self, command: &CommandValue<T>) -> Option<T> {
        self.command(command)?
            .value()
            .and_then(|value| command.extract(value))
    }

    /// Render the manual page, using the custom printer if one is set.
    pub fn manual(&self) -> String {
        self.manual_printer
            .as_ref()
            .and_then(|printer| printer(self))
            .unwrap_or_else(|| HelpFormatter::default().render(self))
    }

    pub fn print_manual(&self) {
        println!("{}\n", self.manual());
    }
}

impl Debug for Interface {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interface")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("version", &self.version)
            .field("configuration", &self.configuration)
            .field("arguments", &self.arguments)
            .field("commands", &self.commands)
            .field("selected_command", &self.selected_command)
            .field("selected_arguments", &self.selected_arguments)
            .field("unparsed_arguments", &self.unparsed_arguments)
            .finish()
    }
}
