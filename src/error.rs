use thiserror::Error;

/// Argument parsing error.
///
/// Every failure aborts [`Interface::parse`](crate::Interface::parse) as a whole. Arguments are
/// named by their long flag, commands by their name.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// No [`Command`](crate::Command) token found but
    /// [`Configuration::FAIL_ON_MISSING_COMMAND`](crate::Configuration::FAIL_ON_MISSING_COMMAND)
    /// is set.
    #[error("No command selected.")]
    NoCommandSelected,

    /// The value of the selected command couldn't be converted.
    #[error("Can't parse value of command '{command}'.\n{message}")]
    ParseCommandFailure { command: String, message: String },

    /// A value of the argument couldn't be converted, or a single value argument
    /// received a second value.
    #[error("Can't parse value of argument '{argument}'.\n{message}")]
    ParseArgumentFailure { argument: String, message: String },

    /// The selected command takes a value, none was given and it has no default.
    #[error("Missing required value for command '{command}'.")]
    MissingRequiredCommandValue { command: String },

    /// A value argument was given without value, or a required argument is missing.
    #[error("Missing required value for argument '{argument}'.")]
    MissingRequiredArgumentValue { argument: String },

    /// The selected command requires an argument that was neither given nor defaulted.
    #[error("Missing required argument '{argument}' for command '{command}'.")]
    MissingRequiredArgument { command: String, argument: String },

    /// A token matched no command or argument and unknown arguments are not allowed.
    #[error("Unknown argument '{0}'.")]
    UnknownArgument(String),

    /// The custom validation of the selected command failed.
    #[error("{message}")]
    CommandValidationFailure { command: String, message: String },

    /// The custom validation of a selected argument failed.
    #[error("{message}")]
    ArgumentValidationFailure { argument: String, message: String },
}

impl ParseError {
    /// Whether the error means no command was given.
    pub fn is_no_selection(&self) -> bool {
        matches!(self, ParseError::NoCommandSelected)
    }
}

pub type Result<T> = std::result::Result<T, ParseError>;

/// Error raised when declaring an invalid argument or command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    #[error("illegal blank flag")]
    BlankFlag,

    #[error("illegal blank command name")]
    BlankCommandName,

    #[error("short flag '{0}' must be a single character")]
    InvalidShortFlag(String),

    #[error("'{name}' contains an illegal character: '{character}'")]
    IllegalCharacter { name: String, character: char },

    #[error("invalid default value for '{name}': {message}")]
    InvalidDefault { name: String, message: String },

    #[error("command '{command}' requires an argument that isn't registered")]
    UnknownArgumentRef { command: String },
}
