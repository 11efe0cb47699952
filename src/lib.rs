//! # The clikit Library
//!
//! The clikit library provides an API for declaring and parsing the command line interface of a
//! tool. It is also able to render a manual page showing the available commands and arguments.
//!
//! An invocation looks like `tool [command [value]] [arguments]`:
//!
//! - The first token after the program name may select a command, for example `tool build`
//! - A command may take a value, for example `tool repeat 3`
//! - Arguments have a long flag and an optional short flag, for example `-v,--verbose`
//! - Short flags can be clustered, `-abc` is read as `-a -b -c`
//! - A value argument takes the tokens following it, a collection argument takes all of them:
//!   `--tags a b c`
//!
//! Values are converted when parsed. Integers, doubles, booleans, strings, URLs, enum cases and
//! file or folder paths are supported. Custom validations run once all tokens are consumed.
//!
//! A typical manual page rendered by clikit looks like this:
//!
//! ```txt
//! Usage: tool [command] [arguments]
//!
//! # OPTIONS:
//!
//!     build
//!         build the project (Requires --out)
//!     repeat INT
//!
//! # ARGUMENTS:
//!
//!     -v, --verbose
//!         print verbosely
//!     -o, --out   FOLDER_PATH
//!         where to put the output
//!     --count   INT
//!         how many times (Default is '5')
//! ```
//!
//! # Examples
//!
//! A simple example.
//!
//! ```
//! use clikit::{Argument, Command, Interface};
//!
//! let mut cli = Interface::builder("tool").version("1.0.0").build();
//! let verbose = cli.add_argument(Argument::flag("verbose").short("v").help("print verbosely")).unwrap();
//! let count = cli.add_argument(Argument::typed::<i64>("count").default_value(5)).unwrap();
//! let tags = cli.add_argument(Argument::collection::<String>("tags")).unwrap();
//! let build = cli.add_command(Command::new("build").help("build the project")).unwrap();
//!
//! cli.parse(&["tool", "build", "-v", "--tags", "a", "b"]).unwrap();
//!
//! assert!(cli.is_command_selected(&build));
//! assert!(cli.is_selected(&verbose));
//! assert_eq!(Some(5), cli.value(&count));
//! assert_eq!(vec!["a".to_string(), "b".to_string()], cli.values(&tags));
//! ```
//!
//! A more complicated example, with an enum value and validations.
//!
//! ```
//! use clikit::{Argument, Command, Configuration, EnumValue, Interface, ParseError, ValidationResult};
//!
//! #[derive(Debug, Clone, Copy, PartialEq)]
//! enum Level { Low, High }
//!
//! impl EnumValue for Level {
//!     fn cases() -> Vec<Self> {
//!         vec![Level::Low, Level::High]
//!     }
//!
//!     fn raw_value(&self) -> &str {
//!         match self {
//!             Level::Low => "low",
//!             Level::High => "high",
//!         }
//!     }
//! }
//!
//! let mut cli = Interface::builder("tool")
//!     .configuration(Configuration::FAIL_ON_MISSING_COMMAND | Configuration::PRINT_HELP_FOR_NO_SELECTION)
//!     .build();
//! let level = cli.add_argument(Argument::choice::<Level>("level").short("l")).unwrap();
//! let port = cli.add_argument(Argument::typed::<i64>("port")
//!     .validate_value(|port| ValidationResult::from(*port > 1024))).unwrap();
//! let _ = cli.add_command(Command::new("serve").requires(&port)).unwrap();
//!
//! cli.parse(&["tool", "serve", "-l", "high", "--port", "8080"]).unwrap();
//! assert_eq!(Some(Level::High), cli.value(&level));
//!
//! let err = cli.parse(&["tool"]).unwrap_err();
//! assert_eq!(ParseError::NoCommandSelected, err);
//! assert!(cli.should_print_manual(&err));
//!
//! let err = cli.parse(&["tool", "serve", "--port", "80"]).unwrap_err();
//! assert_eq!("Validation Invalid.", err.to_string());
//! ```

pub use argument::{Argument, ArgumentBuilder, ArgumentHandle, ArgumentId, ArgumentRef, ArgumentValidation,
                   Flag, Multi, Single};
pub use command::{Command, CommandBuilder, CommandHandle, CommandId, CommandRef, CommandValidation,
                  CommandValue};
pub use config::Configuration;
pub use container::{Container, MultiValue, SingleValue};
pub use error::{DefinitionError, ParseError, Result};
pub use format::HelpFormatter;
pub use interface::{Interface, InterfaceBuilder, ManualPrinter};
pub use validation::ValidationResult;
pub use value::{ArgValue, Converter, EnumValue, PathKind, Value};

mod argument;
mod command;
mod config;
mod container;
mod error;
mod format;
mod interface;
mod parser;
mod util;
mod validation;
mod value;
