use std::process;

use tracing::{debug, trace};

use crate::argument::ArgumentId;
use crate::config::Configuration;
use crate::error::{ParseError, Result};
use crate::interface::Interface;
use crate::util::Util;
use crate::validation::ValidationResult;

impl Interface {
    /// Parse `tokens` against the registered commands and arguments.
    ///
    /// `tokens[0]` is the program path and is skipped. `tokens[1]` is matched against the
    /// command names, the remaining tokens against the argument flags. Clustered short flags
    /// (`-abc`) are expanded. A value argument consumes every following token that isn't a
    /// flag. The validation pass runs last.
    ///
    /// State of the previous parse is cleared first.
    ///
    /// # Error
    ///
    /// The first failure aborts the parse and is returned as [`ParseError`].
    pub fn parse<T: AsRef<str>>(&mut self, tokens: &[T]) -> Result<()> {
        let tokens: Vec<String> = tokens.iter().map(|t| t.as_ref().to_owned()).collect();
        debug!(tool = %self.name(), tokens = tokens.len(), "parsing arguments");

        self.reset();
        self.raw_arguments = Some(tokens.clone());

        if tokens.len() <= 1 {
            if self.fails_on_missing_command() {
                return Err(ParseError::NoCommandSelected);
            }
            // Nothing to select, only the globally required arguments can fail.
            return self.validate();
        }

        let mut index = self.parse_command(&tokens)?;

        if self.fails_on_missing_command() && self.selected_command.is_none() {
            return Err(ParseError::NoCommandSelected);
        }

        while index < tokens.len() {
            let token = &tokens[index];

            if let Some(id) = self.parse_argument(token, &mut index, &tokens)? {
                self.record_selection(id);
            } else if Util::is_short_cluster(token) {
                for flag in Util::expand_short_cluster(token) {
                    match self.parse_argument(&flag, &mut index, &tokens)? {
                        Some(id) => self.record_selection(id),
                        None => return Err(ParseError::UnknownArgument(token.to_owned())),
                    }
                }
            } else if self.configuration().contains(Configuration::ALLOW_UNKNOWN_ARGUMENTS) {
                debug!(token = %token, "collecting unknown argument");
                self.unparsed_arguments.push(token.to_owned());
            } else {
                return Err(ParseError::UnknownArgument(token.to_owned()));
            }

            index += 1;
        }

        self.validate()?;

        debug!(
            command = ?self.selected_command().map(|c| c.name()),
            arguments = self.selected_arguments.len(),
            unparsed = self.unparsed_arguments.len(),
            "parsed arguments"
        );
        Ok(())
    }

    /// Parse the arguments of the current process.
    pub fn parse_env(&mut self) -> Result<()> {
        let tokens: Vec<String> = std::env::args().collect();
        self.parse(&tokens)
    }

    /// Parse the arguments of the current process, or print the error and exit.
    ///
    /// The manual is printed as well when [`Interface::should_print_manual`] says so.
    pub fn parse_or_exit(&mut self) {
        if let Err(err) = self.parse_env() {
            self.exit_with_error(&err);
        }
    }

    /// Whether the manual should accompany `error` when exiting.
    ///
    /// True with [`Configuration::PRINT_HELP_ON_EXIT`], or for a missing command with
    /// [`Configuration::PRINT_HELP_FOR_NO_SELECTION`].
    pub fn should_print_manual(&self, error: &ParseError) -> bool {
        let configuration = self.configuration();
        configuration.contains(Configuration::PRINT_HELP_ON_EXIT)
            || (error.is_no_selection()
                && configuration.contains(Configuration::PRINT_HELP_FOR_NO_SELECTION))
    }

    /// Print `error`, the manual if configured, and exit with a failure status.
    pub fn exit_with_error(&self, error: &ParseError) -> ! {
        eprintln!("Error: {error}\n");
        if self.should_print_manual(error) {
            self.print_manual();
        }
        process::exit(1)
    }

    /// Print `message`, the manual if asked or configured, and exit with `code`.
    pub fn exit(&self, message: &str, print_manual: bool, code: i32) -> ! {
        if code == 0 {
            println!("{message}\n");
        } else {
            eprintln!("Error: {message}\n");
        }
        if print_manual || self.configuration().contains(Configuration::PRINT_HELP_ON_EXIT) {
            self.print_manual();
        }
        process::exit(code)
    }

    fn fails_on_missing_command(&self) -> bool {
        self.configuration().contains(Configuration::FAIL_ON_MISSING_COMMAND)
    }

    fn reset(&mut self) {
        self.selected_command = None;
        self.selected_arguments.clear();
        self.unparsed_arguments.clear();
        for argument in self.arguments.iter_mut() {
            argument.reset();
        }
        for command in self.commands.iter_mut() {
            command.reset();
        }
    }

    fn record_selection(&mut self, id: ArgumentId) {
        if !self.selected_arguments.contains(&id) {
            self.selected_arguments.push(id);
        }
    }

    /// Match `tokens[1]` against the commands and consume its value. Returns the next index.
    fn parse_command(&mut self, tokens: &[String]) -> Result<usize> {
        let mut index = 1;

        let Some(id) = self.command_for(&tokens[index]) else {
            if self.fails_on_missing_command() {
                return Err(ParseError::NoCommandSelected);
            }
            return Ok(index);
        };
        index += 1;

        // Only one token is ever tested, a second selection can't happen.
        debug_assert!(self.selected_command.is_none());
        self.selected_command = Some(id);
        debug!(command = %self.commands[id.index].name(), "selected command");

        if !self.commands[id.index].takes_value() {
            return Ok(index);
        }

        match tokens.get(index) {
            Some(candidate) if !self.is_flag(candidate) => {
                let command = &mut self.commands[id.index];
                if let ValidationResult::Fail(message) = command.parse(candidate) {
                    return Err(ParseError::ParseCommandFailure {
                        command: command.name().to_owned(),
                        message,
                    });
                }
                index += 1;
            }
            _ if self.commands[id.index].has_default() => {
                trace!(command = %self.commands[id.index].name(), "using default value");
            }
            _ => {
                return Err(ParseError::MissingRequiredCommandValue {
                    command: self.commands[id.index].name().to_owned(),
                });
            }
        }

        Ok(index)
    }

    /// Match `token` against the argument flags. A value argument consumes the following
    /// tokens up to the next flag, advancing `index` past them.
    fn parse_argument(&mut self, token: &str, index: &mut usize, tokens: &[String]) -> Result<Option<ArgumentId>> {
        let Some(id) = self.argument_for(token) else {
            return Ok(None);
        };

        let argument = &mut self.arguments[id.index];
        argument.select();
        debug!(argument = %argument.long_flag(), token, "selected argument");

        if !argument.takes_value() {
            return Ok(Some(id));
        }

        let mut found_values = 0;
        while let Some(candidate) = tokens.get(*index + 1) {
            if self.is_flag(candidate) {
                break;
            }
            *index += 1;

            let argument = &mut self.arguments[id.index];
            if let ValidationResult::Fail(message) = argument.parse(candidate) {
                return Err(ParseError::ParseArgumentFailure {
                    argument: argument.long_flag().to_owned(),
                    message,
                });
            }
            found_values += 1;
        }

        if found_values == 0 {
            return Err(ParseError::MissingRequiredArgumentValue {
                argument: self.arguments[id.index].long_flag().to_owned(),
            });
        }

        Ok(Some(id))
    }

    /// Enforce required arguments and run the custom validations.
    fn validate(&self) -> Result<()> {
        if let Some(command) = self.selected_command() {
            for id in command.required_arguments().unwrap_or(&[]) {
                let Some(argument) = self.argument(id) else {
                    continue;
                };
                if !self.selected_arguments.contains(id) && !argument.has_default() {
                    return Err(ParseError::MissingRequiredArgument {
                        command: command.name().to_owned(),
                        argument: argument.long_flag().to_owned(),
                    });
                }
            }
        }

        for argument in self.arguments.iter() {
            if argument.is_required() && !argument.is_selected() {
                return Err(ParseError::MissingRequiredArgumentValue {
                    argument: argument.long_flag().to_owned(),
                });
            }
        }

        if let Some(command) = self.selected_command() {
            if let ValidationResult::Fail(message) = command.run_validation() {
                return Err(ParseError::CommandValidationFailure {
                    command: command.name().to_owned(),
                    message,
                });
            }
        }

        for argument in self.selected_arguments() {
            if let ValidationResult::Fail(message) = argument.run_validation() {
                return Err(ParseError::ArgumentValidationFailure {
                    argument: argument.long_flag().to_owned(),
                    message,
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use crate::argument::Argument;
    use crate::command::Command;
    use crate::config::Configuration;
    use crate::error::ParseError;
    use crate::interface::Interface;
    use crate::validation::ValidationResult;

    fn interface(configuration: Configuration) -> Interface {
        Interface::builder("prog").configuration(configuration).build()
    }

    #[test]
    fn test_empty_invocation() {
        let mut cli = interface(Configuration::empty());
        assert_eq!(Ok(()), cli.parse(&["prog"]));
        assert!(cli.selected_command().is_none());
        assert_eq!(Some(&["prog".to_string()][..]), cli.raw_arguments());

        let mut strict = interface(Configuration::FAIL_ON_MISSING_COMMAND);
        assert_eq!(Err(ParseError::NoCommandSelected), strict.parse(&["prog"]));
        let empty: [&str; 0] = [];
        assert_eq!(Err(ParseError::NoCommandSelected), strict.parse(&empty));
    }

    #[test]
    fn test_empty_invocation_checks_required_arguments() {
        let mut cli = interface(Configuration::empty());
        let _ = cli.add_argument(Argument::typed::<String>("token").required(true)).unwrap();
        let _ = cli.add_argument(Argument::typed::<i64>("jobs").validate(|_| ValidationResult::fail("never run"))).unwrap();

        assert_eq!(
            Err(ParseError::MissingRequiredArgumentValue { argument: "--token".to_string() }),
            cli.parse(&["prog"])
        );

        let mut strict = interface(Configuration::FAIL_ON_MISSING_COMMAND);
        let _ = strict.add_argument(Argument::typed::<String>("token").required(true)).unwrap();
        assert_eq!(Err(ParseError::NoCommandSelected), strict.parse(&["prog"]));
    }

    #[test]
    fn test_command_is_only_matched_first() {
        let mut cli = interface(Configuration::empty());
        let build = cli.add_command(Command::new("build")).unwrap();
        let verbose = cli.add_argument(Argument::flag("verbose").short("v")).unwrap();

        cli.parse(&["prog", "build", "-v"]).unwrap();
        assert!(cli.is_command_selected(&build));
        assert!(cli.is_selected(&verbose));

        assert_eq!(
            Err(ParseError::UnknownArgument("build".to_string())),
            cli.parse(&["prog", "-v", "build"])
        );
    }

    #[test]
    fn test_missing_command_with_arguments() {
        let mut cli = interface(Configuration::FAIL_ON_MISSING_COMMAND);
        let _ = cli.add_command(Command::new("build")).unwrap();
        let _ = cli.add_argument(Argument::flag("verbose")).unwrap();
        assert_eq!(Err(ParseError::NoCommandSelected), cli.parse(&["prog", "--verbose"]));
        assert_eq!(Ok(()), cli.parse(&["prog", "build", "--verbose"]));
    }

    #[test]
    fn test_command_value() {
        let mut cli = interface(Configuration::empty());
        let _ = cli.add_argument(Argument::flag("verbose")).unwrap();
        let repeat = cli.add_command(Command::typed::<i64>("repeat")).unwrap();
        let greet = cli.add_command(Command::typed::<String>("greet").default_value("you".to_string())).unwrap();

        cli.parse(&["prog", "repeat", "3", "--verbose"]).unwrap();
        assert_eq!(Some(3), cli.command_value(&repeat));

        assert_eq!(
            Err(ParseError::MissingRequiredCommandValue { command: "repeat".to_string() }),
            cli.parse(&["prog", "repeat"])
        );
        assert_eq!(
            Err(ParseError::MissingRequiredCommandValue { command: "repeat".to_string() }),
            cli.parse(&["prog", "repeat", "--verbose"])
        );
        assert!(matches!(
            cli.parse(&["prog", "repeat", "three"]),
            Err(ParseError::ParseCommandFailure { command, .. }) if command == "repeat"
        ));

        cli.parse(&["prog", "greet", "--verbose"]).unwrap();
        assert_eq!(Some("you".to_string()), cli.command_value(&greet));
        cli.parse(&["prog", "greet", "me"]).unwrap();
        assert_eq!(Some("me".to_string()), cli.command_value(&greet));
    }

    #[test]
    fn test_value_argument_consumes_until_next_flag() {
        let mut cli = interface(Configuration::empty());
        let name = cli.add_argument(Argument::typed::<String>("name").short("n")).unwrap();
        let verbose = cli.add_argument(Argument::flag("verbose").short("v")).unwrap();

        cli.parse(&["prog", "-n", "alice", "-v"]).unwrap();
        assert_eq!(Some("alice".to_string()), cli.value(&name));
        assert!(cli.is_selected(&verbose));

        assert_eq!(
            Err(ParseError::MissingRequiredArgumentValue { argument: "--name".to_string() }),
            cli.parse(&["prog", "--name"])
        );
        assert_eq!(
            Err(ParseError::MissingRequiredArgumentValue { argument: "--name".to_string() }),
            cli.parse(&["prog", "--name", "-v"])
        );
        assert!(matches!(
            cli.parse(&["prog", "--name", "alice", "extra"]),
            Err(ParseError::ParseArgumentFailure { argument, .. }) if argument == "--name"
        ));
    }

    #[test]
    fn test_cluster_consumes_values() {
        let mut cli = interface(Configuration::empty());
        let all = cli.add_argument(Argument::flag("all").short("a")).unwrap();
        let level = cli.add_argument(Argument::typed::<i64>("level").short("l")).unwrap();

        cli.parse(&["prog", "-al", "3"]).unwrap();
        assert!(cli.is_selected(&all));
        assert_eq!(Some(3), cli.value(&level));
    }

    #[test]
    fn test_lone_dash_is_unknown() {
        let mut cli = interface(Configuration::empty());
        assert_eq!(Err(ParseError::UnknownArgument("-".to_string())), cli.parse(&["prog", "-"]));
        cli.set_configuration(Configuration::ALLOW_UNKNOWN_ARGUMENTS);
        cli.parse(&["prog", "-"]).unwrap();
        assert_eq!(&["-".to_string()], cli.unparsed_arguments());
    }

    #[test]
    fn test_repeated_flag_is_selected_once() {
        let mut cli = interface(Configuration::empty());
        let _ = cli.add_argument(Argument::flag("verbose").short("v")).unwrap();
        let tags = cli.add_argument(Argument::collection::<String>("tags")).unwrap();

        cli.parse(&["prog", "-v", "--verbose", "--tags", "a", "--tags", "b", "-v"]).unwrap();
        assert_eq!(2, cli.selected_arguments().count());
        assert_eq!(vec!["a".to_string(), "b".to_string()], cli.values(&tags));
    }

    #[test]
    fn test_required_arguments_of_command() {
        let mut cli = interface(Configuration::empty());
        let out = cli.add_argument(Argument::typed::<String>("out")).unwrap();
        let jobs = cli.add_argument(Argument::typed::<i64>("jobs").default_value(4)).unwrap();
        let _ = cli.add_command(Command::new("build").requires(&out).requires(&jobs)).unwrap();
        let _ = cli.add_command(Command::new("clean")).unwrap();

        assert_eq!(
            Err(ParseError::MissingRequiredArgument {
                command: "build".to_string(),
                argument: "--out".to_string(),
            }),
            cli.parse(&["prog", "build"])
        );
        cli.parse(&["prog", "build", "--out", "target"]).unwrap();
        assert_eq!(Some(4), cli.value(&jobs));
        cli.parse(&["prog", "clean"]).unwrap();
    }

    #[test]
    fn test_globally_required_argument_ignores_default() {
        let mut cli = interface(Configuration::empty());
        let _ = cli.add_command(Command::new("run")).unwrap();
        let _ = cli.add_argument(Argument::typed::<i64>("port").required(true).default_value(80)).unwrap();

        assert_eq!(
            Err(ParseError::MissingRequiredArgumentValue { argument: "--port".to_string() }),
            cli.parse(&["prog", "run"])
        );
        cli.parse(&["prog", "run", "--port", "8080"]).unwrap();
    }

    #[test]
    fn test_custom_validations_in_order() {
        let mut cli = interface(Configuration::empty());
        let _ = cli.add_command(
            Command::typed::<i64>("wait").validate_value(|secs| (*secs < 60).into()),
        ).unwrap();
        let _ = cli.add_argument(
            Argument::typed::<i64>("first").validate(|_| ValidationResult::fail("first failed")),
        ).unwrap();
        let _ = cli.add_argument(
            Argument::typed::<i64>("second").validate(|_| ValidationResult::fail("second failed")),
        ).unwrap();

        assert_eq!(
            Err(ParseError::CommandValidationFailure {
                command: "wait".to_string(),
                message: "Validation Invalid.".to_string(),
            }),
            cli.parse(&["prog", "wait", "90", "--first", "1"])
        );
        assert_eq!(
            Err(ParseError::ArgumentValidationFailure {
                argument: "--second".to_string(),
                message: "second failed".to_string(),
            }),
            cli.parse(&["prog", "wait", "5", "--second", "2", "--first", "1"])
        );
        cli.parse(&["prog", "wait", "5"]).unwrap();
    }

    #[test]
    fn test_should_print_manual() {
        let unknown = ParseError::UnknownArgument("x".to_string());

        let cli = interface(Configuration::empty());
        assert!(!cli.should_print_manual(&ParseError::NoCommandSelected));
        assert!(!cli.should_print_manual(&unknown));

        let cli = interface(Configuration::PRINT_HELP_FOR_NO_SELECTION);
        assert!(cli.should_print_manual(&ParseError::NoCommandSelected));
        assert!(!cli.should_print_manual(&unknown));

        let cli = interface(Configuration::PRINT_HELP_ON_EXIT);
        assert!(cli.should_print_manual(&unknown));
    }
}
