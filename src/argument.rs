use std::fmt::{Debug, Display, Formatter};
use std::path::PathBuf;

use crate::container::{Container, MultiValue, SingleValue};
use crate::error::DefinitionError;
use crate::util::{FlagValidator, Util};
use crate::validation::ValidationResult;
use crate::value::{case_from_value, case_into_value, choice_converter, ArgValue, Converter, EnumValue,
                   PathKind, Value};

/// Custom validation of an [`Argument`], run after parsing with the converted value in place.
pub type ArgumentValidation = Box<dyn Fn(&Argument) -> ValidationResult>;

/// Position of an [`Argument`] in the [`Interface`](crate::Interface) it was registered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArgumentId {
    pub(crate) interface: u64,
    pub(crate) index: usize,
}

impl ArgumentId {
    pub(crate) const fn new(interface: u64, index: usize) -> ArgumentId {
        ArgumentId { interface, index }
    }
}

/// Anything that identifies a registered [`Argument`].
pub trait ArgumentRef {
    fn id(&self) -> ArgumentId;
}

/// A handle returned when registering an [`Argument`].
pub trait ArgumentHandle: ArgumentRef {
    #[doc(hidden)]
    fn bind(self, id: ArgumentId) -> Self;
}

impl ArgumentRef for ArgumentId {
    fn id(&self) -> ArgumentId {
        *self
    }
}

const UNBOUND: ArgumentId = ArgumentId::new(0, usize::MAX);

/// Handle of a flag without value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Flag(ArgumentId);

impl ArgumentRef for Flag {
    fn id(&self) -> ArgumentId {
        self.0
    }
}

impl ArgumentHandle for Flag {
    fn bind(self, id: ArgumentId) -> Self {
        Flag(id)
    }
}

/// Handle of an argument taking one value of type `T`.
pub struct Single<T> {
    id: ArgumentId,
    extract: fn(&Value) -> Option<T>,
    encode: fn(T) -> Result<Value, String>,
}

impl<T> Single<T> {
    pub(crate) fn extract(&self, value: &Value) -> Option<T> {
        (self.extract)(value)
    }
}

impl<T> Clone for Single<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Single<T> {}

impl<T> Debug for Single<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Single").field(&self.id).finish()
    }
}

impl<T> ArgumentRef for Single<T> {
    fn id(&self) -> ArgumentId {
        self.id
    }
}

impl<T> ArgumentHandle for Single<T> {
    fn bind(self, id: ArgumentId) -> Self {
        Single { id, ..self }
    }
}

/// Handle of an argument collecting any number of values of type `T`.
pub struct Multi<T> {
    id: ArgumentId,
    extract: fn(&Value) -> Option<T>,
}

impl<T> Multi<T> {
    pub(crate) fn extract(&self, value: &Value) -> Option<T> {
        (self.extract)(value)
    }
}

impl<T> Clone for Multi<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Multi<T> {}

impl<T> Debug for Multi<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Multi").field(&self.id).finish()
    }
}

impl<T> ArgumentRef for Multi<T> {
    fn id(&self) -> ArgumentId {
        self.id
    }
}

impl<T> ArgumentHandle for Multi<T> {
    fn bind(self, id: ArgumentId) -> Self {
        Multi { id, ..self }
    }
}

/// The `Argument` represents a single flag, e.g. `-v,--verbose`, with or without values.
///
/// Arguments are declared with one of the builder constructors and registered with
/// [`Interface::add_argument`](crate::Interface::add_argument), which hands back a typed
/// handle to read the parsed value.
///
/// # Examples
///
/// A plain flag: `-v,--verbose`
/// ```
/// use clikit::Argument;
/// let verbose = Argument::flag("verbose").short("v").help("print verbosely");
/// ```
///
/// A numeric argument with default: `--count <INT>`
/// ```
/// use clikit::Argument;
/// let count = Argument::typed::<i64>("count").default_value(5);
/// ```
///
/// An argument collecting values: `--tags a b c`
/// ```
/// use clikit::Argument;
/// let tags = Argument::collection::<String>("tags").help("tags to apply");
/// ```
pub struct Argument {
    short_flag: Option<String>,
    long_flag: String,
    help: Option<String>,
    required: bool,
    selected: bool,
    container: Container,
    validation: Option<ArgumentValidation>,
}

impl Argument {
    /// Declare a flag without value.
    pub fn flag(long_flag: &str) -> ArgumentBuilder<Flag> {
        ArgumentBuilder::new(long_flag, Pending::Plain, Flag(UNBOUND))
    }

    /// Declare an argument taking exactly one value.
    pub fn typed<T: ArgValue>(long_flag: &str) -> ArgumentBuilder<Single<T>> {
        let handle = Single {
            id: UNBOUND,
            extract: T::from_value,
            encode: T::into_value,
        };
        ArgumentBuilder::new(long_flag, Pending::Single(T::converter()), handle)
    }

    /// Declare an argument collecting every value following its flag.
    pub fn collection<T: ArgValue>(long_flag: &str) -> ArgumentBuilder<Multi<T>> {
        let handle = Multi {
            id: UNBOUND,
            extract: T::from_value,
        };
        ArgumentBuilder::new(long_flag, Pending::Multi(T::converter()), handle)
    }

    /// Declare an argument taking one case of the enum `E`.
    pub fn choice<E: EnumValue>(long_flag: &str) -> ArgumentBuilder<Single<E>> {
        let handle = Single {
            id: UNBOUND,
            extract: case_from_value::<E>,
            encode: case_into_value::<E>,
        };
        ArgumentBuilder::new(long_flag, Pending::Single(choice_converter::<E>()), handle)
    }

    /// Declare an argument taking a path to a file.
    pub fn file(long_flag: &str) -> ArgumentBuilder<Single<PathBuf>> {
        Self::path(long_flag, PathKind::File)
    }

    /// Declare an argument taking a path to a folder.
    pub fn folder(long_flag: &str) -> ArgumentBuilder<Single<PathBuf>> {
        Self::path(long_flag, PathKind::Folder)
    }

    fn path(long_flag: &str, kind: PathKind) -> ArgumentBuilder<Single<PathBuf>> {
        let mut builder = Self::typed::<PathBuf>(long_flag);
        builder.pending = Pending::Single(Converter::Path { kind, must_exist: false });
        builder
    }

    pub fn short_flag(&self) -> Option<&str> {
        self.short_flag.as_deref()
    }

    pub fn long_flag(&self) -> &str {
        &self.long_flag
    }

    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Whether the flag was found by the last parse.
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn takes_value(&self) -> bool {
        self.container.takes_value()
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    /// The effective value: the parsed value, else the default.
    ///
    /// Always `None` for flags and multi value arguments.
    pub fn value(&self) -> Option<&Value> {
        match &self.container {
            Container::Single(single) => single.value(),
            Container::Plain | Container::Multi(_) => None,
        }
    }

    /// Values of a multi value argument, or the effective value of a single value one.
    pub fn values(&self) -> &[Value] {
        match &self.container {
            Container::Multi(multi) => multi.values(),
            Container::Single(single) => single.value().map(std::slice::from_ref).unwrap_or(&[]),
            Container::Plain => &[],
        }
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.container.default_value()
    }

    pub fn has_default(&self) -> bool {
        self.container.has_default()
    }

    /// Value type descriptor, e.g. `INT` or `STRING_1 STRING_2 ...`.
    pub fn value_type(&self) -> Option<String> {
        self.container.value_type()
    }

    /// Exact match against the short or long flag.
    pub fn matches(&self, token: &str) -> bool {
        self.long_flag == token || self.short_flag.as_deref() == Some(token)
    }

    pub(crate) fn select(&mut self) {
        self.selected = true;
    }

    pub(crate) fn reset(&mut self) {
        self.selected = false;
        self.container.reset();
    }

    pub(crate) fn parse(&mut self, raw: &str) -> ValidationResult {
        self.container.parse(raw, &self.long_flag)
    }

    pub(crate) fn run_validation(&self) -> ValidationResult {
        match &self.validation {
            Some(validation) => validation(self),
            None => ValidationResult::Success,
        }
    }
}

impl Debug for Argument {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Argument")
            .field("short_flag", &self.short_flag)
            .field("long_flag", &self.long_flag)
            .field("required", &self.required)
            .field("selected", &self.selected)
            .field("container", &self.container)
            .field("validation", &self.validation.is_some())
            .finish()
    }
}

impl Display for Argument {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[ argument: {}", self.long_flag)?;
        if let Some(short_flag) = &self.short_flag {
            write!(f, " {short_flag}")?;
        }
        if let Some(value_type) = self.value_type() {
            write!(f, " <{value_type}>")?;
        }
        write!(f, " :: {} ]", self.help.as_deref().unwrap_or("None"))
    }
}

impl PartialEq for Argument {
    fn eq(&self, other: &Self) -> bool {
        self.short_flag == other.short_flag && self.long_flag == other.long_flag
    }
}

enum Pending {
    Plain,
    Single(Converter),
    Multi(Converter),
}

/// A builder struct for [`Argument`].
pub struct ArgumentBuilder<H> {
    short_flag: Option<String>,
    long_flag: String,
    help: Option<String>,
    required: bool,
    pending: Pending,
    default: Option<Result<Value, String>>,
    validation: Option<ArgumentValidation>,
    handle: H,
}

impl<H: ArgumentHandle> ArgumentBuilder<H> {
    fn new(long_flag: &str, pending: Pending, handle: H) -> Self {
        ArgumentBuilder {
            short_flag: None,
            long_flag: Util::with_long_prefix(long_flag),
            help: None,
            required: false,
            pending,
            default: None,
            validation: None,
            handle,
        }
    }

    /// Set the short flag, a single character. The `-` prefix is optional.
    pub fn short(mut self, short_flag: &str) -> Self {
        self.short_flag = Some(Util::with_short_prefix(short_flag));
        self
    }

    /// Set the help message shown in the manual.
    pub fn help(mut self, help: &str) -> Self {
        self.help = Some(help.trim().to_owned());
        self
    }

    /// Whether the argument must be given on every invocation.
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Set a custom validation, run after a successful parse when the argument is selected.
    pub fn validate<F>(mut self, validation: F) -> Self
    where
        F: Fn(&Argument) -> ValidationResult + 'static,
    {
        self.validation = Some(Box::new(validation));
        self
    }

    /// Check the flags and build the [`Argument`], binding the handle to `id`.
    pub(crate) fn build(self, id: ArgumentId) -> Result<(Argument, H), DefinitionError> {
        FlagValidator::validate_long(&self.long_flag)?;
        if let Some(short_flag) = &self.short_flag {
            FlagValidator::validate_short(short_flag)?;
        }
        let default = self
            .default
            .transpose()
            .map_err(|message| DefinitionError::InvalidDefault {
                name: self.long_flag.clone(),
                message,
            })?;
        let container = match self.pending {
            Pending::Plain => Container::Plain,
            Pending::Single(converter) => Container::Single(SingleValue::new(converter, default)),
            Pending::Multi(converter) => Container::Multi(MultiValue::new(converter)),
        };
        let argument = Argument {
            short_flag: self.short_flag,
            long_flag: self.long_flag,
            help: self.help,
            required: self.required,
            selected: false,
            container,
            validation: self.validation,
        };
        Ok((argument, self.handle.bind(id)))
    }
}

impl<T: 'static> ArgumentBuilder<Single<T>> {
    /// Set the value used when the argument isn't given.
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
        self.validate(move |argument| match argument.value().and_then(extract) {
            Some(value) => validation(&value),
            None => ValidationResult::Success,
        })
    }
}

impl ArgumentBuilder<Single<PathBuf>> {
    /// Whether the path must exist and be of the declared kind.
    pub fn must_exist(mut self, must_exist: bool) -> Self {
        if let Pending::Single(Converter::Path { must_exist: flag, .. }) = &mut self.pending {
            *flag = must_exist;
        }
        self
    }
}

impl<T: 'static> ArgumentBuilder<Multi<T>> {
    /// Set a custom validation on all collected values.
    pub fn validate_values<F>(self, validation: F) -> Self
    where
        F: Fn(&[T]) -> ValidationResult + 'static,
    {
        let extract = self.handle.extract;
        self.validate(move |argument| {
            let values: Vec<T> = argument.values().iter().filter_map(extract).collect();
            validation(&values)
        })
    }
}

#[cfg(test)]
mod test {
    use crate::argument::{Argument, ArgumentId};
    use crate::error::DefinitionError;
    use crate::validation::ValidationResult;
    use crate::value::Value;

    #[test]
    fn test_flags_are_normalized() {
        let (argument, _) = Argument::flag("verbose").short("v").build(ArgumentId::new(1, 0)).unwrap();
        assert_eq!("--verbose", argument.long_flag());
        assert_eq!(Some("-v"), argument.short_flag());
        assert!(argument.matches("-v"));
        assert!(argument.matches("--verbose"));
        assert!(!argument.matches("verbose"));
        assert!(!argument.matches("--verb"));

        let (argument, _) = Argument::flag("--quiet").short("-q").build(ArgumentId::new(1, 1)).unwrap();
        assert_eq!("--quiet", argument.long_flag());
        assert_eq!(Some("-q"), argument.short_flag());
    }

    #[test]
    fn test_invalid_flags() {
        assert_eq!(
            DefinitionError::BlankFlag,
            Argument::flag("").build(ArgumentId::new(1, 0)).unwrap_err()
        );
        assert_eq!(
            DefinitionError::InvalidShortFlag("-vv".to_string()),
            Argument::flag("verbose").short("vv").build(ArgumentId::new(1, 0)).unwrap_err()
        );
        assert_eq!(
            DefinitionError::InvalidShortFlag("--v".to_string()),
            Argument::flag("verbose").short("--v").build(ArgumentId::new(1, 0)).unwrap_err()
        );
    }

    #[test]
    fn test_default_value() {
        let (argument, _) = Argument::typed::<i64>("count").default_value(5).build(ArgumentId::new(1, 0)).unwrap();
        assert!(argument.has_default());
        assert_eq!(Some(&Value::Int(5)), argument.value());
        assert_eq!(Some("INT".to_string()), argument.value_type());
    }

    #[test]
    fn test_single_argument_parse_and_reset() {
        let (mut argument, _) = Argument::typed::<String>("name").build(ArgumentId::new(1, 0)).unwrap();
        argument.select();
        assert!(argument.parse("a").is_success());
        assert!(!argument.parse("b").is_success());
        argument.reset();
        assert!(!argument.is_selected());
        assert_eq!(None, argument.value());
    }

    #[test]
    fn test_validate_value_observes_converted_value() {
        let (mut argument, _) = Argument::typed::<i64>("port")
            .validate_value(|port| (*port > 1024).into())
            .build(ArgumentId::new(1, 0))
            .unwrap();
        assert!(argument.run_validation().is_success());
        assert!(argument.parse("80").is_success());
        assert_eq!(ValidationResult::fail("Validation Invalid."), argument.run_validation());
    }

    #[test]
    fn test_validate_values() {
        let (mut argument, _) = Argument::collection::<i64>("ids")
            .validate_values(|ids| (ids.len() <= 2).into())
            .build(ArgumentId::new(1, 0))
            .unwrap();
        for raw in ["1", "2", "3"] {
            assert!(argument.parse(raw).is_success());
        }
        assert!(!argument.run_validation().is_success());
        assert_eq!(None, argument.value());
        assert_eq!(3, argument.values().len());
    }
}
