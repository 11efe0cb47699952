use std::fmt::{Debug, Formatter};
use std::ops::{BitOr, BitOrAssign};

/// Behavior flags of an [`Interface`](crate::Interface), composable with `|`.
///
/// ```
/// use clikit::Configuration;
///
/// let config = Configuration::FAIL_ON_MISSING_COMMAND | Configuration::ALLOW_UNKNOWN_ARGUMENTS;
/// assert!(config.contains(Configuration::ALLOW_UNKNOWN_ARGUMENTS));
/// assert!(!config.contains(Configuration::PRINT_HELP_ON_EXIT));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Configuration(u8);

impl Configuration {
    /// Print the manual after any failure handled by the exit helper.
    pub const PRINT_HELP_ON_EXIT: Configuration = Configuration(1);

    /// Print the manual when no command was selected.
    pub const PRINT_HELP_FOR_NO_SELECTION: Configuration = Configuration(1 << 1);

    /// Parsing fails if no command token is present.
    pub const FAIL_ON_MISSING_COMMAND: Configuration = Configuration(1 << 2);

    /// Unrecognized tokens are collected instead of raising an error.
    pub const ALLOW_UNKNOWN_ARGUMENTS: Configuration = Configuration(1 << 3);

    const NAMES: [(Configuration, &'static str); 4] = [
        (Self::PRINT_HELP_ON_EXIT, "PRINT_HELP_ON_EXIT"),
        (Self::PRINT_HELP_FOR_NO_SELECTION, "PRINT_HELP_FOR_NO_SELECTION"),
        (Self::FAIL_ON_MISSING_COMMAND, "FAIL_ON_MISSING_COMMAND"),
        (Self::ALLOW_UNKNOWN_ARGUMENTS, "ALLOW_UNKNOWN_ARGUMENTS"),
    ];

    pub const fn empty() -> Configuration {
        Configuration(0)
    }

    pub const fn all() -> Configuration {
        Configuration(0b1111)
    }

    pub const fn bits(&self) -> u8 {
        self.0
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Whether every flag of `other` is set.
    pub const fn contains(&self, other: Configuration) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: Configuration) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: Configuration) {
        self.0 &= !other.0;
    }
}

impl BitOr for Configuration {
    type Output = Configuration;

    fn bitor(self, rhs: Self) -> Self::Output {
        Configuration(self.0 | rhs.0)
    }
}

impl BitOrAssign for Configuration {
    fn bitor_assign(&mut self, rhs: Self) {
        self.insert(rhs);
    }
}

impl Debug for Configuration {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = Self::NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        write!(f, "Configuration({})", names.join(" | "))
    }
}
