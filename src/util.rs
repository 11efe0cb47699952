use crate::error::DefinitionError;

pub const SHORT_FLAG_PREFIX: &str = "-";
pub const LONG_FLAG_PREFIX: &str = "--";

pub struct Util;

impl Util {
    /// Prefix `flag` with a single hyphen unless it already starts with one.
    pub fn with_short_prefix(flag: &str) -> String {
        let flag = flag.trim();
        if flag.starts_with(SHORT_FLAG_PREFIX) {
            flag.to_owned()
        } else {
            format!("{SHORT_FLAG_PREFIX}{flag}")
        }
    }

    /// Prefix `flag` with a double hyphen unless it already starts with one.
    pub fn with_long_prefix(flag: &str) -> String {
        let flag = flag.trim();
        if flag.starts_with(LONG_FLAG_PREFIX) {
            flag.to_owned()
        } else {
            format!("{LONG_FLAG_PREFIX}{flag}")
        }
    }

    pub fn strip_leading_hyphens(string: &str) -> &str {
        if let Some(rest) = string.strip_prefix(LONG_FLAG_PREFIX) {
            rest
        } else if let Some(rest) = string.strip_prefix(SHORT_FLAG_PREFIX) {
            rest
        } else {
            string
        }
    }

    /// Whether `token` looks like a group of short flags, e.g. `-abc`.
    pub fn is_short_cluster(token: &str) -> bool {
        token.starts_with(SHORT_FLAG_PREFIX)
            && !token.starts_with(LONG_FLAG_PREFIX)
            && token.len() > SHORT_FLAG_PREFIX.len()
    }

    /// Split `-abc` into `-a`, `-b`, `-c`.
    pub fn expand_short_cluster(token: &str) -> Vec<String> {
        Util::strip_leading_hyphens(token)
            .chars()
            .map(|c| format!("{SHORT_FLAG_PREFIX}{c}"))
            .collect()
    }
}

pub struct FlagValidator;

impl FlagValidator {
    fn is_valid_char(c: char) -> bool {
        !c.is_whitespace() && !c.is_control() && c != '-'
    }

    /// Validate a normalized short flag: a hyphen and exactly one character.
    pub fn validate_short(flag: &str) -> Result<(), DefinitionError> {
        if flag.starts_with(LONG_FLAG_PREFIX) {
            return Err(DefinitionError::InvalidShortFlag(flag.to_owned()));
        }
        let mut chars = Util::strip_leading_hyphens(flag).chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if Self::is_valid_char(c) => Ok(()),
            (None, _) => Err(DefinitionError::BlankFlag),
            _ => Err(DefinitionError::InvalidShortFlag(flag.to_owned())),
        }
    }

    /// Validate a normalized long flag.
    pub fn validate_long(flag: &str) -> Result<(), DefinitionError> {
        let name = Util::strip_leading_hyphens(flag);
        if name.is_empty() {
            return Err(DefinitionError::BlankFlag);
        }
        if let Some(c) = name.chars().find(|c| c.is_whitespace() || c.is_control()) {
            return Err(DefinitionError::IllegalCharacter {
                name: flag.to_owned(),
                character: c,
            });
        }
        Ok(())
    }

    pub fn validate_command_name(name: &str) -> Result<(), DefinitionError> {
        if name.is_empty() {
            return Err(DefinitionError::BlankCommandName);
        }
        if let Some(c) = name.chars().find(|c| c.is_whitespace() || c.is_control()) {
            return Err(DefinitionError::IllegalCharacter {
                name: name.to_owned(),
                character: c,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use crate::util::{FlagValidator, Util};

    #[test]
    fn test_prefixes() {
        assert_eq!("-v", Util::with_short_prefix("v"));
        assert_eq!("-v", Util::with_short_prefix("-v"));
        assert_eq!("--verbose", Util::with_long_prefix("verbose"));
        assert_eq!("--verbose", Util::with_long_prefix("--verbose"));
        assert_eq!("---verbose", Util::with_long_prefix("-verbose"));
        assert_eq!("--name", Util::with_long_prefix(" name "));
    }

    #[test]
    fn test_strip_leading_hyphens() {
        assert_eq!("option", Util::strip_leading_hyphens("--option"));
        assert_eq!("option", Util::strip_leading_hyphens("-option"));
        assert_eq!("-option", Util::strip_leading_hyphens("---option"));
        assert_eq!("option", Util::strip_leading_hyphens("option"));
        assert_eq!("", Util::strip_leading_hyphens(""));
    }

    #[test]
    fn test_short_cluster() {
        assert!(Util::is_short_cluster("-abc"));
        assert!(Util::is_short_cluster("-a"));
        assert!(!Util::is_short_cluster("-"));
        assert!(!Util::is_short_cluster("--abc"));
        assert!(!Util::is_short_cluster("abc"));
        assert_eq!(vec!["-a", "-b", "-c"], Util::expand_short_cluster("-abc"));
    }

    #[test]
    fn test_flag_validator() {
        assert!(FlagValidator::validate_short("-a").is_ok());
        assert!(FlagValidator::validate_short("-?").is_ok());
        assert!(FlagValidator::validate_short("-").is_err());
        assert!(FlagValidator::validate_short("-ab").is_err());
        assert!(FlagValidator::validate_short("--v").is_err());
        assert!(FlagValidator::validate_short("--").is_err());
        assert!(FlagValidator::validate_long("--all").is_ok());
        assert!(FlagValidator::validate_long("--").is_err());
        assert!(FlagValidator::validate_long("--dry run").is_err());
        assert!(FlagValidator::validate_command_name("build").is_ok());
        assert!(FlagValidator::validate_command_name("").is_err());
        assert!(FlagValidator::validate_command_name("a b").is_err());
    }
}
