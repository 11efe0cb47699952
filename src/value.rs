use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};

use url::Url;

/// A converted argument or command value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Double(f64),
    Bool(bool),
    Str(String),
    Url(Url),
    /// Absolute, percent-encoded `file://` URL.
    Path(Url),
    /// Raw value of an enum case.
    Case(String),
}

impl Value {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// String values and enum case raw values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(v) | Value::Case(v) => Some(v),
            _ => None,
        }
    }

    /// URL values and the `file://` URL of path values.
    pub fn as_url(&self) -> Option<&Url> {
        match self {
            Value::Url(url) | Value::Path(url) => Some(url),
            _ => None,
        }
    }

    pub fn as_path(&self) -> Option<PathBuf> {
        match self {
            Value::Path(url) => url.to_file_path().ok(),
            _ => None,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Double(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Str(v) | Value::Case(v) => f.write_str(v),
            Value::Url(url) => f.write_str(url.as_str()),
            Value::Path(url) => match url.to_file_path() {
                Ok(path) => write!(f, "{}", path.display()),
                Err(()) => f.write_str(url.as_str()),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    File,
    Folder,
}

impl PathKind {
    fn noun(&self) -> &'static str {
        match self {
            PathKind::File => "file",
            PathKind::Folder => "folder",
        }
    }
}

/// Turns a raw token into a [`Value`].
#[derive(Debug, Clone, PartialEq)]
pub enum Converter {
    Int,
    Double,
    Bool,
    Str,
    /// An absolute URL with a scheme. Relative references are rejected.
    Url,
    Choice(Vec<String>),
    Path { kind: PathKind, must_exist: bool },
}

impl Converter {
    /// The value type descriptor shown in the manual.
    pub fn value_type(&self) -> String {
        match self {
            Converter::Int => "INT".to_string(),
            Converter::Double => "DOUBLE".to_string(),
            Converter::Bool => "BOOL".to_string(),
            Converter::Str => "STRING".to_string(),
            Converter::Url => "URL".to_string(),
            Converter::Choice(cases) => cases
                .iter()
                .map(|c| format!("'{c}'"))
                .collect::<Vec<_>>()
                .join(", "),
            Converter::Path { kind: PathKind::File, .. } => "FILE_PATH".to_string(),
            Converter::Path { kind: PathKind::Folder, .. } => "FOLDER_PATH".to_string(),
        }
    }

    /// Convert `raw` for the argument or command called `owner`.
    ///
    /// The error is a message ready to be shown to the user.
    pub fn convert(&self, raw: &str, owner: &str) -> Result<Value, String> {
        tracing::trace!(raw, owner, converter = ?self, "converting value");
        let unparsable = || format!("Can't parse raw value '{raw}' for '{owner}'.");
        match self {
            Converter::Int => raw.parse().map(Value::Int).map_err(|_| unparsable()),
            Converter::Double => raw.parse().map(Value::Double).map_err(|_| unparsable()),
            Converter::Bool => raw.parse().map(Value::Bool).map_err(|_| unparsable()),
            Converter::Str => Ok(Value::Str(raw.to_owned())),
            Converter::Url => Url::parse(raw).map(Value::Url).map_err(|_| unparsable()),
            Converter::Choice(cases) => {
                if cases.iter().any(|c| c == raw) {
                    Ok(Value::Case(raw.to_owned()))
                } else {
                    Err(format!(
                        "Case '{raw}' doesn't exist for '{owner}'. Possible values are {}.",
                        self.value_type()
                    ))
                }
            }
            Converter::Path { kind, must_exist } => {
                let path = absolute_path(raw)?;
                let url = file_url(&path)?;
                if *must_exist {
                    check_existence(&path, *kind)?;
                }
                Ok(Value::Path(url))
            }
        }
    }
}

/// Resolve `./x` and `x` against the current directory, keep absolute paths.
pub fn absolute_path(raw: &str) -> Result<PathBuf, String> {
    let path = Path::new(raw);
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir()
        .map_err(|e| format!("Can't resolve the current directory for '{raw}': {e}"))?;
    Ok(match raw.strip_prefix("./") {
        Some(rest) => cwd.join(rest),
        None => cwd.join(path),
    })
}

fn file_url(path: &Path) -> Result<Url, String> {
    Url::from_file_path(path)
        .map_err(|()| format!("Can't add percent encoding for raw value: {}", path.display()))
}

fn check_existence(path: &Path, kind: PathKind) -> Result<(), String> {
    let metadata = fs::metadata(path).map_err(|_| {
        format!("Required {} doesn't exist ({}).", kind.noun(), path.display())
    })?;
    let found = if metadata.is_dir() { PathKind::Folder } else { PathKind::File };
    if found != kind {
        return Err(format!(
            "Expected a {} but found a {} ({}).",
            kind.noun(),
            found.noun(),
            path.display()
        ));
    }
    Ok(())
}

/// A primitive type an argument or command value can be converted to.
pub trait ArgValue: Sized {
    fn converter() -> Converter;

    fn from_value(value: &Value) -> Option<Self>;

    /// Used for default values. The error is a message for the user.
    fn into_value(self) -> Result<Value, String>;
}

impl ArgValue for i64 {
    fn converter() -> Converter {
        Converter::Int
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_int()
    }

    fn into_value(self) -> Result<Value, String> {
        Ok(Value::Int(self))
    }
}

impl ArgValue for f64 {
    fn converter() -> Converter {
        Converter::Double
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_double()
    }

    fn into_value(self) -> Result<Value, String> {
        Ok(Value::Double(self))
    }
}

impl ArgValue for bool {
    fn converter() -> Converter {
        Converter::Bool
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_bool()
    }

    fn into_value(self) -> Result<Value, String> {
        Ok(Value::Bool(self))
    }
}

impl ArgValue for String {
    fn converter() -> Converter {
        Converter::Str
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Str(v) => Some(v.clone()),
            _ => None,
        }
    }

    fn into_value(self) -> Result<Value, String> {
        Ok(Value::Str(self))
    }
}

impl ArgValue for Url {
    fn converter() -> Converter {
        Converter::Url
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Url(url) => Some(url.clone()),
            _ => None,
        }
    }

    fn into_value(self) -> Result<Value, String> {
        Ok(Value::Url(self))
    }
}

impl ArgValue for PathBuf {
    fn converter() -> Converter {
        Converter::Path { kind: PathKind::File, must_exist: false }
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_path()
    }

    fn into_value(self) -> Result<Value, String> {
        let path = absolute_path(&self.to_string_lossy())?;
        file_url(&path).map(Value::Path)
    }
}

/// An enum whose cases are selected by their raw string.
///
/// ```
/// use clikit::EnumValue;
///
/// #[derive(Debug, Clone, Copy, PartialEq)]
/// enum Level { Low, High }
///
/// impl EnumValue for Level {
///     fn cases() -> Vec<Self> {
///         vec![Level::Low, Level::High]
///     }
///
///     fn raw_value(&self) -> &str {
///         match self {
///             Level::Low => "low",
///             Level::High => "high",
///         }
///     }
/// }
///
/// assert_eq!(Some(Level::High), Level::from_raw("high"));
/// assert_eq!(None, Level::from_raw("HIGH"));
/// ```
pub trait EnumValue: Sized {
    fn cases() -> Vec<Self>;

    fn raw_value(&self) -> &str;

    fn from_raw(raw: &str) -> Option<Self> {
        Self::cases().into_iter().find(|case| case.raw_value() == raw)
    }
}

pub(crate) fn choice_converter<E: EnumValue>() -> Converter {
    Converter::Choice(
        E::cases()
            .iter()
            .map(|case| case.raw_value().to_owned())
            .collect(),
    )
}

pub(crate) fn case_from_value<E: EnumValue>(value: &Value) -> Option<E> {
    match value {
        Value::Case(raw) => E::from_raw(raw),
        _ => None,
    }
}

pub(crate) fn case_into_value<E: EnumValue>(case: E) -> Result<Value, String> {
    Ok(Value::Case(case.raw_value().to_owned()))
}

#[cfg(test)]
mod test {
    use std::fs;

    use crate::value::{absolute_path, Converter, PathKind, Value};

    #[test]
    fn test_primitive_conversion() {
        assert_eq!(Ok(Value::Int(42)), Converter::Int.convert("42", "--n"));
        assert_eq!(Ok(Value::Int(-3)), Converter::Int.convert("-3", "--n"));
        assert_eq!(Ok(Value::Double(2.5)), Converter::Double.convert("2.5", "--d"));
        assert_eq!(Ok(Value::Bool(true)), Converter::Bool.convert("true", "--b"));
        assert_eq!(Ok(Value::Str("x y".to_string())), Converter::Str.convert("x y", "--s"));
        assert_eq!(
            Err("Can't parse raw value 'abc' for '--n'.".to_string()),
            Converter::Int.convert("abc", "--n")
        );
        assert!(Converter::Bool.convert("yes", "--b").is_err());
        assert!(Converter::Url.convert("https://example.com/a", "--u").is_ok());
        assert!(Converter::Url.convert("not a url", "--u").is_err());
        assert_eq!(
            Err("Can't parse raw value 'relative/path' for '--u'.".to_string()),
            Converter::Url.convert("relative/path", "--u")
        );
    }

    #[test]
    fn test_choice_conversion() {
        let converter = Converter::Choice(vec!["fast".to_string(), "slow".to_string()]);
        assert_eq!(Ok(Value::Case("slow".to_string())), converter.convert("slow", "--mode"));
        let err = converter.convert("medium", "--mode").unwrap_err();
        assert!(err.contains("'medium' doesn't exist"), "{err}");
        assert_eq!("'fast', 'slow'", converter.value_type());
    }

    #[test]
    fn test_value_types() {
        assert_eq!("INT", Converter::Int.value_type());
        assert_eq!(
            "FOLDER_PATH",
            Converter::Path { kind: PathKind::Folder, must_exist: false }.value_type()
        );
    }

    #[test]
    fn test_relative_paths_are_absolutized() {
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(cwd.join("a.txt"), absolute_path("./a.txt").unwrap());
        assert_eq!(cwd.join("dir/a.txt"), absolute_path("dir/a.txt").unwrap());
        assert!(absolute_path(&cwd.join("x").to_string_lossy()).unwrap().is_absolute());
    }

    #[test]
    fn test_path_is_percent_encoded() {
        let converter = Converter::Path { kind: PathKind::File, must_exist: false };
        let value = converter.convert("./with space.txt", "--in").unwrap();
        let url = value.as_url().unwrap();
        assert_eq!("file", url.scheme());
        assert!(url.as_str().ends_with("with%20space.txt"), "{url}");
        assert_eq!(
            std::env::current_dir().unwrap().join("with space.txt"),
            value.as_path().unwrap()
        );
    }

    #[test]
    fn test_path_existence_and_kind() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("data.txt");
        fs::write(&file, "data").unwrap();
        let dir_raw = dir.path().to_string_lossy().to_string();
        let file_raw = file.to_string_lossy().to_string();
        let missing_raw = dir.path().join("missing").to_string_lossy().to_string();

        let file_converter = Converter::Path { kind: PathKind::File, must_exist: true };
        let folder_converter = Converter::Path { kind: PathKind::Folder, must_exist: true };

        assert!(file_converter.convert(&file_raw, "--in").is_ok());
        assert!(folder_converter.convert(&dir_raw, "--dir").is_ok());

        let err = file_converter.convert(&missing_raw, "--in").unwrap_err();
        assert!(err.starts_with("Required file doesn't exist"), "{err}");
        let err = file_converter.convert(&dir_raw, "--in").unwrap_err();
        assert!(err.starts_with("Expected a file but found a folder"), "{err}");
        let err = folder_converter.convert(&file_raw, "--dir").unwrap_err();
        assert!(err.starts_with("Expected a folder but found a file"), "{err}");

        let lenient = Converter::Path { kind: PathKind::File, must_exist: false };
        assert!(lenient.convert(&missing_raw, "--in").is_ok());
    }
}
