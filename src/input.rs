//! Loading of report inputs.
//!
//! Every report decodes its JSON payload into a typed record. Decoding
//! failures are classified so the caller learns which file is wrong and
//! where, instead of a bare serde message.
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::debug;
use serde::de::DeserializeOwned;
use serde_json::error::Category;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InputError {
    #[error("input file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed JSON in {} at line {line}, column {column}: {message}", path.display())]
    Malformed {
        path: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },

    #[error("missing field `{field}` in {}", path.display())]
    MissingField { path: PathBuf, field: String },

    #[error("invalid input in {}: {message}", path.display())]
    Invalid { path: PathBuf, message: String },
}

/// Semantic checks run on a record after it decoded.
pub trait Validate {
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Read `path` and decode it into `T`, then validate the record.
pub fn load_json<T, P>(path: P) -> Result<T, InputError>
where
    T: DeserializeOwned + Validate,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => InputError::NotFound {
            path: path.to_path_buf(),
        },
        _ => InputError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;
    let record = parse_json(&text, path)?;
    debug!("decoded {}", path.display());
    Ok(record)
}

/// Decode `text` as if it had been read from `path`.
pub fn parse_json<T: DeserializeOwned + Validate>(text: &str, path: &Path) -> Result<T, InputError> {
    let record: T = serde_json::from_str(text).map_err(|e| classify(e, path))?;
    record.validate().map_err(|message| InputError::Invalid {
        path: path.to_path_buf(),
        message,
    })?;
    Ok(record)
}

fn classify(error: serde_json::Error, path: &Path) -> InputError {
    if error.classify() == Category::Data
        && let Some(field) = missing_field(&error.to_string())
    {
        return InputError::MissingField {
            path: path.to_path_buf(),
            field,
        };
    }
    InputError::Malformed {
        path: path.to_path_buf(),
        line: error.line(),
        column: error.column(),
        message: error.to_string(),
    }
}

/// The field name of a serde "missing field `name`" message.
fn missing_field(message: &str) -> Option<String> {
    let rest = message.strip_prefix("missing field `")?;
    let end = rest.find('`')?;
    Some(rest[..end].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Order {
        number: String,
        items: Vec<u32>,
    }

    impl Validate for Order {
        fn validate(&self) -> Result<(), String> {
            if self.items.is_empty() {
                return Err("items must not be empty".to_string());
            }
            Ok(())
        }
    }

    fn write(dir: &Path, text: &str) -> PathBuf {
        let path = dir.join("order.json");
        fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn test_load_valid_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), r#"{"number": "A-1", "items": [1, 2]}"#);
        let order: Order = load_json(&path).unwrap();
        assert_eq!(order.number, "A-1");
        assert_eq!(order.items, vec![1, 2]);
    }

    #[test]
    fn test_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_json::<Order, _>(dir.path().join("nope.json"));
        assert!(matches!(result, Err(InputError::NotFound { .. })));
    }

    #[test]
    fn test_malformed_reports_position() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "{\n  \"number\": \"A-1\",\n  \"items\": [1,\n}");
        match load_json::<Order, _>(&path) {
            Err(InputError::Malformed { line, path: reported, .. }) => {
                assert_eq!(line, 4);
                assert_eq!(reported, path);
            },
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_missing_field() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), r#"{"items": [1]}"#);
        match load_json::<Order, _>(&path) {
            Err(InputError::MissingField { field, .. }) => assert_eq!(field, "number"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_validation_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), r#"{"number": "A-1", "items": []}"#);
        let err = load_json::<Order, _>(&path).unwrap_err();
        assert!(matches!(err, InputError::Invalid { .. }));
        assert!(err.to_string().contains("items must not be empty"));
    }

    #[test]
    fn test_wrong_type_is_malformed() {
        let err = parse_json::<Order>(r#"{"number": 5, "items": [1]}"#, Path::new("x.json")).unwrap_err();
        assert!(matches!(err, InputError::Malformed { .. }));
    }
}
