use include_dir::{include_dir, Dir};
use serde::Deserialize;
use serde_json::from_str;
use std::fs;
use std::path::Path;

use super::LanguageError;

static LANG_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/lang");

/// A fixed vocabulary the word source draws from
#[derive(Deserialize, Clone, Debug)]
pub struct Language {
    pub name: String,
    pub size: u32,
    pub words: Vec<String>,
}

impl Language {
    /// Load one of the vocabularies bundled into the binary
    pub fn new(file_name: &str) -> Result<Self, LanguageError> {
        read_language_from_file(&format!("{file_name}.json"))
    }

    /// The built-in common-words list
    pub fn english() -> Result<Self, LanguageError> {
        Self::new("english")
    }

    /// Load a plain word list: one word per line, blank lines and
    /// surrounding whitespace ignored.
    pub fn from_word_file<P: AsRef<Path>>(path: P) -> Result<Self, LanguageError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| LanguageError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let words: Vec<String> = contents
            .lines()
            .map(str::trim)
            .filter(|w| !w.is_empty() && !w.contains(char::is_whitespace))
            .map(String::from)
            .collect();

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "custom".to_string());

        Self::from_words(name, words)
    }

    /// Build a vocabulary from an in-memory list
    pub fn from_words(name: impl Into<String>, words: Vec<String>) -> Result<Self, LanguageError> {
        let name = name.into();
        if words.is_empty() {
            return Err(LanguageError::Empty(name));
        }
        Ok(Self {
            size: words.len() as u32,
            name,
            words,
        })
    }
}

fn read_language_from_file(file_name: &str) -> Result<Language, LanguageError> {
    let file = LANG_DIR
        .get_file(file_name)
        .ok_or_else(|| LanguageError::NotFound(file_name.to_string()))?;

    let file_as_str = file
        .contents_utf8()
        .ok_or_else(|| LanguageError::NotUtf8(file_name.to_string()))?;

    let lang: Language = from_str(file_as_str)?;
    if lang.words.is_empty() {
        return Err(LanguageError::Empty(lang.name));
    }

    Ok(lang)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io::Write;

    #[test]
    fn test_language_english() {
        let lang = Language::english().unwrap();

        assert_eq!(lang.name, "english");
        assert!(!lang.words.is_empty());
        assert_eq!(lang.size as usize, lang.words.len());
    }

    #[test]
    fn test_bundled_words_have_no_spaces() {
        let lang = Language::english().unwrap();
        assert!(lang.words.iter().all(|w| !w.contains(' ') && !w.is_empty()));
    }

    #[test]
    fn test_language_deserialization() {
        let json_data = r#"
        {
            "name": "test",
            "size": 3,
            "words": ["hello", "world", "test"]
        }
        "#;

        let lang: Language = from_str(json_data).expect("Failed to deserialize test language");

        assert_eq!(lang.name, "test");
        assert_eq!(lang.size, 3);
        assert!(lang.words.contains(&"world".to_string()));
    }

    #[test]
    fn test_read_nonexistent_language_file() {
        let result = Language::new("nonexistent");
        assert_matches!(result, Err(LanguageError::NotFound(name)) if name == "nonexistent.json");
    }

    #[test]
    fn test_from_word_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "alpha\n\n  beta  \ngamma delta\nomega").unwrap();

        let lang = Language::from_word_file(file.path()).unwrap();
        assert_eq!(lang.words, vec!["alpha", "beta", "omega"]);
        assert_eq!(lang.size, 3);
    }

    #[test]
    fn test_empty_word_file_is_rejected() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert_matches!(
            Language::from_word_file(file.path()),
            Err(LanguageError::Empty(_))
        );
    }

    #[test]
    fn test_missing_word_file() {
        assert_matches!(
            Language::from_word_file("/definitely/not/here.txt"),
            Err(LanguageError::Io { .. })
        );
    }
}
