//! Options for building the dual table.
//!
//! Options deserialize from JSON with serde (missing fields take their
//! defaults) and can be overridden from the environment:
//!
//! - `DATADRIFT_DIFF_DELIMITER` - `auto`, `comma` or `tab`

use crate::error::DiffError;
use crate::table::Delimiter;
use serde::Deserialize;
use std::str::FromStr;

/// Environment variable overriding [`DiffOptions::delimiter`].
pub const DELIMITER_ENV: &str = "DATADRIFT_DIFF_DELIMITER";

/// How the field delimiter is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DelimiterChoice {
    /// Detect from the patch content (see [`Delimiter::detect`]).
    #[default]
    Auto,
    Comma,
    Tab,
}

impl DelimiterChoice {
    /// Settles on a concrete delimiter for a table `width` columns wide.
    pub fn resolve<'a>(self, width: usize, sample: impl IntoIterator<Item = &'a str>) -> Delimiter {
        match self {
            Self::Auto => Delimiter::detect(width, sample),
            Self::Comma => Delimiter::Comma,
            Self::Tab => Delimiter::Tab,
        }
    }
}

impl From<Delimiter> for DelimiterChoice {
    fn from(delimiter: Delimiter) -> Self {
        match delimiter {
            Delimiter::Comma => Self::Comma,
            Delimiter::Tab => Self::Tab,
        }
    }
}

impl FromStr for DelimiterChoice {
    type Err = DiffError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "auto" => Ok(Self::Auto),
            "comma" | "csv" | "," => Ok(Self::Comma),
            "tab" | "tsv" | "\\t" => Ok(Self::Tab),
            _ => Err(DiffError::UnknownDelimiter(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DiffOptions {
    pub delimiter: DelimiterChoice,
}

impl DiffOptions {
    /// Default options with environment overrides applied.
    pub fn from_env() -> Result<Self, DiffError> {
        Self::default().with_overrides(std::env::var(DELIMITER_ENV).ok().as_deref())
    }

    /// Parses options from a JSON object such as `{"delimiter": "tab"}`.
    pub fn from_json(json: &str) -> Result<Self, DiffError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Applies a delimiter override, if one is set.
    pub fn with_overrides(mut self, delimiter: Option<&str>) -> Result<Self, DiffError> {
        if let Some(value) = delimiter {
            self.delimiter = value.parse()?;
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_auto() {
        assert_eq!(DiffOptions::default().delimiter, DelimiterChoice::Auto);
    }

    #[test]
    fn parse_delimiter_names() {
        assert_eq!("comma".parse::<DelimiterChoice>().unwrap(), DelimiterChoice::Comma);
        assert_eq!(" TAB ".parse::<DelimiterChoice>().unwrap(), DelimiterChoice::Tab);
        assert_eq!("tsv".parse::<DelimiterChoice>().unwrap(), DelimiterChoice::Tab);
        assert_eq!("".parse::<DelimiterChoice>().unwrap(), DelimiterChoice::Auto);
    }

    #[test]
    fn parse_unknown_delimiter_fails() {
        let err = "semicolon".parse::<DelimiterChoice>().unwrap_err();
        assert!(matches!(err, DiffError::UnknownDelimiter(ref name) if name == "semicolon"));
        assert!(err.to_string().contains("semicolon"));
    }

    #[test]
    fn overrides_replace_delimiter() {
        let options = DiffOptions::default().with_overrides(Some("tab")).unwrap();
        assert_eq!(options.delimiter, DelimiterChoice::Tab);

        let options = DiffOptions::default().with_overrides(None).unwrap();
        assert_eq!(options.delimiter, DelimiterChoice::Auto);
    }

    #[test]
    fn options_from_json() {
        let options = DiffOptions::from_json(r#"{"delimiter": "tab"}"#).unwrap();
        assert_eq!(options.delimiter, DelimiterChoice::Tab);

        let options = DiffOptions::from_json("{}").unwrap();
        assert_eq!(options, DiffOptions::default());
    }

    #[test]
    fn options_from_json_rejects_unknown_delimiter() {
        assert!(matches!(
            DiffOptions::from_json(r#"{"delimiter": "pipe"}"#),
            Err(DiffError::Json(_))
        ));
    }

    #[test]
    fn resolve_explicit_ignores_sample() {
        let sample = ["a\tb\tc"];
        assert_eq!(DelimiterChoice::Comma.resolve(3, sample), Delimiter::Comma);
        assert_eq!(DelimiterChoice::Auto.resolve(3, sample), Delimiter::Tab);
    }

    #[test]
    fn choice_from_delimiter() {
        assert_eq!(DelimiterChoice::from(Delimiter::Tab), DelimiterChoice::Tab);
    }
}
