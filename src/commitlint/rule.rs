//! Commit-lint rule tuples and their typed payloads.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexSet;
use serde::ser::SerializeSeq;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::error::{kind_of, ConfigError, Result};

/// Rule name for the header length limit.
pub const HEADER_MAX_LENGTH: &str = "header-max-length";
/// Rule name for the allowed commit types.
pub const TYPE_ENUM: &str = "type-enum";
/// Rule name for the subject case styles.
pub const SUBJECT_CASE: &str = "subject-case";

/// How a rule violation is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// The rule is not evaluated.
    Disabled,
    /// Violations are reported but do not fail the check.
    Warning,
    /// Violations fail the check.
    Error,
}

impl Severity {
    /// Returns the integer code (0, 1 or 2).
    pub const fn code(self) -> u8 {
        match self {
            Self::Disabled => 0,
            Self::Warning => 1,
            Self::Error => 2,
        }
    }

    /// Maps an integer code to a severity.
    pub const fn from_code(code: u64) -> Option<Self> {
        match code {
            0 => Some(Self::Disabled),
            1 => Some(Self::Warning),
            2 => Some(Self::Error),
            _ => None,
        }
    }

    /// Reads a severity in either its integer or symbolic encoding.
    pub fn from_value(value: &Value, field: &str) -> Result<Self> {
        let severity = match value {
            Value::Number(n) => n.as_u64().and_then(Self::from_code),
            Value::String(s) => s.parse().ok(),
            _ => None,
        };
        severity.ok_or_else(|| ConfigError::invalid_severity(field, value.to_string()))
    }
}

impl FromStr for Severity {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "disabled" | "off" => Ok(Self::Disabled),
            "warning" | "warn" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => write!(f, "disabled"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

impl Serialize for Severity {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

/// Whether the rule condition must hold or must not hold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Applicability {
    /// The condition must hold.
    #[default]
    Always,
    /// The condition must not hold.
    Never,
}

impl Applicability {
    /// Reads `"always"` or `"never"`; anything else is `None`.
    fn from_value(value: &Value) -> Option<Self> {
        match value.as_str() {
            Some("always") => Some(Self::Always),
            Some("never") => Some(Self::Never),
            _ => None,
        }
    }
}

impl fmt::Display for Applicability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Always => write!(f, "always"),
            Self::Never => write!(f, "never"),
        }
    }
}

/// Case style identifiers accepted by `subject-case`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CaseStyle {
    /// `lower case`
    LowerCase,
    /// `UPPER CASE`
    UpperCase,
    /// `camelCase`
    CamelCase,
    /// `kebab-case`
    KebabCase,
    /// `PascalCase`
    PascalCase,
    /// `Sentence case`
    SentenceCase,
    /// `snake_case`
    SnakeCase,
    /// `Start Case`
    StartCase,
}

impl CaseStyle {
    /// All case styles, in their documented order.
    pub const ALL: [Self; 8] = [
        Self::LowerCase,
        Self::UpperCase,
        Self::CamelCase,
        Self::KebabCase,
        Self::PascalCase,
        Self::SentenceCase,
        Self::SnakeCase,
        Self::StartCase,
    ];

    /// Returns the identifier as written in configuration files.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LowerCase => "lower-case",
            Self::UpperCase => "upper-case",
            Self::CamelCase => "camel-case",
            Self::KebabCase => "kebab-case",
            Self::PascalCase => "pascal-case",
            Self::SentenceCase => "sentence-case",
            Self::SnakeCase => "snake-case",
            Self::StartCase => "start-case",
        }
    }
}

impl FromStr for CaseStyle {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|style| style.as_str() == s).ok_or(())
    }
}

impl fmt::Display for CaseStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `(severity, applicability, value)` rule definition.
///
/// `value` is `None` only for disabled known rules and for unknown rules
/// written without a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleConfig<T> {
    /// How violations are reported.
    pub severity: Severity,
    /// Whether the condition must or must not hold.
    pub applicability: Applicability,
    /// Rule-specific payload.
    pub value: Option<T>,
}

impl<T> RuleConfig<T> {
    /// Creates an always-applicable rule with a payload.
    pub const fn always(severity: Severity, value: T) -> Self {
        Self {
            severity,
            applicability: Applicability::Always,
            value: Some(value),
        }
    }
}

impl<T: Serialize> Serialize for RuleConfig<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let len = if self.value.is_some() { 3 } else { 2 };
        let mut seq = serializer.serialize_seq(Some(len))?;
        seq.serialize_element(&self.severity)?;
        seq.serialize_element(&self.applicability)?;
        if let Some(value) = &self.value {
            seq.serialize_element(value)?;
        }
        seq.end()
    }
}

/// A rule definition, keyed by the rule name it was declared under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RuleEntry {
    /// `header-max-length`: maximum header length in characters.
    HeaderMaxLength(RuleConfig<u32>),
    /// `type-enum`: allowed commit types, first occurrence order.
    TypeEnum(RuleConfig<IndexSet<String>>),
    /// `subject-case`: case styles the rule applies to.
    SubjectCase(RuleConfig<IndexSet<CaseStyle>>),
    /// Any other rule; the payload is kept as written.
    Other(RuleConfig<Value>),
}

impl RuleEntry {
    /// Validates the raw tuple declared for `name`.
    pub fn parse(name: &str, raw: &Value) -> Result<Self> {
        let field = format!("rules.{name}");
        let tuple = RawTuple::split(&field, raw)?;

        let entry = match name {
            HEADER_MAX_LENGTH => Self::HeaderMaxLength(tuple.typed(&field, parse_max_length)?),
            TYPE_ENUM => Self::TypeEnum(tuple.typed(&field, parse_type_set)?),
            SUBJECT_CASE => Self::SubjectCase(tuple.typed(&field, parse_case_set)?),
            _ => Self::Other(RuleConfig {
                severity: tuple.severity,
                applicability: tuple.applicability,
                value: tuple.value.map(|(value, _)| value.clone()),
            }),
        };
        Ok(entry)
    }

    /// Returns the rule's severity.
    pub const fn severity(&self) -> Severity {
        match self {
            Self::HeaderMaxLength(rule) => rule.severity,
            Self::TypeEnum(rule) => rule.severity,
            Self::SubjectCase(rule) => rule.severity,
            Self::Other(rule) => rule.severity,
        }
    }

    /// Returns the rule's applicability.
    pub const fn applicability(&self) -> Applicability {
        match self {
            Self::HeaderMaxLength(rule) => rule.applicability,
            Self::TypeEnum(rule) => rule.applicability,
            Self::SubjectCase(rule) => rule.applicability,
            Self::Other(rule) => rule.applicability,
        }
    }

    /// Whether the rule is recognised and carries a typed payload.
    pub const fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

/// A rule tuple split into its positions, payload still raw.
struct RawTuple<'a> {
    severity: Severity,
    applicability: Applicability,
    /// Payload and its field path.
    value: Option<(&'a Value, String)>,
}

impl<'a> RawTuple<'a> {
    fn split(field: &str, raw: &'a Value) -> Result<Self> {
        let items = raw.as_array().ok_or_else(|| {
            ConfigError::parse(
                field,
                format!(
                    "expected a [severity, applicability, value] array, found {}",
                    kind_of(raw)
                ),
            )
        })?;

        let Some(first) = items.first() else {
            return Err(ConfigError::parse(field, "rule tuple is empty"));
        };
        let severity = Severity::from_value(first, &format!("{field}[0]"))?;

        let (applicability, value) = match items.as_slice() {
            [_] => (Applicability::Always, None),
            [_, second] => match Applicability::from_value(second) {
                Some(applicability) => (applicability, None),
                None => (Applicability::Always, Some((second, format!("{field}[1]")))),
            },
            [_, second, third] => {
                let applicability = Applicability::from_value(second).ok_or_else(|| {
                    ConfigError::parse(
                        format!("{field}[1]"),
                        format!("expected \"always\" or \"never\", found {second}"),
                    )
                })?;
                (applicability, Some((third, format!("{field}[2]"))))
            }
            _ => {
                return Err(ConfigError::parse(
                    field,
                    format!("expected at most 3 elements, found {}", items.len()),
                ))
            }
        };

        Ok(Self {
            severity,
            applicability,
            value,
        })
    }

    fn typed<T>(
        self,
        field: &str,
        parse: impl FnOnce(&Value, &str) -> Result<T>,
    ) -> Result<RuleConfig<T>> {
        let value = match self.value {
            Some((value, value_field)) => Some(parse(value, &value_field)?),
            None if self.severity == Severity::Disabled => None,
            None => {
                return Err(ConfigError::parse(
                    field,
                    format!("rule is {} but has no value", self.severity),
                ))
            }
        };
        Ok(RuleConfig {
            severity: self.severity,
            applicability: self.applicability,
            value,
        })
    }
}

fn parse_max_length(value: &Value, field: &str) -> Result<u32> {
    value
        .as_u64()
        .filter(|&n| n > 0)
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| {
            ConfigError::parse(
                field,
                format!("expected a positive integer, found {} {value}", kind_of(value)),
            )
        })
}

fn parse_type_set(value: &Value, field: &str) -> Result<IndexSet<String>> {
    let items = value.as_array().ok_or_else(|| {
        ConfigError::parse(
            field,
            format!("expected a list of commit types, found {}", kind_of(value)),
        )
    })?;

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            item.as_str().map(str::to_string).ok_or_else(|| {
                ConfigError::parse(
                    format!("{field}[{i}]"),
                    format!("expected a string, found {}", kind_of(item)),
                )
            })
        })
        .collect()
}

fn parse_case_set(value: &Value, field: &str) -> Result<IndexSet<CaseStyle>> {
    let parse_one = |item: &Value, item_field: String| -> Result<CaseStyle> {
        let name = item.as_str().ok_or_else(|| {
            ConfigError::parse(
                &item_field,
                format!("expected a case style, found {}", kind_of(item)),
            )
        })?;
        name.parse::<CaseStyle>().map_err(|()| {
            let known: Vec<&str> = CaseStyle::ALL.iter().map(|s| s.as_str()).collect();
            ConfigError::parse(
                &item_field,
                format!("unknown case style `{name}` (expected one of {})", known.join(", ")),
            )
        })
    };

    match value {
        Value::String(_) => Ok(IndexSet::from([parse_one(value, field.to_string())?])),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| parse_one(item, format!("{field}[{i}]")))
            .collect(),
        _ => Err(ConfigError::parse(
            field,
            format!("expected a case style or a list of them, found {}", kind_of(value)),
        )),
    }
}
