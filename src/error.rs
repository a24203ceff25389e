use serde::{Deserialize, Serialize};
use std::fmt;

/// Finding severity level. Only errors affect the package verdict.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

/// Finding taxonomy. `Content` findings are always warnings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Structural,
    CrossReference,
    Syntax,
    Content,
}

/// Which kind of document a finding points at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocKind {
    Tdf,
    Stimulus,
    Package,
}

/// Location descriptor for a finding. Always resolvable back to a concrete
/// file and path; cluster/stimulus/unit indices are 0-based positions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub kind: DocKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stimulus: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl Location {
    pub fn package() -> Self {
        Location {
            kind: DocKind::Package,
            file: None,
            cluster: None,
            stimulus: None,
            unit: None,
            field: None,
        }
    }

    /// A package-level entry that has not been classified as TDF or
    /// stimulus yet (e.g. a file that failed to parse).
    pub fn entry(file: &str) -> Self {
        Location {
            file: Some(file.to_string()),
            ..Location::package()
        }
    }

    pub fn tdf(file: &str) -> Self {
        Location {
            kind: DocKind::Tdf,
            file: Some(file.to_string()),
            ..Location::package()
        }
    }

    pub fn stim_file(file: &str) -> Self {
        Location {
            kind: DocKind::Stimulus,
            file: Some(file.to_string()),
            ..Location::package()
        }
    }

    pub fn cluster(mut self, idx: usize) -> Self {
        self.cluster = Some(idx);
        self
    }

    pub fn stimulus(mut self, idx: usize) -> Self {
        self.stimulus = Some(idx);
        self
    }

    pub fn unit(mut self, idx: usize) -> Self {
        self.unit = Some(idx);
        self
    }

    pub fn field(mut self, path: &str) -> Self {
        self.field = Some(path.to_string());
        self
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            DocKind::Package => match &self.file {
                Some(file) => write!(f, "file '{}'", file)?,
                None => write!(f, "package")?,
            },
            DocKind::Tdf => write!(f, "TDF '{}'", self.file.as_deref().unwrap_or("?"))?,
            DocKind::Stimulus => {
                write!(f, "stimulus file '{}'", self.file.as_deref().unwrap_or("?"))?
            }
        }
        if let Some(c) = self.cluster {
            write!(f, ", cluster {}", c)?;
        }
        if let Some(s) = self.stimulus {
            write!(f, ", stim {}", s)?;
        }
        if let Some(u) = self.unit {
            write!(f, ", unit {}", u)?;
        }
        if let Some(field) = &self.field {
            write!(f, ", field {}", field)?;
        }
        Ok(())
    }
}

/// One validation outcome. Findings are immutable and accumulated
/// append-only during a run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub severity: Severity,
    pub category: Category,
    pub location: Location,
    pub message: String,
}

impl Finding {
    pub fn error(category: Category, location: Location, message: impl Into<String>) -> Self {
        Finding {
            severity: Severity::Error,
            category,
            location,
            message: message.into(),
        }
    }

    pub fn warning(category: Category, location: Location, message: impl Into<String>) -> Self {
        Finding {
            severity: Severity::Warning,
            category,
            location,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            Severity::Error => "ERROR",
            Severity::Warning => "WARNING",
        };
        write!(f, "{}: {}: {}", tag, self.location, self.message)
    }
}

/// Produced by `parse` when JSON deserialization fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseError {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let (Some(line), Some(col)) = (self.line, self.column) {
            write!(f, "{}:{}: {}", line, col, self.message)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

impl std::error::Error for ParseError {}

/// One malformed token inside a range-list string.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadToken {
    /// The offending token, whitespace-trimmed.
    pub text: String,
    /// Byte offset of the token's first non-whitespace character in the
    /// original string (the separator position for empty tokens).
    pub offset: usize,
}

/// Produced by the range-list parser. Carries every malformed token, not
/// just the first, so callers can report them together.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeListError {
    /// The original input, preserved for diagnostics.
    pub input: String,
    pub bad_tokens: Vec<BadToken>,
}

impl fmt::Display for RangeListError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid range list '{}':", self.input)?;
        for (i, tok) in self.bad_tokens.iter().enumerate() {
            if i > 0 {
                write!(f, ";")?;
            }
            write!(f, " bad token '{}' at offset {}", tok.text, tok.offset)?;
        }
        Ok(())
    }
}

impl std::error::Error for RangeListError {}
