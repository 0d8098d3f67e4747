// Reference word lists: the bias axis table and the neutral-word categories.
//
// Both files are plain comma-separated rows, one word list per row.
//
//   group_words.csv    two rows per axis, in axis ordinal order
//                      (gender, race, religion, economic)
//   neutral_words.csv  one row per category, labelled by position
//
// They are loaded once per process and shared read-only by every model and
// every axis.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Serialize;
use tracing::debug;

use crate::error::{AnalysisError, Result};

/// Labels for the rows of `neutral_words.csv`, by position.
pub const DEFAULT_CATEGORY_LABELS: [&str; 5] = [
    "Profession",
    "Physical Appearance",
    "Extremism",
    "Personality",
    "Cultivation",
];

/// The social attribute a pair of word groups measures. Ordinals match the
/// row pairs of the group words file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BiasAxisKind {
    Gender,
    Race,
    Religion,
    Economic,
}

impl BiasAxisKind {
    pub const ALL: [BiasAxisKind; 4] = [
        BiasAxisKind::Gender,
        BiasAxisKind::Race,
        BiasAxisKind::Religion,
        BiasAxisKind::Economic,
    ];

    pub fn ordinal(&self) -> usize {
        match self {
            BiasAxisKind::Gender => 0,
            BiasAxisKind::Race => 1,
            BiasAxisKind::Religion => 2,
            BiasAxisKind::Economic => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BiasAxisKind::Gender => "Gender",
            BiasAxisKind::Race => "Race",
            BiasAxisKind::Religion => "Religion",
            BiasAxisKind::Economic => "Economic",
        }
    }
}

impl TryFrom<usize> for BiasAxisKind {
    type Error = AnalysisError;

    fn try_from(ordinal: usize) -> Result<Self> {
        BiasAxisKind::ALL
            .get(ordinal)
            .copied()
            .ok_or_else(|| AnalysisError::UnknownAxis(ordinal.to_string()))
    }
}

impl FromStr for BiasAxisKind {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Ok(ordinal) = s.parse::<usize>() {
            return BiasAxisKind::try_from(ordinal);
        }
        BiasAxisKind::ALL
            .iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| AnalysisError::UnknownAxis(s.to_string()))
    }
}

impl fmt::Display for BiasAxisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One side of a bias axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordGroup {
    pub name: String,
    pub words: Vec<String>,
}

/// Two opposing word groups, e.g. male and female terms.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BiasAxis {
    pub label: String,
    pub first: WordGroup,
    pub second: WordGroup,
}

/// A named list of words whose closeness to each pole is compared.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NeutralCategory {
    pub label: String,
    pub words: Vec<String>,
}

/// The group words table: word-list rows, two per axis.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BiasAxisTable {
    rows: Vec<Vec<String>>,
}

impl BiasAxisTable {
    /// Parse the table from CSV text.
    pub fn parse(text: &str) -> Self {
        Self {
            rows: parse_rows(text),
        }
    }

    /// Read the table from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = read_list_file(path)?;
        let table = Self::parse(&text);
        debug!(path = %path.display(), rows = table.rows.len(), "Loaded group words");
        Ok(table)
    }

    /// Number of complete axes (row pairs) in the table.
    pub fn axis_count(&self) -> usize {
        self.rows.len() / 2
    }

    /// The two word groups of `kind`.
    pub fn axis(&self, kind: BiasAxisKind) -> Result<BiasAxis> {
        let i = kind.ordinal() * 2;
        match (self.rows.get(i), self.rows.get(i + 1)) {
            (Some(a), Some(b)) => Ok(BiasAxis {
                label: kind.as_str().to_string(),
                first: WordGroup {
                    name: format!("{kind} group 1"),
                    words: a.clone(),
                },
                second: WordGroup {
                    name: format!("{kind} group 2"),
                    words: b.clone(),
                },
            }),
            _ => Err(AnalysisError::word_list(format!(
                "group words table has {} rows; axis {kind} needs rows {} and {}",
                self.rows.len(),
                i + 1,
                i + 2
            ))),
        }
    }
}

/// Parse neutral-word categories from CSV text, labelling rows by position.
pub fn parse_categories(text: &str) -> Vec<NeutralCategory> {
    parse_rows(text)
        .into_iter()
        .enumerate()
        .map(|(i, words)| NeutralCategory {
            label: DEFAULT_CATEGORY_LABELS
                .get(i)
                .map(|l| l.to_string())
                .unwrap_or_else(|| format!("Category {}", i + 1)),
            words,
        })
        .collect()
}

/// Read neutral-word categories from a file.
pub fn load_categories(path: &Path) -> Result<Vec<NeutralCategory>> {
    let categories = parse_categories(&read_list_file(path)?);
    if categories.is_empty() {
        return Err(AnalysisError::word_list(format!(
            "{} contains no categories",
            path.display()
        )));
    }
    debug!(path = %path.display(), categories = categories.len(), "Loaded neutral words");
    Ok(categories)
}

fn read_list_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| AnalysisError::word_list(format!("cannot read {}: {e}", path.display())))
}

/// Split CSV text into trimmed, non-empty cells. Blank lines are skipped so
/// they do not shift the positional meaning of later rows.
fn parse_rows(text: &str) -> Vec<Vec<String>> {
    text.lines()
        .map(|line| {
            line.split(',')
                .map(|cell| cell.trim().trim_matches('"').trim())
                .filter(|cell| !cell.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .filter(|row| !row.is_empty())
        .collect()
}
