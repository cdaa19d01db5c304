//! Fuzzy matchers and their registry
//!
//! # Matchers (in registration order)
//!
//! | name                     | weight | matches when                                         |
//! |--------------------------|-------:|------------------------------------------------------|
//! | `exact`                  | 100    | column equals term                                   |
//! | `start_of_string`        | 50     | column starts with term                              |
//! | `acronym`                | 42     | term letters start successive words                  |
//! | `consecutive_characters` | 40     | term letters appear in order (graded by coverage)    |
//! | `start_of_words`         | 35     | term words prefix successive words                   |
//! | `studly_case`            | 32     | single-word column whose capitals spell the term     |
//! | `in_string`              | 30     | column contains term                                 |
//! | `times_in_string`        | 8      | per occurrence of term                               |
//!
//! # Example
//!
//! ```rust
//! use std::collections::BTreeSet;
//! use quest_core::matcher::{MatcherKind, MatcherRegistry};
//!
//! let excluded: BTreeSet<String> = ["StudlyCaseMatcher".to_string()].into();
//! let active = MatcherRegistry::global().resolve(&excluded);
//! assert_eq!(active.len(), 7);
//! assert!(active.iter().all(|m| m.kind != MatcherKind::StudlyCase));
//! ```

mod strategies;

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::expr::{Expr, LikePattern};

pub use strategies::Contribution;

/// Built-in matching strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatcherKind {
    Exact,
    StartOfString,
    Acronym,
    ConsecutiveCharacters,
    StartOfWords,
    StudlyCase,
    InString,
    TimesInString,
}

impl MatcherKind {
    pub const ALL: [MatcherKind; 8] = [
        MatcherKind::Exact,
        MatcherKind::StartOfString,
        MatcherKind::Acronym,
        MatcherKind::ConsecutiveCharacters,
        MatcherKind::StartOfWords,
        MatcherKind::StudlyCase,
        MatcherKind::InString,
        MatcherKind::TimesInString,
    ];

    pub fn name(self) -> &'static str {
        match self {
            MatcherKind::Exact => "exact",
            MatcherKind::StartOfString => "start_of_string",
            MatcherKind::Acronym => "acronym",
            MatcherKind::ConsecutiveCharacters => "consecutive_characters",
            MatcherKind::StartOfWords => "start_of_words",
            MatcherKind::StudlyCase => "studly_case",
            MatcherKind::InString => "in_string",
            MatcherKind::TimesInString => "times_in_string",
        }
    }

    pub fn default_weight(self) -> f64 {
        match self {
            MatcherKind::Exact => 100.0,
            MatcherKind::StartOfString => 50.0,
            MatcherKind::Acronym => 42.0,
            MatcherKind::ConsecutiveCharacters => 40.0,
            MatcherKind::StartOfWords => 35.0,
            MatcherKind::StudlyCase => 32.0,
            MatcherKind::InString => 30.0,
            MatcherKind::TimesInString => 8.0,
        }
    }

    /// Look up a matcher by name
    ///
    /// Case, separators and a trailing `Matcher` are ignored, so
    /// `StudlyCaseMatcher`, `studly_case` and `studly-case` are the same name.
    pub fn from_name(name: &str) -> Option<Self> {
        let wanted = normalize(name);
        Self::ALL.into_iter().find(|kind| normalize(kind.name()) == wanted)
    }

    /// LIKE pattern the matcher derives from the term, if it uses one
    pub fn pattern(self, term: &str) -> Option<LikePattern> {
        match self {
            MatcherKind::Exact | MatcherKind::TimesInString => None,
            MatcherKind::StartOfString => Some(strategies::start_of_string_pattern(term)),
            MatcherKind::Acronym => Some(strategies::acronym_pattern(term)),
            MatcherKind::ConsecutiveCharacters => {
                Some(strategies::consecutive_characters_pattern(term))
            }
            MatcherKind::StartOfWords => Some(strategies::start_of_words_pattern(term)),
            MatcherKind::StudlyCase => Some(strategies::studly_case_pattern(term)),
            MatcherKind::InString => Some(strategies::in_string_pattern(term)),
        }
    }

    /// Score and condition for `term` against `column`
    ///
    /// Blank terms never match.
    pub fn contribute(self, column: &Expr, term: &str, weight: f64) -> Contribution {
        if term.trim().is_empty() {
            return Contribution::none();
        }
        match self {
            MatcherKind::Exact => strategies::exact(column, term, weight),
            MatcherKind::StartOfString => strategies::start_of_string(column, term, weight),
            MatcherKind::Acronym => strategies::acronym(column, term, weight),
            MatcherKind::ConsecutiveCharacters => {
                strategies::consecutive_characters(column, term, weight)
            }
            MatcherKind::StartOfWords => strategies::start_of_words(column, term, weight),
            MatcherKind::StudlyCase => strategies::studly_case(column, term, weight),
            MatcherKind::InString => strategies::in_string(column, term, weight),
            MatcherKind::TimesInString => strategies::times_in_string(column, term, weight),
        }
    }
}

impl fmt::Display for MatcherKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn normalize(name: &str) -> String {
    let folded: String = name
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect();
    match folded.strip_suffix("matcher") {
        Some(stripped) if !stripped.is_empty() => stripped.to_string(),
        _ => folded,
    }
}

/// A registered matcher with its base weight
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatcherDefinition {
    pub kind: MatcherKind,
    pub base_weight: f64,
}

impl MatcherDefinition {
    pub const fn new(kind: MatcherKind, base_weight: f64) -> Self {
        Self { kind, base_weight }
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn contribute(&self, column: &Expr, term: &str) -> Contribution {
        self.kind.contribute(column, term, self.base_weight)
    }
}

static BUILTIN: [MatcherDefinition; 8] = [
    MatcherDefinition::new(MatcherKind::Exact, 100.0),
    MatcherDefinition::new(MatcherKind::StartOfString, 50.0),
    MatcherDefinition::new(MatcherKind::Acronym, 42.0),
    MatcherDefinition::new(MatcherKind::ConsecutiveCharacters, 40.0),
    MatcherDefinition::new(MatcherKind::StartOfWords, 35.0),
    MatcherDefinition::new(MatcherKind::StudlyCase, 32.0),
    MatcherDefinition::new(MatcherKind::InString, 30.0),
    MatcherDefinition::new(MatcherKind::TimesInString, 8.0),
];

static REGISTRY: MatcherRegistry = MatcherRegistry {
    definitions: &BUILTIN,
};

/// Read-only list of registered matchers
#[derive(Debug)]
pub struct MatcherRegistry {
    definitions: &'static [MatcherDefinition],
}

impl MatcherRegistry {
    /// The process-wide built-in registry
    pub fn global() -> &'static MatcherRegistry {
        &REGISTRY
    }

    /// All definitions in registration order
    pub fn definitions(&self) -> &[MatcherDefinition] {
        self.definitions
    }

    pub fn get(&self, name: &str) -> Option<&MatcherDefinition> {
        let kind = MatcherKind::from_name(name)?;
        self.definitions.iter().find(|d| d.kind == kind)
    }

    /// Registered matchers minus `excluded`, in registration order
    ///
    /// Names that match no matcher are ignored.
    pub fn resolve(&self, excluded: &BTreeSet<String>) -> Vec<MatcherDefinition> {
        let excluded: Vec<MatcherKind> = excluded
            .iter()
            .filter_map(|name| {
                let kind = MatcherKind::from_name(name);
                if kind.is_none() {
                    debug!(matcher = %name, "ignoring exclusion of unknown matcher");
                }
                kind
            })
            .collect();

        self.definitions
            .iter()
            .filter(|d| !excluded.contains(&d.kind))
            .copied()
            .collect()
    }
}
