//! Search terms and their aggregate score expressions

use std::collections::BTreeSet;

use tracing::debug;

use crate::error::{FuzzyError, Result};
use crate::expr::Expr;
use crate::matcher::{MatcherDefinition, MatcherRegistry};

/// One fuzzy condition: a term searched in a field
///
/// # Example
///
/// ```rust
/// use quest_core::SearchTerm;
///
/// let term = SearchTerm::new("name", "ed")
///     .with_weight(30.0)
///     .unwrap()
///     .with_ordering(false)
///     .without_matcher("StudlyCaseMatcher");
/// assert_eq!(term.weight(), 30.0);
/// assert!(SearchTerm::new("name", "ed").with_weight(0.0).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SearchTerm {
    field: String,
    term: String,
    weight: f64,
    ordering: Option<bool>,
    minimum_relevance: Option<f64>,
    excluded: BTreeSet<String>,
}

impl SearchTerm {
    pub fn new(field: impl Into<String>, term: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            term: term.into(),
            weight: 1.0,
            ordering: None,
            minimum_relevance: None,
            excluded: BTreeSet::new(),
        }
    }

    /// Multiply this term's score; the weight must be finite and positive
    pub fn with_weight(mut self, weight: f64) -> Result<Self> {
        if !weight.is_finite() || weight <= 0.0 {
            return Err(FuzzyError::InvalidWeight {
                field: self.field,
                weight,
            });
        }
        self.weight = weight;
        Ok(self)
    }

    /// Override the configured default for relevance ordering
    pub fn with_ordering(mut self, enabled: bool) -> Self {
        self.ordering = Some(enabled);
        self
    }

    /// Match only rows where this term alone scores at least `floor`
    ///
    /// The floor applies to the weighted score, the value projected as the
    /// field's relevance column.
    pub fn with_minimum_relevance(mut self, floor: f64) -> Result<Self> {
        if !floor.is_finite() {
            return Err(FuzzyError::InvalidThreshold(floor));
        }
        self.minimum_relevance = Some(floor);
        Ok(self)
    }

    /// Skip a matcher for this term; unknown names are ignored
    pub fn without_matcher(mut self, name: impl Into<String>) -> Self {
        self.excluded.insert(name.into());
        self
    }

    pub fn without_matchers(mut self, names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.excluded.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Explicit ordering preference, `None` when the config default applies
    pub fn ordering(&self) -> Option<bool> {
        self.ordering
    }

    pub fn minimum_relevance(&self) -> Option<f64> {
        self.minimum_relevance
    }

    pub fn excluded_matchers(&self) -> &BTreeSet<String> {
        &self.excluded
    }

    /// NULL-safe column reference
    pub fn column(&self) -> Expr {
        Expr::column(self.field.as_str()).coalesce(Expr::text(""))
    }

    /// Score expression over the global registry minus exclusions
    pub fn score_expression(&self) -> ScoreExpression {
        let matchers = MatcherRegistry::global().resolve(&self.excluded);
        ScoreExpression::build(self, &matchers)
    }
}

/// Aggregate score of one search term and its match condition
///
/// Without a per-term floor the condition holds exactly when the score is
/// positive. A floor additionally requires `score >= floor`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreExpression {
    pub score: Expr,
    pub condition: Expr,
}

impl ScoreExpression {
    /// Never matches, scores 0
    pub fn none() -> Self {
        Self {
            score: Expr::zero(),
            condition: Expr::Bool(false),
        }
    }

    /// Sum of weighted matcher scores, OR of matcher conditions
    pub fn build(term: &SearchTerm, matchers: &[MatcherDefinition]) -> Self {
        if term.term.trim().is_empty() || matchers.is_empty() {
            debug!(field = %term.field, "fuzzy term cannot match");
            return Self::none();
        }

        let column = term.column();
        let (scores, conditions): (Vec<Expr>, Vec<Expr>) = matchers
            .iter()
            .map(|m| {
                let contribution = m.contribute(&column, &term.term);
                (contribution.score, contribution.condition)
            })
            .unzip();

        debug!(
            field = %term.field,
            matchers = matchers.len(),
            weight = term.weight,
            floor = ?term.minimum_relevance,
            "built score expression"
        );

        let score = Expr::sum(scores).scale(term.weight);
        let condition = match term.minimum_relevance {
            Some(floor) => Expr::all(vec![
                Expr::any(conditions),
                score.clone().ge(Expr::number(floor)),
            ]),
            None => Expr::any(conditions),
        };
        Self { score, condition }
    }
}
