//! Matching strategies
//!
//! Each strategy turns `(column, term, weight)` into a score expression and
//! the condition under which that score is positive. The column is expected to
//! be NULL-safe already (`COALESCE(column, '')`).

use crate::expr::{Expr, LikePattern};

/// Score and match condition produced by one strategy
#[derive(Debug, Clone, PartialEq)]
pub struct Contribution {
    pub score: Expr,
    pub condition: Expr,
}

impl Contribution {
    /// Never matches, scores nothing
    pub fn none() -> Self {
        Self {
            score: Expr::zero(),
            condition: Expr::Bool(false),
        }
    }

    /// `weight` when `condition` holds, otherwise 0
    fn flat(condition: Expr, weight: f64) -> Self {
        Self {
            score: Expr::when(condition.clone(), Expr::number(weight), Expr::zero()),
            condition,
        }
    }

    /// Graded score; the condition is derived from it
    fn graded(score: Expr) -> Self {
        Self {
            condition: score.clone().gt(Expr::zero()),
            score,
        }
    }
}

/// Column equals the term (case-insensitive)
pub fn exact(column: &Expr, term: &str, weight: f64) -> Contribution {
    Contribution::flat(column.clone().equals_ignore_case(Expr::text(term)), weight)
}

/// `term%`
pub fn start_of_string_pattern(term: &str) -> LikePattern {
    LikePattern::new().literal(term).any()
}

/// Column starts with the term
pub fn start_of_string(column: &Expr, term: &str, weight: f64) -> Contribution {
    Contribution::flat(column.clone().like(start_of_string_pattern(term)), weight)
}

/// `jd` -> `J% D%`
pub fn acronym_pattern(term: &str) -> LikePattern {
    term.to_uppercase()
        .chars()
        .enumerate()
        .fold(LikePattern::new(), |pattern, (i, c)| {
            let pattern = if i > 0 { pattern.literal(" ") } else { pattern };
            pattern.literal(c.to_string()).any()
        })
}

/// Each term character starts a successive word of the column
pub fn acronym(column: &Expr, term: &str, weight: f64) -> Contribution {
    Contribution::flat(column.clone().like(acronym_pattern(term)), weight)
}

/// `jd` -> `%j%d%`
pub fn consecutive_characters_pattern(term: &str) -> LikePattern {
    term.chars()
        .fold(LikePattern::new().any(), |pattern, c| {
            pattern.literal(c.to_string()).any()
        })
}

/// Term characters appear in order (dots ignored); scored by how much of the
/// column (spaces ignored) the term covers
pub fn consecutive_characters(column: &Expr, term: &str, weight: f64) -> Contribution {
    let matched = column
        .clone()
        .replace(Expr::text("."), Expr::text(""))
        .like(consecutive_characters_pattern(term));
    let coverage = Expr::number(term.chars().count() as f64).div(
        column
            .clone()
            .replace(Expr::text(" "), Expr::text(""))
            .char_length(),
    );
    let score = Expr::when(
        matched,
        Expr::number(weight).mul(coverage).round(),
        Expr::zero(),
    );
    Contribution::graded(score)
}

/// `joh Do` -> `joh% Do%`
pub fn start_of_words_pattern(term: &str) -> LikePattern {
    term.split(' ')
        .enumerate()
        .fold(LikePattern::new(), |pattern, (i, word)| {
            let pattern = if i > 0 {
                pattern.any().literal(" ")
            } else {
                pattern
            };
            pattern.literal(word)
        })
        .any()
}

/// Each term word prefixes a successive word of the column
pub fn start_of_words(column: &Expr, term: &str, weight: f64) -> Contribution {
    Contribution::flat(column.clone().like(start_of_words_pattern(term)), weight)
}

/// `jad` -> `J%A%D%`
pub fn studly_case_pattern(term: &str) -> LikePattern {
    term.to_uppercase()
        .chars()
        .enumerate()
        .fold(LikePattern::new(), |pattern, (i, c)| {
            let pattern = if i > 0 { pattern.any() } else { pattern };
            pattern.literal(c.to_string())
        })
        .any()
}

/// Single-word column whose capitals spell out the term (`JaneDoe` for `jd`)
pub fn studly_case(column: &Expr, term: &str, weight: f64) -> Contribution {
    let trimmed = column.clone().trim();
    let single_word = trimmed.clone().char_length().equals(
        trimmed
            .replace(Expr::text(" "), Expr::text(""))
            .char_length(),
    );
    let condition = Expr::all(vec![
        single_word,
        column.clone().like_binary(studly_case_pattern(term)),
    ]);
    Contribution::flat(condition, weight)
}

/// `%term%`
pub fn in_string_pattern(term: &str) -> LikePattern {
    LikePattern::new().any().literal(term).any()
}

/// Column contains the term
pub fn in_string(column: &Expr, term: &str, weight: f64) -> Contribution {
    Contribution::flat(column.clone().like(in_string_pattern(term)), weight)
}

/// `weight` per case-insensitive occurrence of the term
pub fn times_in_string(column: &Expr, term: &str, weight: f64) -> Contribution {
    let lowered = column.clone().lower();
    let removed = lowered
        .clone()
        .replace(Expr::text(term).lower(), Expr::text(""));
    let occurrences = lowered
        .char_length()
        .sub(removed.char_length())
        .div(Expr::number(term.chars().count() as f64))
        .round();
    Contribution::graded(Expr::number(weight).mul(occurrences))
}
