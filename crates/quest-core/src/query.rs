//! Host query model and the fuzzy query facade
//!
//! [`SelectQuery`] is a plain single-table `SELECT` holding WHERE clauses,
//! projections, ordering and paging. It accepts clauses through the
//! [`ClauseSink`] seam, which is all the fuzzy layer needs from a host query.
//!
//! [`FuzzyQuery`] is the entry point: it composes fuzzy conditions, tracks the
//! aggregate relevance score and emits the clauses onto a [`SelectQuery`].
//!
//! # Example
//!
//! ```rust
//! use quest_core::{Dialect, FuzzyQuery, SearchTerm};
//!
//! let query = FuzzyQuery::table("users")
//!     .where_fuzzy("name", "jd")
//!     .or_where_fuzzy_term(SearchTerm::new("country", "uk").with_ordering(false))
//!     .with_minimum_relevance(40.0)
//!     .unwrap();
//!
//! let sql = query.to_sql(Dialect::Sqlite);
//! assert!(sql.sql.starts_with("SELECT \"users\".*"));
//! assert!(sql.sql.contains(" ORDER BY "));
//! ```

use std::collections::HashMap;

use tracing::debug;

use crate::compose::{fold_chain, Boolean, ComposedLeaf, ConditionComposer};
use crate::config::FuzzyConfig;
use crate::error::{FuzzyError, Result};
use crate::expr::Expr;
use crate::render::{Dialect, SqlQuery, SqlRenderer};
use crate::score::SearchTerm;
use crate::storage::{Row, RowStore};
use crate::value::Value;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    Asc,
    #[default]
    Desc,
}

impl Direction {
    pub fn as_sql(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// Clause-level interface of a host query
pub trait ClauseSink {
    /// Add a WHERE condition joined to the previous ones by `boolean`
    fn push_where(&mut self, boolean: Boolean, condition: Expr);

    /// Add a predicate ANDed with the whole WHERE chain
    fn push_filter(&mut self, predicate: Expr);

    fn push_order(&mut self, expr: Expr, direction: Direction);

    /// Add a computed column to the select list
    fn push_projection(&mut self, expr: Expr, alias: String);
}

/// Single-table `SELECT` built from expression trees
#[derive(Debug, Clone, PartialEq)]
pub struct SelectQuery {
    table: String,
    projections: Vec<(Expr, String)>,
    wheres: Vec<(Boolean, Expr)>,
    filters: Vec<Expr>,
    orders: Vec<(Expr, Direction)>,
    limit: Option<usize>,
    offset: Option<usize>,
}

impl SelectQuery {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            projections: Vec::new(),
            wheres: Vec::new(),
            filters: Vec::new(),
            orders: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Computed columns as `(expression, alias)`
    pub fn projections(&self) -> impl Iterator<Item = (&Expr, &String)> {
        self.projections.iter().map(|(expr, alias)| (expr, alias))
    }

    pub fn orders(&self) -> &[(Expr, Direction)] {
        &self.orders
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn offset(&self) -> Option<usize> {
        self.offset
    }

    pub fn set_limit(&mut self, limit: Option<usize>) {
        self.limit = limit;
    }

    pub fn set_offset(&mut self, offset: Option<usize>) {
        self.offset = offset;
    }

    /// Complete row predicate: the folded WHERE chain ANDed with every filter
    ///
    /// `TRUE` when the query has no conditions.
    pub fn condition(&self) -> Expr {
        let chain = fold_chain(self.wheres.clone(), Expr::all, Expr::any);
        Expr::all(chain.into_iter().chain(self.filters.iter().cloned()).collect())
    }

    /// Render with bound parameters
    pub fn to_sql(&self, dialect: Dialect) -> SqlQuery {
        SqlRenderer::new(dialect).render_select(self)
    }

    /// Render with literals inlined
    pub fn to_sql_inline(&self, dialect: Dialect) -> String {
        SqlRenderer::inline(dialect).render_select(self).sql
    }
}

impl ClauseSink for SelectQuery {
    fn push_where(&mut self, boolean: Boolean, condition: Expr) {
        self.wheres.push((boolean, condition));
    }

    fn push_filter(&mut self, predicate: Expr) {
        self.filters.push(predicate);
    }

    fn push_order(&mut self, expr: Expr, direction: Direction) {
        self.orders.push((expr, direction));
    }

    fn push_projection(&mut self, expr: Expr, alias: String) {
        self.projections.push((expr, alias));
    }
}

/// Field names accepted by [`FuzzyQuery::order_by_fuzzy`]
pub trait FuzzyFields {
    fn into_fields(self) -> Vec<String>;
}

impl FuzzyFields for &str {
    fn into_fields(self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl FuzzyFields for String {
    fn into_fields(self) -> Vec<String> {
        vec![self]
    }
}

impl<S: AsRef<str>> FuzzyFields for Vec<S> {
    fn into_fields(self) -> Vec<String> {
        self.iter().map(|s| s.as_ref().to_string()).collect()
    }
}

impl<S: AsRef<str>> FuzzyFields for &[S] {
    fn into_fields(self) -> Vec<String> {
        self.iter().map(|s| s.as_ref().to_string()).collect()
    }
}

impl<S: AsRef<str>, const N: usize> FuzzyFields for [S; N] {
    fn into_fields(self) -> Vec<String> {
        self.iter().map(|s| s.as_ref().to_string()).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
enum PendingOrder {
    /// Descending aggregate relevance
    Relevance,
    /// Descending relevance of one field's most recent term
    Field(String),
    Plain(Expr, Direction),
}

/// Fuzzy search over one table
///
/// Every `where_fuzzy*` call attaches one condition to the WHERE chain and
/// adds its score to the aggregate relevance. Scores are summed across all
/// calls regardless of how they are joined.
#[derive(Debug, Clone)]
pub struct FuzzyQuery {
    config: FuzzyConfig,
    select: SelectQuery,
    scores: Vec<Expr>,
    leaves: Vec<ComposedLeaf>,
    orders: Vec<PendingOrder>,
    minimum_relevance: Option<f64>,
}

impl FuzzyQuery {
    /// Query over `table` with the default configuration
    pub fn table(table: impl Into<String>) -> Self {
        Self::with_config(table, FuzzyConfig::default())
    }

    pub fn with_config(table: impl Into<String>, config: FuzzyConfig) -> Self {
        Self {
            config,
            select: SelectQuery::new(table),
            scores: Vec::new(),
            leaves: Vec::new(),
            orders: Vec::new(),
            minimum_relevance: None,
        }
    }

    pub fn config(&self) -> &FuzzyConfig {
        &self.config
    }

    pub fn where_fuzzy(self, field: impl Into<String>, term: impl Into<String>) -> Self {
        self.where_fuzzy_term(SearchTerm::new(field, term))
    }

    pub fn or_where_fuzzy(self, field: impl Into<String>, term: impl Into<String>) -> Self {
        self.or_where_fuzzy_term(SearchTerm::new(field, term))
    }

    pub fn where_fuzzy_term(self, term: SearchTerm) -> Self {
        self.attach(Boolean::And, |c| c.where_fuzzy_term(term))
    }

    pub fn or_where_fuzzy_term(self, term: SearchTerm) -> Self {
        self.attach(Boolean::Or, |c| c.where_fuzzy_term(term))
    }

    /// AND a nested group of fuzzy conditions
    pub fn where_fuzzy_group(
        self,
        build: impl FnOnce(ConditionComposer) -> ConditionComposer,
    ) -> Self {
        self.attach(Boolean::And, build)
    }

    /// OR a nested group of fuzzy conditions
    pub fn or_where_fuzzy_group(
        self,
        build: impl FnOnce(ConditionComposer) -> ConditionComposer,
    ) -> Self {
        self.attach(Boolean::Or, build)
    }

    fn attach(
        mut self,
        boolean: Boolean,
        build: impl FnOnce(ConditionComposer) -> ConditionComposer,
    ) -> Self {
        let composed = build(ConditionComposer::new(self.config.default_ordering)).build();
        if composed.is_empty() {
            return self;
        }

        self.select.push_where(boolean, composed.condition);
        self.scores.push(composed.score);
        if composed.should_order && !self.orders.contains(&PendingOrder::Relevance) {
            self.orders.push(PendingOrder::Relevance);
        }
        self.leaves.extend(composed.leaves);
        self
    }

    /// AND a plain `column = value` condition
    pub fn where_eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.select.push_where(
            Boolean::And,
            Expr::column(column).equals(Expr::Bound(value.into())),
        );
        self
    }

    /// Order by a plain column, after any ordering already requested
    pub fn order_by(mut self, column: impl Into<String>, direction: Direction) -> Self {
        self.orders
            .push(PendingOrder::Plain(Expr::column(column), direction));
        self
    }

    /// Order by the relevance of individual fields, in the order given
    ///
    /// Each field uses the most recent term searched on it. Fields that were
    /// never searched add no ordering.
    pub fn order_by_fuzzy(mut self, fields: impl FuzzyFields) -> Self {
        self.orders
            .extend(fields.into_fields().into_iter().map(PendingOrder::Field));
        self
    }

    /// Keep only rows whose aggregate relevance is at least `threshold`
    pub fn with_minimum_relevance(mut self, threshold: f64) -> Result<Self> {
        if !threshold.is_finite() {
            return Err(FuzzyError::InvalidThreshold(threshold));
        }
        self.minimum_relevance = Some(threshold);
        Ok(self)
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.select.set_limit(Some(limit));
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.select.set_offset(Some(offset));
        self
    }

    /// Limit and offset for 1-based `page` of `per_page` rows
    pub fn paginate(self, per_page: usize, page: usize) -> Result<Self> {
        if per_page == 0 || page == 0 {
            return Err(FuzzyError::InvalidPagination { page, per_page });
        }
        let offset = (page - 1)
            .checked_mul(per_page)
            .ok_or(FuzzyError::InvalidPagination { page, per_page })?;
        Ok(self.limit(per_page).offset(offset))
    }

    /// Sum of every fuzzy condition's score; 0 when nothing was searched
    pub fn aggregate_score(&self) -> Expr {
        Expr::sum(self.scores.clone())
    }

    /// Score of the most recent term searched on `field`
    pub fn field_score(&self, field: &str) -> Option<Expr> {
        self.leaves
            .iter()
            .rev()
            .find(|leaf| leaf.term.field() == field)
            .map(|leaf| leaf.term.score_expression().score)
    }

    /// Terms searched so far, in call order
    pub fn terms(&self) -> impl Iterator<Item = &SearchTerm> {
        self.leaves.iter().map(|leaf| &leaf.term)
    }

    /// Emit every clause onto a host query
    pub fn apply(&self, sink: &mut impl ClauseSink) {
        let aggregate = self.aggregate_score();

        if self.config.project_relevance && !self.leaves.is_empty() {
            let mut seen: HashMap<String, usize> = HashMap::new();
            for leaf in &self.leaves {
                let base = self.config.field_alias(leaf.term.field());
                let count = seen.entry(base.clone()).or_insert(0);
                *count += 1;
                let alias = if *count == 1 {
                    base
                } else {
                    format!("{}_{}", base, count)
                };
                sink.push_projection(leaf.expression.score.clone(), alias);
            }
            sink.push_projection(aggregate.clone(), self.config.relevance_alias.clone());
        }

        if let Some(threshold) = self.minimum_relevance {
            sink.push_filter(aggregate.clone().ge(Expr::number(threshold)));
        }

        for order in &self.orders {
            match order {
                PendingOrder::Relevance => sink.push_order(aggregate.clone(), Direction::Desc),
                PendingOrder::Field(field) => match self.field_score(field) {
                    Some(score) => sink.push_order(score, Direction::Desc),
                    None => debug!(field = %field, "no fuzzy term to order by"),
                },
                PendingOrder::Plain(expr, direction) => sink.push_order(expr.clone(), *direction),
            }
        }
    }

    /// The complete host query
    pub fn to_select(&self) -> SelectQuery {
        let mut select = self.select.clone();
        self.apply(&mut select);
        select
    }

    pub fn to_sql(&self, dialect: Dialect) -> SqlQuery {
        self.to_select().to_sql(dialect)
    }

    /// SQL with literals inlined, for logs and assertions
    pub fn to_sql_inline(&self, dialect: Dialect) -> String {
        self.to_select().to_sql_inline(dialect)
    }

    /// Run against a store
    pub fn get(&self, store: &impl RowStore) -> Result<Vec<Row>> {
        let select = self.to_select();
        let rows = store.fetch(&select)?;
        debug!(table = %select.table(), rows = rows.len(), "fuzzy query executed");
        Ok(rows)
    }

    /// First row of the result, if any
    pub fn first(&self, store: &impl RowStore) -> Result<Option<Row>> {
        Ok(self.clone().limit(1).get(store)?.into_iter().next())
    }
}
