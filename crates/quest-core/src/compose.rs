//! Boolean composition of fuzzy conditions
//!
//! A [`ConditionComposer`] collects search terms and nested groups joined by
//! AND/OR, then [`ConditionComposer::build`] turns the resulting
//! [`ConditionNode`] tree into one boolean condition and one aggregate score.
//!
//! # Example
//!
//! ```rust
//! use quest_core::compose::ConditionComposer;
//!
//! let composed = ConditionComposer::new(true)
//!     .where_fuzzy("name", "jd")
//!     .where_fuzzy_group(|group| {
//!         group
//!             .or_where_fuzzy("country", "uk")
//!             .or_where_fuzzy("nickname", "jndoe")
//!     })
//!     .build();
//!
//! assert_eq!(composed.leaves.len(), 3);
//! assert!(composed.should_order);
//! ```

use tracing::debug;

use crate::expr::Expr;
use crate::score::{ScoreExpression, SearchTerm};

/// How a condition joins the ones before it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Boolean {
    #[default]
    And,
    Or,
}

/// Boolean tree of search terms
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionNode {
    Leaf(SearchTerm),
    And(Vec<ConditionNode>),
    Or(Vec<ConditionNode>),
}

impl ConditionNode {
    /// Leaves in left-to-right order
    pub fn leaves(&self) -> Vec<&SearchTerm> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a SearchTerm>) {
        match self {
            ConditionNode::Leaf(term) => out.push(term),
            ConditionNode::And(children) | ConditionNode::Or(children) => {
                for child in children {
                    child.collect_leaves(out);
                }
            }
        }
    }

    /// Nesting depth; a single leaf has depth 1
    pub fn depth(&self) -> usize {
        match self {
            ConditionNode::Leaf(_) => 1,
            ConditionNode::And(children) | ConditionNode::Or(children) => {
                1 + children.iter().map(ConditionNode::depth).max().unwrap_or(0)
            }
        }
    }

    fn translate(&self, default_ordering: bool, leaves: &mut Vec<ComposedLeaf>) -> Expr {
        match self {
            ConditionNode::Leaf(term) => {
                let expression = term.score_expression();
                let condition = expression.condition.clone();
                leaves.push(ComposedLeaf {
                    ordering: term.ordering().unwrap_or(default_ordering),
                    term: term.clone(),
                    expression,
                });
                condition
            }
            ConditionNode::And(children) => Expr::all(
                children
                    .iter()
                    .map(|c| c.translate(default_ordering, leaves))
                    .collect(),
            ),
            ConditionNode::Or(children) => Expr::any(
                children
                    .iter()
                    .map(|c| c.translate(default_ordering, leaves))
                    .collect(),
            ),
        }
    }
}

/// Fold a left-to-right chain of AND/OR joined items with AND binding tighter
///
/// The operator attached to the first item is ignored.
pub fn fold_chain<T>(
    items: Vec<(Boolean, T)>,
    and: impl Fn(Vec<T>) -> T,
    or: impl Fn(Vec<T>) -> T,
) -> Option<T> {
    let mut disjuncts: Vec<Vec<T>> = Vec::new();
    for (boolean, item) in items {
        match disjuncts.last_mut() {
            Some(run) if boolean == Boolean::And => run.push(item),
            _ => disjuncts.push(vec![item]),
        }
    }

    let mut groups: Vec<T> = disjuncts
        .into_iter()
        .map(|mut run| if run.len() == 1 { run.remove(0) } else { and(run) })
        .collect();

    match groups.len() {
        0 => None,
        1 => Some(groups.remove(0)),
        _ => Some(or(groups)),
    }
}

/// A translated leaf with its score expression
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedLeaf {
    pub term: SearchTerm,
    pub expression: ScoreExpression,
    pub ordering: bool,
}

/// Result of composing a tree of fuzzy conditions
#[derive(Debug, Clone, PartialEq)]
pub struct Composed {
    pub tree: Option<ConditionNode>,
    pub condition: Expr,
    /// Sum of every leaf score regardless of AND/OR structure
    pub score: Expr,
    /// Some leaf asked for relevance ordering
    pub should_order: bool,
    pub leaves: Vec<ComposedLeaf>,
}

impl Composed {
    pub fn is_empty(&self) -> bool {
        self.tree.is_none()
    }
}

/// Builds a [`ConditionNode`] tree from AND/OR joined terms and groups
#[derive(Debug, Clone, Default)]
pub struct ConditionComposer {
    default_ordering: bool,
    children: Vec<(Boolean, ConditionNode)>,
}

impl ConditionComposer {
    /// `default_ordering` applies to terms that do not set their own
    pub fn new(default_ordering: bool) -> Self {
        Self {
            default_ordering,
            children: Vec::new(),
        }
    }

    pub fn add_term(mut self, boolean: Boolean, term: SearchTerm) -> Self {
        self.children.push((boolean, ConditionNode::Leaf(term)));
        self
    }

    /// Attach the terms added by `build` as one nested child
    ///
    /// Empty groups are dropped.
    pub fn group(
        mut self,
        boolean: Boolean,
        build: impl FnOnce(ConditionComposer) -> ConditionComposer,
    ) -> Self {
        let sub = build(ConditionComposer::new(self.default_ordering));
        if let Some(node) = sub.into_node() {
            self.children.push((boolean, node));
        }
        self
    }

    pub fn where_fuzzy(self, field: impl Into<String>, term: impl Into<String>) -> Self {
        self.add_term(Boolean::And, SearchTerm::new(field, term))
    }

    pub fn or_where_fuzzy(self, field: impl Into<String>, term: impl Into<String>) -> Self {
        self.add_term(Boolean::Or, SearchTerm::new(field, term))
    }

    pub fn where_fuzzy_term(self, term: SearchTerm) -> Self {
        self.add_term(Boolean::And, term)
    }

    pub fn or_where_fuzzy_term(self, term: SearchTerm) -> Self {
        self.add_term(Boolean::Or, term)
    }

    pub fn where_fuzzy_group(
        self,
        build: impl FnOnce(ConditionComposer) -> ConditionComposer,
    ) -> Self {
        self.group(Boolean::And, build)
    }

    pub fn or_where_fuzzy_group(
        self,
        build: impl FnOnce(ConditionComposer) -> ConditionComposer,
    ) -> Self {
        self.group(Boolean::Or, build)
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Fold the collected children into a tree
    pub fn into_node(self) -> Option<ConditionNode> {
        fold_chain(self.children, ConditionNode::And, ConditionNode::Or)
    }

    /// Translate the tree into a condition, an aggregate score and the ordering flag
    pub fn build(self) -> Composed {
        let default_ordering = self.default_ordering;
        let tree = self.into_node();

        let mut leaves = Vec::new();
        let condition = match &tree {
            Some(node) => node.translate(default_ordering, &mut leaves),
            None => Expr::Bool(true),
        };
        let score = Expr::sum(leaves.iter().map(|l| l.expression.score.clone()).collect());
        let should_order = leaves.iter().any(|l| l.ordering);

        debug!(
            leaves = leaves.len(),
            depth = tree.as_ref().map(ConditionNode::depth).unwrap_or(0),
            should_order,
            "composed fuzzy conditions"
        );

        Composed {
            tree,
            condition,
            score,
            should_order,
            leaves,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn leaf(field: &str) -> ConditionNode {
        ConditionNode::Leaf(SearchTerm::new(field, "x"))
    }

    #[test]
    fn test_fold_and_binds_tighter_than_or() {
        let folded = fold_chain(
            vec![
                (Boolean::And, leaf("a")),
                (Boolean::And, leaf("b")),
                (Boolean::Or, leaf("c")),
            ],
            ConditionNode::And,
            ConditionNode::Or,
        );
        assert_eq!(
            folded,
            Some(ConditionNode::Or(vec![
                ConditionNode::And(vec![leaf("a"), leaf("b")]),
                leaf("c"),
            ]))
        );
    }

    #[test]
    fn test_fold_ignores_first_operator() {
        let folded = fold_chain(
            vec![(Boolean::Or, leaf("a")), (Boolean::Or, leaf("b"))],
            ConditionNode::And,
            ConditionNode::Or,
        );
        assert_eq!(folded, Some(ConditionNode::Or(vec![leaf("a"), leaf("b")])));
    }

    #[test]
    fn test_fold_empty() {
        let folded: Option<ConditionNode> =
            fold_chain(vec![], ConditionNode::And, ConditionNode::Or);
        assert_eq!(folded, None);
    }

    #[test]
    fn test_groups_nest() {
        let node = ConditionComposer::new(true)
            .where_fuzzy("a", "x")
            .where_fuzzy_group(|g| {
                g.or_where_fuzzy("b", "x")
                    .or_where_fuzzy_group(|g| g.where_fuzzy("c", "x").where_fuzzy("d", "x"))
            })
            .into_node()
            .unwrap();

        assert_eq!(node.depth(), 4);
        let fields: Vec<&str> = node.leaves().iter().map(|t| t.field()).collect();
        assert_eq!(fields, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_empty_group_is_dropped() {
        let composer = ConditionComposer::new(true)
            .where_fuzzy("a", "x")
            .where_fuzzy_group(|g| g);
        assert_eq!(composer.into_node(), Some(leaf("a")));
    }

    #[test]
    fn test_empty_composer_builds_nothing() {
        let composed = ConditionComposer::new(true).build();
        assert!(composed.is_empty());
        assert_eq!(composed.condition, Expr::Bool(true));
        assert_eq!(composed.score, Expr::zero());
        assert!(!composed.should_order);
    }

    #[test]
    fn test_score_sums_every_leaf() {
        let composed = ConditionComposer::new(true)
            .where_fuzzy("name", "jd")
            .or_where_fuzzy("country", "uk")
            .build();
        let expected = Expr::sum(vec![
            SearchTerm::new("name", "jd").score_expression().score,
            SearchTerm::new("country", "uk").score_expression().score,
        ]);
        assert_eq!(composed.score, expected);
    }

    #[test]
    fn test_condition_mirrors_tree() {
        let composed = ConditionComposer::new(true)
            .where_fuzzy("name", "jd")
            .or_where_fuzzy("country", "uk")
            .build();
        assert_eq!(
            composed.condition,
            Expr::any(vec![
                SearchTerm::new("name", "jd").score_expression().condition,
                SearchTerm::new("country", "uk").score_expression().condition,
            ])
        );
    }

    #[test]
    fn test_ordering_flag() {
        let off = ConditionComposer::new(true)
            .where_fuzzy_term(SearchTerm::new("name", "jad").with_ordering(false))
            .where_fuzzy_term(SearchTerm::new("name", "wp").with_ordering(false))
            .build();
        assert!(!off.should_order);

        let one_on = ConditionComposer::new(false)
            .where_fuzzy("name", "jad")
            .where_fuzzy_term(SearchTerm::new("name", "wp").with_ordering(true))
            .build();
        assert!(one_on.should_order);

        let default_on = ConditionComposer::new(true).where_fuzzy("name", "jad").build();
        assert!(default_on.should_order);
    }
}
