//! Dialect-independent SQL expression tree
//!
//! Matchers and the composer build [`Expr`] values; they are only turned into
//! SQL text by [`crate::render::SqlRenderer`] at the boundary, or evaluated
//! directly by [`crate::storage::MemoryStore`].

use std::fmt;

use crate::value::Value;

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    /// Text equality under a case-insensitive collation
    EqIgnoreCase,
    Gt,
    Ge,
    Lt,
    Le,
}

impl CmpOp {
    pub fn symbol(self) -> &'static str {
        match self {
            CmpOp::Eq | CmpOp::EqIgnoreCase => "=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
        }
    }
}

/// Scalar functions available in every supported dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Func {
    Round,
    CharLength,
    Replace,
    Lower,
    Upper,
    Trim,
    Coalesce,
}

/// SQL expression node
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Possibly qualified column reference (`users.name`)
    Column(String),
    /// Value sent as a bound parameter
    Bound(Value),
    /// Numeric constant written inline
    Number(f64),
    Bool(bool),
    Like {
        subject: Box<Expr>,
        pattern: LikePattern,
        case_sensitive: bool,
    },
    Compare {
        op: CmpOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    And(Vec<Expr>),
    Or(Vec<Expr>),
    If {
        cond: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
    Add(Vec<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
    Call(Func, Vec<Expr>),
}

impl Expr {
    pub fn column(name: impl Into<String>) -> Self {
        Expr::Column(name.into())
    }

    pub fn text(s: impl Into<String>) -> Self {
        Expr::Bound(Value::Text(s.into()))
    }

    pub fn number(n: f64) -> Self {
        Expr::Number(n)
    }

    pub fn zero() -> Self {
        Expr::Number(0.0)
    }

    /// Sum of terms; empty sums are 0 and single terms are returned as-is
    pub fn sum(terms: Vec<Expr>) -> Self {
        let mut flat = Vec::with_capacity(terms.len());
        for term in terms {
            match term {
                Expr::Add(inner) => flat.extend(inner),
                Expr::Number(n) if n == 0.0 => {}
                other => flat.push(other),
            }
        }
        match flat.len() {
            0 => Expr::zero(),
            1 => flat.remove(0),
            _ => Expr::Add(flat),
        }
    }

    /// Disjunction; an empty disjunction is false
    pub fn any(terms: Vec<Expr>) -> Self {
        let mut terms: Vec<Expr> = terms
            .into_iter()
            .filter(|t| !matches!(t, Expr::Bool(false)))
            .collect();
        match terms.len() {
            0 => Expr::Bool(false),
            1 => terms.remove(0),
            _ => Expr::Or(terms),
        }
    }

    /// Conjunction; an empty conjunction is true
    pub fn all(terms: Vec<Expr>) -> Self {
        let mut terms: Vec<Expr> = terms
            .into_iter()
            .filter(|t| !matches!(t, Expr::Bool(true)))
            .collect();
        match terms.len() {
            0 => Expr::Bool(true),
            1 => terms.remove(0),
            _ => Expr::And(terms),
        }
    }

    pub fn when(cond: Expr, then: Expr, otherwise: Expr) -> Self {
        Expr::If {
            cond: Box::new(cond),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        }
    }

    pub fn call(func: Func, args: Vec<Expr>) -> Self {
        Expr::Call(func, args)
    }

    pub fn coalesce(self, fallback: Expr) -> Self {
        Expr::Call(Func::Coalesce, vec![self, fallback])
    }

    pub fn char_length(self) -> Self {
        Expr::Call(Func::CharLength, vec![self])
    }

    pub fn replace(self, from: Expr, to: Expr) -> Self {
        Expr::Call(Func::Replace, vec![self, from, to])
    }

    pub fn lower(self) -> Self {
        Expr::Call(Func::Lower, vec![self])
    }

    pub fn upper(self) -> Self {
        Expr::Call(Func::Upper, vec![self])
    }

    pub fn trim(self) -> Self {
        Expr::Call(Func::Trim, vec![self])
    }

    pub fn round(self) -> Self {
        Expr::Call(Func::Round, vec![self])
    }

    /// Case-insensitive pattern match
    pub fn like(self, pattern: LikePattern) -> Self {
        Expr::Like {
            subject: Box::new(self),
            pattern,
            case_sensitive: false,
        }
    }

    /// Case-sensitive pattern match
    pub fn like_binary(self, pattern: LikePattern) -> Self {
        Expr::Like {
            subject: Box::new(self),
            pattern,
            case_sensitive: true,
        }
    }

    pub fn compare(self, op: CmpOp, other: Expr) -> Self {
        Expr::Compare {
            op,
            left: Box::new(self),
            right: Box::new(other),
        }
    }

    pub fn equals(self, other: Expr) -> Self {
        self.compare(CmpOp::Eq, other)
    }

    pub fn equals_ignore_case(self, other: Expr) -> Self {
        self.compare(CmpOp::EqIgnoreCase, other)
    }

    pub fn gt(self, other: Expr) -> Self {
        self.compare(CmpOp::Gt, other)
    }

    pub fn ge(self, other: Expr) -> Self {
        self.compare(CmpOp::Ge, other)
    }

    pub fn sub(self, other: Expr) -> Self {
        Expr::Sub(Box::new(self), Box::new(other))
    }

    pub fn mul(self, other: Expr) -> Self {
        Expr::Mul(Box::new(self), Box::new(other))
    }

    pub fn div(self, other: Expr) -> Self {
        Expr::Div(Box::new(self), Box::new(other))
    }

    /// Multiply by a constant, skipping the identity
    pub fn scale(self, factor: f64) -> Self {
        if factor == 1.0 {
            self
        } else {
            self.mul(Expr::Number(factor))
        }
    }

    /// Visit every node depth-first
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Expr)) {
        visit(self);
        match self {
            Expr::Column(_) | Expr::Bound(_) | Expr::Number(_) | Expr::Bool(_) => {}
            Expr::Like { subject, .. } => subject.walk(visit),
            Expr::Compare { left, right, .. }
            | Expr::Sub(left, right)
            | Expr::Mul(left, right)
            | Expr::Div(left, right) => {
                left.walk(visit);
                right.walk(visit);
            }
            Expr::And(items) | Expr::Or(items) | Expr::Add(items) | Expr::Call(_, items) => {
                for item in items {
                    item.walk(visit);
                }
            }
            Expr::If {
                cond,
                then,
                otherwise,
            } => {
                cond.walk(visit);
                then.walk(visit);
                otherwise.walk(visit);
            }
        }
    }
}

/// One piece of a LIKE pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LikePiece {
    Literal(String),
    /// Any run of characters (`%`)
    Any,
}

/// LIKE pattern kept structured so literal text never needs ad-hoc escaping
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LikePattern {
    pieces: Vec<LikePiece>,
}

impl LikePattern {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append literal text, merging with a preceding literal
    pub fn literal(mut self, text: impl AsRef<str>) -> Self {
        let text = text.as_ref();
        if text.is_empty() {
            return self;
        }
        match self.pieces.last_mut() {
            Some(LikePiece::Literal(prev)) => prev.push_str(text),
            _ => self.pieces.push(LikePiece::Literal(text.to_string())),
        }
        self
    }

    /// Append a wildcard, collapsing consecutive wildcards
    pub fn any(mut self) -> Self {
        if !matches!(self.pieces.last(), Some(LikePiece::Any)) {
            self.pieces.push(LikePiece::Any);
        }
        self
    }

    pub fn pieces(&self) -> &[LikePiece] {
        &self.pieces
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    /// LIKE syntax with `\` escaping `%`, `_` and `\` inside literals
    pub fn to_like(&self) -> String {
        let mut out = String::new();
        for piece in &self.pieces {
            match piece {
                LikePiece::Any => out.push('%'),
                LikePiece::Literal(text) => {
                    for c in text.chars() {
                        if matches!(c, '%' | '_' | '\\') {
                            out.push('\\');
                        }
                        out.push(c);
                    }
                }
            }
        }
        out
    }

    /// GLOB syntax (case-sensitive); glob metacharacters are bracket-quoted
    pub fn to_glob(&self) -> String {
        let mut out = String::new();
        for piece in &self.pieces {
            match piece {
                LikePiece::Any => out.push('*'),
                LikePiece::Literal(text) => {
                    for c in text.chars() {
                        match c {
                            '*' | '?' | '[' => {
                                out.push('[');
                                out.push(c);
                                out.push(']');
                            }
                            _ => out.push(c),
                        }
                    }
                }
            }
        }
        out
    }

    /// Match `text` against the pattern
    pub fn matches(&self, text: &str, case_sensitive: bool) -> bool {
        let fold = |s: &str| {
            if case_sensitive {
                s.to_string()
            } else {
                s.to_lowercase()
            }
        };
        let text = fold(text);

        let leading_any = matches!(self.pieces.first(), Some(LikePiece::Any));
        let trailing_any = matches!(self.pieces.last(), Some(LikePiece::Any));
        let segments: Vec<String> = self
            .pieces
            .iter()
            .filter_map(|p| match p {
                LikePiece::Literal(s) => Some(fold(s)),
                LikePiece::Any => None,
            })
            .collect();

        if !leading_any && !trailing_any && segments.len() <= 1 {
            return segments.first().map(String::as_str).unwrap_or("") == text;
        }

        let mut rest = text.as_str();
        let last = segments.len().saturating_sub(1);
        for (i, segment) in segments.iter().enumerate() {
            if i == 0 && !leading_any {
                match rest.strip_prefix(segment.as_str()) {
                    Some(tail) => rest = tail,
                    None => return false,
                }
            } else if i == last && !trailing_any {
                return rest.ends_with(segment.as_str());
            } else {
                match rest.find(segment.as_str()) {
                    Some(pos) => rest = &rest[pos + segment.len()..],
                    None => return false,
                }
            }
        }
        true
    }
}

impl fmt::Display for LikePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_like())
    }
}
