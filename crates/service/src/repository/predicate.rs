//! Typed, immutable predicate combinator over sea-orm conditions.
//!
//! A `Predicate<E>` is a value: `and`/`or` consume their operands and return a
//! new predicate, so building the same filter twice always yields the same
//! condition tree. The neutral element is [`Predicate::all`].

use std::fmt;
use std::marker::PhantomData;

use sea_orm::sea_query::{Expr, IntoCondition};
use sea_orm::{Condition, DbBackend, EntityTrait, QueryFilter, QueryTrait};

#[derive(Clone)]
enum Node {
    /// Matches every row.
    All,
    /// Matches no row.
    Never,
    Cond(Condition),
}

pub struct Predicate<E> {
    node: Node,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for Predicate<E> {
    fn clone(&self) -> Self {
        Self::wrap(self.node.clone())
    }
}

impl<E> fmt::Debug for Predicate<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.node {
            Node::All => f.write_str("Predicate(all)"),
            Node::Never => f.write_str("Predicate(never)"),
            Node::Cond(c) => f.debug_tuple("Predicate").field(c).finish(),
        }
    }
}

impl<E> Default for Predicate<E> {
    fn default() -> Self {
        Self::all()
    }
}

impl<E> Predicate<E> {
    fn wrap(node: Node) -> Self {
        Self { node, _entity: PhantomData }
    }

    pub fn all() -> Self {
        Self::wrap(Node::All)
    }

    pub fn never() -> Self {
        Self::wrap(Node::Never)
    }

    /// Predicate from any sea-query expression or condition,
    /// e.g. `Predicate::when(project::Column::Status.eq("active"))`.
    pub fn when<C: IntoCondition>(cond: C) -> Self {
        Self::wrap(Node::Cond(cond.into_condition()))
    }

    pub fn is_match_all(&self) -> bool {
        matches!(self.node, Node::All)
    }

    pub fn and(self, other: Predicate<E>) -> Self {
        match (self.node, other.node) {
            (Node::Never, _) | (_, Node::Never) => Self::never(),
            (Node::All, n) | (n, Node::All) => Self::wrap(n),
            (Node::Cond(a), Node::Cond(b)) => Self::wrap(Node::Cond(Condition::all().add(a).add(b))),
        }
    }

    pub fn or(self, other: Predicate<E>) -> Self {
        match (self.node, other.node) {
            (Node::All, _) | (_, Node::All) => Self::all(),
            (Node::Never, n) | (n, Node::Never) => Self::wrap(n),
            (Node::Cond(a), Node::Cond(b)) => Self::wrap(Node::Cond(Condition::any().add(a).add(b))),
        }
    }

    /// AND with `cond` when present; unset optional filters are skipped.
    pub fn and_if<C: IntoCondition>(self, cond: Option<C>) -> Self {
        match cond {
            Some(c) => self.and(Self::when(c)),
            None => self,
        }
    }

    /// Fold with AND starting from the match-all element.
    pub fn all_of<I>(preds: I) -> Self
    where
        I: IntoIterator<Item = Predicate<E>>,
    {
        preds.into_iter().fold(Self::all(), Self::and)
    }

    /// Fold with OR starting from the match-nothing element.
    pub fn any_of<I>(preds: I) -> Self
    where
        I: IntoIterator<Item = Predicate<E>>,
    {
        preds.into_iter().fold(Self::never(), Self::or)
    }

    pub fn into_condition(self) -> Condition {
        match self.node {
            Node::All => Condition::all(),
            Node::Never => Condition::all().add(Expr::val(1).eq(0)),
            Node::Cond(c) => c,
        }
    }
}

impl<E: EntityTrait> Predicate<E> {
    /// Stable fingerprint of the predicate: a blake3 hash of the SELECT it
    /// renders to (SQL text plus bound values).
    pub fn fingerprint(&self) -> String {
        let stmt = E::find()
            .filter(self.clone().into_condition())
            .build(DbBackend::Postgres);
        let mut hasher = blake3::Hasher::new();
        hasher.update(stmt.sql.as_bytes());
        hasher.update(format!("{:?}", stmt.values).as_bytes());
        hasher.finalize().to_hex().to_string()
    }
}
