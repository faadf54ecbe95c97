//! Sort-by-name support: a per-entity registry from field name to typed column.

use std::collections::HashMap;
use std::fmt;

use sea_orm::{EntityTrait, IdenStatic, Iterable, Order};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    #[serde(rename = "asc", alias = "ASC", alias = "ascending", alias = "Ascending")]
    Ascending,
    #[default]
    #[serde(rename = "desc", alias = "DESC", alias = "descending", alias = "Descending")]
    Descending,
}

impl SortDirection {
    pub fn order(self) -> Order {
        match self {
            SortDirection::Ascending => Order::Asc,
            SortDirection::Descending => Order::Desc,
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ascending => write!(f, "asc"),
            Self::Descending => write!(f, "desc"),
        }
    }
}

/// Column name plus direction, unresolved until the query runs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SortInstruction {
    pub column: String,
    pub direction: SortDirection,
}

impl SortInstruction {
    pub fn new(column: impl Into<String>, direction: SortDirection) -> Self {
        Self { column: column.into(), direction }
    }
}

/// Names are compared without case or underscores, so `Id`, `createdAt`
/// and `created_at` all resolve.
fn normalize(name: &str) -> String {
    name.trim()
        .chars()
        .filter(|c| *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

pub struct SortColumns<E: EntityTrait> {
    by_name: HashMap<String, E::Column>,
}

impl<E: EntityTrait> SortColumns<E> {
    /// Every column of the entity is sortable.
    pub fn all() -> Self {
        Self::only(E::Column::iter())
    }

    pub fn only<I>(columns: I) -> Self
    where
        I: IntoIterator<Item = E::Column>,
    {
        let by_name = columns
            .into_iter()
            .map(|col| (normalize(col.as_str()), col))
            .collect();
        Self { by_name }
    }

    /// Extra public name for a column, e.g. `"amount"` for `budget`.
    pub fn alias(mut self, name: &str, column: E::Column) -> Self {
        self.by_name.insert(normalize(name), column);
        self
    }

    pub fn resolve(&self, name: &str) -> Option<E::Column> {
        self.by_name.get(&normalize(name)).copied()
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

/// Entities whose stores accept sort-by-name. Override to restrict or alias
/// the sortable set.
pub trait Sortable: EntityTrait {
    fn sort_columns() -> SortColumns<Self> {
        SortColumns::all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::project;

    fn name_of(col: Option<project::Column>) -> Option<String> {
        col.map(|c| c.as_str().to_string())
    }

    #[test]
    fn resolves_case_and_underscore_insensitively() {
        let cols = SortColumns::<project::Entity>::all();
        assert_eq!(name_of(cols.resolve("Id")).as_deref(), Some("id"));
        assert_eq!(name_of(cols.resolve("createdAt")).as_deref(), Some("created_at"));
        assert_eq!(name_of(cols.resolve("created_at")).as_deref(), Some("created_at"));
        assert_eq!(name_of(cols.resolve(" Budget ")).as_deref(), Some("budget"));
        assert_eq!(cols.len(), 7);
    }

    #[test]
    fn unknown_names_do_not_resolve() {
        let cols = SortColumns::<project::Entity>::all();
        assert_eq!(name_of(cols.resolve("password")).as_deref(), None);
        assert_eq!(name_of(cols.resolve("")).as_deref(), None);
    }

    #[test]
    fn restricted_set_with_alias() {
        let cols = SortColumns::<project::Entity>::only([project::Column::Name])
            .alias("amount", project::Column::Budget);
        assert_eq!(name_of(cols.resolve("name")).as_deref(), Some("name"));
        assert_eq!(name_of(cols.resolve("amount")).as_deref(), Some("budget"));
        assert_eq!(name_of(cols.resolve("status")).as_deref(), None);
    }

    #[test]
    fn direction_parses_short_and_long_forms() {
        let d: SortDirection = serde_json::from_str("\"asc\"").unwrap();
        assert_eq!(d, SortDirection::Ascending);
        let d: SortDirection = serde_json::from_str("\"descending\"").unwrap();
        assert_eq!(d, SortDirection::Descending);
        assert_eq!(SortDirection::default(), SortDirection::Descending);
    }
}
