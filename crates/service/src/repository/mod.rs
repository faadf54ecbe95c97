//! Generic persistence layer: typed stores grouped by a unit of work, a
//! filter/sort request model shared by every list query, and a cache-aside
//! decorator.

mod cached;
mod error;
mod predicate;
mod session;
mod sort;
mod spec;
mod store;
mod traits;
mod unit_of_work;

pub use cached::{CachePolicy, CachedRepository};
pub use error::{RepositoryError, RepositoryResult};
pub use predicate::Predicate;
pub use session::{ChangeKind, Session};
pub use sort::{SortColumns, SortDirection, SortInstruction, Sortable};
pub use spec::FilterSortSpec;
pub use store::EntityStore;
pub use traits::{KeyOf, Page, Repository};
pub use unit_of_work::UnitOfWork;
