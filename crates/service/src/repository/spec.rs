use sea_orm::EntityTrait;

use crate::pagination::PageParams;
use super::predicate::Predicate;
use super::sort::SortInstruction;

/// A list request: shared page/sort parameters plus entity-specific filters.
///
/// Implementors declare only their own optional filter fields and fold the
/// ones that are set into [`build_predicate`](Self::build_predicate). Both
/// builders must be pure so a spec can be evaluated any number of times.
pub trait FilterSortSpec<E: EntityTrait>: Send + Sync {
    fn page(&self) -> &PageParams;

    fn build_predicate(&self) -> Predicate<E> {
        Predicate::all()
    }

    fn build_sort(&self) -> Option<SortInstruction> {
        self.page().sort_instruction()
    }
}

/// Bare page parameters: match everything.
impl<E: EntityTrait> FilterSortSpec<E> for PageParams {
    fn page(&self) -> &PageParams {
        self
    }
}
