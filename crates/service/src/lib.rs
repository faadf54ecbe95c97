//! Service layer for the bizdesk backend.
//! - `repository`: typed stores, unit of work, filter/sort specs, cache-aside decorator.
//! - `cache`: cache backends used by the decorator.
//! - `services`: project, quotation, contract and maintenance operations built on the above.

pub mod cache;
pub mod errors;
pub mod pagination;
pub mod repository;
pub mod services;
#[cfg(test)]
pub mod test_support;
