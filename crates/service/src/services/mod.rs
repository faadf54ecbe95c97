//! Business services. Each call runs on its own unit of work taken from the
//! shared [`ServiceContext`].

pub mod context;
pub mod contract;
pub mod maintenance;
pub mod project;
pub mod quotation;

pub use context::ServiceContext;
pub use contract::{ContractFilter, ContractService, ContractSpec, SignContract};
pub use maintenance::{MaintenanceFilter, MaintenanceService, MaintenanceSpec, NewMaintenanceRequest};
pub use project::{NewProject, ProjectChanges, ProjectFilter, ProjectService, ProjectSpec};
pub use quotation::{NewQuotation, QuotationFilter, QuotationService, QuotationSpec};
