pub mod form;
pub mod scheduler;
pub mod store;

pub use form::ParamForm;
pub use scheduler::{SyncScheduler, SyncTicket};
pub use store::{CommitReport, ParameterStore};
