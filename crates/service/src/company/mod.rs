//! Company aggregate: profile, ownership linkage, product catalog reads and
//! banner/logo lifecycle. The service here is the only code allowed to mutate
//! a company's asset pointers.

pub mod domain;
pub mod projection;
pub mod service;
pub mod store;

pub use service::CompanyService;
pub use store::CompanyStore;
