//! Tasks concretos de networking.
//!
//! Una única familia de tasks (`Create`/`Get`/`Delete`) parametrizada por
//! `ResourceFamily` cubre networks y subnets por igual, sin duplicar lógica
//! por recurso.
pub mod resource;

pub use resource::{CreateResource, DeleteResource, GetResources, ParentLink, ResourceFamily};
