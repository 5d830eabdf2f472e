//! Application services: catalog queries, mutations and notifications.

pub mod catalog;
pub mod clock;
pub mod currency;
pub mod error;
pub mod leads;
pub mod notify;
pub mod orders;
pub mod pagination;
pub mod products;
pub mod validation;
