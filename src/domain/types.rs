//! Shared domain enumerations, defined alongside the API types so stored and
//! transmitted values never drift apart.

pub use poshpoule_api_types::{LeadStatus, OrderStatus, OrderType};
