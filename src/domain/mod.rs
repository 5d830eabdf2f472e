pub mod currency;
pub mod document;
pub mod entities;
pub mod ids;
pub mod slug;
pub mod types;
