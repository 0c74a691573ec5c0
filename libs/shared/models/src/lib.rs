pub mod auth;
pub mod display;
pub mod error;
pub mod form;
pub mod lenient;
pub mod listing;
pub mod query;
