pub mod confirmation;
pub mod errors;
pub mod event_diff;
pub mod explanation;
pub mod formatting;
pub mod models;
pub mod pagination;
pub mod services;
pub mod split;
