pub mod cli;
pub mod config;
pub mod core;
pub mod infrastructure;

pub use crate::core::errors::FairshareError;
pub use crate::core::services::{GroupPageController, HomeController};
pub use crate::infrastructure::api::LedgerApi;
pub use crate::infrastructure::api::http::HttpLedgerApi;
pub use crate::infrastructure::storage::PreferenceStore;

#[cfg(test)]
mod tests;
