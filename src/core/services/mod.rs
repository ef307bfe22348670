pub mod group_page;
pub mod home;

pub use group_page::{ExpenseEdit, GroupList, GroupPageController, GroupPageState, OwesLookup};
pub use home::{HomeController, HomeState};

use crate::core::errors::FairshareError;
use tracing::warn;

/// Non-paginated data section with its own loading and error flags.
#[derive(Clone, Debug, Default)]
pub struct Section<T> {
    pub data: T,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T> Section<T> {
    pub fn begin(&mut self) {
        self.loading = true;
        self.error = None;
    }

    pub fn apply(&mut self, data: T) {
        self.data = data;
        self.loading = false;
    }

    pub fn fail(&mut self, message: String) {
        self.error = Some(message);
        self.loading = false;
    }
}

/// Logs a failed operation and turns it into the text for its error banner.
pub(crate) fn failure(operation: &str, err: FairshareError, fallback: &str) -> String {
    warn!("{} failed: {}", operation, err);
    err.banner(fallback)
}
