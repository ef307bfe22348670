use crate::core::errors::FairshareError;
use crate::core::models::GroupId;
use async_trait::async_trait;

/// Small string key/value store for client-side preferences. Only the
/// selected "current user" of each group is kept here.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, FairshareError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), FairshareError>;
    async fn remove(&self, key: &str) -> Result<(), FairshareError>;
}

pub fn current_user_key(group_id: GroupId) -> String {
    format!("fairshare:group:{}:current-user-id", group_id)
}

pub mod file;
pub mod in_memory;
