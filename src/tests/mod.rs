mod cli_tests;
mod event_diff_tests;
mod explanation_tests;
mod group_page_tests;
mod split_tests;
mod storage_tests;

use crate::core::models::{GroupId, UserId};
use crate::core::services::{GroupPageController, HomeController};
use crate::infrastructure::storage::in_memory::InMemoryPreferenceStore;
use fake_api::FakeLedgerApi;

pub const TEST_GROUP_ID: GroupId = 7;

pub fn create_test_controller(
    members: &[(UserId, &str)],
) -> (
    GroupPageController<FakeLedgerApi, InMemoryPreferenceStore>,
    FakeLedgerApi,
    InMemoryPreferenceStore,
) {
    let api = FakeLedgerApi::with_members(TEST_GROUP_ID, members);
    let preferences = InMemoryPreferenceStore::new();
    let controller = GroupPageController::new(api.clone(), preferences.clone(), TEST_GROUP_ID)
        .expect("test group id is valid");
    (controller, api, preferences)
}

pub fn create_test_home() -> (HomeController<FakeLedgerApi>, FakeLedgerApi) {
    let api = FakeLedgerApi::new();
    (HomeController::new(api.clone()), api)
}
