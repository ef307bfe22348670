pub mod http;
pub mod wire;

use crate::core::errors::FairshareError;
use crate::core::models::{
    ConfirmTransfersRequest, ConfirmedTransfer, EventRecord, Expense, ExpenseId, ExpensePayload, Group, GroupId,
    GroupSummary, LedgerEntry, LedgerExplanationEntry, Member, OwesView, Page, SettlementTransfer, UserId,
};
use crate::core::pagination::PageRequest;
use async_trait::async_trait;

/// Remote ledger API as the client sees it. Every response is already
/// normalized into the crate's own types.
#[async_trait]
pub trait LedgerApi: Send + Sync {
    async fn root_status(&self) -> Result<String, FairshareError>;
    async fn health_status(&self) -> Result<String, FairshareError>;

    async fn list_groups(&self, request: &PageRequest, name: Option<&str>) -> Result<Page<GroupSummary>, FairshareError>;
    async fn create_group(&self, name: &str) -> Result<GroupSummary, FairshareError>;
    async fn get_group(&self, group_id: GroupId) -> Result<Group, FairshareError>;
    /// `None` when the API acknowledges the rename without a body.
    async fn rename_group(&self, group_id: GroupId, name: &str) -> Result<Option<Group>, FairshareError>;
    async fn add_member(&self, group_id: GroupId, name: &str) -> Result<Member, FairshareError>;

    async fn list_expenses(&self, group_id: GroupId, request: &PageRequest) -> Result<Page<Expense>, FairshareError>;
    async fn create_expense(&self, group_id: GroupId, payload: &ExpensePayload) -> Result<(), FairshareError>;
    async fn update_expense(
        &self,
        group_id: GroupId,
        expense_id: ExpenseId,
        payload: &ExpensePayload,
    ) -> Result<(), FairshareError>;
    async fn delete_expense(&self, group_id: GroupId, expense_id: ExpenseId) -> Result<(), FairshareError>;

    async fn settlements(&self, group_id: GroupId) -> Result<Vec<SettlementTransfer>, FairshareError>;
    async fn confirm_transfers(&self, group_id: GroupId, request: &ConfirmTransfersRequest) -> Result<(), FairshareError>;
    async fn generate_confirmation_id(&self, group_id: GroupId) -> Result<String, FairshareError>;
    async fn list_confirmed_transfers(
        &self,
        group_id: GroupId,
        request: &PageRequest,
        confirmation_id: Option<&str>,
    ) -> Result<Page<ConfirmedTransfer>, FairshareError>;

    async fn ledger(&self, group_id: GroupId) -> Result<Vec<LedgerEntry>, FairshareError>;
    async fn ledger_explanation(&self, group_id: GroupId) -> Result<Vec<LedgerExplanationEntry>, FairshareError>;
    async fn owes(&self, group_id: GroupId, from: UserId, to: UserId, view: OwesView) -> Result<f64, FairshareError>;

    async fn list_events(&self, group_id: GroupId, request: &PageRequest) -> Result<Page<EventRecord>, FairshareError>;
}
