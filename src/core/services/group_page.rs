//! State and actions behind one group's page. Every mutation goes through an
//! action method on [`GroupPageController`]; the state is read-only outside.

use super::{Section, failure};
use crate::core::confirmation::{ConfirmationTracker, TransferKey};
use crate::core::errors::FairshareError;
use crate::core::event_diff::format_event_payload;
use crate::core::explanation::select_explanation_user;
use crate::core::formatting::MemberNames;
use crate::core::models::{
    ConfirmTransfersRequest, ConfirmedTransfer, EventRecord, Expense, ExpenseId, Group, GroupId, LedgerEntry,
    LedgerExplanationEntry, Member, OwesView, Page, SettlementTransfer, UserId,
};
use crate::core::pagination::{PageRequest, PageSize, PagedList, Sort};
use crate::core::split::ExpenseDraft;
use crate::infrastructure::api::LedgerApi;
use crate::infrastructure::storage::{PreferenceStore, current_user_key};
use tracing::{debug, info, warn};

/// The three paginated lists on the page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GroupList {
    Expenses,
    Events,
    ConfirmedTransfers,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExpenseEdit {
    pub expense_id: ExpenseId,
    pub draft: ExpenseDraft,
    pub saving: bool,
    pub error: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct OwesLookup {
    pub from_user_id: Option<UserId>,
    pub to_user_id: Option<UserId>,
    /// Which figure was fetched last.
    pub view: Option<OwesView>,
    pub current: Option<f64>,
    pub historical: Option<f64>,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Clone, Debug)]
pub struct GroupPageState {
    pub group: Section<Option<Group>>,
    pub current_user_id: Option<UserId>,

    pub adding_member: bool,
    pub add_member_error: Option<String>,
    pub renaming: bool,
    pub rename_error: Option<String>,

    pub expenses: PagedList<Expense>,
    pub new_expense: ExpenseDraft,
    pub adding_expense: bool,
    pub add_expense_error: Option<String>,
    pub editing: Option<ExpenseEdit>,
    pub deleting_expense_id: Option<ExpenseId>,
    pub delete_expense_error: Option<String>,

    pub settlements: Section<Vec<SettlementTransfer>>,
    pub confirmation_id: String,
    pub confirmation_id_error: Option<String>,
    pub confirmations: ConfirmationTracker,
    pub confirm_error: Option<String>,

    pub ledger: Section<Vec<LedgerEntry>>,
    pub explanation: Section<Vec<LedgerExplanationEntry>>,
    pub selected_explanation_user: Option<UserId>,
    pub owes: OwesLookup,

    pub events: PagedList<EventRecord>,
    pub confirmed: PagedList<ConfirmedTransfer>,
    pub confirmed_filter: String,
}

impl Default for GroupPageState {
    fn default() -> Self {
        GroupPageState {
            group: Section::default(),
            current_user_id: None,
            adding_member: false,
            add_member_error: None,
            renaming: false,
            rename_error: None,
            expenses: PagedList::new(Sort::created_desc()),
            new_expense: ExpenseDraft::default(),
            adding_expense: false,
            add_expense_error: None,
            editing: None,
            deleting_expense_id: None,
            delete_expense_error: None,
            settlements: Section::default(),
            confirmation_id: String::new(),
            confirmation_id_error: None,
            confirmations: ConfirmationTracker::new(),
            confirm_error: None,
            ledger: Section::default(),
            explanation: Section::default(),
            selected_explanation_user: None,
            owes: OwesLookup::default(),
            events: PagedList::new(Sort::created_desc()),
            confirmed: PagedList::new(Sort::created_desc()),
            confirmed_filter: String::new(),
        }
    }
}

impl GroupPageState {
    pub fn members(&self) -> &[Member] {
        self.group
            .data
            .as_ref()
            .map(|group| group.members.as_slice())
            .unwrap_or(&[])
    }

    pub fn group_name(&self) -> Option<&str> {
        self.group.data.as_ref().and_then(|group| group.name.as_deref())
    }

    pub fn member_names(&self) -> MemberNames {
        self.members()
            .iter()
            .map(|member| (member.id, member.display_name()))
            .collect()
    }

    /// Expense participants: every member, in group order.
    pub fn participant_ids(&self) -> Vec<UserId> {
        self.members().iter().map(|member| member.id).collect()
    }

    pub fn is_member(&self, user_id: UserId) -> bool {
        self.members().iter().any(|member| member.id == user_id)
    }

    pub fn selected_explanation(&self) -> Option<&LedgerExplanationEntry> {
        let user_id = self.selected_explanation_user?;
        self.explanation.data.iter().find(|entry| entry.user_id == user_id)
    }

    pub fn event_details(&self, event: &EventRecord) -> String {
        format_event_payload(&event.payload, &self.member_names())
    }

    pub fn can_confirm(&self, transfer: &SettlementTransfer) -> bool {
        self.confirmations.can_confirm(&TransferKey::of(transfer))
    }

    fn confirmed_filter_value(&self) -> Option<String> {
        Some(self.confirmed_filter.trim().to_string()).filter(|filter| !filter.is_empty())
    }
}

fn settle_page<T>(
    list: &mut PagedList<T>,
    request: &PageRequest,
    result: Result<Page<T>, FairshareError>,
    operation: &str,
    fallback: &str,
) {
    match result {
        Ok(page) => list.apply(request, page),
        Err(err) => list.fail(failure(operation, err, fallback)),
    }
}

fn settle_section<T>(section: &mut Section<T>, result: Result<T, FairshareError>, operation: &str, fallback: &str) {
    match result {
        Ok(data) => section.apply(data),
        Err(err) => section.fail(failure(operation, err, fallback)),
    }
}

pub struct GroupPageController<A: LedgerApi, P: PreferenceStore> {
    api: A,
    preferences: P,
    group_id: GroupId,
    state: GroupPageState,
}

impl<A: LedgerApi, P: PreferenceStore> GroupPageController<A, P> {
    pub fn new(api: A, preferences: P, group_id: GroupId) -> Result<Self, FairshareError> {
        if group_id == 0 {
            return Err(FairshareError::InvalidGroupId(group_id.to_string()));
        }
        Ok(GroupPageController {
            api,
            preferences,
            group_id,
            state: GroupPageState::default(),
        })
    }

    pub fn group_id(&self) -> GroupId {
        self.group_id
    }

    pub fn state(&self) -> &GroupPageState {
        &self.state
    }

    /// Loads every section at once: group, first pages of the three lists,
    /// settlements, ledger and its explanation. Sections fail independently.
    pub async fn load_all(&mut self) {
        info!("Loading group {}", self.group_id);
        self.restore_current_user().await;

        let expenses_request = self.state.expenses.request_for_page(1);
        let events_request = self.state.events.request_for_page(1);
        let confirmed_request = self.state.confirmed.request_for_page(1);
        let confirmed_filter = self.state.confirmed_filter_value();

        self.state.group.begin();
        self.state.expenses.begin(&expenses_request);
        self.state.settlements.begin();
        self.state.ledger.begin();
        self.state.explanation.begin();
        self.state.confirmed.begin(&confirmed_request);
        self.state.events.begin(&events_request);

        let api = &self.api;
        let group_id = self.group_id;
        let (group, expenses, settlements, ledger, explanation, confirmed, events) = futures::join!(
            api.get_group(group_id),
            api.list_expenses(group_id, &expenses_request),
            api.settlements(group_id),
            api.ledger(group_id),
            api.ledger_explanation(group_id),
            api.list_confirmed_transfers(group_id, &confirmed_request, confirmed_filter.as_deref()),
            api.list_events(group_id, &events_request)
        );

        self.apply_group(group).await;
        settle_page(
            &mut self.state.expenses,
            &expenses_request,
            expenses,
            "Loading expenses",
            "Failed to load expenses",
        );
        settle_section(
            &mut self.state.settlements,
            settlements,
            "Loading settlements",
            "Failed to load settlements",
        );
        settle_section(&mut self.state.ledger, ledger, "Loading ledger", "Failed to load ledger");
        settle_section(
            &mut self.state.explanation,
            explanation,
            "Loading ledger explanation",
            "Failed to load ledger explanation",
        );
        self.refresh_explanation_selection();
        settle_page(
            &mut self.state.confirmed,
            &confirmed_request,
            confirmed,
            "Loading confirmed transfers",
            "Failed to load confirmed transfers",
        );
        settle_page(
            &mut self.state.events,
            &events_request,
            events,
            "Loading events",
            "Failed to load events",
        );
    }

    pub async fn load_group(&mut self) {
        self.restore_current_user().await;
        self.state.group.begin();
        let result = self.api.get_group(self.group_id).await;
        self.apply_group(result).await;
    }

    async fn apply_group(&mut self, result: Result<Group, FairshareError>) {
        match result {
            Ok(group) => {
                debug!("Group {} has {} members", group.id, group.members.len());
                self.state.group.apply(Some(group));
                self.members_changed().await;
            }
            Err(err) => self
                .state
                .group
                .fail(failure("Loading group", err, "Failed to load group")),
        }
    }

    /// Re-seeds the expense forms for the new member list and keeps the
    /// current user valid.
    async fn members_changed(&mut self) {
        let members = self.state.members().to_vec();
        self.state.new_expense.reseed(&members);
        if let Some(edit) = self.state.editing.as_mut() {
            edit.draft.reseed(&members);
        }

        let selected = self
            .state
            .current_user_id
            .filter(|id| members.iter().any(|member| member.id == *id))
            .or_else(|| members.first().map(|member| member.id));
        self.store_current_user(selected).await;
    }

    async fn restore_current_user(&mut self) {
        if self.state.current_user_id.is_some() {
            return;
        }
        match self.preferences.get(&current_user_key(self.group_id)).await {
            Ok(Some(stored)) => self.state.current_user_id = stored.trim().parse().ok(),
            Ok(None) => {}
            Err(err) => warn!("Could not read the stored current user: {}", err),
        }
    }

    async fn store_current_user(&mut self, user_id: Option<UserId>) {
        self.state.current_user_id = user_id;
        let key = current_user_key(self.group_id);
        let stored = match user_id {
            Some(user_id) => self.preferences.set(&key, &user_id.to_string()).await,
            // Nobody left to select: drop a stale id so it is not restored later.
            None => self.preferences.remove(&key).await,
        };
        if let Err(err) = stored {
            warn!("Could not store the current user: {}", err);
        }
        self.refresh_explanation_selection();
    }

    /// Selects who "you" are in this group. Ignored for non-members.
    pub async fn set_current_user(&mut self, user_id: UserId) -> bool {
        if !self.state.is_member(user_id) {
            return false;
        }
        self.store_current_user(Some(user_id)).await;
        true
    }

    pub async fn add_member(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            self.state.add_member_error = Some("Enter a member name.".to_string());
            return false;
        }
        self.state.add_member_error = None;
        self.state.adding_member = true;
        let result = self.api.add_member(self.group_id, name).await;
        self.state.adding_member = false;

        match result {
            Ok(member) => {
                info!("Added member {} to group {}", member.id, self.group_id);
                self.load_group().await;
                true
            }
            Err(err) => {
                self.state.add_member_error = Some(failure("Adding member", err, "Failed to add member"));
                false
            }
        }
    }

    pub async fn rename_group(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            self.state.rename_error = Some("Group name cannot be empty".to_string());
            return false;
        }
        self.state.rename_error = None;
        self.state.renaming = true;
        let result = self.api.rename_group(self.group_id, name).await;
        self.state.renaming = false;

        match result {
            Ok(updated) => {
                let group_id = self.group_id;
                let group = self.state.group.data.get_or_insert_with(|| Group {
                    id: group_id,
                    name: None,
                    members: Vec::new(),
                });
                let members_returned = match updated {
                    Some(updated) => {
                        group.name = updated.name.or_else(|| Some(name.to_string()));
                        // An empty member list means the response left members out.
                        let returned = !updated.members.is_empty();
                        if returned {
                            group.members = updated.members;
                        }
                        returned
                    }
                    None => {
                        group.name = Some(name.to_string());
                        false
                    }
                };
                if members_returned {
                    self.members_changed().await;
                }
                true
            }
            Err(err) => {
                self.state.rename_error = Some(failure("Renaming group", err, "Failed to update group"));
                false
            }
        }
    }

    pub async fn load_expenses(&mut self, request: PageRequest) {
        self.state.expenses.begin(&request);
        let result = self.api.list_expenses(self.group_id, &request).await;
        settle_page(
            &mut self.state.expenses,
            &request,
            result,
            "Loading expenses",
            "Failed to load expenses",
        );
    }

    pub async fn load_events(&mut self, request: PageRequest) {
        self.state.events.begin(&request);
        let result = self.api.list_events(self.group_id, &request).await;
        settle_page(&mut self.state.events, &request, result, "Loading events", "Failed to load events");
    }

    pub async fn load_confirmed_transfers(&mut self, request: PageRequest) {
        self.state.confirmed.begin(&request);
        let filter = self.state.confirmed_filter_value();
        let result = self
            .api
            .list_confirmed_transfers(self.group_id, &request, filter.as_deref())
            .await;
        settle_page(
            &mut self.state.confirmed,
            &request,
            result,
            "Loading confirmed transfers",
            "Failed to load confirmed transfers",
        );
    }

    async fn load_list(&mut self, list: GroupList, request: PageRequest) {
        match list {
            GroupList::Expenses => self.load_expenses(request).await,
            GroupList::Events => self.load_events(request).await,
            GroupList::ConfirmedTransfers => self.load_confirmed_transfers(request).await,
        }
    }

    pub async fn go_to_page(&mut self, list: GroupList, page: u32) {
        let request = match list {
            GroupList::Expenses => self.state.expenses.set_page(page),
            GroupList::Events => self.state.events.set_page(page),
            GroupList::ConfirmedTransfers => self.state.confirmed.set_page(page),
        };
        self.load_list(list, request).await;
    }

    pub async fn change_page_size(&mut self, list: GroupList, size: PageSize) {
        let request = match list {
            GroupList::Expenses => self.state.expenses.set_page_size(size),
            GroupList::Events => self.state.events.set_page_size(size),
            GroupList::ConfirmedTransfers => self.state.confirmed.set_page_size(size),
        };
        self.load_list(list, request).await;
    }

    pub async fn change_sort(&mut self, list: GroupList, sort: Sort) {
        let request = match list {
            GroupList::Expenses => self.state.expenses.set_sort(sort),
            GroupList::Events => self.state.events.set_sort(sort),
            GroupList::ConfirmedTransfers => self.state.confirmed.set_sort(sort),
        };
        self.load_list(list, request).await;
    }

    /// Re-issues the last request of `list` unchanged.
    pub async fn retry_list(&mut self, list: GroupList) {
        let request = match list {
            GroupList::Expenses => self.state.expenses.retry_request(),
            GroupList::Events => self.state.events.retry_request(),
            GroupList::ConfirmedTransfers => self.state.confirmed.retry_request(),
        };
        self.load_list(list, request).await;
    }

    /// Records the confirmation id filter for the next load.
    pub fn set_confirmed_filter(&mut self, filter: &str) {
        self.state.confirmed_filter = filter.trim().to_string();
    }

    /// Filters confirmed transfers by confirmation id and reloads from page 1.
    pub async fn apply_confirmed_filter(&mut self, filter: &str) {
        self.set_confirmed_filter(filter);
        let request = self.state.confirmed.set_page(1);
        self.load_confirmed_transfers(request).await;
    }

    pub fn new_expense_mut(&mut self) -> &mut ExpenseDraft {
        &mut self.state.new_expense
    }

    pub fn edit_draft_mut(&mut self) -> Option<&mut ExpenseDraft> {
        self.state.editing.as_mut().map(|edit| &mut edit.draft)
    }

    async fn reload_after_expense_change(&mut self) {
        let expenses_request = self.state.expenses.request();
        let events_request = self.state.events.request();
        self.state.expenses.begin(&expenses_request);
        self.state.settlements.begin();
        self.state.events.begin(&events_request);

        let api = &self.api;
        let group_id = self.group_id;
        let (expenses, settlements, events) = futures::join!(
            api.list_expenses(group_id, &expenses_request),
            api.settlements(group_id),
            api.list_events(group_id, &events_request)
        );

        settle_page(
            &mut self.state.expenses,
            &expenses_request,
            expenses,
            "Loading expenses",
            "Failed to load expenses",
        );
        settle_section(
            &mut self.state.settlements,
            settlements,
            "Loading settlements",
            "Failed to load settlements",
        );
        settle_page(
            &mut self.state.events,
            &events_request,
            events,
            "Loading events",
            "Failed to load events",
        );
    }

    /// Validates the add form and records the expense. A validation failure
    /// lands in `add_expense_error` without any request being sent.
    pub async fn add_expense(&mut self) -> bool {
        let participants = self.state.participant_ids();
        let payload = match self.state.new_expense.validate(&participants) {
            Ok(payload) => payload,
            Err(err) => {
                self.state.add_expense_error = Some(err.banner("Failed to add expense"));
                return false;
            }
        };

        self.state.add_expense_error = None;
        self.state.adding_expense = true;
        let result = self.api.create_expense(self.group_id, &payload).await;
        self.state.adding_expense = false;

        match result {
            Ok(()) => {
                info!("Recorded expense '{}' in group {}", payload.description, self.group_id);
                let members = self.state.members().to_vec();
                self.state.new_expense = ExpenseDraft::default();
                self.state.new_expense.reseed(&members);
                self.reload_after_expense_change().await;
                true
            }
            Err(err) => {
                self.state.add_expense_error = Some(failure("Adding expense", err, "Failed to add expense"));
                false
            }
        }
    }

    /// Opens the edit form for an expense on the current page.
    pub fn start_edit(&mut self, expense_id: ExpenseId) -> bool {
        let Some(expense) = self
            .state
            .expenses
            .items
            .iter()
            .find(|expense| expense.expense_id == expense_id)
        else {
            return false;
        };
        let draft = ExpenseDraft::from_expense(expense, self.state.members());
        self.state.editing = Some(ExpenseEdit {
            expense_id,
            draft,
            saving: false,
            error: None,
        });
        true
    }

    pub fn reset_edit(&mut self) {
        self.state.editing = None;
    }

    pub async fn update_expense(&mut self) -> bool {
        let participants = self.state.participant_ids();
        let Some(edit) = self.state.editing.as_mut() else {
            return false;
        };
        let payload = match edit.draft.validate(&participants) {
            Ok(payload) => payload,
            Err(err) => {
                edit.error = Some(err.banner("Failed to update expense"));
                return false;
            }
        };
        edit.error = None;
        edit.saving = true;
        let expense_id = edit.expense_id;

        let result = self.api.update_expense(self.group_id, expense_id, &payload).await;
        match result {
            Ok(()) => {
                info!("Updated expense {} in group {}", expense_id, self.group_id);
                self.state.editing = None;
                self.reload_after_expense_change().await;
                true
            }
            Err(err) => {
                let message = failure("Updating expense", err, "Failed to update expense");
                if let Some(edit) = self.state.editing.as_mut() {
                    edit.saving = false;
                    edit.error = Some(message);
                }
                false
            }
        }
    }

    pub async fn delete_expense(&mut self, expense_id: ExpenseId) -> bool {
        self.state.deleting_expense_id = Some(expense_id);
        self.state.delete_expense_error = None;
        let result = self.api.delete_expense(self.group_id, expense_id).await;

        let deleted = match result {
            Ok(()) => {
                info!("Deleted expense {} from group {}", expense_id, self.group_id);
                if self.state.editing.as_ref().map(|edit| edit.expense_id) == Some(expense_id) {
                    self.state.editing = None;
                }
                self.reload_after_expense_change().await;
                true
            }
            Err(err) => {
                self.state.delete_expense_error = Some(failure("Deleting expense", err, "Failed to delete expense"));
                false
            }
        };
        self.state.deleting_expense_id = None;
        deleted
    }

    pub async fn load_settlements(&mut self) {
        self.state.settlements.begin();
        let result = self.api.settlements(self.group_id).await;
        settle_section(
            &mut self.state.settlements,
            result,
            "Loading settlements",
            "Failed to load settlements",
        );
    }

    pub fn set_confirmation_id(&mut self, confirmation_id: &str) {
        self.state.confirmation_id = confirmation_id.to_string();
    }

    pub async fn generate_confirmation_id(&mut self) -> bool {
        self.state.confirmation_id_error = None;
        match self.api.generate_confirmation_id(self.group_id).await {
            Ok(confirmation_id) => {
                self.state.confirmation_id = confirmation_id;
                true
            }
            Err(err) => {
                self.state.confirmation_id_error = Some(failure(
                    "Generating confirmation id",
                    err,
                    "Failed to generate confirmation ID",
                ));
                false
            }
        }
    }

    /// Records a suggested transfer as paid. Does nothing while the same
    /// transfer is in flight or once it has been confirmed.
    pub async fn confirm_transfer(&mut self, transfer: &SettlementTransfer) -> bool {
        let key = TransferKey::of(transfer);
        if !self.state.confirmations.begin(&key) {
            debug!("Skipping confirmation of {}: already confirming or paid", key);
            return false;
        }
        self.state.confirm_error = None;

        let confirmation_id = Some(self.state.confirmation_id.trim().to_string()).filter(|id| !id.is_empty());
        let request = ConfirmTransfersRequest {
            confirmation_id,
            transfers: vec![transfer.clone()],
        };
        let result = self.api.confirm_transfers(self.group_id, &request).await;

        match result {
            Ok(()) => {
                info!("Confirmed transfer {} in group {}", key, self.group_id);
                self.load_settlements().await;
                self.state.confirmations.succeed(&key);
                true
            }
            Err(err) => {
                self.state.confirmations.fail(&key);
                self.state.confirm_error = Some(failure("Confirming transfer", err, "Failed to confirm transfer"));
                false
            }
        }
    }

    pub async fn load_ledger(&mut self) {
        self.state.ledger.begin();
        let result = self.api.ledger(self.group_id).await;
        settle_section(&mut self.state.ledger, result, "Loading ledger", "Failed to load ledger");
    }

    pub async fn load_ledger_explanation(&mut self) {
        self.state.explanation.begin();
        let result = self.api.ledger_explanation(self.group_id).await;
        settle_section(
            &mut self.state.explanation,
            result,
            "Loading ledger explanation",
            "Failed to load ledger explanation",
        );
        self.refresh_explanation_selection();
    }

    fn refresh_explanation_selection(&mut self) {
        self.state.selected_explanation_user = select_explanation_user(
            &self.state.explanation.data,
            self.state.selected_explanation_user,
            self.state.current_user_id,
        );
    }

    pub fn select_explanation_user(&mut self, user_id: UserId) -> bool {
        if !self.state.explanation.data.iter().any(|entry| entry.user_id == user_id) {
            return false;
        }
        self.state.selected_explanation_user = Some(user_id);
        true
    }

    pub fn set_owes_members(&mut self, from: Option<UserId>, to: Option<UserId>) {
        self.state.owes.from_user_id = from;
        self.state.owes.to_user_id = to;
    }

    /// Fetches what the selected `from` member owes `to`. Needs two distinct
    /// members; otherwise nothing is requested.
    pub async fn load_owes(&mut self, view: OwesView) -> bool {
        let (Some(from), Some(to)) = (self.state.owes.from_user_id, self.state.owes.to_user_id) else {
            return false;
        };
        if from == to {
            return false;
        }
        self.state.owes.view = Some(view);
        self.state.owes.loading = true;
        self.state.owes.error = None;

        let result = self.api.owes(self.group_id, from, to, view).await;
        self.state.owes.loading = false;
        match result {
            Ok(amount) => {
                match view {
                    OwesView::Current => self.state.owes.current = Some(amount),
                    OwesView::Historical => self.state.owes.historical = Some(amount),
                }
                true
            }
            Err(err) => {
                let fallback = match view {
                    OwesView::Current => "Failed to load owes",
                    OwesView::Historical => "Failed to load historical owes",
                };
                self.state.owes.error = Some(failure("Loading owes", err, fallback));
                false
            }
        }
    }
}
