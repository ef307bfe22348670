use super::failure;
use crate::core::formatting::matches_group_name;
use crate::core::models::{GroupId, GroupSummary};
use crate::core::pagination::{PageRequest, PageSize, PagedList, Sort};
use crate::infrastructure::api::LedgerApi;
use tracing::info;

#[derive(Clone, Debug)]
pub struct HomeState {
    pub root_status: Option<String>,
    pub health_status: Option<String>,
    pub status_loading: bool,
    pub status_error: Option<String>,

    pub groups: PagedList<GroupSummary>,
    /// Name filter as last applied, trimmed.
    pub filter: String,
    /// False when the API ignored `name` and returned non-matching rows.
    pub server_filter_applied: bool,

    pub creating: bool,
    pub create_error: Option<String>,
    pub created_group: Option<GroupSummary>,
    pub renaming_group_id: Option<GroupId>,
    pub rename_error: Option<String>,
}

impl Default for HomeState {
    fn default() -> Self {
        HomeState {
            root_status: None,
            health_status: None,
            status_loading: false,
            status_error: None,
            groups: PagedList::new(Sort::id_desc()),
            filter: String::new(),
            server_filter_applied: true,
            creating: false,
            create_error: None,
            created_group: None,
            renaming_group_id: None,
            rename_error: None,
        }
    }
}

impl HomeState {
    /// Rows of the current page that match the filter. The API may not
    /// filter by name, so the rows are always checked here as well.
    pub fn filtered_groups(&self) -> Vec<&GroupSummary> {
        self.groups
            .items
            .iter()
            .filter(|group| matches_group_name(group.name.as_deref().unwrap_or(""), &self.filter))
            .collect()
    }
}

pub struct HomeController<A: LedgerApi> {
    api: A,
    state: HomeState,
}

impl<A: LedgerApi> HomeController<A> {
    pub fn new(api: A) -> Self {
        HomeController {
            api,
            state: HomeState::default(),
        }
    }

    pub fn state(&self) -> &HomeState {
        &self.state
    }

    pub async fn load_status(&mut self) {
        self.state.status_loading = true;
        self.state.status_error = None;
        let (root, health) = futures::join!(self.api.root_status(), self.api.health_status());
        match root.and_then(|root| health.map(|health| (root, health))) {
            Ok((root, health)) => {
                self.state.root_status = Some(root);
                self.state.health_status = Some(health);
            }
            Err(err) => {
                let message = failure("Loading API status", err, "Status unavailable");
                self.state.root_status = Some(message.clone());
                self.state.health_status = Some(message.clone());
                self.state.status_error = Some(message);
            }
        }
        self.state.status_loading = false;
    }

    pub async fn load_groups(&mut self, request: PageRequest) {
        self.state.groups.begin(&request);
        let filter = Some(self.state.filter.clone()).filter(|filter| !filter.is_empty());
        let result = self.api.list_groups(&request, filter.as_deref()).await;
        match result {
            Ok(page) => {
                self.state.server_filter_applied = match filter.as_deref() {
                    Some(filter) => page
                        .items
                        .iter()
                        .all(|group| matches_group_name(group.name.as_deref().unwrap_or(""), filter)),
                    None => true,
                };
                self.state.groups.apply(&request, page);
            }
            Err(err) => self
                .state
                .groups
                .fail(failure("Loading groups", err, "Failed to load groups")),
        }
    }

    /// Records the name filter for the next load.
    pub fn set_filter(&mut self, filter: &str) {
        self.state.filter = filter.trim().to_string();
    }

    pub async fn apply_filter(&mut self, filter: &str) {
        self.set_filter(filter);
        let request = self.state.groups.set_page(1);
        self.load_groups(request).await;
    }

    pub async fn go_to_page(&mut self, page: u32) {
        let request = self.state.groups.set_page(page);
        self.load_groups(request).await;
    }

    pub async fn change_page_size(&mut self, size: PageSize) {
        let request = self.state.groups.set_page_size(size);
        self.load_groups(request).await;
    }

    pub async fn change_sort(&mut self, sort: Sort) {
        let request = self.state.groups.set_sort(sort);
        self.load_groups(request).await;
    }

    pub async fn retry_groups(&mut self) {
        let request = self.state.groups.retry_request();
        self.load_groups(request).await;
    }

    pub async fn create_group(&mut self, name: &str) -> Option<GroupSummary> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            self.state.create_error = Some("Enter a group name.".to_string());
            return None;
        }
        self.state.create_error = None;
        self.state.creating = true;
        let result = self.api.create_group(trimmed).await;
        self.state.creating = false;

        match result {
            Ok(mut group) => {
                if group.name.as_deref().is_none_or(|name| name.trim().is_empty()) {
                    group.name = Some(trimmed.to_string());
                }
                info!("Created group {}", group.id);
                self.state.created_group = Some(group.clone());
                let request = self.state.groups.set_page(1);
                self.load_groups(request).await;
                Some(group)
            }
            Err(err) => {
                self.state.create_error = Some(failure("Creating group", err, "Failed to create group"));
                None
            }
        }
    }

    pub async fn rename_group(&mut self, group_id: GroupId, name: &str) -> bool {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            self.state.rename_error = Some("Group name cannot be empty".to_string());
            return false;
        }
        self.state.rename_error = None;
        self.state.renaming_group_id = Some(group_id);
        let result = self.api.rename_group(group_id, trimmed).await;
        self.state.renaming_group_id = None;

        match result {
            Ok(_) => {
                info!("Renamed group {}", group_id);
                let request = self.state.groups.request();
                self.load_groups(request).await;
                true
            }
            Err(err) => {
                self.state.rename_error = Some(failure("Renaming group", err, "Failed to update group"));
                false
            }
        }
    }
}
