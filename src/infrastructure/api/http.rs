use super::LedgerApi;
use super::wire::{
    ConfirmationIdResponse, LedgerResponse, OwesResponse, RawGroup, RawGroupSummary, RawMember, RawPage,
    TransfersResponse, status_text,
};
use crate::core::errors::FairshareError;
use crate::core::explanation::parse_ledger_explanation;
use crate::core::models::{
    ConfirmTransfersRequest, ConfirmedTransfer, EventRecord, Expense, ExpenseId, ExpensePayload, Group, GroupId,
    GroupSummary, LedgerEntry, LedgerExplanationEntry, Member, OwesView, Page, SettlementTransfer, UserId,
};
use crate::core::pagination::PageRequest;
use async_trait::async_trait;
use http::header::CONTENT_TYPE;
use http::{Method, StatusCode};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, warn};

const CONFIRMATION_ID_HEADER: &str = "Confirmation-Id";

/// `LedgerApi` over JSON/HTTP. Holds no state besides the connection pool;
/// every call goes to the network.
#[derive(Clone, Debug)]
pub struct HttpLedgerApi {
    client: Client,
    base_url: String,
}

impl HttpLedgerApi {
    pub fn new(base_url: &str) -> Result<Self, FairshareError> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(FairshareError::MissingBaseUrl);
        }
        let client = Client::builder().build()?;
        Ok(HttpLedgerApi { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!("{} {}", method, url);
        self.client
            .request(method, url)
            .header(CONTENT_TYPE, "application/json")
    }

    /// Sends the request and returns the body, or `None` for 204 and empty
    /// bodies. Non-2xx answers become `FairshareError::Api`.
    async fn execute(&self, builder: RequestBuilder) -> Result<Option<String>, FairshareError> {
        let response = builder.send().await?;
        let status = response.status();
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.contains("application/json"));
        let text = response.text().await?;

        if !status.is_success() {
            return Err(api_error(status, is_json, &text));
        }
        if status == StatusCode::NO_CONTENT || text.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(text))
    }

    async fn fetch<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, FairshareError> {
        let body = self
            .execute(builder)
            .await?
            .ok_or_else(|| FairshareError::Decode("empty response body".to_string()))?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn fetch_optional<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<Option<T>, FairshareError> {
        match self.execute(builder).await? {
            Some(body) => Ok(Some(serde_json::from_str(&body)?)),
            None => Ok(None),
        }
    }
}

fn api_error(status: StatusCode, is_json: bool, body: &str) -> FairshareError {
    let from_json = if is_json {
        serde_json::from_str::<Value>(body).ok().and_then(|value| {
            ["message", "error"].into_iter().find_map(|key| {
                value
                    .get(key)
                    .and_then(Value::as_str)
                    .map(str::trim)
                    .filter(|text| !text.is_empty())
                    .map(str::to_string)
            })
        })
    } else {
        None
    };
    let message = from_json
        .or_else(|| Some(body.trim().to_string()).filter(|text| !text.is_empty()))
        .or_else(|| status.canonical_reason().map(str::to_string))
        .unwrap_or_else(|| "Request failed".to_string());
    warn!("API request failed with {}: {}", status.as_u16(), message);
    FairshareError::Api {
        status: status.as_u16(),
        message,
    }
}

fn group_path(group_id: GroupId) -> String {
    format!("/groups/{}", group_id)
}

#[async_trait]
impl LedgerApi for HttpLedgerApi {
    async fn root_status(&self) -> Result<String, FairshareError> {
        let body = self.fetch_optional::<Value>(self.request(Method::GET, "/")).await?;
        Ok(status_text(body))
    }

    async fn health_status(&self) -> Result<String, FairshareError> {
        let body = self.fetch_optional::<Value>(self.request(Method::GET, "/health")).await?;
        Ok(status_text(body))
    }

    async fn list_groups(&self, request: &PageRequest, name: Option<&str>) -> Result<Page<GroupSummary>, FairshareError> {
        let mut query = request.query_pairs("pageSize");
        if let Some(name) = name.map(str::trim).filter(|name| !name.is_empty()) {
            query.push(("name".to_string(), name.to_string()));
        }
        let raw: RawPage<RawGroupSummary> = self.fetch(self.request(Method::GET, "/groups").query(&query)).await?;
        Ok(raw.normalize(RawGroupSummary::normalize))
    }

    async fn create_group(&self, name: &str) -> Result<GroupSummary, FairshareError> {
        let raw: RawGroupSummary = self
            .fetch(self.request(Method::POST, "/groups").json(&json!({ "name": name })))
            .await?;
        Ok(raw.normalize())
    }

    async fn get_group(&self, group_id: GroupId) -> Result<Group, FairshareError> {
        let raw: RawGroup = self.fetch(self.request(Method::GET, &group_path(group_id))).await?;
        Ok(raw.normalize())
    }

    async fn rename_group(&self, group_id: GroupId, name: &str) -> Result<Option<Group>, FairshareError> {
        let raw: Option<RawGroup> = self
            .fetch_optional(
                self.request(Method::PATCH, &group_path(group_id))
                    .json(&json!({ "name": name })),
            )
            .await?;
        Ok(raw.map(RawGroup::normalize))
    }

    async fn add_member(&self, group_id: GroupId, name: &str) -> Result<Member, FairshareError> {
        let path = format!("{}/members", group_path(group_id));
        let raw: RawMember = self
            .fetch(self.request(Method::POST, &path).json(&json!({ "name": name })))
            .await?;
        raw.normalize()
            .ok_or_else(|| FairshareError::Decode("created member has no id".to_string()))
    }

    async fn list_expenses(&self, group_id: GroupId, request: &PageRequest) -> Result<Page<Expense>, FairshareError> {
        let path = format!("{}/expenses", group_path(group_id));
        let raw: RawPage<Expense> = self
            .fetch(self.request(Method::GET, &path).query(&request.query_pairs("size")))
            .await?;
        Ok(raw.normalize(|expense| expense))
    }

    async fn create_expense(&self, group_id: GroupId, payload: &ExpensePayload) -> Result<(), FairshareError> {
        let path = format!("{}/expenses", group_path(group_id));
        self.execute(self.request(Method::POST, &path).json(payload)).await?;
        Ok(())
    }

    async fn update_expense(
        &self,
        group_id: GroupId,
        expense_id: ExpenseId,
        payload: &ExpensePayload,
    ) -> Result<(), FairshareError> {
        let path = format!("{}/expenses/{}", group_path(group_id), expense_id);
        self.execute(self.request(Method::PATCH, &path).json(payload)).await?;
        Ok(())
    }

    async fn delete_expense(&self, group_id: GroupId, expense_id: ExpenseId) -> Result<(), FairshareError> {
        let path = format!("{}/expenses/{}", group_path(group_id), expense_id);
        self.execute(self.request(Method::DELETE, &path)).await?;
        Ok(())
    }

    async fn settlements(&self, group_id: GroupId) -> Result<Vec<SettlementTransfer>, FairshareError> {
        let path = format!("{}/settlements", group_path(group_id));
        let response: Option<TransfersResponse> = self.fetch_optional(self.request(Method::GET, &path)).await?;
        Ok(response.and_then(|r| r.transfers).unwrap_or_default())
    }

    async fn confirm_transfers(&self, group_id: GroupId, request: &ConfirmTransfersRequest) -> Result<(), FairshareError> {
        let path = format!("{}/settlements/confirm", group_path(group_id));
        let mut builder = self.request(Method::POST, &path).json(request);
        if let Some(confirmation_id) = request.confirmation_id.as_deref() {
            builder = builder.header(CONFIRMATION_ID_HEADER, confirmation_id);
        }
        self.execute(builder).await?;
        Ok(())
    }

    async fn generate_confirmation_id(&self, group_id: GroupId) -> Result<String, FairshareError> {
        let path = format!("{}/api/confirmation-id", group_path(group_id));
        let value: Value = self.fetch(self.request(Method::GET, &path)).await?;
        ConfirmationIdResponse::from_value(value)
            .ok_or_else(|| FairshareError::Decode("response carries no confirmation id".to_string()))
    }

    async fn list_confirmed_transfers(
        &self,
        group_id: GroupId,
        request: &PageRequest,
        confirmation_id: Option<&str>,
    ) -> Result<Page<ConfirmedTransfer>, FairshareError> {
        let path = format!("{}/confirmed-transfers", group_path(group_id));
        let mut query = request.query_pairs("size");
        if let Some(id) = confirmation_id.map(str::trim).filter(|id| !id.is_empty()) {
            query.push(("confirmationId".to_string(), id.to_string()));
        }
        let raw: RawPage<ConfirmedTransfer> = self.fetch(self.request(Method::GET, &path).query(&query)).await?;
        Ok(raw.normalize(|transfer| transfer))
    }

    async fn ledger(&self, group_id: GroupId) -> Result<Vec<LedgerEntry>, FairshareError> {
        let path = format!("{}/ledger", group_path(group_id));
        let response: Option<LedgerResponse> = self.fetch_optional(self.request(Method::GET, &path)).await?;
        Ok(response.and_then(|r| r.entries).unwrap_or_default())
    }

    async fn ledger_explanation(&self, group_id: GroupId) -> Result<Vec<LedgerExplanationEntry>, FairshareError> {
        let path = format!("{}/explanations/ledger", group_path(group_id));
        let value: Option<Value> = self.fetch_optional(self.request(Method::GET, &path)).await?;
        Ok(value.map(|value| parse_ledger_explanation(&value)).unwrap_or_default())
    }

    async fn owes(&self, group_id: GroupId, from: UserId, to: UserId, view: OwesView) -> Result<f64, FairshareError> {
        let path = match view {
            OwesView::Current => format!("{}/owes", group_path(group_id)),
            OwesView::Historical => format!("{}/owes/historical", group_path(group_id)),
        };
        let query = [("fromUserId", from.to_string()), ("toUserId", to.to_string())];
        let response: Option<OwesResponse> = self
            .fetch_optional(self.request(Method::GET, &path).query(&query))
            .await?;
        Ok(response.map(|r| r.amount()).unwrap_or(0.0))
    }

    async fn list_events(&self, group_id: GroupId, request: &PageRequest) -> Result<Page<EventRecord>, FairshareError> {
        let path = format!("{}/events", group_path(group_id));
        let raw: RawPage<EventRecord> = self
            .fetch(self.request(Method::GET, &path).query(&request.query_pairs("size")))
            .await?;
        Ok(raw.normalize(|event| event))
    }
}
