use serde::{Deserialize, Serialize};

pub type UserId = u64;
pub type GroupId = u64;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: UserId,
    pub name: Option<String>,
}

impl Member {
    pub fn new(id: UserId, name: impl Into<String>) -> Self {
        Member {
            id,
            name: Some(name.into()),
        }
    }

    /// Trimmed name, or "Member" when the API sent nothing usable.
    pub fn display_name(&self) -> String {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => "Member".to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: GroupId,
    pub name: Option<String>,
    pub members: Vec<Member>,
}

/// Row of the paginated group listing.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GroupSummary {
    pub id: GroupId,
    pub name: Option<String>,
    pub member_count: Option<u64>,
}
