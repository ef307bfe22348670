use crate::core::errors::FairshareError;
use crate::core::models::Page;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_LIST_SORT: &str = "createdAt,desc";
pub const DEFAULT_GROUP_SORT: &str = "id,desc";

/// One-based page shown to the user -> zero-based `page` query parameter.
pub fn to_api_page(ui_page: u32) -> u32 {
    ui_page.saturating_sub(1)
}

/// Zero-based API page -> one-based page shown to the user.
pub fn to_ui_page(api_page: u32) -> u32 {
    api_page.saturating_add(1).max(1)
}

/// Page buttons to render: first, last, and the neighbours of the current page.
pub fn visible_pages(current: u32, total: u32) -> Vec<u32> {
    let mut pages: Vec<u32> = [1, total, current.saturating_sub(1), current, current.saturating_add(1)]
        .into_iter()
        .filter(|page| *page >= 1 && *page <= total)
        .collect();
    pages.sort_unstable();
    pages.dedup();
    pages
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum PageSize {
    Five,
    #[default]
    Ten,
    TwentyFive,
    Fifty,
    Hundred,
}

impl PageSize {
    pub const ALL: [PageSize; 5] = [
        PageSize::Five,
        PageSize::Ten,
        PageSize::TwentyFive,
        PageSize::Fifty,
        PageSize::Hundred,
    ];

    pub fn get(self) -> u32 {
        match self {
            PageSize::Five => 5,
            PageSize::Ten => 10,
            PageSize::TwentyFive => 25,
            PageSize::Fifty => 50,
            PageSize::Hundred => 100,
        }
    }
}

impl From<PageSize> for u32 {
    fn from(size: PageSize) -> Self {
        size.get()
    }
}

impl TryFrom<u32> for PageSize {
    type Error = FairshareError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        PageSize::ALL
            .into_iter()
            .find(|size| size.get() == value)
            .ok_or_else(|| {
                FairshareError::invalid_input(
                    "size",
                    "Invalid page size",
                    format!("Page size must be one of 5, 10, 25, 50, 100 (got {})", value),
                )
            })
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

impl FromStr for PageSize {
    type Err = FairshareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s
            .trim()
            .parse::<u32>()
            .map_err(|_| FairshareError::invalid_input("size", "Invalid page size", format!("'{}' is not a number", s)))?;
        PageSize::try_from(value)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => write!(f, "asc"),
            SortDirection::Desc => write!(f, "desc"),
        }
    }
}

/// `field,direction` as the API expects it in the `sort` parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sort {
    pub field: String,
    pub direction: SortDirection,
}

impl Sort {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Sort {
            field: field.into(),
            direction,
        }
    }

    pub fn created_desc() -> Self {
        Sort::new("createdAt", SortDirection::Desc)
    }

    pub fn id_desc() -> Self {
        Sort::new("id", SortDirection::Desc)
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.field, self.direction)
    }
}

impl FromStr for Sort {
    type Err = FairshareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            FairshareError::invalid_input(
                "sort",
                "Invalid sort",
                format!("Sort must look like 'field,asc' or 'field,desc' (got '{}')", s),
            )
        };
        let (field, direction) = s.split_once(',').ok_or_else(invalid)?;
        let field = field.trim();
        if field.is_empty() {
            return Err(invalid());
        }
        let direction = match direction.trim().to_ascii_lowercase().as_str() {
            "asc" => SortDirection::Asc,
            "desc" => SortDirection::Desc,
            _ => return Err(invalid()),
        };
        Ok(Sort::new(field, direction))
    }
}

/// Parameters of one list fetch. `page` is one-based.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: PageSize,
    pub sort: Sort,
}

impl PageRequest {
    /// Query pairs with the page converted to the API's zero-based numbering.
    /// The groups listing names the size parameter `pageSize`, every other
    /// list names it `size`.
    pub fn query_pairs(&self, size_param: &str) -> Vec<(String, String)> {
        vec![
            ("page".to_string(), to_api_page(self.page).to_string()),
            (size_param.to_string(), self.size.get().to_string()),
            ("sort".to_string(), self.sort.to_string()),
        ]
    }
}

/// State of one paginated section: items, position, totals, and its own
/// loading and error flags.
#[derive(Clone, Debug)]
pub struct PagedList<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub size: PageSize,
    pub sort: Sort,
    pub total_pages: u32,
    pub total_items: u64,
    pub loading: bool,
    pub error: Option<String>,
    last_request: Option<PageRequest>,
}

impl<T> PagedList<T> {
    pub fn new(sort: Sort) -> Self {
        PagedList {
            items: Vec::new(),
            page: 1,
            size: PageSize::default(),
            sort,
            total_pages: 1,
            total_items: 0,
            loading: false,
            error: None,
            last_request: None,
        }
    }

    pub fn request(&self) -> PageRequest {
        PageRequest {
            page: self.page.max(1),
            size: self.size,
            sort: self.sort.clone(),
        }
    }

    pub fn request_for_page(&self, page: u32) -> PageRequest {
        PageRequest {
            page: page.max(1),
            ..self.request()
        }
    }

    /// Request that a retry re-issues: the last one sent, or the current
    /// position if nothing was sent yet.
    pub fn retry_request(&self) -> PageRequest {
        self.last_request.clone().unwrap_or_else(|| self.request())
    }

    pub fn set_sort(&mut self, sort: Sort) -> PageRequest {
        self.sort = sort;
        self.page = 1;
        self.request()
    }

    pub fn set_page_size(&mut self, size: PageSize) -> PageRequest {
        self.size = size;
        self.page = 1;
        self.request()
    }

    pub fn set_page(&mut self, page: u32) -> PageRequest {
        self.page = page.max(1);
        self.request()
    }

    pub fn begin(&mut self, request: &PageRequest) {
        self.loading = true;
        self.error = None;
        self.last_request = Some(request.clone());
    }

    pub fn apply(&mut self, request: &PageRequest, page: Page<T>) {
        self.items = page.items;
        self.page = page.current_page.map(to_ui_page).unwrap_or(request.page);
        self.size = request.size;
        self.sort = request.sort.clone();
        self.total_pages = page.total_pages.max(1);
        self.total_items = page.total_items;
        self.loading = false;
    }

    pub fn fail(&mut self, message: String) {
        self.error = Some(message);
        self.loading = false;
    }

    pub fn visible_pages(&self) -> Vec<u32> {
        visible_pages(self.page, self.total_pages)
    }
}
