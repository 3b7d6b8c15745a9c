use crate::provider::SearchResult;

pub const LOADING: &'static str = "Loading...";
pub const NO_RESULTS: &'static str = "No Results Found";
pub const NO_NETWORK: &'static str = "No Network Connection";
pub const NO_SEARCH_TERM: &'static str = "Please enter a search term";
pub const SEARCH_FAILED: &'static str = "Could not complete search";

/// 검색 화면에 표시할 상태
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    Loading,
    Book { title: String, author: String },
    NoResults,
    NoNetwork,
    NoSearchTerm,
    Failed,
}

impl From<SearchResult> for ViewState {
    fn from(result: SearchResult) -> Self {
        match result {
            SearchResult::Found { title, author } => ViewState::Book { title, author },
            SearchResult::NotFound => ViewState::NoResults,
            SearchResult::NoConnectivity => ViewState::NoNetwork,
            SearchResult::TransportFailure | SearchResult::MalformedResponse => ViewState::Failed,
        }
    }
}

impl ViewState {
    pub fn title_line(&self) -> &str {
        match self {
            ViewState::Loading => LOADING,
            ViewState::Book { title, .. } => title,
            ViewState::NoResults => NO_RESULTS,
            ViewState::NoNetwork => NO_NETWORK,
            ViewState::NoSearchTerm => NO_SEARCH_TERM,
            ViewState::Failed => SEARCH_FAILED,
        }
    }

    pub fn author_line(&self) -> &str {
        match self {
            ViewState::Book { author, .. } => author,
            _ => "",
        }
    }

    /// 검색에 성공한 경우에만 입력창을 비운다.
    pub fn clears_input(&self) -> bool {
        matches!(self, ViewState::Book { .. })
    }
}
