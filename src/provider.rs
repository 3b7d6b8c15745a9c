use thiserror::Error;

pub mod google;

/// 사용자가 입력한 도서 검색어
///
/// 빈 문자열만 거부하며 공백은 제거하지 않고 그대로 전달한다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query(String);

impl Query {
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        if text.is_empty() {
            None
        } else {
            Some(Self(text))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// 검색 한 번에 대해 호출자에게 전달되는 최종 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchResult {
    Found { title: String, author: String },
    NotFound,
    NoConnectivity,
    TransportFailure,
    MalformedResponse,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClientError {
    #[error("invalid catalog endpoint: {0}")]
    InvalidBaseUrl(String),
    #[error("request failed: {0}")]
    RequestFailed(String),
    #[error("catalog returned status {0}")]
    UnexpectedStatus(u16),
    #[error("failed to read response body: {0}")]
    ResponseTextExtractionFailed(String),
    #[error("empty response body")]
    EmptyBody,
    #[error("failed to parse response: {0}")]
    ResponseParseFailed(String),
}

impl ClientError {
    /// 재시도로 회복될 수 있는 네트워크 오류인지 여부
    pub fn is_transient(&self) -> bool {
        matches!(self, ClientError::RequestFailed(_) | ClientError::ResponseTextExtractionFailed(_))
    }
}

impl From<ClientError> for SearchResult {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::ResponseParseFailed(_) => SearchResult::MalformedResponse,
            _ => SearchResult::TransportFailure,
        }
    }
}

pub trait BookLookup: Send + Sync {
    fn lookup(&self, query: &Query) -> SearchResult;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_query_is_rejected() {
        assert!(Query::new("").is_none());
    }

    #[test]
    fn query_is_not_trimmed() {
        let query = Query::new("  tolkien ").unwrap();
        assert_eq!(query.as_str(), "  tolkien ");
    }

    #[test]
    fn client_errors_collapse_to_coarse_results() {
        assert_eq!(SearchResult::from(ClientError::EmptyBody), SearchResult::TransportFailure);
        assert_eq!(SearchResult::from(ClientError::UnexpectedStatus(503)), SearchResult::TransportFailure);
        assert_eq!(SearchResult::from(ClientError::RequestFailed("reset".into())), SearchResult::TransportFailure);
        assert_eq!(
            SearchResult::from(ClientError::ResponseParseFailed("eof".into())),
            SearchResult::MalformedResponse
        );
    }
}
