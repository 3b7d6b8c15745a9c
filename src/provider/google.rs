use crate::configs::CatalogConfig;
use crate::provider::{BookLookup, ClientError, Query, SearchResult};
use serde::Deserialize;
use serde_json::Value;
use std::thread;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Google Books 도서 검색 API 엔드포인트 URL
pub const BOOK_SEARCH_ENDPOINT: &'static str = "https://www.googleapis.com/books/v1/volumes";

const MAX_RESULTS: &'static str = "10";
const PRINT_TYPE: &'static str = "books";

/// API 응답 중 사용하는 부분만 정의한 구조체
///
/// `items`가 없으면 역직렬화에 실패하며 이는 잘못된 응답으로 취급 된다.
/// 각 항목은 개별적으로 해석해야 하므로 [`Value`] 그대로 보관한다.
#[derive(Debug, Deserialize)]
pub struct Response {
    pub items: Vec<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub volume_info: Option<VolumeInfo>,
}

#[derive(Debug, Deserialize)]
pub struct VolumeInfo {
    pub title: Option<Value>,
    pub authors: Option<Value>,
}

impl Item {
    /// 제목과 저자가 모두 있을 때만 값을 돌려준다.
    fn title_and_author(&self) -> Option<(String, String)> {
        let info = self.volume_info.as_ref()?;
        let title = info.title.as_ref().and_then(to_text)?;
        let author = info.authors.as_ref().and_then(to_text)?;
        Some((title, author))
    }
}

/// 문자열은 그대로, 그 밖의 값(저자 배열 등)은 JSON 표현 그대로 사용한다.
fn to_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// 응답 본문에서 제목과 저자가 모두 있는 첫 번째 도서를 찾는다.
pub fn find_first_book(body: &str) -> Result<Option<(String, String)>, ClientError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| ClientError::ResponseParseFailed(e.to_string()))?;
    if !value.is_object() {
        return Err(ClientError::ResponseParseFailed("top level is not an object".to_owned()));
    }
    let response: Response = serde_json::from_value(value)
        .map_err(|e| ClientError::ResponseParseFailed(e.to_string()))?;

    let found = response.items.into_iter()
        .enumerate()
        .find_map(|(index, raw)| {
            match serde_json::from_value::<Item>(raw) {
                Ok(item) => {
                    let pair = item.title_and_author();
                    if pair.is_none() {
                        debug!("제목 또는 저자가 없는 항목을 건너뜁니다. (index: {})", index);
                    }
                    pair
                }
                Err(e) => {
                    debug!("해석할 수 없는 항목을 건너뜁니다. (index: {}, ERROR: {})", index, e);
                    None
                }
            }
        });

    Ok(found)
}

pub fn build_search_url(endpoint: &str, query: &Query) -> Result<reqwest::Url, ClientError> {
    let mut url = reqwest::Url::parse(endpoint)
        .map_err(|e| ClientError::InvalidBaseUrl(format!("{}: {}", endpoint, e)))?;

    url.query_pairs_mut()
        .append_pair("q", query.as_str())
        .append_pair("maxResults", MAX_RESULTS)
        .append_pair("printType", PRINT_TYPE);

    Ok(url)
}

/// Google Books API 클라이언트
pub struct Client {
    endpoint: String,
    http: reqwest::blocking::Client,
    retries: u32,
    backoff: Duration,
}

impl Client {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::RequestFailed(e.to_string()))?;

        Ok(Self {
            endpoint: endpoint.to_owned(),
            http,
            retries: 0,
            backoff: Duration::ZERO,
        })
    }

    pub fn from_config(config: &CatalogConfig) -> Result<Self, ClientError> {
        Ok(Self::new(config.endpoint(), config.timeout())?
            .with_retry(config.retries(), config.backoff()))
    }

    /// 네트워크 오류에 한해 `retries`번까지 지수 백오프로 재시도 한다.
    /// 기본값은 재시도 없음.
    pub fn with_retry(mut self, retries: u32, backoff: Duration) -> Self {
        self.retries = retries;
        self.backoff = backoff;
        self
    }

    pub fn search(&self, query: &Query) -> Result<Option<(String, String)>, ClientError> {
        let url = build_search_url(&self.endpoint, query)?;
        let body = self.fetch(&url)?;
        find_first_book(&body)
    }

    fn fetch(&self, url: &reqwest::Url) -> Result<String, ClientError> {
        let mut attempt = 0;
        loop {
            match self.fetch_once(url) {
                Err(e) if e.is_transient() && attempt < self.retries => {
                    let delay = self.backoff.saturating_mul(2u32.saturating_pow(attempt));
                    warn!("도서 검색 요청을 재시도 합니다. (attempt: {}, delay: {:?}, ERROR: {})", attempt + 1, delay, e);
                    thread::sleep(delay);
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    fn fetch_once(&self, url: &reqwest::Url) -> Result<String, ClientError> {
        let response = self.http.get(url.clone())
            .send()
            .map_err(|e| ClientError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::UnexpectedStatus(status.as_u16()));
        }

        let text = response.text()
            .map_err(|e| ClientError::ResponseTextExtractionFailed(e.to_string()))?;
        if text.trim().is_empty() {
            return Err(ClientError::EmptyBody);
        }

        Ok(text)
    }
}

impl BookLookup for Client {
    fn lookup(&self, query: &Query) -> SearchResult {
        match self.search(query) {
            Ok(Some((title, author))) => SearchResult::Found { title, author },
            Ok(None) => SearchResult::NotFound,
            Err(e) => {
                error!("QUERY: {}, ERROR: {}", query.as_str(), e);
                e.into()
            }
        }
    }
}
