use config::builder::DefaultState;
use config::ConfigBuilder;
use serde::Deserialize;
use serde_with::{serde_as, DurationMilliSeconds};
use std::env;
use std::time::Duration;

use crate::provider::google::BOOK_SEARCH_ENDPOINT;

pub mod logging;

const ENV_PREFIX: &'static str = "WHO_WROTE_IT";

/// 실행 환경에 따라 .env 파일을 로드한다.
pub fn load_dotenv() {
    let env_filename = env::var("RUN_MODE")
        .map(|env| format!(".env.{}", env))
        .unwrap_or_else(|_| ".env".into());

    dotenvy::from_filename(env_filename).ok();
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    catalog: CatalogConfig,
    connectivity: ConnectivityConfig,
    logger: Option<logging::Config>,
}

impl AppConfig {
    pub fn catalog(&self) -> &CatalogConfig {
        &self.catalog
    }

    pub fn connectivity(&self) -> &ConnectivityConfig {
        &self.connectivity
    }

    pub fn logger(&self) -> Option<&logging::Config> {
        self.logger.as_ref()
    }
}

/// 도서 검색 API 호출 설정
#[serde_as]
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    endpoint: String,

    /// 요청 하나에 대한 전체 제한 시간 (밀리초)
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    timeout_ms: Duration,

    /// 네트워크 오류 시 재시도 횟수로 기본값은 0(재시도 없음)이다.
    retries: u32,

    /// 첫 재시도 전 대기 시간으로 재시도 마다 두 배가 된다.
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    backoff_ms: Duration,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            endpoint: BOOK_SEARCH_ENDPOINT.to_owned(),
            timeout_ms: Duration::from_secs(10),
            retries: 0,
            backoff_ms: Duration::from_millis(500),
        }
    }
}

impl CatalogConfig {
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn timeout(&self) -> Duration {
        self.timeout_ms
    }

    pub fn retries(&self) -> u32 {
        self.retries
    }

    pub fn backoff(&self) -> Duration {
        self.backoff_ms
    }
}

#[serde_as]
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ConnectivityConfig {
    /// 연결 확인을 건너뛰고 항상 오프라인으로 취급한다.
    offline: bool,

    #[serde_as(as = "DurationMilliSeconds<u64>")]
    probe_timeout_ms: Duration,
}

impl Default for ConnectivityConfig {
    fn default() -> Self {
        Self {
            offline: false,
            probe_timeout_ms: Duration::from_secs(2),
        }
    }
}

impl ConnectivityConfig {
    pub fn offline(&self) -> bool {
        self.offline
    }

    pub fn probe_timeout(&self) -> Duration {
        self.probe_timeout_ms
    }
}

/// 설정 파일(`config/{RUN_MODE}.json`)과 환경 변수를 읽는 빌더를 만든다.
///
/// 환경 변수는 `WHO_WROTE_IT__CATALOG__TIMEOUT_MS`처럼 `__`로 구분한다.
/// 반환된 빌더에 명령행 인자 등을 덮어쓸 수 있다.
pub fn config_builder() -> ConfigBuilder<DefaultState> {
    let env = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
    config::Config::builder()
        .add_source(config::File::with_name(&format!("config/{}.json", env)).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true)
        )
}
