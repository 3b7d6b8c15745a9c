use crate::configs::AppConfig;
use crate::connectivity::{Connectivity, Fixed, TcpProbe};
use crate::lookup::LookupService;
use crate::provider::ClientError;
use std::sync::Arc;

pub mod configs;
pub mod connectivity;
pub mod lookup;
pub mod provider;
pub mod view;

/// 설정에 따라 Google Books 클라이언트와 연결 확인기를 갖춘 검색 서비스를 만든다.
pub fn create_lookup_service(config: &AppConfig) -> Result<LookupService, ClientError> {
    let client = provider::google::Client::from_config(config.catalog())?;
    let connectivity = create_connectivity(config);

    Ok(LookupService::new(Arc::new(client), connectivity))
}

fn create_connectivity(config: &AppConfig) -> Arc<dyn Connectivity> {
    if config.connectivity().offline() {
        return Arc::new(Fixed(false));
    }

    let endpoint = config.catalog().endpoint();
    match TcpProbe::for_endpoint(endpoint, config.connectivity().probe_timeout()) {
        Some(probe) => Arc::new(probe),
        // 호스트를 알 수 없는 주소는 요청 단계에서 실패로 보고 된다.
        None => Arc::new(Fixed(true)),
    }
}
