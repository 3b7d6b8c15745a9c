use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;
use tracing::debug;

/// 검색 요청 전에 호출자가 확인하는 네트워크 연결 상태
pub trait Connectivity: Send + Sync {
    fn is_connected(&self) -> bool;
}

/// 항상 같은 값을 돌려주는 연결 상태 (`--offline` 등에서 사용)
#[derive(Debug, Clone, Copy)]
pub struct Fixed(pub bool);

impl Connectivity for Fixed {
    fn is_connected(&self) -> bool {
        self.0
    }
}

/// 카탈로그 호스트로 TCP 연결을 시도해 연결 상태를 확인한다.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    host: String,
    port: u16,
    timeout: Duration,
}

impl TcpProbe {
    pub fn new(host: impl Into<String>, port: u16, timeout: Duration) -> Self {
        Self { host: host.into(), port, timeout }
    }

    /// 엔드포인트 URL의 호스트와 포트를 대상으로 한다.
    pub fn for_endpoint(endpoint: &str, timeout: Duration) -> Option<Self> {
        let url = reqwest::Url::parse(endpoint).ok()?;
        let host = url.host_str()?.to_owned();
        let port = url.port_or_known_default()?;
        Some(Self::new(host, port, timeout))
    }
}

impl Connectivity for TcpProbe {
    fn is_connected(&self) -> bool {
        let addrs = match (self.host.as_str(), self.port).to_socket_addrs() {
            Ok(addrs) => addrs,
            Err(e) => {
                debug!("호스트 주소를 확인할 수 없습니다. (host: {}, ERROR: {})", self.host, e);
                return false;
            }
        };

        addrs.into_iter()
            .any(|addr| TcpStream::connect_timeout(&addr, self.timeout).is_ok())
    }
}
