use crate::connectivity::Connectivity;
use crate::provider::{BookLookup, Query, SearchResult};
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

pub type RequestId = u64;

/// 검색 요청 결과. 요청이 실제로 시작 되었는지 여부를 구분한다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// 검색어가 비어 있어 요청하지 않음
    NoSearchTerm,
    /// 작업을 시작하지 못해 바로 결정된 결과
    Immediate(SearchResult),
    /// 백그라운드에서 요청이 시작됨
    Started(RequestId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub id: RequestId,
    pub result: SearchResult,
}

/// 도서 검색을 백그라운드 스레드에서 실행하고 결과를 채널로 전달한다.
///
/// 가장 마지막에 시작한 요청만 유효하며, 이전 요청이나 취소된 요청의 결과는
/// 도착하더라도 버려진다.
pub struct LookupService {
    lookup: Arc<dyn BookLookup>,
    connectivity: Arc<dyn Connectivity>,
    sender: Sender<Completion>,
    receiver: Receiver<Completion>,
    next_id: RequestId,
    current: Option<RequestId>,
}

impl LookupService {
    pub fn new(lookup: Arc<dyn BookLookup>, connectivity: Arc<dyn Connectivity>) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            lookup,
            connectivity,
            sender,
            receiver,
            next_id: 1,
            current: None,
        }
    }

    pub fn submit(&mut self, text: &str) -> Submission {
        let Some(query) = Query::new(text) else {
            return Submission::NoSearchTerm;
        };

        let id = self.next_id;
        self.next_id += 1;
        if let Some(previous) = self.current.replace(id) {
            debug!("이전 요청을 대체 합니다. (previous: {}, current: {})", previous, id);
        }

        let lookup = Arc::clone(&self.lookup);
        let connectivity = Arc::clone(&self.connectivity);
        let sender = self.sender.clone();
        let spawned = thread::Builder::new()
            .name(format!("book-lookup-{}", id))
            .spawn(move || run(id, query, lookup, connectivity, sender));

        match spawned {
            Ok(_) => Submission::Started(id),
            Err(e) => {
                error!("검색 작업을 시작할 수 없습니다. (id: {}, ERROR: {})", id, e);
                self.current = None;
                Submission::Immediate(SearchResult::TransportFailure)
            }
        }
    }

    /// 진행 중인 요청을 무효화 한다. 이후 도착하는 결과는 버려진다.
    pub fn cancel(&mut self) -> Option<RequestId> {
        let cancelled = self.current.take();
        if let Some(id) = cancelled {
            debug!("요청을 취소 합니다. (id: {})", id);
        }
        cancelled
    }

    pub fn pending(&self) -> Option<RequestId> {
        self.current
    }

    /// 현재 요청의 결과가 도착할 때까지 기다린다. 진행 중인 요청이 없으면 `None`.
    pub fn recv(&mut self) -> Option<Completion> {
        while let Some(current) = self.current {
            // self가 sender를 가지고 있으므로 채널이 끊기지 않는다.
            let completion = self.receiver.recv().ok()?;
            if completion.id == current {
                self.current = None;
                return Some(completion);
            }
            discard(&completion);
        }
        None
    }

    pub fn recv_timeout(&mut self, timeout: Duration) -> Option<Completion> {
        let deadline = Instant::now() + timeout;
        while let Some(current) = self.current {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.receiver.recv_timeout(remaining) {
                Ok(completion) if completion.id == current => {
                    self.current = None;
                    return Some(completion);
                }
                Ok(completion) => discard(&completion),
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => return None,
            }
        }
        None
    }

    pub fn try_recv(&mut self) -> Option<Completion> {
        while let Some(current) = self.current {
            match self.receiver.try_recv() {
                Ok(completion) if completion.id == current => {
                    self.current = None;
                    return Some(completion);
                }
                Ok(completion) => discard(&completion),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => return None,
            }
        }
        None
    }
}

/// 연결 확인도 작업 스레드에서 수행하므로 호출자는 네트워크 때문에 대기하지 않는다.
fn run(
    id: RequestId,
    query: Query,
    lookup: Arc<dyn BookLookup>,
    connectivity: Arc<dyn Connectivity>,
    sender: Sender<Completion>,
) {
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        if connectivity.is_connected() {
            lookup.lookup(&query)
        } else {
            info!("네트워크에 연결 되어 있지 않아 검색하지 않습니다. (id: {}, QUERY: {})", id, query.as_str());
            SearchResult::NoConnectivity
        }
    }))
        .unwrap_or_else(|_| {
            error!("검색 작업 중 패닉이 발생 하였습니다. (id: {}, QUERY: {})", id, query.as_str());
            SearchResult::TransportFailure
        });

    if sender.send(Completion { id, result }).is_err() {
        debug!("결과를 받을 대상이 없어 버립니다. (id: {})", id);
    }
}

fn discard(completion: &Completion) {
    debug!("만료된 요청의 결과를 버립니다. (id: {}, result: {:?})", completion.id, completion.result);
}
