use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};
use who_wrote_it::connectivity::{Connectivity, Fixed};
use who_wrote_it::lookup::{LookupService, Submission};
use who_wrote_it::provider::{BookLookup, Query, SearchResult};

const WAIT: Duration = Duration::from_secs(5);

/// "slow" 검색어는 gate가 열릴 때까지 대기하고, 나머지는 검색어를 제목으로 돌려준다.
struct Scripted {
    calls: Mutex<Vec<String>>,
    gate: Mutex<Option<Receiver<()>>>,
}

impl Scripted {
    fn new() -> (Arc<Self>, Sender<()>) {
        let (open, gate) = mpsc::channel();
        let lookup = Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            gate: Mutex::new(Some(gate)),
        });
        (lookup, open)
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl BookLookup for Scripted {
    fn lookup(&self, query: &Query) -> SearchResult {
        self.calls.lock().unwrap().push(query.as_str().to_owned());

        if query.as_str() == "slow" {
            let gate = self.gate.lock().unwrap().take();
            if let Some(gate) = gate {
                let _ = gate.recv();
            }
        }

        SearchResult::Found {
            title: query.as_str().to_owned(),
            author: "someone".to_owned(),
        }
    }
}

/// 연결 확인에 시간이 걸리는 네트워크
struct SlowConnectivity(Duration);

impl Connectivity for SlowConnectivity {
    fn is_connected(&self) -> bool {
        thread::sleep(self.0);
        true
    }
}

struct Panicking;

impl BookLookup for Panicking {
    fn lookup(&self, _query: &Query) -> SearchResult {
        panic!("lookup exploded");
    }
}

fn started(submission: Submission) -> u64 {
    match submission {
        Submission::Started(id) => id,
        other => panic!("expected a started lookup, got {:?}", other),
    }
}

fn title_of(result: &SearchResult) -> &str {
    match result {
        SearchResult::Found { title, .. } => title,
        other => panic!("expected Found, got {:?}", other),
    }
}

#[test]
fn empty_query_never_invokes_lookup() {
    let (lookup, _open) = Scripted::new();
    let mut service = LookupService::new(lookup.clone(), Arc::new(Fixed(true)));

    assert_eq!(service.submit(""), Submission::NoSearchTerm);
    assert_eq!(service.pending(), None);
    assert!(lookup.calls().is_empty());
}

#[test]
fn offline_reports_no_connectivity_without_invoking_lookup() {
    let (lookup, _open) = Scripted::new();
    let mut service = LookupService::new(lookup.clone(), Arc::new(Fixed(false)));

    let id = started(service.submit("tolkien"));
    let completion = service.recv_timeout(WAIT).expect("completion");

    assert_eq!(completion.id, id);
    assert_eq!(completion.result, SearchResult::NoConnectivity);
    assert!(lookup.calls().is_empty());
}

#[test]
fn slow_connectivity_check_does_not_block_submit() {
    let (lookup, _open) = Scripted::new();
    let connectivity = Arc::new(SlowConnectivity(Duration::from_secs(2)));
    let mut service = LookupService::new(lookup.clone(), connectivity);

    let before = Instant::now();
    let id = started(service.submit("tolkien"));
    assert!(before.elapsed() < Duration::from_millis(500), "submit waited on the connectivity check");

    let completion = service.recv_timeout(WAIT).expect("completion");
    assert_eq!(completion.id, id);
    assert_eq!(title_of(&completion.result), "tolkien");
}

#[test]
fn started_lookup_is_delivered_once() {
    let (lookup, _open) = Scripted::new();
    let mut service = LookupService::new(lookup.clone(), Arc::new(Fixed(true)));

    let id = started(service.submit("tolkien"));
    let completion = service.recv_timeout(WAIT).expect("completion");

    assert_eq!(completion.id, id);
    assert_eq!(title_of(&completion.result), "tolkien");
    assert_eq!(service.pending(), None);
    assert_eq!(service.try_recv(), None);
    assert_eq!(lookup.calls(), vec!["tolkien".to_owned()]);
}

#[test]
fn whitespace_query_is_passed_untrimmed() {
    let (lookup, _open) = Scripted::new();
    let mut service = LookupService::new(lookup.clone(), Arc::new(Fixed(true)));

    started(service.submit("  dune "));
    let completion = service.recv_timeout(WAIT).expect("completion");

    assert_eq!(title_of(&completion.result), "  dune ");
}

#[test]
fn superseded_lookup_result_is_discarded() {
    let (lookup, open) = Scripted::new();
    let mut service = LookupService::new(lookup.clone(), Arc::new(Fixed(true)));

    let stale = started(service.submit("slow"));
    let current = started(service.submit("fast"));
    assert!(current > stale);

    let completion = service.recv_timeout(WAIT).expect("completion");
    assert_eq!(completion.id, current);
    assert_eq!(title_of(&completion.result), "fast");

    open.send(()).unwrap();
    let next = started(service.submit("next"));
    let completion = service.recv_timeout(WAIT).expect("completion");
    assert_eq!(completion.id, next);
    assert_eq!(title_of(&completion.result), "next");
}

#[test]
fn cancelled_lookup_is_never_delivered() {
    let (lookup, open) = Scripted::new();
    let mut service = LookupService::new(lookup.clone(), Arc::new(Fixed(true)));

    let id = started(service.submit("slow"));
    assert_eq!(service.cancel(), Some(id));
    assert_eq!(service.pending(), None);

    open.send(()).unwrap();
    assert_eq!(service.recv(), None);
    assert_eq!(service.recv_timeout(Duration::from_millis(200)), None);
}

#[test]
fn dropped_service_discards_result_without_panicking() {
    let (lookup, open) = Scripted::new();
    let mut service = LookupService::new(lookup.clone(), Arc::new(Fixed(true)));

    started(service.submit("slow"));
    drop(service);
    open.send(()).unwrap();

    // 작업 스레드가 끝나면 lookup 참조가 하나만 남는다.
    let deadline = Instant::now() + WAIT;
    while Arc::strong_count(&lookup) > 1 {
        assert!(Instant::now() < deadline, "worker did not finish");
        thread::sleep(Duration::from_millis(10));
    }
    assert_eq!(lookup.calls(), vec!["slow".to_owned()]);
}

#[test]
fn panicking_lookup_is_reported_as_transport_failure() {
    let mut service = LookupService::new(Arc::new(Panicking), Arc::new(Fixed(true)));

    let id = started(service.submit("boom"));
    let completion = service.recv_timeout(WAIT).expect("completion");

    assert_eq!(completion.id, id);
    assert_eq!(completion.result, SearchResult::TransportFailure);
}
