use clap::Parser;
use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use tracing::error;
use tracing_appender::non_blocking::WorkerGuard;
use who_wrote_it::configs::{self, logging, AppConfig};
use who_wrote_it::lookup::{LookupService, Submission};
use who_wrote_it::view::ViewState;

/// Google Books에서 검색어에 맞는 첫 번째 도서의 제목과 저자를 찾는다.
#[derive(Debug, Parser)]
#[command(name = "who-wrote-it", version)]
struct Cli {
    /// 검색어. 생략하면 표준 입력에서 한 줄씩 읽어 검색한다.
    query: Option<String>,

    /// 네트워크 연결이 없는 것으로 취급한다.
    #[arg(long)]
    offline: bool,

    #[arg(long)]
    timeout_ms: Option<u64>,

    /// 네트워크 오류 시 재시도 횟수
    #[arg(long)]
    retries: Option<u32>,

    #[arg(long)]
    endpoint: Option<String>,
}

fn main() -> ExitCode {
    configs::load_dotenv();
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("설정을 읽을 수 없습니다: {}", e);
            return ExitCode::from(1);
        }
    };

    let _guard = match init_logging(&config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::from(1);
        }
    };

    let mut service = match who_wrote_it::create_lookup_service(&config) {
        Ok(service) => service,
        Err(e) => {
            error!("검색 서비스를 생성할 수 없습니다. => {}", e);
            return ExitCode::from(1);
        }
    };

    match cli.query {
        Some(query) => {
            let state = search(&mut service, &query, false);
            render(&state);
            exit_code(&state)
        }
        None => interactive(&mut service),
    }
}

fn load_config(cli: &Cli) -> Result<AppConfig, config::ConfigError> {
    let timeout_ms = cli.timeout_ms
        .map(i64::try_from)
        .transpose()
        .map_err(|_| config::ConfigError::Message(format!(
            "--timeout-ms 값이 허용 범위를 벗어났습니다. (최대: {})", i64::MAX
        )))?;

    let mut builder = configs::config_builder()
        .set_override_option("catalog.endpoint", cli.endpoint.clone())?
        .set_override_option("catalog.timeout_ms", timeout_ms)?
        .set_override_option("catalog.retries", cli.retries.map(i64::from))?;

    if cli.offline {
        builder = builder.set_override("connectivity.offline", true)?;
    }

    builder.build()?.try_deserialize()
}

fn init_logging(config: &AppConfig) -> Result<Option<WorkerGuard>, logging::LoggingError> {
    match config.logger() {
        Some(logger) => logging::set_global_logging_config(logger).map(Some),
        None => logging::set_stderr_logging(tracing::Level::WARN).map(|_| None),
    }
}

fn search(service: &mut LookupService, text: &str, show_loading: bool) -> ViewState {
    match service.submit(text) {
        Submission::NoSearchTerm => ViewState::NoSearchTerm,
        Submission::Immediate(result) => result.into(),
        Submission::Started(_) => {
            if show_loading {
                render(&ViewState::Loading);
            }
            service.recv()
                .map(|completion| completion.result.into())
                .unwrap_or(ViewState::Failed)
        }
    }
}

fn interactive(service: &mut LookupService) -> ExitCode {
    let stdin = io::stdin();
    let mut previous: Option<String> = None;

    loop {
        prompt(previous.as_deref());

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                error!("표준 입력을 읽을 수 없습니다. => {}", e);
                return ExitCode::from(1);
            }
        }
        let text = line.trim_end_matches(['\n', '\r']);

        let state = search(service, text, true);
        render(&state);

        previous = if state.clears_input() || text.is_empty() {
            None
        } else {
            Some(text.to_owned())
        };
    }

    ExitCode::SUCCESS
}

fn prompt(previous: Option<&str>) {
    let mut stdout = io::stdout();
    let _ = match previous {
        Some(text) => write!(stdout, "[{}] > ", text),
        None => write!(stdout, "> "),
    };
    let _ = stdout.flush();
}

fn render(state: &ViewState) {
    println!("{}", state.title_line());
    if !state.author_line().is_empty() {
        println!("{}", state.author_line());
    }
}

fn exit_code(state: &ViewState) -> ExitCode {
    match state {
        ViewState::Book { .. } | ViewState::NoResults => ExitCode::SUCCESS,
        ViewState::NoSearchTerm => ExitCode::from(2),
        ViewState::Loading | ViewState::NoNetwork | ViewState::Failed => ExitCode::from(1),
    }
}
