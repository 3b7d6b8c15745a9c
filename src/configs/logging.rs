use serde::Deserialize;
use thiserror::Error;
use time::macros::format_description;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::fmt::writer::MakeWriterExt;

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("로그 레벨(level)은 TRACE, DEBUG, INFO, WARN, ERROR만 가능 합니다. (입력값: {0})")]
    InvalidLevel(String),
    #[error("로깅 파일 로테이션(rotation)은 DAILY, HOURLY, MINUTELY, NEVER만 가능 합니다. (입력값: {0})")]
    InvalidRotation(String),
    #[error("로그 파일을 생성할 수 없습니다: {0}")]
    Appender(String),
    #[error("로거를 초기화 할 수 없습니다: {0}")]
    Init(String),
}

#[derive(Debug, Deserialize)]
pub struct Config {
    dir: String,
    name: String,

    /// 최대 로그 파일 개수로 로그 파일이 설정한 개수보다 커질 경우 기존의 로그파일들은 삭제 된다.
    /// 설정 되지 않을 시 로그 파일은 삭제 되지 않는다.
    keep: Option<usize>,

    /// 파일과 stdout에 출력할 로그의 레벨로 지정된 로그 레벨 이상만 로깅된다.
    /// 설정하지 않을시 기본값은 DEBUG로 설정 된다.
    level: Option<String>,

    /// 로깅 파일이 분리 되는 기간으로 설정 되지 않을시 기본값은 DAILY로 설정된다.
    rotation: Option<String>
}

/// 전역 로거를 설정한다. 반환된 guard가 살아 있는 동안만 파일에 기록 된다.
pub fn set_global_logging_config(c: &Config) -> Result<WorkerGuard, LoggingError> {
    let level = match &c.level {
        Some(level) => parse_level(level)?,
        None => tracing::Level::DEBUG,
    };

    let file_appender = build_file_appender(c)?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let writer = std::io::stdout.and(non_blocking);

    tracing_subscriber::fmt()
        .json()
        .with_file(true)
        .with_line_number(true)
        .with_current_span(true)
        .with_span_list(true)
        .with_timer(LocalTime::new(format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]")))
        .with_writer(writer)
        .with_max_level(level)
        .try_init()
        .map_err(|e| LoggingError::Init(e.to_string()))?;

    Ok(guard)
}

/// 로거 설정이 없을 때 사용하는 stderr 로거로 검색 결과 출력과 섞이지 않게 한다.
pub fn set_stderr_logging(level: tracing::Level) -> Result<(), LoggingError> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .try_init()
        .map_err(|e| LoggingError::Init(e.to_string()))
}

fn build_file_appender(c: &Config) -> Result<rolling::RollingFileAppender, LoggingError> {
    let rotation = match &c.rotation {
        Some(rotation) => parse_rotation(rotation)?,
        None => rolling::Rotation::DAILY,
    };

    let mut builder = rolling::RollingFileAppender::builder()
        .filename_prefix(c.name.clone())
        .filename_suffix("log")
        .rotation(rotation);

    if let Some(keep) = c.keep {
        builder = builder.max_log_files(keep);
    }

    builder.build(c.dir.clone())
        .map_err(|e| LoggingError::Appender(e.to_string()))
}

fn parse_rotation(s: &str) -> Result<rolling::Rotation, LoggingError> {
    match s {
        "DAILY" => Ok(rolling::Rotation::DAILY),
        "HOURLY" => Ok(rolling::Rotation::HOURLY),
        "MINUTELY" => Ok(rolling::Rotation::MINUTELY),
        "NEVER" => Ok(rolling::Rotation::NEVER),
        _ => Err(LoggingError::InvalidRotation(s.to_owned())),
    }
}

pub fn parse_level(l: &str) -> Result<tracing::Level, LoggingError> {
    match l {
        "TRACE" => Ok(tracing::Level::TRACE),
        "DEBUG" => Ok(tracing::Level::DEBUG),
        "INFO" => Ok(tracing::Level::INFO),
        "WARN" => Ok(tracing::Level::WARN),
        "ERROR" => Ok(tracing::Level::ERROR),
        _ => Err(LoggingError::InvalidLevel(l.to_owned())),
    }
}
