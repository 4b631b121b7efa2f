use tracing::Level;
use tracing_appender::non_blocking::{NonBlocking, NonBlockingBuilder, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

use crate::infra::config::AppConfig;

/// Keeps the background log writers alive; drop it only on shutdown.
pub struct LogGuards {
    _errors: WorkerGuard,
    _events: WorkerGuard,
}

fn file_writer(log_path: &str, prefix: &str) -> anyhow::Result<(NonBlocking, WorkerGuard)> {
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(prefix)
        .filename_suffix("jsonl")
        .build(log_path)?;
    Ok(NonBlockingBuilder::default()
        .lossy(false)
        .buffered_lines_limit(1)
        .finish(appender))
}

fn json_layer<S, F>(writer: NonBlocking, keep: F) -> impl Layer<S>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    F: Fn(&Level) -> bool + Send + Sync + 'static,
{
    fmt::layer()
        .json()
        .with_current_span(true)
        .with_writer(writer)
        .with_filter(filter_fn(move |metadata| keep(metadata.level())))
}

fn console_layer<S>() -> impl Layer<S>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,userhub_backend=debug,sqlx=warn"));
    fmt::layer().with_filter(filter)
}

/// Errors go to `err_logs.*.jsonl`, info and warn to `app_logs.*.jsonl`,
/// everything allowed by `RUST_LOG` to the console.
pub fn init_tracing(config: &AppConfig) -> anyhow::Result<LogGuards> {
    let log_path = &config.logger.log_path;
    let (error_writer, error_guard) = file_writer(log_path, "err_logs")?;
    let (event_writer, event_guard) = file_writer(log_path, "app_logs")?;

    tracing_subscriber::registry()
        .with(json_layer(error_writer, |level| *level == Level::ERROR))
        .with(json_layer(event_writer, |level| {
            *level == Level::INFO || *level == Level::WARN
        }))
        .with(console_layer())
        .try_init()?;

    Ok(LogGuards {
        _errors: error_guard,
        _events: event_guard,
    })
}
