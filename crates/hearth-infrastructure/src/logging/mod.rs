//! Process-wide logging.
//!
//! Records go to a daily-rolling file as one JSON object per line; debug
//! builds also print a human-readable stream to stdout. `log` records are
//! forwarded into `tracing`, so both macro families end up in the same
//! sinks.

use log::LevelFilter;
use std::path::PathBuf;
use std::sync::OnceLock;
use serde_json::{json, Map, Value};
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_log::LogTracer;
use tracing_subscriber::fmt::{format::Writer, FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Layer, Registry};

const LOG_FILE_PREFIX: &str = "hearth.log";

static LOG_DIR: OnceLock<PathBuf> = OnceLock::new();
static LOGGER_READY: OnceLock<()> = OnceLock::new();
static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Install the global subscriber. Later calls are no-ops.
pub fn init_logger(log_dir: PathBuf) -> anyhow::Result<()> {
    if LOGGER_READY.get().is_some() {
        return Ok(());
    }

    std::fs::create_dir_all(&log_dir)?;
    let _ = LOG_DIR.set(log_dir.clone());

    let _ = LogTracer::builder()
        .with_max_level(LevelFilter::Trace)
        .init();

    let file_appender = rolling::daily(&log_dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let _ = FILE_GUARD.set(guard);

    let json_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .event_format(JsonLineFormatter::new())
        .with_filter(file_filter());

    let stdout_layer = if cfg!(debug_assertions) {
        Some(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_thread_ids(true)
                .with_ansi(true)
                .with_timer(fmt::time::ChronoLocal::new(
                    "%Y-%m-%d %H:%M:%S%.3f".to_string(),
                ))
                .with_filter(stdout_filter()),
        )
    } else {
        None
    };

    let subscriber = Registry::default().with(json_layer).with(stdout_layer);

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set global subscriber: {}", e))?;

    let _ = LOGGER_READY.set(());

    tracing::info!(
        target: "hearth::logging",
        log_dir = %log_dir.display(),
        version = env!("CARGO_PKG_VERSION"),
        profile = if cfg!(debug_assertions) { "debug" } else { "release" },
        "Logger initialized"
    );

    Ok(())
}

/// `RUST_LOG` wins; otherwise INFO in release and DEBUG (TRACE for our
/// crates) in debug builds.
fn file_filter() -> EnvFilter {
    let default_level = if cfg!(debug_assertions) {
        "debug,hearth=trace,hearth_domain=trace,hearth_infrastructure=trace,hearth_app=trace"
    } else {
        "info"
    };

    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

fn stdout_filter() -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("debug,sqlx=warn"))
        .unwrap_or_else(|_| EnvFilter::new("debug"))
}

/// Directory passed to [`init_logger`], once initialised.
pub fn get_log_dir() -> Option<PathBuf> {
    LOG_DIR.get().cloned()
}

/// One JSON object per line. A `user_id` field is lifted to the top level
/// so a single user's history can be filtered without parsing `fields`.
struct JsonLineFormatter {
    pid: u32,
}

impl JsonLineFormatter {
    fn new() -> Self {
        Self {
            pid: std::process::id(),
        }
    }

    fn record(&self, metadata: &tracing::Metadata<'_>, fields: FieldCollector) -> Value {
        let mut record = json!({
            "timestamp": chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z").to_string(),
            "level": metadata.level().to_string(),
            "target": metadata.target(),
            "pid": self.pid,
        });

        if let (Some(file), Some(line)) = (metadata.file(), metadata.line()) {
            record["source"] = json!(format!("{}:{}", file, line));
        }
        if let (Value::Object(header), Value::Object(body)) = (&mut record, lift(fields)) {
            header.extend(body);
        }
        record
    }
}

fn lift(mut fields: FieldCollector) -> Value {
    let mut body = Map::new();
    for key in ["message", "user_id"] {
        if let Some(value) = fields.0.remove(key) {
            body.insert(key.to_string(), value);
        }
    }
    if !fields.0.is_empty() {
        body.insert("fields".to_string(), Value::Object(fields.0));
    }
    Value::Object(body)
}

impl<S, N> FormatEvent<S, N> for JsonLineFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let mut fields = FieldCollector::default();
        event.record(&mut fields);
        writeln!(writer, "{}", self.record(event.metadata(), fields))
    }
}

#[derive(Default)]
struct FieldCollector(Map<String, Value>);

impl FieldCollector {
    fn put(&mut self, field: &Field, value: Value) {
        self.0.insert(field.name().to_string(), value);
    }
}

impl Visit for FieldCollector {
    fn record_i64(&mut self, field: &Field, value: i64) {
        self.put(field, json!(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.put(field, json!(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.put(field, json!(value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.put(field, json!(value));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.put(field, json!(format!("{:?}", value)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logger_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();

        init_logger(dir.path().to_path_buf()).unwrap();
        init_logger(dir.path().join("ignored")).unwrap();

        assert_eq!(get_log_dir(), Some(dir.path().to_path_buf()));
    }

    #[test]
    fn test_user_id_is_lifted_out_of_fields() {
        let mut fields = FieldCollector::default();
        fields.0.insert("message".to_string(), json!("Ledger entry written"));
        fields.0.insert("user_id".to_string(), json!("alice"));
        fields.0.insert("date".to_string(), json!("2024-01-05"));

        let value = lift(fields);

        assert_eq!(value["user_id"], json!("alice"));
        assert_eq!(value["message"], json!("Ledger entry written"));
        assert_eq!(value["fields"], json!({ "date": "2024-01-05" }));
    }
}
