use crate::config::config::LoggingConfig;
use chrono::Local;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};
use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;

/// Tracing targets used by the console. Each names one area of activity the
/// host can show or filter on.
pub mod targets {
    /// Column lists, record types and source switches
    pub const SCHEMA: &str = "schema";
    /// Keyword and similarity dispatch
    pub const SEARCH: &str = "search";
    /// Spreadsheet and manual-row staging
    pub const IMPORT: &str = "import";
    pub const COLUMNS: &str = "columns";
    /// CSV export and the analysis hand-off
    pub const EXPORT: &str = "export";
    /// Redaction and the sensitive-word dictionary
    pub const ANONYMIZE: &str = "anonymize";
    /// Raw HTTP traffic with the record server
    pub const API: &str = "api";
    pub const SYSTEM: &str = "system";

    pub const ALL: [&str; 8] = [SCHEMA, SEARCH, IMPORT, COLUMNS, EXPORT, ANONYMIZE, API, SYSTEM];

    /// Bucket for lines from other crates (reqwest, hyper) or without a target
    pub const OTHER: &str = "other";
}

/// One captured log line
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: String,
    pub level: Level,
    pub target: &'static str,
    pub message: String,
}

impl LogEntry {
    pub fn new(level: Level, target: &str, message: String) -> Self {
        Self {
            timestamp: Local::now().format("%H:%M:%S.%3f").to_string(),
            level,
            target: console_target(target),
            message,
        }
    }

    /// Single line for the host's activity pane
    pub fn format_for_display(&self) -> String {
        format!(
            "[{}] {:<5} [{}] {}",
            self.timestamp, self.level, self.target, self.message
        )
    }
}

/// Map a tracing target onto one of [`targets::ALL`], or [`targets::OTHER`]
fn console_target(target: &str) -> &'static str {
    targets::ALL
        .iter()
        .find(|&&t| t == target)
        .copied()
        .unwrap_or(targets::OTHER)
}

/// Bounded in-memory log shared between the subscriber and the host
#[derive(Clone)]
pub struct LogRingBuffer {
    entries: Arc<Mutex<VecDeque<LogEntry>>>,
    capacity: usize,
}

impl LogRingBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    // A panic while logging must not take the buffer down with it
    fn lock(&self) -> MutexGuard<'_, VecDeque<LogEntry>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn push(&self, entry: LogEntry) {
        let mut entries = self.lock();
        if entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    /// Last `count` entries, oldest first
    pub fn get_recent(&self, count: usize) -> Vec<LogEntry> {
        let entries = self.lock();
        let skip = entries.len().saturating_sub(count);
        entries.iter().skip(skip).cloned().collect()
    }

    /// Last `count` entries logged under `target`, oldest first
    pub fn recent_for(&self, target: &str, count: usize) -> Vec<LogEntry> {
        let entries = self.lock();
        let mut matching: Vec<LogEntry> = entries
            .iter()
            .rev()
            .filter(|e| e.target == target)
            .take(count)
            .cloned()
            .collect();
        matching.reverse();
        matching
    }

    /// Entries at `level` or more severe
    pub fn at_least(&self, level: Level) -> Vec<LogEntry> {
        self.lock()
            .iter()
            .filter(|e| e.level <= level)
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

/// Split a compact-format line ("LEVEL target: message") into an entry
fn parse_line(line: &str) -> LogEntry {
    let levels = [
        ("TRACE ", Level::TRACE),
        ("DEBUG ", Level::DEBUG),
        (" INFO ", Level::INFO),
        ("INFO ", Level::INFO),
        (" WARN ", Level::WARN),
        ("WARN ", Level::WARN),
        ("ERROR ", Level::ERROR),
    ];
    let Some((level, rest)) = levels
        .iter()
        .find_map(|(prefix, level)| line.strip_prefix(prefix).map(|rest| (*level, rest)))
    else {
        return LogEntry::new(Level::INFO, targets::OTHER, line.to_string());
    };

    match rest.split_once(": ") {
        Some((target, msg)) if !target.contains(' ') => {
            LogEntry::new(level, target, msg.trim().to_string())
        }
        _ => LogEntry::new(level, targets::OTHER, rest.trim().to_string()),
    }
}

/// `MakeWriter` feeding formatted lines into a [`LogRingBuffer`]
#[derive(Clone)]
pub struct RingBufferWriter {
    buffer: LogRingBuffer,
}

impl RingBufferWriter {
    pub fn new(buffer: LogRingBuffer) -> Self {
        Self { buffer }
    }
}

impl std::io::Write for RingBufferWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if let Ok(text) = std::str::from_utf8(buf) {
            for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
                self.buffer.push(parse_line(line));
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for RingBufferWriter {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

static LOG_BUFFER: OnceLock<LogRingBuffer> = OnceLock::new();

/// The process-wide buffer, created on first use with `capacity`. Later
/// calls return the existing buffer whatever capacity they ask for.
pub fn init_log_buffer(capacity: usize) -> LogRingBuffer {
    LOG_BUFFER
        .get_or_init(|| LogRingBuffer::with_capacity(capacity))
        .clone()
}

pub fn get_log_buffer() -> Option<LogRingBuffer> {
    LOG_BUFFER.get().cloned()
}

/// Install a subscriber writing into the process-wide ring buffer.
///
/// `RUST_LOG` wins over `config.filter` when set. If another subscriber is
/// already installed (a host application or a test harness) it is left in
/// place and only the buffer is returned.
pub fn init_tracing(config: &LoggingConfig) -> LogRingBuffer {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let buffer = init_log_buffer(config.buffer_capacity);
    let writer = RingBufferWriter::new(buffer.clone());

    let fmt_layer = fmt::layer()
        .with_writer(writer)
        .with_target(true)
        .with_level(true)
        .with_ansi(false)
        .without_time()
        .compact();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .is_ok()
    {
        tracing::info!(
            target: targets::SYSTEM,
            "Console logging started ({}, {} entries kept)",
            config.filter,
            buffer.capacity()
        );
    }

    buffer
}

#[macro_export]
macro_rules! trace_dispatch {
    ($kind:expr, $source:expr, $generation:expr) => {
        tracing::info!(
            target: $crate::logging::targets::SEARCH,
            "Dispatching {} search on {} (generation {})",
            $kind,
            $source,
            $generation
        );
    };
}

#[macro_export]
macro_rules! trace_source_switch {
    ($from:expr, $to:expr) => {
        tracing::info!(
            target: $crate::logging::targets::SCHEMA,
            "Switching data source from {} to {}",
            $from,
            $to
        );
    };
}

#[macro_export]
macro_rules! trace_staging {
    ($from:expr, $to:expr) => {
        tracing::debug!(
            target: $crate::logging::targets::IMPORT,
            "Staging {:?} -> {:?}",
            $from,
            $to
        );
    };
}
