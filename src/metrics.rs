//! Prometheus metrics for the commander session.
//!
//! - `xmpp_stanzas_received_total{kind}` - Inbound stanzas by kind
//! - `xmpp_stanzas_sent_total` - Outbound stanzas
//! - `xmpp_commands_total` - Commands handed to the executor
//! - `xmpp_command_duration_seconds` - Executor latency
//! - `xmpp_command_timeouts_total` - Commands whose reply was dropped
//! - `xmpp_permission_denied_total` - Denied senders
//! - `xmpp_messages_ignored_total{reason}` - Messages dropped without reply
//! - `xmpp_session_errors_total{code}` - Fatal session errors

use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::OnceLock;

/// Global Prometheus registry for all metrics.
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

// ========================================================================
// Counters
// ========================================================================

pub static STANZAS_RECEIVED: OnceLock<IntCounterVec> = OnceLock::new();

pub static STANZAS_SENT: OnceLock<IntCounter> = OnceLock::new();

/// Commands dispatched to the executor.
pub static COMMANDS: OnceLock<IntCounter> = OnceLock::new();

pub static COMMAND_TIMEOUTS: OnceLock<IntCounter> = OnceLock::new();

/// Senders that matched no admin rule.
pub static PERMISSION_DENIED: OnceLock<IntCounter> = OnceLock::new();

pub static MESSAGES_IGNORED: OnceLock<IntCounterVec> = OnceLock::new();

/// Fatal errors by `SessionError::error_code`.
pub static SESSION_ERRORS: OnceLock<IntCounterVec> = OnceLock::new();

// ========================================================================
// Histograms
// ========================================================================

pub static COMMAND_LATENCY: OnceLock<Histogram> = OnceLock::new();

/// Initialize the Prometheus metrics registry.
///
/// Call once at startup. Recording before `init` is a no-op.
pub fn init() {
    let r = registry();

    macro_rules! register {
        ($metric:ident, $init:expr) => {
            match $init {
                Ok(m) => {
                    if let Err(e) = r.register(Box::new(m.clone())) {
                        tracing::warn!(error = %e, concat!("Failed to register metric ", stringify!($metric)));
                    }
                    let _ = $metric.set(m);
                }
                Err(e) => {
                    tracing::warn!(error = %e, concat!("Failed to create metric ", stringify!($metric)));
                }
            }
        };
    }

    register!(STANZAS_RECEIVED, IntCounterVec::new(Opts::new("xmpp_stanzas_received_total", "Inbound stanzas by kind"), &["kind"]));
    register!(STANZAS_SENT, IntCounter::new("xmpp_stanzas_sent_total", "Outbound stanzas"));
    register!(COMMANDS, IntCounter::new("xmpp_commands_total", "Commands handed to the executor"));
    register!(COMMAND_TIMEOUTS, IntCounter::new("xmpp_command_timeouts_total", "Commands that timed out"));
    register!(PERMISSION_DENIED, IntCounter::new("xmpp_permission_denied_total", "Commands from unauthorized senders"));
    register!(MESSAGES_IGNORED, IntCounterVec::new(Opts::new("xmpp_messages_ignored_total", "Messages dropped without reply"), &["reason"]));
    register!(SESSION_ERRORS, IntCounterVec::new(Opts::new("xmpp_session_errors_total", "Fatal session errors"), &["code"]));
    register!(COMMAND_LATENCY, Histogram::with_opts(
        HistogramOpts::new("xmpp_command_duration_seconds", "Executor latency")
            .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 30.0])));
}

/// Gather all metrics and encode them in Prometheus text format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = registry().gather();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode Prometheus metrics");
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

// ============================================================================
// Recording helpers
// ============================================================================

#[inline]
fn inc(metric: &OnceLock<IntCounter>) {
    if let Some(c) = metric.get() {
        c.inc();
    }
}

#[inline]
fn inc_label(metric: &OnceLock<IntCounterVec>, label: &str) {
    if let Some(c) = metric.get() {
        c.with_label_values(&[label]).inc();
    }
}

#[inline]
pub fn record_stanza_received(kind: &str) {
    inc_label(&STANZAS_RECEIVED, kind);
}

#[inline]
pub fn record_stanza_sent() {
    inc(&STANZAS_SENT);
}

#[inline]
pub fn record_command_dispatched() {
    inc(&COMMANDS);
}

/// Record executor latency for one command.
#[inline]
pub fn record_command_latency(duration_secs: f64) {
    if let Some(h) = COMMAND_LATENCY.get() {
        h.observe(duration_secs);
    }
}

#[inline]
pub fn record_command_timeout() {
    inc(&COMMAND_TIMEOUTS);
}

#[inline]
pub fn record_permission_denied() {
    inc(&PERMISSION_DENIED);
}

#[inline]
pub fn record_ignored(reason: &str) {
    inc_label(&MESSAGES_IGNORED, reason);
}

#[inline]
pub fn record_session_error(code: &str) {
    inc_label(&SESSION_ERRORS, code);
}
