// src/telemetry.rs
use metrics::{describe_counter, describe_gauge};
use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const ENV_LOG_JSON: &str = "SENTINEL_LOG_JSON";
const DEFAULT_FILTER: &str = "stock_news_sentinel=info,warn";

/// Install the global subscriber. `RUST_LOG` overrides the default filter;
/// `SENTINEL_LOG_JSON=1` switches to JSON lines.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let json = std::env::var(ENV_LOG_JSON).ok().is_some_and(|v| v == "1");

    let registry = tracing_subscriber::registry().with(filter);
    let res = if json {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer().compact()).try_init()
    };
    if let Err(e) = res {
        eprintln!("tracing already initialised: {e}");
    }
}

/// One-time metric descriptions, so series show up in whatever recorder is installed.
pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "sentinel_events_fetched_total",
            "Events returned by source adapters."
        );
        describe_counter!(
            "sentinel_events_stale_total",
            "Events dropped for exceeding the max article age."
        );
        describe_counter!(
            "sentinel_events_duplicate_total",
            "Events dropped because their fingerprint was already seen."
        );
        describe_counter!("sentinel_events_novel_total", "Novel events per cycle.");
        describe_counter!("sentinel_alerts_sent_total", "Immediate alerts delivered.");
        describe_counter!(
            "sentinel_adapter_errors_total",
            "Adapter failures (fetch, deliver, summarize, persist)."
        );
        describe_counter!("sentinel_digests_total", "Digest attempts.");
        describe_gauge!(
            "sentinel_digest_buffer_len",
            "Entries waiting for the next digest."
        );
    });
}
