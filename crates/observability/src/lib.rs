use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use fitplan_core::Goal;
use once_cell::sync::OnceCell;
use serde::Serialize;
use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

static TRACING_INIT: OnceCell<()> = OnceCell::new();

#[derive(Debug, Default)]
pub struct AppMetrics {
    requests_total: AtomicU64,
    failures_total: AtomicU64,
    ml_inference_total: AtomicU64,
    cut_routes_total: AtomicU64,
    bulk_routes_total: AtomicU64,
    maintain_routes_total: AtomicU64,
    total_latency_micros: AtomicU64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub requests_total: u64,
    pub failures_total: u64,
    pub ml_inference_total: u64,
    pub routes_by_goal: RoutesByGoal,
    pub avg_latency_millis: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoutesByGoal {
    pub cut: u64,
    pub bulk: u64,
    pub maintain: u64,
}

impl AppMetrics {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn inc_request(&self) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_failure(&self) {
        self.failures_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_ml_inference(&self) {
        self.ml_inference_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_route(&self, goal: Goal) {
        let counter = match goal {
            Goal::Cut => &self.cut_routes_total,
            Goal::Bulk => &self.bulk_routes_total,
            Goal::Maintain => &self.maintain_routes_total,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn observe_latency(&self, duration: Duration) {
        self.total_latency_micros
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let requests = self.requests_total.load(Ordering::Relaxed);
        let latency = self.total_latency_micros.load(Ordering::Relaxed);

        MetricsSnapshot {
            requests_total: requests,
            failures_total: self.failures_total.load(Ordering::Relaxed),
            ml_inference_total: self.ml_inference_total.load(Ordering::Relaxed),
            routes_by_goal: RoutesByGoal {
                cut: self.cut_routes_total.load(Ordering::Relaxed),
                bulk: self.bulk_routes_total.load(Ordering::Relaxed),
                maintain: self.maintain_routes_total.load(Ordering::Relaxed),
            },
            avg_latency_millis: if requests == 0 {
                0.0
            } else {
                latency as f64 / requests as f64 / 1000.0
            },
        }
    }
}

/// Installs the JSON subscriber once per process. Logs go to stderr so that
/// stdout stays free for command output.
pub fn init_tracing(service_name: &str) {
    TRACING_INIT.get_or_init(|| {
        json_subscriber(service_name, std::io::stderr).init();
    });
}

pub fn json_subscriber<W>(service_name: &str, writer: W) -> impl Subscriber + Send + Sync + 'static
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{}=info,fitplan_api=info,fitplan_router=info,fitplan_ml=info",
            service_name
        ))
    });

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(writer)
        .finish()
}
