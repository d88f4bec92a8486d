//! End-to-end runs of the engine with scripted adapters

use async_trait::async_trait;
use outage_watch::aggregator::{Engine, FallbackChain};
use outage_watch::config::{CarrierSpec, SourceDescriptor, SourceKind};
use outage_watch::source::{AdapterRegistry, FailureKind, FetchOutcome, SourceAdapter};
use outage_watch::WatchError;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// What a scripted adapter does when called
#[derive(Clone)]
enum Script {
    Answer(FetchOutcome),
    Sleep(Duration),
    Panic,
}

/// Adapter that follows a script and counts its calls
struct Scripted {
    script: Script,
    calls: AtomicUsize,
}

impl Scripted {
    fn new(script: Script) -> Arc<Self> {
        Arc::new(Self {
            script,
            calls: AtomicUsize::new(0),
        })
    }

    fn ok(summary: &str) -> Arc<Self> {
        Self::new(Script::Answer(FetchOutcome::success(
            summary,
            json!({ "source": "scripted" }),
        )))
    }

    fn fail(kind: FailureKind, message: &str) -> Arc<Self> {
        Self::new(Script::Answer(FetchOutcome::failure(kind, message)))
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SourceAdapter for Scripted {
    async fn fetch(&self, _source: &SourceDescriptor, region: Option<&str>) -> FetchOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.script {
            Script::Answer(FetchOutcome::Success { summary, detail }) => FetchOutcome::Success {
                summary: match region {
                    Some(region) => format!("{} in {}", summary, region),
                    None => summary.clone(),
                },
                detail: detail.clone(),
            },
            Script::Answer(outcome) => outcome.clone(),
            Script::Sleep(duration) => {
                tokio::time::sleep(*duration).await;
                FetchOutcome::success("too late", json!(null))
            }
            Script::Panic => panic!("scripted adapter blew up"),
        }
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

fn source(adapter: &str) -> SourceDescriptor {
    SourceDescriptor::new(
        SourceKind::OfficialApi,
        format!("https://{}.example/status/{{region}}", adapter),
    )
    .with_adapter(adapter)
}

fn engine(adapters: &[(&str, Arc<Scripted>)], timeout: Duration, concurrency: usize) -> Engine {
    let mut registry = AdapterRegistry::new();
    for (id, adapter) in adapters {
        registry.register(*id, adapter.clone());
    }
    Engine::new(FallbackChain::new(registry, timeout), concurrency)
}

#[tokio::test]
async fn test_one_record_per_carrier_region_pair() {
    let ok = Scripted::ok("No problems");
    let engine = engine(&[("ok", ok.clone())], Duration::from_secs(5), 2);

    let carriers = vec![
        CarrierSpec::new("Comcast", vec![source("ok")]),
        CarrierSpec::new("Spectrum", vec![source("ok")]).with_regions(["60601"]),
        CarrierSpec::new("Verizon", vec![source("ok")]),
    ];
    let regions = vec!["10001".to_string(), "90001".to_string()];

    let report = engine.run(&carriers, &regions).await;

    let pairs: Vec<(&str, &str)> = report
        .iter()
        .map(|r| (r.carrier.as_str(), r.region_label()))
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("Comcast", "none"),
            ("Spectrum", "10001"),
            ("Spectrum", "90001"),
            ("Verizon", "none"),
        ]
    );
    assert_eq!(ok.calls(), 4);
    assert_eq!(
        report.find("Spectrum", Some("90001")).map(|r| r.summary_text()),
        Some("No problems in 90001")
    );
}

#[tokio::test]
async fn test_later_sources_not_called_after_success() {
    let a = Scripted::ok("A says up");
    let b = Scripted::ok("B says up");
    let engine = engine(
        &[("a", a.clone()), ("b", b.clone())],
        Duration::from_secs(5),
        4,
    );
    let carriers = vec![CarrierSpec::new("AT&T", vec![source("a"), source("b")])];

    let report = engine.run(&carriers, &[]).await;

    let record = report.find("AT&T", None).expect("record for AT&T");
    assert_eq!(record.summary_text(), "A says up");
    assert_eq!(record.attempts.len(), 1);
    assert_eq!(a.calls(), 1);
    assert_eq!(b.calls(), 0);
}

#[tokio::test]
async fn test_all_failed_chooses_last_failure() {
    let a = Scripted::fail(FailureKind::Timeout, "No response within 20000 ms");
    let b = Scripted::fail(FailureKind::ParseError, "No data found: markup changed");
    let engine = engine(&[("a", a), ("b", b)], Duration::from_secs(5), 4);
    let carriers = vec![CarrierSpec::new("Lumen", vec![source("a"), source("b")])];

    let report = engine.run(&carriers, &[]).await;

    let record = &report.records[0];
    assert!(!record.is_success());
    assert_eq!(record.chosen.failure_kind(), Some(FailureKind::ParseError));
    let kinds: Vec<Option<FailureKind>> = record
        .attempts
        .iter()
        .map(|a| a.outcome.failure_kind())
        .collect();
    assert_eq!(
        kinds,
        vec![Some(FailureKind::Timeout), Some(FailureKind::ParseError)]
    );
}

#[tokio::test]
async fn test_panicking_carrier_does_not_affect_others() {
    let boom = Scripted::new(Script::Panic);
    let ok = Scripted::ok("Operational");
    let engine = engine(
        &[("boom", boom), ("ok", ok)],
        Duration::from_secs(5),
        3,
    );
    let carriers = vec![
        CarrierSpec::new("Comcast", vec![source("boom")]),
        CarrierSpec::new("Verizon", vec![source("ok")]),
        CarrierSpec::new("Windstream", vec![source("ok")]),
    ];

    let report = engine.run(&carriers, &[]).await;

    assert_eq!(report.len(), 3);
    let crashed = report.find("Comcast", None).expect("record for Comcast");
    assert_eq!(crashed.chosen.failure_kind(), Some(FailureKind::Internal));
    assert!(crashed.summary_text().contains("scripted adapter blew up"));
    assert!(report.find("Verizon", None).is_some_and(|r| r.is_success()));
    assert!(report.find("Windstream", None).is_some_and(|r| r.is_success()));
}

#[tokio::test]
async fn test_slow_source_times_out_and_falls_through() {
    let slow = Scripted::new(Script::Sleep(Duration::from_secs(30)));
    let ok = Scripted::ok("Backup says up");
    let engine = engine(
        &[("slow", slow), ("ok", ok)],
        Duration::from_millis(100),
        4,
    );
    let carriers = vec![
        CarrierSpec::new("Comcast", vec![source("slow"), source("ok")]),
        CarrierSpec::new("Verizon", vec![source("slow")]),
    ];

    let started = Instant::now();
    let report = engine.run(&carriers, &[]).await;

    assert!(started.elapsed() < Duration::from_secs(5));
    let comcast = report.find("Comcast", None).expect("record for Comcast");
    assert_eq!(comcast.summary_text(), "Backup says up");
    assert_eq!(
        comcast.attempts[0].outcome.failure_kind(),
        Some(FailureKind::Timeout)
    );
    let verizon = report.find("Verizon", None).expect("record for Verizon");
    assert_eq!(verizon.chosen.failure_kind(), Some(FailureKind::Timeout));
}

#[tokio::test]
async fn test_repeated_runs_produce_same_content() {
    let a = Scripted::fail(FailureKind::HttpError, "HTTP 503 Service Unavailable");
    let b = Scripted::ok("Minor outage in the Midwest");
    let engine = engine(&[("a", a), ("b", b)], Duration::from_secs(5), 2);
    let carriers = vec![
        CarrierSpec::new("Spectrum", vec![source("a"), source("b")]).with_regions(["10001"]),
        CarrierSpec::new("Lumen", vec![source("a")]),
    ];

    let first = engine.run(&carriers, &[]).await;
    let second = engine.run(&carriers, &[]).await;

    assert_eq!(first.len(), second.len());
    for (x, y) in first.iter().zip(second.iter()) {
        assert!(x.same_content(y), "{} differs between runs", x.carrier);
    }
}

/// Adapter that records how many calls overlap
struct Gauge {
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    calls: AtomicUsize,
}

impl Gauge {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl SourceAdapter for Gauge {
    async fn fetch(&self, _source: &SourceDescriptor, _region: Option<&str>) -> FetchOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        tokio::time::sleep(Duration::from_millis(30)).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        FetchOutcome::success("Operational", json!(null))
    }

    fn name(&self) -> &'static str {
        "gauge"
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrency_limit_bounds_in_flight_resolutions() {
    let gauge = Gauge::new();
    let mut registry = AdapterRegistry::new();
    registry.register("gauge", gauge.clone());
    let engine = Engine::new(FallbackChain::new(registry, Duration::from_secs(5)), 2);

    let carriers: Vec<CarrierSpec> = (0..8)
        .map(|i| CarrierSpec::new(format!("Carrier {}", i), vec![source("gauge")]))
        .collect();

    let report = engine.run(&carriers, &[]).await;

    assert_eq!(report.len(), 8);
    assert!(report.iter().all(|r| r.is_success()));
    assert_eq!(gauge.calls.load(Ordering::SeqCst), 8);

    let max = gauge.max_in_flight.load(Ordering::SeqCst);
    assert!(max <= 2, "{} resolutions ran at once with a limit of 2", max);
    assert!(max >= 1);
}

#[tokio::test]
async fn test_repeated_run_region_yields_one_record() {
    let ok = Scripted::ok("Clear");
    let engine = engine(&[("ok", ok.clone())], Duration::from_secs(5), 4);
    let carriers = vec![CarrierSpec::new("Spectrum", vec![source("ok")]).with_regions(["60601"])];
    let regions = vec![
        "10001".to_string(),
        "10001".to_string(),
        "90001".to_string(),
    ];

    let report = engine.run(&carriers, &regions).await;

    let pairs: Vec<(&str, &str)> = report
        .iter()
        .map(|r| (r.carrier.as_str(), r.region_label()))
        .collect();
    assert_eq!(pairs, vec![("Spectrum", "10001"), ("Spectrum", "90001")]);
    assert_eq!(ok.calls(), 2);
}

#[tokio::test]
async fn test_shutdown_abandons_run_without_report() {
    let slow = Scripted::new(Script::Sleep(Duration::from_secs(30)));
    let engine = engine(&[("slow", slow)], Duration::from_secs(60), 2);
    let carriers = vec![CarrierSpec::new("Comcast", vec![source("slow")])];

    let started = Instant::now();
    let result = engine
        .run_until(&carriers, &[], tokio::time::sleep(Duration::from_millis(50)))
        .await;

    assert!(matches!(result, Err(WatchError::Cancelled)));
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_run_until_returns_report_when_not_interrupted() {
    let ok = Scripted::ok("Operational");
    let engine = engine(&[("ok", ok)], Duration::from_secs(5), 2);
    let carriers = vec![CarrierSpec::new("Verizon", vec![source("ok")])];

    let report = engine
        .run_until(&carriers, &[], std::future::pending::<()>())
        .await
        .expect("run completes");

    assert_eq!(report.len(), 1);
    assert!(report.records[0].is_success());
}
