use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use alphaleads_core::{Industry, LeadSource, LeadStatus};
use alphaleads_validation::{EmailVerdict, EmailVerification, EmailVerifier};
use async_trait::async_trait;
use tokio::time::Instant;

use super::*;
use crate::memory_store::InMemoryLeadStore;

fn lead(source: &str, name: &str, confidence: u8) -> Lead {
    let mut lead = Lead::new(
        format!("{source}_{name}"),
        name,
        Industry::Healthcare,
        LeadSource {
            name: source.to_string(),
            source_id: name.to_string(),
            url: None,
            collected_at: Utc::now(),
            confidence,
        },
    );
    lead.confidence = confidence;
    lead
}

struct StaticAdapter {
    name: &'static str,
    enabled: bool,
    leads: Vec<Lead>,
    calls: AtomicUsize,
}

impl StaticAdapter {
    fn new(name: &'static str, leads: Vec<Lead>) -> Self {
        Self {
            name,
            enabled: true,
            leads,
            calls: AtomicUsize::new(0),
        }
    }

    fn disabled(name: &'static str) -> Self {
        Self {
            enabled: false,
            ..Self::new(name, vec![lead(name, "Never", 99)])
        }
    }
}

#[async_trait]
impl SourceAdapter for StaticAdapter {
    fn name(&self) -> &'static str {
        self.name
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    async fn search(&self, _criteria: &NormalizedCriteria) -> Vec<Lead> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.leads.clone()
    }
}

struct PanickingAdapter;

#[async_trait]
impl SourceAdapter for PanickingAdapter {
    fn name(&self) -> &'static str {
        "broken"
    }

    fn is_enabled(&self) -> bool {
        true
    }

    async fn search(&self, _criteria: &NormalizedCriteria) -> Vec<Lead> {
        panic!("provider blew up");
    }
}

struct SlowAdapter;

#[async_trait]
impl SourceAdapter for SlowAdapter {
    fn name(&self) -> &'static str {
        "slow"
    }

    fn is_enabled(&self) -> bool {
        true
    }

    async fn search(&self, _criteria: &NormalizedCriteria) -> Vec<Lead> {
        tokio::time::sleep(Duration::from_secs(600)).await;
        vec![lead("slow", "Late", 100)]
    }
}

struct UppercaseDescriber;

#[async_trait]
impl LeadDescriber for UppercaseDescriber {
    async fn describe(&self, lead: &Lead) -> Option<String> {
        (lead.business_name != "Skip").then(|| lead.business_name.to_uppercase())
    }
}

/// Records how many verifications overlap and when each one starts.
struct CountingVerifier {
    origin: Instant,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    started: std::sync::Mutex<Vec<Duration>>,
}

impl CountingVerifier {
    fn new() -> Self {
        Self {
            origin: Instant::now(),
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            started: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl EmailVerifier for CountingVerifier {
    async fn verify(&self, _email: &str) -> Result<EmailVerification, ValidationError> {
        self.started
            .lock()
            .unwrap()
            .push(self.origin.elapsed());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(100)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(EmailVerification {
            result: EmailVerdict::Deliverable,
            score: Some(90),
            sources: 1,
        })
    }
}

fn settings() -> PipelineSettings {
    PipelineSettings {
        adapter_timeout: Duration::from_secs(5),
        validation_batch_size: 2,
        validation_batch_delay: Duration::from_millis(10),
        describe_timeout: Duration::from_secs(1),
    }
}

fn pipeline(adapters: Vec<Arc<dyn SourceAdapter>>) -> LeadPipeline {
    LeadPipeline::new(adapters, settings())
}

fn criteria(limit: usize) -> SearchCriteria {
    SearchCriteria {
        limit,
        ..SearchCriteria::new(Industry::Healthcare)
    }
}

fn names(leads: &[Lead]) -> Vec<&str> {
    leads.iter().map(|l| l.business_name.as_str()).collect()
}

#[tokio::test]
async fn merges_enabled_adapters_and_skips_disabled() {
    let disabled = Arc::new(StaticAdapter::disabled("sec_edgar"));
    let p = pipeline(vec![
        Arc::new(StaticAdapter::new("yelp", vec![lead("yelp", "A", 80)])),
        disabled.clone(),
        Arc::new(StaticAdapter::new("openstreetmap", vec![lead("openstreetmap", "B", 60)])),
    ]);

    assert_eq!(p.enabled_providers(), vec!["yelp", "openstreetmap"]);

    let result = p.generate_leads(&criteria(10)).await;
    assert!(result.success);
    assert_eq!(result.total, 2);
    assert_eq!(names(&result.leads), vec!["A", "B"]);
    assert_eq!(result.sources.total_enabled_providers, 2);
    assert_eq!(result.sources.by_source.get("yelp"), Some(&1));
    assert_eq!(result.sources.by_source.get("openstreetmap"), Some(&1));
    assert_eq!(result.sources.average_confidence, 70);
    assert!(result.message.is_none());
    assert_eq!(disabled.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn panicking_adapter_loses_only_its_own_results() {
    let p = pipeline(vec![
        Arc::new(PanickingAdapter),
        Arc::new(StaticAdapter::new("yelp", vec![lead("yelp", "Survivor", 75)])),
    ]);

    let result = p.generate_leads(&criteria(10)).await;
    assert!(result.success);
    assert_eq!(names(&result.leads), vec!["Survivor"]);
    assert_eq!(result.sources.total_enabled_providers, 2);
}

#[tokio::test(start_paused = true)]
async fn slow_adapter_is_cut_off_at_the_deadline() {
    let p = pipeline(vec![
        Arc::new(SlowAdapter),
        Arc::new(StaticAdapter::new("yelp", vec![lead("yelp", "Fast", 50)])),
    ]);

    let result = p.generate_leads(&criteria(10)).await;
    assert_eq!(names(&result.leads), vec!["Fast"]);
}

#[tokio::test]
async fn no_leads_is_still_success() {
    let p = pipeline(vec![Arc::new(StaticAdapter::new("yelp", Vec::new()))]);

    let result = p.generate_leads(&criteria(10)).await;
    assert!(result.success);
    assert_eq!(result.total, 0);
    assert!(result.leads.is_empty());
    assert_eq!(result.message.as_deref(), Some(NO_LEADS_MESSAGE));
    assert_eq!(result.sources.average_confidence, 0);
    assert!(result.sources.by_source.is_empty());
}

#[tokio::test]
async fn invalid_criteria_fail_without_querying() {
    let adapter = Arc::new(StaticAdapter::new("yelp", vec![lead("yelp", "A", 80)]));
    let p = pipeline(vec![adapter.clone()]);

    let result = p.generate_leads(&criteria(0)).await;
    assert!(!result.success);
    assert_eq!(result.total, 0);
    assert!(result.error.unwrap().contains("limit"));
    assert_eq!(adapter.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn limit_keeps_highest_confidence_with_input_order_ties() {
    // Twelve leads, confidences cycling 50/90/70, so four share each score.
    let leads: Vec<Lead> = (0..12)
        .map(|i| {
            let confidence = [50, 90, 70][i % 3];
            lead("yelp", &format!("L{i:02}"), confidence)
        })
        .collect();
    let p = pipeline(vec![Arc::new(StaticAdapter::new("yelp", leads))]);

    let result = p.generate_leads(&criteria(5)).await;
    assert_eq!(result.total, 5);
    assert_eq!(names(&result.leads), vec!["L01", "L04", "L07", "L10", "L02"]);
}

#[tokio::test]
async fn duplicates_across_adapters_keep_the_first_adapter() {
    let mut from_yelp = lead("yelp", "Corner Clinic", 60);
    from_yelp.phone = Some("512 555 0100".to_string());
    let mut from_osm = lead("openstreetmap", "corner clinic", 95);
    from_osm.phone = Some("5125550100".to_string());

    let p = pipeline(vec![
        Arc::new(StaticAdapter::new("yelp", vec![from_yelp])),
        Arc::new(StaticAdapter::new("openstreetmap", vec![from_osm])),
    ]);

    let result = p.generate_leads(&criteria(10)).await;
    assert_eq!(result.total, 1);
    let merged = &result.leads[0];
    assert_eq!(merged.primary_source(), Some("yelp"));
    assert_eq!(merged.sources.len(), 2);
    assert_eq!(merged.confidence, 95);
    assert_eq!(result.sources.by_source.get("yelp"), Some(&1));
    assert_eq!(result.sources.by_source.get("openstreetmap"), Some(&1));
}

#[tokio::test(start_paused = true)]
async fn offline_validation_rescores_every_lead() {
    let mut rich = lead("yelp", "Rich", 10);
    rich.phone = Some("(310) 555-0199".to_string());
    rich.email = Some("owner@gmail.com".to_string());
    rich.website = Some("https://rich.example".to_string());
    rich.address.street = Some("1 Main St".to_string());
    let bare = lead("yelp", "Bare", 99);
    let mut contacted = lead("yelp", "Contacted", 10);
    contacted.status = LeadStatus::Contacted;

    let p = pipeline(vec![Arc::new(StaticAdapter::new(
        "yelp",
        vec![rich, bare, contacted],
    ))])
    .with_validator(Arc::new(LeadValidator::offline()));

    let result = p.generate_leads(&criteria(10)).await;
    assert_eq!(names(&result.leads), vec!["Rich", "Bare", "Contacted"]);

    // 30 + email 45 + phone 20 + website 10 + street 10, capped.
    let rich = &result.leads[0];
    assert_eq!(rich.confidence, 100);
    assert_eq!(rich.status, LeadStatus::Validated);
    assert!(rich.validation_status.is_some());

    let bare = &result.leads[1];
    assert_eq!(bare.confidence, 30);
    assert_eq!(bare.status, LeadStatus::New);

    assert_eq!(result.leads[2].status, LeadStatus::Contacted);
}

#[tokio::test(start_paused = true)]
async fn validation_runs_in_bounded_batches() {
    let leads: Vec<Lead> = (1..=5)
        .map(|i| {
            let mut l = lead("yelp", &format!("Shop{i}"), 50);
            l.email = Some(format!("owner{i}@shop{i}.example"));
            l
        })
        .collect();
    let verifier = Arc::new(CountingVerifier::new());
    let p = pipeline(vec![Arc::new(StaticAdapter::new("yelp", leads))]).with_validator(Arc::new(
        LeadValidator::offline().with_email_verifier(verifier.clone()),
    ));

    let result = p.generate_leads(&criteria(10)).await;
    assert_eq!(result.total, 5);

    // batch size 2, each verification 100ms, 10ms pause between batches
    assert_eq!(verifier.peak.load(Ordering::SeqCst), 2);
    let started = verifier.started.lock().unwrap().clone();
    assert_eq!(started.len(), 5);
    assert_eq!(started[0], started[1]);
    assert_eq!(started[2], started[3]);
    assert!(started[2] - started[0] >= Duration::from_millis(110));
    assert!(started[4] - started[2] >= Duration::from_millis(110));
}

#[tokio::test]
async fn without_validation_keeps_adapter_scores() {
    let p = pipeline(vec![Arc::new(StaticAdapter::new("yelp", vec![lead("yelp", "A", 99)]))])
        .with_validator(Arc::new(LeadValidator::offline()))
        .without_validation();

    let result = p.generate_leads(&criteria(10)).await;
    assert_eq!(result.leads[0].confidence, 99);
    assert!(result.leads[0].validation_status.is_none());
}

#[tokio::test]
async fn describer_fills_descriptions_best_effort() {
    let mut skipped = lead("yelp", "Skip", 40);
    skipped.business_details.description = Some("kept".to_string());
    let p = pipeline(vec![Arc::new(StaticAdapter::new(
        "yelp",
        vec![lead("yelp", "Acme", 50), skipped],
    ))])
    .with_describer(Arc::new(UppercaseDescriber));

    let result = p.generate_leads(&criteria(10)).await;
    assert_eq!(
        result.leads[0].business_details.description.as_deref(),
        Some("ACME")
    );
    assert_eq!(
        result.leads[1].business_details.description.as_deref(),
        Some("kept")
    );
}

#[tokio::test]
async fn attached_store_receives_every_returned_lead() {
    let store = Arc::new(InMemoryLeadStore::new());
    let p = pipeline(vec![Arc::new(StaticAdapter::new(
        "yelp",
        vec![lead("yelp", "A", 80), lead("yelp", "B", 60)],
    ))])
    .with_store(store.clone());

    let result = p.generate_leads(&criteria(10)).await;
    assert_eq!(store.len().await, 2);
    for returned in &result.leads {
        assert_eq!(&store.get(&returned.id).await.unwrap(), returned);
    }

    let stored = p.get_leads(&LeadFilters::default()).await.unwrap();
    assert_eq!(names(&stored), vec!["A", "B"]);
}

#[tokio::test]
async fn collect_never_persists() {
    let store = Arc::new(InMemoryLeadStore::new());
    let p = pipeline(vec![Arc::new(StaticAdapter::new("yelp", vec![lead("yelp", "A", 80)]))])
        .with_store(store.clone());

    let normalized = criteria(10).normalize().unwrap();
    let leads = p.collect(&normalized).await;
    assert_eq!(leads.len(), 1);
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn get_leads_without_store_is_unavailable() {
    let p = pipeline(Vec::new());
    assert!(p.store().is_none());
    assert!(matches!(
        p.get_leads(&LeadFilters::default()).await,
        Err(StoreError::Unavailable)
    ));
}

#[test]
fn summary_counts_every_provenance_entry() {
    let mut merged = lead("yelp", "A", 81);
    merged.sources.push(LeadSource {
        name: "openstreetmap".to_string(),
        source_id: "9".to_string(),
        url: None,
        collected_at: Utc::now(),
        confidence: 70,
    });
    let summary = summarize(&[merged, lead("yelp", "B", 70)], 3);
    assert_eq!(summary.by_source.get("yelp"), Some(&2));
    assert_eq!(summary.by_source.get("openstreetmap"), Some(&1));
    assert_eq!(summary.total_enabled_providers, 3);
    // (81 + 70) / 2 = 75.5, rounded half up.
    assert_eq!(summary.average_confidence, 76);
}

#[test]
fn result_serializes_camel_case_and_omits_empty_fields() {
    let result = PipelineResult {
        success: true,
        total: 0,
        leads: Vec::new(),
        sources: summarize(&[], 1),
        timestamp: Utc::now(),
        message: Some(NO_LEADS_MESSAGE.to_string()),
        error: None,
    };
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["sources"]["totalEnabledProviders"], 1);
    assert_eq!(json["sources"]["averageConfidence"], 0);
    assert_eq!(json["message"], NO_LEADS_MESSAGE);
    assert!(json.get("error").is_none());
}
