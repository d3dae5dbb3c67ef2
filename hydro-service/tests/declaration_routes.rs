use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use chrono::NaiveDate;
use hydro_service::{
    axum::ProblemConfig,
    declaration::{
        declaration_router, AppState, DayReport, DeclarationSeed, DeclarationStore, DeclarationStoreError,
        LinkBuilder, MemoryDeclarationStore, Revision,
    },
    utils::id_encoders::{IdEncoder, SealedIdEncoder, SharedIdEncoder},
};
use hydro_test::test;
use serde_json::Value as JsonValue;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use tower::ServiceExt;
use url::Url;

const SECRET: &str = "0123456789abcdef-shared-deployment-secret";
const OTHER_SECRET: &str = "another-deployment-with-its-own-secret";
const PUBLIC_URL: &str = "https://hydro.example.com/";

/// Store wrapper counting the lookups, optionally failing all of them.
struct ProbeStore {
    inner: MemoryDeclarationStore,
    lookups: AtomicUsize,
    fail: bool,
}

impl ProbeStore {
    fn check(&self) -> Result<(), DeclarationStoreError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            Err(DeclarationStoreError::Unavailable("connection refused".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl DeclarationStore for ProbeStore {
    async fn list_day_reports(&self) -> Result<Vec<DayReport>, DeclarationStoreError> {
        self.check()?;
        self.inner.list_day_reports().await
    }

    async fn find_day_report(&self, id: u64) -> Result<Option<DayReport>, DeclarationStoreError> {
        self.check()?;
        self.inner.find_day_report(id).await
    }

    async fn list_revisions(&self, day_report_id: u64) -> Result<Vec<Revision>, DeclarationStoreError> {
        self.check()?;
        self.inner.list_revisions(day_report_id).await
    }

    async fn find_revision(&self, id: u64) -> Result<Option<Revision>, DeclarationStoreError> {
        self.check()?;
        self.inner.find_revision(id).await
    }
}

fn seed() -> DeclarationSeed {
    DeclarationSeed {
        day_reports: vec![DayReport {
            id: 482,
            plant: "Upper Dam".into(),
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            generation_mwh: 1200.0,
            declared_capacity_mw: 60.0,
        }],
        revisions: vec![
            Revision {
                id: 9001,
                day_report_id: 482,
                revision_no: 2,
                dispatch_mw: 45.5,
                acknowledged: true,
            },
            Revision {
                id: 9000,
                day_report_id: 482,
                revision_no: 1,
                dispatch_mw: 50.0,
                acknowledged: false,
            },
        ],
    }
}

struct TestApp {
    router: Router,
    encoder: SharedIdEncoder,
    store: Arc<ProbeStore>,
}

impl TestApp {
    /// Each instance stands for a separate process configured with the given secret.
    fn new(secret: &str) -> Self {
        Self::with_options(secret, false, false)
    }

    fn with_options(secret: &str, fail: bool, include_internal: bool) -> Self {
        let encoder: SharedIdEncoder = Arc::new(SealedIdEncoder::new(secret).unwrap());
        let store = Arc::new(ProbeStore {
            inner: MemoryDeclarationStore::from_seed(seed()),
            lookups: AtomicUsize::new(0),
            fail,
        });
        let links = LinkBuilder::new(Url::parse(PUBLIC_URL).unwrap(), encoder.clone()).unwrap();
        let state = AppState::new(links, store.clone(), ProblemConfig { include_internal });
        let router = declaration_router().with_state(state);

        Self { router, encoder, store }
    }

    fn lookups(&self) -> usize {
        self.store.lookups.load(Ordering::SeqCst)
    }

    async fn get(&self, path: &str) -> (StatusCode, Option<String>, JsonValue) {
        let request = Request::builder().uri(path).body(Body::empty()).unwrap();
        let response = self.router.clone().oneshot(request).await.unwrap();

        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .map(|v| v.to_str().unwrap().to_owned());
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&body).unwrap_or(JsonValue::Null);

        log::debug!("GET {path} -> {status}: {json:#}");
        (status, content_type, json)
    }
}

fn path_of(link: &JsonValue) -> String {
    Url::parse(link.as_str().unwrap()).unwrap().path().to_owned()
}

fn replace_char(token: &str, pos: usize) -> String {
    let mut chars: Vec<char> = token.chars().collect();
    chars[pos] = if chars[pos] == 'x' { 'y' } else { 'x' };
    chars.into_iter().collect()
}

#[test]
async fn listing_hides_the_ids() {
    let app = TestApp::new(SECRET);

    let (status, _, json) = app.get("/declaration/day").await;
    assert_eq!(status, StatusCode::OK);

    let reports = json.as_array().unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0]["plant"], "Upper Dam");
    assert_eq!(reports[0]["date"], "2024-03-01");

    let link = reports[0]["link"].as_str().unwrap();
    assert!(link.starts_with("https://hydro.example.com/declaration/day/"));
    assert!(!link.contains("482"));
    assert!(reports[0].get("id").is_none());
}

#[test]
async fn day_report_link_is_followed() {
    let app = TestApp::new(SECRET);
    let token = app.encoder.obfuscate(482).unwrap();

    let (status, _, json) = app.get(&format!("/declaration/day/{token}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["plant"], "Upper Dam");
    assert_eq!(json["generationMwh"], 1200.0);
    assert_eq!(path_of(&json["link"]), format!("/declaration/day/{token}"));

    let revisions = json["revisions"].as_array().unwrap();
    assert_eq!(revisions.len(), 2);
    assert_eq!(revisions[0]["revisionNo"], 1);
    assert_eq!(revisions[1]["revisionNo"], 2);

    let (status, _, revision) = app.get(&path_of(&revisions[1]["link"])).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(revision["dispatchMw"], 45.5);
    assert_eq!(revision["acknowledged"], true);
    assert_eq!(path_of(&revision["dayReport"]), format!("/declaration/day/{token}"));
}

#[test]
async fn link_of_one_process_is_accepted_by_another() {
    let producer = TestApp::new(SECRET);
    let consumer = TestApp::new(SECRET);

    let (_, _, json) = producer.get("/declaration/day").await;
    let path = path_of(&json[0]["link"]);
    let token = path.rsplit('/').next().unwrap();
    assert_eq!(consumer.encoder.deobfuscate(token), Ok(482));

    let (status, _, json) = consumer.get(&path).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["plant"], "Upper Dam");
}

#[test]
async fn tampered_token_is_unauthorized_without_lookup() {
    let app = TestApp::new(SECRET);
    let token = app.encoder.obfuscate(482).unwrap();
    let tampered = replace_char(&token, 10);

    let (status, content_type, json) = app.get(&format!("/declaration/day/{tampered}")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(content_type.as_deref(), Some("application/problem+json"));
    assert_eq!(json["type"], "unauthorized");
    assert_eq!(json["detail"], JsonValue::Null);
    assert_eq!(app.lookups(), 0);
}

#[test]
async fn foreign_token_is_unauthorized() {
    let app = TestApp::new(SECRET);
    let foreign = TestApp::new(OTHER_SECRET);
    let token = foreign.encoder.obfuscate(482).unwrap();

    let (status, _, _) = app.get(&format!("/declaration/day/{token}")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.lookups(), 0);
}

#[test]
async fn plain_ids_are_not_accepted() {
    let app = TestApp::new(SECRET);

    for path in ["/declaration/day/482", "/declaration/day/0", "/declaration/revision/9000"] {
        let (status, _, _) = app.get(path).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "path: {path}");
    }
    assert_eq!(app.lookups(), 0);
}

#[test]
async fn failures_are_indistinguishable() {
    let app = TestApp::new(SECRET);
    let valid = app.encoder.obfuscate(482).unwrap();
    let missing = app.encoder.obfuscate(483).unwrap();
    let foreign = TestApp::new(OTHER_SECRET).encoder.obfuscate(482).unwrap();

    let responses = [
        app.get(&format!("/declaration/day/{}", replace_char(&valid, 0))).await,
        app.get(&format!("/declaration/day/{}", &valid[..20])).await,
        app.get(&format!("/declaration/day/{foreign}")).await,
        app.get(&format!("/declaration/day/{missing}")).await,
    ];

    for response in &responses {
        assert_eq!(response, &responses[0]);
    }
    assert_eq!(responses[0].0, StatusCode::UNAUTHORIZED);
    // only the decodable token reached the store
    assert_eq!(app.lookups(), 1);
}

#[test]
async fn store_failure_detail_is_confidential() {
    let app = TestApp::with_options(SECRET, true, false);
    let (status, _, json) = app.get("/declaration/day").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["type"], "server_error");
    assert_eq!(json["detail"], JsonValue::Null);

    let app = TestApp::with_options(SECRET, true, true);
    let token = app.encoder.obfuscate(482).unwrap();
    let (status, _, json) = app.get(&format!("/declaration/day/{token}")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["detail"], "Store is not available: connection refused");
}
