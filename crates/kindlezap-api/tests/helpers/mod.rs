//! Test helpers: build AppState and router with in-process stand-ins for the converter,
//! the summarizer and the SMTP relay.

#![allow(dead_code)]

pub mod fixtures;

use async_trait::async_trait;
use axum_test::multipart::Part;
use axum_test::TestServer;
use kindlezap_api::setup::routes;
use kindlezap_api::state::AppState;
use kindlezap_core::{Config, ConversionJob, DeliveryEnvelope, PreviewStrategy, Summary};
use kindlezap_processing::{ConversionError, DocumentConverter, PreviewRenderer, ProcessGate};
use kindlezap_services::{DeliveryError, Mailer, Summarizer};
use kindlezap_storage::TempStorage;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

/// Writes the fixture EPUB, or fails like a converter rejecting its input.
pub struct FixtureConverter {
    pub fail: bool,
    pub jobs: Mutex<Vec<ConversionJob>>,
}

#[async_trait]
impl DocumentConverter for FixtureConverter {
    async fn convert(&self, job: &ConversionJob) -> Result<PathBuf, ConversionError> {
        self.jobs.lock().expect("lock").push(job.clone());
        if self.fail {
            return Err(ConversionError::Failed {
                status: "exit status: 1".to_string(),
                stderr: "Not a valid PDF".to_string(),
            });
        }
        tokio::fs::write(&job.output, fixtures::minimal_epub())
            .await
            .expect("write epub");
        Ok(job.output.clone())
    }
}

/// Records envelopes, or fails like a relay rejecting the credentials.
pub struct RecordingMailer {
    pub fail: bool,
    pub sent: Mutex<Vec<DeliveryEnvelope>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn deliver(&self, envelope: DeliveryEnvelope) -> Result<(), DeliveryError> {
        if self.fail {
            return Err(DeliveryError::Smtp(
                "permanent error (535): 5.7.8 Username and Password not accepted".to_string(),
            ));
        }
        self.sent.lock().expect("lock").push(envelope);
        Ok(())
    }
}

/// Echoes the size of its input so tests can tell calls apart.
#[derive(Default)]
pub struct CountingSummarizer {
    pub inputs: Mutex<Vec<String>>,
}

#[async_trait]
impl Summarizer for CountingSummarizer {
    async fn summarize(&self, text: &str) -> Summary {
        self.inputs.lock().expect("lock").push(text.to_string());
        Summary::generated(format!("Summary of {} characters", text.chars().count()))
    }
}

#[derive(Clone, Default)]
pub struct TestOptions {
    pub converter_fails: bool,
    pub mailer_fails: bool,
    pub env: Vec<(&'static str, &'static str)>,
}

pub struct TestApp {
    pub server: TestServer,
    pub converter: Arc<FixtureConverter>,
    pub mailer: Arc<RecordingMailer>,
    pub summarizer: Arc<CountingSummarizer>,
    pub temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Files currently present in the temporary directory.
    pub fn temp_files(&self) -> Vec<PathBuf> {
        std::fs::read_dir(self.temp_dir.path())
            .expect("read temp dir")
            .map(|entry| entry.expect("dir entry").path())
            .collect()
    }

    pub fn sent(&self) -> Vec<DeliveryEnvelope> {
        self.mailer.sent.lock().expect("lock").clone()
    }

    pub fn jobs(&self) -> Vec<ConversionJob> {
        self.converter.jobs.lock().expect("lock").clone()
    }
}

pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(TestOptions::default()).await
}

pub async fn setup_test_app_with(options: TestOptions) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let config = create_test_config(&temp_dir, &options.env);

    let storage = TempStorage::new(temp_dir.path())
        .await
        .expect("Failed to create temp storage");
    let converter = Arc::new(FixtureConverter {
        fail: options.converter_fails,
        jobs: Mutex::new(Vec::new()),
    });
    let mailer = Arc::new(RecordingMailer {
        fail: options.mailer_fails,
        sent: Mutex::new(Vec::new()),
    });
    let summarizer = Arc::new(CountingSummarizer::default());
    let preview = PreviewRenderer::new(
        &config.preview,
        ProcessGate::new(1, Duration::from_secs(5)),
    );
    assert_eq!(preview.strategy(), PreviewStrategy::Epub);

    let state = Arc::new(AppState {
        config: config.clone(),
        storage,
        converter: converter.clone(),
        preview,
        summarizer: summarizer.clone(),
        mailer: mailer.clone(),
    });

    let app = routes::setup_routes(&config, state).expect("Failed to setup routes");
    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        converter,
        mailer,
        summarizer,
        temp_dir,
    }
}

fn create_test_config(temp_dir: &TempDir, extra: &[(&str, &str)]) -> Config {
    let temp_path = temp_dir.path().to_string_lossy().into_owned();
    let mut pairs: Vec<(String, String)> = vec![
        ("EMAIL_ADDRESS".into(), "books@example.com".into()),
        ("EMAIL_PASSWORD".into(), "app-password".into()),
        ("TEMP_DIR".into(), temp_path),
        ("CORS_ORIGINS".into(), "*".into()),
    ];
    pairs.extend(extra.iter().map(|(k, v)| (k.to_string(), v.to_string())));

    Config::from_lookup(move |key| {
        pairs
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    })
    .expect("test config")
}

pub fn pdf_part(filename: &str) -> Part {
    Part::bytes(bytes::Bytes::from(fixtures::sample_pdf(filename)))
        .file_name(filename)
        .mime_type("application/pdf")
}

pub fn text_part(filename: &str, text: &str) -> Part {
    Part::bytes(bytes::Bytes::from(text.to_string()))
        .file_name(filename)
        .mime_type("text/plain")
}
