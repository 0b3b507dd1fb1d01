/*!
 * Mock collaborator implementations for testing.
 *
 * This module provides mock backends that simulate different behaviors:
 * - `MockTranslationClient::working()` - Always succeeds with translated text
 * - `MockTranslationClient::failing()` - Always fails with an error
 * - `MockSynthesisClient::working()` - Succeeds and records every call
 *
 * Both mocks track how many calls are in flight at once so tests can assert
 * the pipeline's concurrency bounds.
 */

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::errors::ProviderError;
use crate::providers::{
    GenerateRequest, SelectionRequest, SelectionResponse, SynthesisClient, TranslateRequest,
    TranslationClient,
};

/// Behavior mode for the mock translation client
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with a tagged translation
    Working,
    /// Always fails with an error
    Failing,
    /// Fails every Nth request
    Intermittent { fail_every: usize },
    /// Succeeds after a delay (for concurrency testing)
    Slow { delay_ms: u64 },
    /// Returns an empty translation
    Empty,
}

/// Gauge tracking concurrent calls and the high-water mark
#[derive(Debug, Default)]
pub struct InFlightGauge {
    current: AtomicUsize,
    max_seen: AtomicUsize,
}

impl InFlightGauge {
    fn enter(&self) {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_seen.fetch_max(now, Ordering::SeqCst);
    }

    fn exit(&self) {
        self.current.fetch_sub(1, Ordering::SeqCst);
    }

    /// Highest number of simultaneous calls observed
    pub fn max_seen(&self) -> usize {
        self.max_seen.load(Ordering::SeqCst)
    }
}

/// Mock language-model client for testing translation behavior
#[derive(Debug)]
pub struct MockTranslationClient {
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter for intermittent failures
    request_count: Arc<AtomicUsize>,
    /// In-flight call gauge
    pub gauge: Arc<InFlightGauge>,
    /// Recorded translate requests
    pub translate_calls: Arc<Mutex<Vec<TranslateRequest>>>,
    /// Recorded selection requests
    pub selection_calls: Arc<Mutex<Vec<SelectionRequest>>>,
    /// Custom selection response generator (optional)
    selection_response: Option<fn(&SelectionRequest) -> SelectionResponse>,
}

impl MockTranslationClient {
    /// Create a new mock client with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            gauge: Arc::new(InFlightGauge::default()),
            translate_calls: Arc::new(Mutex::new(Vec::new())),
            selection_calls: Arc::new(Mutex::new(Vec::new())),
            selection_response: None,
        }
    }

    /// Create a working mock client that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a failing mock client that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create an intermittently failing mock client
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every })
    }

    /// Create a slow mock client for concurrency tests
    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Create a mock client that returns empty translations
    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Set a custom selection response generator
    pub fn with_selection_response(
        mut self,
        generator: fn(&SelectionRequest) -> SelectionResponse,
    ) -> Self {
        self.selection_response = Some(generator);
        self
    }

    /// Whether this request should fail under the current behavior
    fn should_fail(&self) -> bool {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst) + 1;
        match self.behavior {
            MockBehavior::Failing => true,
            MockBehavior::Intermittent { fail_every } => {
                fail_every > 0 && count % fail_every == 0
            }
            _ => false,
        }
    }

    async fn simulate_latency(&self) {
        if let MockBehavior::Slow { delay_ms } = self.behavior {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        }
    }
}

#[async_trait]
impl TranslationClient for MockTranslationClient {
    async fn translate(&self, request: TranslateRequest) -> Result<String, ProviderError> {
        self.gauge.enter();
        self.translate_calls.lock().push(request.clone());
        self.simulate_latency().await;
        let result = if self.should_fail() {
            Err(ProviderError::RequestFailed("mock translate failure".to_string()))
        } else if self.behavior == MockBehavior::Empty {
            Ok(String::new())
        } else {
            Ok(format!("[{}] {}", request.target_language, request.text))
        };
        self.gauge.exit();
        result
    }

    async fn select_model_and_translate(
        &self,
        request: SelectionRequest,
    ) -> Result<SelectionResponse, ProviderError> {
        self.gauge.enter();
        self.selection_calls.lock().push(request.clone());
        self.simulate_latency().await;
        let result = if self.should_fail() {
            Err(ProviderError::RequestFailed("mock selection failure".to_string()))
        } else if let Some(generator) = self.selection_response {
            Ok(generator(&request))
        } else {
            Ok(SelectionResponse {
                model_group_index: Some(0),
                ref_audio_index: Some(0),
                model_group_path: request.model_groups.first().cloned(),
                ref_audio_path: request.ref_audio_files.first().cloned(),
                translated_text: format!("[{}] {}", request.target_language, request.text),
                emotion: "neutral".to_string(),
            })
        };
        self.gauge.exit();
        result
    }
}

/// One recorded call against the mock synthesis backend
#[derive(Debug, Clone, PartialEq)]
pub enum SynthesisCall {
    /// GPT weights loaded
    SetGpt(String),
    /// SoVITS weights loaded
    SetSovits(String),
    /// Audio generated for the given target text
    Generate(String),
    /// Audio downloaded from the backend
    Download(String),
}

/// Mock synthesis backend recording every call in order
#[derive(Debug)]
pub struct MockSynthesisClient {
    /// Whether generate calls fail
    fail_generate: bool,
    /// Whether download calls fail
    fail_download: bool,
    /// Generation counter used for remote path naming
    generated: Arc<AtomicUsize>,
    /// In-flight call gauge (the pipeline must keep this at 1)
    pub gauge: Arc<InFlightGauge>,
    /// Ordered record of calls
    pub calls: Arc<Mutex<Vec<SynthesisCall>>>,
}

impl MockSynthesisClient {
    /// Create a working mock backend
    pub fn working() -> Self {
        Self {
            fail_generate: false,
            fail_download: false,
            generated: Arc::new(AtomicUsize::new(0)),
            gauge: Arc::new(InFlightGauge::default()),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a backend whose generate calls always fail
    pub fn failing_generate() -> Self {
        Self {
            fail_generate: true,
            ..Self::working()
        }
    }

    /// Create a backend whose download calls always fail
    pub fn failing_download() -> Self {
        Self {
            fail_download: true,
            ..Self::working()
        }
    }

    /// The GPT model paths loaded, in order
    pub fn gpt_loads(&self) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                SynthesisCall::SetGpt(path) => Some(path.clone()),
                _ => None,
            })
            .collect()
    }

    /// The target texts generated, in order
    pub fn generated_texts(&self) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                SynthesisCall::Generate(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl SynthesisClient for MockSynthesisClient {
    async fn set_gpt_model(&self, path: &str) -> Result<(), ProviderError> {
        self.gauge.enter();
        self.calls.lock().push(SynthesisCall::SetGpt(path.to_string()));
        tokio::task::yield_now().await;
        self.gauge.exit();
        Ok(())
    }

    async fn set_sovits_model(
        &self,
        path: &str,
        _prompt_language: &str,
        _text_language: &str,
    ) -> Result<(), ProviderError> {
        self.gauge.enter();
        self.calls.lock().push(SynthesisCall::SetSovits(path.to_string()));
        tokio::task::yield_now().await;
        self.gauge.exit();
        Ok(())
    }

    async fn generate_voice(&self, request: GenerateRequest) -> Result<String, ProviderError> {
        self.gauge.enter();
        self.calls
            .lock()
            .push(SynthesisCall::Generate(request.target_text.clone()));
        tokio::task::yield_now().await;
        let result = if self.fail_generate {
            Err(ProviderError::RequestFailed("mock generate failure".to_string()))
        } else {
            let seq = self.generated.fetch_add(1, Ordering::SeqCst);
            Ok(format!("remote/generated_{}.wav", seq))
        };
        self.gauge.exit();
        result
    }

    async fn download_audio(
        &self,
        remote_path: &str,
        local_path: &Path,
    ) -> Result<(), ProviderError> {
        self.gauge.enter();
        self.calls
            .lock()
            .push(SynthesisCall::Download(remote_path.to_string()));
        tokio::task::yield_now().await;
        let result = if self.fail_download {
            Err(ProviderError::ConnectionError("mock download failure".to_string()))
        } else {
            if let Some(parent) = local_path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    ProviderError::ConnectionError(format!("mock download io: {}", e))
                })?;
            }
            std::fs::write(local_path, b"RIFF mock audio").map_err(|e| {
                ProviderError::ConnectionError(format!("mock download io: {}", e))
            })
        };
        self.gauge.exit();
        result
    }
}
