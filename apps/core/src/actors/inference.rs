use crate::actors::messages::{AppError, InferenceMessage};
use crate::models::PipelineConfig;
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Client;
use std::sync::LazyLock;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;
use tracing::{debug, info};

/// Matches the first JSON object or array inside free-form generated text.
/// The service wraps its JSON in prose often enough that parsing the raw body
/// directly is a losing game.
static JSON_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}|\[.*\]").expect("Invalid regex: JSON block"));

/// A handle to the inference client actor.
///
/// This struct provides a public, cloneable interface for sending requests to
/// the running client task. It abstracts away the `mpsc::Sender`.
#[derive(Clone)]
pub struct InferenceClientHandle {
    sender: mpsc::Sender<InferenceMessage>,
    overall_timeout: Duration,
}

impl InferenceClientHandle {
    /// Creates a new inference client actor and returns a handle to it.
    ///
    /// The actor owns the HTTP client; endpoint, model id, credentials, and
    /// timeout all come from `config`; nothing is read from the environment.
    pub fn new(config: &PipelineConfig) -> Self {
        let (sender, receiver) = mpsc::channel(32);
        let actor = InferenceRunner::new(receiver, config);
        tokio::spawn(async move { actor.run().await });
        Self {
            sender,
            // Leave room for the runner's own request timeout to fire first.
            overall_timeout: config.request_timeout() + Duration::from_secs(5),
        }
    }

    /// Requests one completion and returns the JSON block extracted from the
    /// service's `generated_text`.
    pub async fn complete(
        &self,
        prompt: String,
        input: String,
        temperature: f32,
    ) -> Result<String, AppError> {
        let (send, recv) = oneshot::channel();
        let msg = InferenceMessage::Complete {
            prompt,
            input,
            temperature,
            responder: send,
        };

        self.sender
            .send(msg)
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?;
        timeout(self.overall_timeout, recv)
            .await?
            .map_err(|e| AppError::Internal(e.to_string()))?
    }
}

// --- Actor Runner (Internal Logic) ---
struct InferenceRunner {
    receiver: mpsc::Receiver<InferenceMessage>,
    client: Client,
    endpoint: String,
    model_id: String,
    api_key: String,
    request_timeout: Duration,
    max_tokens: u32,
}

impl InferenceRunner {
    fn new(receiver: mpsc::Receiver<InferenceMessage>, config: &PipelineConfig) -> Self {
        Self {
            receiver,
            client: Client::new(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model_id: config.model_id.clone(),
            api_key: config.api_key.clone(),
            request_timeout: config.request_timeout(),
            max_tokens: config.max_tokens,
        }
    }

    async fn run(mut self) {
        info!("Inference client started");

        while let Some(msg) = self.receiver.recv().await {
            self.handle_message(msg).await;
        }

        info!("Inference client stopped");
    }

    async fn handle_message(&mut self, msg: InferenceMessage) {
        match msg {
            InferenceMessage::Complete {
                prompt,
                input,
                temperature,
                responder,
            } => {
                let result = self.complete_request(prompt, input, temperature).await;
                let _ = responder.send(result);
            }
        }
    }

    fn build_headers(&self) -> Result<HeaderMap, AppError> {
        let mut headers = HeaderMap::new();
        if !self.api_key.is_empty() {
            let value = HeaderValue::from_str(&format!("Bearer {}", self.api_key))
                .map_err(|e| AppError::Config(format!("Invalid API key: {}", e)))?;
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }

    async fn complete_request(
        &self,
        prompt: String,
        input: String,
        temperature: f32,
    ) -> Result<String, AppError> {
        debug!("Inference request - temperature={}", temperature);

        let payload = serde_json::json!({
            "prompt": prompt,
            "inputs": [input],
            "temperature": temperature,
            "max_tokens": self.max_tokens,
        });

        let url = format!("{}/inference/{}", self.endpoint, self.model_id);
        let request_future = self
            .client
            .post(url)
            .headers(self.build_headers()?)
            .json(&payload)
            .send();

        let res = timeout(self.request_timeout, request_future).await??;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!(
                "Inference request failed with status {}: {}",
                status, body
            )));
        }

        let json: serde_json::Value = res
            .json()
            .await
            .map_err(|e| AppError::MalformedResponse(e.to_string()))?;

        let generated = json
            .get("generated_text")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                AppError::MalformedResponse("response is missing generated_text".to_string())
            })?;

        extract_json_block(generated)
    }
}

/// Pulls the first JSON object or array out of generated text.
pub fn extract_json_block(generated: &str) -> Result<String, AppError> {
    JSON_BLOCK
        .find(generated)
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| {
            AppError::MalformedResponse("no JSON block in generated text".to_string())
        })
}
