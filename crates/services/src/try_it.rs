use std::sync::Arc;

use tutor_core::model::{CompletionRequest, SamplingSettings};

use crate::completion_service::CompletionClient;

/// Runs "try it yourself" requests and turns failures into display text.
#[derive(Clone)]
pub struct TryItService {
    client: Arc<dyn CompletionClient>,
    sampling: SamplingSettings,
}

impl TryItService {
    #[must_use]
    pub fn new(client: Arc<dyn CompletionClient>, sampling: SamplingSettings) -> Self {
        Self { client, sampling }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.client.enabled()
    }

    /// Sampling defaults for a fresh panel.
    #[must_use]
    pub fn default_sampling(&self) -> SamplingSettings {
        self.sampling.clone()
    }

    /// Send `request`; the error side carries the message to show inline.
    ///
    /// # Errors
    ///
    /// Returns the display text of the underlying `CompletionError`.
    pub async fn run(&self, request: &CompletionRequest) -> Result<String, String> {
        self.client.complete(request).await.map_err(|err| {
            tracing::warn!(model = %request.model_name, error = %err, "completion failed");
            err.to_string()
        })
    }
}
