//! Bounded provider calls.

use std::time::Duration;

use switchboard_providers::{Completion, CompletionProvider, CompletionRequest, ProviderError};

/// Run one completion, failing with [`ProviderError::Timeout`] if it takes
/// longer than `limit`.
pub(crate) async fn complete_within(
    provider: &dyn CompletionProvider,
    request: CompletionRequest,
    limit: Duration,
) -> Result<Completion, ProviderError> {
    match tokio::time::timeout(limit, provider.complete(request)).await {
        Ok(result) => result,
        Err(_) => Err(ProviderError::Timeout {
            duration_secs: limit.as_secs(),
        }),
    }
}
