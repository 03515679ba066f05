//! Provider capability trait and the ordered fallback chain.

use async_trait::async_trait;
use futures::stream::BoxStream;
use tracing::warn;

use crate::github::error::ActivityError;

use super::prompt::ActivityPrompt;

/// A stream of plain-text summary deltas.
pub type SummaryStream = BoxStream<'static, Result<String, ActivityError>>;

/// One summarisation backend.
#[async_trait]
pub trait SummaryProvider: Send + Sync {
    /// Stable provider name for logging.
    fn name(&self) -> &'static str;

    /// Opens a streaming summary for the prompt.
    ///
    /// Success means the stream started; mid-stream failures surface as
    /// error items on the returned stream and are not retried.
    ///
    /// # Errors
    ///
    /// Returns [`ActivityError`] when the request cannot be issued or the
    /// provider rejects it before streaming begins.
    async fn stream_summary(&self, prompt: &ActivityPrompt)
    -> Result<SummaryStream, ActivityError>;
}

/// Ordered list of providers tried until one accepts the request.
pub struct SummarizerChain {
    providers: Vec<Box<dyn SummaryProvider>>,
}

impl SummarizerChain {
    /// Creates a chain from an ordered provider list.
    #[must_use]
    pub fn new(providers: Vec<Box<dyn SummaryProvider>>) -> Self {
        Self { providers }
    }

    /// Returns true when no provider is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Tries each provider in order, returning the first accepted stream.
    ///
    /// # Errors
    ///
    /// Returns [`ActivityError::SummaryUnavailable`] once every provider has
    /// been tried, carrying the last failure.
    pub async fn stream_summary(
        &self,
        prompt: &ActivityPrompt,
    ) -> Result<SummaryStream, ActivityError> {
        let mut last_failure: Option<ActivityError> = None;

        for provider in &self.providers {
            match provider.stream_summary(prompt).await {
                Ok(stream) => return Ok(stream),
                Err(error) => {
                    warn!(
                        provider = provider.name(),
                        %error,
                        "summary provider failed, falling through"
                    );
                    last_failure = Some(error);
                }
            }
        }

        let message = last_failure.map_or_else(
            || "no summary provider is configured".to_owned(),
            |error| format!("all summary providers failed, last error: {error}"),
        );
        Err(ActivityError::SummaryUnavailable { message })
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use futures::StreamExt;

    use crate::github::error::ActivityError;
    use crate::summarize::prompt::ActivityPrompt;

    use super::{SummarizerChain, SummaryProvider, SummaryStream};

    struct StubProvider {
        name: &'static str,
        outcome: Result<Vec<&'static str>, ActivityError>,
    }

    #[async_trait]
    impl SummaryProvider for StubProvider {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn stream_summary(
            &self,
            _prompt: &ActivityPrompt,
        ) -> Result<SummaryStream, ActivityError> {
            match &self.outcome {
                Ok(chunks) => {
                    let items: Vec<Result<String, ActivityError>> =
                        chunks.iter().map(|chunk| Ok((*chunk).to_owned())).collect();
                    Ok(futures::stream::iter(items).boxed())
                }
                Err(error) => Err(error.clone()),
            }
        }
    }

    fn prompt() -> ActivityPrompt {
        ActivityPrompt::new(&[], &[], "octocat")
    }

    async fn collect(stream: SummaryStream) -> String {
        stream
            .filter_map(|item| async move { item.ok() })
            .collect::<Vec<String>>()
            .await
            .concat()
    }

    #[tokio::test]
    async fn chain_returns_the_first_provider_that_accepts() {
        let chain = SummarizerChain::new(vec![
            Box::new(StubProvider {
                name: "first",
                outcome: Err(ActivityError::Api {
                    status: Some(500),
                    message: "overloaded".to_owned(),
                }),
            }),
            Box::new(StubProvider {
                name: "second",
                outcome: Ok(vec!["hello ", "world"]),
            }),
        ]);

        let stream = chain
            .stream_summary(&prompt())
            .await
            .expect("second provider should accept");
        assert_eq!(collect(stream).await, "hello world");
    }

    #[tokio::test]
    async fn chain_fails_only_after_every_provider() {
        let chain = SummarizerChain::new(vec![
            Box::new(StubProvider {
                name: "first",
                outcome: Err(ActivityError::Network {
                    message: "unreachable".to_owned(),
                }),
            }),
            Box::new(StubProvider {
                name: "second",
                outcome: Err(ActivityError::Api {
                    status: Some(429),
                    message: "throttled".to_owned(),
                }),
            }),
        ]);

        let error = chain
            .stream_summary(&prompt())
            .await
            .err()
            .expect("chain should be exhausted");

        let ActivityError::SummaryUnavailable { message } = error else {
            panic!("expected SummaryUnavailable, got {error:?}");
        };
        assert!(message.contains("throttled"), "unexpected message: {message}");
    }

    #[tokio::test]
    async fn empty_chain_reports_missing_configuration() {
        let chain = SummarizerChain::new(vec![]);
        let error = chain
            .stream_summary(&prompt())
            .await
            .err()
            .expect("empty chain should fail");

        assert!(matches!(error, ActivityError::SummaryUnavailable { .. }));
    }
}
