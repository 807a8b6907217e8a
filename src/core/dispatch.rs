//! Fan-out orchestration of per-provider synthesis calls.
//!
//! The batch is embarrassingly parallel: one task per provider, no shared
//! mutable state, no ordering between completions. Results are returned only
//! once every call has settled, but each call runs under its own wall-clock
//! timeout so one slow provider cannot stall the batch indefinitely. A
//! cancellation token lets a newer submission abandon the whole batch
//! (best-effort; in-flight HTTP requests are simply dropped).

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::emotion::{ProviderId, RenderedRequest};
use super::tts::{AudioData, SynthesisError, Synthesizer};

/// Per-provider outcome of one dispatched batch.
pub type SynthesisResult = Result<AudioData, SynthesisError>;

/// One unit of work: a synthesizer plus the request rendered for it.
pub struct DispatchJob {
    pub synthesizer: Arc<dyn Synthesizer>,
    pub request: RenderedRequest,
}

/// Dispatches independent synthesis calls and collects settled results.
pub struct DispatchOrchestrator {
    timeout: Duration,
}

impl DispatchOrchestrator {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Run every job concurrently and return a result per provider once all
    /// have settled. A provider exceeding the timeout gets a `Timeout` entry;
    /// cancelling `cancel` marks the remaining providers `Cancelled`. No
    /// failure of one provider affects any other.
    pub async fn dispatch(
        &self,
        jobs: Vec<DispatchJob>,
        cancel: CancellationToken,
    ) -> HashMap<ProviderId, SynthesisResult> {
        let timeout = self.timeout;
        let handles: Vec<(ProviderId, tokio::task::JoinHandle<SynthesisResult>)> = jobs
            .into_iter()
            .map(|job| {
                let provider = job.synthesizer.provider();
                let token = cancel.clone();
                let handle = tokio::spawn(async move {
                    tokio::select! {
                        _ = token.cancelled() => Err(SynthesisError::Cancelled),
                        settled = tokio::time::timeout(
                            timeout,
                            job.synthesizer.synthesize(&job.request),
                        ) => match settled {
                            Ok(result) => result,
                            Err(_) => Err(SynthesisError::Timeout(format!(
                                "no response within {}s",
                                timeout.as_secs()
                            ))),
                        },
                    }
                });
                (provider, handle)
            })
            .collect();

        let mut results = HashMap::with_capacity(handles.len());
        let (providers, futures): (Vec<_>, Vec<_>) = handles.into_iter().unzip();
        for (provider, joined) in providers.into_iter().zip(join_all(futures).await) {
            let result = match joined {
                Ok(result) => result,
                Err(e) => Err(SynthesisError::Internal(format!("synthesis task: {e}"))),
            };
            match &result {
                Ok(audio) => debug!(%provider, bytes = audio.data.len(), "synthesis succeeded"),
                Err(err) => warn!(%provider, kind = err.kind(), "synthesis failed: {err}"),
            }
            results.insert(provider, result);
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::audio::AudioFormat;
    use async_trait::async_trait;
    use std::time::Instant;

    struct MockSynthesizer {
        provider: ProviderId,
        delay: Duration,
        fail: Option<SynthesisError>,
    }

    #[async_trait]
    impl Synthesizer for MockSynthesizer {
        fn provider(&self) -> ProviderId {
            self.provider
        }

        fn voice_id(&self) -> &str {
            "mock"
        }

        async fn synthesize(
            &self,
            _request: &RenderedRequest,
        ) -> Result<AudioData, SynthesisError> {
            tokio::time::sleep(self.delay).await;
            match &self.fail {
                Some(err) => Err(err.clone()),
                None => Ok(AudioData {
                    data: vec![0xFF, 0xFB, 0x01],
                    format: AudioFormat::Mp3,
                }),
            }
        }
    }

    fn job(provider: ProviderId, delay_ms: u64, fail: Option<SynthesisError>) -> DispatchJob {
        DispatchJob {
            synthesizer: Arc::new(MockSynthesizer {
                provider,
                delay: Duration::from_millis(delay_ms),
                fail,
            }),
            request: RenderedRequest {
                provider,
                model: "mock-model".to_string(),
                text: "hello".to_string(),
                description: None,
            },
        }
    }

    #[tokio::test]
    async fn test_all_providers_settle() {
        let orchestrator = DispatchOrchestrator::new(Duration::from_secs(5));
        let jobs = ProviderId::ALL
            .into_iter()
            .map(|id| job(id, 5, None))
            .collect();
        let results = orchestrator
            .dispatch(jobs, CancellationToken::new())
            .await;

        assert_eq!(results.len(), 5);
        for id in ProviderId::ALL {
            assert!(results[&id].is_ok(), "{id} should have audio");
        }
    }

    #[tokio::test]
    async fn test_one_timeout_does_not_delay_or_fail_others() {
        let orchestrator = DispatchOrchestrator::new(Duration::from_millis(100));
        let jobs = vec![
            job(ProviderId::Cartesia, 5, None),
            job(ProviderId::Inworld, 5, None),
            // ElevenLabs hangs well past the timeout.
            job(ProviderId::ElevenLabs, 10_000, None),
            job(ProviderId::Hume, 5, None),
            job(ProviderId::Speechify, 5, None),
        ];

        let started = Instant::now();
        let results = orchestrator
            .dispatch(jobs, CancellationToken::new())
            .await;
        let elapsed = started.elapsed();

        assert_eq!(results.len(), 5);
        assert!(results[&ProviderId::Cartesia].is_ok());
        assert!(results[&ProviderId::Inworld].is_ok());
        assert!(results[&ProviderId::Hume].is_ok());
        assert!(results[&ProviderId::Speechify].is_ok());
        assert!(matches!(
            results[&ProviderId::ElevenLabs],
            Err(SynthesisError::Timeout(_))
        ));
        // The batch settles within one timeout window, not the hang duration.
        assert!(elapsed < Duration::from_secs(2), "took {elapsed:?}");
    }

    #[tokio::test]
    async fn test_failures_are_isolated_per_provider() {
        let orchestrator = DispatchOrchestrator::new(Duration::from_secs(5));
        let jobs = vec![
            job(ProviderId::Cartesia, 5, None),
            job(
                ProviderId::Hume,
                5,
                Some(SynthesisError::ProviderApiError {
                    status: 401,
                    body: "bad key".to_string(),
                }),
            ),
            job(
                ProviderId::Speechify,
                5,
                Some(SynthesisError::NetworkError("connection reset".to_string())),
            ),
        ];
        let results = orchestrator
            .dispatch(jobs, CancellationToken::new())
            .await;

        assert!(results[&ProviderId::Cartesia].is_ok());
        assert!(matches!(
            results[&ProviderId::Hume],
            Err(SynthesisError::ProviderApiError { status: 401, .. })
        ));
        assert!(matches!(
            results[&ProviderId::Speechify],
            Err(SynthesisError::NetworkError(_))
        ));
    }

    #[tokio::test]
    async fn test_cancellation_abandons_in_flight_calls() {
        let cancel = CancellationToken::new();
        let jobs = vec![
            job(ProviderId::Cartesia, 10_000, None),
            job(ProviderId::Hume, 10_000, None),
        ];

        let token = cancel.clone();
        let dispatched = tokio::spawn(async move {
            DispatchOrchestrator::new(Duration::from_secs(30))
                .dispatch(jobs, token)
                .await
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        cancel.cancel();

        let results = dispatched.await.unwrap();
        assert_eq!(results.len(), 2);
        for result in results.values() {
            assert!(matches!(result, Err(SynthesisError::Cancelled)));
        }
    }

    #[tokio::test]
    async fn test_empty_batch_returns_empty_map() {
        let orchestrator = DispatchOrchestrator::new(Duration::from_secs(1));
        let results = orchestrator
            .dispatch(Vec::new(), CancellationToken::new())
            .await;
        assert!(results.is_empty());
    }
}
