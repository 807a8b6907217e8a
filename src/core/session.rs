//! One comparison submission end to end.
//!
//! A session owns the shared HTTP client, the dispatcher, and the
//! cancellation token of the in-flight batch. Submitting new text cancels
//! whatever the previous submission still has running, then parses once,
//! renders per provider, and fans out synthesis calls for every provider
//! that has a credential. Per-provider failures land in their own result
//! slot; only unparseable input fails the submission itself.

use std::collections::HashSet;

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::EvalConfig;
use crate::core::dispatch::{DispatchJob, DispatchOrchestrator};
use crate::core::emotion::{
    CapabilityWarning, ProviderId, RenderError, TagError, parse_tags, profile_for, render,
};
use crate::core::tts::{AudioData, SynthesisError, create_synthesizer, http_client};

/// Why one provider's slot has no audio.
#[derive(Debug, Clone, thiserror::Error)]
pub enum OutcomeError {
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Synthesis(#[from] SynthesisError),
}

/// Everything the UI layer needs to show for one provider column.
#[derive(Debug, Clone)]
pub struct ProviderOutcome {
    pub provider: ProviderId,
    pub model: String,
    /// Provider-ready text, when rendering got that far.
    pub rendered_text: Option<String>,
    /// Voice the synthesizer would use, when one was constructed.
    pub voice_id: Option<String>,
    /// Emotions the provider/model combination could not express.
    pub warnings: Vec<CapabilityWarning>,
    pub result: Result<AudioData, OutcomeError>,
}

/// Result of one submission: a slot per requested provider, in request order.
#[derive(Debug, Clone)]
pub struct ComparisonReport {
    pub base_text: String,
    pub outcomes: Vec<ProviderOutcome>,
}

impl ComparisonReport {
    pub fn outcome(&self, provider: ProviderId) -> Option<&ProviderOutcome> {
        self.outcomes.iter().find(|o| o.provider == provider)
    }

    pub fn success_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }
}

pub struct ComparisonSession {
    config: EvalConfig,
    client: reqwest::Client,
    orchestrator: DispatchOrchestrator,
    /// Token of the batch currently in flight, replaced on every submission.
    cancel: Mutex<CancellationToken>,
}

// A slot under construction; `result` stays None until dispatch settles it.
struct Slot {
    provider: ProviderId,
    model: String,
    rendered_text: Option<String>,
    voice_id: Option<String>,
    warnings: Vec<CapabilityWarning>,
    result: Option<Result<AudioData, OutcomeError>>,
}

impl Slot {
    fn settled(provider: ProviderId, model: &str, err: OutcomeError) -> Self {
        Slot {
            provider,
            model: model.to_string(),
            rendered_text: None,
            voice_id: None,
            warnings: Vec::new(),
            result: Some(Err(err)),
        }
    }
}

impl ComparisonSession {
    pub fn new(config: EvalConfig) -> Result<Self, SynthesisError> {
        let client = http_client(config.connect_timeout(), config.request_timeout())?;
        let orchestrator = DispatchOrchestrator::new(config.request_timeout());
        Ok(Self {
            config,
            client,
            orchestrator,
            cancel: Mutex::new(CancellationToken::new()),
        })
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    /// Cancel whatever the previous submission still has in flight.
    pub async fn cancel_in_flight(&self) {
        self.cancel.lock().await.cancel();
    }

    /// Cancel the in-flight batch and install a fresh token for the next one.
    async fn supersede(&self) -> CancellationToken {
        let mut guard = self.cancel.lock().await;
        guard.cancel();
        *guard = CancellationToken::new();
        guard.clone()
    }

    /// Run one comparison: parse `text`, render it for each `(provider,
    /// model)` selection, and synthesize in parallel wherever a credential is
    /// configured. Each provider appears at most once; a repeated selection
    /// gets a configuration error in its own slot.
    ///
    /// Only an invalid emotion tag fails the whole call, so the caller keeps
    /// the raw input to correct. Everything else is reported per slot.
    pub async fn submit(
        &self,
        text: &str,
        selections: &[(ProviderId, String)],
    ) -> Result<ComparisonReport, TagError> {
        let tagged = parse_tags(text)?;
        info!(
            providers = selections.len(),
            emotions = tagged.markers.len(),
            "submitting comparison"
        );

        let mut seen: HashSet<ProviderId> = HashSet::new();
        let mut slots: Vec<Slot> = Vec::with_capacity(selections.len());
        let mut jobs: Vec<DispatchJob> = Vec::new();

        for (provider, model) in selections {
            let provider = *provider;
            if !seen.insert(provider) {
                slots.push(Slot::settled(
                    provider,
                    model,
                    SynthesisError::InvalidConfiguration(format!(
                        "{provider} selected more than once"
                    ))
                    .into(),
                ));
                continue;
            }

            let rendered = match render(&tagged, profile_for(provider), model) {
                Ok(rendered) => rendered,
                Err(e) => {
                    slots.push(Slot::settled(provider, model, e.into()));
                    continue;
                }
            };

            let Some(api_key) = self.config.api_key(provider) else {
                slots.push(Slot {
                    provider,
                    model: model.clone(),
                    rendered_text: Some(rendered.request.text.clone()),
                    voice_id: None,
                    warnings: rendered.warnings,
                    result: Some(Err(SynthesisError::MissingCredential(provider).into())),
                });
                continue;
            };

            match create_synthesizer(provider, api_key, self.client.clone()) {
                Ok(synthesizer) => {
                    slots.push(Slot {
                        provider,
                        model: model.clone(),
                        rendered_text: Some(rendered.request.text.clone()),
                        voice_id: Some(synthesizer.voice_id().to_string()),
                        warnings: rendered.warnings,
                        result: None,
                    });
                    jobs.push(DispatchJob {
                        synthesizer,
                        request: rendered.request,
                    });
                }
                Err(e) => slots.push(Slot::settled(provider, model, e.into())),
            }
        }

        // Supersede the previous batch before starting this one.
        let token = self.supersede().await;

        let mut results = self.orchestrator.dispatch(jobs, token).await;

        let outcomes = slots
            .into_iter()
            .map(|slot| {
                let result = match slot.result {
                    Some(result) => result,
                    None => match results.remove(&slot.provider) {
                        Some(result) => result.map_err(OutcomeError::from),
                        None => Err(SynthesisError::Internal(
                            "dispatch returned no result for provider".to_string(),
                        )
                        .into()),
                    },
                };
                ProviderOutcome {
                    provider: slot.provider,
                    model: slot.model,
                    rendered_text: slot.rendered_text,
                    voice_id: slot.voice_id,
                    warnings: slot.warnings,
                    result,
                }
            })
            .collect();

        Ok(ComparisonReport {
            base_text: tagged.base_text,
            outcomes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::emotion::{EmotionTag, RenderedRequest};
    use crate::core::tts::Synthesizer;
    use crate::utils::audio::AudioFormat;
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::time::Duration;

    fn keyless_session() -> ComparisonSession {
        ComparisonSession::new(EvalConfig::default()).unwrap()
    }

    struct SlowSynthesizer(ProviderId);

    #[async_trait]
    impl Synthesizer for SlowSynthesizer {
        fn provider(&self) -> ProviderId {
            self.0
        }

        fn voice_id(&self) -> &str {
            "slow"
        }

        async fn synthesize(
            &self,
            _request: &RenderedRequest,
        ) -> Result<AudioData, SynthesisError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(AudioData {
                data: vec![0xFF, 0xFB],
                format: AudioFormat::Mp3,
            })
        }
    }

    fn all_defaults() -> Vec<(ProviderId, String)> {
        ProviderId::ALL
            .into_iter()
            .map(|id| (id, profile_for(id).default_model().to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_missing_credentials_fill_every_slot() {
        let session = keyless_session();
        let report = session
            .submit("Hello there.", &all_defaults())
            .await
            .unwrap();

        assert_eq!(report.base_text, "Hello there.");
        assert_eq!(report.outcomes.len(), 5);
        assert_eq!(report.success_count(), 0);
        for outcome in &report.outcomes {
            assert!(
                matches!(
                    &outcome.result,
                    Err(OutcomeError::Synthesis(SynthesisError::MissingCredential(p)))
                        if *p == outcome.provider
                ),
                "{} should be missing its credential",
                outcome.provider
            );
            // Rendering still happened, so the text is inspectable.
            assert_eq!(outcome.rendered_text.as_deref(), Some("Hello there."));
        }
    }

    #[tokio::test]
    async fn test_invalid_tag_fails_the_submission() {
        let session = keyless_session();
        let err = session
            .submit("<tag>joy</tag> Hello.", &all_defaults())
            .await
            .unwrap_err();
        assert!(matches!(err, TagError::InvalidEmotionTag { .. }));
    }

    #[tokio::test]
    async fn test_empty_text_is_a_per_slot_render_error() {
        let session = keyless_session();
        let report = session.submit("   ", &all_defaults()).await.unwrap();

        assert_eq!(report.outcomes.len(), 5);
        for outcome in &report.outcomes {
            assert!(matches!(&outcome.result, Err(OutcomeError::Render(_))));
            assert!(outcome.rendered_text.is_none());
        }
    }

    #[tokio::test]
    async fn test_capability_warnings_survive_missing_credentials() {
        let session = keyless_session();
        let report = session
            .submit(
                "<tag>laughter</tag> What a day.",
                &[(ProviderId::Speechify, "simba-english".to_string())],
            )
            .await
            .unwrap();

        let outcome = report.outcome(ProviderId::Speechify).unwrap();
        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(outcome.warnings[0].emotion, EmotionTag::Laughter);
        assert!(matches!(
            &outcome.result,
            Err(OutcomeError::Synthesis(SynthesisError::MissingCredential(_)))
        ));
    }

    #[test]
    fn test_config_is_readable_after_construction() {
        let session = keyless_session();
        assert_eq!(session.config().request_timeout_seconds, 60);
        assert!(session.config().configured_providers().is_empty());
    }

    #[tokio::test]
    async fn test_resubmission_replaces_the_cancellation_token() {
        let session = keyless_session();
        let first = session.supersede().await;
        assert!(!first.is_cancelled());

        let second = session.supersede().await;
        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancel_in_flight_cancels_the_current_token() {
        let session = keyless_session();
        let token = session.supersede().await;
        session.cancel_in_flight().await;
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn test_new_submission_supersedes_in_flight_synthesis() {
        let session = Arc::new(keyless_session());
        let token = session.supersede().await;

        // A batch held open by a synthesizer that will not finish on its own.
        let jobs = vec![DispatchJob {
            synthesizer: Arc::new(SlowSynthesizer(ProviderId::Cartesia)),
            request: RenderedRequest {
                provider: ProviderId::Cartesia,
                model: "sonic-3".to_string(),
                text: "Hello.".to_string(),
                description: None,
            },
        }];
        let in_flight = {
            let session = session.clone();
            tokio::spawn(async move { session.orchestrator.dispatch(jobs, token).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        // Submitting new text must abandon the batch above.
        let report = session
            .submit("Hello again.", &[(ProviderId::Hume, "2".to_string())])
            .await
            .unwrap();
        assert_eq!(report.outcomes.len(), 1);

        let results = in_flight.await.unwrap();
        assert!(matches!(
            results[&ProviderId::Cartesia],
            Err(SynthesisError::Cancelled)
        ));
    }

    #[tokio::test]
    async fn test_duplicate_provider_selection_is_rejected_per_slot() {
        let session = keyless_session();
        let report = session
            .submit(
                "Hello.",
                &[
                    (ProviderId::Hume, "1".to_string()),
                    (ProviderId::Hume, "2".to_string()),
                ],
            )
            .await
            .unwrap();

        assert_eq!(report.outcomes.len(), 2);
        assert!(matches!(
            &report.outcomes[0].result,
            Err(OutcomeError::Synthesis(SynthesisError::MissingCredential(_)))
        ));
        assert!(matches!(
            &report.outcomes[1].result,
            Err(OutcomeError::Synthesis(
                SynthesisError::InvalidConfiguration(_)
            ))
        ));
    }
}
