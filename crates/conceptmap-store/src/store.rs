//! Session state transitions.

use conceptmap_core::{ConceptGraph, ImportError, SavedSession, Session, WeightBounds, ROOT_KEY};
use indexmap::IndexSet;

use crate::config::StoreConfig;
use crate::generate::TextGenerator;
use crate::parse::{self, Candidate, ParseError};
use crate::prompt::{self, ExplanationLength};
use crate::retry::RetryPolicy;

/// Explanation shown when the collaborator could not produce one; the
/// transition itself still succeeds and can be refreshed later.
const EXPLANATION_FALLBACK: &str =
    "The explanation could not be generated. Reload it once the generation service is reachable.";

/// Typed transition failures. Every variant leaves the caller's session
/// exactly as it was.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("subject is empty")]
    EmptyTerm,
    #[error("unknown concept: {0:?}")]
    UnknownConcept(String),
    #[error("the root concept cannot be expanded")]
    RootNotExpandable,
    #[error("generation service unavailable after {attempts} attempts")]
    CollaboratorUnavailable { attempts: u32 },
    #[error("no usable candidates after {attempts} attempts")]
    UnparsableResponse { attempts: u32 },
    #[error("malformed import: {0}")]
    MalformedImport(#[from] ImportError),
    #[error("failed to serialize session: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// The Concept Graph Store: state transitions over copy-on-write
/// [`Session`] snapshots, backed by a generation collaborator.
///
/// The store itself is stateless between calls; the caller owns every
/// snapshot, and the orchestration layer is responsible for serializing
/// transitions on one session so two never race on the same snapshot.
pub struct ConceptStore<G> {
    generator: G,
    retry: RetryPolicy,
    cfg: StoreConfig,
    bounds: WeightBounds,
}

impl<G: TextGenerator> ConceptStore<G> {
    pub fn new(generator: G) -> Self {
        Self::with_config(generator, StoreConfig::default(), RetryPolicy::default())
    }

    pub fn with_config(generator: G, cfg: StoreConfig, retry: RetryPolicy) -> Self {
        Self {
            generator,
            retry,
            cfg,
            bounds: WeightBounds::default(),
        }
    }

    /// Build a fresh session around `term`: the root plus up to
    /// `starter_terms` generated children, an all-unclicked partition and an
    /// initial explanation.
    pub async fn create(&self, term: &str) -> Result<Session, StoreError> {
        let subject = term.trim();
        if subject.is_empty() {
            return Err(StoreError::EmptyTerm);
        }

        let request = prompt::starter_prompt(subject, self.cfg.starter_terms);
        let candidates = self
            .candidates_with_retry(&request, self.cfg.starter_terms)
            .await?;

        let mut nodes = ConceptGraph::with_root(Some(subject));
        for candidate in &candidates {
            if !nodes.insert_child(ROOT_KEY, &candidate.term, candidate.distance, candidate.breadth)
            {
                tracing::debug!(term = %candidate.term, "duplicate concept ignored");
            }
        }
        nodes.normalize_weights(&self.bounds);
        tracing::info!(subject, concepts = nodes.len() - 1, "created concept map");

        let clicked = Vec::new();
        let unclicked: IndexSet<String> = nodes.non_root_keys().map(str::to_string).collect();
        let explanation = self
            .explanation_or_fallback(subject, &clicked, &unclicked)
            .await;

        Ok(Session {
            nodes,
            clicked,
            unclicked,
            explanation,
            focus: ROOT_KEY.to_string(),
        })
    }

    /// Mark `clicked_key` as known and grow up to `further_terms` children
    /// under it. A second click on an already-expanded key is an idempotent
    /// no-op and never reaches the collaborator.
    pub async fn expand(&self, session: &Session, clicked_key: &str) -> Result<Session, StoreError> {
        if session.clicked.iter().any(|k| k == clicked_key) {
            tracing::debug!(concept = clicked_key, "already expanded");
            return Ok(session.clone());
        }
        if clicked_key == ROOT_KEY {
            return Err(StoreError::RootNotExpandable);
        }
        if !session.nodes.contains(clicked_key) {
            return Err(StoreError::UnknownConcept(clicked_key.to_string()));
        }

        let subject = session.subject().unwrap_or(ROOT_KEY).to_string();

        // Prospective partition: the clicked key counts as known when
        // conditioning the collaborator, even though the session is only
        // rebuilt after the call succeeds.
        let known: Vec<String> = session
            .clicked
            .iter()
            .cloned()
            .chain([clicked_key.to_string()])
            .collect();
        let unknown: Vec<String> = session
            .unclicked
            .iter()
            .filter(|k| *k != clicked_key)
            .cloned()
            .collect();

        let request = prompt::further_prompt(&subject, &known, &unknown, self.cfg.further_terms);
        let candidates = self
            .candidates_with_retry(&request, self.cfg.further_terms)
            .await?;

        let mut next = session.clone();
        next.unclicked.shift_remove(clicked_key);
        next.clicked.push(clicked_key.to_string());

        let mut added = 0usize;
        for candidate in &candidates {
            if next
                .nodes
                .insert_child(clicked_key, &candidate.term, candidate.distance, candidate.breadth)
            {
                next.unclicked.insert(candidate.term.clone());
                added += 1;
            } else {
                tracing::debug!(term = %candidate.term, "duplicate concept ignored");
            }
        }
        next.nodes.normalize_weights(&self.bounds);
        tracing::info!(concept = clicked_key, added, "expanded concept");

        next.explanation = self
            .explanation_or_fallback(&subject, &next.clicked, &next.unclicked)
            .await;
        next.focus = clicked_key.to_string();
        Ok(next)
    }

    /// The canonical empty session.
    pub fn reset(&self) -> Session {
        Session::initial()
    }

    /// Restore a session from a persisted document. Weights are re-derived
    /// and focus returns to the root; structural problems surface as
    /// [`StoreError::MalformedImport`] with no retry.
    pub fn import(&self, serialized: &str) -> Result<Session, StoreError> {
        let saved = SavedSession::from_json(serialized)?;
        Ok(Session::restore(saved, &self.bounds)?)
    }

    /// Serialize a session into the exact document [`Self::import`] accepts.
    pub fn export(&self, session: &Session) -> Result<String, StoreError> {
        Ok(session.to_saved().to_json()?)
    }

    /// Re-generate the explanation for the current partition at the given
    /// verbosity. Unlike `create`/`expand`, a failure here is propagated:
    /// the refreshed text is the entire point of the call.
    pub async fn refresh_explanation(
        &self,
        session: &Session,
        length: ExplanationLength,
    ) -> Result<Session, StoreError> {
        let subject = session.subject().ok_or(StoreError::EmptyTerm)?.to_string();
        let unknown: Vec<String> = session.unclicked.iter().cloned().collect();
        let request = prompt::explanation_prompt(&subject, &session.clicked, &unknown, length);
        let text = self.text_with_retry(&request).await?;

        let mut next = session.clone();
        next.explanation = text.trim().to_string();
        Ok(next)
    }

    /// Follow-up concepts the user could learn next, given the current
    /// partition. Plain terms, no weights, not added to the map.
    pub async fn suggest(&self, session: &Session) -> Result<Vec<String>, StoreError> {
        let unknown: Vec<String> = session.unclicked.iter().cloned().collect();
        let request =
            prompt::suggestion_prompt(&session.clicked, &unknown, self.cfg.suggestion_terms);
        self.with_retry(&request, |text| {
            parse::parse_suggestions(text, self.cfg.suggestion_terms)
        })
        .await
    }

    // ----- Collaborator plumbing -----

    async fn explanation_or_fallback(
        &self,
        subject: &str,
        known: &[String],
        unclicked: &IndexSet<String>,
    ) -> String {
        let unknown: Vec<String> = unclicked.iter().cloned().collect();
        let request =
            prompt::explanation_prompt(subject, known, &unknown, self.cfg.explanation_length);
        match self.text_with_retry(&request).await {
            Ok(text) => text.trim().to_string(),
            Err(err) => {
                tracing::warn!(%err, "explanation generation failed, using fallback");
                EXPLANATION_FALLBACK.to_string()
            }
        }
    }

    async fn candidates_with_retry(
        &self,
        request: &str,
        want: usize,
    ) -> Result<Vec<Candidate>, StoreError> {
        self.with_retry(request, |text| parse::parse_candidates(text, want))
            .await
    }

    async fn text_with_retry(&self, request: &str) -> Result<String, StoreError> {
        self.with_retry(request, |text| Ok(text.to_string())).await
    }

    /// One bounded retry loop for every collaborator call. A timeout counts
    /// as a transport failure; exhaustion surfaces as the last failure kind.
    async fn with_retry<T, F>(&self, request: &str, parse: F) -> Result<T, StoreError>
    where
        F: Fn(&str) -> Result<T, ParseError>,
    {
        let mut last_was_parse = false;
        for attempt in 1..=self.retry.max_attempts {
            match tokio::time::timeout(self.retry.request_timeout, self.generator.generate(request))
                .await
            {
                Err(_) => {
                    last_was_parse = false;
                    tracing::warn!(attempt, "generation request timed out");
                }
                Ok(Err(err)) => {
                    last_was_parse = false;
                    tracing::warn!(attempt, %err, "generation request failed");
                }
                Ok(Ok(text)) => match parse(&text) {
                    Ok(value) => return Ok(value),
                    Err(err) => {
                        last_was_parse = true;
                        tracing::warn!(attempt, %err, "generation response unusable");
                    }
                },
            }
            if attempt < self.retry.max_attempts {
                tokio::time::sleep(self.retry.delay_for(attempt)).await;
            }
        }

        let attempts = self.retry.max_attempts;
        if last_was_parse {
            Err(StoreError::UnparsableResponse { attempts })
        } else {
            Err(StoreError::CollaboratorUnavailable { attempts })
        }
    }
}
