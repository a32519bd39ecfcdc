//! # Extraction Pipeline
//!
//! Drives a single `ExtractionRequest` through assembly, the provider call and
//! validation. Each request carries its own `RequestLifecycle`; nothing is
//! shared between requests except the read-only template store.

use crate::{
    assembler::{assemble, assemble_for_image},
    client::ExtractionClient,
    errors::{ErrorKind, PromptError},
    parser::parse,
    templates::TemplateStore,
    types::{DocumentType, ExtractionRequest, ExtractionResult},
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

/// The states an extraction request moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "errorKind")]
pub enum RequestState {
    Pending,
    Assembling,
    AwaitingResponse,
    Validating,
    Succeeded,
    Failed(ErrorKind),
}

impl RequestState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RequestState::Succeeded | RequestState::Failed(_))
    }

    fn can_advance_to(&self, next: &RequestState) -> bool {
        use RequestState::*;
        match (self, next) {
            (Pending, Assembling)
            | (Assembling, AwaitingResponse)
            | (AwaitingResponse, Validating)
            | (Validating, Succeeded) => true,
            (current, Failed(_)) => !current.is_terminal() && *current != Pending,
            _ => false,
        }
    }
}

/// Records the state trail of one request and rejects out-of-order moves.
#[derive(Debug, Clone, Serialize)]
pub struct RequestLifecycle {
    id: Uuid,
    trail: Vec<RequestState>,
}

impl Default for RequestLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestLifecycle {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            trail: vec![RequestState::Pending],
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> RequestState {
        // The trail always starts with `Pending`.
        self.trail[self.trail.len() - 1]
    }

    pub fn trail(&self) -> &[RequestState] {
        &self.trail
    }

    /// Moves to `next`, returning `false` (and staying put) for an illegal move.
    pub fn advance(&mut self, next: RequestState) -> bool {
        if !self.state().can_advance_to(&next) {
            warn!(request_id = %self.id, from = ?self.state(), to = ?next, "Rejected illegal state transition");
            return false;
        }
        info!(request_id = %self.id, state = ?next, "Extraction request state changed");
        self.trail.push(next);
        true
    }

    fn fail(&mut self, err: &PromptError) {
        self.advance(RequestState::Failed(err.kind()));
    }
}

/// A successful extraction.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionOutcome {
    pub request_id: Uuid,
    pub document_type: DocumentType,
    pub result: ExtractionResult,
    #[serde(skip)]
    pub raw_response: String,
}

/// A failed extraction, carrying the state trail up to the failure.
#[derive(Debug)]
pub struct ExtractionFailure {
    pub lifecycle: RequestLifecycle,
    pub error: PromptError,
}

impl From<ExtractionFailure> for PromptError {
    fn from(failure: ExtractionFailure) -> Self {
        failure.error
    }
}

/// Combines the template store, the extraction client and the validator.
#[derive(Clone, Debug)]
pub struct Extractor {
    store: Arc<TemplateStore>,
    client: ExtractionClient,
}

impl Extractor {
    pub fn new(store: Arc<TemplateStore>, client: ExtractionClient) -> Self {
        Self { store, client }
    }

    pub fn store(&self) -> &TemplateStore {
        &self.store
    }

    pub fn client(&self) -> &ExtractionClient {
        &self.client
    }

    /// Runs `request` to completion, returning the parsed result or the error
    /// together with the lifecycle trail.
    pub async fn run(
        &self,
        request: &ExtractionRequest,
    ) -> Result<(ExtractionOutcome, RequestLifecycle), ExtractionFailure> {
        let mut lifecycle = RequestLifecycle::new();
        let span = info_span!(
            "extraction",
            request_id = %lifecycle.id(),
            kind = %request.document_type
        );

        let outcome = self
            .run_stages(request, &mut lifecycle)
            .instrument(span)
            .await;

        match outcome {
            Ok(outcome) => Ok((outcome, lifecycle)),
            Err(error) => {
                warn!(request_id = %lifecycle.id(), kind = %error.kind(), "Extraction failed: {error}");
                lifecycle.fail(&error);
                Err(ExtractionFailure { lifecycle, error })
            }
        }
    }

    /// Runs `request` and returns only the outcome.
    pub async fn extract(&self, request: &ExtractionRequest) -> Result<ExtractionOutcome, PromptError> {
        self.run(request)
            .await
            .map(|(outcome, _)| outcome)
            .map_err(PromptError::from)
    }

    async fn run_stages(
        &self,
        request: &ExtractionRequest,
        lifecycle: &mut RequestLifecycle,
    ) -> Result<ExtractionOutcome, PromptError> {
        lifecycle.advance(RequestState::Assembling);
        let prompt = match &request.image {
            Some(_) => assemble_for_image(&self.store, &request.document_type)?,
            None => assemble(&self.store, &request.document_type, &request.content)?,
        };

        lifecycle.advance(RequestState::AwaitingResponse);
        let raw_response = match &request.image {
            Some(image) => self.client.extract_image(&prompt, image).await?,
            None => self.client.extract(&prompt).await?,
        };

        lifecycle.advance(RequestState::Validating);
        let result = parse(&self.store, &raw_response, &request.document_type)?;

        lifecycle.advance(RequestState::Succeeded);
        Ok(ExtractionOutcome {
            request_id: lifecycle.id(),
            document_type: request.document_type.clone(),
            result,
            raw_response,
        })
    }
}
