//! Export Gate - Single Entry Point
//!
//! CRITICAL: export MUST call validate internally. No bypass.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::draft::PassDraft;
use crate::hashing::draft_fingerprint;
use crate::layout::PassStyle;
use crate::render::{
    ApplePreview, AppleRenderer, GooglePreview, GoogleRenderer, PreviewRenderer,
};
use crate::validation::{ValidationResult, Validator};
use crate::ENGINE_VERSION;

#[cfg(feature = "test-hooks")]
use std::sync::atomic::{AtomicU32, Ordering};

#[cfg(feature = "test-hooks")]
static VALIDATION_CALL_COUNT: AtomicU32 = AtomicU32::new(0);

#[cfg(feature = "test-hooks")]
pub fn get_validation_call_count() -> u32 {
    VALIDATION_CALL_COUNT.load(Ordering::SeqCst)
}

#[cfg(feature = "test-hooks")]
pub fn reset_validation_call_count() {
    VALIDATION_CALL_COUNT.store(0, Ordering::SeqCst);
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Export blocked by {} validation error(s): {}", .0.errors.len(), summarize(.0))]
    Blocked(ValidationResult),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Payload is not valid base64: {0}")]
    Payload(#[from] base64::DecodeError),
}

fn summarize(result: &ValidationResult) -> String {
    result
        .errors
        .iter()
        .map(|e| format!("{}: {}", e.path, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// What packaging receives: the draft exactly as validated, plus both
/// platform previews for confirmation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportTicket {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub engine_version: String,
    pub style: PassStyle,
    pub fingerprint: String,
    pub payload_base64: String,
    pub validation: ValidationResult,
    pub apple: ApplePreview,
    pub google: GooglePreview,
}

impl ExportTicket {
    /// Decodes the payload back into the exported draft.
    pub fn draft(&self) -> Result<PassDraft, ExportError> {
        let bytes = STANDARD.decode(&self.payload_base64)?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// The only sanctioned path from a draft to platform pass generation
pub struct ExportGate {
    validator: Validator,
    apple: AppleRenderer,
    google: GoogleRenderer,
}

impl ExportGate {
    pub fn new() -> Self {
        Self {
            validator: Validator::new(),
            apple: AppleRenderer,
            google: GoogleRenderer,
        }
    }

    /// This is the ONLY validation entry point used by export.
    pub fn validate(&self, draft: &PassDraft) -> ValidationResult {
        #[cfg(feature = "test-hooks")]
        VALIDATION_CALL_COUNT.fetch_add(1, Ordering::SeqCst);

        self.validator.validate(draft)
    }

    /// CRITICAL: This ALWAYS calls validate internally. No bypass possible.
    pub fn export(&self, draft: &PassDraft) -> Result<ExportTicket, ExportError> {
        let validation = self.validate(draft);
        if !validation.export_permitted() {
            tracing::info!(
                style = %draft.style(),
                errors = validation.errors.len(),
                "export blocked"
            );
            return Err(ExportError::Blocked(validation));
        }

        let payload = serde_json::to_vec(draft)?;
        let ticket = ExportTicket {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            engine_version: ENGINE_VERSION.to_string(),
            style: draft.style(),
            fingerprint: draft_fingerprint(draft)?,
            payload_base64: STANDARD.encode(&payload),
            validation,
            apple: self.apple.render(draft),
            google: self.google.render(draft),
        };

        tracing::info!(
            id = %ticket.id,
            style = %ticket.style,
            fingerprint = %ticket.fingerprint,
            warnings = ticket.validation.warnings.len(),
            "draft cleared for export"
        );
        Ok(ticket)
    }
}

impl Default for ExportGate {
    fn default() -> Self {
        Self::new()
    }
}
