//! PassForge Core - Wallet Pass Drafting Engine
//!
//! # The Five Laws (Non-Negotiable)
//! 1. The Layout Registry Is Truth
//! 2. Drafts Change Only Through Edits
//! 3. Derived Fields Are Outputs, Never Inputs
//! 4. Findings Are Data, Not Panics
//! 5. Export Always Validates

pub mod layout;
pub mod draft;
pub mod capacity;
pub mod stamps;
pub mod validation;
pub mod render;
pub mod templates;
pub mod hashing;
pub mod pipeline;

pub use layout::{
    layout_definition, FieldGroup, FieldLimit, ImageSlot, LayoutDefinition, PassStyle,
};
pub use draft::{
    EditRejection, FieldPatch, ImageRef, PassDraft, PassField, StampConfig, TextAlignment,
    MAX_STAMPS,
};
pub use capacity::{can_add_field, remaining_field_count, Remaining};
pub use validation::{validate_draft, ValidationIssue, ValidationResult, ValidationRule, Validator};
pub use render::{AppleRenderer, GoogleRenderer, Platform, PreviewRenderer};
pub use templates::{create_draft_from_template, PassTemplate, TemplateCatalog};
pub use hashing::{canonical_json, draft_fingerprint};
pub use pipeline::{ExportError, ExportGate, ExportTicket};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
