//! Validation System - Rule/Policy Separation
//!
//! Rules produce structured issues against the layout of the draft's style.
//! Errors block export; warnings are advisory.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::draft::PassDraft;
use crate::layout::{FieldGroup, ImageSlot, LayoutDefinition, PassStyle};
use crate::stamps::{PROGRESS_VISUAL_KEY, STAMPS_KEY};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IssueSeverity {
    Error,
    Warning,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationIssue {
    pub rule: String,
    pub severity: IssueSeverity,
    /// Dotted location in the serialized draft, e.g. `barcode.message`.
    pub path: String,
    pub message: String,
    pub expected: Option<String>,
    pub actual: Option<String>,
    pub remediation: Vec<String>,
}

impl ValidationIssue {
    pub fn error(rule: &str, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(rule, IssueSeverity::Error, path.into(), message.into())
    }

    pub fn warning(rule: &str, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(rule, IssueSeverity::Warning, path.into(), message.into())
    }

    fn new(rule: &str, severity: IssueSeverity, path: String, message: String) -> Self {
        Self {
            rule: rule.to_string(),
            severity,
            path,
            message,
            expected: None,
            actual: None,
            remediation: vec![],
        }
    }

    pub fn expected(mut self, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self.actual = Some(actual.into());
        self
    }

    pub fn remediation(mut self, step: impl Into<String>) -> Self {
        self.remediation.push(step.into());
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationResult {
    pub valid: bool,
    pub style: PassStyle,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    pub fn from_issues(style: PassStyle, issues: Vec<ValidationIssue>) -> Self {
        let (errors, warnings): (Vec<_>, Vec<_>) = issues
            .into_iter()
            .partition(|i| i.severity == IssueSeverity::Error);
        Self {
            valid: errors.is_empty(),
            style,
            errors,
            warnings,
        }
    }

    /// The export gate: only an error-free draft may be packaged.
    pub fn export_permitted(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn issues(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.errors.iter().chain(self.warnings.iter())
    }
}

/// Validation rule trait - produces issues
pub trait ValidationRule {
    fn name(&self) -> &'static str;
    fn validate(&self, draft: &PassDraft, layout: &LayoutDefinition) -> Vec<ValidationIssue>;
}

fn field_path(group: FieldGroup) -> String {
    format!("fields.{}", group.as_str())
}

// --- Concrete Rules ---

pub struct RequiredContentRule;

impl ValidationRule for RequiredContentRule {
    fn name(&self) -> &'static str { "required_content" }

    fn validate(&self, draft: &PassDraft, _layout: &LayoutDefinition) -> Vec<ValidationIssue> {
        let mut issues = vec![];

        if draft.content.description.trim().is_empty() {
            issues.push(
                ValidationIssue::error(
                    self.name(),
                    "content.description",
                    "Pass description is required",
                )
                .remediation("Describe the pass for accessibility and lock-screen display"),
            );
        }

        if draft.barcode.message.trim().is_empty() {
            issues.push(
                ValidationIssue::error(
                    self.name(),
                    "barcode.message",
                    "Barcode message is required",
                )
                .remediation("Set the value encoded in the barcode"),
            );
        }

        issues
    }
}

pub struct FieldCountRule;

impl ValidationRule for FieldCountRule {
    fn name(&self) -> &'static str { "field_count" }

    fn validate(&self, draft: &PassDraft, layout: &LayoutDefinition) -> Vec<ValidationIssue> {
        FieldGroup::ALL
            .into_iter()
            .filter_map(|group| {
                let count = draft.fields(group).len();
                let limit = layout.limit(group);
                if limit.allows(count) {
                    return None;
                }
                let max = limit.max().unwrap_or(count);
                Some(
                    ValidationIssue::error(
                        self.name(),
                        field_path(group),
                        format!("Too many fields in {group} for {}", layout.display_name),
                    )
                    .expected(format!("at most {max}"), count.to_string())
                    .remediation(format!("Remove {} field(s) from {group}", count - max)),
                )
            })
            .collect()
    }
}

pub struct FieldKeyRule;

impl ValidationRule for FieldKeyRule {
    fn name(&self) -> &'static str { "field_keys" }

    fn validate(&self, draft: &PassDraft, _layout: &LayoutDefinition) -> Vec<ValidationIssue> {
        let mut issues = vec![];

        for group in FieldGroup::ALL {
            let mut seen = HashSet::new();
            let mut reported = HashSet::new();
            for (index, field) in draft.fields(group).iter().enumerate() {
                if field.key.trim().is_empty() {
                    issues.push(ValidationIssue::error(
                        self.name(),
                        format!("{}[{index}].key", field_path(group)),
                        format!("Field at position {index} in {group} has no key"),
                    ));
                    continue;
                }
                if !seen.insert(field.key.as_str()) && reported.insert(field.key.as_str()) {
                    issues.push(
                        ValidationIssue::error(
                            self.name(),
                            field_path(group),
                            format!("Duplicate field key '{}' in {group}", field.key),
                        )
                        .remediation("Give every field in a group its own key"),
                    );
                }
            }
        }

        issues
    }
}

pub struct BlankValueRule;

impl ValidationRule for BlankValueRule {
    fn name(&self) -> &'static str { "blank_value" }

    fn validate(&self, draft: &PassDraft, _layout: &LayoutDefinition) -> Vec<ValidationIssue> {
        let rule = self.name();
        FieldGroup::ALL
            .into_iter()
            .filter(|group| group.is_front())
            .flat_map(move |group| {
                draft.fields(group).iter().enumerate().filter_map(move |(index, field)| {
                    field.value.trim().is_empty().then(|| {
                        ValidationIssue::warning(
                            rule,
                            format!("{}[{index}].value", field_path(group)),
                            format!("Field '{}' in {group} renders blank", field.key),
                        )
                    })
                })
            })
            .collect()
    }
}

pub struct ImageSlotRule;

impl ValidationRule for ImageSlotRule {
    fn name(&self) -> &'static str { "image_slot" }

    fn validate(&self, draft: &PassDraft, layout: &LayoutDefinition) -> Vec<ValidationIssue> {
        draft
            .images
            .keys()
            .filter(|slot| !layout.allows_image(**slot))
            .map(|slot| {
                ValidationIssue::warning(
                    self.name(),
                    format!("images.{slot}"),
                    format!(
                        "{} does not use a {slot} image; it will be ignored",
                        layout.display_name
                    ),
                )
                .remediation(format!("Clear the {slot} image or switch style"))
            })
            .collect()
    }
}

pub struct StripExclusionRule;

impl ValidationRule for StripExclusionRule {
    fn name(&self) -> &'static str { "strip_exclusion" }

    fn validate(&self, draft: &PassDraft, layout: &LayoutDefinition) -> Vec<ValidationIssue> {
        layout
            .blocked_images(&draft.images)
            .into_iter()
            .filter(|slot| draft.images.contains_key(slot))
            .map(|slot: ImageSlot| {
                ValidationIssue::warning(
                    self.name(),
                    format!("images.{slot}"),
                    format!("The strip image hides the {slot} image on {}", layout.display_name),
                )
                .remediation(format!("Remove either the strip or the {slot} image"))
            })
            .collect()
    }
}

pub struct StampProgressRule;

impl ValidationRule for StampProgressRule {
    fn name(&self) -> &'static str { "stamp_progress" }

    fn validate(&self, draft: &PassDraft, layout: &LayoutDefinition) -> Vec<ValidationIssue> {
        if draft.stamp_config.is_none() {
            return vec![];
        }

        if !layout.supports_stamps() {
            return vec![ValidationIssue::warning(
                self.name(),
                "stampConfig",
                format!(
                    "{} does not show stamp progress; the stamp setup is ignored",
                    layout.display_name
                ),
            )];
        }

        [(FieldGroup::Primary, STAMPS_KEY), (FieldGroup::Auxiliary, PROGRESS_VISUAL_KEY)]
            .into_iter()
            .filter(|(group, key)| draft.field(*group, key).is_none())
            .map(|(group, key)| {
                ValidationIssue::warning(
                    self.name(),
                    field_path(group),
                    format!("Stamp progress field '{key}' is missing from {group}"),
                )
                .remediation(format!("Free a slot in {group} and apply the stamp progress again"))
            })
            .collect()
    }
}

pub struct ColorFormatRule;

impl ValidationRule for ColorFormatRule {
    fn name(&self) -> &'static str { "color_format" }

    fn validate(&self, draft: &PassDraft, _layout: &LayoutDefinition) -> Vec<ValidationIssue> {
        [
            ("colors.backgroundColor", &draft.colors.background_color),
            ("colors.foregroundColor", &draft.colors.foreground_color),
            ("colors.labelColor", &draft.colors.label_color),
        ]
        .into_iter()
        .filter(|(_, value)| parse_color(value).is_none())
        .map(|(path, value)| {
            ValidationIssue::warning(
                self.name(),
                path,
                "Color is not in a wallet-compatible format",
            )
            .expected("rgb(r, g, b) or #rrggbb", value.as_str())
        })
        .collect()
    }
}

/// Parses `rgb(r, g, b)` or `#rrggbb`.
pub fn parse_color(raw: &str) -> Option<(u8, u8, u8)> {
    let raw = raw.trim();

    if let Some(hex) = raw.strip_prefix('#') {
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        return Some((channel(0)?, channel(2)?, channel(4)?));
    }

    let inner = raw.strip_prefix("rgb(")?.strip_suffix(')')?;
    let channels: Vec<u8> = inner
        .split(',')
        .map(str::trim)
        .map(|c| {
            if c.is_empty() || !c.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            c.parse::<u8>().ok()
        })
        .collect::<Option<_>>()?;
    match channels.as_slice() {
        [r, g, b] => Some((*r, *g, *b)),
        _ => None,
    }
}

/// Validator orchestrates rules against the layout of the draft's own style
pub struct Validator {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl Validator {
    pub fn new() -> Self {
        Self {
            rules: vec![
                Box::new(RequiredContentRule),
                Box::new(FieldCountRule),
                Box::new(FieldKeyRule),
                Box::new(BlankValueRule),
                Box::new(ImageSlotRule),
                Box::new(StripExclusionRule),
                Box::new(StampProgressRule),
                Box::new(ColorFormatRule),
            ],
        }
    }

    pub fn validate(&self, draft: &PassDraft) -> ValidationResult {
        let layout = draft.layout();
        let issues: Vec<_> = self
            .rules
            .iter()
            .flat_map(|rule| rule.validate(draft, layout))
            .collect();

        let result = ValidationResult::from_issues(draft.style(), issues);
        tracing::debug!(
            style = %draft.style(),
            errors = result.errors.len(),
            warnings = result.warnings.len(),
            "draft validated"
        );
        result
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

pub fn validate_draft(draft: &PassDraft) -> ValidationResult {
    Validator::new().validate(draft)
}
