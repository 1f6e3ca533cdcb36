//! Pass Draft Model - Copy-on-Write Editing
//!
//! A `PassDraft` is only changed through the operations below. Each one
//! borrows the current draft and returns a new one, so a rejected edit
//! leaves the caller holding the untouched original.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use uuid::Uuid;

use crate::capacity;
use crate::layout::{layout_definition, FieldGroup, ImageSlot, LayoutDefinition, PassStyle};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditRejection {
    #[error("{group} has no remaining capacity for style {style}")]
    CapacityReached { group: FieldGroup, style: PassStyle },

    #[error("No field at index {index} in {group} (length {len})")]
    IndexOutOfRange {
        group: FieldGroup,
        index: usize,
        len: usize,
    },

    #[error("Key '{key}' is already used in {group}")]
    DuplicateKey { group: FieldGroup, key: String },

    #[error("Style {0} does not carry stamp progress")]
    StampsUnsupported(PassStyle),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlignment {
    Left,
    Center,
    Right,
    Natural,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassField {
    pub key: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_alignment: Option<TextAlignment>,
}

impl PassField {
    pub fn new(key: impl Into<String>, label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            value: value.into(),
            text_alignment: None,
        }
    }

    pub fn aligned(mut self, alignment: TextAlignment) -> Self {
        self.text_alignment = Some(alignment);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRef {
    pub url: String,
    pub file_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BarcodeFormat {
    #[default]
    #[serde(rename = "QR")]
    Qr,
    Aztec,
    #[serde(rename = "PDF417")]
    Pdf417,
    Code128,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BarcodeConfig {
    #[serde(default)]
    pub format: BarcodeFormat,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassMeta {
    pub style: PassStyle,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassContent {
    #[serde(default)]
    pub organization_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub logo_text: String,
    #[serde(default)]
    pub program_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassColors {
    pub background_color: String,
    pub foreground_color: String,
    pub label_color: String,
}

impl Default for PassColors {
    fn default() -> Self {
        Self {
            background_color: "rgb(255, 255, 255)".to_string(),
            foreground_color: "rgb(0, 0, 0)".to_string(),
            label_color: "rgb(102, 102, 102)".to_string(),
        }
    }
}

/// Largest stamp count a card can carry. Larger totals are clamped down.
pub const MAX_STAMPS: u32 = 100;

/// Numeric stamp progress. `1 <= total <= MAX_STAMPS` and `current <= total`
/// always hold; out-of-range input is clamped, never rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StampConfigRecord")]
pub struct StampConfig {
    icon: String,
    inactive_icon: String,
    total: u32,
    current: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StampConfigRecord {
    icon: String,
    inactive_icon: String,
    total: u32,
    current: u32,
}

impl From<StampConfigRecord> for StampConfig {
    fn from(record: StampConfigRecord) -> Self {
        StampConfig::new(record.icon, record.inactive_icon, record.total, record.current)
    }
}

impl StampConfig {
    pub fn new(
        icon: impl Into<String>,
        inactive_icon: impl Into<String>,
        total: u32,
        current: u32,
    ) -> Self {
        let total = total.clamp(1, MAX_STAMPS);
        Self {
            icon: icon.into(),
            inactive_icon: inactive_icon.into(),
            total,
            current: current.min(total),
        }
    }

    pub fn with_current(&self, current: u32) -> Self {
        Self::new(self.icon.clone(), self.inactive_icon.clone(), self.total, current)
    }

    pub fn icon(&self) -> &str {
        &self.icon
    }

    pub fn inactive_icon(&self) -> &str {
        &self.inactive_icon
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn current(&self) -> u32 {
        self.current
    }
}

/// The aggregate root edited by one operator session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassDraft {
    pub meta: PassMeta,
    #[serde(default)]
    pub content: PassContent,
    #[serde(default)]
    pub colors: PassColors,
    #[serde(default)]
    pub images: BTreeMap<ImageSlot, ImageRef>,
    #[serde(default)]
    pub fields: BTreeMap<FieldGroup, Vec<PassField>>,
    #[serde(default)]
    pub barcode: BarcodeConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stamp_config: Option<StampConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldPatch {
    pub key: Option<String>,
    pub label: Option<String>,
    pub value: Option<String>,
    pub text_alignment: Option<TextAlignment>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorsPatch {
    pub background_color: Option<String>,
    pub foreground_color: Option<String>,
    pub label_color: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentPatch {
    pub organization_name: Option<String>,
    pub description: Option<String>,
    pub logo_text: Option<String>,
    pub program_name: Option<String>,
}

/// An empty `alt_text` clears it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BarcodePatch {
    pub format: Option<BarcodeFormat>,
    pub message: Option<String>,
    pub alt_text: Option<String>,
}

impl PassDraft {
    pub fn new(style: PassStyle) -> Self {
        Self {
            meta: PassMeta { style },
            content: PassContent::default(),
            colors: PassColors::default(),
            images: BTreeMap::new(),
            fields: BTreeMap::new(),
            barcode: BarcodeConfig::default(),
            stamp_config: None,
        }
    }

    pub fn style(&self) -> PassStyle {
        self.meta.style
    }

    pub fn layout(&self) -> &'static LayoutDefinition {
        layout_definition(self.meta.style)
    }

    pub fn fields(&self, group: FieldGroup) -> &[PassField] {
        self.fields.get(&group).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn field(&self, group: FieldGroup, key: &str) -> Option<&PassField> {
        self.fields(group).iter().find(|f| f.key == key)
    }

    pub(crate) fn fields_mut(&mut self, group: FieldGroup) -> &mut Vec<PassField> {
        self.fields.entry(group).or_default()
    }

    /// Appends a blank field with a fresh key, if the group has room.
    pub fn add_field(&self, group: FieldGroup) -> Result<Self, EditRejection> {
        if !capacity::can_add_field(self, group) {
            tracing::debug!(%group, style = %self.style(), "add_field denied by capacity guard");
            return Err(EditRejection::CapacityReached {
                group,
                style: self.style(),
            });
        }

        let key = generate_field_key(self.fields(group));
        let mut next = self.clone();
        next.fields_mut(group).push(PassField::new(key, "", ""));
        Ok(next)
    }

    pub fn update_field(
        &self,
        group: FieldGroup,
        index: usize,
        patch: FieldPatch,
    ) -> Result<Self, EditRejection> {
        let len = self.fields(group).len();
        if index >= len {
            return Err(EditRejection::IndexOutOfRange { group, index, len });
        }

        if let Some(key) = &patch.key {
            let taken = self
                .fields(group)
                .iter()
                .enumerate()
                .any(|(i, f)| i != index && &f.key == key);
            if taken {
                return Err(EditRejection::DuplicateKey {
                    group,
                    key: key.clone(),
                });
            }
        }

        let mut next = self.clone();
        let field = &mut next.fields_mut(group)[index];
        if let Some(key) = patch.key {
            field.key = key;
        }
        if let Some(label) = patch.label {
            field.label = label;
        }
        if let Some(value) = patch.value {
            field.value = value;
        }
        if let Some(alignment) = patch.text_alignment {
            field.text_alignment = Some(alignment);
        }
        Ok(next)
    }

    pub fn remove_field(&self, group: FieldGroup, index: usize) -> Result<Self, EditRejection> {
        let len = self.fields(group).len();
        if index >= len {
            return Err(EditRejection::IndexOutOfRange { group, index, len });
        }

        let mut next = self.clone();
        next.fields_mut(group).remove(index);
        Ok(next)
    }

    /// Moves the field at `from` so that it ends up at position `to`.
    pub fn move_field(
        &self,
        group: FieldGroup,
        from: usize,
        to: usize,
    ) -> Result<Self, EditRejection> {
        let len = self.fields(group).len();
        for index in [from, to] {
            if index >= len {
                return Err(EditRejection::IndexOutOfRange { group, index, len });
            }
        }

        let mut next = self.clone();
        let fields = next.fields_mut(group);
        let field = fields.remove(from);
        fields.insert(to, field);
        Ok(next)
    }

    /// `None` clears the slot.
    pub fn set_image(&self, slot: ImageSlot, image: Option<ImageRef>) -> Self {
        let mut next = self.clone();
        match image {
            Some(image) => {
                next.images.insert(slot, image);
            }
            None => {
                next.images.remove(&slot);
            }
        }
        next
    }

    pub fn set_colors(&self, patch: ColorsPatch) -> Self {
        let mut next = self.clone();
        if let Some(color) = patch.background_color {
            next.colors.background_color = color;
        }
        if let Some(color) = patch.foreground_color {
            next.colors.foreground_color = color;
        }
        if let Some(color) = patch.label_color {
            next.colors.label_color = color;
        }
        next
    }

    pub fn set_content(&self, patch: ContentPatch) -> Self {
        let mut next = self.clone();
        if let Some(name) = patch.organization_name {
            next.content.organization_name = name;
        }
        if let Some(description) = patch.description {
            next.content.description = description;
        }
        if let Some(logo_text) = patch.logo_text {
            next.content.logo_text = logo_text;
        }
        if let Some(program_name) = patch.program_name {
            next.content.program_name = program_name;
        }
        next
    }

    pub fn set_barcode(&self, patch: BarcodePatch) -> Self {
        let mut next = self.clone();
        if let Some(format) = patch.format {
            next.barcode.format = format;
        }
        if let Some(message) = patch.message {
            next.barcode.message = message;
        }
        if let Some(alt_text) = patch.alt_text {
            next.barcode.alt_text = (!alt_text.is_empty()).then_some(alt_text);
        }
        next
    }

    /// Switches style, keeping fields and images as they are. Anything the
    /// new style cannot hold shows up in validation rather than being dropped.
    pub fn set_style(&self, style: PassStyle) -> Self {
        let mut next = self.clone();
        next.meta.style = style;
        next
    }
}

fn generate_field_key(existing: &[PassField]) -> String {
    loop {
        let id = Uuid::new_v4().simple().to_string();
        let key = format!("field_{}", &id[..8]);
        if !existing.iter().any(|f| f.key == key) {
            return key;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft_with_back_fields() -> PassDraft {
        let mut draft = PassDraft::new(PassStyle::Generic);
        draft.fields.insert(
            FieldGroup::Back,
            vec![
                PassField::new("terms", "Terms", "No cash value"),
                PassField::new("contact", "Contact", "hello@example.com"),
                PassField::new("hours", "Hours", "9-17"),
            ],
        );
        draft
    }

    #[test]
    fn test_add_field_does_not_touch_input() {
        let draft = PassDraft::new(PassStyle::Generic);
        let next = draft.add_field(FieldGroup::Secondary).unwrap();
        assert!(draft.fields(FieldGroup::Secondary).is_empty());
        assert_eq!(next.fields(FieldGroup::Secondary).len(), 1);

        let added = &next.fields(FieldGroup::Secondary)[0];
        assert!(added.key.starts_with("field_"));
        assert!(added.label.is_empty());
        assert!(added.value.is_empty());
    }

    #[test]
    fn test_add_field_generates_distinct_keys() {
        let mut draft = PassDraft::new(PassStyle::Generic);
        for _ in 0..4 {
            draft = draft.add_field(FieldGroup::Back).unwrap();
        }
        let keys: std::collections::HashSet<_> =
            draft.fields(FieldGroup::Back).iter().map(|f| f.key.clone()).collect();
        assert_eq!(keys.len(), 4);
    }

    #[test]
    fn test_add_field_rejected_at_capacity() {
        let draft = PassDraft::new(PassStyle::StoreCard)
            .add_field(FieldGroup::Primary)
            .unwrap();
        let err = draft.add_field(FieldGroup::Primary).unwrap_err();
        assert_eq!(
            err,
            EditRejection::CapacityReached {
                group: FieldGroup::Primary,
                style: PassStyle::StoreCard
            }
        );
    }

    #[test]
    fn test_update_field_merges_patch() {
        let draft = draft_with_back_fields();
        let next = draft
            .update_field(
                FieldGroup::Back,
                1,
                FieldPatch {
                    value: Some("support@example.com".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        let field = &next.fields(FieldGroup::Back)[1];
        assert_eq!(field.key, "contact");
        assert_eq!(field.label, "Contact");
        assert_eq!(field.value, "support@example.com");
    }

    #[test]
    fn test_update_field_out_of_range() {
        let draft = draft_with_back_fields();
        let err = draft
            .update_field(FieldGroup::Back, 3, FieldPatch::default())
            .unwrap_err();
        assert_eq!(
            err,
            EditRejection::IndexOutOfRange {
                group: FieldGroup::Back,
                index: 3,
                len: 3
            }
        );
    }

    #[test]
    fn test_update_field_rejects_duplicate_key() {
        let draft = draft_with_back_fields();
        let patch = FieldPatch {
            key: Some("terms".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            draft.update_field(FieldGroup::Back, 2, patch.clone()),
            Err(EditRejection::DuplicateKey { .. })
        ));
        // Re-asserting a field's own key is fine.
        assert!(draft.update_field(FieldGroup::Back, 0, patch).is_ok());
    }

    #[test]
    fn test_remove_field_preserves_order() {
        let next = draft_with_back_fields().remove_field(FieldGroup::Back, 1).unwrap();
        let keys: Vec<_> = next.fields(FieldGroup::Back).iter().map(|f| f.key.as_str()).collect();
        assert_eq!(keys, vec!["terms", "hours"]);
    }

    #[test]
    fn test_move_field() {
        let next = draft_with_back_fields().move_field(FieldGroup::Back, 2, 0).unwrap();
        let keys: Vec<_> = next.fields(FieldGroup::Back).iter().map(|f| f.key.as_str()).collect();
        assert_eq!(keys, vec!["hours", "terms", "contact"]);
        assert!(draft_with_back_fields().move_field(FieldGroup::Back, 0, 5).is_err());
    }

    #[test]
    fn test_set_image_and_clear() {
        let image = ImageRef {
            url: "https://cdn.example.com/logo.png".to_string(),
            file_name: "logo.png".to_string(),
        };
        let draft = PassDraft::new(PassStyle::Coupon)
            .set_image(ImageSlot::Logo, Some(image.clone()));
        assert_eq!(draft.images.get(&ImageSlot::Logo), Some(&image));
        let cleared = draft.set_image(ImageSlot::Logo, None);
        assert!(!cleared.images.contains_key(&ImageSlot::Logo));
    }

    #[test]
    fn test_shallow_merges() {
        let draft = PassDraft::new(PassStyle::Coupon)
            .set_colors(ColorsPatch {
                background_color: Some("rgb(10, 20, 30)".to_string()),
                ..Default::default()
            })
            .set_content(ContentPatch {
                description: Some("Summer coupon".to_string()),
                ..Default::default()
            })
            .set_barcode(BarcodePatch {
                message: Some("CPN-1".to_string()),
                alt_text: Some("CPN-1".to_string()),
                ..Default::default()
            });
        assert_eq!(draft.colors.background_color, "rgb(10, 20, 30)");
        assert_eq!(draft.colors.foreground_color, PassColors::default().foreground_color);
        assert_eq!(draft.content.description, "Summer coupon");
        assert_eq!(draft.barcode.message, "CPN-1");

        let cleared = draft.set_barcode(BarcodePatch {
            alt_text: Some(String::new()),
            ..Default::default()
        });
        assert_eq!(cleared.barcode.alt_text, None);
        assert_eq!(cleared.barcode.message, "CPN-1");
    }

    #[test]
    fn test_stamp_config_clamps_on_deserialize() {
        let config: StampConfig = serde_json::from_str(
            r#"{"icon":"🟢","inactiveIcon":"⚪","total":5,"current":9}"#,
        )
        .unwrap();
        assert_eq!(config.current(), 5);
        assert_eq!(config.with_current(2).current(), 2);
        assert_eq!(config.with_current(99).current(), 5);

        let zero_total = StampConfig::new("x", "o", 0, 0);
        assert_eq!(zero_total.total(), 1);
    }

    #[test]
    fn test_stamp_total_clamped_to_ceiling() {
        let huge = StampConfig::new("x", "o", 4_000_000_000, u32::MAX);
        assert_eq!(huge.total(), MAX_STAMPS);
        assert_eq!(huge.current(), MAX_STAMPS);

        let config: StampConfig = serde_json::from_str(
            r#"{"icon":"x","inactiveIcon":"o","total":4294967295,"current":7}"#,
        )
        .unwrap();
        assert_eq!(config.total(), MAX_STAMPS);
        assert_eq!(config.current(), 7);
    }

    #[test]
    fn test_serialized_shape_uses_wallet_names() {
        let mut draft = PassDraft::new(PassStyle::EventTicket);
        draft.fields.insert(FieldGroup::Primary, vec![PassField::new("event", "Event", "Gala")]);
        let json = serde_json::to_value(&draft).unwrap();
        assert_eq!(json["meta"]["style"], "eventTicket");
        assert_eq!(json["fields"]["primaryFields"][0]["key"], "event");
        assert_eq!(json["barcode"]["format"], "QR");
        assert!(json.get("stampConfig").is_none());

        let back: PassDraft = serde_json::from_value(json).unwrap();
        assert_eq!(back, draft);
    }
}
