//! Platform Preview Renderers
//!
//! Each renderer projects a draft into the structure its wallet platform
//! would show. Renderers only read the draft, and take every limit and image
//! decision from the layout registry.

pub mod apple;
pub mod google;

pub use apple::{AppleBack, AppleBody, ApplePreview, AppleRenderer};
pub use google::{GoogleHero, GooglePreview, GoogleRenderer};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::draft::{BarcodeConfig, BarcodeFormat, ImageRef, PassDraft, PassField, TextAlignment};
use crate::layout::{FieldLimit, ImageSlot, LayoutDefinition};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Apple,
    Google,
}

pub trait PreviewRenderer {
    type Preview: Serialize;

    fn platform(&self) -> Platform;
    fn render(&self, draft: &PassDraft) -> Self::Preview;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedField {
    pub key: String,
    pub label: String,
    pub value: String,
    pub alignment: TextAlignment,
    /// Set when the value is empty and the surface shows a hint instead.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub blank: bool,
}

impl RenderedField {
    pub fn from_field(field: &PassField, default_alignment: TextAlignment) -> Self {
        Self {
            key: field.key.clone(),
            label: field.label.clone(),
            value: field.value.clone(),
            alignment: field.text_alignment.unwrap_or(default_alignment),
            blank: field.value.trim().is_empty(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedImage {
    pub slot: ImageSlot,
    pub url: String,
    pub file_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedBarcode {
    pub format: BarcodeFormat,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt_text: Option<String>,
}

impl RenderedBarcode {
    /// `None` when there is nothing to encode.
    pub fn from_config(config: &BarcodeConfig) -> Option<Self> {
        if config.message.trim().is_empty() {
            return None;
        }
        Some(Self {
            format: config.format,
            message: config.message.clone(),
            alt_text: config.alt_text.clone(),
        })
    }
}

pub(crate) fn drawn_image(
    layout: &LayoutDefinition,
    images: &BTreeMap<ImageSlot, ImageRef>,
    slot: ImageSlot,
) -> Option<RenderedImage> {
    layout.drawable_image(images, slot).map(|image| RenderedImage {
        slot,
        url: image.url.clone(),
        file_name: image.file_name.clone(),
    })
}

/// Fields of a group in order, cut at the group's ceiling.
pub(crate) fn visible_fields(
    fields: &[PassField],
    limit: FieldLimit,
    default_alignment: TextAlignment,
) -> Vec<RenderedField> {
    let shown = limit.max().unwrap_or(fields.len());
    fields
        .iter()
        .take(shown)
        .map(|field| RenderedField::from_field(field, default_alignment))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visible_fields_truncates_to_limit() {
        let fields = vec![
            PassField::new("a", "A", "1"),
            PassField::new("b", "B", "").aligned(TextAlignment::Left),
        ];
        let rendered = visible_fields(&fields, FieldLimit::Max(1), TextAlignment::Right);
        assert_eq!(rendered.len(), 1);
        assert_eq!(rendered[0].alignment, TextAlignment::Right);

        let rendered = visible_fields(&fields, FieldLimit::Unlimited, TextAlignment::Natural);
        assert_eq!(rendered[1].alignment, TextAlignment::Left);
        assert!(rendered[1].blank);
    }

    #[test]
    fn test_barcode_without_message_not_rendered() {
        assert!(RenderedBarcode::from_config(&BarcodeConfig::default()).is_none());
    }
}
