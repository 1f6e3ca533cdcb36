//! Apple-style pass preview.

use serde::Serialize;

use super::{
    drawn_image, visible_fields, Platform, PreviewRenderer, RenderedBarcode, RenderedField,
    RenderedImage,
};
use crate::draft::{PassDraft, TextAlignment};
use crate::layout::{FieldGroup, ImageSlot, LayoutDefinition, PassStyle};

pub const EMPTY_BACK_MESSAGE: &str =
    "No back fields yet. Add terms, contact details or opening hours here.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplePreview {
    pub style: PassStyle,
    pub background_color: String,
    pub foreground_color: String,
    pub label_color: String,
    pub background: Option<RenderedImage>,
    pub header: AppleHeader,
    pub body: AppleBody,
    pub barcode: Option<RenderedBarcode>,
    pub footer: Option<RenderedImage>,
    pub back: AppleBack,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppleHeader {
    pub logo: Option<RenderedImage>,
    pub logo_text: String,
    /// Right-aligned, at most the style's header ceiling.
    pub fields: Vec<RenderedField>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "layout", rename_all = "camelCase")]
pub enum AppleBody {
    /// Event tickets: primary, secondary and auxiliary rows stacked, with an
    /// optional thumbnail beside the primary field.
    #[serde(rename_all = "camelCase")]
    Stacked {
        strip: Option<RenderedImage>,
        primary: Vec<RenderedField>,
        thumbnail: Option<RenderedImage>,
        secondary: Vec<RenderedField>,
        auxiliary: Vec<RenderedField>,
    },
    /// Store cards and coupons: primary field overlaid on the strip band,
    /// secondary and auxiliary fields in one row below it. The thumbnail sits
    /// beside the primary field and is only drawn when there is no strip.
    #[serde(rename_all = "camelCase")]
    StripBand {
        strip: Option<RenderedImage>,
        primary_overlay: Vec<RenderedField>,
        thumbnail: Option<RenderedImage>,
        details: Vec<RenderedField>,
    },
    /// Generic passes: primary field beside a thumbnail, no strip.
    #[serde(rename_all = "camelCase")]
    Thumbnail {
        primary: Vec<RenderedField>,
        thumbnail: Option<RenderedImage>,
        secondary: Vec<RenderedField>,
        auxiliary: Vec<RenderedField>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum AppleBack {
    Fields { fields: Vec<RenderedField> },
    Empty { message: String },
}

impl ApplePreview {
    /// Every image slot this preview actually draws.
    pub fn drawn_images(&self) -> Vec<ImageSlot> {
        let body_images: Vec<&Option<RenderedImage>> = match &self.body {
            AppleBody::Stacked { strip, thumbnail, .. } => vec![strip, thumbnail],
            AppleBody::StripBand { strip, thumbnail, .. } => vec![strip, thumbnail],
            AppleBody::Thumbnail { thumbnail, .. } => vec![thumbnail],
        };
        [&self.background, &self.header.logo, &self.footer]
            .into_iter()
            .chain(body_images)
            .filter_map(|image| image.as_ref().map(|i| i.slot))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AppleRenderer;

impl AppleRenderer {
    fn group(
        &self,
        draft: &PassDraft,
        layout: &LayoutDefinition,
        group: FieldGroup,
    ) -> Vec<RenderedField> {
        let alignment = match group {
            FieldGroup::Header => TextAlignment::Right,
            _ => TextAlignment::Natural,
        };
        visible_fields(draft.fields(group), layout.limit(group), alignment)
    }

    fn body(&self, draft: &PassDraft, layout: &LayoutDefinition) -> AppleBody {
        let image = |slot| drawn_image(layout, &draft.images, slot);

        match draft.style() {
            PassStyle::EventTicket => AppleBody::Stacked {
                strip: image(ImageSlot::Strip),
                primary: self.group(draft, layout, FieldGroup::Primary),
                thumbnail: image(ImageSlot::Thumbnail),
                secondary: self.group(draft, layout, FieldGroup::Secondary),
                auxiliary: self.group(draft, layout, FieldGroup::Auxiliary),
            },
            PassStyle::StoreCard | PassStyle::Coupon => {
                let mut details = self.group(draft, layout, FieldGroup::Secondary);
                details.extend(self.group(draft, layout, FieldGroup::Auxiliary));
                AppleBody::StripBand {
                    strip: image(ImageSlot::Strip),
                    primary_overlay: self.group(draft, layout, FieldGroup::Primary),
                    thumbnail: image(ImageSlot::Thumbnail),
                    details,
                }
            }
            PassStyle::Generic => AppleBody::Thumbnail {
                primary: self.group(draft, layout, FieldGroup::Primary),
                thumbnail: image(ImageSlot::Thumbnail),
                secondary: self.group(draft, layout, FieldGroup::Secondary),
                auxiliary: self.group(draft, layout, FieldGroup::Auxiliary),
            },
        }
    }

    fn back(&self, draft: &PassDraft, layout: &LayoutDefinition) -> AppleBack {
        let fields = self.group(draft, layout, FieldGroup::Back);
        if fields.is_empty() {
            AppleBack::Empty {
                message: EMPTY_BACK_MESSAGE.to_string(),
            }
        } else {
            AppleBack::Fields { fields }
        }
    }
}

impl PreviewRenderer for AppleRenderer {
    type Preview = ApplePreview;

    fn platform(&self) -> Platform {
        Platform::Apple
    }

    fn render(&self, draft: &PassDraft) -> ApplePreview {
        let layout = draft.layout();

        ApplePreview {
            style: draft.style(),
            background_color: draft.colors.background_color.clone(),
            foreground_color: draft.colors.foreground_color.clone(),
            label_color: draft.colors.label_color.clone(),
            background: drawn_image(layout, &draft.images, ImageSlot::Background),
            header: AppleHeader {
                logo: drawn_image(layout, &draft.images, ImageSlot::Logo),
                logo_text: draft.content.logo_text.clone(),
                fields: self.group(draft, layout, FieldGroup::Header),
            },
            body: self.body(draft, layout),
            barcode: RenderedBarcode::from_config(&draft.barcode),
            footer: drawn_image(layout, &draft.images, ImageSlot::Footer),
            back: self.back(draft, layout),
        }
    }
}
