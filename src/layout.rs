//! Layout Registry - Per-Style Structural Rules
//!
//! One immutable `LayoutDefinition` per `PassStyle`. The capacity guard, the
//! validator and both preview renderers read limits and image rules from here
//! and nowhere else.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::draft::ImageRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PassStyle {
    StoreCard,
    Coupon,
    EventTicket,
    Generic,
}

impl PassStyle {
    pub const ALL: [PassStyle; 4] = [
        PassStyle::StoreCard,
        PassStyle::Coupon,
        PassStyle::EventTicket,
        PassStyle::Generic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PassStyle::StoreCard => "storeCard",
            PassStyle::Coupon => "coupon",
            PassStyle::EventTicket => "eventTicket",
            PassStyle::Generic => "generic",
        }
    }
}

impl fmt::Display for PassStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named text region of a pass. Order inside a group is render order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FieldGroup {
    #[serde(rename = "headerFields")]
    Header,
    #[serde(rename = "primaryFields")]
    Primary,
    #[serde(rename = "secondaryFields")]
    Secondary,
    #[serde(rename = "auxiliaryFields")]
    Auxiliary,
    #[serde(rename = "backFields")]
    Back,
}

impl FieldGroup {
    pub const ALL: [FieldGroup; 5] = [
        FieldGroup::Header,
        FieldGroup::Primary,
        FieldGroup::Secondary,
        FieldGroup::Auxiliary,
        FieldGroup::Back,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldGroup::Header => "headerFields",
            FieldGroup::Primary => "primaryFields",
            FieldGroup::Secondary => "secondaryFields",
            FieldGroup::Auxiliary => "auxiliaryFields",
            FieldGroup::Back => "backFields",
        }
    }

    /// Front-face groups are drawn on the pass itself and need a visible value.
    pub fn is_front(&self) -> bool {
        !matches!(self, FieldGroup::Back)
    }
}

impl fmt::Display for FieldGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageSlot {
    Logo,
    Icon,
    Strip,
    Thumbnail,
    Background,
    Footer,
}

impl ImageSlot {
    pub const ALL: [ImageSlot; 6] = [
        ImageSlot::Logo,
        ImageSlot::Icon,
        ImageSlot::Strip,
        ImageSlot::Thumbnail,
        ImageSlot::Background,
        ImageSlot::Footer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ImageSlot::Logo => "logo",
            ImageSlot::Icon => "icon",
            ImageSlot::Strip => "strip",
            ImageSlot::Thumbnail => "thumbnail",
            ImageSlot::Background => "background",
            ImageSlot::Footer => "footer",
        }
    }
}

impl fmt::Display for ImageSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ceiling on the number of fields a group may hold.
///
/// Serialized as an integer where `-1` means unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "i64", try_from = "i64")]
pub enum FieldLimit {
    Max(usize),
    Unlimited,
}

impl FieldLimit {
    pub fn allows(&self, count: usize) -> bool {
        match self {
            FieldLimit::Max(max) => count <= *max,
            FieldLimit::Unlimited => true,
        }
    }

    pub fn max(&self) -> Option<usize> {
        match self {
            FieldLimit::Max(max) => Some(*max),
            FieldLimit::Unlimited => None,
        }
    }
}

impl From<FieldLimit> for i64 {
    fn from(limit: FieldLimit) -> Self {
        match limit {
            FieldLimit::Max(max) => max as i64,
            FieldLimit::Unlimited => -1,
        }
    }
}

impl TryFrom<i64> for FieldLimit {
    type Error = String;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        match raw {
            -1 => Ok(FieldLimit::Unlimited),
            n if n >= 0 => Ok(FieldLimit::Max(n as usize)),
            n => Err(format!("invalid field limit {n}, expected -1 or a non-negative count")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldLimits {
    pub header_fields: FieldLimit,
    pub primary_fields: FieldLimit,
    pub secondary_fields: FieldLimit,
    pub auxiliary_fields: FieldLimit,
    pub back_fields: FieldLimit,
}

impl FieldLimits {
    pub fn get(&self, group: FieldGroup) -> FieldLimit {
        match group {
            FieldGroup::Header => self.header_fields,
            FieldGroup::Primary => self.primary_fields,
            FieldGroup::Secondary => self.secondary_fields,
            FieldGroup::Auxiliary => self.auxiliary_fields,
            FieldGroup::Back => self.back_fields,
        }
    }
}

/// How stamp progress is phrased for styles that carry stamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum StampTextFormat {
    /// `"3 von 10"`
    Von,
    /// `"3 / 10"`
    Slash,
}

impl StampTextFormat {
    pub fn format(&self, current: u32, total: u32) -> String {
        match self {
            StampTextFormat::Von => format!("{current} von {total}"),
            StampTextFormat::Slash => format!("{current} / {total}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutRules {
    /// Setting `strip` makes `background` and `thumbnail` unusable.
    pub strip_blocks_background_and_thumbnail: bool,
    /// `None` when the style does not carry a stamp card.
    pub stamp_text: Option<StampTextFormat>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDefinition {
    pub style: PassStyle,
    pub display_name: &'static str,
    pub field_limits: FieldLimits,
    pub allowed_images: &'static [ImageSlot],
    pub rules: LayoutRules,
}

impl LayoutDefinition {
    pub fn limit(&self, group: FieldGroup) -> FieldLimit {
        self.field_limits.get(group)
    }

    pub fn allows_image(&self, slot: ImageSlot) -> bool {
        self.allowed_images.contains(&slot)
    }

    pub fn supports_stamps(&self) -> bool {
        self.rules.stamp_text.is_some()
    }

    /// Slots whose images are suppressed by another set slot.
    pub fn blocked_images(&self, images: &BTreeMap<ImageSlot, ImageRef>) -> Vec<ImageSlot> {
        let strip_set = images.contains_key(&ImageSlot::Strip);
        if self.rules.strip_blocks_background_and_thumbnail && strip_set {
            vec![ImageSlot::Background, ImageSlot::Thumbnail]
        } else {
            vec![]
        }
    }

    /// The image a renderer may draw for `slot`, if any.
    ///
    /// Illegal slots are ignored and the strip exclusion is resolved here
    /// (strip wins), so every renderer makes the same choice.
    pub fn drawable_image<'a>(
        &self,
        images: &'a BTreeMap<ImageSlot, ImageRef>,
        slot: ImageSlot,
    ) -> Option<&'a ImageRef> {
        if !self.allows_image(slot) || self.blocked_images(images).contains(&slot) {
            return None;
        }
        images.get(&slot)
    }
}

const CARD_IMAGES: &[ImageSlot] = &[
    ImageSlot::Logo,
    ImageSlot::Icon,
    ImageSlot::Strip,
    ImageSlot::Background,
    ImageSlot::Thumbnail,
];

const EVENT_TICKET_IMAGES: &[ImageSlot] = &[
    ImageSlot::Logo,
    ImageSlot::Icon,
    ImageSlot::Strip,
    ImageSlot::Background,
    ImageSlot::Thumbnail,
    ImageSlot::Footer,
];

const GENERIC_IMAGES: &[ImageSlot] = &[
    ImageSlot::Logo,
    ImageSlot::Icon,
    ImageSlot::Thumbnail,
    ImageSlot::Background,
];

static STORE_CARD: LayoutDefinition = LayoutDefinition {
    style: PassStyle::StoreCard,
    display_name: "Store Card",
    field_limits: FieldLimits {
        header_fields: FieldLimit::Max(3),
        primary_fields: FieldLimit::Max(1),
        secondary_fields: FieldLimit::Max(2),
        auxiliary_fields: FieldLimit::Max(2),
        back_fields: FieldLimit::Unlimited,
    },
    allowed_images: CARD_IMAGES,
    rules: LayoutRules {
        strip_blocks_background_and_thumbnail: true,
        stamp_text: Some(StampTextFormat::Von),
    },
};

static COUPON: LayoutDefinition = LayoutDefinition {
    style: PassStyle::Coupon,
    display_name: "Coupon",
    field_limits: FieldLimits {
        header_fields: FieldLimit::Max(3),
        primary_fields: FieldLimit::Max(1),
        secondary_fields: FieldLimit::Max(2),
        auxiliary_fields: FieldLimit::Max(2),
        back_fields: FieldLimit::Unlimited,
    },
    allowed_images: CARD_IMAGES,
    rules: LayoutRules {
        strip_blocks_background_and_thumbnail: true,
        stamp_text: None,
    },
};

static EVENT_TICKET: LayoutDefinition = LayoutDefinition {
    style: PassStyle::EventTicket,
    display_name: "Event Ticket",
    field_limits: FieldLimits {
        header_fields: FieldLimit::Max(3),
        primary_fields: FieldLimit::Max(1),
        secondary_fields: FieldLimit::Max(4),
        auxiliary_fields: FieldLimit::Max(4),
        back_fields: FieldLimit::Unlimited,
    },
    allowed_images: EVENT_TICKET_IMAGES,
    rules: LayoutRules {
        strip_blocks_background_and_thumbnail: false,
        stamp_text: Some(StampTextFormat::Slash),
    },
};

static GENERIC: LayoutDefinition = LayoutDefinition {
    style: PassStyle::Generic,
    display_name: "Generic Card",
    field_limits: FieldLimits {
        header_fields: FieldLimit::Max(3),
        primary_fields: FieldLimit::Max(1),
        secondary_fields: FieldLimit::Max(4),
        auxiliary_fields: FieldLimit::Max(4),
        back_fields: FieldLimit::Unlimited,
    },
    allowed_images: GENERIC_IMAGES,
    rules: LayoutRules {
        strip_blocks_background_and_thumbnail: false,
        stamp_text: None,
    },
};

/// Total over `PassStyle`; every style has exactly one definition.
pub fn layout_definition(style: PassStyle) -> &'static LayoutDefinition {
    match style {
        PassStyle::StoreCard => &STORE_CARD,
        PassStyle::Coupon => &COUPON,
        PassStyle::EventTicket => &EVENT_TICKET,
        PassStyle::Generic => &GENERIC,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(name: &str) -> ImageRef {
        ImageRef {
            url: format!("https://cdn.example.com/{name}.png"),
            file_name: format!("{name}.png"),
        }
    }

    #[test]
    fn test_every_style_has_matching_definition() {
        for style in PassStyle::ALL {
            assert_eq!(layout_definition(style).style, style);
        }
    }

    #[test]
    fn test_field_limit_serializes_unlimited_as_minus_one() {
        let limits = &layout_definition(PassStyle::StoreCard).field_limits;
        let json = serde_json::to_string(limits).unwrap();
        assert!(json.contains(r#""backFields":-1"#));
        assert!(json.contains(r#""primaryFields":1"#));

        let parsed: FieldLimit = serde_json::from_str("-1").unwrap();
        assert_eq!(parsed, FieldLimit::Unlimited);
        assert!(serde_json::from_str::<FieldLimit>("-5").is_err());
    }

    #[test]
    fn test_strip_blocks_background_on_store_card() {
        let layout = layout_definition(PassStyle::StoreCard);
        let mut images = BTreeMap::new();
        images.insert(ImageSlot::Background, image("bg"));
        images.insert(ImageSlot::Thumbnail, image("thumb"));
        assert!(layout.drawable_image(&images, ImageSlot::Background).is_some());

        images.insert(ImageSlot::Strip, image("strip"));
        assert!(layout.drawable_image(&images, ImageSlot::Background).is_none());
        assert!(layout.drawable_image(&images, ImageSlot::Thumbnail).is_none());
        assert!(layout.drawable_image(&images, ImageSlot::Strip).is_some());
    }

    #[test]
    fn test_event_ticket_keeps_thumbnail_with_strip() {
        let layout = layout_definition(PassStyle::EventTicket);
        let mut images = BTreeMap::new();
        images.insert(ImageSlot::Strip, image("strip"));
        images.insert(ImageSlot::Thumbnail, image("thumb"));
        assert!(layout.blocked_images(&images).is_empty());
        assert!(layout.drawable_image(&images, ImageSlot::Thumbnail).is_some());
    }

    #[test]
    fn test_illegal_slot_is_not_drawable() {
        let layout = layout_definition(PassStyle::Generic);
        let mut images = BTreeMap::new();
        images.insert(ImageSlot::Strip, image("strip"));
        assert!(!layout.allows_image(ImageSlot::Strip));
        assert!(layout.drawable_image(&images, ImageSlot::Strip).is_none());
    }

    #[test]
    fn test_stamp_text_formats() {
        assert_eq!(StampTextFormat::Von.format(3, 10), "3 von 10");
        assert_eq!(StampTextFormat::Slash.format(3, 10), "3 / 10");
        assert!(!layout_definition(PassStyle::Coupon).supports_stamps());
    }
}
