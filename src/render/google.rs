//! Google-style pass preview.
//!
//! A single stacked card. It shows less than the Apple preview on purpose:
//! only the first primary field makes it onto this surface.

use serde::Serialize;

use super::{drawn_image, Platform, PreviewRenderer, RenderedBarcode, RenderedField, RenderedImage};
use crate::draft::{PassDraft, TextAlignment};
use crate::layout::{FieldGroup, ImageSlot, PassStyle};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GooglePreview {
    pub style: PassStyle,
    pub background_color: String,
    pub header: GoogleHeader,
    pub program_title: String,
    pub primary: Option<RenderedField>,
    pub barcode: Option<RenderedBarcode>,
    pub hero: GoogleHero,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleHeader {
    pub logo: Option<RenderedImage>,
    pub issuer_name: String,
}

/// Full-bleed band at the bottom of the card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum GoogleHero {
    Image { image: RenderedImage },
    Placeholder,
}

impl GooglePreview {
    pub fn drawn_images(&self) -> Vec<ImageSlot> {
        let hero = match &self.hero {
            GoogleHero::Image { image } => Some(image.slot),
            GoogleHero::Placeholder => None,
        };
        self.header.logo.iter().map(|i| i.slot).chain(hero).collect()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GoogleRenderer;

impl GoogleRenderer {
    fn program_title(&self, draft: &PassDraft) -> String {
        if !draft.content.program_name.trim().is_empty() {
            return draft.content.program_name.clone();
        }
        let fallback = match draft.style() {
            PassStyle::StoreCard => "Loyalty Card",
            PassStyle::Coupon => "Offer",
            PassStyle::EventTicket => "Event Ticket",
            PassStyle::Generic => "Pass",
        };
        fallback.to_string()
    }

    fn hero(&self, draft: &PassDraft) -> GoogleHero {
        let layout = draft.layout();
        [ImageSlot::Strip, ImageSlot::Background]
            .into_iter()
            .find_map(|slot| drawn_image(layout, &draft.images, slot))
            .map_or(GoogleHero::Placeholder, |image| GoogleHero::Image { image })
    }
}

impl PreviewRenderer for GoogleRenderer {
    type Preview = GooglePreview;

    fn platform(&self) -> Platform {
        Platform::Google
    }

    fn render(&self, draft: &PassDraft) -> GooglePreview {
        let layout = draft.layout();

        GooglePreview {
            style: draft.style(),
            background_color: draft.colors.background_color.clone(),
            header: GoogleHeader {
                logo: drawn_image(layout, &draft.images, ImageSlot::Logo)
                    .or_else(|| drawn_image(layout, &draft.images, ImageSlot::Icon)),
                issuer_name: draft.content.organization_name.clone(),
            },
            program_title: self.program_title(draft),
            primary: draft
                .fields(FieldGroup::Primary)
                .first()
                .map(|field| RenderedField::from_field(field, TextAlignment::Natural)),
            barcode: RenderedBarcode::from_config(&draft.barcode),
            hero: self.hero(draft),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::{ImageRef, PassField};

    fn image(name: &str) -> Option<ImageRef> {
        Some(ImageRef {
            url: format!("https://cdn.example.com/{name}.png"),
            file_name: format!("{name}.png"),
        })
    }

    #[test]
    fn test_only_first_primary_field_shown() {
        let mut draft = PassDraft::new(PassStyle::EventTicket);
        draft.fields.insert(
            FieldGroup::Primary,
            vec![PassField::new("event", "Event", "Gala"), PassField::new("extra", "Extra", "x")],
        );
        draft.fields.insert(FieldGroup::Secondary, vec![PassField::new("seat", "Seat", "A1")]);

        let preview = GoogleRenderer.render(&draft);
        assert_eq!(preview.primary.map(|f| f.key), Some("event".to_string()));
    }

    #[test]
    fn test_hero_falls_back_to_background_then_placeholder() {
        let draft = PassDraft::new(PassStyle::Generic);
        assert_eq!(GoogleRenderer.render(&draft).hero, GoogleHero::Placeholder);

        let draft = draft.set_image(ImageSlot::Background, image("bg"));
        match GoogleRenderer.render(&draft).hero {
            GoogleHero::Image { image } => assert_eq!(image.slot, ImageSlot::Background),
            GoogleHero::Placeholder => panic!("expected background hero"),
        }
    }

    #[test]
    fn test_program_title_fallback_per_style() {
        let draft = PassDraft::new(PassStyle::StoreCard);
        assert_eq!(GoogleRenderer.render(&draft).program_title, "Loyalty Card");

        let mut named = draft.clone();
        named.content.program_name = "Bean Club".to_string();
        assert_eq!(GoogleRenderer.render(&named).program_title, "Bean Club");
    }

    #[test]
    fn test_logo_falls_back_to_icon() {
        let draft = PassDraft::new(PassStyle::Coupon).set_image(ImageSlot::Icon, image("icon"));
        let preview = GoogleRenderer.render(&draft);
        assert_eq!(preview.drawn_images(), vec![ImageSlot::Icon]);
    }
}
