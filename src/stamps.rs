//! Stamp-Progress Synthesizer
//!
//! `StampConfig` is the single source of truth for stamp progress. The text
//! and glyph strings written into the draft are outputs only and are never
//! parsed back into numbers.

use crate::capacity;
use crate::draft::{EditRejection, PassDraft, PassField, StampConfig, TextAlignment};
use crate::layout::FieldGroup;

pub const STAMPS_KEY: &str = "stamps";
pub const PROGRESS_VISUAL_KEY: &str = "progress_visual";
pub const PROGRESS_VISUAL_LABEL: &str = "progress";
pub const POWERED_KEY: &str = "powered";

const STAMPS_LABEL: &str = "Stamps";

/// Textual and symbolic renderings of one stamp configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StampProgress {
    pub text: String,
    pub visual: String,
}

/// `current` active glyphs followed by the inactive remainder, space separated.
pub fn visual_progress(config: &StampConfig) -> String {
    let current = config.current() as usize;
    let total = config.total() as usize;
    let glyph_len = config.icon().len().max(config.inactive_icon().len());

    let mut visual = String::with_capacity(total * (glyph_len + 1));
    for slot in 0..total {
        if slot > 0 {
            visual.push(' ');
        }
        visual.push_str(if slot < current {
            config.icon()
        } else {
            config.inactive_icon()
        });
    }
    visual
}

impl PassDraft {
    /// Stores a clamped stamp configuration without touching any field.
    pub fn set_stamp_config(&self, config: StampConfig) -> Result<Self, EditRejection> {
        if !self.layout().supports_stamps() {
            return Err(EditRejection::StampsUnsupported(self.style()));
        }
        let mut next = self.clone();
        next.stamp_config = Some(config);
        Ok(next)
    }

    pub fn stamp_progress(&self, config: &StampConfig) -> Result<StampProgress, EditRejection> {
        let format = self
            .layout()
            .rules
            .stamp_text
            .ok_or(EditRejection::StampsUnsupported(self.style()))?;
        Ok(StampProgress {
            text: format.format(config.current(), config.total()),
            visual: visual_progress(config),
        })
    }

    /// Writes stamp progress into the `stamps` primary field and the
    /// `progress_visual` auxiliary field, moving an auxiliary `powered` field
    /// to the secondary group first.
    ///
    /// A field that does not exist yet is only created when its group has
    /// room; otherwise it is skipped and the validator reports it.
    pub fn synthesize_stamps(&self, config: StampConfig) -> Result<Self, EditRejection> {
        let progress = self.stamp_progress(&config)?;
        let mut next = self.set_stamp_config(config)?;

        next.write_keyed(FieldGroup::Primary, STAMPS_KEY, STAMPS_LABEL, &progress.text, None);
        next.relocate_powered();
        next.write_keyed(
            FieldGroup::Auxiliary,
            PROGRESS_VISUAL_KEY,
            PROGRESS_VISUAL_LABEL,
            &progress.visual,
            Some(TextAlignment::Center),
        );

        Ok(next)
    }

    fn write_keyed(
        &mut self,
        group: FieldGroup,
        key: &str,
        label: &str,
        value: &str,
        alignment: Option<TextAlignment>,
    ) {
        if let Some(index) = self.fields(group).iter().position(|f| f.key == key) {
            let field = &mut self.fields_mut(group)[index];
            field.value = value.to_string();
            if alignment.is_some() {
                field.text_alignment = alignment;
            }
            return;
        }

        if !capacity::can_add_field(self, group) {
            tracing::debug!(%group, key, "no room for stamp field, skipping");
            return;
        }

        let mut field = PassField::new(key, label, value);
        field.text_alignment = alignment;
        self.fields_mut(group).push(field);
    }

    // Moves whenever secondary has no `powered` of its own. A full secondary
    // group is left to the validator's field count check.
    fn relocate_powered(&mut self) {
        let Some(index) = self
            .fields(FieldGroup::Auxiliary)
            .iter()
            .position(|f| f.key == POWERED_KEY)
        else {
            return;
        };

        if self.field(FieldGroup::Secondary, POWERED_KEY).is_some() {
            return;
        }

        let powered = self.fields_mut(FieldGroup::Auxiliary).remove(index);
        self.fields_mut(FieldGroup::Secondary).push(powered);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::MAX_STAMPS;
    use crate::layout::PassStyle;

    fn config(current: u32, total: u32) -> StampConfig {
        StampConfig::new("🟢", "⚪", total, current)
    }

    #[test]
    fn test_visual_progress() {
        assert_eq!(visual_progress(&config(2, 4)), "🟢 🟢 ⚪ ⚪");
        assert_eq!(visual_progress(&config(0, 2)), "⚪ ⚪");
        assert_eq!(visual_progress(&config(3, 3)), "🟢 🟢 🟢");
    }

    #[test]
    fn test_visual_progress_at_stamp_ceiling() {
        let visual = visual_progress(&config(u32::MAX, u32::MAX));
        assert_eq!(visual.split(' ').count(), MAX_STAMPS as usize);
        assert!(visual.split(' ').all(|glyph| glyph == "🟢"));
    }

    #[test]
    fn test_event_ticket_uses_slash_text() {
        let draft = PassDraft::new(PassStyle::EventTicket)
            .synthesize_stamps(config(4, 6))
            .unwrap();
        assert_eq!(draft.field(FieldGroup::Primary, STAMPS_KEY).unwrap().value, "4 / 6");
    }

    #[test]
    fn test_unsupported_style_rejected() {
        let draft = PassDraft::new(PassStyle::Coupon);
        assert_eq!(
            draft.synthesize_stamps(config(1, 5)).unwrap_err(),
            EditRejection::StampsUnsupported(PassStyle::Coupon)
        );
        assert!(draft.set_stamp_config(config(1, 5)).is_err());
    }

    #[test]
    fn test_updates_existing_fields_in_place() {
        let mut draft = PassDraft::new(PassStyle::StoreCard);
        draft.fields.insert(
            FieldGroup::Primary,
            vec![PassField::new(STAMPS_KEY, "Stamps", "0 von 10")],
        );
        draft.fields.insert(
            FieldGroup::Auxiliary,
            vec![
                PassField::new("member", "Member", "Alex"),
                PassField::new(PROGRESS_VISUAL_KEY, PROGRESS_VISUAL_LABEL, ""),
            ],
        );

        let next = draft.synthesize_stamps(config(1, 3)).unwrap();
        assert_eq!(next.fields(FieldGroup::Primary).len(), 1);
        assert_eq!(next.fields(FieldGroup::Primary)[0].value, "1 von 3");
        assert_eq!(next.fields(FieldGroup::Auxiliary).len(), 2);
        let visual = next.field(FieldGroup::Auxiliary, PROGRESS_VISUAL_KEY).unwrap();
        assert_eq!(visual.value, "🟢 ⚪ ⚪");
        assert_eq!(visual.text_alignment, Some(TextAlignment::Center));
    }

    #[test]
    fn test_relocates_powered_to_secondary() {
        let mut draft = PassDraft::new(PassStyle::StoreCard);
        draft.fields.insert(
            FieldGroup::Auxiliary,
            vec![
                PassField::new("member", "Member", "Alex"),
                PassField::new(POWERED_KEY, "Powered by", "PassForge"),
            ],
        );

        let next = draft.synthesize_stamps(config(2, 5)).unwrap();
        assert!(next.field(FieldGroup::Auxiliary, POWERED_KEY).is_none());
        assert!(next.field(FieldGroup::Secondary, POWERED_KEY).is_some());
        assert!(next.field(FieldGroup::Auxiliary, PROGRESS_VISUAL_KEY).is_some());
    }

    #[test]
    fn test_does_not_duplicate_powered() {
        let mut draft = PassDraft::new(PassStyle::StoreCard);
        draft.fields.insert(
            FieldGroup::Secondary,
            vec![PassField::new(POWERED_KEY, "Powered by", "PassForge")],
        );
        draft.fields.insert(
            FieldGroup::Auxiliary,
            vec![PassField::new(POWERED_KEY, "Powered by", "PassForge")],
        );

        let next = draft.synthesize_stamps(config(2, 5)).unwrap();
        assert_eq!(next.fields(FieldGroup::Secondary).len(), 1);
        assert!(next.field(FieldGroup::Auxiliary, POWERED_KEY).is_some());
    }

    #[test]
    fn test_relocates_powered_into_full_secondary() {
        let mut draft = PassDraft::new(PassStyle::StoreCard);
        draft.fields.insert(
            FieldGroup::Secondary,
            vec![PassField::new("a", "A", "1"), PassField::new("b", "B", "2")],
        );
        draft.fields.insert(
            FieldGroup::Auxiliary,
            vec![PassField::new(POWERED_KEY, "Powered by", "PassForge")],
        );

        let next = draft.synthesize_stamps(config(2, 5)).unwrap();
        let keys = |group: FieldGroup| -> Vec<String> {
            next.fields(group).iter().map(|f| f.key.clone()).collect()
        };
        assert_eq!(keys(FieldGroup::Secondary), vec!["a", "b", POWERED_KEY]);
        assert_eq!(keys(FieldGroup::Auxiliary), vec![PROGRESS_VISUAL_KEY]);

        let result = crate::validation::validate_draft(&next);
        assert!(!result.valid);
        assert!(result
            .errors
            .iter()
            .any(|e| e.rule == "field_count" && e.path == "fields.secondaryFields"));
    }

    #[test]
    fn test_skips_when_group_full() {
        let mut draft = PassDraft::new(PassStyle::StoreCard);
        draft.fields.insert(
            FieldGroup::Primary,
            vec![PassField::new("balance", "Balance", "12 EUR")],
        );

        let next = draft.synthesize_stamps(config(3, 10)).unwrap();
        assert!(next.field(FieldGroup::Primary, STAMPS_KEY).is_none());
        assert_eq!(next.fields(FieldGroup::Primary).len(), 1);
        assert!(next.field(FieldGroup::Auxiliary, PROGRESS_VISUAL_KEY).is_some());
        assert_eq!(next.stamp_config.as_ref().map(StampConfig::current), Some(3));
    }
}
