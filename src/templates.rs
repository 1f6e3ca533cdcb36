//! Template Catalog - Named Starting Points
//!
//! A template is a complete, valid draft plus catalog metadata. Instantiating
//! one hands out an independent copy of its draft.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::draft::{
    BarcodeConfig, BarcodeFormat, PassColors, PassContent, PassDraft, PassField, StampConfig,
};
use crate::layout::{FieldGroup, PassStyle};
use crate::ENGINE_VERSION;

pub type TemplateId = String;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassTemplate {
    pub id: TemplateId,
    pub name: String,
    pub description: String,
    pub template_version: String,
    pub engine_min_version: String,
    #[serde(default)]
    pub deprecated: bool,
    #[serde(default)]
    pub superseded_by: Option<String>,
    pub draft: PassDraft,
}

impl PassTemplate {
    pub fn style(&self) -> PassStyle {
        self.draft.style()
    }

    /// Whether this engine is new enough for the template.
    pub fn is_supported(&self) -> bool {
        let (Ok(engine), Ok(min)) = (
            semver::Version::parse(ENGINE_VERSION),
            semver::Version::parse(&self.engine_min_version),
        ) else {
            return false;
        };
        engine >= min
    }
}

/// Template catalog - built-in templates plus any loaded from disk
pub struct TemplateCatalog {
    templates: BTreeMap<TemplateId, PassTemplate>,
}

impl TemplateCatalog {
    pub fn new() -> Self {
        Self { templates: BTreeMap::new() }
    }

    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        for template in builtin_templates() {
            catalog.register(template);
        }
        catalog
    }

    pub fn load_from_dir(dir: &Path) -> Result<Self, std::io::Error> {
        let mut catalog = Self::new();
        catalog.extend_from_dir(dir)?;
        Ok(catalog)
    }

    /// Adds every readable `*.json` template in `dir`; returns how many were added.
    pub fn extend_from_dir(&mut self, dir: &Path) -> Result<usize, std::io::Error> {
        let mut added = 0;
        if !dir.exists() {
            return Ok(added);
        }

        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if !path.extension().map_or(false, |e| e == "json") {
                continue;
            }

            let content = match fs::read_to_string(&path) {
                Ok(content) => content,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "unreadable template file");
                    continue;
                }
            };
            let template = match serde_json::from_str::<PassTemplate>(&content) {
                Ok(template) => template,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "invalid template file");
                    continue;
                }
            };
            if !template.is_supported() {
                tracing::warn!(
                    id = %template.id,
                    required = %template.engine_min_version,
                    engine = ENGINE_VERSION,
                    "template needs a newer engine, skipping"
                );
                continue;
            }

            self.register(template);
            added += 1;
        }

        Ok(added)
    }

    pub fn get(&self, id: &str) -> Option<&PassTemplate> {
        self.templates.get(id)
    }

    pub fn list(&self) -> Vec<&PassTemplate> {
        self.templates.values().collect()
    }

    pub fn register(&mut self, template: PassTemplate) {
        self.templates.insert(template.id.clone(), template);
    }

    /// `None` for an unknown id.
    pub fn create_draft(&self, id: &str) -> Option<PassDraft> {
        self.get(id).map(|template| template.draft.clone())
    }
}

impl Default for TemplateCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

pub fn create_draft_from_template(id: &str) -> Option<PassDraft> {
    TemplateCatalog::builtin().create_draft(id)
}

fn template(id: &str, name: &str, description: &str, draft: PassDraft) -> PassTemplate {
    PassTemplate {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        template_version: "1.0.0".to_string(),
        engine_min_version: "1.0.0".to_string(),
        deprecated: false,
        superseded_by: None,
        draft,
    }
}

fn base_draft(style: PassStyle, description: &str, program_name: &str, barcode: &str) -> PassDraft {
    let mut draft = PassDraft::new(style);
    draft.content = PassContent {
        organization_name: "Your Business".to_string(),
        description: description.to_string(),
        logo_text: "Your Business".to_string(),
        program_name: program_name.to_string(),
    };
    draft.barcode = BarcodeConfig {
        format: BarcodeFormat::Qr,
        message: barcode.to_string(),
        alt_text: None,
    };
    draft
}

fn builtin_templates() -> Vec<PassTemplate> {
    let mut stamp_card = base_draft(PassStyle::StoreCard, "Stamp card", "Stamp Card", "STAMP-0001");
    stamp_card.colors = PassColors {
        background_color: "rgb(60, 36, 21)".to_string(),
        foreground_color: "rgb(255, 255, 255)".to_string(),
        label_color: "rgb(230, 200, 160)".to_string(),
    };
    stamp_card.fields.insert(
        FieldGroup::Secondary,
        vec![PassField::new("reward", "Reward", "Free coffee")],
    );
    stamp_card.fields.insert(
        FieldGroup::Auxiliary,
        vec![PassField::new("powered", "Powered by", "PassForge")],
    );
    stamp_card.fields.insert(
        FieldGroup::Back,
        vec![PassField::new(
            "terms",
            "Terms",
            "One stamp per purchase. Stamps have no cash value.",
        )],
    );
    let stamp_card = stamp_card
        .synthesize_stamps(StampConfig::new("☕", "⚪", 10, 0))
        .unwrap_or(stamp_card);

    let mut membership = base_draft(
        PassStyle::StoreCard,
        "Membership card",
        "Members Club",
        "MEMBER-0001",
    );
    membership.fields.insert(
        FieldGroup::Primary,
        vec![PassField::new("member", "Member", "Member Name")],
    );
    membership.fields.insert(FieldGroup::Secondary, vec![PassField::new("tier", "Tier", "Gold")]);
    membership.fields.insert(
        FieldGroup::Auxiliary,
        vec![PassField::new("member_id", "Member ID", "0001")],
    );

    let mut coupon = base_draft(PassStyle::Coupon, "Discount coupon", "Seasonal Offer", "SAVE20");
    coupon.fields.insert(FieldGroup::Primary, vec![PassField::new("offer", "Offer", "20% off")]);
    coupon.fields.insert(
        FieldGroup::Secondary,
        vec![PassField::new("expires", "Valid until", "31.12.")],
    );
    coupon.fields.insert(FieldGroup::Auxiliary, vec![PassField::new("code", "Code", "SAVE20")]);

    let mut generic = base_draft(PassStyle::Generic, "Generic pass", "", "PASS-0001");
    generic.fields.insert(FieldGroup::Primary, vec![PassField::new("name", "Name", "Pass Holder")]);
    generic.fields.insert(
        FieldGroup::Secondary,
        vec![PassField::new("valid", "Valid", "Always")],
    );

    vec![
        template("stamp-card", "Stamp Card", "Collect stamps towards a reward", stamp_card),
        template("membership-card", "Membership Card", "Member identity and tier", membership),
        template("coupon", "Coupon", "Single discount offer", coupon),
        template("generic-card", "Generic Card", "Free-form pass", generic),
    ]
}
