//! Core domain model for the SME investment platform: the opportunity
//! reference codec and the unified opportunity card shape.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CRATE_NAME: &str = "smi-core";

/// Which backing table an opportunity lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Admin,
    Sme,
}

impl Source {
    pub fn as_str(self) -> &'static str {
        match self {
            Source::Admin => "admin",
            Source::Sme => "sme",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid opportunity id")]
pub struct InvalidReference;

/// Externally visible opportunity identifier: `{source}-{id}`.
///
/// Two heterogeneous tables (admin-curated and SME-submitted opportunities)
/// share one id namespace through this tag. A bare positive integer decodes
/// as an SME opportunity for callers that predate the namespacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpportunityRef {
    pub source: Source,
    pub id: i64,
}

impl OpportunityRef {
    pub fn admin(id: i64) -> Self {
        Self {
            source: Source::Admin,
            id,
        }
    }

    pub fn sme(id: i64) -> Self {
        Self {
            source: Source::Sme,
            id,
        }
    }
}

impl fmt::Display for OpportunityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.source, self.id)
    }
}

impl FromStr for OpportunityRef {
    type Err = InvalidReference;

    /// Only plain base-10 digits make a valid id. Ids are integers end to
    /// end, so numeric-looking strings such as `"42.5"`, `"4e2"` or `"+7"`
    /// are rejected as malformed rather than resolving to a miss.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        // Exact lowercase prefixes only; no case normalization.
        let (source, digits) = if let Some(rest) = raw.strip_prefix("admin-") {
            (Source::Admin, rest)
        } else if let Some(rest) = raw.strip_prefix("sme-") {
            (Source::Sme, rest)
        } else {
            (Source::Sme, raw)
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(InvalidReference);
        }
        let id: i64 = digits.parse().map_err(|_| InvalidReference)?;
        if id <= 0 {
            return Err(InvalidReference);
        }
        Ok(Self { source, id })
    }
}

/// Row shape read from `admin_investment_opportunities`.
#[derive(Debug, Clone, Default)]
pub struct AdminOpportunityRecord {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub sector: Option<String>,
    pub sub_industry: Option<String>,
    pub country: Option<String>,
    pub stage: Option<String>,
    pub investment_range: Option<String>,
    pub requirements: Option<String>,
    pub contact: Option<String>,
    pub image_key: Option<String>,
    pub is_active: bool,
    pub created_at: Option<NaiveDateTime>,
}

/// Row shape read from `investment_opportunities` joined to its owning SME.
/// `sector`, `country` and `contact` come from the SME row at read time.
#[derive(Debug, Clone, Default)]
pub struct SmeOpportunityRecord {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub funding_required: Option<f64>,
    pub status: Option<String>,
    pub sector: Option<String>,
    pub country: Option<String>,
    pub use_of_funds: Option<String>,
    pub contact: Option<String>,
    pub created_at: Option<NaiveDateTime>,
}

/// Unified opportunity shape served on the public listing and detail
/// endpoints, regardless of which table the row came from. Field names match
/// the legacy JSON wire contract (mixed camelCase/snake_case).
#[derive(Debug, Clone, Serialize)]
pub struct OpportunityCard {
    pub id: String,
    pub title: String,
    pub description: String,
    pub sector: String,
    #[serde(rename = "subIndustry")]
    pub sub_industry: String,
    pub country: String,
    pub stage: String,
    #[serde(rename = "investmentRange")]
    pub investment_range: String,
    pub requirements: String,
    pub contact: String,
    #[serde(rename = "imageKey")]
    pub image_key: Option<String>,
    #[serde(rename = "isActive", skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    pub source: Source,
    pub created_at: Option<NaiveDateTime>,
}

const DEFAULT_SECTOR: &str = "Other";
const DEFAULT_COUNTRY: &str = "Namibia";
const DEFAULT_STAGE: &str = "Growth";
const DEFAULT_REQUIREMENTS: &str = "Contact for details";

fn or_default(value: Option<String>, default: &str) -> String {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => default.to_string(),
    }
}

/// `funding_required` is a raw NAD amount; the listing shows it in millions
/// with one decimal, e.g. 2_500_000 -> "NAD 2.5M". Missing amount -> "".
pub fn format_funding_nad(funding_required: Option<f64>) -> String {
    match funding_required {
        Some(amount) => format!("NAD {:.1}M", amount / 1_000_000.0),
        None => String::new(),
    }
}

/// Display-layer simplification of the SME lifecycle status, not a faithful
/// stage taxonomy: anything still open is "Growth", the rest "Mature".
pub fn stage_from_status(status: Option<&str>) -> &'static str {
    match status {
        Some("open") => "Growth",
        _ => "Mature",
    }
}

impl OpportunityCard {
    /// Listing-shape admin card: `isActive` is omitted because the listing
    /// only ever shows active rows.
    pub fn from_admin_listing(row: AdminOpportunityRecord) -> Self {
        let mut card = Self::from_admin(row);
        card.is_active = None;
        card
    }

    /// Detail-shape admin card, activation flag included.
    pub fn from_admin_detail(row: AdminOpportunityRecord) -> Self {
        Self::from_admin(row)
    }

    fn from_admin(row: AdminOpportunityRecord) -> Self {
        Self {
            id: OpportunityRef::admin(row.id).to_string(),
            title: row.title,
            description: row.description,
            sector: or_default(row.sector, DEFAULT_SECTOR),
            sub_industry: row.sub_industry.unwrap_or_default(),
            country: or_default(row.country, DEFAULT_COUNTRY),
            stage: or_default(row.stage, DEFAULT_STAGE),
            investment_range: row.investment_range.unwrap_or_default(),
            requirements: or_default(row.requirements, DEFAULT_REQUIREMENTS),
            contact: row.contact.unwrap_or_default(),
            image_key: row.image_key,
            is_active: Some(row.is_active),
            source: Source::Admin,
            created_at: row.created_at,
        }
    }

    pub fn from_sme(row: SmeOpportunityRecord) -> Self {
        Self {
            id: OpportunityRef::sme(row.id).to_string(),
            title: row.title,
            description: row.description,
            sector: or_default(row.sector, DEFAULT_SECTOR),
            sub_industry: String::new(),
            country: or_default(row.country, DEFAULT_COUNTRY),
            stage: stage_from_status(row.status.as_deref()).to_string(),
            investment_range: format_funding_nad(row.funding_required),
            requirements: or_default(row.use_of_funds, DEFAULT_REQUIREMENTS),
            contact: row.contact.unwrap_or_default(),
            image_key: None,
            is_active: None,
            source: Source::Sme,
            created_at: row.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_round_trips_for_both_sources() {
        for source in [Source::Admin, Source::Sme] {
            for id in [1_i64, 7, 42, 9_000_000] {
                let reference = OpportunityRef { source, id };
                let decoded: OpportunityRef = reference.to_string().parse().unwrap();
                assert_eq!(decoded, reference);
            }
        }
    }

    #[test]
    fn bare_numeric_decodes_as_sme() {
        let reference: OpportunityRef = "42".parse().unwrap();
        assert_eq!(reference, OpportunityRef::sme(42));
    }

    #[test]
    fn malformed_references_are_rejected() {
        for raw in [
            "0", "-1", "admin-0", "foo-7", "admin-", "sme-", "", "admin-7x", "Admin-7", "42.5",
            "4e2", "+7", "sme-4e2",
        ] {
            assert!(raw.parse::<OpportunityRef>().is_err(), "accepted {raw:?}");
        }
    }

    #[test]
    fn admin_card_defaults_missing_fields() {
        let row = AdminOpportunityRecord {
            id: 3,
            title: "Solar Co-op".into(),
            description: "desc".into(),
            is_active: true,
            ..Default::default()
        };
        let card = OpportunityCard::from_admin_listing(row);
        assert_eq!(card.id, "admin-3");
        assert_eq!(card.sector, "Other");
        assert_eq!(card.country, "Namibia");
        assert_eq!(card.stage, "Growth");
        assert_eq!(card.requirements, "Contact for details");
        assert_eq!(card.is_active, None);
    }

    #[test]
    fn admin_detail_keeps_activation_flag() {
        let row = AdminOpportunityRecord {
            id: 9,
            title: "t".into(),
            description: "d".into(),
            is_active: false,
            ..Default::default()
        };
        let card = OpportunityCard::from_admin_detail(row);
        assert_eq!(card.is_active, Some(false));
        assert_eq!(card.requirements, "Contact for details");
    }

    #[test]
    fn sme_funding_formats_in_millions() {
        assert_eq!(format_funding_nad(Some(2_500_000.0)), "NAD 2.5M");
        assert_eq!(format_funding_nad(Some(750_000.0)), "NAD 0.8M");
        assert_eq!(format_funding_nad(None), "");
    }

    #[test]
    fn sme_stage_maps_from_lifecycle_status() {
        assert_eq!(stage_from_status(Some("open")), "Growth");
        assert_eq!(stage_from_status(Some("closed")), "Mature");
        assert_eq!(stage_from_status(None), "Mature");
    }

    #[test]
    fn sme_card_derives_display_fields() {
        let row = SmeOpportunityRecord {
            id: 12,
            title: "Agri expansion".into(),
            description: "d".into(),
            funding_required: Some(2_500_000.0),
            status: Some("open".into()),
            sector: Some("Agriculture".into()),
            country: None,
            use_of_funds: None,
            contact: Some("sme@example.na".into()),
            created_at: None,
        };
        let card = OpportunityCard::from_sme(row);
        assert_eq!(card.id, "sme-12");
        assert_eq!(card.investment_range, "NAD 2.5M");
        assert_eq!(card.stage, "Growth");
        assert_eq!(card.country, "Namibia");
        assert_eq!(card.requirements, "Contact for details");
        assert_eq!(card.image_key, None);
    }

    #[test]
    fn card_serializes_with_legacy_field_names() {
        let row = AdminOpportunityRecord {
            id: 1,
            title: "t".into(),
            description: "d".into(),
            sub_industry: Some("Dairy".into()),
            is_active: true,
            ..Default::default()
        };
        let json = serde_json::to_value(OpportunityCard::from_admin_listing(row)).unwrap();
        assert_eq!(json["subIndustry"], "Dairy");
        assert_eq!(json["investmentRange"], "");
        assert_eq!(json["source"], "admin");
        assert!(json.get("isActive").is_none());
    }
}
