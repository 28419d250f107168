use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Identifier wrapper for catalog options (universities).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionId(pub String);

impl OptionId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OptionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Monetary amount as carried by the normalized records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Money {
    pub amount: f64,
    #[serde(default)]
    pub currency: String,
}

impl Money {
    pub fn eur(amount: f64) -> Self {
        Self {
            amount,
            currency: "EUR".to_string(),
        }
    }
}

/// Coarse description of where a campus sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampusSetting {
    Urban,
    Suburban,
    Rural,
}

impl CampusSetting {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "urban" => Some(Self::Urban),
            "suburban" => Some(Self::Suburban),
            "rural" => Some(Self::Rural),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            CampusSetting::Urban => "urban",
            CampusSetting::Suburban => "suburban",
            CampusSetting::Rural => "rural",
        }
    }

    /// Urban and suburban campuses are treated as close substitutes.
    pub const fn is_built_up(self) -> bool {
        matches!(self, CampusSetting::Urban | CampusSetting::Suburban)
    }
}

/// Unknown settings in catalog or profile records degrade to `None` instead of failing the load.
fn deserialize_lenient_setting<'de, D>(deserializer: D) -> Result<Option<CampusSetting>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(CampusSetting::parse))
}

/// Requester profile. Every field the scorer reads is optional so absence is visible in the type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudentProfile {
    pub id: String,
    pub budget: BudgetProfile,
    pub academics: Academics,
    pub preferences: Preferences,
    pub constraints: Constraints,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BudgetProfile {
    pub annual_total: Option<Money>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Academics {
    pub grades: Grades,
    pub english: EnglishProficiency,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Grades {
    #[serde(alias = "arts_plastiques")]
    pub arts: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnglishProficiency {
    /// IELTS overall band (or equivalent already converted upstream).
    pub score: Option<f64>,
    pub test_plan: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    #[serde(deserialize_with = "deserialize_lenient_setting")]
    pub campus_setting: Option<CampusSetting>,
    pub portfolio_ready: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Constraints {
    /// Step-free access / reduced-mobility requirement.
    #[serde(alias = "pmr")]
    pub accessibility: Option<bool>,
}

/// Catalog entry. Read-only for the duration of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct University {
    pub id: OptionId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub offer: Offer,
    #[serde(default)]
    pub admissions: Admissions,
    #[serde(default)]
    pub fees: Fees,
    #[serde(default)]
    pub campus: Campus,
}

impl University {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: OptionId::new(id),
            name: None,
            offer: Offer::default(),
            admissions: Admissions::default(),
            fees: Fees::default(),
            campus: Campus::default(),
        }
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(self.id.as_str())
    }

    pub fn tuition(&self) -> Option<f64> {
        self.fees.tuition.as_ref().map(|money| money.amount)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Offer {
    pub accreditations: BTreeSet<String>,
    pub student_staff_ratio: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Admissions {
    pub requires_portfolio: bool,
    pub english_min: EnglishRequirement,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnglishRequirement {
    pub ielts_overall: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Fees {
    pub tuition: Option<Money>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Campus {
    #[serde(deserialize_with = "deserialize_lenient_setting")]
    pub setting: Option<CampusSetting>,
    #[serde(alias = "pmr_ok")]
    pub accessible: bool,
}

/// Profile fields the fit rules may consult. Cache entries record which of these they read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileField {
    Budget,
    ArtsGrade,
    PortfolioReadiness,
    EnglishScore,
    LanguageTestPlan,
    CampusPreference,
    AccessibilityNeed,
}

/// Categories of missing profile information, in the order they are asked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Slot {
    #[serde(rename = "budget_range")]
    Budget,
    #[serde(rename = "need_portfolio")]
    Portfolio,
    #[serde(rename = "ielts_plan")]
    LanguageTestPlan,
    #[serde(rename = "campus_setting")]
    CampusSetting,
    #[serde(rename = "pmr_needs")]
    Accessibility,
}

impl Slot {
    pub const PRIORITY: [Slot; 5] = [
        Slot::Budget,
        Slot::Portfolio,
        Slot::LanguageTestPlan,
        Slot::CampusSetting,
        Slot::Accessibility,
    ];

    pub const fn id(self) -> &'static str {
        match self {
            Slot::Budget => "budget_range",
            Slot::Portfolio => "need_portfolio",
            Slot::LanguageTestPlan => "ielts_plan",
            Slot::CampusSetting => "campus_setting",
            Slot::Accessibility => "pmr_needs",
        }
    }

    pub fn from_id(raw: &str) -> Option<Self> {
        Self::PRIORITY
            .into_iter()
            .find(|slot| slot.id() == raw.trim())
    }

    /// Profile field an answer to this slot writes.
    pub const fn field(self) -> ProfileField {
        match self {
            Slot::Budget => ProfileField::Budget,
            Slot::Portfolio => ProfileField::PortfolioReadiness,
            Slot::LanguageTestPlan => ProfileField::LanguageTestPlan,
            Slot::CampusSetting => ProfileField::CampusPreference,
            Slot::Accessibility => ProfileField::AccessibilityNeed,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}
