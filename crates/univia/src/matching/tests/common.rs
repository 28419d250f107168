use crate::matching::{
    CampusSetting, EngineConfig, MatchingEngine, Money, OptionId, StudentProfile, University,
};

pub(super) const TOLERANCE: f64 = 1e-9;

pub(super) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < TOLERANCE,
        "expected {expected}, got {actual}"
    );
}

pub(super) fn id(raw: &str) -> OptionId {
    OptionId::from(raw)
}

pub(super) fn option(raw_id: &str, setting: Option<CampusSetting>, tuition: Option<f64>) -> University {
    let mut university = University::new(raw_id);
    university.name = Some(format!("University {raw_id}"));
    university.campus.setting = setting;
    university.fees.tuition = tuition.map(Money::eur);
    university
}

/// Accredited, affordable, urban and accessible.
pub(super) fn strong_option() -> University {
    let mut university = option("uni-a", Some(CampusSetting::Urban), Some(20_000.0));
    university.offer.accreditations.insert("RIBA".to_string());
    university.offer.student_staff_ratio = Some(16.0);
    university.campus.accessible = true;
    university
}

/// Unaccredited, expensive, rural, portfolio and IELTS gated.
pub(super) fn weak_option() -> University {
    let mut university = option("uni-b", Some(CampusSetting::Rural), Some(45_000.0));
    university.offer.student_staff_ratio = Some(25.0);
    university.admissions.requires_portfolio = true;
    university.admissions.english_min.ielts_overall = Some(7.0);
    university
}

pub(super) fn middle_option() -> University {
    let mut university = option("uni-c", Some(CampusSetting::Suburban), Some(24_000.0));
    university.offer.accreditations.insert("ARB".to_string());
    university.offer.student_staff_ratio = Some(14.0);
    university.campus.accessible = true;
    university
}

/// Wants an urban campus and brings a comfortable budget.
pub(super) fn urban_student() -> StudentProfile {
    let mut profile = StudentProfile {
        id: "stu-urban".to_string(),
        ..StudentProfile::default()
    };
    profile.budget.annual_total = Some(Money::eur(50_000.0));
    profile.preferences.campus_setting = Some(CampusSetting::Urban);
    profile
}

pub(super) fn blank_student() -> StudentProfile {
    StudentProfile {
        id: "stu-blank".to_string(),
        ..StudentProfile::default()
    }
}

/// Six options spread over three campus settings and three price tiers.
pub(super) fn mixed_catalog() -> Vec<University> {
    let mut catalog = vec![strong_option(), weak_option(), middle_option()];
    catalog.push(option("uni-d", Some(CampusSetting::Urban), Some(30_000.0)));
    catalog.push(option("uni-e", Some(CampusSetting::Rural), Some(18_000.0)));
    catalog.push(option("uni-f", None, None));
    catalog
}

pub(super) fn engine(profile: StudentProfile, catalog: Vec<University>) -> MatchingEngine {
    MatchingEngine::initialize(profile, catalog, 42, EngineConfig::default())
        .expect("engine initializes")
}
