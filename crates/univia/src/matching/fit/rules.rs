use std::collections::{BTreeMap, BTreeSet};

use super::super::domain::{CampusSetting, ProfileField, StudentProfile, University};
use super::config::FitConfig;
use super::Criterion;

/// Profile fields consulted while evaluating one option.
pub(crate) type FieldReads = BTreeSet<ProfileField>;

pub(crate) fn evaluate(
    profile: &StudentProfile,
    option: &University,
    config: &FitConfig,
    reads: &mut FieldReads,
) -> BTreeMap<Criterion, f64> {
    let mut breakdown = BTreeMap::new();

    breakdown.insert(Criterion::Accreditation, accreditation(option, config));
    breakdown.insert(Criterion::Portfolio, portfolio(profile, option, config, reads));
    breakdown.insert(
        Criterion::CampusSetting,
        campus_setting(profile, option, config, reads),
    );
    breakdown.insert(Criterion::BudgetGap, budget_gap(profile, option, config, reads));
    breakdown.insert(Criterion::StudentStaffRatio, staff_ratio(option, config));
    breakdown.insert(Criterion::EnglishReady, english(profile, option, config, reads));
    breakdown.insert(
        Criterion::Accessibility,
        accessibility(profile, option, config, reads),
    );

    for score in breakdown.values_mut() {
        *score = score.clamp(0.0, 1.0);
    }

    breakdown
}

fn accreditation(option: &University, config: &FitConfig) -> f64 {
    let recognized = option
        .offer
        .accreditations
        .iter()
        .any(|body| config.accreditation.recognized.contains(body));
    if recognized {
        1.0
    } else {
        0.0
    }
}

fn portfolio(
    profile: &StudentProfile,
    option: &University,
    config: &FitConfig,
    reads: &mut FieldReads,
) -> f64 {
    if !option.admissions.requires_portfolio {
        return 1.0;
    }

    reads.insert(ProfileField::PortfolioReadiness);
    reads.insert(ProfileField::ArtsGrade);

    let confirmed = profile.preferences.portfolio_ready == Some(true);
    let grade_hint = profile
        .academics
        .grades
        .arts
        .map(|grade| grade >= config.portfolio.ready_grade)
        .unwrap_or(false);

    if confirmed || grade_hint {
        1.0
    } else {
        config.portfolio.unready_score
    }
}

fn campus_setting(
    profile: &StudentProfile,
    option: &University,
    config: &FitConfig,
    reads: &mut FieldReads,
) -> f64 {
    let Some(campus) = option.campus.setting else {
        return config.campus.unknown_score;
    };

    reads.insert(ProfileField::CampusPreference);
    match profile.preferences.campus_setting {
        None => config.campus.unknown_score,
        Some(preferred) if preferred == campus => 1.0,
        Some(preferred) if preferred.is_built_up() && campus.is_built_up() => {
            config.campus.built_up_score
        }
        Some(_) => config.campus.mismatch_score,
    }
}

fn budget_gap(
    profile: &StudentProfile,
    option: &University,
    config: &FitConfig,
    reads: &mut FieldReads,
) -> f64 {
    let Some(tuition) = option.tuition() else {
        return config.budget.missing_score;
    };

    reads.insert(ProfileField::Budget);
    let Some(budget) = profile.budget.annual_total.as_ref().map(|money| money.amount) else {
        return config.budget.missing_score;
    };

    let rule = &config.budget;
    let living = rule.living_cost
        + if option.campus.setting == Some(CampusSetting::Urban) {
            rule.urban_living_premium
        } else {
            0.0
        };
    let total_cost = (tuition + living) * rule.cost_multiplier;

    rule.gap.score(budget - total_cost)
}

fn staff_ratio(option: &University, config: &FitConfig) -> f64 {
    match option.offer.student_staff_ratio {
        Some(ratio) => config.staff_ratio.scale.score(ratio),
        None => config.staff_ratio.missing_score,
    }
}

fn english(
    profile: &StudentProfile,
    option: &University,
    config: &FitConfig,
    reads: &mut FieldReads,
) -> f64 {
    let Some(required) = option.admissions.english_min.ielts_overall else {
        return config.english.no_requirement_score;
    };

    reads.insert(ProfileField::EnglishScore);
    match profile.academics.english.score {
        Some(score) => config.english.margin.score(score - required),
        None => config.english.missing_score,
    }
}

fn accessibility(
    profile: &StudentProfile,
    option: &University,
    config: &FitConfig,
    reads: &mut FieldReads,
) -> f64 {
    if option.campus.accessible {
        return 1.0;
    }

    reads.insert(ProfileField::AccessibilityNeed);
    if profile.constraints.accessibility.unwrap_or(false) {
        config.accessibility.unmet_score
    } else {
        1.0
    }
}
