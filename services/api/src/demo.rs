use clap::Args;
use std::path::PathBuf;
use univia::catalog::{load_catalog, StudentDirectory};
use univia::error::AppError;
use univia::matching::{
    CampusSetting, EngineConfig, MatchingEngine, Money, OptionId, Slot, StudentProfile,
    University,
};
use univia::session::{RankingSession, SessionPolicy, SlotPrompts};

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Seed for the catalog shuffle.
    #[arg(long, default_value_t = 42)]
    pub(crate) seed: u64,
    /// Maximum feedback rounds to simulate.
    #[arg(long, default_value_t = 4)]
    pub(crate) rounds: usize,
    /// Normalized university store; the built-in sample catalog is used otherwise.
    #[arg(long)]
    pub(crate) universities: Option<PathBuf>,
    /// Normalized student store, used together with --universities.
    #[arg(long)]
    pub(crate) students: Option<PathBuf>,
    /// Student to simulate (defaults to the first student in the store).
    #[arg(long)]
    pub(crate) student: Option<String>,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        seed,
        rounds,
        universities,
        students,
        student,
    } = args;

    let (catalog, directory) = match universities {
        Some(path) => {
            let students = students.unwrap_or_else(|| PathBuf::from("students_normalized.json"));
            load_catalog(path, students)?
        }
        None => (
            sample_catalog(),
            StudentDirectory::new(vec![sample_student()]),
        ),
    };
    let student_id = student.unwrap_or_else(|| directory.default_id());
    let profile = directory.resolve(&student_id);

    let engine = MatchingEngine::initialize(profile, catalog, seed, EngineConfig::default())?;
    let mut session = RankingSession::new(engine, SessionPolicy::default());
    let prompts = SlotPrompts::default();

    println!("University matching demo");
    println!(
        "Student {} | {} options | seed {}",
        session.student_id(),
        session.engine().catalog().len(),
        seed
    );

    for round in 1..=rounds {
        let state = session.state();
        println!(
            "\nRound {round} (alpha {:.2})",
            state.engine.stop_signal_input.alpha
        );
        for option in &state.engine.active_subset {
            let name = session
                .engine()
                .option(option)
                .map(University::display_name)
                .unwrap_or(option.as_str());
            if let Some(scores) = state.engine.scores.get(option) {
                println!(
                    "- {name}: fit {:.3} | preference {:.3} | hybrid {:.3}",
                    scores.fit, scores.preference, scores.hybrid
                );
            }
        }

        if state.should_stop {
            println!("Stopping: ranking has converged");
            break;
        }

        let Some((best, worst)) = extremes(&state.engine.active_subset, |id| {
            state.engine.scores.get(id).map(|scores| scores.fit)
        }) else {
            break;
        };

        let asked = session
            .comment(&best, "The studio spaces look great")
            .unwrap_or_default();
        if let Some(slot) = asked.first().copied() {
            let answer = scripted_answer(slot);
            println!("  Q: {}", prompts.text(slot));
            println!("  A: {answer}");
            if let Ok(effect) = session.answer(&best, slot, answer) {
                if let Some(replacement) = effect.replacement {
                    println!(
                        "  Subset refreshed: {} -> {}",
                        replacement.removed, replacement.added
                    );
                }
            }
        }

        if best != worst && session.pairwise(&best, &worst) {
            println!("  Preferred {best} over {worst}");
        }
    }

    let table = session.ranking();
    println!("\nFinal ranking{}", if table.stop { " (converged)" } else { "" });
    for (position, entry) in table.ranking.iter().enumerate() {
        println!("{:>2}. {} ({:.3})", position + 1, entry.name, entry.score);
    }

    Ok(())
}

/// Highest and lowest scored ids in `ids`.
fn extremes<F>(ids: &[OptionId], score: F) -> Option<(OptionId, OptionId)>
where
    F: Fn(&OptionId) -> Option<f64>,
{
    let scored: Vec<(&OptionId, f64)> = ids
        .iter()
        .filter_map(|id| score(id).map(|value| (id, value)))
        .collect();
    let best = scored
        .iter()
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(id, _)| (*id).clone())?;
    let worst = scored
        .iter()
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(id, _)| (*id).clone())?;
    Some((best, worst))
}

fn scripted_answer(slot: Slot) -> &'static str {
    match slot {
        Slot::Budget => "38 000 €",
        Slot::Portfolio => "yes",
        Slot::LanguageTestPlan => "Booked for March, aiming for 7.0",
        Slot::CampusSetting => "urban",
        Slot::Accessibility => "no",
    }
}

fn sample_student() -> StudentProfile {
    let mut profile = StudentProfile {
        id: "demo-student".to_string(),
        ..StudentProfile::default()
    };
    profile.academics.grades.arts = Some(13.5);
    profile.academics.english.score = Some(6.5);
    profile
}

type SampleRow = (&'static str, &'static str, CampusSetting, f64, &'static [&'static str], f64);

const SAMPLE_ROWS: [SampleRow; 7] = [
    ("bath", "University of Bath", CampusSetting::Suburban, 26_500.0, &["RIBA"], 13.0),
    ("ucl", "UCL Bartlett", CampusSetting::Urban, 35_000.0, &["RIBA", "ARB"], 10.0),
    ("sheffield", "University of Sheffield", CampusSetting::Urban, 27_000.0, &["RIBA"], 15.0),
    ("lincoln", "University of Lincoln", CampusSetting::Rural, 17_000.0, &[], 19.0),
    ("leeds", "Leeds Beckett", CampusSetting::Urban, 21_000.0, &["ARB"], 16.0),
    ("dundee", "University of Dundee", CampusSetting::Suburban, 23_000.0, &["RIBA"], 14.0),
    ("kent", "University of Kent", CampusSetting::Rural, 22_500.0, &["RIBA"], 21.0),
];

/// Portfolio and IELTS gated programmes in the sample catalog.
const SELECTIVE: [&str; 3] = ["bath", "ucl", "sheffield"];

fn sample_catalog() -> Vec<University> {
    SAMPLE_ROWS
        .iter()
        .map(|&(id, name, setting, tuition, accreditations, ratio)| {
            let mut option = University::new(id);
            option.name = Some(name.to_string());
            option.campus.setting = Some(setting);
            option.campus.accessible = setting != CampusSetting::Rural;
            option.fees.tuition = Some(Money {
                amount: tuition,
                currency: "GBP".to_string(),
            });
            option.offer.student_staff_ratio = Some(ratio);
            option.offer.accreditations =
                accreditations.iter().map(|body| body.to_string()).collect();
            if SELECTIVE.contains(&id) {
                option.admissions.requires_portfolio = true;
                option.admissions.english_min.ielts_overall = Some(7.0);
            }
            option
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_catalog_supports_a_full_session() {
        let engine = MatchingEngine::initialize(
            sample_student(),
            sample_catalog(),
            7,
            EngineConfig::default(),
        )
        .expect("sample catalog is valid");

        assert_eq!(engine.catalog().len(), 7);
        assert_eq!(engine.active_subset().len(), 3);
    }

    #[test]
    fn extremes_pick_best_and_worst() {
        let ids = vec![OptionId::from("a"), OptionId::from("b"), OptionId::from("c")];
        let scores = |id: &OptionId| match id.as_str() {
            "a" => Some(0.4),
            "b" => Some(0.9),
            _ => Some(0.1),
        };

        assert_eq!(
            extremes(&ids, scores),
            Some((OptionId::from("b"), OptionId::from("c")))
        );
        assert_eq!(extremes(&[], scores), None);
    }

    #[test]
    fn demo_runs_on_sample_catalog() {
        let args = DemoArgs {
            seed: 42,
            rounds: 2,
            universities: None,
            students: None,
            student: None,
        };

        run_demo(args).expect("demo completes");
    }
}
