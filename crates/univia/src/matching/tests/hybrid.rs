use super::common::*;
use crate::matching::{BlendConfig, HybridRanker, PreferenceConfig, PreferenceModel};

#[test]
fn alpha_steps_down_to_its_floor() {
    let mut ranker = HybridRanker::default();
    assert_close(ranker.alpha(), 0.65);

    assert_close(ranker.record_feedback(), 0.62);

    let mut previous = ranker.alpha();
    for _ in 0..20 {
        let next = ranker.record_feedback();
        assert!(next <= previous);
        previous = next;
    }
    assert_close(ranker.alpha(), 0.35);
    assert_eq!(ranker.feedback_events(), 21);
}

#[test]
fn collapsed_elo_range_maps_to_midpoint() {
    let ranker = HybridRanker::default();
    let model = PreferenceModel::seeded(PreferenceConfig::default(), [&id("a"), &id("b")]);

    let component = ranker.preference_component(&model, &id("a"));
    assert_close(component.elo, 0.5);
    assert_close(component.strength, 0.5);
    assert_close(component.combined, 0.5);
}

#[test]
fn elo_is_normalized_across_tracked_options() {
    let ranker = HybridRanker::default();
    let mut model = PreferenceModel::seeded(PreferenceConfig::default(), [&id("a"), &id("b")]);
    model.record_pairwise(&id("a"), &id("b"));

    let winner = ranker.preference_component(&model, &id("a"));
    let loser = ranker.preference_component(&model, &id("b"));
    assert!((winner.elo - 1.0).abs() < 1e-6);
    assert_close(loser.elo, 0.0);
    assert!(winner.strength > 0.5 && loser.strength < 0.5);
    assert!((0.0..=1.0).contains(&winner.combined));
}

#[test]
fn blend_follows_current_alpha() {
    let mut ranker = HybridRanker::new(BlendConfig::default());
    assert_close(ranker.blend(0.8, 0.2), 0.65 * 0.8 + 0.35 * 0.2);

    ranker.record_feedback();
    assert_close(ranker.blend(0.8, 0.2), 0.62 * 0.8 + 0.38 * 0.2);
}
