//! Tests for the majority voter.

use super::*;
use crate::label::RuleVote;

fn vocab3() -> LabelVocabulary {
    LabelVocabulary::new(["a", "b", "c"]).unwrap()
}

fn records(n: usize) -> Vec<Record> {
    (0..n).map(|i| Record::new(format!("rec-{i}"))).collect()
}

fn single_matrix(votes: &[Vec<RuleVote>], annotations: Vec<Option<usize>>) -> WeakLabelMatrix {
    let n = votes.len();
    WeakLabelMatrix::new(vocab3(), votes, annotations, records(n)).unwrap()
}

#[test]
fn test_policy_parsing() {
    assert_eq!(
        "abstain".parse::<TieBreakPolicy>().unwrap(),
        TieBreakPolicy::Abstain
    );
    assert_eq!(
        "random".parse::<TieBreakPolicy>().unwrap(),
        TieBreakPolicy::Random
    );
    assert_eq!(
        "true-random".parse::<TieBreakPolicy>().unwrap(),
        TieBreakPolicy::TrueRandom
    );

    let err = "coin-flip".parse::<TieBreakPolicy>().unwrap_err();
    assert!(matches!(err, EtiquetarError::InvalidTieBreakPolicy { .. }));
}

#[test]
fn test_policy_display_matches_wire_names() {
    assert_eq!(TieBreakPolicy::Abstain.to_string(), "abstain");
    assert_eq!(TieBreakPolicy::Random.to_string(), "random");
    assert_eq!(TieBreakPolicy::TrueRandom.to_string(), "true-random");
    assert_eq!(TieBreakPolicy::default(), TieBreakPolicy::Abstain);
}

#[test]
fn test_fit_is_unsupported() {
    let mut voter = MajorityVoter::new();
    let err = voter.fit().unwrap_err();
    assert!(matches!(err, EtiquetarError::UnsupportedOperation { .. }));
    assert!(err.to_string().contains("fit"));
}

#[test]
fn test_single_label_probabilities_majority() {
    // votes [a, a, b] -> probabilities [2/3, 1/3, 0]
    let wl = single_matrix(
        &[vec![
            RuleVote::Label(0),
            RuleVote::Label(0),
            RuleVote::Label(1),
        ]],
        vec![None],
    );
    let probs = single_label_probabilities(&wl, &[0]);

    assert!((probs[0][0] - 2.0 / 3.0).abs() < 1e-12);
    assert!((probs[0][1] - 1.0 / 3.0).abs() < 1e-12);
    assert!(probs[0][2].abs() < 1e-12);
    let sum: f64 = probs[0].iter().sum();
    assert!((sum - 1.0).abs() < 1e-8);
}

#[test]
fn test_single_label_probabilities_universal_abstention_is_uniform() {
    let wl = single_matrix(&[vec![RuleVote::Abstain; 3]], vec![None]);
    let probs = single_label_probabilities(&wl, &[0]);

    for &p in &probs[0] {
        assert!((p - 1.0 / 3.0).abs() < 1e-15);
    }
}

#[test]
fn test_tie_set_tolerance_boundary() {
    // below tolerance: tied
    assert_eq!(tie_set(&[0.5, 0.5 - 5e-9, 0.2]), vec![0, 1]);
    // above tolerance: not tied
    assert_eq!(tie_set(&[0.5, 0.5 - 1e-7, 0.2]), vec![0]);
    // exact ties across the whole row
    assert_eq!(tie_set(&[1.0 / 3.0; 3]), vec![0, 1, 2]);
}

#[test]
fn test_tie_break_index_is_deterministic_and_in_range() {
    for position in 0..50 {
        let first = tie_break_index(position, 3);
        let second = tie_break_index(position, 3);
        assert_eq!(first, second);
        assert!(first < 3);
    }
    // depends only on the position, trivially stable for size 1
    assert_eq!(tie_break_index(7, 1), 0);
}

#[test]
fn test_predict_untied_ordering() {
    let wl = single_matrix(
        &[vec![
            RuleVote::Label(0),
            RuleVote::Label(0),
            RuleVote::Label(1),
        ]],
        vec![None],
    );
    let voter = MajorityVoter::new();
    let out = voter
        .predict(&wl, false, false, "MajorityVoter", TieBreakPolicy::Abstain)
        .unwrap();

    assert_eq!(out.len(), 1);
    let prediction = out[0].prediction.as_ref().unwrap();
    assert_eq!(prediction.len(), 3);
    assert_eq!(prediction[0].0, "a");
    assert_eq!(prediction[1].0, "b");
    assert_eq!(prediction[2].0, "c");
    assert!((prediction[0].1 - 2.0 / 3.0).abs() < 1e-12);
    assert_eq!(out[0].prediction_agent.as_deref(), Some("MajorityVoter"));
}

#[test]
fn test_predict_tie_abstain_drops_or_keeps() {
    // all rules abstain -> uniform row -> 3-way tie
    let wl = single_matrix(&[vec![RuleVote::Abstain; 3]], vec![None]);
    let voter = MajorityVoter::new();

    let dropped = voter
        .predict(&wl, false, false, "MajorityVoter", TieBreakPolicy::Abstain)
        .unwrap();
    assert!(dropped.is_empty());

    let kept = voter
        .predict(&wl, false, true, "MajorityVoter", TieBreakPolicy::Abstain)
        .unwrap();
    assert_eq!(kept.len(), 1);
    assert!(kept[0].prediction.is_none());
    assert_eq!(kept[0].prediction_agent.as_deref(), Some("MajorityVoter"));
}

#[test]
fn test_predict_random_nudges_winner() {
    let wl = single_matrix(&[vec![RuleVote::Abstain; 3]], vec![None]);
    let voter = MajorityVoter::new();

    let out = voter
        .predict(&wl, false, false, "MajorityVoter", TieBreakPolicy::Random)
        .unwrap();
    assert_eq!(out.len(), 1);

    let prediction = out[0].prediction.as_ref().unwrap();
    // winner sits strictly above its rivals by the fixed increment
    assert!((prediction[0].1 - (1.0 / 3.0 + 1e-4)).abs() < 1e-12);
    assert!((prediction[1].1 - (1.0 / 3.0 - 5e-5)).abs() < 1e-12);
    assert!((prediction[2].1 - (1.0 / 3.0 - 5e-5)).abs() < 1e-12);
    // the nudge preserves the row sum
    let sum: f64 = prediction.iter().map(|(_, p)| p).sum();
    assert!((sum - 1.0).abs() < 1e-8);
}

#[test]
fn test_predict_random_is_reproducible() {
    let votes = vec![
        vec![RuleVote::Abstain; 3],
        vec![RuleVote::Label(0), RuleVote::Label(1), RuleVote::Abstain],
        vec![RuleVote::Label(2), RuleVote::Label(2), RuleVote::Label(0)],
    ];
    let wl = single_matrix(&votes, vec![None; 3]);
    let voter = MajorityVoter::new();

    let first = voter
        .predict(&wl, false, true, "MajorityVoter", TieBreakPolicy::Random)
        .unwrap();
    let second = voter
        .predict(&wl, false, true, "MajorityVoter", TieBreakPolicy::Random)
        .unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_true_random_is_rejected_even_without_ties() {
    let wl = single_matrix(&[vec![RuleVote::Label(0); 3]], vec![Some(0)]);
    let voter = MajorityVoter::new();

    let err = voter
        .predict(&wl, true, false, "MajorityVoter", TieBreakPolicy::TrueRandom)
        .unwrap_err();
    assert!(matches!(
        err,
        EtiquetarError::UnsupportedTieBreakPolicy { .. }
    ));

    let err = voter.score(&wl, TieBreakPolicy::TrueRandom).unwrap_err();
    assert!(matches!(
        err,
        EtiquetarError::UnsupportedTieBreakPolicy { .. }
    ));
}

#[test]
fn test_predict_never_mutates_input_records() {
    let wl = single_matrix(&[vec![RuleVote::Label(0); 2]], vec![None]);
    let voter = MajorityVoter::new();

    let out = voter
        .predict(&wl, false, false, "MajorityVoter", TieBreakPolicy::Abstain)
        .unwrap();
    assert!(out[0].prediction.is_some());
    // the caller-owned record is untouched
    assert!(wl.record(0).prediction.is_none());
    assert!(wl.record(0).prediction_agent.is_none());
}

#[test]
fn test_predict_skips_annotated_records_by_default() {
    let votes = vec![vec![RuleVote::Label(0); 2], vec![RuleVote::Label(1); 2]];
    let wl = single_matrix(&votes, vec![Some(0), None]);
    let voter = MajorityVoter::new();

    let out = voter
        .predict(&wl, false, false, "MajorityVoter", TieBreakPolicy::Abstain)
        .unwrap();
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].id, "rec-1");

    let all = voter
        .predict(&wl, true, false, "MajorityVoter", TieBreakPolicy::Abstain)
        .unwrap();
    assert_eq!(all.len(), 2);
}

#[test]
fn test_multi_label_probabilities_and_full_abstention() {
    let vocab = LabelVocabulary::new(["x", "y"]).unwrap();
    let votes = vec![
        // rule 0 votes x, rule 1 votes y
        vec![vec![1, 0], vec![0, 1]],
        // every rule abstains on every label
        vec![vec![-1, -1], vec![-1, -1]],
        // abstains mixed with a no-vote: not a full abstention
        vec![vec![-1, -1], vec![0, 0]],
    ];
    let wl = WeakMultiLabelMatrix::new(vocab, &votes, vec![None; 3], records(3)).unwrap();

    let probs = multi_label_probabilities(&wl, &[0, 1, 2]);
    assert_eq!(probs[0], vec![1.0, 1.0]);
    assert!(probs[1].iter().all(|p| p.is_nan()));
    assert_eq!(probs[2], vec![0.0, 0.0]);
}

#[test]
fn test_predict_multi_handles_abstentions() {
    let vocab = LabelVocabulary::new(["x", "y"]).unwrap();
    let votes = vec![
        vec![vec![1, 0], vec![0, 1]],
        vec![vec![-1, -1], vec![-1, -1]],
    ];
    let wl = WeakMultiLabelMatrix::new(vocab, &votes, vec![None; 2], records(2)).unwrap();
    let voter = MajorityVoter::new();

    let dropped = voter.predict_multi(&wl, false, false, "MajorityVoter");
    assert_eq!(dropped.len(), 1);
    let prediction = dropped[0].prediction.as_ref().unwrap();
    assert_eq!(prediction[0], ("x".to_string(), 1.0));
    assert_eq!(prediction[1], ("y".to_string(), 1.0));

    let kept = voter.predict_multi(&wl, false, true, "MajorityVoter");
    assert_eq!(kept.len(), 2);
    assert!(kept[1].prediction.is_none());
    assert_eq!(kept[1].prediction_agent.as_deref(), Some("MajorityVoter"));
}

#[test]
fn test_score_requires_annotations() {
    let wl = single_matrix(&[vec![RuleVote::Label(0); 2]], vec![None]);
    let voter = MajorityVoter::new();

    let err = voter.score(&wl, TieBreakPolicy::Abstain).unwrap_err();
    assert!(matches!(err, EtiquetarError::MissingAnnotations { .. }));
}

#[test]
fn test_score_abstain_filters_tied_rows_in_lockstep() {
    let votes = vec![
        vec![RuleVote::Label(0), RuleVote::Label(0)], // a, correct
        vec![RuleVote::Label(0), RuleVote::Label(1)], // tied, removed
        vec![RuleVote::Label(1), RuleVote::Label(1)], // b, wrong (ann a)
    ];
    let wl = single_matrix(&votes, vec![Some(0), Some(1), Some(0)]);
    let voter = MajorityVoter::new();

    let report = voter.score(&wl, TieBreakPolicy::Abstain).unwrap();
    // scored over rows 0 and 2 only
    assert!((report.accuracy - 0.5).abs() < 1e-12);
    assert_eq!(report.micro_avg.support, 2);
}

#[test]
fn test_score_all_tied_under_abstain_is_an_error() {
    let votes = vec![vec![RuleVote::Label(0), RuleVote::Label(1)]];
    let wl = single_matrix(&votes, vec![Some(0)]);
    let voter = MajorityVoter::new();

    let err = voter.score(&wl, TieBreakPolicy::Abstain).unwrap_err();
    assert!(matches!(err, EtiquetarError::MissingAnnotations { .. }));
}

#[test]
fn test_score_random_agrees_with_predict_on_tie_winner() {
    // one record, tie between a and b at position 0 in both paths
    let votes = vec![vec![RuleVote::Label(0), RuleVote::Label(1)]];
    let wl = single_matrix(&votes, vec![Some(0)]);
    let voter = MajorityVoter::new();

    let predicted = voter
        .predict(&wl, true, false, "MajorityVoter", TieBreakPolicy::Random)
        .unwrap();
    let winner = predicted[0].prediction.as_ref().unwrap()[0].0.clone();

    let report = voter.score(&wl, TieBreakPolicy::Random).unwrap();
    // annotation is "a": accuracy reveals the scored winner index
    let scored_winner_is_a = (report.accuracy - 1.0).abs() < 1e-12;
    assert_eq!(winner == "a", scored_winner_is_a);

    // and the winner is always a member of the tie set
    assert!(winner == "a" || winner == "b");
}

#[test]
fn test_score_random_is_reproducible() {
    let votes = vec![
        vec![RuleVote::Abstain, RuleVote::Abstain],
        vec![RuleVote::Label(0), RuleVote::Label(1)],
        vec![RuleVote::Label(2), RuleVote::Label(2)],
    ];
    let wl = single_matrix(&votes, vec![Some(0), Some(1), Some(2)]);
    let voter = MajorityVoter::new();

    let first = voter.score(&wl, TieBreakPolicy::Random).unwrap();
    let second = voter.score(&wl, TieBreakPolicy::Random).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_score_multi_thresholds_and_excludes_abstentions() {
    let vocab = LabelVocabulary::new(["x", "y"]).unwrap();
    let votes = vec![
        vec![vec![1, 0], vec![0, 1]],                 // predicts [1, 1]
        vec![vec![-1, -1], vec![-1, -1]],             // full abstention, excluded
        vec![vec![0, 1], vec![0, 0]],                 // predicts [0, 1]
    ];
    let annotations = vec![Some(vec![1, 1]), Some(vec![1, 0]), Some(vec![0, 1])];
    let wl = WeakMultiLabelMatrix::new(vocab, &votes, annotations, records(3)).unwrap();
    let voter = MajorityVoter::new();

    let report = voter
        .score_multi(&wl, DEFAULT_MULTI_LABEL_THRESHOLD)
        .unwrap();
    // both retained rows match exactly
    assert!((report.accuracy - 1.0).abs() < 1e-12);
    assert_eq!(report.labels.len(), 2);

    // a threshold above 1.0 turns every call negative
    let strict = voter.score_multi(&wl, 1.5).unwrap();
    assert!((strict.accuracy - 0.0).abs() < 1e-12);
}

#[test]
fn test_score_multi_requires_annotations() {
    let vocab = LabelVocabulary::new(["x", "y"]).unwrap();
    let votes = vec![vec![vec![1, 0]]];
    let wl = WeakMultiLabelMatrix::new(vocab, &votes, vec![None], records(1)).unwrap();
    let voter = MajorityVoter::new();

    let err = voter
        .score_multi(&wl, DEFAULT_MULTI_LABEL_THRESHOLD)
        .unwrap_err();
    assert!(matches!(err, EtiquetarError::MissingAnnotations { .. }));
}

#[test]
fn test_score_multi_all_abstained_is_an_error() {
    let vocab = LabelVocabulary::new(["x", "y"]).unwrap();
    let votes = vec![vec![vec![-1, -1], vec![-1, -1]]];
    let wl = WeakMultiLabelMatrix::new(vocab, &votes, vec![Some(vec![1, 0])], records(1)).unwrap();
    let voter = MajorityVoter::new();

    let err = voter
        .score_multi(&wl, DEFAULT_MULTI_LABEL_THRESHOLD)
        .unwrap_err();
    assert!(matches!(err, EtiquetarError::MissingAnnotations { .. }));
}
