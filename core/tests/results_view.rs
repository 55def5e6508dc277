use morfi_core::build_results_view;
use morfi_core::protocol::ResultsPayload;

fn payload(raw: &str) -> ResultsPayload {
    serde_json::from_str(raw).expect("payload parses")
}

#[test]
fn winner_fallback_collects_ties_from_shared_pool() {
    let view = build_results_view(&payload(
        r#"{
            "ok": true,
            "hasVotes": true,
            "sharedRanking": [
                {"meal": "A", "sum": 10},
                {"meal": "B", "sum": 10},
                {"meal": "C", "sum": 5}
            ],
            "soloRanking": [{"meal": "Z", "sum": 20}],
            "winners": []
        }"#,
    ));
    let winner = view.winner.expect("winner derived");
    assert_eq!(winner.title, "Winners (tie)");
    assert_eq!(winner.names, "A / B");
    assert_eq!(winner.sum_label, "10");
    assert_eq!(view.mode_label, "Shared pick wins");
}

#[test]
fn winner_fallback_uses_solo_pool_when_no_shared_entries() {
    let view = build_results_view(&payload(
        r#"{
            "ok": true,
            "hasVotes": true,
            "soloRanking": [
                {"meal": "Ramen", "sum": 9.5},
                {"meal": "Tacos", "sum": 7}
            ]
        }"#,
    ));
    let winner = view.winner.expect("winner derived");
    assert_eq!(winner.title, "Winner");
    assert_eq!(winner.names, "Ramen");
    assert_eq!(view.mode_label, "No shared picks");
}

#[test]
fn payload_winners_take_precedence_over_fallback() {
    let view = build_results_view(&payload(
        r#"{
            "ok": true,
            "hasVotes": true,
            "sharedRanking": [
                {"meal": "A", "sum": 10},
                {"meal": "B", "sum": 8}
            ],
            "winners": [{"meal": "B", "sum": 8}]
        }"#,
    ));
    assert_eq!(view.winner.expect("winner kept").names, "B");
}

#[test]
fn ranking_rows_carry_ties_and_breakdowns() {
    let view = build_results_view(&payload(
        r#"{
            "ok": true,
            "hasVotes": true,
            "sharedRanking": [
                {"meal": "Pizza", "sum": 18, "breakdown": [
                    {"name": "Mauri", "score": 8},
                    {"name": "Agus", "score": 10},
                    {"name": "Flor", "score": 9}
                ]},
                {"meal": "Sushi", "sum": 18},
                {"meal": "Tacos", "sum": 12}
            ]
        }"#,
    ));
    let ranks: Vec<usize> = view.shared.iter().map(|row| row.rank).collect();
    assert_eq!(ranks, vec![1, 1, 3]);
    assert_eq!(view.shared[0].breakdown_label, "Mauri 8 · Agus 10 · +1");
    assert_eq!(view.shared[1].breakdown_label, "");
    assert_eq!(view.shared[2].sum_label, "12");
}

#[test]
fn participants_join_best_available_labels() {
    let view = build_results_view(&payload(
        r#"{
            "ok": true,
            "hasVotes": true,
            "participants": [
                {"name": "Mauri"},
                {"displayName": "Agus"},
                {"userId": "u_3"}
            ]
        }"#,
    ));
    assert_eq!(view.participants_label, "Mauri, Agus, u_3");
}

#[test]
fn empty_payload_builds_an_empty_view() {
    let view = build_results_view(&payload(r#"{"ok": true}"#));
    assert!(!view.has_votes);
    assert_eq!(view.participants_label, "—");
    assert!(view.winner.is_none());
    assert!(view.shared.is_empty());
    assert!(view.solo.is_empty());
}
