use crate::protocol::{BreakdownEntry, RankingEntry, ResultsPayload};

/// Voter/score pairs shown inline on a ranking row before truncating.
pub const LIST_BREAKDOWN_LIMIT: usize = 2;
/// Same, for the large winner card.
pub const WINNER_BREAKDOWN_LIMIT: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MedalTier {
    Gold,
    Silver,
    Bronze,
    Plain,
}

impl MedalTier {
    pub fn for_rank(rank: usize) -> Self {
        match rank {
            1 => Self::Gold,
            2 => Self::Silver,
            3 => Self::Bronze,
            _ => Self::Plain,
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            Self::Gold => "gold",
            Self::Silver => "silver",
            Self::Bronze => "bronze",
            Self::Plain => "",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RankedRow {
    pub rank: usize,
    pub meal: String,
    pub sum_label: String,
    pub breakdown_label: String,
    pub tier: MedalTier,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WinnerCard {
    pub title: &'static str,
    /// Winning meal names joined with " / " on a tie.
    pub names: String,
    pub sum_label: String,
    pub breakdown_label: String,
}

/// Display-ready results: winner card, shared ranking, solo ranking.
#[derive(Clone, Debug, PartialEq)]
pub struct ResultsView {
    pub has_votes: bool,
    pub participants_label: String,
    pub mode_label: &'static str,
    pub winner: Option<WinnerCard>,
    pub shared: Vec<RankedRow>,
    pub solo: Vec<RankedRow>,
}

/// Prints a score without trailing zeros (8, 8.5, 7.25).
pub fn fmt_score(value: f64) -> String {
    let text = format!("{value:.2}");
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Compacts a per-voter breakdown to at most `limit` pairs, appending
/// " · +K" when entries were dropped. Empty breakdowns yield an empty label.
pub fn compact_breakdown(entries: &[BreakdownEntry], limit: usize) -> String {
    if entries.is_empty() {
        return String::new();
    }
    let mut label = entries
        .iter()
        .take(limit)
        .map(|entry| format!("{} {}", entry.name, fmt_score(entry.score)))
        .collect::<Vec<_>>()
        .join(" · ");
    let rest = entries.len().saturating_sub(limit);
    if rest > 0 {
        label.push_str(&format!(" · +{rest}"));
    }
    label
}

/// Competition ranking over a list assumed sorted by descending sum. A sum
/// equal to its predecessor shares the predecessor's rank; the next distinct
/// sum takes its raw 1-based position, so [10, 10, 7] ranks as [1, 1, 3].
/// Deliberately not the skip-rank convention; this mirrors what voters see
/// in the sheet.
pub fn assign_ranks(entries: &[RankingEntry]) -> Vec<RankedRow> {
    let mut rows = Vec::with_capacity(entries.len());
    let mut prev_sum: Option<f64> = None;
    let mut rank = 0usize;
    for (idx, entry) in entries.iter().enumerate() {
        let position = idx + 1;
        if prev_sum.map_or(true, |prev| prev != entry.sum) {
            rank = position;
        }
        prev_sum = Some(entry.sum);
        rows.push(RankedRow {
            rank,
            meal: entry.meal.clone(),
            sum_label: fmt_score(entry.sum),
            breakdown_label: compact_breakdown(&entry.breakdown, LIST_BREAKDOWN_LIMIT),
            tier: MedalTier::for_rank(rank),
        });
    }
    rows
}

/// Winners straight from the payload when present; otherwise every entry
/// tied for the maximum sum in the shared pool, falling back to the solo
/// pool when no meal was voted by more than one person.
pub fn derive_winners(payload: &ResultsPayload) -> Vec<RankingEntry> {
    if !payload.winners.is_empty() {
        return payload.winners.clone();
    }
    let pool = if payload.shared_ranking.is_empty() {
        &payload.solo_ranking
    } else {
        &payload.shared_ranking
    };
    if pool.is_empty() {
        return Vec::new();
    }
    let best = pool.iter().map(|entry| entry.sum).fold(f64::NEG_INFINITY, f64::max);
    pool.iter().filter(|entry| entry.sum == best).cloned().collect()
}

pub fn build_results_view(payload: &ResultsPayload) -> ResultsView {
    let participants_label = if payload.participants.is_empty() {
        "—".to_string()
    } else {
        payload
            .participants
            .iter()
            .map(|participant| participant.label().unwrap_or("—"))
            .collect::<Vec<_>>()
            .join(", ")
    };
    let mode_label = if payload.shared_ranking.is_empty() {
        "No shared picks"
    } else {
        "Shared pick wins"
    };

    let winners = derive_winners(payload);
    let winner = winners.first().map(|first| WinnerCard {
        title: if winners.len() > 1 { "Winners (tie)" } else { "Winner" },
        names: winners
            .iter()
            .map(|entry| entry.meal.as_str())
            .collect::<Vec<_>>()
            .join(" / "),
        sum_label: fmt_score(first.sum),
        breakdown_label: compact_breakdown(&first.breakdown, WINNER_BREAKDOWN_LIMIT),
    });

    ResultsView {
        has_votes: payload.has_votes,
        participants_label,
        mode_label,
        winner,
        shared: assign_ranks(&payload.shared_ranking),
        solo: assign_ranks(&payload.solo_ranking),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(meal: &str, sum: f64) -> RankingEntry {
        RankingEntry {
            meal: meal.to_string(),
            sum,
            ..RankingEntry::default()
        }
    }

    #[test]
    fn fmt_score_trims_trailing_zeros() {
        assert_eq!(fmt_score(8.0), "8");
        assert_eq!(fmt_score(8.5), "8.5");
        assert_eq!(fmt_score(7.25), "7.25");
        assert_eq!(fmt_score(0.0), "0");
    }

    #[test]
    fn ties_share_rank_and_reuse_position_after() {
        let rows = assign_ranks(&[entry("A", 10.0), entry("B", 10.0), entry("C", 7.0)]);
        let ranks: Vec<usize> = rows.iter().map(|row| row.rank).collect();
        assert_eq!(ranks, vec![1, 1, 3]);
        assert_eq!(rows[0].tier, MedalTier::Gold);
        assert_eq!(rows[1].tier, MedalTier::Gold);
        assert_eq!(rows[2].tier, MedalTier::Bronze);
    }

    #[test]
    fn breakdown_truncates_with_suffix() {
        let breakdown = vec![
            BreakdownEntry {
                name: "Mauri".to_string(),
                score: 8.0,
            },
            BreakdownEntry {
                name: "Agus".to_string(),
                score: 10.0,
            },
            BreakdownEntry {
                name: "Flor".to_string(),
                score: 7.5,
            },
        ];
        assert_eq!(
            compact_breakdown(&breakdown, 2),
            "Mauri 8 · Agus 10 · +1"
        );
        assert_eq!(
            compact_breakdown(&breakdown, 3),
            "Mauri 8 · Agus 10 · Flor 7.5"
        );
        assert_eq!(compact_breakdown(&[], 2), "");
    }
}
