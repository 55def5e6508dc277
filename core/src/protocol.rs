use serde::{Deserialize, Serialize};

use crate::catalog::RawMeal;
use crate::score::Vote;

/// Envelope for the `getMeals` read.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct MealsResponse {
    pub ok: bool,
    pub meals: Vec<RawMeal>,
    pub error: Option<String>,
    pub message: Option<String>,
}

impl MealsResponse {
    pub fn failure_message(&self, fallback: &str) -> String {
        first_message(&self.error, &self.message, fallback)
    }
}

/// Envelope for the `status` read.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct StatusResponse {
    pub ok: bool,
    pub status: StatusSummary,
    pub error: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct StatusSummary {
    pub has_votes: bool,
    pub participants: u32,
}

/// Readable acknowledgement of `resetVotes`, when the backend supports it.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ResetAck {
    pub ok: bool,
}

/// Body of the opaque `submitVotes` write.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitVotes {
    pub user_id: String,
    pub display_name: String,
    pub votes: Vec<Vote>,
}

/// Aggregated results as computed by the backend. Parsing is permissive:
/// missing or mistyped fields collapse to empty values instead of failing.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResultsPayload {
    pub ok: bool,
    pub has_votes: bool,
    pub participants: Vec<Participant>,
    pub shared_ranking: Vec<RankingEntry>,
    pub solo_ranking: Vec<RankingEntry>,
    pub winners: Vec<RankingEntry>,
    pub error: Option<String>,
    pub message: Option<String>,
}

impl ResultsPayload {
    pub fn failure_message(&self, fallback: &str) -> String {
        first_message(&self.error, &self.message, fallback)
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Participant {
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub user_id: Option<String>,
}

impl Participant {
    /// Best available label: `name`, then `displayName`, then `userId`.
    pub fn label(&self) -> Option<&str> {
        [&self.name, &self.display_name, &self.user_id]
            .into_iter()
            .filter_map(|field| field.as_deref())
            .find(|value| !value.trim().is_empty())
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RankingEntry {
    pub meal: String,
    pub sum: f64,
    pub breakdown: Vec<BreakdownEntry>,
    pub is_shared: bool,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct BreakdownEntry {
    pub name: String,
    pub score: f64,
}

fn first_message(error: &Option<String>, message: &Option<String>, fallback: &str) -> String {
    error
        .as_deref()
        .or(message.as_deref())
        .filter(|value| !value.trim().is_empty())
        .unwrap_or(fallback)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn results_payload_tolerates_missing_fields() {
        let payload: ResultsPayload = serde_json::from_str(r#"{"ok": true}"#).expect("parses");
        assert!(payload.ok);
        assert!(!payload.has_votes);
        assert!(payload.participants.is_empty());
        assert!(payload.shared_ranking.is_empty());
        assert!(payload.winners.is_empty());
    }

    #[test]
    fn participant_label_falls_through() {
        let participant: Participant =
            serde_json::from_str(r#"{"displayName": "Agus", "userId": "u_1"}"#).expect("parses");
        assert_eq!(participant.label(), Some("Agus"));

        let bare: Participant = serde_json::from_str(r#"{"userId": "u_2"}"#).expect("parses");
        assert_eq!(bare.label(), Some("u_2"));

        let empty: Participant = serde_json::from_str(r#"{"name": "  "}"#).expect("parses");
        assert_eq!(empty.label(), None);
    }

    #[test]
    fn failure_message_prefers_error_over_message() {
        let response: MealsResponse =
            serde_json::from_str(r#"{"ok": false, "error": "sheet missing", "message": "later"}"#)
                .expect("parses");
        assert_eq!(response.failure_message("getMeals failed"), "sheet missing");

        let silent: MealsResponse = serde_json::from_str(r#"{"ok": false}"#).expect("parses");
        assert_eq!(silent.failure_message("getMeals failed"), "getMeals failed");
    }

    #[test]
    fn submit_votes_serializes_camel_case() {
        let body = SubmitVotes {
            user_id: "u_abc_1".to_string(),
            display_name: "Mauri".to_string(),
            votes: vec![Vote {
                meal: "Pizza".to_string(),
                score: 8.5,
            }],
        };
        let raw = serde_json::to_string(&body).expect("serializes");
        assert!(raw.contains(r#""userId":"u_abc_1""#));
        assert!(raw.contains(r#""displayName":"Mauri""#));
        assert!(raw.contains(r#""meal":"Pizza""#));
    }
}
