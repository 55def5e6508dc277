pub mod catalog;
pub mod protocol;
pub mod results;
pub mod score;

pub use catalog::{group_catalog, load_catalog, split_columns, CatalogSection, MealCategory, MealItem, RawMeal};
pub use protocol::{MealsResponse, ResetAck, ResultsPayload, StatusResponse, StatusSummary, SubmitVotes};
pub use results::{build_results_view, fmt_score, MedalTier, RankedRow, ResultsView, WinnerCard};
pub use score::{parse_score, PodiumEntry, ScoreError, SelectionState, Vote, DEFAULT_SCORE};
