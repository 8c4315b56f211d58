pub mod engine;
pub mod status;

pub use engine::{score_event, ContractViolation, ScoredEntrantRow, PIT_LANE_GRID};
pub use status::is_finished_class;
