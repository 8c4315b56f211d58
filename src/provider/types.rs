use serde::Deserialize;

/// One driver's outcome in one completed event, as published by the results
/// provider. `grid_pos == 0` means a pit-lane start; `finishing_pos` is None
/// for unclassified entrants.
#[derive(Debug, Clone, Deserialize)]
pub struct EventResultRow {
    pub season: u16,
    pub round: u32,
    pub circuit: String,
    pub driver: String,      // short code, e.g. "VER"
    pub constructor: String, // team id, shared by the two drivers of a team
    pub qualifying_pos: u32,
    pub grid_pos: u32,
    pub classified_pos: Option<u32>,
    pub finishing_pos: Option<u32>,
    pub points: f64,
    pub fastest_lap: bool,
    pub status: String,
}

impl EventResultRow {
    /// Short reference in the format "2023 R05 VER"
    pub fn short_ref(&self) -> String {
        format!("{} R{:02} {}", self.season, self.round, self.driver)
    }
}

/// One race-control track-status entry for an event.
#[derive(Debug, Clone, Deserialize)]
pub struct TrackStatusEntry {
    pub message: String,
    pub status: String,
}
