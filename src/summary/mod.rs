use crate::provider::types::{EventResultRow, TrackStatusEntry};

/// Track-status messages counted as safety-car-type interruptions. Counting
/// only "ending" VSC signals undercounts periods that never reach an ending
/// message in the source feed; that is the defined counting rule, carried
/// as-is.
pub const SAFETY_CAR_MESSAGES: [&str; 2] = ["VSCEnding", "SCDeployed"];

/// One row per event in the prediction summary table. Podium slots are
/// optional: an event with fewer than 3 classified finishers keeps its row
/// with the missing slots empty.
#[derive(Debug, Clone, PartialEq)]
pub struct EventSummaryRow {
    pub season: u16,
    pub round: u32,
    pub circuit: String,
    pub pole: String,
    pub p1: Option<String>,
    pub p2: Option<String>,
    pub p3: Option<String>,
    pub fastest_lap: String,
    pub safety_cars: u32,
}

fn driver_at(rows: &[EventResultRow], finishing_pos: u32) -> Option<String> {
    rows.iter()
        .find(|r| r.finishing_pos == Some(finishing_pos))
        .map(|r| r.driver.clone())
}

/// Top-3 finishers, pivoted to one (p1, p2, p3) tuple. None when the event
/// has no classified finisher in positions 1-3 at all.
pub fn podium(rows: &[EventResultRow]) -> Option<(Option<String>, Option<String>, Option<String>)> {
    let p1 = driver_at(rows, 1);
    let p2 = driver_at(rows, 2);
    let p3 = driver_at(rows, 3);
    if p1.is_none() && p2.is_none() && p3.is_none() {
        None
    } else {
        Some((p1, p2, p3))
    }
}

pub fn pole_sitter(rows: &[EventResultRow]) -> Option<String> {
    rows.iter()
        .find(|r| r.qualifying_pos == 1)
        .map(|r| r.driver.clone())
}

pub fn fastest_lap_holder(rows: &[EventResultRow]) -> Option<String> {
    rows.iter().find(|r| r.fastest_lap).map(|r| r.driver.clone())
}

pub fn count_safety_cars(entries: &[TrackStatusEntry]) -> u32 {
    entries
        .iter()
        .filter(|e| SAFETY_CAR_MESSAGES.contains(&e.message.as_str()))
        .count() as u32
}

/// Merge the four derivations for one event. Returns None when any component
/// other than the safety-car count is missing (e.g. no recorded pole after a
/// cancelled qualifying session) - the event is dropped from the summary, not
/// silently patched. A safety-car count of 0 is present, not missing.
pub fn summarize_event(
    rows: &[EventResultRow],
    track_status: &[TrackStatusEntry],
) -> Option<EventSummaryRow> {
    let first = rows.first()?;
    let pole = pole_sitter(rows)?;
    let fastest_lap = fastest_lap_holder(rows)?;
    let (p1, p2, p3) = podium(rows)?;

    Some(EventSummaryRow {
        season: first.season,
        round: first.round,
        circuit: first.circuit.clone(),
        pole,
        p1,
        p2,
        p3,
        fastest_lap,
        safety_cars: count_safety_cars(track_status),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row(
        driver: &str,
        qualifying_pos: u32,
        finishing_pos: Option<u32>,
        fastest_lap: bool,
    ) -> EventResultRow {
        EventResultRow {
            season: 2023,
            round: 8,
            circuit: "Monaco".to_string(),
            driver: driver.to_string(),
            constructor: "team".to_string(),
            qualifying_pos,
            grid_pos: qualifying_pos,
            classified_pos: finishing_pos,
            finishing_pos,
            points: 0.0,
            fastest_lap,
            status: "Finished".to_string(),
        }
    }

    fn status(message: &str) -> TrackStatusEntry {
        TrackStatusEntry {
            message: message.to_string(),
            status: "4".to_string(),
        }
    }

    #[test]
    fn test_full_summary() {
        let rows = vec![
            sample_row("LEC", 1, Some(2), false),
            sample_row("VER", 2, Some(1), true),
            sample_row("ALO", 3, Some(3), false),
        ];
        let track = vec![status("SCDeployed"), status("AllClear")];
        let summary = summarize_event(&rows, &track).unwrap();

        assert_eq!(summary.pole, "LEC");
        assert_eq!(summary.p1.as_deref(), Some("VER"));
        assert_eq!(summary.p2.as_deref(), Some("LEC"));
        assert_eq!(summary.p3.as_deref(), Some("ALO"));
        assert_eq!(summary.fastest_lap, "VER");
        assert_eq!(summary.safety_cars, 1);
    }

    #[test]
    fn test_podium_with_two_finishers_keeps_row() {
        let rows = vec![
            sample_row("VER", 1, Some(1), true),
            sample_row("LEC", 2, Some(2), false),
            sample_row("ALO", 3, None, false),
        ];
        let summary = summarize_event(&rows, &[]).unwrap();
        assert_eq!(summary.p1.as_deref(), Some("VER"));
        assert_eq!(summary.p2.as_deref(), Some("LEC"));
        assert_eq!(summary.p3, None);
    }

    #[test]
    fn test_no_classified_finishers_drops_event() {
        let rows = vec![
            sample_row("VER", 1, None, true),
            sample_row("LEC", 2, None, false),
        ];
        assert!(summarize_event(&rows, &[]).is_none());
    }

    #[test]
    fn test_missing_pole_drops_event() {
        // Cancelled qualifying: no qualifying_pos == 1 row
        let rows = vec![
            sample_row("VER", 5, Some(1), true),
            sample_row("LEC", 6, Some(2), false),
        ];
        assert!(summarize_event(&rows, &[]).is_none());
    }

    #[test]
    fn test_missing_fastest_lap_drops_event() {
        let rows = vec![
            sample_row("VER", 1, Some(1), false),
            sample_row("LEC", 2, Some(2), false),
        ];
        assert!(summarize_event(&rows, &[]).is_none());
    }

    #[test]
    fn test_empty_event_drops() {
        assert!(summarize_event(&[], &[]).is_none());
    }

    #[test]
    fn test_safety_car_count_rule() {
        // ["VSCEnding", "SCDeployed", "VSCEnding"] counts all three entries
        let track = vec![
            status("VSCEnding"),
            status("SCDeployed"),
            status("VSCEnding"),
        ];
        assert_eq!(count_safety_cars(&track), 3);
    }

    #[test]
    fn test_safety_car_count_ignores_other_messages() {
        let track = vec![status("AllClear"), status("Yellow"), status("SCEnding")];
        assert_eq!(count_safety_cars(&track), 0);
    }

    #[test]
    fn test_zero_safety_cars_is_present_not_missing() {
        let rows = vec![
            sample_row("VER", 1, Some(1), true),
            sample_row("LEC", 2, Some(2), false),
            sample_row("ALO", 3, Some(3), false),
        ];
        let summary = summarize_event(&rows, &[]).unwrap();
        assert_eq!(summary.safety_cars, 0);
    }
}
