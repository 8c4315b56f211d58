use std::collections::HashMap;

use anyhow::Result;

use super::status::is_finished_class;
use crate::provider::types::EventResultRow;

/// Upstream data violated the ingestion contract; the event cannot be
/// scored. Callers can downcast to tell this apart from fetch failures.
#[derive(Debug)]
pub struct ContractViolation(pub String);

impl std::fmt::Display for ContractViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ContractViolation {}

/// Grid position used for scoring when an entrant starts from the pit lane
/// (`grid_pos == 0`). The raw field is never rewritten.
pub const PIT_LANE_GRID: u32 = 20;

/// An EventResultRow augmented with the derived scoring signals and the
/// driver/constructor fantasy-point totals.
#[derive(Debug, Clone)]
pub struct ScoredEntrantRow {
    pub result: EventResultRow,
    pub positions_gained: u32,
    pub has_pole: bool,
    pub beat_teammate_quali: bool,
    pub beat_teammate_race: bool,
    pub driver_fp: f64,
    pub constructor_fp: f64, // identical for both drivers of a constructor
}

impl ScoredEntrantRow {
    /// Sort rank within an event: classified position, unclassified last
    pub fn race_rank(&self) -> u32 {
        race_rank(&self.result)
    }
}

fn normalized_grid(row: &EventResultRow) -> u32 {
    if row.grid_pos == 0 {
        PIT_LANE_GRID
    } else {
        row.grid_pos
    }
}

/// Positions gained from grid to flag. Losing positions scores zero, never
/// negative; unclassified entrants gain nothing.
pub fn positions_gained(row: &EventResultRow) -> u32 {
    match row.finishing_pos {
        Some(finish) => normalized_grid(row).saturating_sub(finish),
        None => 0,
    }
}

fn race_rank(row: &EventResultRow) -> u32 {
    row.finishing_pos.unwrap_or(u32::MAX)
}

/// Score one event: exactly the rows belonging to one (season, round).
///
/// Teammate comparisons are keyed by constructor, pairwise, with no reliance
/// on row order. A constructor represented by a single row gets no teammate
/// credit and falls back to the one-driver bonus tier. Duplicate qualifying
/// positions within a constructor violate the ingestion contract and fail
/// loudly rather than silently picking an order.
///
/// Output preserves the input row order.
pub fn score_event(rows: &[EventResultRow]) -> Result<Vec<ScoredEntrantRow>> {
    let mut by_constructor: HashMap<&str, Vec<usize>> = HashMap::new();
    for (i, row) in rows.iter().enumerate() {
        by_constructor
            .entry(row.constructor.as_str())
            .or_default()
            .push(i);
    }

    // Constructor totals first: official points over the whole pair,
    // positions gained over finished entrants only, plus the finish bonus.
    let mut constructor_fp: HashMap<&str, f64> = HashMap::new();
    for (team, members) in &by_constructor {
        let pair: Vec<&EventResultRow> = members.iter().map(|&i| &rows[i]).collect();
        let finished: Vec<&&EventResultRow> = pair
            .iter()
            .filter(|r| is_finished_class(&r.status))
            .collect();

        let finish_bonus = match finished.len() {
            0 => 0.0,
            1 => 2.0,
            _ => 5.0,
        };
        let points: f64 = pair.iter().map(|r| r.points).sum();
        let gained: u32 = finished.iter().map(|r| positions_gained(r)).sum();

        constructor_fp.insert(*team, points + f64::from(gained) + finish_bonus);
    }

    let mut scored = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let teammates: Vec<&EventResultRow> = by_constructor[row.constructor.as_str()]
            .iter()
            .filter(|&&j| j != i)
            .map(|&j| &rows[j])
            .collect();

        let mut beat_teammate_quali = !teammates.is_empty();
        for teammate in &teammates {
            if teammate.qualifying_pos == row.qualifying_pos {
                return Err(ContractViolation(format!(
                    "duplicate qualifying position {} within {} at {} round {} ({} vs {})",
                    row.qualifying_pos,
                    row.constructor,
                    row.season,
                    row.round,
                    row.driver,
                    teammate.driver
                ))
                .into());
            }
            if teammate.qualifying_pos < row.qualifying_pos {
                beat_teammate_quali = false;
            }
        }

        // A retired entrant is never credited with beating a teammate, even
        // if classified ahead on countback.
        let finished = is_finished_class(&row.status);
        let own_rank = race_rank(row);
        let beat_teammate_race = finished
            && !teammates.is_empty()
            && teammates.iter().all(|t| own_rank < race_rank(t));

        let gained = positions_gained(row);
        let has_pole = row.qualifying_pos == 1;

        let quali_component =
            f64::from(has_pole as u32 * 10 + beat_teammate_quali as u32 * 5);
        let race_component =
            row.points + f64::from(gained * 2) + f64::from(beat_teammate_race as u32 * 5);

        // The quali component is always awarded; only the race component is
        // zeroed for non-finishers.
        let driver_fp = quali_component + if finished { race_component } else { 0.0 };

        scored.push(ScoredEntrantRow {
            result: row.clone(),
            positions_gained: gained,
            has_pole,
            beat_teammate_quali,
            beat_teammate_race,
            driver_fp,
            constructor_fp: constructor_fp[row.constructor.as_str()],
        });
    }

    Ok(scored)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row(
        driver: &str,
        constructor: &str,
        qualifying_pos: u32,
        grid_pos: u32,
        finishing_pos: Option<u32>,
        points: f64,
        status: &str,
    ) -> EventResultRow {
        EventResultRow {
            season: 2023,
            round: 5,
            circuit: "Miami".to_string(),
            driver: driver.to_string(),
            constructor: constructor.to_string(),
            qualifying_pos,
            grid_pos,
            classified_pos: finishing_pos,
            finishing_pos,
            points,
            fastest_lap: false,
            status: status.to_string(),
        }
    }

    fn find<'a>(scored: &'a [ScoredEntrantRow], driver: &str) -> &'a ScoredEntrantRow {
        scored
            .iter()
            .find(|s| s.result.driver == driver)
            .expect("driver not in scored rows")
    }

    #[test]
    fn test_pit_lane_start_scored_as_twenty() {
        // Worked example: grid 0, P5, Finished, 10 pts, quali 3 vs 7
        let rows = vec![
            sample_row("AAA", "team", 3, 0, Some(5), 10.0, "Finished"),
            sample_row("BBB", "team", 7, 7, Some(9), 2.0, "Finished"),
        ];
        let scored = score_event(&rows).unwrap();
        let a = find(&scored, "AAA");

        assert_eq!(a.positions_gained, 15); // 20 - 5
        assert!(!a.has_pole);
        assert!(a.beat_teammate_quali);
        assert!(a.beat_teammate_race);
        // quali = 5, race = 10 + 15*2 + 5 = 45
        assert_eq!(a.driver_fp, 50.0);
        // Raw grid field is unchanged for display
        assert_eq!(a.result.grid_pos, 0);
    }

    #[test]
    fn test_positions_gained_never_negative() {
        let rows = vec![
            sample_row("AAA", "team", 1, 1, Some(10), 1.0, "Finished"),
            sample_row("BBB", "team", 2, 2, Some(2), 18.0, "Finished"),
        ];
        let scored = score_event(&rows).unwrap();
        assert_eq!(find(&scored, "AAA").positions_gained, 0); // lost 9 places
        assert_eq!(find(&scored, "BBB").positions_gained, 0); // finished where started
    }

    #[test]
    fn test_quali_component_invariant_to_status() {
        let finished = vec![
            sample_row("AAA", "team", 1, 1, Some(3), 15.0, "Finished"),
            sample_row("BBB", "team", 4, 4, Some(6), 8.0, "Finished"),
        ];
        let retired = vec![
            sample_row("AAA", "team", 1, 1, None, 0.0, "Engine"),
            sample_row("BBB", "team", 4, 4, Some(6), 8.0, "Finished"),
        ];
        let a_finished = score_event(&finished).unwrap();
        let a_retired = score_event(&retired).unwrap();

        // Pole + teammate quali win = 15, awarded either way
        let fin = find(&a_finished, "AAA");
        let ret = find(&a_retired, "AAA");
        assert!(fin.has_pole && ret.has_pole);
        assert!(fin.beat_teammate_quali && ret.beat_teammate_quali);
        assert_eq!(ret.driver_fp, 15.0); // race component zeroed
        assert!(fin.driver_fp > 15.0);
    }

    #[test]
    fn test_race_component_zeroed_for_plus_three_laps() {
        // "+3 Laps" is classified but outside the finished set
        let rows = vec![
            sample_row("AAA", "team", 5, 5, Some(12), 0.0, "+3 Laps"),
            sample_row("BBB", "team", 6, 6, Some(13), 0.0, "+2 Laps"),
        ];
        let scored = score_event(&rows).unwrap();
        let a = find(&scored, "AAA");
        assert_eq!(a.driver_fp, 5.0); // quali win only, gained positions discarded
    }

    #[test]
    fn test_beat_teammate_race_requires_finished_status() {
        // AAA classified ahead on countback but retired
        let rows = vec![
            sample_row("AAA", "team", 1, 1, Some(8), 0.0, "Gearbox"),
            sample_row("BBB", "team", 2, 2, Some(10), 1.0, "Finished"),
        ];
        let scored = score_event(&rows).unwrap();
        assert!(!find(&scored, "AAA").beat_teammate_race);
        // BBB finished behind on classification, so no credit either
        assert!(!find(&scored, "BBB").beat_teammate_race);
    }

    #[test]
    fn test_finisher_beats_unclassified_teammate() {
        let rows = vec![
            sample_row("AAA", "team", 3, 3, Some(7), 6.0, "Finished"),
            sample_row("BBB", "team", 5, 5, None, 0.0, "Collision"),
        ];
        let scored = score_event(&rows).unwrap();
        assert!(find(&scored, "AAA").beat_teammate_race);
        assert!(!find(&scored, "BBB").beat_teammate_race);
    }

    #[test]
    fn test_constructor_fp_identical_on_both_rows() {
        let rows = vec![
            sample_row("AAA", "team", 1, 1, Some(1), 25.0, "Finished"),
            sample_row("BBB", "team", 3, 3, Some(4), 12.0, "Finished"),
            sample_row("CCC", "other", 2, 2, Some(2), 18.0, "Finished"),
            sample_row("DDD", "other", 4, 4, None, 0.0, "Hydraulics"),
        ];
        let scored = score_event(&rows).unwrap();
        assert_eq!(
            find(&scored, "AAA").constructor_fp,
            find(&scored, "BBB").constructor_fp
        );
        assert_eq!(
            find(&scored, "CCC").constructor_fp,
            find(&scored, "DDD").constructor_fp
        );
    }

    #[test]
    fn test_constructor_bonus_both_finished() {
        let rows = vec![
            sample_row("AAA", "team", 1, 1, Some(1), 25.0, "Finished"),
            sample_row("BBB", "team", 3, 3, Some(2), 18.0, "+1 Lap"),
        ];
        let scored = score_event(&rows).unwrap();
        // points 43 + gained (0 + 1) + bonus 5
        assert_eq!(find(&scored, "AAA").constructor_fp, 49.0);
    }

    #[test]
    fn test_constructor_bonus_one_finished() {
        // Worked example: statuses Finished/Retired, points 8 + 0,
        // gained over finished entrants = 3 -> 8 + 3 + 2 = 13
        let rows = vec![
            sample_row("AAA", "team", 5, 9, Some(6), 8.0, "Finished"),
            sample_row("BBB", "team", 8, 8, None, 0.0, "Retired"),
        ];
        let scored = score_event(&rows).unwrap();
        assert_eq!(find(&scored, "AAA").constructor_fp, 13.0);
    }

    #[test]
    fn test_constructor_bonus_zero_finished() {
        let rows = vec![
            sample_row("AAA", "team", 5, 5, None, 0.0, "Engine"),
            sample_row("BBB", "team", 8, 8, None, 0.0, "Collision"),
        ];
        let scored = score_event(&rows).unwrap();
        assert_eq!(find(&scored, "AAA").constructor_fp, 0.0);
    }

    #[test]
    fn test_retired_but_scoring_constructor_points() {
        // A non-finisher's official points still count toward the pair sum,
        // but its gained positions do not.
        let rows = vec![
            sample_row("AAA", "team", 2, 10, Some(5), 10.0, "+3 Laps"),
            sample_row("BBB", "team", 3, 3, Some(6), 8.0, "Finished"),
        ];
        let scored = score_event(&rows).unwrap();
        // points 18 + gained (finished only: 0 for BBB) + bonus 2
        assert_eq!(find(&scored, "AAA").constructor_fp, 20.0);
    }

    #[test]
    fn test_lone_entrant_constructor() {
        let rows = vec![
            sample_row("AAA", "solo", 4, 4, Some(3), 15.0, "Finished"),
            sample_row("BBB", "team", 1, 1, Some(1), 25.0, "Finished"),
            sample_row("CCC", "team", 2, 2, Some(2), 18.0, "Finished"),
        ];
        let scored = score_event(&rows).unwrap();
        let a = find(&scored, "AAA");
        // No teammate: no comparison possible
        assert!(!a.beat_teammate_quali);
        assert!(!a.beat_teammate_race);
        // One-driver bonus tier: 15 + 1 gained + 2
        assert_eq!(a.constructor_fp, 18.0);
    }

    #[test]
    fn test_empty_event() {
        let scored = score_event(&[]).unwrap();
        assert!(scored.is_empty());
    }

    #[test]
    fn test_duplicate_teammate_quali_fails_loudly() {
        let rows = vec![
            sample_row("AAA", "team", 4, 4, Some(3), 15.0, "Finished"),
            sample_row("BBB", "team", 4, 5, Some(6), 8.0, "Finished"),
        ];
        let err = score_event(&rows).unwrap_err();
        assert!(err.to_string().contains("duplicate qualifying position"));
        // The error is typed so callers can report it as bad upstream data
        // rather than a fetch failure
        assert!(err.downcast_ref::<ContractViolation>().is_some());
    }

    #[test]
    fn test_pole_scores_ten() {
        let rows = vec![
            sample_row("AAA", "team", 1, 1, Some(4), 12.0, "Finished"),
            sample_row("BBB", "team", 2, 2, Some(5), 10.0, "Finished"),
        ];
        let scored = score_event(&rows).unwrap();
        let a = find(&scored, "AAA");
        assert!(a.has_pole);
        // quali 10 + 5, race 12 + 0 + 5
        assert_eq!(a.driver_fp, 32.0);
    }

    #[test]
    fn test_output_preserves_input_order() {
        let rows = vec![
            sample_row("ZZZ", "team", 2, 2, Some(2), 18.0, "Finished"),
            sample_row("AAA", "team", 1, 1, Some(1), 25.0, "Finished"),
        ];
        let scored = score_event(&rows).unwrap();
        assert_eq!(scored[0].result.driver, "ZZZ");
        assert_eq!(scored[1].result.driver, "AAA");
    }
}
