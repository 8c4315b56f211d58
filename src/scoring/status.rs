/// Status values counted as "completed the race" for scoring purposes.
/// Entrants one or two laps down are classified finishers; anything else
/// (retirements, DSQ, three or more laps down) is not.
pub const FINISHED_STATUSES: [&str; 3] = ["Finished", "+1 Lap", "+2 Laps"];

pub fn is_finished_class(status: &str) -> bool {
    FINISHED_STATUSES.contains(&status)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finished_statuses() {
        assert!(is_finished_class("Finished"));
        assert!(is_finished_class("+1 Lap"));
        assert!(is_finished_class("+2 Laps"));
    }

    #[test]
    fn test_non_finished_statuses() {
        assert!(!is_finished_class("+3 Laps"));
        assert!(!is_finished_class("Engine"));
        assert!(!is_finished_class("Collision"));
        assert!(!is_finished_class("Disqualified"));
        assert!(!is_finished_class(""));
    }

    #[test]
    fn test_status_is_case_sensitive() {
        // Provider statuses are exact strings; no normalization is applied
        assert!(!is_finished_class("finished"));
    }
}
