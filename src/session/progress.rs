//! Heuristic progress for the busy states.
//!
//! Progress is derived from how long the session has been in its current
//! phase. It only moves forward and never claims completion before the
//! result arrives.

use std::time::Duration;

use super::SessionStatus;

/// Points gained per upload tick.
pub const UPLOAD_STEP: u32 = 5;
/// Length of one upload tick.
pub const UPLOAD_TICK: Duration = Duration::from_millis(100);
/// Upload progress never passes this value.
pub const UPLOAD_CAP: u8 = 95;

/// Points gained per analysis tick.
pub const ANALYZE_STEP: u32 = 2;
/// Length of one analysis tick.
pub const ANALYZE_TICK: Duration = Duration::from_millis(300);
/// Analysis progress never passes this value.
pub const ANALYZE_CAP: u8 = 90;

/// Progress percentage for a status after `elapsed` time in it.
pub fn estimate(status: &SessionStatus, elapsed: Duration) -> u8 {
    match status {
        SessionStatus::Idle | SessionStatus::Error(_) => 0,
        SessionStatus::Uploading => climb(elapsed, UPLOAD_STEP, UPLOAD_TICK, UPLOAD_CAP),
        SessionStatus::Analyzing => climb(elapsed, ANALYZE_STEP, ANALYZE_TICK, ANALYZE_CAP),
        SessionStatus::Ready => 100,
    }
}

fn climb(elapsed: Duration, step: u32, tick: Duration, cap: u8) -> u8 {
    let ticks = elapsed.as_millis() / tick.as_millis();
    let value = ticks.saturating_mul(step as u128);
    value.min(cap as u128) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_climb() {
        let s = SessionStatus::Uploading;
        assert_eq!(estimate(&s, Duration::ZERO), 0);
        assert_eq!(estimate(&s, Duration::from_millis(99)), 0);
        assert_eq!(estimate(&s, Duration::from_millis(100)), 5);
        assert_eq!(estimate(&s, Duration::from_millis(1050)), 50);
        assert_eq!(estimate(&s, Duration::from_secs(60)), UPLOAD_CAP);
    }

    #[test]
    fn test_analyze_climb() {
        let s = SessionStatus::Analyzing;
        assert_eq!(estimate(&s, Duration::from_millis(300)), 2);
        assert_eq!(estimate(&s, Duration::from_millis(3000)), 20);
        assert_eq!(estimate(&s, Duration::from_secs(3600)), ANALYZE_CAP);
    }

    #[test]
    fn test_terminal_states() {
        assert_eq!(estimate(&SessionStatus::Ready, Duration::ZERO), 100);
        assert_eq!(estimate(&SessionStatus::Idle, Duration::from_secs(5)), 0);
        assert_eq!(
            estimate(&SessionStatus::Error("x".into()), Duration::from_secs(5)),
            0
        );
    }
}
