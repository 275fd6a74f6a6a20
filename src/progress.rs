/// Percentage added on every tick of the cosmetic progress bar
pub const PROGRESS_STEP: u8 = 10;
/// Progress never goes past this value
pub const PROGRESS_CEILING: u8 = 100;

/// Next value of the cosmetic progress counter, `None` once the ceiling has been reached and ticking should stop.
pub fn advance_progress(current: u8) -> Option<u8> {
    if current >= PROGRESS_CEILING {
        return None;
    }
    Some(current.saturating_add(PROGRESS_STEP).min(PROGRESS_CEILING))
}
