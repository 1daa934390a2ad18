//! Busy indicator frames.

pub const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Frame for the given tick; the runtime advances one tick every 80ms while loading.
pub fn spinner_frame(tick: usize) -> &'static str {
    SPINNER_FRAMES[tick % SPINNER_FRAMES.len()]
}

#[cfg(test)]
mod tests {
    use super::{spinner_frame, SPINNER_FRAMES};

    #[test]
    fn frames_cycle() {
        assert_eq!(spinner_frame(0), "⠋");
        assert_eq!(spinner_frame(SPINNER_FRAMES.len() + 1), "⠙");
    }
}
