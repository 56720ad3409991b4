//! Keyword-based progress mapping.
//!
//! The external tool prints unstructured text; a fixed table of keyword
//! substrings maps recognized phases to percentage milestones. This is
//! a heuristic, not a measurement: lines may match zero or several
//! keywords, and each milestone is emitted at most once.

/// Ordered (keyword, milestone) pairs, milestones strictly increasing.
///
/// Keywords are matched case-insensitively as substrings of each line.
const MILESTONES: &[(&str, u32)] = &[
    ("selected model", 10),  // tool initialization
    ("separating track", 30), // separation started
    ("applying model", 60),  // main computation
    ("storing", 85),         // writing stems
    ("separation complete", 100),
];

/// Maps output lines to a monotonically non-decreasing percentage.
///
/// The emitted sequence never resets mid-job; re-observing an earlier
/// phase keyword emits nothing.
#[derive(Debug, Default)]
pub struct ProgressMapper {
    highest: u32,
}

impl ProgressMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Observe one output line.
    ///
    /// Returns a milestone only if some keyword matches and its value
    /// exceeds everything emitted so far.
    pub fn observe(&mut self, line: &str) -> Option<u32> {
        let line = line.to_lowercase();
        let best = MILESTONES
            .iter()
            .filter(|(keyword, _)| line.contains(keyword))
            .map(|(_, percent)| *percent)
            .max()?;

        if best > self.highest {
            self.highest = best;
            Some(best)
        } else {
            None
        }
    }

    /// Highest milestone emitted so far.
    pub fn percent(&self) -> u32 {
        self.highest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_emit_in_order() {
        let mut mapper = ProgressMapper::new();
        assert_eq!(mapper.observe("Selected model is a bag of 1 models"), Some(10));
        assert_eq!(mapper.observe("Separating track song.wav"), Some(30));
        assert_eq!(mapper.observe("Applying model htdemucs"), Some(60));
        assert_eq!(mapper.observe("Storing result"), Some(85));
        assert_eq!(mapper.observe("Separation complete"), Some(100));
    }

    #[test]
    fn matching_is_case_insensitive() {
        let mut mapper = ProgressMapper::new();
        assert_eq!(mapper.observe("SEPARATING TRACK x"), Some(30));
    }

    #[test]
    fn unknown_lines_emit_nothing() {
        let mut mapper = ProgressMapper::new();
        assert_eq!(mapper.observe("torchaudio backend initialized"), None);
        assert_eq!(mapper.observe(""), None);
        assert_eq!(mapper.percent(), 0);
    }

    #[test]
    fn repeated_keyword_emits_once() {
        let mut mapper = ProgressMapper::new();
        assert_eq!(mapper.observe("separating track a.wav"), Some(30));
        assert_eq!(mapper.observe("separating track b.wav"), None);
    }

    #[test]
    fn never_regresses_after_later_phase() {
        let mut mapper = ProgressMapper::new();
        assert_eq!(mapper.observe("applying model"), Some(60));
        assert_eq!(mapper.observe("selected model"), None);
        assert_eq!(mapper.percent(), 60);
    }

    #[test]
    fn multi_keyword_line_takes_highest() {
        let mut mapper = ProgressMapper::new();
        assert_eq!(
            mapper.observe("selected model, separating track now"),
            Some(30)
        );
    }

    #[test]
    fn emitted_sequence_is_non_decreasing() {
        // Arbitrary interleavings must never emit a value below a
        // previous emission.
        let lines = [
            "storing result",
            "selected model",
            "noise",
            "separation complete",
            "separating track",
            "applying model",
            "storing result",
        ];

        let mut mapper = ProgressMapper::new();
        let mut last = 0;
        for line in lines {
            if let Some(p) = mapper.observe(line) {
                assert!(p >= last, "progress regressed: {p} after {last}");
                last = p;
            }
        }
    }

    #[test]
    fn milestone_table_is_strictly_increasing() {
        for pair in MILESTONES.windows(2) {
            assert!(pair[0].1 < pair[1].1);
        }
    }
}
