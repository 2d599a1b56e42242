//! Answer assembly: merge parsed fragments into an index-aligned answer set.
//!
//! The sheet is pre-sized to the question count and written by indexed
//! assignment only — there is no insertion path, so a fragment can never
//! shift its neighbours. The Pending → Answered transition is terminal and
//! fires once: the first real (non-sentinel, non-empty) answer for an index
//! wins, and later writes to the same index are tolerated but ignored.

use crate::prompts::NOT_AVAILABLE;

/// Per-question slots for one request, aligned to the inbound question list.
#[derive(Debug, Clone)]
pub struct AnswerSheet {
    slots: Vec<Option<String>>,
}

impl AnswerSheet {
    /// Create a sheet with `n` empty slots.
    pub fn new(n: usize) -> Self {
        Self {
            slots: vec![None; n],
        }
    }

    /// Record an answer for a question index.
    ///
    /// Returns `true` when the slot transitioned to Answered. The sentinel,
    /// empty answers, out-of-range indices, and already-answered slots are
    /// all ignored silently.
    pub fn record(&mut self, index: usize, answer: &str) -> bool {
        if answer.is_empty() || answer == NOT_AVAILABLE {
            return false;
        }
        match self.slots.get_mut(index) {
            Some(slot @ None) => {
                *slot = Some(answer.to_string());
                true
            }
            _ => false,
        }
    }

    /// Whether the question at `index` has a recorded answer.
    pub fn is_answered(&self, index: usize) -> bool {
        matches!(self.slots.get(index), Some(Some(_)))
    }

    /// Indices still awaiting an answer.
    pub fn pending(&self) -> Vec<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.is_none().then_some(i))
            .collect()
    }

    /// Number of recorded answers.
    pub fn answered_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// True when every slot is answered.
    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(|s| s.is_some())
    }

    /// Consume the sheet into the final answer list: exactly one string per
    /// slot, empty for indices never written.
    pub fn into_answers(self) -> Vec<String> {
        self.slots
            .into_iter()
            .map(|s| s.unwrap_or_default())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_always_matches_question_count() {
        for n in [0, 1, 5, 17] {
            let sheet = AnswerSheet::new(n);
            assert_eq!(sheet.into_answers().len(), n);
        }
    }

    #[test]
    fn unwritten_slots_are_empty_strings() {
        let mut sheet = AnswerSheet::new(3);
        sheet.record(1, "answer");
        let answers = sheet.into_answers();
        assert_eq!(answers, vec!["".to_string(), "answer".to_string(), "".to_string()]);
    }

    #[test]
    fn sentinel_is_never_recorded() {
        let mut sheet = AnswerSheet::new(2);
        assert!(!sheet.record(0, NOT_AVAILABLE));
        assert_eq!(sheet.pending(), vec![0, 1]);
        let answers = sheet.into_answers();
        assert!(answers.iter().all(|a| a != NOT_AVAILABLE));
    }

    #[test]
    fn empty_answer_leaves_slot_pending() {
        let mut sheet = AnswerSheet::new(1);
        assert!(!sheet.record(0, ""));
        assert!(!sheet.is_answered(0));
    }

    #[test]
    fn first_writer_wins() {
        let mut sheet = AnswerSheet::new(1);
        assert!(sheet.record(0, "first"));
        assert!(!sheet.record(0, "second"));
        assert_eq!(sheet.into_answers(), vec!["first".to_string()]);
    }

    #[test]
    fn out_of_range_index_is_ignored() {
        let mut sheet = AnswerSheet::new(2);
        assert!(!sheet.record(7, "lost"));
        assert_eq!(sheet.pending(), vec![0, 1]);
    }

    #[test]
    fn pending_and_complete_track_transitions() {
        let mut sheet = AnswerSheet::new(3);
        assert_eq!(sheet.pending(), vec![0, 1, 2]);
        assert!(!sheet.is_complete());

        sheet.record(2, "c");
        sheet.record(0, "a");
        assert_eq!(sheet.pending(), vec![1]);
        assert_eq!(sheet.answered_count(), 2);

        sheet.record(1, "b");
        assert!(sheet.is_complete());
    }
}
