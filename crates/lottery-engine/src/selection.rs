//! Winner source: the pluggable oracle that picks a participant.

use lottery_types::{Participant, SelectionError};

/// Names one participant from an ordered list.
///
/// Called exactly once per settlement with the authoritative snapshot. The
/// selection policy (uniform random, VRF, fixed) is entirely the
/// implementor's business; the engine only checks the returned index is in
/// range.
pub trait WinnerSource {
    /// Return the index of the selected participant in `participants`.
    fn select(&mut self, participants: &[Participant]) -> Result<usize, SelectionError>;
}

impl<W: WinnerSource + ?Sized> WinnerSource for Box<W> {
    fn select(&mut self, participants: &[Participant]) -> Result<usize, SelectionError> {
        (**self).select(participants)
    }
}
