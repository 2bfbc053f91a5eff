//! Dice roll results and success counting.

use serde::{Deserialize, Serialize};

use super::{BOTCH_FACE, SUCCESS_THRESHOLD};

/// The faces produced by rolling a dice pool, in roll order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollResult {
    faces: Vec<u8>,
}

impl RollResult {
    /// Build a result from already-rolled faces.
    ///
    /// Faces outside 1..=10 are clamped into range.
    pub fn from_faces(faces: impl IntoIterator<Item = u8>) -> Self {
        Self {
            faces: faces
                .into_iter()
                .map(|f| f.clamp(1, super::DIE_FACES))
                .collect(),
        }
    }

    /// The individual die faces in roll order.
    pub fn faces(&self) -> &[u8] {
        &self.faces
    }

    /// Number of dice rolled.
    pub fn count(&self) -> usize {
        self.faces.len()
    }

    /// Dice showing 8, 9 or 10.
    pub fn total_successes(&self) -> u32 {
        self.faces
            .iter()
            .filter(|&&f| f >= SUCCESS_THRESHOLD)
            .count() as u32
    }

    /// Dice showing 1.
    pub fn total_botches(&self) -> u32 {
        self.faces.iter().filter(|&&f| f == BOTCH_FACE).count() as u32
    }

    /// Successes minus botches. Can be negative.
    pub fn net_successes(&self) -> i32 {
        self.total_successes() as i32 - self.total_botches() as i32
    }

    /// No successes and at least one botch.
    pub fn is_fumble(&self) -> bool {
        self.total_successes() == 0 && self.total_botches() > 0
    }
}

impl std::fmt::Display for RollResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let values: Vec<String> = self.faces.iter().map(|v| v.to_string()).collect();
        write!(
            f,
            "[{}] {}S-{}B = {} net",
            values.join(", "),
            self.total_successes(),
            self.total_botches(),
            self.net_successes()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_successes_and_botches() {
        let r = RollResult::from_faces([8, 9, 10, 1, 1, 2, 3, 4, 5, 6]);
        assert_eq!(r.count(), 10);
        assert_eq!(r.total_successes(), 3);
        assert_eq!(r.total_botches(), 2);
        assert_eq!(r.net_successes(), 1);
        assert!(!r.is_fumble());
    }

    #[test]
    fn seven_is_blank() {
        let r = RollResult::from_faces([7, 7, 2]);
        assert_eq!(r.total_successes(), 0);
        assert_eq!(r.total_botches(), 0);
        assert_eq!(r.net_successes(), 0);
        assert!(!r.is_fumble());
    }

    #[test]
    fn net_can_go_negative() {
        let r = RollResult::from_faces([1, 1, 1, 9]);
        assert_eq!(r.net_successes(), -2);
        assert!(!r.is_fumble());
    }

    #[test]
    fn fumble_needs_a_botch_and_no_successes() {
        assert!(RollResult::from_faces([1, 4]).is_fumble());
        assert!(!RollResult::from_faces([4, 5]).is_fumble());
    }

    #[test]
    fn out_of_range_faces_are_clamped() {
        let r = RollResult::from_faces([0, 12]);
        assert_eq!(r.faces(), &[1, 10]);
    }

    #[test]
    fn empty_result() {
        let r = RollResult::default();
        assert_eq!(r.count(), 0);
        assert_eq!(r.net_successes(), 0);
        assert!(!r.is_fumble());
    }

    #[test]
    fn display() {
        let r = RollResult::from_faces([9, 1, 4]);
        assert_eq!(r.to_string(), "[9, 1, 4] 1S-1B = 0 net");
    }
}
