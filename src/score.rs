use crate::models::{Symptom, SymptomRatings};

pub const MAX_TOTAL_SCORE: u8 = 12;

/// Sum of the four ratings, always within 0..=12.
pub fn total_score(ratings: &SymptomRatings) -> u8 {
    Symptom::ALL
        .iter()
        .map(|symptom| ratings.get(*symptom).value())
        .sum()
}
