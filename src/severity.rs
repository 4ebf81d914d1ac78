use crate::errors::ValidationError;
use crate::score::MAX_TOTAL_SCORE;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityBand {
    None,
    Mild,
    Moderate,
    Severe,
}

impl SeverityBand {
    /// Band for a total score. Scores above the scale land in `Severe`; use
    /// [`classify_total`] when the input is not already known to be valid.
    pub(crate) fn for_total(score: u8) -> Self {
        match score {
            0 => SeverityBand::None,
            1..=4 => SeverityBand::Mild,
            5..=8 => SeverityBand::Moderate,
            _ => SeverityBand::Severe,
        }
    }

    pub(crate) fn for_average(average: f64) -> Self {
        if average <= 0.0 {
            SeverityBand::None
        } else if average <= 1.0 {
            SeverityBand::Mild
        } else if average <= 2.0 {
            SeverityBand::Moderate
        } else {
            SeverityBand::Severe
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SeverityBand::None => "No symptoms",
            SeverityBand::Mild => "Mild symptoms",
            SeverityBand::Moderate => "Moderate symptoms",
            SeverityBand::Severe => "Severe symptoms",
        }
    }

    pub fn short_label(self) -> &'static str {
        match self {
            SeverityBand::None => "None",
            SeverityBand::Mild => "Mild",
            SeverityBand::Moderate => "Moderate",
            SeverityBand::Severe => "Severe",
        }
    }
}

/// Classifies a daily total score (0..=12).
pub fn classify_total(score: i64) -> Result<SeverityBand, ValidationError> {
    if !(0..=i64::from(MAX_TOTAL_SCORE)).contains(&score) {
        return Err(ValidationError::ScoreOutOfRange(score));
    }
    Ok(SeverityBand::for_total(score as u8))
}

/// Classifies a per-symptom average (0.0..=3.0). This is a different scale
/// from [`classify_total`] even though the bands share names.
pub fn classify_average(average: f64) -> Result<SeverityBand, ValidationError> {
    if !average.is_finite() || !(0.0..=3.0).contains(&average) {
        return Err(ValidationError::AverageOutOfRange(average));
    }
    Ok(SeverityBand::for_average(average))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityScale {
    #[default]
    Total,
    Average,
}

impl SeverityScale {
    pub fn classify(self, value: f64) -> Result<SeverityBand, ValidationError> {
        match self {
            SeverityScale::Total => {
                if !value.is_finite() || value.fract() != 0.0 {
                    return Err(ValidationError::FractionalScore(value));
                }
                classify_total(value as i64)
            }
            SeverityScale::Average => classify_average(value),
        }
    }
}
