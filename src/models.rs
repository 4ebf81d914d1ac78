use crate::buckets::{CalendarDay, DateBucket};
use crate::errors::ValidationError;
use crate::score::total_score;
use crate::severity::{SeverityBand, SeverityScale};
use crate::stats::{ActivityPoint, AdminOverview, SymptomDistribution, TrendSummary};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Symptom {
    Pain,
    Bleeding,
    Fatigue,
    Pressure,
}

impl Symptom {
    pub const ALL: [Symptom; 4] = [
        Symptom::Pain,
        Symptom::Bleeding,
        Symptom::Fatigue,
        Symptom::Pressure,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Symptom::Pain => "pain",
            Symptom::Bleeding => "bleeding",
            Symptom::Fatigue => "fatigue",
            Symptom::Pressure => "pressure",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Symptom::Pain => "Pain",
            Symptom::Bleeding => "Bleeding",
            Symptom::Fatigue => "Fatigue",
            Symptom::Pressure => "Pressure",
        }
    }

    /// Descriptive wording for each rating step of this dimension.
    pub fn level_label(self, rating: SymptomRating) -> &'static str {
        let levels = match self {
            Symptom::Pain => ["None", "Mild", "Moderate", "Severe"],
            Symptom::Bleeding => ["None", "Light", "Moderate", "Heavy"],
            Symptom::Fatigue => ["High Energy", "Slight Fatigue", "Tired", "Exhausted"],
            Symptom::Pressure => ["None", "Slight", "Noticeable", "Severe"],
        };
        levels[usize::from(rating.value())]
    }
}

impl fmt::Display for Symptom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity of one symptom dimension on one day, always within 0..=3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize)]
#[serde(transparent)]
pub struct SymptomRating(u8);

impl SymptomRating {
    pub const MAX: u8 = 3;

    pub fn new(symptom: Symptom, value: i64) -> Result<Self, ValidationError> {
        if (0..=i64::from(Self::MAX)).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(ValidationError::RatingOutOfRange { symptom, value })
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SymptomRatings {
    pub pain: SymptomRating,
    pub bleeding: SymptomRating,
    pub fatigue: SymptomRating,
    pub pressure: SymptomRating,
}

impl SymptomRatings {
    pub fn new(
        pain: i64,
        bleeding: i64,
        fatigue: i64,
        pressure: i64,
    ) -> Result<Self, ValidationError> {
        RatingsInput {
            pain: Some(pain),
            bleeding: Some(bleeding),
            fatigue: Some(fatigue),
            pressure: Some(pressure),
        }
        .normalize()
    }

    pub fn get(&self, symptom: Symptom) -> SymptomRating {
        match symptom {
            Symptom::Pain => self.pain,
            Symptom::Bleeding => self.bleeding,
            Symptom::Fatigue => self.fatigue,
            Symptom::Pressure => self.pressure,
        }
    }
}

/// Ratings as they arrive at the boundary. Absent fields count as 0.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RatingsInput {
    #[serde(default)]
    pub pain: Option<i64>,
    #[serde(default)]
    pub bleeding: Option<i64>,
    #[serde(default)]
    pub fatigue: Option<i64>,
    #[serde(default)]
    pub pressure: Option<i64>,
}

impl RatingsInput {
    pub fn normalize(self) -> Result<SymptomRatings, ValidationError> {
        let rate = |symptom, value: Option<i64>| SymptomRating::new(symptom, value.unwrap_or(0));
        Ok(SymptomRatings {
            pain: rate(Symptom::Pain, self.pain)?,
            bleeding: rate(Symptom::Bleeding, self.bleeding)?,
            fatigue: rate(Symptom::Fatigue, self.fatigue)?,
            pressure: rate(Symptom::Pressure, self.pressure)?,
        })
    }
}

impl From<SymptomRatings> for RatingsInput {
    fn from(ratings: SymptomRatings) -> Self {
        Self {
            pain: Some(i64::from(ratings.pain.value())),
            bleeding: Some(i64::from(ratings.bleeding.value())),
            fatigue: Some(i64::from(ratings.fatigue.value())),
            pressure: Some(i64::from(ratings.pressure.value())),
        }
    }
}

/// One subject's ratings for one calendar day. The total score is derived,
/// never stored on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "DailyLogRecord", into = "DailyLogRecord")]
pub struct DailyLog {
    date: NaiveDate,
    ratings: SymptomRatings,
}

impl DailyLog {
    pub fn new(date: NaiveDate, ratings: SymptomRatings) -> Self {
        Self { date, ratings }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn ratings(&self) -> &SymptomRatings {
        &self.ratings
    }

    pub fn rating(&self, symptom: Symptom) -> SymptomRating {
        self.ratings.get(symptom)
    }

    pub fn total_score(&self) -> u8 {
        total_score(&self.ratings)
    }

    pub fn severity(&self) -> SeverityBand {
        SeverityBand::for_total(self.total_score())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DailyLogRecord {
    date: NaiveDate,
    #[serde(flatten)]
    ratings: RatingsInput,
    #[serde(default, skip_deserializing)]
    total_score: u8,
}

impl TryFrom<DailyLogRecord> for DailyLog {
    type Error = ValidationError;

    fn try_from(record: DailyLogRecord) -> Result<Self, Self::Error> {
        Ok(DailyLog::new(record.date, record.ratings.normalize()?))
    }
}

impl From<DailyLog> for DailyLogRecord {
    fn from(log: DailyLog) -> Self {
        Self {
            date: log.date,
            total_score: log.total_score(),
            ratings: log.ratings.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectId(String);

impl SubjectId {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptySubject);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A log together with the subject it belongs to, for cross-subject analytics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubjectLog {
    pub subject: SubjectId,
    pub log: DailyLog,
}

/// A trailing run of calendar days ending at an anchor date (inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window(u16);

impl Window {
    pub const MAX_DAYS: i64 = 366;
    pub const WEEK: Window = Window(7);
    pub const MONTH: Window = Window(30);

    pub fn new(days: i64) -> Result<Self, ValidationError> {
        if (1..=Self::MAX_DAYS).contains(&days) {
            Ok(Self(days as u16))
        } else {
            Err(ValidationError::InvalidWindow { days })
        }
    }

    pub fn days(self) -> usize {
        usize::from(self.0)
    }

    /// First day of the window. Saturates at `NaiveDate::MIN`; boundaries that
    /// accept caller-supplied anchors should go through [`Window::start_for`].
    pub fn start(self, anchor: NaiveDate) -> NaiveDate {
        self.start_for(anchor).unwrap_or(NaiveDate::MIN)
    }

    /// First day of the window, rejecting anchors too close to the start of
    /// the calendar to fit the whole window.
    pub fn start_for(self, anchor: NaiveDate) -> Result<NaiveDate, ValidationError> {
        anchor
            .checked_sub_signed(Duration::days(i64::from(self.0) - 1))
            .ok_or(ValidationError::AnchorOutOfRange {
                anchor,
                days: self.days(),
            })
    }

    pub fn contains(self, anchor: NaiveDate, date: NaiveDate) -> bool {
        date >= self.start(anchor) && date <= anchor
    }

    /// Every date in the window, oldest first.
    pub fn dates(self, anchor: NaiveDate) -> impl Iterator<Item = NaiveDate> {
        (0..i64::from(self.0))
            .rev()
            .filter_map(move |offset| anchor.checked_sub_signed(Duration::days(offset)))
    }
}

#[derive(Debug, Deserialize)]
pub struct LogRequest {
    pub date: Option<NaiveDate>,
    #[serde(flatten)]
    pub ratings: RatingsInput,
}

#[derive(Debug, Deserialize)]
pub struct WindowQuery {
    pub days: Option<i64>,
    pub anchor: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct CalendarQuery {
    pub month: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AdminQuery {
    pub days: Option<i64>,
    pub active_days: Option<i64>,
    pub anchor: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct SeverityQuery {
    #[serde(default)]
    pub scale: SeverityScale,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeverityView {
    pub band: SeverityBand,
    pub label: &'static str,
    pub short_label: &'static str,
}

impl From<SeverityBand> for SeverityView {
    fn from(band: SeverityBand) -> Self {
        Self {
            band,
            label: band.label(),
            short_label: band.short_label(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LogResponse {
    pub subject: SubjectId,
    pub date: NaiveDate,
    pub logged: bool,
    pub pain: u8,
    pub bleeding: u8,
    pub fatigue: u8,
    pub pressure: u8,
    pub total_score: u8,
    pub severity: SeverityView,
    pub levels: BTreeMap<Symptom, &'static str>,
}

impl LogResponse {
    pub fn new(subject: SubjectId, log: &DailyLog, logged: bool) -> Self {
        let ratings = log.ratings();
        Self {
            subject,
            date: log.date(),
            logged,
            pain: ratings.pain.value(),
            bleeding: ratings.bleeding.value(),
            fatigue: ratings.fatigue.value(),
            pressure: ratings.pressure.value(),
            total_score: log.total_score(),
            severity: log.severity().into(),
            levels: Symptom::ALL
                .iter()
                .map(|&symptom| (symptom, symptom.level_label(log.rating(symptom))))
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChartResponse {
    pub subject: SubjectId,
    pub anchor: NaiveDate,
    pub buckets: Vec<DateBucket>,
    pub summary: TrendSummary,
}

#[derive(Debug, Serialize)]
pub struct CalendarResponse {
    pub subject: SubjectId,
    pub year: i32,
    pub month: u32,
    pub days: Vec<CalendarDay>,
}

#[derive(Debug, Serialize)]
pub struct AdminStatsResponse {
    pub anchor: NaiveDate,
    pub overview: AdminOverview,
    pub distribution: Vec<SymptomDistribution>,
    pub daily_activity: Vec<ActivityPoint>,
}

#[derive(Debug, Serialize)]
pub struct SeverityResponse {
    pub scale: SeverityScale,
    pub value: f64,
    #[serde(flatten)]
    pub severity: SeverityView,
}
