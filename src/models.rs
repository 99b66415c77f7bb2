use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Deserializer};
use std::{fmt, str::FromStr};

use crate::errors::WindowError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    MonthlyBetting,
    DailyBetting,
}

impl Mode {
    /// Reads a `select` form value. Blank means monthly; any value other than
    /// the monthly one selects daily.
    pub fn from_form(value: &str) -> Self {
        match value.trim() {
            "" | "monthly" | "월간 배팅" => Mode::MonthlyBetting,
            _ => Mode::DailyBetting,
        }
    }

    pub fn granularity(self) -> Granularity {
        match self {
            Mode::MonthlyBetting => Granularity::Month,
            Mode::DailyBetting => Granularity::Date,
        }
    }

    /// Form value of the `select[name=select]` option.
    pub fn value(self) -> &'static str {
        match self {
            Mode::MonthlyBetting => "monthly",
            Mode::DailyBetting => "daily",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Mode::MonthlyBetting => "Monthly betting",
            Mode::DailyBetting => "Daily betting",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Month,
    Date,
}

impl Granularity {
    /// `type` attribute of the date inputs.
    pub fn input_type(self) -> &'static str {
        match self {
            Granularity::Month => "month",
            Granularity::Date => "date",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn first_day(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    /// Last calendar day: the day before the first of the following month.
    pub fn last_day(self) -> Option<NaiveDate> {
        self.first_day()?
            .checked_add_months(Months::new(1))?
            .pred_opt()
    }

    /// Moves by `delta` months, carrying into the year.
    pub fn shifted(self, delta: i32) -> Self {
        let index = self.year * 12 + self.month as i32 - 1 + delta;
        Self {
            year: index.div_euclid(12),
            month: index.rem_euclid(12) as u32 + 1,
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = WindowError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || WindowError::Unparsable(value.to_string());
        let (year, month) = value.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year = year.parse::<i32>().map_err(|_| invalid())?;
        let month = month.parse::<u32>().map_err(|_| invalid())?;
        YearMonth::new(year, month).ok_or_else(invalid)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    Month(YearMonth),
    Day(NaiveDate),
}

impl Boundary {
    pub fn granularity(self) -> Granularity {
        match self {
            Boundary::Month(_) => Granularity::Month,
            Boundary::Day(_) => Granularity::Date,
        }
    }

    pub fn parse(granularity: Granularity, value: &str) -> Result<Self, WindowError> {
        match granularity {
            Granularity::Month => value.parse().map(Boundary::Month),
            Granularity::Date => NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
                .map(Boundary::Day)
                .map_err(|_| WindowError::Unparsable(value.to_string())),
        }
    }
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Boundary::Month(month) => write!(f, "{month}"),
            Boundary::Day(date) => write!(f, "{}", date.format("%Y-%m-%d")),
        }
    }
}

/// Start/end input state. Both boundaries share the window's granularity and
/// `start <= end` whenever both are set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    granularity: Granularity,
    start: Option<Boundary>,
    end: Option<Boundary>,
}

impl DateWindow {
    pub fn new(
        granularity: Granularity,
        start: Option<Boundary>,
        end: Option<Boundary>,
    ) -> Result<Self, WindowError> {
        for boundary in start.iter().chain(end.iter()) {
            if boundary.granularity() != granularity {
                return Err(WindowError::MixedGranularity);
            }
        }

        if let (Some(start), Some(end)) = (start, end) {
            let inverted = match (start, end) {
                (Boundary::Month(s), Boundary::Month(e)) => s > e,
                (Boundary::Day(s), Boundary::Day(e)) => s > e,
                _ => return Err(WindowError::MixedGranularity),
            };
            if inverted {
                return Err(WindowError::Inverted {
                    start: start.to_string(),
                    end: end.to_string(),
                });
            }
        }

        Ok(Self {
            granularity,
            start,
            end,
        })
    }

    /// Window derived from the calendar rather than user input; the caller
    /// guarantees the invariants.
    pub(crate) fn from_calendar(
        granularity: Granularity,
        start: Option<Boundary>,
        end: Option<Boundary>,
    ) -> Self {
        debug_assert!(Self::new(granularity, start, end).is_ok());
        Self {
            granularity,
            start,
            end,
        }
    }

    /// Parses raw input values; blank values leave the boundary unset.
    pub fn parse(
        granularity: Granularity,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<Self, WindowError> {
        let parse = |value: Option<&str>| -> Result<Option<Boundary>, WindowError> {
            match value.map(str::trim).filter(|value| !value.is_empty()) {
                Some(value) => Boundary::parse(granularity, value).map(Some),
                None => Ok(None),
            }
        };
        Self::new(granularity, parse(start)?, parse(end)?)
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn start(&self) -> Option<Boundary> {
        self.start
    }

    pub fn end(&self) -> Option<Boundary> {
        self.end
    }

    pub fn start_value(&self) -> String {
        self.start.map(|b| b.to_string()).unwrap_or_default()
    }

    pub fn end_value(&self) -> String {
        self.end.map(|b| b.to_string()).unwrap_or_default()
    }
}

/// Numeric cell as the backend sends it. `None` means "not a number":
/// absent fields, unparsable strings and non-finite values.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LooseNumber(Option<f64>);

impl LooseNumber {
    pub fn new(value: f64) -> Self {
        Self(Some(value).filter(|v| v.is_finite()))
    }

    pub fn not_a_number() -> Self {
        Self(None)
    }

    pub fn finite(self) -> Option<f64> {
        self.0
    }

    fn from_json(value: &serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => Self::new(0.0),
            Value::Bool(flag) => Self::new(if *flag { 1.0 } else { 0.0 }),
            Value::Number(number) => number.as_f64().map(Self::new).unwrap_or_default(),
            Value::String(text) => {
                let text = text.trim();
                if text.is_empty() {
                    Self::new(0.0)
                } else {
                    text.parse::<f64>().map(Self::new).unwrap_or_default()
                }
            }
            Value::Array(_) | Value::Object(_) => Self::not_a_number(),
        }
    }
}

impl<'de> Deserialize<'de> for LooseNumber {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(Self::from_json(&value))
    }
}

/// Text cell as the backend sends it: strings as-is, `null` as empty, any
/// other JSON value in its serialized form.
fn loose_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    use serde_json::Value;
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(text) => text,
        other => other.to_string(),
    })
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RankingRow {
    #[serde(default, deserialize_with = "loose_text")]
    pub nickname: String,
    #[serde(default)]
    pub total_amount: LooseNumber,
    #[serde(default)]
    pub total_profit: LooseNumber,
    #[serde(default)]
    pub total_bets: LooseNumber,
    #[serde(default)]
    pub wins: LooseNumber,
    #[serde(default)]
    pub win_rate: LooseNumber,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawPeriodRow")]
pub struct PeriodRow {
    pub period_label: String,
    pub total_amount: LooseNumber,
    pub total_profit: LooseNumber,
    pub total_bets: LooseNumber,
    pub wins: LooseNumber,
    pub win_rate: LooseNumber,
}

#[derive(Deserialize)]
struct RawPeriodRow {
    #[serde(default, deserialize_with = "loose_text")]
    stat_month: String,
    #[serde(default, deserialize_with = "loose_text")]
    stat_date: String,
    #[serde(default)]
    total_amount: LooseNumber,
    #[serde(default)]
    total_profit: LooseNumber,
    #[serde(default)]
    total_bets: LooseNumber,
    #[serde(default)]
    wins: LooseNumber,
    #[serde(default)]
    win_rate: LooseNumber,
}

impl From<RawPeriodRow> for PeriodRow {
    fn from(raw: RawPeriodRow) -> Self {
        let period_label = [raw.stat_month, raw.stat_date]
            .into_iter()
            .find(|label| !label.is_empty())
            .unwrap_or_else(|| "-".to_string());
        Self {
            period_label,
            total_amount: raw.total_amount,
            total_profit: raw.total_profit,
            total_bets: raw.total_bets,
            wins: raw.wins,
            win_rate: raw.win_rate,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NicknameStats {
    Rows(Vec<PeriodRow>),
    NoRecords,
}

/// Per-nickname period rows in response order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StatsPayload {
    pub entries: Vec<(String, NicknameStats)>,
}

/// Query string of both dashboard pages.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub select: Option<String>,
    #[serde(rename = "startDate")]
    pub start_date: Option<String>,
    #[serde(rename = "endDate")]
    pub end_date: Option<String>,
    pub nickname: Option<String>,
    pub reset: Option<String>,
}

impl DashboardQuery {
    pub fn mode(&self) -> Mode {
        self.select.as_deref().map(Mode::from_form).unwrap_or_default()
    }

    pub fn is_reset(&self) -> bool {
        self.reset.as_deref().is_some_and(|value| !value.is_empty())
    }

    pub fn has_dates(&self) -> bool {
        self.start_date.is_some() || self.end_date.is_some()
    }
}
