//! Contribution calendar behind the commit-history visualization

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{Datelike, Days, NaiveDate};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Weeks shown when the calendar has to be generated locally
pub const FALLBACK_WEEKS: usize = 52;

#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("contribution request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("contribution source answered with status {0}")]
    Status(StatusCode),
}

/// Bucketed intensity of a day's contribution count
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(into = "u8")]
pub enum ContributionLevel {
    None,
    Low,
    Medium,
    High,
    Max,
}

impl ContributionLevel {
    pub fn from_count(count: u32) -> Self {
        match count {
            0 => Self::None,
            1..=2 => Self::Low,
            3..=5 => Self::Medium,
            6..=10 => Self::High,
            _ => Self::Max,
        }
    }
}

impl From<ContributionLevel> for u8 {
    fn from(level: ContributionLevel) -> Self {
        level as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ContributionDay {
    pub date: NaiveDate,
    pub count: u32,
    pub level: ContributionLevel,
}

impl ContributionDay {
    pub fn new(date: NaiveDate, count: u32) -> Self {
        Self {
            date,
            count,
            level: ContributionLevel::from_count(count),
        }
    }
}

/// Sunday-first week, always seven days
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContributionWeek {
    pub days: [ContributionDay; 7],
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContributionCalendar {
    pub total: u32,
    pub weeks: Vec<ContributionWeek>,
}

impl ContributionCalendar {
    /// Group daily counts into Sunday-first weeks.
    ///
    /// Days missing between the first and last date, and the padding that
    /// completes the first and last week, count as zero. Repeated dates are
    /// summed.
    pub fn from_days(days: impl IntoIterator<Item = (NaiveDate, u32)>) -> Self {
        let mut counts: BTreeMap<NaiveDate, u32> = BTreeMap::new();
        for (date, count) in days {
            let slot = counts.entry(date).or_insert(0);
            *slot = slot.saturating_add(count);
        }

        let (Some((&first, _)), Some((&last, _))) =
            (counts.first_key_value(), counts.last_key_value())
        else {
            return Self::default();
        };

        let start = first - Days::new(u64::from(first.weekday().num_days_from_sunday()));
        let end = last + Days::new(u64::from(6 - last.weekday().num_days_from_sunday()));

        let mut weeks = Vec::new();
        let mut week_start = start;
        while week_start <= end {
            let days = std::array::from_fn(|i| {
                let date = week_start + Days::new(i as u64);
                ContributionDay::new(date, counts.get(&date).copied().unwrap_or(0))
            });
            weeks.push(ContributionWeek { days });
            week_start = week_start + Days::new(7);
        }

        Self {
            total: counts.values().fold(0u32, |acc, c| acc.saturating_add(*c)),
            weeks,
        }
    }

    /// Deterministic stand-in used when the remote calendar is unavailable
    pub fn fallback(end: NaiveDate, weeks: usize) -> Self {
        let span = (weeks * 7) as u64;
        if span == 0 {
            return Self::default();
        }
        let start = end - Days::new(span - 1);
        let days = start
            .iter_days()
            .take_while(|d| *d <= end)
            .map(|date| (date, synthetic_count(date)));
        Self::from_days(days)
    }

    pub fn days(&self) -> impl Iterator<Item = &ContributionDay> {
        self.weeks.iter().flat_map(|week| week.days.iter())
    }
}

/// Pseudo-random but stable count for a date
fn synthetic_count(date: NaiveDate) -> u32 {
    // splitmix64 over the day number
    let mut z = (date.num_days_from_ce() as u64).wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^= z >> 31;

    if z % 10 < 3 {
        0
    } else {
        ((z >> 16) % 14) as u32
    }
}

#[derive(Debug, Deserialize)]
struct RemoteCalendar {
    contributions: Vec<RemoteDay>,
}

#[derive(Debug, Deserialize)]
struct RemoteDay {
    date: NaiveDate,
    count: u32,
}

/// Remote JSON source of daily contribution counts
pub struct CalendarSource {
    client: Client,
    url: Url,
}

impl CalendarSource {
    pub fn new(url: Url, timeout: Duration) -> Result<Self, CalendarError> {
        let client = Client::builder()
            .user_agent(concat!("folio/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self { client, url })
    }

    pub async fn fetch(&self) -> Result<ContributionCalendar, CalendarError> {
        let response = self.client.get(self.url.as_str()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CalendarError::Status(status));
        }
        let remote: RemoteCalendar = response.json().await?;
        Ok(ContributionCalendar::from_days(
            remote.contributions.into_iter().map(|d| (d.date, d.count)),
        ))
    }
}

/// Fetch the calendar, falling back to the local generator on any failure
pub async fn load_calendar(source: Option<&CalendarSource>, today: NaiveDate) -> ContributionCalendar {
    if let Some(source) = source {
        match source.fetch().await {
            Ok(calendar) => return calendar,
            Err(e) => tracing::warn!("Using generated contribution calendar: {}", e),
        }
    }
    ContributionCalendar::fallback(today, FALLBACK_WEEKS)
}
