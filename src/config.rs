//! Configuration records for source and sink jobs
//!
//! Configuration arrives from the host as JSON. Each record derives serde
//! with the camelCase key names the host uses (`objectType`, `apiServerUrl`,
//! `startDate`, ...) and carries a `validate()` that checks everything that
//! can be checked offline: analytics report settings, date ranges, filter
//! shape, and writable object types for the sink.

use std::str::FromStr;
use std::time::Duration;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::auth::Credential;
use crate::endpoints::{EndpointTable, ObjectType};
use crate::error::{Error, Result};

// ============================================================================
// Defaults
// ============================================================================

/// Production API server.
pub const DEFAULT_API_SERVER_URL: &str = "https://api.hubapi.com";

/// Page size requested from paged endpoints.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Minutes between streaming polls when the config does not say otherwise.
pub const DEFAULT_POLL_FREQUENCY_MINUTES: u64 = 15;

/// Analytics filters are single words, no separators or special symbols.
static FILTER_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\w+$").unwrap());

const DATE_FORMAT: &str = "%Y%m%d";

fn default_api_server_url() -> String {
    DEFAULT_API_SERVER_URL.to_string()
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_poll_frequency_minutes() -> u64 {
    DEFAULT_POLL_FREQUENCY_MINUTES
}

// ============================================================================
// Analytics report settings
// ============================================================================

/// Grouping applied to analytics report data.
///
/// The wire form doubles as the trailing path segment of the report URL,
/// e.g. `/analytics/v2/reports/totals/summarize/daily`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimePeriod {
    #[serde(rename = "total")]
    Total,
    #[serde(rename = "daily")]
    Daily,
    #[serde(rename = "weekly")]
    Weekly,
    #[serde(rename = "monthly")]
    Monthly,
    #[serde(rename = "summarize/daily")]
    SummarizeDaily,
    #[serde(rename = "summarize/weekly")]
    SummarizeWeekly,
    #[serde(rename = "summarize/monthly")]
    SummarizeMonthly,
}

impl TimePeriod {
    /// URL path segment for this period.
    pub fn path_segment(&self) -> &'static str {
        match self {
            TimePeriod::Total => "total",
            TimePeriod::Daily => "daily",
            TimePeriod::Weekly => "weekly",
            TimePeriod::Monthly => "monthly",
            TimePeriod::SummarizeDaily => "summarize/daily",
            TimePeriod::SummarizeWeekly => "summarize/weekly",
            TimePeriod::SummarizeMonthly => "summarize/monthly",
        }
    }

    /// Periods that break data down per day/week/month and therefore
    /// require at least one filter.
    pub fn is_breakdown(&self) -> bool {
        matches!(
            self,
            TimePeriod::Daily | TimePeriod::Weekly | TimePeriod::Monthly
        )
    }
}

impl FromStr for TimePeriod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "total" => Ok(TimePeriod::Total),
            "daily" => Ok(TimePeriod::Daily),
            "weekly" => Ok(TimePeriod::Weekly),
            "monthly" => Ok(TimePeriod::Monthly),
            "summarize/daily" => Ok(TimePeriod::SummarizeDaily),
            "summarize/weekly" => Ok(TimePeriod::SummarizeWeekly),
            "summarize/monthly" => Ok(TimePeriod::SummarizeMonthly),
            other => Err(Error::invalid_value(
                "timePeriod",
                format!("'{other}' is not a valid time period"),
            )),
        }
    }
}

/// Which flavor of analytics report to pull. Selects which of the
/// `reportCategory`/`reportContent`/`reportObject` config values supplies
/// the report path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportType {
    #[serde(rename = "Category")]
    Category,
    #[serde(rename = "Content")]
    Content,
    #[serde(rename = "Object")]
    Object,
}

/// Valid `reportCategory` values.
pub const REPORT_CATEGORIES: [&str; 9] = [
    "totals",
    "sessions",
    "sources",
    "geolocation",
    "utm-campaigns",
    "utm-contents",
    "utm-mediums",
    "utm-sources",
    "utm-terms",
];

/// Valid `reportContent` values.
pub const REPORT_CONTENTS: [&str; 5] = [
    "landing-pages",
    "standard-pages",
    "blog-posts",
    "listing-pages",
    "knowledge-articles",
];

/// Valid `reportObject` values.
pub const REPORT_OBJECTS: [&str; 4] = ["event-completions", "forms", "pages", "social-assists"];

// ============================================================================
// Source config
// ============================================================================

/// Configuration for a batch read job.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceConfig {
    /// Object type to pull.
    pub object_type: ObjectType,

    /// OAuth2 access token. Takes precedence over the API key when both
    /// are set.
    #[serde(default)]
    pub access_token: Option<String>,

    /// API key, sent as the `hapikey` query parameter.
    #[serde(default)]
    pub api_key: Option<String>,

    /// API server to talk to.
    #[serde(default = "default_api_server_url")]
    pub api_server_url: String,

    /// Start date for analytics report data, YYYYMMDD.
    #[serde(default)]
    pub start_date: Option<String>,

    /// End date for analytics report data, YYYYMMDD.
    #[serde(default)]
    pub end_date: Option<String>,

    /// Comma-separated analytics breakdown filters.
    #[serde(default)]
    pub filters: Option<String>,

    /// Analytics grouping period.
    #[serde(default)]
    pub time_period: Option<TimePeriod>,

    /// Analytics report flavor.
    #[serde(default)]
    pub report_type: Option<ReportType>,

    /// Report value when `report_type` is `Category`.
    #[serde(default)]
    pub report_category: Option<String>,

    /// Report value when `report_type` is `Content`.
    #[serde(default)]
    pub report_content: Option<String>,

    /// Report value when `report_type` is `Object`.
    #[serde(default)]
    pub report_object: Option<String>,

    /// API call budget per day; spaces requests out to stay under the
    /// account rate limit. Absent or zero disables the limiter.
    #[serde(default)]
    pub calls_per_day: Option<u32>,

    /// Items requested per page.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl SourceConfig {
    /// A minimal config for the given object type, credential unset.
    pub fn new(object_type: ObjectType) -> Self {
        Self {
            object_type,
            access_token: None,
            api_key: None,
            api_server_url: default_api_server_url(),
            start_date: None,
            end_date: None,
            filters: None,
            time_period: None,
            report_type: None,
            report_category: None,
            report_content: None,
            report_object: None,
            calls_per_day: None,
            page_size: default_page_size(),
        }
    }

    /// Resolve the configured credential.
    pub fn credential(&self) -> Result<Credential> {
        Credential::from_parts(self.access_token.clone(), self.api_key.clone())
    }

    /// Split the comma-separated filter string. Empty segments are kept so
    /// validation can reject them.
    pub fn filter_list(&self) -> Vec<String> {
        match &self.filters {
            Some(filters) if !filters.is_empty() => {
                filters.split(',').map(str::to_string).collect()
            }
            _ => Vec::new(),
        }
    }

    /// The report value selected by `report_type`.
    pub fn report_value(&self) -> Result<&str> {
        let report_type = self
            .report_type
            .ok_or_else(|| Error::missing_field("reportType"))?;
        match report_type {
            ReportType::Category => self
                .report_category
                .as_deref()
                .ok_or_else(|| Error::missing_field("reportCategory")),
            ReportType::Content => self
                .report_content
                .as_deref()
                .ok_or_else(|| Error::missing_field("reportContent")),
            ReportType::Object => self
                .report_object
                .as_deref()
                .ok_or_else(|| Error::missing_field("reportObject")),
        }
    }

    /// The `{report}/{period}` suffix of the analytics endpoint path.
    pub fn report_path(&self) -> Result<String> {
        let report = self.report_value()?;
        let period = self
            .time_period
            .ok_or_else(|| Error::missing_field("timePeriod"))?;
        Ok(format!("{report}/{}", period.path_segment()))
    }

    /// Check everything that can be checked without talking to the API.
    pub fn validate(&self) -> Result<()> {
        if self.object_type == ObjectType::Analytics {
            self.validate_report()?;
            self.validate_time_period()?;
            self.validate_filters()?;
            self.validate_date_range()?;
        }
        Ok(())
    }

    fn validate_report(&self) -> Result<()> {
        let report_type = self
            .report_type
            .ok_or_else(|| Error::missing_field("reportType"))?;
        let value = self.report_value()?;
        let (valid, field) = match report_type {
            ReportType::Category => (&REPORT_CATEGORIES[..], "reportCategory"),
            ReportType::Content => (&REPORT_CONTENTS[..], "reportContent"),
            ReportType::Object => (&REPORT_OBJECTS[..], "reportObject"),
        };
        if !valid.contains(&value) {
            return Err(Error::invalid_value(
                field,
                format!("'{value}' is not a valid report for this report type"),
            ));
        }
        Ok(())
    }

    fn validate_time_period(&self) -> Result<()> {
        let period = self
            .time_period
            .ok_or_else(|| Error::missing_field("timePeriod"))?;
        // Totals reports only group cleanly under summarized periods.
        if self.report_value()? == "totals" && period.is_breakdown() {
            return Err(Error::invalid_value(
                "timePeriod",
                format!(
                    "time period '{}' is not valid for totals reports, use a summarize/* period",
                    period.path_segment()
                ),
            ));
        }
        Ok(())
    }

    fn validate_filters(&self) -> Result<()> {
        let period = self
            .time_period
            .ok_or_else(|| Error::missing_field("timePeriod"))?;
        if !period.is_breakdown() {
            return Ok(());
        }
        let filters = self.filter_list();
        if filters.is_empty() {
            return Err(Error::invalid_value(
                "filters",
                "daily, weekly, and monthly time periods require at least one filter",
            ));
        }
        for filter in &filters {
            if !FILTER_PATTERN.is_match(filter) {
                return Err(Error::invalid_value(
                    "filters",
                    format!("filter '{filter}' must be a single word without special symbols"),
                ));
            }
        }
        Ok(())
    }

    fn validate_date_range(&self) -> Result<()> {
        let start = parse_date("startDate", self.start_date.as_deref())?;
        let end = parse_date("endDate", self.end_date.as_deref())?;
        if start > end {
            return Err(Error::invalid_value(
                "startDate",
                "startDate must not be later than endDate",
            ));
        }
        Ok(())
    }
}

fn parse_date(field: &str, value: Option<&str>) -> Result<NaiveDate> {
    let value = value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Error::missing_field(field))?;
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| Error::invalid_value(field, format!("'{value}' is not a YYYYMMDD date")))
}

// ============================================================================
// Streaming source config
// ============================================================================

/// Poll interval choices, in the form the host UI presents them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PullFrequency {
    #[default]
    #[serde(rename = "15 min")]
    FifteenMinutes,
    #[serde(rename = "30 min")]
    ThirtyMinutes,
    #[serde(rename = "1 hour")]
    OneHour,
    #[serde(rename = "4 hours")]
    FourHours,
    #[serde(rename = "8 hours")]
    EightHours,
    #[serde(rename = "12 hours")]
    TwelveHours,
    #[serde(rename = "1 day")]
    OneDay,
}

impl PullFrequency {
    /// The interval in minutes.
    pub fn minutes(&self) -> u64 {
        match self {
            PullFrequency::FifteenMinutes => 15,
            PullFrequency::ThirtyMinutes => 30,
            PullFrequency::OneHour => 60,
            PullFrequency::FourHours => 240,
            PullFrequency::EightHours => 480,
            PullFrequency::TwelveHours => 720,
            PullFrequency::OneDay => 1440,
        }
    }
}

impl FromStr for PullFrequency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "15 min" => Ok(PullFrequency::FifteenMinutes),
            "30 min" => Ok(PullFrequency::ThirtyMinutes),
            "1 hour" => Ok(PullFrequency::OneHour),
            "4 hours" => Ok(PullFrequency::FourHours),
            "8 hours" => Ok(PullFrequency::EightHours),
            "12 hours" => Ok(PullFrequency::TwelveHours),
            "1 day" => Ok(PullFrequency::OneDay),
            other => Err(Error::invalid_value(
                "pullFrequency",
                format!("'{other}' is not a valid pull frequency"),
            )),
        }
    }
}

/// Configuration for a streaming read job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamingSourceConfig {
    #[serde(flatten)]
    pub source: SourceConfig,

    /// Minutes to sleep between polls once the stream is drained.
    #[serde(
        rename = "pollFrequencyMinutes",
        default = "default_poll_frequency_minutes"
    )]
    pub poll_frequency_minutes: u64,
}

impl StreamingSourceConfig {
    /// Streaming config polling at the default frequency.
    pub fn new(source: SourceConfig) -> Self {
        Self {
            source,
            poll_frequency_minutes: DEFAULT_POLL_FREQUENCY_MINUTES,
        }
    }

    /// Streaming config polling at one of the UI frequency choices.
    pub fn with_pull_frequency(source: SourceConfig, frequency: PullFrequency) -> Self {
        Self {
            source,
            poll_frequency_minutes: frequency.minutes(),
        }
    }

    /// The inter-poll sleep.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_frequency_minutes * 60)
    }

    pub fn validate(&self) -> Result<()> {
        if self.poll_frequency_minutes == 0 {
            return Err(Error::invalid_value(
                "pollFrequencyMinutes",
                "must be greater than zero",
            ));
        }
        self.source.validate()
    }
}

// ============================================================================
// Sink config
// ============================================================================

/// Configuration for a write job.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SinkConfig {
    /// Object type to write.
    pub object_type: ObjectType,

    /// OAuth2 access token. Takes precedence over the API key when both
    /// are set.
    #[serde(default)]
    pub access_token: Option<String>,

    /// API key, sent as the `hapikey` query parameter.
    #[serde(default)]
    pub api_key: Option<String>,

    /// API server to talk to.
    #[serde(default = "default_api_server_url")]
    pub api_server_url: String,

    /// Name of the record field holding the JSON payload to submit.
    pub object_field: String,
}

impl SinkConfig {
    /// Resolve the configured credential.
    pub fn credential(&self) -> Result<Credential> {
        Credential::from_parts(self.access_token.clone(), self.api_key.clone())
    }

    /// Check that this object type can be written and the payload field
    /// is named.
    pub fn validate(&self, table: &EndpointTable) -> Result<()> {
        if self.object_field.is_empty() {
            return Err(Error::missing_field("objectField"));
        }
        let profile = table.profile(self.object_type)?;
        if profile.write_path.is_none() {
            return Err(Error::config(format!(
                "object type '{}' does not support writes",
                self.object_type
            )));
        }
        Ok(())
    }
}
