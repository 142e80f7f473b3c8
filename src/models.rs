use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Column order of the `users` table and of CSV exports.
pub const BASE_COLUMNS: [&str; 6] = ["id", "name", "username", "email", "phone", "website"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub website: String,
}

/// A stored record plus the two derived columns. Never persisted; rebuilt on
/// every load by [`crate::features::derive`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedUserRecord {
    #[serde(flatten)]
    pub base: UserRecord,
    pub name_length: i64,
    pub email_domain: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DomainSort {
    Count,
    Alphabetical,
}

impl DomainSort {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Count => "count",
            Self::Alphabetical => "alphabetical",
        }
    }
}

/// One chart render request. Kind-specific parameters live on the variant;
/// a request carries no memory between calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ChartRequest {
    Histogram {
        nbins: u32,
        color: String,
    },
    HorizontalBars {
        sort: DomainSort,
        color: String,
    },
    Donut {
        hole: f64,
        show_labels: bool,
    },
    InteractiveTable {
        min_length: i64,
        domains: Vec<String>,
    },
    AdvancedStats,
    Violin {
        domains: Vec<String>,
    },
    Scatter {
        color: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NameLengthSnapshot {
    pub min: i64,
    pub max: i64,
    /// Mean rounded to one decimal place.
    pub mean: f64,
    pub median: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainCount {
    pub domain: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonutSlice {
    pub domain: String,
    pub count: u64,
    pub percent: f64,
}

/// Descriptive statistics of `name_length`, pandas `describe` semantics:
/// sample standard deviation, linearly interpolated quartiles. Everything but
/// the count is undefined on an empty set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescriptiveStats {
    pub count: u64,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub median: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopName {
    pub name: String,
    pub name_length: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxPlotSummary {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViolinGroup {
    pub domain: String,
    pub lengths: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScatterPoint {
    pub id: i64,
    pub name_length: i64,
    pub name: String,
    pub email: String,
}

/// Renderer-ready payload for one chart, fully computed per request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ChartOutput {
    Histogram {
        bins: Vec<HistogramBin>,
        stats: Option<NameLengthSnapshot>,
        color: String,
    },
    HorizontalBars {
        bars: Vec<DomainCount>,
        color: String,
    },
    Donut {
        slices: Vec<DonutSlice>,
        hole: f64,
        show_labels: bool,
    },
    InteractiveTable {
        rows: Vec<EnrichedUserRecord>,
        shown: usize,
        total: usize,
    },
    AdvancedStats {
        summary: DescriptiveStats,
        longest_names: Vec<TopName>,
        box_plot: Option<BoxPlotSummary>,
    },
    Violin {
        groups: Vec<ViolinGroup>,
    },
    Scatter {
        points: Vec<ScatterPoint>,
        color: String,
    },
}

/// Always-visible status metrics for the currently loaded set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetOverview {
    pub record_count: usize,
    pub column_count: usize,
    pub unique_domains: usize,
    pub loaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshSummary {
    pub fetched: usize,
    pub stored: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadSummary {
    pub loaded: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedFile {
    pub file_name: String,
    pub content: Vec<u8>,
}
