use crate::models::{
    BoxPlotSummary, ChartOutput, ChartRequest, DescriptiveStats, DomainCount, DomainSort,
    DonutSlice, EnrichedUserRecord, HistogramBin, NameLengthSnapshot, ScatterPoint, TopName,
    ViolinGroup,
};

const MIN_BINS: u32 = 5;
const MAX_BINS: u32 = 20;
const MAX_HOLE: f64 = 0.8;
const TOP_NAMES: usize = 5;

/// Dispatches one chart render. Pure and deterministic given `data` and the
/// request; every kind degrades to an empty payload on empty input.
pub fn render(data: &[EnrichedUserRecord], request: &ChartRequest) -> ChartOutput {
    match request {
        ChartRequest::Histogram { nbins, color } => render_histogram(data, *nbins, color),
        ChartRequest::HorizontalBars { sort, color } => ChartOutput::HorizontalBars {
            bars: sorted_domain_counts(data, *sort),
            color: color.clone(),
        },
        ChartRequest::Donut { hole, show_labels } => render_donut(data, *hole, *show_labels),
        ChartRequest::InteractiveTable {
            min_length,
            domains,
        } => render_table(data, *min_length, domains),
        ChartRequest::AdvancedStats => render_advanced_stats(data),
        ChartRequest::Violin { domains } => ChartOutput::Violin {
            groups: violin_groups(data, domains),
        },
        ChartRequest::Scatter { color } => ChartOutput::Scatter {
            points: data
                .iter()
                .map(|record| ScatterPoint {
                    id: record.base.id,
                    name_length: record.name_length,
                    name: record.base.name.clone(),
                    email: record.base.email.clone(),
                })
                .collect(),
            color: color.clone(),
        },
    }
}

fn render_histogram(data: &[EnrichedUserRecord], nbins: u32, color: &str) -> ChartOutput {
    let nbins = nbins.clamp(MIN_BINS, MAX_BINS);
    let values: Vec<i64> = data.iter().map(|record| record.name_length).collect();

    if values.is_empty() {
        return ChartOutput::Histogram {
            bins: Vec::new(),
            stats: None,
            color: color.to_string(),
        };
    }

    let min = values.iter().copied().min().unwrap_or(0);
    let max = values.iter().copied().max().unwrap_or(0);
    // Degenerate range: a single unit-width bin holds everything.
    let width = if max > min {
        (max - min) as f64 / nbins as f64
    } else {
        1.0
    };

    let mut bins: Vec<HistogramBin> = (0..nbins)
        .map(|index| HistogramBin {
            start: min as f64 + width * index as f64,
            end: min as f64 + width * (index + 1) as f64,
            count: 0,
        })
        .collect();
    for value in &values {
        let index = (((*value - min) as f64 / width) as usize).min(nbins as usize - 1);
        bins[index].count += 1;
    }

    let mean = values.iter().sum::<i64>() as f64 / values.len() as f64;
    ChartOutput::Histogram {
        bins,
        stats: Some(NameLengthSnapshot {
            min,
            max,
            mean: (mean * 10.0).round() / 10.0,
            median: median(&values),
        }),
        color: color.to_string(),
    }
}

fn render_donut(data: &[EnrichedUserRecord], hole: f64, show_labels: bool) -> ChartOutput {
    let mut counts = domain_counts(data);
    counts.sort_by(|a, b| b.count.cmp(&a.count));

    let total: u64 = counts.iter().map(|entry| entry.count).sum();
    let slices = counts
        .into_iter()
        .map(|entry| DonutSlice {
            percent: entry.count as f64 * 100.0 / total as f64,
            domain: entry.domain,
            count: entry.count,
        })
        .collect();

    ChartOutput::Donut {
        slices,
        hole: hole.clamp(0.0, MAX_HOLE),
        show_labels,
    }
}

fn render_table(data: &[EnrichedUserRecord], min_length: i64, domains: &[String]) -> ChartOutput {
    let rows: Vec<EnrichedUserRecord> = data
        .iter()
        .filter(|record| record.name_length >= min_length)
        .filter(|record| {
            record
                .email_domain
                .as_ref()
                .is_some_and(|domain| domains.iter().any(|allowed| allowed == domain))
        })
        .cloned()
        .collect();

    ChartOutput::InteractiveTable {
        shown: rows.len(),
        total: data.len(),
        rows,
    }
}

fn render_advanced_stats(data: &[EnrichedUserRecord]) -> ChartOutput {
    let values: Vec<i64> = data.iter().map(|record| record.name_length).collect();
    let summary = describe(&values);
    let box_plot = match (&summary.min, &summary.q25, &summary.median, &summary.q75, &summary.max) {
        (Some(min), Some(q1), Some(median), Some(q3), Some(max)) => Some(BoxPlotSummary {
            min: *min,
            q1: *q1,
            median: *median,
            q3: *q3,
            max: *max,
        }),
        _ => None,
    };

    ChartOutput::AdvancedStats {
        summary,
        longest_names: top_longest_names(data),
        box_plot,
    }
}

/// Per-domain counts in first-seen order. Rows without a domain are skipped.
fn domain_counts(data: &[EnrichedUserRecord]) -> Vec<DomainCount> {
    let mut counts: Vec<DomainCount> = Vec::new();
    for record in data {
        let Some(domain) = &record.email_domain else {
            continue;
        };
        match counts.iter_mut().find(|entry| &entry.domain == domain) {
            Some(entry) => entry.count += 1,
            None => counts.push(DomainCount {
                domain: domain.clone(),
                count: 1,
            }),
        }
    }
    counts
}

fn sorted_domain_counts(data: &[EnrichedUserRecord], sort: DomainSort) -> Vec<DomainCount> {
    let mut counts = domain_counts(data);
    match sort {
        DomainSort::Alphabetical => counts.sort_by(|a, b| a.domain.cmp(&b.domain)),
        DomainSort::Count => counts.sort_by(|a, b| a.count.cmp(&b.count)),
    }
    counts
}

fn violin_groups(data: &[EnrichedUserRecord], domains: &[String]) -> Vec<ViolinGroup> {
    domains
        .iter()
        .filter_map(|domain| {
            let lengths: Vec<i64> = data
                .iter()
                .filter(|record| record.email_domain.as_deref() == Some(domain.as_str()))
                .map(|record| record.name_length)
                .collect();
            if lengths.is_empty() {
                None
            } else {
                Some(ViolinGroup {
                    domain: domain.clone(),
                    lengths,
                })
            }
        })
        .collect()
}

/// Top records by `name_length`, ties broken by original position. Fewer
/// records than the cutoff returns them all.
fn top_longest_names(data: &[EnrichedUserRecord]) -> Vec<TopName> {
    let mut order: Vec<usize> = (0..data.len()).collect();
    order.sort_by(|a, b| data[*b].name_length.cmp(&data[*a].name_length).then(a.cmp(b)));
    order
        .into_iter()
        .take(TOP_NAMES)
        .map(|index| TopName {
            name: data[index].base.name.clone(),
            name_length: data[index].name_length,
        })
        .collect()
}

/// Descriptive statistics with pandas `describe` semantics: sample standard
/// deviation and linearly interpolated quartiles.
pub fn describe(values: &[i64]) -> DescriptiveStats {
    if values.is_empty() {
        return DescriptiveStats {
            count: 0,
            mean: None,
            std: None,
            min: None,
            q25: None,
            median: None,
            q75: None,
            max: None,
        };
    }

    let mut sorted: Vec<f64> = values.iter().map(|value| *value as f64).collect();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let count = sorted.len();
    let mean = sorted.iter().sum::<f64>() / count as f64;
    let std = if count > 1 {
        let variance = sorted
            .iter()
            .map(|value| (value - mean).powi(2))
            .sum::<f64>()
            / (count - 1) as f64;
        Some(variance.sqrt())
    } else {
        None
    };

    DescriptiveStats {
        count: count as u64,
        mean: Some(mean),
        std,
        min: Some(sorted[0]),
        q25: Some(quantile(&sorted, 0.25)),
        median: Some(quantile(&sorted, 0.5)),
        q75: Some(quantile(&sorted, 0.75)),
        max: Some(sorted[count - 1]),
    }
}

fn median(values: &[i64]) -> f64 {
    let mut sorted: Vec<f64> = values.iter().map(|value| *value as f64).collect();
    sorted.sort_by(|a, b| a.total_cmp(b));
    quantile(&sorted, 0.5)
}

fn quantile(sorted: &[f64], q: f64) -> f64 {
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let fraction = position - lower as f64;
    if lower + 1 < sorted.len() {
        sorted[lower] + fraction * (sorted[lower + 1] - sorted[lower])
    } else {
        sorted[lower]
    }
}
