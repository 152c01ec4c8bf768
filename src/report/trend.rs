//! Citation trend over recent publication years.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::scholar::{round_tenth, Paper};

/// First year considered at all.
const WINDOW_START: i32 = 2019;
/// First year counted as "recent"; earlier window years are "older".
const RECENT_START: i32 = 2022;
/// Growth (in percent) beyond which a topic is heating up or cooling down.
const DIRECTION_THRESHOLD: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    HeatingUp,
    CoolingDown,
    Stable,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct ChartData {
    pub years: Vec<i32>,
    pub citations: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TrendAnalysis {
    pub trend_direction: TrendDirection,
    pub growth_percentage: f64,
    pub recent_avg_citations: f64,
    pub older_avg_citations: f64,
    pub chart_data: ChartData,
    pub total_papers_analyzed: usize,
}

/// Compare average citations of recent papers against older ones.
///
/// Each year in the window contributes its own average, and the recent and
/// older figures are averages of those yearly averages.
pub fn calculate_trend(papers: &[Paper]) -> TrendAnalysis {
    let mut per_year: BTreeMap<i32, (u64, u32)> = BTreeMap::new();
    for paper in papers {
        if let Some(year) = paper.year.filter(|y| *y >= WINDOW_START) {
            let slot = per_year.entry(year).or_default();
            slot.0 += paper.citation_count;
            slot.1 += 1;
        }
    }

    let yearly: BTreeMap<i32, f64> = per_year
        .into_iter()
        .map(|(year, (citations, count))| (year, citations as f64 / f64::from(count)))
        .collect();

    let recent_avg = mean(yearly.range(RECENT_START..).map(|(_, avg)| *avg));
    let older_avg = mean(yearly.range(..RECENT_START).map(|(_, avg)| *avg));

    let growth = if older_avg > 0.0 {
        (recent_avg - older_avg) / older_avg * 100.0
    } else if recent_avg > 0.0 {
        100.0
    } else {
        0.0
    };

    let trend_direction = if growth > DIRECTION_THRESHOLD {
        TrendDirection::HeatingUp
    } else if growth < -DIRECTION_THRESHOLD {
        TrendDirection::CoolingDown
    } else {
        TrendDirection::Stable
    };

    TrendAnalysis {
        trend_direction,
        growth_percentage: round_tenth(growth),
        recent_avg_citations: round_tenth(recent_avg),
        older_avg_citations: round_tenth(older_avg),
        chart_data: ChartData {
            years: yearly.keys().copied().collect(),
            citations: yearly.values().copied().collect(),
        },
        total_papers_analyzed: papers.len(),
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0u32), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / f64::from(count)
    }
}
