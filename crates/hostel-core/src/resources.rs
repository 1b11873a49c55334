//! Water and electricity usage analysis.
//!
//! Monthly readings are graded against fixed thresholds, compared with the
//! previous reading, and decorated with seasonal tips.

use serde::{Deserialize, Serialize};

use crate::records::ResourceUsage;

/// Monthly thresholds for one resource.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub normal: f64,
    pub high: f64,
    pub critical: f64,
}

/// Cubic metres per month.
pub const WATER: Thresholds = Thresholds {
    normal: 5.0,
    high: 7.0,
    critical: 10.0,
};

/// Kilowatt-hours per month.
pub const ELECTRICITY: Thresholds = Thresholds {
    normal: 300.0,
    high: 400.0,
    critical: 500.0,
};

/// Month-over-month increase (percent) that triggers a trend warning.
pub const TREND_WARNING_PERCENT: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UsageStatus {
    #[default]
    Normal,
    High,
    Critical,
}

impl UsageStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    const fn score_multiplier(self) -> f64 {
        match self {
            Self::Normal => 1.0,
            Self::High => 0.8,
            Self::Critical => 0.6,
        }
    }
}

impl std::fmt::Display for UsageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageAnalysis {
    pub recommendations: Vec<String>,
    pub status: UsageStatus,
    /// 0 to 100, higher is better.
    pub efficiency_score: u8,
}

fn push_all(out: &mut Vec<String>, lines: &[&str]) {
    out.extend(lines.iter().map(|l| (*l).to_string()));
}

fn percent_increase(current: f64, previous: f64) -> Option<f64> {
    (previous > 0.0).then(|| (current - previous) / previous * 100.0)
}

/// Analyze one month of usage.
///
/// `previous` is the most recent earlier reading, if any. `month` is the
/// calendar month (1 = January) used to pick seasonal tips.
pub fn analyze(
    water: f64,
    electricity: f64,
    previous: Option<&ResourceUsage>,
    month: u32,
) -> UsageAnalysis {
    let mut recommendations = Vec::new();
    let mut status = UsageStatus::Normal;

    if water > WATER.critical {
        status = UsageStatus::Critical;
        push_all(
            &mut recommendations,
            &[
                "URGENT: Your water usage is critically high. Immediate action required:",
                "• Check for water leaks in pipes and fixtures",
                "• Install water-saving devices in showers and taps",
                "• Consider shorter shower times",
            ],
        );
    } else if water > WATER.high {
        status = UsageStatus::High;
        push_all(
            &mut recommendations,
            &[
                "Your water consumption is above recommended levels:",
                "• Monitor tap usage and fix any drips",
                "• Use washing machines only with full loads",
                "• Consider collecting rainwater for plants",
            ],
        );
    }

    if electricity > ELECTRICITY.critical {
        status = UsageStatus::Critical;
        push_all(
            &mut recommendations,
            &[
                "URGENT: Your electricity usage is critically high:",
                "• Check for appliances running unnecessarily",
                "• Switch to energy-efficient LED bulbs",
                "• Minimize use of high-power devices",
            ],
        );
    } else if electricity > ELECTRICITY.high {
        status = status.max(UsageStatus::High);
        push_all(
            &mut recommendations,
            &[
                "Your electricity consumption is above average:",
                "• Use natural light when possible",
                "• Unplug devices when not in use",
                "• Consider using a power strip to reduce standby power",
            ],
        );
    }

    if let Some(prev) = previous {
        if let Some(increase) = percent_increase(water, prev.water_usage)
            .filter(|p| *p > TREND_WARNING_PERCENT)
        {
            recommendations.push(format!(
                "Water usage increased by {increase:.1}% from last month. Consider reviewing your usage patterns."
            ));
        }
        if let Some(increase) = percent_increase(electricity, prev.electricity_usage)
            .filter(|p| *p > TREND_WARNING_PERCENT)
        {
            recommendations.push(format!(
                "Electricity usage increased by {increase:.1}% from last month. Consider energy-saving measures."
            ));
        }
    }

    match month {
        6..=9 => push_all(
            &mut recommendations,
            &[
                "Summer energy-saving tips:",
                "• Use fans instead of AC when possible",
                "• Close curtains during peak heat hours",
                "• Use cold water for laundry when possible",
            ],
        ),
        12 | 1..=3 => push_all(
            &mut recommendations,
            &[
                "Winter energy-saving tips:",
                "• Use natural sunlight for heating",
                "• Seal windows and doors to prevent heat loss",
                "• Use warm clothing instead of increasing heating",
            ],
        ),
        _ => {}
    }

    UsageAnalysis {
        recommendations,
        status,
        efficiency_score: efficiency_score(water, electricity, status),
    }
}

/// Average of the per-resource scores, scaled down for high or critical usage.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn efficiency_score(water: f64, electricity: f64, status: UsageStatus) -> u8 {
    let water_score = (100.0 - water / WATER.normal * 50.0).max(0.0);
    let electricity_score = (100.0 - electricity / ELECTRICITY.normal * 50.0).max(0.0);
    let base = f64::midpoint(water_score, electricity_score);
    (base * status.score_multiplier()).round().clamp(0.0, 100.0) as u8
}
