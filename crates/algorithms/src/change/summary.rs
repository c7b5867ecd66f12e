//! Aggregate statistics over a set of change records

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write as _;

use super::{ChangeRecord, ChangeType};

/// Coast-wide summary of a change analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeSummary {
    /// Transects generated along the baseline
    pub total_transects: usize,
    /// Transects with a change record (at least two observed years)
    pub transects_with_change: usize,
    pub mean_epr: Option<f64>,
    /// Sample standard deviation (n - 1); `None` below two records
    pub std_epr: Option<f64>,
    /// Most negative EPR
    pub max_erosion: Option<f64>,
    /// Most positive EPR
    pub max_accretion: Option<f64>,
    pub class_counts: BTreeMap<ChangeType, usize>,
}

impl ChangeSummary {
    pub fn from_records(total_transects: usize, records: &[ChangeRecord]) -> Self {
        let n = records.len();
        let eprs: Vec<f64> = records.iter().map(|r| r.epr).collect();

        let mean_epr = (n > 0).then(|| eprs.iter().sum::<f64>() / n as f64);
        let std_epr = mean_epr.filter(|_| n > 1).map(|mean| {
            let ss: f64 = eprs.iter().map(|e| (e - mean).powi(2)).sum();
            (ss / (n - 1) as f64).sqrt()
        });
        let max_erosion = eprs.iter().copied().reduce(f64::min);
        let max_accretion = eprs.iter().copied().reduce(f64::max);

        let mut class_counts: BTreeMap<ChangeType, usize> = [
            (ChangeType::Erosion, 0),
            (ChangeType::Stable, 0),
            (ChangeType::Accretion, 0),
        ]
        .into_iter()
        .collect();
        for r in records {
            *class_counts.entry(r.change_type).or_insert(0) += 1;
        }

        Self {
            total_transects,
            transects_with_change: n,
            mean_epr,
            std_epr,
            max_erosion,
            max_accretion,
            class_counts,
        }
    }

    pub fn count(&self, class: ChangeType) -> usize {
        self.class_counts.get(&class).copied().unwrap_or(0)
    }

    /// Share of change records in `class`, in percent
    pub fn percent(&self, class: ChangeType) -> f64 {
        if self.transects_with_change == 0 {
            return 0.0;
        }
        100.0 * self.count(class) as f64 / self.transects_with_change as f64
    }

    /// Plain-text report
    pub fn report(&self, reference_year: i32, years: &[i32]) -> String {
        let mut out = String::new();
        let rule = "=".repeat(60);
        let fmt_opt = |v: Option<f64>| v.map_or_else(|| "n/a".to_string(), |v| format!("{:.3}", v));

        let _ = writeln!(out, "COASTAL CHANGE ANALYSIS SUMMARY");
        let _ = writeln!(out, "{}", rule);
        let _ = writeln!(out, "{:.<40} {}", "Reference year ", reference_year);
        let years: Vec<String> = years.iter().map(|y| y.to_string()).collect();
        let _ = writeln!(out, "{:.<40} {}", "Years analysed ", years.join(", "));
        let _ = writeln!(out, "{:.<40} {}", "Transects generated ", self.total_transects);
        let _ = writeln!(out, "{:.<40} {}", "Transects with change data ", self.transects_with_change);
        let _ = writeln!(out);
        let _ = writeln!(out, "End point rate (units/year)");
        let _ = writeln!(out, "{}", "-".repeat(60));
        let _ = writeln!(out, "{:.<40} {}", "Mean ", fmt_opt(self.mean_epr));
        let _ = writeln!(out, "{:.<40} {}", "Std. deviation ", fmt_opt(self.std_epr));
        let _ = writeln!(out, "{:.<40} {}", "Maximum erosion ", fmt_opt(self.max_erosion));
        let _ = writeln!(out, "{:.<40} {}", "Maximum accretion ", fmt_opt(self.max_accretion));
        let _ = writeln!(out);
        let _ = writeln!(out, "Classification");
        let _ = writeln!(out, "{}", "-".repeat(60));
        for class in [ChangeType::Erosion, ChangeType::Stable, ChangeType::Accretion] {
            let _ = writeln!(
                out,
                "{:.<40} {} ({:.1}%)",
                format!("{} ", class),
                self.count(class),
                self.percent(class)
            );
        }
        out
    }
}
