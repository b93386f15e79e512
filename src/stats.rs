//! Aggregations behind the table, bar, box and scatter views.
//!
//! Everything here is stateless and re-run on demand against the cached
//! respondent slice.

use serde::Serialize;

use crate::data::model::{Level, Respondent, Sex};
use crate::view::{Feature, Group};

/// Number of equal-width job prestige intervals.
pub const PRESTIGE_BINS: usize = 6;

/// Two-decimal rounding, ties to even.
fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Mean of the present values, `None` when all are missing.
pub fn mean(values: impl IntoIterator<Item = Option<f64>>) -> Option<f64> {
    let (sum, n) = values
        .into_iter()
        .flatten()
        .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

// ---------------------------------------------------------------------------
// Grouped means
// ---------------------------------------------------------------------------

/// Averages of the economic and education measures for one sex.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SexMeans {
    pub sex: Sex,
    pub income: Option<f64>,
    pub job_prestige: Option<f64>,
    pub socioeconomic_index: Option<f64>,
    pub education: Option<f64>,
}

/// One row per sex present, means rounded to two decimals, nulls ignored.
pub fn grouped_means(respondents: &[Respondent]) -> Vec<SexMeans> {
    Sex::ALL
        .into_iter()
        .filter_map(|sex| {
            let rows: Vec<&Respondent> = respondents
                .iter()
                .filter(|r| r.sex == Some(sex))
                .collect();
            if rows.is_empty() {
                return None;
            }
            let avg = |f: fn(&Respondent) -> Option<f64>| mean(rows.iter().map(|r| f(r))).map(round2);
            Some(SexMeans {
                sex,
                income: avg(|r| r.income),
                job_prestige: avg(|r| r.job_prestige),
                socioeconomic_index: avg(|r| r.socioeconomic_index),
                education: avg(|r| r.education),
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Prestige-range binning
// ---------------------------------------------------------------------------

/// One equal-width prestige interval. Right-closed; the first also includes
/// its lower edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Interval {
    pub lower: f64,
    pub upper: f64,
    pub closed_lower: bool,
}

impl Interval {
    pub fn label(&self) -> String {
        let open = if self.closed_lower { '[' } else { '(' };
        format!("{open}{:.2}, {:.2}]", self.lower, self.upper)
    }

    pub fn contains(&self, value: f64) -> bool {
        let above = if self.closed_lower {
            value >= self.lower
        } else {
            value > self.lower
        };
        above && value <= self.upper
    }
}

/// `n` equal-width intervals spanning `[min, max]`.
///
/// A zero-width range is widened by 0.1% on each side first.
pub fn equal_width_intervals(min: f64, max: f64, n: usize) -> Vec<Interval> {
    let (lo, hi) = if max > min {
        (min, max)
    } else {
        let pad = |v: f64| if v == 0.0 { 0.001 } else { v.abs() * 0.001 };
        (min - pad(min), max + pad(max))
    };
    let width = (hi - lo) / n as f64;
    (0..n)
        .map(|k| Interval {
            lower: lo + width * k as f64,
            upper: if k + 1 == n { hi } else { lo + width * (k + 1) as f64 },
            closed_lower: k == 0,
        })
        .collect()
}

/// Position of `value` among `intervals`, if any contains it.
pub fn interval_index(intervals: &[Interval], value: f64) -> Option<usize> {
    intervals.iter().position(|i| i.contains(value))
}

/// A complete case assigned to a prestige interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BinnedRespondent {
    pub interval: usize,
    pub sex: Sex,
    pub income: f64,
    pub job_prestige: f64,
}

/// Incomes for one (interval, sex) cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinGroup {
    pub interval: usize,
    pub sex: Sex,
    pub incomes: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PrestigeBinning {
    pub intervals: Vec<Interval>,
    pub rows: Vec<BinnedRespondent>,
}

impl PrestigeBinning {
    /// Rows grouped by (interval, sex), intervals ascending, empty cells skipped.
    pub fn groups(&self) -> Vec<BinGroup> {
        let mut groups = Vec::new();
        for interval in 0..self.intervals.len() {
            for sex in Sex::ALL {
                let incomes: Vec<f64> = self
                    .rows
                    .iter()
                    .filter(|r| r.interval == interval && r.sex == sex)
                    .map(|r| r.income)
                    .collect();
                if !incomes.is_empty() {
                    groups.push(BinGroup {
                        interval,
                        sex,
                        incomes,
                    });
                }
            }
        }
        groups
    }
}

/// Drop rows missing income, sex or job prestige, then split job prestige
/// into [`PRESTIGE_BINS`] equal-width intervals over its observed range.
pub fn prestige_bins(respondents: &[Respondent]) -> PrestigeBinning {
    let complete: Vec<(Sex, f64, f64)> = respondents
        .iter()
        .filter_map(|r| Some((r.sex?, r.income?, r.job_prestige?)))
        .collect();
    if complete.is_empty() {
        return PrestigeBinning::default();
    }

    let (min, max) = complete
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (_, _, p)| {
            (lo.min(*p), hi.max(*p))
        });
    let intervals = equal_width_intervals(min, max, PRESTIGE_BINS);
    let rows = complete
        .into_iter()
        .filter_map(|(sex, income, job_prestige)| {
            Some(BinnedRespondent {
                interval: interval_index(&intervals, job_prestige)?,
                sex,
                income,
                job_prestige,
            })
        })
        .collect();

    PrestigeBinning { intervals, rows }
}

// ---------------------------------------------------------------------------
// Grouped counts
// ---------------------------------------------------------------------------

/// Respondents giving `level` within one group category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountCell {
    pub level: Level,
    pub group: &'static str,
    pub count: usize,
}

/// Counts of `feature` answers per `group` category.
///
/// Rows follow the feature's declared scale, then the group's category
/// order; categories never observed with an answer are left out, zero cells
/// for observed categories are kept.
pub fn grouped_counts(respondents: &[Respondent], feature: Feature, group: Group) -> Vec<CountCell> {
    let answered: Vec<(Level, &'static str)> = respondents
        .iter()
        .filter_map(|r| Some((feature.value(r)?, group.value(r)?)))
        .collect();
    let present: Vec<&'static str> = group
        .categories()
        .into_iter()
        .filter(|c| answered.iter().any(|(_, g)| g == c))
        .collect();

    feature
        .scale()
        .iter()
        .flat_map(|level| {
            let answered = &answered;
            present.iter().map(move |&category| CountCell {
                level,
                group: category,
                count: answered
                    .iter()
                    .filter(|(l, g)| *l == level && *g == category)
                    .count(),
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Distribution summaries
// ---------------------------------------------------------------------------

/// Linear-interpolation percentile of sorted values, `p` in 0..=100.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return f64::NAN;
    }
    if n == 1 {
        return sorted[0];
    }
    let rank = (p / 100.0) * (n - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = (rank.ceil() as usize).min(n - 1);
    let frac = rank - lower as f64;
    sorted[lower] * (1.0 - frac) + sorted[upper] * frac
}

/// Five-number summary with 1.5·IQR whiskers, as drawn by a box plot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxSummary {
    pub count: usize,
    pub mean: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub lower_whisker: f64,
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

impl BoxSummary {
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let q1 = percentile(&sorted, 25.0);
        let median = percentile(&sorted, 50.0);
        let q3 = percentile(&sorted, 75.0);
        let iqr = q3 - q1;
        let (low_fence, high_fence) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);

        let inside = sorted.iter().copied().filter(|v| (low_fence..=high_fence).contains(v));
        let lower_whisker = inside.clone().fold(f64::INFINITY, f64::min);
        let upper_whisker = inside.fold(f64::NEG_INFINITY, f64::max);
        let outliers = sorted
            .iter()
            .copied()
            .filter(|v| !(low_fence..=high_fence).contains(v))
            .collect();

        Some(BoxSummary {
            count: sorted.len(),
            mean: sorted.iter().sum::<f64>() / sorted.len() as f64,
            q1,
            median,
            q3,
            lower_whisker,
            upper_whisker,
            outliers,
        })
    }
}

/// Least-squares line `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Trendline {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: Option<f64>,
    pub count: usize,
}

impl Trendline {
    /// Fit by ordinary least squares; `None` with fewer than two distinct x.
    pub fn fit(points: &[(f64, f64)]) -> Option<Self> {
        let n = points.len();
        if n < 2 {
            return None;
        }
        let x_mean = points.iter().map(|p| p.0).sum::<f64>() / n as f64;
        let y_mean = points.iter().map(|p| p.1).sum::<f64>() / n as f64;
        let sxx: f64 = points.iter().map(|(x, _)| (x - x_mean).powi(2)).sum();
        if sxx == 0.0 {
            return None;
        }
        let sxy: f64 = points
            .iter()
            .map(|(x, y)| (x - x_mean) * (y - y_mean))
            .sum();
        let slope = sxy / sxx;
        let intercept = y_mean - slope * x_mean;

        let ss_tot: f64 = points.iter().map(|(_, y)| (y - y_mean).powi(2)).sum();
        let ss_res: f64 = points
            .iter()
            .map(|(x, y)| (y - (slope * x + intercept)).powi(2))
            .sum();
        let r_squared = (ss_tot > 0.0).then(|| 1.0 - ss_res / ss_tot);

        Some(Trendline {
            slope,
            intercept,
            r_squared,
            count: n,
        })
    }

    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::AGREEMENT;

    fn respondent(id: i64) -> Respondent {
        Respondent {
            id,
            weight: None,
            sex: None,
            education: None,
            education_class: None,
            region: None,
            age: None,
            income: None,
            job_prestige: None,
            mother_job_prestige: None,
            father_job_prestige: None,
            socioeconomic_index: None,
            satjob: None,
            relationship: None,
            male_breadwinner: None,
            men_bettersuited: None,
            child_suffer: None,
            men_overwork: None,
        }
    }

    fn person(sex: Sex, income: f64, prestige: f64, sei: f64, educ: f64) -> Respondent {
        Respondent {
            sex: Some(sex),
            income: Some(income),
            job_prestige: Some(prestige),
            socioeconomic_index: Some(sei),
            education: Some(educ),
            ..respondent(0)
        }
    }

    #[test]
    fn grouped_means_round_halves_to_even() {
        let rows: Vec<Respondent> = [22782.5, 30000.0, 30000.0, 30000.0]
            .into_iter()
            .map(|income| person(Sex::Male, income, 50.0, 40.0, 12.0))
            .collect();
        // 112782.5 / 4 = 28195.625
        assert_eq!(grouped_means(&rows)[0].income, Some(28195.62));
    }

    #[test]
    fn grouped_means_scenario() {
        let rows = vec![
            person(Sex::Male, 1000.0, 50.0, 40.0, 12.0),
            person(Sex::Male, 2000.0, 60.0, 50.0, 16.0),
            person(Sex::Female, 1500.0, 55.0, 45.0, 14.0),
        ];
        let means = grouped_means(&rows);
        assert_eq!(means.len(), 2);
        for m in &means {
            assert_eq!(m.income, Some(1500.0));
            assert_eq!(m.job_prestige, Some(55.0));
            assert_eq!(m.socioeconomic_index, Some(45.0));
            assert_eq!(m.education, Some(14.0));
        }
        assert_eq!(means[0].sex, Sex::Female);
        assert_eq!(means[1].sex, Sex::Male);
    }

    #[test]
    fn grouped_means_ignore_nulls_and_round() {
        let mut a = person(Sex::Male, 1.0, 10.0, 1.0, 1.0);
        a.income = None;
        let b = person(Sex::Male, 2.0, 20.0, 2.0, 2.0);
        let c = person(Sex::Male, 3.0, 21.0, 2.0, 2.0);
        let means = grouped_means(&[a, b, c]);
        assert_eq!(means.len(), 1);
        assert_eq!(means[0].income, Some(2.5));
        assert_eq!(means[0].job_prestige, Some(17.0));
        assert_eq!(means[0].socioeconomic_index, Some(1.67));
    }

    #[test]
    fn prestige_binning_scenario() {
        let rows: Vec<Respondent> = [20.0, 30.0, 40.0, 70.0, 80.0, 90.0]
            .into_iter()
            .map(|p| person(Sex::Female, 100.0, p, 1.0, 12.0))
            .collect();
        let binning = prestige_bins(&rows);
        assert_eq!(binning.intervals.len(), 6);
        let width = binning.intervals[0].upper - binning.intervals[0].lower;
        assert!((width - 70.0 / 6.0).abs() < 1e-9);

        let bins: Vec<usize> = binning.rows.iter().map(|r| r.interval).collect();
        assert_eq!(bins, vec![0, 0, 1, 4, 5, 5]);
        assert_eq!(binning.intervals[0].label(), "[20.00, 31.67]");
        assert_eq!(binning.intervals[5].label(), "(78.33, 90.00]");
    }

    #[test]
    fn prestige_binning_drops_incomplete_rows() {
        let mut no_income = person(Sex::Male, 1.0, 50.0, 1.0, 1.0);
        no_income.income = None;
        let mut no_sex = person(Sex::Male, 1.0, 60.0, 1.0, 1.0);
        no_sex.sex = None;
        let kept = person(Sex::Male, 5.0, 70.0, 1.0, 1.0);
        let binning = prestige_bins(&[no_income, no_sex, kept]);
        assert_eq!(binning.rows.len(), 1);
        // Single observed value: the range is widened, not collapsed.
        assert!(binning.intervals[0].lower < 70.0);
        assert!(binning.intervals[5].upper > 70.0);
        assert_eq!(binning.groups().len(), 1);
    }

    #[test]
    fn grouped_counts_follow_declared_scale() {
        let mut rows = Vec::new();
        for (label, sex) in [
            ("disagree", Sex::Male),
            ("agree", Sex::Female),
            ("agree", Sex::Male),
            ("strongly disagree", Sex::Female),
        ] {
            rows.push(Respondent {
                sex: Some(sex),
                male_breadwinner: AGREEMENT.level(label),
                ..respondent(0)
            });
        }
        let counts = grouped_counts(&rows, Feature::MaleBreadwinner, Group::Sex);
        let levels: Vec<&str> = counts.iter().map(|c| c.level.label()).collect();
        assert_eq!(
            levels,
            vec![
                "strongly agree",
                "strongly agree",
                "agree",
                "agree",
                "disagree",
                "disagree",
                "strongly disagree",
                "strongly disagree"
            ]
        );
        let total: usize = counts.iter().map(|c| c.count).sum();
        assert_eq!(total, 4);
        assert_eq!(counts[2].group, "female");
        assert_eq!(counts[2].count, 1);
    }

    #[test]
    fn box_summary_whiskers_and_outliers() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 100.0];
        let summary = BoxSummary::from_values(&values).unwrap();
        assert_eq!(summary.median, 5.0);
        assert_eq!(summary.q1, 3.0);
        assert_eq!(summary.q3, 7.0);
        assert_eq!(summary.lower_whisker, 1.0);
        assert_eq!(summary.upper_whisker, 8.0);
        assert_eq!(summary.outliers, vec![100.0]);
        assert!(BoxSummary::from_values(&[]).is_none());
    }

    #[test]
    fn trendline_fits_exact_line() {
        let points = [(1.0, 3.0), (2.0, 5.0), (3.0, 7.0)];
        let line = Trendline::fit(&points).unwrap();
        assert!((line.slope - 2.0).abs() < 1e-12);
        assert!((line.intercept - 1.0).abs() < 1e-12);
        assert_eq!(line.r_squared, Some(1.0));
        assert_eq!(line.predict(10.0), 21.0);
        assert!(Trendline::fit(&[(1.0, 1.0), (1.0, 2.0)]).is_none());
    }
}
