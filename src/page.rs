//! Dashboard pages and the tabular views they hand to a renderer.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::color::ColorMap;
use crate::data::model::{Column, FieldValue, Respondent, Sex, Survey};
use crate::error::SurveyError;
use crate::stats::{self, BoxSummary, Trendline};
use crate::view::{Feature, Group, ViewSpec};

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Rows of named, typed cells.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    pub name: &'static str,
    pub columns: Vec<&'static str>,
    pub rows: Vec<Vec<FieldValue>>,
}

impl Table {
    fn new(name: &'static str, columns: &[&'static str]) -> Self {
        Self {
            name,
            columns: columns.to_vec(),
            rows: Vec::new(),
        }
    }

    fn push(&mut self, row: Vec<FieldValue>) {
        debug_assert_eq!(row.len(), self.columns.len());
        self.rows.push(row);
    }

    /// Cells of one named column.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &FieldValue> + '_> {
        let index = self.columns.iter().position(|c| *c == name)?;
        Some(self.rows.iter().map(move |row| &row[index]))
    }
}

/// One rendered page: data tables plus the metadata a chart needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct View {
    pub page: Page,
    pub title: &'static str,
    pub tables: Vec<Table>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spec: Option<ViewSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_map: Option<ColorMap>,
}

impl View {
    fn new(page: Page, tables: Vec<Table>) -> Self {
        Self {
            page,
            title: page.title(),
            tables,
            spec: None,
            color_map: None,
        }
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }
}

// ---------------------------------------------------------------------------
// Page – navigation target
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Page {
    Overview,
    Summary,
    Breadwinner,
    PrestigeIncome,
    Boxplots,
    PrestigeBins,
    Explore,
}

impl Page {
    pub const ALL: [Page; 7] = [
        Page::Overview,
        Page::Summary,
        Page::Breadwinner,
        Page::PrestigeIncome,
        Page::Boxplots,
        Page::PrestigeBins,
        Page::Explore,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            Page::Overview => "overview",
            Page::Summary => "summary",
            Page::Breadwinner => "breadwinner",
            Page::PrestigeIncome => "prestige-income",
            Page::Boxplots => "boxplots",
            Page::PrestigeBins => "prestige-bins",
            Page::Explore => "explore",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Page::Overview => "Overview",
            Page::Summary => "Average Economic & Education Metrics by Gender",
            Page::Breadwinner => "Agreement with 'Male Breadwinner' by Group",
            Page::PrestigeIncome => "Occupational Prestige vs. Income",
            Page::Boxplots => "Income & Job Prestige Distributions by Gender",
            Page::PrestigeBins => "Income by Job Prestige Range & Gender",
            Page::Explore => "Views on Gender Roles Across the United States in 2018",
        }
    }

    /// Derive this page's view. `feature` and `group` only affect [`Page::Explore`].
    pub fn render(self, survey: &Survey, feature: Feature, group: Group) -> View {
        let rows = survey.respondents();
        match self {
            Page::Overview => overview(survey),
            Page::Summary => summary(rows),
            Page::Breadwinner => explore(self, rows, Feature::MaleBreadwinner, Group::Sex),
            Page::PrestigeIncome => prestige_income(rows),
            Page::Boxplots => boxplots(rows),
            Page::PrestigeBins => prestige_bins(rows),
            Page::Explore => explore(self, rows, feature, group),
        }
    }
}

impl FromStr for Page {
    type Err = SurveyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Page::ALL
            .into_iter()
            .find(|p| p.slug() == s)
            .ok_or_else(|| SurveyError::InvalidSelection {
                kind: "page",
                value: s.to_string(),
                expected: Page::ALL.iter().map(|p| p.slug()).collect(),
            })
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

// ---------------------------------------------------------------------------
// Page builders
// ---------------------------------------------------------------------------

/// Markdown sections shown above the overview tables.
const OVERVIEW_SECTIONS: [(&str, &str); 2] = [
    (
        "The Gender Wage Gap in the U.S.",
        "In the United States, women on average continue to earn less than men. According to \
         a 2023 analysis by the **Pew Research Center**, women earned about 82% of what men \
         earned in 2022, a gap that has narrowed only slightly over the past two decades (in \
         2002, women earned roughly 80% as much as men). The gender wage gap has decreased \
         significantly since the early 1980s (when the disparity was much larger), but \
         progress has largely stalled in recent years.\n\n\
         Official data from the **U.S. Bureau of Labor Statistics** (BLS) show a similar pay \
         gap. In 2021, for example, the median weekly earnings of full-time female workers \
         were roughly 83% of those of male workers, meaning the typical woman earned about 83 \
         cents for every dollar earned by a man. This disparity persists across most \
         industries and occupations, indicating that the wage gap is a widespread phenomenon \
         and not confined to a single sector.",
    ),
    (
        "About the GSS",
        "The **General Social Survey (GSS)** is a long-running sociological survey of American \
         adults, conducted by NORC at the University of Chicago. Since 1972, the GSS has \
         collected data on a wide range of topics, from demographics and education to \
         behaviors and attitudes on social issues, using in-person interviews (and more \
         recently, online surveys) with a nationally representative sample of the U.S. \
         population. The survey is typically conducted every one to two years, which allows \
         researchers to track changes in U.S. society over time. GSS findings are widely used \
         in social science research and public policy discussions as a benchmark for \
         Americans' attitudes and experiences.",
    ),
];

fn overview(survey: &Survey) -> View {
    let mut narrative = Table::new("narrative", &["heading", "body"]);
    for (heading, body) in OVERVIEW_SECTIONS {
        narrative.push(vec![heading.into(), body.into()]);
    }

    let mut dataset = Table::new("dataset", &["respondents", "columns"]);
    dataset.push(vec![survey.len().into(), Column::ALL.len().into()]);

    let mut columns = Table::new("columns", &["column", "missing", "present"]);
    for (column, missing) in survey.null_counts() {
        columns.push(vec![
            column.name().into(),
            missing.into(),
            (survey.len() - missing).into(),
        ]);
    }
    View::new(Page::Overview, vec![narrative, dataset, columns])
}

fn summary(rows: &[Respondent]) -> View {
    let mut table = Table::new(
        "summary",
        &[
            "Sex",
            "Average Income ($)",
            "Average Job Prestige Score",
            "Average Socioeconomic Index",
            "Average Years of Education",
        ],
    );
    for m in stats::grouped_means(rows) {
        table.push(vec![
            m.sex.label().into(),
            m.income.into(),
            m.job_prestige.into(),
            m.socioeconomic_index.into(),
            m.education.into(),
        ]);
    }
    View::new(Page::Summary, vec![table])
}

fn explore(page: Page, rows: &[Respondent], feature: Feature, group: Group) -> View {
    let mut table = Table::new("counts", &[feature.column(), group.column(), "count"]);
    for cell in stats::grouped_counts(rows, feature, group) {
        table.push(vec![cell.level.label().into(), cell.group.into(), cell.count.into()]);
    }
    let mut view = View::new(page, vec![table]);
    view.spec = Some(ViewSpec::new(feature, group));
    view
}

fn prestige_income(rows: &[Respondent]) -> View {
    let mut points = Table::new(
        "points",
        &["job_prestige", "income", "sex", "education", "socioeconomic_index"],
    );
    let mut by_sex: Vec<(Sex, Vec<(f64, f64)>)> = Sex::ALL.iter().map(|s| (*s, Vec::new())).collect();
    for r in rows {
        let (Some(prestige), Some(income), Some(sex)) = (r.job_prestige, r.income, r.sex) else {
            continue;
        };
        points.push(vec![
            FieldValue::Float(prestige),
            FieldValue::Float(income),
            sex.label().into(),
            r.education.into(),
            r.socioeconomic_index.into(),
        ]);
        if let Some((_, xy)) = by_sex.iter_mut().find(|(s, _)| *s == sex) {
            xy.push((prestige, income));
        }
    }

    let mut trendlines = Table::new(
        "trendlines",
        &[
            "sex", "slope", "intercept", "r_squared", "count", "x_min", "x_max", "y_at_x_min",
            "y_at_x_max",
        ],
    );
    for (sex, xy) in &by_sex {
        let Some(line) = Trendline::fit(xy) else {
            continue;
        };
        let (x_min, x_max) = xy
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (x, _)| {
                (lo.min(*x), hi.max(*x))
            });
        trendlines.push(vec![
            sex.label().into(),
            FieldValue::Float(line.slope),
            FieldValue::Float(line.intercept),
            line.r_squared.into(),
            line.count.into(),
            FieldValue::Float(x_min),
            FieldValue::Float(x_max),
            FieldValue::Float(line.predict(x_min)),
            FieldValue::Float(line.predict(x_max)),
        ]);
    }

    let mut view = View::new(Page::PrestigeIncome, vec![points, trendlines]);
    view.color_map = Some(ColorMap::for_group(Group::Sex));
    view
}

const BOX_COLUMNS: [&str; 8] = [
    "count",
    "mean",
    "q1",
    "median",
    "q3",
    "lower_whisker",
    "upper_whisker",
    "outliers",
];

fn box_cells(summary: &BoxSummary) -> Vec<FieldValue> {
    vec![
        summary.count.into(),
        FieldValue::Float(summary.mean),
        FieldValue::Float(summary.q1),
        FieldValue::Float(summary.median),
        FieldValue::Float(summary.q3),
        FieldValue::Float(summary.lower_whisker),
        FieldValue::Float(summary.upper_whisker),
        summary.outliers.len().into(),
    ]
}

fn box_table(name: &'static str, rows: &[Respondent], value: fn(&Respondent) -> Option<f64>) -> Table {
    let mut columns = vec!["sex"];
    columns.extend(BOX_COLUMNS);
    let mut table = Table::new(name, &columns);
    for sex in Sex::ALL {
        let values: Vec<f64> = rows
            .iter()
            .filter(|r| r.sex == Some(sex))
            .filter_map(value)
            .collect();
        if let Some(summary) = BoxSummary::from_values(&values) {
            let mut row = vec![sex.label().into()];
            row.extend(box_cells(&summary));
            table.push(row);
        }
    }
    table
}

fn boxplots(rows: &[Respondent]) -> View {
    let tables = vec![
        box_table("income", rows, |r| r.income),
        box_table("job_prestige", rows, |r| r.job_prestige),
    ];
    let mut view = View::new(Page::Boxplots, tables);
    view.color_map = Some(ColorMap::for_group(Group::Sex));
    view
}

fn prestige_bins(rows: &[Respondent]) -> View {
    let binning = stats::prestige_bins(rows);

    let mut columns = vec!["prestige_range", "sex"];
    columns.extend(BOX_COLUMNS);
    let mut table = Table::new("income_by_prestige", &columns);
    for group in binning.groups() {
        let Some(summary) = BoxSummary::from_values(&group.incomes) else {
            continue;
        };
        let mut row = vec![
            FieldValue::Text(binning.intervals[group.interval].label()),
            group.sex.label().into(),
        ];
        row.extend(box_cells(&summary));
        table.push(row);
    }

    let mut view = View::new(Page::PrestigeBins, vec![table]);
    view.color_map = Some(ColorMap::for_group(Group::Sex));
    view
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{EducationClass, AGREEMENT};

    fn survey() -> Survey {
        let base = Respondent {
            id: 0,
            weight: Some(1.0),
            sex: None,
            education: None,
            education_class: None,
            region: None,
            age: Some(40.0),
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
        };
        let rows = [
            (Sex::Male, 1000.0, 50.0, 40.0, 12.0, "agree"),
            (Sex::Male, 2000.0, 60.0, 50.0, 16.0, "strongly disagree"),
            (Sex::Female, 1500.0, 55.0, 45.0, 14.0, "agree"),
        ];
        Survey::from_respondents(
            rows.iter()
                .enumerate()
                .map(|(i, (sex, income, prestige, sei, educ, fefam))| Respondent {
                    id: i as i64 + 1,
                    sex: Some(*sex),
                    income: Some(*income),
                    job_prestige: Some(*prestige),
                    socioeconomic_index: Some(*sei),
                    education: Some(*educ),
                    education_class: EducationClass::from_years(*educ),
                    male_breadwinner: AGREEMENT.level(fefam),
                    ..base.clone()
                })
                .collect(),
        )
    }

    #[test]
    fn summary_table_has_display_headers() {
        let view = Page::Summary.render(&survey(), Feature::Satjob, Group::Sex);
        let table = view.table("summary").unwrap();
        assert_eq!(table.columns[1], "Average Income ($)");
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0][0], FieldValue::Text("female".into()));
        assert_eq!(table.rows[1][1], FieldValue::Float(1500.0));
    }

    #[test]
    fn breadwinner_page_keeps_scale_order() {
        let view = Page::Breadwinner.render(&survey(), Feature::Satjob, Group::Region);
        let spec = view.spec.as_ref().unwrap();
        assert_eq!(spec.feature, Feature::MaleBreadwinner);
        assert_eq!(spec.group, Group::Sex);
        let levels: Vec<String> = view
            .table("counts")
            .unwrap()
            .column("male_breadwinner")
            .unwrap()
            .map(|v| v.to_string())
            .collect();
        assert_eq!(levels[0], "strongly agree");
        assert_eq!(levels[levels.len() - 1], "strongly disagree");
    }

    #[test]
    fn explore_uses_the_selection() {
        let view = Page::Explore.render(&survey(), Feature::ChildSuffer, Group::EducationClass);
        let spec = view.spec.unwrap();
        assert_eq!(spec.feature, Feature::ChildSuffer);
        // No child_suffer answers in the fixture, so no present categories.
        assert!(view.tables[0].rows.is_empty());
    }

    #[test]
    fn prestige_income_fits_a_line_per_sex() {
        let view = Page::PrestigeIncome.render(&survey(), Feature::Satjob, Group::Sex);
        assert_eq!(view.table("points").unwrap().rows.len(), 3);
        let lines = view.table("trendlines").unwrap();
        // Only the two male points define a line.
        assert_eq!(lines.rows.len(), 1);
        assert_eq!(lines.rows[0][0], FieldValue::Text("male".into()));
        assert_eq!(lines.rows[0][1].as_f64(), Some(100.0));
        // Endpoints of the drawn segment lie on the fitted line.
        assert_eq!(lines.column("y_at_x_min").unwrap().next(), Some(&FieldValue::Float(1000.0)));
        assert_eq!(lines.column("y_at_x_max").unwrap().next(), Some(&FieldValue::Float(2000.0)));
        assert!(view.color_map.is_some());
    }

    #[test]
    fn prestige_bins_page_labels_ranges() {
        let view = Page::PrestigeBins.render(&survey(), Feature::Satjob, Group::Sex);
        let table = view.table("income_by_prestige").unwrap();
        let ranges: Vec<String> = table
            .column("prestige_range")
            .unwrap()
            .map(|v| v.to_string())
            .collect();
        assert_eq!(ranges[0], "[50.00, 51.67]");
        assert_eq!(ranges.len(), 3);
    }

    #[test]
    fn overview_counts_missing_cells() {
        let view = Page::Overview.render(&survey(), Feature::Satjob, Group::Sex);
        let columns = view.table("columns").unwrap();
        let region = columns
            .rows
            .iter()
            .find(|row| row[0] == FieldValue::Text("region".into()))
            .unwrap();
        assert_eq!(region[1], FieldValue::Integer(3));
    }

    #[test]
    fn overview_leads_with_the_narrative() {
        let view = Page::Overview.render(&Survey::default(), Feature::Satjob, Group::Sex);
        assert_eq!(view.tables[0].name, "narrative");
        let headings: Vec<String> = view
            .table("narrative")
            .unwrap()
            .column("heading")
            .unwrap()
            .map(|v| v.to_string())
            .collect();
        assert_eq!(headings, ["The Gender Wage Gap in the U.S.", "About the GSS"]);
        let body = view.tables[0].rows[0][1].to_string();
        assert!(body.contains("82% of what men earned in 2022"));
        assert!(body.contains("\n\n"));
    }

    #[test]
    fn page_names_parse() {
        assert_eq!("prestige-bins".parse::<Page>().unwrap(), Page::PrestigeBins);
        assert!(matches!(
            "settings".parse::<Page>(),
            Err(SurveyError::InvalidSelection { kind: "page", .. })
        ));
        let json = serde_json::to_string(&Page::PrestigeIncome).unwrap();
        assert_eq!(json, "\"prestige-income\"");
    }
}
