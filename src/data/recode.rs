//! Field-level recoding of the selected table into typed respondents.
//!
//! Transforms run column by column in a fixed order: age coercion, ordinal
//! tagging (with `satjob` label harmonization), education binning, then the
//! remaining numeric and nominal columns. The first failing cell aborts the
//! whole pass.

use log::{debug, warn};

use super::loader::RawTable;
use super::model::{
    EducationClass, Level, OrdinalScale, Region, Respondent, Sex, Survey, AGREEMENT,
    AGREEMENT_WITH_NEUTRAL, SATISFACTION,
};
use crate::error::{Result, SurveyError};

/// Top-coded age label in the source.
pub const AGE_TOP_CODE: &str = "89 or older";
pub const AGE_TOP_CODE_VALUE: f64 = 89.0;

/// Source spellings of `satjob` levels that differ from the scale labels.
pub const SATJOB_RELABELS: [(&str, &str); 2] = [
    ("mod. satisfied", "moderately satisfied"),
    ("a little dissat", "moderately dissatisfied"),
];

/// Harmonized `satjob` label; unlisted labels pass through.
pub fn harmonize_satjob(label: &str) -> &str {
    SATJOB_RELABELS
        .iter()
        .find(|(from, _)| *from == label)
        .map_or(label, |(_, to)| *to)
}

/// Column positions in the selected table, resolved once.
struct Layout {
    id: usize,
    weight: usize,
    sex: usize,
    education: usize,
    region: usize,
    age: usize,
    income: usize,
    job_prestige: usize,
    mother_job_prestige: usize,
    father_job_prestige: usize,
    socioeconomic_index: usize,
    satjob: usize,
    relationship: usize,
    male_breadwinner: usize,
    men_bettersuited: usize,
    child_suffer: usize,
    men_overwork: usize,
}

impl Layout {
    fn resolve(table: &RawTable) -> Result<Self> {
        let mut missing = Vec::new();
        let mut find = |name: &str| {
            table.column_index(name).unwrap_or_else(|| {
                missing.push(name.to_string());
                usize::MAX
            })
        };
        let layout = Layout {
            id: find("id"),
            weight: find("weight"),
            sex: find("sex"),
            education: find("education"),
            region: find("region"),
            age: find("age"),
            income: find("income"),
            job_prestige: find("job_prestige"),
            mother_job_prestige: find("mother_job_prestige"),
            father_job_prestige: find("father_job_prestige"),
            socioeconomic_index: find("socioeconomic_index"),
            satjob: find("satjob"),
            relationship: find("relationship"),
            male_breadwinner: find("male_breadwinner"),
            men_bettersuited: find("men_bettersuited"),
            child_suffer: find("child_suffer"),
            men_overwork: find("men_overwork"),
        };
        if missing.is_empty() {
            Ok(layout)
        } else {
            Err(SurveyError::SchemaMismatch { missing })
        }
    }
}

fn cells(table: &RawTable, index: usize) -> impl Iterator<Item = (usize, Option<&str>)> + '_ {
    table
        .rows()
        .iter()
        .enumerate()
        .map(move |(row, fields)| (row, fields[index].as_deref()))
}

fn parse_number(row: usize, column: &'static str, cell: Option<&str>) -> Result<Option<f64>> {
    let Some(text) = cell else {
        return Ok(None);
    };
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(Some)
        .ok_or_else(|| SurveyError::Coercion {
            row,
            column,
            value: text.to_string(),
        })
}

fn numeric_column(table: &RawTable, index: usize, column: &'static str) -> Result<Vec<Option<f64>>> {
    cells(table, index)
        .map(|(row, cell)| parse_number(row, column, cell))
        .collect()
}

/// `age` with the top-code label mapped to 89.
fn age_column(table: &RawTable, index: usize) -> Result<Vec<Option<f64>>> {
    cells(table, index)
        .map(|(row, cell)| match cell {
            Some(AGE_TOP_CODE) => Ok(Some(AGE_TOP_CODE_VALUE)),
            other => parse_number(row, "age", other),
        })
        .collect()
}

/// Tag an attitude column with its scale. Labels off the scale become null.
fn ordinal_column(
    table: &RawTable,
    index: usize,
    column: &'static str,
    scale: &'static OrdinalScale,
    relabel: fn(&str) -> &str,
) -> Vec<Option<Level>> {
    let mut off_scale = 0usize;
    let levels = cells(table, index)
        .map(|(_, cell)| {
            let label = relabel(cell?);
            let level = scale.level(label);
            if level.is_none() {
                off_scale += 1;
            }
            level
        })
        .collect();
    if off_scale > 0 {
        warn!("{column}: {off_scale} labels outside the declared scale were treated as missing");
    }
    levels
}

fn education_classes(education: &[Option<f64>]) -> Result<Vec<Option<EducationClass>>> {
    education
        .iter()
        .enumerate()
        .map(|(row, years)| match years {
            None => Ok(None),
            Some(years) => EducationClass::from_years(*years).map(Some).ok_or(
                SurveyError::OutOfRange {
                    row,
                    column: "education",
                    value: *years,
                    min: EducationClass::MIN_YEARS,
                    max: EducationClass::MAX_YEARS,
                },
            ),
        })
        .collect()
}

fn nominal_column<T>(
    table: &RawTable,
    index: usize,
    column: &'static str,
    parse: fn(&str) -> Option<T>,
) -> Result<Vec<Option<T>>> {
    cells(table, index)
        .map(|(row, cell)| match cell {
            None => Ok(None),
            Some(text) => parse(text).map(Some).ok_or_else(|| SurveyError::Coercion {
                row,
                column,
                value: text.to_string(),
            }),
        })
        .collect()
}

/// `i64` range as `f64`; the upper bound 2^63 itself is out of range.
const ID_MIN: f64 = i64::MIN as f64;
const ID_MAX: f64 = i64::MAX as f64;

fn id_column(table: &RawTable, index: usize) -> Result<Vec<i64>> {
    cells(table, index)
        .map(|(row, cell)| {
            let coercion = || SurveyError::Coercion {
                row,
                column: "id",
                value: cell.unwrap_or_default().to_string(),
            };
            let text = cell.ok_or_else(coercion)?.trim();
            text.parse::<i64>()
                .ok()
                .or_else(|| {
                    text.parse::<f64>()
                        .ok()
                        .filter(|v| v.fract() == 0.0 && (ID_MIN..ID_MAX).contains(v))
                        .map(|v| v as i64)
                })
                .ok_or_else(coercion)
        })
        .collect()
}

fn identity(label: &str) -> &str {
    label
}

/// Recode the selected, renamed table into a [`Survey`].
pub fn recode(table: &RawTable) -> Result<Survey> {
    let layout = Layout::resolve(table)?;

    let age = age_column(table, layout.age)?;

    let satjob = ordinal_column(table, layout.satjob, "satjob", &SATISFACTION, harmonize_satjob);
    let relationship = ordinal_column(table, layout.relationship, "relationship", &AGREEMENT, identity);
    let male_breadwinner = ordinal_column(
        table,
        layout.male_breadwinner,
        "male_breadwinner",
        &AGREEMENT,
        identity,
    );
    let men_bettersuited = ordinal_column(
        table,
        layout.men_bettersuited,
        "men_bettersuited",
        &AGREEMENT,
        identity,
    );
    let child_suffer = ordinal_column(table, layout.child_suffer, "child_suffer", &AGREEMENT, identity);
    let men_overwork = ordinal_column(
        table,
        layout.men_overwork,
        "men_overwork",
        &AGREEMENT_WITH_NEUTRAL,
        identity,
    );

    let education = numeric_column(table, layout.education, "education")?;
    let education_class = education_classes(&education)?;

    let id = id_column(table, layout.id)?;
    let weight = numeric_column(table, layout.weight, "weight")?;
    let income = numeric_column(table, layout.income, "income")?;
    let job_prestige = numeric_column(table, layout.job_prestige, "job_prestige")?;
    let mother_job_prestige =
        numeric_column(table, layout.mother_job_prestige, "mother_job_prestige")?;
    let father_job_prestige =
        numeric_column(table, layout.father_job_prestige, "father_job_prestige")?;
    let socioeconomic_index =
        numeric_column(table, layout.socioeconomic_index, "socioeconomic_index")?;
    let sex = nominal_column(table, layout.sex, "sex", Sex::from_label)?;
    let region = nominal_column(table, layout.region, "region", Region::from_label)?;

    let respondents: Vec<Respondent> = (0..table.len())
        .map(|i| Respondent {
            id: id[i],
            weight: weight[i],
            sex: sex[i],
            education: education[i],
            education_class: education_class[i],
            region: region[i],
            age: age[i],
            income: income[i],
            job_prestige: job_prestige[i],
            mother_job_prestige: mother_job_prestige[i],
            father_job_prestige: father_job_prestige[i],
            socioeconomic_index: socioeconomic_index[i],
            satjob: satjob[i],
            relationship: relationship[i],
            male_breadwinner: male_breadwinner[i],
            men_bettersuited: men_bettersuited[i],
            child_suffer: child_suffer[i],
            men_overwork: men_overwork[i],
        })
        .collect();
    debug!("recoded {} respondents", respondents.len());

    Ok(Survey::from_respondents(respondents))
}
