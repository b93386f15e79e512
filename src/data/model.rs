use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// FieldValue – a single cell of a derived view table
// ---------------------------------------------------------------------------

/// A typed cell handed to the renderer. Serialized untagged so a view table
/// reads as plain JSON rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Null,
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => write!(f, "{s}"),
            FieldValue::Integer(i) => write!(f, "{i}"),
            FieldValue::Float(v) => write!(f, "{v:.2}"),
            FieldValue::Null => write!(f, "<null>"),
        }
    }
}

impl FieldValue {
    /// Numeric view of the cell, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Float(v) => Some(*v),
            FieldValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }
}

impl From<Option<f64>> for FieldValue {
    fn from(value: Option<f64>) -> Self {
        value.map_or(FieldValue::Null, FieldValue::Float)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<usize> for FieldValue {
    fn from(value: usize) -> Self {
        FieldValue::Integer(value as i64)
    }
}

// ---------------------------------------------------------------------------
// Ordinal scales
// ---------------------------------------------------------------------------

/// A fixed, explicitly ranked set of response labels.
#[derive(Debug, PartialEq, Eq)]
pub struct OrdinalScale {
    levels: &'static [&'static str],
}

/// One response on an ordinal scale. Orders by rank, never by label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Level {
    rank: u8,
    label: &'static str,
}

impl Level {
    pub fn rank(&self) -> u8 {
        self.rank
    }

    pub fn label(&self) -> &'static str {
        self.label
    }
}

impl Serialize for Level {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label)
    }
}

impl OrdinalScale {
    pub const fn new(levels: &'static [&'static str]) -> Self {
        Self { levels }
    }

    /// Labels in declared order.
    pub fn labels(&self) -> &'static [&'static str] {
        self.levels
    }

    /// Look up a label on this scale.
    pub fn level(&self, label: &str) -> Option<Level> {
        self.levels
            .iter()
            .position(|l| *l == label)
            .map(|rank| Level {
                rank: rank as u8,
                label: self.levels[rank],
            })
    }

    /// All levels in declared order.
    pub fn iter(&self) -> impl Iterator<Item = Level> + '_ {
        self.levels.iter().enumerate().map(|(rank, label)| Level {
            rank: rank as u8,
            label: *label,
        })
    }
}

pub static SATISFACTION: OrdinalScale = OrdinalScale::new(&[
    "very satisfied",
    "moderately satisfied",
    "moderately dissatisfied",
    "very dissatisfied",
]);

pub static AGREEMENT: OrdinalScale =
    OrdinalScale::new(&["strongly agree", "agree", "disagree", "strongly disagree"]);

pub static AGREEMENT_WITH_NEUTRAL: OrdinalScale = OrdinalScale::new(&[
    "strongly agree",
    "agree",
    "neither agree nor disagree",
    "disagree",
    "strongly disagree",
]);

// ---------------------------------------------------------------------------
// Nominal and derived categories
// ---------------------------------------------------------------------------

/// Respondent sex. Declared in label order so grouped output sorts like the labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Female,
    Male,
}

impl Sex {
    pub const ALL: [Sex; 2] = [Sex::Female, Sex::Male];

    pub fn label(self) -> &'static str {
        match self {
            Sex::Female => "female",
            Sex::Male => "male",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.label() == label)
    }
}

/// The nine U.S. census divisions, labelled as the survey spells them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Region {
    #[serde(rename = "new england")]
    NewEngland,
    #[serde(rename = "middle atlantic")]
    MiddleAtlantic,
    #[serde(rename = "e. nor. central")]
    EastNorthCentral,
    #[serde(rename = "w. nor. central")]
    WestNorthCentral,
    #[serde(rename = "south atlantic")]
    SouthAtlantic,
    #[serde(rename = "e. sou. central")]
    EastSouthCentral,
    #[serde(rename = "w. sou. central")]
    WestSouthCentral,
    #[serde(rename = "mountain")]
    Mountain,
    #[serde(rename = "pacific")]
    Pacific,
}

impl Region {
    pub const ALL: [Region; 9] = [
        Region::NewEngland,
        Region::MiddleAtlantic,
        Region::EastNorthCentral,
        Region::WestNorthCentral,
        Region::SouthAtlantic,
        Region::EastSouthCentral,
        Region::WestSouthCentral,
        Region::Mountain,
        Region::Pacific,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Region::NewEngland => "new england",
            Region::MiddleAtlantic => "middle atlantic",
            Region::EastNorthCentral => "e. nor. central",
            Region::WestNorthCentral => "w. nor. central",
            Region::SouthAtlantic => "south atlantic",
            Region::EastSouthCentral => "e. sou. central",
            Region::WestSouthCentral => "w. sou. central",
            Region::Mountain => "mountain",
            Region::Pacific => "pacific",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.label() == label)
    }
}

/// Five-bucket education attainment derived from years of schooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum EducationClass {
    #[serde(rename = "No HS Diploma")]
    NoHighSchool,
    #[serde(rename = "High School Grad")]
    HighSchool,
    #[serde(rename = "Some College")]
    SomeCollege,
    #[serde(rename = "Bachelor's Degree")]
    Bachelor,
    #[serde(rename = "Graduate or more")]
    Graduate,
}

impl EducationClass {
    pub const ALL: [EducationClass; 5] = [
        EducationClass::NoHighSchool,
        EducationClass::HighSchool,
        EducationClass::SomeCollege,
        EducationClass::Bachelor,
        EducationClass::Graduate,
    ];

    /// Documented scale of the `education` column, in years.
    pub const MIN_YEARS: f64 = 0.0;
    pub const MAX_YEARS: f64 = 20.0;

    /// Right-closed upper edges; the first bucket also includes its lower edge.
    const UPPER_EDGES: [f64; 5] = [11.0, 12.0, 14.0, 16.0, 20.0];

    pub fn label(self) -> &'static str {
        match self {
            EducationClass::NoHighSchool => "No HS Diploma",
            EducationClass::HighSchool => "High School Grad",
            EducationClass::SomeCollege => "Some College",
            EducationClass::Bachelor => "Bachelor's Degree",
            EducationClass::Graduate => "Graduate or more",
        }
    }

    /// Bucket for `years`, or `None` outside `[0, 20]`.
    pub fn from_years(years: f64) -> Option<Self> {
        if !(Self::MIN_YEARS..=Self::MAX_YEARS).contains(&years) {
            return None;
        }
        Self::UPPER_EDGES
            .iter()
            .position(|upper| years <= *upper)
            .map(|i| Self::ALL[i])
    }
}

// ---------------------------------------------------------------------------
// Respondent – one prepared survey row
// ---------------------------------------------------------------------------

/// A single prepared survey respondent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Respondent {
    pub id: i64,
    pub weight: Option<f64>,
    pub sex: Option<Sex>,
    pub education: Option<f64>,
    pub education_class: Option<EducationClass>,
    pub region: Option<Region>,
    pub age: Option<f64>,
    pub income: Option<f64>,
    pub job_prestige: Option<f64>,
    pub mother_job_prestige: Option<f64>,
    pub father_job_prestige: Option<f64>,
    pub socioeconomic_index: Option<f64>,
    pub satjob: Option<Level>,
    pub relationship: Option<Level>,
    pub male_breadwinner: Option<Level>,
    pub men_bettersuited: Option<Level>,
    pub child_suffer: Option<Level>,
    pub men_overwork: Option<Level>,
}

/// Every column of a prepared respondent, in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Id,
    Weight,
    Sex,
    Education,
    EducationClass,
    Region,
    Age,
    Income,
    JobPrestige,
    MotherJobPrestige,
    FatherJobPrestige,
    SocioeconomicIndex,
    Satjob,
    Relationship,
    MaleBreadwinner,
    MenBettersuited,
    ChildSuffer,
    MenOverwork,
}

impl Column {
    pub const ALL: [Column; 18] = [
        Column::Id,
        Column::Weight,
        Column::Sex,
        Column::Education,
        Column::EducationClass,
        Column::Region,
        Column::Age,
        Column::Income,
        Column::JobPrestige,
        Column::MotherJobPrestige,
        Column::FatherJobPrestige,
        Column::SocioeconomicIndex,
        Column::Satjob,
        Column::Relationship,
        Column::MaleBreadwinner,
        Column::MenBettersuited,
        Column::ChildSuffer,
        Column::MenOverwork,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Column::Id => "id",
            Column::Weight => "weight",
            Column::Sex => "sex",
            Column::Education => "education",
            Column::EducationClass => "education_class",
            Column::Region => "region",
            Column::Age => "age",
            Column::Income => "income",
            Column::JobPrestige => "job_prestige",
            Column::MotherJobPrestige => "mother_job_prestige",
            Column::FatherJobPrestige => "father_job_prestige",
            Column::SocioeconomicIndex => "socioeconomic_index",
            Column::Satjob => "satjob",
            Column::Relationship => "relationship",
            Column::MaleBreadwinner => "male_breadwinner",
            Column::MenBettersuited => "men_bettersuited",
            Column::ChildSuffer => "child_suffer",
            Column::MenOverwork => "men_overwork",
        }
    }
}

impl Respondent {
    /// Whether the given column holds the null marker for this respondent.
    pub fn is_null(&self, column: Column) -> bool {
        match column {
            Column::Id => false,
            Column::Weight => self.weight.is_none(),
            Column::Sex => self.sex.is_none(),
            Column::Education => self.education.is_none(),
            Column::EducationClass => self.education_class.is_none(),
            Column::Region => self.region.is_none(),
            Column::Age => self.age.is_none(),
            Column::Income => self.income.is_none(),
            Column::JobPrestige => self.job_prestige.is_none(),
            Column::MotherJobPrestige => self.mother_job_prestige.is_none(),
            Column::FatherJobPrestige => self.father_job_prestige.is_none(),
            Column::SocioeconomicIndex => self.socioeconomic_index.is_none(),
            Column::Satjob => self.satjob.is_none(),
            Column::Relationship => self.relationship.is_none(),
            Column::MaleBreadwinner => self.male_breadwinner.is_none(),
            Column::MenBettersuited => self.men_bettersuited.is_none(),
            Column::ChildSuffer => self.child_suffer.is_none(),
            Column::MenOverwork => self.men_overwork.is_none(),
        }
    }
}

// ---------------------------------------------------------------------------
// Survey – the complete prepared dataset
// ---------------------------------------------------------------------------

/// The prepared, immutable respondent table.
#[derive(Debug, Clone, Default)]
pub struct Survey {
    respondents: Vec<Respondent>,
}

impl Survey {
    pub fn from_respondents(respondents: Vec<Respondent>) -> Self {
        Self { respondents }
    }

    pub fn respondents(&self) -> &[Respondent] {
        &self.respondents
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Respondent> {
        self.respondents.iter()
    }

    /// Number of respondents.
    pub fn len(&self) -> usize {
        self.respondents.len()
    }

    /// Whether the survey has no rows.
    pub fn is_empty(&self) -> bool {
        self.respondents.is_empty()
    }

    /// Null count per column, in column order.
    pub fn null_counts(&self) -> Vec<(Column, usize)> {
        Column::ALL
            .into_iter()
            .map(|c| (c, self.iter().filter(|r| r.is_null(c)).count()))
            .collect()
    }
}
