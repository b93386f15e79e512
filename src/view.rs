//! Feature × group selection and the rendering metadata derived from it.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::color::ColorMap;
use crate::data::model::{
    EducationClass, Level, OrdinalScale, Respondent, AGREEMENT, AGREEMENT_WITH_NEUTRAL,
    SATISFACTION,
};
use crate::error::SurveyError;

// ---------------------------------------------------------------------------
// Feature – an attitude question
// ---------------------------------------------------------------------------

/// An attitude question that can be broken down by a [`Group`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Satjob,
    Relationship,
    MaleBreadwinner,
    MenBettersuited,
    ChildSuffer,
    MenOverwork,
}

impl Feature {
    pub const ALL: [Feature; 6] = [
        Feature::Satjob,
        Feature::Relationship,
        Feature::MaleBreadwinner,
        Feature::MenBettersuited,
        Feature::ChildSuffer,
        Feature::MenOverwork,
    ];

    pub fn column(self) -> &'static str {
        match self {
            Feature::Satjob => "satjob",
            Feature::Relationship => "relationship",
            Feature::MaleBreadwinner => "male_breadwinner",
            Feature::MenBettersuited => "men_bettersuited",
            Feature::ChildSuffer => "child_suffer",
            Feature::MenOverwork => "men_overwork",
        }
    }

    pub fn scale(self) -> &'static OrdinalScale {
        match self {
            Feature::Satjob => &SATISFACTION,
            Feature::MenOverwork => &AGREEMENT_WITH_NEUTRAL,
            Feature::Relationship
            | Feature::MaleBreadwinner
            | Feature::MenBettersuited
            | Feature::ChildSuffer => &AGREEMENT,
        }
    }

    /// Full wording shown to respondents.
    pub fn statement(self) -> &'static str {
        match self {
            Feature::Satjob => "On the whole, how satisfied are you with the work you do?",
            Feature::Relationship => {
                "A working mother can establish just as warm and secure a relationship with her children as a mother who does not work."
            }
            Feature::MaleBreadwinner => {
                "It is much better for everyone involved if the man is the achiever outside the home and the woman takes care of the home and family."
            }
            Feature::MenBettersuited => {
                "Most men are better suited emotionally for politics than are most women."
            }
            Feature::ChildSuffer => "A preschool child is likely to suffer if his or her mother works.",
            Feature::MenOverwork => {
                "Family life often suffers because men concentrate too much on their work."
            }
        }
    }

    /// Short question used as the selector label.
    pub fn question(self) -> &'static str {
        match self {
            Feature::Satjob => "How satisfied are you with your work?",
            Feature::Relationship => "Can working mothers have warm relationships with children?",
            Feature::MaleBreadwinner => "Should men work while women care for home?",
            Feature::MenBettersuited => "Are men better suited for politics than women?",
            Feature::ChildSuffer => "Do children suffer when mothers work?",
            Feature::MenOverwork => "Does family suffer when men focus on work?",
        }
    }

    /// Heading placed above the statement.
    pub fn prompt_heading(self) -> &'static str {
        match self {
            Feature::Satjob => "Survey Question:",
            _ => "Respondents were asked to agree or disagree with:",
        }
    }

    /// This respondent's answer.
    pub fn value(self, r: &Respondent) -> Option<Level> {
        match self {
            Feature::Satjob => r.satjob,
            Feature::Relationship => r.relationship,
            Feature::MaleBreadwinner => r.male_breadwinner,
            Feature::MenBettersuited => r.men_bettersuited,
            Feature::ChildSuffer => r.child_suffer,
            Feature::MenOverwork => r.men_overwork,
        }
    }
}

// ---------------------------------------------------------------------------
// Group – a demographic breakdown
// ---------------------------------------------------------------------------

/// A demographic column used to colour a breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Group {
    Sex,
    Region,
    EducationClass,
}

impl Group {
    pub const ALL: [Group; 3] = [Group::Sex, Group::Region, Group::EducationClass];

    pub fn column(self) -> &'static str {
        match self {
            Group::Sex => "sex",
            Group::Region => "region",
            Group::EducationClass => "education_class",
        }
    }

    /// Legend title.
    pub fn label(self) -> &'static str {
        match self {
            Group::Sex => "Sex",
            Group::Region => "Region",
            Group::EducationClass => "Education Level",
        }
    }

    /// Declared category order, if the column has one.
    pub fn category_order(self) -> Option<Vec<&'static str>> {
        match self {
            Group::EducationClass => Some(EducationClass::ALL.iter().map(|c| c.label()).collect()),
            Group::Sex | Group::Region => None,
        }
    }

    /// This respondent's category label.
    pub fn value(self, r: &Respondent) -> Option<&'static str> {
        match self {
            Group::Sex => r.sex.map(|s| s.label()),
            Group::Region => r.region.map(|g| g.label()),
            Group::EducationClass => r.education_class.map(|c| c.label()),
        }
    }

    /// Every category label the column can take, in declaration order.
    pub fn categories(self) -> Vec<&'static str> {
        use crate::data::model::{Region, Sex};
        match self {
            Group::Sex => Sex::ALL.iter().map(|s| s.label()).collect(),
            Group::Region => Region::ALL.iter().map(|g| g.label()).collect(),
            Group::EducationClass => EducationClass::ALL.iter().map(|c| c.label()).collect(),
        }
    }
}

fn invalid(kind: &'static str, value: &str, expected: Vec<&'static str>) -> SurveyError {
    SurveyError::InvalidSelection {
        kind,
        value: value.to_string(),
        expected,
    }
}

impl FromStr for Feature {
    type Err = SurveyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Feature::ALL
            .into_iter()
            .find(|f| f.column() == s)
            .ok_or_else(|| invalid("feature", s, Feature::ALL.iter().map(|f| f.column()).collect()))
    }
}

impl FromStr for Group {
    type Err = SurveyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Group::ALL
            .into_iter()
            .find(|g| g.column() == s)
            .ok_or_else(|| invalid("group", s, Group::ALL.iter().map(|g| g.column()).collect()))
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

// ---------------------------------------------------------------------------
// ViewSpec – rendering metadata for one selection
// ---------------------------------------------------------------------------

/// Category ordering for one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryOrder {
    pub column: &'static str,
    pub categories: Vec<&'static str>,
}

/// Everything a chart renderer needs besides the data for a feature × group view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewSpec {
    pub feature: Feature,
    pub group: Group,
    pub category_orders: Vec<CategoryOrder>,
    pub color_map: ColorMap,
    pub prompt_heading: &'static str,
    pub statement: &'static str,
    pub question: &'static str,
    pub group_label: &'static str,
}

impl ViewSpec {
    pub fn new(feature: Feature, group: Group) -> Self {
        let mut category_orders = vec![CategoryOrder {
            column: feature.column(),
            categories: feature.scale().labels().to_vec(),
        }];
        if let Some(categories) = group.category_order() {
            category_orders.push(CategoryOrder {
                column: group.column(),
                categories,
            });
        }

        ViewSpec {
            feature,
            group,
            category_orders,
            color_map: ColorMap::for_group(group),
            prompt_heading: feature.prompt_heading(),
            statement: feature.statement(),
            question: feature.question(),
            group_label: group.label(),
        }
    }

    /// Resolve a selection given by column names, e.g. from a query string.
    pub fn from_names(feature: &str, group: &str) -> Result<Self, SurveyError> {
        Ok(Self::new(feature.parse()?, group.parse()?))
    }
}
