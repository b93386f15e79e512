use palette::Srgb;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::view::Group;

// ---------------------------------------------------------------------------
// Fixed colour tables
// ---------------------------------------------------------------------------

const SEX_COLORS: [(&str, &str); 2] = [("male", "#2E86AB"), ("female", "#A23B72")];

const REGION_COLORS: [(&str, &str); 9] = [
    ("south atlantic", "#FF0000"),
    ("e. nor. central", "#0000FF"),
    ("pacific", "#00FF00"),
    ("w. sou. central", "#800080"),
    ("middle atlantic", "#FFA500"),
    ("mountain", "#008080"),
    ("e. sou. central", "#FFC0CB"),
    ("w. nor. central", "#964B00"),
    ("new england", "#FFFF00"),
];

const EDUCATION_COLORS: [(&str, &str); 5] = [
    ("Graduate or more", "#004c6d"),
    ("Bachelor's Degree", "#3a7391"),
    ("Some College", "#649baf"),
    ("High School Grad", "#93c6cd"),
    ("No HS Diploma", "#c8f2f2"),
];

/// Used for categories a table does not list.
pub const DEFAULT_COLOR: &str = "#808080";

// ---------------------------------------------------------------------------
// Color mapping: category label → hex colour
// ---------------------------------------------------------------------------

/// Maps category labels of a grouping column to fixed display colours.
///
/// Serializes as `{"column", "colors": {label: hex}, "rgb": {label: [r, g, b]}}`
/// with labels in table order.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorMap {
    pub column: &'static str,
    mapping: Vec<(&'static str, &'static str)>,
    default_color: &'static str,
}

impl ColorMap {
    /// The fixed colour table for a grouping column.
    pub fn for_group(group: Group) -> Self {
        let mapping: &[(&'static str, &'static str)] = match group {
            Group::Sex => &SEX_COLORS,
            Group::Region => &REGION_COLORS,
            Group::EducationClass => &EDUCATION_COLORS,
        };
        ColorMap {
            column: group.column(),
            mapping: mapping.to_vec(),
            default_color: DEFAULT_COLOR,
        }
    }

    /// Hex code for a category label, as written in the table.
    pub fn hex_for(&self, label: &str) -> &'static str {
        self.mapping
            .iter()
            .find(|(l, _)| *l == label)
            .map_or(self.default_color, |(_, hex)| *hex)
    }

    /// Parsed RGB colour for a category label.
    pub fn color_for(&self, label: &str) -> Srgb<u8> {
        parse_hex(self.hex_for(label)).unwrap_or_else(|| Srgb::new(128, 128, 128))
    }

    /// Legend entries (label → hex) in table order.
    pub fn legend_entries(&self) -> &[(&'static str, &'static str)] {
        &self.mapping
    }
}

impl Serialize for ColorMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ColorMap", 3)?;
        state.serialize_field("column", self.column)?;
        state.serialize_field("colors", &HexLegend(self))?;
        state.serialize_field("rgb", &RgbLegend(self))?;
        state.end()
    }
}

struct HexLegend<'a>(&'a ColorMap);

impl Serialize for HexLegend<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.mapping.iter().map(|(label, hex)| (label, hex)))
    }
}

struct RgbLegend<'a>(&'a ColorMap);

impl Serialize for RgbLegend<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.mapping.iter().map(|(label, _)| {
            let c = self.0.color_for(label);
            (label, [c.red, c.green, c.blue])
        }))
    }
}

fn parse_hex(hex: &str) -> Option<Srgb<u8>> {
    hex.parse::<Srgb<u8>>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sex_colors_are_exact() {
        let map = ColorMap::for_group(Group::Sex);
        assert_eq!(map.hex_for("male"), "#2E86AB");
        assert_eq!(map.hex_for("female"), "#A23B72");
        assert_eq!(map.color_for("male"), Srgb::new(0x2E, 0x86, 0xAB));
    }

    #[test]
    fn region_table_covers_all_nine_regions() {
        let map = ColorMap::for_group(Group::Region);
        assert_eq!(map.legend_entries().len(), 9);
        for region in crate::data::model::Region::ALL {
            assert_ne!(map.hex_for(region.label()), DEFAULT_COLOR);
        }
        assert_eq!(map.hex_for("w. nor. central"), "#964B00");
    }

    #[test]
    fn education_colors_keep_their_spelling() {
        let map = ColorMap::for_group(Group::EducationClass);
        assert_eq!(map.column, "education_class");
        assert_eq!(map.hex_for("Bachelor's Degree"), "#3a7391");
        assert_eq!(map.color_for("No HS Diploma"), Srgb::new(0xc8, 0xf2, 0xf2));
    }

    #[test]
    fn serializes_as_ordered_object() {
        let json = serde_json::to_string(&ColorMap::for_group(Group::Sex)).unwrap();
        assert_eq!(
            json,
            concat!(
                r##"{"column":"sex","colors":{"male":"#2E86AB","female":"#A23B72"},"##,
                r##""rgb":{"male":[46,134,171],"female":[162,59,114]}}"##
            )
        );
    }

    #[test]
    fn unknown_category_gets_default() {
        let map = ColorMap::for_group(Group::Sex);
        assert_eq!(map.hex_for("unknown"), DEFAULT_COLOR);
        assert_eq!(map.color_for("unknown"), Srgb::new(128, 128, 128));
    }
}
