//! Column extractors: one parser per feature type.
//!
//! Every extractor is a pure function of its input column and returns exactly
//! one value per input row. Text that does not match the expected pattern
//! becomes a missing value.

use convert_case::{Case, Casing};
use indexmap::IndexMap;

use crate::extraction::{round2, ParsingRules, KELVIN_OFFSET};
use crate::table::{ExtractorOutput, OutputColumn, RawColumn};

pub const RATIO_EPOXY: &str = "ratio_epoxy";
pub const RATIO_CURING: &str = "ratio_curing";
pub const FILLER_PROPORTION: &str = "filler_proportion(%)";
pub const TEMPERATURE: &str = "temperature(K)";

/// Cell separators for multi-valued categorical cells
const CATEGORY_SEPARATORS: &[char] = &['+', ',', '，', '、', ';', '；', '/'];

/// Tokens meaning "no category"
const NO_CATEGORY: &[&str] = &["无", "none", "-"];

/// Output column name for a feature measured in `unit`, e.g. `flexural_strength(MPa)`
pub fn feature_name(feature: &str, unit: &str) -> String {
    format!("{}({})", feature, unit)
}

/// First number of each cell, rounded to 2 decimals
pub fn numeric_with_unit(rules: &ParsingRules, column: &RawColumn, output: &str) -> OutputColumn {
    let values = column
        .cells()
        .map(|cell| cell.and_then(|text| rules.first_number(text)).map(round2))
        .collect();
    OutputColumn::new(output, values)
}

/// Epoxy / curing agent ratio as two columns.
///
/// No number gives two missing values, one number `n` gives `(n, 0)`, and
/// two or more give the first two in order.
pub fn ratio_pair(rules: &ParsingRules, column: &RawColumn) -> ExtractorOutput {
    let mut epoxy = Vec::with_capacity(column.len());
    let mut curing = Vec::with_capacity(column.len());

    for cell in column.cells() {
        let numbers = cell.map(|text| rules.all_numbers(text)).unwrap_or_default();
        let (e, c) = match numbers.as_slice() {
            [] => (None, None),
            [only] => (Some(*only), Some(0.0)),
            [first, second, ..] => (Some(*first), Some(*second)),
        };
        epoxy.push(e);
        curing.push(c);
    }

    ExtractorOutput::Frame(vec![
        OutputColumn::new(RATIO_EPOXY, epoxy),
        OutputColumn::new(RATIO_CURING, curing),
    ])
}

/// Content already expressed in percent.
///
/// Fractions below 1 are not rescaled.
pub fn percentage(rules: &ParsingRules, column: &RawColumn, feature: &str) -> OutputColumn {
    numeric_with_unit(rules, column, &feature_name(feature, "%"))
}

/// Filler proportion from a `a:b` ratio, falling back to a plain number.
///
/// `0:0` has no ratio value and falls back too, giving `0.0`.
pub fn filler_proportion(rules: &ParsingRules, column: &RawColumn) -> OutputColumn {
    let values = column
        .cells()
        .map(|cell| cell.and_then(|text| filler_proportion_cell(rules, text)))
        .collect();
    OutputColumn::new(FILLER_PROPORTION, values)
}

fn filler_proportion_cell(rules: &ParsingRules, text: &str) -> Option<f64> {
    rules
        .ratio_sides(text)
        .and_then(ratio_to_percent)
        .or_else(|| rules.first_number(text))
        .map(round2)
}

fn ratio_to_percent((left, right): (f64, f64)) -> Option<f64> {
    match (left == 0.0, right == 0.0) {
        (true, true) => None,
        (false, true) => Some(left),
        (true, false) => Some(right),
        (false, false) => Some(100.0 * left / right),
    }
}

/// Temperature in Kelvin; room-temperature tokens count as 26 °C
pub fn temperature(rules: &ParsingRules, column: &RawColumn) -> OutputColumn {
    let values = column
        .cells()
        .map(|cell| {
            cell.and_then(|text| rules.temperature(text))
                .map(|reading| round2(reading.celsius() + KELVIN_OFFSET))
        })
        .collect();
    OutputColumn::new(TEMPERATURE, values)
}

/// Multi-hot encoding of a categorical column.
///
/// Cells are split on common list separators; each distinct category (by
/// snake_case key, in order of first appearance) becomes an indicator
/// column `<feature>_<key>`. Null, blank and "none" cells are all zeros.
pub fn one_hot(column: &RawColumn, feature: &str) -> ExtractorOutput {
    let rows: Vec<Vec<String>> = column
        .cells()
        .map(|cell| cell.map(category_keys).unwrap_or_default())
        .collect();

    let mut indicators: IndexMap<String, Vec<Option<f64>>> = IndexMap::new();
    for (i, keys) in rows.iter().enumerate() {
        for key in keys {
            let values = indicators
                .entry(key.clone())
                .or_insert_with(|| vec![Some(0.0); rows.len()]);
            values[i] = Some(1.0);
        }
    }

    ExtractorOutput::Frame(
        indicators
            .into_iter()
            .map(|(key, values)| OutputColumn::new(format!("{}_{}", feature, key), values))
            .collect(),
    )
}

fn category_keys(text: &str) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    for token in text.split(CATEGORY_SEPARATORS) {
        let token = token.trim();
        if token.is_empty() || NO_CATEGORY.iter().any(|none| token.eq_ignore_ascii_case(none)) {
            continue;
        }
        let key = token.to_case(Case::Snake);
        if !keys.contains(&key) {
            keys.push(key);
        }
    }
    keys
}
