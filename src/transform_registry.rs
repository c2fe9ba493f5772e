//! Extractor registry: raw column name to extraction rule.
//!
//! The registry is ordered. Output columns follow registry order, not the
//! order of columns in the raw table.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::{PipelineError, Result};
use crate::extraction::ParsingRules;
use crate::extractors;
use crate::table::{ExtractorOutput, RawColumn};

/// Trait for column extraction functions
pub trait ExtractFn: Send + Sync {
    /// Parse one raw column into one or more output columns
    fn extract(&self, column: &RawColumn) -> ExtractorOutput;
}

impl<F> ExtractFn for F
where
    F: Fn(&RawColumn) -> ExtractorOutput + Send + Sync,
{
    fn extract(&self, column: &RawColumn) -> ExtractorOutput {
        self(column)
    }
}

/// Rule registered for a raw column
pub enum ColumnRule {
    /// Accepted for validation, produces no output. The label documents the column.
    PassThrough(String),
    Extractor(Box<dyn ExtractFn>),
}

impl ColumnRule {
    pub fn pass_through(label: impl Into<String>) -> Self {
        ColumnRule::PassThrough(label.into())
    }

    pub fn extractor<F>(func: F) -> Self
    where
        F: Fn(&RawColumn) -> ExtractorOutput + Send + Sync + 'static,
    {
        ColumnRule::Extractor(Box::new(func))
    }

    pub fn is_extractor(&self) -> bool {
        matches!(self, ColumnRule::Extractor(_))
    }
}

impl fmt::Debug for ColumnRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnRule::PassThrough(label) => f.debug_tuple("PassThrough").field(label).finish(),
            ColumnRule::Extractor(_) => f.write_str("Extractor(..)"),
        }
    }
}

/// Ordered registry of column rules
#[derive(Debug, Default)]
pub struct ExtractorRegistry {
    rules: IndexMap<String, ColumnRule>,
}

impl ExtractorRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            rules: IndexMap::new(),
        }
    }

    /// Register a rule for `column`.
    ///
    /// A new column is appended to the end. Re-registering an existing
    /// column replaces its rule in place, keeping its position.
    pub fn register(&mut self, column: impl Into<String>, rule: ColumnRule) {
        self.rules.insert(column.into(), rule);
    }

    pub fn get(&self, column: &str) -> Option<&ColumnRule> {
        self.rules.get(column)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.rules.contains_key(column)
    }

    /// Rules in registry order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ColumnRule)> {
        self.rules.iter().map(|(name, rule)| (name.as_str(), rule))
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.rules.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Check that every name is registered, failing on the first that is not
    pub fn validate_columns<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Result<()> {
        for name in names {
            if !self.contains(name) {
                return Err(PipelineError::UnknownColumn(name.to_string()));
            }
        }
        Ok(())
    }

    /// Check that every column with an extractor is among `names`
    pub fn require_columns<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Result<()> {
        let present: Vec<&str> = names.into_iter().collect();
        for (name, rule) in self.iter() {
            if rule.is_extractor() && !present.contains(&name) {
                return Err(PipelineError::MissingColumn(name.to_string()));
            }
        }
        Ok(())
    }

    /// Keep only the rules for `columns`, preserving registry order
    pub fn retain_columns(mut self, columns: &[&str]) -> Self {
        self.rules.retain(|name, _| columns.contains(&name.as_str()));
        self
    }

    /// Registry for the epoxy composite dataset
    pub fn epoxy() -> Result<Self> {
        let rules = Arc::new(ParsingRules::compile()?);
        let mut registry = Self::new();

        registry.register("环氧", ColumnRule::pass_through("epoxy"));
        registry.register("环氧化学式", ColumnRule::pass_through("epoxy chemical formula"));
        registry.register("分子量", numeric(&rules, "molecular_weight", "g/mol"));
        registry.register("固化剂", ColumnRule::pass_through("curing agent"));
        registry.register("固化剂化学式", ColumnRule::pass_through("curing agent chemical formula"));

        let r = Arc::clone(&rules);
        registry.register(
            "环氧/固化剂配比",
            ColumnRule::extractor(move |column| extractors::ratio_pair(&r, column)),
        );

        registry.register("碳纤维含量", percent(&rules, "carbon_fiber_content"));
        registry.register("填料种类", ColumnRule::pass_through("type of filler"));

        let r = Arc::clone(&rules);
        registry.register(
            "填料比例",
            ColumnRule::extractor(move |column| extractors::filler_proportion(&r, column).into()),
        );

        registry.register("促进剂", ColumnRule::pass_through("accelerator"));
        registry.register("促进剂含量", percent(&rules, "accelerator_content"));

        let r = Arc::clone(&rules);
        registry.register(
            "温度",
            ColumnRule::extractor(move |column| extractors::temperature(&r, column).into()),
        );

        // Targets
        registry.register("断裂韧性", numeric(&rules, "fracture_toughness", "MPa*m0.5"));
        registry.register("弯曲强度", numeric(&rules, "flexural_strength", "MPa"));
        registry.register("弯曲模量", numeric(&rules, "flexural_modulus", "MPa"));
        registry.register("冲击强度", numeric(&rules, "impact_strength", "kJ/m2"));
        registry.register("杨氏模量", numeric(&rules, "young_modulus", "MPa"));
        registry.register("拉伸强度", numeric(&rules, "tensile_strength", "MPa"));
        registry.register("剪切强度", numeric(&rules, "shear_strength", "MPa"));
        registry.register("断裂伸长率", numeric(&rules, "elongation_at_break", "%"));

        Ok(registry)
    }

    /// Swap the filler type and accelerator pass-throughs for one-hot encoders
    pub fn with_category_encoding(mut self) -> Self {
        self.register(
            "填料种类",
            ColumnRule::extractor(|column| extractors::one_hot(column, "filler_type")),
        );
        self.register(
            "促进剂",
            ColumnRule::extractor(|column| extractors::one_hot(column, "accelerator")),
        );
        self
    }
}

fn numeric(rules: &Arc<ParsingRules>, feature: &str, unit: &str) -> ColumnRule {
    let rules = Arc::clone(rules);
    let output = extractors::feature_name(feature, unit);
    ColumnRule::extractor(move |column| {
        extractors::numeric_with_unit(&rules, column, &output).into()
    })
}

fn percent(rules: &Arc<ParsingRules>, feature: &str) -> ColumnRule {
    let rules = Arc::clone(rules);
    let feature = feature.to_string();
    ColumnRule::extractor(move |column| extractors::percentage(&rules, column, &feature).into())
}
