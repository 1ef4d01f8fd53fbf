//! Student feature records

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Number of features the model was trained on
pub const FEATURE_COUNT: usize = 7;

/// Feature keys in the exact column order used during training.
///
/// The model is order-sensitive: a vector built in any other order still
/// produces a number, just the wrong one.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "gender",
    "lunch",
    "test_preparation_course",
    "reading_score",
    "writing_score",
    "race_ethnicity_group_E",
    "parental_level_of_education_high_school",
];

/// Audit marker listing the validated keys
pub const VALIDATED_VARIABLES_KEY: &str = "_variables_validadas";

/// Audit marker flagging the record as validated
pub const VALIDATED_FLAG_KEY: &str = "_validado";

/// The seven numeric inputs of the math score model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    /// 0 = female, 1 = male
    pub gender: f64,

    /// 0 = free/reduced, 1 = standard
    pub lunch: f64,

    /// 0 = none, 1 = completed
    pub test_preparation_course: f64,

    /// Reading score (0-100)
    pub reading_score: f64,

    /// Writing score (0-100)
    pub writing_score: f64,

    /// Membership flag for ethnicity group E
    #[serde(rename = "race_ethnicity_group_E")]
    pub race_ethnicity_group_e: f64,

    /// Parents' highest education is high school
    pub parental_level_of_education_high_school: f64,
}

impl FeatureRecord {
    /// Build a record from values given in [`FEATURE_NAMES`] order
    pub fn from_values(values: [f64; FEATURE_COUNT]) -> Self {
        let [gender, lunch, test_preparation_course, reading_score, writing_score, race_ethnicity_group_e, parental_level_of_education_high_school] =
            values;

        Self {
            gender,
            lunch,
            test_preparation_course,
            reading_score,
            writing_score,
            race_ethnicity_group_e,
            parental_level_of_education_high_school,
        }
    }

    /// Values in [`FEATURE_NAMES`] order
    pub fn to_values(&self) -> [f64; FEATURE_COUNT] {
        [
            self.gender,
            self.lunch,
            self.test_preparation_course,
            self.reading_score,
            self.writing_score,
            self.race_ethnicity_group_e,
            self.parental_level_of_education_high_school,
        ]
    }
}

/// A request payload after validation.
///
/// Keys the caller sent beyond the seven features are echoed back untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidatedRecord {
    /// Caller-supplied keys that are not model features
    #[serde(flatten)]
    pub extra: Map<String, Value>,

    /// The seven features, cast to floats
    #[serde(flatten)]
    pub features: FeatureRecord,

    /// Keys that went through validation, in model order
    #[serde(rename = "_variables_validadas")]
    pub validated_variables: Vec<String>,

    #[serde(rename = "_validado")]
    pub validated: bool,
}

impl ValidatedRecord {
    pub fn new(features: FeatureRecord, extra: Map<String, Value>) -> Self {
        Self {
            extra,
            features,
            validated_variables: FEATURE_NAMES.iter().map(|name| name.to_string()).collect(),
            validated: true,
        }
    }
}
