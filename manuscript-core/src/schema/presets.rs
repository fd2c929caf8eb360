//! Ready-made shape descriptions.
//!
//! Three families are shipped: story elements for fiction, research elements
//! (a common base plus one extension per research genre), and a minimal
//! keyword index.

use super::shape::ShapeDescription;
use super::store::{PluralNames, SchemaError, SchemaStore};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;

/// Story elements: characters, scenes grouped by chapter, places and objects
/// grouped by chapter, a year/month/day timeline and per-section directives.
pub fn story_shape() -> Value {
    json!({
        "Character": {
            "Character_Name": {
                "Role": "String",
                "Traits": ["List of Strings"],
                "Arc": "String",
                "History": "String",
                "Persona": "String"
            }
        },
        "Scene": {
            "Chapter_Title": [{
                "Section_Title": "String",
                "Setting": "String",
                "Characters": ["List of Strings"],
                "Key Elements": ["List of Strings"]
            }]
        },
        "Place": {
            "Chapter_Title": [{
                "Place": "String",
                "Description": "String",
                "Significance": "String"
            }]
        },
        "Timeline": {
            "Year": {
                "Month": {
                    "Day": [{
                        "Event": "String",
                        "Type": "Normal/Dream/Time Travel",
                        "Sub_Episodes": [{"Episode": "String", "Type": "Normal/Dream/TimeTravel"}]
                    }]
                }
            }
        },
        "Object": {
            "Chapter_Title": [{
                "Object": "String",
                "Description": "String",
                "Significance": "String",
                "Material": "String",
                "Age": "String"
            }]
        },
        "Directive": {
            "Section_Title": {
                "Objective": "String",
                "KeyEvents": ["List of Strings"],
                "CharactersInvolved": ["List of Strings"],
                "Setting": "String",
                "Mood": "String",
                "Conflict": "String",
                "Resolution": "String",
                "Foreshadowing": "String",
                "KeyDialogues": ["List of Strings"],
                "Time": "String",
                "SpecialInstructions": "String"
            }
        }
    })
}

/// Fields shared by every research genre.
pub fn research_shape() -> Value {
    json!({
        "Footnote": {"Number": {"Text": "String", "Page": "Integer"}},
        "Citation": {"Author": {"Year": "Integer", "Title": "String", "Publication": "String"}},
        "Reference": {"Type": {"Details": "String"}},
        "Structure": {
            "Abstract": {"Content": "String"},
            "Introduction": {"Content": "String"},
            "Methods": {"Content": "String"},
            "Results": {"Content": "String"},
            "Discussion": {"Content": "String"},
            "Conclusion": {"Content": "String"}
        }
    })
}

/// A term index: each keyword maps to the sections that mention it.
pub fn keyword_index_shape() -> Value {
    json!({"Keyword": {"Term": ["Section reference"]}})
}

/// Research genres layered over [`research_shape`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResearchGenre {
    Experimental,
    LiteratureReview,
    CaseStudy,
    Survey,
    Theoretical,
    Qualitative,
    ReviewArticle,
    MetaAnalysis,
    Observational,
}

impl ResearchGenre {
    pub const ALL: [ResearchGenre; 9] = [
        ResearchGenre::Experimental,
        ResearchGenre::LiteratureReview,
        ResearchGenre::CaseStudy,
        ResearchGenre::Survey,
        ResearchGenre::Theoretical,
        ResearchGenre::Qualitative,
        ResearchGenre::ReviewArticle,
        ResearchGenre::MetaAnalysis,
        ResearchGenre::Observational,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ResearchGenre::Experimental => "experimental",
            ResearchGenre::LiteratureReview => "literature_review",
            ResearchGenre::CaseStudy => "case_study",
            ResearchGenre::Survey => "survey",
            ResearchGenre::Theoretical => "theoretical",
            ResearchGenre::Qualitative => "qualitative",
            ResearchGenre::ReviewArticle => "review_article",
            ResearchGenre::MetaAnalysis => "meta_analysis",
            ResearchGenre::Observational => "observational",
        }
    }

    /// The genre-specific fields only.
    pub fn extension(&self) -> Value {
        match self {
            ResearchGenre::Experimental => json!({
                "Hypothesis": "String",
                "Methodology": {"Variables": "String", "Controls": "String", "Procedure": "String"},
                "Analysis": {"Statistical_Tests": "String", "Graphs": "String"}
            }),
            ResearchGenre::LiteratureReview => json!({
                "Scope": "String",
                "Theme": ["List of Strings"],
                "Methodology": {"Selection_Criteria": "String", "Sources": "String"},
                "Gap": "String"
            }),
            ResearchGenre::CaseStudy => json!({
                "Subject": "String",
                "Context": "String",
                "Finding": "String",
                "Implication": "String"
            }),
            ResearchGenre::Survey => json!({
                "Questionnaire": {"Questions": ["List of Strings"], "Options": ["List of Strings"]},
                "Sample_Size": "Integer",
                "Data_Collection_Method": "String",
                "Response_Rate": "String"
            }),
            ResearchGenre::Theoretical => json!({
                "Theory": "String",
                "Assumption": ["List of Strings"],
                "Proposition": ["List of Strings"],
                "Implication": "String"
            }),
            ResearchGenre::Qualitative => json!({
                "Research_Question": ["List of Strings"],
                "Data_Source": "String",
                "Data_Analysis_Method": "String",
                "Theme": ["List of Strings"]
            }),
            ResearchGenre::ReviewArticle => json!({
                "Objective": "String",
                "Inclusion_Criteria": "String",
                "Excluded_Study": ["List of Strings"],
                "Summary_Finding": "String"
            }),
            ResearchGenre::MetaAnalysis => json!({
                "Research_Question": ["List of Strings"],
                "Included_Study": ["List of Strings"],
                "Exclusion_Criteria": "String",
                "Overall_Finding": "String"
            }),
            ResearchGenre::Observational => json!({
                "Variable": ["List of Strings"],
                "Sample": "String",
                "Data_Collection": "String",
                "Observation": "String"
            }),
        }
    }

    /// Irregular plurals for this genre's fields.
    pub fn plural_names(&self) -> PluralNames {
        let pairs: &[(&str, &str)] = match self {
            ResearchGenre::Experimental => &[
                ("Methodology", "Methodologies"),
                ("Hypothesis", "Hypotheses"),
                ("Analysis", "Analyses"),
            ],
            ResearchGenre::LiteratureReview => &[("Methodology", "Methodologies")],
            ResearchGenre::ReviewArticle => &[("Excluded_Study", "Excluded_Studies")],
            ResearchGenre::MetaAnalysis => &[("Included_Study", "Included_Studies")],
            _ => &[],
        };
        pairs
            .iter()
            .map(|(name, plural)| (name.to_string(), plural.to_string()))
            .collect()
    }
}

/// A named preset, selectable from configuration or the command line.
///
/// Serialized by name (`"story"`, `"case_study"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SchemaPreset {
    #[default]
    Story,
    Research,
    Genre(ResearchGenre),
    KeywordIndex,
}

impl SchemaPreset {
    /// Build a fresh, empty store for this preset.
    pub fn build(&self) -> Result<SchemaStore, SchemaError> {
        match self {
            SchemaPreset::Story => SchemaStore::from_value(&story_shape(), &PluralNames::new()),
            SchemaPreset::Research => SchemaStore::from_value(&research_shape(), &PluralNames::new()),
            SchemaPreset::Genre(genre) => {
                let base = ShapeDescription::from_value(&research_shape())?;
                let extension = ShapeDescription::from_value(&genre.extension())?;
                Ok(SchemaStore::new(base.merged(extension), &genre.plural_names()))
            }
            SchemaPreset::KeywordIndex => {
                SchemaStore::from_value(&keyword_index_shape(), &PluralNames::new())
            }
        }
    }
}

impl fmt::Display for SchemaPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaPreset::Story => write!(f, "story"),
            SchemaPreset::Research => write!(f, "research"),
            SchemaPreset::Genre(genre) => write!(f, "{}", genre.name()),
            SchemaPreset::KeywordIndex => write!(f, "keyword_index"),
        }
    }
}

impl FromStr for SchemaPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "story" => Ok(SchemaPreset::Story),
            "research" => Ok(SchemaPreset::Research),
            "keyword_index" | "keywords" => Ok(SchemaPreset::KeywordIndex),
            other => ResearchGenre::ALL
                .iter()
                .find(|g| g.name() == other)
                .map(|g| SchemaPreset::Genre(*g))
                .ok_or_else(|| format!("unknown schema preset '{s}'")),
        }
    }
}

impl TryFrom<String> for SchemaPreset {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SchemaPreset> for String {
    fn from(preset: SchemaPreset) -> Self {
        preset.to_string()
    }
}
