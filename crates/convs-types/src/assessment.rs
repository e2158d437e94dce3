//! Assessment question blocks: quiz nodes linked by numeric ids.
//!
//! Plain data. Navigation pointers (`next_question_id`, `prev_question_id`)
//! are ids, not references, and nothing here checks that they resolve.

use serde::{Deserialize, Serialize};

use std::fmt;

use crate::story::StoryBlock;

/// A single quiz question placed in a story.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentQuestion {
    #[serde(flatten)]
    pub block: StoryBlock,
    pub question_type: AssessmentQuestionType,
    pub marks: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<AssessmentQuestionOption>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_question_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_question_id: Option<u32>,
}

/// One selectable answer of a question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentQuestionOption {
    pub id: String,
    pub text: String,
    pub value: AssessmentOptionValue,
}

/// How a question is answered. Encoded as its number on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum AssessmentQuestionType {
    SingleSelectOptions = 1,
}

impl From<AssessmentQuestionType> for u8 {
    fn from(value: AssessmentQuestionType) -> Self {
        value as u8
    }
}

impl TryFrom<u8> for AssessmentQuestionType {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(AssessmentQuestionType::SingleSelectOptions),
            other => Err(format!("invalid question type: {other}")),
        }
    }
}

/// Grading of an option. Encoded as its number on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum AssessmentOptionValue {
    Correct = 1,
    Wrong = 2,
    FiftyFifty = 3,
}

impl From<AssessmentOptionValue> for u8 {
    fn from(value: AssessmentOptionValue) -> Self {
        value as u8
    }
}

impl TryFrom<u8> for AssessmentOptionValue {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(AssessmentOptionValue::Correct),
            2 => Ok(AssessmentOptionValue::Wrong),
            3 => Ok(AssessmentOptionValue::FiftyFifty),
            other => Err(format!("invalid option value: {other}")),
        }
    }
}

impl fmt::Display for AssessmentOptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssessmentOptionValue::Correct => write!(f, "correct"),
            AssessmentOptionValue::Wrong => write!(f, "wrong"),
            AssessmentOptionValue::FiftyFifty => write!(f, "fifty-fifty"),
        }
    }
}
