//! Survey definition and question-list authoring

use crate::error::{Result, SurveyLogicError};
use crate::rule::{fresh_id, ConditionalLogic};
use crate::survey::index::QuestionIndex;
use crate::survey::question::{Question, QuestionType};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Publication status of a survey
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurveyStatus {
    #[default]
    Draft,
    Active,
}

/// Input for a question about to be added
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewQuestion {
    #[serde(rename = "type")]
    pub kind: QuestionType,
    pub text: String,
    pub required: bool,
    pub options: Vec<String>,
}

/// A survey and its questions
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Survey {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: SurveyStatus,
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl Survey {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ..Default::default()
        }
    }

    /// Parse a survey from its JSON form. Questions without an order are
    /// numbered by their 1-based position in the list.
    pub fn from_json(json: &str) -> Result<Self> {
        let mut survey: Self = serde_json::from_str(json)?;
        survey.fill_missing_orders();
        Ok(survey)
    }

    fn fill_missing_orders(&mut self) {
        for (index, question) in self.questions.iter_mut().enumerate() {
            if question.order == 0 {
                question.order = index as u32 + 1;
            }
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn question(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    /// Questions sorted by ascending order
    pub fn ordered_questions(&self) -> Vec<&Question> {
        let mut ordered: Vec<&Question> = self.questions.iter().collect();
        ordered.sort_by_key(|q| q.order);
        ordered
    }

    /// Append a question after the current last one
    pub fn add_question(&mut self, new: NewQuestion) -> Result<&Question> {
        if new.text.trim().is_empty() {
            return Err(SurveyLogicError::EmptyQuestionText);
        }

        let id = fresh_id(self.questions.iter().map(|q| q.id.as_str()));
        let order = self.questions.iter().map(|q| q.order).max().unwrap_or(0) + 1;
        let options = if new.kind.has_options() {
            new.options
        } else {
            Vec::new()
        };

        debug!(survey = %self.id, question = %id, order, "adding question");
        self.questions.push(Question {
            id,
            kind: new.kind,
            text: new.text,
            required: new.required,
            options,
            order,
            conditional_logic: ConditionalLogic::default(),
        });

        // just pushed
        Ok(&self.questions[self.questions.len() - 1])
    }

    /// Delete a question and the logic it owns. Actions elsewhere that target
    /// it are left in place and become no-ops.
    pub fn remove_question(&mut self, id: &str) -> bool {
        let before = self.questions.len();
        self.questions.retain(|q| q.id != id);
        before != self.questions.len()
    }

    /// Replace a question's logic, rejecting condition targets that are set
    /// but do not name an earlier question
    pub fn update_logic(&mut self, id: &str, logic: ConditionalLogic) -> Result<()> {
        let owning = self
            .question(id)
            .ok_or_else(|| SurveyLogicError::QuestionNotFound(id.to_string()))?;

        let index = QuestionIndex::new(&self.questions);
        if let Some(bad) = logic
            .conditions
            .iter()
            .find(|c| c.has_target() && !index.is_available_target(owning, &c.target_question))
        {
            return Err(SurveyLogicError::InvalidReference {
                question: id.to_string(),
                condition: bad.id.clone(),
                target: bad.target_question.clone(),
            });
        }

        if let Some(question) = self.questions.iter_mut().find(|q| q.id == id) {
            question.conditional_logic = logic;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::ConditionPatch;

    fn new_question(kind: QuestionType, text: &str) -> NewQuestion {
        NewQuestion {
            kind,
            text: text.to_string(),
            required: false,
            options: vec!["Product A".to_string(), "Product B".to_string()],
        }
    }

    #[test]
    fn test_add_question_assigns_order_and_empty_logic() {
        let mut survey = Survey::new("s1", "Customer Satisfaction Survey");
        survey.add_question(new_question(QuestionType::Rating, "How satisfied?")).unwrap();
        let second = survey
            .add_question(new_question(QuestionType::Multiple, "Which product?"))
            .unwrap()
            .clone();

        assert_eq!(survey.questions[0].order, 1);
        assert_eq!(second.order, 2);
        assert!(second.conditional_logic.is_empty());
        assert_eq!(second.options.len(), 2);
        // rating questions carry no options
        assert!(survey.questions[0].options.is_empty());
    }

    #[test]
    fn test_add_question_rejects_blank_text() {
        let mut survey = Survey::new("s1", "Survey");
        let result = survey.add_question(new_question(QuestionType::Text, "   "));
        assert_eq!(result.unwrap_err(), SurveyLogicError::EmptyQuestionText);
        assert!(survey.questions.is_empty());
    }

    #[test]
    fn test_order_after_delete_does_not_collide() {
        let mut survey = Survey::new("s1", "Survey");
        for text in ["one", "two", "three"] {
            survey.add_question(new_question(QuestionType::Text, text)).unwrap();
        }
        let second = survey.questions[1].id.clone();
        assert!(survey.remove_question(&second));
        assert!(!survey.remove_question(&second));

        let added = survey.add_question(new_question(QuestionType::Text, "four")).unwrap();
        assert_eq!(added.order, 4);
    }

    #[test]
    fn test_update_logic_rejects_forward_reference() {
        let mut survey = Survey::new("s1", "Survey");
        for text in ["one", "two"] {
            survey.add_question(new_question(QuestionType::Text, text)).unwrap();
        }
        let first = survey.questions[0].id.clone();
        let second = survey.questions[1].id.clone();

        let logic = ConditionalLogic::new().add_condition();
        let cid = logic.conditions[0].id.clone();
        let forward = logic.update_condition(
            &cid,
            &ConditionPatch {
                target_question: Some(second.clone()),
                ..Default::default()
            },
        );

        let err = survey.update_logic(&first, forward).unwrap_err();
        assert!(matches!(err, SurveyLogicError::InvalidReference { .. }));

        // backward reference and an unset target are both accepted
        let backward = logic.update_condition(
            &cid,
            &ConditionPatch {
                target_question: Some(first.clone()),
                ..Default::default()
            },
        );
        survey.update_logic(&second, backward.clone()).unwrap();
        survey.update_logic(&first, logic.clone()).unwrap();
        assert_eq!(survey.question(&second).unwrap().conditional_logic, backward);
    }

    #[test]
    fn test_update_logic_unknown_question() {
        let mut survey = Survey::new("s1", "Survey");
        let err = survey.update_logic("nope", ConditionalLogic::new()).unwrap_err();
        assert_eq!(err, SurveyLogicError::QuestionNotFound("nope".to_string()));
    }

    #[test]
    fn test_survey_json_round_trip() {
        let json = r#"{
            "id": "1",
            "title": "Customer Satisfaction Survey",
            "status": "active",
            "questions": [
                {"id": "1", "type": "rating", "text": "How satisfied are you?", "required": true, "order": 1},
                {"id": "2", "type": "multiple", "text": "Which product?", "options": ["Product A", "Product B"], "order": 2}
            ]
        }"#;

        let survey = Survey::from_json(json).unwrap();
        assert_eq!(survey.status, SurveyStatus::Active);
        assert_eq!(survey.questions.len(), 2);

        let again = Survey::from_json(&survey.to_json().unwrap()).unwrap();
        assert_eq!(again, survey);
    }

    #[test]
    fn test_from_json_numbers_questions_without_order() {
        let json = r#"{
            "id": "1",
            "title": "Customer Satisfaction Survey",
            "description": "Measure customer satisfaction with our products",
            "createdAt": "2024-01-15T00:00:00.000Z",
            "responses": 42,
            "status": "active",
            "questions": [
                {"id": "1", "type": "rating", "text": "How satisfied are you with our service?", "required": true},
                {"id": "2", "type": "multiple", "text": "Which product did you purchase?", "options": ["Product A", "Product B", "Product C"]}
            ]
        }"#;

        let survey = Survey::from_json(json).unwrap();
        let orders: Vec<_> = survey.questions.iter().map(|q| (q.id.as_str(), q.order)).collect();
        assert_eq!(orders, vec![("1", 1), ("2", 2)]);
        assert_eq!(survey.questions[1].options.len(), 3);

        // explicit orders are kept
        let json = r#"{"questions": [{"id": "a", "text": "A", "order": 5}, {"id": "b"}]}"#;
        let survey = Survey::from_json(json).unwrap();
        assert_eq!(survey.questions[0].order, 5);
        assert_eq!(survey.questions[1].order, 2);
        assert_eq!(survey.questions[1].text, "");
    }
}
