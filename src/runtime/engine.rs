//! Survey-wide branching runtime

use crate::answer::AnswerSheet;
use crate::branch::{evaluate, BranchOutcome, Navigation, Visibility, VisibilityChanges};
use crate::config::EvaluatorOptions;
use crate::error::{Result, SurveyLogicError};
use crate::rule::{available_targets, validate_logic, Directive, LogicIssue};
use crate::survey::{Question, QuestionIndex, Survey};
use ahash::{AHashMap, AHashSet};
use serde::Serialize;
use tracing::{debug, warn};

/// Where the respondent goes after a question
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "question", rename_all = "snake_case")]
pub enum NextStep {
    Question(String),
    End,
}

/// Accumulated effect of every question's logic
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SurveyState {
    /// Final visibility of every question, in survey order
    pub visibility: VisibilityChanges,
    /// Navigation overrides of questions whose logic fired
    navigation: Vec<(String, Navigation)>,
    #[serde(skip)]
    navigation_index: AHashMap<String, usize>,
}

impl SurveyState {
    /// Unknown questions are not visible
    pub fn is_visible(&self, question_id: &str) -> bool {
        self.visibility
            .get(question_id)
            .is_some_and(Visibility::is_visible)
    }

    pub fn visible_questions(&self) -> Vec<&str> {
        self.filter(Visibility::Visible)
    }

    pub fn hidden_questions(&self) -> Vec<&str> {
        self.filter(Visibility::Hidden)
    }

    fn filter(&self, wanted: Visibility) -> Vec<&str> {
        self.visibility
            .iter()
            .filter(|(_, v)| *v == wanted)
            .map(|(id, _)| id)
            .collect()
    }

    pub fn navigation_for(&self, question_id: &str) -> Option<&Navigation> {
        self.navigation_index
            .get(question_id)
            .map(|&i| &self.navigation[i].1)
    }

    /// Navigation overrides in survey order
    pub fn navigation(&self) -> &[(String, Navigation)] {
        &self.navigation
    }

    /// Record `question_id`'s override, replacing an earlier one
    pub fn set_navigation(&mut self, question_id: &str, navigation: Navigation) {
        match self.navigation_index.get(question_id) {
            Some(&i) => self.navigation[i].1 = navigation,
            None => {
                self.navigation_index
                    .insert(question_id.to_string(), self.navigation.len());
                self.navigation.push((question_id.to_string(), navigation));
            }
        }
    }
}

/// Why a traversal stopped before reaching an unanswered question or the end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HaltReason {
    /// The next question was already on the path
    Cycle,
    /// The path reached `max_path_len`
    PathLimit,
}

impl HaltReason {
    pub fn as_str(self) -> &'static str {
        match self {
            HaltReason::Cycle => "cycle",
            HaltReason::PathLimit => "path_limit",
        }
    }
}

/// Route a respondent takes through the survey given their answers
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Traversal {
    pub state: SurveyState,
    /// Questions visited, in order
    pub path: Vec<String>,
    /// First unanswered question on the path
    pub current: Option<String>,
    /// Set when the walk was cut short; `current` is `None` then
    pub halted: Option<HaltReason>,
}

impl Traversal {
    /// The respondent reached the end of the survey
    pub fn is_complete(&self) -> bool {
        self.current.is_none() && self.halted.is_none()
    }
}

/// Evaluates one survey's branching logic. Immutable after construction.
pub struct SurveyEngine {
    survey_id: String,
    /// Sorted by ascending order
    questions: Vec<Question>,
    /// Id to position in `questions`
    positions: AHashMap<String, usize>,
    index: QuestionIndex,
    /// Targets of some `show_question` action
    gated: AHashSet<String>,
    options: EvaluatorOptions,
}

/// Engine over an empty survey
impl Default for SurveyEngine {
    fn default() -> Self {
        Self::new(Survey::default(), EvaluatorOptions::default())
    }
}

impl SurveyEngine {
    pub fn new(survey: Survey, options: EvaluatorOptions) -> Self {
        let mut questions = survey.questions;
        questions.sort_by_key(|q| q.order);

        let mut positions = AHashMap::with_capacity(questions.len());
        for (i, question) in questions.iter().enumerate() {
            positions.entry(question.id.clone()).or_insert(i);
        }
        let index = QuestionIndex::new(&questions);

        let gated: AHashSet<String> = questions
            .iter()
            .flat_map(|q| q.conditional_logic.actions.iter())
            .filter_map(|a| match a.directive() {
                Some(Directive::Show(target)) if index.contains(target) => Some(target.to_string()),
                _ => None,
            })
            .collect();

        debug!(
            survey = %survey.id,
            questions = questions.len(),
            gated = gated.len(),
            "survey engine ready"
        );

        Self {
            survey_id: survey.id,
            questions,
            positions,
            index,
            gated,
            options,
        }
    }

    pub fn survey_id(&self) -> &str {
        &self.survey_id
    }

    pub fn options(&self) -> &EvaluatorOptions {
        &self.options
    }

    /// Questions in ascending order
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn question(&self, id: &str) -> Option<&Question> {
        self.positions.get(id).map(|&i| &self.questions[i])
    }

    fn require(&self, id: &str) -> Result<&Question> {
        self.question(id)
            .ok_or_else(|| SurveyLogicError::QuestionNotFound(id.to_string()))
    }

    /// Legal condition targets for the question `id`
    pub fn available_targets(&self, id: &str) -> Result<Vec<&Question>> {
        let owning = self.require(id)?;
        Ok(available_targets(&self.questions, owning))
    }

    pub fn validate(&self, id: &str) -> Result<Vec<LogicIssue>> {
        let owning = self.require(id)?;
        Ok(validate_logic(&owning.conditional_logic, owning, &self.index))
    }

    /// Evaluate a single question's logic
    pub fn evaluate_question(&self, id: &str, answers: &AnswerSheet) -> Result<BranchOutcome> {
        let question = self.require(id)?;
        Ok(evaluate(question, &self.index, answers))
    }

    /// Evaluate every question's logic in order and accumulate the effects;
    /// a later question's show/hide overrides an earlier one's
    pub fn evaluate(&self, answers: &AnswerSheet) -> SurveyState {
        let mut state = SurveyState::default();

        for question in &self.questions {
            let initial = if self.options.gated_show_targets_start_hidden && self.gated.contains(&question.id) {
                Visibility::Hidden
            } else {
                Visibility::Visible
            };
            state.visibility.set(&question.id, initial);
        }

        for question in &self.questions {
            let outcome = evaluate(question, &self.index, answers);
            for (target, visibility) in outcome.visibility.iter() {
                state.visibility.set(target, visibility);
            }
            if let Some(navigation) = outcome.navigation {
                state.set_navigation(&question.id, navigation);
            }
        }

        state
    }

    /// Question presented after `current_id`
    pub fn next_question(&self, current_id: &str, answers: &AnswerSheet) -> Result<NextStep> {
        self.require(current_id)?;
        let state = self.evaluate(answers);
        Ok(self.step(&state, current_id))
    }

    fn step(&self, state: &SurveyState, current_id: &str) -> NextStep {
        match state.navigation_for(current_id) {
            Some(Navigation::End) => return NextStep::End,
            Some(Navigation::JumpTo(target)) => return NextStep::Question(target.clone()),
            None => {}
        }

        let Some(&position) = self.positions.get(current_id) else {
            return NextStep::End;
        };
        let current_order = self.questions[position].order;

        self.questions[position + 1..]
            .iter()
            .filter(|q| q.order > current_order)
            .find(|q| state.is_visible(&q.id))
            .map_or(NextStep::End, |q| NextStep::Question(q.id.clone()))
    }

    /// Follow the respondent from the first visible question while their
    /// answers allow; stops at the first unanswered question, at the end,
    /// or before revisiting a question
    pub fn traverse(&self, answers: &AnswerSheet) -> Traversal {
        let state = self.evaluate(answers);
        let mut path: Vec<String> = Vec::new();
        let mut visited: AHashSet<String> = AHashSet::new();
        let mut current = None;
        let mut halted = None;

        let mut next = self
            .questions
            .iter()
            .find(|q| state.is_visible(&q.id))
            .map(|q| q.id.clone());

        while let Some(id) = next.take() {
            if path.len() >= self.options.max_path_len {
                warn!(survey = %self.survey_id, limit = self.options.max_path_len, "path length limit reached");
                halted = Some(HaltReason::PathLimit);
                break;
            }
            if !visited.insert(id.clone()) {
                warn!(survey = %self.survey_id, question = %id, "branching revisits a question, stopping");
                halted = Some(HaltReason::Cycle);
                break;
            }

            path.push(id.clone());
            if answers.get(&id).is_none() {
                current = Some(id);
                break;
            }

            next = match self.step(&state, &id) {
                NextStep::Question(following) => Some(following),
                NextStep::End => None,
            };
        }

        debug!(survey = %self.survey_id, path = path.len(), current = ?current, halted = ?halted, "traversal finished");
        Traversal {
            state,
            path,
            current,
            halted,
        }
    }

    /// Question ids the respondent visits
    pub fn path(&self, answers: &AnswerSheet) -> Vec<String> {
        self.traverse(answers).path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::{Action, ActionType, Combinator, Condition, ConditionType, ConditionalLogic};
    use crate::survey::QuestionType;

    fn show_if(target: &str, value: &str, show: &str) -> ConditionalLogic {
        ConditionalLogic {
            conditions: vec![Condition {
                id: "c1".to_string(),
                target_question: target.to_string(),
                kind: ConditionType::Equals,
                value: value.to_string(),
                operator: Combinator::And,
            }],
            actions: vec![Action {
                id: "a1".to_string(),
                kind: ActionType::ShowQuestion,
                target_question: show.to_string(),
            }],
        }
    }

    fn action(kind: ActionType, target: &str) -> Action {
        Action {
            id: format!("{}-{}", kind.as_str(), target),
            kind,
            target_question: target.to_string(),
        }
    }

    fn engine(questions: Vec<Question>) -> SurveyEngine {
        let survey = Survey {
            id: "s1".to_string(),
            questions,
            ..Default::default()
        };
        SurveyEngine::new(survey, EvaluatorOptions::default())
    }

    fn product_survey() -> SurveyEngine {
        engine(vec![
            Question::new("q1", QuestionType::Multiple, "Which product?", 1)
                .with_options(["Product A", "Product B"]),
            Question::new("q2", QuestionType::Rating, "How satisfied?", 2)
                .with_logic(show_if("q1", "Product A", "q3")),
            Question::new("q3", QuestionType::Text, "What do you like about Product A?", 3),
            Question::new("q4", QuestionType::Text, "Anything else?", 4),
        ])
    }

    #[test]
    fn test_evaluate_question_scenario() {
        let engine = product_survey();

        let outcome = engine
            .evaluate_question("q2", &AnswerSheet::new().with("q1", "Product A"))
            .unwrap();
        assert_eq!(outcome.visibility.get("q3"), Some(Visibility::Visible));

        let outcome = engine
            .evaluate_question("q2", &AnswerSheet::new().with("q1", "Product B"))
            .unwrap();
        assert!(outcome.visibility.is_empty());

        let err = engine.evaluate_question("q9", &AnswerSheet::new()).unwrap_err();
        assert_eq!(err, SurveyLogicError::QuestionNotFound("q9".to_string()));
    }

    #[test]
    fn test_gated_question_starts_hidden() {
        let engine = product_survey();

        let state = engine.evaluate(&AnswerSheet::new().with("q1", "Product B"));
        assert!(!state.is_visible("q3"));
        assert_eq!(state.hidden_questions(), vec!["q3"]);
        assert_eq!(state.visible_questions(), vec!["q1", "q2", "q4"]);

        let state = engine.evaluate(&AnswerSheet::new().with("q1", "Product A"));
        assert!(state.is_visible("q3"));
    }

    #[test]
    fn test_gating_can_be_disabled() {
        let survey = Survey {
            questions: product_survey().questions().to_vec(),
            ..Default::default()
        };
        let options = EvaluatorOptions {
            gated_show_targets_start_hidden: false,
            ..Default::default()
        };
        let engine = SurveyEngine::new(survey, options);

        let state = engine.evaluate(&AnswerSheet::new());
        assert!(state.is_visible("q3"));
    }

    #[test]
    fn test_later_question_overrides_visibility() {
        let always = |actions: Vec<Action>| ConditionalLogic {
            conditions: vec![],
            actions,
        };
        let engine = engine(vec![
            Question::new("q1", QuestionType::Text, "One", 1).with_logic(always(vec![action(ActionType::ShowQuestion, "q4")])),
            Question::new("q2", QuestionType::Text, "Two", 2).with_logic(always(vec![action(ActionType::HideQuestion, "q4")])),
            Question::new("q3", QuestionType::Text, "Three", 3),
            Question::new("q4", QuestionType::Text, "Four", 4),
        ]);

        let state = engine.evaluate(&AnswerSheet::new());
        assert!(!state.is_visible("q4"));
    }

    #[test]
    fn test_next_question_skips_hidden() {
        let engine = product_survey();
        let answers = AnswerSheet::new().with("q1", "Product B").with("q2", 4);

        assert_eq!(engine.next_question("q2", &answers).unwrap(), NextStep::Question("q4".to_string()));
        assert_eq!(engine.next_question("q4", &answers).unwrap(), NextStep::End);

        let answers = AnswerSheet::new().with("q1", "Product A");
        assert_eq!(engine.next_question("q2", &answers).unwrap(), NextStep::Question("q3".to_string()));
    }

    #[test]
    fn test_next_question_jump_and_end() {
        let logic = |actions| ConditionalLogic {
            conditions: vec![Condition {
                id: "c1".to_string(),
                target_question: "q1".to_string(),
                kind: ConditionType::GreaterThan,
                value: "3".to_string(),
                operator: Combinator::And,
            }],
            actions,
        };
        let engine = engine(vec![
            Question::new("q1", QuestionType::Rating, "Rate us", 1),
            Question::new("q2", QuestionType::Text, "Why?", 2)
                .with_logic(logic(vec![action(ActionType::JumpToQuestion, "q4")])),
            Question::new("q3", QuestionType::Text, "What went wrong?", 3)
                .with_logic(logic(vec![
                    action(ActionType::JumpToQuestion, "q4"),
                    action(ActionType::SkipToEnd, ""),
                ])),
            Question::new("q4", QuestionType::Text, "Thanks", 4),
        ]);

        let happy = AnswerSheet::new().with("q1", 5);
        assert_eq!(engine.next_question("q2", &happy).unwrap(), NextStep::Question("q4".to_string()));
        assert_eq!(engine.next_question("q3", &happy).unwrap(), NextStep::End);

        let unhappy = AnswerSheet::new().with("q1", 2);
        assert_eq!(engine.next_question("q2", &unhappy).unwrap(), NextStep::Question("q3".to_string()));
    }

    #[test]
    fn test_traverse_stops_at_first_unanswered() {
        let engine = product_survey();
        let answers = AnswerSheet::new().with("q1", "Product B");

        let traversal = engine.traverse(&answers);
        assert_eq!(traversal.path, vec!["q1", "q2"]);
        assert_eq!(traversal.current.as_deref(), Some("q2"));
        assert!(!traversal.is_complete());

        let answers = answers.with("q2", 3).with("q4", "no");
        let traversal = engine.traverse(&answers);
        assert_eq!(traversal.path, vec!["q1", "q2", "q4"]);
        assert_eq!(traversal.halted, None);
        assert!(traversal.is_complete());
    }

    #[test]
    fn test_traverse_stops_on_cycle() {
        let back = ConditionalLogic {
            conditions: vec![],
            actions: vec![action(ActionType::JumpToQuestion, "q1")],
        };
        let engine = engine(vec![
            Question::new("q1", QuestionType::Text, "One", 1),
            Question::new("q2", QuestionType::Text, "Two", 2).with_logic(back),
        ]);
        let answers = AnswerSheet::new().with("q1", "a").with("q2", "b");

        let traversal = engine.traverse(&answers);
        assert_eq!(traversal.path, vec!["q1", "q2"]);
        assert_eq!(traversal.current, None);
        assert_eq!(traversal.halted, Some(HaltReason::Cycle));
        assert!(!traversal.is_complete());
    }

    #[test]
    fn test_traverse_respects_path_limit() {
        let questions = (1..=10)
            .map(|i| Question::new(format!("q{}", i), QuestionType::Text, "Q", i))
            .collect();
        let survey = Survey {
            questions,
            ..Default::default()
        };
        let options = EvaluatorOptions {
            max_path_len: 3,
            ..Default::default()
        };
        let engine = SurveyEngine::new(survey, options);
        let answers: AnswerSheet = (1..=10).map(|i| (format!("q{}", i), "x")).collect();

        assert_eq!(engine.path(&answers).len(), 3);
    }

    #[test]
    fn test_path_limit_is_not_completion() {
        let questions = (1..=3)
            .map(|i| Question::new(format!("q{}", i), QuestionType::Text, "Q", i))
            .collect();
        let survey = Survey {
            questions,
            ..Default::default()
        };
        let options = EvaluatorOptions {
            max_path_len: 2,
            ..Default::default()
        };
        let engine = SurveyEngine::new(survey, options);
        let answers = AnswerSheet::new().with("q1", "a").with("q2", "b");

        let traversal = engine.traverse(&answers);
        assert_eq!(traversal.path, vec!["q1", "q2"]);
        assert_eq!(traversal.halted, Some(HaltReason::PathLimit));
        assert!(!traversal.is_complete());

        // the same answers with room to spare reach q3
        let engine = SurveyEngine::new(
            Survey {
                questions: engine.questions().to_vec(),
                ..Default::default()
            },
            EvaluatorOptions::default(),
        );
        let traversal = engine.traverse(&answers);
        assert_eq!(traversal.current.as_deref(), Some("q3"));
        assert_eq!(traversal.halted, None);
    }

    #[test]
    fn test_state_navigation_lookup() {
        let engine = engine(vec![
            Question::new("q1", QuestionType::Text, "One", 1).with_logic(ConditionalLogic {
                conditions: vec![],
                actions: vec![action(ActionType::SkipToEnd, "")],
            }),
            Question::new("q2", QuestionType::Text, "Two", 2),
        ]);

        let state = engine.evaluate(&AnswerSheet::new());
        assert_eq!(state.navigation_for("q1"), Some(&Navigation::End));
        assert_eq!(state.navigation_for("q2"), None);
        assert_eq!(state.navigation().len(), 1);
    }

    #[test]
    fn test_large_survey_walk() {
        // each question shows the one after next
        let count = 5000u32;
        let questions = (1..=count)
            .map(|i| {
                Question::new(format!("q{}", i), QuestionType::Text, "Q", i).with_logic(ConditionalLogic {
                    conditions: vec![],
                    actions: vec![action(ActionType::ShowQuestion, &format!("q{}", i + 2))],
                })
            })
            .collect();
        let survey = Survey {
            questions,
            ..Default::default()
        };
        let options = EvaluatorOptions {
            max_path_len: count as usize,
            ..Default::default()
        };
        let engine = SurveyEngine::new(survey, options);
        let answers: AnswerSheet = (1..=count).map(|i| (format!("q{}", i), "x")).collect();

        let traversal = engine.traverse(&answers);
        assert_eq!(traversal.path.len(), count as usize);
        assert!(traversal.is_complete());
        assert!(engine.evaluate(&answers).hidden_questions().is_empty());
    }

    #[test]
    fn test_default_engine_is_empty() {
        let engine = SurveyEngine::default();
        assert!(engine.questions().is_empty());
        assert!(engine.traverse(&AnswerSheet::new()).is_complete());
    }

    #[test]
    fn test_questions_sorted_by_order() {
        let engine = engine(vec![
            Question::new("b", QuestionType::Text, "Second", 2),
            Question::new("a", QuestionType::Text, "First", 1),
        ]);
        let ids: Vec<_> = engine.questions().iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);

        let targets = engine.available_targets("b").unwrap();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].id, "a");
        assert!(engine.validate("a").unwrap().is_empty());
    }
}
