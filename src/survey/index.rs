//! Hash lookup over a survey's questions

use crate::survey::question::Question;
use ahash::AHashMap;

/// Question id to order, for constant-time reference checks during
/// evaluation. When ids repeat, the first question keeps the id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionIndex {
    orders: AHashMap<String, u32>,
}

impl QuestionIndex {
    pub fn new(questions: &[Question]) -> Self {
        let mut orders = AHashMap::with_capacity(questions.len());
        for question in questions {
            orders.entry(question.id.clone()).or_insert(question.order);
        }
        Self { orders }
    }

    #[inline]
    pub fn order(&self, id: &str) -> Option<u32> {
        self.orders.get(id).copied()
    }

    #[inline]
    pub fn contains(&self, id: &str) -> bool {
        self.orders.contains_key(id)
    }

    /// Whether `target` names a question a condition on `owning` may read
    #[inline]
    pub fn is_available_target(&self, owning: &Question, target: &str) -> bool {
        self.order(target).is_some_and(|order| order < owning.order)
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}
