use crate::types::Question;
use serde::Serialize;
use std::collections::BTreeMap;

pub const UNCLASSIFIED_SUBJECT: &str = "Unclassified";
pub const UNCLASSIFIED_TOPIC: &str = "General";

const HIGH_CONFIDENCE: f64 = 0.7;
const MEDIUM_CONFIDENCE: f64 = 0.4;

/// Counters derived purely from a question sequence.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QuestionSummary {
    pub total_questions: usize,
    pub questions_with_answers: usize,
    pub distinct_subjects: usize,
    pub average_confidence: f64,
    /// Most frequent first; ties keep first-seen order
    pub subjects: Vec<CountEntry>,
    /// Keyed `subject::topic`
    pub topics: Vec<CountEntry>,
    /// Option count → number of questions
    pub option_distribution: BTreeMap<usize, usize>,
    pub confidence_ranges: ConfidenceRanges,
    pub average_question_length: f64,
    pub average_option_length: f64,
    pub completeness: Completeness,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountEntry {
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConfidenceRanges {
    /// ≥ 0.7
    pub high: usize,
    /// [0.4, 0.7)
    pub medium: usize,
    /// < 0.4
    pub low: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Completeness {
    pub with_subject: usize,
    pub with_topic: usize,
    pub with_answer: usize,
}

impl QuestionSummary {
    pub fn from_questions(questions: &[Question]) -> Self {
        if questions.is_empty() {
            return Self::default();
        }

        let total = questions.len();
        let subjects = count_by(questions.iter().map(|q| {
            q.subject.as_deref().unwrap_or(UNCLASSIFIED_SUBJECT).to_string()
        }));
        let topics = count_by(questions.iter().map(|q| {
            format!(
                "{}::{}",
                q.subject.as_deref().unwrap_or(UNCLASSIFIED_SUBJECT),
                q.topic.as_deref().unwrap_or(UNCLASSIFIED_TOPIC)
            )
        }));

        let mut option_distribution = BTreeMap::new();
        for question in questions {
            *option_distribution.entry(question.options.len()).or_insert(0) += 1;
        }

        let question_lengths: Vec<usize> =
            questions.iter().map(|q| q.question_text.chars().count()).collect();
        let option_lengths: Vec<usize> = questions
            .iter()
            .flat_map(|q| q.options.iter().map(|o| o.text.chars().count()))
            .collect();

        Self {
            total_questions: total,
            questions_with_answers: questions.iter().filter(|q| q.correct_answer.is_some()).count(),
            distinct_subjects: questions
                .iter()
                .filter_map(|q| q.subject.as_deref())
                .collect::<std::collections::HashSet<_>>()
                .len(),
            average_confidence: mean(questions.iter().map(|q| q.confidence)),
            subjects,
            topics,
            option_distribution,
            confidence_ranges: confidence_ranges(questions),
            average_question_length: mean(question_lengths.iter().map(|&l| l as f64)),
            average_option_length: mean(option_lengths.iter().map(|&l| l as f64)),
            completeness: Completeness {
                with_subject: questions.iter().filter(|q| q.subject.is_some()).count(),
                with_topic: questions.iter().filter(|q| q.topic.is_some()).count(),
                with_answer: questions.iter().filter(|q| q.correct_answer.is_some()).count(),
            },
        }
    }
}

fn count_by(keys: impl Iterator<Item = String>) -> Vec<CountEntry> {
    let mut entries: Vec<CountEntry> = Vec::new();
    for key in keys {
        match entries.iter_mut().find(|e| e.name == key) {
            Some(entry) => entry.count += 1,
            None => entries.push(CountEntry { name: key, count: 1 }),
        }
    }
    // Stable sort keeps first-seen order among equal counts
    entries.sort_by(|a, b| b.count.cmp(&a.count));
    entries
}

fn confidence_ranges(questions: &[Question]) -> ConfidenceRanges {
    let mut ranges = ConfidenceRanges::default();
    for question in questions {
        if question.confidence >= HIGH_CONFIDENCE {
            ranges.high += 1;
        } else if question.confidence >= MEDIUM_CONFIDENCE {
            ranges.medium += 1;
        } else {
            ranges.low += 1;
        }
    }
    ranges
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{McqOption, QuestionCandidate};
    use pretty_assertions::assert_eq;

    fn question(id: &str, subject: Option<&str>, confidence: f64, answer: Option<char>) -> Question {
        let mut q = Question::from_candidate(
            QuestionCandidate {
                question_text: "Which one?".to_string(),
                options: vec![McqOption::new('a', "Alpha"), McqOption::new('b', "Beta")],
                correct_answer: answer,
            },
            id.to_string(),
            confidence,
        );
        q.subject = subject.map(str::to_string);
        q.topic = subject.map(|_| "Core".to_string());
        q
    }

    #[test]
    fn empty_input_gives_zeroed_summary() {
        assert_eq!(QuestionSummary::from_questions(&[]), QuestionSummary::default());
    }

    #[test]
    fn counts_and_orders_breakdowns() {
        let questions = vec![
            question("Q001", Some("Physics"), 0.9, Some('A')),
            question("Q002", None, 0.5, None),
            question("Q003", Some("Physics"), 0.2, None),
            question("Q004", Some("Mathematics"), 0.7, None),
        ];
        let summary = QuestionSummary::from_questions(&questions);

        assert_eq!(summary.total_questions, 4);
        assert_eq!(summary.questions_with_answers, 1);
        assert_eq!(summary.distinct_subjects, 2);
        assert_eq!(
            summary.subjects,
            vec![
                CountEntry { name: "Physics".to_string(), count: 2 },
                CountEntry { name: "Unclassified".to_string(), count: 1 },
                CountEntry { name: "Mathematics".to_string(), count: 1 },
            ]
        );
        assert_eq!(summary.topics[1].name, "Unclassified::General");
        assert_eq!(summary.confidence_ranges, ConfidenceRanges { high: 2, medium: 1, low: 1 });
        assert_eq!(summary.option_distribution.get(&2), Some(&4));
        assert!((summary.average_confidence - 0.575).abs() < 1e-9);
        assert!((summary.average_option_length - 4.5).abs() < 1e-9);
        assert_eq!(summary.completeness.with_subject, 3);
    }
}
