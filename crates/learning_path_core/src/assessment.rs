//! crates/learning_path_core/src/assessment.rs
//!
//! The two ways of proving a topic: a multiple-choice quiz for lessons and an
//! evaluated free-text task for checkpoints. Passing either one is what allows
//! the caller to complete the topic.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::domain::{QuizQuestion, Task, TaskEvaluation, Topic, TopicStatus, TopicType};
use crate::error::{LearningError, LearningResult};
use crate::ports::{QuizGenerationService, TaskService};

/// Share of correct quiz answers, in percent, needed to pass.
pub const QUIZ_PASS_PERCENT: usize = 70;

/// Score the evaluator is told to require for a pass. The returned `passed`
/// flag is trusted as-is; this value is never re-checked locally.
pub const TASK_PASS_SCORE: u8 = 70;

pub fn quiz_passed(score: usize, total: usize) -> bool {
    total > 0 && score * 100 >= total * QUIZ_PASS_PERCENT
}

//=========================================================================================
// Quiz
//=========================================================================================

/// A question as shown before it is answered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionView {
    pub index: usize,
    pub total: usize,
    pub question: String,
    pub options: Vec<String>,
}

/// What the user sees once an answer is submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerReveal {
    pub selected: String,
    pub correct_answer: String,
    pub correct: bool,
    pub explanation: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuizResult {
    pub score: usize,
    pub total: usize,
    pub passed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizStep {
    Question(QuestionView),
    Finished(QuizResult),
}

#[derive(Debug, Clone)]
pub struct QuizSession {
    topic_id: Uuid,
    questions: Vec<QuizQuestion>,
    current: usize,
    selected: Option<String>,
    submitted: bool,
    score: usize,
    finished: bool,
}

impl QuizSession {
    /// Starts an attempt. Option order is shuffled once, here; the correct
    /// answer is matched by value so shuffling never changes it.
    pub fn new<R: Rng + ?Sized>(
        topic_id: Uuid,
        mut questions: Vec<QuizQuestion>,
        rng: &mut R,
    ) -> Self {
        for question in &mut questions {
            question.options.shuffle(rng);
        }
        Self {
            topic_id,
            questions,
            current: 0,
            selected: None,
            submitted: false,
            score: 0,
            finished: false,
        }
    }

    pub fn topic_id(&self) -> Uuid {
        self.topic_id
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn current_question(&self) -> Option<QuestionView> {
        if self.finished {
            return None;
        }
        self.questions.get(self.current).map(|q| QuestionView {
            index: self.current,
            total: self.questions.len(),
            question: q.question.clone(),
            options: q.options.clone(),
        })
    }

    /// Picks an option; may be called repeatedly until the answer is submitted.
    pub fn select_option(&mut self, option: &str) -> LearningResult<()> {
        if self.finished {
            return Err(LearningError::QuizFinished);
        }
        if self.submitted {
            return Err(LearningError::AnswerAlreadySubmitted);
        }
        let question = &self.questions[self.current];
        if !question.options.iter().any(|o| o == option) {
            return Err(LearningError::UnknownOption(option.to_string()));
        }
        self.selected = Some(option.to_string());
        Ok(())
    }

    /// Locks in the selected option and reveals whether it was right.
    pub fn submit(&mut self) -> LearningResult<AnswerReveal> {
        if self.finished {
            return Err(LearningError::QuizFinished);
        }
        if self.submitted {
            return Err(LearningError::AnswerAlreadySubmitted);
        }
        let selected = self.selected.clone().ok_or(LearningError::NoAnswerSelected)?;
        let question = &self.questions[self.current];
        let correct = selected == question.correct_answer;
        if correct {
            self.score += 1;
        }
        self.submitted = true;

        Ok(AnswerReveal {
            selected,
            correct_answer: question.correct_answer.clone(),
            correct,
            explanation: question.explanation.clone(),
        })
    }

    /// Moves past a submitted answer: either to the next question or to the result.
    pub fn next(&mut self) -> LearningResult<QuizStep> {
        if self.finished {
            return Err(LearningError::QuizFinished);
        }
        if !self.submitted {
            return Err(LearningError::AnswerNotSubmitted);
        }

        if self.current + 1 < self.questions.len() {
            self.current += 1;
            self.selected = None;
            self.submitted = false;
            let view = self
                .current_question()
                .ok_or(LearningError::QuizFinished)?;
            return Ok(QuizStep::Question(view));
        }

        self.finished = true;
        let result = QuizResult {
            score: self.score,
            total: self.questions.len(),
            passed: quiz_passed(self.score, self.questions.len()),
        };
        info!(
            "Quiz for topic {} finished: {}/{} (passed: {})",
            self.topic_id, result.score, result.total, result.passed
        );
        Ok(QuizStep::Finished(result))
    }
}

//=========================================================================================
// Task
//=========================================================================================

/// Everything the evaluator needs for one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSubmission {
    pub topic_id: Uuid,
    pub task_description: String,
    pub submission: String,
    pub topic_title: String,
}

impl TaskSubmission {
    pub async fn evaluate(&self, evaluator: &dyn TaskService) -> LearningResult<TaskEvaluation> {
        let evaluation = evaluator
            .evaluate_task(&self.task_description, &self.submission, &self.topic_title)
            .await?
            .validate()?;
        Ok(evaluation)
    }
}

#[derive(Debug, Clone)]
pub struct TaskSession {
    topic_id: Uuid,
    topic_title: String,
    task: Task,
    last_evaluation: Option<TaskEvaluation>,
}

impl TaskSession {
    pub fn new(topic: &Topic, task: Task) -> Self {
        Self {
            topic_id: topic.id,
            topic_title: topic.title.clone(),
            task,
            last_evaluation: None,
        }
    }

    pub fn topic_id(&self) -> Uuid {
        self.topic_id
    }

    pub fn task(&self) -> &Task {
        &self.task
    }

    pub fn last_evaluation(&self) -> Option<&TaskEvaluation> {
        self.last_evaluation.as_ref()
    }

    /// Packages a submission for evaluation. Blank submissions are rejected
    /// before anything is sent.
    pub fn submission(&self, text: &str) -> LearningResult<TaskSubmission> {
        if text.trim().is_empty() {
            return Err(LearningError::InvalidInput(
                "Please write a submission before sending it for evaluation.".to_string(),
            ));
        }
        Ok(TaskSubmission {
            topic_id: self.topic_id,
            task_description: self.task.description.clone(),
            submission: text.to_string(),
            topic_title: self.topic_title.clone(),
        })
    }

    /// Whether `submission` was made against this task.
    pub fn accepts(&self, submission: &TaskSubmission) -> bool {
        submission.topic_id == self.topic_id
            && submission.task_description == self.task.description
    }

    /// Stores the evaluator's verdict. The task stays the same for resubmissions.
    pub fn record(&mut self, evaluation: TaskEvaluation) -> &TaskEvaluation {
        info!(
            "Task for topic {} evaluated: score {} (passed: {})",
            self.topic_id, evaluation.score, evaluation.passed
        );
        self.last_evaluation.insert(evaluation)
    }

    pub async fn submit(
        &mut self,
        text: &str,
        evaluator: &dyn TaskService,
    ) -> LearningResult<TaskEvaluation> {
        let evaluation = self.submission(text)?.evaluate(evaluator).await?;
        Ok(self.record(evaluation).clone())
    }
}

//=========================================================================================
// Dispatch
//=========================================================================================

#[derive(Debug, Clone)]
pub enum Assessment {
    Quiz(QuizSession),
    Task(TaskSession),
}

impl Assessment {
    pub fn topic_id(&self) -> Uuid {
        match self {
            Assessment::Quiz(quiz) => quiz.topic_id(),
            Assessment::Task(task) => task.topic_id(),
        }
    }
}

/// Generates the assessment matching the topic's type.
///
/// Only unlocked topics can be assessed, and a lesson needs its content first
/// because the quiz is written from it.
pub async fn start_assessment(
    topic: &Topic,
    subject: &str,
    quizzes: &dyn QuizGenerationService,
    tasks: &dyn TaskService,
) -> LearningResult<Assessment> {
    match topic.status {
        TopicStatus::Locked => return Err(LearningError::TopicLocked(topic.id)),
        TopicStatus::Completed => return Err(LearningError::AlreadyCompleted(topic.id)),
        TopicStatus::Unlocked => {}
    }

    match topic.kind {
        TopicType::Lesson => {
            let content = topic.content.as_deref().ok_or_else(|| {
                LearningError::InvalidInput(
                    "The lesson content has not been loaded yet.".to_string(),
                )
            })?;
            info!("Generating quiz for topic '{}'", topic.title);
            let questions =
                crate::domain::validate_quiz(quizzes.generate_quiz(content, &topic.title).await?)?;
            let quiz = QuizSession::new(topic.id, questions, &mut rand::thread_rng());
            Ok(Assessment::Quiz(quiz))
        }
        TopicType::Checkpoint => {
            info!("Generating checkpoint task for topic '{}'", topic.title);
            let task = tasks.generate_task(&topic.title, subject).await?.validate()?;
            Ok(Assessment::Task(TaskSession::new(topic, task)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::PortError;
    use crate::test_support::{course, quiz, FakeGenerator};
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rstest::rstest;

    fn session() -> QuizSession {
        QuizSession::new(Uuid::new_v4(), quiz(), &mut StdRng::seed_from_u64(7))
    }

    fn answer(quiz: &mut QuizSession, correct: bool) -> QuizStep {
        let view = quiz.current_question().unwrap();
        let pick = view
            .options
            .iter()
            .find(|o| o.ends_with("-0") == correct)
            .unwrap()
            .clone();
        quiz.select_option(&pick).unwrap();
        quiz.submit().unwrap();
        quiz.next().unwrap()
    }

    #[rstest]
    #[case(2, 3, false)]
    #[case(3, 3, true)]
    #[case(7, 10, true)]
    #[case(6, 10, false)]
    #[case(0, 0, false)]
    fn quiz_pass_boundary(#[case] score: usize, #[case] total: usize, #[case] passed: bool) {
        assert_eq!(quiz_passed(score, total), passed);
    }

    #[test]
    fn shuffling_keeps_options_and_answer() {
        let original = quiz();
        let session = QuizSession::new(
            Uuid::new_v4(),
            original.clone(),
            &mut StdRng::seed_from_u64(1),
        );

        for (shuffled, source) in session.questions.iter().zip(&original) {
            let mut a = shuffled.options.clone();
            let mut b = source.options.clone();
            a.sort();
            b.sort();
            assert_eq!(a, b);
            assert_eq!(shuffled.correct_answer, source.correct_answer);
        }
    }

    #[test]
    fn selection_can_change_until_submitted() {
        let mut quiz = session();
        let options = quiz.current_question().unwrap().options;

        quiz.select_option(&options[0]).unwrap();
        quiz.select_option(&options[1]).unwrap();
        assert_eq!(quiz.selected(), Some(options[1].as_str()));

        let reveal = quiz.submit().unwrap();
        assert_eq!(reveal.selected, options[1]);
        assert_eq!(
            quiz.select_option(&options[2]),
            Err(LearningError::AnswerAlreadySubmitted)
        );
    }

    #[test]
    fn submit_and_next_require_the_right_order() {
        let mut quiz = session();
        assert_eq!(quiz.submit().unwrap_err(), LearningError::NoAnswerSelected);
        assert_eq!(quiz.next().unwrap_err(), LearningError::AnswerNotSubmitted);
        assert!(matches!(
            quiz.select_option("not an option"),
            Err(LearningError::UnknownOption(_))
        ));
    }

    #[test]
    fn two_of_three_fails() {
        let mut quiz = session();
        answer(&mut quiz, true);
        answer(&mut quiz, true);
        let step = answer(&mut quiz, false);

        assert_eq!(
            step,
            QuizStep::Finished(QuizResult {
                score: 2,
                total: 3,
                passed: false
            })
        );
        assert_eq!(quiz.current_question(), None);
        assert_eq!(quiz.next().unwrap_err(), LearningError::QuizFinished);
    }

    #[test]
    fn three_of_three_passes() {
        let mut quiz = session();
        assert!(matches!(
            answer(&mut quiz, true),
            QuizStep::Question(QuestionView { index: 1, .. })
        ));
        answer(&mut quiz, true);
        let QuizStep::Finished(result) = answer(&mut quiz, true) else {
            panic!("quiz should be finished");
        };
        assert!(result.passed);
    }

    #[tokio::test]
    async fn task_pass_follows_the_flag_not_the_score() {
        let topic = course(&[TopicStatus::Unlocked]).topics.remove(0);
        let generator = FakeGenerator {
            evaluation: Some(TaskEvaluation {
                passed: true,
                feedback: "Good enough".to_string(),
                score: 40,
            }),
            ..FakeGenerator::default()
        };
        let task = generator.generate_task(&topic.title, "Rust").await.unwrap();
        let mut session = TaskSession::new(&topic, task);

        let evaluation = session.submit("fn main() {}", &generator).await.unwrap();

        assert!(evaluation.passed);
        assert_eq!(session.last_evaluation().map(|e| e.score), Some(40));
    }

    #[tokio::test]
    async fn blank_task_submission_is_not_sent() {
        let topic = course(&[TopicStatus::Unlocked]).topics.remove(0);
        let generator = FakeGenerator::default();
        let mut session = TaskSession::new(
            &topic,
            Task {
                description: "Write a function".to_string(),
                evaluation_criteria: "Correctness".to_string(),
            },
        );

        let result = session.submit("  \n", &generator).await;

        assert!(matches!(result, Err(LearningError::InvalidInput(_))));
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn failed_evaluation_keeps_the_task_for_resubmission() {
        let topic = course(&[TopicStatus::Unlocked]).topics.remove(0);
        let task = Task {
            description: "Write a function".to_string(),
            evaluation_criteria: "Correctness".to_string(),
        };
        let mut session = TaskSession::new(&topic, task.clone());

        let result = session.submit("attempt", &FakeGenerator::failing()).await;

        assert!(matches!(result, Err(LearningError::Port(PortError::Unexpected(_)))));
        assert_eq!(session.task(), &task);
        assert!(session.last_evaluation().is_none());
    }

    #[test]
    fn submissions_only_match_the_task_they_were_written_for() {
        let course = course(&[TopicStatus::Unlocked, TopicStatus::Unlocked]);
        let task = |description: &str| Task {
            description: description.to_string(),
            evaluation_criteria: "Correctness".to_string(),
        };
        let first = TaskSession::new(&course.topics[0], task("Write a function"));
        let submission = first.submission("fn main() {}").unwrap();
        assert_eq!(submission.topic_id, course.topics[0].id);
        assert!(first.accepts(&submission));

        let regenerated = TaskSession::new(&course.topics[0], task("Write a macro"));
        let other_topic = TaskSession::new(&course.topics[1], task("Write a function"));
        assert!(!regenerated.accepts(&submission));
        assert!(!other_topic.accepts(&submission));
    }

    #[tokio::test]
    async fn assessment_follows_the_topic_type() {
        let generator = FakeGenerator::default();
        let mut course = course(&[TopicStatus::Unlocked, TopicStatus::Unlocked]);
        course.topics[0].content = Some("Ownership rules".to_string());
        course.topics[1].kind = TopicType::Checkpoint;

        let lesson = start_assessment(&course.topics[0], "Rust", &generator, &generator)
            .await
            .unwrap();
        let checkpoint = start_assessment(&course.topics[1], "Rust", &generator, &generator)
            .await
            .unwrap();

        assert!(matches!(lesson, Assessment::Quiz(_)));
        assert!(matches!(checkpoint, Assessment::Task(_)));
        assert_eq!(checkpoint.topic_id(), course.topics[1].id);
    }

    #[tokio::test]
    async fn lesson_without_content_or_finished_topic_cannot_be_assessed() {
        let generator = FakeGenerator::default();
        let mut course = course(&[TopicStatus::Completed, TopicStatus::Unlocked]);
        course.topics[0].content = Some("done".to_string());

        let completed = start_assessment(&course.topics[0], "Rust", &generator, &generator).await;
        let empty = start_assessment(&course.topics[1], "Rust", &generator, &generator).await;

        assert!(matches!(completed, Err(LearningError::AlreadyCompleted(_))));
        assert!(matches!(empty, Err(LearningError::InvalidInput(_))));
        assert_eq!(generator.calls(), 0);
    }
}
