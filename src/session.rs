use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use time::OffsetDateTime;

use crate::error::SubmissionError;
use crate::structs::awl_type::Pseudo;
use crate::structs::quiz::Quiz;
use crate::utils::mark;

/// 一次有效提交的完整记录，创建后不再修改
#[derive(Debug, Clone)]
pub struct SubmissionRecord {
    pub pseudo: Pseudo,
    pub answers: Vec<char>,
    pub per_question_correct: Vec<bool>,
    /// 仅用于诊断
    pub source_address: String,
    pub received_at: OffsetDateTime,
}

/// 一场在线答题的全部状态，由协调器独占持有和修改
#[derive(Debug)]
pub struct Session {
    quiz: Arc<Quiz>,
    /// 预留昵称的名单
    registered: HashSet<Pseudo>,
    /// 昵称和提交记录的键值对，每个昵称最多出现一次
    roster: HashMap<Pseudo, SubmissionRecord>,
    /// 预期提交人数，不填则永远不会宣布完成
    expected_count: Option<usize>,
    /// 完成消息只在人数达到预期的那一次发出
    complete_announced: bool,
}

impl Session {
    pub fn new(quiz: Arc<Quiz>, expected_count: Option<usize>) -> Session {
        Session {
            quiz,
            registered: HashSet::new(),
            roster: HashMap::new(),
            expected_count,
            complete_announced: false,
        }
    }

    /// 学生打开页面时预留一个昵称
    pub fn register(&mut self, pseudo: &str) -> Result<(), SubmissionError> {
        if !self.registered.insert(pseudo.to_string()) {
            return Err(SubmissionError::DuplicateIdentifier(pseudo.to_string()));
        }
        Ok(())
    }

    /// 校验、打分并记录一次提交，重复提交会被拒绝而不是覆盖
    pub fn record_submission(
        &mut self,
        pseudo: &str,
        answers: Vec<char>,
        source_address: String,
    ) -> Result<&SubmissionRecord, SubmissionError> {
        if self.roster.contains_key(pseudo) {
            return Err(SubmissionError::AlreadySubmitted(pseudo.to_string()));
        }
        if answers.len() != self.quiz.questions.len() {
            return Err(SubmissionError::AnswerCountMismatch {
                expected: self.quiz.questions.len(),
                found: answers.len(),
            });
        }
        for (question, letter) in self.quiz.questions.iter().zip(answers.iter()) {
            if !question.has_letter(*letter) {
                return Err(SubmissionError::UnknownChoice {
                    question: question.number,
                    letter: *letter,
                });
            }
        }

        let per_question_correct = mark(&self.quiz, &answers);
        let record = SubmissionRecord {
            pseudo: pseudo.to_string(),
            answers,
            per_question_correct,
            source_address,
            received_at: OffsetDateTime::now_utc(),
        };
        // 提交即视为已注册
        self.registered.insert(pseudo.to_string());
        Ok(&*self.roster.entry(pseudo.to_string()).or_insert(record))
    }

    /// 已提交的昵称数量
    pub fn current_count(&self) -> usize {
        self.roster.len()
    }

    pub fn is_complete(&self) -> bool {
        self.expected_count == Some(self.roster.len())
    }

    /// 只在人数从k-1变为k的那一次提交返回true，之后的迟到提交不再触发
    pub fn take_completion(&mut self) -> bool {
        if self.complete_announced || !self.is_complete() {
            return false;
        }
        self.complete_announced = true;
        true
    }
}
