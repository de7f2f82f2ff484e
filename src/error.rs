use std::error::Error;
use std::fmt;

/// 解析问卷文件时产生的错误，任意一种都会中止整个构建
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    /// 文件为空或不包含任何题目
    EmptyDocument,
    /// 题号与期望的序号不一致
    UnexpectedQuestionNumber { line: usize, found: u32, expected: u32 },
    /// 单题选项超过3个
    TooManyChoices { line: usize, question: u32 },
    /// 选项字母重复、乱序或跳号
    UnexpectedChoiceLetter { line: usize, found: char, expected: char },
    /// 题目没有标记正确答案
    MissingCorrectMarker { question: u32 },
    /// 题目标记了多个正确答案
    MultipleCorrectMarkers { question: u32, line: usize },
    /// 题目没有任何选项
    IncompleteRecord { question: u32 },
    /// 无法识别的行
    UnrecognizedLine { line: usize },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParseError::EmptyDocument => {
                write!(f, "问卷文件为空或不包含任何题目")
            }
            ParseError::UnexpectedQuestionNumber { line, found, expected } => {
                write!(f, "第{}行题号错误: 期望{}.，实际为{}.", line, expected, found)
            }
            ParseError::TooManyChoices { line, question } => {
                write!(f, "第{}行: 题目{}的选项超过3个", line, question)
            }
            ParseError::UnexpectedChoiceLetter { line, found, expected } => {
                write!(f, "第{}行选项字母错误: 期望{})，实际为{})", line, expected, found)
            }
            ParseError::MissingCorrectMarker { question } => {
                write!(f, "题目{}没有标记正确答案", question)
            }
            ParseError::MultipleCorrectMarkers { question, line } => {
                write!(f, "第{}行: 题目{}标记了多个正确答案", line, question)
            }
            ParseError::IncompleteRecord { question } => {
                write!(f, "题目{}没有任何选项", question)
            }
            ParseError::UnrecognizedLine { line } => {
                write!(f, "第{}行无法识别", line)
            }
        }
    }
}

impl Error for ParseError {}

/// 处理单次提交时产生的错误，只影响当前请求，不影响会话状态
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionError {
    /// 该昵称已被占用
    DuplicateIdentifier(String),
    /// 该昵称已经提交过答卷
    AlreadySubmitted(String),
    /// 答案数量与题目数量不一致
    AnswerCountMismatch { expected: usize, found: usize },
    /// 选择了题目中不存在的选项
    UnknownChoice { question: u32, letter: char },
}

impl fmt::Display for SubmissionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SubmissionError::DuplicateIdentifier(pseudo) => {
                write!(f, "昵称{}已被占用", pseudo)
            }
            SubmissionError::AlreadySubmitted(pseudo) => {
                write!(f, "昵称{}已经提交过答卷", pseudo)
            }
            SubmissionError::AnswerCountMismatch { expected, found } => {
                write!(f, "答案数量不正确: 需要{}个，收到{}个", expected, found)
            }
            SubmissionError::UnknownChoice { question, letter } => {
                write!(f, "题目{}不存在选项{}", question, letter)
            }
        }
    }
}

impl Error for SubmissionError {}
