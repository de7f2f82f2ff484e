use crate::error::ParseError;
use crate::structs::quiz::{Choice, Question, Quiz};

/// 正确答案的行尾标记
const CORRECT_MARKER: &str = "$true$";
/// 单题最多允许的选项数
const MAX_CHOICES: usize = 3;

/// 解析状态机的状态
///
/// 文法为: 标题行 → 保留行 → 若干个由空行分隔的题目块
#[derive(Debug, Clone, Copy, PartialEq)]
enum State {
    /// 第一行为标题
    Title,
    /// 第二行为保留行，内容全部忽略
    Separator,
    /// 等待下一题的题目行
    BetweenRecords,
    /// 正在读取当前题目的选项行
    InRecord,
}

/// 正在读取中的题目块
struct PendingQuestion {
    number: u32,
    text: String,
    choices: Vec<Choice>,
    correct_line: Option<usize>,
}

impl PendingQuestion {
    fn new(number: u32, text: &str) -> PendingQuestion {
        PendingQuestion {
            number,
            text: text.to_string(),
            choices: Vec::new(),
            correct_line: None,
        }
    }

    /// 读取一行选项，字母必须从a开始连续出现
    fn read_choice_line(&mut self, line: &str, line_no: usize) -> Result<(), ParseError> {
        let letter = match choice_letter(line) {
            Some(letter) => letter,
            // 题目内部不容忍无法识别的行
            None => return Err(ParseError::UnrecognizedLine { line: line_no }),
        };
        if self.choices.len() >= MAX_CHOICES {
            return Err(ParseError::TooManyChoices { line: line_no, question: self.number });
        }
        let expected = (b'a' + self.choices.len() as u8) as char;
        if letter != expected {
            return Err(ParseError::UnexpectedChoiceLetter { line: line_no, found: letter, expected });
        }

        let mut label = line[2..].trim().to_string();
        let mut is_correct = false;
        if let Some(stripped) = label.strip_suffix(CORRECT_MARKER) {
            if self.correct_line.is_some() {
                return Err(ParseError::MultipleCorrectMarkers { question: self.number, line: line_no });
            }
            label = stripped.trim_end().to_string();
            is_correct = true;
            self.correct_line = Some(line_no);
        }
        self.choices.push(Choice { letter, label, is_correct });
        Ok(())
    }

    /// 空行或文件结尾结束当前题目块时校验完整性
    fn finish(self) -> Result<Question, ParseError> {
        if self.choices.is_empty() {
            return Err(ParseError::IncompleteRecord { question: self.number });
        }
        if self.correct_line.is_none() {
            return Err(ParseError::MissingCorrectMarker { question: self.number });
        }
        Ok(Question { number: self.number, text: self.text, choices: self.choices })
    }
}

/// 把问卷源文件解析为Quiz，任何错误都不会产生部分结果
pub fn parse(raw: &str) -> Result<Quiz, ParseError> {
    let mut state = State::Title;
    let mut title = String::new();
    let mut questions: Vec<Question> = Vec::new();
    let mut current: Option<PendingQuestion> = None;

    for (index, line) in raw.lines().enumerate() {
        let line_no = index + 1;
        let line = line.trim();
        match state {
            State::Title => {
                title = line.to_string();
                state = State::Separator;
            }
            State::Separator => {
                state = State::BetweenRecords;
            }
            State::BetweenRecords => {
                if line.is_empty() {
                    continue;
                }
                let expected = questions.len() as u32 + 1;
                let found = match question_number(line) {
                    Some(found) => found,
                    None => return Err(ParseError::UnrecognizedLine { line: line_no }),
                };
                if found != expected {
                    return Err(ParseError::UnexpectedQuestionNumber { line: line_no, found, expected });
                }
                current = Some(PendingQuestion::new(found, line));
                state = State::InRecord;
            }
            State::InRecord => {
                if line.is_empty() {
                    // 空行结束当前题目块
                    if let Some(pending) = current.take() {
                        questions.push(pending.finish()?);
                    }
                    state = State::BetweenRecords;
                    continue;
                }
                if let Some(pending) = current.as_mut() {
                    pending.read_choice_line(line, line_no)?;
                }
            }
        }
    }
    // 文件结尾同样会结束最后一个题目块
    if let Some(pending) = current.take() {
        questions.push(pending.finish()?);
    }
    if questions.is_empty() {
        return Err(ParseError::EmptyDocument);
    }
    Ok(Quiz { title, questions })
}

/// 题目行形如"3. xxx"，返回行首的题号
fn question_number(line: &str) -> Option<u32> {
    let dot = line.find('.')?;
    if dot == 0 {
        return None;
    }
    let digits = &line[..dot];
    if digits.chars().all(|c| c.is_ascii_digit()) {
        digits.parse().ok()
    } else {
        None
    }
}

/// 选项行形如"a) xxx"，返回行首的字母
fn choice_letter(line: &str) -> Option<char> {
    let mut chars = line.chars();
    let letter = chars.next()?;
    if chars.next()? != ')' {
        return None;
    }
    if letter.is_ascii_lowercase() {
        Some(letter)
    } else {
        None
    }
}
