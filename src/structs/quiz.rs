use serde_json::{json, Value};

/// 解析成功后的整份问卷，运行期间只读
#[derive(Debug, Clone, PartialEq)]
pub struct Quiz {
    pub title: String,
    pub questions: Vec<Question>,
}

/// 单个题目，题号从1开始且与位置一致
#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    pub number: u32,
    /// 完整的题目行，包含"N."前缀，用于原样展示
    pub text: String,
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Choice {
    pub letter: char,
    pub label: String,
    pub is_correct: bool,
}

impl Question {
    /// 返回正确选项的字母，解析阶段保证有且仅有一个
    pub fn correct_letter(&self) -> char {
        self.choices
            .iter()
            .find(|choice| choice.is_correct)
            .map(|choice| choice.letter)
            .unwrap_or('a')
    }

    pub fn has_letter(&self, letter: char) -> bool {
        self.choices.iter().any(|choice| choice.letter == letter)
    }
}

impl Quiz {
    /// 序列化为发给学生端的json，移除不该出现的部分
    pub fn to_public_json(&self) -> Value {
        let questions: Vec<Value> = self
            .questions
            .iter()
            .map(|question| {
                json!({
                    "text": question.text,
                    "choices": question
                        .choices
                        .iter()
                        .map(|choice| {
                            json!({
                                "letter": choice.letter.to_string(),
                                "label": choice.label,
                            })
                        })
                        .collect::<Vec<Value>>(),
                })
            })
            .collect();
        json!({ "title": self.title, "questions": questions })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question() -> Question {
        Question {
            number: 1,
            text: "1. 测试题".to_string(),
            choices: vec![
                Choice { letter: 'a', label: "甲".to_string(), is_correct: false },
                Choice { letter: 'b', label: "乙".to_string(), is_correct: true },
            ],
        }
    }

    #[test]
    fn correct_letter_comes_from_marked_choice() {
        assert_eq!(question().correct_letter(), 'b');
    }

    #[test]
    fn public_json_never_contains_correctness() {
        let quiz = Quiz { title: "测试".to_string(), questions: vec![question()] };
        let json = quiz.to_public_json().to_string();
        assert!(!json.contains("is_correct"));
        assert!(!json.contains("correct"));
    }
}
