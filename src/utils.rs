use crate::structs::quiz::{Question, Quiz};

/// 判断单题作答是否正确
pub fn grade(question: &Question, submitted: char) -> bool {
    question
        .choices
        .iter()
        .any(|choice| choice.is_correct && choice.letter == submitted)
}

/// 按题目声明顺序给整份答卷打分
pub fn mark(quiz: &Quiz, answers: &[char]) -> Vec<bool> {
    quiz.questions
        .iter()
        .zip(answers.iter())
        .map(|(question, answer)| grade(question, *answer))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser;

    #[test]
    fn grade_matches_marked_letter_only() {
        let quiz = parser::parse("T\n\n1. Q1\na) x\nb) y$true$\n").unwrap();
        let question = &quiz.questions[0];
        assert!(grade(question, 'b'));
        assert!(!grade(question, 'a'));
        assert!(!grade(question, 'z'));
    }

    #[test]
    fn mark_grades_in_question_order() {
        let quiz =
            parser::parse("T\n\n1. Q1\na) x\nb) y$true$\n\n2. Q2\na) x$true$\nb) y\n").unwrap();
        assert_eq!(mark(&quiz, &['b', 'a']), vec![true, true]);
        assert_eq!(mark(&quiz, &['a', 'a']), vec![false, true]);
    }
}
