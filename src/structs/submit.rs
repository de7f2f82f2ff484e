use serde::{Deserialize, Serialize};

// 对于提交的答卷进行响应的结构体
#[derive(Serialize)]
pub struct SubmitResponse {
    pub(crate) code: u16,
    pub(crate) msg: String,
}

// 学生打开页面时预留昵称的请求
#[derive(Deserialize, Debug)]
pub struct RegisterRequest {
    pub(crate) pseudo: String,
}

/// 推送给监考端的消息，三种消息按固定顺序发出，只发不收
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    CountUpdate { count: usize },
    StudentResult { pseudo: String, per_question_correct: Vec<bool> },
    SessionComplete {},
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notification_wire_format() {
        let count = serde_json::to_string(&Notification::CountUpdate { count: 3 }).unwrap();
        assert_eq!(count, r#"{"type":"count_update","count":3}"#);

        let result = serde_json::to_string(&Notification::StudentResult {
            pseudo: "s1".to_string(),
            per_question_correct: vec![true, false],
        })
        .unwrap();
        assert_eq!(
            result,
            r#"{"type":"student_result","pseudo":"s1","per_question_correct":[true,false]}"#
        );

        let complete = serde_json::to_string(&Notification::SessionComplete {}).unwrap();
        assert_eq!(complete, r#"{"type":"session_complete"}"#);
    }
}
