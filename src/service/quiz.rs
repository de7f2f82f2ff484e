use std::collections::HashMap;

use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;

use crate::error::SubmissionError;
use crate::session_server::SessionServerHandle;
use crate::structs::quiz::Quiz;
use crate::structs::submit::{RegisterRequest, SubmitResponse};

// 获取试题内容，正确答案不会出现在返回内容里
pub(crate) async fn get_quiz(quiz: web::Data<Quiz>) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "code": 200,
        "data": quiz.to_public_json(),
        "is_server_online": true
    }))
}

// 学生打开页面时预留昵称
pub(crate) async fn register(
    req_body: web::Form<RegisterRequest>,
    session_server: web::Data<SessionServerHandle>,
) -> HttpResponse {
    let pseudo = req_body.pseudo.trim().to_string();
    if pseudo.is_empty() {
        return HttpResponse::BadRequest().json(SubmitResponse {
            code: 400,
            msg: "昵称不能为空".to_string(),
        });
    }
    match session_server.register(pseudo).await {
        Ok(()) => HttpResponse::Ok().json(SubmitResponse {
            code: 200,
            msg: "注册成功".to_string(),
        }),
        Err(e) => submission_rejected(e),
    }
}

// 提交答卷并进行打分
pub(crate) async fn submit(
    req: HttpRequest,
    req_body: web::Form<HashMap<String, String>>,
    quiz: web::Data<Quiz>,
    session_server: web::Data<SessionServerHandle>,
) -> HttpResponse {
    // 获取post请求内容
    let form = req_body.into_inner();
    let pseudo = match form.get("pseudo").map(|pseudo| pseudo.trim()) {
        Some(pseudo) if !pseudo.is_empty() => pseudo.to_string(),
        _ => {
            return HttpResponse::BadRequest().json(SubmitResponse {
                code: 400,
                msg: "昵称不能为空".to_string(),
            })
        }
    };
    // 按题目顺序收集question_<i>字段
    let answers = match collect_answers(&form, quiz.questions.len()) {
        Ok(answers) => answers,
        Err(e) => return submission_rejected(e),
    };
    let source_address = req
        .connection_info()
        .peer_addr()
        .unwrap_or("unknown")
        .to_string();

    match session_server.submit(pseudo, answers, source_address).await {
        Ok(record) => {
            log::info!("已接受{}的提交", record.pseudo);
            HttpResponse::Ok().json(SubmitResponse {
                code: 200,
                msg: "提交成功".to_string(),
            })
        }
        Err(e) => submission_rejected(e),
    }
}

/// 把表单里的question_<i>字段还原成按题目顺序排列的答案
fn collect_answers(
    form: &HashMap<String, String>,
    question_count: usize,
) -> Result<Vec<char>, SubmissionError> {
    let mut answers = Vec::with_capacity(question_count);
    for i in 0..question_count {
        let key = format!("question_{}", i);
        let value = match form.get(&key) {
            Some(value) => value.trim(),
            // 缺少任何一题都按答案数量不符处理，范围外的字段不计入
            None => {
                let found = (0..question_count)
                    .filter(|i| form.contains_key(&format!("question_{}", i)))
                    .count();
                return Err(SubmissionError::AnswerCountMismatch {
                    expected: question_count,
                    found,
                });
            }
        };
        let mut chars = value.chars();
        match (chars.next(), chars.next()) {
            (Some(letter), None) => answers.push(letter),
            _ => {
                return Err(SubmissionError::UnknownChoice {
                    question: i as u32 + 1,
                    letter: value.chars().next().unwrap_or('?'),
                })
            }
        }
    }
    Ok(answers)
}

// 提交被拒绝时的统一响应，会话状态不受影响
fn submission_rejected(error: SubmissionError) -> HttpResponse {
    match error {
        SubmissionError::AlreadySubmitted(_) | SubmissionError::DuplicateIdentifier(_) => {
            HttpResponse::Conflict().json(SubmitResponse { code: 409, msg: error.to_string() })
        }
        _ => HttpResponse::BadRequest().json(SubmitResponse { code: 400, msg: error.to_string() }),
    }
}
