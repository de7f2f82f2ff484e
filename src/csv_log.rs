use std::fs::OpenOptions;
use std::io::{self, Write};

use crate::session::SubmissionRecord;

/// 把一条已接受的提交追加写入csv文件
///
/// 列依次为昵称、每题的作答字母、来源地址。文件只写不读。
pub fn append_submission(path: &str, record: &SubmissionRecord) -> io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut fields = Vec::with_capacity(record.answers.len() + 2);
    fields.push(escape(&record.pseudo));
    for answer in &record.answers {
        fields.push(answer.to_string());
    }
    fields.push(escape(&record.source_address));
    writeln!(file, "{}", fields.join(","))?;
    Ok(())
}

// 包含逗号、引号或换行的字段需要加引号
fn escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn record(pseudo: &str) -> SubmissionRecord {
        SubmissionRecord {
            pseudo: pseudo.to_string(),
            answers: vec!['b', 'a'],
            per_question_correct: vec![true, true],
            source_address: "127.0.0.1:4242".to_string(),
            received_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn escape_quotes_special_fields() {
        assert_eq!(escape("plain"), "plain");
        assert_eq!(escape("a,b"), "\"a,b\"");
        assert_eq!(escape("a\"b"), "\"a\"\"b\"");
    }

    #[test]
    fn appends_one_line_per_record() {
        let path = std::env::temp_dir()
            .join(format!("quizroom_csv_test_{}.csv", rand::random::<u64>()))
            .to_string_lossy()
            .into_owned();
        append_submission(&path, &record("s1")).unwrap();
        append_submission(&path, &record("s,2")).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "s1,b,a,127.0.0.1:4242\n\"s,2\",b,a,127.0.0.1:4242\n");
        let _ = std::fs::remove_file(&path);
    }
}
