use std::fs;
use std::io;
use std::path::Path;

use crate::structs::quiz::Quiz;

/// 根据问卷生成可供服务的模块目录
///
/// 目录结构: templates/下两张页面，static/下样式和脚本。
/// 生成是纯字符串拼接，启动时执行一次。
pub fn create_quiz_module(quiz: &Quiz, module_dir: &Path) -> io::Result<()> {
    let template_dir = module_dir.join("templates");
    let css_dir = module_dir.join("static").join("css");
    let js_dir = module_dir.join("static").join("js");
    fs::create_dir_all(&template_dir)?;
    fs::create_dir_all(&css_dir)?;
    fs::create_dir_all(&js_dir)?;

    fs::write(template_dir.join("Quest.html"), questionnaire_html(quiz))?;
    fs::write(template_dir.join("Results.html"), results_html(quiz))?;
    fs::write(css_dir.join("styles.css"), STYLES_CSS)?;
    fs::write(js_dir.join("student_form_script.js"), FORM_SCRIPT)?;
    fs::write(js_dir.join("student_response_script.js"), RESPONSE_SCRIPT)?;
    Ok(())
}

/// 学生答题页，一题一个div，radio的name为question_<i>
///
/// 正确答案只保存在服务端，页面里不会出现任何标记。
fn questionnaire_html(quiz: &Quiz) -> String {
    let mut html = format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>{}</title>
    <link rel="stylesheet" type="text/css" href="/resources/css/styles.css">
    <script src="/resources/js/student_form_script.js" defer></script>
</head>
<body>
    <form method="POST" action="/submit">
        <h3 id="error"></h3>
        <div class="oneQuest show" id="0">
            <p>请输入你的昵称：</p>
            <input type="text" id="pseudo" name="pseudo">
        </div>
"#,
        escape_html(&quiz.title)
    );
    for (i, question) in quiz.questions.iter().enumerate() {
        html.push_str(&format!("        <div class=\"oneQuest\" id=\"{}\">\n", i + 1));
        html.push_str(&format!("            <p>{}</p>\n", escape_html(&question.text)));
        for choice in &question.choices {
            html.push_str(&format!(
                "            <label><input type=\"radio\" name=\"question_{}\" value=\"{}\"> {}</label>\n",
                i,
                choice.letter,
                escape_html(&choice.label)
            ));
        }
        html.push_str("        </div>\n");
    }
    html.push_str(
        r#"        <input id="submitButton" type="submit" value="提交" style="display:none;">
    </form>
    <div class="nav">
        <div onclick="goToPreviousQuestion();" id="previousButton">&lt;&lt;</div>
        <div onclick="goToNextQuestion();" id="nextButton">&gt;&gt;</div>
    </div>
</body>
</html>
"#,
    );
    html
}

/// 监考端实时结果页，一题一列，内容由websocket推送填充
fn results_html(quiz: &Quiz) -> String {
    let mut header = String::new();
    for i in 0..quiz.questions.len() {
        header.push_str(&format!("            <th>Question {}</th>\n", i + 1));
    }
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>{} - 实时结果</title>
    <link rel="stylesheet" type="text/css" href="/resources/css/styles.css">
    <script src="/resources/js/student_response_script.js" defer></script>
</head>
<body>
    <h1>{}</h1>
    <div id="student-count">已提交人数：0</div>
    <div id="session-complete" style="display:none;">所有学生均已提交</div>
    <table id="student-responses">
        <tr>
            <th>昵称</th>
{}        </tr>
    </table>
</body>
</html>
"#,
        escape_html(&quiz.title),
        escape_html(&quiz.title),
        header
    )
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// 页面样式
const STYLES_CSS: &str = r#"body {
    width: 90%;
    margin: 0 auto;
    padding: 20px;
    font-family: Arial, sans-serif;
    font-size: 1.1em;
    line-height: 1.6;
    background-color: #f4f4f4;
    color: #333;
}

input[type="text"] {
    width: 70%;
    padding: 10px;
    font-size: 1em;
    border-radius: 5px;
    border: 1px solid #656363;
}

#previousButton,
#nextButton,
input[type="submit"] {
    background-color: #004475;
    color: #fff;
    font-weight: 600;
    padding: 10px 30px;
    border-radius: 5px;
    border: none;
    cursor: pointer;
}

#error {
    color: #ff0000;
    font-weight: bold;
}

.oneQuest {
    display: none;
    flex-direction: column;
    padding: 10px;
    border-radius: 5px;
    background: #fff;
    box-shadow: 0 0 10px 0 rgba(0, 0, 0, 0.1);
}

.show {
    display: flex;
}

.nav {
    display: flex;
    flex-direction: row;
    float: right;
    margin: 10px;
    gap: 10px;
}

#student-count,
#session-complete {
    font-weight: bold;
    color: #444;
}

#student-responses {
    margin-top: 20px;
    border-collapse: collapse;
}

#student-responses th,
#student-responses td {
    padding: 10px;
    text-align: left;
    border-bottom: 1px solid #ddd;
}

.incorrect {
    background-color: #ff9999;
    color: #ff0000;
}

.correct {
    background-color: #99ff99;
    color: #009900;
}
"#;

/// 学生答题页的翻页和校验脚本
const FORM_SCRIPT: &str = r#"const submitButton = document.getElementById('submitButton');
const previousButton = document.getElementById('previousButton');
const nextButton = document.getElementById('nextButton');
const errorElement = document.getElementById('error');

const questions = document.querySelectorAll('.oneQuest');
const lastQuestionId = questions.length - 1;

function currentQuestion() {
    return document.querySelector('.oneQuest.show');
}

function validateCurrent() {
    const radios = currentQuestion().querySelectorAll('input[type="radio"]');
    if (radios.length === 0) {
        return true;
    }
    for (const radio of radios) {
        if (radio.checked) {
            return true;
        }
    }
    errorElement.textContent = '请选择一个答案。';
    return false;
}

function goToNextQuestion() {
    errorElement.textContent = '';
    if (!validateCurrent()) {
        return;
    }
    const current = currentQuestion();
    if (parseInt(current.id) === lastQuestionId) {
        nextButton.style.display = 'none';
        submitButton.style.display = 'block';
        return;
    }
    current.classList.remove('show');
    current.nextElementSibling.classList.add('show');
    previousButton.style.display = 'inline';
}

function goToPreviousQuestion() {
    const current = currentQuestion();
    const previous = current.previousElementSibling;
    if (!previous || !previous.classList.contains('oneQuest')) {
        return;
    }
    current.classList.remove('show');
    previous.classList.add('show');
    nextButton.style.display = 'inline';
    submitButton.style.display = 'none';
    if (parseInt(previous.id) === 0) {
        previousButton.style.display = 'none';
    }
}
"#;

/// 监考端实时结果脚本，渲染协调器推送的三种消息
const RESPONSE_SCRIPT: &str = r#"const socket = new WebSocket(`ws://${location.host}/ws`);

socket.addEventListener('message', (event) => {
    const message = JSON.parse(event.data);
    if (message.type === 'count_update') {
        document.getElementById('student-count').textContent = `已提交人数：${message.count}`;
    } else if (message.type === 'student_result') {
        const row = document.createElement('tr');
        const pseudoCell = document.createElement('td');
        pseudoCell.textContent = message.pseudo;
        row.appendChild(pseudoCell);
        message.per_question_correct.forEach((correct) => {
            const cell = document.createElement('td');
            cell.textContent = correct ? '✓' : '✗';
            cell.classList.add(correct ? 'correct' : 'incorrect');
            row.appendChild(cell);
        });
        document.getElementById('student-responses').appendChild(row);
    } else if (message.type === 'session_complete') {
        document.getElementById('session-complete').style.display = 'block';
    }
});
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser;

    const DOC: &str = "测试问卷\n\n\n1. 第一题\na) one\nb) two$true$\n\n2. 第二题\na) x$true$\nb) y\n";

    #[test]
    fn generated_form_never_leaks_answers() {
        let quiz = parser::parse(DOC).unwrap();
        let html = questionnaire_html(&quiz);
        assert!(html.contains("1. 第一题"));
        assert!(html.contains("name=\"question_0\""));
        assert!(html.contains("name=\"question_1\""));
        assert!(!html.contains("$true$"));
        assert!(!html.contains("data-correct"));
    }

    #[test]
    fn results_page_has_one_column_per_question() {
        let quiz = parser::parse(DOC).unwrap();
        let html = results_html(&quiz);
        assert!(html.contains("<th>Question 1</th>"));
        assert!(html.contains("<th>Question 2</th>"));
        assert!(!html.contains("<th>Question 3</th>"));
    }

    #[test]
    fn scaffolds_all_module_files() {
        let quiz = parser::parse(DOC).unwrap();
        let dir = std::env::temp_dir().join(format!("quizroom_module_{}", rand::random::<u64>()));
        create_quiz_module(&quiz, &dir).unwrap();
        for file in [
            "templates/Quest.html",
            "templates/Results.html",
            "static/css/styles.css",
            "static/js/student_form_script.js",
            "static/js/student_response_script.js",
        ] {
            assert!(dir.join(file).exists(), "{}不存在", file);
        }
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn html_is_escaped() {
        assert_eq!(escape_html("a<b>&\"c\""), "a&lt;b&gt;&amp;&quot;c&quot;");
    }
}
