use std::path::Path;
use std::process::exit;
use std::sync::Arc;

use actix_web::{web, App, HttpServer};

mod builder;
mod config;
mod csv_log;
mod error;
mod parser;
mod service;
mod session;
mod session_server;
mod structs;
mod utils;
mod ws_handler;

pub use config::CONFIG;

use session::Session;
use session_server::SessionServer;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();

    // 读取并解析问卷源文件，解析失败不会产生任何可用内容
    let raw = match std::fs::read_to_string(&CONFIG.quiz_file) {
        Ok(raw) => raw,
        Err(e) => {
            log::error!("读取问卷文件{}失败: {}", CONFIG.quiz_file, e);
            exit(1);
        }
    };
    let quiz = match parser::parse(&raw) {
        Ok(quiz) => Arc::new(quiz),
        Err(e) => {
            log::error!("解析问卷文件{}失败: {}", CONFIG.quiz_file, e);
            exit(1);
        }
    };
    log::info!("问卷《{}》加载成功，共{}道题目", quiz.title, quiz.questions.len());

    // 生成问卷模块的页面和静态资源
    if let Err(e) = builder::create_quiz_module(&quiz, Path::new(&CONFIG.module_dir)) {
        log::error!("生成问卷模块失败: {}", e);
        exit(1);
    }

    // 会话在启动时构造一次，由协调器独占持有
    let session = Session::new(Arc::clone(&quiz), CONFIG.expected_count);
    let (session_server, server_handle) = SessionServer::new(session, CONFIG.responses_csv.clone());
    tokio::spawn(session_server.run());

    let server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::from(Arc::clone(&quiz)))
            .app_data(web::Data::new(server_handle.clone()))
            .route("/", web::get().to(service::pages::index))
            .route("/results", web::get().to(service::pages::results))
            .route("/resources/{filename:.*}", web::get().to(service::resources::resources))
            .route("/ws", web::get().to(ws_handler::ws))
            .route("/submit", web::post().to(service::quiz::submit))
            .service(
                web::scope("/api")
                    .route("/quiz", web::get().to(service::quiz::get_quiz))
                    .route("/register", web::post().to(service::quiz::register)),
            )
    })
    .bind(&CONFIG.bind_address)?;
    log::info!("HTTP服务启动成功: {}", CONFIG.bind_address);
    server.run().await
}
