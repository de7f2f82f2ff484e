use std::path::PathBuf;

use actix_files::NamedFile;

use crate::CONFIG;

// 学生答题页
pub(crate) async fn index() -> actix_web::Result<NamedFile> {
    Ok(NamedFile::open(
        PathBuf::from(&CONFIG.module_dir).join("templates/Quest.html"),
    )?)
}

// 监考端实时结果页
pub(crate) async fn results() -> actix_web::Result<NamedFile> {
    Ok(NamedFile::open(
        PathBuf::from(&CONFIG.module_dir).join("templates/Results.html"),
    )?)
}
