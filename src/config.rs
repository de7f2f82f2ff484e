use lazy_static::lazy_static;
use serde::Deserialize;

/// 服务配置，全部字段都有默认值，允许零配置启动
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 问卷源文件路径
    pub quiz_file: String,
    /// 生成的问卷模块目录
    pub module_dir: String,
    pub bind_address: String,
    /// 预期提交人数，不填则永远不会宣布完成
    pub expected_count: Option<usize>,
    /// 已接受提交的落盘路径
    pub responses_csv: String,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            quiz_file: "quiz.txt".to_string(),
            module_dir: "quiz_module".to_string(),
            bind_address: "127.0.0.1:8080".to_string(),
            expected_count: None,
            responses_csv: "responses.csv".to_string(),
        }
    }
}

const CONFIG_FILE: &str = "config.toml";

fn load_config() -> Config {
    match std::fs::read_to_string(CONFIG_FILE) {
        Ok(contents) => match toml::from_str(&contents) {
            Ok(config) => config,
            // 已存在的配置文件解析失败时直接中止启动
            Err(e) => panic!("解析配置文件{}失败: {}", CONFIG_FILE, e),
        },
        // 配置文件不存在时使用默认值
        Err(_) => Config::default(),
    }
}

lazy_static! {
    pub static ref CONFIG: Config = load_config();
}
