use std::path::PathBuf;

/// 生成脚本过程中可能出现的领域错误
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum CatfogError {
    #[error("configuration file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),
    #[error("failed to split configuration file into tokens: {}", .path.display())]
    Tokenize { path: PathBuf },
    #[error("missing required parameter: {0}")]
    MissingKey(String),
    #[error("unknown {table} entry: {key}")]
    UnknownEntry { table: &'static str, key: String },
    #[error("model {model} depends on {dependency}, which has not produced a weight extraction command yet")]
    MissingDependency { model: String, dependency: String },
    #[error("no configuration file was referenced and no --modelspace was given")]
    MissingModelspace,
}
