use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};

/// 每个模型脚本所在的子目录（相对于输出根目录）
pub const SCRIPTS_DIR: &str = "scripts_evals";

/// `<out>/scripts_evals/<modelspace>_<model>.sh`
pub fn model_script_path(output_dir: &Path, modelspace: &str, model: &str) -> PathBuf {
    output_dir.join(SCRIPTS_DIR).join(model_script_name(modelspace, model))
}

/// 调度脚本中引用模型脚本时使用的相对路径
pub fn model_script_relative(modelspace: &str, model: &str) -> String {
    format!("{}/{}", SCRIPTS_DIR, model_script_name(modelspace, model))
}

fn model_script_name(modelspace: &str, model: &str) -> String {
    format!("{}_{}.sh", modelspace, model)
}

/// `<out>/run_<modelspace>.sh`
pub fn dispatch_script_path(output_dir: &Path, modelspace: &str) -> PathBuf {
    output_dir.join(format!("run_{}.sh", modelspace))
}

/// 确保脚本目录存在
pub fn ensure_scripts_dir(output_dir: &Path) -> Result<PathBuf> {
    let dir = output_dir.join(SCRIPTS_DIR);
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create script directory: {}", dir.display()))?;
    Ok(dir)
}

/// 截断（或创建）文件并写入内容
pub fn write_script(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents)
        .with_context(|| format!("Failed to write script: {}", path.display()))
}

/// 追加内容到脚本末尾
pub fn append_script(path: &Path, contents: &str) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open script for appending: {}", path.display()))?;
    file.write_all(contents.as_bytes())
        .with_context(|| format!("Failed to append to script: {}", path.display()))
}
