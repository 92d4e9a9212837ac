use crate::models::LookupTables;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::info;

/// 内置查找表（与训练集群上的目录约定保持一致）
pub const DEFAULT_TABLES: &str = r#"[pipeline]
python = "python"
module = "onir.bin.pipeline"
name = "jesus"
data_dir = "../data"
extra = ["vocab.source=glove", "vocab.variant=cc-42b-300d"]

[dependency]
source_model = "vbert"
dependent_model = "cedr"
extract_module = "onir.bin.extract_bert_weights"
extract_gpu = "2"

[ranker]
drmm = "ranker=drmm"
pacrr = "ranker=pacrr"
knrm = "ranker=knrm"
vbert = "config/vanilla_bert trainer.grad_acc_batch=1 valid_pred.batch_size=4 test_pred.batch_size=4"
cedr = "config/cedr/knrm trainer.grad_acc_batch=1 valid_pred.batch_size=4 test_pred.batch_size=4"

[gpu]
drmm = "1"
pacrr = "2"
knrm = "0"
vbert = "3"
cedr = "3"

[training]
msmarco = "msmarco_train_bm25_k1-0.82_b-0.68.100_mspairs"
cord19 = "covid_trf2-rnd5-quest_bm25_k1-3.9_b-0.55.1000_2020-07-16_bs-text_2020filter_bsoverride-rnd5-query_rr-title_abs"
microblog = "microblog_train_bm25_k1-0.2_b-0.95.100"

[dataset_config]
msmarco = "config/msmarco"
cord19 = "config/covidj/fold2"
microblog = "config/microblog"

[test_config]
msmarco = "config/msmarco/judgeddev"
cord19 = "config/covidj/test2"
microblog = "config/microblog/test"
"#;

pub fn default_tables() -> Result<LookupTables> {
    toml::from_str(DEFAULT_TABLES).context("Failed to parse built-in lookup tables")
}

/// 加载查找表：未指定文件时使用内置表，否则按扩展名选择 TOML 或 YAML
pub fn load_tables(tables_path: Option<&Path>) -> Result<LookupTables> {
    let Some(path) = tables_path else {
        return default_tables();
    };

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read lookup tables: {}", path.display()))?;

    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    let tables = if is_yaml {
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML lookup tables: {}", path.display()))?
    } else {
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse lookup tables: {}", path.display()))?
    };

    info!("Loaded lookup tables from {}", path.display());
    Ok(tables)
}

/// 把内置查找表写到磁盘，作为自定义的起点
pub fn write_default_tables(path: &Path) -> Result<()> {
    if path.exists() {
        anyhow::bail!("Refusing to overwrite existing file: {}", path.display());
    }

    fs::write(path, DEFAULT_TABLES)
        .with_context(|| format!("Failed to create default lookup tables: {}", path.display()))?;

    info!("Created default lookup tables at {}", path.display());
    Ok(())
}
