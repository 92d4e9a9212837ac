use crate::models::error::CatfogError;
use serde::Deserialize;
use std::collections::BTreeMap;

/// 静态查找表：模型/数据集 → 命令片段
///
/// 构建后只读，查不到的条目返回 `CatfogError::UnknownEntry`
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LookupTables {
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub dependency: DependencyConfig,
    pub ranker: BTreeMap<String, String>,   // model → ranker 配置片段
    pub gpu: BTreeMap<String, String>,      // model → CUDA 设备号
    pub training: BTreeMap<String, String>, // dataset → 训练 pipeline 标识
    pub dataset_config: BTreeMap<String, String>,
    pub test_config: BTreeMap<String, String>,
}

/// 固定的训练程序调用方式
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PipelineConfig {
    pub python: String,
    pub module: String,
    pub name: String,
    pub data_dir: String,
    #[serde(default)]
    pub extra: Vec<String>,
}

/// 跨模型权重依赖：source_model 训练完后抽取权重，dependent_model 复用这些权重
#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
pub struct DependencyConfig {
    #[serde(default, deserialize_with = "crate::models::utils::deserialize_optional_string")]
    pub source_model: Option<String>,
    #[serde(default, deserialize_with = "crate::models::utils::deserialize_optional_string")]
    pub dependent_model: Option<String>,
    #[serde(default)]
    pub extract_module: String,
    #[serde(default)]
    pub extract_gpu: String,
}

impl DependencyConfig {
    pub fn is_source(&self, model: &str) -> bool {
        self.source_model.as_deref() == Some(model)
    }

    pub fn is_dependent(&self, model: &str) -> bool {
        self.dependent_model.as_deref() == Some(model)
    }
}

fn lookup<'a>(
    map: &'a BTreeMap<String, String>,
    table: &'static str,
    key: &str,
) -> Result<&'a str, CatfogError> {
    map.get(key)
        .map(String::as_str)
        .ok_or_else(|| CatfogError::UnknownEntry { table, key: key.to_string() })
}

impl LookupTables {
    /// 模型的 ranker 片段；依赖模型额外带上 `vocab.bert_weights=<modelspace>`
    pub fn ranker(&self, model: &str, modelspace: &str) -> Result<String, CatfogError> {
        let base = lookup(&self.ranker, "ranker", model)?;
        if self.dependency.is_dependent(model) {
            Ok(format!("{} vocab.bert_weights={}", base, modelspace))
        } else {
            Ok(base.to_string())
        }
    }

    pub fn gpu(&self, model: &str) -> Result<&str, CatfogError> {
        lookup(&self.gpu, "gpu", model)
    }

    pub fn training(&self, dataset: &str) -> Result<&str, CatfogError> {
        lookup(&self.training, "training", dataset)
    }

    pub fn dataset_config(&self, dataset: &str) -> Result<&str, CatfogError> {
        lookup(&self.dataset_config, "dataset_config", dataset)
    }

    pub fn test_config(&self, dataset: &str) -> Result<&str, CatfogError> {
        lookup(&self.test_config, "test_config", dataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_tables;

    #[test]
    fn test_lookup_known_entries() {
        let tables = default_tables().unwrap();
        assert_eq!(tables.gpu("knrm").unwrap(), "0");
        assert_eq!(tables.dataset_config("cord19").unwrap(), "config/covidj/fold2");
        assert_eq!(tables.test_config("msmarco").unwrap(), "config/msmarco/judgeddev");
        assert_eq!(tables.ranker("drmm", "space").unwrap(), "ranker=drmm");
    }

    #[test]
    fn test_lookup_unknown_entry() {
        let tables = default_tables().unwrap();
        assert_eq!(
            tables.gpu("bm25"),
            Err(CatfogError::UnknownEntry { table: "gpu", key: "bm25".to_string() })
        );
        assert!(matches!(
            tables.training("robust04"),
            Err(CatfogError::UnknownEntry { table: "training", .. })
        ));
    }

    #[test]
    fn test_dependent_ranker_carries_bert_weights() {
        let tables = default_tables().unwrap();
        let ranker = tables.ranker("cedr", "myspace").unwrap();
        assert!(ranker.starts_with("config/cedr/knrm "));
        assert!(ranker.ends_with(" vocab.bert_weights=myspace"));

        // 权重来源模型本身不受影响
        let ranker = tables.ranker("vbert", "myspace").unwrap();
        assert!(!ranker.contains("vocab.bert_weights"));
    }
}
