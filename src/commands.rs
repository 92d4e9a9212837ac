// src/commands.rs
use crate::models::{CatfogError, LookupTables};

/// 训练/测试程序的 stdout/stderr 重定向目录
pub const LOG_DIR: &str = "output";

/// 生成单条 shell 命令；所有片段以单个空格连接
pub struct CommandBuilder<'a> {
    tables: &'a LookupTables,
    modelspace: &'a str,
}

impl<'a> CommandBuilder<'a> {
    pub fn new(tables: &'a LookupTables, modelspace: &'a str) -> Self {
        Self { tables, modelspace }
    }

    pub fn modelspace(&self) -> &str {
        self.modelspace
    }

    // CUDA_VISIBLE_DEVICES=<gpu> python -m <module> pipeline=<name> modelspace=... data_dir=... <extra>
    fn pipeline_prefix(&self, model: &str) -> Result<Vec<String>, CatfogError> {
        let pipeline = &self.tables.pipeline;
        let mut parts = vec![
            format!("CUDA_VISIBLE_DEVICES={}", self.tables.gpu(model)?),
            pipeline.python.clone(),
            "-m".to_string(),
            pipeline.module.clone(),
            format!("pipeline={}", pipeline.name),
            format!("modelspace={}", self.modelspace),
            format!("data_dir={}", pipeline.data_dir),
        ];
        parts.extend(pipeline.extra.iter().cloned());
        parts.push(self.tables.ranker(model, self.modelspace)?);
        parts.push("ranker.add_runscore=True".to_string());
        Ok(parts)
    }

    /// 训练命令；有上一个数据集时在其训练结果上继续微调
    pub fn training(
        &self,
        model: &str,
        dataset: &str,
        prev_dataset: Option<&str>,
    ) -> Result<String, CatfogError> {
        let mut parts = self.pipeline_prefix(model)?;
        parts.push(self.tables.dataset_config(dataset)?.to_string());
        if let Some(prev) = prev_dataset {
            parts.push("pipeline.finetune=true".to_string());
            parts.push(format!("trainer.pipeline={}", self.tables.training(prev)?));
        }
        parts.push(format!(">{}/tr_{}_{}.out", LOG_DIR, self.modelspace, model));
        parts.push(format!("2>{}/tr_{}_{}.err", LOG_DIR, self.modelspace, model));
        Ok(parts.join(" "))
    }

    /// 用刚在 `train_dataset` 上训练的模型评估 `test_dataset`
    ///
    /// `sequence_tag` 是到目前为止的训练序列，例如 `-train_msmarco-train_cord19`
    pub fn test(
        &self,
        model: &str,
        train_dataset: &str,
        test_dataset: &str,
        sequence_tag: &str,
    ) -> Result<String, CatfogError> {
        let mut parts = self.pipeline_prefix(model)?;
        parts.push(self.tables.dataset_config(train_dataset)?.to_string());
        parts.push(self.tables.test_config(test_dataset)?.to_string());
        parts.extend([
            "pipeline.test=true".to_string(),
            "pipeline.onlytest=true".to_string(),
            "pipeline.finetune=true".to_string(),
            format!("trainer.pipeline={}", self.tables.training(train_dataset)?),
            format!("pipeline.savefile=model_{}{}-test_{}", model, sequence_tag, test_dataset),
            format!(">{}/tr_{}_{}.ts_{}.out", LOG_DIR, self.modelspace, model, test_dataset),
            format!("2>{}/tr_{}_{}.ts_{}.err", LOG_DIR, self.modelspace, model, test_dataset),
        ]);
        Ok(parts.join(" "))
    }

    /// 从权重来源模型中抽取 BERT 权重，供依赖模型使用
    pub fn extract_weights(&self, model: &str, train_dataset: &str) -> Result<String, CatfogError> {
        let dependency = &self.tables.dependency;
        let parts = [
            format!("CUDA_VISIBLE_DEVICES={}", dependency.extract_gpu),
            self.tables.pipeline.python.clone(),
            "-m".to_string(),
            dependency.extract_module.clone(),
            format!("modelspace={}", self.modelspace),
            format!("pipeline.bert_weights={}", self.modelspace),
            self.tables.dataset_config(train_dataset)?.to_string(),
            "pipeline.test=true".to_string(),
            self.tables.ranker(model, self.modelspace)?,
            "pipeline.overwrite=True".to_string(),
            "ranker.add_runscore=True".to_string(),
            format!("data_dir={}", self.tables.pipeline.data_dir),
        ];
        Ok(parts.join(" "))
    }
}
