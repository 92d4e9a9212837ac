// src/script_emitter.rs
use std::path::{Path, PathBuf};
use anyhow::Result;
use tracing::{debug, info};
use crate::commands::CommandBuilder;
use crate::file_utils::{
    append_script, dispatch_script_path, ensure_scripts_dir, model_script_path,
    model_script_relative, write_script,
};
use crate::models::{CatfogError, LookupTables};

/// 依赖模型的完整串行命令：先等权重抽取完成，再训练和测试
#[derive(Debug, Clone, PartialEq)]
pub struct ChainedRun {
    pub dataset: String,
    pub model: String,
    pub command: String,
}

/// 一次生成的结果汇总
#[derive(Debug, Default, PartialEq)]
pub struct EmissionReport {
    pub model_scripts: Vec<PathBuf>,
    pub dispatch_script: PathBuf,
    pub chained: Vec<ChainedRun>,
}

// 数据集循环中需要按顺序传递的状态
#[derive(Debug, Default)]
struct SequenceState {
    prev_dataset: Option<String>,
    sequence_tag: String,
    prev_command: Option<String>,
}

/// 把数据集序列 × 模型列表写成 shell 脚本
pub struct ScriptEmitter<'a> {
    tables: &'a LookupTables,
    commands: CommandBuilder<'a>,
    output_dir: &'a Path,
}

impl<'a> ScriptEmitter<'a> {
    pub fn new(tables: &'a LookupTables, modelspace: &'a str, output_dir: &'a Path) -> Self {
        Self {
            tables,
            commands: CommandBuilder::new(tables, modelspace),
            output_dir,
        }
    }

    pub fn emit(&self, datasets: &[String], models: &[String]) -> Result<EmissionReport> {
        let modelspace = self.commands.modelspace();
        ensure_scripts_dir(self.output_dir)?;

        let mut report = EmissionReport {
            dispatch_script: dispatch_script_path(self.output_dir, modelspace),
            ..Default::default()
        };

        // 每个模型脚本都先截断并写入头部
        for model in models {
            let path = model_script_path(self.output_dir, modelspace, model);
            write_script(
                &path,
                &format!("#!/bin/bash\n# File generated by catfog for config {}\n\n", modelspace),
            )?;
            report.model_scripts.push(path);
        }

        let mut state = SequenceState::default();
        for dataset in datasets {
            state.sequence_tag.push_str(&format!("-train_{}", dataset));

            for model in models {
                if let Some(chained) = self.emit_model(&mut state, dataset, model, datasets)? {
                    report.chained.push(chained);
                }
            }

            state.prev_dataset = Some(dataset.clone());
            self.write_dispatch(models, &report.dispatch_script)?;
            info!("Emitted training on {} for {} model(s)", dataset, models.len());
        }

        Ok(report)
    }

    fn emit_model(
        &self,
        state: &mut SequenceState,
        dataset: &str,
        model: &str,
        datasets: &[String],
    ) -> Result<Option<ChainedRun>> {
        let modelspace = self.commands.modelspace();
        let dependency = &self.tables.dependency;
        let is_dependent = dependency.is_dependent(model);

        // 依赖模型写入权重来源模型的脚本，保证在权重抽取之后执行
        let script_owner = match (&dependency.source_model, is_dependent) {
            (Some(source), true) => source.as_str(),
            _ => model,
        };
        let script = model_script_path(self.output_dir, modelspace, script_owner);

        let chain_prefix = if is_dependent {
            let prev = state.prev_command.clone().ok_or_else(|| CatfogError::MissingDependency {
                model: model.to_string(),
                dependency: dependency.source_model.clone().unwrap_or_default(),
            })?;
            Some(prev)
        } else {
            None
        };

        let training = self
            .commands
            .training(model, dataset, state.prev_dataset.as_deref())?;
        append_script(&script, &format!("# Training {}\n{}\nwait\n", dataset, training))?;

        let mut chain = vec![training];
        for test_dataset in datasets {
            let test = self
                .commands
                .test(model, dataset, test_dataset, &state.sequence_tag)?;
            append_script(&script, &format!("# Testing {}\n{} &\n", test_dataset, test))?;
            chain.push(test);
        }
        append_script(&script, "wait\n\n")?;

        if dependency.is_source(model) {
            let extract = self.commands.extract_weights(model, dataset)?;
            append_script(&script, &format!("{} &\nwait\n", extract))?;
            chain.push(extract);
            state.prev_command = Some(chain.join(" && "));
            return Ok(None);
        }

        Ok(chain_prefix.map(|prev| {
            let command = format!("{} && {}", prev, chain.join(" && "));
            debug!("Chained command for {} on {}: {}", model, dataset, command);
            ChainedRun {
                dataset: dataset.to_string(),
                model: model.to_string(),
                command,
            }
        }))
    }

    // 依赖模型不自动调度，其余模型脚本并行启动
    fn write_dispatch(&self, models: &[String], path: &Path) -> Result<()> {
        let modelspace = self.commands.modelspace();
        let mut contents = format!("#!/bin/bash\n#File generated to handle {}\n", modelspace);
        for model in models {
            if !self.tables.dependency.is_dependent(model) {
                contents.push_str(&format!(
                    "bash {} &\n",
                    model_script_relative(modelspace, model)
                ));
            }
        }
        write_script(path, &contents)
    }
}
