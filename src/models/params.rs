use crate::models::error::CatfogError;
use serde::Serialize;
use std::collections::BTreeMap;

/// 参数映射：键 → 按出现顺序保存的全部取值
///
/// 重复的键不会覆盖，而是追加（例如多个 `dataset=`）
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ParameterMap {
    values: BTreeMap<String, Vec<String>>,
}

impl ParameterMap {
    /// 把解析器产出的 (key, value) 序列折叠成映射
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut values: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (key, value) in pairs {
            values.entry(key).or_default().push(value);
        }
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.values.get(key).map(Vec::as_slice)
    }

    /// 必需参数，缺失时返回 `MissingKey`
    pub fn require(&self, key: &str) -> Result<&[String], CatfogError> {
        self.get(key)
            .ok_or_else(|| CatfogError::MissingKey(key.to_string()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// 以美观的JSON格式输出，便于调试
    pub fn to_pretty_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
