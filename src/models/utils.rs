use serde::{Deserialize, Deserializer};

/// 反序列化可选字符串，将空字符串转换为None
///
/// 查找表里用空字符串关闭某个可选的模型角色
pub fn deserialize_optional_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    Ok(s.filter(|s| !s.is_empty()))
}
