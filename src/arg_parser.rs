// src/arg_parser.rs
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use tracing::debug;
use crate::models::CatfogError;

/// 遇到该标记后停止读取当前 token 流
pub const TERMINATOR: &str = "###";
/// 目录引用时使用的默认配置文件名
pub const DIR_DEFAULT: &str = "_dir";

/// 解析结果：按出现顺序排列的 (key, value)，以及最后一个被读取的配置文件名
#[derive(Debug, Default, PartialEq)]
pub struct Resolution {
    pub pairs: Vec<(String, String)>,
    pub config_name: Option<String>,
}

/// 解析命令行 token（`key=value`、`###` 或配置文件路径）
pub fn resolve_args<S: AsRef<str>>(tokens: &[S], cd: Option<&Path>) -> Result<Resolution> {
    let mut resolution = Resolution::default();
    resolve_into(tokens, cd, &mut resolution)?;
    Ok(resolution)
}

// ————————————————————————————————————————————————————————————————————————
// 深度优先展开：文件内容在当前位置原地展开，再继续处理后面的 token
// ————————————————————————————————————————————————————————————————————————
fn resolve_into<S: AsRef<str>>(
    tokens: &[S],
    cd: Option<&Path>,
    resolution: &mut Resolution,
) -> Result<()> {
    for token in tokens {
        let token = token.as_ref();
        if let Some((key, value)) = token.split_once('=') {
            resolution.pairs.push((key.to_string(), value.to_string()));
        } else if token == TERMINATOR {
            // 只结束当前这一层，外层文件继续
            break;
        } else {
            let path = resolve_config_path(token, cd);
            resolution.config_name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned());

            if !path.exists() {
                return Err(CatfogError::ConfigNotFound(path).into());
            }

            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
            let nested = shlex::split(&escape_comment_markers(&contents))
                .ok_or_else(|| CatfogError::Tokenize { path: path.clone() })?;
            debug!("Expanding {} ({} tokens)", path.display(), nested.len());

            resolve_into(nested.as_slice(), path.parent(), resolution)?;
        }
    }
    Ok(())
}

/// 给词首的 `#` 加上反斜杠，让 shlex 把它当作普通字符而不是注释
///
/// 引号内的内容原样保留
fn escape_comment_markers(contents: &str) -> String {
    let mut escaped = String::with_capacity(contents.len());
    let mut chars = contents.chars();
    let mut quote: Option<char> = None;
    let mut at_word_start = true;

    while let Some(ch) = chars.next() {
        match quote {
            Some('\'') => {
                if ch == '\'' {
                    quote = None;
                }
                escaped.push(ch);
            }
            Some(_) => {
                escaped.push(ch);
                if ch == '\\' {
                    if let Some(next) = chars.next() {
                        escaped.push(next);
                    }
                } else if ch == '"' {
                    quote = None;
                }
            }
            None => {
                if ch == '#' && at_word_start {
                    escaped.push('\\');
                }
                escaped.push(ch);
                match ch {
                    '\\' => {
                        if let Some(next) = chars.next() {
                            escaped.push(next);
                        }
                    }
                    '\'' | '"' => quote = Some(ch),
                    _ => {}
                }
                at_word_start = ch.is_whitespace();
                continue;
            }
        }
        at_word_start = false;
    }
    escaped
}

/// 相对路径基于当前目录；目录一直向下取 `_dir`，直到得到非目录路径
fn resolve_config_path(token: &str, cd: Option<&Path>) -> PathBuf {
    let mut path = match cd {
        Some(dir) => dir.join(token),
        None => PathBuf::from(token),
    };
    while path.is_dir() {
        path.push(DIR_DEFAULT);
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn pairs(expected: &[(&str, &str)]) -> Vec<(String, String)> {
        expected.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_assignments_in_order() {
        let resolution = resolve_args(&["dataset=msmarco", "model=drmm", "a=b=c"], None).unwrap();
        assert_eq!(
            resolution.pairs,
            pairs(&[("dataset", "msmarco"), ("model", "drmm"), ("a", "b=c")])
        );
        assert_eq!(resolution.config_name, None);
    }

    #[test]
    fn test_terminator_stops_reading() {
        let resolution = resolve_args(&["x=1", "###", "y=2", "missing/file"], None).unwrap();
        assert_eq!(resolution.pairs, pairs(&[("x", "1")]));
    }

    #[test]
    fn test_file_reference() {
        let temp_dir = tempdir().unwrap();
        let file = temp_dir.path().join("base");
        fs::write(&file, "foo=1 bar=2").unwrap();

        let resolution = resolve_args(&[file.to_str().unwrap()], None).unwrap();
        assert_eq!(resolution.pairs, pairs(&[("foo", "1"), ("bar", "2")]));
        assert_eq!(resolution.config_name.as_deref(), Some("base"));
    }

    #[test]
    fn test_directory_resolves_to_default_entry() {
        let temp_dir = tempdir().unwrap();
        let dir = temp_dir.path().join("space");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join(DIR_DEFAULT), "x=9").unwrap();

        let resolution = resolve_args(&[dir.to_str().unwrap()], None).unwrap();
        assert_eq!(resolution.pairs, pairs(&[("x", "9")]));
        assert_eq!(resolution.config_name.as_deref(), Some(DIR_DEFAULT));
    }

    #[test]
    fn test_nested_directories_descend_repeatedly() {
        let temp_dir = tempdir().unwrap();
        let inner = temp_dir.path().join("outer").join(DIR_DEFAULT);
        fs::create_dir_all(&inner).unwrap();
        fs::write(inner.join(DIR_DEFAULT), "depth=2").unwrap();

        let resolution = resolve_args(&["outer"], Some(temp_dir.path())).unwrap();
        assert_eq!(resolution.pairs, pairs(&[("depth", "2")]));
    }

    #[test]
    fn test_nested_references_are_inlined_in_order() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path();
        fs::create_dir(root.join("config")).unwrap();
        // 相对引用基于被引用文件所在目录
        fs::write(root.join("config").join("child"), "b=2 'quoted=with space'").unwrap();
        fs::write(root.join("main"), "a=1 config/child c=3").unwrap();

        let resolution = resolve_args(&["main", "d=4"], Some(root)).unwrap();
        assert_eq!(
            resolution.pairs,
            pairs(&[("a", "1"), ("b", "2"), ("quoted", "with space"), ("c", "3"), ("d", "4")])
        );
        // 深度优先：child 在 main 之后才被读取
        assert_eq!(resolution.config_name.as_deref(), Some("child"));
    }

    #[test]
    fn test_config_name_is_last_file_touched() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("first"), "a=1").unwrap();
        fs::write(root.join("second"), "b=2").unwrap();

        let resolution = resolve_args(&["first", "second", "c=3"], Some(root)).unwrap();
        assert_eq!(resolution.config_name.as_deref(), Some("second"));
    }

    #[test]
    fn test_terminator_line_ends_file_stream() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("cfg"), "dataset=msmarco\n###\ndataset=cord19\n").unwrap();

        let resolution = resolve_args(&["cfg"], Some(root)).unwrap();
        assert_eq!(resolution.pairs, pairs(&[("dataset", "msmarco")]));
    }

    #[test]
    fn test_terminator_inside_file_only_ends_that_file() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("partial"), "a=1 ### b=2").unwrap();

        let resolution = resolve_args(&["partial", "c=3"], Some(root)).unwrap();
        assert_eq!(resolution.pairs, pairs(&[("a", "1"), ("c", "3")]));
    }

    #[test]
    fn test_hash_words_are_not_comments() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("tagged"), "tag=#1 '#quoted' \"#x\"\nnote=a#b").unwrap();
        fs::write(root.join("stray"), "a=1 #note").unwrap();

        // # 在引号内或词中间都保持原样
        let err = resolve_args(&["tagged"], Some(root)).unwrap_err();
        assert_eq!(
            err.downcast_ref::<CatfogError>(),
            Some(&CatfogError::ConfigNotFound(root.join("#quoted")))
        );

        // 单独的 #note 被当作文件引用，而不是被悄悄丢弃
        let err = resolve_args(&["stray"], Some(root)).unwrap_err();
        assert_eq!(
            err.downcast_ref::<CatfogError>(),
            Some(&CatfogError::ConfigNotFound(root.join("#note")))
        );
    }

    #[test]
    fn test_escape_comment_markers() {
        assert_eq!(escape_comment_markers("a=1\n### b"), "a=1\n\\### b");
        assert_eq!(escape_comment_markers("x=#1 y=a#b"), "x=#1 y=a#b");
        assert_eq!(escape_comment_markers("'#a' \"#b\" #c"), "'#a' \"#b\" \\#c");
        // 转义的空格属于同一个词，其后的 # 不在词首
        assert_eq!(escape_comment_markers("\\ #d"), "\\ #d");
    }

    #[test]
    fn test_missing_file() {
        let temp_dir = tempdir().unwrap();
        let err = resolve_args(&["nope"], Some(temp_dir.path())).unwrap_err();
        assert_eq!(
            err.downcast_ref::<CatfogError>(),
            Some(&CatfogError::ConfigNotFound(temp_dir.path().join("nope")))
        );
    }

    #[test]
    fn test_unbalanced_quotes() {
        let temp_dir = tempdir().unwrap();
        fs::write(temp_dir.path().join("broken"), "a='unterminated").unwrap();

        let err = resolve_args(&["broken"], Some(temp_dir.path())).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CatfogError>(),
            Some(CatfogError::Tokenize { .. })
        ));
    }
}
