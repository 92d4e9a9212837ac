// models.rs - 作为模块目录入口文件（Rust 2018+ 风格）
pub mod error;
pub mod params;
pub mod tables;
pub mod utils;

// 重新导出常用类型
pub use error::CatfogError;
pub use params::ParameterMap;
pub use tables::LookupTables;
