// 该文件是 Lubiao （路标） 项目的一部分。
// src/output.rs - 报告输出定义
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use std::path::PathBuf;

use thiserror::Error;
use url::Url;

use crate::report::DetectionReport;
use crate::{FromUrl, FromUrlWithScheme};

/// 报告写出目标，返回实际写入的文件路径。
pub trait ReportSink {
  type Error;
  fn write_report(&self, report: &DetectionReport) -> Result<PathBuf, Self::Error>;
}

mod directory_record;
mod json_file;

pub use self::directory_record::{DirectoryRecordOutput, DirectoryRecordOutputError};
pub use self::json_file::{JsonFileOutput, JsonFileOutputError};

#[derive(Error, Debug)]
pub enum OutputError {
  #[error("JSON 文件输出错误: {0}")]
  JsonFileError(#[from] JsonFileOutputError),
  #[error("目录记录输出错误: {0}")]
  DirectoryRecordOutputError(#[from] DirectoryRecordOutputError),
  #[error("URI 方案不匹配")]
  SchemeMismatch,
}

pub enum OutputWrapper {
  JsonFileOutput(JsonFileOutput),
  DirectoryRecordOutput(DirectoryRecordOutput),
}

impl FromUrl for OutputWrapper {
  type Error = OutputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    match url.scheme() {
      JsonFileOutput::SCHEME => {
        let output = JsonFileOutput::from_url(url)?;
        Ok(OutputWrapper::JsonFileOutput(output))
      }
      DirectoryRecordOutput::SCHEME => {
        let output = DirectoryRecordOutput::from_url(url)?;
        Ok(OutputWrapper::DirectoryRecordOutput(output))
      }
      _ => Err(OutputError::SchemeMismatch),
    }
  }
}

impl OutputWrapper {
  /// 从命令行目标构建输出：带方案的 URI 或裸文件路径。
  pub fn from_target(target: &str) -> Result<Self, OutputError> {
    match Url::parse(target) {
      Ok(url) => Self::from_url(&url),
      Err(_) => Ok(OutputWrapper::JsonFileOutput(JsonFileOutput::new(
        PathBuf::from(target),
      ))),
    }
  }
}

impl ReportSink for OutputWrapper {
  type Error = OutputError;

  fn write_report(&self, report: &DetectionReport) -> Result<PathBuf, Self::Error> {
    match self {
      OutputWrapper::JsonFileOutput(output) => {
        output.write_report(report).map_err(OutputError::from)
      }
      OutputWrapper::DirectoryRecordOutput(output) => {
        output.write_report(report).map_err(OutputError::from)
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn json_scheme_selects_json_file_output() {
    let wrapper = OutputWrapper::from_target("json:///tmp/results.json").unwrap();
    assert!(matches!(wrapper, OutputWrapper::JsonFileOutput(_)));
  }

  #[test]
  fn folder_scheme_selects_directory_record_output() {
    let wrapper = OutputWrapper::from_target("folder:///tmp/records").unwrap();
    assert!(matches!(wrapper, OutputWrapper::DirectoryRecordOutput(_)));
  }

  #[test]
  fn bare_path_falls_back_to_json_file() {
    let wrapper = OutputWrapper::from_target("output/batch_results.json").unwrap();
    assert!(matches!(wrapper, OutputWrapper::JsonFileOutput(_)));
  }

  #[test]
  fn unknown_scheme_is_rejected() {
    let result = OutputWrapper::from_target("ftp:///tmp/results.json");
    assert!(matches!(result, Err(OutputError::SchemeMismatch)));
  }
}
