// 该文件是 Lubiao （路标） 项目的一部分。
// src/output/json_file.rs - JSON 文件输出
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
use tracing::info;

use crate::output::ReportSink;
use crate::report::DetectionReport;
use crate::{FromUrl, FromUrlWithScheme};

#[derive(Error, Debug)]
pub enum JsonFileOutputError {
  #[error("URI 方案不匹配")]
  SchemeMismatch,
  #[error("JSON 序列化错误: {0}")]
  JsonError(#[from] serde_json::Error),
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
}

/// 把报告文档写入单个 JSON 文件，父目录按需创建。
pub struct JsonFileOutput {
  path: PathBuf,
}

impl JsonFileOutput {
  pub fn new(path: PathBuf) -> Self {
    JsonFileOutput { path }
  }
}

impl FromUrlWithScheme for JsonFileOutput {
  const SCHEME: &'static str = "json";
}

impl FromUrl for JsonFileOutput {
  type Error = JsonFileOutputError;

  fn from_url(url: &url::Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(JsonFileOutputError::SchemeMismatch);
    }

    Ok(JsonFileOutput {
      path: PathBuf::from(url.path()),
    })
  }
}

impl ReportSink for JsonFileOutput {
  type Error = JsonFileOutputError;

  fn write_report(&self, report: &DetectionReport) -> Result<PathBuf, Self::Error> {
    if let Some(parent) = self.path.parent() {
      if !parent.as_os_str().is_empty() {
        std::fs::create_dir_all(parent)?;
      }
    }

    let document = report.to_json()?;
    std::fs::write(&self.path, document)?;
    info!("结果已保存到: {}", self.path.display());

    Ok(self.path.clone())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::report::{BatchSummary, DetectionReport};

  fn empty_report() -> DetectionReport {
    DetectionReport {
      detection_summary: BatchSummary::from_records(&[]),
      detections: Vec::new(),
    }
  }

  #[test]
  fn writes_report_and_creates_parent_dirs() {
    let dir = std::env::temp_dir().join(format!("lubiao-json-{}", std::process::id()));
    let path = dir.join("nested").join("results.json");
    let output = JsonFileOutput::new(path.clone());

    let written = output.write_report(&empty_report()).unwrap();
    assert_eq!(written, path);

    let text = std::fs::read_to_string(&path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert!(value.get("detection_summary").is_some());
    assert!(value.get("detections").is_some());

    let _ = std::fs::remove_dir_all(dir);
  }
}
