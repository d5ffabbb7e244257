// 该文件是 Lubiao （路标） 项目的一部分。
// src/output/directory_record.rs - 目录记录输出
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

use chrono::{Datelike, Local};
use thiserror::Error;
use tracing::info;

use crate::output::ReportSink;
use crate::report::DetectionReport;
use crate::{FromUrl, FromUrlWithScheme};

#[derive(Error, Debug)]
pub enum DirectoryRecordOutputError {
  #[error("URI 方案不匹配")]
  SchemeMismatch,
  #[error("JSON 序列化错误: {0}")]
  JsonError(#[from] serde_json::Error),
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
}

/// 把报告按 年/月/日 目录布局归档，文件名带运行时刻。
pub struct DirectoryRecordOutput {
  directory: PathBuf,
}

impl DirectoryRecordOutput {
  pub fn new(directory: PathBuf) -> Self {
    DirectoryRecordOutput { directory }
  }

  fn report_path(&self) -> Result<PathBuf, std::io::Error> {
    let now = Local::now();
    let directory = self
      .directory
      .join(now.year().to_string())
      .join(format!("{:02}", now.month()))
      .join(format!("{:02}", now.day()));
    if !directory.exists() {
      std::fs::create_dir_all(&directory)?;
    }

    Ok(directory.join(format!("detections-{}.json", now.format("%H-%M-%S"))))
  }
}

impl FromUrlWithScheme for DirectoryRecordOutput {
  const SCHEME: &'static str = "folder";
}

impl FromUrl for DirectoryRecordOutput {
  type Error = DirectoryRecordOutputError;

  fn from_url(url: &url::Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(DirectoryRecordOutputError::SchemeMismatch);
    }

    Ok(DirectoryRecordOutput {
      directory: PathBuf::from(url.path()),
    })
  }
}

impl ReportSink for DirectoryRecordOutput {
  type Error = DirectoryRecordOutputError;

  fn write_report(&self, report: &DetectionReport) -> Result<PathBuf, Self::Error> {
    let path = self.report_path()?;
    let document = report.to_json()?;
    std::fs::write(&path, document)?;
    info!("结果已归档到: {}", path.display());

    Ok(path)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::report::BatchSummary;

  #[test]
  fn archives_report_under_dated_directory() {
    let root = std::env::temp_dir().join(format!("lubiao-folder-{}", std::process::id()));
    let output = DirectoryRecordOutput::new(root.clone());

    let report = DetectionReport {
      detection_summary: BatchSummary::from_records(&[]),
      detections: Vec::new(),
    };
    let written = output.write_report(&report).unwrap();

    assert!(written.starts_with(&root));
    assert!(written.exists());
    // 路径为 根/年/月/日/文件 四级
    let relative = written.strip_prefix(&root).unwrap();
    assert_eq!(relative.components().count(), 4);

    let _ = std::fs::remove_dir_all(root);
  }
}
