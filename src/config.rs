// 该文件是 Lubiao （路标） 项目的一部分。
// src/config.rs - 检测器配置
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

use thiserror::Error;

pub const DEFAULT_MODEL_PATH: &str = "models/gtsrb_model.onnx";
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.3;
pub const DEFAULT_TOP_K: usize = 5;

#[derive(Error, Debug)]
pub enum ConfigError {
  #[error("置信度阈值必须位于 [0,1]: {0}")]
  InvalidThreshold(f32),
  #[error("top_k 必须大于 0")]
  InvalidTopK,
  #[error("模型路径为空")]
  EmptyModelPath,
}

/// 检测器配置，构造时校验一次，之后不可变。
#[derive(Debug, Clone)]
pub struct DetectorConfig {
  pub model_path: String,
  pub confidence_threshold: f32,
  pub top_k: usize,
}

impl Default for DetectorConfig {
  fn default() -> Self {
    DetectorConfig {
      model_path: DEFAULT_MODEL_PATH.to_string(),
      confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
      top_k: DEFAULT_TOP_K,
    }
  }
}

impl DetectorConfig {
  pub fn new(model_path: impl Into<String>) -> Self {
    DetectorConfig {
      model_path: model_path.into(),
      ..Default::default()
    }
  }

  pub fn with_confidence_threshold(mut self, threshold: f32) -> Self {
    self.confidence_threshold = threshold;
    self
  }

  pub fn with_top_k(mut self, top_k: usize) -> Self {
    self.top_k = top_k;
    self
  }

  /// 校验配置，非法值在这里拒绝而不是在每次检测时。
  pub fn validated(self) -> Result<Self, ConfigError> {
    if self.model_path.is_empty() {
      return Err(ConfigError::EmptyModelPath);
    }
    if !(0.0..=1.0).contains(&self.confidence_threshold) {
      return Err(ConfigError::InvalidThreshold(self.confidence_threshold));
    }
    if self.top_k == 0 {
      return Err(ConfigError::InvalidTopK);
    }
    Ok(self)
  }
}
