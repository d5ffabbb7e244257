// 该文件是 Lubiao （路标） 项目的一部分。
// src/report.rs - 检测报告文档
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

use chrono::{Local, SecondsFormat};
use serde::{Deserialize, Serialize};

use crate::model::Prediction;

/// 写入每条记录的模型信息快照。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
  pub model_path: String,
  pub confidence_threshold: f32,
  pub input_shape: Vec<usize>,
  pub total_classes: usize,
}

/// 单张图像的检测记录，构建后不可变。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionRecord {
  pub image_path: String,
  pub timestamp: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub inference_time_ms: Option<f64>,
  pub detected: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub primary_detection: Option<Prediction>,
  pub top_predictions: Vec<Prediction>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub model_info: Option<ModelInfo>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub error: Option<String>,
}

impl DetectionRecord {
  /// 预期失败（解码、推理、分数解析）降级为带错误信息的记录。
  pub fn failure(image_path: String, error: String) -> Self {
    DetectionRecord {
      image_path,
      timestamp: now_timestamp(),
      inference_time_ms: None,
      detected: false,
      primary_detection: None,
      top_predictions: Vec::new(),
      model_info: None,
      error: Some(error),
    }
  }
}

/// 一次批处理的汇总统计，整体从记录序列重新计算。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
  pub total_images: usize,
  pub successful_detections: usize,
  pub failed_detections: usize,
  pub success_rate: f64,
  pub average_inference_time_ms: f64,
  pub detection_timestamp: String,
}

impl BatchSummary {
  pub fn from_records(records: &[DetectionRecord]) -> Self {
    let total_images = records.len();
    let successful_detections = records.iter().filter(|r| r.detected).count();
    let failed_detections = total_images - successful_detections;

    let success_rate = if total_images > 0 {
      round2(successful_detections as f64 / total_images as f64 * 100.0)
    } else {
      0.0
    };

    // 未到达推理阶段的记录没有耗时，不计入平均值
    let times: Vec<f64> = records.iter().filter_map(|r| r.inference_time_ms).collect();
    let average_inference_time_ms = if times.is_empty() {
      0.0
    } else {
      round2(times.iter().sum::<f64>() / times.len() as f64)
    };

    BatchSummary {
      total_images,
      successful_detections,
      failed_detections,
      success_rate,
      average_inference_time_ms,
      detection_timestamp: now_timestamp(),
    }
  }
}

/// 对外的报告文档：`detection_summary` 与 `detections` 两个顶级字段
/// 构成其它系统可以依赖的全部契约。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionReport {
  pub detection_summary: BatchSummary,
  pub detections: Vec<DetectionRecord>,
}

impl DetectionReport {
  pub fn to_json(&self) -> serde_json::Result<String> {
    serde_json::to_string_pretty(self)
  }
}

pub(crate) fn now_timestamp() -> String {
  Local::now().to_rfc3339_opts(SecondsFormat::Millis, false)
}

pub(crate) fn round2(value: f64) -> f64 {
  (value * 100.0).round() / 100.0
}
