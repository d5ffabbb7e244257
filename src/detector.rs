// 该文件是 Lubiao （路标） 项目的一部分。
// src/detector.rs - 检测编排与批处理
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

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;
use tracing::{error, info, warn};

use crate::catalog::ClassCatalog;
use crate::config::{ConfigError, DetectorConfig};
use crate::decode::{self, ScoreError};
use crate::frame::RgbNhwcFrame;
use crate::input::{self, InputError};
use crate::model::{ClassScores, GTSRB_INPUT_H, GTSRB_INPUT_W, GtsrbModel, Model};
use crate::report::{
  BatchSummary, DetectionRecord, DetectionReport, ModelInfo, now_timestamp, round2,
};

/// 默认的 GTSRB 检测器组合。
pub type GtsrbDetector =
  SignDetector<GtsrbModel<GTSRB_INPUT_W, GTSRB_INPUT_H>, GTSRB_INPUT_W, GTSRB_INPUT_H>;

#[derive(Error, Debug)]
pub enum DetectorError {
  #[error("配置错误: {0}")]
  Config(#[from] ConfigError),
  #[error("类别目录大小 {catalog} 与模型类别数 {model} 不一致")]
  CatalogMismatch { catalog: usize, model: usize },
  #[error("批处理被中断")]
  Interrupted,
}

// 逐图像边界内的预期失败，降级为记录里的错误字段，不向上传播。
#[derive(Error, Debug)]
enum StageError {
  #[error("图像预处理失败: {0}")]
  Preprocess(#[from] InputError),
  #[error("模型推理失败: {0}")]
  Inference(String),
  #[error("结果解码失败: {0}")]
  Decode(#[from] ScoreError),
}

/// 检测编排器：预处理 → 推理 → 解码 → 记录组装。
pub struct SignDetector<M, const W: u32, const H: u32> {
  config: DetectorConfig,
  catalog: ClassCatalog,
  model: M,
  model_info: ModelInfo,
  interrupt: Option<Arc<AtomicBool>>,
}

impl<M, const W: u32, const H: u32> SignDetector<M, W, H>
where
  M: Model<Input = RgbNhwcFrame<W, H>, Output = ClassScores>,
  M::Error: std::fmt::Display,
{
  pub fn new(
    model: M,
    catalog: ClassCatalog,
    config: DetectorConfig,
  ) -> Result<Self, DetectorError> {
    let config = config.validated()?;

    let meta = model.meta();
    if catalog.len() != meta.total_classes {
      return Err(DetectorError::CatalogMismatch {
        catalog: catalog.len(),
        model: meta.total_classes,
      });
    }

    // 模型信息快照只在这里组装一次，之后逐条记录克隆
    let model_info = ModelInfo {
      model_path: meta.model_path.clone(),
      confidence_threshold: config.confidence_threshold,
      input_shape: meta.input_shape.to_vec(),
      total_classes: meta.total_classes,
    };

    Ok(SignDetector {
      config,
      catalog,
      model,
      model_info,
      interrupt: None,
    })
  }

  /// 注册批处理中断标志，在两张图像之间检查。
  pub fn with_interrupt(mut self, flag: Arc<AtomicBool>) -> Self {
    self.interrupt = Some(flag);
    self
  }

  pub fn config(&self) -> &DetectorConfig {
    &self.config
  }

  /// 处理单张图像，预期失败一律降级为失败记录，不越过本调用边界。
  pub fn detect_one(&mut self, image_path: impl AsRef<Path>) -> DetectionRecord {
    let image_path = image_path.as_ref();
    match self.run_stages(image_path) {
      Ok(record) => record,
      Err(stage) => {
        error!("检测失败: {}: {}", image_path.display(), stage);
        DetectionRecord::failure(image_path.display().to_string(), stage.to_string())
      }
    }
  }

  fn run_stages(&mut self, image_path: &Path) -> Result<DetectionRecord, StageError> {
    let frame = input::load_and_prepare::<W, H>(image_path)?;

    let scores = self
      .model
      .infer(&frame)
      .map_err(|e| StageError::Inference(e.to_string()))?;
    let inference_time_ms = round2(scores.inference_time.as_secs_f64() * 1000.0);

    let decoded = decode::decode(
      &scores.values,
      &self.catalog,
      self.config.confidence_threshold,
      self.config.top_k,
    )?;

    let detected = decoded.primary_detection.is_some();
    info!(
      "{}: detected={}, 推理耗时 {:.2} ms",
      image_path.display(),
      detected,
      inference_time_ms
    );

    Ok(DetectionRecord {
      image_path: image_path.display().to_string(),
      timestamp: now_timestamp(),
      inference_time_ms: Some(inference_time_ms),
      detected,
      primary_detection: decoded.primary_detection,
      top_predictions: decoded.top_predictions,
      model_info: Some(self.model_info.clone()),
      error: None,
    })
  }

  /// 按输入顺序处理一组图像并计算汇总。
  ///
  /// 单张图像的失败不会中止批处理；只有外部中断会提前返回，
  /// 此时部分结果被丢弃。
  pub fn detect_many<P: AsRef<Path>>(
    &mut self,
    image_paths: &[P],
  ) -> Result<DetectionReport, DetectorError> {
    let total = image_paths.len();
    info!("开始批量处理 {} 张图像", total);

    let mut records = Vec::with_capacity(total);
    for (index, path) in image_paths.iter().enumerate() {
      if self.is_interrupted() {
        warn!("批处理在第 {} 张图像前被中断，丢弃部分结果", index + 1);
        return Err(DetectorError::Interrupted);
      }
      info!(
        "处理第 {}/{} 张图像: {}",
        index + 1,
        total,
        path.as_ref().display()
      );
      records.push(self.detect_one(path.as_ref()));
    }

    let detection_summary = BatchSummary::from_records(&records);
    info!(
      "批量处理完成: {}/{} 张检出",
      detection_summary.successful_detections, total
    );

    Ok(DetectionReport {
      detection_summary,
      detections: records,
    })
  }

  fn is_interrupted(&self) -> bool {
    self
      .interrupt
      .as_ref()
      .map(|flag| flag.load(Ordering::SeqCst))
      .unwrap_or(false)
  }
}
