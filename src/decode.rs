// 该文件是 Lubiao （路标） 项目的一部分。
// src/decode.rs - 分数解码
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
use tracing::debug;

use crate::catalog::ClassCatalog;
use crate::model::Prediction;

// 判定原始输出是否已经是概率单纯形的求和容差
const SIMPLEX_SUM_TOLERANCE: f32 = 1e-3;

#[derive(Error, Debug)]
pub enum ScoreError {
  #[error("分类分数长度不匹配: 期望 {expected}, 实际 {actual}")]
  LengthMismatch { expected: usize, actual: usize },
}

/// 解码结果：按置信度降序的前 k 个预测，以及过阈值的主预测。
#[derive(Debug, Clone)]
pub struct Decoded {
  pub top_predictions: Vec<Prediction>,
  pub primary_detection: Option<Prediction>,
}

/// 将原始分数向量解码为带标签的排名预测。
///
/// 原始输出若已是概率单纯形则直接使用，否则先做 softmax 归一化。
/// 排序按置信度降序，相同置信度按类别编号升序，保证确定性。
pub fn decode(
  raw_scores: &[f32],
  catalog: &ClassCatalog,
  threshold: f32,
  top_k: usize,
) -> Result<Decoded, ScoreError> {
  if raw_scores.len() != catalog.len() {
    return Err(ScoreError::LengthMismatch {
      expected: catalog.len(),
      actual: raw_scores.len(),
    });
  }

  let probabilities = if is_probability_simplex(raw_scores) {
    raw_scores.to_vec()
  } else {
    debug!("原始输出不是概率单纯形，应用 softmax 归一化");
    softmax(raw_scores)
  };

  let mut order: Vec<usize> = (0..probabilities.len()).collect();
  order.sort_by(|&a, &b| probabilities[b].total_cmp(&probabilities[a]).then(a.cmp(&b)));

  let top_predictions: Vec<Prediction> = order
    .into_iter()
    .take(top_k)
    .map(|class_id| Prediction {
      class_id: class_id as u32,
      label: catalog
        .label_of(class_id as u32)
        .unwrap_or("unknown")
        .to_string(),
      confidence: probabilities[class_id],
    })
    .collect();

  let primary_detection = top_predictions
    .first()
    .filter(|prediction| prediction.confidence >= threshold)
    .cloned();

  Ok(Decoded {
    top_predictions,
    primary_detection,
  })
}

fn is_probability_simplex(values: &[f32]) -> bool {
  if values.is_empty() {
    return false;
  }
  let mut sum = 0.0f32;
  for v in values {
    if !v.is_finite() || *v < 0.0 {
      return false;
    }
    sum += v;
  }
  (sum - 1.0).abs() <= SIMPLEX_SUM_TOLERANCE
}

fn softmax(values: &[f32]) -> Vec<f32> {
  let max_val = values.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
  let mut exps = Vec::with_capacity(values.len());
  let mut sum = 0.0f32;
  for v in values {
    let e = (v - max_val).exp();
    exps.push(e);
    sum += e;
  }
  exps.iter().map(|e| e / sum).collect()
}
