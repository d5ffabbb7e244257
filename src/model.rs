// 该文件是 Lubiao （路标） 项目的一部分。
// src/model.rs - 模型
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

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub trait Model {
  type Input;
  type Output;
  type Error;

  fn infer(&mut self, input: &Self::Input) -> Result<Self::Output, Self::Error>;
  fn meta(&self) -> &ModelMeta;
}

/// 模型加载后固定不变的元数据。
#[derive(Debug, Clone)]
pub struct ModelMeta {
  pub model_path: String,
  pub input_shape: [usize; 4],
  pub total_classes: usize,
}

/// 一次前向推理的输出：目录顺序的逐类分数与执行耗时。
#[derive(Debug, Clone)]
pub struct ClassScores {
  pub values: Box<[f32]>,
  pub inference_time: Duration,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
  pub class_id: u32,
  pub label: String,
  pub confidence: f32,
}

mod gtsrb;
pub use self::gtsrb::{GTSRB_INPUT_H, GTSRB_INPUT_W, GtsrbError, GtsrbModel, GtsrbModelBuilder};
