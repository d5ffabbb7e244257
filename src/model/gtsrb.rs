// 该文件是 Lubiao （路标） 项目的一部分。
// src/model/gtsrb.rs - GTSRB 分类模型
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

use std::time::Instant;

use ort::{
  inputs,
  session::{Session, builder::GraphOptimizationLevel},
  value::Tensor,
};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::catalog::GTSRB_CLASS_NUM;
use crate::frame::RgbNhwcFrame;
use crate::model::{ClassScores, Model, ModelMeta};

pub const GTSRB_INPUT_W: u32 = 224;
pub const GTSRB_INPUT_H: u32 = 224;

const GTSRB_NUM_INPUTS: usize = 1;
const GTSRB_NUM_OUTPUTS: usize = 1;
const DEFAULT_INTRA_THREADS: usize = 4;

#[derive(Error, Debug)]
pub enum GtsrbError {
  #[error("模型加载错误: {0}")]
  ModelLoad(#[from] std::io::Error),
  #[error("模型无效: {0}")]
  ModelInvalid(String),
  #[error("推理错误: {0}")]
  Inference(#[from] ort::Error),
}

impl GtsrbError {
  pub fn invalid(msg: &str, e: ort::Error) -> Self {
    GtsrbError::ModelInvalid(format!("{msg}: {e}"))
  }
}

/// 加载完成后只读的模型句柄，整个进程生命周期内可复用。
pub struct GtsrbModel<const W: u32, const H: u32> {
  session: Session,
  input_name: String,
  meta: ModelMeta,
}

pub struct GtsrbModelBuilder {
  model_path: String,
  intra_threads: usize,
  total_classes: usize,
}

impl GtsrbModelBuilder {
  pub fn new(model_path: impl Into<String>) -> Self {
    GtsrbModelBuilder {
      model_path: model_path.into(),
      intra_threads: DEFAULT_INTRA_THREADS,
      total_classes: GTSRB_CLASS_NUM,
    }
  }

  pub fn intra_threads(mut self, intra_threads: usize) -> Self {
    self.intra_threads = intra_threads;
    self
  }

  pub fn classes(mut self, total_classes: usize) -> Self {
    self.total_classes = total_classes;
    self
  }

  pub fn build<const W: u32, const H: u32>(self) -> Result<GtsrbModel<W, H>, GtsrbError> {
    info!("加载模型文件: {}", self.model_path);
    let model_data = std::fs::read(&self.model_path)?;
    debug!(
      "模型文件大小: {:.2} MB",
      model_data.len() as f64 / (1024.0 * 1024.0)
    );

    info!("创建 ONNX Runtime 推理会话");
    let session = Session::builder()
      .map_err(|e| GtsrbError::invalid("无法创建会话构建器", e))?
      .with_optimization_level(GraphOptimizationLevel::Level3)
      .map_err(|e| GtsrbError::invalid("无法设置图优化级别", e))?
      .with_intra_threads(self.intra_threads)
      .map_err(|e| GtsrbError::invalid("无法设置线程数量", e))?
      .commit_from_memory(&model_data)
      .map_err(|e| GtsrbError::invalid("无法加载模型", e))?;
    info!("模型加载完成");

    let num_inputs = session.inputs.len();
    let num_outputs = session.outputs.len();

    if num_inputs != GTSRB_NUM_INPUTS {
      error!(
        "预期模型输入数量为 {}, 实际为 {}",
        GTSRB_NUM_INPUTS, num_inputs
      );
      return Err(GtsrbError::ModelInvalid(format!(
        "预期模型输入数量为 {}, 实际为 {}",
        GTSRB_NUM_INPUTS, num_inputs
      )));
    }

    if num_outputs != GTSRB_NUM_OUTPUTS {
      error!(
        "预期模型输出数量为 {}, 实际为 {}",
        GTSRB_NUM_OUTPUTS, num_outputs
      );
      return Err(GtsrbError::ModelInvalid(format!(
        "预期模型输出数量为 {}, 实际为 {}",
        GTSRB_NUM_OUTPUTS, num_outputs
      )));
    }

    let input_name = session.inputs[0].name.clone();
    debug!("模型输入名称: {}", input_name);

    let meta = ModelMeta {
      model_path: self.model_path,
      input_shape: [1, H as usize, W as usize, 3],
      total_classes: self.total_classes,
    };

    let mut model = GtsrbModel {
      session,
      input_name,
      meta,
    };

    // 零张量探测一次，验证输入形状可绑定且输出长度等于类别数。
    debug!("执行零张量探测推理");
    let probe = model
      .infer(&RgbNhwcFrame::<W, H>::default())
      .map_err(|e| GtsrbError::ModelInvalid(format!("探测推理失败: {e}")))?;

    if probe.values.len() != model.meta.total_classes {
      error!(
        "预期模型输出长度为 {}, 实际为 {}",
        model.meta.total_classes,
        probe.values.len()
      );
      return Err(GtsrbError::ModelInvalid(format!(
        "预期模型输出长度为 {}, 实际为 {}",
        model.meta.total_classes,
        probe.values.len()
      )));
    }
    debug!("探测推理完成，耗时: {:.2?}", probe.inference_time);

    Ok(model)
  }
}

impl<const W: u32, const H: u32> Model for GtsrbModel<W, H> {
  type Input = RgbNhwcFrame<W, H>;
  type Output = ClassScores;
  type Error = GtsrbError;

  fn infer(&mut self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
    debug!("设置模型输入");
    let [n, h, w, c] = input.shape();
    let tensor = Tensor::from_array(([n, h, w, c], input.as_nhwc().to_vec()))?;

    debug!("执行模型推理");
    let start = Instant::now();
    let outputs = self.session.run(inputs![self.input_name.as_str() => tensor])?;
    let elapsed = start.elapsed();

    debug!("获取模型输出");
    let (shape, data) = outputs[0].try_extract_tensor::<f32>()?;
    debug!("模型输出形状: {:?}, 推理耗时: {:.2?}", shape, elapsed);

    Ok(ClassScores {
      values: data.to_vec().into_boxed_slice(),
      inference_time: elapsed,
    })
  }

  fn meta(&self) -> &ModelMeta {
    &self.meta
  }
}
