// 该文件是 Lubiao （路标） 项目的一部分。
// src/args.rs - 项目参数配置
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

use clap::{Parser, Subcommand};

use lubiao::config::{DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_MODEL_PATH, DEFAULT_TOP_K};

/// Lubiao 项目参数配置
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  #[command(subcommand)]
  pub command: Command,
}

#[derive(clap::Args, Debug)]
pub struct CommonOpts {
  /// ONNX 模型文件路径
  #[arg(short = 'm', long, value_name = "FILE", default_value = DEFAULT_MODEL_PATH)]
  pub model: String,

  /// 置信度阈值 (0.0 - 1.0)
  #[arg(
    short = 'c',
    long,
    default_value_t = DEFAULT_CONFIDENCE_THRESHOLD,
    value_name = "THRESHOLD"
  )]
  pub confidence: f32,

  /// 保留的 top-k 预测数量
  #[arg(short = 'k', long, default_value_t = DEFAULT_TOP_K, value_name = "COUNT")]
  pub top_k: usize,
}

#[derive(Subcommand, Debug)]
pub enum Command {
  /// 检测单张图像
  Detect {
    /// 图像文件路径
    /// 支持格式: *.png, *.jpg, *.jpeg, *.bmp, *.tiff
    #[arg(value_name = "IMAGE")]
    image: PathBuf,

    /// 单条结果的 JSON 输出路径（可选）
    #[arg(short = 'o', long, value_name = "OUTPUT")]
    output: Option<PathBuf>,

    #[command(flatten)]
    opts: CommonOpts,
  },

  /// 批量处理目录中的全部图像
  Batch {
    /// 包含图像的目录
    #[arg(value_name = "DIRECTORY")]
    directory: PathBuf,

    /// 报告输出目标
    /// 支持裸文件路径，以及 json://<path> 与 folder://<dir> URI
    #[arg(
      short = 'o',
      long,
      default_value = "output/batch_results.json",
      value_name = "OUTPUT"
    )]
    output: String,

    #[command(flatten)]
    opts: CommonOpts,
  },
}
