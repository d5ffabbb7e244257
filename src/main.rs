// 该文件是 Lubiao （路标） 项目的一部分。
// src/main.rs - 项目主程序
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

mod args;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};

use lubiao::catalog::ClassCatalog;
use lubiao::config::DetectorConfig;
use lubiao::detector::{GtsrbDetector, SignDetector};
use lubiao::model::{GTSRB_INPUT_H, GTSRB_INPUT_W, GtsrbModelBuilder};
use lubiao::output::{OutputWrapper, ReportSink};

use args::{Args, Command, CommonOpts};

const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "bmp", "tiff"];

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();
  match args.command {
    Command::Detect {
      image,
      output,
      opts,
    } => run_detect(&image, output.as_deref(), &opts),
    Command::Batch {
      directory,
      output,
      opts,
    } => run_batch(&directory, &output, &opts),
  }
}

// 模型加载失败是唯一的致命错误类别，直接向上冒泡中止进程。
fn build_detector(opts: &CommonOpts) -> Result<GtsrbDetector> {
  info!("正在加载模型: {}", opts.model);
  let catalog = ClassCatalog::gtsrb();
  let model = GtsrbModelBuilder::new(&opts.model)
    .classes(catalog.len())
    .build::<GTSRB_INPUT_W, GTSRB_INPUT_H>()?;

  let config = DetectorConfig::new(&opts.model)
    .with_confidence_threshold(opts.confidence)
    .with_top_k(opts.top_k);

  Ok(SignDetector::new(model, catalog, config)?)
}

fn run_detect(image: &Path, output: Option<&Path>, opts: &CommonOpts) -> Result<()> {
  let mut detector = build_detector(opts)?;
  let record = detector.detect_one(image);

  println!("==================================================");
  println!("检测结果: {}", record.image_path);
  println!("==================================================");
  match (&record.primary_detection, &record.error) {
    (Some(primary), _) => {
      println!("检出: {}", primary.label);
      println!("置信度: {:.4}", primary.confidence);
      println!("类别编号: {}", primary.class_id);
      if let Some(ms) = record.inference_time_ms {
        println!("推理耗时: {:.2} ms", ms);
      }
      if record.top_predictions.len() > 1 {
        println!();
        println!("Top 预测:");
        for (index, prediction) in record.top_predictions.iter().enumerate() {
          println!(
            "  {}. {} ({:.4})",
            index + 1,
            prediction.label,
            prediction.confidence
          );
        }
      }
    }
    (None, Some(error)) => {
      println!("未检出交通标志");
      println!("错误: {}", error);
    }
    (None, None) => {
      println!("未检出交通标志");
      println!("最高置信度低于阈值 ({})", opts.confidence);
    }
  }
  println!("==================================================");

  if let Some(path) = output {
    if let Some(parent) = path.parent() {
      if !parent.as_os_str().is_empty() {
        std::fs::create_dir_all(parent)?;
      }
    }
    std::fs::write(path, serde_json::to_string_pretty(&record)?)?;
    println!("结果已保存到: {}", path.display());
  }

  Ok(())
}

fn run_batch(directory: &Path, output: &str, opts: &CommonOpts) -> Result<()> {
  let image_paths = collect_image_paths(directory)?;
  if image_paths.is_empty() {
    anyhow::bail!("目录中没有可处理的图像: {}", directory.display());
  }
  info!("找到 {} 张待处理图像", image_paths.len());

  let interrupt = Arc::new(AtomicBool::new(false));
  {
    let flag = interrupt.clone();
    ctrlc::set_handler(move || {
      warn!("收到中断信号，准备退出...");
      flag.store(true, Ordering::SeqCst);
    })?;
  }

  let mut detector = build_detector(opts)?.with_interrupt(interrupt);
  let report = detector.detect_many(&image_paths)?;

  let sink = OutputWrapper::from_target(output)?;
  let written = sink.write_report(&report)?;

  let summary = &report.detection_summary;
  println!("处理完成!");
  println!("总图像数: {}", summary.total_images);
  println!(
    "检出: {} / 未检出: {}",
    summary.successful_detections, summary.failed_detections
  );
  println!("成功率: {:.2}%", summary.success_rate);
  println!("平均推理耗时: {:.2} ms", summary.average_inference_time_ms);
  println!("报告文件: {}", written.display());

  Ok(())
}

/// 扫描目录中受支持的图像文件，排序后返回，保证批处理顺序确定。
fn collect_image_paths(directory: &Path) -> Result<Vec<PathBuf>> {
  let mut paths = Vec::new();
  for entry in std::fs::read_dir(directory)? {
    let path = entry?.path();
    if !path.is_file() {
      continue;
    }
    let supported = path
      .extension()
      .and_then(|extension| extension.to_str())
      .map(|extension| IMAGE_EXTENSIONS.contains(&extension.to_ascii_lowercase().as_str()))
      .unwrap_or(false);
    if supported {
      paths.push(path);
    }
  }
  paths.sort();
  Ok(paths)
}
