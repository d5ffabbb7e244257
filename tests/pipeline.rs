// 端到端流水线测试：桩模型 + 真实图像文件 + JSON 报告输出。

use std::path::PathBuf;
use std::time::Duration;

use lubiao::catalog::{ClassCatalog, GTSRB_CLASS_NUM};
use lubiao::config::DetectorConfig;
use lubiao::detector::SignDetector;
use lubiao::frame::RgbNhwcFrame;
use lubiao::model::{ClassScores, Model, ModelMeta};
use lubiao::output::{JsonFileOutput, ReportSink};

struct FixedScoresModel {
  meta: ModelMeta,
  scores: Vec<f32>,
}

impl FixedScoresModel {
  fn stop_sign() -> Self {
    let rest = 0.01 / (GTSRB_CLASS_NUM as f32 - 1.0);
    let mut scores = vec![rest; GTSRB_CLASS_NUM];
    scores[14] = 0.99;
    FixedScoresModel {
      meta: ModelMeta {
        model_path: "models/gtsrb_model.onnx".to_string(),
        input_shape: [1, 16, 16, 3],
        total_classes: GTSRB_CLASS_NUM,
      },
      scores,
    }
  }
}

impl Model for FixedScoresModel {
  type Input = RgbNhwcFrame<16, 16>;
  type Output = ClassScores;
  type Error = std::convert::Infallible;

  fn infer(&mut self, _input: &Self::Input) -> Result<Self::Output, Self::Error> {
    Ok(ClassScores {
      values: self.scores.clone().into_boxed_slice(),
      inference_time: Duration::from_micros(2500),
    })
  }

  fn meta(&self) -> &ModelMeta {
    &self.meta
  }
}

// 每个测试用独立目录，避免并行测试互相清理
fn workspace(name: &str) -> PathBuf {
  let dir = std::env::temp_dir().join(format!("lubiao-pipeline-{}-{}", std::process::id(), name));
  std::fs::create_dir_all(&dir).unwrap();
  dir
}

fn write_image(dir: &PathBuf, name: &str) -> PathBuf {
  let path = dir.join(name);
  image::RgbImage::new(32, 32).save(&path).unwrap();
  path
}

#[test]
fn batch_pipeline_writes_contract_conformant_report() {
  let dir = workspace("batch");
  let paths = vec![
    write_image(&dir, "00000.png"),
    write_image(&dir, "00001.jpg"),
    dir.join("missing.png"),
    write_image(&dir, "00002.bmp"),
  ];

  let mut detector = SignDetector::new(
    FixedScoresModel::stop_sign(),
    ClassCatalog::gtsrb(),
    DetectorConfig::new("models/gtsrb_model.onnx").with_top_k(3),
  )
  .unwrap();

  let report = detector.detect_many(&paths).unwrap();
  assert_eq!(report.detections.len(), 4);

  // 输出顺序必须与输入顺序一致
  let recorded: Vec<&str> = report
    .detections
    .iter()
    .map(|r| r.image_path.as_str())
    .collect();
  let expected: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
  assert_eq!(recorded, expected.iter().map(|s| s.as_str()).collect::<Vec<_>>());

  let summary = &report.detection_summary;
  assert_eq!(summary.total_images, 4);
  assert_eq!(summary.successful_detections, 3);
  assert_eq!(summary.failed_detections, 1);
  assert_eq!(summary.success_rate, 75.0);
  assert_eq!(summary.average_inference_time_ms, 2.5);

  // 写出并按导出的字段契约重新读取
  let report_path = dir.join("report").join("results.json");
  let sink = JsonFileOutput::new(report_path.clone());
  let written = sink.write_report(&report).unwrap();
  assert_eq!(written, report_path);

  let value: serde_json::Value =
    serde_json::from_str(&std::fs::read_to_string(&report_path).unwrap()).unwrap();
  assert_eq!(value["detection_summary"]["total_images"], 4);
  assert_eq!(value["detections"].as_array().unwrap().len(), 4);

  let first = &value["detections"][0];
  assert_eq!(first["detected"], true);
  assert_eq!(first["primary_detection"]["class_id"], 14);
  assert_eq!(first["primary_detection"]["label"], "Stop");
  assert_eq!(first["top_predictions"].as_array().unwrap().len(), 3);
  assert_eq!(first["model_info"]["total_classes"], 43);
  let confidence = first["model_info"]["confidence_threshold"].as_f64().unwrap();
  assert!((confidence - 0.3).abs() < 1e-6);

  let failed = &value["detections"][2];
  assert_eq!(failed["detected"], false);
  assert!(!failed["error"].as_str().unwrap().is_empty());
  assert!(failed.get("primary_detection").is_none());

  let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn single_detection_record_serializes_on_its_own() {
  let dir = workspace("single");
  let image = write_image(&dir, "single.png");

  let mut detector = SignDetector::new(
    FixedScoresModel::stop_sign(),
    ClassCatalog::gtsrb(),
    DetectorConfig::new("models/gtsrb_model.onnx"),
  )
  .unwrap();

  let record = detector.detect_one(&image);
  assert!(record.detected);

  let value = serde_json::to_value(&record).unwrap();
  assert_eq!(value["image_path"], image.display().to_string());
  assert_eq!(value["primary_detection"]["class_id"], 14);
  assert!(value.get("error").is_none());

  let _ = std::fs::remove_dir_all(dir);
}
