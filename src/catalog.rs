// 该文件是 Lubiao （路标） 项目的一部分。
// src/catalog.rs - 类别目录
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

pub const GTSRB_CLASS_NUM: usize = 43;

// GTSRB 43 类交通标志标签，按类别编号排列。
const GTSRB_LABELS: [&str; GTSRB_CLASS_NUM] = [
  "Speed limit (20km/h)",
  "Speed limit (30km/h)",
  "Speed limit (50km/h)",
  "Speed limit (60km/h)",
  "Speed limit (70km/h)",
  "Speed limit (80km/h)",
  "End of speed limit (80km/h)",
  "Speed limit (100km/h)",
  "Speed limit (120km/h)",
  "No passing",
  "No passing veh over 3.5 tons",
  "Right-of-way at intersection",
  "Priority road",
  "Yield",
  "Stop",
  "No vehicles",
  "Veh > 3.5 tons prohibited",
  "No entry",
  "General caution",
  "Dangerous curve left",
  "Dangerous curve right",
  "Double curve",
  "Bumpy road",
  "Slippery road",
  "Road narrows on the right",
  "Road work",
  "Traffic signals",
  "Pedestrians",
  "Children crossing",
  "Bicycles crossing",
  "Beware of ice/snow",
  "Wild animals crossing",
  "End speed + passing limits",
  "Turn right ahead",
  "Turn left ahead",
  "Ahead only",
  "Go straight or right",
  "Go straight or left",
  "Keep right",
  "Keep left",
  "Roundabout mandatory",
  "End of no passing",
  "End no passing veh > 3.5 tons",
];

/// 只读的类别编号到标签映射，加载一次后在所有检测间共享。
#[derive(Debug, Clone)]
pub struct ClassCatalog {
  labels: Box<[String]>,
}

impl Default for ClassCatalog {
  fn default() -> Self {
    Self::gtsrb()
  }
}

impl ClassCatalog {
  /// 内置的 GTSRB 目录。
  pub fn gtsrb() -> Self {
    Self::from_labels(GTSRB_LABELS.iter().map(|s| s.to_string()))
  }

  /// 从外部标签表构建目录，顺序即类别编号。
  pub fn from_labels<I>(labels: I) -> Self
  where
    I: IntoIterator<Item = String>,
  {
    ClassCatalog {
      labels: labels.into_iter().collect(),
    }
  }

  pub fn label_of(&self, class_id: u32) -> Option<&str> {
    self.labels.get(class_id as usize).map(|s| s.as_str())
  }

  pub fn len(&self) -> usize {
    self.labels.len()
  }

  pub fn is_empty(&self) -> bool {
    self.labels.is_empty()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn gtsrb_catalog_has_43_classes() {
    let catalog = ClassCatalog::gtsrb();
    assert_eq!(catalog.len(), GTSRB_CLASS_NUM);
    assert_eq!(catalog.label_of(0), Some("Speed limit (20km/h)"));
    assert_eq!(catalog.label_of(14), Some("Stop"));
    assert_eq!(catalog.label_of(42), Some("End no passing veh > 3.5 tons"));
  }

  #[test]
  fn out_of_range_id_has_no_label() {
    let catalog = ClassCatalog::gtsrb();
    assert_eq!(catalog.label_of(43), None);
  }
}
