// 该文件是 Lubiao （路标） 项目的一部分。
// src/input.rs - 图像输入与预处理
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

use std::io::Cursor;
use std::path::Path;

use image::{DynamicImage, ImageReader, imageops::FilterType};
use thiserror::Error;
use tracing::debug;

use crate::frame::RgbNhwcFrame;

#[derive(Error, Debug)]
pub enum InputError {
  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),
  #[error("Image loading error: {0}")]
  Decode(#[from] image::ImageError),
  #[error("Image shape mismatch: expected {expected} values, got {actual}")]
  Shape { expected: usize, actual: usize },
}

/// 从文件路径读取图像并预处理为模型输入帧。
pub fn load_and_prepare<const W: u32, const H: u32>(
  path: &Path,
) -> Result<RgbNhwcFrame<W, H>, InputError> {
  debug!("读取图像文件: {}", path.display());
  let image = ImageReader::open(path)?.decode()?;
  prepare_image(&image)
}

/// 从内存字节缓冲区解码并预处理，格式按内容猜测。
pub fn prepare_bytes<const W: u32, const H: u32>(
  bytes: &[u8],
) -> Result<RgbNhwcFrame<W, H>, InputError> {
  let image = ImageReader::new(Cursor::new(bytes))
    .with_guessed_format()?
    .decode()?;
  prepare_image(&image)
}

/// 解码后的图像到模型输入帧：RGB 转换、双线性缩放、归一化到 [0,1]。
pub fn prepare_image<const W: u32, const H: u32>(
  image: &DynamicImage,
) -> Result<RgbNhwcFrame<W, H>, InputError> {
  let rgb = image.to_rgb8();
  let resized = image::imageops::resize(&rgb, W, H, FilterType::Triangle);
  let raw = resized.into_raw();

  let expected = (W as usize) * (H as usize) * 3;
  if raw.len() != expected {
    return Err(InputError::Shape {
      expected,
      actual: raw.len(),
    });
  }

  let data: Vec<f32> = raw.iter().map(|v| f32::from(*v) / 255.0).collect();
  Ok(RgbNhwcFrame::from(data))
}

#[cfg(test)]
mod tests {
  use super::*;
  use image::{Rgb, RgbImage};

  fn sample_png() -> Vec<u8> {
    let mut image = RgbImage::new(4, 4);
    for pixel in image.pixels_mut() {
      *pixel = Rgb([255, 0, 128]);
    }
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgb8(image)
      .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
      .unwrap();
    bytes
  }

  #[test]
  fn prepared_frame_is_normalized() {
    let frame: RgbNhwcFrame<8, 8> = prepare_bytes(&sample_png()).unwrap();
    assert_eq!(frame.as_nhwc().len(), 8 * 8 * 3);
    assert!(frame.as_nhwc().iter().all(|v| (0.0..=1.0).contains(v)));
    // 红色通道满值应归一化为 1.0
    assert_eq!(frame.as_nhwc()[0], 1.0);
  }

  #[test]
  fn corrupt_bytes_fail_to_decode() {
    let result: Result<RgbNhwcFrame<8, 8>, _> = prepare_bytes(b"not an image at all");
    assert!(matches!(result, Err(InputError::Decode(_))));
  }

  #[test]
  fn missing_file_is_an_io_error() {
    let result: Result<RgbNhwcFrame<8, 8>, _> =
      load_and_prepare(Path::new("/no/such/picture.png"));
    assert!(matches!(result, Err(InputError::Io(_))));
  }
}
