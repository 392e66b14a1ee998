/// Decoding of downloaded template images.
///
/// Downloaded bytes are decoded with the `image` crate, normalized to RGBA and
/// downscaled to fit within a maximum edge length while preserving aspect ratio.

use fast_image_resize as fr;
use image::ImageError;

/// A decoded image ready for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedImage {
  /// Raw RGBA pixel data
  pub data: Vec<u8>,
  /// Image width in pixels
  pub width: u32,
  /// Image height in pixels
  pub height: u32,
}

impl DownloadedImage {
  /// Decode an encoded image (PNG, JPEG, GIF, ...).
  ///
  /// # Errors
  ///
  /// Returns `ImageError` if the bytes are not a supported image or resizing fails.
  pub fn from_bytes(bytes: &[u8], max_size: u32) -> Result<Self, ImageError> {
    let img = image::load_from_memory(bytes)?;

    let rgba_img = img.to_rgba8();
    let width = rgba_img.width();
    let height = rgba_img.height();
    let data = rgba_img.into_raw();

    let (width, height, data) = resize_if_needed(width, height, data, max_size)?;

    Ok(Self { data, width, height })
  }

  /// Short description for logs and text rendering, e.g. `640x320`
  pub fn dimensions(&self) -> String {
    format!("{}x{}", self.width, self.height)
  }
}

fn dimension_error() -> ImageError {
  ImageError::Limits(image::error::LimitError::from_kind(
    image::error::LimitErrorKind::DimensionError,
  ))
}

/// Resize image if it exceeds `max_size` on either edge, preserving aspect ratio.
///
/// Uses Lanczos3 algorithm for high-quality downscaling.
fn resize_if_needed(
  width: u32,
  height: u32,
  data: Vec<u8>,
  max_size: u32,
) -> Result<(u32, u32, Vec<u8>), ImageError> {
  let max_size = max_size.max(1);
  if width <= max_size && height <= max_size {
    return Ok((width, height, data));
  }

  let aspect_ratio = width as f32 / height as f32;
  let (new_width, new_height) = if width > height {
    let new_height = (max_size as f32 / aspect_ratio) as u32;
    (max_size, new_height.max(1))
  } else {
    let new_width = (max_size as f32 * aspect_ratio) as u32;
    (new_width.max(1), max_size)
  };

  let mut src = fr::images::Image::from_vec_u8(width, height, data, fr::PixelType::U8x4)
    .map_err(|_| dimension_error())?;
  let mut dst = fr::images::Image::new(new_width, new_height, fr::PixelType::U8x4);

  // Multiply alpha for proper blending during resize
  fr::MulDiv::default()
    .multiply_alpha_inplace(&mut src)
    .map_err(|_| dimension_error())?;

  let mut resizer = fr::Resizer::new();
  let resize_options = fr::ResizeOptions::new()
    .resize_alg(fr::ResizeAlg::Convolution(fr::FilterType::Lanczos3));
  resizer
    .resize(&src, &mut dst, Some(&resize_options))
    .map_err(|_| dimension_error())?;

  fr::MulDiv::default()
    .divide_alpha_inplace(&mut dst)
    .map_err(|_| dimension_error())?;

  Ok((new_width, new_height, dst.into_vec()))
}

#[cfg(test)]
pub(crate) fn encode_png(width: u32, height: u32) -> Vec<u8> {
  let img = image::RgbaImage::from_fn(width, height, |x, y| {
    image::Rgba([(x % 256) as u8, (y % 256) as u8, 128u8, 255u8])
  });
  let mut bytes = Vec::new();
  img
    .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
    .unwrap();
  bytes
}
