//! Captured screenshot hand-off and background preparation

use base64::Engine as _;
use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::domain::{Rect, ViewportRect};
use crate::error::CaptureError;

/// Capture payload handed over by the capture step
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureInput {
    /// `data:image/png;base64,...` URI of the captured viewport
    #[serde(default)]
    pub image_uri: String,
    /// Selected region in CSS pixels
    #[serde(default)]
    pub viewport_rect: Option<ViewportRect>,
    /// Device pixel ratio at capture time
    #[serde(default)]
    pub dpr: Option<f64>,
}

impl CaptureInput {
    /// Wrap encoded image bytes (PNG/JPEG) as a capture without a selection
    pub fn from_image_bytes(bytes: &[u8]) -> Self {
        let mime = match image::guess_format(bytes) {
            Ok(image::ImageFormat::Jpeg) => "image/jpeg",
            _ => "image/png",
        };
        let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
        Self {
            image_uri: format!("data:{mime};base64,{encoded}"),
            viewport_rect: None,
            dpr: None,
        }
    }

    /// Decode the full captured bitmap
    pub fn decode(&self) -> Result<RgbaImage, CaptureError> {
        if self.image_uri.trim().is_empty() {
            return Err(CaptureError::Missing);
        }
        let bytes = decode_data_uri(&self.image_uri)?;
        let img = image::load_from_memory(&bytes)?.to_rgba8();
        log::debug!("Capture decoded: {}x{} pixels", img.width(), img.height());
        Ok(img)
    }

    /// Selection to crop to; only applies when both rect and dpr are present
    pub fn crop_region(&self) -> Option<(ViewportRect, f64)> {
        Some((self.viewport_rect?, self.dpr?))
    }
}

/// Extract the payload of a base64 `data:` URI
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>, CaptureError> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| CaptureError::DataUri("missing data: scheme".into()))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| CaptureError::DataUri("missing ',' separator".into()))?;
    if !meta.split(';').any(|part| part == "base64") {
        return Err(CaptureError::DataUri("only base64 payloads are supported".into()));
    }
    base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|err| CaptureError::DataUri(err.to_string()))
}

/// Crop `img` to `rect` scaled by `dpr`, clamped to the bitmap bounds
pub fn crop_to_selection(
    img: &RgbaImage,
    rect: ViewportRect,
    dpr: f64,
) -> Result<RgbaImage, CaptureError> {
    let bounds = Rect::new(0, 0, img.width() as i32, img.height() as i32);
    let region = rect
        .to_device(dpr)
        .intersect(bounds)
        .ok_or(CaptureError::EmptyRegion)?;
    let dims = region.dimensions().ok_or(CaptureError::EmptyRegion)?;
    log::debug!(
        "Cropping capture to {}x{} at ({}, {})",
        dims.width(),
        dims.height(),
        region.left,
        region.top
    );
    Ok(image::imageops::crop_imm(
        img,
        region.left as u32,
        region.top as u32,
        dims.width(),
        dims.height(),
    )
    .to_image())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes(img: &RgbaImage) -> Vec<u8> {
        let mut out = std::io::Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn empty_uri_is_missing_capture() {
        let input = CaptureInput::default();
        assert!(matches!(input.decode(), Err(CaptureError::Missing)));
    }

    #[test]
    fn non_data_uri_is_rejected() {
        assert!(matches!(
            decode_data_uri("http://example.com/a.png"),
            Err(CaptureError::DataUri(_))
        ));
        assert!(matches!(
            decode_data_uri("data:image/png,plain"),
            Err(CaptureError::DataUri(_))
        ));
    }

    #[test]
    fn image_bytes_round_trip_through_data_uri() {
        let img = RgbaImage::from_pixel(3, 2, image::Rgba([1, 2, 3, 255]));
        let input = CaptureInput::from_image_bytes(&png_bytes(&img));
        assert!(input.image_uri.starts_with("data:image/png;base64,"));
        assert_eq!(input.decode().unwrap(), img);
    }

    #[test]
    fn crop_requires_both_rect_and_dpr() {
        let mut input = CaptureInput {
            viewport_rect: Some(ViewportRect::default()),
            ..Default::default()
        };
        assert!(input.crop_region().is_none());
        input.dpr = Some(2.0);
        assert!(input.crop_region().is_some());
    }

    #[test]
    fn crop_scales_by_dpr() {
        let mut img = RgbaImage::new(100, 100);
        img.put_pixel(20, 30, image::Rgba([9, 9, 9, 255]));
        let rect = ViewportRect {
            x: 10.0,
            y: 15.0,
            width: 20.0,
            height: 10.0,
        };
        let cropped = crop_to_selection(&img, rect, 2.0).unwrap();
        assert_eq!(cropped.dimensions(), (40, 20));
        assert_eq!(cropped.get_pixel(0, 0), &image::Rgba([9, 9, 9, 255]));
    }

    #[test]
    fn crop_is_clamped_and_rejects_empty_regions() {
        let img = RgbaImage::new(50, 50);
        let partly_outside = ViewportRect {
            x: 40.0,
            y: 40.0,
            width: 30.0,
            height: 30.0,
        };
        let cropped = crop_to_selection(&img, partly_outside, 1.0).unwrap();
        assert_eq!(cropped.dimensions(), (10, 10));

        let zero = ViewportRect {
            x: 5.0,
            y: 5.0,
            width: 0.0,
            height: 10.0,
        };
        assert!(matches!(
            crop_to_selection(&img, zero, 1.0),
            Err(CaptureError::EmptyRegion)
        ));
    }
}
