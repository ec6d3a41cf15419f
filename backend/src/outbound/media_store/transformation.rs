//! Rendering of [`Transformation`] descriptors as URL path segments.

use crate::domain::ports::{CropMode, Hint, Transformation};

fn crop_flag(crop: CropMode) -> &'static str {
    match crop {
        CropMode::Fill => "c_fill",
        CropMode::Limit => "c_limit",
        CropMode::Thumb => "c_thumb,g_face",
    }
}

fn hint_value(hint: Hint) -> &'static str {
    match hint {
        Hint::Auto => "auto",
    }
}

/// Comma-separated transformation, or `None` for the original asset.
///
/// # Examples
/// ```
/// use lightbox::domain::ports::Transformation;
/// use lightbox::outbound::media_store::transformation_segment;
///
/// assert_eq!(
///     transformation_segment(&Transformation::thumbnail()).as_deref(),
///     Some("c_fill,w_300,h_300,q_auto,f_auto"),
/// );
/// assert_eq!(transformation_segment(&Transformation::ORIGINAL), None);
/// ```
pub fn transformation_segment(transformation: &Transformation) -> Option<String> {
    if transformation.is_original() {
        return None;
    }
    let mut parts: Vec<String> = Vec::with_capacity(5);
    if let Some(crop) = transformation.crop {
        parts.push(crop_flag(crop).to_owned());
    }
    if let Some(width) = transformation.width {
        parts.push(format!("w_{width}"));
    }
    if let Some(height) = transformation.height {
        parts.push(format!("h_{height}"));
    }
    if let Some(quality) = transformation.quality {
        parts.push(format!("q_{}", hint_value(quality)));
    }
    if let Some(format) = transformation.format {
        parts.push(format!("f_{}", hint_value(format)));
    }
    Some(parts.join(","))
}
