//! Best-effort metadata extraction from uploaded images.
//!
//! Neither extractor propagates errors: a decode failure yields absent
//! metadata and a log line on the supplied span.

use std::collections::BTreeMap;
use std::io::Cursor;

use exif::{Context, Field, In, Tag, Value};
use image::ImageReader;
use tracing::{Span, debug, warn};

use super::UploadSource;
use crate::domain::ExifData;

/// Pixel dimensions of a fresh upload, or `(None, None)` when unknown.
pub fn image_dimensions(source: &UploadSource, span: &Span) -> (Option<u32>, Option<u32>) {
    let Some(bytes) = source.bytes() else {
        return (None, None);
    };

    let dimensions = ImageReader::new(Cursor::new(bytes.as_ref()))
        .with_guessed_format()
        .map_err(image::ImageError::IoError)
        .and_then(ImageReader::into_dimensions);

    match dimensions {
        Ok((width, height)) => (Some(width), Some(height)),
        Err(error) => {
            debug!(
                parent: span,
                %error,
                filename = source.filename(),
                "could not read image dimensions"
            );
            (None, None)
        }
    }
}

fn group_name(tag: Tag) -> &'static str {
    match tag.context() {
        Context::Exif => "EXIF",
        Context::Gps => "GPS",
        Context::Interop => "Interoperability",
        _ => "Image",
    }
}

/// Human-readable tag value; ASCII values lose their quoting and padding.
fn render_value(field: &Field, parsed: &exif::Exif) -> String {
    match &field.value {
        Value::Ascii(parts) => parts
            .iter()
            .map(|part| String::from_utf8_lossy(part).trim_end_matches('\0').to_owned())
            .collect::<Vec<_>>()
            .join(", "),
        _ => field.display_value().with_unit(parsed).to_string(),
    }
}

/// Embedded camera tags, keyed `"<group> <Tag>"`.
///
/// Thumbnail IFD entries and maker notes are skipped. Returns `None` when
/// the image carries no tags or the scan fails.
pub fn exif_tags(source: &UploadSource, span: &Span) -> Option<ExifData> {
    let bytes = source.bytes()?;

    let parsed = match exif::Reader::new().read_from_container(&mut Cursor::new(bytes.as_ref())) {
        Ok(parsed) => parsed,
        Err(exif::Error::NotFound(_) | exif::Error::BlankValue(_)) => return None,
        Err(error) => {
            warn!(
                parent: span,
                %error,
                filename = source.filename(),
                "EXIF extraction failed"
            );
            return None;
        }
    };

    let tags: BTreeMap<String, String> = parsed
        .fields()
        .filter(|field| field.ifd_num != In::THUMBNAIL && field.tag != Tag::MakerNote)
        .filter_map(|field| {
            let value = render_value(field, &parsed);
            let value = value.trim();
            (!value.is_empty())
                .then(|| (format!("{} {}", group_name(field.tag), field.tag), value.to_owned()))
        })
        .collect();

    (!tags.is_empty()).then(|| ExifData::new(tags))
}
