//! Generated image fixtures.
//!
//! Images are encoded on the fly so tests never depend on binary files.

use std::io::Cursor;

use exif::experimental::Writer;
use exif::{Field, In, Tag, Value};
use image::{ImageFormat, Rgb, RgbImage};

fn encode(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let image = RgbImage::from_fn(width, height, |x, y| {
        let channel = |v: u32| u8::try_from(v % 256).unwrap_or_default();
        Rgb([channel(x * 7), channel(y * 13), 96])
    });
    let mut out = Cursor::new(Vec::new());
    image
        .write_to(&mut out, format)
        .expect("encode fixture image");
    out.into_inner()
}

/// A valid PNG of the given size.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    encode(width, height, ImageFormat::Png)
}

/// A valid baseline JPEG of the given size, without EXIF.
pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    encode(width, height, ImageFormat::Jpeg)
}

/// A PNG cut off halfway through its pixel data.
pub fn truncated_png() -> Vec<u8> {
    let mut bytes = png_bytes(64, 64);
    bytes.truncate(bytes.len() / 2);
    bytes
}

/// A small JPEG whose APP1 segment carries `Make` and `Model` tags.
pub fn jpeg_with_camera_exif(make: &str, model: &str) -> Vec<u8> {
    let make = Field {
        tag: Tag::Make,
        ifd_num: In::PRIMARY,
        value: Value::Ascii(vec![make.as_bytes().to_vec()]),
    };
    let model = Field {
        tag: Tag::Model,
        ifd_num: In::PRIMARY,
        value: Value::Ascii(vec![model.as_bytes().to_vec()]),
    };
    let mut writer = Writer::new();
    writer.push_field(&make);
    writer.push_field(&model);
    let mut tiff = Cursor::new(Vec::new());
    writer.write(&mut tiff, false).expect("encode EXIF block");
    let tiff = tiff.into_inner();

    let payload_len = u16::try_from(2 + 6 + tiff.len()).expect("EXIF block fits a segment");
    let mut segment = vec![0xFF, 0xE1];
    segment.extend_from_slice(&payload_len.to_be_bytes());
    segment.extend_from_slice(b"Exif\0\0");
    segment.extend_from_slice(&tiff);

    let jpeg = jpeg_bytes(24, 16);
    let mut out = Vec::with_capacity(jpeg.len() + segment.len());
    out.extend_from_slice(&jpeg[..2]);
    out.extend_from_slice(&segment);
    out.extend_from_slice(&jpeg[2..]);
    out
}
