use cortex::error::ImageError;
use cortex::vision::heatmap::render_heatmap;
use cortex::vision::input::{sniff_mime, ImageInput, DEFAULT_MIME};
use image::{DynamicImage, Rgba, RgbaImage};

const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

#[test]
fn test_data_uri_prefix_is_stripped() {
    let input = ImageInput::from_data_uri_or_base64("data:image/png;base64,QUJDRA==").unwrap();
    assert_eq!(input.mime_type, "image/png");
    assert_eq!(input.data_base64, "QUJDRA==");
    assert_eq!(input.decode_bytes().unwrap(), b"ABCD");
}

#[test]
fn test_bare_base64_defaults_to_jpeg() {
    let input = ImageInput::from_data_uri_or_base64("QUJDRA==").unwrap();
    assert_eq!(input.mime_type, DEFAULT_MIME);
    assert_eq!(input.data_base64, "QUJDRA==");
}

#[test]
fn test_empty_payload_rejected() {
    assert!(matches!(
        ImageInput::from_data_uri_or_base64("data:image/png;base64,"),
        Err(ImageError::Empty)
    ));
    assert!(matches!(ImageInput::from_bytes(&[]), Err(ImageError::Empty)));
}

#[test]
fn test_invalid_base64_reported_on_decode() {
    let input = ImageInput::from_data_uri_or_base64("data:image/png;base64,@@@").unwrap();
    assert!(matches!(input.decode_bytes(), Err(ImageError::Decode(_))));
}

#[test]
fn test_mime_sniffing() {
    assert_eq!(sniff_mime(PNG_MAGIC), "image/png");
    assert_eq!(sniff_mime(b"GIF89a......"), "image/gif");
    assert_eq!(sniff_mime(b"plain text"), DEFAULT_MIME);

    let input = ImageInput::from_bytes(PNG_MAGIC).unwrap();
    assert_eq!(input.mime_type, "image/png");
    assert_eq!(input.decode_bytes().unwrap(), PNG_MAGIC);
}

#[test]
fn test_from_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("input.png");
    std::fs::write(&path, PNG_MAGIC).unwrap();
    assert_eq!(ImageInput::from_path(&path).unwrap().mime_type, "image/png");

    assert!(matches!(
        ImageInput::from_path(dir.path().join("missing.png")),
        Err(ImageError::Io(_))
    ));
}

#[test]
fn test_heatmap_palette() {
    let mut img = RgbaImage::new(4, 1);
    img.put_pixel(0, 0, Rgba([250, 250, 250, 255])); // bright -> hot
    img.put_pixel(1, 0, Rgba([10, 10, 10, 200])); // dark -> hot, alpha kept
    img.put_pixel(2, 0, Rgba([180, 170, 160, 255])); // warm
    img.put_pixel(3, 0, Rgba([100, 100, 100, 255])); // cool

    let out = render_heatmap(&DynamicImage::ImageRgba8(img));
    assert_eq!(out.get_pixel(0, 0), &Rgba([255, 0, 0, 255]));
    assert_eq!(out.get_pixel(1, 0), &Rgba([255, 0, 0, 200]));
    assert_eq!(out.get_pixel(2, 0), &Rgba([255, 255, 0, 255]));
    assert_eq!(out.get_pixel(3, 0), &Rgba([0, 0, 255, 100]));
}

#[test]
fn test_heatmap_fractional_brightness() {
    let mut img = RgbaImage::new(4, 1);
    img.put_pixel(0, 0, Rgba([201, 200, 200, 255])); // 200.33 -> hot
    img.put_pixel(1, 0, Rgba([151, 150, 150, 255])); // 150.33 -> warm
    img.put_pixel(2, 0, Rgba([200, 200, 200, 255])); // exactly 200 -> warm
    img.put_pixel(3, 0, Rgba([50, 49, 49, 255])); // 49.33 -> hot

    let out = render_heatmap(&DynamicImage::ImageRgba8(img));
    assert_eq!(out.get_pixel(0, 0), &Rgba([255, 0, 0, 255]));
    assert_eq!(out.get_pixel(1, 0), &Rgba([255, 255, 0, 255]));
    assert_eq!(out.get_pixel(2, 0), &Rgba([255, 255, 0, 255]));
    assert_eq!(out.get_pixel(3, 0), &Rgba([255, 0, 0, 255]));
}
