use image::{DynamicImage, Rgba, RgbaImage};

const HOT: Rgba<u8> = Rgba([255, 0, 0, 255]);
const WARM: Rgba<u8> = Rgba([255, 255, 0, 255]);
/// Stable regions are drawn semi-transparent.
const COOL: Rgba<u8> = Rgba([0, 0, 255, 100]);

/// Recolours the input as a mock prediction-error map.
///
/// Very bright or very dark pixels (likely edges) are hot, bright-ish pixels
/// are warm, the rest cool. Purely cosmetic; no actual comparison against
/// the prediction happens here.
pub fn render_heatmap(input: &DynamicImage) -> RgbaImage {
    let mut out = input.to_rgba8();
    for pixel in out.pixels_mut() {
        let [r, g, b, a] = pixel.0;
        let brightness = (r as f32 + g as f32 + b as f32) / 3.0;
        *pixel = if brightness > 200.0 || brightness < 50.0 {
            Rgba([HOT[0], HOT[1], HOT[2], a])
        } else if brightness > 150.0 {
            Rgba([WARM[0], WARM[1], WARM[2], a])
        } else {
            COOL
        };
    }
    out
}
