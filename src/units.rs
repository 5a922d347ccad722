//! Length and angle conversions between WordprocessingML/DrawingML units and
//! CSS pixels (96 per inch).

pub const PX_PER_INCH: f32 = 96.0;
pub const PT_PER_INCH: f32 = 72.0;
pub const TWIPS_PER_INCH: f32 = 1440.0;
pub const EMU_PER_INCH: f32 = 914_400.0;
/// 12700 EMU per point, 9525 per pixel.
pub const EMU_PER_PX: f32 = EMU_PER_INCH / PX_PER_INCH;
/// DrawingML angles are stored in 60000ths of a degree.
pub const ANGLE_UNITS_PER_DEGREE: f32 = 60_000.0;
/// Auto line spacing is expressed in 240ths of a line.
pub const LINE_UNITS: f32 = 240.0;

pub fn twips_to_px(twips: f32) -> f32 {
    twips * PX_PER_INCH / TWIPS_PER_INCH
}

pub fn px_to_twips(px: f32) -> f32 {
    px * TWIPS_PER_INCH / PX_PER_INCH
}

pub fn emu_to_px(emu: f32) -> f32 {
    emu / EMU_PER_PX
}

pub fn px_to_emu(px: f32) -> f32 {
    px * EMU_PER_PX
}

pub fn pt_to_px(pt: f32) -> f32 {
    pt * PX_PER_INCH / PT_PER_INCH
}

/// Font sizes (`w:sz`) are in half-points.
pub fn half_points_to_px(half_points: f32) -> f32 {
    pt_to_px(half_points / 2.0)
}

/// Border widths (`w:sz` on borders) are in eighths of a point.
pub fn eighth_points_to_px(eighths: f32) -> f32 {
    pt_to_px(eighths / 8.0)
}

pub fn angle_to_degrees(angle: f32) -> f32 {
    angle / ANGLE_UNITS_PER_DEGREE
}

/// Parse a numeric attribute value, rejecting NaN and infinities.
pub fn parse_number(val: &str) -> Option<f32> {
    val.trim().parse::<f32>().ok().filter(|v| v.is_finite())
}

/// Keep a length only if it is a finite, strictly positive number.
pub fn positive(val: Option<f32>) -> Option<f32> {
    val.filter(|v| v.is_finite() && *v > 0.0)
}
