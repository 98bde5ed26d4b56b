use qrcode::QrCode;
use qrcode::render::unicode;
use qrcode::types::QrError;

/// Renders a pairing payload as a compact QR code for a dark terminal.
pub fn render_pairing_code(payload: &str) -> Result<String, QrError> {
    let code = QrCode::new(payload.as_bytes())?;
    Ok(code
        .render::<unicode::Dense1x2>()
        .dark_color(unicode::Dense1x2::Light)
        .light_color(unicode::Dense1x2::Dark)
        .quiet_zone(true)
        .build())
}
