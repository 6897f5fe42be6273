//! Fundraising QR code generation.
//!
//! QR codes encode a link to the fundraise landing page carrying the team
//! (and optionally player) identifier. The base URL always points at the
//! production site so printed flyers keep working no matter where the code
//! was generated.

use std::io::Cursor;

use image::{ImageFormat, Luma};
use qrcode::QrCode;
use thiserror::Error;
use url::Url;

/// Default rendered width/height in pixels.
pub const DEFAULT_WIDTH: u32 = 300;

const MIN_WIDTH: u32 = 64;
const MAX_WIDTH: u32 = 1024;

/// Errors from QR code generation.
#[derive(Debug, Error)]
pub enum QrError {
    #[error("invalid base URL: {0}")]
    BaseUrl(#[from] url::ParseError),
    #[error("QR encoding failed: {0}")]
    Encode(#[from] qrcode::types::QrError),
    #[error("PNG encoding failed: {0}")]
    Png(#[from] image::ImageError),
}

/// Build the fundraise landing URL a QR code points at.
///
/// # Errors
///
/// Returns an error when the configured base URL does not parse.
pub fn fundraise_url(base_url: &str, team: &str, player: Option<&str>) -> Result<String, QrError> {
    let mut url = Url::parse(base_url)?;
    url.set_path("/fundraise");
    {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("team", team);
        if let Some(player) = player {
            pairs.append_pair("player", player);
        }
    }
    Ok(url.into())
}

/// Clamp a requested width into the supported range, defaulting when absent.
#[must_use]
pub fn clamp_width(requested: Option<u32>) -> u32 {
    requested.unwrap_or(DEFAULT_WIDTH).clamp(MIN_WIDTH, MAX_WIDTH)
}

/// Render `url` as a PNG QR code at roughly `width` pixels square.
///
/// # Errors
///
/// Returns an error when the payload does not fit a QR code or PNG
/// encoding fails.
pub fn generate_png(url: &str, width: u32) -> Result<Vec<u8>, QrError> {
    let code = QrCode::new(url.as_bytes())?;
    let image = code
        .render::<Luma<u8>>()
        .min_dimensions(width, width)
        .build();

    let mut png = Vec::new();
    image.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
    Ok(png)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fundraise_url_with_team_only() {
        let url =
            fundraise_url("https://copperstatefoods.com", "alpha", None).expect("valid url");
        assert_eq!(url, "https://copperstatefoods.com/fundraise?team=alpha");
    }

    #[test]
    fn test_fundraise_url_with_player_and_encoding() {
        let url = fundraise_url("https://copperstatefoods.com", "west high", Some("7"))
            .expect("valid url");
        assert_eq!(
            url,
            "https://copperstatefoods.com/fundraise?team=west+high&player=7"
        );
    }

    #[test]
    fn test_fundraise_url_rejects_bad_base() {
        assert!(fundraise_url("not a url", "alpha", None).is_err());
    }

    #[test]
    fn test_clamp_width() {
        assert_eq!(clamp_width(None), DEFAULT_WIDTH);
        assert_eq!(clamp_width(Some(10)), MIN_WIDTH);
        assert_eq!(clamp_width(Some(5000)), MAX_WIDTH);
        assert_eq!(clamp_width(Some(512)), 512);
    }

    #[test]
    fn test_generate_png_magic_bytes() {
        let png = generate_png("https://copperstatefoods.com/fundraise?team=alpha", 128)
            .expect("render");
        assert_eq!(png.get(..4), Some(&b"\x89PNG"[..]));
    }
}
