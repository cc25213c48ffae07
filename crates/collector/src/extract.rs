use anyhow::{Context, Result};
use regex::Regex;

/// Occupancy signal extracted from one lot status page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LotStatus {
    pub lot_name: String,
    pub image_src: String,
    pub is_full: bool,
}

/// Pulls the occupancy signal out of a lot's status page.
///
/// The page encodes occupancy as an image inside the details table: a
/// `male.png` source means the lot is full. The lot's display name sits
/// in the table header cell.
///
/// # Errors
/// Returns an error if the status image or the header cell is missing.
pub fn extract_status(html: &str) -> Result<LotStatus> {
    let image_re = Regex::new(r#"(?s)ParkingDetailsTable.*?<img[^>]*\bsrc\s*=\s*"([^"]+)""#)?;
    let name_re = Regex::new(r#"(?s)class="ParkingTableHeader"[^>]*>\s*([^<]*?)\s*<"#)?;

    let image_src = image_re
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .context("status image not found in page")?;

    let lot_name = name_re
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .context("lot name header not found in page")?;

    let is_full = image_src.contains("male.png");

    Ok(LotStatus {
        lot_name,
        image_src,
        is_full,
    })
}
