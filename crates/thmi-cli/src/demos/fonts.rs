//! Proportional font showcase: each font's sample line, centred and stacked.

use anyhow::{Context, Result};
use std::path::PathBuf;
use thmi_hw::color::{BLACK, BLUE, GREEN, RED};
use thmi_hw::ProportionalFont;
use tracing::debug;

use crate::session::Session;

const COLORS: [u16; 3] = [RED, GREEN, BLUE];
const TOP: i32 = 16;

/// Column that centres a line `text_width` pixels wide, or 0 if it does not
/// fit.
pub fn centre(screen_width: u16, text_width: u32) -> i32 {
    if text_width > 0 && text_width < screen_width as u32 {
        (screen_width / 2) as i32 - (text_width / 2) as i32
    } else {
        0
    }
}

/// Draws one line per font. Without `sample`, each font writes its own file
/// name.
pub fn run(session: &mut Session, fonts: &[PathBuf], sample: Option<&str>) -> Result<()> {
    let display = &mut session.display;
    display.clear(false)?;

    let mut row = TOP;
    for (index, path) in fonts.iter().enumerate() {
        let font = ProportionalFont::load(path)
            .with_context(|| format!("Failed to load font {}", path.display()))?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let text = sample.unwrap_or(&name);

        let col = centre(display.width(), display.write_width(&font, text));
        let color = COLORS[index % COLORS.len()];
        display.write(&font, text, col, row, color, BLACK)?;
        debug!("fonts: {} at ({}, {})", text, col, row);
        row += font.height as i32;
    }

    session.snapshot("fonts")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use thmi_hw::DisplayConfig;

    fn block_font() -> ProportionalFont {
        // 'x' is a solid 4x4 block
        ProportionalFont {
            height: 4,
            max_width: 4,
            map: "x".to_string(),
            offset_width: 1,
            offsets: vec![0],
            widths: vec![4],
            bitmaps: vec![0xFF, 0xFF],
        }
    }

    #[test]
    fn test_centre() {
        assert_eq!(centre(240, 40), 100);
        assert_eq!(centre(240, 0), 0);
        assert_eq!(centre(240, 300), 0);
    }

    #[test]
    fn test_stacks_centred_lines() {
        let dir = tempfile::tempdir().unwrap();
        let font_path = dir.path().join("block.json");
        block_font().save(&font_path).unwrap();

        let mut session = Session::new(&DisplayConfig::default(), dir.path(), 1, 0).unwrap();
        let fonts = vec![font_path.clone(), font_path];
        run(&mut session, &fonts, Some("xx")).unwrap();

        let view = session.display.bus().logical_view();
        // 8 wide line centred on 240: columns 116..124
        assert_eq!(view.get_pixel(116, 16), Some(RED));
        assert_eq!(view.get_pixel(123, 19), Some(RED));
        assert_eq!(view.get_pixel(116, 20), Some(GREEN));
        assert_eq!(view.count(RED), 32);
        assert_eq!(view.count(GREEN), 32);
    }
}
