//! Hardware vertical scrolling over labelled color bands.

use anyhow::Result;
use thmi_hw::color::{BLACK, BLUE, CYAN, GREEN, MAGENTA, RED, WHITE, YELLOW};
use thmi_hw::font::bundled::BASIC_8X16;
use thmi_hw::{PANEL_HEIGHT, PANEL_WIDTH};
use tracing::debug;

use super::should_save;
use crate::session::Session;

const BAND: u16 = 20;
const BANDS: [u16; 6] = [RED, GREEN, BLUE, CYAN, MAGENTA, YELLOW];

/// Fills frame memory with bands, then scrolls `step` lines per frame.
///
/// Scrolling works on physical rows, so the demo runs in portrait.
pub async fn run(
    session: &mut Session,
    frames: usize,
    step: u16,
    every: Option<usize>,
) -> Result<()> {
    let display = &mut session.display;
    display.rotation(0)?;

    for (i, top) in (0..PANEL_HEIGHT).step_by(BAND as usize).enumerate() {
        let color = BANDS[i % BANDS.len()];
        display.fill_rect(0, top as i32, PANEL_WIDTH, BAND, color)?;
        let label = format!("Line {top:03}");
        display.text(&BASIC_8X16, &label, 4, top as i32 + 2, BLACK, color)?;
    }
    display.hline(0, 0, PANEL_WIDTH, WHITE)?;

    display.vscrdef(0, PANEL_HEIGHT, 0)?;

    for frame in 0..frames {
        let vssa = (frame as u32 * step as u32 % PANEL_HEIGHT as u32) as u16;
        session.display.vscsad(vssa)?;
        debug!("scroll: frame {} start {}", frame, vssa);

        if should_save(every, frame) {
            session.snapshot(&format!("scroll-{frame:04}"))?;
        }
        if !session.pause().await {
            break;
        }
    }

    session.snapshot("scroll")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use thmi_hw::DisplayConfig;

    #[tokio::test]
    async fn test_scrolls_frame_memory() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::new(&DisplayConfig::default(), dir.path(), 1, 0).unwrap();
        run(&mut session, 3, 25, None).await.unwrap();

        let sim = session.display.bus();
        assert_eq!(sim.scroll().vssa, 50);
        assert_eq!(sim.scroll().vsa, 320);
        // Row 50 of memory sits in the third band and now shows first
        let view = sim.logical_view();
        assert_eq!(view.get_pixel(239, 0), Some(BLUE));
        assert_eq!(view.get_pixel(239, 270), Some(WHITE));
        assert_eq!(session.saved().len(), 1);
    }
}
