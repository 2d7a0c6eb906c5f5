//! Random lines and filled rectangles.

use anyhow::Result;
use rand::Rng;
use tracing::debug;

use super::{random_color, should_save};
use crate::session::Session;

pub async fn run(
    session: &mut Session,
    rng: &mut impl Rng,
    frames: usize,
    every: Option<usize>,
) -> Result<()> {
    session.display.clear(false)?;

    for frame in 0..frames {
        let (width, height) = (
            session.display.width() as i32,
            session.display.height() as i32,
        );

        session.display.line(
            rng.gen_range(0..=width),
            rng.gen_range(0..=height),
            rng.gen_range(0..=width),
            rng.gen_range(0..=height),
            random_color(rng),
        )?;

        let w = rng.gen_range(0..=width / 2);
        let h = rng.gen_range(0..=height / 2);
        let x = rng.gen_range(0..=width - w);
        let y = rng.gen_range(0..=height - h);
        session
            .display
            .fill_rect(x, y, w as u16, h as u16, random_color(rng))?;
        debug!("lines: frame {}", frame);

        if should_save(every, frame) {
            session.snapshot(&format!("lines-{frame:04}"))?;
        }
        if !session.pause().await {
            break;
        }
    }

    session.snapshot("lines")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use thmi_hw::DisplayConfig;

    #[tokio::test]
    async fn test_draws_and_saves() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::new(&DisplayConfig::default(), dir.path(), 1, 0).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        run(&mut session, &mut rng, 20, Some(10)).await.unwrap();

        let names: Vec<_> = session
            .saved()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["lines-0009.png", "lines-0019.png", "lines.png"]);

        let black = session.display.bus().memory().count(0);
        assert!(black < 240 * 320, "something was drawn");
    }
}
