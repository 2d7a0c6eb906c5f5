//! "Hello!" in random colors at random positions, in every rotation.

use anyhow::Result;
use rand::Rng;
use thmi_hw::BitmapFont;
use tracing::debug;

use super::{random_color, should_save};
use crate::session::Session;

const MESSAGE: &str = "Hello!";
const REPEATS: usize = 50;

pub async fn run(
    session: &mut Session,
    rng: &mut impl Rng,
    font: &BitmapFont<'_>,
    frames: usize,
    every: Option<usize>,
) -> Result<()> {
    'frames: for frame in 0..frames {
        for rotation in 0..4 {
            let display = &mut session.display;
            display.rotation(rotation)?;
            display.clear(rng.gen::<u8>())?;

            let col_max = display.width() as i32 - font.width() as i32 * MESSAGE.len() as i32;
            let row_max = display.height() as i32 - font.height() as i32;

            for _ in 0..REPEATS {
                let x = rng.gen_range(0..=col_max.max(0));
                let y = rng.gen_range(0..=row_max.max(0));
                display.text(font, MESSAGE, x, y, random_color(rng), random_color(rng))?;
            }
            debug!("hello: frame {} rotation {}", frame, rotation);

            if should_save(every, frame) {
                session.snapshot(&format!("hello-{frame:04}-{rotation}"))?;
            }
            if !session.pause().await {
                break 'frames;
            }
        }
    }

    session.snapshot("hello")?;
    Ok(())
}
