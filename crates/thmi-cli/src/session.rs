//! Simulated panel session: display, screenshots and frame pacing.

use anyhow::{Context, Result};
use image::imageops::FilterType;
use image::RgbaImage;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thmi_hw::{Display, DisplayConfig, SimPanel};
use tokio::sync::watch;
use tracing::{debug, info};

/// A display driving the simulated panel, plus where its screenshots go.
pub struct Session {
    pub display: Display<SimPanel>,
    output: PathBuf,
    scale: u32,
    delay: Duration,
    saved: Vec<PathBuf>,
    interrupt_tx: Arc<watch::Sender<bool>>,
    interrupt_rx: watch::Receiver<bool>,
}

impl Session {
    /// Initialises a display on a fresh simulated panel.
    pub fn new(config: &DisplayConfig, output: &Path, scale: u32, delay_ms: u64) -> Result<Self> {
        let display =
            Display::new(SimPanel::new(), config).context("Failed to initialise display")?;
        let (interrupt_tx, interrupt_rx) = watch::channel(false);
        Ok(Self {
            display,
            output: output.to_path_buf(),
            scale: scale.max(1),
            delay: Duration::from_millis(delay_ms),
            saved: Vec::new(),
            interrupt_tx: Arc::new(interrupt_tx),
            interrupt_rx,
        })
    }

    /// Screenshots written so far.
    pub fn saved(&self) -> &[PathBuf] {
        &self.saved
    }

    /// Saves what the panel currently shows as `<name>.png`.
    pub fn snapshot(&mut self, name: &str) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.output).with_context(|| {
            format!("Failed to create output directory {}", self.output.display())
        })?;
        let path = self.output.join(format!("{name}.png"));
        let view = self.display.bus().logical_view();

        if self.scale == 1 {
            let png = view.to_png().context("Failed to encode screenshot")?;
            std::fs::write(&path, png).context("Failed to write screenshot")?;
        } else {
            let (width, height) = (view.width() as u32, view.height() as u32);
            let image = RgbaImage::from_raw(width, height, view.to_rgba8())
                .context("Screenshot buffer has the wrong size")?;
            let scaled = image::imageops::resize(
                &image,
                width * self.scale,
                height * self.scale,
                FilterType::Nearest,
            );
            scaled.save(&path).context("Failed to write screenshot")?;
        }

        debug!("Saved {}", path.display());
        self.saved.push(path.clone());
        Ok(path)
    }

    /// Stops the running demo at its next pause.
    pub fn interrupt(&self) {
        self.interrupt_tx.send_replace(true);
    }

    /// Routes Ctrl-C to [`Session::interrupt`] for the rest of the process.
    ///
    /// Must be called from within the tokio runtime.
    pub fn listen_for_ctrl_c(&self) {
        let tx = Arc::clone(&self.interrupt_tx);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Interrupted, stopping");
                tx.send_replace(true);
            }
        });
    }

    /// Waits one frame. Returns `false` once the session was interrupted.
    pub async fn pause(&self) -> bool {
        let mut interrupted = self.interrupt_rx.clone();
        tokio::select! {
            _ = tokio::time::sleep(self.delay) => {}
            _ = interrupted.wait_for(|&stop| stop) => {}
        }
        !*self.interrupt_rx.borrow()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use thmi_hw::color::RED;

    #[test]
    fn test_snapshot_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::new(&DisplayConfig::default(), dir.path(), 1, 0).unwrap();
        session.display.fill(RED).unwrap();
        let path = session.snapshot("red").unwrap();

        let image = image::open(&path).unwrap().to_rgba8();
        assert_eq!(image.dimensions(), (240, 320));
        assert_eq!(image.get_pixel(10, 10).0, [255, 0, 0, 255]);
        assert_eq!(session.saved(), &[path]);
    }

    #[tokio::test]
    async fn test_pause_stops_after_interrupt() {
        let dir = tempfile::tempdir().unwrap();
        let session = Session::new(&DisplayConfig::default(), dir.path(), 1, 0).unwrap();
        assert!(session.pause().await);
        session.interrupt();
        assert!(!session.pause().await);
    }

    #[tokio::test]
    async fn test_interrupt_cuts_a_long_pause() {
        let dir = tempfile::tempdir().unwrap();
        let session = Session::new(&DisplayConfig::default(), dir.path(), 1, 60_000).unwrap();
        let (stopped, ()) = tokio::join!(session.pause(), async { session.interrupt() });
        assert!(!stopped);
    }

    #[test]
    fn test_snapshot_scales_landscape() {
        let dir = tempfile::tempdir().unwrap();
        let config = DisplayConfig {
            rotation: thmi_hw::Rotation::Landscape,
            ..Default::default()
        };
        let mut session = Session::new(&config, &dir.path().join("nested"), 2, 0).unwrap();
        let path = session.snapshot("frame").unwrap();
        let image = image::open(&path).unwrap();
        assert_eq!((image.width(), image.height()), (640, 480));
    }
}
