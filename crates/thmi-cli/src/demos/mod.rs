//! Demo programs drawn on the simulated panel.

pub mod fonts;
pub mod hello;
pub mod lines;
pub mod scroll;

use rand::Rng;
use thmi_hw::color::color565;

/// A random RGB565 color.
pub fn random_color(rng: &mut impl Rng) -> u16 {
    color565(rng.gen(), rng.gen(), rng.gen())
}

/// Whether frame `frame` should be saved with `--every`.
pub fn should_save(every: Option<usize>, frame: usize) -> bool {
    matches!(every, Some(n) if n > 0 && (frame + 1) % n == 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_save() {
        assert!(!should_save(None, 0));
        assert!(!should_save(Some(0), 0));
        assert!(should_save(Some(1), 0));
        assert!(!should_save(Some(3), 1));
        assert!(should_save(Some(3), 2));
    }
}
