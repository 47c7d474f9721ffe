//! Terminal rendering
//!
//! Each reel is drawn as its visible window (centre row in brackets) on one
//! status line that is rewritten in place every frame.

use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;

use rp_game::{DeviceResult, Frame, Renderer};
use rp_reel::SymbolRing;

/// Shown for symbols missing from the atlas
const UNKNOWN_GLYPH: &str = "?";

/// Glyph for every ring symbol, built once at start-up and never mutated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolAtlas {
    glyphs: HashMap<char, String>,
}

impl SymbolAtlas {
    pub fn for_rings(rings: &[Arc<SymbolRing>]) -> Self {
        let glyphs = rings
            .iter()
            .flat_map(|ring| ring.symbols().iter().copied())
            .map(|symbol| (symbol, symbol.to_string()))
            .collect();
        Self { glyphs }
    }

    pub fn glyph(&self, symbol: char) -> &str {
        self.glyphs.get(&symbol).map_or(UNKNOWN_GLYPH, String::as_str)
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }
}

/// Text of one frame
pub fn compose_line(atlas: &SymbolAtlas, frame: &Frame<'_>) -> String {
    let reels: Vec<String> = frame
        .reels
        .iter()
        .map(|reel| {
            reel.window
                .iter()
                .map(|cell| {
                    let glyph = atlas.glyph(cell.symbol);
                    if cell.shift == 0 {
                        format!("[{glyph}]")
                    } else {
                        glyph.to_string()
                    }
                })
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect();

    let mut line = reels.join("  |  ");
    if let Some(prompt) = frame.prompt {
        line.push_str("   ");
        line.push_str(prompt);
    }
    if let Some(fps) = frame.fps {
        line.push_str(&format!("   FPS: {fps:.0}"));
    }
    line
}

/// Redraws a single terminal line in place
pub struct TerminalRenderer<W: Write> {
    out: W,
    atlas: SymbolAtlas,
    last_line: String,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W, atlas: SymbolAtlas) -> Self {
        Self {
            out,
            atlas,
            last_line: String::new(),
        }
    }

    /// Clear the screen before the first frame
    pub fn take_over_screen(&mut self) -> DeviceResult<()> {
        self.out.write_all(b"\x1b[2J\x1b[H")?;
        self.out.flush()?;
        Ok(())
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Renderer for TerminalRenderer<W> {
    fn render(&mut self, frame: &Frame<'_>) -> DeviceResult<()> {
        let line = compose_line(&self.atlas, frame);
        if line == self.last_line {
            return Ok(());
        }
        // Pad so a shorter line fully covers the previous one
        let width = self.last_line.chars().count().max(line.chars().count());
        write!(self.out, "\r{line:<width$}")?;
        self.out.flush()?;
        self.last_line = line;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rp_game::{Collaborators, GamePhase, InstallationConfig, InstallationSession};

    fn atlas() -> SymbolAtlas {
        let rings = InstallationConfig::default().machine.build_rings().unwrap();
        SymbolAtlas::for_rings(&rings)
    }

    #[test]
    fn test_atlas_covers_rings() {
        let atlas = atlas();
        assert_eq!(atlas.len(), 27);
        assert_eq!(atlas.glyph('#'), "#");
        assert_eq!(atlas.glyph('!'), UNKNOWN_GLYPH);
    }

    #[test]
    fn test_resting_frame() {
        let session =
            InstallationSession::new(&InstallationConfig::default(), Collaborators::absent()).unwrap();
        let line = compose_line(&atlas(), &session.frame(None));
        assert_eq!(line, "Z [#] A  |  L [M] N  |  Z [A] B  |  F [G] H  |  Z [A] B");
    }

    #[test]
    fn test_prompt_and_fps_overlay() {
        let session =
            InstallationSession::new(&InstallationConfig::default(), Collaborators::absent()).unwrap();
        let mut frame = session.frame(Some(119.6));
        frame.phase = GamePhase::Presenting { prompt_visible: true };
        frame.prompt = Some("Take your print");
        let line = compose_line(&atlas(), &frame);
        assert!(line.ends_with("   Take your print   FPS: 120"));
    }

    #[test]
    fn test_renderer_skips_unchanged_frames() {
        let session =
            InstallationSession::new(&InstallationConfig::default(), Collaborators::absent()).unwrap();
        let mut renderer = TerminalRenderer::new(Vec::new(), atlas());
        renderer.render(&session.frame(None)).unwrap();
        renderer.render(&session.frame(None)).unwrap();

        let written = String::from_utf8(renderer.into_inner()).unwrap();
        assert_eq!(written.matches('\r').count(), 1);
        assert!(written.contains("[M]"));
    }
}
