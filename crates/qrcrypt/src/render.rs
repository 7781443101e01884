//! [`QrRenderer`] that writes payload strings as text lines.
//!
//! Bitmap rendering is left to an external encoder, e.g.
//! `qrcrypt secret | qrencode -t ansiutf8`.

use std::io::Write;

use common::{QrError, QrPayload, QrRenderer};
use tracing::debug;

/// Writes each payload string followed by a newline to `W`.
#[derive(Debug)]
pub struct TextRenderer<W> {
    out: W,
}

impl<W: Write> TextRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl TextRenderer<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> QrRenderer for TextRenderer<W> {
    fn render(&mut self, payload: &QrPayload) -> Result<(), QrError> {
        writeln!(self.out, "{payload}")?;
        self.out.flush()?;
        debug!(kind = payload.kind(), "payload rendered");
        Ok(())
    }
}
