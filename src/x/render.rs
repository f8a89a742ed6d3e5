//! Drawing the status bars
//!
//! The window manager only issues a handful of draw commands: fill or outline
//! a rectangle, draw a line of text inside a box and copy the result to a bar
//! window. [`XRenderer`] does that with an X core font on an off-screen pixmap.

use crate::{config::Scheme, core::Window};
use anyhow::{Context, Result};
use std::sync::Arc;
use x11rb::{
    connection::Connection,
    protocol::xproto::{
        ChangeGCAux,
        ConnectionExt,
        CreateGCAux,
        Font,
        Gcontext,
        Pixmap,
        Rectangle as XRectangle,
    },
    rust_connection::RustConnection,
};

/// Consumer of the bar's draw commands
pub(crate) trait Renderer {
    /// Colors used by the following commands
    fn set_scheme(&mut self, scheme: &Scheme);

    /// Draw `text` in a `w`x`h` box, `pad` pixels from its left edge. The box
    /// is filled with the background color, or the foreground when
    /// `invert`ed. Returns the right edge of the box
    fn text(
        &mut self,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        pad: i32,
        text: &str,
        invert: bool,
    ) -> Result<i32>;

    /// Draw a filled or outlined rectangle
    fn rect(&mut self, x: i32, y: i32, w: i32, h: i32, filled: bool, invert: bool) -> Result<()>;

    /// Copy a region of the drawing onto a window
    fn map(&mut self, window: Window, x: i32, y: i32, w: i32, h: i32) -> Result<()>;

    /// Width in pixels of `text` in the active font
    fn text_width(&self, text: &str) -> i32;

    /// Height of a line of text
    fn line_height(&self) -> i32;

    /// Resize the drawing surface
    fn resize(&mut self, w: i32, h: i32) -> Result<()>;
}

/// Glyph metrics of a core font
#[derive(Debug, Clone)]
struct Metrics {
    /// First character covered by `widths`
    first:   u16,
    /// Advance of every character from `first` on
    widths:  Vec<i32>,
    /// Advance of characters outside of `widths`
    default: i32,
    /// Pixels above the baseline
    ascent:  i32,
    /// Pixels below the baseline
    descent: i32,
}

impl Metrics {
    /// Advance of a single Latin-1 byte
    fn advance(&self, byte: u8) -> i32 {
        u16::from(byte)
            .checked_sub(self.first)
            .and_then(|idx| self.widths.get(usize::from(idx)))
            .copied()
            .filter(|&w| w > 0)
            .unwrap_or(self.default)
    }

    /// Advance of a run of Latin-1 bytes
    fn width(&self, bytes: &[u8]) -> i32 {
        bytes.iter().map(|&b| self.advance(b)).sum()
    }

    /// Longest prefix of `bytes` fitting in `w` pixels, with an ellipsis when
    /// something was cut off
    fn fit(&self, bytes: &[u8], w: i32) -> Vec<u8> {
        if self.width(bytes) <= w {
            return bytes.to_vec();
        }
        let dots = self.width(b"...");
        let mut used = 0;
        let mut out = Vec::new();
        for &b in bytes {
            let adv = self.advance(b);
            if used + adv + dots > w {
                break;
            }
            used += adv;
            out.push(b);
        }
        if used + dots <= w {
            out.extend_from_slice(b"...");
        }
        out
    }
}

/// Encode text for core font requests. Characters outside of Latin-1 become
/// `?`
fn latin1(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

// ============================ XRenderer ============================= [[[

/// Draws with a core font onto a pixmap
pub(crate) struct XRenderer {
    /// Connection to the X-Server
    conn:    Arc<RustConnection>,
    /// Window the pixmap is created for
    root:    Window,
    /// Depth of the root window
    depth:   u8,
    /// Off-screen drawing surface
    pixmap:  Pixmap,
    /// Graphics context carrying colors and the font
    gc:      Gcontext,
    /// The opened font
    font:    Font,
    /// Metrics of `font`
    metrics: Metrics,
    /// Colors of the following commands
    scheme:  Scheme,
    /// Size of `pixmap`
    size:    (i32, i32),
}

impl XRenderer {
    /// Open `font` and create a drawing surface of the given size
    pub(crate) fn new(
        conn: Arc<RustConnection>,
        screen: usize,
        font_name: &str,
        w: i32,
        h: i32,
    ) -> Result<Self> {
        let (root, depth) = {
            let screen = &conn.setup().roots[screen];
            (screen.root, screen.root_depth)
        };

        let font = conn.generate_id().context("failed to generate an ID")?;
        conn.open_font(font, font_name.as_bytes())
            .context(format!("failed to open font {}", font_name))?
            .check()
            .context(format!("failed to load font {}", font_name))?;

        let reply = conn
            .query_font(font)
            .context("failed to query font")?
            .reply()
            .context("failed to get query font reply")?;
        let metrics = Metrics {
            first:   reply.min_char_or_byte2,
            widths:  reply
                .char_infos
                .iter()
                .map(|info| i32::from(info.character_width))
                .collect(),
            default: i32::from(reply.max_bounds.character_width),
            ascent:  i32::from(reply.font_ascent),
            descent: i32::from(reply.font_descent),
        };

        let gc = conn.generate_id().context("failed to generate an ID")?;
        conn.create_gc(gc, root, &CreateGCAux::new().font(font).graphics_exposures(0))
            .context("failed to create graphics context")?
            .check()
            .context("failed to check creating graphics context")?;

        let pixmap = conn.generate_id().context("failed to generate an ID")?;
        let mut renderer = Self {
            conn,
            root,
            depth,
            pixmap,
            gc,
            font,
            metrics,
            scheme: Scheme::NORMAL,
            size: (0, 0),
        };
        renderer.create_pixmap(w, h)?;

        Ok(renderer)
    }

    /// Allocate the pixmap
    fn create_pixmap(&mut self, w: i32, h: i32) -> Result<()> {
        log::debug!("creating a {}x{} bar pixmap", w, h);
        self.conn
            .create_pixmap(
                self.depth,
                self.pixmap,
                self.root,
                w.max(1) as u16,
                h.max(1) as u16,
            )
            .context("failed to create pixmap")?
            .check()
            .context("failed to check creating pixmap")?;
        self.size = (w, h);

        Ok(())
    }

    /// Set the foreground and background of the graphics context
    fn set_colors(&self, fg: u32, bg: u32) -> Result<()> {
        self.conn
            .change_gc(self.gc, &ChangeGCAux::new().foreground(fg).background(bg))
            .context("failed to change graphics context")?;
        Ok(())
    }
}

impl Renderer for XRenderer {
    fn set_scheme(&mut self, scheme: &Scheme) {
        self.scheme = *scheme;
    }

    fn text(
        &mut self,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        pad: i32,
        text: &str,
        invert: bool,
    ) -> Result<i32> {
        let (fg, bg) = if invert {
            (self.scheme.bg, self.scheme.fg)
        } else {
            (self.scheme.fg, self.scheme.bg)
        };

        self.set_colors(bg, fg)?;
        self.conn
            .poly_fill_rectangle(self.pixmap, self.gc, &[XRectangle {
                x:      x as i16,
                y:      y as i16,
                width:  w.max(0) as u16,
                height: h.max(0) as u16,
            }])
            .context("failed to fill text background")?;

        let bytes = self.metrics.fit(&latin1(text), w - pad);
        if !bytes.is_empty() {
            let baseline = y + (h - self.line_height()) / 2 + self.metrics.ascent;
            self.set_colors(fg, bg)?;
            self.conn
                .image_text8(
                    self.pixmap,
                    self.gc,
                    (x + pad) as i16,
                    baseline as i16,
                    &bytes,
                )
                .context("failed to draw text")?;
        }

        Ok(x + w)
    }

    fn rect(&mut self, x: i32, y: i32, w: i32, h: i32, filled: bool, invert: bool) -> Result<()> {
        let color = if invert { self.scheme.bg } else { self.scheme.fg };
        self.set_colors(color, color)?;

        if filled {
            self.conn
                .poly_fill_rectangle(self.pixmap, self.gc, &[XRectangle {
                    x:      x as i16,
                    y:      y as i16,
                    width:  w.max(0) as u16,
                    height: h.max(0) as u16,
                }])
                .context("failed to fill rectangle")?;
        } else {
            self.conn
                .poly_rectangle(self.pixmap, self.gc, &[XRectangle {
                    x:      x as i16,
                    y:      y as i16,
                    width:  (w - 1).max(0) as u16,
                    height: (h - 1).max(0) as u16,
                }])
                .context("failed to draw rectangle")?;
        }

        Ok(())
    }

    fn map(&mut self, window: Window, x: i32, y: i32, w: i32, h: i32) -> Result<()> {
        log::trace!("copying bar to Window({:#0x})", window);
        self.conn
            .copy_area(
                self.pixmap,
                window,
                self.gc,
                x as i16,
                y as i16,
                x as i16,
                y as i16,
                w.max(0) as u16,
                h.max(0) as u16,
            )
            .context(format!("failed to copy bar to Window({:#0x})", window))?;
        self.conn.flush().context("failed to flush")?;

        Ok(())
    }

    fn text_width(&self, text: &str) -> i32 {
        self.metrics.width(&latin1(text))
    }

    fn line_height(&self) -> i32 {
        self.metrics.ascent + self.metrics.descent
    }

    fn resize(&mut self, w: i32, h: i32) -> Result<()> {
        if self.size == (w, h) {
            return Ok(());
        }
        self.conn
            .free_pixmap(self.pixmap)
            .context("failed to free pixmap")?;
        self.create_pixmap(w, h)
    }
}

impl Drop for XRenderer {
    fn drop(&mut self) {
        drop(self.conn.free_pixmap(self.pixmap));
        drop(self.conn.free_gc(self.gc));
        drop(self.conn.close_font(self.font));
        drop(self.conn.flush());
    }
}

// ]]] === XRenderer ===
