//! Metadata about a managed X-window

use crate::{
    core::{MonitorId, TagMask, Window, NAME_LIMIT, PADDING},
    geometry::Rectangle,
    x::property::SizeHints,
};

// ============================== Client ==============================

/// A top-level window under management
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Client {
    /// The client's window
    pub(crate) window:        Window,
    /// Title, bounded in length
    pub(crate) name:          String,
    /// Tags the client is on. Never zero once managed
    pub(crate) tags:          TagMask,
    /// Monitor the client belongs to
    pub(crate) monitor:       MonitorId,
    /// Current geometry, without the border
    pub(crate) geom:          Rectangle,
    /// Geometry before becoming fullscreen
    pub(crate) old_geom:      Rectangle,
    /// Border width the client is drawn with
    pub(crate) border_width:  u32,
    /// Border width the window had before it was managed
    pub(crate) old_border:    u32,
    /// Cached `WM_NORMAL_HINTS`
    pub(crate) hints:         SizeHints,
    /// Minimum and maximum size are the same
    pub(crate) is_fixed:      bool,
    /// Excluded from tiling
    pub(crate) is_floating:   bool,
    /// Wants attention
    pub(crate) is_urgent:     bool,
    /// Declines the input focus through the input hint
    pub(crate) never_focus:   bool,
    /// Covers the whole monitor
    pub(crate) is_fullscreen: bool,
    /// Floating state before becoming fullscreen
    pub(crate) old_floating:  bool,
}

impl Client {
    /// Create a new [`Client`]
    pub(crate) fn new(
        window: Window,
        monitor: MonitorId,
        tags: TagMask,
        geom: Rectangle,
        border_width: u32,
    ) -> Self {
        Self {
            window,
            name: String::new(),
            tags,
            monitor,
            geom,
            old_geom: geom,
            border_width,
            old_border: border_width,
            hints: SizeHints::default(),
            is_fixed: false,
            is_floating: false,
            is_urgent: false,
            never_focus: false,
            is_fullscreen: false,
            old_floating: false,
        }
    }

    /// Width including the border
    pub(crate) const fn outer_width(&self) -> i32 {
        self.geom.w + 2 * self.border_width as i32
    }

    /// Height including the border
    pub(crate) const fn outer_height(&self) -> i32 {
        self.geom.h + 2 * self.border_width as i32
    }

    /// Set the title, cut to fit [`NAME_LIMIT`] on a character boundary
    pub(crate) fn set_name(&mut self, name: &str) {
        let mut end = name.len().min(NAME_LIMIT - 1);
        while !name.is_char_boundary(end) {
            end -= 1;
        }
        self.name = name[..end].to_owned();
    }

    /// Cache new size hints
    pub(crate) fn set_hints(&mut self, hints: SizeHints) {
        self.is_fixed = hints.is_fixed();
        self.hints = hints;
    }

    /// Adjust a requested geometry to the client's size hints (ICCCM 4.1.2.3)
    /// and keep it reachable.
    ///
    /// `area` is the window area of the client's monitor, `screen` the whole
    /// screen, which is used instead for `interact`ive changes. Size hints are
    /// honored when `resize_hints` is set or the client floats.
    ///
    /// Returns the geometry only when it differs from the current one.
    pub(crate) fn apply_size_hints(
        &self,
        rect: Rectangle,
        area: Rectangle,
        screen: Rectangle,
        interact: bool,
        resize_hints: bool,
    ) -> Option<Rectangle> {
        let Rectangle {
            mut x,
            mut y,
            mut w,
            mut h,
        } = rect;
        let bw = 2 * self.border_width as i32;

        w = w.max(1);
        h = h.max(1);

        if interact {
            if x > screen.w {
                x = screen.w - self.outer_width();
            }
            if y > screen.h {
                y = screen.h - self.outer_height();
            }
            if x + w + bw < 0 {
                x = 0;
            }
            if y + h + bw < 0 {
                y = 0;
            }
        } else {
            if x >= area.right() {
                x = area.right() - self.outer_width();
            }
            if y >= area.bottom() {
                y = area.bottom() - self.outer_height();
            }
            if x + w + bw <= area.x {
                x = area.x;
            }
            if y + h + bw <= area.y {
                y = area.y;
            }
        }

        h = h.max(PADDING + 2);
        w = w.max(PADDING + 2);

        if resize_hints || self.is_floating {
            let s = &self.hints;
            let base_is_min = s.base_w == s.min_w && s.base_h == s.min_h;

            if !base_is_min {
                w -= s.base_w;
                h -= s.base_h;
            }

            if s.min_a > 0.0 && s.max_a > 0.0 {
                if s.max_a < w as f32 / h as f32 {
                    w = (h as f32 * s.max_a + 0.5) as i32;
                } else if s.min_a < h as f32 / w as f32 {
                    h = (w as f32 * s.min_a + 0.5) as i32;
                }
            }

            if base_is_min {
                w -= s.base_w;
                h -= s.base_h;
            }

            if s.inc_w > 0 {
                w -= w % s.inc_w;
            }
            if s.inc_h > 0 {
                h -= h % s.inc_h;
            }

            w = (w + s.base_w).max(s.min_w);
            h = (h + s.base_h).max(s.min_h);
            if s.max_w > 0 {
                w = w.min(s.max_w);
            }
            if s.max_h > 0 {
                h = h.min(s.max_h);
            }
        }

        let adjusted = Rectangle::new(x, y, w, h);
        (!adjusted.same_as(&self.geom)).then(|| adjusted)
    }
}

#[cfg(test)]
mod tests {
    use super::Client;
    use crate::{
        geometry::Rectangle,
        x::property::{SizeHints, WmSizeHints},
    };

    const AREA: Rectangle = Rectangle::new(0, 0, 1000, 800);

    fn client(geom: Rectangle) -> Client {
        Client::new(0x40_0001, 0, 1, geom, 1)
    }

    #[test]
    fn unchanged_geometry_yields_nothing() {
        let c = client(Rectangle::new(10, 10, 200, 100));
        assert_eq!(
            c.apply_size_hints(Rectangle::new(10, 10, 200, 100), AREA, AREA, false, false),
            None
        );
        assert_eq!(
            c.apply_size_hints(Rectangle::new(10, 10, 300, 100), AREA, AREA, false, false),
            Some(Rectangle::new(10, 10, 300, 100))
        );
    }

    #[test]
    fn minimum_size_and_position_are_enforced() {
        let c = client(Rectangle::new(0, 0, 50, 50));
        assert_eq!(
            c.apply_size_hints(Rectangle::new(-100, 900, 0, -3), AREA, AREA, false, false),
            Some(Rectangle::new(0, 748, 8, 8))
        );
    }

    #[test]
    fn hints_only_apply_to_floating_clients_unless_requested() {
        let mut c = client(Rectangle::new(0, 0, 50, 50));
        c.set_hints(SizeHints::from_wm(&WmSizeHints {
            size_increment: Some((10, 20)),
            base_size: Some((5, 5)),
            max_size: Some((400, 300)),
            ..WmSizeHints::default()
        }));

        let rect = Rectangle::new(0, 0, 503, 503);
        assert_eq!(
            c.apply_size_hints(rect, AREA, AREA, false, false),
            Some(rect)
        );
        assert_eq!(
            c.apply_size_hints(rect, AREA, AREA, false, true),
            Some(Rectangle::new(0, 0, 400, 300))
        );

        c.is_floating = true;
        assert_eq!(
            c.apply_size_hints(Rectangle::new(0, 0, 203, 103), AREA, AREA, false, false),
            Some(Rectangle::new(0, 0, 195, 85))
        );
    }

    #[test]
    fn aspect_ratio_is_respected() {
        let mut c = client(Rectangle::new(0, 0, 50, 50));
        c.is_floating = true;
        c.set_hints(SizeHints::from_wm(&WmSizeHints {
            min_aspect: Some((1, 1)),
            max_aspect: Some((1, 1)),
            ..WmSizeHints::default()
        }));
        assert_eq!(
            c.apply_size_hints(Rectangle::new(0, 0, 300, 100), AREA, AREA, false, false),
            Some(Rectangle::new(0, 0, 100, 100))
        );
    }

    #[test]
    fn base_size_is_removed_before_the_aspect_unless_it_is_the_minimum() {
        let mut c = client(Rectangle::new(0, 0, 30, 30));
        c.set_hints(SizeHints {
            base_w: 10,
            min_w: 20,
            min_h: 20,
            min_a: 1.0,
            max_a: 1.0,
            valid: true,
            ..SizeHints::default()
        });
        assert_eq!(
            c.apply_size_hints(Rectangle::new(0, 0, 110, 50), AREA, AREA, false, true),
            Some(Rectangle::new(0, 0, 60, 50))
        );

        c.set_hints(SizeHints {
            base_w: 10,
            min_w: 10,
            min_a: 1.0,
            max_a: 1.0,
            valid: true,
            ..SizeHints::default()
        });
        assert_eq!(
            c.apply_size_hints(Rectangle::new(0, 0, 110, 50), AREA, AREA, false, true),
            Some(Rectangle::new(0, 0, 50, 50))
        );
    }

    #[test]
    fn fixed_size_is_detected() {
        let mut c = client(Rectangle::new(0, 0, 50, 50));
        c.set_hints(SizeHints::from_wm(&WmSizeHints {
            min_size: Some((80, 60)),
            max_size: Some((80, 60)),
            ..WmSizeHints::default()
        }));
        assert!(c.is_fixed);
    }

    #[test]
    fn names_are_cut_on_char_boundaries() {
        let mut c = client(Rectangle::new(0, 0, 50, 50));
        let long = "é".repeat(200);
        c.set_name(&long);
        assert_eq!(c.name.len(), 254);
        assert!(c.name.chars().all(|ch| ch == 'é'));

        c.set_name("term");
        assert_eq!(c.name, "term");
    }
}
