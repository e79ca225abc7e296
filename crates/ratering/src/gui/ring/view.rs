use super::model::{Card, State};
use super::{
    CARD_PADDING, CORNER_RADIUS, FOOTER_FONT_SIZE, FOOTER_GAP, HEADER_FONT_SIZE,
    LABEL_FONT_FACTOR, LABEL_OUTLINE_WIDTH, PROGRESS_HEIGHT, ROW_GAP, STATUS_FONT_SIZE, TILE_GAP,
    TILE_SIZE, TILE_STACK_GAP, TILE_TARGET_ALPHA,
};
use crate::gui::theme::ThemeColors;
use cairo::{Context, FontSlant, FontWeight};
use palette::{Srgb, Srgba};
use ratekit::animator::PULSE_SCALE;
use ratekit::GoalProgress;
use ratekit::data::DataSource;
use ratekit::geometry::{BACKGROUND_COLOR, Point, Sector, ring_radius};
use std::f64::consts::PI;
use std::time::Instant;

fn set_rgba(cr: &Context, color: Srgba<f64>) {
    let (r, g, b, a) = color.into_components();
    cr.set_source_rgba(r, g, b, a);
}

fn set_band(cr: &Context, color: Srgb<u8>, alpha: f64) {
    let c: Srgb<f64> = color.into_format();
    cr.set_source_rgba(c.red, c.green, c.blue, alpha);
}

fn rounded_rect(cr: &Context, x: f64, y: f64, w: f64, h: f64, r: f64) {
    cr.new_sub_path();
    cr.arc(x + w - r, y + r, r, -PI / 2.0, 0.0);
    cr.arc(x + w - r, y + h - r, r, 0.0, PI / 2.0);
    cr.arc(x + r, y + h - r, r, PI / 2.0, PI);
    cr.arc(x + r, y + r, r, PI, 1.5 * PI);
    cr.close_path();
}

struct CardRenderer<'a> {
    card: &'a Card,
    origin: Point,
    center: Point,
    width: f64,
    height: f64,
    size: f64,
    pulsing: bool,
}

impl<'a> CardRenderer<'a> {
    fn new(state: &'a State, index: usize, now: Instant) -> Self {
        let card = &state.cards[index];
        Self {
            card,
            origin: state.card_origin(index),
            center: state.ring_center(index),
            width: state.card_width(),
            height: state.card_height(),
            size: state.size,
            pulsing: card.is_pulsing(now),
        }
    }

    fn draw(&self, cr: &Context, colors: &ThemeColors) -> Result<(), cairo::Error> {
        self.draw_panel(cr, colors)?;
        self.draw_header(cr, colors)?;
        self.draw_ring(cr)?;
        self.draw_label(cr)?;
        self.draw_footer(cr, colors)
    }

    fn draw_panel(&self, cr: &Context, colors: &ThemeColors) -> Result<(), cairo::Error> {
        set_rgba(cr, colors.panel);
        rounded_rect(
            cr,
            self.origin.x,
            self.origin.y,
            self.width,
            self.height,
            CORNER_RADIUS,
        );
        cr.fill()
    }

    fn draw_header(&self, cr: &Context, colors: &ThemeColors) -> Result<(), cairo::Error> {
        cr.select_font_face("Sans", FontSlant::Normal, FontWeight::Bold);
        cr.set_font_size(HEADER_FONT_SIZE);
        set_rgba(cr, colors.text);
        cr.move_to(
            self.origin.x + CARD_PADDING,
            self.origin.y + CARD_PADDING + HEADER_FONT_SIZE,
        );
        cr.show_text(&self.card.title())
    }

    fn draw_ring(&self, cr: &Context) -> Result<(), cairo::Error> {
        let radius = ring_radius(self.size);
        set_band(cr, BACKGROUND_COLOR, 1.0);
        cr.arc(self.center.x, self.center.y, radius, 0.0, 2.0 * PI);
        cr.fill()?;

        let Some(frame) = &self.card.frame else {
            return Ok(());
        };

        for layer in &frame.layers {
            // built around the origin so a spinning layer turns about the ring centre
            let Some(sector) = layer.sector(Point::default(), radius) else {
                continue;
            };
            cr.save()?;
            cr.translate(self.center.x, self.center.y);
            if let Some(deg) = layer.rotation_degrees {
                cr.rotate(deg.to_radians());
            }
            set_band(cr, layer.color, 1.0);
            let (start, end) = sector.radians();
            if let Sector::Slice { .. } = sector {
                cr.move_to(0.0, 0.0);
            }
            cr.arc(0.0, 0.0, radius, start, end);
            cr.close_path();
            cr.fill()?;
            cr.restore()?;
        }
        Ok(())
    }

    fn draw_label(&self, cr: &Context) -> Result<(), cairo::Error> {
        let Some(frame) = &self.card.frame else {
            return Ok(());
        };
        let text = frame.rating.to_string();
        let scale = if self.pulsing { PULSE_SCALE } else { 1.0 };

        cr.select_font_face("Sans", FontSlant::Normal, FontWeight::Bold);
        cr.set_font_size(self.size * LABEL_FONT_FACTOR * scale);
        let ext = cr.text_extents(&text)?;
        let x = self.center.x - ext.width() / 2.0 - ext.x_bearing();
        let y = self.center.y - ext.height() / 2.0 - ext.y_bearing();

        let shadow = frame.contrast.shadow.shadow();
        cr.set_source_rgba(0.0, 0.0, 0.0, shadow.alpha);
        cr.move_to(x + shadow.offset, y + shadow.offset);
        cr.show_text(&text)?;

        cr.move_to(x, y);
        cr.text_path(&text);
        set_band(cr, frame.band.color, 1.0);
        cr.fill_preserve()?;
        set_rgba(cr, frame.contrast.outline);
        cr.set_line_width(LABEL_OUTLINE_WIDTH);
        cr.stroke()
    }

    fn draw_footer(&self, cr: &Context, colors: &ThemeColors) -> Result<(), cairo::Error> {
        let info = &self.card.info;
        let left = self.origin.x + CARD_PADDING;
        let mut y = self.center.y + self.size / 2.0 + FOOTER_GAP;

        cr.select_font_face("Sans", FontSlant::Normal, FontWeight::Normal);
        cr.set_font_size(FOOTER_FONT_SIZE);
        set_rgba(cr, colors.muted);
        cr.move_to(left, y + FOOTER_FONT_SIZE);
        cr.show_text(&format!("{} contests", info.contests))?;

        if !(self.card.shows_goal() && self.card.is_revealed()) {
            return Ok(());
        }
        let progress = &info.progress;
        y += FOOTER_FONT_SIZE + ROW_GAP;

        for tile in goal_tiles(progress) {
            if tile.target {
                set_band(cr, info.goal_color, TILE_TARGET_ALPHA);
            } else {
                set_band(cr, info.current_color, 1.0);
            }
            cr.rectangle(left + tile.offset, y, TILE_SIZE, TILE_SIZE);
            cr.fill()?;
        }
        y += TILE_SIZE + ROW_GAP;

        set_rgba(cr, colors.track);
        cr.rectangle(left, y, self.size, PROGRESS_HEIGHT);
        cr.fill()?;
        set_band(cr, info.goal_color, 1.0);
        cr.rectangle(
            left,
            y,
            self.size * f64::from(progress.percent_to_target.min(100)) / 100.0,
            PROGRESS_HEIGHT,
        );
        cr.fill()?;
        y += PROGRESS_HEIGHT + ROW_GAP;

        let summary = if progress.achieved {
            format!("{} reached", progress.target)
        } else {
            format!(
                "{}% · {} to {}",
                progress.percent_to_target, progress.remaining, progress.target
            )
        };
        set_rgba(cr, colors.muted);
        cr.move_to(left, y + FOOTER_FONT_SIZE);
        cr.show_text(&summary)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Tile {
    offset: f64,
    target: bool,
}

/// The current stack, then the goal's stack faintly beside it.
fn goal_tiles(progress: &GoalProgress) -> Vec<Tile> {
    let step = TILE_SIZE + TILE_GAP;
    let current = (0..progress.tiles_current).map(|i| Tile {
        offset: i as f64 * step,
        target: false,
    });
    let target_start = progress.tiles_current as f64 * step + TILE_STACK_GAP;
    let target = (0..progress.tiles_target).map(move |i| Tile {
        offset: target_start + i as f64 * step,
        target: true,
    });
    current.chain(target).collect()
}

fn draw_status(cr: &Context, state: &State, colors: &ThemeColors) -> Result<(), cairo::Error> {
    let Some(source) = state.source else {
        return Ok(());
    };
    let (text, color) = match (source, &state.last_updated) {
        (DataSource::File, Some(updated)) => (format!("{} · {}", source, updated), colors.fresh),
        (DataSource::File, None) => (source.to_string(), colors.fresh),
        (DataSource::Fallback, _) => (source.to_string(), colors.stale),
    };
    cr.select_font_face("Sans", FontSlant::Normal, FontWeight::Normal);
    cr.set_font_size(STATUS_FONT_SIZE);
    set_rgba(cr, color);
    cr.move_to(CARD_PADDING, state.card_height() + STATUS_FONT_SIZE + 4.0);
    cr.show_text(&text)
}

pub fn draw(
    cr: &Context,
    state: &State,
    colors: &ThemeColors,
    now: Instant,
) -> Result<(), cairo::Error> {
    for index in 0..state.cards.len() {
        CardRenderer::new(state, index, now).draw(cr, colors)?;
    }
    draw_status(cr, state, colors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::CardInfo;
    use ratekit::animator::Frame;
    use ratekit::{BandTable, ContestType, Rating, Stat};
    use ratekit::Completion;

    fn state_at(rating: u32) -> State {
        let table = BandTable::atcoder();
        let target = Rating::new(rating);
        let mut state = State::new(160.0);
        state.set_cards(
            1,
            160.0,
            vec![CardInfo {
                contest: ContestType::Algorithm,
                stat: Stat::Current,
                target,
                contests: 3,
                progress: GoalProgress::new(target, Rating::new(1200)),
                current_color: table.band_for(target).color,
                goal_color: table.band_for(Rating::new(1200)).color,
            }],
            DataSource::Fallback,
            None,
        );
        state
    }

    /// Renders into an ARGB32 surface and returns the pixel at `p` as BGRA.
    fn render_pixel(state: &State, p: Point) -> [u8; 4] {
        let (w, h) = state.canvas_size();
        let mut surface = cairo::ImageSurface::create(cairo::Format::ARgb32, w, h).unwrap();
        {
            let cr = Context::new(&surface).unwrap();
            draw(&cr, state, &ThemeColors::default(), Instant::now()).unwrap();
        }
        surface.flush();
        let stride = surface.stride() as usize;
        let data = surface.data().unwrap();
        let offset = p.y as usize * stride + p.x as usize * 4;
        [data[offset], data[offset + 1], data[offset + 2], data[offset + 3]]
    }

    #[test]
    fn test_empty_card_shows_background_disc() {
        let state = state_at(1000);
        let c = state.ring_center(0);
        let r = ring_radius(state.size);
        assert_eq!(
            render_pixel(&state, Point::new(c.x + 0.55 * r, c.y - 0.55 * r)),
            [0x2b, 0x2b, 0x2b, 0xff]
        );
    }

    #[test]
    fn test_half_layer_covers_right_side_only() {
        let mut state = state_at(1000);
        let frame = Frame::at_rest(&BandTable::atcoder(), Rating::new(1000));
        state.apply_frame(1, 0, frame, Instant::now());

        let c = state.ring_center(0);
        let r = ring_radius(state.size);
        // 1000 is two full layers and half of the green one
        assert_eq!(
            render_pixel(&state, Point::new(c.x + 0.55 * r, c.y - 0.55 * r)),
            [0x00, 0x80, 0x00, 0xff]
        );
        assert_eq!(
            render_pixel(&state, Point::new(c.x - 0.55 * r, c.y - 0.55 * r)),
            [0x00, 0x40, 0x80, 0xff]
        );
    }

    #[test]
    fn test_spinning_layer_is_rotated() {
        let table = BandTable::atcoder();
        let mut state = state_at(1000);
        let mut frame = Frame::at_rest(&table, Rating::new(1000));
        if let Some(top) = frame.layers.last_mut() {
            top.rotation_degrees = Some(180.0);
        }
        state.apply_frame(1, 0, frame, Instant::now());

        let c = state.ring_center(0);
        let r = ring_radius(state.size);
        // the green half now sits on the left
        assert_eq!(
            render_pixel(&state, Point::new(c.x - 0.55 * r, c.y + 0.55 * r)),
            [0x00, 0x80, 0x00, 0xff]
        );
        assert_eq!(
            render_pixel(&state, Point::new(c.x + 0.55 * r, c.y - 0.55 * r)),
            [0x00, 0x40, 0x80, 0xff]
        );
    }

    #[test]
    fn test_goal_tiles_keep_both_stacks() {
        // 271 -> 1200: three current tiles, one faint goal tile after a gap
        let tiles = goal_tiles(&GoalProgress::new(Rating::new(271), Rating::new(1200)));
        assert_eq!(tiles.len(), 4);
        assert_eq!(tiles.iter().filter(|t| !t.target).count(), 3);
        let step = TILE_SIZE + TILE_GAP;
        assert_eq!(
            tiles[3],
            Tile {
                offset: 3.0 * step + TILE_STACK_GAP,
                target: true
            }
        );

        let tiles = goal_tiles(&GoalProgress::new(Rating::new(1241), Rating::new(1200)));
        assert_eq!(tiles.len(), 2);
        assert!(!tiles[0].target);
        assert!(tiles[1].target);
    }

    #[test]
    fn test_revealed_card_paints_goal_tile() {
        let mut state = state_at(271);
        let frame = Frame::at_rest(&BandTable::atcoder(), Rating::new(271));
        state.apply_frame(1, 0, frame, Instant::now());
        assert!(state.finish(1, 0, Completion::Finished));

        let origin = state.card_origin(0);
        let c = state.ring_center(0);
        let tiles_y = c.y + state.size / 2.0 + FOOTER_GAP + FOOTER_FONT_SIZE + ROW_GAP;
        let left = origin.x + CARD_PADDING;
        let step = TILE_SIZE + TILE_GAP;

        // first current tile is solid gray (271)
        let first = render_pixel(&state, Point::new(left + 2.0, tiles_y + 2.0));
        assert_eq!(first, [0x80, 0x80, 0x80, 0xff]);

        // the goal tile (cyan at 0.28) over the panel differs from the bare panel
        let goal_x = left + 3.0 * step + TILE_STACK_GAP + 2.0;
        let goal = render_pixel(&state, Point::new(goal_x, tiles_y + 2.0));
        let bare = render_pixel(&state, Point::new(goal_x + step, tiles_y + 2.0));
        assert_ne!(goal, bare);
        assert!(goal[0] > bare[0]);
    }
}
