use crate::error::{Result, SimError};
use crate::geometry::Position;
use crate::simulation::PathSimulation;
use crate::trail::HOT;
use gif::{Encoder, Frame, Repeat};
use image::{Rgb, RgbImage};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const WALL: Rgb<u8> = Rgb([150, 150, 150]);
const ROUTE: Rgb<u8> = Rgb([255, 200, 0]);
const GOAL: Rgb<u8> = Rgb([0, 0, 0]);
const START: Rgb<u8> = Rgb([40, 160, 60]);

/// Darkest shade a saturated trail cell reaches
const TRAIL_FLOOR: f32 = 40.0;

/// Render the current run one pixel per field cell
pub fn render_frame(sim: &PathSimulation) -> RgbImage {
    let field = sim.field();
    let (width, height) = (field.width() as u32, field.height() as u32);
    let mut img = RgbImage::from_pixel(width, height, BACKGROUND);

    for y in 0..height {
        for x in 0..width {
            let center = Position::new(x as f32 + 0.5, y as f32 + 0.5);
            if sim.is_wall(center) {
                img.put_pixel(x, y, WALL);
                continue;
            }
            let value = field.value_at(x as usize, y as usize).unwrap_or(0.0);
            if value > 0.0 {
                let shade = 255.0 - (value / HOT).min(1.0) * (255.0 - TRAIL_FLOOR);
                let s = shade as u8;
                img.put_pixel(x, y, Rgb([s, s, s]));
            }
        }
    }

    if let Some(route) = sim.route() {
        for point in route.points() {
            stamp(&mut img, *point, 1, ROUTE);
        }
    }
    for goal in sim.goals().points() {
        stamp(&mut img, *goal, 3, GOAL);
    }
    stamp(&mut img, sim.start(), 2, START);
    img
}

/// Fill a square of half-size `radius` around a field point, clipped to the image
fn stamp(img: &mut RgbImage, at: Position, radius: i64, color: Rgb<u8>) {
    let (cx, cy) = at.cell_key();
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let (x, y) = (cx + dx, cy + dy);
            if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
                img.put_pixel(x as u32, y as u32, color);
            }
        }
    }
}

/// Write a PNG snapshot of the run
pub fn save_snapshot(sim: &PathSimulation, path: &Path) -> Result<()> {
    render_frame(sim).save(path)?;
    log::info!("snapshot written to {}", path.display());
    Ok(())
}

/// Animated GIF writer fed one rendered frame at a time
pub struct GifRecorder {
    encoder: Encoder<BufWriter<File>>,
    width: u16,
    height: u16,
    frames: usize,
    /// Hundredths of a second per frame
    delay: u16,
}

impl GifRecorder {
    pub fn create(path: &Path, width: usize, height: usize, delay: u16) -> Result<Self> {
        let too_big = || SimError::InvalidConfig(format!("{width}x{height} field is too large for a GIF"));
        let w = u16::try_from(width).map_err(|_| too_big())?;
        let h = u16::try_from(height).map_err(|_| too_big())?;

        let file = BufWriter::new(File::create(path)?);
        let mut encoder = Encoder::new(file, w, h, &[])?;
        encoder.set_repeat(Repeat::Infinite)?;
        log::info!("recording {}x{} GIF to {}", w, h, path.display());
        Ok(Self {
            encoder,
            width: w,
            height: h,
            frames: 0,
            delay,
        })
    }

    /// Append the simulation's current state as a frame
    pub fn capture(&mut self, sim: &PathSimulation) -> Result<()> {
        let img = render_frame(sim);
        if img.width() != u32::from(self.width) || img.height() != u32::from(self.height) {
            return Err(SimError::InvalidConfig(format!(
                "frame is {}x{} but recording is {}x{}",
                img.width(),
                img.height(),
                self.width,
                self.height
            )));
        }
        let mut frame = Frame::from_rgb_speed(self.width, self.height, img.as_raw(), 10);
        frame.delay = self.delay;
        self.encoder.write_frame(&frame)?;
        self.frames += 1;
        Ok(())
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Flush the trailer; dropping the recorder does the same silently
    pub fn finish(self) -> Result<()> {
        let frames = self.frames;
        let mut writer = self.encoder.into_inner()?;
        std::io::Write::flush(&mut writer)?;
        log::info!("GIF finished with {} frames", frames);
        Ok(())
    }
}
