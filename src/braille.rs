use crate::geometry::Position;
use crate::simulation::PathSimulation;
use crate::trail::HOT;
use ratatui::style::Color;

/// Braille character rendering for high-resolution terminal graphics.
/// Each Braille character represents a 2x4 grid of dots (8 dots total).
///
/// Dot positions and their bit values:
/// ```text
/// (0,0)=0x01  (1,0)=0x08
/// (0,1)=0x02  (1,1)=0x10
/// (0,2)=0x04  (1,2)=0x20
/// (0,3)=0x40  (1,3)=0x80
/// ```
///
/// Unicode Braille patterns: U+2800 to U+28FF (256 patterns)
const BRAILLE_BASE: u32 = 0x2800;

/// Dot position to bit mapping for Braille characters
const BRAILLE_DOTS: [[u8; 4]; 2] = [
    [0x01, 0x02, 0x04, 0x40], // Left column (x=0): rows 0,1,2,3
    [0x08, 0x10, 0x20, 0x80], // Right column (x=1): rows 0,1,2,3
];

/// What a single dot shows, in drawing priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Layer {
    Empty,
    Trail,
    Wall,
    Start,
    Goal,
    Route,
}

/// A single rendered Braille cell with position and color
#[derive(Clone, Copy)]
pub struct BrailleCell {
    pub x: u16,
    pub y: u16,
    pub char: char,
    pub color: Color,
}

/// Dot-resolution raster of the field
struct DotGrid {
    width: usize,
    height: usize,
    scale_x: f32,
    scale_y: f32,
    layers: Vec<Layer>,
    trail: Vec<f32>,
}

impl DotGrid {
    fn new(field_width: usize, field_height: usize, width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            scale_x: field_width as f32 / width.max(1) as f32,
            scale_y: field_height as f32 / height.max(1) as f32,
            layers: vec![Layer::Empty; width * height],
            trail: vec![0.0; width * height],
        }
    }

    /// Field point at the centre of a dot
    fn field_point(&self, dx: usize, dy: usize) -> Position {
        Position::new((dx as f32 + 0.5) * self.scale_x, (dy as f32 + 0.5) * self.scale_y)
    }

    /// Raise the dots around a field point to `layer`
    fn mark(&mut self, at: Position, radius: usize, layer: Layer) {
        let cx = (at.x / self.scale_x).floor();
        let cy = (at.y / self.scale_y).floor();
        if !(cx >= 0.0 && cy >= 0.0) {
            return;
        }
        let (cx, cy) = (cx as usize, cy as usize);
        for y in cy.saturating_sub(radius)..=cy + radius {
            for x in cx.saturating_sub(radius)..=cx + radius {
                if x < self.width && y < self.height {
                    let i = y * self.width + x;
                    self.layers[i] = self.layers[i].max(layer);
                }
            }
        }
    }
}

/// Render walls, trail, goals, start and route to Braille characters
pub fn render_to_braille(simulation: &PathSimulation, canvas_width: u16, canvas_height: u16) -> Vec<BrailleCell> {
    let field = simulation.field();

    // Braille effective resolution
    let braille_width = canvas_width as usize * 2;
    let braille_height = canvas_height as usize * 4;
    let mut dots = DotGrid::new(field.width(), field.height(), braille_width, braille_height);

    for dy in 0..braille_height {
        for dx in 0..braille_width {
            let point = dots.field_point(dx, dy);
            let i = dy * braille_width + dx;
            if simulation.is_wall(point) {
                dots.layers[i] = Layer::Wall;
            } else {
                let value = field.sense(point);
                if value > 0.0 {
                    dots.layers[i] = Layer::Trail;
                    dots.trail[i] = value;
                }
            }
        }
    }

    if let Some(route) = simulation.route() {
        for point in route.points() {
            dots.mark(*point, 0, Layer::Route);
        }
    }
    for goal in simulation.goals().points() {
        dots.mark(*goal, 1, Layer::Goal);
    }
    dots.mark(simulation.start(), 1, Layer::Start);

    let mut cells = Vec::with_capacity((canvas_width as usize) * (canvas_height as usize));

    for cy in 0..canvas_height {
        for cx in 0..canvas_width {
            let mut pattern: u8 = 0;
            let mut top = Layer::Empty;
            let mut trail_total: f32 = 0.0;
            let mut trail_dots: usize = 0;

            // Sample the 2x4 dots for this Braille character
            let base_bx = cx as usize * 2;
            let base_by = cy as usize * 4;

            for dx in 0..2 {
                for dy in 0..4 {
                    let i = (base_by + dy) * braille_width + base_bx + dx;
                    let layer = dots.layers[i];
                    if layer == Layer::Empty {
                        continue;
                    }
                    pattern |= BRAILLE_DOTS[dx][dy];
                    top = top.max(layer);
                    if layer == Layer::Trail {
                        trail_total += dots.trail[i];
                        trail_dots += 1;
                    }
                }
            }

            // Only emit cells that have at least one dot
            if pattern != 0 {
                let braille_char = char::from_u32(BRAILLE_BASE + pattern as u32).unwrap_or(' ');
                let color = match top {
                    Layer::Route => Color::Yellow,
                    Layer::Goal => Color::Red,
                    Layer::Start => Color::Green,
                    Layer::Wall => Color::Gray,
                    Layer::Trail | Layer::Empty => trail_color(trail_total / trail_dots.max(1) as f32),
                };
                cells.push(BrailleCell {
                    x: cx,
                    y: cy,
                    char: braille_char,
                    color,
                });
            }
        }
    }

    cells
}

/// Fresh trail is bright cyan, fading toward dark blue
fn trail_color(value: f32) -> Color {
    let t = (value / HOT).clamp(0.0, 1.0);
    let lerp = |from: f32, to: f32| (from + (to - from) * t) as u8;
    Color::Rgb(lerp(20.0, 80.0), lerp(40.0, 230.0), lerp(90.0, 255.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{MazeSettings, SimulationSettings, SwarmSettings, Variant};

    #[test]
    fn test_braille_pattern() {
        // Test that single dot patterns work correctly
        assert_eq!(BRAILLE_DOTS[0][0], 0x01); // Top-left
        assert_eq!(BRAILLE_DOTS[1][0], 0x08); // Top-right
        assert_eq!(BRAILLE_DOTS[0][3], 0x40); // Bottom-left
        assert_eq!(BRAILLE_DOTS[1][3], 0x80); // Bottom-right

        // All dots should give 0xFF
        let all_dots: u8 = BRAILLE_DOTS[0].iter().sum::<u8>() + BRAILLE_DOTS[1].iter().sum::<u8>();
        assert_eq!(all_dots, 0xFF);
    }

    #[test]
    fn test_braille_char_generation() {
        // Empty pattern
        let empty = char::from_u32(BRAILLE_BASE).unwrap();
        assert_eq!(empty, '\u{2800}');

        // Full pattern (all 8 dots)
        let full = char::from_u32(BRAILLE_BASE + 0xFF).unwrap();
        assert_eq!(full, '\u{28FF}');
    }

    #[test]
    fn test_render_marks_goal_and_walls() {
        let settings = SimulationSettings {
            swarm: SwarmSettings {
                agent_count: 5,
                ..Default::default()
            },
            maze: MazeSettings {
                cols: 5,
                rows: 5,
                cell_size: 20,
                time_budget_ms: None,
                solid_walls: false,
            },
            seed: Some(1),
            ..Default::default()
        };
        let sim = PathSimulation::new(settings).unwrap();
        let cells = render_to_braille(&sim, 50, 25);

        assert!(cells.iter().all(|c| c.x < 50 && c.y < 25));
        assert!(cells.iter().any(|c| c.color == Color::Gray));
        assert!(cells.iter().any(|c| c.color == Color::Red));
        assert!(cells.iter().any(|c| c.color == Color::Green));
    }

    #[test]
    fn test_empty_open_field_draws_only_markers() {
        let settings = SimulationSettings {
            variant: Variant::OpenField,
            swarm: SwarmSettings {
                agent_count: 1,
                ..Default::default()
            },
            field_width: 100,
            field_height: 100,
            seed: Some(1),
            ..Default::default()
        };
        let sim = PathSimulation::new(settings).unwrap();
        let cells = render_to_braille(&sim, 20, 10);
        assert!(cells.iter().all(|c| c.color == Color::Red || c.color == Color::Green));
    }

    #[test]
    fn test_trail_color_brightens_with_intensity() {
        assert_eq!(trail_color(HOT), Color::Rgb(80, 230, 255));
        assert_eq!(trail_color(0.0), Color::Rgb(20, 40, 90));
    }
}
