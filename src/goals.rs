use crate::error::{Result, SimError};
use crate::geometry::Position;

/// Fixed goal points with a shared detection radius
#[derive(Debug, Clone, PartialEq)]
pub struct GoalSet {
    points: Vec<Position>,
    detection_radius: f32,
}

impl GoalSet {
    pub fn new(points: Vec<Position>, detection_radius: f32) -> Result<Self> {
        if points.is_empty() {
            return Err(SimError::InvalidConfig("at least one goal point is required".into()));
        }
        if !(detection_radius.is_finite() && detection_radius > 0.0) {
            return Err(SimError::InvalidConfig(format!(
                "detection radius must be positive, got {detection_radius}"
            )));
        }
        Ok(Self {
            points,
            detection_radius,
        })
    }

    pub fn points(&self) -> &[Position] {
        &self.points
    }

    /// Closest goal to `position` and its distance
    pub fn nearest(&self, position: Position) -> Option<(Position, f32)> {
        self.points
            .iter()
            .map(|goal| (*goal, position.distance(*goal)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }

    /// Nearest goal when it lies strictly inside the detection radius
    pub fn detect(&self, position: Position) -> Option<Position> {
        self.nearest(position)
            .filter(|(_, distance)| *distance < self.detection_radius)
            .map(|(goal, _)| goal)
    }
}

/// Field size and goal points read from the route-builder text syntax
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Layout {
    pub size: Option<(f32, f32)>,
    pub points: Vec<Position>,
}

/// Parse `"(720x720) (100, 200) (300,400)"`.
///
/// `(W x H)` sets the field size (the last one wins), `(x, y)` adds a goal.
/// Anything outside parentheses is ignored.
pub fn parse_layout(text: &str) -> Result<Layout> {
    let mut layout = Layout::default();
    let mut rest = text;

    while let Some(open) = rest.find('(') {
        let after = &rest[open + 1..];
        let close = after
            .find(')')
            .ok_or_else(|| SimError::PointParse(format!("unclosed '(' in {text:?}")))?;
        let body = after[..close].trim();
        rest = &after[close + 1..];

        if let Some((w, h)) = body.split_once(['x', 'X']) {
            let width = parse_number(w, body)?;
            let height = parse_number(h, body)?;
            layout.size = Some((width, height));
        } else if let Some((x, y)) = body.split_once(',') {
            let x = parse_number(x, body)?;
            let y = parse_number(y, body)?;
            layout.points.push(Position::new(x, y));
        } else {
            return Err(SimError::PointParse(format!(
                "expected (W x H) or (x, y), got ({body})"
            )));
        }
    }

    Ok(layout)
}

fn parse_number(raw: &str, context: &str) -> Result<f32> {
    let trimmed = raw.trim();
    let value: f32 = trimmed
        .parse()
        .map_err(|_| SimError::PointParse(format!("bad number {trimmed:?} in ({context})")))?;
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(SimError::PointParse(format!("coordinates must be non-negative, got {value}")))
    }
}
