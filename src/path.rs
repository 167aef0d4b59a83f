use crate::agent::Agent;
use crate::geometry::{CellKey, Position};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Loop-free route pulled from the best agent history
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExtractedPath {
    points: Vec<Position>,
}

impl ExtractedPath {
    pub fn points(&self) -> &[Position] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<Position> {
        self.points.first().copied()
    }

    pub fn last(&self) -> Option<Position> {
        self.points.last().copied()
    }

    /// Sum of segment lengths in field units
    pub fn length(&self) -> f32 {
        self.points.windows(2).map(|w| w[0].distance(w[1])).sum()
    }
}

/// History of the goal-reaching agent with the fewest entries.
/// Ties keep the earliest agent.
pub fn shortest_successful_trace(agents: &[Agent]) -> Option<&[Position]> {
    let mut best: Option<&[Position]> = None;
    for path in agents
        .iter()
        .filter(|agent| agent.has_reached_goal())
        .filter_map(Agent::path)
    {
        if best.map_or(true, |current| path.len() < current.len()) {
            best = Some(path);
        }
    }
    best
}

/// Collapse revisited cells so no floored cell key appears twice.
///
/// When a point lands on a cell already in the output at index `k`, the
/// output is cut back to `k + 1` entries and the point replaces entry `k`.
pub fn remove_loops(path: &[Position]) -> Vec<Position> {
    let mut slots: HashMap<CellKey, usize> = HashMap::new();
    let mut out: Vec<Position> = Vec::with_capacity(path.len());

    for &point in path {
        let key = point.cell_key();
        let existing = slots.get(&key).copied();
        match existing {
            Some(k) => {
                for dropped in out.drain(k + 1..) {
                    slots.remove(&dropped.cell_key());
                }
                out[k] = point;
            }
            None => {
                slots.insert(key, out.len());
                out.push(point);
            }
        }
    }

    out
}

/// Shortest successful trace with its loops removed; empty when nobody arrived
pub fn extract(agents: &[Agent]) -> ExtractedPath {
    let points = shortest_successful_trace(agents)
        .map(remove_loops)
        .unwrap_or_default();
    ExtractedPath { points }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Terrain;
    use crate::goals::GoalSet;
    use crate::settings::{BoundaryBehavior, SwarmSettings};
    use crate::trail::TrailField;
    use std::collections::HashSet;

    fn cells(path: &[Position]) -> Vec<CellKey> {
        path.iter().map(Position::cell_key).collect()
    }

    fn points(raw: &[(f32, f32)]) -> Vec<Position> {
        raw.iter().map(|&(x, y)| Position::new(x, y)).collect()
    }

    #[test]
    fn test_loop_collapses_to_first_visit() {
        let input = points(&[(0.2, 0.1), (1.5, 1.5), (2.1, 2.9), (1.0, 2.0), (2.7, 2.2), (3.3, 3.0)]);
        let output = remove_loops(&input);
        assert_eq!(cells(&output), vec![(0, 0), (1, 1), (2, 2), (3, 3)]);
        // The revisiting point takes over the slot
        assert_eq!(output[2], Position::new(2.7, 2.2));
    }

    #[test]
    fn test_long_revisit_has_no_duplicates() {
        // (2, 2) at positions 3 and 9
        let input = points(&[
            (0.0, 0.0),
            (1.0, 0.0),
            (1.0, 1.0),
            (2.0, 2.0),
            (3.0, 2.0),
            (4.0, 2.0),
            (4.0, 3.0),
            (3.0, 3.0),
            (2.0, 3.0),
            (2.0, 2.0),
            (2.0, 1.0),
        ]);
        let output = remove_loops(&input);
        assert!(output.len() <= input.len());
        let unique: HashSet<CellKey> = cells(&output).into_iter().collect();
        assert_eq!(unique.len(), output.len());
        assert_eq!(cells(&output), vec![(0, 0), (1, 0), (1, 1), (2, 2), (2, 1)]);
    }

    #[test]
    fn test_stale_keys_are_forgotten() {
        // (5, 5) is dropped by the first loop and must count as new afterwards
        let input = points(&[(0.0, 0.0), (5.0, 5.0), (0.5, 0.5), (5.5, 5.5), (6.0, 6.0)]);
        let output = remove_loops(&input);
        assert_eq!(cells(&output), vec![(0, 0), (5, 5), (6, 6)]);
    }

    #[test]
    fn test_near_duplicates_share_a_cell() {
        let input = points(&[(1.1, 1.1), (1.9, 1.9), (2.0, 2.0)]);
        assert_eq!(cells(&remove_loops(&input)), vec![(1, 1), (2, 2)]);
    }

    #[test]
    fn test_empty_input() {
        assert!(remove_loops(&[]).is_empty());
        assert!(extract(&[]).is_empty());
    }

    fn walk(agent: &mut Agent, terrain: &Terrain, field: &mut TrailField, ticks: usize) {
        let settings = SwarmSettings {
            food_detection_range: 3.0,
            ..Default::default()
        };
        for _ in 0..ticks {
            agent.tick(terrain, field, &settings);
        }
    }

    #[test]
    fn test_picks_shortest_successful_agent() {
        let goals = GoalSet::new(vec![Position::new(50.0, 10.0)], 3.0).unwrap();
        let terrain = Terrain {
            width: 100.0,
            height: 100.0,
            boundary: BoundaryBehavior::Wrap,
            maze: None,
            solid_walls: false,
            goals: &goals,
        };
        // Heading straight at the goal from different distances, each on a
        // clean field so no agent steers around another's trail
        let mut near = Agent::new(Position::new(40.0, 10.0), 0.0, true);
        let mut far = Agent::new(Position::new(20.0, 10.0), 0.0, true);
        let mut lost = Agent::new(Position::new(20.0, 80.0), 0.0, true);
        walk(&mut far, &terrain, &mut TrailField::new(100, 100, 5.0), 40);
        walk(&mut near, &terrain, &mut TrailField::new(100, 100, 5.0), 12);
        walk(&mut lost, &terrain, &mut TrailField::new(100, 100, 5.0), 5);

        assert!(near.has_reached_goal() && far.has_reached_goal());
        assert!(!lost.has_reached_goal());

        let agents = vec![far, lost, near];
        let trace = shortest_successful_trace(&agents).unwrap();
        assert_eq!(trace.len(), 13);
        assert_eq!(trace[0], Position::new(40.0, 10.0));

        let route = extract(&agents);
        assert_eq!(route.first().map(|p| p.cell_key()), Some((40, 10)));
        assert!(route.len() <= trace.len());
    }

    #[test]
    fn test_nobody_arrived_gives_empty_route() {
        let agents = vec![Agent::new(Position::new(1.0, 1.0), 0.0, true)];
        assert!(extract(&agents).is_empty());
        assert!(shortest_successful_trace(&agents).is_none());
    }
}
