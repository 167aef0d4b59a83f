use crate::agent::{Agent, Terrain};
use crate::error::{Result, SimError};
use crate::geometry::Position;
use crate::settings::SwarmSettings;
use crate::trail::TrailField;
use rand::Rng;
use std::f32::consts::TAU;

/// Fixed-size collection of agents sharing one trail field
#[derive(Debug, Clone)]
pub struct Swarm {
    agents: Vec<Agent>,
    settings: SwarmSettings,
    reached: usize,
}

impl Swarm {
    /// Spawn every agent at `start` with a uniformly random heading
    pub fn new<R: Rng + ?Sized>(
        settings: SwarmSettings,
        start: Position,
        record_paths: bool,
        rng: &mut R,
    ) -> Result<Self> {
        settings.validate()?;
        if !start.is_finite() {
            return Err(SimError::InvalidConfig("start position must be finite".into()));
        }
        let agents = (0..settings.agent_count)
            .map(|_| Agent::new(start, rng.gen_range(0.0..TAU), record_paths))
            .collect();
        Ok(Self {
            agents,
            settings,
            reached: 0,
        })
    }

    pub fn settings(&self) -> &SwarmSettings {
        &self.settings
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Advance every agent one tick, in order
    pub fn update(&mut self, terrain: &Terrain, field: &mut TrailField) {
        for agent in &mut self.agents {
            if agent.tick(terrain, field, &self.settings) {
                self.reached += 1;
            }
        }
    }

    pub fn reached_count(&self) -> usize {
        self.reached
    }

    /// Share of agents whose goal-seek override has fired
    pub fn goal_reached_fraction(&self) -> f32 {
        if self.is_empty() {
            return 0.0;
        }
        self.reached as f32 / self.agents.len() as f32
    }

    /// Whether the configured stop threshold has been crossed
    pub fn has_converged(&self) -> bool {
        self.goal_reached_fraction() >= self.settings.agents_reached_threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goals::GoalSet;
    use crate::settings::BoundaryBehavior;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn settings(agent_count: usize) -> SwarmSettings {
        SwarmSettings {
            agent_count,
            ..Default::default()
        }
    }

    #[test]
    fn test_update_keeps_size_and_bounds() {
        let goals = GoalSet::new(vec![Position::new(150.0, 150.0)], 10.0).unwrap();
        for boundary in [BoundaryBehavior::Clamp, BoundaryBehavior::Wrap] {
            let terrain = Terrain {
                width: 200.0,
                height: 160.0,
                boundary,
                maze: None,
                solid_walls: false,
                goals: &goals,
            };
            for n in [1, 7, 64] {
                let mut rng = StdRng::seed_from_u64(n as u64);
                let mut field = TrailField::new(200, 160, 5.0);
                let mut swarm = Swarm::new(settings(n), Position::new(5.0, 5.0), false, &mut rng).unwrap();
                for _ in 0..400 {
                    swarm.update(&terrain, &mut field);
                    assert_eq!(swarm.len(), n);
                    for agent in swarm.agents() {
                        assert!(agent.position().within(200.0, 160.0));
                    }
                }
            }
        }
    }

    #[test]
    fn test_reached_fraction_never_decreases() {
        let goals = GoalSet::new(vec![Position::new(60.0, 50.0)], 30.0).unwrap();
        let terrain = Terrain {
            width: 100.0,
            height: 100.0,
            boundary: BoundaryBehavior::Wrap,
            maze: None,
            solid_walls: false,
            goals: &goals,
        };
        let swarm_settings = SwarmSettings {
            agent_count: 40,
            food_detection_range: 30.0,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(9);
        let mut field = TrailField::new(100, 100, 5.0);
        let mut swarm = Swarm::new(swarm_settings, Position::new(50.0, 50.0), false, &mut rng).unwrap();

        let mut last = swarm.goal_reached_fraction();
        assert_eq!(last, 0.0);
        for _ in 0..300 {
            swarm.update(&terrain, &mut field);
            let now = swarm.goal_reached_fraction();
            assert!(now >= last);
            last = now;
        }
        // Every agent starts within range of the goal
        assert_eq!(swarm.reached_count(), 40);
        assert_eq!(
            swarm.agents().iter().filter(|a| a.has_reached_goal()).count(),
            swarm.reached_count()
        );
    }

    #[test]
    fn test_rejects_empty_swarm() {
        let mut rng = StdRng::seed_from_u64(0);
        let result = Swarm::new(settings(0), Position::new(1.0, 1.0), false, &mut rng);
        assert!(matches!(result, Err(SimError::InvalidConfig(_))));
    }

    #[test]
    fn test_converged_against_threshold() {
        let mut rng = StdRng::seed_from_u64(4);
        let swarm_settings = SwarmSettings {
            agent_count: 10,
            agents_reached_threshold: 0.2,
            ..Default::default()
        };
        let mut swarm = Swarm::new(swarm_settings, Position::new(1.0, 1.0), false, &mut rng).unwrap();
        assert!(!swarm.has_converged());
        swarm.reached = 2;
        assert!(swarm.has_converged());
    }
}
