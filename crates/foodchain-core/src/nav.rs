//! Terrain and the kinematic navigation body.
//!
//! The world is a square of side `2 * half_extent` with circular obstacles.
//! [`NavBody`] implements the agents' [`MovementPort`] with straight-line
//! motion: each step moves toward the destination at the commanded speed,
//! and a step that would end inside an obstacle or outside the bounds is
//! not taken. A body pressed against an obstacle therefore stops making
//! progress, which is what the agents' stuck detection reacts to.

use std::sync::Arc;

use foodchain_agents::MovementPort;
use foodchain_types::Vec2;
use rand::Rng;

/// A circular obstacle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    /// Center on the ground plane.
    pub center: Vec2,
    /// Radius.
    pub radius: f32,
}

impl Obstacle {
    fn contains(&self, point: Vec2) -> bool {
        point.distance(self.center) < self.radius
    }
}

/// Walkable area of the world.
#[derive(Debug, Clone, PartialEq)]
pub struct Terrain {
    half_extent: f32,
    obstacles: Vec<Obstacle>,
}

impl Terrain {
    /// An open square with no obstacles.
    pub fn open(half_extent: f32) -> Self {
        Self {
            half_extent: half_extent.abs(),
            obstacles: Vec::new(),
        }
    }

    /// A square with the given obstacles.
    pub fn with_obstacles(half_extent: f32, obstacles: Vec<Obstacle>) -> Self {
        Self {
            half_extent: half_extent.abs(),
            obstacles,
        }
    }

    /// Scatter `count` obstacles with radii in `[min_radius, max_radius]`,
    /// keeping `keep_clear` free of obstacles.
    pub fn generate(
        rng: &mut impl Rng,
        half_extent: f32,
        count: u32,
        min_radius: f32,
        max_radius: f32,
        keep_clear: Vec2,
    ) -> Self {
        let half_extent = half_extent.abs();
        let min_radius = if min_radius.is_finite() {
            min_radius.max(0.1)
        } else {
            0.1
        };
        let max_radius = if max_radius.is_finite() {
            max_radius.max(min_radius)
        } else {
            min_radius
        };
        let mut obstacles = Vec::new();
        for _ in 0..count {
            let radius = rng.random_range(min_radius..=max_radius);
            let center = Vec2::new(
                rng.random_range(-half_extent..=half_extent),
                rng.random_range(-half_extent..=half_extent),
            );
            if center.distance(keep_clear) > radius + 2.0 {
                obstacles.push(Obstacle { center, radius });
            }
        }
        tracing::debug!(obstacles = obstacles.len(), half_extent, "Terrain generated");
        Self {
            half_extent,
            obstacles,
        }
    }

    /// Half the side length of the square.
    pub const fn half_extent(&self) -> f32 {
        self.half_extent
    }

    /// The obstacles.
    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    /// Whether `point` lies inside the bounds.
    pub fn in_bounds(&self, point: Vec2) -> bool {
        point.is_finite() && point.x.abs() <= self.half_extent && point.z.abs() <= self.half_extent
    }

    /// Whether `point` is walkable.
    pub fn is_navigable(&self, point: Vec2) -> bool {
        self.in_bounds(point) && !self.obstacles.iter().any(|o| o.contains(point))
    }

    /// The closest walkable point to `point`, if one lies within
    /// `max_distance`.
    ///
    /// The point is clamped into the bounds and pushed out of any obstacle
    /// along the line from the obstacle's center.
    pub fn nearest_navigable(&self, point: Vec2, max_distance: f32) -> Option<Vec2> {
        if !point.is_finite() {
            return None;
        }
        let margin = 0.05;
        let edge = (self.half_extent - margin).max(0.0);
        let mut candidate = Vec2::new(point.x.clamp(-edge, edge), point.z.clamp(-edge, edge));
        for obstacle in &self.obstacles {
            if obstacle.contains(candidate) {
                let dir = (candidate - obstacle.center)
                    .normalized()
                    .unwrap_or(Vec2::new(1.0, 0.0));
                candidate = obstacle.center + dir.scale(obstacle.radius + margin);
            }
        }
        (self.is_navigable(candidate) && candidate.distance(point) <= max_distance.max(0.0))
            .then_some(candidate)
    }
}

/// A body moving in straight lines across a [`Terrain`].
#[derive(Debug, Clone)]
pub struct NavBody {
    terrain: Arc<Terrain>,
    position: Vec2,
    destination: Option<Vec2>,
    stopped: bool,
    speed: f32,
    velocity: Vec2,
}

impl NavBody {
    /// Place a body at `position`.
    pub const fn new(terrain: Arc<Terrain>, position: Vec2) -> Self {
        Self {
            terrain,
            position,
            destination: None,
            stopped: false,
            speed: 0.0,
            velocity: Vec2::ZERO,
        }
    }

    /// Current destination, if any.
    pub const fn destination(&self) -> Option<Vec2> {
        self.destination
    }

    /// Move for `dt` seconds. Arriving clears the destination; a blocked
    /// step leaves the body where it is.
    pub fn advance(&mut self, dt: f32) {
        self.velocity = Vec2::ZERO;
        let Some(dest) = self.destination else {
            return;
        };
        if self.stopped || dt <= 0.0 {
            return;
        }
        let to_dest = dest - self.position;
        let remaining = to_dest.length();
        let step = self.speed * dt;
        let next = if remaining <= step {
            dest
        } else {
            match to_dest.normalized() {
                Some(dir) => self.position + dir.scale(step),
                None => dest,
            }
        };
        if !self.terrain.is_navigable(next) {
            return;
        }
        self.velocity = (next - self.position).scale(dt.recip());
        self.position = next;
        if remaining <= step {
            self.destination = None;
        }
    }
}

impl MovementPort for NavBody {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn set_destination(&mut self, point: Vec2) -> bool {
        if self.terrain.is_navigable(point) {
            self.destination = Some(point);
            true
        } else {
            self.destination = None;
            false
        }
    }

    fn clear_path(&mut self) {
        self.destination = None;
    }

    fn stop(&mut self) {
        self.stopped = true;
    }

    fn resume(&mut self) {
        self.stopped = false;
    }

    fn is_stopped(&self) -> bool {
        self.stopped
    }

    fn has_path(&self) -> bool {
        self.destination.is_some()
    }

    fn remaining_distance(&self) -> f32 {
        self.destination
            .map_or(0.0, |dest| dest.distance(self.position))
    }

    fn speed(&self) -> f32 {
        self.speed
    }

    fn set_speed(&mut self, speed: f32) {
        self.speed = speed.max(0.0);
    }

    fn velocity(&self) -> Vec2 {
        self.velocity
    }

    fn is_on_navigable_surface(&self) -> bool {
        self.terrain.is_navigable(self.position)
    }

    fn nearest_navigable(&self, point: Vec2, max_distance: f32) -> Option<Vec2> {
        self.terrain.nearest_navigable(point, max_distance)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    fn walled() -> Arc<Terrain> {
        Arc::new(Terrain::with_obstacles(
            20.0,
            vec![Obstacle {
                center: Vec2::new(5.0, 0.0),
                radius: 2.0,
            }],
        ))
    }

    #[test]
    fn body_walks_to_destination_and_arrives() {
        let mut body = NavBody::new(Arc::new(Terrain::open(20.0)), Vec2::ZERO);
        body.set_speed(2.0);
        assert!(body.set_destination(Vec2::new(1.0, 0.0)));
        body.advance(0.25);
        assert!((body.position().x - 0.5).abs() < 1e-5);
        assert!((body.velocity().length() - 2.0).abs() < 1e-4);
        body.advance(0.5);
        assert!(!body.has_path());
        assert!((body.position().x - 1.0).abs() < 1e-5);
    }

    #[test]
    fn stopped_body_does_not_move() {
        let mut body = NavBody::new(Arc::new(Terrain::open(20.0)), Vec2::ZERO);
        body.set_speed(2.0);
        body.set_destination(Vec2::new(5.0, 0.0));
        body.stop();
        body.advance(1.0);
        assert_eq!(body.position(), Vec2::ZERO);
        assert!(body.has_path());
        body.resume();
        body.advance(1.0);
        assert!(body.position().x > 1.0);
    }

    #[test]
    fn obstacle_blocks_straight_line_motion() {
        let mut body = NavBody::new(walled(), Vec2::ZERO);
        body.set_speed(2.0);
        assert!(body.set_destination(Vec2::new(10.0, 0.0)));
        for _ in 0..50 {
            body.advance(0.1);
        }
        assert!(body.position().x < 3.0);
        assert!(body.has_path());
        assert_eq!(body.velocity(), Vec2::ZERO);
    }

    #[test]
    fn destinations_inside_obstacles_are_refused() {
        let mut body = NavBody::new(walled(), Vec2::ZERO);
        assert!(!body.set_destination(Vec2::new(5.0, 0.5)));
        assert!(!body.has_path());
    }

    #[test]
    fn nearest_navigable_pushes_out_of_obstacles_and_bounds() {
        let terrain = walled();
        let outside = terrain.nearest_navigable(Vec2::new(5.5, 0.0), 5.0).unwrap();
        assert!(terrain.is_navigable(outside));
        assert!(outside.distance(Vec2::new(5.0, 0.0)) >= 2.0);

        let clamped = terrain.nearest_navigable(Vec2::new(25.0, 0.0), 10.0).unwrap();
        assert!(clamped.x <= 20.0);
        assert!(terrain.nearest_navigable(Vec2::new(60.0, 0.0), 1.0).is_none());
    }

    #[test]
    fn generated_obstacles_leave_spawn_clear() {
        let mut rng = SmallRng::seed_from_u64(3);
        let terrain = Terrain::generate(&mut rng, 30.0, 40, 1.0, 3.0, Vec2::ZERO);
        assert!(terrain.is_navigable(Vec2::ZERO));
        assert!(terrain.obstacles().len() <= 40);
    }

    #[test]
    fn infinite_obstacle_radius_falls_back_to_the_minimum() {
        let mut rng = SmallRng::seed_from_u64(5);
        let terrain = Terrain::generate(&mut rng, 30.0, 10, 1.5, f32::INFINITY, Vec2::ZERO);
        assert!(
            terrain
                .obstacles()
                .iter()
                .all(|o| (o.radius - 1.5).abs() < f32::EPSILON)
        );
    }
}
