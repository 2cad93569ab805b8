//! Particle kinematics and lifecycle
//!
//! Each particle fades in, holds, then fades out over a randomized lifespan.
//! `life` only ever grows (by `fadeSpeed` per tick); opacity is a pure
//! function of `life / max_life`.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::sampler::SpawnPoint;
use crate::consts::RETURN_GAIN;
use crate::settings::Config;

/// Stage of a particle's life
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifePhase {
    FadingIn,
    Stable,
    FadingOut,
    Expired,
}

/// Mouse position with the radius it influences particles within
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseInfluence {
    pub pos: Vec2,
    pub radius: f32,
}

/// Opacity for a life fraction: linear ramp up across the fade-in window,
/// 1 while stable, linear ramp down across the fade-out window
pub fn lifecycle_alpha(life: f32, max_life: f32, fade_in: f32, fade_out: f32) -> f32 {
    if max_life <= 0.0 || life >= max_life {
        return 0.0;
    }
    let fade_in_end = max_life * fade_in;
    let fade_out_start = max_life * (1.0 - fade_out);

    let alpha = if life < fade_in_end {
        life / fade_in_end
    } else if life > fade_out_start {
        (max_life - life) / (max_life * fade_out)
    } else {
        1.0
    };
    alpha.clamp(0.0, 1.0)
}

/// A single particle in the field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub id: u32,
    pub pos: Vec2,
    /// Where the particle spawned; the return force pulls toward it
    pub start_pos: Vec2,
    pub vel: Vec2,
    /// Acceleration applied on the last update
    pub acc: Vec2,
    /// Sampled size (render multiplies by `particleSize`)
    pub size: f32,
    /// RGB in 0..1
    pub color: [f32; 3],
    /// Elapsed life, in `fadeSpeed` units
    pub life: f32,
    pub max_life: f32,
    pub alpha: f32,
    pub distance_traveled: f32,
    /// Ids of particles currently connected to this one
    #[serde(skip)]
    pub neighbors: BTreeSet<u32>,
}

impl Particle {
    pub fn new(
        id: u32,
        spawn: &SpawnPoint,
        color: [f32; 3],
        vel: Vec2,
        life: f32,
        max_life: f32,
        config: &Config,
    ) -> Self {
        let mut particle = Self {
            id,
            pos: spawn.pos,
            start_pos: spawn.pos,
            vel,
            acc: Vec2::ZERO,
            size: spawn.size,
            color,
            life: life.clamp(0.0, max_life),
            max_life,
            alpha: 0.0,
            distance_traveled: 0.0,
            neighbors: BTreeSet::new(),
        };
        particle.refresh_alpha(config);
        particle
    }

    /// Elapsed fraction of the lifespan, 1.0 once expired
    pub fn life_fraction(&self) -> f32 {
        if self.max_life <= 0.0 {
            1.0
        } else {
            (self.life / self.max_life).min(1.0)
        }
    }

    pub fn is_expired(&self) -> bool {
        self.life >= self.max_life
    }

    pub fn phase(&self, config: &Config) -> LifePhase {
        let f = self.life_fraction();
        if self.is_expired() {
            LifePhase::Expired
        } else if f < config.fade_in_duration {
            LifePhase::FadingIn
        } else if f > 1.0 - config.fade_out_duration {
            LifePhase::FadingOut
        } else {
            LifePhase::Stable
        }
    }

    pub fn refresh_alpha(&mut self, config: &Config) {
        self.alpha = lifecycle_alpha(
            self.life,
            self.max_life,
            config.fade_in_duration,
            config.fade_out_duration,
        );
    }

    /// Advance one tick. Returns false once the particle has expired.
    pub fn update(&mut self, mouse: Option<MouseInfluence>, canvas: Vec2, config: &Config) -> bool {
        if let Some(mouse) = mouse {
            self.apply_mouse(mouse, config);
        }

        self.acc = self.return_acceleration(config);
        self.vel += self.acc;

        self.vel *= 1.0 - config.friction.clamp(0.0, 1.0);

        self.pos += self.vel;
        self.bounce_off_walls(canvas, config.momentum.clamp(0.0, 1.0));

        self.life += config.fade_speed.max(0.0);
        self.distance_traveled += self.vel.length();
        self.refresh_alpha(config);

        !self.is_expired()
    }

    /// Blend mouse attraction and repulsion into the velocity
    fn apply_mouse(&mut self, mouse: MouseInfluence, config: &Config) {
        let radius = mouse.radius;
        if radius <= 0.0 {
            return;
        }
        let delta = mouse.pos - self.pos;
        let distance = delta.length();
        if distance <= 0.0 || distance >= radius {
            return;
        }

        let dir = delta / distance;
        let falloff = distance / radius;
        let attraction = config.attraction_strength * (1.0 - falloff);
        let repulsion = config.repulsion_strength * falloff;

        self.vel = self.vel * config.attraction_momentum + dir * (attraction - repulsion);
    }

    /// Pull back toward the spawn point once past `maxTravelDistance`
    fn return_acceleration(&self, config: &Config) -> Vec2 {
        let max = config.max_travel_distance;
        if max <= 0.0 {
            return Vec2::ZERO;
        }
        let offset = self.pos - self.start_pos;
        let distance = offset.length();
        if distance <= max {
            return Vec2::ZERO;
        }
        let overshoot = ((distance - max) / max).min(1.0);
        -(offset / distance) * RETURN_GAIN * config.travel_speed * overshoot
    }

    fn bounce_off_walls(&mut self, canvas: Vec2, retain: f32) {
        if self.pos.x < 0.0 {
            self.pos.x = 0.0;
            self.vel.x = -self.vel.x * retain;
        } else if self.pos.x > canvas.x {
            self.pos.x = canvas.x.max(0.0);
            self.vel.x = -self.vel.x * retain;
        }
        if self.pos.y < 0.0 {
            self.pos.y = 0.0;
            self.vel.y = -self.vel.y * retain;
        } else if self.pos.y > canvas.y {
            self.pos.y = canvas.y.max(0.0);
            self.vel.y = -self.vel.y * retain;
        }
    }
}
