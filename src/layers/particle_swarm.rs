//! Glowing particles. On animation frames each particle drifts along its velocity and bounces
//! off the canvas edges; positions are a closed-form function of elapsed time, so frames can be
//! drawn independently.

use crate::error::RenderResult;
use crate::layers::{self, Frame, LayerKind};
use crate::math::{bounce, dist};
use crate::palette::Palette;
use crate::params::Params;
use crate::rand::{LayerRng, RandomSource};
use crate::surface::{self, Surface};

/// Velocities are in pixels per 60 Hz frame.
const FRAMES_PER_SECOND: f64 = 60.0;
const REPEL_RADIUS: f64 = 200.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub vx: f64,
    pub vy: f64,
    pub color: usize,
}

impl Particle {
    /// Position after `seconds` of drift inside a `w`×`h` box.
    pub fn position_at(&self, seconds: f64, w: f64, h: f64) -> (f64, f64) {
        let frames = seconds * FRAMES_PER_SECOND;
        (
            bounce(self.x + self.vx * frames, w),
            bounce(self.y + self.vy * frames, h),
        )
    }
}

pub fn spawn<R: RandomSource>(
    count: usize,
    w: f64,
    h: f64,
    palette: &Palette,
    rng: &mut R,
) -> Vec<Particle> {
    (0..count)
        .map(|_| Particle {
            x: rng.uniform(0.0, w),
            y: rng.uniform(0.0, h),
            radius: rng.uniform(1.0, 6.0),
            color: palette.pick_index(&mut *rng),
            vx: (rng.rnd() - 0.5) * 2.0,
            vy: (rng.rnd() - 0.5) * 2.0,
        })
        .collect()
}

pub fn render(
    surface: &mut Surface,
    palette: &Palette,
    frame: &Frame,
    params: &Params,
    opacity: f64,
    rng: &mut dyn RandomSource,
) -> RenderResult<()> {
    let (w, h) = layers::canvas(surface, params)?;
    let d = layers::density(params, LayerKind::ParticleSwarm);
    let mut rng = LayerRng::new(params.seed(), rng);
    surface.set_alpha(opacity);

    let count = 50 + (d * 200.0).floor() as usize;
    let particles = spawn(count, w, h, palette, &mut rng);
    let seconds = frame.seconds();
    let pointer = params.pointer();

    for particle in &particles {
        let color = palette.rgba(particle.color);
        let mut pos = particle.position_at(seconds, w, h);
        if let Some(p) = pointer {
            let distance = dist(pos, p);
            if distance < REPEL_RADIUS {
                let push = (1.0 - distance / REPEL_RADIUS) * 20.0;
                let angle = (pos.1 - p.1).atan2(pos.0 - p.0);
                pos = (pos.0 + angle.cos() * push, pos.1 + angle.sin() * push);
            }
        }

        if frame.animating {
            let trail = particle.position_at((seconds - 0.15).max(0.0), w, h);
            if dist(trail, pos) < 20.0 {
                surface.stroke_color(&surface::line(trail, pos), color, 0.3, particle.radius * 0.5);
            }
        }

        surface.fill_color(&surface::circle(pos.0, pos.1, particle.radius), color, 1.0);
        let glow = surface::radial_gradient(
            &[(0.0, color), (1.0, color.with_alpha(0.0))],
            1.0,
            pos,
            particle.radius * 2.0,
        );
        surface.fill(&surface::circle(pos.0, pos.1, particle.radius * 2.0), &glow);
    }
    Ok(())
}
