//! Decorative "cells": seed points drawn as independent shapes, optionally threaded together
//! with faint lines. Deliberately not a distance-field tessellation.

use crate::color::{self, Rgba};
use crate::error::RenderResult;
use crate::layers::{self, Frame, LayerKind};
use crate::math::{dist, pi, pull_toward};
use crate::palette::Palette;
use crate::params::Params;
use crate::rand::{LayerRng, RandomSource};
use crate::surface::{self, Surface};

/// Cells closer than this are joined by a connecting line.
const LINK_DISTANCE: f64 = 200.0;
const POINTER_RADIUS: f64 = 300.0;
const POINTER_PULL: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellMode {
    Circles,
    Rectangles,
    Polygons,
    Blobs,
}

impl CellMode {
    const ALL: [CellMode; 4] = [
        CellMode::Circles,
        CellMode::Rectangles,
        CellMode::Polygons,
        CellMode::Blobs,
    ];

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "circles" => Some(CellMode::Circles),
            "rectangles" => Some(CellMode::Rectangles),
            "polygons" => Some(CellMode::Polygons),
            "blobs" => Some(CellMode::Blobs),
            _ => None,
        }
    }
}

struct Cell {
    x: f64,
    y: f64,
    radius: f64,
    rotation: f64,
    color: usize,
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
    let d = layers::density(params, LayerKind::Voronoi);
    let mut rng = LayerRng::new(params.seed(), rng);
    surface.set_alpha(opacity);

    let mode = params
        .text("voronoiMode")
        .and_then(CellMode::from_name)
        .unwrap_or_else(|| *rng.choice(&CellMode::ALL));
    let count = 10 + (d * 70.0).floor() as usize;
    let t = frame.millis() * 0.001;
    let pointer = params.pointer();

    let cells: Vec<Cell> = (0..count)
        .map(|i| {
            let mut x = rng.uniform(0.0, w);
            let mut y = rng.uniform(0.0, h);
            if frame.animating {
                x += (t + i as f64).sin() * 5.0;
                y += (t + i as f64).cos() * 5.0;
            }
            if let Some(p) = pointer {
                (x, y) = pull_toward((x, y), p, POINTER_RADIUS, POINTER_PULL);
            }
            Cell {
                x,
                y,
                radius: rng.uniform(30.0, 130.0) * (w.min(h) / 800.0).clamp(0.25, 2.0),
                rotation: rng.uniform(0.0, pi(2.0)),
                color: palette.pick_index(&mut rng),
            }
        })
        .collect();

    for cell in &cells {
        let fill = palette.rgba(cell.color);
        let alpha = rng.uniform(0.1, 0.4);
        match mode {
            CellMode::Circles => {
                surface.fill_color(&surface::circle(cell.x, cell.y, cell.radius), fill, alpha);
            }
            CellMode::Rectangles => {
                surface.save();
                surface.translate(cell.x, cell.y);
                surface.rotate(cell.rotation);
                let (rw, rh) = (cell.radius * 1.6, cell.radius * rng.uniform(0.8, 1.6));
                surface.fill_color(&surface::rect(-rw / 2.0, -rh / 2.0, rw, rh), fill, alpha);
                surface.restore();
            }
            CellMode::Polygons => {
                let sides = rng.range(5, 9);
                let points: Vec<(f64, f64)> = (0..sides)
                    .map(|i| {
                        let angle = cell.rotation + i as f64 * pi(2.0) / sides as f64;
                        let r = cell.radius * rng.uniform(0.8, 1.2);
                        (cell.x + angle.cos() * r, cell.y + angle.sin() * r)
                    })
                    .collect();
                let path = surface::polygon(&points);
                surface.fill_color(&path, fill, alpha);
                if rng.odds(0.5) {
                    let edge = palette.pick_rgba(&mut rng);
                    let edge_alpha = rng.uniform(0.3, 0.6);
                    let width = rng.uniform(0.5, 1.5);
                    surface.stroke_color(&path, edge, edge_alpha, width);
                }
            }
            CellMode::Blobs => draw_blob(surface, palette.get(cell.color), cell, &mut rng),
        }
    }

    if rng.odds(0.7) || frame.animating {
        for (i, a) in cells.iter().enumerate() {
            for b in &cells[i + 1..] {
                if dist((a.x, a.y), (b.x, b.y)) < LINK_DISTANCE {
                    let c = if rng.odds(0.5) { a.color } else { b.color };
                    let path = surface::line((a.x, a.y), (b.x, b.y));
                    surface.stroke_color(&path, palette.rgba(c), 0.2, 0.5);
                }
            }
        }
    }
    Ok(())
}

/// Overlapping translucent circles re-tinted from the cell color's HSL components.
fn draw_blob<R: RandomSource>(surface: &mut Surface, css: &str, cell: &Cell, rng: &mut R) {
    let hsl = color::hsl_components(css).unwrap_or_else(|| color::FALLBACK.to_hsl());
    let lobes = rng.range(3, 6);
    for _ in 0..lobes {
        let offset = cell.radius * rng.uniform(0.0, 0.4);
        let angle = rng.uniform(0.0, pi(2.0));
        let tint = color::hsla(
            hsl.h + rng.uniform(-10.0, 10.0),
            hsl.s,
            hsl.l + rng.uniform(-12.0, 12.0),
            rng.uniform(0.15, 0.35),
        );
        let c: Rgba = color::parse_or_fallback(&tint);
        let path = surface::circle(
            cell.x + angle.cos() * offset,
            cell.y + angle.sin() * offset,
            cell.radius * rng.uniform(0.5, 0.9),
        );
        surface.fill_color(&path, c, 1.0);
    }
}
