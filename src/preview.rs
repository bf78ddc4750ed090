//! CPU preview renderer for shaded orb buffers.
//!
//! A small scanline-free rasterizer: per-triangle bounding boxes, edge
//! functions, Gouraud colours interpolated affinely in screen space. It
//! stands in for a GPU pipeline when recording frames or taking snapshots.

use std::path::Path;

use glam::{Mat4, Vec2, Vec3, Vec4};
use image::{Rgba, RgbaImage};

use crate::error::Result;
use crate::orb::{rgb, ShadedVertex};
use crate::params::{parse_hex_color, RenderConfig};

/// Clip-space w below which a vertex counts as behind the camera
const MIN_CLIP_W: f32 = 1e-4;

#[derive(Clone, Copy, Debug)]
struct ScreenVertex {
    position: Vec2,
    depth: f32,
    color: Vec4,
    visible: bool,
}

/// Which triangle side a pass draws
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Cull {
    /// Draw front faces only
    Back,
    /// Draw back faces only
    Front,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Blend {
    /// `src * a + dst * (1 - a)`, depth tested and written
    Alpha,
    /// `src * a + dst`, no depth test
    Additive,
}

/// Software framebuffer with colour and depth
pub struct PreviewRenderer {
    width: u32,
    height: u32,
    background: Vec3,
    color: Vec<Vec3>,
    depth: Vec<f32>,
    projected: Vec<ScreenVertex>,
}

impl PreviewRenderer {
    pub fn new(config: &RenderConfig) -> Result<Self> {
        config.validate()?;
        let background = rgb(parse_hex_color(&config.background)?);
        let pixels = config.width as usize * config.height as usize;

        Ok(Self {
            width: config.width,
            height: config.height,
            background,
            color: vec![background; pixels],
            depth: vec![f32::INFINITY; pixels],
            projected: Vec::new(),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Reset colour to the background and depth to infinity
    pub fn clear(&mut self) {
        self.color.fill(self.background);
        self.depth.fill(f32::INFINITY);
    }

    /// Additive back-face pass for the halo shell; draw before the orb
    pub fn draw_halo(&mut self, vertices: &[ShadedVertex], indices: &[u32], view_proj: Mat4) {
        self.draw(vertices, indices, view_proj, Cull::Front, Blend::Additive);
    }

    /// Depth-tested, alpha-blended front-face pass for the orb surface
    pub fn draw_orb(&mut self, vertices: &[ShadedVertex], indices: &[u32], view_proj: Mat4) {
        self.draw(vertices, indices, view_proj, Cull::Back, Blend::Alpha);
    }

    fn draw(
        &mut self,
        vertices: &[ShadedVertex],
        indices: &[u32],
        view_proj: Mat4,
        cull: Cull,
        blend: Blend,
    ) {
        let (w, h) = (self.width as f32, self.height as f32);

        self.projected.clear();
        self.projected.extend(vertices.iter().map(|v| {
            let clip = view_proj * Vec3::from_array(v.position).extend(1.0);
            let visible = clip.w > MIN_CLIP_W;
            let ndc = clip.truncate() / clip.w.max(MIN_CLIP_W);
            ScreenVertex {
                // Y flips: NDC up is screen down
                position: Vec2::new((ndc.x * 0.5 + 0.5) * w, (0.5 - ndc.y * 0.5) * h),
                depth: ndc.z,
                color: Vec4::from_array(v.color),
                visible,
            }
        }));

        let mut skipped = 0usize;
        for tri in indices.chunks_exact(3) {
            let corners = [tri[0], tri[1], tri[2]].map(|i| self.projected.get(i as usize).copied());
            let [Some(a), Some(b), Some(c)] = corners else {
                skipped += 1;
                continue;
            };
            if !(a.visible && b.visible && c.visible) {
                continue;
            }

            let area = edge(a.position, b.position, c.position);
            // Counter-clockwise in NDC is clockwise on screen
            let front_facing = area < 0.0;
            let keep = match cull {
                Cull::Back => front_facing,
                Cull::Front => !front_facing && area != 0.0,
            };
            if keep {
                self.fill_triangle(a, b, c, area, blend);
            }
        }

        if skipped > 0 {
            log::warn!("Skipped {} triangles with out-of-range indices", skipped);
        }
    }

    fn fill_triangle(
        &mut self,
        a: ScreenVertex,
        b: ScreenVertex,
        c: ScreenVertex,
        area: f32,
        blend: Blend,
    ) {
        let min = a.position.min(b.position).min(c.position).floor().max(Vec2::ZERO);
        let max = a
            .position
            .max(b.position)
            .max(c.position)
            .ceil()
            .min(Vec2::new(self.width as f32, self.height as f32));
        if min.x >= max.x || min.y >= max.y {
            return;
        }

        for y in min.y as u32..max.y as u32 {
            for x in min.x as u32..max.x as u32 {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let wa = edge(b.position, c.position, p) / area;
                let wb = edge(c.position, a.position, p) / area;
                let wc = edge(a.position, b.position, p) / area;
                if wa < 0.0 || wb < 0.0 || wc < 0.0 {
                    continue;
                }

                let index = (y * self.width + x) as usize;
                let src = a.color * wa + b.color * wb + c.color * wc;
                let alpha = src.w.clamp(0.0, 1.0);

                match blend {
                    Blend::Alpha => {
                        let depth = a.depth * wa + b.depth * wb + c.depth * wc;
                        if depth >= self.depth[index] {
                            continue;
                        }
                        self.depth[index] = depth;
                        let dst = self.color[index];
                        self.color[index] = src.truncate() * alpha + dst * (1.0 - alpha);
                    }
                    Blend::Additive => {
                        self.color[index] += src.truncate() * alpha;
                    }
                }
            }
        }
    }

    /// Colour of one pixel, unclamped
    pub fn pixel(&self, x: u32, y: u32) -> Option<Vec3> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.color[(y * self.width + x) as usize])
    }

    /// Tone-clamp the framebuffer into an 8-bit image
    pub fn to_image(&self) -> RgbaImage {
        RgbaImage::from_fn(self.width, self.height, |x, y| {
            let c = self.color[(y * self.width + x) as usize];
            let [r, g, b] = c.to_array().map(to_byte);
            Rgba([r, g, b, 255])
        })
    }

    /// Save the framebuffer as PNG
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        self.to_image().save(path)?;
        Ok(())
    }
}

fn to_byte(channel: f32) -> u8 {
    if channel.is_nan() {
        return 0;
    }
    (channel.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Twice the signed area of (a, b, p)
fn edge(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}
