//! Application-supplied vertex lists.
//!
//! A [`Geometry`] is built once and handed to the render core, which copies it
//! into a GPU buffer at initialization. The vertex list is shared and never
//! mutated afterwards.

use std::sync::Arc;

use crate::coords::{ColorRgba, Vec2};

use super::Vertex;

/// Immutable vertex list plus the primitive topology used to draw it.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    vertices: Arc<[Vertex]>,
    topology: wgpu::PrimitiveTopology,
}

impl Geometry {
    pub fn new(vertices: impl Into<Arc<[Vertex]>>, topology: wgpu::PrimitiveTopology) -> Self {
        Self {
            vertices: vertices.into(),
            topology,
        }
    }

    /// A single triangle, red/green/blue corners, 500 px wide.
    pub fn triangle() -> Self {
        let vertices = [
            Vertex::new(Vec2::new(250.0, -250.0), ColorRgba::RED),
            Vertex::new(Vec2::new(-250.0, -250.0), ColorRgba::GREEN),
            Vertex::new(Vec2::new(0.0, 250.0), ColorRgba::BLUE),
        ];
        Self::new(vertices, wgpu::PrimitiveTopology::TriangleList)
    }

    /// Connected line segments through `points`, all in one color.
    pub fn line_strip(points: &[Vec2], color: ColorRgba) -> Self {
        let vertices: Vec<Vertex> = points.iter().map(|&p| Vertex::new(p, color)).collect();
        Self::new(vertices, wgpu::PrimitiveTopology::LineStrip)
    }

    /// Grid of colored quads, two triangles each, centered on the origin.
    ///
    /// Produces `columns * rows * 6` vertices.
    pub fn quad_grid(grid: QuadGrid) -> Self {
        let QuadGrid {
            columns,
            rows,
            quad_size,
            spacing,
        } = grid;

        let half = quad_size * 0.5;
        let corners = [
            Vec2::new(-half, half),
            Vec2::new(-half, -half),
            Vec2::new(half, -half),
            Vec2::new(half, -half),
            Vec2::new(half, half),
            Vec2::new(-half, half),
        ];

        let origin = Vec2::new(
            -(columns as f32) * spacing * 0.5 + spacing * 0.5,
            -(rows as f32) * spacing * 0.5 + spacing * 0.5,
        );

        let mut vertices = Vec::with_capacity(grid.vertex_count());
        for row in 0..rows {
            for column in 0..columns {
                let center = origin + Vec2::new(column as f32 * spacing, row as f32 * spacing);
                let color = if (row + column) % 2 == 0 {
                    ColorRgba::GREEN
                } else {
                    ColorRgba::RED
                };
                vertices.extend(corners.iter().map(|&c| Vertex::new(center + c, color)));
            }
        }

        Self::new(vertices, wgpu::PrimitiveTopology::TriangleList)
    }

    #[inline]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn topology(&self) -> wgpu::PrimitiveTopology {
        self.topology
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

/// Layout of [`Geometry::quad_grid`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct QuadGrid {
    pub columns: u32,
    pub rows: u32,
    /// Edge length of one quad in pixels.
    pub quad_size: f32,
    /// Distance between neighbouring quad centers in pixels.
    pub spacing: f32,
}

impl QuadGrid {
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.columns as usize * self.rows as usize * 6
    }
}

impl Default for QuadGrid {
    fn default() -> Self {
        Self {
            columns: 25,
            rows: 15,
            quad_size: 40.0,
            spacing: 50.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triangle_has_three_colored_corners() {
        let g = Geometry::triangle();
        assert_eq!(g.vertex_count(), 3);
        assert_eq!(g.topology(), wgpu::PrimitiveTopology::TriangleList);
        assert_eq!(g.vertices()[0].color, ColorRgba::RED.to_array());
        assert_eq!(g.vertices()[2].position, [0.0, 250.0]);
    }

    #[test]
    fn quad_grid_vertex_count() {
        let grid = QuadGrid::default();
        let g = Geometry::quad_grid(grid);
        assert_eq!(g.vertices().len(), 25 * 15 * 6);
        assert_eq!(g.vertices().len(), grid.vertex_count());
        // Larger than the 4 KiB limit for inline vertex bytes on some backends.
        assert!(g.vertices().len() * std::mem::size_of::<Vertex>() > 4096);
    }

    #[test]
    fn quad_grid_is_centered() {
        let g = Geometry::quad_grid(QuadGrid {
            columns: 2,
            rows: 2,
            quad_size: 10.0,
            spacing: 20.0,
        });
        let (sum_x, sum_y) = g
            .vertices()
            .iter()
            .fold((0.0, 0.0), |(x, y), v| (x + v.position[0], y + v.position[1]));
        assert_eq!(sum_x, 0.0);
        assert_eq!(sum_y, 0.0);
    }

    #[test]
    fn quad_grid_alternates_colors() {
        let g = Geometry::quad_grid(QuadGrid {
            columns: 2,
            rows: 1,
            quad_size: 10.0,
            spacing: 20.0,
        });
        assert_eq!(g.vertices()[0].color, ColorRgba::GREEN.to_array());
        assert_eq!(g.vertices()[6].color, ColorRgba::RED.to_array());
    }

    #[test]
    fn empty_grid_is_empty() {
        let g = Geometry::quad_grid(QuadGrid {
            columns: 0,
            ..QuadGrid::default()
        });
        assert!(g.is_empty());
    }

    #[test]
    fn line_strip_uses_strip_topology() {
        let g = Geometry::line_strip(
            &[Vec2::new(-100.0, 0.0), Vec2::new(0.0, 100.0), Vec2::new(100.0, 0.0)],
            ColorRgba::white(),
        );
        assert_eq!(g.vertex_count(), 3);
        assert_eq!(g.topology(), wgpu::PrimitiveTopology::LineStrip);
    }
}
