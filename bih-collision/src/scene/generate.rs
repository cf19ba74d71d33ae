use std::ops::Range;

use nalgebra_glm::Vec3;
use rand::Rng;

use super::Mesh;

/// The corner indices of the six quads of a cube. Bit k of a corner index selects the upper
/// coordinate along axis k.
const CUBE_QUADS: [[u32; 4]; 6] = [
    [0, 2, 6, 4],
    [1, 5, 7, 3],
    [0, 4, 5, 1],
    [2, 3, 7, 6],
    [0, 1, 3, 2],
    [4, 6, 7, 5],
];

/// Creates an axis-aligned cube consisting of 12 triangles.
///
/// # Arguments
/// * `min` - The corner of the cube with the lowest coordinates.
/// * `size` - The edge length of the cube.
pub fn cube(min: &Vec3, size: f32) -> Mesh {
    let vertices = (0..8)
        .map(|i| {
            min + Vec3::new(
                (i & 1) as f32 * size,
                ((i >> 1) & 1) as f32 * size,
                ((i >> 2) & 1) as f32 * size,
            )
        })
        .collect();

    let indices = CUBE_QUADS
        .iter()
        .flat_map(|q| [q[0], q[1], q[2], q[0], q[2], q[3]])
        .collect();

    Mesh::new(vertices, indices)
}

/// Returns the minimum corner of the i-th unit cube of a cube grid.
///
/// # Arguments
/// * `count` - The total number of cubes in the grid.
/// * `spacing` - The distance between the minimum corners of neighboring cubes.
/// * `i` - The index of the cube.
pub fn cube_grid_cell(count: usize, spacing: f32, i: usize) -> Vec3 {
    let side = (count as f32).sqrt().ceil().max(1f32) as usize;
    let x = (i % side) as f32;
    let z = (i / side) as f32;

    Vec3::new(x * spacing, 0f32, z * spacing)
}

/// Creates a square grid of unit cubes on the xz-plane. The triangles of the i-th cube are the
/// triangles 12 * i to 12 * i + 11.
///
/// # Arguments
/// * `count` - The number of cubes.
/// * `spacing` - The distance between the minimum corners of neighboring cubes.
pub fn cube_grid(count: usize, spacing: f32) -> Mesh {
    let mut mesh = Mesh::default();

    for i in 0..count {
        mesh.append(&cube(&cube_grid_cell(count, spacing, i), 1f32));
    }

    mesh
}

/// Creates a soup of random, unconnected triangles.
///
/// # Arguments
/// * `rng` - The random number generator.
/// * `num_triangles` - The number of triangles to create.
/// * `r` - The range in which the triangle centers are located on each axis.
/// * `triangle_size` - The maximal offset of a vertex from its triangle center on each axis.
pub fn random_soup<R: Rng>(
    rng: &mut R,
    num_triangles: usize,
    r: Range<f32>,
    triangle_size: f32,
) -> Mesh {
    let mut vertices = Vec::with_capacity(num_triangles * 3);

    for _ in 0..num_triangles {
        let center = Vec3::new(
            rng.random_range(r.clone()),
            rng.random_range(r.clone()),
            rng.random_range(r.clone()),
        );

        for _ in 0..3 {
            vertices.push(
                center
                    + Vec3::new(
                        rng.random_range(-triangle_size..triangle_size),
                        rng.random_range(-triangle_size..triangle_size),
                        rng.random_range(-triangle_size..triangle_size),
                    ),
            );
        }
    }

    let indices = (0..vertices.len() as u32).collect();

    Mesh::new(vertices, indices)
}
