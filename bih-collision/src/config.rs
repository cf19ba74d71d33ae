use log::error;
use nalgebra_glm::Mat4;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// The configuration for the benchmark
#[derive(Debug, Deserialize, Serialize)]
pub struct BenchConfig {
    /// The meshes to build trees for and to run the queries against.
    pub meshes: Vec<MeshSource>,

    /// The maximal number of triangles per leaf.
    pub max_tris_per_leaf: usize,

    /// The number of random rays per mesh.
    pub num_rays: usize,

    /// The number of random swept spheres per mesh.
    pub num_sweeps: usize,

    /// The radius of the swept spheres.
    pub sweep_radius: f32,

    /// The seed for the random queries and meshes.
    pub seed: u64,

    /// Should every query be compared against the naive collider
    #[serde(default)]
    pub verify: bool,

    /// Should the trees be written to the output directory and read back
    #[serde(default)]
    pub write_trees: bool,

    /// The transformation of the meshes into world space. Identity if not set.
    #[serde(default)]
    pub transform: Option<Mat4>,
}

impl BenchConfig {
    /// Reads the configuration from the provided reader.
    ///
    /// # Arguments
    /// * `reader` - The reader to read the configuration from.
    pub fn read<R: std::io::Read>(reader: R) -> Result<Self> {
        let config: BenchConfig = serde_yaml::from_reader(reader).map_err(|e| {
            error!("Failed to parse the configuration: {:?}", e);

            Error::DeserializationError(Box::new(e))
        })?;

        if config.max_tris_per_leaf < 1 {
            return Err(Error::InvalidArgument(
                "max_tris_per_leaf must be at least 1".to_owned(),
            ));
        }

        Ok(config)
    }

    /// Writes the configuration to the provided writer.
    ///
    /// # Arguments
    /// * `writer` - The writer to write the configuration to.
    pub fn write<W: std::io::Write>(&self, mut writer: W) -> Result<()> {
        let yaml = serde_yaml::to_string(&self).map_err(|e| {
            error!("Failed to serialize the configuration: {:?}", e);

            Error::SerializationError(Box::new(e))
        })?;

        writer.write_all(yaml.as_bytes())?;

        Ok(())
    }
}

/// Where the triangles of a benchmark mesh come from.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MeshSource {
    /// A grid of unit cubes on the xz-plane.
    CubeGrid { count: usize, spacing: f32 },

    /// Randomly placed triangles.
    RandomSoup {
        num_triangles: usize,
        extent: f32,
        triangle_size: f32,
    },

    /// Meshes written with `Mesh::write`, e.g., `meshes/*.bin`. All matching files are merged
    /// into a single mesh.
    Files { pattern: String },
}

impl MeshSource {
    /// Returns a short description of the source for logging.
    pub fn describe(&self) -> String {
        match self {
            MeshSource::CubeGrid { count, spacing } => {
                format!("cube grid ({} cubes, spacing {})", count, spacing)
            }
            MeshSource::RandomSoup { num_triangles, .. } => {
                format!("random soup ({} triangles)", num_triangles)
            }
            MeshSource::Files { pattern } => format!("files '{}'", pattern),
        }
    }
}
