use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::{Path, PathBuf},
};

use log::{error, info, warn};
use nalgebra_glm::{Mat4, Vec3};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::{
    math::{Ray, SweepSphere, AABB},
    scene::{cube_grid, random_soup},
    BIHOptions, BIHTree, BenchConfig, Collidable, Collider, CollisionResults, Error, Mesh,
    MeshSource, NaiveCollider, QueryScratch, QueryStats, Result, StatsNode, StatsNodeTrait,
};

/// The outcome of the benchmark for a single mesh.
#[derive(Debug, Clone, Default)]
pub struct MeshReport {
    /// The description of the mesh source.
    pub name: String,

    pub num_triangles: usize,
    pub num_nodes: usize,
    pub depth: usize,

    /// The total number of ray hits.
    pub ray_hits: usize,

    /// The total number of swept sphere contacts.
    pub sweep_contacts: usize,

    /// The accumulated traversal stats of all queries.
    pub query_stats: QueryStats,

    /// The number of queries whose contacts differ from the naive collider.
    pub mismatches: usize,
}

/// The outcome of a benchmark run.
#[derive(Debug, Clone, Default)]
pub struct BenchReport {
    pub meshes: Vec<MeshReport>,
}

impl BenchReport {
    /// Returns the number of mismatching queries over all meshes.
    pub fn num_mismatches(&self) -> usize {
        self.meshes.iter().map(|m| m.mismatches).sum()
    }
}

/// An executor for running the collision benchmark.
pub struct BenchExecutor {
    config: BenchConfig,
    out_dir: PathBuf,
}

impl BenchExecutor {
    /// Creates a new benchmark executor.
    ///
    /// # Arguments
    /// * `config` - The benchmark configuration.
    /// * `out_dir` - The output directory for the written trees.
    pub fn new(config: BenchConfig, out_dir: PathBuf) -> Self {
        Self { config, out_dir }
    }

    /// Runs the benchmark for every configured mesh.
    ///
    /// # Arguments
    /// * `s` - The stats node to write the timings to.
    pub fn run(&self, s: StatsNode) -> Result<BenchReport> {
        info!("Num Meshes: {}", self.config.meshes.len());
        info!("Num Rays: {}", self.config.num_rays);
        info!("Num Sweeps: {}", self.config.num_sweeps);

        self.initialize().map_err(|err| {
            error!("Failed to initialize the benchmark executor: {:?}", err);
            err
        })?;

        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        let mut report = BenchReport::default();

        for (index, source) in self.config.meshes.iter().enumerate() {
            info!(
                "Benchmark mesh {}/{}: {}",
                index + 1,
                self.config.meshes.len(),
                source.describe()
            );

            let s = s.get_child(&format!("mesh_{}", index));
            let mesh = {
                let _t = s.get_child("load").register_timing();
                Self::load_mesh(source, &mut rng)?
            };

            let mesh_report = self.bench_mesh(&s, index, source, &mesh, &mut rng)?;
            info!(
                "{} triangles, {} nodes, depth {}, {} ray hits, {} sweep contacts, {} triangle tests",
                mesh_report.num_triangles,
                mesh_report.num_nodes,
                mesh_report.depth,
                mesh_report.ray_hits,
                mesh_report.sweep_contacts,
                mesh_report.query_stats.triangle_tests
            );

            report.meshes.push(mesh_report);
        }

        Ok(report)
    }

    /// Builds the tree for the mesh and runs all queries against it.
    fn bench_mesh(
        &self,
        s: &StatsNode,
        index: usize,
        source: &MeshSource,
        mesh: &Mesh,
        rng: &mut ChaCha8Rng,
    ) -> Result<MeshReport> {
        let options = BIHOptions::with_max_tris_per_leaf(self.config.max_tris_per_leaf);
        let tree = {
            let _t = s.get_child("build").register_timing();
            BIHTree::with_options(mesh, options)?
        };

        let tree = if self.config.write_trees {
            let _t = s.get_child("write_read").register_timing();
            self.write_and_read_tree(&tree, index)?
        } else {
            tree
        };

        let mut report = MeshReport {
            name: source.describe(),
            num_triangles: tree.store().len(),
            num_nodes: tree.nodes().len(),
            depth: tree.depth(),
            ..Default::default()
        };

        info!("Model bound: {}", tree.model_bound());

        let world_matrix = self.config.transform.unwrap_or_else(Mat4::identity);
        let world_bound = tree.world_bound(&world_matrix);
        if world_bound.is_empty() {
            warn!("Mesh {} has no triangles, skipping queries", index);
            return Ok(report);
        }

        let mut collidables = Vec::with_capacity(self.config.num_rays + self.config.num_sweeps);
        for _ in 0..self.config.num_rays {
            collidables.push(Collidable::Ray(gen_random_ray(rng, &world_bound)));
        }
        for _ in 0..self.config.num_sweeps {
            let sphere = gen_random_sweep(rng, &world_bound, self.config.sweep_radius)?;
            collidables.push(Collidable::SweepSphere(sphere));
        }

        let mut scratch = QueryScratch::new();
        let mut results = Vec::with_capacity(collidables.len());
        {
            let _t = s.get_child("queries").register_timing();
            for collidable in collidables.iter() {
                let mut r = CollisionResults::new();
                tree.collide_with_scratch(
                    collidable,
                    &world_matrix,
                    &world_bound,
                    &mut r,
                    &mut scratch,
                )?;
                results.push(r);
            }
        }

        report.query_stats = *scratch.stats();
        for (collidable, r) in collidables.iter().zip(results.iter()) {
            match collidable {
                Collidable::SweepSphere(_) => report.sweep_contacts += r.len(),
                _ => report.ray_hits += r.len(),
            }
        }

        if self.config.verify {
            let _t = s.get_child("verify").register_timing();
            report.mismatches = verify(&tree, &collidables, &results, &world_matrix, &world_bound)?;

            if report.mismatches > 0 {
                warn!(
                    "{} of {} queries differ from the naive collider",
                    report.mismatches,
                    collidables.len()
                );
            }
        }

        Ok(report)
    }

    /// Writes the tree into the output directory and reads it back.
    fn write_and_read_tree(&self, tree: &BIHTree, index: usize) -> Result<BIHTree> {
        let path = self.out_dir.join(format!("tree_{}.bih", index));
        info!("Write tree to '{}'...", path.display());

        let writer = BufWriter::new(File::create(&path)?);
        tree.write(writer)?;

        let reader = BufReader::new(File::open(&path)?);
        let tree2 = BIHTree::read_from(reader)?;

        if tree2.nodes() != tree.nodes() || tree2.store() != tree.store() {
            error!("Tree read from '{}' differs from the written one", path.display());
            return Err(Error::CorruptedTree(format!("{}", path.display())));
        }

        Ok(tree2)
    }

    /// Creates the mesh for the given source.
    ///
    /// # Arguments
    /// * `source` - The mesh source.
    /// * `rng` - The random number generator for random meshes.
    fn load_mesh(source: &MeshSource, rng: &mut ChaCha8Rng) -> Result<Mesh> {
        match source {
            MeshSource::CubeGrid { count, spacing } => Ok(cube_grid(*count, *spacing)),
            MeshSource::RandomSoup {
                num_triangles,
                extent,
                triangle_size,
            } => {
                if *extent <= 0f32 {
                    return Err(Error::InvalidArgument(format!(
                        "The extent must be positive, got {}",
                        extent
                    )));
                }

                Ok(random_soup(rng, *num_triangles, -extent..*extent, *triangle_size))
            }
            MeshSource::Files { pattern } => load_mesh_files(pattern),
        }
    }

    /// Initializes the benchmark executor.
    fn initialize(&self) -> Result<()> {
        if !self.config.write_trees {
            return Ok(());
        }

        // make sure the specified output directory exists and is a directory
        std::fs::create_dir_all(&self.out_dir).map_err(|err| {
            error!("Failed to create the output directory: {:?}", err);

            Error::Io(err)
        })?;

        Ok(())
    }
}

/// Loads all meshes matching the glob pattern and merges them into a single mesh. Files that
/// cannot be read are skipped.
///
/// # Arguments
/// * `pattern` - The glob pattern for the mesh files.
fn load_mesh_files(pattern: &str) -> Result<Mesh> {
    let mut mesh = Mesh::default();
    let mut num_read_files = 0;

    for entry in glob::glob(pattern)? {
        match entry {
            Ok(path) => {
                info!("Loading mesh '{}'...", path.display());

                match read_mesh_file(&path) {
                    Ok(m) => {
                        mesh.append(&m);
                        num_read_files += 1;
                    }
                    Err(err) => {
                        error!("Failed to load mesh: {:?}", err);
                        info!("Skipping mesh...");
                    }
                }
            }
            Err(err) => {
                error!("Failed to read entry: {:?}", err);
                info!("Skipping entry...");
            }
        }
    }

    info!("Loaded {} mesh files", num_read_files);

    Ok(mesh)
}

fn read_mesh_file(path: &Path) -> Result<Mesh> {
    let mesh = Mesh::read_from(BufReader::new(File::open(path)?))?;
    mesh.validate()?;

    Ok(mesh)
}

/// Compares the contacts of every query with the contacts of the naive collider and returns
/// the number of queries that differ.
fn verify(
    tree: &BIHTree,
    collidables: &[Collidable],
    results: &[CollisionResults],
    world_matrix: &Mat4,
    world_bound: &AABB,
) -> Result<usize> {
    let naive = NaiveCollider::new(tree.store());
    let mut mismatches = 0;

    for (collidable, r) in collidables.iter().zip(results.iter()) {
        let mut expected = CollisionResults::new();
        naive.collide_with(collidable, world_matrix, world_bound, &mut expected)?;

        if expected.triangle_indices() != r.triangle_indices() {
            warn!(
                "Mismatch for {}: expected triangles {:?}, got {:?}",
                collidable.type_name(),
                expected.triangle_indices(),
                r.triangle_indices()
            );

            mismatches += 1;
        }
    }

    Ok(mismatches)
}

/// Returns a random value between min and max. Returns min for an empty interval.
fn random_between<R: Rng>(rng: &mut R, min: f32, max: f32) -> f32 {
    min + (max - min).max(0f32) * rng.random::<f32>()
}

fn random_point_in<R: Rng>(rng: &mut R, aabb: &AABB) -> Vec3 {
    Vec3::new(
        random_between(rng, aabb.min.x, aabb.max.x),
        random_between(rng, aabb.min.y, aabb.max.y),
        random_between(rng, aabb.min.z, aabb.max.z),
    )
}

/// Returns a random ray that starts somewhere around the given volume and points to a random
/// position inside of it.
fn gen_random_ray<R: Rng>(rng: &mut R, aabb: &AABB) -> Ray {
    let mut around = *aabb;
    around.grow(aabb.get_size().max());

    let target = random_point_in(rng, aabb);
    let mut start = random_point_in(rng, &around);
    if start == target {
        start += Vec3::new(0.0, 1.0, 0.0);
    }

    Ray::from_pos(&start, &target)
}

/// Returns a random swept sphere starting inside the given volume.
fn gen_random_sweep<R: Rng>(rng: &mut R, aabb: &AABB, radius: f32) -> Result<SweepSphere> {
    let center = random_point_in(rng, aabb);
    let velocity = Vec3::new(
        random_between(rng, -1.0, 1.0),
        random_between(rng, -1.0, 1.0),
        random_between(rng, -1.0, 1.0),
    ) * (aabb.get_size().max() * 0.25);

    SweepSphere::new(center, radius, velocity)
}
