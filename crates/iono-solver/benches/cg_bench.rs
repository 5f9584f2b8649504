use criterion::{criterion_group, criterion_main, Criterion};
use iono_mesh::grid::SphericalTriGrid;
use iono_solver::cg::{solve, CgConfig};
use iono_solver::comm::SolverComm;
use iono_solver::dependencies::build_matrix_dependencies;
use iono_types::params::NodeParam;
use std::hint::black_box;

fn prepared_mesh(refinements: u32) -> SphericalTriGrid {
    let mut grid = SphericalTriGrid::initialize_icosahedron(1.0);
    for _ in 0..refinements {
        grid.refine_uniform().unwrap();
    }
    grid.normalize_radius();
    grid.update_connectivity().unwrap();
    for node in &mut grid.nodes {
        node[NodeParam::Sigma11] = 1.0;
        node[NodeParam::Sigma22] = 1.0;
        node[NodeParam::Sigma33] = 1.0;
    }
    build_matrix_dependencies(&mut grid).unwrap();
    let raw: Vec<f64> = grid
        .nodes
        .iter()
        .map(|n| (3.0 * n.x[0]).sin() + n.x[2])
        .collect();
    let mean = raw.iter().sum::<f64>() / raw.len() as f64;
    for (node, v) in grid.nodes.iter_mut().zip(raw) {
        node[NodeParam::Source] = v - mean;
    }
    grid
}

fn bench_cg_level2(c: &mut Criterion) {
    let template = prepared_mesh(2);
    let comm = SolverComm::serial(&template).unwrap();
    let config = CgConfig::default();

    c.bench_function("cg_icosahedron_l2", |b| {
        b.iter(|| {
            let mut grid = template.clone();
            let res = solve(&mut grid, &comm, &config);
            black_box(res.iterations);
        })
    });
}

fn bench_cg_level3(c: &mut Criterion) {
    let template = prepared_mesh(3);
    let comm = SolverComm::serial(&template).unwrap();
    let config = CgConfig::default();

    let mut group = c.benchmark_group("cg_icosahedron_l3");
    group.sample_size(10);
    group.bench_function("serial", |b| {
        b.iter(|| {
            let mut grid = template.clone();
            let res = solve(&mut grid, &comm, &config);
            black_box(res.iterations);
        })
    });
    group.finish();
}

criterion_group!(benches, bench_cg_level2, bench_cg_level3);
criterion_main!(benches);
