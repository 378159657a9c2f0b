use criterion::{criterion_group, criterion_main, Criterion};
use geo::{point, Point};
use terrain::{geodesic, Profile};

fn terrain_profile(c: &mut Criterion) {
    let mut group = c.benchmark_group("Terrain Profile");

    let start = point!(x: -71.30830716441369, y: 44.28309806603165);
    let end = point!(x: -71.2972073283768, y: 44.25628098424278);
    let source = |p: Point<f64>| Some(500.0 + 100.0 * (p.x() * 1e3).sin());
    let _90m = 90.0;

    group.bench_with_input("short", &(_90m, start, end), |b, (d, s, e)| {
        b.iter(|| {
            Profile::builder()
                .start(*s)
                .max_step(*d)
                .end(*e)
                .build(&source)
                .unwrap()
        })
    });
}

fn radial_endpoints(c: &mut Criterion) {
    let origin = point!(x: -47.06, y: -22.9);
    c.bench_function("200 km radials", |b| {
        b.iter(|| {
            geodesic::radials(1)
                .unwrap()
                .into_iter()
                .map(|az| geodesic::destination(origin, f64::from(az), 200.0))
                .collect::<Vec<_>>()
        })
    });
}

criterion_group!(benches, terrain_profile, radial_endpoints);
criterion_main!(benches);
