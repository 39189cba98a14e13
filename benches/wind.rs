//! Run these benches with `cargo bench --bench wind -- --verbose`
use criterion::{criterion_group, criterion_main, Criterion};
use metfor::Meters;
use skewt_analysis::{Layer, Sounding, StormMotion};

mod utils;

fn build_tester() -> Criterion {
    Criterion::default()
        .sample_size(200)
        .measurement_time(std::time::Duration::from_secs(10))
        .noise_threshold(0.03)
        .significance_level(0.01)
}

criterion_main!(wind_benches);

criterion_group!(
    name = wind_benches;
    config = build_tester();
    targets = mean_wind_and_shear_bench, sr_helicity_bench, bunkers_storm_motion_bench
);

// Every test sounding with its 0-6 km layer and storm motion.
fn six_km_layers() -> Vec<(Sounding, Layer, StormMotion)> {
    utils::load_all_test_files()
        .to_vec()
        .into_iter()
        .filter_map(|snd| {
            let layer = skewt_analysis::layer_agl(&snd, Meters(6000.0)).ok()?;
            let motion = skewt_analysis::bunkers_storm_motion(&snd).ok()?;
            Some((snd, layer, motion))
        })
        .collect()
}

fn mean_wind_and_shear_bench(c: &mut Criterion) {
    let triples = six_km_layers();
    assert!(!triples.is_empty());

    c.bench_function("mean_wind", |b| {
        b.iter(|| {
            for (snd, layer, _) in &triples {
                let _x = skewt_analysis::mean_wind(layer, snd).expect("oops");
            }
        });
    });

    c.bench_function("bulk_shear", |b| {
        b.iter(|| {
            for (_, layer, _) in &triples {
                let _x = skewt_analysis::bulk_shear(layer).expect("oops");
            }
        });
    });
}

fn sr_helicity_bench(c: &mut Criterion) {
    let triples = six_km_layers();
    assert!(!triples.is_empty());

    c.bench_function("sr_helicity", |b| {
        b.iter(|| {
            for (snd, layer, motion) in &triples {
                let lat = snd.station_info().latitude().unwrap_or(0.0);
                let _x = skewt_analysis::sr_helicity(layer, motion.for_latitude(lat), snd)
                    .expect("oops");
            }
        });
    });
}

fn bunkers_storm_motion_bench(c: &mut Criterion) {
    let snds = utils::load_all_test_files();

    c.bench_function("bunkers_storm_motion", |b| {
        b.iter(|| {
            for snd in &snds {
                let _x = skewt_analysis::bunkers_storm_motion(snd);
            }
        });
    });
}
