//! Run these benches with `cargo bench --bench analysis -- --verbose`
use criterion::{criterion_group, criterion_main, Criterion};
use skewt_analysis::{AnalysisOptions, CoriolisConvention, LiftOptions, Parcel, Sounding};

mod utils;

fn build_tester() -> Criterion {
    Criterion::default()
        .sample_size(200)
        .measurement_time(std::time::Duration::from_secs(10))
        .noise_threshold(0.03)
        .significance_level(0.01)
}

criterion_main!(analysis_benches);

criterion_group!(
    name = analysis_benches;
    config = build_tester();
    targets = full_analysis_bench, lift_parcel_bench, temperature_advection_bench, render_rows_bench
);

fn full_analysis_bench(c: &mut Criterion) {
    let snds = utils::load_all_test_files();
    let options = AnalysisOptions::default();

    c.bench_function("full_analysis", |b| {
        b.iter(|| {
            for snd in &snds {
                let _x = skewt_analysis::Analysis::new(snd.clone(), &options);
            }
        });
    });
}

fn lift_parcel_bench(c: &mut Criterion) {
    let snds = utils::load_all_test_files().to_vec();

    let pairs: Vec<(Sounding, Parcel)> = snds
        .into_iter()
        .map(|snd| {
            let parcel = skewt_analysis::mixed_layer_parcel(&snd).unwrap();
            (snd, parcel)
        })
        .collect();

    let options = LiftOptions::default();

    c.bench_function("lift_parcel", |b| {
        b.iter(|| {
            for (snd, parcel) in &pairs {
                let _x = skewt_analysis::lift_parcel(*parcel, snd, &options).expect("oops");
            }
        });
    });
}

fn temperature_advection_bench(c: &mut Criterion) {
    let snds = utils::load_all_test_files();

    c.bench_function("temperature_advection", |b| {
        b.iter(|| {
            for snd in &snds {
                let layers =
                    skewt_analysis::temperature_advection(snd, CoriolisConvention::Signed)
                        .expect("oops");
                let _x = skewt_analysis::band_advection(&layers);
            }
        });
    });
}

fn render_rows_bench(c: &mut Criterion) {
    let anals: Vec<_> = utils::load_all_test_files()
        .iter()
        .map(|snd| skewt_analysis::Analysis::new(snd.clone(), &AnalysisOptions::default()))
        .collect();

    c.bench_function("diagram_tables", |b| {
        b.iter(|| {
            for anal in &anals {
                let _x = skewt_analysis::diagram::indices_rows(anal);
                let _y = skewt_analysis::diagram::advection_rows(anal);
                let _z = skewt_analysis::diagram::hodograph_segments(anal.sounding());
            }
        });
    });
}
