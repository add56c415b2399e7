use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use wq_processor::models::{LanduseArea, LanduseCoefficient, RainfallYear, Sample};
use wq_processor::processors::{LoadCalculator, WaterQualityAggregator};
use wq_processor::utils::stats::{geometric_mean, median};

// Several stations sampling every analyte twice a month
fn create_test_samples(waterbody_count: usize, years: i32) -> Vec<Sample> {
    let mut samples = Vec::new();

    for wb in 0..waterbody_count {
        let wbid = format!("{:04}A", 1000 + wb);
        for year in 2000..2000 + years {
            for month in 1..=12u32 {
                for day in [3u32, 17] {
                    for (station, analyte) in [("21FLGW 1", "TP"), ("21FLGW 2", "TP"), ("21FLGW 1", "TN")] {
                        let result = 0.01 + (month as f64) * 0.002 + (day as f64) * 0.0005;
                        let (code, mdl) = if month == 2 { (Some("U".to_string()), Some(0.004)) } else { (None, None) };
                        samples.push(Sample::new(
                            wbid.clone(),
                            station,
                            year,
                            month,
                            day,
                            analyte,
                            result,
                            code,
                            mdl,
                        ));
                    }
                }
            }
        }
    }

    samples
}

fn benchmark_aggregator(c: &mut Criterion) {
    let samples = create_test_samples(10, 10);
    let aggregator = WaterQualityAggregator::default();

    c.bench_function("aggregate_annual_geomeans", |b| {
        b.iter(|| {
            let (table, _) = aggregator.aggregate(black_box(&samples)).unwrap();
            black_box(table.len())
        })
    });
}

fn benchmark_statistics(c: &mut Criterion) {
    let values: Vec<f64> = (1..=1000).map(|i| i as f64 * 0.001).collect();

    c.bench_function("median_1000", |b| b.iter(|| black_box(median(black_box(&values)))));
    c.bench_function("geometric_mean_1000", |b| {
        b.iter(|| black_box(geometric_mean(black_box(&values))))
    });
}

fn benchmark_load_calculator(c: &mut Criterion) {
    let rainfall: Vec<RainfallYear> = (1990..2020)
        .map(|year| RainfallYear { year, total_inches: 45.0 + (year % 7) as f64 })
        .collect();
    let areas: Vec<LanduseArea> = (0..60)
        .map(|i| LanduseArea {
            level2_code: 1000 + i,
            level2_description: format!("Land use {}", i),
            area_sq_m: 10_000.0 * (i + 1) as f64,
            level1: None,
        })
        .collect();
    let coefficients: Vec<LanduseCoefficient> = (0..60)
        .map(|i| LanduseCoefficient {
            level2_code: 1000 + i,
            roc: Some(0.1 + (i % 5) as f64 * 0.1),
            emc_tn: Some(1.5),
            emc_tp: Some(0.2),
        })
        .collect();
    let calculator = LoadCalculator::new();

    c.bench_function("plsm_30_years", |b| {
        b.iter(|| {
            let results = calculator
                .calculate(&rainfall, &areas, &coefficients, None)
                .unwrap();
            black_box(results.bathtub.len())
        })
    });
}

fn benchmark_varying_data_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregation_by_size");
    let aggregator = WaterQualityAggregator::default();

    for &size in &[1, 10, 50] {
        group.bench_with_input(BenchmarkId::new("waterbodies", size), &size, |b, &count| {
            let samples = create_test_samples(count, 5);
            b.iter(|| {
                let (table, _) = aggregator.aggregate(&samples).unwrap();
                black_box(table.len())
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_aggregator,
    benchmark_statistics,
    benchmark_load_calculator,
    benchmark_varying_data_sizes
);
criterion_main!(benches);
