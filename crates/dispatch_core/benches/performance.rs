//! Performance benchmarks for dispatch_core using Criterion.rs.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use dispatch_core::chaining::{ChainingAnalyzer, OptimizationRequest};
use dispatch_core::matching::{AgencyRanker, MatchCriteria};
use dispatch_core::model::{FacilityId, Priority, TimeWindow, TransportLevel};
use dispatch_core::scenario::{build_scenario, ScenarioParams};

fn bench_agency_ranking(c: &mut Criterion) {
    let scenarios = vec![("small", 10, 50), ("medium", 50, 200), ("large", 200, 500)];

    let mut group = c.benchmark_group("agency_ranking");
    for (name, agencies, requests) in scenarios {
        let scenario = build_scenario(
            ScenarioParams::default()
                .with_seed(42)
                .with_pool_sizes(25, agencies, requests),
        );
        let ranker = AgencyRanker::new(Box::new(scenario.hospital), Box::new(scenario.ems))
            .with_center(Box::new(scenario.center));
        let criteria = MatchCriteria::new(
            TransportLevel::Als,
            FacilityId(1),
            FacilityId(2),
            Priority::Urgent,
        )
        .with_estimated_distance(35.0)
        .with_time_window(TimeWindow::new(0, 2 * 60 * 60 * 1000));

        group.bench_with_input(BenchmarkId::from_parameter(name), &criteria, |b, criteria| {
            b.iter(|| black_box(ranker.find_matches(criteria, 0)));
        });
    }
    group.finish();
}

fn bench_route_chaining(c: &mut Criterion) {
    let scenarios = vec![("small", 50), ("medium", 200), ("large", 500)];

    let mut group = c.benchmark_group("route_chaining");
    for (name, requests) in scenarios {
        let scenario = build_scenario(
            ScenarioParams::default()
                .with_seed(42)
                .with_pool_sizes(25, 10, requests),
        );
        let analyzer = ChainingAnalyzer::with_grid_distances(Box::new(scenario.hospital));
        let request = OptimizationRequest::new(TimeWindow::new(0, 12 * 60 * 60 * 1000));

        group.bench_with_input(BenchmarkId::from_parameter(name), &request, |b, request| {
            b.iter(|| black_box(analyzer.optimize_routes(request)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_agency_ranking, bench_route_chaining);
criterion_main!(benches);
