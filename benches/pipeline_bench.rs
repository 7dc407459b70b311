//! Benchmarks for the Dosewise analytics pipeline
//!
//! Run with: cargo bench

use chrono::{DateTime, Duration, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use dosewise::analytics::{AnalysisConfig, Analyzer, Regimen, Snapshot, SymptomWeightCalculator, WeightingConfig};
use dosewise::store::{CsvImporter, InjectionEvent, InjectionSite, Medication, SymptomLog};

const SYMPTOMS: [&str; 5] = ["nausea", "fatigue", "heartburn", "headache", "early fullness"];

/// Weekly injections for `weeks` weeks with `per_week` symptom logs after each
fn create_snapshot(now: DateTime<Utc>, weeks: i64, per_week: i64) -> Snapshot {
    let sites = InjectionSite::all();
    let mut injections = Vec::new();
    let mut symptoms = Vec::new();

    for week in 0..weeks {
        let injected_at = now - Duration::days(7 * week + 1);
        let dose = if week < weeks / 2 { 1.0 } else { 0.5 };
        injections.push(
            InjectionEvent::new(
                format!("inj-{}", week),
                injected_at,
                Medication::Semaglutide,
                dose,
                sites[week as usize % sites.len()],
            )
            .unwrap(),
        );

        for i in 0..per_week {
            symptoms.push(
                SymptomLog::new(
                    format!("sym-{}-{}", week, i),
                    SYMPTOMS[(i % SYMPTOMS.len() as i64) as usize],
                    (3 + (week + i) % 7) as u8,
                    injected_at + Duration::hours(6 + 11 * i),
                )
                .unwrap(),
            );
        }
    }

    Snapshot::new(injections, symptoms)
}

fn bench_analyze(c: &mut Criterion) {
    let mut group = c.benchmark_group("analyze");
    let now = Utc::now();
    let analyzer = Analyzer::new(&AnalysisConfig::default());

    for per_week in [2, 10, 50] {
        let snapshot = create_snapshot(now, 10, per_week);
        group.throughput(Throughput::Elements(snapshot.symptoms.len() as u64));

        group.bench_with_input(
            BenchmarkId::new("weekly_10w", snapshot.symptoms.len()),
            &snapshot,
            |b, snapshot| b.iter(|| analyzer.analyze(black_box(snapshot), now)),
        );
    }

    group.bench_function("empty", |b| {
        let snapshot = Snapshot::default();
        b.iter(|| analyzer.analyze(black_box(&snapshot), now))
    });

    group.finish();
}

fn bench_weighting(c: &mut Criterion) {
    let mut group = c.benchmark_group("weighting");
    let now = Utc::now();
    let calculator = SymptomWeightCalculator::new(WeightingConfig::default());

    for per_week in [10, 100] {
        let snapshot = create_snapshot(now, 10, per_week);
        let regimen = Regimen::current(&snapshot.injections);
        group.throughput(Throughput::Elements(snapshot.symptoms.len() as u64));

        group.bench_function(format!("weigh_{}", snapshot.symptoms.len()), |b| {
            b.iter(|| {
                calculator.weigh(
                    black_box(&snapshot.symptoms),
                    &snapshot.injections,
                    regimen.as_ref(),
                    now,
                )
            })
        });
    }

    group.finish();
}

fn bench_window(c: &mut Criterion) {
    let now = Utc::now();
    let analyzer = Analyzer::new(&AnalysisConfig::default());
    let snapshot = create_snapshot(now, 10, 0);

    c.bench_function("window_decide", |b| {
        b.iter(|| analyzer.selector().decide(black_box(&snapshot.injections)))
    });
}

fn bench_csv_import(c: &mut Criterion) {
    let mut group = c.benchmark_group("csv_import");
    let importer = CsvImporter::new();

    let mut csv_data = String::from("id,timestamp,symptom,severity,meal_related,notes\n");
    for i in 0..1_000 {
        csv_data.push_str(&format!(
            "s{},2024-03-{:02} {:02}:00,{},{},yes,\n",
            i,
            1 + i % 28,
            i % 24,
            SYMPTOMS[i % SYMPTOMS.len()],
            1 + i % 10
        ));
    }

    group.throughput(Throughput::Elements(1_000));
    group.bench_function("symptoms_1000", |b| {
        b.iter(|| importer.import_symptoms_str(black_box(&csv_data)).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_analyze, bench_weighting, bench_window, bench_csv_import);
criterion_main!(benches);
