//! End-to-end analysis scenarios over the public API

use chrono::{DateTime, Duration, TimeZone, Utc};
use dosewise::analytics::{
    AnalysisConfig, AnalyticsService, Analyzer, MealType, Snapshot, WarningKind, WindowReason,
    CONSISTENT_TRACKING_MESSAGE, CONTINUE_MONITORING_MESSAGE, KEEP_LOGGING_MESSAGE,
};
use dosewise::store::{CsvImporter, InjectionEvent, InjectionSite, Medication, MemoryStore, SymptomLog};
use std::sync::Arc;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

fn injection(id: &str, at: DateTime<Utc>, medication: Medication, dose: f64) -> InjectionEvent {
    InjectionEvent::new(id, at, medication, dose, InjectionSite::ThighLeft).unwrap()
}

fn symptom(id: &str, name: &str, severity: u8, at: DateTime<Utc>) -> SymptomLog {
    SymptomLog::new(id, name, severity, at).unwrap()
}

/// Weekly injections, the latest `latest_days_ago` days before now, with
/// nausea exactly one day after each of the earlier ones
fn weekly_nausea(latest_days_ago: i64) -> Snapshot {
    let first = now() - Duration::days(latest_days_ago);
    let injections = (0..5)
        .map(|i| {
            injection(
                &format!("inj-{}", i),
                first - Duration::days(7 * i),
                Medication::Semaglutide,
                1.0,
            )
        })
        .collect();
    let symptoms = (1..5)
        .map(|i| {
            symptom(
                &format!("nausea-{}", i),
                "nausea",
                7,
                first - Duration::days(7 * i) + Duration::days(1),
            )
        })
        .collect();
    Snapshot::new(injections, symptoms)
}

#[test]
fn weekly_nausea_pattern_is_found() {
    let analyzer = Analyzer::default();
    let report = analyzer.analyze(&weekly_nausea(2), now());

    assert_eq!(report.window.days, 60);
    assert_eq!(report.window.reason, WindowReason::Established);

    let top = report.correlations.top_pattern().unwrap();
    assert_eq!(top.symptom, "nausea");
    assert_eq!(top.modal_offset, Some(1));
    assert_eq!(top.day_offsets, vec![1]);
    assert!(report.correlations.confidence_score > 0);

    let peak = report.correlations.peak_symptom_window.as_ref().unwrap();
    assert!(peak.contains(1));

    assert_eq!(report.insights[0].symptom.as_deref(), Some("nausea"));
    assert!(!report.insights[0].is_placeholder());
}

#[test]
fn injection_day_meal_context_has_one_warning() {
    let analyzer = Analyzer::default();
    let snapshot = weekly_nausea(0);
    let report = analyzer.analyze(&snapshot, now());
    let context = analyzer.meal_context(&report, Some(MealType::Lunch));

    assert_eq!(context.days_since_injection, Some(0));
    assert!(context.is_injection_day);
    assert!(!context.is_peak_symptom_window);
    assert_eq!(context.warnings.len(), 1);
    assert_eq!(context.warnings[0].kind, WarningKind::InjectionDay);
    assert!(context.tips.len() <= 2);
}

#[test]
fn dose_change_shortens_weekly_window() {
    let analyzer = Analyzer::default();
    let injections = vec![
        injection("a", now() - Duration::days(1), Medication::Semaglutide, 2.5),
        injection("b", now() - Duration::days(8), Medication::Semaglutide, 1.0),
        injection("c", now() - Duration::days(15), Medication::Semaglutide, 1.0),
        injection("d", now() - Duration::days(22), Medication::Semaglutide, 1.0),
    ];

    let decision = analyzer.selector().decide(&injections);
    assert_eq!(decision.days, 35);
    assert!(decision.dose_changed);
    assert_eq!(decision.reason, WindowReason::DoseChange);
}

#[test]
fn stable_daily_regimen_uses_short_window() {
    let analyzer = Analyzer::default();
    let injections: Vec<InjectionEvent> = (0..10)
        .map(|i| {
            injection(
                &format!("lira-{}", i),
                now() - Duration::days(i),
                Medication::Liraglutide,
                1.2,
            )
        })
        .collect();

    assert_eq!(analyzer.selector().window_days(&injections), 35);
    assert_eq!(analyzer.selector().window_days(&injections[..2]), 45);
}

#[test]
fn insufficient_history_gives_guidance() {
    let analyzer = Analyzer::default();
    let snapshot = Snapshot::new(
        vec![injection("only", now() - Duration::days(3), Medication::Tirzepatide, 5.0)],
        vec![
            symptom("s1", "nausea", 5, now() - Duration::days(2)),
            symptom("s2", "nausea", 6, now() - Duration::days(1)),
            symptom("s3", "fatigue", 4, now() - Duration::hours(5)),
        ],
    );

    let report = analyzer.analyze(&snapshot, now());
    assert_eq!(report.correlations.confidence_score, 0);
    assert!(report.correlations.patterns.is_empty());
    assert_eq!(
        report.correlations.recommendations,
        vec![KEEP_LOGGING_MESSAGE.to_string(), CONSISTENT_TRACKING_MESSAGE.to_string()]
    );
    assert_eq!(report.insights.len(), 1);
    assert!(report.insights[0].is_placeholder());
}

#[test]
fn injections_older_than_window_still_count() {
    let analyzer = Analyzer::default();
    // Ten stable weekly injections reaching back past the 60-day window
    let injections = (0..10)
        .map(|i| {
            injection(
                &format!("inj-{}", i),
                now() - Duration::days(1 + 7 * i),
                Medication::Semaglutide,
                1.0,
            )
        })
        .collect();
    let symptoms = (0..3)
        .map(|i| symptom(&format!("nausea-{}", i), "nausea", 7, now() - Duration::days(7 * i)))
        .collect();

    let report = analyzer.analyze(&Snapshot::new(injections, symptoms), now());

    assert_eq!(report.window.days, 60);
    assert_eq!(report.total_injections, 10);
    assert_eq!(report.injections_in_window, 9);
    // (10 injections + 3 symptoms) x 2, no high-tier pattern
    assert_eq!(report.correlations.confidence_score, 26);

    let top = report.correlations.top_pattern().unwrap();
    assert_eq!(top.symptom, "nausea");
    assert_eq!(top.occurrences, 3);
    assert!((top.frequency - 0.3).abs() < 1e-9);
    assert!(top.description.contains("occasionally"));
}

#[test]
fn recent_symptoms_after_old_injections_are_not_insufficient() {
    let analyzer = Analyzer::default();
    let latest = now() - Duration::days(62);
    let injections = (0..6)
        .map(|i| {
            injection(
                &format!("inj-{}", i),
                latest - Duration::days(7 * i),
                Medication::Semaglutide,
                1.0,
            )
        })
        .collect();
    let symptoms = (0..3)
        .map(|i| symptom(&format!("fatigue-{}", i), "fatigue", 7, now() - Duration::days(i)))
        .collect();

    let report = analyzer.analyze(&Snapshot::new(injections, symptoms), now());

    assert_eq!(report.injections_in_window, 0);
    assert_eq!(report.symptoms_in_window, 3);
    assert_eq!(report.correlations.confidence_score, 18);
    assert_eq!(
        report.correlations.recommendations,
        vec![CONTINUE_MONITORING_MESSAGE.to_string()]
    );
    assert!(!report.insights[0].is_placeholder());
}

#[test]
fn analysis_is_deterministic() {
    let analyzer = Analyzer::new(&AnalysisConfig::default());
    let snapshot = weekly_nausea(3);

    let first = analyzer.analyze(&snapshot, now());
    let second = analyzer.analyze(&snapshot, now());
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn csv_exports_feed_the_analyzer() {
    let importer = CsvImporter::new();

    let injections = importer
        .import_injections_str(
            "id,timestamp,medication,dose,site\n\
             i1,2024-05-02 09:00,semaglutide,0.5,abdomen-left\n\
             i2,2024-05-09 09:00,semaglutide,0.5,abdomen-right\n\
             i3,2024-05-16 09:00,semaglutide,0.5,abdomen-left\n\
             i4,2024-05-23 09:00,semaglutide,0.5,abdomen-right\n\
             i5,2024-05-30 09:00,semaglutide,0.5,abdomen-left\n\
             bad,2024-05-30 09:00,aspirin,0.5,abdomen-left\n",
        )
        .unwrap();
    assert_eq!(injections.records.len(), 5);
    assert_eq!(injections.rows_failed, 1);

    let symptoms = importer
        .import_symptoms_str(
            "id,timestamp,symptom,severity,meal_related,notes\n\
             s1,2024-05-03 09:00,Nausea,7,yes,\n\
             s2,2024-05-10 09:00,nausea,7,no,after dinner\n\
             s3,2024-05-17 09:00,NAUSEA,7,,\n\
             s4,2024-05-24 09:00,nausea,7,yes,\n",
        )
        .unwrap();
    assert_eq!(symptoms.records.len(), 4);

    let snapshot = Snapshot::new(injections.records, symptoms.records);
    let report = Analyzer::default().analyze(&snapshot, now());

    assert_eq!(report.days_since_injection, Some(2));
    let top = report.correlations.top_pattern().unwrap();
    assert_eq!(top.symptom, "nausea");
    assert_eq!(top.modal_offset, Some(1));
}

#[tokio::test]
async fn service_reads_from_store() {
    let store = Arc::new(MemoryStore::new());
    let snapshot = weekly_nausea(2);
    for event in snapshot.injections.clone() {
        store.record_injection("u1", event).await.unwrap();
    }
    for log in snapshot.symptoms.clone() {
        store.record_symptom("u1", log).await.unwrap();
    }

    let service = AnalyticsService::new(store.clone(), store, AnalysisConfig::default());

    let report = service.report("u1", now()).await;
    assert_eq!(report, Analyzer::default().analyze(&snapshot, now()));

    assert_eq!(service.window_days("u1").await, 60);
    assert_eq!(service.window_days("someone-else").await, 60);

    let insights = service.adaptive_insights("someone-else", now()).await;
    assert_eq!(insights.len(), 1);
    assert!(insights[0].is_placeholder());
}
