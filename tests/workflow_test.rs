use chrono::{NaiveDate, Utc};
use sqlx::{PgPool, Row};

use workshop_ops::{
    config::AppConfig,
    db::{self, assignment_queries, completion_queries, job_queries, qc_queries},
    error::WorkflowError,
    models::{
        assignment::AssignmentRole,
        completion::CompletionRequest,
        job::{NewJobRequest, Priority, WorkshopStatus},
        qc::QcDecisionRequest,
        time_entry::TimeEntryRequest,
    },
    services::{completion, lifecycle, qc_board},
};

/// Integration test: the full workshop workflow against a live database.
///
/// Covers the lifecycle gates, QC board idempotency, the fail-notes rule,
/// dual-signature completion, and the exactly-once guarantees.
///
/// Note: requires a running PostgreSQL instance configured via DATABASE_URL.
#[tokio::test]
#[ignore] // Run with: cargo test --test workflow_test -- --ignored
async fn test_full_workflow() {
    let config = AppConfig::from_env().expect("Failed to load config");

    let pool = db::init_pool(&config.database_url)
        .await
        .expect("Failed to connect to database");

    db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    // Test fixtures: three workers and a unique job number per run
    let run_id = Utc::now().timestamp_micros();
    let artisan = insert_worker(&pool, &format!("T{run_id}-1"), "Pieter", "Botha").await;
    let inspector = insert_worker(&pool, &format!("T{run_id}-2"), "Sipho", "Dlamini").await;
    let manager = insert_worker(&pool, &format!("T{run_id}-3"), "Anri", "Venter").await;

    let catalog = qc_queries::list_catalog(&pool).await.expect("catalog");
    let active_points: Vec<_> = catalog.iter().filter(|hp| hp.is_active).collect();
    assert!(
        !active_points.is_empty(),
        "seeded holding point catalog missing"
    );

    // 1. Job intake starts at NEW
    let job = job_queries::create_job(
        &pool,
        &NewJobRequest {
            job_number: format!("JOB-{run_id}"),
            description: "Water-cooled furnace panel".to_string(),
            priority: Some(Priority::High),
            client_name: Some("Highveld Steel".to_string()),
            order_number: None,
            expected_delivery_date: None,
        },
    )
    .await
    .expect("Failed to create job");
    assert_eq!(job.workshop_status, WorkshopStatus::New);

    // 2. Cannot leave NEW without an assignment
    let err = lifecycle::advance(&pool, job.id).await.unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidTransition(_)));

    // 3. Assign, then re-assign: the pair is upserted, not duplicated
    assignment_queries::upsert_assignment(&pool, job.id, artisan, AssignmentRole::Artisan)
        .await
        .expect("Failed to assign");
    assignment_queries::upsert_assignment(&pool, job.id, artisan, AssignmentRole::Lead)
        .await
        .expect("Failed to re-assign");

    let assignments = assignment_queries::list_for_job(&pool, job.id)
        .await
        .expect("Failed to list assignments");
    assert_eq!(assignments.len(), 1);
    assert_eq!(assignments[0].role, AssignmentRole::Lead);

    // 4. Time ledger is independent of the state machine
    let entry = workshop_ops::db::time_queries::insert_entry(
        &pool,
        job.id,
        "Pieter Botha",
        &TimeEntryRequest {
            worker_id: artisan,
            work_date: NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
            normal_hours: 8.0,
            overtime_hours: 1.5,
            notes: "cutting and fit-up".to_string(),
        },
    )
    .await
    .expect("Failed to log time");
    assert_eq!(entry.overtime_hours, 1.5);

    // 5. Advance NEW -> ASSIGNED -> IN_PROGRESS -> QC_IN_PROGRESS
    for expected in [
        WorkshopStatus::Assigned,
        WorkshopStatus::InProgress,
        WorkshopStatus::QcInProgress,
    ] {
        let job = lifecycle::advance(&pool, job.id).await.expect("advance");
        assert_eq!(job.workshop_status, expected);
    }

    // 6. Initialize the QC board twice: one row per active point, both times
    let board = qc_board::initialize(&pool, job.id).await.expect("init");
    assert_eq!(board.signoffs.len(), active_points.len());
    let board_again = qc_board::initialize(&pool, job.id).await.expect("re-init");
    assert_eq!(board_again.signoffs.len(), active_points.len());

    let progress = qc_board::progress(&pool, job.id).await.expect("progress");
    assert_eq!(progress.pending, active_points.len() as i64);
    assert_eq!(progress.passed, 0);
    assert_eq!(progress.failed, 0);
    assert!(!progress.is_complete);

    // 7. Fail requires notes
    let first_point = board.signoffs[0].holding_point_id;
    let err = qc_board::fail(&pool, job.id, first_point, &decision(""))
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Validation(_)));

    // 8. Pass all but the last, fail the last with justification
    for signoff in &board.signoffs[..board.signoffs.len() - 1] {
        qc_board::pass(&pool, job.id, signoff.holding_point_id, &decision("ok"))
            .await
            .expect("pass");
    }
    let last_point = board.signoffs.last().unwrap().holding_point_id;
    let progress = qc_board::fail(&pool, job.id, last_point, &decision("crack found"))
        .await
        .expect("fail");
    assert_eq!(progress.failed, 1);
    assert!(!progress.is_complete);

    // 9. A decided point cannot be overwritten
    let err = qc_board::pass(&pool, job.id, last_point, &decision("retry"))
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::AlreadyDecided { .. }));

    // 10. Completion is gated on the QC board
    let err = completion::complete(&pool, job.id, &sign_off(inspector, manager))
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Validation(_)));
    assert!(!completion_queries::exists(&pool, job.id).await.unwrap());

    // The failed point has no reset path, so this job is stuck by design.
    // Run the sign-off path on a second job that passes everything.
    let job2 = job_queries::create_job(
        &pool,
        &NewJobRequest {
            job_number: format!("JOB-{run_id}-B"),
            description: "Conveyor guard set".to_string(),
            priority: None,
            client_name: None,
            order_number: None,
            expected_delivery_date: None,
        },
    )
    .await
    .expect("Failed to create job");

    assignment_queries::upsert_assignment(&pool, job2.id, artisan, AssignmentRole::Artisan)
        .await
        .expect("assign");
    for _ in 0..3 {
        lifecycle::advance(&pool, job2.id).await.expect("advance");
    }

    let board2 = qc_board::initialize(&pool, job2.id).await.expect("init");
    for signoff in &board2.signoffs {
        qc_board::pass(&pool, job2.id, signoff.holding_point_id, &decision(""))
            .await
            .expect("pass");
    }
    let progress2 = qc_board::progress(&pool, job2.id).await.expect("progress");
    assert!(progress2.is_complete);
    assert_eq!(progress2.percent_complete, 100);

    // 11. Both signatures must be distinct workers
    let err = completion::complete(&pool, job2.id, &sign_off(inspector, inspector))
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Validation(_)));

    // 12. Sign-off succeeds and moves the job in the same transaction
    let record = completion::complete(&pool, job2.id, &sign_off(inspector, manager))
        .await
        .expect("complete");
    assert_eq!(record.job_id, job2.id);

    let job2 = job_queries::fetch_job(&pool, job2.id)
        .await
        .expect("fetch")
        .expect("job missing");
    assert_eq!(job2.workshop_status, WorkshopStatus::ReadyForDelivery);

    // 13. Completion is exactly-once
    let err = completion::complete(&pool, job2.id, &sign_off(inspector, manager))
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::AlreadyCompleted(_)));

    // 14. Terminal state cannot advance further
    let err = lifecycle::advance(&pool, job2.id).await.unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidTransition(_)));

    println!("full workflow test passed");
}

async fn insert_worker(pool: &PgPool, code: &str, first: &str, last: &str) -> i64 {
    let row = sqlx::query(
        r#"
        INSERT INTO workers (employee_code, first_name, last_name, department, worker_type, current_hourly_rate)
        VALUES ($1, $2, $3, 'WORKSHOP', 'PERMANENT', 85.0)
        RETURNING id
        "#,
    )
    .bind(code)
    .bind(first)
    .bind(last)
    .fetch_one(pool)
    .await
    .expect("Failed to insert worker");

    row.try_get("id").unwrap()
}

fn decision(notes: &str) -> QcDecisionRequest {
    QcDecisionRequest {
        notes: notes.to_string(),
        signed_by_id: None,
    }
}

fn sign_off(inspector: i64, manager: i64) -> CompletionRequest {
    CompletionRequest {
        qc_inspector_id: inspector,
        qc_inspector_name: "Sipho Dlamini".to_string(),
        shop_manager_id: manager,
        shop_manager_name: "Anri Venter".to_string(),
        notes: String::new(),
    }
}
