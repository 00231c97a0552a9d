mod common;

use common::{config_on, console, console_with, has_notice, reply, row, staged, Call, FakeBackend, MemoryHandoff};
use record_search::api::{ImportCounts, SearchBackend};
use record_search::services::{
    ImportFile, ImportInput, ImportStagingService, ManualRow, StagingState,
};
use record_search::state::NoticeLevel;
use record_search::{ApiError, ConsoleError, DataSourceId, ValidationError};
use serde_json::json;
use std::rc::Rc;

const XLSX: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

fn manual_row(cells: &[(&str, &str)]) -> ManualRow {
    cells
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn counts(uploaded: u64, duplicate: u64) -> ImportCounts {
    ImportCounts {
        original_count: 100,
        uploaded_count: uploaded,
        duplicate_count: duplicate,
        new_count: uploaded - duplicate,
        final_count: 100 + uploaded - duplicate,
    }
}

fn confirm_calls(backend: &FakeBackend) -> usize {
    backend.count(|c| matches!(c, Call::Confirm(..)))
}

#[tokio::test]
async fn test_file_preview_then_cancel() {
    let backend = FakeBackend::new();
    backend.push_preview(Ok(staged("t1", counts(10, 3))));
    let app = console(&backend, DataSourceId::Faults);

    let file = ImportFile::new("故障报告.xlsx", Some(XLSX), vec![0x50, 0x4b, 0x03, 0x04]);
    app.submit_import_file(file, DataSourceId::Faults).await.unwrap();
    assert_eq!(app.import_session().state(), StagingState::Draft);

    let preview = app.preview_import().await.unwrap();
    assert_eq!(preview.duplicate_count, 3);
    assert_eq!(preview.new_count, 7);

    let session = app.import_session();
    assert_eq!(session.state(), StagingState::Previewed);
    assert_eq!(session.staging_token(), Some("t1"));
    assert_eq!(session.counts(), counts(10, 3));
    assert!(backend
        .calls()
        .contains(&Call::PreviewFile(DataSourceId::Faults, "故障报告.xlsx".to_string())));

    app.cancel_import().await;

    let session = app.import_session();
    assert_eq!(session.state(), StagingState::Draft);
    assert_eq!(session.staging_token(), None);
    assert_eq!(session.pending(), None);
    assert_eq!(session.last_outcome(), Some(StagingState::Cancelled));
    assert!(backend
        .calls()
        .contains(&Call::Cancel(DataSourceId::Faults, "t1".to_string())));
}

#[tokio::test]
async fn test_cancel_completes_when_server_notification_fails() {
    let backend = FakeBackend::new();
    backend.push_preview(Ok(staged("t1", counts(2, 0))));
    backend.fail_cancel(ApiError::Transport("timed out".to_string()));
    let app = console(&backend, DataSourceId::Case);

    app.submit_manual_rows(vec![manual_row(&[("问题描述", "舱门告警")])], DataSourceId::Case)
        .await
        .unwrap();
    app.preview_import().await.unwrap();
    app.cancel_import().await;

    let session = app.import_session();
    assert_eq!(session.state(), StagingState::Draft);
    assert_eq!(session.staging_token(), None);
    assert_eq!(session.last_outcome(), Some(StagingState::Cancelled));
    // the operator is not bothered with a failed best-effort notification
    assert!(!has_notice(&app, NoticeLevel::Error, "timed out"));
}

#[tokio::test]
async fn test_invalid_submissions_never_reach_the_server() {
    let backend = FakeBackend::new();
    let mut config = config_on(DataSourceId::Case);
    config.import.max_upload_bytes = 8;
    let app = console_with(&backend, config, MemoryHandoff::default());

    let csv = ImportFile::new("cases.csv", Some("text/csv"), vec![b'a'; 4]);
    assert!(matches!(
        app.submit_import_file(csv, DataSourceId::Case).await,
        Err(ConsoleError::Validation(ValidationError::UnsupportedFileType { .. }))
    ));

    let big = ImportFile::new("cases.xls", None, vec![0; 9]);
    assert_eq!(
        app.submit_import_file(big, DataSourceId::Case).await.unwrap_err(),
        ConsoleError::Validation(ValidationError::FileTooLarge {
            file_name: "cases.xls".to_string(),
            size: 9,
            limit: 8,
        })
    );

    let blank = vec![manual_row(&[("问题描述", "  "), ("ATA", "")]), ManualRow::new()];
    assert_eq!(
        app.submit_manual_rows(blank, DataSourceId::Case).await.unwrap_err(),
        ConsoleError::Validation(ValidationError::EmptyManualRows)
    );

    assert_eq!(
        app.preview_import().await.unwrap_err(),
        ConsoleError::Validation(ValidationError::NoStagedImport)
    );
    assert!(backend.calls().is_empty());
    assert_eq!(app.import_session().state(), StagingState::Draft);
}

#[tokio::test]
async fn test_blank_manual_rows_are_dropped() {
    let backend = FakeBackend::new();
    let app = console(&backend, DataSourceId::Case);

    let rows = vec![
        manual_row(&[("问题描述", "")]),
        manual_row(&[("问题描述", "发动机振动值偏高"), ("ATA", "72")]),
    ];
    app.submit_manual_rows(rows, DataSourceId::Case).await.unwrap();
    app.preview_import().await.unwrap();

    assert!(backend.calls().contains(&Call::PreviewRows(
        DataSourceId::Case,
        vec![manual_row(&[("问题描述", "发动机振动值偏高"), ("ATA", "72")])]
    )));
}

#[tokio::test]
async fn test_rejected_preview_returns_to_draft() {
    let backend = FakeBackend::new();
    backend.push_preview(Err(ApiError::Rejected {
        message: "缺少必需的列".to_string(),
        error_type: Some("missing_columns".to_string()),
        missing_columns: vec!["ATA".to_string(), "机型".to_string()],
    }));
    let app = console(&backend, DataSourceId::Case);
    let file = ImportFile::new("cases.xlsx", None, vec![1, 2, 3]);
    app.submit_import_file(file, DataSourceId::Case).await.unwrap();

    let err = app.preview_import().await.unwrap_err();
    match err {
        ConsoleError::Staging(ApiError::Rejected {
            missing_columns, ..
        }) => assert_eq!(missing_columns, vec!["ATA", "机型"]),
        other => panic!("unexpected error: {:?}", other),
    }

    let session = app.import_session();
    assert_eq!(session.state(), StagingState::Draft);
    assert_eq!(session.staging_token(), None);
    assert!(matches!(session.pending(), Some(ImportInput::File(_))));
    assert!(has_notice(&app, NoticeLevel::Error, "ATA, 机型"));
    assert_eq!(confirm_calls(&backend), 0);
}

#[tokio::test]
async fn test_confirm_reloads_schema_and_reruns_search() {
    let backend = FakeBackend::new();
    backend.push_preview(Ok(staged("t1", counts(5, 0))));
    backend.push_confirm(Ok(5));
    backend.push_search(Ok(reply(
        vec![row(json!({"问题描述": "新导入的快响"}))],
        1,
    )));
    let app = console(&backend, DataSourceId::Case);
    app.initialize().await.unwrap();
    app.set_level_keywords(0, "快响").unwrap();

    app.submit_manual_rows(vec![manual_row(&[("问题描述", "新导入的快响")])], DataSourceId::Case)
        .await
        .unwrap();
    app.preview_import().await.unwrap();
    let columns_before = backend.count(|c| *c == Call::Columns(DataSourceId::Case));

    assert_eq!(app.confirm_import().await.unwrap(), 5);

    let session = app.import_session();
    assert_eq!(session.state(), StagingState::Draft);
    assert_eq!(session.staging_token(), None);
    assert_eq!(session.pending(), None);
    assert_eq!(session.last_outcome(), Some(StagingState::Confirmed));
    assert!(backend
        .calls()
        .contains(&Call::Confirm(DataSourceId::Case, "t1".to_string())));
    assert_eq!(
        backend.count(|c| *c == Call::Columns(DataSourceId::Case)),
        columns_before + 1
    );
    assert_eq!(backend.keyword_calls().len(), 1);
    assert_eq!(app.results().len(), 1);
    assert!(has_notice(&app, NoticeLevel::Success, "imported 5 rows"));
}

#[tokio::test]
async fn test_confirm_into_other_source_leaves_view_alone() {
    let backend = FakeBackend::new();
    backend.push_preview(Ok(staged("t2", counts(1, 0))));
    backend.push_confirm(Ok(1));
    let app = console(&backend, DataSourceId::Case);
    app.set_level_keywords(0, "快响").unwrap();

    app.submit_manual_rows(vec![manual_row(&[("问题描述", "x")])], DataSourceId::Faults)
        .await
        .unwrap();
    app.preview_import().await.unwrap();
    app.confirm_import().await.unwrap();

    assert!(backend.calls().contains(&Call::Confirm(DataSourceId::Faults, "t2".to_string())));
    assert_eq!(backend.count(|c| matches!(c, Call::Columns(_))), 0);
    assert!(backend.keyword_calls().is_empty());
}

#[tokio::test]
async fn test_confirm_without_keywords_skips_search() {
    let backend = FakeBackend::new();
    backend.push_preview(Ok(staged("t3", counts(1, 0))));
    let app = console(&backend, DataSourceId::Case);

    app.submit_manual_rows(vec![manual_row(&[("问题描述", "x")])], DataSourceId::Case)
        .await
        .unwrap();
    app.preview_import().await.unwrap();
    app.confirm_import().await.unwrap();

    assert!(backend.keyword_calls().is_empty());
    assert!(!has_notice(&app, NoticeLevel::Warning, "keyword"));
}

#[tokio::test]
async fn test_failed_confirm_keeps_preview() {
    let backend = FakeBackend::new();
    backend.push_preview(Ok(staged("t1", counts(4, 1))));
    backend.push_confirm(Err(ApiError::rejected("临时文件已过期")));
    let app = console(&backend, DataSourceId::Case);

    app.submit_manual_rows(vec![manual_row(&[("问题描述", "x")])], DataSourceId::Case)
        .await
        .unwrap();
    app.preview_import().await.unwrap();

    let err = app.confirm_import().await.unwrap_err();
    assert!(matches!(err, ConsoleError::Staging(_)));

    let session = app.import_session();
    assert_eq!(session.state(), StagingState::Previewed);
    assert_eq!(session.staging_token(), Some("t1"));
    assert_eq!(session.counts(), counts(4, 1));
    assert!(has_notice(&app, NoticeLevel::Error, "临时文件已过期"));
}

#[tokio::test]
async fn test_confirm_requires_a_preview() {
    let backend = FakeBackend::new();
    let app = console(&backend, DataSourceId::Case);

    assert_eq!(
        app.confirm_import().await.unwrap_err(),
        ConsoleError::Validation(ValidationError::NoStagedImport)
    );

    app.submit_manual_rows(vec![manual_row(&[("问题描述", "x")])], DataSourceId::Case)
        .await
        .unwrap();
    assert_eq!(
        app.confirm_import().await.unwrap_err(),
        ConsoleError::Validation(ValidationError::NoStagedImport)
    );
    assert_eq!(confirm_calls(&backend), 0);
}

#[tokio::test]
async fn test_new_submission_replaces_previewed_session() {
    let backend = FakeBackend::new();
    backend.push_preview(Ok(staged("t1", counts(3, 0))));
    let app = console(&backend, DataSourceId::Case);

    app.submit_manual_rows(vec![manual_row(&[("问题描述", "a")])], DataSourceId::Case)
        .await
        .unwrap();
    app.preview_import().await.unwrap();

    let file = ImportFile::new("more.xls", Some("application/vnd.ms-excel"), vec![1]);
    app.submit_import_file(file, DataSourceId::Case).await.unwrap();

    let session = app.import_session();
    assert_eq!(session.state(), StagingState::Draft);
    assert_eq!(session.staging_token(), None);
    assert_eq!(session.counts(), ImportCounts::default());
    assert!(matches!(session.pending(), Some(ImportInput::File(_))));
}

#[tokio::test]
async fn test_submission_during_confirm_waits_for_the_commit() {
    let backend = FakeBackend::new();
    backend.push_preview(Ok(staged("t1", counts(5, 0))));
    backend.push_confirm(Ok(5));
    let app = console(&backend, DataSourceId::Case);

    app.submit_manual_rows(vec![manual_row(&[("问题描述", "x")])], DataSourceId::Case)
        .await
        .unwrap();
    app.preview_import().await.unwrap();

    let gate = backend.gate_confirm();
    let next = ImportFile::new("next.xlsx", Some(XLSX), vec![1]);
    let (confirmed, submitted, ()) = tokio::join!(
        app.confirm_import(),
        app.submit_import_file(next, DataSourceId::Case),
        async {
            tokio::task::yield_now().await;
            gate.notify_one();
        }
    );

    assert_eq!(confirmed, Ok(5));
    assert_eq!(submitted, Ok(()));
    assert!(has_notice(&app, NoticeLevel::Success, "imported 5 rows"));
    assert_eq!(confirm_calls(&backend), 1);

    let session = app.import_session();
    assert_eq!(session.state(), StagingState::Draft);
    assert!(matches!(session.pending(), Some(ImportInput::File(f)) if f.file_name == "next.xlsx"));
}

#[tokio::test]
async fn test_committed_import_is_reported_after_session_changes() {
    let backend = FakeBackend::new();
    backend.push_preview(Ok(staged("t1", counts(3, 1))));
    backend.push_confirm(Ok(2));
    let service = ImportStagingService::new(
        Rc::clone(&backend) as Rc<dyn SearchBackend>,
        DataSourceId::Manual,
        1 << 20,
    );

    service
        .submit_manual_rows(vec![manual_row(&[("标题", "a")])], DataSourceId::Manual)
        .unwrap();
    service.preview().await.unwrap();

    let gate = backend.gate_confirm();
    let (confirmed, ()) = tokio::join!(service.confirm(), async {
        tokio::task::yield_now().await;
        service
            .submit_manual_rows(vec![manual_row(&[("标题", "b")])], DataSourceId::Manual)
            .unwrap();
        gate.notify_one();
    });

    // the server committed the rows, so the count is still returned
    assert_eq!(confirmed, Ok(2));

    // while the newer submission is left untouched
    let session = service.session();
    assert_eq!(session.state(), StagingState::Draft);
    assert_eq!(session.staging_token(), None);
    assert_eq!(
        session.pending(),
        Some(&ImportInput::Rows(vec![manual_row(&[("标题", "b")])]))
    );
}
