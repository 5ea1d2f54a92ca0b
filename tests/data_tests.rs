mod common;

use common::{Fixture, SCHEMA, UI_URL};
use limsmeta::data::{CellValue, DataStore, TableKind, UpdateMethod, fetch_table};
use limsmeta::errors::LimsError;

fn column(table: &limsmeta::data::Table, name: &str) -> Vec<String> {
    let idx = table.column_index(name).expect("column");
    table.rows.iter().map(|r| r[idx].value.to_string()).collect()
}

#[tokio::test]
async fn projects_are_renamed_and_sorted_newest_first() {
    let fixture = Fixture::new(true).await;
    let db = fixture.database();
    let projects = fetch_table(&db, TableKind::Projects, UI_URL).await.unwrap();

    assert_eq!(
        projects.columns,
        vec!["Project LIMS ID", "Project Name", "Open Date", "Comment", "Samples"]
    );
    assert_eq!(column(&projects, "Open Date"), vec!["2024-06-01", "2023-01-10", ""]);
    assert_eq!(column(&projects, "Project LIMS ID"), vec!["NVI2", "NVI1", "NVI3"]);

    let comment = &projects.rows[0][projects.column_index("Comment").unwrap()];
    assert!(comment.html);
    assert_eq!(comment.value.to_string(), "line one<br>line two");

    // NULL becomes empty text
    assert_eq!(projects.rows[1][3].value, CellValue::Text(String::new()));
    assert_eq!(projects.rows[0][4].value, CellValue::Integer(12));
}

#[tokio::test]
async fn sample_limsids_become_links() {
    let fixture = Fixture::new(false).await;
    let db = fixture.database();
    let samples = fetch_table(&db, TableKind::Samples, UI_URL).await.unwrap();

    assert_eq!(column(&samples, "LIMS ID"), vec!["S2", "S1"]);
    let idx = samples.column_index("prep_limsid").unwrap();
    let linked = &samples.rows[1][idx];
    assert!(linked.html);
    assert_eq!(
        linked.value.to_string(),
        format!(
            r#"<a href="{0}/work-complete/101" target="_blank">24-101</a>, <a href="{0}/work-complete/102" target="_blank">24-102</a>"#,
            UI_URL
        )
    );
    assert_eq!(samples.rows[0][idx].value.to_string(), "broken");
}

#[tokio::test]
async fn missing_table_is_not_found() {
    let fixture = Fixture::new(false).await;
    let db = fixture.database();
    let err = db.query_table("reagents").await.unwrap_err();
    assert!(matches!(err, LimsError::NotFound(_)));
}

#[tokio::test]
async fn update_info_from_log() {
    let fixture = Fixture::new(true).await;
    let store = DataStore::load(fixture.database(), UI_URL).await.unwrap();
    let snapshot = store.snapshot();
    let info = &snapshot.update_info;

    assert_eq!(info.method, UpdateMethod::UpdateLog);
    assert_eq!(info.last_update.as_deref(), Some("2024-06-02T09:30:00"));
    assert_eq!(info.recent_updates.len(), 3);
    assert_eq!(info.recent_updates[0].status.as_deref(), Some("failed"));

    let formatted = info.formatted(snapshot.loaded_at);
    assert_eq!(
        formatted.tables,
        vec![
            ("Projects".to_string(), "2024-06-02 08:00".to_string()),
            ("Samples".to_string(), "2024-06-02 09:30".to_string()),
            ("Sequencing".to_string(), "Unknown".to_string()),
        ]
    );
    assert_eq!(formatted.last_update, "2024-06-02 09:30");
}

#[tokio::test]
async fn update_info_falls_back_to_file_time() {
    let fixture = Fixture::new(false).await;
    let store = DataStore::load(fixture.database(), UI_URL).await.unwrap();
    let snapshot = store.snapshot();

    assert_eq!(snapshot.update_info.method, UpdateMethod::FileTimestamp);
    assert!(snapshot.update_info.last_update.is_some());
    assert!(snapshot.update_info.error.is_none());
}

#[tokio::test]
async fn refresh_picks_up_new_version() {
    let fixture = Fixture::new(false).await;
    let store = DataStore::load(fixture.database(), UI_URL).await.unwrap();
    assert_eq!(store.snapshot().projects.len(), 3);

    let sql = format!(
        "{}\nINSERT INTO projects VALUES ('NVI4', 'Newest', '2025-01-01', NULL, 2);",
        SCHEMA
    );
    fixture.add_version("20250101T000000Z", &sql).await;

    let snapshot = store.refresh().await.unwrap();
    assert_eq!(snapshot.projects.len(), 4);
    assert_eq!(snapshot.projects.rows[0][0].value.to_string(), "NVI4");
    assert!(store.last_error().is_none());
}

#[tokio::test]
async fn failed_refresh_keeps_previous_snapshot() {
    let fixture = Fixture::new(false).await;
    let store = DataStore::load(fixture.database(), UI_URL).await.unwrap();

    // A newer version whose database lacks the samples table
    fixture
        .add_version("20250101T000000Z", "CREATE TABLE projects (open_date TEXT);")
        .await;

    assert!(store.refresh().await.is_err());
    assert_eq!(store.snapshot().projects.len(), 3);
    assert!(store.last_error().is_some());
}

#[tokio::test]
async fn unloaded_store_reports_reason() {
    let fixture = Fixture::new(false).await;
    let store = DataStore::unloaded(fixture.database(), UI_URL, "board offline");
    assert!(store.snapshot().projects.is_empty());
    assert_eq!(store.last_error().as_deref(), Some("board offline"));
    assert_eq!(store.snapshot().update_info.method, UpdateMethod::Error);
}
