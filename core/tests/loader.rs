//! Loader tests: column normalization, required-column check, value
//! conversion and fatal database errors.

use dashboard_core::{
    config::{ColumnMap, DashboardConfig},
    error::DashError,
    store::{load_dataset, DashboardStore},
};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn seeded_store(sql: &str) -> DashboardStore {
    let _ = env_logger::builder().is_test(true).try_init();
    let store = DashboardStore::in_memory().expect("in-memory store");
    store.execute_batch(sql).expect("seed fixture");
    store
}

const COVERAGE_FIXTURE: &str = "
    CREATE TABLE coverage (
        \" Analysis_Count \" INTEGER,
        \"TARGET_POPULATION\" REAL,
        \"City\" TEXT,
        \"Partner\" TEXT,
        \"REGION \" TEXT,
        \"notes\" TEXT
    );
    INSERT INTO coverage VALUES (10, 100.0, 'A', 'X', 'North', 'first');
    INSERT INTO coverage VALUES (5, 50.0, 'B', 'Y', 'South', NULL);
";

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn labels_are_normalized_before_matching() {
    let store = seeded_store(COVERAGE_FIXTURE);

    let raw = store.load_table("coverage").unwrap();
    assert_eq!(
        raw.columns,
        vec!["analysis_count", "target_population", "city", "partner", "region", "notes"]
    );

    let dataset = store.load_dataset("coverage", &ColumnMap::default()).unwrap();
    assert_eq!(dataset.len(), 2);
    let first = &dataset.records()[0];
    assert_eq!(first.analysis_count, 10.0);
    assert_eq!(first.target_population, 100.0);
    assert_eq!(first.region.as_deref(), Some("North"));
}

#[test]
fn missing_columns_are_fatal_and_list_what_was_found() {
    let store = seeded_store(
        "CREATE TABLE coverage (analysis_count INTEGER, city TEXT, partner TEXT);
         INSERT INTO coverage VALUES (1, 'A', 'X');",
    );

    let err = store
        .load_dataset("coverage", &ColumnMap::default())
        .expect_err("load must fail without region and population");

    match err {
        DashError::MissingColumns { missing, available } => {
            assert_eq!(missing, vec!["target_population", "region"]);
            assert_eq!(available, vec!["analysis_count", "city", "partner"]);
        }
        other => panic!("expected MissingColumns, got {other:?}"),
    }
}

#[test]
fn custom_column_names_are_honoured() {
    let store = seeded_store(
        "CREATE TABLE mi_tabla (Analisis INTEGER, Total_PO INTEGER, Ciudad TEXT, Aliado TEXT, Región TEXT);
         INSERT INTO mi_tabla VALUES (3, 30, 'Cali', 'Z', 'Occidente');",
    );
    let columns = ColumnMap {
        analysis_count:    "analisis".into(),
        target_population: "total_po".into(),
        city:              "ciudad".into(),
        partner:           "aliado".into(),
        region:            "Región".into(),
    };

    let dataset = store.load_dataset("mi_tabla", &columns).unwrap();
    assert_eq!(dataset.records()[0].city.as_deref(), Some("Cali"));
    assert_eq!(dataset.records()[0].region.as_deref(), Some("Occidente"));
}

#[test]
fn nulls_and_text_numbers_are_converted() {
    let store = seeded_store(
        "CREATE TABLE coverage (analysis_count, target_population, city, partner, region);
         INSERT INTO coverage VALUES (NULL, ' 40 ', 'A', NULL, 7);",
    );

    let dataset = store.load_dataset("coverage", &ColumnMap::default()).unwrap();
    let row = &dataset.records()[0];
    assert_eq!(row.analysis_count, 0.0);
    assert_eq!(row.target_population, 40.0);
    assert_eq!(row.partner, None);
    assert_eq!(row.region.as_deref(), Some("7"));
}

#[test]
fn non_numeric_text_in_a_numeric_column_is_fatal() {
    let store = seeded_store(
        "CREATE TABLE coverage (analysis_count, target_population, city, partner, region);
         INSERT INTO coverage VALUES (1, 10, 'A', 'X', 'North');
         INSERT INTO coverage VALUES ('many', 10, 'A', 'X', 'North');",
    );

    let err = store.load_dataset("coverage", &ColumnMap::default()).unwrap_err();
    assert!(
        matches!(err, DashError::InvalidNumber { row: 1, ref column, .. } if column == "analysis_count"),
        "unexpected error: {err}"
    );
}

#[test]
fn non_finite_text_numbers_are_fatal() {
    for (analysis, population) in [("'NaN'", "10"), ("5", "'inf'"), ("5", "'-Infinity'")] {
        let store = seeded_store(&format!(
            "CREATE TABLE coverage (analysis_count, target_population, city, partner, region);
             INSERT INTO coverage VALUES ({analysis}, {population}, 'A', 'X', 'North');"
        ));

        let err = store
            .load_dataset("coverage", &ColumnMap::default())
            .expect_err("non-finite cell must not load");
        assert!(
            matches!(err, DashError::InvalidNumber { row: 0, .. }),
            "unexpected error for ({analysis}, {population}): {err}"
        );
    }
}

#[test]
fn schema_qualified_table_names_load() {
    let store = seeded_store(COVERAGE_FIXTURE);
    let dataset = store
        .load_dataset("main.coverage", &ColumnMap::default())
        .expect("schema-qualified name should resolve");
    assert_eq!(dataset.len(), 2);
}

#[test]
fn file_database_loads_read_only() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("dashboard.db");
    let path = path.to_str().expect("utf-8 path").to_string();
    {
        let conn = rusqlite::Connection::open(&path).expect("create fixture db");
        conn.execute_batch(COVERAGE_FIXTURE).expect("seed fixture");
    }

    let config = DashboardConfig {
        database: path.clone(),
        ..DashboardConfig::default()
    };
    let dataset = load_dataset(&config).expect("load from file");
    assert_eq!(dataset.len(), 2);

    let store = DashboardStore::open(&path).unwrap();
    let write = store.execute_batch("DELETE FROM coverage;");
    assert!(
        matches!(write, Err(DashError::Database(_))),
        "loader connection must refuse writes"
    );
}

#[test]
fn unknown_table_surfaces_the_database_error() {
    let store = seeded_store("CREATE TABLE other (x INTEGER);");
    let err = store.load_table("coverage").unwrap_err();
    assert!(matches!(err, DashError::Database(_)), "unexpected error: {err}");
    assert!(err.to_string().contains("coverage"), "error should name the table: {err}");
}

#[test]
fn unreachable_database_fails_the_load() {
    let config = DashboardConfig {
        database: "/nonexistent-dir/dashboard.db".into(),
        ..DashboardConfig::default()
    };
    let err = load_dataset(&config).unwrap_err();
    assert!(matches!(err, DashError::Database(_)), "unexpected error: {err}");
}

#[test]
fn empty_table_loads_as_an_empty_dataset() {
    let store = seeded_store(
        "CREATE TABLE coverage (analysis_count, target_population, city, partner, region);",
    );
    let dataset = store.load_dataset("coverage", &ColumnMap::default()).unwrap();
    assert!(dataset.is_empty());
}
