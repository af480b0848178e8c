use super::*;
use sl_storage::RecordDraft;
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

fn temp_db(label: &str) -> CliConfig {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be monotonic enough for tests")
        .as_nanos();
    let dir: PathBuf = std::env::temp_dir().join(format!(
        "sl-cli-{label}-{}-{nanos}",
        std::process::id()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir must be creatable");
    CliConfig {
        db: dir.join("shoplist.db").to_string_lossy().into_owned(),
        busy_timeout: Duration::from_millis(500),
    }
}

fn found(outcome: Outcome) -> Value {
    assert_eq!(outcome.exit_code(), EXIT_OK);
    match outcome {
        Outcome::Found(value) => value,
        Outcome::NotFound(value) => panic!("expected a value, got {value}"),
    }
}

fn missing(outcome: Outcome) -> Value {
    assert_eq!(outcome.exit_code(), EXIT_NOT_FOUND);
    match outcome {
        Outcome::NotFound(value) => value,
        Outcome::Found(value) => panic!("expected not found, got {value}"),
    }
}

#[test]
fn create_add_and_read_back() {
    let store = open_store(&temp_db("read-back")).expect("store should open");

    let entry = found(
        run(
            &store,
            Command::CreateTable {
                title: "Groceries".to_string(),
            },
        )
        .unwrap(),
    );
    assert_eq!(entry, json!({ "identifier": "products_1", "title": "Groceries" }));

    let added = found(
        run(
            &store,
            Command::Add {
                table: "products_1".to_string(),
                record: RecordDraft::new("Milk", true, Some("2%".to_string())),
            },
        )
        .unwrap(),
    );
    assert_eq!(
        added,
        json!({ "id": 1, "name": "Milk", "flag": true, "note": "2%" })
    );

    let fetched = found(
        run(
            &store,
            Command::Get {
                table: "products_1".to_string(),
                id: 1,
            },
        )
        .unwrap(),
    );
    assert_eq!(fetched, added);

    let page = found(
        run(
            &store,
            Command::List {
                table: "products_1".to_string(),
                offset: None,
                limit: None,
            },
        )
        .unwrap(),
    );
    assert_eq!(page, json!([added]));
}

#[test]
fn row_misses_exit_with_not_found() {
    let store = open_store(&temp_db("row-miss")).expect("store should open");
    run(
        &store,
        Command::CreateTable {
            title: "Groceries".to_string(),
        },
    )
    .unwrap();

    let body = missing(
        run(
            &store,
            Command::Get {
                table: "products_1".to_string(),
                id: 42,
            },
        )
        .unwrap(),
    );
    assert_eq!(body["code"], "NOT_FOUND");
    assert_eq!(body["message"], "record not found");

    missing(
        run(
            &store,
            Command::Update {
                table: "products_1".to_string(),
                id: 42,
                record: RecordDraft::new("Ghost", false, None),
            },
        )
        .unwrap(),
    );
    missing(
        run(
            &store,
            Command::Delete {
                table: "products_1".to_string(),
                id: 42,
            },
        )
        .unwrap(),
    );

    let body = missing(
        run(
            &store,
            Command::DescribeTable {
                table: "products_9".to_string(),
            },
        )
        .unwrap(),
    );
    assert_eq!(body["message"], "table not found");
}

#[test]
fn dropped_table_maps_to_not_found_exit() {
    let store = open_store(&temp_db("dropped")).expect("store should open");
    run(
        &store,
        Command::CreateTable {
            title: "Short lived".to_string(),
        },
    )
    .unwrap();

    let dropped = found(
        run(
            &store,
            Command::DropTable {
                table: "products_1".to_string(),
            },
        )
        .unwrap(),
    );
    assert_eq!(dropped, json!({ "table": "products_1", "dropped": true }));

    let Err(err) = run(
        &store,
        Command::ListAll {
            table: "products_1".to_string(),
        },
    ) else {
        panic!("listing a dropped table must fail");
    };
    assert!(matches!(err, StoreError::UnknownTable(_)));
    assert_eq!(error_exit_code(&err), EXIT_NOT_FOUND);
}

#[test]
fn invalid_identifier_maps_to_failure_exit() {
    let store = open_store(&temp_db("invalid")).expect("store should open");

    let Err(err) = run(
        &store,
        Command::Get {
            table: "products_1; DROP TABLE table_metadata".to_string(),
            id: 1,
        },
    ) else {
        panic!("hostile identifier must be rejected");
    };
    assert_eq!(err.code(), "INVALID_IDENTIFIER");
    assert_eq!(error_exit_code(&err), EXIT_FAILURE);

    let Err(err) = run(
        &store,
        Command::List {
            table: "products_1".to_string(),
            offset: None,
            limit: Some(0),
        },
    ) else {
        panic!("zero limit must be rejected");
    };
    assert_eq!(error_exit_code(&err), EXIT_FAILURE);
}
