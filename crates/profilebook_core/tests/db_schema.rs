use profilebook_core::db::schema::reset_schema;
use profilebook_core::db::{open_db, open_db_in_memory};
use profilebook_core::{
    AddressInput, PersonInput, PersonService, PersonStore, RepoError, SqlitePersonRepository,
};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_creates_empty_tables_with_foreign_keys_on() {
    let conn = open_db_in_memory().unwrap();

    assert_table_exists(&conn, "personal_details");
    assert_table_exists(&conn, "communication_addresses");
    assert_eq!(count_rows(&conn, "personal_details"), 0);
    assert_eq!(count_rows(&conn, "communication_addresses"), 0);

    let foreign_keys: i64 = conn
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(foreign_keys, 1);
}

#[test]
fn address_person_id_cascades_on_delete() {
    let conn = open_db_in_memory().unwrap();

    let (table, from, to, on_delete): (String, String, String, String) = conn
        .query_row(
            "SELECT \"table\", \"from\", \"to\", on_delete
             FROM pragma_foreign_key_list('communication_addresses');",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )
        .unwrap();
    assert_eq!(table, "personal_details");
    assert_eq!(from, "person_id");
    assert_eq!(to, "id");
    assert_eq!(on_delete, "CASCADE");
}

#[test]
fn foreign_key_rejects_orphan_address() {
    let conn = open_db_in_memory().unwrap();

    let result = conn.execute(
        "INSERT INTO communication_addresses (person_id, communication_address)
         VALUES (42, '456 Other Street Name');",
        [],
    );
    assert!(result.is_err());
}

#[test]
fn reopening_file_database_wipes_previous_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("PersonalDetailsDB.sqlite3");

    let mut conn_first = open_db(&path).unwrap();
    {
        let repo = SqlitePersonRepository::try_new(&mut conn_first).unwrap();
        let mut service = PersonService::new(repo);
        service.create(&sample_person(), &sample_address()).unwrap();
    }
    assert_eq!(count_rows(&conn_first, "personal_details"), 1);
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(count_rows(&conn_second, "personal_details"), 0);
    assert_eq!(count_rows(&conn_second, "communication_addresses"), 0);
}

#[test]
fn reset_schema_clears_populated_connection() {
    let mut conn = open_db_in_memory().unwrap();
    {
        let repo = SqlitePersonRepository::try_new(&mut conn).unwrap();
        let mut service = PersonService::new(repo);
        service.create(&sample_person(), &sample_address()).unwrap();
    }

    reset_schema(&mut conn).unwrap();

    assert_eq!(count_rows(&conn, "personal_details"), 0);
    assert_eq!(count_rows(&conn, "communication_addresses"), 0);
}

#[test]
fn repository_rejects_connection_without_tables() {
    let mut conn = Connection::open_in_memory().unwrap();

    let result = SqlitePersonRepository::try_new(&mut conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredTable("personal_details"))
    ));
}

#[test]
fn person_store_checks_tables_once_and_serves_repositories() {
    let conn = Connection::open_in_memory().unwrap();
    assert!(matches!(
        PersonStore::try_new(conn),
        Err(RepoError::MissingRequiredTable("personal_details"))
    ));

    let mut store = PersonStore::try_new(open_db_in_memory().unwrap()).unwrap();
    let id = PersonService::new(store.repository())
        .create(&sample_person(), &sample_address())
        .unwrap();

    let people = PersonService::new(store.repository()).list_all().unwrap();
    assert_eq!(people.len(), 1);
    assert_eq!(people[0].person.id, id);
}

#[test]
fn repository_rejects_connection_missing_required_column() {
    let mut conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE personal_details (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT NOT NULL,
            phone TEXT NOT NULL,
            age INTEGER NOT NULL,
            permanent_address TEXT NOT NULL
        );",
    )
    .unwrap();

    let result = SqlitePersonRepository::try_new(&mut conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredColumn {
            table: "personal_details",
            column: "password"
        })
    ));
}

fn sample_person() -> PersonInput {
    PersonInput {
        name: "Ann".to_string(),
        email: "Ann@X.com".to_string(),
        phone: "9876543210".to_string(),
        age: "30".to_string(),
        permanent_address: "123 Long Street Name".to_string(),
        password: "Abc123!".to_string(),
    }
}

fn sample_address() -> AddressInput {
    AddressInput {
        communication_address: "456 Other Street Name".to_string(),
    }
}

fn count_rows(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
