// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use fintrack::commands::{doctor, exporter, transactions};
use fintrack::config::Config;
use fintrack::db::{init_schema, open_or_init};
use fintrack::ledger::accounts::find_account;
use fintrack::ledger::check::check_balances;
use fintrack::ledger::users::add_user;
use fintrack::models::UserId;
use fintrack::{cli, utils};
use rusqlite::{Connection, params};
use rust_decimal::Decimal;

fn setup() -> (Connection, UserId) {
    let mut conn = Connection::open_in_memory().unwrap();
    init_schema(&conn).unwrap();
    let user = add_user(&mut conn, "alice", false).unwrap();
    (conn, user.id)
}

fn run_tx(conn: &mut Connection, user: UserId, args: &[&str]) {
    let mut argv = vec!["fintrack", "tx"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    if let Some(("tx", tx_m)) = matches.subcommand() {
        transactions::handle(conn, user, tx_m).unwrap();
    } else {
        panic!("no tx subcommand");
    }
}

fn seed(conn: &mut Connection, user: UserId) {
    for (date, category, amount) in [
        ("2025-01-01", "Food", "10"),
        ("2025-01-02", "Transport", "4.50"),
        ("2025-01-03", "Food", "12"),
        ("2025-02-01", "Salary", "900"),
    ] {
        run_tx(
            conn,
            user,
            &[
                "add",
                "--date",
                date,
                "--account",
                "Checking Account",
                "--category",
                category,
                "--amount",
                amount,
            ],
        );
    }
}

fn checking(conn: &Connection, user: UserId) -> Decimal {
    find_account(conn, user, "Checking Account")
        .unwrap()
        .current_balance
}

#[test]
fn add_infers_type_from_category() {
    let (mut conn, user) = setup();
    seed(&mut conn, user);
    assert_eq!(checking(&conn, user), "873.50".parse::<Decimal>().unwrap());
}

#[test]
fn list_limit_and_month_respected() {
    let (mut conn, user) = setup();
    seed(&mut conn, user);
    let matches = cli::build_cli().get_matches_from([
        "fintrack", "tx", "list", "--month", "2025-01", "--limit", "2",
    ]);
    if let Some(("tx", tx_m)) = matches.subcommand() {
        if let Some(("list", list_m)) = tx_m.subcommand() {
            let rows = transactions::query_rows(&conn, user, list_m).unwrap();
            assert_eq!(rows.len(), 2);
            assert_eq!(rows[0].date, "2025-01-03");
            assert_eq!(rows[1].category, "Transport");
        } else {
            panic!("no list subcommand");
        }
    } else {
        panic!("no tx subcommand");
    }
}

#[test]
fn edit_moving_to_income_category_flips_effect() {
    let (mut conn, user) = setup();
    run_tx(
        &mut conn,
        user,
        &[
            "add", "--date", "2025-03-01", "--account", "Checking Account", "--category", "Food",
            "--amount", "12.50",
        ],
    );
    assert_eq!(checking(&conn, user), "-12.50".parse::<Decimal>().unwrap());
    let id: i64 = conn
        .query_row("SELECT id FROM transactions", [], |r| r.get(0))
        .unwrap();
    let id = id.to_string();

    run_tx(&mut conn, user, &["edit", "--id", &id, "--category", "Gifts"]);
    assert_eq!(checking(&conn, user), "12.50".parse::<Decimal>().unwrap());

    run_tx(&mut conn, user, &["rm", "--id", &id]);
    assert_eq!(checking(&conn, user), Decimal::ZERO);
}

#[test]
fn export_csv_and_json() {
    let (mut conn, user) = setup();
    seed(&mut conn, user);
    let dir = tempfile::tempdir().unwrap();

    let csv_path = dir.path().join("tx.csv");
    let matches = cli::build_cli().get_matches_from([
        "fintrack",
        "export",
        "transactions",
        "--format",
        "csv",
        "--out",
        csv_path.to_str().unwrap(),
    ]);
    if let Some(("export", sub)) = matches.subcommand() {
        exporter::handle(&conn, user, sub).unwrap();
    }
    let mut rdr = csv::Reader::from_path(&csv_path).unwrap();
    let headers = rdr.headers().unwrap().clone();
    assert_eq!(&headers[1], "date");
    let records: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
    assert_eq!(records.len(), 4);
    assert_eq!(&records[0][1], "2025-01-01");
    assert_eq!(&records[3][4], "Income");

    let json_path = dir.path().join("tx.json");
    let matches = cli::build_cli().get_matches_from([
        "fintrack",
        "export",
        "transactions",
        "--format",
        "json",
        "--out",
        json_path.to_str().unwrap(),
    ]);
    if let Some(("export", sub)) = matches.subcommand() {
        exporter::handle(&conn, user, sub).unwrap();
    }
    let v: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    let arr = v.as_array().unwrap();
    assert_eq!(arr.len(), 4);
    assert_eq!(arr[1]["category"], "Transport");
    assert_eq!(arr[1]["type"], "Expense");
}

#[test]
fn doctor_fix_repairs_drift() {
    let (mut conn, user) = setup();
    seed(&mut conn, user);
    conn.execute(
        "UPDATE accounts SET current_balance='0' WHERE user_id=?1 AND name='Checking Account'",
        params![user],
    )
    .unwrap();
    assert!(check_balances(&conn, user).unwrap().iter().any(|c| !c.is_consistent()));

    let matches = cli::build_cli().get_matches_from(["fintrack", "doctor", "--fix"]);
    if let Some(("doctor", sub)) = matches.subcommand() {
        doctor::handle(&mut conn, user, sub).unwrap();
    }
    assert!(check_balances(&conn, user).unwrap().iter().all(|c| c.is_consistent()));
    assert_eq!(checking(&conn, user), "873.50".parse::<Decimal>().unwrap());
}

#[test]
fn config_resolves_user_from_flags() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("nested").join("ledger.sqlite");
    let matches = cli::build_cli().get_matches_from([
        "fintrack",
        "--db",
        db_path.to_str().unwrap(),
        "--user",
        "carol",
        "report",
        "balances",
    ]);
    let config = Config::from_matches(&matches).unwrap();
    assert_eq!(config.db_path, db_path);
    assert_eq!(config.user.as_deref(), Some("carol"));

    let mut conn = open_or_init(&config.db_path).unwrap();
    assert!(config.resolve_user(&mut conn).is_err());

    let carol = add_user(&mut conn, "carol", false).unwrap();
    assert_eq!(config.resolve_user(&mut conn).unwrap(), carol.id);
}

#[test]
fn currency_symbol_setting() {
    let (conn, _) = setup();
    assert_eq!(utils::currency_symbol(&conn).unwrap(), "$");
    utils::set_setting(&conn, "currency_symbol", "€").unwrap();
    assert_eq!(utils::currency_symbol(&conn).unwrap(), "€");
    assert!(utils::set_setting(&conn, "theme", "dark").is_err());
}
