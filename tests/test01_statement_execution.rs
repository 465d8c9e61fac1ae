mod common;

use common::{Executed, Reply, connect, rows, run};
use futures_util::StreamExt;
use sql_stream_bridge::engine::{EngineError, GeneratedKeys, TypeTag, Value};
use sql_stream_bridge::types::Geometry;
use sql_stream_bridge::{BridgeError, EngineFailureKind, ErrorKind, HostType, HostValue, Parameter};

fn select_echo(sql: &str, _params: &[Value]) -> Reply {
    let n: i32 = sql.trim_start_matches("SELECT ").parse().unwrap_or(0);
    Reply::rows(&[("N", TypeTag::Integer)], vec![vec![Value::Integer(n)]])
}

#[tokio::test]
async fn multi_statement_body_yields_one_result_per_statement() -> Result<(), BridgeError> {
    let (conn, recorder) = connect(select_echo);
    let stmt = conn.create_statement("SELECT 1; SELECT 2")?;

    let results = run(&stmt).await?;
    assert_eq!(results.len(), 2);
    let mut seen = Vec::new();
    for result in results {
        let rows = rows(result).await?;
        assert_eq!(rows.len(), 1);
        seen.push(rows[0].get::<i32>(0)?);
    }
    assert_eq!(seen, vec![Some(1), Some(2)]);
    assert_eq!(recorder.executed_sql(), vec!["SELECT 1", "SELECT 2"]);
    Ok(())
}

#[tokio::test]
async fn statements_run_statement_major_then_group_minor() -> Result<(), BridgeError> {
    let (conn, recorder) = connect(|_, _| Reply::update(1));
    let mut stmt = conn.create_statement("INSERT INTO a VALUES ($1); INSERT INTO b VALUES ($1)")?;
    stmt.bind(0, 1_i32)?.add()?.bind(0, 2_i32)?;

    let counts: Vec<_> = run(&stmt)
        .await?
        .iter()
        .map(sql_stream_bridge::QueryResult::rows_updated)
        .collect();
    assert_eq!(counts, vec![Some(1); 4]);

    let order: Vec<_> = recorder
        .executed()
        .into_iter()
        .map(|e| (e.sql, e.params))
        .collect();
    assert_eq!(
        order,
        vec![
            ("INSERT INTO a VALUES ($1)".to_string(), vec![Value::Integer(1)]),
            ("INSERT INTO a VALUES ($1)".to_string(), vec![Value::Integer(2)]),
            ("INSERT INTO b VALUES ($1)".to_string(), vec![Value::Integer(1)]),
            ("INSERT INTO b VALUES ($1)".to_string(), vec![Value::Integer(2)]),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn out_of_order_binds_share_one_group() -> Result<(), BridgeError> {
    let (conn, recorder) = connect(|_, _| Reply::update(1));
    let mut stmt = conn.create_statement("INSERT INTO t VALUES ($1, $2, $3)")?;
    stmt.bind(2, 300_i32)?.bind(0, 100_i32)?.bind(1, 200_i32)?;
    run(&stmt).await?;

    let executed = recorder.executed();
    assert_eq!(executed.len(), 1);
    assert_eq!(
        executed[0].params,
        vec![Value::Integer(100), Value::Integer(200), Value::Integer(300)]
    );
    Ok(())
}

#[tokio::test]
async fn unbound_statement_executes_once_without_parameters() -> Result<(), BridgeError> {
    let (conn, recorder) = connect(|_, _| Reply::update(0));
    let stmt = conn.create_statement("DELETE FROM t")?;
    let results = run(&stmt).await?;
    assert_eq!(results.len(), 1);
    assert_eq!(
        recorder.executed(),
        vec![Executed {
            sql: "DELETE FROM t".into(),
            params: Vec::new(),
            keys: GeneratedKeys::None,
        }]
    );
    Ok(())
}

#[tokio::test]
async fn add_without_bind_is_invalid_state() {
    let (conn, _) = connect(|_, _| Reply::update(1));
    let mut stmt = conn.create_statement("INSERT INTO t VALUES ($1)").unwrap();
    let err = stmt.add().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);

    stmt.bind(0, 1_i32).unwrap().add().unwrap();
    let err = stmt.add().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
}

#[tokio::test]
async fn unfinished_binding_fails_before_anything_runs() {
    let (conn, recorder) = connect(|_, _| Reply::update(1));
    let mut stmt = conn.create_statement("INSERT INTO t VALUES ($1)").unwrap();
    stmt.bind(0, 1_i32).unwrap().add().unwrap();

    let err = stmt.execute().err().unwrap();
    assert_eq!(err, BridgeError::InvalidState("No unfinished bindings!".into()));
    assert!(recorder.executed().is_empty());
}

#[tokio::test]
async fn parameter_gap_is_invalid_state() {
    let (conn, _) = connect(|_, _| Reply::update(1));
    let mut stmt = conn.create_statement("INSERT INTO t VALUES ($1, $2)").unwrap();
    stmt.bind(1, 2_i32).unwrap();
    let err = stmt.execute().err().unwrap();
    assert_eq!(err, BridgeError::InvalidState("Parameter #1 is not set".into()));
}

#[tokio::test]
async fn named_binds_use_one_based_identifiers() -> Result<(), BridgeError> {
    let (conn, recorder) = connect(|_, _| Reply::update(1));
    let mut stmt = conn.create_statement("INSERT INTO t VALUES ($1, $2)")?;
    stmt.bind_name("$2", "two")?.bind_name("?1", 1_i64)?;
    run(&stmt).await?;
    assert_eq!(
        recorder.executed()[0].params,
        vec![Value::BigInt(1), Value::Varchar("two".into())]
    );

    for bad in ["$0", "x", "$", "1"] {
        let err = stmt.bind_name(bad, 1_i32).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument, "{bad}");
    }
    Ok(())
}

#[tokio::test]
async fn nulls_and_parameters_bind_through_codecs() -> Result<(), BridgeError> {
    let (conn, recorder) = connect(|_, _| Reply::update(1));
    let mut stmt = conn.create_statement("INSERT INTO t VALUES ($1, $2, $3, $4)")?;
    stmt.bind_null(0, HostType::String)?
        .bind_null_name("$2", HostType::I32)?
        .bind(2, Parameter::new(5_i32))?
        .bind(3, Parameter::null(HostType::Decimal))?;
    run(&stmt).await?;
    assert_eq!(
        recorder.executed()[0].params,
        vec![Value::Null, Value::Null, Value::Integer(5), Value::Null]
    );
    Ok(())
}

#[tokio::test]
async fn values_without_a_codec_are_rejected_at_bind_time() {
    let (conn, _) = connect(|_, _| Reply::update(1));
    let mut stmt = conn.create_statement("INSERT INTO t VALUES ($1)").unwrap();
    let err = stmt
        .bind(0, HostValue::Geometry(Geometry::new("POINT (1 2)")))
        .err()
        .unwrap();
    assert_eq!(err.kind(), ErrorKind::UnsupportedType);
    assert_eq!(stmt.bindings().groups().len(), 0);
}

#[tokio::test]
async fn generated_keys_replace_the_update_rows() -> Result<(), BridgeError> {
    let (conn, recorder) = connect(|sql, params| {
        if sql.starts_with("INSERT") {
            Reply::update_with_keys(1, "ID", &[42])
        } else {
            select_echo(sql, params)
        }
    });
    let mut stmt = conn.create_statement("INSERT INTO t (name) VALUES ('x'); SELECT 7")?;
    stmt.return_generated_values(Vec::<String>::new());

    let mut results = run(&stmt).await?.into_iter();
    let insert = results.next().unwrap();
    assert_eq!(insert.rows_updated(), Some(1));
    assert_eq!(insert.metadata().unwrap().column_names(), vec!["ID"]);
    let keys = rows(insert).await?;
    assert_eq!(keys[0].get_by_name::<i64>("id")?, Some(42));

    let select = results.next().unwrap();
    assert_eq!(select.rows_updated(), None);
    assert_eq!(rows(select).await?[0].get::<i32>(0)?, Some(7));

    assert_eq!(recorder.executed()[0].keys, GeneratedKeys::AllColumns);
    Ok(())
}

#[tokio::test]
async fn named_generated_columns_reach_the_engine() -> Result<(), BridgeError> {
    let (conn, recorder) = connect(|_, _| Reply::update_with_keys(1, "ID", &[9]));
    let mut stmt = conn.create_statement("INSERT INTO t (name) VALUES ('x')")?;
    stmt.return_generated_values(["ID"]);
    run(&stmt).await?;
    assert_eq!(
        recorder.executed()[0].keys,
        GeneratedKeys::Columns(vec!["ID".into()])
    );
    Ok(())
}

#[tokio::test]
async fn unrequested_generated_keys_are_closed() -> Result<(), BridgeError> {
    let (conn, recorder) = connect(|_, _| Reply::update_with_keys(1, "ID", &[9]));
    let stmt = conn.create_statement("INSERT INTO t (name) VALUES ('x')")?;
    let results = run(&stmt).await?;
    assert!(results[0].metadata().is_none());
    assert_eq!(recorder.cursors_closed(), 1);
    assert_eq!(conn.open_cursors().await?, 0);
    Ok(())
}

#[tokio::test]
async fn engine_failure_ends_the_result_stream() {
    let (conn, recorder) = connect(|sql, params| {
        if sql == "SELEC 2" {
            Reply::Fail(EngineError::syntax("Syntax error in SQL statement"))
        } else {
            select_echo(sql, params)
        }
    });
    let stmt = conn
        .create_statement("SELECT 1; SELEC 2; SELECT 3")
        .unwrap();
    let mut results = stmt.execute().unwrap();

    assert!(results.next().await.unwrap().is_ok());
    let err = results.next().await.unwrap().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EngineFailure);
    assert_eq!(err.engine_kind(), Some(EngineFailureKind::BadGrammar));
    assert!(results.next().await.is_none());
    assert_eq!(recorder.executed_sql(), vec!["SELECT 1"]);
}

#[tokio::test]
async fn separators_inside_literals_do_not_split() -> Result<(), BridgeError> {
    let (conn, recorder) = connect(|_, _| Reply::update(1));
    let stmt = conn.create_statement(
        "INSERT INTO t VALUES ('a;b'); /* x; y */ INSERT INTO u VALUES ($$c;d$$);",
    )?;
    run(&stmt).await?;
    assert_eq!(
        recorder.executed_sql(),
        vec![
            "INSERT INTO t VALUES ('a;b')",
            "/* x; y */ INSERT INTO u VALUES ($$c;d$$)"
        ]
    );
    Ok(())
}

#[tokio::test]
async fn blank_sql_is_rejected() {
    let (conn, _) = connect(|_, _| Reply::update(1));
    let err = conn.create_statement("   ").err().unwrap();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    let err = conn.create_batch().add("").err().unwrap();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

#[tokio::test]
async fn batch_runs_each_statement_verbatim() -> Result<(), BridgeError> {
    let (conn, recorder) = connect(|_, _| Reply::update(2));
    let mut batch = conn.create_batch();
    batch
        .add("UPDATE a SET x = 1")?
        .add("UPDATE b SET y = 'p;q'; UPDATE c SET z = 0")?;
    assert_eq!(batch.len(), 2);

    let results: Vec<_> = batch.execute().collect().await;
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.as_ref().unwrap().rows_updated() == Some(2)));
    assert_eq!(
        recorder.executed_sql(),
        vec!["UPDATE a SET x = 1", "UPDATE b SET y = 'p;q'; UPDATE c SET z = 0"]
    );
    Ok(())
}
