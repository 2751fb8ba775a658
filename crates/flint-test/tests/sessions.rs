//! Session isolation, function lifetimes and concurrent use.

use std::sync::Arc;
use std::thread;

use flint_common::{EngineConfig, ErrorCode, FlintError};
use flint_session::{Engine, FunctionLifetime, Session};
use flint_test::fixtures::{self, people, people2};

const THREADS: usize = 10;
const ROUNDS: usize = 25;

fn engine() -> Engine {
    flint_test::init_tracing();
    Engine::builder()
        .config(EngineConfig::for_testing())
        .planner(fixtures::people_planner())
        .build()
        .unwrap()
}

fn register_people(session: &Session) {
    session.create_or_replace_temp_view("people", people()).unwrap();
    session.create_or_replace_temp_view("people2", people2()).unwrap();
}

const QUERIES: [&str; 4] = [
    fixtures::GROUP_COUNT_SQL,
    fixtures::SEMI_JOIN_SQL,
    fixtures::ANTI_JOIN_SQL,
    fixtures::UNION_SQL,
];

#[test]
fn test_concurrent_sessions_match_single_threaded() {
    let engine = engine();
    let root = engine.create_session();
    register_people(&root);
    let expected: Vec<String> = QUERIES
        .iter()
        .map(|sql| root.sql_directly(sql).unwrap().to_string())
        .collect();

    thread::scope(|scope| {
        for _ in 0..THREADS {
            let root = root.clone();
            let expected = &expected;
            scope.spawn(move || {
                let session = root.new_session().unwrap();
                register_people(&session);
                for _ in 0..ROUNDS {
                    for (sql, want) in QUERIES.iter().zip(expected) {
                        assert_eq!(&session.sql_directly(sql).unwrap().to_string(), want);
                    }
                }
                session.close();
            });
        }
    });

    let stats = engine.stats();
    assert_eq!(stats.total_sessions, 1 + THREADS as u64);
    assert_eq!(stats.active_sessions, 1);
    assert_eq!(
        stats.direct_executions,
        (QUERIES.len() * (1 + THREADS * ROUNDS)) as u64
    );
    assert_eq!(stats.failed_executions, 0);
}

#[test]
fn test_shared_session_across_threads() {
    let session = engine().create_session();
    register_people(&session);

    thread::scope(|scope| {
        for i in 0..THREADS {
            let session = &session;
            scope.spawn(move || {
                let name = format!("view_{}", i);
                session.create_or_replace_temp_view(&name, people()).unwrap();
                for _ in 0..ROUNDS {
                    assert_eq!(
                        session
                            .sql_directly(fixtures::GROUP_COUNT_SQL)
                            .unwrap()
                            .to_string(),
                        "[0,2],[1,3]"
                    );
                }
                assert!(session.temp_view(&name).is_ok());
            });
        }
    });

    assert_eq!(session.temp_view_names().unwrap().len(), THREADS + 2);
}

#[test]
fn test_new_session_does_not_see_views() {
    let session = engine().create_session();
    register_people(&session);
    let fresh = session.new_session().unwrap();
    assert!(matches!(
        fresh.sql_directly(fixtures::GROUP_COUNT_SQL),
        Err(FlintError::UnresolvedView { .. })
    ));
}

#[test]
fn test_clone_session_diverges() {
    let session = engine().create_session();
    register_people(&session);
    let cloned = session.clone_session().unwrap();

    assert_eq!(
        cloned.sql_directly(fixtures::GROUP_COUNT_SQL).unwrap().to_string(),
        "[0,2],[1,3]"
    );

    cloned.create_or_replace_temp_view("people", people2()).unwrap();
    assert_eq!(
        cloned.sql_directly(fixtures::GROUP_COUNT_SQL).unwrap().to_string(),
        "[0,3],[1,2]"
    );
    assert_eq!(
        session.sql_directly(fixtures::GROUP_COUNT_SQL).unwrap().to_string(),
        "[0,2],[1,3]"
    );
}

#[test]
fn test_permanent_function_visible_to_later_sessions() {
    let engine = engine();
    let session = engine.create_session();
    let existing = engine.create_session();
    session
        .register_function(
            "hive_strlen2",
            fixtures::hive_strlen2_overloads(),
            FunctionLifetime::Permanent,
        )
        .unwrap();

    for other in [existing, engine.create_session(), session.new_session().unwrap()] {
        let table = other.sql_directly(fixtures::HIVE_STRLEN2_SQL).unwrap();
        assert_eq!(table.to_string(), "[8,200]");
    }
}

#[test]
fn test_temporary_function_stays_in_session() {
    let engine = engine();
    let session = engine.create_session();
    session
        .register_function(
            "hive_strlen2",
            fixtures::hive_strlen2_overloads(),
            FunctionLifetime::Temporary,
        )
        .unwrap();
    assert_eq!(
        session.sql_directly(fixtures::HIVE_STRLEN2_SQL).unwrap().to_string(),
        "[8,200]"
    );

    for other in [engine.create_session(), session.new_session().unwrap()] {
        let err = other.sql_directly(fixtures::HIVE_STRLEN2_SQL).unwrap_err();
        assert_eq!(err.code(), ErrorCode::UnresolvedFunction);
    }

    // a cloned session snapshots temporaries too
    let cloned = session.clone_session().unwrap();
    assert!(cloned.sql_directly(fixtures::HIVE_STRLEN2_SQL).is_ok());
}

#[test]
fn test_close_isolation() {
    let engine = engine();
    let closing = engine.create_session();
    let survivor: Arc<Session> = closing.new_session().unwrap();
    register_people(&closing);
    register_people(&survivor);

    closing.close();

    assert!(matches!(
        closing.sql_directly(fixtures::GROUP_COUNT_SQL),
        Err(FlintError::SessionClosed { .. })
    ));
    assert!(closing.temp_view_names().is_err());
    assert_eq!(
        survivor.sql_directly(fixtures::GROUP_COUNT_SQL).unwrap().to_string(),
        "[0,2],[1,3]"
    );
    assert_eq!(survivor.temp_view_names().unwrap(), vec!["people", "people2"]);
}
