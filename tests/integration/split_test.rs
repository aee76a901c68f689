//! Statement splitting integration tests.
//!
//! Splits a realistic schema script and checks statement boundaries.

use pretty_assertions::assert_eq;
use sql_seeder::splitter::{split_statements, StatementIter};

const SCHEMA: &str = include_str!("../fixtures/schema.sql");

#[test]
fn test_schema_fixture_statement_count() {
    let statements = split_statements(SCHEMA);
    assert_eq!(statements.len(), 7);
}

#[test]
fn test_schema_fixture_statement_lines() {
    let lines: Vec<usize> = split_statements(SCHEMA).iter().map(|s| s.line()).collect();
    assert_eq!(lines, vec![2, 4, 14, 21, 33, 37, 38]);
}

#[test]
fn test_schema_fixture_keeps_function_bodies_whole() {
    let statements = split_statements(SCHEMA);

    let trigger_fn = statements[3].text();
    assert!(trigger_fn.starts_with("CREATE OR REPLACE FUNCTION handle_new_user()"));
    assert!(trigger_fn.contains("RETURN NEW;\nEND;\n$$;"));

    let sql_fn = statements[4].text();
    assert!(sql_fn.contains("SELECT CASE WHEN t.side = 'buy' THEN 'Bought' ELSE 'Sold' END;"));
    assert!(sql_fn.ends_with("$fn$ LANGUAGE sql;"));
}

#[test]
fn test_schema_fixture_separator_comments_dropped() {
    let statements = split_statements(SCHEMA);
    assert!(statements.iter().all(|s| !s.text().starts_with("--")));
    assert!(statements.iter().all(|s| !s.text().starts_with("/*")));
    // Comments inside a statement survive.
    assert!(statements[1].text().contains("-- shown in the header; never empty"));
}

#[test]
fn test_schema_fixture_quoted_semicolons() {
    let statements = split_statements(SCHEMA);
    assert!(statements[2].text().contains("'n/a; pending'"));
    assert_eq!(
        statements[6].text(),
        "CREATE POLICY \"Profiles are viewable; by everyone\" ON profiles FOR SELECT USING (true);"
    );
}

#[test]
fn test_lazy_iterator_matches_eager_split() {
    let lazy: Vec<_> = StatementIter::new(SCHEMA).collect();
    assert_eq!(lazy, split_statements(SCHEMA));
}

#[test]
fn test_anonymous_block_with_nested_begin() {
    let script = "\
DO $$
DECLARE
  n int;
BEGIN
  SELECT count(*) INTO n FROM profiles;
  IF n = 0 THEN
    BEGIN
      INSERT INTO profiles (username) VALUES ('admin');
    END;
  END IF;
END
$$;
SELECT 1;";
    let statements = split_statements(script);
    assert_eq!(statements.len(), 2);
    assert!(statements[0].text().ends_with("END\n$$;"));
    assert_eq!(statements[1].text(), "SELECT 1;");
}

#[test]
fn test_sql_standard_function_body() {
    let script = "\
CREATE FUNCTION add_one(i int) RETURNS int
LANGUAGE sql
BEGIN ATOMIC
  SELECT i + 1;
END;
SELECT add_one(1);";
    let statements = split_statements(script);
    assert_eq!(statements.len(), 2);
    assert!(statements[0].text().ends_with("END;"));
    assert_eq!(statements[1].text(), "SELECT add_one(1);");
}
