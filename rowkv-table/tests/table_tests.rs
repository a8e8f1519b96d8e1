use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::{SeedableRng, rngs::StdRng};
use rowkv_btree::{Limit, QueryPredicate, RowBound};
use rowkv_result::Error;
use rowkv_table::{IndexId, Schema, Table};
use rowkv_test_utils as _;
use rowkv_types::{Column, ColumnType, Field, Row};
use rustc_hash::FxHashMap;

fn user_schema() -> Schema {
    Schema::new(vec![
        Column::new("email", ColumnType::Str),
        Column::new("age", ColumnType::Int),
        Column::new("id", ColumnType::Int),
        Column::new("isActive", ColumnType::Bool),
    ])
    .expect("valid schema")
}

fn user_table() -> Table {
    Table::create(user_schema(), &["id", "isActive"], &[&["email"]]).expect("valid table")
}

fn user_row(email: &str, age: i64, id: i64, active: bool) -> Row {
    Row::new(vec![
        Field::Str(email.into()),
        Field::Int(age),
        Field::Int(id),
        Field::Bool(active),
    ])
}

/// The four-row template shared by the lookup/update scenarios.
fn template() -> [Row; 4] {
    [
        user_row("doodle@sheen.com", 3, 1, true),
        user_row("toto@sheen.com", 21, 2, true),
        user_row("toto@sheen.com", 1, 2, false),
        user_row("doodle@sheen.com", 1, 8, true),
    ]
}

// Secondary lookup joins back to the primary index; ties on the secondary
// column break on the primary-key columns.
#[test]
fn secondary_lookup_with_primary_key_tiebreak() -> Result<(), Box<dyn std::error::Error>> {
    let table = user_table();
    let [r0, r1, r2, r3] = template();
    table.batch_insert(vec![r0.clone(), r1.clone(), r2.clone(), r3.clone()])?;

    let doodle = table.list_with_index(
        IndexId::Secondary(0),
        Row::new(vec![Field::Str("doodle@sheen.com".into())]),
    )?;
    assert_eq!(doodle, vec![r0, r3]);

    // false < true under the bool order
    let id2 = table.list_with_index(IndexId::Primary, Row::new(vec![Field::Int(2)]))?;
    assert_eq!(id2, vec![r2, r1]);
    Ok(())
}

// Prefix delete: 100 rows from the four-row template, ids shifted by +10
// per cycle; deleting one email prefix removes exactly its 50 rows.
#[test]
fn prefix_delete_removes_every_match() -> Result<(), Box<dyn std::error::Error>> {
    let table = user_table();
    let mut rows = Vec::with_capacity(100);
    for cycle in 0..25 {
        for row in template() {
            let mut fields = row.into_fields();
            let id = match &fields[2] {
                Field::Int(id) => *id,
                other => unreachable!("id column is an int, got {other:?}"),
            };
            fields[2] = Field::Int(id + 10 * cycle);
            rows.push(Row::new(fields));
        }
    }
    table.batch_insert(rows)?;

    let toto = Row::new(vec![Field::Str("toto@sheen.com".into())]);
    let doodle = Row::new(vec![Field::Str("doodle@sheen.com".into())]);
    assert_eq!(table.list_with_index(IndexId::Secondary(0), toto.clone())?.len(), 50);

    table.delete(IndexId::Secondary(0), toto.clone())?;

    assert!(table.list_with_index(IndexId::Secondary(0), toto)?.is_empty());
    assert_eq!(table.list_with_index(IndexId::Secondary(0), doodle)?.len(), 50);
    // the primary index shrank in lockstep (an empty prefix scans all rows)
    assert_eq!(
        table.list_with_index(IndexId::Primary, Row::default())?.len(),
        50
    );
    Ok(())
}

// Update with limit 1 touches exactly one row.
#[test]
fn update_with_limit_one() -> Result<(), Box<dyn std::error::Error>> {
    let table = user_table();
    table.batch_insert(template().to_vec())?;

    let pred = QueryPredicate {
        lower: RowBound::Inclusive(Row::new(vec![Field::Int(1)])),
        upper: RowBound::Exclusive(Row::new(vec![Field::Int(1)])),
        limit: Limit::Rows(1),
        ..QueryPredicate::all()
    };
    let mut assignments = FxHashMap::default();
    assignments.insert(Column::new("age", ColumnType::Int), Field::Int(4));
    table.update(IndexId::Primary, pred, &assignments)?;

    let id1 = table.list_with_index(IndexId::Primary, Row::new(vec![Field::Int(1)]))?;
    assert_eq!(id1, vec![user_row("doodle@sheen.com", 4, 1, true)]);

    // nothing else moved
    assert_eq!(
        table.list_with_index(IndexId::Primary, Row::new(vec![Field::Int(8)]))?,
        vec![user_row("doodle@sheen.com", 1, 8, true)]
    );
    Ok(())
}

#[test]
fn update_ignores_unknown_columns_and_rejects_bad_kinds() -> Result<(), Box<dyn std::error::Error>>
{
    let table = user_table();
    table.batch_insert(template().to_vec())?;

    let mut unknown = FxHashMap::default();
    unknown.insert(Column::new("nickname", ColumnType::Str), Field::Str("t".into()));
    table.update(IndexId::Primary, QueryPredicate::all(), &unknown)?;
    assert_eq!(
        table.list_with_index(IndexId::Primary, Row::default())?.len(),
        4
    );

    let mut bad_kind = FxHashMap::default();
    bad_kind.insert(Column::new("age", ColumnType::Int), Field::Bool(true));
    let err = table
        .update(IndexId::Primary, QueryPredicate::all(), &bad_kind)
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgumentError(_)));
    Ok(())
}

#[test]
fn create_rejects_bad_shapes() {
    assert!(matches!(
        Schema::new(vec![]),
        Err(Error::InvalidArgumentError(_))
    ));
    assert!(matches!(
        Schema::new(vec![
            Column::new("a", ColumnType::Int),
            Column::new("a", ColumnType::Str),
        ]),
        Err(Error::InvalidArgumentError(_))
    ));
    // empty primary key
    assert!(matches!(
        Table::create(user_schema(), &[], &[]),
        Err(Error::InvalidArgumentError(_))
    ));
    // unknown primary-key column
    assert!(matches!(
        Table::create(user_schema(), &["uid"], &[]),
        Err(Error::InvalidArgumentError(_))
    ));
    // unknown secondary column
    assert!(matches!(
        Table::create(user_schema(), &["id"], &[&["nickname"]]),
        Err(Error::InvalidArgumentError(_))
    ));
}

#[test]
fn insert_validates_rows_against_the_schema() {
    let table = user_table();
    let short = Row::new(vec![Field::Str("a@b.c".into())]);
    assert!(matches!(
        table.insert(short),
        Err(Error::InvalidArgumentError(_))
    ));
    let wrong_kind = Row::new(vec![
        Field::Int(1),
        Field::Int(2),
        Field::Int(3),
        Field::Bool(true),
    ]);
    assert!(matches!(
        table.insert(wrong_kind),
        Err(Error::InvalidArgumentError(_))
    ));
}

#[test]
fn primary_key_uniqueness_is_enforced() -> Result<(), Box<dyn std::error::Error>> {
    let table = user_table();
    let row = user_row("first@sheen.com", 30, 1, true);
    table.insert(row.clone())?;

    // identical row: idempotent
    table.insert(row)?;
    assert_eq!(
        table.list_with_index(IndexId::Primary, Row::default())?.len(),
        1
    );

    // same (id, isActive), different payload: rejected
    let clash = user_row("second@sheen.com", 31, 1, true);
    assert!(matches!(
        table.insert(clash),
        Err(Error::ConstraintError(_))
    ));

    // same id, different isActive: a different primary key
    table.insert(user_row("third@sheen.com", 32, 1, false))?;
    assert_eq!(
        table.list_with_index(IndexId::Primary, Row::default())?.len(),
        2
    );
    Ok(())
}

// batch_insert validates everything before touching any index.
#[test]
fn batch_insert_validates_up_front() -> Result<(), Box<dyn std::error::Error>> {
    let table = user_table();
    let bad = Row::new(vec![Field::Int(9)]);
    let err = table
        .batch_insert(vec![user_row("ok@sheen.com", 1, 1, true), bad])
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgumentError(_)));
    assert!(
        table
            .list_with_index(IndexId::Primary, Row::default())?
            .is_empty(),
        "no row may land when any row in the batch is invalid"
    );
    Ok(())
}

// After any mix of inserts, deletes, and updates, every index answers with
// the same logical row set.
#[test]
fn indices_stay_consistent_under_mixed_ops() -> Result<(), Box<dyn std::error::Error>> {
    let table = Table::create(
        user_schema(),
        &["id"],
        &[&["email"], &["age", "isActive"]],
    )?;

    let mut rng = StdRng::seed_from_u64(99);
    let mut ids: Vec<i64> = (0..60).collect();
    ids.shuffle(&mut rng);
    for &id in &ids {
        let email = format!("user{}@sheen.com", id % 7);
        table.insert(user_row(&email, id % 5, id, id % 2 == 0))?;
    }

    table.delete(
        IndexId::Secondary(0),
        Row::new(vec![Field::Str("user3@sheen.com".into())]),
    )?;

    let mut assignments = FxHashMap::default();
    assignments.insert(Column::new("age", ColumnType::Int), Field::Int(42));
    table.update(
        IndexId::Secondary(1),
        QueryPredicate::prefix(Row::new(vec![Field::Int(4)])),
        &assignments,
    )?;

    let via = |index: IndexId| -> Result<Vec<Row>, Error> {
        let mut rows = table.list_with_index(index, Row::default())?;
        rows.sort_by(|a, b| a.prefix_cmp(b));
        Ok(rows)
    };
    let from_primary = via(IndexId::Primary)?;
    assert!(!from_primary.is_empty());
    assert_eq!(via(IndexId::Secondary(0))?, from_primary);
    assert_eq!(via(IndexId::Secondary(1))?, from_primary);
    Ok(())
}

#[test]
fn streamed_table_scan_matches_list() -> Result<(), Box<dyn std::error::Error>> {
    let table = Arc::new(user_table());
    table.batch_insert(template().to_vec())?;

    let prefix = Row::new(vec![Field::Str("toto@sheen.com".into())]);
    let rx = table.stream_with_index(IndexId::Secondary(0), prefix.clone());
    let streamed: Vec<Row> = rx.iter().collect();
    assert_eq!(streamed, table.list_with_index(IndexId::Secondary(0), prefix)?);

    let rx = table.stream_with_index_paginated(IndexId::Primary, QueryPredicate::all(), 3);
    let batches: Vec<Vec<Row>> = rx.iter().collect();
    assert_eq!(batches.iter().map(Vec::len).sum::<usize>(), 4);
    Ok(())
}
