//! A small end-to-end tour: create a table with a secondary index, insert
//! rows, look them up both ways, update, and prefix-delete.

use rowkv_table::{IndexId, Schema, Table};
use rowkv_types::{Column, ColumnType, Field, Row};

fn user_row(email: &str, age: i64, id: i64, active: bool) -> Row {
    Row::new(vec![
        Field::Str(email.into()),
        Field::Int(age),
        Field::Int(id),
        Field::Bool(active),
    ])
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let schema = Schema::new(vec![
        Column::new("email", ColumnType::Str),
        Column::new("age", ColumnType::Int),
        Column::new("id", ColumnType::Int),
        Column::new("isActive", ColumnType::Bool),
    ])?;
    let table = Table::create(schema, &["id", "isActive"], &[&["email"]])?;

    table.batch_insert(vec![
        user_row("doodle@sheen.com", 3, 1, true),
        user_row("toto@sheen.com", 21, 2, true),
        user_row("toto@sheen.com", 1, 2, false),
        user_row("doodle@sheen.com", 1, 8, true),
    ])?;

    println!("-- all doodle rows, via the email index --");
    let prefix = Row::new(vec![Field::Str("doodle@sheen.com".into())]);
    for row in table.list_with_index(IndexId::Secondary(0), prefix)? {
        println!("{row}");
    }

    println!("-- rows with id 2, via the primary index --");
    for row in table.list_with_index(IndexId::Primary, Row::new(vec![Field::Int(2)]))? {
        println!("{row}");
    }

    table.delete(
        IndexId::Secondary(0),
        Row::new(vec![Field::Str("toto@sheen.com".into())]),
    )?;
    println!("-- after deleting toto rows --");
    for row in table.list_with_index(IndexId::Primary, Row::default())? {
        println!("{row}");
    }

    Ok(())
}
