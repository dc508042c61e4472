use quarry::{Connection, ConnectionPool, Result, RowSet, Schema, Value};

// Pool printing what it is asked to run
#[derive(Clone)]
struct PrintPool;

struct PrintConnection;

impl ConnectionPool for PrintPool {
    type Connection = PrintConnection;

    async fn acquire(&self) -> Result<Self::Connection> {
        Ok(PrintConnection)
    }

    async fn release(&self, _connection: Self::Connection) {}
}

impl Connection for PrintConnection {
    async fn execute(&mut self, sql: &str) -> Result<u64> {
        println!("EXECUTE: {sql}");
        Ok(1)
    }

    async fn fetch_all(&mut self, sql: &str) -> Result<RowSet> {
        println!("FETCH: {sql}");
        Ok(RowSet::new(
            ["detail_id", "person_id", "key", "val"],
            vec![
                vec![1.into(), "andy".into(), "email".into(), "andy@example.com".into()],
                vec![2.into(), "andy".into(), "email".into(), "andy@work.com".into()],
                vec![3.into(), "andy".into(), "phone".into(), "555-0100".into()],
            ],
        ))
    }

    async fn commit(&mut self) -> Result<()> {
        println!("COMMIT");
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        println!("ROLLBACK");
        Ok(())
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let detail = Schema::new("detail", ("detail_id", "person_id", "key", "val"))
        .identify_by("detail_id")
        .group_by(("person_id", "key"))
        .arrange_by("detail_id");
    let pool = PrintPool;

    let mut records = detail.find_many(&pool, [("person_id", "andy")]).await?;
    println!("{} records", records.len());

    let emails = &mut records[0];
    for row in emails.rows() {
        println!("  {:?}", row.get("val")?);
    }

    emails.set(0, "val", "andy@new.example.com")?;
    emails.pop()?;
    emails.append([("val", Value::from("andy@home.example.com"))])?;
    emails.save(&pool).await?;

    println!("pending changes after save: {}", emails.has_changes());
    Ok(())
}
