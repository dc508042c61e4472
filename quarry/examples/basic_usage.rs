use quarry::{
    delete, from, insert, join, op, order_term, select, update, Condition, Dialect, QueryBuilder,
    SortDirection, Value, Where,
};

fn main() -> quarry::Result<()> {
    println!("=== Quarry - Basic Usage Examples ===\n");

    println!("1. One-shot statements:");
    println!("   {}", select("person", [("person_id", vec!["andy", "bob"])])?);
    println!("   {}", select("person", [("name", Value::Null)])?);
    println!(
        "   {}",
        insert("person", [("person_id", "dave"), ("name", "Dave")])?
    );
    println!(
        "   {}",
        update("person", [("person_id", "dave")], [("name", "David")])?
    );
    println!("   {}\n", delete("person", [("person_id", "dave")])?);

    // A query bred once and reused
    let people = from("person").columns(("person_id", "name"));
    let adults = people
        .where_(Where::new().and_op("age", op::GTE, 18))
        .order_by(order_term("name", SortDirection::Asc));

    println!("2. Breeding:");
    println!("   {}", people.to_sql()?);
    println!("   {}", adults.limit(10).to_sql()?);
    println!("   {}\n", adults.limit(10).offset(10).to_sql()?);

    let detail = join("detail", [("person.person_id", "detail.person_id")])?;
    let either = Condition::any([
        Where::from([("detail.key", "email")]),
        Where::from([("detail.key", "phone")]),
    ]);
    println!("3. JOIN and OR groups:");
    println!(
        "   {}\n",
        from("person").joins(vec![detail]).where_(either).to_sql()?
    );

    println!("4. Dialects:");
    {
        let _mysql = Dialect::mysql().activate();
        println!("   mysql:  {}", select("person", [("name", "O'Brien")])?);
    }
    let sqlite = from("person")
        .where_([("active", Value::from(true)), ("person_id", Value::param())])
        .render_with(&Dialect::sqlite(), ())?;
    println!("   sqlite: {sqlite}");
    println!("   back to {}: {}", Dialect::current().name, select("person", [("name", "O'Brien")])?);

    Ok(())
}
