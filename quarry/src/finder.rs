//! Loading records through a connection pool

use crate::executor::{fetch, ConnectionPool};
use crate::record::group_rows;
use crate::{Args, Condition, Error, Query, Record, Result, Schema};

impl Schema {
    /// SELECT of every declared column, ordered by group-by then arrange-by
    /// columns so that grouping sees each record's rows together.
    pub fn select_query(&self) -> Query {
        let order: Vec<String> = self
            .group_columns()
            .iter()
            .chain(self.arrange_columns())
            .cloned()
            .collect();
        Query::select()
            .table(self.table())
            .columns(self.column_names().to_vec())
            .order_by(order)
    }

    /// Every record matching `where_`.
    pub async fn find_many<P: ConnectionPool>(
        &self,
        pool: &P,
        where_: impl Into<Condition>,
    ) -> Result<Vec<Record>> {
        let sql = self.select_query().where_(where_).render(())?;
        let rows = fetch(pool, &sql).await?;
        group_rows(self.clone(), rows)
    }

    /// The record matching `where_`, if any. More than one match is an error.
    pub async fn find_one<P: ConnectionPool>(
        &self,
        pool: &P,
        where_: impl Into<Condition>,
    ) -> Result<Option<Record>> {
        let mut records = self.find_many(pool, where_).await?;
        match records.len() {
            0 | 1 => Ok(records.pop()),
            found => Err(Error::invalid_query(format!(
                "expected at most one {} record, found {found}",
                self.table()
            ))),
        }
    }

    /// All rows selected with extra SELECT arguments (`where`, `limit`,
    /// `offset`, `order_by` ..), as one ungrouped record with no group key.
    pub async fn seek<P: ConnectionPool>(&self, pool: &P, args: impl Into<Args>) -> Result<Record> {
        let sql = self.select_query().render(args)?;
        let rows = fetch(pool, &sql).await?;
        Record::from_row_set(self.clone(), rows)
    }
}
