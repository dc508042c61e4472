//! Query builder module

pub mod common;
pub mod delete;
pub mod insert;
pub mod join;
pub mod select;
pub mod update;

pub use common::{
    order_term, Arg, Args, Clause, IntoColumns, Query, QueryBuilder, SortDirection, Statement,
};
pub use delete::{delete, DELETE};
pub use insert::{insert, into, INSERT};
pub use join::{join, join_using, JOIN};
pub use select::{from, select, SELECT};
pub use update::{update, UPDATE};
