//! Invoice sequence entity - per-month counter backing invoice numbers.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Last number handed out for one (year, month)
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "invoice_sequences")]
pub struct Model {
    /// Calendar year of the invoice date
    #[sea_orm(primary_key, auto_increment = false)]
    pub year: i32,
    /// Calendar month (1-12) of the invoice date
    #[sea_orm(primary_key, auto_increment = false)]
    pub month: i32,
    /// Highest sequence number allocated so far
    pub last_value: i32,
}

/// `InvoiceSequence` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
