use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "products")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub model: String,
    pub category: Category,
    pub selling_price: f64,
    pub quantity: i32,
    #[sea_orm(column_type = "Text", nullable)]
    pub details: Option<String>,
    pub arrival_date: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[derive(
    Clone, Copy, PartialEq, Eq, Debug, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(
    enum_name = "category_enum",
    db_type = "String(StringLen::N(255))",
    rs_type = "String"
)]
pub enum Category {
    #[sea_orm(string_value = "Smartphone")]
    Smartphone,
    #[sea_orm(string_value = "Laptop")]
    Laptop,
    #[sea_orm(string_value = "Appliance")]
    Appliance,
}
