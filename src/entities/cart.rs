use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "carts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(indexed)]
    pub customer: String,
    pub paid: bool,
    pub payment_date: Option<String>,
    pub total: f64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "crate::entities::product_in_cart::Entity")]
    ProductInCart,
}

impl ActiveModelBehavior for ActiveModel {}

impl Related<crate::entities::product_in_cart::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductInCart.def()
    }
}
