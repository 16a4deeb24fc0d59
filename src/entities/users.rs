use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub username: String,

    /// Display name
    pub name: String,

    /// One of `test`, `dev`, `admin`
    pub role: String,

    #[sea_orm(unique)]
    pub email: String,

    /// Opaque bearer token; replaced wholesale when a PIN is redeemed.
    pub api_key: Option<String>,

    /// One-time 6-digit code, cleared on successful redemption.
    pub pin_code: Option<String>,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
