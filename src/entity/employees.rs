use sea_orm::entity::prelude::*;
use validator::Validate;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Validate)]
#[sea_orm(table_name = "employees")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[validate(custom(function = "crate::validation::not_blank"))]
    pub first_name: String,
    #[validate(custom(function = "crate::validation::not_blank"))]
    pub last_name: String,
    #[sea_orm(unique)]
    #[validate(
        length(min = 1, message = "email is required"),
        regex(path = *crate::validation::EMAIL_RE, message = "{VALUE} is not a valid email!")
    )]
    pub email: String,
    #[validate(regex(
        path = *crate::validation::PHONE_RE,
        message = "{VALUE} is not a valid phone!"
    ))]
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub password_hash: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
