//! User entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Role of a user. Admin tiers are ordered by [`Role::rank`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    /// Regular account.
    #[sea_orm(string_value = "user")]
    #[default]
    User,
    /// May moderate users, tags and quotes.
    #[sea_orm(string_value = "admin-level-one")]
    AdminLevelOne,
    /// May additionally grant and revoke admin-level-one.
    #[sea_orm(string_value = "admin-level-two")]
    AdminLevelTwo,
}

impl Role {
    /// Ordinal of this role: `user` 0, `admin-level-one` 1, `admin-level-two` 2.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::User => 0,
            Self::AdminLevelOne => 1,
            Self::AdminLevelTwo => 2,
        }
    }

    /// Whether this role is any admin tier.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        self.rank() > 0
    }

    /// Whether this role is at least `required`.
    #[must_use]
    pub const fn satisfies(self, required: Self) -> bool {
        self.rank() >= required.rank()
    }
}

/// Activity status of a user, recomputed by the daily sweep.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "kebab-case")]
pub enum UserStatus {
    /// Posted within the last week.
    #[sea_orm(string_value = "active")]
    #[default]
    Active,
    /// Last post is older than a week.
    #[sea_orm(string_value = "slow-active")]
    SlowActive,
    /// No post at all, or last post older than a month.
    #[sea_orm(string_value = "non-active")]
    NonActive,
    /// Banned by an admin. Never reclassified by the sweep.
    #[sea_orm(string_value = "banned")]
    Banned,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Lowercased login email
    #[sea_orm(unique)]
    pub email: String,

    /// Argon2 PHC hash
    #[serde(skip_serializing)]
    pub password: String,

    pub role: Role,

    pub first_name: String,

    pub last_name: String,

    #[sea_orm(nullable)]
    pub middle_name: Option<String>,

    pub job_title: String,

    #[sea_orm(column_type = "Text")]
    pub description: String,

    /// Avatar URL, empty when unset
    pub avatar: String,

    /// Social links: `facebook`, `twitter`, `instagram`, `youtube`
    #[sea_orm(column_type = "JsonBinary")]
    pub social: Json,

    pub status: UserStatus,

    #[sea_orm(nullable)]
    pub status_updated_at: Option<DateTimeWithTimeZone>,

    /// Admin note attached when banning
    #[sea_orm(nullable)]
    pub status_comment: Option<String>,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::post::Entity")]
    Posts,

    #[sea_orm(has_many = "super::comment::Entity")]
    Comments,
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Posts.def()
    }
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_role_rank_order() {
        assert!(Role::User.rank() < Role::AdminLevelOne.rank());
        assert!(Role::AdminLevelOne.rank() < Role::AdminLevelTwo.rank());
        assert!(Role::AdminLevelTwo.satisfies(Role::AdminLevelOne));
        assert!(!Role::User.satisfies(Role::AdminLevelOne));
        assert!(!Role::User.is_admin());
        assert!(Role::AdminLevelOne.is_admin());
    }

    #[test]
    fn test_role_serializes_kebab_case() {
        let json = serde_json::to_string(&Role::AdminLevelOne).unwrap();
        assert_eq!(json, "\"admin-level-one\"");
        let status = serde_json::to_string(&UserStatus::SlowActive).unwrap();
        assert_eq!(status, "\"slow-active\"");
    }
}
