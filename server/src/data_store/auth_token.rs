use crate::cli::CliAuthTokenKey;
use crate::data_store::{StoreError, UserId};
use diesel::deserialize::FromSql;
use diesel::pg::Pg;
use diesel::serialize::ToSql;
use diesel::sql_types::Integer;
use diesel::{AsExpression, FromSqlRow};
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub struct EnumMemberNotExistingError {
    pub member_value: i32,
    pub enum_name: &'static str,
}

impl Display for EnumMemberNotExistingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} is not a valid value for {} enum",
            self.member_value, self.enum_name
        )
    }
}

/// Authorization token for authorizing access to the data_store
///
/// The AuthToken holds the [AccessRole] of the authenticated user in the current context. The role
/// implies specific [Privilege]s.
///
/// This structure is our main protection against accidental unauthorized-access bugs: All
/// data_store access functions (except for registration and login) require an AuthToken and check
/// its validity for the required privilege. An AuthToken can only be created by
/// [crate::data_store::RoomReservationStoreFacade::get_auth_token_for_session], based on the
/// user id in a client's verified session token, and by cli functions via
/// [AuthToken::create_for_cli].
#[derive(Debug)]
pub struct AuthToken {
    user_id: Option<UserId>,
    role: AccessRole,
}

impl AuthToken {
    /// Create a new AuthToken for a client session of the given user.
    ///
    /// This function must only be used by implementations of
    /// [crate::data_store::RoomReservationStoreFacade::get_auth_token_for_session]
    /// after checking the existence of the user and retrieving their current role!
    pub(super) fn create_for_session(user_id: UserId, role: AccessRole) -> Self {
        AuthToken {
            user_id: Some(user_id),
            role,
        }
    }

    /// Create a new AuthToken for a command line interface functionality.
    ///
    /// The AuthToken is created with the AccessRole::Admin.
    ///
    /// This function must only be used by command line interface functions, not in the context of
    /// the web server!
    pub fn create_for_cli(_key: &CliAuthTokenKey) -> Self {
        AuthToken {
            user_id: None,
            role: AccessRole::Admin,
        }
    }

    /// Check if the AuthToken authorizes for the given `privilege`.
    ///
    /// The actual authorization check is delegated to [Privilege::qualifying_roles].
    pub fn has_privilege(&self, privilege: Privilege) -> bool {
        privilege.qualifying_roles().contains(&self.role)
    }

    /// Check if the AuthToken authorizes for the given `privilege`. If not, return an appropriate
    /// PermissionDenied error.
    pub fn check_privilege(&self, privilege: Privilege) -> Result<(), StoreError> {
        if self.has_privilege(privilege) {
            Ok(())
        } else {
            Err(StoreError::PermissionDenied {
                required_privilege: privilege,
            })
        }
    }

    /// The authenticated user, or None for command line interface tokens
    pub fn user_id(&self) -> Option<UserId> {
        self.user_id
    }
}

/// Possible roles of a user account
///
/// Each role qualifies for a set of [Privilege]s. See [Privilege::qualifying_roles].
#[derive(Debug, Eq, PartialEq, Ord, PartialOrd, Clone, Copy, AsExpression, FromSqlRow)]
#[diesel(sql_type = Integer)]
#[repr(i32)]
pub enum AccessRole {
    User = 1,
    Admin = 2,
}

impl TryFrom<i32> for AccessRole {
    type Error = EnumMemberNotExistingError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(AccessRole::User),
            2 => Ok(AccessRole::Admin),
            value => Err(EnumMemberNotExistingError {
                member_value: value,
                enum_name: "AccessRole",
            }),
        }
    }
}

impl FromSql<Integer, Pg> for AccessRole {
    fn from_sql(
        bytes: <Pg as diesel::backend::Backend>::RawValue<'_>,
    ) -> diesel::deserialize::Result<Self> {
        let value = <i32 as FromSql<Integer, Pg>>::from_sql(bytes)?;
        AccessRole::try_from(value).map_err(|e| e.to_string().into())
    }
}

impl ToSql<Integer, Pg> for AccessRole {
    fn to_sql<'b>(
        &'b self,
        out: &mut diesel::serialize::Output<'b, '_, Pg>,
    ) -> diesel::serialize::Result {
        let value = *self as i32;
        <i32 as ToSql<Integer, Pg>>::to_sql(&value, &mut out.reborrow())
    }
}

impl From<AccessRole> for roomres_api_types::UserRole {
    fn from(value: AccessRole) -> Self {
        match value {
            AccessRole::User => roomres_api_types::UserRole::User,
            AccessRole::Admin => roomres_api_types::UserRole::Admin,
        }
    }
}

impl std::str::FromStr for AccessRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(AccessRole::User),
            "admin" => Ok(AccessRole::Admin),
            _ => Err(format!("'{}' is not a valid role (user or admin)", s)),
        }
    }
}

impl AccessRole {
    pub fn name(&self) -> &str {
        match self {
            AccessRole::User => "User",
            AccessRole::Admin => "Admin",
        }
    }
}

/// Enum of available authorization privileges.
///
/// Each data_store action and web endpoint typically requires a single privilege.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Privilege {
    ShowRooms,
    ShowReservations,
    ManageReservations,
    ManageUsers,
}

impl Privilege {
    /// Get the list of user [AccessRole]s that qualify for this privilege. Each returned role is
    /// individually sufficient for the privilege.
    ///
    /// This is function is our source of truth for authorization!
    pub fn qualifying_roles(&self) -> &'static [AccessRole] {
        match self {
            Privilege::ShowRooms => &[AccessRole::User, AccessRole::Admin],
            Privilege::ShowReservations => &[AccessRole::User, AccessRole::Admin],
            Privilege::ManageReservations => &[AccessRole::User, AccessRole::Admin],
            Privilege::ManageUsers => &[AccessRole::Admin],
        }
    }
}
