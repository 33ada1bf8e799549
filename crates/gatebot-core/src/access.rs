//! Two-tier admin access model.
//!
//! Tiers are inverted: a lower number is a stronger privilege
//! (0 = owner, 2 = super-admin, 3 = admin).

use std::fmt;

use crate::domain::{TeleUser, UserId};

/// Authorizer id the legacy `delete_ac_` callback used instead of the caller.
///
/// Only honoured when explicitly configured via `ACCESS_REMOVAL_AUTHORIZER`;
/// the real caller id is used otherwise.
pub const LEGACY_ACCESS_AUTHORIZER: &str = "1337";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tier(pub i32);

impl Tier {
    pub const OWNER: Tier = Tier(0);
    pub const SUPER_ADMIN: Tier = Tier(2);
    pub const ADMIN: Tier = Tier(3);

    pub fn value(self) -> i32 {
        self.0
    }

    /// `true` if `self` is at least as privileged as `other`.
    pub fn outranks_or_equals(self, other: Tier) -> bool {
        self.0 <= other.0
    }

    /// Parse a tier given by number (`0`, `2`, `3`) or name.
    pub fn parse(raw: &str) -> Option<Tier> {
        match raw.trim().to_lowercase().as_str() {
            "0" | "owner" => Some(Tier::OWNER),
            "2" | "super" | "superadmin" | "super-admin" => Some(Tier::SUPER_ADMIN),
            "3" | "admin" => Some(Tier::ADMIN),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self.0 {
            0 => "owner",
            2 => "super-admin",
            3 => "admin",
            _ => "custom",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Comparison applied to the `access` column when listing users.
///
/// Closed set: this is the only part of an access query rendered into SQL
/// text; the tier itself is always bound.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Comparator {
    /// `access >= tier`
    AtLeast,
    /// `access <= tier`
    AtMost,
}

impl Comparator {
    pub fn as_sql(self) -> &'static str {
        match self {
            Comparator::AtLeast => ">=",
            Comparator::AtMost => "<=",
        }
    }

    pub fn matches(self, access: Tier, tier: Tier) -> bool {
        match self {
            Comparator::AtLeast => access.0 >= tier.0,
            Comparator::AtMost => access.0 <= tier.0,
        }
    }
}

/// One row of `admin_access`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccessEntry {
    pub user: TeleUser,
    pub access: Tier,
}

/// Result of an access removal request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    /// Acting user is not in the super-admin set; nothing was changed.
    Denied,
}

/// Who is checked as the acting user when an access entry is removed.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum Authorizer {
    /// The user who pressed the button.
    #[default]
    Caller,
    /// A fixed id (see [`LEGACY_ACCESS_AUTHORIZER`]).
    Fixed(String),
}

impl Authorizer {
    pub fn resolve(&self, caller: UserId) -> String {
        match self {
            Authorizer::Caller => caller.key(),
            Authorizer::Fixed(id) => id.clone(),
        }
    }
}
