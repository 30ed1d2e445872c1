use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use uuid::Uuid;

use super::errors::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Membership {
    #[default]
    Bronze,
    Silver,
    Gold,
}

impl Membership {
    pub fn code(self) -> &'static str {
        match self {
            Membership::Bronze => "B",
            Membership::Silver => "S",
            Membership::Gold => "G",
        }
    }
}

impl FromStr for Membership {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "B" => Ok(Membership::Bronze),
            "S" => Ok(Membership::Silver),
            "G" => Ok(Membership::Gold),
            other => Err(DomainError::invalid(format!(
                "membership must be one of B, S, G; got '{other}'"
            ))),
        }
    }
}

impl fmt::Display for Membership {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone)]
pub struct CustomerView {
    pub id: Uuid,
    pub user_id: i64,
    pub phone: String,
    pub birth_date: Option<NaiveDate>,
    pub membership: Membership,
}

#[derive(Debug, Clone, Default)]
pub struct CustomerProfile {
    pub phone: String,
    pub birth_date: Option<NaiveDate>,
    pub membership: Membership,
}

impl CustomerProfile {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.phone.chars().count() > 255 {
            return Err(DomainError::invalid("phone must be at most 255 characters"));
        }
        Ok(())
    }
}
