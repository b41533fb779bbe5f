//! Company and group names

use super::ValidationError;

const MAX_COMPANY_NAME_LEN: usize = 128;
const MAX_GROUP_NAME_LEN: usize = 128;

/// Validated company name (trimmed, non-empty)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompanyName(String);

impl CompanyName {
    /// # Example
    /// ```
    /// use fsyctl_server::models::CompanyName;
    ///
    /// assert_eq!(CompanyName::new("  Company Alma ").unwrap().as_str(), "Company Alma");
    /// assert!(CompanyName::new("   ").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty {
                field: "company name",
            });
        }
        if trimmed.chars().count() > MAX_COMPANY_NAME_LEN {
            return Err(ValidationError::TooLong {
                field: "company name",
                max: MAX_COMPANY_NAME_LEN,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Validated group name (trimmed, non-empty)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupName(String);

impl GroupName {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty {
                field: "group name",
            });
        }
        if trimmed.chars().count() > MAX_GROUP_NAME_LEN {
            return Err(ValidationError::TooLong {
                field: "group name",
                max: MAX_GROUP_NAME_LEN,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
