use std::fmt;

use crate::domain::package::PackageType;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Empty { field: &'static str },
    UnknownPackageType { input: String },
    InvalidSubdomain { input: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{field} is not set"),
            Self::UnknownPackageType { input } => {
                write!(
                    f,
                    "package type should be one of ({}), got {input:?}",
                    PackageType::KEYS.join(", ")
                )
            }
            Self::InvalidSubdomain { input } => {
                write!(f, "subdomain {input:?} does not form a valid host")
            }
        }
    }
}

impl std::error::Error for ValidationError {}
