use std::fmt;
use std::str::FromStr;

use url::Url;

use crate::domain::validation::ValidationError;

/// URL scheme used for every Zenziva endpoint.
pub const SCHEME: &str = "https";

/// Zenziva domain name, without a trailing slash.
pub const DOMAIN: &str = "zenziva.net";

const SMSAPI_PATH: &str = "apps/smsapi.php";
const SMS_CENTER_PATH: &str = "api/sendsms/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
/// Zenziva sending package (route).
///
/// Each package maps to a fixed `(subdomain, path)` pair. [`PackageType::SmsCenter`]
/// has no fixed subdomain: the account's own subdomain must be configured.
pub enum PackageType {
    /// Regular route, served from `reguler.zenziva.net`.
    #[default]
    Regular,
    /// Masking (alpha sender) route, served from `alpha.zenziva.net`.
    Masking,
    /// SMS center route, served from a caller-supplied subdomain.
    SmsCenter,
}

impl PackageType {
    /// Every accepted key, in declaration order.
    pub const KEYS: [&'static str; 3] = ["regular", "masking", "sms_center"];

    /// Canonical key of this package.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Regular => "regular",
            Self::Masking => "masking",
            Self::SmsCenter => "sms_center",
        }
    }

    /// Subdomain enforced for this package, or `None` when the caller must supply one.
    pub fn fixed_subdomain(self) -> Option<&'static str> {
        match self {
            Self::Regular => Some("reguler"),
            Self::Masking => Some("alpha"),
            Self::SmsCenter => None,
        }
    }

    /// Path of the send endpoint for this package.
    pub fn path(self) -> &'static str {
        match self {
            Self::Regular | Self::Masking => SMSAPI_PATH,
            Self::SmsCenter => SMS_CENTER_PATH,
        }
    }

    /// Compose `https://{subdomain}.zenziva.net/{path}`.
    ///
    /// Rejects subdomains that would not end up as the host of the composed URL
    /// (embedded `/`, `@`, whitespace and the like).
    pub fn endpoint(self, subdomain: &str) -> Result<Url, ValidationError> {
        let invalid = || ValidationError::InvalidSubdomain {
            input: subdomain.to_owned(),
        };

        let raw = format!("{SCHEME}://{subdomain}.{DOMAIN}/{}", self.path());
        let url = Url::parse(&raw).map_err(|_| invalid())?;

        let expected_host = format!("{}.{DOMAIN}", subdomain.to_ascii_lowercase());
        if url.host_str() != Some(expected_host.as_str()) {
            return Err(invalid());
        }
        Ok(url)
    }
}

impl fmt::Display for PackageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PackageType {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "regular" | "reguler" => Ok(Self::Regular),
            "masking" => Ok(Self::Masking),
            "sms_center" => Ok(Self::SmsCenter),
            other => Err(ValidationError::UnknownPackageType {
                input: other.to_owned(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_keys_and_provider_spelling() {
        assert_eq!("regular".parse::<PackageType>(), Ok(PackageType::Regular));
        assert_eq!("reguler".parse::<PackageType>(), Ok(PackageType::Regular));
        assert_eq!("masking".parse::<PackageType>(), Ok(PackageType::Masking));
        assert_eq!(
            "sms_center".parse::<PackageType>(),
            Ok(PackageType::SmsCenter)
        );
    }

    #[test]
    fn rejects_unknown_keys() {
        for input in ["", "Regular", "alpha", "sms-center", " masking"] {
            assert_eq!(
                input.parse::<PackageType>(),
                Err(ValidationError::UnknownPackageType {
                    input: input.to_owned()
                })
            );
        }
    }

    #[test]
    fn endpoint_table_is_fixed() {
        assert_eq!(PackageType::Regular.fixed_subdomain(), Some("reguler"));
        assert_eq!(PackageType::Masking.fixed_subdomain(), Some("alpha"));
        assert_eq!(PackageType::SmsCenter.fixed_subdomain(), None);

        assert_eq!(PackageType::Regular.path(), "apps/smsapi.php");
        assert_eq!(PackageType::Masking.path(), "apps/smsapi.php");
        assert_eq!(PackageType::SmsCenter.path(), "api/sendsms/");
    }

    #[test]
    fn endpoint_composes_scheme_subdomain_domain_and_path() {
        let url = PackageType::Masking.endpoint("alpha").unwrap();
        assert_eq!(url.as_str(), "https://alpha.zenziva.net/apps/smsapi.php");

        let url = PackageType::SmsCenter.endpoint("myaccount").unwrap();
        assert_eq!(url.as_str(), "https://myaccount.zenziva.net/api/sendsms/");
    }

    #[test]
    fn endpoint_rejects_subdomains_that_escape_the_host() {
        for input in ["evil.com/x", "user@evil", "a b"] {
            assert!(matches!(
                PackageType::SmsCenter.endpoint(input),
                Err(ValidationError::InvalidSubdomain { .. })
            ));
        }
    }
}
