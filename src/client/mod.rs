//! Client layer: configures a message, resolves the endpoint, and records outcomes.

use std::error::Error as StdError;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};
use url::Url;

use crate::domain::{
    History, MessageText, PackageType, Password, PhoneNumber, ProviderResponse, SUCCESS_TEXT,
    SendOutcome, Subdomain, Username, ValidationError,
};
use crate::transport::{SendSmsForm, decode_xml_response, encode_send_sms_form};

// libcurl error codes; Zenziva integrations historically report transport
// failures with these numbers.
const CURLE_URL_MALFORMAT: i64 = 3;
const CURLE_COULDNT_CONNECT: i64 = 7;
const CURLE_OPERATION_TIMEDOUT: i64 = 28;
const CURLE_TOO_MANY_REDIRECTS: i64 = 47;
const CURLE_RECV_ERROR: i64 = 56;
const CURLE_UNKNOWN: i64 = 0;

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug, Clone)]
struct HttpResponse {
    status: u16,
    body: String,
}

#[derive(Debug, thiserror::Error)]
#[error("transport failure (code {code}): {source}")]
struct TransportFailure {
    code: i64,
    source: Box<dyn StdError + Send + Sync>,
}

trait HttpTransport: Send + Sync {
    fn post_form<'a>(
        &'a self,
        url: &'a str,
        params: Vec<(String, String)>,
    ) -> BoxFuture<'a, Result<HttpResponse, TransportFailure>>;
}

#[derive(Debug, Clone)]
struct ReqwestTransport {
    client: reqwest::Client,
}

impl HttpTransport for ReqwestTransport {
    fn post_form<'a>(
        &'a self,
        url: &'a str,
        params: Vec<(String, String)>,
    ) -> BoxFuture<'a, Result<HttpResponse, TransportFailure>> {
        Box::pin(async move {
            let response = self
                .client
                .post(url)
                .form(&params)
                .send()
                .await
                .map_err(TransportFailure::from_reqwest)?;
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .map_err(TransportFailure::from_reqwest)?;
            Ok(HttpResponse { status, body })
        })
    }
}

impl TransportFailure {
    fn from_reqwest(err: reqwest::Error) -> Self {
        let code = if err.is_timeout() {
            CURLE_OPERATION_TIMEDOUT
        } else if err.is_connect() {
            CURLE_COULDNT_CONNECT
        } else if err.is_redirect() {
            CURLE_TOO_MANY_REDIRECTS
        } else if err.is_body() || err.is_decode() {
            CURLE_RECV_ERROR
        } else if err.is_builder() {
            CURLE_URL_MALFORMAT
        } else {
            CURLE_UNKNOWN
        };
        Self {
            code,
            source: Box::new(err),
        }
    }
}

#[derive(Debug, thiserror::Error)]
/// Errors raised by [`ZenzivaClient`] before any network call is made.
///
/// Transport and provider failures are not raised: [`ZenzivaClient::send`] records them
/// in the client's [`History`] and returns [`SendOutcome::Failure`].
pub enum ZenzivaError {
    /// Unknown package type, or a subdomain that does not form a valid host.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[source] ValidationError),

    /// A required value (receiver number, message, or `sms_center` subdomain) is absent.
    #[error("{field} is not set")]
    MissingField { field: &'static str },

    /// The HTTP client could not be constructed.
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn StdError + Send + Sync>),
}

impl From<ValidationError> for ZenzivaError {
    fn from(value: ValidationError) -> Self {
        match value {
            ValidationError::Empty { field } => Self::MissingField { field },
            other => Self::InvalidConfiguration(other),
        }
    }
}

#[derive(Debug, Clone)]
/// Builder for [`ZenzivaClient`].
///
/// Use this when you need to preselect the package or customize the HTTP client.
pub struct ZenzivaClientBuilder {
    username: Username,
    password: Password,
    package: PackageType,
    subdomain: String,
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl ZenzivaClientBuilder {
    /// Create a builder for the `regular` package with no timeout/user-agent override.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: Username::new(username),
            password: Password::new(password),
            package: PackageType::default(),
            subdomain: String::new(),
            timeout: None,
            user_agent: None,
        }
    }

    /// Select the sending package.
    pub fn package_type(mut self, package: PackageType) -> Self {
        self.package = package;
        self
    }

    /// Account subdomain, used by the `sms_center` package only.
    pub fn subdomain(mut self, subdomain: impl Into<String>) -> Self {
        self.subdomain = subdomain.into();
        self
    }

    /// Set an HTTP client timeout applied to the entire request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the HTTP `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Build a [`ZenzivaClient`].
    pub fn build(self) -> Result<ZenzivaClient, ZenzivaError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(user_agent) = self.user_agent {
            builder = builder.user_agent(user_agent);
        }

        let client = builder
            .build()
            .map_err(|err| ZenzivaError::Transport(Box::new(err)))?;

        Ok(ZenzivaClient::with_transport(
            self.username,
            self.password,
            self.package,
            self.subdomain,
            Arc::new(ReqwestTransport { client }),
        ))
    }
}

#[derive(Debug, Clone, Default)]
/// Per-call values applied by [`ZenzivaClient::send_with`] before sending.
///
/// Empty strings and `otp == false` leave the client's current configuration untouched.
/// Applied values persist on the client for subsequent sends.
pub struct SendOverrides {
    pub to: Option<String>,
    pub message: Option<String>,
    pub otp: bool,
}

impl SendOverrides {
    /// Overrides that change nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Receiver number to apply before sending.
    pub fn to(mut self, number: impl Into<String>) -> Self {
        self.to = Some(number.into());
        self
    }

    /// Message text to apply before sending.
    pub fn message(mut self, text: impl Into<String>) -> Self {
        self.message = Some(text.into());
        self
    }

    /// Turn on the OTP flag before sending; `false` leaves the flag as it is.
    pub fn otp(mut self, otp: bool) -> Self {
        self.otp = otp;
        self
    }
}

/// High-level Zenziva client.
///
/// Holds the credentials, the selected package and the pending message, and keeps an
/// append-only [`History`] of every error and decoded reply it has seen.
///
/// Endpoints are fixed per package:
/// - `regular`: `https://reguler.zenziva.net/apps/smsapi.php`
/// - `masking`: `https://alpha.zenziva.net/apps/smsapi.php`
/// - `sms_center`: `https://{subdomain}.zenziva.net/api/sendsms/`
///
/// For `regular` and `masking`, any configured subdomain is replaced by the fixed one
/// on every send.
#[derive(Clone)]
pub struct ZenzivaClient {
    username: Username,
    password: Password,
    package: PackageType,
    subdomain: String,
    to: Option<PhoneNumber>,
    message: Option<MessageText>,
    otp: bool,
    url: Option<Url>,
    history: History,
    http: Arc<dyn HttpTransport>,
}

impl std::fmt::Debug for ZenzivaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZenzivaClient")
            .field("username", &self.username)
            .field("password", &self.password)
            .field("package", &self.package)
            .field("subdomain", &self.subdomain)
            .field("to", &self.to)
            .field("message", &self.message)
            .field("otp", &self.otp)
            .field("url", &self.url)
            .field("history", &self.history)
            .finish_non_exhaustive()
    }
}

impl ZenzivaClient {
    /// Create a client for the `regular` package with default HTTP settings.
    ///
    /// For more customization, use [`ZenzivaClient::builder`].
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::with_transport(
            Username::new(username),
            Password::new(password),
            PackageType::default(),
            String::new(),
            Arc::new(ReqwestTransport {
                client: reqwest::Client::new(),
            }),
        )
    }

    /// Start building a client with custom settings.
    pub fn builder(
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> ZenzivaClientBuilder {
        ZenzivaClientBuilder::new(username, password)
    }

    fn with_transport(
        username: Username,
        password: Password,
        package: PackageType,
        subdomain: String,
        http: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            username,
            password,
            package,
            subdomain,
            to: None,
            message: None,
            otp: false,
            url: None,
            history: History::default(),
            http,
        }
    }

    /// Account username, sent as `userkey`.
    pub fn set_username(&mut self, username: impl Into<String>) -> &mut Self {
        self.username = Username::new(username);
        self
    }

    /// Account password, sent as `passkey`.
    pub fn set_password(&mut self, password: impl Into<String>) -> &mut Self {
        self.password = Password::new(password);
        self
    }

    /// Select the package by key (`regular`, `masking`, `sms_center`).
    ///
    /// On an unknown key the current package is kept and
    /// [`ZenzivaError::InvalidConfiguration`] is returned.
    pub fn set_package_type(&mut self, key: &str) -> Result<&mut Self, ZenzivaError> {
        self.package = key.parse::<PackageType>()?;
        Ok(self)
    }

    /// Select the package directly.
    pub fn set_package(&mut self, package: PackageType) -> &mut Self {
        self.package = package;
        self
    }

    /// Account subdomain. Only honoured by the `sms_center` package.
    pub fn set_subdomain(&mut self, subdomain: impl Into<String>) -> &mut Self {
        self.subdomain = subdomain.into();
        self
    }

    /// Receiver number, e.g. `08xxxxxxxxxx`. Rejects an empty string.
    pub fn set_destination(&mut self, number: &str) -> Result<&mut Self, ZenzivaError> {
        self.to = Some(PhoneNumber::new(number)?);
        Ok(self)
    }

    /// Message text. Rejects an empty string.
    pub fn set_message(&mut self, text: &str) -> Result<&mut Self, ZenzivaError> {
        self.message = Some(MessageText::new(text)?);
        Ok(self)
    }

    /// Tag the message as a one-time-password delivery (`type=otp`).
    pub fn set_otp(&mut self, otp: bool) -> &mut Self {
        self.otp = otp;
        self
    }

    pub fn username(&self) -> &Username {
        &self.username
    }

    pub fn package_type(&self) -> PackageType {
        self.package
    }

    pub fn subdomain(&self) -> &str {
        &self.subdomain
    }

    pub fn destination(&self) -> Option<&PhoneNumber> {
        self.to.as_ref()
    }

    pub fn message(&self) -> Option<&MessageText> {
        self.message.as_ref()
    }

    pub fn otp(&self) -> bool {
        self.otp
    }

    /// Endpoint used by the most recent send attempt that got past validation.
    pub fn last_url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    /// Every error and decoded reply recorded by this client.
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Recorded errors, oldest first.
    pub fn errors(&self) -> &[String] {
        self.history.errors()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.history.last_error()
    }

    /// Decoded replies, oldest first.
    pub fn responses(&self) -> &[ProviderResponse] {
        self.history.responses()
    }

    pub fn last_response(&self) -> Option<&ProviderResponse> {
        self.history.last_response()
    }

    /// Send the configured message.
    ///
    /// Equivalent to [`ZenzivaClient::send_with`] with no overrides.
    pub async fn send(&mut self) -> Result<SendOutcome, ZenzivaError> {
        self.send_with(SendOverrides::default()).await
    }

    /// Apply `overrides`, then send the configured message through Zenziva.
    ///
    /// Errors:
    /// - [`ZenzivaError::MissingField`] when the receiver number, the message, or the
    ///   `sms_center` subdomain is not set,
    /// - [`ZenzivaError::InvalidConfiguration`] when the subdomain does not form a valid host.
    ///
    /// Both are raised before any network call. Transport failures (including non-2xx
    /// HTTP statuses) and replies whose `message.text` is not `"Success"` are recorded in
    /// [`ZenzivaClient::history`] and returned as [`SendOutcome::Failure`].
    pub async fn send_with(
        &mut self,
        overrides: SendOverrides,
    ) -> Result<SendOutcome, ZenzivaError> {
        if let Some(to) = overrides.to.as_deref().filter(|to| !to.is_empty()) {
            self.set_destination(to)?;
        }
        if let Some(text) = overrides.message.as_deref().filter(|text| !text.is_empty()) {
            self.set_message(text)?;
        }
        if overrides.otp {
            self.set_otp(true);
        }

        let to = self.to.clone().ok_or(ZenzivaError::MissingField {
            field: PhoneNumber::LABEL,
        })?;
        let message = self.message.clone().ok_or(ZenzivaError::MissingField {
            field: MessageText::LABEL,
        })?;

        let url = self.resolve_endpoint()?;
        let params = encode_send_sms_form(&SendSmsForm {
            username: &self.username,
            password: &self.password,
            to: &to,
            message: &message,
            otp: self.otp,
        });

        debug!(package = %self.package, url = %url, otp = self.otp, "sending sms");

        let response = match self.http.post_form(url.as_str(), params).await {
            Ok(response) if (200..=299).contains(&response.status) => response,
            Ok(response) => {
                warn!(status = response.status, "unexpected HTTP status from zenziva");
                return Ok(self.record_transport_failure(i64::from(response.status)));
            }
            Err(failure) => {
                warn!(code = failure.code, error = %failure.source, "zenziva request failed");
                return Ok(self.record_transport_failure(failure.code));
            }
        };

        let decoded = match decode_xml_response(&response.body) {
            Ok(decoded) => decoded,
            Err(err) => {
                let error = err.to_string();
                warn!(%error, "could not decode zenziva reply");
                self.history.record_error(error.clone());
                return Ok(SendOutcome::Failure {
                    error,
                    response: None,
                });
            }
        };
        self.history.record_response(decoded.clone());

        match decoded.message_text().map(str::to_owned) {
            Some(text) if text == SUCCESS_TEXT => {
                debug!("zenziva accepted the message");
                Ok(SendOutcome::Success { response: decoded })
            }
            text => {
                let error = text.unwrap_or_else(|| "reply has no message.text".to_owned());
                warn!(%error, "zenziva rejected the message");
                self.history.record_error(error.clone());
                Ok(SendOutcome::Failure {
                    error,
                    response: Some(decoded),
                })
            }
        }
    }

    fn resolve_endpoint(&mut self) -> Result<Url, ZenzivaError> {
        if let Some(fixed) = self.package.fixed_subdomain() {
            self.subdomain = fixed.to_owned();
        }
        let subdomain = Subdomain::new(self.subdomain.as_str())?;
        let url = self.package.endpoint(subdomain.as_str())?;
        self.url = Some(url.clone());
        Ok(url)
    }

    fn record_transport_failure(&mut self, code: i64) -> SendOutcome {
        let error = format!("Curl Error Code : {code}");
        self.history.record_error(error.clone());
        SendOutcome::Failure {
            error,
            response: None,
        }
    }
}
