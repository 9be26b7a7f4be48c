use std::io;

use tracing_subscriber::EnvFilter;
use zenziva::{PackageType, SendOverrides, ZenzivaClient};

fn required_env(name: &str) -> Result<String, io::Error> {
    std::env::var(name).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{name} environment variable is required"),
        )
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let userkey = required_env("ZENZIVA_USERKEY")?;
    let passkey = required_env("ZENZIVA_PASSKEY")?;
    let phone = required_env("ZENZIVA_PHONE")?;
    let message = std::env::var("ZENZIVA_MESSAGE")
        .unwrap_or_else(|_| "Hello from the zenziva example.".to_owned());
    let package = std::env::var("ZENZIVA_PACKAGE")
        .ok()
        .map(|key| key.parse::<PackageType>())
        .transpose()?
        .unwrap_or_default();
    let subdomain = std::env::var("ZENZIVA_SUBDOMAIN").unwrap_or_default();
    let otp = std::env::var("ZENZIVA_OTP").is_ok_and(|value| value == "1");

    let mut client = ZenzivaClient::builder(userkey, passkey)
        .package_type(package)
        .subdomain(subdomain)
        .build()?;

    let outcome = client
        .send_with(SendOverrides::new().to(phone).message(message).otp(otp))
        .await?;

    println!(
        "success: {}, endpoint: {:?}, last error: {:?}, reply: {:?}",
        outcome.is_success(),
        client.last_url().map(|url| url.as_str()),
        client.last_error(),
        outcome.response().and_then(|response| response.message()),
    );

    Ok(())
}
