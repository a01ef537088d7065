use clap::Parser;
use rentpay_adapters::{DarajaConfig, SmsConfig};
use rentpay_service::{build_router, ServiceConfig, ServiceState, DEFAULT_USSD_CODE};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "rentpayd", version, about = "RentPay USSD gateway service")]
struct Cli {
    /// Socket address to bind, e.g. 127.0.0.1:8080
    #[arg(long, default_value = "127.0.0.1:8080")]
    listen: SocketAddr,
    /// JSON tenant seed file; the built-in demo seed is used when omitted.
    #[arg(long, env = "RENTPAY_TENANTS")]
    tenants: Option<PathBuf>,
    /// Shortcode printed on invoices so tenants know what to dial.
    #[arg(long, env = "RENTPAY_USSD_CODE", default_value = DEFAULT_USSD_CODE)]
    ussd_code: String,

    #[arg(long, env = "MPESA_CONSUMER_KEY", default_value = "")]
    mpesa_consumer_key: String,
    #[arg(long, env = "MPESA_CONSUMER_SECRET", default_value = "")]
    mpesa_consumer_secret: String,
    #[arg(long, env = "MPESA_SHORTCODE", default_value = "")]
    mpesa_shortcode: String,
    #[arg(long, env = "MPESA_PASSKEY", default_value = "")]
    mpesa_passkey: String,
    /// Use the Safaricom sandbox environment.
    #[arg(
        long,
        env = "MPESA_SANDBOX",
        default_value_t = true,
        action = clap::ArgAction::Set
    )]
    mpesa_sandbox: bool,
    /// URL the provider posts payment-completion notifications to.
    #[arg(
        long,
        env = "MPESA_CALLBACK_URL",
        default_value = "http://localhost:8080/mpesa/callback"
    )]
    mpesa_callback_url: String,

    #[arg(long, env = "SMS_API_KEY", default_value = "")]
    sms_api_key: String,
    #[arg(long, env = "SMS_USERNAME", default_value = "")]
    sms_username: String,
    #[arg(long, env = "SMS_SENDER_ID", default_value = "RENTPAY")]
    sms_sender_id: String,
    #[arg(
        long,
        env = "SMS_API_URL",
        default_value = rentpay_adapters::sms::DEFAULT_API_URL
    )]
    sms_api_url: String,
}

impl Cli {
    fn service_config(self) -> ServiceConfig {
        ServiceConfig {
            tenants_path: self.tenants,
            daraja: Some(DarajaConfig {
                consumer_key: self.mpesa_consumer_key,
                consumer_secret: self.mpesa_consumer_secret,
                shortcode: self.mpesa_shortcode,
                passkey: self.mpesa_passkey,
                sandbox: self.mpesa_sandbox,
                callback_url: self.mpesa_callback_url,
            }),
            sms: Some(SmsConfig {
                api_key: self.sms_api_key,
                username: self.sms_username,
                sender_id: self.sms_sender_id,
                api_url: self.sms_api_url,
            }),
            ussd_code: Some(self.ussd_code),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "rentpay_service=info,info".to_string()),
        )
        .init();

    let cli = Cli::parse();
    let listen = cli.listen;
    let state = ServiceState::bootstrap(cli.service_config())?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(listen).await?;
    info!("rentpay-service listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
