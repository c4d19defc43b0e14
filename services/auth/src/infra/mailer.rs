use anyhow::Context as _;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::domain::repository::CodeNotifier;
use crate::error::AuthServiceError;

/// SMTP notifier for OTP codes. Connects lazily; building the transport
/// does not touch the network.
#[derive(Clone)]
pub struct SmtpMailer {
    from: Mailbox,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn new(
        host: &str,
        port: u16,
        username: String,
        password: String,
        from: &str,
    ) -> Result<Self, anyhow::Error> {
        let from = from.parse::<Mailbox>().context("parse MAIL_FROM address")?;
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            .context("build SMTP transport")?
            .port(port)
            .credentials(Credentials::new(username, password))
            .build();
        Ok(Self { from, transport })
    }
}

impl CodeNotifier for SmtpMailer {
    async fn send_code(&self, to: &str, code: &str) -> Result<(), AuthServiceError> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(to
                .parse::<Mailbox>()
                .context("parse recipient address")?)
            .subject("Account activation")
            .body(format!(
                "Your verification code is: {code}\nThis code expires in 10 minutes."
            ))
            .context("build otp mail")?;

        self.transport
            .send(message)
            .await
            .context("send otp mail")?;
        Ok(())
    }
}
