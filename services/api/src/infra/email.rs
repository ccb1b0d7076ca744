use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{info, warn};

use crate::config::ApiConfig;
use crate::domain::repository::Mailer;

/// Outgoing mail over SMTP. Without SMTP settings the mailer runs in
/// log-only mode, which is how local development reads its codes.
///
/// Delivery failures are logged and dropped. A user who never receives the
/// mail retries the request; the flow that queued the mail must not fail
/// because a relay was down.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from: String,
}

impl SmtpMailer {
    pub fn from_config(config: &ApiConfig) -> anyhow::Result<Self> {
        let transport = match &config.smtp_host {
            Some(host) => {
                let mut builder =
                    AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)?
                        .port(config.smtp_port);
                if let (Some(user), Some(password)) = (&config.smtp_user, &config.smtp_password) {
                    builder = builder.credentials(Credentials::new(user.clone(), password.clone()));
                }
                Some(builder.build())
            }
            None => {
                info!("no SMTP host configured, mail will be logged only");
                None
            }
        };
        Ok(Self {
            transport,
            from: config.smtp_from.clone(),
        })
    }

    async fn deliver(&self, to: &str, subject: &str, body: String) {
        let Some(transport) = &self.transport else {
            info!(to, subject, body, "mail (log-only mode)");
            return;
        };
        let message = Message::builder()
            .from(match self.from.parse() {
                Ok(from) => from,
                Err(e) => {
                    warn!(error = %e, "invalid from address, mail dropped");
                    return;
                }
            })
            .to(match to.parse() {
                Ok(to) => to,
                Err(e) => {
                    warn!(to, error = %e, "invalid recipient address, mail dropped");
                    return;
                }
            })
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body);
        let message = match message {
            Ok(m) => m,
            Err(e) => {
                warn!(to, error = %e, "failed to build mail");
                return;
            }
        };
        if let Err(e) = transport.send(message).await {
            warn!(to, subject, error = %e, "failed to send mail");
        }
    }
}

impl Mailer for SmtpMailer {
    async fn send_verification_code(&self, to: &str, full_name: &str, code: &str) {
        let body = format!(
            "Welcome, {full_name}!\n\n\
             To complete your registration, enter this verification code:\n\n\
             {code}\n\n\
             The code is valid for 10 minutes. If you did not sign up, you can\n\
             ignore this message.\n"
        );
        self.deliver(to, "Second Opinion - Email Verification Code", body)
            .await;
    }

    async fn send_password_reset_code(&self, to: &str, full_name: &str, code: &str) {
        let body = format!(
            "Hello {full_name},\n\n\
             Use this code to reset your password:\n\n\
             {code}\n\n\
             The code is valid for 10 minutes. If you did not request a reset,\n\
             you can ignore this message.\n"
        );
        self.deliver(to, "Second Opinion - Password Reset Code", body)
            .await;
    }

    async fn send_welcome(&self, to: &str, full_name: &str) {
        let body = format!(
            "Welcome to Second Opinion, {full_name}!\n\n\
             Your email address is verified and your account is ready to use.\n"
        );
        self.deliver(to, "Second Opinion - Welcome!", body).await;
    }
}
