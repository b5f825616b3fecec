//! Email service for order notifications.
//!
//! Uses SMTP via lettre for delivery with Askama HTML templates.

use askama::Template;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use golden_fig_core::{Email, OrderId};

use crate::config::EmailConfig;

/// A resolved order line for the notification templates.
pub struct OrderEmailLine {
    /// Product title, or a placeholder if the catalog row is gone.
    pub title: String,
    /// Number of units ordered.
    pub count: i32,
}

/// HTML template for the admin new-order notification.
#[derive(Template)]
#[template(path = "email/order_admin.html")]
struct AdminOrderEmailHtml<'a> {
    order_id: OrderId,
    lines: &'a [OrderEmailLine],
}

/// Plain text template for the admin new-order notification.
#[derive(Template)]
#[template(path = "email/order_admin.txt")]
struct AdminOrderEmailText<'a> {
    order_id: OrderId,
    lines: &'a [OrderEmailLine],
}

/// HTML template for the customer order confirmation.
#[derive(Template)]
#[template(path = "email/order_customer.html")]
struct CustomerOrderEmailHtml<'a> {
    order_id: OrderId,
    lines: &'a [OrderEmailLine],
}

/// Plain text template for the customer order confirmation.
#[derive(Template)]
#[template(path = "email/order_customer.txt")]
struct CustomerOrderEmailText<'a> {
    order_id: OrderId,
    lines: &'a [OrderEmailLine],
}

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

/// Email service for sending transactional emails.
#[derive(Clone)]
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl EmailService {
    /// Create a new email service from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the SMTP transport fails to build.
    pub fn new(config: &EmailConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from_address: config.from_address.clone(),
        })
    }

    /// Notify the shop administrator that a new order was placed.
    ///
    /// # Errors
    ///
    /// Returns error if the email fails to send or a template fails to render.
    pub async fn send_admin_order_notification(
        &self,
        to: &Email,
        order_id: OrderId,
        lines: &[OrderEmailLine],
    ) -> Result<(), EmailError> {
        let html = AdminOrderEmailHtml { order_id, lines }.render()?;
        let text = AdminOrderEmailText { order_id, lines }.render()?;

        self.send_multipart_email(to.as_str(), &format!("New order #{order_id}"), &text, &html)
            .await
    }

    /// Send the order confirmation to the customer.
    ///
    /// # Errors
    ///
    /// Returns error if the email fails to send or a template fails to render.
    pub async fn send_customer_order_confirmation(
        &self,
        to: &Email,
        order_id: OrderId,
        lines: &[OrderEmailLine],
    ) -> Result<(), EmailError> {
        let html = CustomerOrderEmailHtml { order_id, lines }.render()?;
        let text = CustomerOrderEmailText { order_id, lines }.render()?;

        self.send_multipart_email(
            to.as_str(),
            &format!("Your Golden Fig order #{order_id}"),
            &text,
            &html,
        )
        .await
    }

    /// Send a multipart email with both plain text and HTML versions.
    async fn send_multipart_email(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> Result<(), EmailError> {
        let email = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| EmailError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(to
                .parse()
                .map_err(|_| EmailError::InvalidAddress(to.to_string()))?)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text_body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body.to_string()),
                    ),
            )?;

        self.mailer.send(email).await?;

        tracing::info!(to = %to, subject = %subject, "Email sent successfully");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn lines() -> Vec<OrderEmailLine> {
        vec![
            OrderEmailLine {
                title: "Fig jam".to_string(),
                count: 2,
            },
            OrderEmailLine {
                title: "Olive oil".to_string(),
                count: 1,
            },
        ]
    }

    #[test]
    fn test_admin_templates_render_order_lines() {
        let lines = lines();
        let html = AdminOrderEmailHtml {
            order_id: OrderId::new(42),
            lines: &lines,
        }
        .render()
        .unwrap();
        let text = AdminOrderEmailText {
            order_id: OrderId::new(42),
            lines: &lines,
        }
        .render()
        .unwrap();

        for body in [&html, &text] {
            assert!(body.contains("42"));
            assert!(body.contains("Fig jam"));
            assert!(body.contains("Olive oil"));
        }
    }

    #[test]
    fn test_customer_templates_render_order_lines() {
        let lines = lines();
        let html = CustomerOrderEmailHtml {
            order_id: OrderId::new(7),
            lines: &lines,
        }
        .render()
        .unwrap();
        let text = CustomerOrderEmailText {
            order_id: OrderId::new(7),
            lines: &lines,
        }
        .render()
        .unwrap();

        assert!(html.contains("Fig jam"));
        assert!(text.contains("7"));
    }
}
