//! Booking notification e-mails sent through the Resend HTTP API.
//!
//! Every booking notifies the configured admin address, plus the owner of
//! the booked hotel or vehicle when their address is on file. Delivery is
//! attempted once; callers surface a failure as a warning.

use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

use crate::{config::AppConfig, models::bookings::BookingType, services::export_service::CURRENCY};

const RESEND_BASE_URL: &str = "https://api.resend.com";

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Notification service not configured: {0}")]
    NotConfigured(&'static str),

    #[error("Email provider rejected the message: {status} {body}")]
    Rejected { status: u16, body: String },

    #[error("Failed to reach email provider: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Clone)]
pub struct BookingNotification {
    pub booking_type: BookingType,
    /// Label/value pairs, rendered in order.
    pub details: Vec<(String, String)>,
    pub customer_name: String,
    pub customer_email: Option<String>,
    pub owner_email: Option<String>,
    pub subtotal: f64,
    pub service_charge: f64,
    pub total_amount: f64,
}

#[derive(Debug, Serialize)]
struct ResendEmail<'a> {
    from: &'a str,
    to: Vec<String>,
    subject: String,
    html: String,
}

pub struct NotificationService {
    http_client: reqwest::Client,
    api_key: Option<String>,
    admin_email: Option<String>,
    from: String,
    base_url: String,
}

impl NotificationService {
    pub fn new(config: &AppConfig) -> Result<Self, reqwest::Error> {
        Self::with_base_url(config, RESEND_BASE_URL)
    }

    pub fn with_base_url(config: &AppConfig, base_url: &str) -> Result<Self, reqwest::Error> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            http_client,
            api_key: config.resend_api_key.clone(),
            admin_email: config.admin_email.clone(),
            from: config.notification_from.clone(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some() && self.admin_email.is_some()
    }

    pub fn recipients(&self, notification: &BookingNotification) -> Result<Vec<String>, NotificationError> {
        let admin = self
            .admin_email
            .clone()
            .ok_or(NotificationError::NotConfigured("ADMIN_EMAIL"))?;

        let mut recipients = vec![admin];
        if let Some(owner) = notification
            .owner_email
            .as_deref()
            .map(str::trim)
            .filter(|owner| !owner.is_empty())
        {
            if !recipients.iter().any(|r| r.eq_ignore_ascii_case(owner)) {
                recipients.push(owner.to_string());
            }
        }
        Ok(recipients)
    }

    pub async fn send_booking_notification(
        &self,
        notification: &BookingNotification,
    ) -> Result<(), NotificationError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(NotificationError::NotConfigured("RESEND_API_KEY"))?;
        let recipients = self.recipients(notification)?;

        log::info!("Sending booking notification to: {:?}", recipients);

        let email = ResendEmail {
            from: &self.from,
            to: recipients,
            subject: subject(notification.booking_type),
            html: render_html(notification),
        };

        let response = self
            .http_client
            .post(format!("{}/emails", self.base_url))
            .bearer_auth(api_key)
            .json(&email)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotificationError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        log::info!("Booking notification sent");
        Ok(())
    }
}

pub fn subject(booking_type: BookingType) -> String {
    match booking_type {
        BookingType::Vehicle => "New Vehicle Booking".to_string(),
        BookingType::Accommodation => "New Accommodation Booking".to_string(),
        BookingType::Train => "New Train Booking Request".to_string(),
    }
}

pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

pub fn render_html(notification: &BookingNotification) -> String {
    let heading = match notification.booking_type {
        BookingType::Vehicle => "Vehicle Booking Details",
        BookingType::Accommodation => "Accommodation Booking Details",
        BookingType::Train => "Train Booking Details",
    };

    let details: String = notification
        .details
        .iter()
        .map(|(label, value)| {
            format!(
                "<p><strong>{}:</strong> {}</p>",
                escape_html(label),
                escape_html(value)
            )
        })
        .collect();

    let email = notification.customer_email.as_deref().unwrap_or("-");

    // train requests carry no fare
    let payment = match notification.booking_type {
        BookingType::Train => {
            "<div><h3>Payment Information</h3><p>Fare payable at the station</p></div>".to_string()
        }
        _ => format!(
            concat!(
                "<div><h3>Payment Information</h3>",
                "<p><strong>Subtotal:</strong> {cur} {subtotal:.2}</p>",
                "<p><strong>Service Charge (10%):</strong> {cur} {charge:.2}</p>",
                "<p><strong>Total Amount:</strong> {cur} {total:.2}</p>",
                "<p><strong>Payment Method:</strong> Card</p></div>"
            ),
            cur = CURRENCY,
            subtotal = notification.subtotal,
            charge = notification.service_charge,
            total = notification.total_amount,
        ),
    };

    format!(
        concat!(
            "<div style=\"font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;\">",
            "<h2>New Booking Notification</h2>",
            "<div><h3>Customer Information</h3>",
            "<p><strong>Name:</strong> {name}</p>",
            "<p><strong>Email:</strong> {email}</p></div>",
            "<div><h3>{heading}</h3>{details}</div>",
            "{payment}",
            "</div>"
        ),
        name = escape_html(&notification.customer_name),
        email = escape_html(email),
        heading = heading,
        details = details,
        payment = payment,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(api_key: Option<&str>, admin: Option<&str>) -> AppConfig {
        AppConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            mongodb_uri: "mongodb://localhost:27017".to_string(),
            jwt_secret: "secret".to_string(),
            resend_api_key: api_key.map(str::to_string),
            admin_email: admin.map(str::to_string),
            notification_from: "Sri Lanka Travel <noreply@example.com>".to_string(),
            openweather_api_key: None,
            ors_api_key: None,
            daily_distance_km: 100.0,
        }
    }

    fn notification(owner: Option<&str>) -> BookingNotification {
        BookingNotification {
            booking_type: BookingType::Accommodation,
            details: vec![
                ("Hotel".to_string(), "Cinnamon <Lodge>".to_string()),
                ("City".to_string(), "Habarana".to_string()),
            ],
            customer_name: "Nimal \"Nim\" Perera".to_string(),
            customer_email: Some("nimal@example.com".to_string()),
            owner_email: owner.map(str::to_string),
            subtotal: 30000.0,
            service_charge: 3000.0,
            total_amount: 33000.0,
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & Jerry's</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#039;s&lt;/a&gt;"
        );
        assert_eq!(escape_html("Kandy"), "Kandy");
    }

    #[test]
    fn test_render_html_escapes_values() {
        let html = render_html(&notification(None));
        assert!(html.contains("Accommodation Booking Details"));
        assert!(html.contains("Cinnamon &lt;Lodge&gt;"));
        assert!(html.contains("Nimal &quot;Nim&quot; Perera"));
        assert!(html.contains("LKR 33000.00"));
        assert!(!html.contains("<Lodge>"));
    }

    #[test]
    fn test_recipients_include_owner_once() {
        let service = NotificationService::new(&config(Some("key"), Some("admin@example.com"))).unwrap();

        assert_eq!(
            service.recipients(&notification(None)).unwrap(),
            vec!["admin@example.com"]
        );
        assert_eq!(
            service.recipients(&notification(Some("owner@example.com"))).unwrap(),
            vec!["admin@example.com", "owner@example.com"]
        );
        assert_eq!(
            service.recipients(&notification(Some("ADMIN@example.com"))).unwrap(),
            vec!["admin@example.com"]
        );
    }

    #[test]
    fn test_subject_by_booking_type() {
        assert_eq!(subject(BookingType::Vehicle), "New Vehicle Booking");
        assert_eq!(subject(BookingType::Accommodation), "New Accommodation Booking");
        assert_eq!(subject(BookingType::Train), "New Train Booking Request");
    }

    #[test]
    fn test_train_notification_has_no_card_payment() {
        let train = BookingNotification {
            booking_type: BookingType::Train,
            details: vec![("Train".to_string(), "Podi Menike (5)".to_string())],
            subtotal: 0.0,
            service_charge: 0.0,
            total_amount: 0.0,
            ..notification(None)
        };
        let html = render_html(&train);
        assert!(html.contains("Train Booking Details"));
        assert!(html.contains("Fare payable at the station"));
        assert!(!html.contains("Payment Method"));
    }

    #[tokio::test]
    async fn test_unconfigured_service_fails_without_request() {
        let service = NotificationService::new(&config(None, Some("admin@example.com"))).unwrap();
        assert!(!service.is_configured());

        let err = service
            .send_booking_notification(&notification(None))
            .await
            .unwrap_err();
        assert!(matches!(err, NotificationError::NotConfigured("RESEND_API_KEY")));
    }

    #[tokio::test]
    async fn test_send_posts_to_provider() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/emails")
            .match_header("authorization", "Bearer key")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "to": ["admin@example.com", "owner@example.com"],
                "subject": "New Accommodation Booking"
            })))
            .with_status(200)
            .with_body(r#"{"id":"email_123"}"#)
            .create_async()
            .await;

        let service = NotificationService::with_base_url(
            &config(Some("key"), Some("admin@example.com")),
            &server.url(),
        )
        .unwrap();

        service
            .send_booking_notification(&notification(Some("owner@example.com")))
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_provider_error_is_reported() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/emails")
            .with_status(422)
            .with_body("invalid from")
            .create_async()
            .await;

        let service = NotificationService::with_base_url(
            &config(Some("key"), Some("admin@example.com")),
            &server.url(),
        )
        .unwrap();

        let err = service
            .send_booking_notification(&notification(None))
            .await
            .unwrap_err();
        assert!(matches!(err, NotificationError::Rejected { status: 422, .. }));
    }
}
