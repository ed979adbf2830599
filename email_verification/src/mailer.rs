/* email-verification
 * Copyright (C) 2024 Frederic Henrichs <frederic@tinkerforge.com>
 *
 * This library is free software; you can redistribute it and/or
 * modify it under the terms of the GNU Lesser General Public
 * License as published by the Free Software Foundation; either
 * version 2 of the License, or (at your option) any later version.
 *
 * This library is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU
 * Lesser General Public License for more details.
 *
 * You should have received a copy of the GNU Lesser General Public
 * License along with this library; if not, write to the
 * Free Software Foundation, Inc., 59 Temple Place - Suite 330,
 * Boston, MA 02111-1307, USA.
 */

use askama::Template;
use async_trait::async_trait;

use crate::{config::Config, error::Error};

pub const MAILGUN_API_BASE: &str = "https://api.mailgun.net";
pub const SUBJECT: &str = "Verify Your Email";

#[derive(Template)]
#[template(path = "verification_email.txt")]
pub struct VerifyEmailTextTemplate<'a> {
    pub link: &'a str,
}

#[derive(Template)]
#[template(path = "verification_email.html")]
pub struct VerifyEmailHtmlTemplate<'a> {
    pub link: &'a str,
}

pub fn verification_link(domain_name: &str, token: &str) -> String {
    format!("http://{domain_name}/v1/user/verify?token={token}")
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_verification(&self, recipient: &str, link: &str) -> Result<(), Error>;
}

pub struct MailgunMailer {
    client: reqwest::Client,
    api_base: String,
    domain: String,
    api_key: String,
}

impl MailgunMailer {
    /// `client` is shared for its connection pool only.
    pub fn new(client: reqwest::Client, config: &Config) -> Self {
        Self {
            client,
            api_base: config.mailgun_api_base.clone(),
            domain: config.mailgun_domain.clone(),
            api_key: config.mailgun_api_key.clone(),
        }
    }

    pub fn messages_url(&self) -> String {
        format!("{}/v3/{}/messages", self.api_base, self.domain)
    }

    pub fn verification_form(
        &self,
        recipient: &str,
        link: &str,
    ) -> Result<Vec<(&'static str, String)>, Error> {
        let text = render(VerifyEmailTextTemplate { link })?;
        let html = render(VerifyEmailHtmlTemplate { link })?;

        Ok(vec![
            ("from", format!("support@{}", self.domain)),
            ("to", recipient.to_string()),
            ("subject", SUBJECT.to_string()),
            ("text", text),
            ("html", html),
            ("o:tag", "verification-email".to_string()),
            ("o:tracking", "yes".to_string()),
            ("o:tracking-clicks", "htmlonly".to_string()),
            ("o:tracking-opens", "yes".to_string()),
        ])
    }

    pub fn verification_request(
        &self,
        recipient: &str,
        link: &str,
    ) -> Result<reqwest::RequestBuilder, Error> {
        let form = self.verification_form(recipient, link)?;
        Ok(self
            .client
            .post(self.messages_url())
            .basic_auth("api", Some(&self.api_key))
            .form(&form))
    }
}

fn render(template: impl Template) -> Result<String, Error> {
    template.render().map_err(|err| {
        log::error!("Failed to render verification email template: {err}");
        Error::DeliveryFailed {
            reason: format!("could not render email: {err}"),
        }
    })
}

#[async_trait]
impl Mailer for MailgunMailer {
    async fn send_verification(&self, recipient: &str, link: &str) -> Result<(), Error> {
        log::info!("Generated verification link: {link}");

        let response = self
            .verification_request(recipient, link)?
            .send()
            .await
            .map_err(|err| {
                log::error!("Error sending email: {err}");
                Error::DeliveryFailed {
                    reason: err.to_string(),
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "No Response Body".to_string());

        if !status.is_success() {
            log::error!("Failed to send email. Response: {body}");
            return Err(Error::DeliveryFailed {
                reason: format!("Failed to send email. Status: {}", status.as_u16()),
            });
        }

        log::info!("Email sent successfully. Response: {body}");
        Ok(())
    }
}
