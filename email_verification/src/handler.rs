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

use std::sync::Arc;

use aws_lambda_events::event::sns::SnsEvent;
use lambda_runtime::LambdaEvent;

use crate::{
    config::Config,
    error::Error,
    event::{extract_email, messages, parse_payload},
    mailer::{verification_link, Mailer},
    secrets::{fetch_db_credentials, SecretStore},
    store::SentEmailStore,
    token::VerificationToken,
};

pub const SUCCESS_MESSAGE: &str = "Emails processed successfully.";

/// Outcome of one successfully handled notification record.
#[derive(Debug, Clone)]
pub struct ProcessedRecord {
    pub email: String,
    pub token: VerificationToken,
    pub link: String,
}

pub struct Handler {
    config: Config,
    secrets: Arc<dyn SecretStore>,
    store: Arc<dyn SentEmailStore>,
    mailer: Arc<dyn Mailer>,
}

impl Handler {
    pub fn new(
        config: Config,
        secrets: Arc<dyn SecretStore>,
        store: Arc<dyn SentEmailStore>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            config,
            secrets,
            store,
            mailer,
        }
    }

    pub async fn handle(&self, event: LambdaEvent<SnsEvent>) -> String {
        log::info!(
            "Lambda triggered with SNS event (request id {}).",
            event.context.request_id
        );
        self.handle_event(&event.payload).await
    }

    /// Never fails: any error ends the batch and comes back as `Error: <message>`.
    pub async fn handle_event(&self, event: &SnsEvent) -> String {
        let messages = messages(event);
        log::info!("Received SNS event with {} record(s).", messages.len());

        match self.process_batch(messages).await {
            Ok(_) => SUCCESS_MESSAGE.to_string(),
            Err(err) => {
                log::error!("Error occurred: {err}");
                format!("Error: {err}")
            }
        }
    }

    /// Processes records in order and stops at the first failure. Returns the
    /// number of processed records.
    pub async fn process_batch<'a, I>(&self, messages: I) -> Result<usize, Error>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut processed = 0;
        for message in messages {
            self.process_record(message).await?;
            processed += 1;
        }

        Ok(processed)
    }

    pub async fn process_record(&self, message: &str) -> Result<ProcessedRecord, Error> {
        log::info!("Processing SNS message: {message}");

        let payload = parse_payload(message).inspect_err(|err| {
            log::error!("{err}");
            log::error!("Raw message: {message}");
        })?;

        let email = extract_email(&payload).inspect_err(|_| {
            log::error!("No 'email' field found in message: {message}");
        })?;
        log::info!("Extracted email: {email}");

        log::info!("Fetching database credentials...");
        let credentials =
            fetch_db_credentials(self.secrets.as_ref(), &self.config.db_secret_name).await?;
        log::info!("Database credentials fetched successfully.");

        let token = VerificationToken::generate(self.config.verification_expiry);
        log::info!("Generated verification token: {}", token.token);
        log::info!("Token expiry set to: {}", token.expires_at.to_rfc3339());

        log::info!("Storing verification token in the database...");
        self.store
            .insert_pending(&credentials, &email, &token.token)
            .await?;
        log::info!("Verification token stored successfully.");

        let link = verification_link(&self.config.domain_name, &token.token);
        log::info!("Sending verification email to: {email}");
        self.mailer.send_verification(&email, &link).await?;
        log::info!("Verification email sent successfully to: {email}");

        Ok(ProcessedRecord { email, token, link })
    }
}
