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

use async_trait::async_trait;
use chrono::Utc;
use db_connector::models::sent_emails::NewSentEmail;

use crate::{error::Error, secrets::DbCredentials};

#[async_trait]
pub trait SentEmailStore: Send + Sync {
    /// Insert one `PENDING` row for `email` and `token`, stamped with the current time.
    async fn insert_pending(
        &self,
        credentials: &DbCredentials,
        email: &str,
        token: &str,
    ) -> Result<(), Error>;
}

/// Opens a fresh connection per insert and closes it before returning.
pub struct PgSentEmailStore;

/// Runs blocking diesel work off the async executor.
pub async fn run_blocking<F, R>(f: F) -> Result<R, Error>
where
    F: FnOnce() -> Result<R, Error> + Send + 'static,
    R: Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(res) => res,
        Err(err) => Err(Error::PersistenceError {
            reason: format!("database task failed: {err}"),
        }),
    }
}

#[async_trait]
impl SentEmailStore for PgSentEmailStore {
    async fn insert_pending(
        &self,
        credentials: &DbCredentials,
        email: &str,
        token: &str,
    ) -> Result<(), Error> {
        log::info!(
            "Connecting to database at: {}",
            credentials.connection_params().target()
        );

        let credentials = credentials.clone();
        let mail = email.to_owned();
        let token = token.to_owned();
        run_blocking(move || {
            let mut conn =
                db_connector::establish(&credentials.connection_params()).map_err(|err| {
                    Error::PersistenceError {
                        reason: err.to_string(),
                    }
                })?;

            let row = NewSentEmail::pending(&mail, &token, Utc::now().naive_utc());
            db_connector::insert_sent_email(&mut conn, &row).map_err(|err| {
                Error::PersistenceError {
                    reason: err.to_string(),
                }
            })?;

            Ok(())
        })
        .await
        .inspect_err(|err| log::error!("Error storing token in database: {err}"))?;

        log::info!("Token stored successfully for email: {email}");
        Ok(())
    }
}
