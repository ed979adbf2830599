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

use std::fmt;

use async_trait::async_trait;
use aws_sdk_secretsmanager::error::DisplayErrorContext;
use db_connector::ConnectionParams;
use serde::{Deserialize, Deserializer};

use crate::error::Error;

#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Raw string value of the secret with the given id.
    async fn secret_string(&self, secret_id: &str) -> Result<String, Error>;
}

pub struct AwsSecretStore {
    client: aws_sdk_secretsmanager::Client,
}

impl AwsSecretStore {
    pub fn new(client: aws_sdk_secretsmanager::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SecretStore for AwsSecretStore {
    async fn secret_string(&self, secret_id: &str) -> Result<String, Error> {
        log::info!("Retrieving secrets from Secrets Manager...");
        let output = self
            .client
            .get_secret_value()
            .secret_id(secret_id)
            .send()
            .await
            .map_err(|err| Error::SecretUnavailable {
                reason: DisplayErrorContext(&err).to_string(),
            })?;

        match output.secret_string() {
            Some(secret) => {
                log::info!("Secrets retrieved successfully.");
                Ok(secret.to_owned())
            }
            None => Err(Error::SecretUnavailable {
                reason: format!("secret '{secret_id}' has no string value"),
            }),
        }
    }
}

#[derive(Clone, Deserialize)]
pub struct DbCredentials {
    #[serde(rename = "DB_HOST")]
    pub host: String,
    #[serde(rename = "DB_PORT", deserialize_with = "port_from_string_or_number")]
    pub port: u16,
    #[serde(rename = "DB_NAME")]
    pub name: String,
    #[serde(rename = "DB_USERNAME")]
    pub username: String,
    #[serde(rename = "DB_PASSWORD")]
    pub password: String,
}

impl DbCredentials {
    pub fn connection_params(&self) -> ConnectionParams<'_> {
        ConnectionParams {
            host: &self.host,
            port: self.port,
            dbname: &self.name,
            user: &self.username,
            password: &self.password,
        }
    }
}

impl fmt::Debug for DbCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbCredentials")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("name", &self.name)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

// RDS managed secrets store the port as a number, hand written ones as a string.
fn port_from_string_or_number<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Port {
        Number(u16),
        Text(String),
    }

    match Port::deserialize(deserializer)? {
        Port::Number(port) => Ok(port),
        Port::Text(port) => port.trim().parse().map_err(serde::de::Error::custom),
    }
}

pub fn parse_credentials(secret: &str) -> Result<DbCredentials, Error> {
    log::info!("Parsing secrets JSON...");
    serde_json::from_str(secret).map_err(|err| {
        log::error!("Error parsing secrets JSON: {err}");
        Error::MalformedSecret {
            reason: err.to_string(),
        }
    })
}

pub async fn fetch_db_credentials(
    store: &dyn SecretStore,
    secret_id: &str,
) -> Result<DbCredentials, Error> {
    let secret = store.secret_string(secret_id).await?;
    parse_credentials(&secret)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = r#"{
        "DB_HOST": "webapp.cluster.internal",
        "DB_PORT": "5432",
        "DB_NAME": "webapp",
        "DB_USERNAME": "csye6225",
        "DB_PASSWORD": "s3cr3t"
    }"#;

    struct FixedSecret(Option<&'static str>);

    #[async_trait]
    impl SecretStore for FixedSecret {
        async fn secret_string(&self, secret_id: &str) -> Result<String, Error> {
            assert_eq!(secret_id, "webapp/db");
            self.0.map(str::to_owned).ok_or(Error::SecretUnavailable {
                reason: "ResourceNotFoundException".to_string(),
            })
        }
    }

    #[test]
    fn test_parse_credentials() {
        let credentials = parse_credentials(SECRET).unwrap();
        assert_eq!(credentials.host, "webapp.cluster.internal");
        assert_eq!(credentials.port, 5432);
        assert_eq!(credentials.name, "webapp");
        assert_eq!(credentials.username, "csye6225");
        assert_eq!(credentials.password, "s3cr3t");
    }

    #[test]
    fn test_numeric_port_and_extra_keys() {
        let credentials = parse_credentials(
            r#"{"DB_HOST":"h","DB_PORT":5433,"DB_NAME":"n","DB_USERNAME":"u","DB_PASSWORD":"p","engine":"postgres"}"#,
        )
        .unwrap();
        assert_eq!(credentials.port, 5433);
    }

    #[test]
    fn test_malformed_secret() {
        for secret in [
            "not json",
            r#"{"DB_HOST":"h","DB_PORT":"5432","DB_NAME":"n","DB_USERNAME":"u"}"#,
            r#"{"DB_HOST":"h","DB_PORT":"port","DB_NAME":"n","DB_USERNAME":"u","DB_PASSWORD":"p"}"#,
        ] {
            assert!(
                matches!(parse_credentials(secret), Err(Error::MalformedSecret { .. })),
                "{secret}"
            );
        }
    }

    #[test]
    fn test_connection_params() {
        let credentials = parse_credentials(SECRET).unwrap();
        let params = credentials.connection_params();
        assert_eq!(params.target(), "postgresql://webapp.cluster.internal:5432/webapp");
        assert_eq!(params.user, "csye6225");
    }

    #[test]
    fn test_debug_redacts_password() {
        let credentials = parse_credentials(SECRET).unwrap();
        assert!(!format!("{credentials:?}").contains("s3cr3t"));
    }

    #[tokio::test]
    async fn test_fetch_db_credentials() {
        let credentials = fetch_db_credentials(&FixedSecret(Some(SECRET)), "webapp/db")
            .await
            .unwrap();
        assert_eq!(credentials.name, "webapp");
    }

    #[tokio::test]
    async fn test_secret_unavailable() {
        let result = fetch_db_credentials(&FixedSecret(None), "webapp/db").await;
        assert!(matches!(result, Err(Error::SecretUnavailable { .. })));
    }
}
