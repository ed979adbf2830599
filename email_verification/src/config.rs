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

use chrono::TimeDelta;

use crate::{error::Error, mailer::MAILGUN_API_BASE};

/// Process-wide settings, read once at start and shared read-only afterwards.
#[derive(Clone)]
pub struct Config {
    pub mailgun_api_key: String,
    pub mailgun_domain: String,
    pub mailgun_api_base: String,
    pub db_secret_name: String,
    pub verification_expiry: TimeDelta,
    pub domain_name: String,
}

impl Config {
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| -> Result<String, Error> {
            match lookup(name) {
                Some(value) if !value.trim().is_empty() => Ok(value),
                _ => Err(Error::Config {
                    reason: format!("{name} must be set"),
                }),
            }
        };

        let expiry = required("VERIFICATION_EXPIRY")?;
        let verification_expiry = parse_expiry(&expiry)?;

        let mailgun_api_base = match lookup("MAILGUN_API_BASE") {
            Some(base) if !base.trim().is_empty() => base.trim_end_matches('/').to_string(),
            _ => MAILGUN_API_BASE.to_string(),
        };

        Ok(Self {
            mailgun_api_key: required("MAILGUN_API_KEY")?,
            mailgun_domain: required("MAILGUN_DOMAIN")?,
            mailgun_api_base,
            db_secret_name: required("DB_SECRET_NAME")?,
            verification_expiry,
            domain_name: required("DOMAIN_NAME")?,
        })
    }
}

fn parse_expiry(value: &str) -> Result<TimeDelta, Error> {
    let seconds: i64 = value.trim().parse().map_err(|err| Error::Config {
        reason: format!("VERIFICATION_EXPIRY must be a number of seconds: {err}"),
    })?;
    if seconds < 0 {
        return Err(Error::Config {
            reason: "VERIFICATION_EXPIRY must not be negative".to_string(),
        });
    }

    TimeDelta::try_seconds(seconds).ok_or(Error::Config {
        reason: format!("VERIFICATION_EXPIRY is out of range: {seconds}"),
    })
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("mailgun_api_key", &"<redacted>")
            .field("mailgun_domain", &self.mailgun_domain)
            .field("mailgun_api_base", &self.mailgun_api_base)
            .field("db_secret_name", &self.db_secret_name)
            .field("verification_expiry", &self.verification_expiry)
            .field("domain_name", &self.domain_name)
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::HashMap;

    use super::*;

    pub fn test_vars() -> HashMap<&'static str, String> {
        HashMap::from([
            ("MAILGUN_API_KEY", "key-test".to_string()),
            ("MAILGUN_DOMAIN", "mg.example.com".to_string()),
            ("DB_SECRET_NAME", "webapp/db".to_string()),
            ("VERIFICATION_EXPIRY", "120".to_string()),
            ("DOMAIN_NAME", "dev.example.com".to_string()),
        ])
    }

    fn from_vars(vars: &HashMap<&'static str, String>) -> Result<Config, Error> {
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    pub fn test_config() -> Config {
        from_vars(&test_vars()).unwrap()
    }

    #[test]
    fn test_complete_config() {
        let config = test_config();
        assert_eq!(config.mailgun_api_key, "key-test");
        assert_eq!(config.mailgun_domain, "mg.example.com");
        assert_eq!(config.mailgun_api_base, "https://api.mailgun.net");
        assert_eq!(config.db_secret_name, "webapp/db");
        assert_eq!(config.verification_expiry, TimeDelta::seconds(120));
        assert_eq!(config.domain_name, "dev.example.com");
    }

    #[test]
    fn test_missing_variable() {
        for name in ["MAILGUN_API_KEY", "MAILGUN_DOMAIN", "DB_SECRET_NAME", "VERIFICATION_EXPIRY", "DOMAIN_NAME"] {
            let mut vars = test_vars();
            vars.remove(name);
            match from_vars(&vars) {
                Err(Error::Config { reason }) => assert!(reason.contains(name)),
                other => panic!("expected config error for {name}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_empty_variable() {
        let mut vars = test_vars();
        vars.insert("DOMAIN_NAME", "  ".to_string());
        assert!(matches!(from_vars(&vars), Err(Error::Config { .. })));
    }

    #[test]
    fn test_invalid_expiry() {
        for value in ["soon", "-1", "1.5"] {
            let mut vars = test_vars();
            vars.insert("VERIFICATION_EXPIRY", value.to_string());
            assert!(matches!(from_vars(&vars), Err(Error::Config { .. })), "{value}");
        }
    }

    #[test]
    fn test_custom_api_base() {
        let mut vars = test_vars();
        vars.insert("MAILGUN_API_BASE", "https://api.eu.mailgun.net/".to_string());
        let config = from_vars(&vars).unwrap();
        assert_eq!(config.mailgun_api_base, "https://api.eu.mailgun.net");
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let debug = format!("{:?}", test_config());
        assert!(!debug.contains("key-test"));
        assert!(debug.contains("<redacted>"));
    }
}
