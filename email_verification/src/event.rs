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

use aws_lambda_events::event::sns::SnsEvent;
use serde_json::{Map, Value};

use crate::error::Error;

pub type Payload = Map<String, Value>;

/// Message strings of all records, in delivery order.
pub fn messages(event: &SnsEvent) -> Vec<&str> {
    event
        .records
        .iter()
        .map(|record| record.sns.message.as_str())
        .collect()
}

/// Parse a message as a JSON object. Keys other than `email` are kept but never
/// interpreted.
pub fn parse_payload(message: &str) -> Result<Payload, Error> {
    serde_json::from_str(message).map_err(|err| Error::MalformedPayload {
        reason: err.to_string(),
    })
}

pub fn extract_email(payload: &Payload) -> Result<String, Error> {
    match payload.get("email") {
        None | Some(Value::Null) => Err(Error::MissingEmail),
        Some(Value::String(email)) if email.is_empty() => Err(Error::MissingEmail),
        Some(Value::String(email)) => Ok(email.clone()),
        Some(other) => Err(Error::MalformedPayload {
            reason: format!("'email' must be a string, got {other}"),
        }),
    }
}
