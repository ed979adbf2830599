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

use derive_more::{Display, Error};

#[derive(Debug, Display, Error)]
pub enum Error {
    #[display("Error parsing SNS message: {reason}")]
    MalformedPayload { reason: String },
    #[display("Email is missing in SNS message.")]
    MissingEmail,
    #[display("Error retrieving secrets: {reason}")]
    SecretUnavailable { reason: String },
    #[display("Error parsing secrets JSON: {reason}")]
    MalformedSecret { reason: String },
    #[display("Error storing token: {reason}")]
    PersistenceError { reason: String },
    #[display("Error sending email: {reason}")]
    DeliveryFailed { reason: String },
    #[display("Invalid configuration: {reason}")]
    Config { reason: String },
}
