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

use aws_config::BehaviorVersion;
use aws_lambda_events::event::sns::SnsEvent;
use email_verification::{
    logging,
    mailer::MailgunMailer,
    secrets::AwsSecretStore,
    store::PgSentEmailStore,
    Config, Handler,
};
use lambda_runtime::{service_fn, LambdaEvent};

#[tokio::main]
async fn main() -> Result<(), lambda_runtime::Error> {
    let level = logging::level_filter(std::env::var("RUST_LOG_LEVEL").ok().as_deref());
    logging::init(level)?;

    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    log::debug!("Loaded configuration: {config:?}");

    let aws_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let secrets = AwsSecretStore::new(aws_sdk_secretsmanager::Client::new(&aws_config));
    let mailer = MailgunMailer::new(reqwest::Client::new(), &config);

    let handler = Arc::new(Handler::new(
        config,
        Arc::new(secrets),
        Arc::new(PgSentEmailStore),
        Arc::new(mailer),
    ));

    lambda_runtime::run(service_fn(move |event: LambdaEvent<SnsEvent>| {
        let handler = handler.clone();
        async move { Ok::<String, lambda_runtime::Error>(handler.handle(event).await) }
    }))
    .await
}
