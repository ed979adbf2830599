use diesel::{pg::Pg, prelude::*, PgConnection};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use models::sent_emails::{NewSentEmail, SentEmail};

pub mod models;
pub mod schema;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

pub fn run_migrations(
    connection: &mut impl MigrationHarness<Pg>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    connection.run_pending_migrations(MIGRATIONS)?;

    Ok(())
}

/// Discrete connection settings as they come out of a credentials secret.
#[derive(Clone, Copy)]
pub struct ConnectionParams<'a> {
    pub host: &'a str,
    pub port: u16,
    pub dbname: &'a str,
    pub user: &'a str,
    pub password: &'a str,
}

impl ConnectionParams<'_> {
    /// libpq keyword/value form. Every value is quoted so passwords never need
    /// percent-encoding.
    pub fn connection_string(&self) -> String {
        format!(
            "host={} port={} dbname={} user={} password={}",
            quote(self.host),
            self.port,
            quote(self.dbname),
            quote(self.user),
            quote(self.password),
        )
    }

    /// Loggable description without credentials.
    pub fn target(&self) -> String {
        format!("postgresql://{}:{}/{}", self.host, self.port, self.dbname)
    }
}

fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('\'');
    for c in value.chars() {
        if c == '\'' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('\'');
    quoted
}

/**
 * Open a single connection. Dropping it closes the connection.
 */
pub fn establish(params: &ConnectionParams) -> ConnectionResult<PgConnection> {
    log::debug!("Opening database connection to {}", params.target());
    PgConnection::establish(&params.connection_string())
}

pub fn insert_sent_email(conn: &mut PgConnection, row: &NewSentEmail) -> QueryResult<usize> {
    use schema::sent_emails::dsl::*;

    diesel::insert_into(sent_emails).values(row).execute(conn)
}

pub fn sent_emails_for(conn: &mut PgConnection, mail: &str) -> QueryResult<Vec<SentEmail>> {
    use schema::sent_emails::dsl::*;

    sent_emails
        .filter(email.eq(mail))
        .order(id.asc())
        .select(SentEmail::as_select())
        .load(conn)
}

pub fn test_connection() -> PgConnection {
    dotenvy::dotenv().ok();
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let mut conn = PgConnection::establish(&url).expect("Could not connect to database");
    run_migrations(&mut conn).expect("Failed to run migrations");
    conn
}
