use chrono::NaiveDateTime;
use diesel::prelude::*;

/// Status every row starts with. Later transitions belong to the verify endpoint.
pub const STATUS_PENDING: &str = "PENDING";

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = crate::schema::sent_emails)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SentEmail {
    pub id: i64,
    pub email: String,
    pub token: String,
    pub sent_at: NaiveDateTime,
    pub status: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::sent_emails)]
pub struct NewSentEmail<'a> {
    pub email: &'a str,
    pub token: &'a str,
    pub sent_at: NaiveDateTime,
    pub status: &'a str,
}

impl<'a> NewSentEmail<'a> {
    pub fn pending(email: &'a str, token: &'a str, sent_at: NaiveDateTime) -> Self {
        Self {
            email,
            token,
            sent_at,
            status: STATUS_PENDING,
        }
    }
}
