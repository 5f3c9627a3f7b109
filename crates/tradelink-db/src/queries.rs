use crate::Database;
use crate::models::{CredentialRow, JobLeadRow, QuoteRequestRow, UserRow};
use anyhow::Result;
use rusqlite::{Connection, ErrorCode, Row};
use tradelink_types::models::{JobLead, QuoteRequest, User, VerificationData, VerificationStatus};

const USER_COLUMNS: &str = "id, name, email, type, avatar, location, trades, rating, reviews, \
     verified, credits, membership_type, membership_expiry, verification_status, \
     verification_data, account_status, parked_date, reactivated_date, working_area, created_at";

const LEAD_COLUMNS: &str = "id, title, description, category, location, budget, urgency, \
     posted_by, posted_date, contact_details, purchased_by, max_purchases, price, interests, is_active";

const QUOTE_COLUMNS: &str = "id, homeowner_id, homeowner_name, project_title, project_description, \
     category, location, budget, urgency, contact_details, responses, max_responses, created_at";

impl Database {
    // -- Accounts --

    /// Insert the profile row and its credentials in one transaction, so a
    /// failed sign-up never leaves a profile without a way to sign in.
    ///
    /// Returns `false` when the email is already registered.
    pub fn create_account(&self, user: &User, password_hash: &str) -> Result<bool> {
        let trades = serde_json::to_string(&user.trades)?;
        let verification_data = user
            .verification_data
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        let working_area = user.working_area.as_ref().map(serde_json::to_string).transpose()?;

        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let inserted = tx.execute(
                "INSERT INTO users (id, name, email, type, avatar, location, trades, rating, reviews,
                     verified, credits, membership_type, membership_expiry, verification_status,
                     verification_data, account_status, working_area)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
                rusqlite::params![
                    user.id.to_string(),
                    user.name,
                    user.email,
                    user.user_type.as_str(),
                    user.avatar,
                    user.location,
                    trades,
                    user.rating,
                    user.reviews,
                    user.verified,
                    user.credits,
                    user.membership_type.map(|m| m.as_str()),
                    user.membership_expiry.map(|t| t.to_rfc3339()),
                    user.verification_status.map(|s| s.as_str()),
                    verification_data,
                    user.account_status.unwrap_or_default().as_str(),
                    working_area,
                ],
            );
            match inserted {
                Ok(_) => {}
                Err(e) if is_email_conflict(&e) => return Ok(false),
                Err(e) => return Err(e.into()),
            }
            tx.execute(
                "INSERT INTO credentials (user_id, email, password) VALUES (?1, ?2, ?3)",
                (user.id.to_string(), &user.email, password_hash),
            )?;
            tx.commit()?;
            Ok(true)
        })
    }

    pub fn get_credentials_by_email(&self, email: &str) -> Result<Option<CredentialRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT user_id, email, password FROM credentials WHERE email = ?1",
                [email],
                |row| {
                    Ok(CredentialRow {
                        user_id: row.get(0)?,
                        email: row.get(1)?,
                        password: row.get(2)?,
                    })
                },
            )
            .optional()
        })
    }

    // -- Users --

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id = ?1", id))
    }

    /// All profiles, newest first.
    pub fn list_users(&self) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {} FROM users ORDER BY created_at DESC, rowid DESC", USER_COLUMNS);
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], user_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Overwrite the verification columns. Returns false when no such user exists.
    pub fn update_verification(
        &self,
        user_id: &str,
        status: VerificationStatus,
        verified: bool,
        data: &VerificationData,
    ) -> Result<bool> {
        let data = serde_json::to_string(data)?;
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE users
                 SET verification_status = ?1, verified = ?2, verification_data = ?3,
                     updated_at = datetime('now')
                 WHERE id = ?4",
                rusqlite::params![status.as_str(), verified, data, user_id],
            )?;
            Ok(changed > 0)
        })
    }

    pub fn find_user_by_verification_session(&self, session_id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            query_user(conn, "json_extract(verification_data, '$.session_id') = ?1", session_id)
        })
    }

    // -- Job leads --

    pub fn insert_job_lead(&self, lead: &JobLead) -> Result<()> {
        let contact = serde_json::to_string(&lead.contact_details)?;
        let purchased_by = serde_json::to_string(&lead.purchased_by)?;
        let interests = serde_json::to_string(&lead.interests)?;

        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO job_leads (id, title, description, category, location, budget, urgency,
                     posted_by, posted_date, contact_details, purchased_by, max_purchases, price,
                     interests, is_active)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
                rusqlite::params![
                    lead.id.to_string(),
                    lead.title,
                    lead.description,
                    lead.category,
                    lead.location,
                    lead.budget,
                    lead.urgency.as_str(),
                    lead.posted_by.to_string(),
                    lead.posted_date.to_rfc3339(),
                    contact,
                    purchased_by,
                    lead.max_purchases,
                    lead.price,
                    interests,
                    lead.is_active,
                ],
            )?;
            Ok(())
        })
    }

    /// All leads, most recently posted first.
    pub fn list_job_leads(&self) -> Result<Vec<JobLeadRow>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {} FROM job_leads ORDER BY posted_date DESC", LEAD_COLUMNS);
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(JobLeadRow {
                        id: row.get(0)?,
                        title: row.get(1)?,
                        description: row.get(2)?,
                        category: row.get(3)?,
                        location: row.get(4)?,
                        budget: row.get(5)?,
                        urgency: row.get(6)?,
                        posted_by: row.get(7)?,
                        posted_date: row.get(8)?,
                        contact_details: row.get(9)?,
                        purchased_by: row.get(10)?,
                        max_purchases: row.get(11)?,
                        price: row.get(12)?,
                        interests: row.get(13)?,
                        is_active: row.get(14)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Quote requests --

    pub fn insert_quote_request(&self, quote: &QuoteRequest) -> Result<()> {
        let contact = serde_json::to_string(&quote.contact_details)?;
        let responses = serde_json::to_string(&quote.responses)?;

        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO quote_requests (id, homeowner_id, homeowner_name, project_title,
                     project_description, category, location, budget, urgency, contact_details,
                     responses, max_responses, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                rusqlite::params![
                    quote.id.to_string(),
                    quote.homeowner_id.to_string(),
                    quote.homeowner_name,
                    quote.project_title,
                    quote.project_description,
                    quote.category,
                    quote.location,
                    quote.budget,
                    quote.urgency.as_str(),
                    contact,
                    responses,
                    quote.max_responses,
                    quote.created_at.to_rfc3339(),
                ],
            )?;
            Ok(())
        })
    }

    pub fn list_quote_requests(&self) -> Result<Vec<QuoteRequestRow>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {} FROM quote_requests ORDER BY created_at DESC", QUOTE_COLUMNS);
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(QuoteRequestRow {
                        id: row.get(0)?,
                        homeowner_id: row.get(1)?,
                        homeowner_name: row.get(2)?,
                        project_title: row.get(3)?,
                        project_description: row.get(4)?,
                        category: row.get(5)?,
                        location: row.get(6)?,
                        budget: row.get(7)?,
                        urgency: row.get(8)?,
                        contact_details: row.get(9)?,
                        responses: row.get(10)?,
                        max_responses: row.get(11)?,
                        created_at: row.get(12)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

fn query_user(conn: &Connection, predicate: &str, value: &str) -> Result<Option<UserRow>> {
    let sql = format!("SELECT {} FROM users WHERE {}", USER_COLUMNS, predicate);
    let mut stmt = conn.prepare(&sql)?;
    stmt.query_row([value], user_from_row).optional()
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        user_type: row.get(3)?,
        avatar: row.get(4)?,
        location: row.get(5)?,
        trades: row.get(6)?,
        rating: row.get(7)?,
        reviews: row.get(8)?,
        verified: row.get(9)?,
        credits: row.get(10)?,
        membership_type: row.get(11)?,
        membership_expiry: row.get(12)?,
        verification_status: row.get(13)?,
        verification_data: row.get(14)?,
        account_status: row.get(15)?,
        parked_date: row.get(16)?,
        reactivated_date: row.get(17)?,
        working_area: row.get(18)?,
        created_at: row.get(19)?,
    })
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// A UNIQUE violation on an `email` column.
fn is_email_conflict(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(e, Some(msg)) => {
            e.code == ErrorCode::ConstraintViolation && msg.contains(".email")
        }
        _ => false,
    }
}
