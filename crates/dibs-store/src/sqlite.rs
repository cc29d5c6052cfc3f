//! SQLite-backed claim store

use crate::StoreError;
use dibs_domain::traits::{ClaimPatch, ClaimQuery, ClaimStore};
use dibs_domain::{Claim, ClaimId, ClaimStatus, Issue, PrincipalId, Repository};
use rusqlite::{params, Connection, OptionalExtension, Row, ToSql};
use std::path::Path;

const COLUMNS: &str = "id, repo_owner, repo_name, repo_url, issue_number, issue_title, \
     issue_url, claimant, status, last_activity_date, nudge_count, last_nudge_date, \
     release_date, notes, created_at";

/// SQLite-based implementation of `ClaimStore`
///
/// Conditional updates run inside a transaction, so a patch lands atomically
/// or not at all.
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Callers sharing a store across
/// threads wrap it in their own lock.
pub struct SqliteStore {
    conn: Connection,
}

/// Raw column values of one claims row, before domain decoding
struct ClaimRow {
    id: Vec<u8>,
    repo_owner: String,
    repo_name: String,
    repo_url: Option<String>,
    issue_number: i64,
    issue_title: Option<String>,
    issue_url: String,
    claimant: Vec<u8>,
    status: String,
    last_activity_date: i64,
    nudge_count: i64,
    last_nudge_date: Option<i64>,
    release_date: Option<i64>,
    notes: Option<String>,
    created_at: i64,
}

impl SqliteStore {
    /// Create a new SqliteStore with the given database path
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use dibs_store::SqliteStore;
    ///
    /// let store = SqliteStore::new("dibs.db").unwrap();
    /// ```
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(include_str!("schema.sql"))?;
        Ok(Self { conn })
    }

    fn id_bytes(value: u128) -> Vec<u8> {
        value.to_be_bytes().to_vec()
    }

    fn bytes_to_u128(bytes: Vec<u8>) -> Result<u128, StoreError> {
        let arr: [u8; 16] = bytes.try_into().map_err(|b: Vec<u8>| {
            StoreError::InvalidData(format!("Expected 16-byte id, got {} bytes", b.len()))
        })?;
        Ok(u128::from_be_bytes(arr))
    }

    fn read_row(row: &Row<'_>) -> rusqlite::Result<ClaimRow> {
        Ok(ClaimRow {
            id: row.get(0)?,
            repo_owner: row.get(1)?,
            repo_name: row.get(2)?,
            repo_url: row.get(3)?,
            issue_number: row.get(4)?,
            issue_title: row.get(5)?,
            issue_url: row.get(6)?,
            claimant: row.get(7)?,
            status: row.get(8)?,
            last_activity_date: row.get(9)?,
            nudge_count: row.get(10)?,
            last_nudge_date: row.get(11)?,
            release_date: row.get(12)?,
            notes: row.get(13)?,
            created_at: row.get(14)?,
        })
    }

    fn decode(row: ClaimRow) -> Result<Claim, StoreError> {
        let status = ClaimStatus::parse(&row.status)
            .ok_or_else(|| StoreError::InvalidData(format!("Unknown claim status: {}", row.status)))?;

        Ok(Claim {
            id: ClaimId::from_value(Self::bytes_to_u128(row.id)?),
            repository: Repository {
                owner: row.repo_owner,
                name: row.repo_name,
                url: row.repo_url,
            },
            issue: Issue {
                number: row.issue_number as u64,
                title: row.issue_title,
                url: row.issue_url,
            },
            claimant: PrincipalId::from_value(Self::bytes_to_u128(row.claimant)?),
            status,
            last_activity_date: row.last_activity_date as u64,
            nudge_count: row.nudge_count as u32,
            last_nudge_date: row.last_nudge_date.map(|v| v as u64),
            release_date: row.release_date.map(|v| v as u64),
            notes: row.notes,
            created_at: row.created_at as u64,
        })
    }
}

impl ClaimStore for SqliteStore {
    type Error = StoreError;

    fn insert_claim(&mut self, claim: Claim) -> Result<ClaimId, Self::Error> {
        let id_bytes = Self::id_bytes(claim.id.value());

        let exists: bool = self
            .conn
            .query_row("SELECT 1 FROM claims WHERE id = ?1", params![&id_bytes], |_| Ok(true))
            .optional()?
            .unwrap_or(false);

        if exists {
            return Err(StoreError::Duplicate);
        }

        self.conn.execute(
            "INSERT INTO claims (id, repo_owner, repo_name, repo_url, issue_number, \
             issue_title, issue_url, claimant, status, last_activity_date, nudge_count, \
             last_nudge_date, release_date, notes, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
            params![
                id_bytes,
                claim.repository.owner,
                claim.repository.name,
                claim.repository.url,
                claim.issue.number as i64,
                claim.issue.title,
                claim.issue.url,
                Self::id_bytes(claim.claimant.value()),
                claim.status.as_str(),
                claim.last_activity_date as i64,
                i64::from(claim.nudge_count),
                claim.last_nudge_date.map(|v| v as i64),
                claim.release_date.map(|v| v as i64),
                claim.notes,
                claim.created_at as i64,
            ],
        )?;

        Ok(claim.id)
    }

    fn get_claim(&self, id: ClaimId) -> Result<Option<Claim>, Self::Error> {
        let sql = format!("SELECT {} FROM claims WHERE id = ?1", COLUMNS);
        let row = self
            .conn
            .query_row(&sql, params![Self::id_bytes(id.value())], Self::read_row)
            .optional()?;

        row.map(Self::decode).transpose()
    }

    fn query_claims(&self, query: &ClaimQuery) -> Result<Vec<Claim>, Self::Error> {
        let mut sql = format!("SELECT {} FROM claims", COLUMNS);
        let mut clauses: Vec<&str> = Vec::new();
        let mut args: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(status) = query.status {
            clauses.push("status = ?");
            args.push(Box::new(status.as_str()));
        }
        if let Some(owner) = &query.repo_owner {
            clauses.push("repo_owner = ?");
            args.push(Box::new(owner.clone()));
        }
        if let Some(name) = &query.repo_name {
            clauses.push("repo_name = ?");
            args.push(Box::new(name.clone()));
        }
        if let Some(number) = query.issue_number {
            clauses.push("issue_number = ?");
            args.push(Box::new(number as i64));
        }
        if let Some(claimant) = query.claimant {
            clauses.push("claimant = ?");
            args.push(Box::new(Self::id_bytes(claimant.value())));
        }

        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY created_at");
        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ");
            sql.push_str(&limit.to_string());
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(
            rusqlite::params_from_iter(args.iter().map(|a| a.as_ref())),
            Self::read_row,
        )?;

        let mut claims = Vec::new();
        for row in rows {
            claims.push(Self::decode(row?)?);
        }
        Ok(claims)
    }

    fn update_claim(
        &mut self,
        id: ClaimId,
        expected_status: ClaimStatus,
        patch: &ClaimPatch,
    ) -> Result<Option<Claim>, Self::Error> {
        let tx = self.conn.transaction()?;
        let id_bytes = Self::id_bytes(id.value());

        let sql = format!("SELECT {} FROM claims WHERE id = ?1", COLUMNS);
        let row = tx
            .query_row(&sql, params![&id_bytes], Self::read_row)
            .optional()?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut claim = Self::decode(row)?;
        if claim.status != expected_status {
            return Ok(None);
        }

        patch.apply(&mut claim);

        tx.execute(
            "UPDATE claims SET status = ?1, last_activity_date = ?2, nudge_count = ?3, \
             last_nudge_date = ?4, release_date = ?5, notes = ?6 WHERE id = ?7",
            params![
                claim.status.as_str(),
                claim.last_activity_date as i64,
                i64::from(claim.nudge_count),
                claim.last_nudge_date.map(|v| v as i64),
                claim.release_date.map(|v| v as i64),
                claim.notes,
                id_bytes,
            ],
        )?;
        tx.commit()?;

        Ok(Some(claim))
    }
}
