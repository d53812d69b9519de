//! SQLite-backed account store implementation.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};

use super::{
    AccountError, AccountKind, AccountStore, AccountUpdate, ExternalAccount, NewAccount,
};

/// SQLite-backed account store.
pub struct SqliteAccountStore {
    conn: Mutex<Connection>,
}

impl SqliteAccountStore {
    /// Create a new SQLite account store, creating the database file and
    /// tables if needed.
    pub fn new(path: &Path) -> Result<Self, AccountError> {
        let conn = Connection::open(path).map_err(|e| AccountError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite account store (useful for testing).
    pub fn in_memory() -> Result<Self, AccountError> {
        let conn =
            Connection::open_in_memory().map_err(|e| AccountError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), AccountError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS accounts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                tenant_id INTEGER NOT NULL,
                kind TEXT NOT NULL,
                name TEXT NOT NULL,
                client_id TEXT NOT NULL,
                client_secret TEXT NOT NULL,
                warehouse TEXT,
                is_default INTEGER NOT NULL DEFAULT 0
            );

            CREATE INDEX IF NOT EXISTS idx_accounts_tenant_kind
                ON accounts(tenant_id, kind);
            "#,
        )
        .map_err(|e| AccountError::Database(e.to_string()))?;

        Ok(())
    }

    fn row_to_account(row: &rusqlite::Row) -> rusqlite::Result<ExternalAccount> {
        let kind_str: String = row.get(2)?;
        let kind = AccountKind::parse(&kind_str).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                2,
                rusqlite::types::Type::Text,
                format!("unknown account kind: {}", kind_str).into(),
            )
        })?;

        Ok(ExternalAccount {
            id: row.get(0)?,
            tenant_id: row.get(1)?,
            kind,
            name: row.get(3)?,
            client_id: row.get(4)?,
            client_secret: row.get(5)?,
            warehouse: row.get(6)?,
            is_default: row.get::<_, i64>(7)? != 0,
        })
    }

    fn get_in_conn(
        conn: &Connection,
        tenant_id: i64,
        id: i64,
    ) -> Result<Option<ExternalAccount>, AccountError> {
        conn.query_row(
            "SELECT id, tenant_id, kind, name, client_id, client_secret, warehouse, is_default
             FROM accounts WHERE id = ?1 AND tenant_id = ?2",
            params![id, tenant_id],
            Self::row_to_account,
        )
        .optional()
        .map_err(|e| AccountError::Database(e.to_string()))
    }
}

impl AccountStore for SqliteAccountStore {
    fn create(&self, account: NewAccount) -> Result<ExternalAccount, AccountError> {
        let mut conn = self.conn.lock().expect("account store lock poisoned");
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|e| AccountError::Database(e.to_string()))?;

        // First account of its kind becomes the default.
        let existing: i64 = tx
            .query_row(
                "SELECT COUNT(*) FROM accounts WHERE tenant_id = ?1 AND kind = ?2",
                params![account.tenant_id, account.kind.as_str()],
                |row| row.get(0),
            )
            .map_err(|e| AccountError::Database(e.to_string()))?;
        let is_default = existing == 0;

        tx.execute(
            "INSERT INTO accounts (tenant_id, kind, name, client_id, client_secret, warehouse, is_default)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                account.tenant_id,
                account.kind.as_str(),
                account.name,
                account.client_id,
                account.client_secret,
                account.warehouse,
                is_default as i64,
            ],
        )
        .map_err(|e| AccountError::Database(e.to_string()))?;

        let id = tx.last_insert_rowid();
        let created = Self::get_in_conn(&tx, account.tenant_id, id)?
            .ok_or(AccountError::NotFound(id))?;

        tx.commit().map_err(|e| AccountError::Database(e.to_string()))?;
        Ok(created)
    }

    fn get(&self, tenant_id: i64, id: i64) -> Result<Option<ExternalAccount>, AccountError> {
        let conn = self.conn.lock().expect("account store lock poisoned");
        Self::get_in_conn(&conn, tenant_id, id)
    }

    fn list(
        &self,
        tenant_id: i64,
        kind: Option<AccountKind>,
    ) -> Result<Vec<ExternalAccount>, AccountError> {
        let conn = self.conn.lock().expect("account store lock poisoned");

        let (sql, params_vec): (&str, Vec<Box<dyn rusqlite::ToSql>>) = match kind {
            Some(k) => (
                "SELECT id, tenant_id, kind, name, client_id, client_secret, warehouse, is_default
                 FROM accounts WHERE tenant_id = ?1 AND kind = ?2 ORDER BY name",
                vec![Box::new(tenant_id), Box::new(k.as_str().to_string())],
            ),
            None => (
                "SELECT id, tenant_id, kind, name, client_id, client_secret, warehouse, is_default
                 FROM accounts WHERE tenant_id = ?1 ORDER BY kind, name",
                vec![Box::new(tenant_id)],
            ),
        };

        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| AccountError::Database(e.to_string()))?;
        let param_refs: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|p| p.as_ref()).collect();
        let rows = stmt
            .query_map(param_refs.as_slice(), Self::row_to_account)
            .map_err(|e| AccountError::Database(e.to_string()))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| AccountError::Database(e.to_string()))
    }

    fn update(
        &self,
        tenant_id: i64,
        id: i64,
        update: AccountUpdate,
    ) -> Result<ExternalAccount, AccountError> {
        let conn = self.conn.lock().expect("account store lock poisoned");

        let changed = conn
            .execute(
                "UPDATE accounts SET name = ?1, client_id = ?2, client_secret = ?3, warehouse = ?4
                 WHERE id = ?5 AND tenant_id = ?6",
                params![
                    update.name,
                    update.client_id,
                    update.client_secret,
                    update.warehouse,
                    id,
                    tenant_id,
                ],
            )
            .map_err(|e| AccountError::Database(e.to_string()))?;

        if changed == 0 {
            return Err(AccountError::NotFound(id));
        }

        Self::get_in_conn(&conn, tenant_id, id)?.ok_or(AccountError::NotFound(id))
    }

    fn delete(&self, tenant_id: i64, id: i64) -> Result<ExternalAccount, AccountError> {
        let mut conn = self.conn.lock().expect("account store lock poisoned");
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|e| AccountError::Database(e.to_string()))?;

        let account =
            Self::get_in_conn(&tx, tenant_id, id)?.ok_or(AccountError::NotFound(id))?;

        tx.execute(
            "DELETE FROM accounts WHERE id = ?1 AND tenant_id = ?2",
            params![id, tenant_id],
        )
        .map_err(|e| AccountError::Database(e.to_string()))?;

        // Deleting the default promotes an arbitrary remaining account of the
        // same kind so the tenant always has an active one.
        if account.is_default {
            tx.execute(
                "UPDATE accounts SET is_default = 1 WHERE id = (
                     SELECT id FROM accounts WHERE tenant_id = ?1 AND kind = ?2 LIMIT 1
                 )",
                params![tenant_id, account.kind.as_str()],
            )
            .map_err(|e| AccountError::Database(e.to_string()))?;
        }

        tx.commit().map_err(|e| AccountError::Database(e.to_string()))?;
        Ok(account)
    }

    fn set_default(&self, tenant_id: i64, id: i64) -> Result<ExternalAccount, AccountError> {
        let mut conn = self.conn.lock().expect("account store lock poisoned");
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|e| AccountError::Database(e.to_string()))?;

        let account =
            Self::get_in_conn(&tx, tenant_id, id)?.ok_or(AccountError::NotFound(id))?;

        // Clear-then-set inside one transaction so no moment exists with two
        // defaults or none.
        tx.execute(
            "UPDATE accounts SET is_default = 0 WHERE tenant_id = ?1 AND kind = ?2",
            params![tenant_id, account.kind.as_str()],
        )
        .map_err(|e| AccountError::Database(e.to_string()))?;

        tx.execute(
            "UPDATE accounts SET is_default = 1 WHERE id = ?1",
            params![id],
        )
        .map_err(|e| AccountError::Database(e.to_string()))?;

        let updated =
            Self::get_in_conn(&tx, tenant_id, id)?.ok_or(AccountError::NotFound(id))?;

        tx.commit().map_err(|e| AccountError::Database(e.to_string()))?;
        Ok(updated)
    }

    fn active_account(
        &self,
        tenant_id: i64,
        kind: AccountKind,
    ) -> Result<Option<ExternalAccount>, AccountError> {
        let conn = self.conn.lock().expect("account store lock poisoned");

        conn.query_row(
            "SELECT id, tenant_id, kind, name, client_id, client_secret, warehouse, is_default
             FROM accounts WHERE tenant_id = ?1 AND kind = ?2
             ORDER BY is_default DESC, id ASC LIMIT 1",
            params![tenant_id, kind.as_str()],
            Self::row_to_account,
        )
        .optional()
        .map_err(|e| AccountError::Database(e.to_string()))
    }
}
