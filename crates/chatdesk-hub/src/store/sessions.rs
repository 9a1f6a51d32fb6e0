use rusqlite::{Connection, OptionalExtension};

use chatdesk_shared::DEFAULT_SESSION_MODE;
use chatdesk_shared::schemas::SessionUpdate;

use super::now_millis;
use super::types::{NewSession, StoredSession};

fn row_to_session(row: &rusqlite::Row) -> rusqlite::Result<StoredSession> {
    Ok(StoredSession {
        id: row.get("id")?,
        title: row.get("title")?,
        model: row.get("model")?,
        mode: row.get("mode")?,
        working_directory: row.get("working_directory")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

pub fn get_session(conn: &Connection, id: &str) -> anyhow::Result<Option<StoredSession>> {
    let session = conn
        .prepare("SELECT * FROM sessions WHERE id = ?1")?
        .query_row(rusqlite::params![id], row_to_session)
        .optional()?;
    Ok(session)
}

pub fn session_exists(conn: &Connection, id: &str) -> anyhow::Result<bool> {
    let exists = conn
        .prepare("SELECT 1 FROM sessions WHERE id = ?1")?
        .exists(rusqlite::params![id])?;
    Ok(exists)
}

/// Most recently updated first.
pub fn get_sessions(conn: &Connection) -> anyhow::Result<Vec<StoredSession>> {
    let mut stmt = conn.prepare("SELECT * FROM sessions ORDER BY updated_at DESC, id ASC")?;
    let sessions = stmt
        .query_map([], row_to_session)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(sessions)
}

/// Returns the existing row, or inserts one. The flag is `true` when the
/// session was created by this call.
pub fn get_or_create_session(
    conn: &Connection,
    id: &str,
    init: &NewSession<'_>,
) -> anyhow::Result<(StoredSession, bool)> {
    if let Some(existing) = get_session(conn, id)? {
        return Ok((existing, false));
    }

    let now = now_millis();
    conn.execute(
        "INSERT INTO sessions (id, title, model, mode, working_directory, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        rusqlite::params![
            id,
            init.title.unwrap_or(""),
            init.model.unwrap_or(""),
            init.mode.filter(|m| !m.is_empty()).unwrap_or(DEFAULT_SESSION_MODE),
            init.working_directory.filter(|d| !d.is_empty()),
            now,
            now,
        ],
    )?;

    let created = get_session(conn, id)?
        .ok_or_else(|| anyhow::anyhow!("failed to read created session {id}"))?;
    Ok((created, true))
}

/// Applies the present fields of `update`. Returns `None` when the session
/// does not exist.
pub fn update_session(
    conn: &Connection,
    id: &str,
    update: &SessionUpdate,
) -> anyhow::Result<Option<StoredSession>> {
    let Some(mut session) = get_session(conn, id)? else {
        return Ok(None);
    };
    if update.is_empty() {
        return Ok(Some(session));
    }

    if let Some(title) = &update.title {
        session.title = title.clone();
    }
    if let Some(model) = &update.model {
        session.model = model.clone();
    }
    if let Some(mode) = &update.mode {
        session.mode = if mode.is_empty() {
            DEFAULT_SESSION_MODE.to_string()
        } else {
            mode.clone()
        };
    }
    if let Some(dir) = &update.working_directory {
        session.working_directory = dir.clone().filter(|d| !d.is_empty());
    }
    session.updated_at = now_millis().max(session.updated_at);

    conn.execute(
        "UPDATE sessions
         SET title = ?2, model = ?3, mode = ?4, working_directory = ?5, updated_at = ?6
         WHERE id = ?1",
        rusqlite::params![
            id,
            session.title,
            session.model,
            session.mode,
            session.working_directory,
            session.updated_at,
        ],
    )?;

    Ok(Some(session))
}

/// Bumps `updated_at` so recently active sessions sort first.
pub fn touch_session(conn: &Connection, id: &str, at: i64) -> anyhow::Result<()> {
    conn.execute(
        "UPDATE sessions SET updated_at = MAX(updated_at, ?2) WHERE id = ?1",
        rusqlite::params![id, at],
    )?;
    Ok(())
}
