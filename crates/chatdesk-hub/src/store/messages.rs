use rusqlite::Connection;
use uuid::Uuid;

use super::now_millis;
use super::sessions::touch_session;
use super::types::{MessageWindow, StoredMessage};

fn row_to_message(row: &rusqlite::Row) -> rusqlite::Result<StoredMessage> {
    Ok(StoredMessage {
        row_id: row.get("row_id")?,
        id: row.get("id")?,
        session_id: row.get("session_id")?,
        role: row.get("role")?,
        content: row.get("content")?,
        created_at: row.get("created_at")?,
    })
}

pub fn add_message(
    conn: &Connection,
    session_id: &str,
    role: &str,
    content: &str,
) -> anyhow::Result<StoredMessage> {
    let now = now_millis();
    let id = Uuid::new_v4().to_string();

    conn.execute(
        "INSERT INTO messages (id, session_id, role, content, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![id, session_id, role, content, now],
    )?;
    let row_id = conn.last_insert_rowid();
    touch_session(conn, session_id, now)?;

    Ok(StoredMessage {
        row_id,
        id,
        session_id: session_id.to_string(),
        role: role.to_string(),
        content: content.to_string(),
        created_at: now,
    })
}

/// Reads the `limit` newest messages strictly older than `before_row_id`
/// (or the newest overall), returned oldest first.
///
/// One extra row is fetched to learn whether anything older remains, so the
/// cost stays O(limit) regardless of session size. A `limit` below 1 yields
/// an empty window.
pub fn get_messages_page(
    conn: &Connection,
    session_id: &str,
    limit: i64,
    before_row_id: Option<i64>,
) -> anyhow::Result<MessageWindow> {
    let limit = limit.max(0);
    let probe = limit.saturating_add(1);

    let mut msgs = match before_row_id {
        Some(cursor) => {
            let mut stmt = conn.prepare(
                "SELECT * FROM messages WHERE session_id = ?1 AND row_id < ?2
                 ORDER BY row_id DESC LIMIT ?3",
            )?;
            let rows = stmt
                .query_map(rusqlite::params![session_id, cursor, probe], row_to_message)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            rows
        }
        None => {
            let mut stmt = conn.prepare(
                "SELECT * FROM messages WHERE session_id = ?1
                 ORDER BY row_id DESC LIMIT ?2",
            )?;
            let rows = stmt
                .query_map(rusqlite::params![session_id, probe], row_to_message)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            rows
        }
    };

    let has_more = msgs.len() as i64 > limit;
    msgs.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
    msgs.reverse(); // chronological order

    Ok(MessageWindow {
        messages: msgs,
        has_more,
    })
}

pub fn count_messages(conn: &Connection, session_id: &str) -> anyhow::Result<i64> {
    let count = conn
        .prepare("SELECT COUNT(*) FROM messages WHERE session_id = ?1")?
        .query_row(rusqlite::params![session_id], |row| row.get(0))?;
    Ok(count)
}
