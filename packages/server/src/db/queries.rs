//! Data access for documents, sections and subsections
//!
//! Children are always read back ordered by `ord`, then by insertion.

use crate::error::{DbError, DbResult};
use quire_common::{
    DocumentPatch, DocumentRecord, DocumentSummary, NewDocument, NewSection, NewSubsection,
    SectionImport, SectionPatch, SectionRecord, SubsectionPatch, SubsectionRecord, Validate,
};
use rusqlite::{params, Connection, OptionalExtension, Row};

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

fn summary_from_row(row: &Row<'_>) -> rusqlite::Result<DocumentSummary> {
    Ok(DocumentSummary {
        id: row.get(0)?,
        title: row.get(1)?,
        created_at: row.get(2)?,
        updated_at: row.get(3)?,
    })
}

fn section_from_row(row: &Row<'_>) -> rusqlite::Result<SectionRecord> {
    Ok(SectionRecord {
        id: row.get(0)?,
        document_id: row.get(1)?,
        title: row.get(2)?,
        order: row.get(3)?,
        subsections: Vec::new(),
    })
}

fn subsection_from_row(row: &Row<'_>) -> rusqlite::Result<SubsectionRecord> {
    Ok(SubsectionRecord {
        id: row.get(0)?,
        section_id: row.get(1)?,
        title: row.get(2)?,
        content: row.get(3)?,
        order: row.get(4)?,
    })
}

// ============================================================================
// Documents
// ============================================================================

pub fn list_documents(conn: &Connection) -> DbResult<Vec<DocumentSummary>> {
    let mut stmt = conn.prepare(
        "SELECT id, title, created_at, updated_at FROM documents ORDER BY created_at, rowid",
    )?;
    let rows = stmt.query_map([], summary_from_row)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

fn find_summary(conn: &Connection, id: &str) -> DbResult<DocumentSummary> {
    conn.query_row(
        "SELECT id, title, created_at, updated_at FROM documents WHERE id = ?1",
        params![id],
        summary_from_row,
    )
    .optional()?
    .ok_or_else(|| DbError::not_found("document", id))
}

pub fn insert_document(conn: &Connection, input: &NewDocument) -> DbResult<DocumentSummary> {
    input.validate()?;

    let id = new_id();
    let stamp = now();
    conn.execute(
        "INSERT INTO documents (id, title, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)",
        params![id, input.title, stamp],
    )?;
    tracing::debug!(%id, "document inserted");
    find_summary(conn, &id)
}

/// Document with its full tree
pub fn load_document(conn: &Connection, id: &str) -> DbResult<DocumentRecord> {
    let summary = find_summary(conn, id)?;

    let mut stmt = conn.prepare(
        "SELECT id, document_id, title, ord FROM sections
         WHERE document_id = ?1 ORDER BY ord, rowid",
    )?;
    let mut sections = stmt
        .query_map(params![id], section_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    for section in &mut sections {
        section.subsections = subsections_of(conn, &section.id)?;
    }

    Ok(DocumentRecord {
        id: summary.id,
        title: summary.title,
        created_at: summary.created_at,
        updated_at: summary.updated_at,
        sections,
    })
}

/// Apply a partial update; imported sections are appended in one transaction
pub fn update_document(
    conn: &mut Connection,
    id: &str,
    patch: &DocumentPatch,
) -> DbResult<DocumentRecord> {
    patch.validate()?;

    let tx = conn.transaction()?;
    find_summary(&tx, id)?;

    if let Some(title) = &patch.title {
        tx.execute(
            "UPDATE documents SET title = ?1 WHERE id = ?2",
            params![title, id],
        )?;
    }

    let start = count_sections(&tx, id)?;
    for (offset, import) in patch.sections.iter().enumerate() {
        import_section(&tx, id, start + offset as i64, import)?;
    }

    tx.execute(
        "UPDATE documents SET updated_at = ?1 WHERE id = ?2",
        params![now(), id],
    )?;
    tx.commit()?;

    if !patch.sections.is_empty() {
        tracing::info!(id, sections = patch.sections.len(), "sections imported");
    }
    load_document(conn, id)
}

fn import_section(
    conn: &Connection,
    document_id: &str,
    order: i64,
    import: &SectionImport,
) -> DbResult<()> {
    let section_id = new_id();
    conn.execute(
        "INSERT INTO sections (id, document_id, title, ord) VALUES (?1, ?2, ?3, ?4)",
        params![section_id, document_id, import.title, order],
    )?;
    for (i, sub) in import.subsections.iter().enumerate() {
        conn.execute(
            "INSERT INTO subsections (id, section_id, title, content, ord)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![new_id(), section_id, sub.title, sub.content, i as i64],
        )?;
    }
    Ok(())
}

pub fn delete_document(conn: &Connection, id: &str) -> DbResult<()> {
    let deleted = conn.execute("DELETE FROM documents WHERE id = ?1", params![id])?;
    if deleted == 0 {
        return Err(DbError::not_found("document", id));
    }
    Ok(())
}

// ============================================================================
// Sections
// ============================================================================

fn count_sections(conn: &Connection, document_id: &str) -> DbResult<i64> {
    Ok(conn.query_row(
        "SELECT COUNT(*) FROM sections WHERE document_id = ?1",
        params![document_id],
        |row| row.get(0),
    )?)
}

fn find_section(conn: &Connection, id: &str) -> DbResult<SectionRecord> {
    conn.query_row(
        "SELECT id, document_id, title, ord FROM sections WHERE id = ?1",
        params![id],
        section_from_row,
    )
    .optional()?
    .ok_or_else(|| DbError::not_found("section", id))
}

pub fn insert_section(conn: &Connection, input: &NewSection) -> DbResult<SectionRecord> {
    input.validate()?;
    find_summary(conn, &input.document_id)?;

    let order = match input.order {
        Some(order) => order,
        None => count_sections(conn, &input.document_id)?,
    };
    let id = new_id();
    conn.execute(
        "INSERT INTO sections (id, document_id, title, ord) VALUES (?1, ?2, ?3, ?4)",
        params![id, input.document_id, input.title, order],
    )?;
    tracing::debug!(%id, document = %input.document_id, order, "section inserted");
    find_section(conn, &id)
}

/// Section with its subsections
pub fn load_section(conn: &Connection, id: &str) -> DbResult<SectionRecord> {
    let mut section = find_section(conn, id)?;
    section.subsections = subsections_of(conn, id)?;
    Ok(section)
}

pub fn update_section(conn: &Connection, id: &str, patch: &SectionPatch) -> DbResult<SectionRecord> {
    patch.validate()?;
    find_section(conn, id)?;

    if let Some(title) = &patch.title {
        conn.execute(
            "UPDATE sections SET title = ?1 WHERE id = ?2",
            params![title, id],
        )?;
    }
    if let Some(order) = patch.order {
        conn.execute(
            "UPDATE sections SET ord = ?1 WHERE id = ?2",
            params![order, id],
        )?;
    }
    load_section(conn, id)
}

/// Delete a section; its subsections go with it
pub fn delete_section(conn: &Connection, id: &str) -> DbResult<()> {
    let deleted = conn.execute("DELETE FROM sections WHERE id = ?1", params![id])?;
    if deleted == 0 {
        return Err(DbError::not_found("section", id));
    }
    Ok(())
}

// ============================================================================
// Subsections
// ============================================================================

fn subsections_of(conn: &Connection, section_id: &str) -> DbResult<Vec<SubsectionRecord>> {
    let mut stmt = conn.prepare(
        "SELECT id, section_id, title, content, ord FROM subsections
         WHERE section_id = ?1 ORDER BY ord, rowid",
    )?;
    let rows = stmt.query_map(params![section_id], subsection_from_row)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

pub fn load_subsection(conn: &Connection, id: &str) -> DbResult<SubsectionRecord> {
    conn.query_row(
        "SELECT id, section_id, title, content, ord FROM subsections WHERE id = ?1",
        params![id],
        subsection_from_row,
    )
    .optional()?
    .ok_or_else(|| DbError::not_found("subsection", id))
}

pub fn insert_subsection(conn: &Connection, input: &NewSubsection) -> DbResult<SubsectionRecord> {
    input.validate()?;
    find_section(conn, &input.section_id)?;

    let order = match input.order {
        Some(order) => order,
        None => conn.query_row(
            "SELECT COUNT(*) FROM subsections WHERE section_id = ?1",
            params![input.section_id],
            |row| row.get(0),
        )?,
    };
    let id = new_id();
    conn.execute(
        "INSERT INTO subsections (id, section_id, title, content, ord)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            id,
            input.section_id,
            input.title,
            input.content.as_deref().unwrap_or_default(),
            order
        ],
    )?;
    tracing::debug!(%id, section = %input.section_id, order, "subsection inserted");
    load_subsection(conn, &id)
}

pub fn update_subsection(
    conn: &Connection,
    id: &str,
    patch: &SubsectionPatch,
) -> DbResult<SubsectionRecord> {
    patch.validate()?;
    load_subsection(conn, id)?;

    if let Some(title) = &patch.title {
        conn.execute(
            "UPDATE subsections SET title = ?1 WHERE id = ?2",
            params![title, id],
        )?;
    }
    if let Some(content) = &patch.content {
        conn.execute(
            "UPDATE subsections SET content = ?1 WHERE id = ?2",
            params![content, id],
        )?;
    }
    if let Some(order) = patch.order {
        conn.execute(
            "UPDATE subsections SET ord = ?1 WHERE id = ?2",
            params![order, id],
        )?;
    }
    load_subsection(conn, id)
}

pub fn delete_subsection(conn: &Connection, id: &str) -> DbResult<()> {
    let deleted = conn.execute("DELETE FROM subsections WHERE id = ?1", params![id])?;
    if deleted == 0 {
        return Err(DbError::not_found("subsection", id));
    }
    Ok(())
}
