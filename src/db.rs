use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension};

use crate::parser::lines::is_space;
use crate::parser::AnalysisResult;

pub const DEFAULT_DB_PATH: &str = "data/readmes.sqlite";

pub fn connect(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let conn = Connection::open(path)
        .with_context(|| format!("Failed to open database {}", path.display()))?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS readmes (
            repo          TEXT PRIMARY KEY,
            path          TEXT NOT NULL,
            branch        TEXT NOT NULL,
            bytes         INTEGER NOT NULL,
            line_count    INTEGER NOT NULL,
            match_count   INTEGER NOT NULL,
            image_count   INTEGER NOT NULL,
            main_image    TEXT,
            best_title    TEXT,
            best_content  TEXT,
            best_words    INTEGER NOT NULL DEFAULT 0,
            result_json   TEXT NOT NULL,
            analyzed_at   TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS readme_links (
            id            INTEGER PRIMARY KEY,
            repo          TEXT NOT NULL REFERENCES readmes(repo) ON DELETE CASCADE,
            match_idx     INTEGER NOT NULL,
            url           TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_links_repo ON readme_links(repo);
        CREATE INDEX IF NOT EXISTS idx_links_url ON readme_links(url);

        CREATE TABLE IF NOT EXISTS readme_images (
            id            INTEGER PRIMARY KEY,
            repo          TEXT NOT NULL REFERENCES readmes(repo) ON DELETE CASCADE,
            position      INTEGER NOT NULL,
            url           TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_images_repo ON readme_images(repo);
        ",
    )?;
    Ok(())
}

// ── Analyses ──

pub struct ReadmeRow {
    pub repo: String,
    pub path: String,
    pub branch: String,
    pub bytes: usize,
    pub line_count: usize,
    pub result: AnalysisResult,
}

/// Store analyses in one transaction. Earlier rows for the same repo are replaced.
pub fn save_analyses(conn: &Connection, rows: &[ReadmeRow]) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    {
        let mut del_links = tx.prepare("DELETE FROM readme_links WHERE repo = ?1")?;
        let mut del_images = tx.prepare("DELETE FROM readme_images WHERE repo = ?1")?;
        let mut r_stmt = tx.prepare(
            "INSERT OR REPLACE INTO readmes
             (repo, path, branch, bytes, line_count, match_count, image_count,
              main_image, best_title, best_content, best_words, result_json)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        )?;
        let mut l_stmt = tx.prepare(
            "INSERT INTO readme_links (repo, match_idx, url) VALUES (?1, ?2, ?3)",
        )?;
        let mut i_stmt = tx.prepare(
            "INSERT INTO readme_images (repo, position, url) VALUES (?1, ?2, ?3)",
        )?;

        for r in rows {
            del_links.execute([&r.repo])?;
            del_images.execute([&r.repo])?;

            let best = r.result.best_section.as_ref();
            let best_words = best.map_or(0, |b| {
                b.content.split(is_space).filter(|w| !w.is_empty()).count()
            });
            let json = serde_json::to_string(&r.result)?;
            r_stmt.execute(rusqlite::params![
                r.repo,
                r.path,
                r.branch,
                r.bytes as i64,
                r.line_count as i64,
                r.result.matches.len() as i64,
                r.result.images.len() as i64,
                r.result.main_image,
                best.map(|b| &b.title),
                best.map(|b| &b.content),
                best_words as i64,
                json,
            ])?;

            for (idx, m) in r.result.matches.iter().enumerate() {
                for url in &m.urls {
                    l_stmt.execute(rusqlite::params![r.repo, idx as i64, url])?;
                }
            }
            for (pos, url) in r.result.images.iter().enumerate() {
                i_stmt.execute(rusqlite::params![r.repo, pos as i64, url])?;
            }
        }
    }
    tx.commit()?;
    Ok(())
}

/// Stored analysis for one repo, if it has been analyzed.
pub fn fetch_result(conn: &Connection, repo: &str) -> Result<Option<AnalysisResult>> {
    let json: Option<String> = conn
        .query_row(
            "SELECT result_json FROM readmes WHERE repo = ?1",
            [repo],
            |row| row.get(0),
        )
        .optional()?;
    json.map(|j| serde_json::from_str(&j).context("Corrupt stored analysis"))
        .transpose()
}

// ── Overview ──

pub struct OverviewRow {
    pub repo: String,
    pub line_count: i64,
    pub match_count: i64,
    pub image_count: i64,
    pub main_image: Option<String>,
    pub best_title: Option<String>,
    pub best_words: i64,
}

pub fn fetch_overview(
    conn: &Connection,
    with_image: bool,
    section: Option<&str>,
    limit: usize,
) -> Result<Vec<OverviewRow>> {
    let mut conditions = Vec::new();
    let mut params: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

    if with_image {
        conditions.push("main_image IS NOT NULL".to_string());
    }
    if let Some(s) = section {
        // Titles are stored lowercased; instr keeps `%` and `_` literal.
        conditions.push(format!("instr(best_title, ?{}) > 0", params.len() + 1));
        params.push(Box::new(s.to_lowercase()));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    };

    let sql = format!(
        "SELECT repo, line_count, match_count, image_count, main_image, best_title, best_words
         FROM readmes{}
         ORDER BY match_count DESC, best_words DESC, repo
         LIMIT {}",
        where_clause, limit
    );

    let mut stmt = conn.prepare(&sql)?;
    let param_refs: Vec<&dyn rusqlite::types::ToSql> = params.iter().map(|p| p.as_ref()).collect();
    let rows = stmt
        .query_map(param_refs.as_slice(), |row| {
            Ok(OverviewRow {
                repo: row.get(0)?,
                line_count: row.get(1)?,
                match_count: row.get(2)?,
                image_count: row.get(3)?,
                main_image: row.get(4)?,
                best_title: row.get(5)?,
                best_words: row.get(6)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ── Stats ──

pub struct Stats {
    pub readmes: usize,
    pub with_main_image: usize,
    pub with_best_section: usize,
    pub matches: usize,
    pub links: usize,
    pub images: usize,
}

pub fn get_stats(conn: &Connection) -> Result<Stats> {
    let readmes: usize = conn.query_row("SELECT COUNT(*) FROM readmes", [], |r| r.get(0))?;
    let with_main_image: usize = conn.query_row(
        "SELECT COUNT(*) FROM readmes WHERE main_image IS NOT NULL",
        [],
        |r| r.get(0),
    )?;
    let with_best_section: usize = conn.query_row(
        "SELECT COUNT(*) FROM readmes WHERE best_title IS NOT NULL",
        [],
        |r| r.get(0),
    )?;
    let matches: usize = conn.query_row(
        "SELECT COALESCE(SUM(match_count), 0) FROM readmes",
        [],
        |r| r.get(0),
    )?;
    let links: usize = conn.query_row("SELECT COUNT(*) FROM readme_links", [], |r| r.get(0))?;
    let images: usize = conn.query_row("SELECT COUNT(*) FROM readme_images", [], |r| r.get(0))?;
    Ok(Stats {
        readmes,
        with_main_image,
        with_best_section,
        matches,
        links,
        images,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::analyze;
    use crate::repo::RepoCoordinate;

    fn memory_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    fn row(repo: &str, md: &str) -> ReadmeRow {
        let coord = RepoCoordinate::new(repo);
        ReadmeRow {
            repo: repo.to_string(),
            path: format!("{}/README.md", repo),
            branch: coord.branch().to_string(),
            bytes: md.len(),
            line_count: md.lines().count(),
            result: analyze(md, &coord),
        }
    }

    #[test]
    fn widget_round_trip() {
        let conn = memory_db();
        let md = std::fs::read_to_string("tests/fixtures/widget.md").unwrap();
        let r = row("acme/widget", &md);
        let expected = r.result.clone();
        save_analyses(&conn, &[r]).unwrap();

        assert_eq!(fetch_result(&conn, "acme/widget").unwrap(), Some(expected));
        assert_eq!(fetch_result(&conn, "acme/other").unwrap(), None);

        let s = get_stats(&conn).unwrap();
        assert_eq!(s.readmes, 1);
        assert_eq!(s.with_main_image, 1);
        assert_eq!(s.with_best_section, 1);
        assert_eq!(s.matches, 3);
        assert_eq!(s.links, 3);
        assert_eq!(s.images, 3);
    }

    #[test]
    fn resave_replaces_children() {
        let conn = memory_db();
        save_analyses(&conn, &[row("a/b", "demo https://x.io\n![i](i.png)")]).unwrap();
        save_analyses(&conn, &[row("a/b", "nothing to see")]).unwrap();

        let s = get_stats(&conn).unwrap();
        assert_eq!(s.readmes, 1);
        assert_eq!(s.links, 0);
        assert_eq!(s.images, 0);
        assert_eq!(s.with_main_image, 0);
    }

    #[test]
    fn overview_filters() {
        let conn = memory_db();
        save_analyses(
            &conn,
            &[
                row("a/one", "# About\nlots of words in here\n![x](x.png)"),
                row("a/two", "# Overview\nshort\nexample: https://two.dev"),
                row("a/three", "# License\nMIT"),
            ],
        )
        .unwrap();

        let all = fetch_overview(&conn, false, None, 10).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].repo, "a/two");

        let with_image = fetch_overview(&conn, true, None, 10).unwrap();
        assert_eq!(with_image.len(), 1);
        assert_eq!(with_image[0].repo, "a/one");
        assert_eq!(with_image[0].best_words, 6);

        let overview = fetch_overview(&conn, false, Some("OVER"), 10).unwrap();
        assert_eq!(overview.len(), 1);
        assert_eq!(overview[0].best_title.as_deref(), Some("overview"));

        assert_eq!(fetch_overview(&conn, false, None, 1).unwrap().len(), 1);
    }

    #[test]
    fn section_filter_is_literal() {
        let conn = memory_db();
        save_analyses(
            &conn,
            &[
                row("a/pct", "# About 100% rust\nsome words"),
                row("a/plain", "# About rust\nsome words"),
                row("a/under", "# Project_x\nsome words"),
                row("a/other", "# Projectax\nsome words"),
            ],
        )
        .unwrap();

        let pct = fetch_overview(&conn, false, Some("100%"), 10).unwrap();
        assert_eq!(pct.len(), 1);
        assert_eq!(pct[0].repo, "a/pct");

        let under = fetch_overview(&conn, false, Some("Project_"), 10).unwrap();
        assert_eq!(under.len(), 1);
        assert_eq!(under[0].repo, "a/under");

        assert_eq!(fetch_overview(&conn, false, Some("%"), 10).unwrap().len(), 1);
    }

    #[test]
    fn empty_stats() {
        let s = get_stats(&memory_db()).unwrap();
        assert_eq!(s.readmes, 0);
        assert_eq!(s.matches, 0);
    }
}
