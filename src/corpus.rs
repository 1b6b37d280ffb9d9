//! Immutable in-memory corpus index, loaded once from SQLite

use crate::error::RootsError;
use crate::normalize::normalize;
use crate::tokens::{ChapterMeta, Era, Token, Verse};
use anyhow::{anyhow, bail, Context, Result};
use rusqlite::{Connection, OpenFlags};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// Raw records handed over by a corpus source.
#[derive(Debug, Clone, Default)]
pub struct CorpusData {
    pub verses: Vec<Verse>,
    pub chapters: Vec<ChapterMeta>,
}

/// Anything that can produce the full corpus at startup.
pub trait CorpusSource {
    fn describe(&self) -> String;
    fn load(&self) -> Result<CorpusData>;
}

/// Reads `surah`, `ayah` and `token` tables from a SQLite database.
pub struct SqliteCorpusSource {
    db_path: PathBuf,
}

impl SqliteCorpusSource {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self { db_path: db_path.into() }
    }

    fn open(&self) -> Result<Connection> {
        Connection::open_with_flags(&self.db_path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .with_context(|| format!("Failed to open corpus database at {:?}", self.db_path))
    }

    fn load_chapters(conn: &Connection) -> Result<Vec<ChapterMeta>> {
        let rows = conn
            .prepare("SELECT surah_no, name, era, revelation_order FROM surah ORDER BY surah_no")?
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, i64>(3)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter()
            .map(|(chapter_no, name, era, revelation_order)| {
                let era: Era = era
                    .parse()
                    .map_err(|e: String| anyhow!("surah {chapter_no}: {e}"))?;
                Ok(ChapterMeta {
                    chapter_no: to_u32(chapter_no, "surah_no")?,
                    name,
                    era,
                    revelation_order: to_u32(revelation_order, "revelation_order")?,
                })
            })
            .collect()
    }

    fn load_verses(conn: &Connection) -> Result<Vec<Verse>> {
        let rows = conn
            .prepare(
                "SELECT global_ayah, surah_no, ayah_no, page, juz, text_uthmani
                 FROM ayah ORDER BY global_ayah",
            )?
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, i64>(3)?,
                    row.get::<_, i64>(4)?,
                    row.get::<_, String>(5)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter()
            .map(|(global_id, chapter_no, verse_no, page, section, text)| {
                Ok(Verse {
                    global_id: to_u32(global_id, "global_ayah")?,
                    chapter_no: to_u32(chapter_no, "surah_no")?,
                    verse_no: to_u32(verse_no, "ayah_no")?,
                    page: to_u32(page, "page")?,
                    section: to_u32(section, "juz")?,
                    text,
                    tokens: Vec::new(),
                })
            })
            .collect()
    }

    fn load_tokens(conn: &Connection) -> Result<HashMap<u32, Vec<Token>>> {
        let mut stmt = conn.prepare(
            "SELECT global_ayah, token, token_uthmani, root
             FROM token ORDER BY global_ayah, position",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, Option<String>>(3)?,
            ))
        })?;

        let mut by_verse: HashMap<u32, Vec<Token>> = HashMap::new();
        for row in rows {
            let (global_id, surface_form, surface_form_uthmani, root) = row?;
            by_verse
                .entry(to_u32(global_id, "token.global_ayah")?)
                .or_default()
                .push(Token {
                    surface_form,
                    surface_form_uthmani,
                    root: root.filter(|r| !r.trim().is_empty()),
                });
        }
        Ok(by_verse)
    }
}

impl CorpusSource for SqliteCorpusSource {
    fn describe(&self) -> String {
        format!("sqlite:{}", self.db_path.display())
    }

    fn load(&self) -> Result<CorpusData> {
        let conn = self.open()?;
        let chapters = Self::load_chapters(&conn).context("Failed to read surah table")?;
        let mut verses = Self::load_verses(&conn).context("Failed to read ayah table")?;
        let mut tokens = Self::load_tokens(&conn).context("Failed to read token table")?;

        for verse in &mut verses {
            if let Some(verse_tokens) = tokens.remove(&verse.global_id) {
                verse.tokens = verse_tokens;
            }
        }
        if let Some(orphan) = tokens.keys().min() {
            bail!("token rows reference unknown ayah {orphan}");
        }

        Ok(CorpusData { verses, chapters })
    }
}

fn to_u32(value: i64, column: &str) -> Result<u32> {
    u32::try_from(value).map_err(|_| anyhow!("{column} out of range: {value}"))
}

/// Every verse and chapter of the corpus plus lookup structures derived from
/// them. Built once; read-only afterwards.
pub struct CorpusIndex {
    verses: Vec<Verse>,
    chapters: BTreeMap<u32, ChapterMeta>,
    /// normalized root -> ascending verse positions containing it
    postings: HashMap<String, Vec<usize>>,
    by_chapter: HashMap<u32, Vec<usize>>,
    by_page: HashMap<u32, Vec<usize>>,
    by_section: HashMap<u32, Vec<usize>>,
}

impl CorpusIndex {
    /// Load from a source; any failure is reported as `CorpusUnavailable`.
    pub fn load(source: &dyn CorpusSource) -> Result<Self, RootsError> {
        let data = source
            .load()
            .map_err(|e| RootsError::CorpusUnavailable(format!("{}: {e:#}", source.describe())))?;
        Self::build(data)
    }

    pub fn build(data: CorpusData) -> Result<Self, RootsError> {
        Self::try_build(data).map_err(|e| RootsError::CorpusUnavailable(format!("{e:#}")))
    }

    fn try_build(data: CorpusData) -> Result<Self> {
        let CorpusData { mut verses, chapters: chapter_list } = data;
        if verses.is_empty() {
            bail!("corpus contains no verses");
        }

        let mut chapters = BTreeMap::new();
        for meta in chapter_list {
            let chapter_no = meta.chapter_no;
            if chapters.insert(chapter_no, meta).is_some() {
                bail!("duplicate metadata for chapter {chapter_no}");
            }
        }

        verses.sort_by_key(|v| v.global_id);
        if let Some(pair) = verses.windows(2).find(|w| w[0].global_id == w[1].global_id) {
            bail!("duplicate verse id {}", pair[0].global_id);
        }

        let mut postings: HashMap<String, Vec<usize>> = HashMap::new();
        let mut by_chapter: HashMap<u32, Vec<usize>> = HashMap::new();
        let mut by_page: HashMap<u32, Vec<usize>> = HashMap::new();
        let mut by_section: HashMap<u32, Vec<usize>> = HashMap::new();

        for (pos, verse) in verses.iter().enumerate() {
            if !chapters.contains_key(&verse.chapter_no) {
                bail!(
                    "verse {} belongs to chapter {} which has no metadata",
                    verse.global_id,
                    verse.chapter_no
                );
            }
            by_chapter.entry(verse.chapter_no).or_default().push(pos);
            by_page.entry(verse.page).or_default().push(pos);
            by_section.entry(verse.section).or_default().push(pos);

            for root in verse.tokens.iter().filter_map(|t| t.root.as_deref()) {
                let key = normalize(root);
                if key.is_empty() {
                    continue;
                }
                let list = postings.entry(key).or_default();
                if list.last() != Some(&pos) {
                    list.push(pos);
                }
            }
        }

        Ok(Self { verses, chapters, postings, by_chapter, by_page, by_section })
    }

    /// Open a SQLite corpus database.
    pub fn open_sqlite(db_path: &Path) -> Result<Self, RootsError> {
        Self::load(&SqliteCorpusSource::new(db_path))
    }

    pub fn verses(&self) -> &[Verse] {
        &self.verses
    }

    pub fn verse_count(&self) -> usize {
        self.verses.len()
    }

    pub fn verse_at(&self, pos: usize) -> &Verse {
        &self.verses[pos]
    }

    pub fn chapter(&self, chapter_no: u32) -> Option<&ChapterMeta> {
        self.chapters.get(&chapter_no)
    }

    /// Chapter metadata for a chapter known to be in the corpus. Every verse's
    /// chapter is checked at build time, so a miss here is a bug.
    pub fn chapter_of(&self, verse: &Verse) -> &ChapterMeta {
        self.chapters.get(&verse.chapter_no).unwrap_or_else(|| {
            panic!(
                "chapter {} of verse {} missing from metadata",
                verse.chapter_no, verse.global_id
            )
        })
    }

    pub fn chapters(&self) -> impl Iterator<Item = &ChapterMeta> {
        self.chapters.values()
    }

    pub fn chapter_count(&self) -> usize {
        self.chapters.len()
    }

    /// Ascending verse positions containing the (already normalized) root.
    pub fn root_postings(&self, normalized_root: &str) -> &[usize] {
        self.postings.get(normalized_root).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of verses in the whole corpus in which both roots appear.
    pub fn shared_verse_count(&self, a: &str, b: &str) -> u64 {
        intersection_len(self.root_postings(a), self.root_postings(b))
    }

    pub fn verses_in_chapter(&self, chapter_no: u32) -> Vec<&Verse> {
        self.collect_positions(self.by_chapter.get(&chapter_no))
    }

    pub fn verses_by_page(&self, page: u32) -> Vec<&Verse> {
        self.collect_positions(self.by_page.get(&page))
    }

    pub fn verses_by_section(&self, section: u32) -> Vec<&Verse> {
        self.collect_positions(self.by_section.get(&section))
    }

    fn collect_positions(&self, positions: Option<&Vec<usize>>) -> Vec<&Verse> {
        positions
            .map(|list| list.iter().map(|&pos| &self.verses[pos]).collect())
            .unwrap_or_default()
    }
}

fn intersection_len(a: &[usize], b: &[usize]) -> u64 {
    let (mut i, mut j, mut count) = (0, 0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                count += 1;
                i += 1;
                j += 1;
            }
        }
    }
    count
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn token(surface: &str, root: Option<&str>) -> Token {
        Token {
            surface_form: surface.to_string(),
            surface_form_uthmani: None,
            root: root.map(str::to_string),
        }
    }

    pub fn verse(global_id: u32, chapter_no: u32, tokens: Vec<Token>) -> Verse {
        let text = tokens
            .iter()
            .map(|t| t.surface_form.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        Verse {
            global_id,
            chapter_no,
            verse_no: global_id,
            page: 1 + global_id / 10,
            section: 1,
            text,
            tokens,
        }
    }

    pub fn chapter(chapter_no: u32, name: &str, era: Era, revelation_order: u32) -> ChapterMeta {
        ChapterMeta { chapter_no, name: name.to_string(), era, revelation_order }
    }

    /// Three verses: 1 and 3 carry رحم, 2 does not; علم appears alongside.
    pub fn small_corpus() -> CorpusIndex {
        CorpusIndex::build(CorpusData {
            verses: vec![
                verse(1, 1, vec![token("الرحمن", Some("ر ح م")), token("علم", Some("علم"))]),
                verse(2, 1, vec![token("الحمد", Some("حمد")), token("علم", Some("علم"))]),
                verse(3, 2, vec![token("رحيم", Some("رحم")), token("من", Some("من"))]),
            ],
            chapters: vec![
                chapter(1, "الفاتحة", Era::Meccan, 5),
                chapter(2, "البقرة", Era::Medinan, 87),
            ],
        })
        .expect("fixture corpus builds")
    }
}
