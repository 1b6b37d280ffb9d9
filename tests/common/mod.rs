#![allow(dead_code)]

use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// (global_ayah, surah_no, ayah_no, page, juz, text)
const AYAT: &[(i64, i64, i64, i64, i64, &str)] = &[
    (1, 1, 1, 1, 1, "بِسْمِ اللَّهِ الرَّحْمَٰنِ الرَّحِيمِ"),
    (2, 1, 2, 1, 1, "الْحَمْدُ لِلَّهِ رَبِّ الْعَالَمِينَ"),
    (3, 2, 1, 2, 1, "الم"),
    (4, 2, 2, 2, 1, "ذَٰلِكَ الْكِتَابُ لَا رَيْبَ فِيهِ"),
    (5, 2, 3, 3, 2, "وَرَحْمَةً وَعِلْمًا"),
];

/// (global_ayah, position, token, root)
const TOKENS: &[(i64, i64, &str, Option<&str>)] = &[
    (1, 1, "بسم", Some("سمو")),
    (1, 2, "الله", Some("أله")),
    (1, 3, "الرحمن", Some("رحم")),
    (1, 4, "الرحيم", Some("رحم")),
    (2, 1, "الحمد", Some("حمد")),
    (2, 2, "لله", Some("أله")),
    (2, 3, "رب", Some("ربب")),
    (2, 4, "العالمين", Some("علم")),
    (3, 1, "الم", None),
    (4, 1, "ذلك", None),
    (4, 2, "الكتاب", Some("كتب")),
    (4, 3, "لا", None),
    (4, 4, "ريب", Some("ريب")),
    (4, 5, "فيه", None),
    (5, 1, "ورحمة", Some("رحم")),
    (5, 2, "وعلما", Some("علم")),
];

/// A small corpus database on disk; removed when dropped.
pub struct CorpusDb {
    _dir: TempDir,
    path: PathBuf,
}

impl CorpusDb {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

pub fn create_corpus_db() -> CorpusDb {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("corpus.sqlite");
    let conn = Connection::open(&path).unwrap();

    conn.execute_batch(
        "CREATE TABLE surah (
             surah_no INTEGER PRIMARY KEY,
             name TEXT NOT NULL,
             era TEXT NOT NULL,
             revelation_order INTEGER NOT NULL
         );
         CREATE TABLE ayah (
             global_ayah INTEGER PRIMARY KEY,
             surah_no INTEGER NOT NULL,
             ayah_no INTEGER NOT NULL,
             page INTEGER NOT NULL,
             juz INTEGER NOT NULL,
             text_uthmani TEXT NOT NULL
         );
         CREATE TABLE token (
             global_ayah INTEGER NOT NULL,
             position INTEGER NOT NULL,
             token TEXT NOT NULL,
             token_uthmani TEXT,
             root TEXT
         );",
    )
    .unwrap();

    conn.execute(
        "INSERT INTO surah VALUES (?1, ?2, ?3, ?4)",
        params![1, "الفاتحة", "meccan", 5],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO surah VALUES (?1, ?2, ?3, ?4)",
        params![2, "البقرة", "medinan", 87],
    )
    .unwrap();

    for (global, surah, ayah, page, juz, text) in AYAT {
        conn.execute(
            "INSERT INTO ayah VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![global, surah, ayah, page, juz, text],
        )
        .unwrap();
    }
    for (global, position, token, root) in TOKENS {
        conn.execute(
            "INSERT INTO token (global_ayah, position, token, root) VALUES (?1, ?2, ?3, ?4)",
            params![global, position, token, root],
        )
        .unwrap();
    }

    CorpusDb { _dir: dir, path }
}
