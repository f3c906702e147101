//! Score loading and the one-entry score cache.
//!
//! Annotation rows come grouped by score, so consecutive rows for the same
//! file reuse the vocal part already in hand. The cursor only remembers the
//! most recent score: going back to an earlier file loads it again.

use std::path::{Path, PathBuf};

use notation::{Part, Score, ScoreError};
use tracing::{debug, info};

use crate::vocal::into_vocal_part;
use crate::{Error, Result};

/// Anything that can produce a parsed score from a path.
pub trait ScoreLoader {
    fn load(&self, path: &Path) -> std::result::Result<Score, ScoreError>;
}

/// Reads MusicXML files from disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct MusicXmlLoader;

impl ScoreLoader for MusicXmlLoader {
    fn load(&self, path: &Path) -> std::result::Result<Score, ScoreError> {
        notation::load_score(path)
    }
}

/// A directory of scores, addressed by the file names used in annotations.
#[derive(Debug, Clone)]
pub struct Corpus<L = MusicXmlLoader> {
    root: PathBuf,
    loader: L,
}

impl Corpus<MusicXmlLoader> {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Corpus {
            root: root.into(),
            loader: MusicXmlLoader,
        }
    }
}

impl<L: ScoreLoader> Corpus<L> {
    pub fn with_loader(root: impl Into<PathBuf>, loader: L) -> Self {
        Corpus {
            root: root.into(),
            loader,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Load `score_file` and extract its vocal part.
    pub fn vocal_part(&self, score_file: &str) -> Result<Part> {
        let path = self.root.join(score_file);
        info!(score = score_file, path = %path.display(), "loading score");

        let score = self
            .loader
            .load(&path)
            .map_err(|source| Error::ScoreUnreadable {
                score: score_file.to_string(),
                source,
            })?;
        let parts = score.parts.len();

        let part = into_vocal_part(score).ok_or_else(|| Error::NoVocalPart {
            score: score_file.to_string(),
        })?;
        debug!(score = score_file, parts, vocal = %part.id, "vocal part selected");
        Ok(part)
    }
}

/// What [`ScoreCursor::advance`] had to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Same score as the previous row; nothing was read.
    Hit,
    /// A different score was read and is now current.
    Loaded,
}

/// The last score loaded and its vocal part.
#[derive(Debug, Clone, Default)]
pub struct ScoreCursor {
    current: Option<(String, Part)>,
}

impl ScoreCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_score(&self) -> Option<&str> {
        self.current.as_ref().map(|(name, _)| name.as_str())
    }

    pub fn part(&self) -> Option<&Part> {
        self.current.as_ref().map(|(_, part)| part)
    }

    /// Move to `score_file`, loading it only if it differs from the current one.
    ///
    /// On error the cursor is consumed; a failed load ends the run.
    pub fn advance<L: ScoreLoader>(
        self,
        score_file: &str,
        corpus: &Corpus<L>,
    ) -> Result<(ScoreCursor, Advance)> {
        if self.current_score() == Some(score_file) {
            debug!(score = score_file, "score already loaded");
            return Ok((self, Advance::Hit));
        }

        let part = corpus.vocal_part(score_file)?;
        let cursor = ScoreCursor {
            current: Some((score_file.to_string(), part)),
        };
        Ok((cursor, Advance::Loaded))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notation::Element;
    use std::cell::RefCell;

    /// Serves one-part scores from memory and records every path asked for.
    struct FakeLoader {
        calls: RefCell<Vec<PathBuf>>,
        with_lyrics: bool,
    }

    impl FakeLoader {
        fn new(with_lyrics: bool) -> Self {
            FakeLoader {
                calls: RefCell::new(Vec::new()),
                with_lyrics,
            }
        }

        fn loads(&self) -> usize {
            self.calls.borrow().len()
        }
    }

    impl ScoreLoader for FakeLoader {
        fn load(&self, path: &Path) -> std::result::Result<Score, ScoreError> {
            self.calls.borrow_mut().push(path.to_path_buf());
            if path.ends_with("missing.xml") {
                return Err(ScoreError::Xml("no such score".to_string()));
            }
            let mut note = Element::note(0.0, 1.0, "E4".parse().unwrap());
            if self.with_lyrics {
                note = note.with_lyric("春");
            }
            let mut part = Part::new("P1", "Voice");
            part.elements.push(note);
            Ok(Score { parts: vec![part] })
        }
    }

    #[test]
    fn test_consecutive_rows_share_one_load() {
        let corpus = Corpus::with_loader("/corpus", FakeLoader::new(true));

        let (cursor, first) = ScoreCursor::new().advance("a.xml", &corpus).unwrap();
        let (cursor, second) = cursor.advance("a.xml", &corpus).unwrap();

        assert_eq!(first, Advance::Loaded);
        assert_eq!(second, Advance::Hit);
        assert_eq!(corpus.loader.loads(), 1);
        assert_eq!(cursor.current_score(), Some("a.xml"));
        assert_eq!(cursor.part().map(|p| p.id.as_str()), Some("P1"));
    }

    #[test]
    fn test_returning_to_an_earlier_score_reloads_it() {
        let corpus = Corpus::with_loader("/corpus", FakeLoader::new(true));

        let mut cursor = ScoreCursor::new();
        let mut outcomes = Vec::new();
        for score in ["a.xml", "b.xml", "a.xml"] {
            let (next, outcome) = cursor.advance(score, &corpus).unwrap();
            cursor = next;
            outcomes.push(outcome);
        }

        assert_eq!(outcomes, vec![Advance::Loaded; 3]);
        assert_eq!(corpus.loader.loads(), 3);
    }

    #[test]
    fn test_paths_are_joined_to_the_root() {
        let corpus = Corpus::with_loader("/corpus/JMSD-xml", FakeLoader::new(true));
        corpus.vocal_part("lsxp-Zhuo.xml").unwrap();
        assert_eq!(
            corpus.loader.calls.borrow()[0],
            PathBuf::from("/corpus/JMSD-xml/lsxp-Zhuo.xml")
        );
    }

    #[test]
    fn test_unreadable_score_is_fatal() {
        let corpus = Corpus::with_loader("/corpus", FakeLoader::new(true));
        let err = ScoreCursor::new().advance("missing.xml", &corpus).unwrap_err();
        assert!(matches!(err, Error::ScoreUnreadable { ref score, .. } if score == "missing.xml"));
    }

    #[test]
    fn test_score_without_lyrics_has_no_vocal_part() {
        let corpus = Corpus::with_loader("/corpus", FakeLoader::new(false));
        let err = corpus.vocal_part("instrumental.xml").unwrap_err();
        assert!(matches!(err, Error::NoVocalPart { .. }));
    }
}
