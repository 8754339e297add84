//! Directories of annotated documents
//!
//! A [`Corpus`] is the set of document files directly inside one
//! directory. Analysing it counts both patterns in every file and sums the
//! results. Files are independent, so they can be processed in parallel.

use crate::rsd::{RsdError, read_records};
use crate::stats::Statistics;
use crate::tree::{Forest, ForestError};
use glob::MatchOptions;
use rayon::prelude::*;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info_span, warn};

/// Default document extension
pub const DEFAULT_EXTENSION: &str = "rsd";

/// Error analysing a single document
#[derive(Debug, Error)]
pub enum FileError {
    #[error(transparent)]
    Read(#[from] RsdError),

    #[error(transparent)]
    Forest(#[from] ForestError),
}

/// Error analysing a directory
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("invalid file pattern for {}: {source}", .dir.display())]
    Pattern {
        dir: PathBuf,
        #[source]
        source: glob::PatternError,
    },

    #[error("{}: {source}", .path.display())]
    File {
        path: PathBuf,
        #[source]
        source: FileError,
    },
}

/// What to do with a document that can't be read or linked
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Log a warning and leave the document out of the totals
    #[default]
    Skip,
    /// Stop at the first bad document
    Abort,
}

/// How a corpus is analysed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    pub policy: ErrorPolicy,
    pub parallel: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            policy: ErrorPolicy::Skip,
            parallel: true,
        }
    }
}

/// Totals for one directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectorySummary {
    pub dir: PathBuf,
    pub statistics: Statistics,
    /// Documents that contributed to the totals
    pub files: usize,
    /// Documents left out under [`ErrorPolicy::Skip`]
    pub skipped: usize,
}

/// `dir,partially_independent,fully_embedded`
impl fmt::Display for DirectorySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{}",
            self.dir.display(),
            self.statistics.partially_independent,
            self.statistics.fully_embedded
        )
    }
}

/// The documents of one directory
#[derive(Debug, Clone)]
pub struct Corpus {
    dir: PathBuf,
    files: Vec<PathBuf>,
}

impl Corpus {
    /// Collect the files in `dir` ending in `.{extension}`
    ///
    /// Subdirectories are not searched and hidden files are ignored. Files
    /// are sorted for deterministic results.
    pub fn from_dir(dir: impl AsRef<Path>, extension: &str) -> Result<Self, CorpusError> {
        let dir = dir.as_ref();
        let pattern = format!(
            "{}/*.{}",
            glob::Pattern::escape(&dir.to_string_lossy()),
            glob::Pattern::escape(extension)
        );
        let options = MatchOptions {
            require_literal_leading_dot: true,
            ..MatchOptions::new()
        };

        let mut files: Vec<PathBuf> = glob::glob_with(&pattern, options)
            .map_err(|source| CorpusError::Pattern {
                dir: dir.to_path_buf(),
                source,
            })?
            .filter_map(Result::ok)
            .filter(|path| path.is_file())
            .collect();
        files.sort();

        debug!(dir = %dir.display(), files = files.len(), "collected documents");
        Ok(Self::from_paths(dir, files))
    }

    /// Create from explicit file paths
    pub fn from_paths(dir: impl AsRef<Path>, files: Vec<PathBuf>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            files,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Count both patterns in every document and sum the results
    pub fn analyze(&self, options: Options) -> Result<DirectorySummary, CorpusError> {
        if options.parallel {
            let outcomes: Vec<_> = self
                .files
                .par_iter()
                .map(|path| (path.as_path(), analyze_file(path)))
                .collect();
            self.tally(outcomes, options.policy)
        } else {
            let outcomes = self
                .files
                .iter()
                .map(|path| (path.as_path(), analyze_file(path)));
            self.tally(outcomes, options.policy)
        }
    }

    fn tally<'a>(
        &self,
        outcomes: impl IntoIterator<Item = (&'a Path, Result<Statistics, FileError>)>,
        policy: ErrorPolicy,
    ) -> Result<DirectorySummary, CorpusError> {
        let mut summary = DirectorySummary {
            dir: self.dir.clone(),
            statistics: Statistics::default(),
            files: 0,
            skipped: 0,
        };

        for (path, outcome) in outcomes {
            match (outcome, policy) {
                (Ok(statistics), _) => {
                    summary.statistics += statistics;
                    summary.files += 1;
                }
                (Err(source), ErrorPolicy::Skip) => {
                    warn!("skipping {}: {}", path.display(), source);
                    summary.skipped += 1;
                }
                (Err(source), ErrorPolicy::Abort) => {
                    return Err(CorpusError::File {
                        path: path.to_path_buf(),
                        source,
                    });
                }
            }
        }

        Ok(summary)
    }
}

/// Count both patterns in one document
pub fn analyze_file(path: &Path) -> Result<Statistics, FileError> {
    let _span = info_span!("document", path = %path.display()).entered();
    let records = read_records(path)?;
    let forest = Forest::build(&records)?;
    Ok(Statistics::of(&forest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;
    use tempfile::{TempDir, tempdir};

    // 5 -> [2, 4], 2 -> [3]: one partially-independent structure
    const PIS_DOC: &str = "1\ta\t_\t_\t_\t_\t0\tROOT\t_\t_\n\
                           2\tb\t_\t_\t_\t_\t5\telab\t_\t_\n\
                           3\tc\t_\t_\t_\t_\t2\tattr\t_\t_\n\
                           4\td\t_\t_\t_\t_\t5\tjoint\t_\t_\n\
                           5\te\t_\t_\t_\t_\t0\tROOT\t_\t_\n";

    // 5 -> [3, 4, 6]: one fully-embedded structure
    const FES_DOC: &str = "1\ta\t_\t_\t_\t_\t0\tROOT\t_\t_\n\
                           2\tb\t_\t_\t_\t_\t0\tROOT\t_\t_\n\
                           3\tc\t_\t_\t_\t_\t5\telab\t_\t_\n\
                           4\td\t_\t_\t_\t_\t5\telab\t_\t_\n\
                           5\te\t_\t_\t_\t_\t0\tROOT\t_\t_\n\
                           6\tf\t_\t_\t_\t_\t5\tjoint\t_\t_\n";

    const DANGLING_DOC: &str = "1\ta\t_\t_\t_\t_\t0\tROOT\t_\t_\n\
                                2\tb\t_\t_\t_\t_\t99\telab\t_\t_\n";

    /// Helper to create test files with given content
    fn create_test_files(contents: &[(&str, &str)]) -> (TempDir, Vec<PathBuf>) {
        let dir = tempdir().unwrap();
        let mut paths = Vec::new();

        for (filename, content) in contents {
            let path = dir.path().join(filename);
            let mut file = fs::File::create(&path).unwrap();
            write!(file, "{}", content).unwrap();
            paths.push(path);
        }

        (dir, paths)
    }

    fn sequential(policy: ErrorPolicy) -> Options {
        Options {
            policy,
            parallel: false,
        }
    }

    #[test]
    fn test_from_dir_filters_by_extension() {
        let (dir, _paths) = create_test_files(&[
            ("b.rsd", PIS_DOC),
            ("a.rsd", FES_DOC),
            ("notes.txt", "ignored"),
            (".hidden.rsd", PIS_DOC),
        ]);
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("c.rsd"), PIS_DOC).unwrap();

        let corpus = Corpus::from_dir(dir.path(), DEFAULT_EXTENSION).unwrap();
        let names: Vec<_> = corpus
            .files()
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();

        assert_eq!(names, vec!["a.rsd", "b.rsd"]);
        assert_eq!(corpus.dir(), dir.path());
    }

    #[test]
    fn test_two_files_are_summed() {
        let (dir, _paths) = create_test_files(&[("a.rsd", PIS_DOC), ("b.rsd", PIS_DOC)]);

        let summary = Corpus::from_dir(dir.path(), "rsd")
            .unwrap()
            .analyze(Options::default())
            .unwrap();

        assert_eq!(summary.statistics.partially_independent, 2);
        assert_eq!(summary.statistics.fully_embedded, 0);
        assert_eq!(summary.files, 2);
        assert_eq!(summary.skipped, 0);
        assert_eq!(summary.to_string(), format!("{},2,0", dir.path().display()));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let (dir, _paths) = create_test_files(&[
            ("a.rsd", PIS_DOC),
            ("b.rsd", FES_DOC),
            ("c.rsd", PIS_DOC),
            ("d.rsd", FES_DOC),
        ]);
        let corpus = Corpus::from_dir(dir.path(), "rsd").unwrap();

        let parallel = corpus.analyze(Options::default()).unwrap();
        let serial = corpus.analyze(sequential(ErrorPolicy::Skip)).unwrap();

        assert_eq!(parallel, serial);
        assert_eq!(parallel.statistics.partially_independent, 2);
        assert_eq!(parallel.statistics.fully_embedded, 2);
    }

    #[test]
    fn test_empty_directory() {
        let dir = tempdir().unwrap();

        let summary = Corpus::from_dir(dir.path(), "rsd")
            .unwrap()
            .analyze(Options::default())
            .unwrap();

        assert_eq!(summary.statistics, Statistics::default());
        assert_eq!(summary.files, 0);
    }

    #[test]
    fn test_skips_bad_files() {
        let (dir, _paths) = create_test_files(&[
            ("a.rsd", PIS_DOC),
            ("b.rsd", DANGLING_DOC),
            ("c.rsd", "x\t_\t_\t_\t_\t_\t0\tROOT\n"),
        ]);

        let summary = Corpus::from_dir(dir.path(), "rsd")
            .unwrap()
            .analyze(sequential(ErrorPolicy::Skip))
            .unwrap();

        assert_eq!(summary.statistics.partially_independent, 1);
        assert_eq!(summary.files, 1);
        assert_eq!(summary.skipped, 2);
    }

    #[test]
    fn test_detached_node_still_counts() {
        // PIS_DOC plus a unit with a negative head
        let detached = format!("{}6\tf\t_\t_\t_\t_\t-1\tsame-unit\t_\t_\n", PIS_DOC);
        let (dir, _paths) = create_test_files(&[("a.rsd", &detached)]);

        let summary = Corpus::from_dir(dir.path(), "rsd")
            .unwrap()
            .analyze(sequential(ErrorPolicy::Abort))
            .unwrap();

        assert_eq!(summary.statistics.partially_independent, 1);
        assert_eq!(summary.files, 1);
        assert_eq!(summary.skipped, 0);
    }

    #[test]
    fn test_abort_on_dangling_head() {
        let (dir, paths) = create_test_files(&[("a.rsd", PIS_DOC), ("b.rsd", DANGLING_DOC)]);

        let err = Corpus::from_dir(dir.path(), "rsd")
            .unwrap()
            .analyze(sequential(ErrorPolicy::Abort))
            .unwrap_err();

        match err {
            CorpusError::File {
                path,
                source: FileError::Forest(ForestError::DanglingHead { id, head }),
            } => {
                assert_eq!(path, paths[1]);
                assert_eq!((id, head), (2, 99));
            }
            other => panic!("Expected dangling head error, got {:?}", other),
        }
    }

    #[test]
    fn test_abort_in_parallel() {
        let (dir, _paths) = create_test_files(&[("a.rsd", DANGLING_DOC), ("b.rsd", PIS_DOC)]);

        let result = Corpus::from_dir(dir.path(), "rsd").unwrap().analyze(Options {
            policy: ErrorPolicy::Abort,
            parallel: true,
        });

        assert!(matches!(result, Err(CorpusError::File { .. })));
    }

    #[test]
    fn test_from_paths() {
        let (dir, paths) = create_test_files(&[("x.doc", PIS_DOC), ("y.doc", FES_DOC)]);

        let summary = Corpus::from_paths(dir.path(), paths)
            .analyze(Options::default())
            .unwrap();

        assert_eq!(summary.statistics.partially_independent, 1);
        assert_eq!(summary.statistics.fully_embedded, 1);
    }

    #[test]
    fn test_custom_extension() {
        let (dir, _paths) = create_test_files(&[("a.rsd", PIS_DOC), ("b.dep", FES_DOC)]);

        let corpus = Corpus::from_dir(dir.path(), "dep").unwrap();
        assert_eq!(corpus.files().len(), 1);

        let summary = corpus.analyze(Options::default()).unwrap();
        assert_eq!(summary.statistics.fully_embedded, 1);
        assert_eq!(summary.statistics.partially_independent, 0);
    }

    #[test]
    fn test_analyze_file() {
        let (_dir, paths) = create_test_files(&[("a.rsd", FES_DOC)]);

        let statistics = analyze_file(&paths[0]).unwrap();
        assert_eq!(statistics.fully_embedded, 1);
    }
}
