//! Durable storage of problems as JSON records, one file per problem name.

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};
use log::debug;

use super::{ArchiveError, ProblemRecord, RoutingProblem};

/// File extension of archived records.
pub const RECORD_EXTENSION: &str = "json";

/// A directory of archived problems, each stored as `<root>/<name>.json`.
///
/// Writes go to a temporary sibling first and are renamed into place, so a
/// reader never observes a half-written record.
///
/// # Examples
///
/// ```
/// use stopwise_core::{ProblemArchive, RoutingProblem};
///
/// let dir = tempfile::tempdir()?;
/// let root = camino::Utf8Path::from_path(dir.path()).ok_or("non-UTF-8 temp dir")?;
/// let archive = ProblemArchive::open(root)?;
/// archive.save(&RoutingProblem::new("ghent"))?;
/// assert!(archive.exists("ghent")?);
/// assert_eq!(archive.load("ghent")?.name(), "ghent");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct ProblemArchive {
    root: Utf8PathBuf,
    dir: fs_utf8::Dir,
}

impl ProblemArchive {
    /// Open the archive at `root`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// [`ArchiveError::OpenRoot`] when the directory cannot be created or
    /// opened.
    pub fn open(root: impl AsRef<Utf8Path>) -> Result<Self, ArchiveError> {
        let root = root.as_ref().to_path_buf();
        let open_root = |source| ArchiveError::OpenRoot {
            path: root.clone(),
            source,
        };
        fs_utf8::Dir::create_ambient_dir_all(&root, ambient_authority()).map_err(open_root)?;
        let dir = fs_utf8::Dir::open_ambient_dir(&root, ambient_authority()).map_err(open_root)?;
        Ok(Self { root, dir })
    }

    /// Directory holding the records.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Whether a record exists for `name`.
    ///
    /// # Errors
    ///
    /// [`ArchiveError::InvalidName`] for unusable names and
    /// [`ArchiveError::Read`] when the directory cannot be inspected.
    pub fn exists(&self, name: &str) -> Result<bool, ArchiveError> {
        let path = record_path(name)?;
        match self.dir.try_exists(&path) {
            Ok(found) => Ok(found && self.dir.is_file(&path)),
            Err(source) => Err(ArchiveError::Read { path, source }),
        }
    }

    /// Write `problem` under its name, replacing any previous record.
    ///
    /// # Errors
    ///
    /// [`ArchiveError::InvalidName`], [`ArchiveError::Encode`] or
    /// [`ArchiveError::Write`].
    pub fn save(&self, problem: &RoutingProblem) -> Result<(), ArchiveError> {
        let name = problem.name();
        let path = record_path(name)?;
        let json = serde_json::to_vec_pretty(problem).map_err(|source| ArchiveError::Encode {
            name: name.to_owned(),
            source,
        })?;
        let staging = Utf8PathBuf::from(format!("{path}.tmp"));
        self.dir
            .write(&staging, json)
            .map_err(|source| ArchiveError::Write {
                path: staging.clone(),
                source,
            })?;
        self.dir
            .rename(&staging, &self.dir, &path)
            .map_err(|source| ArchiveError::Write {
                path: path.clone(),
                source,
            })?;
        debug!("saved problem {name} to {}", self.root.join(&path));
        Ok(())
    }

    /// Load the problem stored under `name`.
    ///
    /// # Errors
    ///
    /// [`ArchiveError::NotFound`] when no record exists,
    /// [`ArchiveError::Decode`] for malformed JSON and
    /// [`ArchiveError::InvalidRecord`] when the record breaks a problem
    /// invariant.
    pub fn load(&self, name: &str) -> Result<RoutingProblem, ArchiveError> {
        if !self.exists(name)? {
            return Err(ArchiveError::NotFound {
                name: name.to_owned(),
            });
        }
        let path = record_path(name)?;
        let text = self
            .dir
            .read_to_string(&path)
            .map_err(|source| ArchiveError::Read {
                path: path.clone(),
                source,
            })?;
        let record: ProblemRecord =
            serde_json::from_str(&text).map_err(|source| ArchiveError::Decode {
                path: path.clone(),
                source,
            })?;
        RoutingProblem::try_from(record)
            .map_err(|source| ArchiveError::InvalidRecord { path, source })
    }
}

fn record_path(name: &str) -> Result<Utf8PathBuf, ArchiveError> {
    let usable = !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0']);
    if !usable {
        return Err(ArchiveError::InvalidName {
            name: name.to_owned(),
        });
    }
    Ok(Utf8PathBuf::from(format!("{name}.{RECORD_EXTENSION}")))
}
