use crate::core_control::FtpError;
use crate::core_listing::EntryType;
use crate::session::Session;
use log::debug;

impl Session {
    /// Walks the tree under `path` and calls `visit` with the full path of
    /// every file.
    ///
    /// Files of a directory are visited before its subdirectories, which are
    /// then walked depth-first in listing order. Links are not followed.
    /// The first error, from the server or from `visit`, stops the walk.
    pub async fn walk<F, E>(&mut self, path: &str, mut visit: F) -> Result<(), E>
    where
        F: FnMut(&str) -> Result<(), E>,
        E: From<FtpError>,
    {
        let mut pending = vec![directory_prefix(path)];

        while let Some(dir) = pending.pop() {
            debug!("Walking: '{}'", dir);
            let entries = self.list(&dir).await?;

            let mut subdirs = Vec::new();
            for entry in entries {
                match entry.entry_type {
                    EntryType::File => visit(&format!("{}{}", dir, entry.name))?,
                    EntryType::Folder => {
                        if is_walkable(&entry.name) {
                            subdirs.push(format!("{}{}/", dir, entry.name));
                        }
                    }
                    EntryType::Link => {}
                }
            }

            // Reversed so the first subdirectory is walked next.
            pending.extend(subdirs.into_iter().rev());
        }

        Ok(())
    }
}

/// `.`, `..` and names carrying a separator (some servers name the `cdir`
/// entry by its full path) are not descended into.
fn is_walkable(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains('/')
}

fn directory_prefix(path: &str) -> String {
    if path.is_empty() || path.ends_with('/') {
        path.to_string()
    } else {
        format!("{}/", path)
    }
}
