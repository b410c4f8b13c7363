use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::Result;
use crate::model::match_record::Competition;
use crate::text::slugify;

/// `<prefix>_<category>_<slug>.ics`, e.g. `federado_cadete_las_flores_morado.ics`.
pub fn artifact_file_name(competition: Competition, category: &str, slug_key: &str) -> String {
    let category = slugify(category, '_');
    if category.is_empty() {
        format!("{}_{}.ics", competition.file_prefix(), slug_key)
    } else {
        format!("{}_{}_{}.ics", competition.file_prefix(), category, slug_key)
    }
}

/// Replace `path` with `contents` as a whole: written to a sibling temp file
/// first, then renamed over the target, so readers never see a partial file.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let tmp = temp_path(path);
    fs::write(&tmp, contents)?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    debug!(path = %path.display(), bytes = contents.len(), "Wrote document");
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_artifacts_from_prefix_category_and_slug() {
        assert_eq!(
            artifact_file_name(Competition::Federated, "Cadete Femenino", "las_flores_morado"),
            "federado_cadete_femenino_las_flores_morado.ics"
        );
        assert_eq!(artifact_file_name(Competition::Municipal, "", "las_flores"), "imd_las_flores.ics");
    }

    #[test]
    fn atomic_write_replaces_whole_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("doc.ics");
        write_atomic(&path, "first version, much longer").expect("write");
        write_atomic(&path, "second").expect("write");
        assert_eq!(fs::read_to_string(&path).expect("read"), "second");
        assert!(!dir.path().join("nested").join("doc.ics.tmp").exists());
    }
}
