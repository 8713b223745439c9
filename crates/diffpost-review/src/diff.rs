use diffpost_core::FilePatch;

/// Separator placed between consecutive file patches.
pub const PATCH_SEPARATOR: &str = "\n\n";

/// Join every present patch, in listing order, with a blank line.
///
/// Files without a patch (binary or oversized) are skipped. Patch text is
/// passed through untouched; an empty result means nothing was diffable.
///
/// # Examples
///
/// ```
/// use diffpost_core::FilePatch;
/// use diffpost_review::diff::aggregate_patches;
///
/// let files = vec![
///     FilePatch { path: "a.rs".into(), patch: Some("A".into()) },
///     FilePatch { path: "logo.png".into(), patch: None },
///     FilePatch { path: "b.rs".into(), patch: Some("B".into()) },
/// ];
/// assert_eq!(aggregate_patches(&files), "A\n\nB");
/// ```
pub fn aggregate_patches(files: &[FilePatch]) -> String {
    files
        .iter()
        .filter_map(|f| f.patch.as_deref())
        .collect::<Vec<_>>()
        .join(PATCH_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(path: &str, patch: Option<&str>) -> FilePatch {
        FilePatch {
            path: path.into(),
            patch: patch.map(str::to_string),
        }
    }

    #[test]
    fn all_absent_patches_give_empty_string() {
        let files = vec![file("a.png", None), file("b.bin", None)];
        assert_eq!(aggregate_patches(&files), "");
    }

    #[test]
    fn no_files_give_empty_string() {
        assert_eq!(aggregate_patches(&[]), "");
    }

    #[test]
    fn single_patch_has_no_separator() {
        let files = vec![file("a.png", None), file("src/lib.rs", Some("@@ -1 +1 @@"))];
        assert_eq!(aggregate_patches(&files), "@@ -1 +1 @@");
    }

    #[test]
    fn patch_content_is_not_altered() {
        let raw = "@@ -1,2 +1,2 @@\n-let s = \"<tag>\";\n+let s = \"{{DIFF}}\\t\";\n\n";
        let files = vec![file("x.rs", Some(raw)), file("y.rs", Some("+y"))];
        assert_eq!(aggregate_patches(&files), format!("{raw}\n\n+y"));
    }
}
