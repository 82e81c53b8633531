use std::iter::repeat;
use std::path::{Path, PathBuf};

pub fn find_first_subpath<P: AsRef<Path>, F: Fn(&Path) -> bool>(
    root: impl AsRef<Path>,
    subpaths: &[P],
    search: F,
) -> Option<PathBuf> {
    subpaths
        .iter()
        .zip(repeat(root.as_ref()))
        .map(|(b, a)| a.join(b))
        .find(|it: &PathBuf| search(it))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_existing_subpath_is_found() {
        let root = PathBuf::from("/settings");
        let found = find_first_subpath(&root, &["a.yml", "b.yml"], |p| p.ends_with("b.yml"));
        assert_eq!(found, Some(root.join("b.yml")));
    }
}
