//! Tests for corpus folder naming and filename sanitising

#[cfg(test)]
mod tests {
    use mosaictile::store::layout::{CorpusLayout, clean_filename, corpus_folder_for};
    use std::path::{Path, PathBuf};

    // Tests the corpus folder sits next to the source folder with a suffix
    // Verified by joining the suffix as a child directory
    #[test]
    fn test_corpus_folder_suffix() {
        assert_eq!(
            corpus_folder_for(Path::new("photos")),
            PathBuf::from("photos.data")
        );
        assert_eq!(
            corpus_folder_for(Path::new("/srv/photos/")),
            PathBuf::from("/srv/photos.data")
        );
    }

    // Tests descriptor and chunk paths inside the layout
    // Verified by dropping the images sub-folder
    #[test]
    fn test_layout_paths() {
        let layout = CorpusLayout::for_source(Path::new("/srv/photos"));
        assert_eq!(layout.root(), Path::new("/srv/photos.data"));
        assert_eq!(
            layout.descriptor_path(),
            PathBuf::from("/srv/photos.data/database.json")
        );
        assert_eq!(
            layout.chunk_path(3),
            PathBuf::from("/srv/photos.data/images/3.data")
        );
    }

    // Tests slot numbers are parsed back from chunk names only
    // Verified by accepting any numeric stem
    #[test]
    fn test_slot_of() {
        assert_eq!(CorpusLayout::slot_of(Path::new("images/12.data")), Some(12));
        assert_eq!(CorpusLayout::slot_of(Path::new("images/12.tmp")), None);
        assert_eq!(CorpusLayout::slot_of(Path::new("images/abc.data")), None);
    }

    // Tests illegal characters are removed and others kept
    // Verified by replacing instead of removing
    #[test]
    fn test_clean_filename() {
        assert_eq!(clean_filename("a:b<c>d\"e\\f/g|h?i*j.png"), "abcdefghij.png");
        assert_eq!(clean_filename("plain name.jpg"), "plain name.jpg");
    }

    // Tests existence tracks the root folder
    // Verified by checking the descriptor instead
    #[test]
    fn test_exists() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let layout = CorpusLayout::at(dir.path().join("corpus.data"));
        assert!(!layout.exists());
        std::fs::create_dir_all(layout.images_folder()).expect("Failed to create folder");
        assert!(layout.exists());
    }
}
