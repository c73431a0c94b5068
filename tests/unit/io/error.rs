//! Tests for error types including source chaining and message formatting

#[cfg(test)]
mod tests {
    use mosaictile::MosaicError;
    use mosaictile::io::error::{WithContext, corrupt_chunk, invalid_parameter};
    use std::error::Error;
    use std::path::{Path, PathBuf};

    // Tests error source chaining works correctly
    // Verified by breaking source chain
    #[test]
    fn test_error_source_chain() {
        let error = MosaicError::ChunkWrite {
            index: 3,
            path: "/tmp/3.data".into(),
            source: std::io::Error::new(std::io::ErrorKind::StorageFull, "disk full"),
        };
        assert!(error.source().is_some());
        assert!(MosaicError::EmptyCorpus.source().is_none());
    }

    // Tests counts appear in insufficient-tiles messages
    // Verified by omitting the available count
    #[test]
    fn test_insufficient_tiles_message() {
        let message = MosaicError::InsufficientTiles {
            required: 400,
            available: 150,
        }
        .to_string();
        assert!(message.contains("400"));
        assert!(message.contains("150"));
    }

    // Tests chunk write errors name the failing slot
    // Verified by omitting the index from the message
    #[test]
    fn test_chunk_write_message() {
        let message = MosaicError::ChunkWrite {
            index: 7,
            path: "/tmp/7.data".into(),
            source: std::io::Error::other("boom"),
        }
        .to_string();
        assert!(message.contains("chunk 7"));
        assert!(message.contains("boom"));
    }

    // Tests InvalidParameter error contains all fields
    // Verified by omitting value from message
    #[test]
    fn test_invalid_parameter_error() {
        let message = invalid_parameter("size", &0, &"must be positive").to_string();
        assert!(message.contains("size"));
        assert!(message.contains('0'));
        assert!(message.contains("must be positive"));
    }

    // Tests only persisted-data failures trigger the rebuild fallback
    // Verified by classifying EmptyCorpus as persistence
    #[test]
    fn test_is_persistence() {
        assert!(corrupt_chunk(Path::new("0.data"), &"bad").is_persistence());
        assert!(
            MosaicError::MissingDescriptor {
                path: PathBuf::from("database.json")
            }
            .is_persistence()
        );
        assert!(!MosaicError::EmptyCorpus.is_persistence());
        assert!(
            !MosaicError::InsufficientTiles {
                required: 2,
                available: 1
            }
            .is_persistence()
        );
    }

    // Tests conversions fill in context supplied afterwards
    // Verified by keeping the placeholder path
    #[test]
    fn test_with_path_context() {
        let result: std::result::Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "missing"));
        match result.with_path(Path::new("/data/set"), "list source folder") {
            Err(MosaicError::FileSystem {
                path, operation, ..
            }) => {
                assert_eq!(path, PathBuf::from("/data/set"));
                assert_eq!(operation, "list source folder");
            }
            other => unreachable!("Expected FileSystem error, got {other:?}"),
        }
    }
}
