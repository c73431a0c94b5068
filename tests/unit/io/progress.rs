//! Tests for build, load and assembly progress reporting

#[cfg(test)]
mod tests {
    use mosaictile::io::progress::ProgressManager;

    // Tests a full build lifecycle advances both bars
    // Verified by not resetting the item bar between chunks
    #[test]
    fn test_build_lifecycle() {
        let pm = ProgressManager::new();
        pm.begin_build(2);

        pm.begin_chunk(0, 3);
        for _ in 0..3 {
            pm.advance_item();
        }
        assert_eq!(pm.item_position(), 3);
        pm.advance_phase();

        pm.begin_chunk(1, 1);
        assert_eq!(pm.item_position(), 0);
        pm.advance_item();
        pm.advance_phase();

        assert_eq!(pm.phase_position(), 2);
        pm.finish();
    }

    // Tests each phase restarts the outer bar
    // Verified by carrying the position across phases
    #[test]
    fn test_phases_reset() {
        let pm = ProgressManager::default();
        pm.begin_load(5);
        pm.advance_phase();
        pm.advance_phase();
        assert_eq!(pm.phase_position(), 2);

        pm.begin_cells(10);
        assert_eq!(pm.phase_position(), 0);
        pm.advance_phase();
        assert_eq!(pm.phase_position(), 1);
        pm.finish();
    }

    // Tests clones report into the same bars
    // Verified by deep-copying the bars on clone
    #[test]
    fn test_clone_shares_bars() {
        let pm = ProgressManager::new();
        let worker = pm.clone();
        pm.begin_build(1);
        pm.begin_chunk(0, 2);
        worker.advance_item();
        worker.advance_item();
        assert_eq!(pm.item_position(), 2);
        pm.finish();
    }

    // Tests empty phases are accepted
    // Verified by adding panic for zero lengths
    #[test]
    fn test_empty_phase() {
        let pm = ProgressManager::new();
        pm.begin_build(0);
        pm.begin_cells(0);
        pm.finish();
    }
}
