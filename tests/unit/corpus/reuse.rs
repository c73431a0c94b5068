//! Tests for the reuse-or-rebuild decision

#[cfg(test)]
mod tests {
    use mosaictile::corpus::reuse::{
        Confirm, FixedAnswer, Requirement, ReuseDecision, ReusePolicy, ReusePrompt, decide_reuse,
    };
    use mosaictile::store::descriptor::DatabaseDescriptor;
    use std::path::Path;

    struct NeverAsked;

    impl Confirm for NeverAsked {
        fn confirm(&mut self, prompt: &ReusePrompt) -> bool {
            unreachable!("confirmation should not be requested: {prompt:?}")
        }
    }

    #[derive(Default)]
    struct Recording {
        answer: bool,
        prompts: Vec<ReusePrompt>,
    }

    impl Confirm for Recording {
        fn confirm(&mut self, prompt: &ReusePrompt) -> bool {
            self.prompts.push(*prompt);
            self.answer
        }
    }

    fn complete(files: usize, tiles: usize) -> DatabaseDescriptor {
        let mut descriptor =
            DatabaseDescriptor::started(Path::new("/srv/photos"), (100, 100), files, 2000);
        descriptor.tile_count = tiles;
        descriptor.chunk_count = 1;
        descriptor.complete = true;
        descriptor
    }

    // Tests matching counts are trusted without prompting
    // Verified by always consulting the confirmer
    #[test]
    fn test_matching_counts_reuse_silently() {
        let decision = decide_reuse(
            &complete(50, 50),
            50,
            Requirement::new(true, 10),
            &ReusePolicy::default(),
            &mut NeverAsked,
        );
        assert_eq!(decision, ReuseDecision::Reuse);
    }

    // Tests a count mismatch asks, and a rejection rebuilds
    // Verified by reusing whenever tiles suffice
    #[test]
    fn test_mismatch_prompts_then_rebuilds() {
        let mut confirm = Recording::default();
        let decision = decide_reuse(
            &complete(50, 50),
            49,
            Requirement::new(true, 10),
            &ReusePolicy::default(),
            &mut confirm,
        );
        assert_eq!(decision, ReuseDecision::Rebuild);
        assert_eq!(
            confirm.prompts,
            vec![ReusePrompt {
                corpus_files: 50,
                corpus_tiles: 50,
                folder_files: 49
            }]
        );
    }

    // Tests an accepted prompt reuses the corpus
    // Verified by ignoring the confirmer's answer
    #[test]
    fn test_mismatch_accepted() {
        let decision = decide_reuse(
            &complete(50, 48),
            60,
            Requirement::new(true, 10),
            &ReusePolicy::default(),
            &mut FixedAnswer(true),
        );
        assert_eq!(decision, ReuseDecision::Reuse);
    }

    // Tests a corpus too small for a non-repeat run is rebuilt without asking
    // Verified by checking file counts instead of tile counts
    #[test]
    fn test_too_few_tiles_rebuilds() {
        let decision = decide_reuse(
            &complete(50, 50),
            50,
            Requirement::new(false, 51),
            &ReusePolicy::default(),
            &mut NeverAsked,
        );
        assert_eq!(decision, ReuseDecision::Rebuild);
    }

    // Tests interrupted builds are never reused
    // Verified by skipping the completion check
    #[test]
    fn test_incomplete_rebuilds() {
        let mut descriptor = complete(50, 50);
        descriptor.complete = false;
        let decision = decide_reuse(
            &descriptor,
            50,
            Requirement::new(true, 1),
            &ReusePolicy::default(),
            &mut NeverAsked,
        );
        assert_eq!(decision, ReuseDecision::Rebuild);
    }

    // Tests disabling trust forces a prompt even for equal counts
    // Verified by ignoring the policy flag
    #[test]
    fn test_untrusted_counts_prompt() {
        let mut confirm = Recording::default();
        let policy = ReusePolicy {
            trust_matching_counts: false,
        };
        let decision = decide_reuse(
            &complete(50, 50),
            50,
            Requirement::new(true, 1),
            &policy,
            &mut confirm,
        );
        assert_eq!(decision, ReuseDecision::Rebuild);
        assert_eq!(confirm.prompts.len(), 1);
    }

    // Tests required tile counts for both modes
    // Verified by requiring all pieces in repeat mode
    #[test]
    fn test_requirement() {
        assert_eq!(Requirement::new(true, 400).required_tiles(), 1);
        assert_eq!(Requirement::new(true, 0).required_tiles(), 0);
        assert_eq!(Requirement::new(false, 400).required_tiles(), 400);
        assert!(Requirement::new(false, 400).is_met_by(400));
        assert!(!Requirement::new(false, 400).is_met_by(399));
        assert!(!Requirement::new(true, 1).is_met_by(0));
    }
}
