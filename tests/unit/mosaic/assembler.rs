//! Tests for cell-by-cell mosaic assembly and blending

#[cfg(test)]
mod tests {
    use crate::solid_tile;
    use image::{DynamicImage, Rgb, RgbImage};
    use mosaictile::MosaicError;
    use mosaictile::corpus::builder::Corpus;
    use mosaictile::io::progress::ProgressManager;
    use mosaictile::matching::matcher::ColorMatcher;
    use mosaictile::matching::strategy::MatchStrategy;
    use mosaictile::mosaic::assembler::{MosaicAssembler, blend};

    fn two_tone_source() -> DynamicImage {
        let mut image = RgbImage::from_pixel(8, 4, Rgb([240, 0, 0]));
        for y in 0..4 {
            for x in 4..8 {
                image.put_pixel(x, y, Rgb([0, 0, 240]));
            }
        }
        DynamicImage::ImageRgb8(image)
    }

    fn red_blue_corpus() -> Corpus {
        Corpus::new(
            4,
            4,
            vec![solid_tile(0, 4, [255, 0, 0]), solid_tile(1, 4, [0, 0, 255])],
        )
    }

    // Tests cell counts include partial edge cells
    // Verified by using floor division
    #[test]
    fn test_pieces_required() {
        let assembler = MosaicAssembler::new(4).expect("assembler should build");
        assert_eq!(assembler.pieces_required(8, 4), 2);
        assert_eq!(assembler.pieces_required(9, 5), 6);
        assert_eq!(assembler.cell_size(), 4);
        assert!(matches!(
            MosaicAssembler::new(0),
            Err(MosaicError::ZeroArea { .. })
        ));
    }

    // Tests each cell receives the tile matching its colour
    // Verified by placing tiles at swapped coordinates
    #[test]
    fn test_assemble_places_tiles() {
        let assembler = MosaicAssembler::new(4).expect("assembler should build");
        let mut matcher = ColorMatcher::new(red_blue_corpus(), MatchStrategy::Euclidean);

        let mosaic = assembler
            .assemble(&two_tone_source(), &mut matcher, false)
            .expect("assembly should succeed");

        assert_eq!(mosaic.dimensions(), (8, 4));
        assert_eq!(mosaic.get_pixel(1, 1), &Rgb([255, 0, 0]));
        assert_eq!(mosaic.get_pixel(6, 2), &Rgb([0, 0, 255]));
        assert!(matcher.is_empty());
    }

    // Tests partial edge cells are clipped to the picture
    // Verified by skipping cells that do not fit completely
    #[test]
    fn test_assemble_partial_cells() {
        let assembler = MosaicAssembler::new(4).expect("assembler should build");
        let mut matcher = ColorMatcher::new(red_blue_corpus(), MatchStrategy::ColorSpace);
        let source = DynamicImage::ImageRgb8(RgbImage::from_pixel(6, 5, Rgb([0, 0, 250])));

        let mosaic = assembler
            .assemble(&source, &mut matcher, true)
            .expect("assembly should succeed");
        assert_eq!(mosaic.dimensions(), (6, 5));
        assert_eq!(mosaic.get_pixel(5, 4), &Rgb([0, 0, 255]));
    }

    // Tests a non-repeat run stops when tiles run out
    // Verified by reusing tiles after exhaustion
    #[test]
    fn test_assemble_exhaustion() {
        let assembler = MosaicAssembler::new(4).expect("assembler should build");
        let mut matcher = ColorMatcher::new(red_blue_corpus(), MatchStrategy::Euclidean);
        let source = DynamicImage::ImageRgb8(RgbImage::from_pixel(12, 4, Rgb([9, 9, 9])));

        assert!(matches!(
            assembler.assemble(&source, &mut matcher, false),
            Err(MosaicError::EmptyCorpus)
        ));
    }

    // Tests cell size must match the matcher's tiles
    // Verified by pasting mismatched tiles
    #[test]
    fn test_assemble_size_mismatch() {
        let assembler = MosaicAssembler::new(5).expect("assembler should build");
        let mut matcher = ColorMatcher::new(red_blue_corpus(), MatchStrategy::Euclidean);
        assert!(matches!(
            assembler.assemble(&two_tone_source(), &mut matcher, true),
            Err(MosaicError::InvalidParameter { .. })
        ));
    }

    // Tests progress advances once per cell
    // Verified by advancing only per row
    #[test]
    fn test_assemble_reports_progress() {
        let progress = ProgressManager::new();
        let assembler = MosaicAssembler::new(4)
            .expect("assembler should build")
            .with_progress(progress.clone());
        let mut matcher = ColorMatcher::new(red_blue_corpus(), MatchStrategy::Euclidean);
        let source = DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, Rgb([9, 9, 9])));

        assembler
            .assemble(&source, &mut matcher, true)
            .expect("assembly should succeed");
        assert_eq!(progress.phase_position(), 4);
        progress.finish();
    }

    // Tests blend endpoints and midpoint
    // Verified by swapping the weights
    #[test]
    fn test_blend() {
        let source = RgbImage::from_pixel(2, 2, Rgb([0, 100, 200]));
        let mosaic = RgbImage::from_pixel(2, 2, Rgb([200, 100, 0]));

        let at_zero = blend(&source, &mosaic, 0.0).expect("blend should succeed");
        assert_eq!(at_zero, source);
        let at_one = blend(&source, &mosaic, 1.0).expect("blend should succeed");
        assert_eq!(at_one, mosaic);
        let half = blend(&source, &mosaic, 0.5).expect("blend should succeed");
        assert_eq!(half.get_pixel(0, 0), &Rgb([100, 100, 100]));
    }

    // Tests blend rejects mismatched sizes and out-of-range weights
    // Verified by cropping to the smaller image
    #[test]
    fn test_blend_rejects_bad_input() {
        let source = RgbImage::new(2, 2);
        assert!(blend(&source, &RgbImage::new(3, 2), 0.5).is_err());
        assert!(blend(&source, &RgbImage::new(2, 2), 1.5).is_err());
    }
}
