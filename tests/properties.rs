use std::collections::HashMap;

use band_life::bandlife::{
    Engine, Grid, band_ranges, for_each_ring_cell, partition, step_serial,
};
use proptest::prelude::*;

fn grid_strategy() -> impl Strategy<Value = Grid> {
    (1usize..24, 1usize..24).prop_flat_map(|(w, h)| {
        proptest::collection::vec(any::<bool>(), w * h)
            .prop_map(move |cells| Grid::from_cells(w, h, cells).expect("sized buffer"))
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn bands_and_ring_cover_every_cell_once(
        width in 3usize..40,
        height in 3usize..40,
        workers_seed in 0usize..1000,
    ) {
        let workers = 1 + workers_seed % (height - 2);
        let mut hits: HashMap<(usize, usize), u32> = HashMap::new();
        for_each_ring_cell(width, height, |x, y| *hits.entry((x, y)).or_default() += 1);
        for rows in band_ranges(height, workers) {
            for y in rows {
                for x in 1..width - 1 {
                    *hits.entry((x, y)).or_default() += 1;
                }
            }
        }
        prop_assert_eq!(hits.len(), width * height);
        prop_assert!(hits.values().all(|&n| n == 1));
    }

    #[test]
    fn band_count_matches_workers(height in 3usize..200, workers in 1usize..64) {
        let ranges = band_ranges(height, workers);
        prop_assert_eq!(ranges.len(), workers.min(height - 2));
        prop_assert_eq!(ranges.first().map(|r| r.start), Some(1));
        prop_assert_eq!(ranges.last().map(|r| r.end), Some(height - 1));
        for pair in ranges.windows(2) {
            prop_assert_eq!(pair[0].end, pair[1].start);
        }
    }

    #[test]
    fn partition_views_borrow_current_rows(grid in grid_strategy(), workers in 1usize..8) {
        for band in partition(&grid, workers) {
            prop_assert!(band.offset() >= 1);
            prop_assert!(band.offset() + band.rows() < grid.height());
            prop_assert_eq!(band.width(), grid.width());
        }
    }

    #[test]
    fn parallel_step_equals_serial_step(grid in grid_strategy(), workers in 1usize..6) {
        let expected = step_serial(&grid);
        let mut engine = Engine::from_grid(grid, workers).expect("engine");
        let next = engine.advance_generation().expect("generation");
        prop_assert_eq!(next, &expected);
    }
}
