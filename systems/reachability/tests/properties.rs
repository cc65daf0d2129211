use std::{cmp::Reverse, collections::BinaryHeap};

use beatback_core::{CellCoord, Direction, Grid};
use beatback_system_reachability::{search_reachable, IMPASSABLE_COST};
use proptest::prelude::*;

fn cost_grid() -> impl Strategy<Value = Grid<i32>> {
    (1u32..=6, 1u32..=6).prop_flat_map(|(rows, columns)| {
        let cost = prop_oneof![4 => 0i32..=3, 1 => Just(IMPASSABLE_COST)];
        prop::collection::vec(prop::collection::vec(cost, columns as usize), rows as usize)
            .prop_map(|rows| Grid::from_rows(rows).expect("rows share one width"))
    })
}

fn grid_with_origin() -> impl Strategy<Value = (Grid<i32>, CellCoord)> {
    cost_grid().prop_flat_map(|costs| {
        let origin = (0..costs.rows(), 0..costs.columns())
            .prop_map(|(row, column)| CellCoord::new(row, column));
        (Just(costs), origin)
    })
}

/// Cheapest cumulative entry cost from `origin` to every cell.
fn cheapest_costs(costs: &Grid<i32>, origin: CellCoord) -> Grid<Option<i32>> {
    let mut best: Grid<Option<i32>> = Grid::new(costs.rows(), costs.columns());
    let mut queue = BinaryHeap::new();
    best.set(origin, Some(0));
    queue.push(Reverse((0, origin)));

    while let Some(Reverse((spent, cell))) = queue.pop() {
        if best[cell].is_some_and(|known| known < spent) {
            continue;
        }
        for direction in Direction::SEARCH_ORDER {
            let Some(neighbor) = costs.neighbor(cell, direction) else {
                continue;
            };
            let total = spent + costs[neighbor];
            if best[neighbor].map_or(true, |known| total < known) {
                best.set(neighbor, Some(total));
                queue.push(Reverse((total, neighbor)));
            }
        }
    }
    best
}

proptest! {
    #[test]
    fn origin_is_always_reachable((costs, origin) in grid_with_origin(), budget in 0i32..12) {
        let reachable = search_reachable(&costs, origin, budget);

        prop_assert!(reachable[origin]);
    }

    #[test]
    fn reachable_cells_match_cheapest_paths(
        (costs, origin) in grid_with_origin(),
        budget in 0i32..12,
    ) {
        let reachable = search_reachable(&costs, origin, budget);
        let cheapest = cheapest_costs(&costs, origin);

        for cell in costs.coordinates() {
            let affordable = cheapest[cell].is_some_and(|spent| spent <= budget);
            prop_assert_eq!(reachable[cell], affordable, "cell {}", cell);
        }
    }

    #[test]
    fn larger_budget_never_loses_cells(
        (costs, origin) in grid_with_origin(),
        budget in 0i32..10,
        extra in 0i32..5,
    ) {
        let smaller = search_reachable(&costs, origin, budget);
        let larger = search_reachable(&costs, origin, budget + extra);

        for cell in smaller.marked() {
            prop_assert!(larger[cell], "cell {} lost when the budget grew", cell);
        }
    }
}
