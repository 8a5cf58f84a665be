//! Cave generator using cellular automata
//!
//! Creates organic, natural-looking cave systems to look around in.

use rand::rngs::StdRng;
use rand::Rng;

use crate::error::MapResult;
use crate::world::{CellKind, Map};

/// Smoothing passes over the initial noise
const SMOOTHING_PASSES: usize = 5;

/// Generate a cave map using cellular automata.
///
/// `fill` is the chance of each inner cell starting out as floor. The outer
/// border is always wall.
pub fn generate_caves(rng: &mut StdRng, width: i32, height: i32, fill: f64) -> MapResult<Map> {
    let mut map = Map::new(width, height)?;
    let fill = fill.clamp(0.0, 1.0);

    // Initial random fill
    for y in 1..height - 1 {
        for x in 1..width - 1 {
            if rng.gen_bool(fill) {
                map.set_kind(x, y, CellKind::Floor)?;
            }
        }
    }

    for _ in 0..SMOOTHING_PASSES {
        let mut next = map.clone();

        for y in 1..height - 1 {
            for x in 1..width - 1 {
                let wall_count = count_wall_neighbors(&map, x, y);
                if wall_count > 4 {
                    next.set_kind(x, y, CellKind::Wall)?;
                } else if wall_count < 4 {
                    next.set_kind(x, y, CellKind::Floor)?;
                }
            }
        }

        map = next;
    }

    connect_regions(&mut map, rng)?;
    add_windows(rng, &mut map)?;

    log::debug!(
        "Generated {}x{} cave with {} open cells",
        width,
        height,
        map.walkable_positions().len()
    );

    Ok(map)
}

/// Count wall neighbors (8-directional), out of bounds counts as wall
fn count_wall_neighbors(map: &Map, x: i32, y: i32) -> i32 {
    let mut count = 0;
    for dy in -1..=1 {
        for dx in -1..=1 {
            if dx == 0 && dy == 0 {
                continue;
            }
            if !map.is_walkable(x + dx, y + dy) {
                count += 1;
            }
        }
    }
    count
}

/// Flood fill from `start`, returning the visited mask and the region's cells
fn flood_region(map: &Map, start: (i32, i32)) -> (Vec<bool>, Vec<(i32, i32)>) {
    let mut visited = vec![false; map.len()];
    let mut stack = vec![start];
    let mut region = Vec::new();

    while let Some((x, y)) = stack.pop() {
        let Some(idx) = map.index(x, y) else {
            continue;
        };
        if visited[idx] || !map.is_walkable(x, y) {
            continue;
        }
        visited[idx] = true;
        region.push((x, y));

        for (dx, dy) in [(0, 1), (0, -1), (1, 0), (-1, 0)] {
            stack.push((x + dx, y + dy));
        }
    }

    (visited, region)
}

/// Carve tunnels from stray floor cells to the region around a random start
fn connect_regions(map: &mut Map, rng: &mut StdRng) -> MapResult<()> {
    let floor = map.walkable_positions();

    if floor.is_empty() {
        // Fallback: a plain room in the middle
        let (width, height) = map.size();
        for y in height / 4..height - height / 4 {
            for x in width / 4..width - width / 4 {
                map.set_kind(x, y, CellKind::Floor)?;
            }
        }
        return Ok(());
    }

    let start = floor[rng.gen_range(0..floor.len())];
    let (visited, connected) = flood_region(map, start);

    for &(x, y) in &floor {
        let reached = map.index(x, y).map_or(true, |idx| visited[idx]);
        if reached {
            continue;
        }
        let nearest = connected
            .iter()
            .min_by_key(|(cx, cy)| (cx - x).abs() + (cy - y).abs());
        if let Some(&target) = nearest {
            carve_tunnel(map, (x, y), target)?;
        }
    }

    Ok(())
}

/// Carve an L-ish tunnel between two points
fn carve_tunnel(map: &mut Map, from: (i32, i32), to: (i32, i32)) -> MapResult<()> {
    let (mut x, mut y) = from;

    while x != to.0 || y != to.1 {
        x += (to.0 - x).signum();
        map.set_kind(x, y, CellKind::Floor)?;
        y += (to.1 - y).signum();
        map.set_kind(x, y, CellKind::Floor)?;
    }

    Ok(())
}

/// Turn a few lone wall stubs into windows, so transparent-but-solid cells show up
fn add_windows(rng: &mut StdRng, map: &mut Map) -> MapResult<()> {
    let (width, height) = map.size();
    for y in 1..height - 1 {
        for x in 1..width - 1 {
            if map.is_walkable(x, y) || count_wall_neighbors(map, x, y) > 2 {
                continue;
            }
            if rng.gen_bool(0.3) {
                map.set_kind(x, y, CellKind::Window)?;
            }
        }
    }
    Ok(())
}

/// Pick a random walkable cell to stand on
pub fn pick_open_cell(rng: &mut StdRng, map: &Map) -> Option<(i32, i32)> {
    let open = map.walkable_positions();
    if open.is_empty() {
        None
    } else {
        Some(open[rng.gen_range(0..open.len())])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_same_seed_same_cave() {
        let a = generate_caves(&mut StdRng::seed_from_u64(7), 40, 25, 0.45).unwrap();
        let b = generate_caves(&mut StdRng::seed_from_u64(7), 40, 25, 0.45).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_border_is_solid() {
        let map = generate_caves(&mut StdRng::seed_from_u64(3), 30, 20, 0.45).unwrap();
        for x in 0..30 {
            assert!(!map.is_transparent(x, 0));
            assert!(!map.is_transparent(x, 19));
        }
        for y in 0..20 {
            assert!(!map.is_transparent(0, y));
            assert!(!map.is_transparent(29, y));
        }
    }

    #[test]
    fn test_cave_is_connected() {
        let mut rng = StdRng::seed_from_u64(11);
        let map = generate_caves(&mut rng, 50, 30, 0.45).unwrap();
        let start = pick_open_cell(&mut rng, &map).unwrap();
        let (_, region) = flood_region(&map, start);
        assert_eq!(region.len(), map.walkable_positions().len());
    }

    #[test]
    fn test_empty_fill_falls_back_to_room() {
        let map = generate_caves(&mut StdRng::seed_from_u64(1), 20, 12, 0.0).unwrap();
        assert!(map.is_walkable(10, 6));
        assert!(!map.walkable_positions().is_empty());
    }

    #[test]
    fn test_invalid_size() {
        assert!(generate_caves(&mut StdRng::seed_from_u64(1), 0, 12, 0.5).is_err());
    }
}
